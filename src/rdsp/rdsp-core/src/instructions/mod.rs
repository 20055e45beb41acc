mod arith;
mod control;
mod ext;
mod moves;
mod multiply;

use crate::state::DspState;

/// Main or extended-slot handler; receives the raw instruction word
pub type OpHandler = fn(&mut DspState, u16);

/// Static description of one instruction encoding
pub struct OpTemplate {
    pub name: &'static str,
    pub opcode: u16,
    pub mask: u16,
    pub handler: OpHandler,
    pub size: u8,            // Words, including immediates
    pub extended: bool,      // Low bits carry an extended-slot op
    pub branch: bool,        // May redirect pc
    pub uncond_branch: bool, // Always redirects pc
    pub updates_sr: bool,    // Rewrites the status flags
}

impl OpTemplate {
    pub fn matches(&self, inst: u16) -> bool {
        inst & self.mask == self.opcode
    }
}

macro_rules! op {
    ($name:expr, $opcode:expr, $mask:expr, $handler:path, $size:expr) => {
        op!($name, $opcode, $mask, $handler, $size, false, false, false, false)
    };
    ($name:expr, $opcode:expr, $mask:expr, $handler:path, $size:expr,
     $ext:expr, $branch:expr, $uncond:expr, $sr:expr) => {
        OpTemplate {
            name: $name,
            opcode: $opcode,
            mask: $mask,
            handler: $handler,
            size: $size,
            extended: $ext,
            branch: $branch,
            uncond_branch: $uncond,
            updates_sr: $sr,
        }
    };
}

// First match wins, so fixed-condition forms precede their cc variants
pub static OPCODES: &[OpTemplate] = &[
    op!("NOP", 0x0000, 0xFFFC, control::nop, 1),
    op!("DAR", 0x0004, 0xFFFC, control::dar, 1),
    op!("IAR", 0x0008, 0xFFFC, control::iar, 1),
    op!("SUBARN", 0x000C, 0xFFFC, control::subarn, 1),
    op!("ADDARN", 0x0010, 0xFFF0, control::addarn, 1),
    op!("HALT", 0x0021, 0xFFFF, control::halt, 1, false, true, true, false),
    op!("LOOP", 0x0040, 0xFFE0, control::loop_reg, 1, false, true, true, false),
    op!("BLOOP", 0x0060, 0xFFE0, control::bloop, 2, false, true, true, false),
    op!("LRI", 0x0080, 0xFFE0, moves::lri, 2),
    op!("IF", 0x027F, 0xFFFF, control::ifcc, 1, false, true, true, false),
    op!("IFcc", 0x0270, 0xFFF0, control::ifcc, 1, false, true, false, false),
    op!("JMP", 0x029F, 0xFFFF, control::jcc, 2, false, true, true, false),
    op!("Jcc", 0x0290, 0xFFF0, control::jcc, 2, false, true, false, false),
    op!("CALL", 0x02BF, 0xFFFF, control::call, 2, false, true, true, false),
    op!("CALLcc", 0x02B0, 0xFFF0, control::call, 2, false, true, false, false),
    op!("RET", 0x02DF, 0xFFFF, control::ret, 1, false, true, true, false),
    op!("RETcc", 0x02D0, 0xFFF0, control::ret, 1, false, true, false, false),
    op!("RTI", 0x02FF, 0xFFFF, control::rti, 1, false, true, true, false),
    op!("ADDI", 0x0200, 0xFEFF, arith::addi, 2, false, false, false, true),
    op!("XORI", 0x0220, 0xFEFF, arith::xori, 2, false, false, false, true),
    op!("ANDI", 0x0240, 0xFEFF, arith::andi, 2, false, false, false, true),
    op!("ORI", 0x0260, 0xFEFF, arith::ori, 2, false, false, false, true),
    op!("CMPI", 0x0280, 0xFEFF, arith::cmpi, 2, false, false, false, true),
    op!("ANDF", 0x02A0, 0xFEFF, arith::andf, 2, false, false, false, true),
    op!("ANDCF", 0x02C0, 0xFEFF, arith::andcf, 2, false, false, false, true),
    op!("ADDIS", 0x0400, 0xFE00, arith::addis, 1, false, false, false, true),
    op!("CMPIS", 0x0600, 0xFE00, arith::cmpis, 1, false, false, false, true),
    op!("LRIS", 0x0800, 0xF800, moves::lris, 1),
    op!("LOOPI", 0x1000, 0xFF00, control::loopi, 1, false, true, true, false),
    op!("BLOOPI", 0x1100, 0xFF00, control::bloopi, 2, false, true, true, false),
    op!("SBCLR", 0x1200, 0xFF00, control::sbclr, 1),
    op!("SBSET", 0x1300, 0xFF00, control::sbset, 1),
    op!("JMPR", 0x170F, 0xFF1F, control::jrcc, 1, false, true, true, false),
    op!("JRcc", 0x1700, 0xFF10, control::jrcc, 1, false, true, false, false),
    op!("CALLR", 0x171F, 0xFF1F, control::callr, 1, false, true, true, false),
    op!("CALLRcc", 0x1710, 0xFF10, control::callr, 1, false, true, false, false),
    op!("MRR", 0x1C00, 0xFC00, moves::mrr, 1),
    // Extended-capable forms
    op!("XORR", 0x3000, 0xFC80, arith::xorr, 1, true, false, false, true),
    op!("ANDR", 0x3400, 0xFC80, arith::andr, 1, true, false, false, true),
    op!("ORR", 0x3800, 0xFC80, arith::orr, 1, true, false, false, true),
    op!("ADD", 0x4C00, 0xFE00, arith::add, 1, true, false, false, true),
    op!("ADDP", 0x4E00, 0xFE00, arith::addp, 1, true, false, false, true),
    op!("SUB", 0x5C00, 0xFE00, arith::sub, 1, true, false, false, true),
    op!("MOV", 0x6C00, 0xFE00, arith::mov, 1, true, false, false, true),
    op!("MOVP", 0x6E00, 0xFE00, arith::movp, 1, true, false, false, true),
    op!("INC", 0x7600, 0xFE00, arith::inc, 1, true, false, false, true),
    op!("DEC", 0x7A00, 0xFE00, arith::dec, 1, true, false, false, true),
    op!("NEG", 0x7C00, 0xFE00, arith::neg, 1, true, false, false, true),
    op!("NX", 0x8000, 0xF700, control::nx, 1, true, false, false, false),
    op!("CLR", 0x8100, 0xF700, arith::clr, 1, true, false, false, true),
    op!("CLRP", 0x8400, 0xFF00, multiply::clrp, 1, true, false, false, false),
    op!("M2", 0x8A00, 0xFF00, control::srbith, 1, true, false, false, false),
    op!("M0", 0x8B00, 0xFF00, control::srbith, 1, true, false, false, false),
    op!("CLR15", 0x8C00, 0xFF00, control::srbith, 1, true, false, false, false),
    op!("SET15", 0x8D00, 0xFF00, control::srbith, 1, true, false, false, false),
    op!("SET16", 0x8E00, 0xFF00, control::srbith, 1, true, false, false, false),
    op!("SET40", 0x8F00, 0xFF00, control::srbith, 1, true, false, false, false),
    op!("MUL", 0x9000, 0xF700, multiply::mul, 1, true, false, false, false),
    op!("MULAC", 0x9400, 0xF600, multiply::mulac, 1, true, false, false, true),
    op!("TST", 0xB100, 0xF700, arith::tst, 1, true, false, false, true),
    op!("MULX", 0xA000, 0xE700, multiply::mulx, 1, true, false, false, false),
    op!("MULXAC", 0xA400, 0xE600, multiply::mulxac, 1, true, false, false, true),
    op!("MADDX", 0xE000, 0xFC00, multiply::maddx, 1, true, false, false, false),
    op!("MSUBX", 0xE400, 0xFC00, multiply::msubx, 1, true, false, false, false),
    op!("MADD", 0xF200, 0xFE00, multiply::madd, 1, true, false, false, false),
    op!("MSUB", 0xF600, 0xFE00, multiply::msub, 1, true, false, false, false),
];

// Matched against the extended byte (low 7 bits for 0x3xxx words)
pub static EXT_OPCODES: &[OpTemplate] = &[
    op!("NOP", 0x0000, 0x00FC, ext::nop, 1),
    op!("DR", 0x0004, 0x00FC, ext::dr, 1),
    op!("IR", 0x0008, 0x00FC, ext::ir, 1),
    op!("NR", 0x000C, 0x00FC, ext::nr, 1),
    op!("MV", 0x0010, 0x00F0, ext::mv, 1),
];

/// Stand-in for words no template claims; executes as a warning no-op
pub static UNRECOGNIZED: OpTemplate = op!("UNRECOGNIZED", 0x0000, 0x0000, control::nop, 1);

/// Extended-slot handler used for slot encodings outside the table
pub static EXT_FALLBACK: OpHandler = ext::nop;

/// Linear lookup; the dispatch table caches this per word
pub fn find_opcode(inst: u16) -> Option<&'static OpTemplate> {
    OPCODES.iter().find(|t| t.matches(inst))
}

pub fn find_ext_opcode(ext: u16) -> Option<&'static OpTemplate> {
    EXT_OPCODES.iter().find(|t| t.matches(ext))
}

/// Size in words of the instruction starting with inst
pub fn instruction_size(inst: u16) -> u8 {
    find_opcode(inst).map_or(1, |t| t.size)
}
