use crate::constants::code_flags::*;
use crate::constants::IMEM_SIZE;
use crate::decoder::OpcodeTable;
use crate::memory::InstructionMemory;
use alloc::boxed::Box;
use alloc::vec;
use log::{debug, info};

// Matches any word in an idle signature
const SIG_WILDCARD: u16 = 0xFFFF;

// Mailbox polling loops that only exit when the host writes something
const IDLE_SIGNATURES: [&[u16]; 4] = [
    // LRS $ac0.m, @DMBH / ANDCF $ac0.m, #0x8000 / JLZ
    &[0x26FC, 0x02C0, 0x8000, 0x029D, SIG_WILDCARD],
    // LRS $ac1.m, @DMBH / ANDCF $ac1.m, #0x8000 / JLZ
    &[0x27FC, 0x03C0, 0x8000, 0x029D, SIG_WILDCARD],
    // LR $ac0.m, @CMBH / ANDCF $ac0.m, #0x8000 / JLNZ
    &[0x00DE, 0xFFFE, 0x02C0, 0x8000, 0x029C, SIG_WILDCARD],
    // LR $ax0.h, @0x0352 / TST $ax0.h / JZ
    &[0x00DA, 0x0352, 0x8600, 0x0295, SIG_WILDCARD],
];

// Template opcodes of instructions that touch data memory and may fault
const MEMORY_ACCESS_OPCODES: [u16; 6] = [0x00C0, 0x1800, 0x1880, 0x1900, 0x1980, 0x2000];

// Unconditional immediate jump
const JMP_OPCODE: u16 = 0x029F;

/// Per-address flags describing the loaded code
pub struct CodeFlagMap {
    flags: Box<[u8]>,
}

impl CodeFlagMap {
    pub fn new() -> Self {
        Self {
            flags: vec![CODE_NONE; IMEM_SIZE].into_boxed_slice(),
        }
    }

    pub fn reset(&mut self) {
        self.flags.iter_mut().for_each(|f| *f = CODE_NONE);
    }

    pub fn code_flags(&self, address: u16) -> u8 {
        self.flags[address as usize]
    }

    fn mark(&mut self, address: u16, flag: u8) {
        self.flags[address as usize] |= flag;
    }

    pub fn is_start_of_instruction(&self, address: u16) -> bool {
        self.code_flags(address) & CODE_START_OF_INST != 0
    }

    pub fn is_idle_skip(&self, address: u16) -> bool {
        self.code_flags(address) & CODE_IDLE_SKIP != 0
    }

    pub fn is_loop_start(&self, address: u16) -> bool {
        self.code_flags(address) & CODE_LOOP_START != 0
    }

    pub fn is_loop_end(&self, address: u16) -> bool {
        self.code_flags(address) & CODE_LOOP_END != 0
    }

    pub fn needs_sr_update(&self, address: u16) -> bool {
        self.code_flags(address) & CODE_UPDATE_SR != 0
    }

    pub fn checks_exceptions(&self, address: u16) -> bool {
        self.code_flags(address) & CODE_CHECK_EXC != 0
    }
}

impl Default for CodeFlagMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Static analysis over instruction memory. Every load throws the old
/// results away and rescans the full address space.
pub struct Analyzer {
    map: CodeFlagMap,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            map: CodeFlagMap::new(),
        }
    }

    pub fn flags(&self) -> &CodeFlagMap {
        &self.map
    }

    pub fn analyze(&mut self, imem: &InstructionMemory, table: &dyn OpcodeTable) {
        self.map.reset();
        self.analyze_range(imem, table, 0x0000, IMEM_SIZE as u32);
        info!("Code analysis done");
    }

    // start is inclusive, end exclusive
    fn analyze_range(
        &mut self,
        imem: &InstructionMemory,
        table: &dyn OpcodeTable,
        start: u32,
        end: u32,
    ) {
        let mut last_arithmetic = 0u16;
        let mut addr = start;

        while addr < end {
            let pc = addr as u16;
            let inst = imem.read(pc);

            for (num, sig) in IDLE_SIGNATURES.iter().enumerate() {
                if Self::matches_signature(imem, pc, sig) {
                    info!("Idle skip location found at {:04x} (sig {})", pc, num + 1);
                    self.map.mark(pc, CODE_IDLE_SKIP);
                }
            }

            let template = match table.find_template(inst) {
                Some(t) => t,
                None => {
                    addr += 1;
                    continue;
                }
            };

            self.map.mark(pc, CODE_START_OF_INST);

            if inst & 0xFFE0 == 0x0060 || inst & 0xFF00 == 0x1100 {
                // BLOOP, BLOOPI
                let loop_end = imem.read(pc.wrapping_add(1));
                self.map.mark(pc, CODE_LOOP_START);
                self.map.mark(loop_end, CODE_LOOP_END);
            } else if inst & 0xFFE0 == 0x0040 || inst & 0xFF00 == 0x1000 {
                // LOOP, LOOPI
                self.map.mark(pc, CODE_LOOP_START);
                self.map.mark(pc.wrapping_add(1), CODE_LOOP_END);
            }

            // Conditional branches read the flags of the last arithmetic op
            if template.updates_sr {
                last_arithmetic = pc;
            }
            if template.branch && !template.uncond_branch {
                self.map.mark(last_arithmetic, CODE_UPDATE_SR);
            }

            if template.extended || MEMORY_ACCESS_OPCODES.contains(&template.opcode) {
                self.map
                    .mark(pc.wrapping_add(template.size as u16), CODE_CHECK_EXC);
            }

            if inst == JMP_OPCODE && imem.read(pc.wrapping_add(1)) == pc {
                debug!("Self jump at {:04x} marked idle", pc);
                self.map.mark(pc, CODE_IDLE_SKIP);
            }

            addr += template.size as u32;
        }
    }

    fn matches_signature(imem: &InstructionMemory, addr: u16, sig: &[u16]) -> bool {
        sig.iter().enumerate().all(|(i, &word)| {
            word == SIG_WILDCARD || imem.read(addr.wrapping_add(i as u16)) == word
        })
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}
