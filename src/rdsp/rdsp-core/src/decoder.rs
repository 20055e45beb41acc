use crate::instructions::{
    find_ext_opcode, OpHandler, OpTemplate, EXT_FALLBACK, EXT_OPCODES, OPCODES, UNRECOGNIZED,
};
use alloc::boxed::Box;
use alloc::vec;
use log::debug;

const NO_TEMPLATE: u8 = 0xFF;

/// Maps instruction words to their decoded form
pub trait OpcodeTable {
    fn find_template(&self, inst: u16) -> Option<&OpTemplate>;

    /// Handler for the extended slot of inst; only meaningful when the main
    /// template is extended
    fn ext_op(&self, inst: u16) -> OpHandler;

    fn op_template(&self, inst: u16) -> &OpTemplate {
        self.find_template(inst).unwrap_or(&UNRECOGNIZED)
    }

    fn is_recognized(&self, inst: u16) -> bool {
        self.find_template(inst).is_some()
    }
}

/// Index of the extended slot inside an instruction word
pub fn ext_index(inst: u16) -> u8 {
    if inst >> 12 == 0x3 {
        (inst & 0x7F) as u8
    } else {
        (inst & 0xFF) as u8
    }
}

/// Full 64K dispatch table over the base instruction set
pub struct BaseTable {
    ops: Box<[u8]>,
    ext: [u8; 256],
}

impl BaseTable {
    pub fn new() -> Self {
        let mut ops = vec![NO_TEMPLATE; 0x10000].into_boxed_slice();
        let mut known = 0;
        for (inst, slot) in ops.iter_mut().enumerate() {
            if let Some(idx) = OPCODES.iter().position(|t| t.matches(inst as u16)) {
                *slot = idx as u8;
                known += 1;
            }
        }

        let mut ext = [NO_TEMPLATE; 256];
        for (byte, slot) in ext.iter_mut().enumerate() {
            if let Some(idx) = EXT_OPCODES.iter().position(|t| t.matches(byte as u16)) {
                *slot = idx as u8;
            }
        }

        debug!("Opcode table built, {} of 65536 words decode", known);
        Self { ops, ext }
    }
}

impl Default for BaseTable {
    fn default() -> Self {
        Self::new()
    }
}

impl OpcodeTable for BaseTable {
    fn find_template(&self, inst: u16) -> Option<&OpTemplate> {
        match self.ops[inst as usize] {
            NO_TEMPLATE => None,
            idx => Some(&OPCODES[idx as usize]),
        }
    }

    fn ext_op(&self, inst: u16) -> OpHandler {
        match self.ext[ext_index(inst) as usize] {
            NO_TEMPLATE => EXT_FALLBACK,
            idx => EXT_OPCODES[idx as usize].handler,
        }
    }
}

/// Linear-search table, slower to query but free to build
pub struct LinearTable;

impl OpcodeTable for LinearTable {
    fn find_template(&self, inst: u16) -> Option<&OpTemplate> {
        OPCODES.iter().find(|t| t.matches(inst))
    }

    fn ext_op(&self, inst: u16) -> OpHandler {
        find_ext_opcode(ext_index(inst) as u16).map_or(EXT_FALLBACK, |t| t.handler)
    }
}
