use super::Registers;
use crate::constants::registers::{REG_ACH0, REG_ACL0, REG_ACM0};
use crate::constants::WRITE_BACK_LOG_SIZE;
use heapless::Vec;

/// Register writes issued from the extended slot, committed after the main op
pub struct WriteBackLog {
    entries: Vec<(u8, u16), WRITE_BACK_LOG_SIZE>,
    precise: bool, // OR pending values into the current register contents
}

impl WriteBackLog {
    pub fn new(precise: bool) -> Self {
        Self {
            entries: Vec::new(),
            precise,
        }
    }

    pub fn is_precise(&self) -> bool {
        self.precise
    }

    pub fn set_precise(&mut self, precise: bool) {
        self.precise = precise;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(u8, u16)] {
        &self.entries
    }

    pub fn push(&mut self, reg: u8, value: u16) {
        if self.entries.push((reg, value)).is_err() {
            panic!(
                "write-back log overflow writing {:#06x} to register {:#04x}",
                value, reg
            );
        }
    }

    /// Commits every pending write in append order and empties the log
    pub fn apply(&mut self, regs: &mut Registers) {
        for &(reg, pending) in self.entries.iter() {
            let value = if self.precise {
                pending | regs.op_read_register(reg)
            } else {
                pending
            };
            regs.op_write_register(reg, value);
        }
        self.entries.clear();
    }

    /// Zeroes each logged target so a later precise apply ORs into a clean slate
    pub fn zero(&self, regs: &mut Registers) {
        if !self.precise {
            return;
        }
        for &(reg, _) in self.entries.iter() {
            regs.op_write_register(reg, 0);
        }
    }

    /// Same as zero, but leaves the l/m/h windows of accumulator acc untouched
    pub fn zero_preserve_acc(&self, regs: &mut Registers, acc: u8) {
        if !self.precise {
            return;
        }
        let preserved = [REG_ACL0 + acc, REG_ACM0 + acc, REG_ACH0 + acc];
        for &(reg, _) in self.entries.iter() {
            if preserved.contains(&reg) {
                continue;
            }
            regs.op_write_register(reg, 0);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
