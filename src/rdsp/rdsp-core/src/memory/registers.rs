use crate::constants::registers::*;
use crate::constants::status::{SR_40_MODE_BIT, SR_EXT_INT_ENABLE, SR_INT_ENABLE};
use crate::constants::{STACK_DEPTH, STACK_MASK};
use crate::utils::sext8;

/// 40-bit accumulator split into its low, mid and (sign-extended) high windows
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Accumulator {
    pub l: u16,
    pub m: u16,
    pub h: u16,
}

/// Product register; m2 is a second mid half summed into m on read
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Product {
    pub l: u16,
    pub m: u16,
    pub h: u16,
    pub m2: u16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AxRegister {
    pub l: u16,
    pub h: u16,
}

/// Which hardware stack a stack register fronts
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StackRegister {
    Call = 0,
    Data = 1,
    LoopAddress = 2,
    LoopCounter = 3,
}

impl StackRegister {
    fn from_index(idx: u8) -> Self {
        match idx & 0x3 {
            0 => StackRegister::Call,
            1 => StackRegister::Data,
            2 => StackRegister::LoopAddress,
            _ => StackRegister::LoopCounter,
        }
    }
}

/// Architectural register file of the DSP
pub struct Registers {
    pub ar: [u16; 4], // Address registers
    pub ix: [u16; 4], // Index registers
    pub wr: [u16; 4], // Wrap registers
    pub st: [u16; 4], // Visible stack tops
    pub cr: u16,
    pub sr: u16,
    pub prod: Product,
    pub ax: [AxRegister; 2],
    pub ac: [Accumulator; 2],

    stack_ptrs: [u8; 4],
    stacks: [[u16; STACK_DEPTH]; 4],
}

impl Registers {
    pub fn new() -> Self {
        let mut regs = Self {
            ar: [0; 4],
            ix: [0; 4],
            wr: [0; 4],
            st: [0; 4],
            cr: 0,
            sr: 0,
            prod: Product::default(),
            ax: [AxRegister::default(); 2],
            ac: [Accumulator::default(); 2],
            stack_ptrs: [0; 4],
            stacks: [[0; STACK_DEPTH]; 4],
        };
        regs.reset();
        regs
    }

    /// Power-on register state: wrap registers span the full space, interrupts enabled
    pub fn reset(&mut self) {
        self.ar = [0; 4];
        self.ix = [0; 4];
        self.wr = [0xFFFF; 4];
        self.st = [0; 4];
        self.cr = 0;
        self.sr = SR_INT_ENABLE | SR_EXT_INT_ENABLE;
        self.prod = Product::default();
        self.ax = [AxRegister::default(); 2];
        self.ac = [Accumulator::default(); 2];
        self.stack_ptrs = [0; 4];
        self.stacks = [[0; STACK_DEPTH]; 4];
    }

    pub fn is_sr_flag_set(&self, flag: u16) -> bool {
        self.sr & flag != 0
    }

    pub fn set_sr_flag(&mut self, flag: u16) {
        self.sr |= flag;
    }

    pub fn clear_sr_flag(&mut self, flag: u16) {
        self.sr &= !flag;
    }

    /// Pushes the visible top down into its stack and exposes val
    pub fn push_stack(&mut self, stack: StackRegister, val: u16) {
        let idx = stack as usize;
        self.stack_ptrs[idx] = self.stack_ptrs[idx].wrapping_add(1) & STACK_MASK;
        self.stacks[idx][self.stack_ptrs[idx] as usize] = self.st[idx];
        self.st[idx] = val;
    }

    /// Returns the visible top and restores the previous one from the stack
    pub fn pop_stack(&mut self, stack: StackRegister) -> u16 {
        let idx = stack as usize;
        let val = self.st[idx];
        self.st[idx] = self.stacks[idx][self.stack_ptrs[idx] as usize];
        self.stack_ptrs[idx] = self.stack_ptrs[idx].wrapping_sub(1) & STACK_MASK;
        val
    }

    pub fn stack_ptr(&self, stack: StackRegister) -> u8 {
        self.stack_ptrs[stack as usize]
    }

    /// Reads a register by its 5-bit architectural index; stack indices pop
    pub fn op_read_register(&mut self, reg: u8) -> u16 {
        let reg = reg & REG_MASK;
        match reg {
            REG_ST0..=REG_ST3 => self.pop_stack(StackRegister::from_index(reg - REG_ST0)),
            REG_AR0..=REG_AR3 => self.ar[(reg - REG_AR0) as usize],
            REG_IX0..=REG_IX3 => self.ix[(reg - REG_IX0) as usize],
            REG_WR0..=REG_WR3 => self.wr[(reg - REG_WR0) as usize],
            REG_ACH0 | REG_ACH1 => self.ac[(reg - REG_ACH0) as usize].h,
            REG_CR => self.cr,
            REG_SR => self.sr,
            REG_PRODL => self.prod.l,
            REG_PRODM => self.prod.m,
            REG_PRODH => self.prod.h,
            REG_PRODM2 => self.prod.m2,
            REG_AXL0 | REG_AXL1 => self.ax[(reg - REG_AXL0) as usize].l,
            REG_AXH0 | REG_AXH1 => self.ax[(reg - REG_AXH0) as usize].h,
            REG_ACL0 | REG_ACL1 => self.ac[(reg - REG_ACL0) as usize].l,
            REG_ACM0 | REG_ACM1 => self.ac[(reg - REG_ACM0) as usize].m,
            _ => unreachable!("register index {:#04x} out of range", reg),
        }
    }

    /// Writes a register by index; stack indices push, ac.h sign-extends from 8 bits
    pub fn op_write_register(&mut self, reg: u8, val: u16) {
        let reg = reg & REG_MASK;
        match reg {
            REG_ACH0 | REG_ACH1 => self.ac[(reg - REG_ACH0) as usize].h = sext8(val),
            REG_ST0..=REG_ST3 => self.push_stack(StackRegister::from_index(reg - REG_ST0), val),
            REG_AR0..=REG_AR3 => self.ar[(reg - REG_AR0) as usize] = val,
            REG_IX0..=REG_IX3 => self.ix[(reg - REG_IX0) as usize] = val,
            REG_WR0..=REG_WR3 => self.wr[(reg - REG_WR0) as usize] = val,
            REG_CR => self.cr = val,
            REG_SR => self.sr = val,
            REG_PRODL => self.prod.l = val,
            REG_PRODM => self.prod.m = val,
            REG_PRODH => self.prod.h = val,
            REG_PRODM2 => self.prod.m2 = val,
            REG_AXL0 | REG_AXL1 => self.ax[(reg - REG_AXL0) as usize].l = val,
            REG_AXH0 | REG_AXH1 => self.ax[(reg - REG_AXH0) as usize].h = val,
            REG_ACL0 | REG_ACL1 => self.ac[(reg - REG_ACL0) as usize].l = val,
            REG_ACM0 | REG_ACM1 => self.ac[(reg - REG_ACM0) as usize].m = val,
            _ => unreachable!("register index {:#04x} out of range", reg),
        }
    }

    /// Mid window of accumulator acc, clamped to 16 bits when 40-bit mode is on
    pub fn op_read_register_and_saturate(&self, acc: usize) -> u16 {
        if self.is_sr_flag_set(SR_40_MODE_BIT) {
            let val = self.get_long_acc(acc);
            if val != val as i32 as i64 {
                return if val > 0 { 0x7FFF } else { 0x8000 };
            }
        }
        self.ac[acc].m
    }

    /// A write to ac.m in 40-bit mode extends through the whole accumulator
    pub fn conditional_extend_accum(&mut self, reg: u8) {
        if reg != REG_ACM0 && reg != REG_ACM1 {
            return;
        }
        if !self.is_sr_flag_set(SR_40_MODE_BIT) {
            return;
        }

        let acc = &mut self.ac[(reg - REG_ACM0) as usize];
        acc.h = if acc.m & 0x8000 != 0 { 0xFFFF } else { 0x0000 };
        acc.l = 0;
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod register_tests {
    use super::*;

    #[test]
    fn test_reset_state() {
        let regs = Registers::new();
        assert_eq!(regs.wr, [0xFFFF; 4]);
        assert!(regs.is_sr_flag_set(SR_INT_ENABLE));
        assert!(regs.is_sr_flag_set(SR_EXT_INT_ENABLE));
    }

    #[test]
    fn test_stack_push_pop() {
        let mut regs = Registers::new();
        regs.push_stack(StackRegister::Call, 0x1111);
        regs.push_stack(StackRegister::Call, 0x2222);
        assert_eq!(regs.st[0], 0x2222);
        assert_eq!(regs.stack_ptr(StackRegister::Call), 2);

        assert_eq!(regs.pop_stack(StackRegister::Call), 0x2222);
        assert_eq!(regs.st[0], 0x1111);
        assert_eq!(regs.pop_stack(StackRegister::Call), 0x1111);
        assert_eq!(regs.stack_ptr(StackRegister::Call), 0);
    }

    #[test]
    fn test_stack_pointer_wraps() {
        let mut regs = Registers::new();
        for i in 0..33 {
            regs.push_stack(StackRegister::Data, i);
        }
        assert_eq!(regs.stack_ptr(StackRegister::Data), 1);
        assert_eq!(regs.st[1], 32);
    }

    #[test]
    fn test_stack_registers_by_index() {
        let mut regs = Registers::new();
        regs.op_write_register(REG_ST2, 0x0040);
        regs.op_write_register(REG_ST3, 0x0003);
        assert_eq!(regs.st[2], 0x0040);
        assert_eq!(regs.op_read_register(REG_ST3), 0x0003);
        assert_eq!(regs.st[3], 0x0000);
    }

    #[test]
    fn test_ach_write_sign_extends() {
        let mut regs = Registers::new();
        regs.op_write_register(REG_ACH1, 0x0080);
        assert_eq!(regs.ac[1].h, 0xFF80);
        regs.op_write_register(REG_ACH1, 0xAB7F);
        assert_eq!(regs.op_read_register(REG_ACH1), 0x007F);
    }

    #[test]
    fn test_every_index_round_trips() {
        let mut regs = Registers::new();
        for reg in REG_ACH0..=REG_ACM1 {
            regs.op_write_register(reg, 0x0042);
            assert_eq!(regs.op_read_register(reg), 0x0042, "reg {:#x}", reg);
        }
        for reg in REG_AR0..=REG_WR3 {
            regs.op_write_register(reg, 0x1234);
            assert_eq!(regs.op_read_register(reg), 0x1234, "reg {:#x}", reg);
        }
    }

    #[test]
    fn test_conditional_extend() {
        let mut regs = Registers::new();
        regs.ac[0].l = 0x5555;
        regs.ac[0].m = 0x8001;
        regs.conditional_extend_accum(REG_ACM0);
        assert_eq!(regs.ac[0].h, 0x0000); // 16-bit mode leaves it alone
        assert_eq!(regs.ac[0].l, 0x5555);

        regs.set_sr_flag(SR_40_MODE_BIT);
        regs.conditional_extend_accum(REG_ACM0);
        assert_eq!(regs.ac[0].h, 0xFFFF);
        assert_eq!(regs.ac[0].l, 0x0000);

        regs.ac[1].l = 0x1234;
        regs.conditional_extend_accum(REG_ACL1);
        assert_eq!(regs.ac[1].l, 0x1234);
    }

    #[test]
    fn test_saturating_read() {
        let mut regs = Registers::new();
        regs.set_long_acc(0, 0x0001_2345_6789);
        assert_eq!(regs.op_read_register_and_saturate(0), 0x2345);

        regs.set_sr_flag(SR_40_MODE_BIT);
        assert_eq!(regs.op_read_register_and_saturate(0), 0x7FFF);
        regs.set_long_acc(0, -0x0001_2345_6789);
        assert_eq!(regs.op_read_register_and_saturate(0), 0x8000);
        regs.set_long_acc(0, 0x1234_0000);
        assert_eq!(regs.op_read_register_and_saturate(0), 0x1234);
    }
}
