use crate::config::DspConfig;
use crate::constants::control::*;
use crate::constants::exceptions::EXP_EXTERNAL_INTERRUPT;
use crate::constants::status::{SR_EXT_INT_ENABLE, SR_INT_ENABLE};
use crate::instructions::instruction_size;
use crate::memory::{InstructionMemory, Registers, StackRegister, WriteBackLog};
use log::debug;

/// Coarse execution state seen by the host
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CoreState {
    Stopped,
    Running,
    Stepping,
}

/// Everything an instruction handler may touch
pub struct DspState {
    pub r: Registers,
    pub pc: u16,
    pub step_counter: u64,

    pub control_reg: u16,                 // Host-side control register
    pub exceptions: u8,                   // Pending exception bits 1..=7
    pub external_interrupt_waiting: bool, // Host raised an interrupt not yet delivered
    pub init_hax: bool,                   // Host wrote the init pattern
    pub core_state: CoreState,

    pub imem: InstructionMemory,
    pub write_back: WriteBackLog,

    reset_vector: u16,
}

impl DspState {
    pub fn new(config: &DspConfig) -> Self {
        Self {
            r: Registers::new(),
            pc: config.reset_vector,
            step_counter: 0,
            control_reg: CR_INIT | CR_HALT,
            exceptions: 0,
            external_interrupt_waiting: false,
            init_hax: false,
            core_state: CoreState::Stopped,
            imem: InstructionMemory::new(),
            write_back: WriteBackLog::new(config.precise_write_back),
            reset_vector: config.reset_vector,
        }
    }

    /// Returns registers, stacks and pending exceptions to power-on state.
    /// Instruction memory is kept.
    pub fn reset(&mut self) {
        self.r.reset();
        self.pc = self.reset_vector;
        self.exceptions = 0;
        self.external_interrupt_waiting = false;
        self.write_back.clear();
    }

    pub fn reset_vector(&self) -> u16 {
        self.reset_vector
    }

    pub fn is_halted(&self) -> bool {
        self.control_reg & CR_HALT != 0
    }

    pub fn read_imem(&self, addr: u16) -> u16 {
        self.imem.read(addr)
    }

    /// Reads the word at pc and advances past it
    pub fn fetch_instruction(&mut self) -> u16 {
        let opc = self.imem.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        opc
    }

    /// Steps pc over the instruction it points at
    pub fn skip_instruction(&mut self) {
        let size = instruction_size(self.imem.read(self.pc));
        self.pc = self.pc.wrapping_add(size as u16);
    }

    // Write-back log shortcuts for handlers

    pub fn write_to_back_log(&mut self, reg: u8, value: u16) {
        self.write_back.push(reg, value);
    }

    pub fn apply_write_back(&mut self) {
        self.write_back.apply(&mut self.r);
    }

    pub fn zero_write_back(&mut self) {
        self.write_back.zero(&mut self.r);
    }

    pub fn zero_write_back_preserve_acc(&mut self, acc: u8) {
        self.write_back.zero_preserve_acc(&mut self.r, acc);
    }

    // Exceptions

    pub fn set_exception(&mut self, exception: u8) {
        self.exceptions |= 1 << exception;
    }

    pub fn set_external_interrupt(&mut self, waiting: bool) {
        self.external_interrupt_waiting = waiting;
    }

    /// Promotes a host interrupt to exception 7 if the DSP accepts it
    pub fn check_external_interrupt(&mut self) {
        if !self.r.is_sr_flag_set(SR_EXT_INT_ENABLE) {
            return;
        }
        self.set_exception(EXP_EXTERNAL_INTERRUPT);
        self.control_reg &= !CR_EXTERNAL_INT;
    }

    /// Vectors to the highest pending exception that is allowed to fire
    pub fn check_exceptions(&mut self) {
        if self.exceptions == 0 {
            return;
        }

        for i in (1..=7u8).rev() {
            if self.exceptions & (1 << i) == 0 {
                continue;
            }

            // The external interrupt ignores the global enable
            if self.r.is_sr_flag_set(SR_INT_ENABLE) || i == EXP_EXTERNAL_INTERRUPT {
                let sr = self.r.sr;
                self.r.push_stack(StackRegister::Call, self.pc);
                self.r.push_stack(StackRegister::Data, sr);

                debug!("Exception {} taken at {:04x}", i, self.pc);
                self.pc = i as u16 * 2;
                self.exceptions &= !(1 << i);
                if i == EXP_EXTERNAL_INTERRUPT {
                    self.r.clear_sr_flag(SR_EXT_INT_ENABLE);
                } else {
                    self.r.clear_sr_flag(SR_INT_ENABLE);
                }
                break;
            }
            debug!("Exception {} masked", i);
        }
    }

    /// Loop bookkeeping after executing the last word of a loop body
    pub fn handle_loop(&mut self) {
        let call_address = self.r.st[0];
        let loop_address = self.r.st[2];

        if loop_address == 0 || self.r.st[3] == 0 {
            return;
        }
        if self.pc.wrapping_sub(1) != loop_address {
            return;
        }

        self.r.st[3] -= 1;
        if self.r.st[3] > 0 {
            self.pc = call_address;
        } else {
            debug!("Loop at {:04x} done", loop_address);
            self.r.pop_stack(StackRegister::Call);
            self.r.pop_stack(StackRegister::LoopAddress);
            self.r.pop_stack(StackRegister::LoopCounter);
        }
    }
}

#[cfg(test)]
mod state_tests {
    use super::*;
    use crate::constants::exceptions::*;

    fn state() -> DspState {
        DspState::new(&DspConfig::default().reset_vector(0x0000))
    }

    #[test]
    fn test_fresh_state() {
        let st = DspState::new(&DspConfig::default());
        assert_eq!(st.pc, 0x8000);
        assert!(st.is_halted());
        assert_eq!(st.control_reg & CR_INIT, CR_INIT);
        assert_eq!(st.core_state, CoreState::Stopped);
    }

    #[test]
    fn test_fetch_wraps_pc() {
        let mut st = state();
        st.imem.write(0xFFFF, 0xABCD);
        st.pc = 0xFFFF;
        assert_eq!(st.fetch_instruction(), 0xABCD);
        assert_eq!(st.pc, 0x0000);
    }

    #[test]
    fn test_skip_two_word_instruction() {
        let mut st = state();
        st.imem.load(0x0010, &[0x0290, 0x1234, 0x0000]).unwrap();
        st.pc = 0x0010;
        st.skip_instruction();
        assert_eq!(st.pc, 0x0012);
        st.skip_instruction();
        assert_eq!(st.pc, 0x0013);
    }

    #[test]
    fn test_exception_vectors_and_pushes() {
        let mut st = state();
        st.pc = 0x0123;
        st.r.sr |= 0x0001;
        let sr = st.r.sr;
        st.set_exception(EXP_3);
        st.check_exceptions();

        assert_eq!(st.pc, 0x0006);
        assert_eq!(st.r.st[0], 0x0123);
        assert_eq!(st.r.st[1], sr);
        assert_eq!(st.exceptions, 0);
        assert!(!st.r.is_sr_flag_set(SR_INT_ENABLE));
    }

    #[test]
    fn test_highest_exception_wins() {
        let mut st = state();
        st.set_exception(EXP_2);
        st.set_exception(EXP_ACCELERATOR_OVERFLOW);
        st.check_exceptions();
        assert_eq!(st.pc, 0x000A);
        assert_eq!(st.exceptions, 1 << EXP_2);
    }

    #[test]
    fn test_masked_exception_waits() {
        let mut st = state();
        st.pc = 0x0040;
        st.r.clear_sr_flag(SR_INT_ENABLE);
        st.set_exception(EXP_STACK_OVERFLOW);
        st.check_exceptions();
        assert_eq!(st.pc, 0x0040);
        assert_eq!(st.exceptions, 1 << EXP_STACK_OVERFLOW);
    }

    #[test]
    fn test_external_interrupt_ignores_int_enable() {
        let mut st = state();
        st.r.clear_sr_flag(SR_INT_ENABLE);
        st.control_reg |= CR_EXTERNAL_INT;
        st.check_external_interrupt();
        assert_eq!(st.control_reg & CR_EXTERNAL_INT, 0);

        st.check_exceptions();
        assert_eq!(st.pc, 0x000E);
        assert!(!st.r.is_sr_flag_set(SR_EXT_INT_ENABLE));

        // Now masked: a second request stays waiting in the control register
        st.control_reg |= CR_EXTERNAL_INT;
        st.check_external_interrupt();
        assert_eq!(st.exceptions, 0);
        assert_eq!(st.control_reg & CR_EXTERNAL_INT, CR_EXTERNAL_INT);
    }

    #[test]
    fn test_handle_loop_repeats_then_pops() {
        let mut st = state();
        st.r.push_stack(StackRegister::Call, 0x0020);
        st.r.push_stack(StackRegister::LoopAddress, 0x0021);
        st.r.push_stack(StackRegister::LoopCounter, 2);

        st.pc = 0x0022;
        st.handle_loop();
        assert_eq!(st.pc, 0x0020);
        assert_eq!(st.r.st[3], 1);

        st.pc = 0x0022;
        st.handle_loop();
        assert_eq!(st.pc, 0x0022);
        assert_eq!(st.r.st, [0, 0, 0, 0]);
    }

    #[test]
    fn test_handle_loop_ignores_other_addresses() {
        let mut st = state();
        st.r.push_stack(StackRegister::LoopAddress, 0x0030);
        st.r.push_stack(StackRegister::LoopCounter, 5);
        st.pc = 0x0040;
        st.handle_loop();
        assert_eq!(st.r.st[3], 5);
    }

    #[test]
    fn test_reset_keeps_memory() {
        let mut st = state();
        st.imem.write(0x0000, 0x0021);
        st.r.ar[0] = 0x1234;
        st.set_exception(EXP_4);
        st.pc = 0x0100;
        st.reset();
        assert_eq!(st.pc, 0x0000);
        assert_eq!(st.r.ar[0], 0);
        assert_eq!(st.exceptions, 0);
        assert_eq!(st.imem.read(0x0000), 0x0021);
    }
}
