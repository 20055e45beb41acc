use crate::state::DspState;

/// Instruction address breakpoints consulted by the debug run loop
pub trait BreakpointCheck {
    fn is_address_breakpoint(&self, addr: u16) -> bool;
}

/// Exception and interrupt delivery, queried at the start of every step
pub trait InterruptController {
    /// Service pending exceptions (may redirect pc)
    fn check_exceptions(&mut self, state: &mut DspState);

    /// Turn a waiting host interrupt into a pending exception
    fn check_external_interrupt(&mut self, state: &mut DspState);

    /// Anything that could move execution off an idle loop
    fn is_pending(&self, state: &DspState) -> bool;
}

/// Breakpoint source with nothing armed
pub struct NoBreakpoints;

impl BreakpointCheck for NoBreakpoints {
    fn is_address_breakpoint(&self, _addr: u16) -> bool {
        false
    }
}

/// Default exception delivery straight from the DSP's own pending mask
pub struct ExceptionUnit;

impl InterruptController for ExceptionUnit {
    fn check_exceptions(&mut self, state: &mut DspState) {
        state.check_exceptions();
    }

    fn check_external_interrupt(&mut self, state: &mut DspState) {
        state.check_external_interrupt();
    }

    fn is_pending(&self, state: &DspState) -> bool {
        state.exceptions != 0 || state.external_interrupt_waiting
    }
}
