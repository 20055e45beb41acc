use crossbeam_channel::{unbounded, Receiver, Sender};
use std::time::Duration;

use log::debug;
use rdsp_core::constants::control::CR_EXTERNAL_INT;
use rdsp_core::memory::mods::InterruptController;
use rdsp_core::state::DspState;

/// Host-side interrupt line. Every message on the channel raises the
/// DSP's external interrupt.
pub struct HostInterruptLine {
    rx: Receiver<()>,
    raised: u64,
}

// Raises the line once per period until the receiving side goes away
fn ticker_thread(tx: Sender<()>, period: Duration) {
    loop {
        std::thread::sleep(period);
        if tx.send(()).is_err() {
            break;
        }
    }
}

impl HostInterruptLine {
    pub fn new() -> (Self, Sender<()>) {
        let (tx, rx) = unbounded();
        (HostInterruptLine { rx, raised: 0 }, tx)
    }

    /// Line driven by a background thread at a fixed period
    pub fn with_ticker(period: Duration) -> Self {
        let (line, tx) = Self::new();
        std::thread::spawn(move || ticker_thread(tx, period));
        line
    }

    /// Interrupt requests received so far
    pub fn raised(&self) -> u64 {
        self.raised
    }

    fn drain(&mut self) -> bool {
        let mut any = false;
        while self.rx.try_recv().is_ok() {
            self.raised += 1;
            any = true;
        }
        any
    }
}

impl InterruptController for HostInterruptLine {
    fn check_exceptions(&mut self, state: &mut DspState) {
        if self.drain() {
            state.control_reg |= CR_EXTERNAL_INT;
            state.set_external_interrupt(true);
        }

        if state.external_interrupt_waiting {
            state.check_external_interrupt();
            // Stays waiting while the DSP masks external interrupts
            if state.control_reg & CR_EXTERNAL_INT == 0 {
                debug!("Host interrupt delivered at {:04x}", state.pc);
                state.set_external_interrupt(false);
            }
        }

        state.check_exceptions();
    }

    fn check_external_interrupt(&mut self, state: &mut DspState) {
        state.check_external_interrupt();
    }

    fn is_pending(&self, state: &DspState) -> bool {
        !self.rx.is_empty() || state.exceptions != 0 || state.external_interrupt_waiting
    }
}
