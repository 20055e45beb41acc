use crate::analyzer::{Analyzer, CodeFlagMap};
use crate::config::DspConfig;
use crate::constants::control::*;
use crate::decoder::OpcodeTable;
use crate::memory::mods::{BreakpointCheck, InterruptController};
use crate::state::{CoreState, DspState};
use log::{debug, info};

// Steps run before idle detection kicks in, so code gets a chance to move
const WARMUP_STEPS: u32 = 8;
// Idle-aware burst followed by a longer unchecked one
const IDLE_BURST_STEPS: u32 = 8;
const FREE_BURST_STEPS: u32 = 200;

/// Instruction interpreter: DSP state, its code analysis and the
/// collaborators consulted while stepping
pub struct Interpreter<'a> {
    pub state: DspState,
    analyzer: Analyzer,

    table: &'a dyn OpcodeTable,
    breakpoints: &'a dyn BreakpointCheck,
    interrupts: &'a mut dyn InterruptController,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        config: &DspConfig,
        table: &'a dyn OpcodeTable,
        breakpoints: &'a dyn BreakpointCheck,
        interrupts: &'a mut dyn InterruptController,
    ) -> Interpreter<'a> {
        let mut dsp = Interpreter {
            state: DspState::new(config),
            analyzer: Analyzer::new(),
            table,
            breakpoints,
            interrupts,
        };
        dsp.analyze();
        dsp
    }

    pub fn flags(&self) -> &CodeFlagMap {
        self.analyzer.flags()
    }

    /// Rebuilds the code flags from the current instruction memory
    pub fn analyze(&mut self) {
        self.analyzer.analyze(&self.state.imem, self.table);
    }

    /// Copies words into instruction memory and re-runs the analysis
    pub fn load_image(&mut self, base: u16, words: &[u16]) -> Result<(), &'static str> {
        self.state.imem.load(base, words)?;
        self.analyze();
        Ok(())
    }

    /// Same as load_image for a big-endian byte image
    pub fn load_image_bytes(&mut self, base: u16, bytes: &[u8]) -> Result<(), &'static str> {
        self.state.imem.load_bytes(base, bytes)?;
        self.analyze();
        Ok(())
    }

    /// Starts execution at entry with the halt bit released
    pub fn boot(&mut self, entry: u16) {
        self.state.pc = entry;
        self.state.control_reg &= !CR_HALT;
        self.state.core_state = CoreState::Running;
        debug!("Booting at {:04x}", entry);
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.analyze();
    }

    // Host control register

    pub fn write_cr(&mut self, val: u16) {
        let mut val = val;
        if val & CR_RESET != 0 {
            info!("DSP control: reset");
            self.reset();
            val &= !CR_RESET;
        } else if val == CR_INIT_REQUEST {
            info!("DSP control: init");
            self.state.init_hax = true;
            val |= CR_INIT;
        }
        self.state.control_reg = val;
    }

    pub fn read_cr(&mut self) -> u16 {
        if self.state.pc & 0x8000 != 0 {
            self.state.control_reg |= CR_INIT;
        } else {
            self.state.control_reg &= !CR_INIT;
        }
        self.state.control_reg
    }

    pub fn set_external_interrupt(&mut self, waiting: bool) {
        self.state.set_external_interrupt(waiting);
    }

    pub fn external_interrupt_waiting(&self) -> bool {
        self.state.external_interrupt_waiting
    }

    pub fn set_exception(&mut self, exception: u8) {
        self.state.set_exception(exception);
    }

    // Execution

    fn execute_instruction(&mut self, inst: u16) {
        let table = self.table;
        let template = table.op_template(inst);

        if template.extended {
            (table.ext_op(inst))(&mut self.state, inst);
        }
        (template.handler)(&mut self.state, inst);
        if template.extended {
            self.state.apply_write_back();
        }
    }

    /// Executes a single instruction
    pub fn step(&mut self) {
        self.interrupts.check_exceptions(&mut self.state);
        self.state.step_counter += 1;

        let inst = self.state.fetch_instruction();
        self.execute_instruction(inst);

        if self.analyzer.flags().is_loop_end(self.state.pc.wrapping_sub(1)) {
            self.state.handle_loop();
        }
    }

    // Some(remaining) when the batch has to stop before the next step
    fn interrupted(&mut self, cycles: u32, check_breakpoints: bool, skip_idle: bool) -> Option<u32> {
        if self.state.is_halted() {
            return Some(0);
        }
        if check_breakpoints && self.breakpoints.is_address_breakpoint(self.state.pc) {
            debug!("Breakpoint at {:04x}", self.state.pc);
            self.state.core_state = CoreState::Stepping;
            return Some(cycles);
        }
        if skip_idle && self.analyzer.flags().is_idle_skip(self.state.pc) {
            return Some(cycles);
        }
        if cycles == 0 {
            return Some(0);
        }
        None
    }

    fn run_bursts(&mut self, cycles: u32, debug: bool) -> u32 {
        let mut cycles = cycles;

        // Already parked on an idle loop with nothing to wake it
        let skip_idle = !self.interrupts.is_pending(&self.state);
        if let Some(left) = self.interrupted(cycles, debug, skip_idle) {
            return left;
        }

        for _ in 0..WARMUP_STEPS {
            if let Some(left) = self.interrupted(cycles, debug, false) {
                return left;
            }
            self.step();
            cycles -= 1;
        }

        loop {
            for _ in 0..IDLE_BURST_STEPS {
                if let Some(left) = self.interrupted(cycles, debug, true) {
                    return left;
                }
                self.step();
                cycles -= 1;
            }

            for _ in 0..FREE_BURST_STEPS {
                if let Some(left) = self.interrupted(cycles, debug, false) {
                    return left;
                }
                self.step();
                cycles -= 1;
            }
        }
    }

    /// Runs up to cycles steps, skipping idle loops; returns unused cycles
    pub fn run_cycles(&mut self, cycles: u32) -> u32 {
        self.run_bursts(cycles, false)
    }

    /// As run_cycles, stopping in front of any breakpoint
    pub fn run_cycles_debug(&mut self, cycles: u32) -> u32 {
        self.run_bursts(cycles, true)
    }

    /// Runs until halt or budget, delivering host interrupts between steps
    pub fn run_cycles_thread(&mut self, cycles: u32) -> u32 {
        let mut cycles = cycles;
        loop {
            if self.state.is_halted() || cycles == 0 {
                return 0;
            }
            if self.state.external_interrupt_waiting {
                self.interrupts.check_external_interrupt(&mut self.state);
                self.state.set_external_interrupt(false);
            }
            self.step();
            cycles -= 1;
        }
    }
}
