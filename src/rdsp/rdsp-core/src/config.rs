use crate::constants::DSP_RESET_VECTOR;

/// Runtime options for a DSP instance
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DspConfig {
    pub precise_write_back: bool, // OR extended-slot writes into current register values
    pub reset_vector: u16,        // pc after a control register reset
}

impl Default for DspConfig {
    fn default() -> Self {
        Self {
            precise_write_back: cfg!(feature = "precise-backlog"),
            reset_vector: DSP_RESET_VECTOR,
        }
    }
}

impl DspConfig {
    pub fn precise(mut self, precise: bool) -> Self {
        self.precise_write_back = precise;
        self
    }

    pub fn reset_vector(mut self, vector: u16) -> Self {
        self.reset_vector = vector;
        self
    }
}
