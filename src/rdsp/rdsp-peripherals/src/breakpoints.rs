use heapless::FnvIndexSet;
use rdsp_core::memory::mods::BreakpointCheck;

const MAX_BREAKPOINTS: usize = 64;

/// Fixed-capacity set of instruction address breakpoints
pub struct BreakpointList {
    addrs: FnvIndexSet<u16, MAX_BREAKPOINTS>,
}

impl BreakpointList {
    pub fn new() -> Self {
        BreakpointList {
            addrs: FnvIndexSet::new(),
        }
    }

    pub fn add(&mut self, addr: u16) -> Result<(), &'static str> {
        match self.addrs.insert(addr) {
            Ok(_) => Ok(()),
            Err(_) => Err("Too many breakpoints"),
        }
    }

    pub fn remove(&mut self, addr: u16) -> bool {
        self.addrs.remove(&addr)
    }

    pub fn clear(&mut self) {
        self.addrs.clear();
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }
}

impl Default for BreakpointList {
    fn default() -> Self {
        Self::new()
    }
}

impl BreakpointCheck for BreakpointList {
    fn is_address_breakpoint(&self, addr: u16) -> bool {
        self.addrs.contains(&addr)
    }
}
