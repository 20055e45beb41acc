// Instruction memory covers the whole 16-bit address space
pub const IMEM_SIZE: usize = 0x10000;

// Where execution resumes after a control register reset
pub const DSP_RESET_VECTOR: u16 = 0x8000;

// Each stack register fronts a 32-deep circular stack
pub const STACK_DEPTH: usize = 0x20;
pub const STACK_MASK: u8 = 0x1F;

// Capacity of the extended-slot write-back log
pub const WRITE_BACK_LOG_SIZE: usize = 4;

pub mod registers {
    // Architectural register indices (5-bit field in the instruction word)
    pub const REG_AR0: u8 = 0x00;
    pub const REG_AR1: u8 = 0x01;
    pub const REG_AR2: u8 = 0x02;
    pub const REG_AR3: u8 = 0x03;
    pub const REG_IX0: u8 = 0x04;
    pub const REG_IX1: u8 = 0x05;
    pub const REG_IX2: u8 = 0x06;
    pub const REG_IX3: u8 = 0x07;
    pub const REG_WR0: u8 = 0x08;
    pub const REG_WR1: u8 = 0x09;
    pub const REG_WR2: u8 = 0x0A;
    pub const REG_WR3: u8 = 0x0B;
    pub const REG_ST0: u8 = 0x0C;
    pub const REG_ST1: u8 = 0x0D;
    pub const REG_ST2: u8 = 0x0E;
    pub const REG_ST3: u8 = 0x0F;
    pub const REG_ACH0: u8 = 0x10;
    pub const REG_ACH1: u8 = 0x11;
    pub const REG_CR: u8 = 0x12;
    pub const REG_SR: u8 = 0x13;
    pub const REG_PRODL: u8 = 0x14;
    pub const REG_PRODM: u8 = 0x15;
    pub const REG_PRODH: u8 = 0x16;
    pub const REG_PRODM2: u8 = 0x17;
    pub const REG_AXL0: u8 = 0x18;
    pub const REG_AXL1: u8 = 0x19;
    pub const REG_AXH0: u8 = 0x1A;
    pub const REG_AXH1: u8 = 0x1B;
    pub const REG_ACL0: u8 = 0x1C;
    pub const REG_ACL1: u8 = 0x1D;
    pub const REG_ACM0: u8 = 0x1E;
    pub const REG_ACM1: u8 = 0x1F;

    pub const REG_MASK: u8 = 0x1F;
}

pub mod status {
    // Status register bits
    pub const SR_CARRY: u16 = 0x0001;
    pub const SR_OVERFLOW: u16 = 0x0002;
    pub const SR_ARITH_ZERO: u16 = 0x0004;
    pub const SR_SIGN: u16 = 0x0008;
    pub const SR_OVER_S32: u16 = 0x0010;
    pub const SR_TOP2BITS: u16 = 0x0020;
    pub const SR_LOGIC_ZERO: u16 = 0x0040;
    pub const SR_OVERFLOW_STICKY: u16 = 0x0080;
    pub const SR_INT_ENABLE: u16 = 0x0200;
    pub const SR_EXT_INT_ENABLE: u16 = 0x0800;
    pub const SR_MUL_MODIFY: u16 = 0x2000;
    pub const SR_40_MODE_BIT: u16 = 0x4000;
    pub const SR_MUL_UNSIGNED: u16 = 0x8000;

    // Flags rewritten by every arithmetic status update
    pub const SR_CMP_MASK: u16 = 0x003F;
}

pub mod control {
    // Host-side control register (not the architectural $CR)
    pub const CR_RESET: u16 = 0x0001;
    pub const CR_EXTERNAL_INT: u16 = 0x0002;
    pub const CR_HALT: u16 = 0x0004;
    pub const CR_INIT: u16 = 0x0800;

    // Exact value a host writes to request init
    pub const CR_INIT_REQUEST: u16 = 0x0004;
}

pub mod exceptions {
    pub const EXP_STACK_OVERFLOW: u8 = 1;
    pub const EXP_2: u8 = 2;
    pub const EXP_3: u8 = 3;
    pub const EXP_4: u8 = 4;
    pub const EXP_ACCELERATOR_OVERFLOW: u8 = 5;
    pub const EXP_EXTERNAL_INTERRUPT: u8 = 7;
}

pub mod code_flags {
    // Per-address analysis bits
    pub const CODE_NONE: u8 = 0x00;
    pub const CODE_START_OF_INST: u8 = 0x01;
    pub const CODE_IDLE_SKIP: u8 = 0x02;
    pub const CODE_LOOP_START: u8 = 0x04;
    pub const CODE_LOOP_END: u8 = 0x08;
    pub const CODE_UPDATE_SR: u8 = 0x10;
    pub const CODE_CHECK_EXC: u8 = 0x20;
}

pub mod conditions {
    // 4-bit condition codes used by Jcc, CALLcc, RETcc, IFcc, JRcc
    pub const COND_GE: u8 = 0x0;
    pub const COND_L: u8 = 0x1;
    pub const COND_G: u8 = 0x2;
    pub const COND_LE: u8 = 0x3;
    pub const COND_NZ: u8 = 0x4;
    pub const COND_Z: u8 = 0x5;
    pub const COND_NC: u8 = 0x6;
    pub const COND_C: u8 = 0x7;
    pub const COND_NOT_OVER_S32: u8 = 0x8;
    pub const COND_OVER_S32: u8 = 0x9;
    pub const COND_A: u8 = 0xA;
    pub const COND_NOT_A: u8 = 0xB;
    pub const COND_LNZ: u8 = 0xC;
    pub const COND_LZ: u8 = 0xD;
    pub const COND_O: u8 = 0xE;
    pub const COND_ALWAYS: u8 = 0xF;
}
