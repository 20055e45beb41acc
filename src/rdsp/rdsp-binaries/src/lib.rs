#![no_std]

/// Built-in ucode image: where it loads and where execution starts
pub struct Ucode {
    pub name: &'static str,
    pub base: u16,
    pub entry: u16,
    pub words: &'static [u16],
}

/// Loads a constant then parks on a jump to itself
pub static IDLE_SPIN: Ucode = Ucode {
    name: "idle",
    base: 0x0000,
    entry: 0x0000,
    words: &[
        0x0E05, // LRIS   $ac0.m, #5
        0x029F, // JMP    0x0001
        0x0001,
    ],
};

/// Four multiply-accumulate rounds of 3 * 7, result moved to $ac0
pub static MAC: Ucode = Ucode {
    name: "mac",
    base: 0x0000,
    entry: 0x0000,
    words: &[
        0x8100, // CLR    $ac0
        0x0098, // LRI    $ax0.l, #3
        0x0003,
        0x009A, // LRI    $ax0.h, #7
        0x0007,
        0x8400, // CLRP
        0x1104, // BLOOPI #4, 0x0008
        0x0008,
        0xF200, // MADD   $ax0.l, $ax0.h
        0x6E00, // MOVP   $ac0
        0x0021, // HALT
    ],
};

/// Counts $ac0.m down from 16 to zero
pub static COUNTDOWN: Ucode = Ucode {
    name: "countdown",
    base: 0x0000,
    entry: 0x0000,
    words: &[
        0x009E, // LRI    $ac0.m, #0x0010
        0x0010,
        0x04FF, // ADDIS  $ac0, #-1
        0x0294, // JNZ    0x0002
        0x0002,
        0x0021, // HALT
    ],
};

pub static ALL: [&Ucode; 3] = [&IDLE_SPIN, &MAC, &COUNTDOWN];

pub fn find(name: &str) -> Option<&'static Ucode> {
    ALL.iter().copied().find(|u| u.name == name)
}
