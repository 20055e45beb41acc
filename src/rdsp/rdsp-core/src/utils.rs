// Mask covering the 40 architectural accumulator bits
pub const MASK_40: u64 = 0x00FF_FFFF_FFFF;

// Sign-extends the low 8 bits into a full 16-bit word
pub fn sext8(value: u16) -> u16 {
    value as u8 as i8 as i16 as u16
}

// Sign-extends a 40-bit quantity held in an i64
pub fn sext40(value: i64) -> i64 {
    (value << 24) >> 24
}

// Address register + 1, wrapping inside the region described by wr
pub fn increment_address(ar: u16, wr: u16) -> u16 {
    let ar = ar as u32;
    let wr = wr as u32;
    let mut nar = ar.wrapping_add(1);

    if (nar ^ ar) > ((wr | 1) << 1) {
        nar = nar.wrapping_sub(wr + 1);
    }
    nar as u16
}

// Address register - 1, wrapping inside the region described by wr
pub fn decrement_address(ar: u16, wr: u16) -> u16 {
    let ar = ar as u32;
    let wr = wr as u32;
    let mut nar = ar.wrapping_add(wr);

    if ((nar ^ ar) & ((wr | 1) << 1)) > wr {
        nar = nar.wrapping_sub(wr + 1);
    }
    nar as u16
}

// Address register + signed index register
pub fn increase_address(ar: u16, wr: u16, ix: i16) -> u16 {
    let ar = ar as u32;
    let wr = wr as u32;
    let ix = ix as i32 as u32;

    let mx = (wr | 1) << 1;
    let mut nar = ar.wrapping_add(ix);
    let dar = (nar ^ ar ^ ix) & mx;

    if (ix as i32) >= 0 {
        if dar > wr {
            nar = nar.wrapping_sub(wr + 1); // overflow
        }
    } else if ((nar.wrapping_add(wr + 1) ^ nar) & dar) <= wr {
        nar = nar.wrapping_add(wr + 1); // underflow or below the region floor
    }
    nar as u16
}

// Address register - signed index register
pub fn decrease_address(ar: u16, wr: u16, ix: i16) -> u16 {
    let ar = ar as u32;
    let wr = wr as u32;
    let ix = ix as i32 as u32;

    let mx = (wr | 1) << 1;
    let mut nar = ar.wrapping_sub(ix);
    let dar = (nar ^ ar ^ !ix) & mx;

    // Negative index other than -0x8000
    if ix > 0xFFFF_8000 {
        if dar > wr {
            nar = nar.wrapping_sub(wr + 1);
        }
    } else if ((nar.wrapping_add(wr + 1) ^ nar) & dar) <= wr {
        nar = nar.wrapping_add(wr + 1);
    }
    nar as u16
}

// Carry out of bit 39 after an addition producing res
pub fn is_carry_add(val: i64, res: i64) -> bool {
    (val as u64 & MASK_40) > (res as u64 & MASK_40)
}

// Carry (no borrow) out of bit 39 after a subtraction producing res
pub fn is_carry_sub(val: i64, res: i64) -> bool {
    (val as u64 & MASK_40) >= (res as u64 & MASK_40)
}

pub fn is_overflow(val1: i64, val2: i64, res: i64) -> bool {
    ((val1 ^ res) & (val2 ^ res)) < 0
}

pub fn is_over_s32(acc: i64) -> bool {
    acc != acc as i32 as i64
}
