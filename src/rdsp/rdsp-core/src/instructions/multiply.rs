use crate::state::DspState;
use crate::utils::sext40;

// Operand pair for MULX-style ops: ax0 low/high against ax1 low/high
fn mulx_operands(state: &DspState, sreg: u8, treg: u8) -> (u16, u16) {
    let val1 = if sreg == 0 { state.r.ax[0].l } else { state.r.ax[0].h };
    let val2 = if treg == 0 { state.r.ax[1].l } else { state.r.ax[1].h };
    (val1, val2)
}

// Adds the old product into acc r, then stores a fresh product
fn accumulate_and_store(state: &mut DspState, rreg: usize, prod: i64) {
    let acc = sext40(state.r.get_long_acc(rreg) + state.r.get_long_product());
    state.zero_write_back_preserve_acc(rreg as u8);
    state.r.set_long_acc(rreg, acc);
    state.r.set_long_product(prod);
    let res = state.r.get_long_acc(rreg);
    state.r.update_sr64(res, false, false);
}

// CLRP: the reset pattern of the product register, which reads as zero
pub fn clrp(state: &mut DspState, _opc: u16) {
    state.zero_write_back();
    state.r.prod.l = 0x0000;
    state.r.prod.m = 0xFFF0;
    state.r.prod.h = 0x00FF;
    state.r.prod.m2 = 0x0010;
}

// MUL $axS.l, $axS.h
pub fn mul(state: &mut DspState, opc: u16) {
    let sreg = ((opc >> 11) & 0x1) as usize;
    let prod = state.r.multiply(state.r.ax[sreg].l, state.r.ax[sreg].h, 0);
    state.zero_write_back();
    state.r.set_long_product(prod);
}

// MULAC $axS.l, $axS.h, $acR
pub fn mulac(state: &mut DspState, opc: u16) {
    let rreg = ((opc >> 8) & 0x1) as usize;
    let sreg = ((opc >> 11) & 0x1) as usize;
    let prod = state.r.multiply(state.r.ax[sreg].l, state.r.ax[sreg].h, 0);
    accumulate_and_store(state, rreg, prod);
}

// MULX $ax0.S, $ax1.T
pub fn mulx(state: &mut DspState, opc: u16) {
    let treg = ((opc >> 11) & 0x1) as u8;
    let sreg = ((opc >> 12) & 0x1) as u8;
    let (val1, val2) = mulx_operands(state, sreg, treg);
    let prod = state.r.multiply_mulx(sreg, treg, val1, val2);
    state.zero_write_back();
    state.r.set_long_product(prod);
}

// MULXAC $ax0.S, $ax1.T, $acR
pub fn mulxac(state: &mut DspState, opc: u16) {
    let rreg = ((opc >> 8) & 0x1) as usize;
    let treg = ((opc >> 11) & 0x1) as u8;
    let sreg = ((opc >> 12) & 0x1) as u8;
    let (val1, val2) = mulx_operands(state, sreg, treg);
    let prod = state.r.multiply_mulx(sreg, treg, val1, val2);
    accumulate_and_store(state, rreg, prod);
}

// MADDX $ax0.S, $ax1.T
pub fn maddx(state: &mut DspState, opc: u16) {
    let treg = ((opc >> 8) & 0x1) as u8;
    let sreg = ((opc >> 9) & 0x1) as u8;
    let (val1, val2) = mulx_operands(state, sreg, treg);
    let prod = state.r.multiply_add(val1, val2, 0);
    state.zero_write_back();
    state.r.set_long_product(prod);
}

// MSUBX $ax0.S, $ax1.T
pub fn msubx(state: &mut DspState, opc: u16) {
    let treg = ((opc >> 8) & 0x1) as u8;
    let sreg = ((opc >> 9) & 0x1) as u8;
    let (val1, val2) = mulx_operands(state, sreg, treg);
    let prod = state.r.multiply_sub(val1, val2, 0);
    state.zero_write_back();
    state.r.set_long_product(prod);
}

// MADD $axS.l, $axS.h
pub fn madd(state: &mut DspState, opc: u16) {
    let sreg = ((opc >> 8) & 0x1) as usize;
    let prod = state.r.multiply_add(state.r.ax[sreg].l, state.r.ax[sreg].h, 0);
    state.zero_write_back();
    state.r.set_long_product(prod);
}

// MSUB $axS.l, $axS.h
pub fn msub(state: &mut DspState, opc: u16) {
    let sreg = ((opc >> 8) & 0x1) as usize;
    let prod = state.r.multiply_sub(state.r.ax[sreg].l, state.r.ax[sreg].h, 0);
    state.zero_write_back();
    state.r.set_long_product(prod);
}

#[cfg(test)]
mod multiply_tests {
    use crate::constants::status::*;
    use crate::instructions::tests::{exec, init_dsp};

    #[test]
    fn test_mul_signed_doubles() {
        let mut st = init_dsp(&[0x9000]);
        st.r.ax[0].l = 0x0001;
        st.r.ax[0].h = 0xFFFF;
        exec(&mut st);
        assert_eq!(st.r.get_long_product(), -2);
    }

    #[test]
    fn test_mul_modify_disables_doubling() {
        // M0 then MUL $ax1.l, $ax1.h
        let mut st = init_dsp(&[0x8B00, 0x9800]);
        st.r.ax[1].l = 0x0003;
        st.r.ax[1].h = 0x0005;
        exec(&mut st);
        exec(&mut st);
        assert_eq!(st.r.get_long_product(), 15);
    }

    #[test]
    fn test_clrp_reads_zero() {
        let mut st = init_dsp(&[0x8400]);
        st.r.set_long_product(0x1234);
        exec(&mut st);
        assert_eq!(st.r.get_long_product(), 0);
        assert_eq!(st.r.prod.m2, 0x0010);
    }

    #[test]
    fn test_mulac_adds_previous_product() {
        // MULAC $ax0.l, $ax0.h, $ac1
        let mut st = init_dsp(&[0x9500]);
        st.r.set_long_acc(1, 100);
        st.r.set_long_product(20);
        st.r.ax[0].l = 2;
        st.r.ax[0].h = 3;
        exec(&mut st);
        assert_eq!(st.r.get_long_acc(1), 120);
        assert_eq!(st.r.get_long_product(), 12);
        assert!(!st.r.is_sr_flag_set(SR_ARITH_ZERO));
    }

    #[test]
    fn test_mulx_unsigned_halves() {
        // SET15 then MULX $ax0.l, $ax1.l
        let mut st = init_dsp(&[0x8D00, 0xA000]);
        st.r.ax[0].l = 0xFFFF;
        st.r.ax[1].l = 0x0001;
        exec(&mut st);
        exec(&mut st);
        assert_eq!(st.r.get_long_product(), 0x1FFFE);
    }

    #[test]
    fn test_mulx_high_halves_stay_signed() {
        // SET15 then MULX $ax0.h, $ax1.h
        let mut st = init_dsp(&[0x8D00, 0xB800]);
        st.r.ax[0].h = 0xFFFF;
        st.r.ax[1].h = 0x0001;
        exec(&mut st);
        exec(&mut st);
        assert_eq!(st.r.get_long_product(), -2);
    }

    #[test]
    fn test_mulxac() {
        // MULXAC $ax0.h, $ax1.l, $ac0
        let mut st = init_dsp(&[0xB400]);
        st.r.set_long_product(6);
        st.r.ax[0].h = 4;
        st.r.ax[1].l = 5;
        exec(&mut st);
        assert_eq!(st.r.get_long_acc(0), 6);
        assert_eq!(st.r.get_long_product(), 40);
    }

    #[test]
    fn test_madd_msub() {
        // MADD $ax0.l, $ax0.h twice, then MSUB once
        let mut st = init_dsp(&[0xF200, 0xF200, 0xF600]);
        st.r.ax[0].l = 3;
        st.r.ax[0].h = 7;
        for _ in 0..3 {
            exec(&mut st);
        }
        assert_eq!(st.r.get_long_product(), 42);
    }

    #[test]
    fn test_maddx_msubx() {
        // MADDX $ax0.l, $ax1.h then MSUBX $ax0.h, $ax1.l
        let mut st = init_dsp(&[0xE100, 0xE600]);
        st.r.ax[0].l = 2;
        st.r.ax[1].h = 10;
        st.r.ax[0].h = 1;
        st.r.ax[1].l = 3;
        exec(&mut st);
        assert_eq!(st.r.get_long_product(), 40);
        exec(&mut st);
        assert_eq!(st.r.get_long_product(), 34);
    }
}
