use crate::state::DspState;
use crate::utils::{is_over_s32, sext40};

fn dreg8(opc: u16) -> usize {
    ((opc >> 8) & 0x1) as usize
}

// 16-bit long immediate positioned in the mid window
fn fetch_mid_imm(state: &mut DspState) -> i64 {
    (state.fetch_instruction() as i16 as i64) << 16
}

// Shared body of the 16-bit logic ops on ac.m
fn logic_mid(state: &mut DspState, reg: usize, value: u16) {
    state.r.ac[reg].m = value;
    let over_s32 = is_over_s32(state.r.get_long_acc(reg));
    state.r.update_sr16(value as i16, false, false, over_s32);
}

fn add_to_acc(state: &mut DspState, reg: usize, addend: i64) {
    let acc = state.r.get_long_acc(reg);
    state.zero_write_back();
    state.r.set_long_acc(reg, sext40(acc + addend));
    let res = state.r.get_long_acc(reg);
    state.r.update_sr64_add(acc, addend, res);
}

fn sub_from_acc(state: &mut DspState, reg: usize, subtrahend: i64) {
    let acc = state.r.get_long_acc(reg);
    state.zero_write_back();
    state.r.set_long_acc(reg, sext40(acc - subtrahend));
    let res = state.r.get_long_acc(reg);
    state.r.update_sr64_sub(acc, subtrahend, res);
}

fn compare_acc(state: &mut DspState, reg: usize, value: i64) {
    let acc = state.r.get_long_acc(reg);
    let res = sext40(acc - value);
    state.r.update_sr64_sub(acc, value, res);
}

// ADDI $acD, #I
pub fn addi(state: &mut DspState, opc: u16) {
    let imm = fetch_mid_imm(state);
    add_to_acc(state, dreg8(opc), imm);
}

// XORI $acD.m, #I
pub fn xori(state: &mut DspState, opc: u16) {
    let reg = dreg8(opc);
    let imm = state.fetch_instruction();
    let value = state.r.ac[reg].m ^ imm;
    logic_mid(state, reg, value);
}

// ANDI $acD.m, #I
pub fn andi(state: &mut DspState, opc: u16) {
    let reg = dreg8(opc);
    let imm = state.fetch_instruction();
    let value = state.r.ac[reg].m & imm;
    logic_mid(state, reg, value);
}

// ORI $acD.m, #I
pub fn ori(state: &mut DspState, opc: u16) {
    let reg = dreg8(opc);
    let imm = state.fetch_instruction();
    let value = state.r.ac[reg].m | imm;
    logic_mid(state, reg, value);
}

// CMPI $acS, #I
pub fn cmpi(state: &mut DspState, opc: u16) {
    let imm = fetch_mid_imm(state);
    compare_acc(state, dreg8(opc), imm);
}

// ANDF $acS.m, #I: logic zero when no masked bit is set
pub fn andf(state: &mut DspState, opc: u16) {
    let imm = state.fetch_instruction();
    let mid = state.r.ac[dreg8(opc)].m;
    state.r.update_sr_logic_zero(mid & imm == 0);
}

// ANDCF $acS.m, #I: logic zero when every masked bit is set
pub fn andcf(state: &mut DspState, opc: u16) {
    let imm = state.fetch_instruction();
    let mid = state.r.ac[dreg8(opc)].m;
    state.r.update_sr_logic_zero(mid & imm == imm);
}

// ADDIS $acD, #I (signed 8-bit, mid aligned)
pub fn addis(state: &mut DspState, opc: u16) {
    let imm = ((opc & 0xFF) as u8 as i8 as i64) << 16;
    add_to_acc(state, dreg8(opc), imm);
}

// CMPIS $acS, #I
pub fn cmpis(state: &mut DspState, opc: u16) {
    let imm = ((opc & 0xFF) as u8 as i8 as i64) << 16;
    compare_acc(state, dreg8(opc), imm);
}

fn axr_logic(state: &mut DspState, opc: u16, op: fn(u16, u16) -> u16) {
    let dreg = dreg8(opc);
    let sreg = ((opc >> 9) & 0x1) as usize;
    let value = op(state.r.ac[dreg].m, state.r.ax[sreg].h);
    state.zero_write_back();
    logic_mid(state, dreg, value);
}

// XORR $acD.m, $axS.h
pub fn xorr(state: &mut DspState, opc: u16) {
    axr_logic(state, opc, |a, b| a ^ b);
}

// ANDR $acD.m, $axS.h
pub fn andr(state: &mut DspState, opc: u16) {
    axr_logic(state, opc, |a, b| a & b);
}

// ORR $acD.m, $axS.h
pub fn orr(state: &mut DspState, opc: u16) {
    axr_logic(state, opc, |a, b| a | b);
}

// ADD $acD, $ac(1-D)
pub fn add(state: &mut DspState, opc: u16) {
    let dreg = dreg8(opc);
    let other = state.r.get_long_acc(1 - dreg);
    add_to_acc(state, dreg, other);
}

// ADDP $acD
pub fn addp(state: &mut DspState, opc: u16) {
    let prod = state.r.get_long_product();
    add_to_acc(state, dreg8(opc), prod);
}

// SUB $acD, $ac(1-D)
pub fn sub(state: &mut DspState, opc: u16) {
    let dreg = dreg8(opc);
    let other = state.r.get_long_acc(1 - dreg);
    sub_from_acc(state, dreg, other);
}

// INC $acD
pub fn inc(state: &mut DspState, opc: u16) {
    add_to_acc(state, dreg8(opc), 1);
}

// DEC $acD
pub fn dec(state: &mut DspState, opc: u16) {
    sub_from_acc(state, dreg8(opc), 1);
}

// NEG $acD
pub fn neg(state: &mut DspState, opc: u16) {
    let dreg = dreg8(opc);
    let acc = state.r.get_long_acc(dreg);
    state.zero_write_back();
    state.r.set_long_acc(dreg, sext40(-acc));
    let res = state.r.get_long_acc(dreg);
    state.r.update_sr64_sub(0, acc, res);
}

// MOV $acD, $ac(1-D)
pub fn mov(state: &mut DspState, opc: u16) {
    let dreg = dreg8(opc);
    let acc = state.r.get_long_acc(1 - dreg);
    state.zero_write_back();
    state.r.set_long_acc(dreg, acc);
    state.r.update_sr64(acc, false, false);
}

// MOVP $acD
pub fn movp(state: &mut DspState, opc: u16) {
    let dreg = dreg8(opc);
    let prod = state.r.get_long_product();
    state.zero_write_back();
    state.r.set_long_acc(dreg, sext40(prod));
    let res = state.r.get_long_acc(dreg);
    state.r.update_sr64(res, false, false);
}

// CLR $acR
pub fn clr(state: &mut DspState, opc: u16) {
    let reg = ((opc >> 11) & 0x1) as usize;
    state.zero_write_back();
    state.r.set_long_acc(reg, 0);
    state.r.update_sr64(0, false, false);
}

// TST $acR
pub fn tst(state: &mut DspState, opc: u16) {
    let reg = ((opc >> 11) & 0x1) as usize;
    let acc = state.r.get_long_acc(reg);
    state.zero_write_back();
    state.r.update_sr64(acc, false, false);
}
