use crate::constants::registers::{REG_ACM0, REG_ACM1};
use crate::state::DspState;
use crate::utils::sext8;

// LRI $D, #I: load a 16-bit immediate into any register
pub fn lri(state: &mut DspState, opc: u16) {
    let reg = (opc & 0x1F) as u8;
    let imm = state.fetch_instruction();
    state.r.op_write_register(reg, imm);
    state.r.conditional_extend_accum(reg);
}

// LRIS $(0x18+D), #I: sign-extended 8-bit immediate into an ax/ac half
pub fn lris(state: &mut DspState, opc: u16) {
    let reg = (((opc >> 8) & 0x7) + 0x18) as u8;
    let imm = sext8(opc);
    state.r.op_write_register(reg, imm);
    state.r.conditional_extend_accum(reg);
}

// MRR $D, $S
pub fn mrr(state: &mut DspState, opc: u16) {
    let sreg = (opc & 0x1F) as u8;
    let dreg = ((opc >> 5) & 0x1F) as u8;

    let val = if sreg == REG_ACM0 || sreg == REG_ACM1 {
        state.r.op_read_register_and_saturate((sreg - REG_ACM0) as usize)
    } else {
        state.r.op_read_register(sreg)
    };

    state.r.op_write_register(dreg, val);
    state.r.conditional_extend_accum(dreg);
}
