// Extended-slot ops. They run before the main op and only queue their
// register writes, so the main op still sees the old register values.

use crate::constants::registers::{REG_ACL0, REG_ACM0, REG_AXL0};
use crate::state::DspState;

// 'NOP
pub fn nop(_state: &mut DspState, _opc: u16) {}

// 'DR $arR
pub fn dr(state: &mut DspState, opc: u16) {
    let reg = (opc & 0x3) as usize;
    let val = state.r.decrement_address_register(reg);
    state.write_to_back_log(reg as u8, val);
}

// 'IR $arR
pub fn ir(state: &mut DspState, opc: u16) {
    let reg = (opc & 0x3) as usize;
    let val = state.r.increment_address_register(reg);
    state.write_to_back_log(reg as u8, val);
}

// 'NR $arR: ar += ix of the same number
pub fn nr(state: &mut DspState, opc: u16) {
    let reg = (opc & 0x3) as usize;
    let ix = state.r.ix[reg] as i16;
    let val = state.r.increase_address_register(reg, ix);
    state.write_to_back_log(reg as u8, val);
}

// 'MV $axD.D, $acS.S
pub fn mv(state: &mut DspState, opc: u16) {
    let sreg = (opc & 0x3) as u8 + REG_ACL0;
    let dreg = ((opc >> 2) & 0x3) as u8 + REG_AXL0;

    let val = if sreg >= REG_ACM0 {
        state.r.op_read_register_and_saturate((sreg - REG_ACM0) as usize)
    } else {
        state.r.ac[(sreg - REG_ACL0) as usize].l
    };
    state.write_to_back_log(dreg, val);
}
