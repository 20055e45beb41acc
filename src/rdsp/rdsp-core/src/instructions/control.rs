use crate::constants::control::CR_HALT;
use crate::constants::status::*;
use crate::memory::StackRegister;
use crate::state::DspState;
use log::warn;

// NOP: the only valid encoding is all zeroes
pub fn nop(_state: &mut DspState, opc: u16) {
    if opc == 0 {
        return;
    }
    warn!("Unrecognized opcode {:#06x}", opc);
}

// NX: main slot does nothing, extended slot still runs
pub fn nx(state: &mut DspState, _opc: u16) {
    state.zero_write_back();
}

// DAR $arD
pub fn dar(state: &mut DspState, opc: u16) {
    let reg = (opc & 0x3) as usize;
    state.r.ar[reg] = state.r.decrement_address_register(reg);
}

// IAR $arD
pub fn iar(state: &mut DspState, opc: u16) {
    let reg = (opc & 0x3) as usize;
    state.r.ar[reg] = state.r.increment_address_register(reg);
}

// SUBARN $arD: ar -= ix of the same number
pub fn subarn(state: &mut DspState, opc: u16) {
    let reg = (opc & 0x3) as usize;
    let ix = state.r.ix[reg] as i16;
    state.r.ar[reg] = state.r.decrease_address_register(reg, ix);
}

// ADDARN $arD, $ixS
pub fn addarn(state: &mut DspState, opc: u16) {
    let dreg = (opc & 0x3) as usize;
    let sreg = ((opc >> 2) & 0x3) as usize;
    let ix = state.r.ix[sreg] as i16;
    state.r.ar[dreg] = state.r.increase_address_register(dreg, ix);
}

// HALT: park on this instruction until the host clears the bit
pub fn halt(state: &mut DspState, _opc: u16) {
    state.control_reg |= CR_HALT;
    state.pc = state.pc.wrapping_sub(1);
}

fn start_loop(state: &mut DspState, loop_end: u16, count: u16) {
    state.r.push_stack(StackRegister::Call, state.pc);
    state.r.push_stack(StackRegister::LoopAddress, loop_end);
    state.r.push_stack(StackRegister::LoopCounter, count);
}

// LOOP $R: repeat the next instruction $R times
pub fn loop_reg(state: &mut DspState, opc: u16) {
    let count = state.r.op_read_register((opc & 0x1F) as u8);
    repeat_next(state, count);
}

// LOOPI #I
pub fn loopi(state: &mut DspState, opc: u16) {
    repeat_next(state, opc & 0xFF);
}

fn repeat_next(state: &mut DspState, count: u16) {
    let loop_pc = state.pc;
    if count != 0 {
        start_loop(state, loop_pc, count);
    } else {
        state.skip_instruction();
    }
}

// BLOOP $R, addr: repeat the block up to and including addr
pub fn bloop(state: &mut DspState, opc: u16) {
    let count = state.r.op_read_register((opc & 0x1F) as u8);
    repeat_block(state, count);
}

// BLOOPI #I, addr
pub fn bloopi(state: &mut DspState, opc: u16) {
    repeat_block(state, opc & 0xFF);
}

fn repeat_block(state: &mut DspState, count: u16) {
    let loop_end = state.read_imem(state.pc);
    if count != 0 {
        state.pc = state.pc.wrapping_add(1);
        start_loop(state, loop_end, count);
    } else {
        state.pc = loop_end;
        state.skip_instruction();
    }
}

// IFcc: skip the next instruction unless the condition holds
pub fn ifcc(state: &mut DspState, opc: u16) {
    if !state.r.check_condition((opc & 0xF) as u8) {
        state.skip_instruction();
    }
}

// Jcc addr
pub fn jcc(state: &mut DspState, opc: u16) {
    let dest = state.fetch_instruction();
    if state.r.check_condition((opc & 0xF) as u8) {
        state.pc = dest;
    }
}

// CALLcc addr
pub fn call(state: &mut DspState, opc: u16) {
    let dest = state.fetch_instruction();
    if state.r.check_condition((opc & 0xF) as u8) {
        state.r.push_stack(StackRegister::Call, state.pc);
        state.pc = dest;
    }
}

// RETcc
pub fn ret(state: &mut DspState, opc: u16) {
    if state.r.check_condition((opc & 0xF) as u8) {
        state.pc = state.r.pop_stack(StackRegister::Call);
    }
}

// RTI: restore sr and pc saved by exception entry
pub fn rti(state: &mut DspState, _opc: u16) {
    state.r.sr = state.r.pop_stack(StackRegister::Data);
    state.pc = state.r.pop_stack(StackRegister::Call);
}

// JRcc $R
pub fn jrcc(state: &mut DspState, opc: u16) {
    if state.r.check_condition((opc & 0xF) as u8) {
        let reg = ((opc >> 5) & 0x7) as u8;
        state.pc = state.r.op_read_register(reg);
    }
}

// CALLRcc $R
pub fn callr(state: &mut DspState, opc: u16) {
    if state.r.check_condition((opc & 0xF) as u8) {
        let reg = ((opc >> 5) & 0x7) as u8;
        let addr = state.r.op_read_register(reg);
        state.r.push_stack(StackRegister::Call, state.pc);
        state.pc = addr;
    }
}

// SBCLR #I: clear sr bit I+6
pub fn sbclr(state: &mut DspState, opc: u16) {
    let bit = (opc & 0x7) + 6;
    state.r.clear_sr_flag(1 << bit);
}

// SBSET #I: set sr bit I+6
pub fn sbset(state: &mut DspState, opc: u16) {
    let bit = (opc & 0x7) + 6;
    state.r.set_sr_flag(1 << bit);
}

// M2 / M0 / CLR15 / SET15 / SET16 / SET40
pub fn srbith(state: &mut DspState, opc: u16) {
    state.zero_write_back();
    match (opc >> 8) & 0x7 {
        0x2 => state.r.clear_sr_flag(SR_MUL_MODIFY),
        0x3 => state.r.set_sr_flag(SR_MUL_MODIFY),
        0x4 => state.r.clear_sr_flag(SR_MUL_UNSIGNED),
        0x5 => state.r.set_sr_flag(SR_MUL_UNSIGNED),
        0x6 => state.r.clear_sr_flag(SR_40_MODE_BIT),
        0x7 => state.r.set_sr_flag(SR_40_MODE_BIT),
        _ => {}
    }
}
