//! Execute stage.
//!
//! Newly issued slots take their execute-start here: effects are computed
//! and loads read memory. Every active slot then consumes one latency
//! cycle; a slot whose count reaches zero moves to the retiring state and
//! commits at the next writeback.

use crate::core::machine::{execution, Machine};
use crate::core::pipeline::latches::SlotState;
use crate::core::pipeline::Pipeline;
use crate::isa::instruction::Op;

/// Runs one execute cycle.
pub fn run(p: &mut Pipeline, m: &mut Machine) {
    for slot in &mut p.slots {
        match slot.state {
            SlotState::Issued => {
                if slot.inst.op != Op::Invalid {
                    slot.update = Some(execution::execute(m, &slot.inst, &slot.ops, slot.pc));
                }
                slot.state = SlotState::Executing;
                slot.remaining = slot.remaining.saturating_sub(1);
                if slot.remaining == 0 {
                    slot.state = SlotState::Retiring;
                }
            }
            SlotState::Executing => {
                slot.remaining = slot.remaining.saturating_sub(1);
                if slot.remaining == 0 {
                    slot.state = SlotState::Retiring;
                }
            }
            SlotState::Retiring => {}
        }
    }
}
