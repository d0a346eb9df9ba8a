//! Writeback stage.
//!
//! Retires up to `width` completed slots per cycle from the head of the
//! slot queue, strictly in program order:
//! 1. Commits register results, flags, and store data.
//! 2. Resolves branches: a taken branch flushes everything younger
//!    (exactly one flush per taken branch) and redirects fetch.
//! 3. Handles SVC: drains younger stages, runs the syscall handler
//!    synchronously, then resumes at PC+4 or halts on exit.
//! 4. Faults on the Invalid class and enforces the instruction budget.

use tracing::{debug, trace};

use crate::common::error::{Fault, HaltReason};
use crate::core::machine::{execution, Machine};
use crate::core::pipeline::latches::SlotState;
use crate::core::pipeline::Pipeline;
use crate::isa::disasm;
use crate::isa::instruction::Op;
use crate::os::{self, SyscallAction};

/// Runs one writeback cycle.
pub fn run(p: &mut Pipeline, m: &mut Machine) {
    let mut retired = 0;
    while retired < p.width {
        match p.slots.front() {
            Some(slot) if slot.state == SlotState::Retiring => {}
            _ => break,
        }

        if let Some(cap) = p.max_instructions {
            if m.stats.instructions_retired >= cap {
                debug!(cap, "instruction budget exhausted");
                m.halt(HaltReason::BudgetExceeded);
                return;
            }
        }

        let Some(slot) = p.slots.pop_front() else {
            break;
        };

        if slot.inst.op == Op::Invalid {
            m.halt(HaltReason::Fault(Fault::Decode {
                pc: slot.pc,
                word: slot.inst.raw,
            }));
            return;
        }

        let update = slot.update.unwrap_or_default();
        execution::retire(m, &slot.inst, &update, slot.pc);
        p.scoreboard.release(&slot.inst);
        p.unit_busy[slot.unit.index()] -= 1;
        retired += 1;

        if p.trace {
            trace!(
                pc = format_args!("{:#x}", slot.pc),
                "W  {}",
                disasm::format(slot.pc, &slot.inst)
            );
        }

        if slot.inst.op == Op::Svc {
            // Drain: everything younger was fetched down the sequential
            // path while the handler's effects were still unknown.
            p.flush_younger();
            match os::dispatch(m) {
                SyscallAction::Exit(code) => m.halt(HaltReason::Exit(code)),
                SyscallAction::Continue => p.fetch_pc = slot.pc.wrapping_add(4),
            }
            return;
        }

        if let Some(target) = update.branch {
            p.flush_younger();
            m.stats.flushes += 1;
            p.fetch_pc = target;
            return;
        }
    }
}
