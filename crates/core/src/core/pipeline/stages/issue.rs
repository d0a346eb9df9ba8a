//! Issue stage.
//!
//! Admits decoded records into execute slots in program order. For each
//! record the stage checks, in order:
//! 1. **Data hazards:** Every source register (and the flags, for condition
//!    readers) and every destination (conservative WAW) must have no
//!    pending writer.
//! 2. **Structural hazards:** A free execute slot of the required unit kind.
//! 3. **Memory ordering:** A load whose byte range overlaps any older
//!    in-flight store stalls until that store retires. There is no
//!    store-to-load forwarding; this conservatism is deliberate.
//!
//! The first blocked record blocks everything younger this cycle (in-order
//! issue). On success the stage captures operand values from the register
//! file — safe because every producer has already retired — and reserves
//! the destination in the scoreboard.

use crate::core::machine::execution::{self, Operands};
use crate::core::machine::Machine;
use crate::core::pipeline::latches::{Slot, SlotState};
use crate::core::pipeline::latency::LatencyTable;
use crate::core::pipeline::Pipeline;
use crate::isa::instruction::{Decoded, Op};

/// Byte span `[start, start+len)` a memory instruction touches.
pub(crate) fn mem_span(d: &Decoded, ops: &Operands, pc: u64) -> (u64, u64) {
    let (start, _) = execution::address(d, ops, pc);
    let len = match d.op {
        Op::Ldp | Op::Stp => 2 * u64::from(d.size),
        _ => u64::from(d.size),
    };
    (start, len)
}

/// Wrap-free overlap test between two byte spans.
fn overlaps(a: (u64, u64), b: (u64, u64)) -> bool {
    let (a0, alen) = (u128::from(a.0), u128::from(a.1));
    let (b0, blen) = (u128::from(b.0), u128::from(b.1));
    a0 < b0 + blen && b0 < a0 + alen
}

/// Runs one issue cycle.
pub fn run(p: &mut Pipeline, m: &mut Machine) {
    let mut issued = 0;
    while issued < p.width {
        let Some(entry) = p.issue_in.cur.front().copied() else {
            break;
        };
        let d = entry.inst;

        if !p.scoreboard.sources_ready(&d) || !p.scoreboard.dests_ready(&d) {
            m.stats.stalls_data += 1;
            break;
        }

        let unit = LatencyTable::unit(d.op);
        if p.unit_busy[unit.index()] >= unit.slots() {
            m.stats.stalls_structural += 1;
            break;
        }

        // Producers have retired (scoreboard is clear), so the register
        // file and PSTATE hold exactly the values this instruction reads.
        let ops = execution::read_operands(m, &d);

        if d.op.is_load() {
            let span = mem_span(&d, &ops, entry.pc);
            let blocked = p
                .slots
                .iter()
                .any(|s| s.store_span.is_some_and(|ss| overlaps(ss, span)));
            if blocked {
                m.stats.stalls_mem += 1;
                break;
            }
        }
        let store_span = d.op.is_store().then(|| mem_span(&d, &ops, entry.pc));

        p.scoreboard.reserve(&d);
        p.unit_busy[unit.index()] += 1;
        let _ = p.issue_in.cur.pop_front();
        p.slots.push_back(Slot {
            seq: p.next_seq,
            pc: entry.pc,
            inst: d,
            ops,
            state: SlotState::Issued,
            remaining: p.latency.cycles(d.op),
            unit,
            update: None,
            store_span,
        });
        p.next_seq += 1;
        issued += 1;
    }
}
