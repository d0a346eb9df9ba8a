//! Fast-timing model.
//!
//! Collapses the pipeline stages: one instruction retires per inner step,
//! and cycles accumulate from the latency table plus penalties for the
//! hazards the full pipeline would have taken:
//! 1. **RAW:** Each destination becomes ready `latency` cycles after its
//!    start cycle; a consumer starts no earlier than its sources are ready,
//!    and the gap is charged as data stall.
//! 2. **Control:** A taken branch charges the front-end refill and counts
//!    one flush, mirroring the full model's flush-per-taken-branch.
//!
//! Architectural results are identical to the full pipeline by construction
//! (both run the same functional executor); only the cycle accounting is
//! approximate, at 10–20× the simulation throughput.

use crate::common::error::HaltReason;
use crate::config::{defaults, SimConfig};
use crate::core::machine::{execution, Machine};
use crate::core::pipeline::latency::LatencyTable;
use crate::core::pipeline::scoreboard::{FLAGS, TRACKED};

/// The collapsed timing model.
pub struct FastTiming {
    latency: LatencyTable,
    /// Cycle at which each tracked register's latest value is ready.
    ready_at: [u64; TRACKED],
    max_instructions: Option<u64>,
}

impl FastTiming {
    /// Builds the model from configuration.
    pub fn new(config: &SimConfig) -> Self {
        Self {
            latency: LatencyTable::new(&config.latency),
            ready_at: [0; TRACKED],
            max_instructions: config.budget.max_instructions,
        }
    }

    /// Retires one instruction and advances the cycle model.
    pub fn step(&mut self, m: &mut Machine) {
        if m.halted() {
            m.stats.cycles += 1;
            return;
        }
        if let Some(cap) = self.max_instructions {
            if m.stats.instructions_retired >= cap {
                m.halt(HaltReason::BudgetExceeded);
                return;
            }
        }

        let outcome = match execution::step(m) {
            Ok(outcome) => outcome,
            Err(fault) => {
                m.halt(HaltReason::Fault(fault));
                return;
            }
        };
        let d = outcome.decoded;

        // Earliest start: one per cycle, no earlier than the slowest source.
        let mut start = m.stats.cycles + 1;
        let mut ready = start;
        for index in d.sources().iter().filter_map(|r| r.track_index()) {
            ready = ready.max(self.ready_at[index]);
        }
        if d.reads_flags() {
            ready = ready.max(self.ready_at[FLAGS]);
        }
        m.stats.stalls_data += ready - start;
        start = ready;
        m.stats.cycles = start;

        let finish = start + self.latency.cycles(d.op) - 1;
        for index in d.dests().filter_map(|r| r.track_index()) {
            self.ready_at[index] = finish + 1;
        }
        if d.sets_flags {
            self.ready_at[FLAGS] = finish + 1;
        }

        if outcome.taken_branch {
            m.stats.cycles += defaults::FLUSH_REFILL_CYCLES;
            m.stats.stalls_control += defaults::FLUSH_REFILL_CYCLES;
            m.stats.flushes += 1;
        }
    }

    /// Returns the model to its post-construction state.
    pub fn reset(&mut self) {
        self.ready_at = [0; TRACKED];
    }
}
