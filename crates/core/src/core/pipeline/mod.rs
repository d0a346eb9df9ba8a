//! Cycle-accurate in-order pipeline.
//!
//! An N-wide (default 8) in-order pipeline over five stages:
//! Fetch → Decode → Issue → Execute → Writeback. Key properties:
//! 1. **Double-buffered latches:** Fetch→Decode and Decode→Issue buffers
//!    commit at end of tick, so no word moves through two stages in one
//!    cycle and intra-tick stage order cannot produce order-dependence.
//! 2. **In-order issue and retire:** A blocked instruction blocks everything
//!    younger; retirement is from the head of the slot queue only.
//! 3. **Hazards:** A counting scoreboard covers RAW/WAW on registers, SP,
//!    and the flags; execute slots per unit kind bound structural
//!    parallelism; a conservative address check holds loads behind
//!    overlapping older stores.
//! 4. **Control:** Fetch stalls while a branch or SVC is unresolved; a
//!    taken branch resolved at writeback flushes everything younger
//!    (exactly one flush per taken branch); SVC drains, runs the syscall
//!    handler synchronously, and resumes at PC+4 or halts.
//!
//! Stages run back-to-front within a tick (drain before fill); the latches
//! make the visible behavior identical to simultaneous stage evaluation.

/// Fast-timing variant (collapsed stages, preserved accounting).
pub mod fast;
/// Stage buffers and slot records.
pub mod latches;
/// Latency table and unit kinds.
pub mod latency;
/// Counting scoreboard.
pub mod scoreboard;
/// The five pipeline stages.
pub mod stages;

use crate::config::SimConfig;
use crate::core::machine::Machine;
use crate::core::pipeline::latches::{DecodeEntry, FetchEntry, SlotQueue, StageBuf};
use crate::core::pipeline::latency::{LatencyTable, UNIT_KINDS};
use crate::core::pipeline::scoreboard::Scoreboard;

/// The N-wide in-order pipeline.
pub struct Pipeline {
    /// Superscalar width.
    pub(crate) width: usize,
    /// Injected latency table.
    pub(crate) latency: LatencyTable,
    /// Next fetch address (speculative sequential PC).
    pub(crate) fetch_pc: u64,
    /// Fetch → Decode latch.
    pub(crate) decode_in: StageBuf<FetchEntry>,
    /// Decode → Issue latch.
    pub(crate) issue_in: StageBuf<DecodeEntry>,
    /// In-flight slots in program order.
    pub(crate) slots: SlotQueue,
    /// Pending-writer counts.
    pub(crate) scoreboard: Scoreboard,
    /// Busy execute slots per unit kind.
    pub(crate) unit_busy: [usize; UNIT_KINDS],
    /// Program-order sequence counter.
    pub(crate) next_seq: u64,
    /// Instruction budget (halts with the budget sentinel when reached).
    pub(crate) max_instructions: Option<u64>,
    /// Emit per-cycle trace events.
    pub(crate) trace: bool,
}

impl Pipeline {
    /// Builds a pipeline from configuration.
    pub fn new(config: &SimConfig) -> Self {
        Self {
            width: config.latency.pipeline_width.max(1),
            latency: LatencyTable::new(&config.latency),
            fetch_pc: 0,
            decode_in: StageBuf::new(),
            issue_in: StageBuf::new(),
            slots: SlotQueue::new(),
            scoreboard: Scoreboard::new(),
            unit_busy: [0; UNIT_KINDS],
            next_seq: 0,
            max_instructions: config.budget.max_instructions,
            trace: config.trace,
        }
    }

    /// Redirects fetch (used when the façade seeds or rewrites the PC).
    pub fn set_fetch_pc(&mut self, pc: u64) {
        self.fetch_pc = pc;
    }

    /// Advances the pipeline by one cycle.
    ///
    /// Every call counts one cycle, halted or not; stage work stops once
    /// the machine halts.
    pub fn tick(&mut self, m: &mut Machine) {
        if !m.halted() {
            stages::writeback::run(self, m);
            if !m.halted() {
                stages::execute::run(self, m);
                stages::issue::run(self, m);
                stages::decode::run(self, m);
                stages::fetch::run(self, m);
            }
            self.decode_in.commit();
            self.issue_in.commit();
        }
        m.stats.cycles += 1;
    }

    /// True while a branch or SVC is decoded but not yet retired.
    ///
    /// Fetch stalls on this: the front end has no predictor, so it cannot
    /// guess where control flow goes until writeback resolves it.
    pub(crate) fn has_unresolved_control(&self) -> bool {
        self.issue_in.iter().any(|e| e.inst.op.is_control())
            || self.slots.iter().any(|s| s.inst.op.is_control())
    }

    /// Discards everything younger than the instruction being retired.
    ///
    /// Called with all older instructions already retired, so the whole
    /// in-flight population goes: latches, slots, reservations, and unit
    /// occupancy all return to quiescent.
    pub(crate) fn flush_younger(&mut self) {
        self.decode_in.clear();
        self.issue_in.clear();
        self.slots.clear();
        self.scoreboard.reset();
        self.unit_busy = [0; UNIT_KINDS];
    }

    /// Number of in-flight slots (issue through writeback).
    pub fn in_flight(&self) -> usize {
        self.slots.len()
    }

    /// The scoreboard (test observability).
    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    /// Returns the pipeline to its post-construction state.
    pub fn reset(&mut self) {
        self.flush_younger();
        self.fetch_pc = 0;
        self.next_seq = 0;
    }
}
