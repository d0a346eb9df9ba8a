//! Counting scoreboard for register dependency tracking.
//!
//! Maps each tracked register (x0–x30, SP, and the NZCV flags as a pseudo
//! register) to the number of in-flight instructions that will write it.
//! Issue stalls while a source, a destination (WAW conservatism), or — for
//! condition readers — the flags have a pending writer; writeback decrements
//! exactly once per reservation.

use crate::isa::instruction::Decoded;

/// Scoreboard slots: x0–x30 (0–30), SP (31), NZCV flags (32).
pub const TRACKED: usize = 33;

/// Index of the flags pseudo register.
pub const FLAGS: usize = 32;

/// Per-register pending-writer counts.
#[derive(Debug, Clone)]
pub struct Scoreboard {
    pending: [u8; TRACKED],
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self {
            pending: [0; TRACKED],
        }
    }
}

impl Scoreboard {
    /// Creates a scoreboard with no pending writers.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the register has no pending writer.
    #[inline]
    pub fn clear_at(&self, index: usize) -> bool {
        self.pending[index] == 0
    }

    /// True when every register this instruction reads is available.
    pub fn sources_ready(&self, d: &Decoded) -> bool {
        let regs_ready = d
            .sources()
            .iter()
            .filter_map(|r| r.track_index())
            .all(|i| self.clear_at(i));
        regs_ready && (!d.reads_flags() || self.clear_at(FLAGS))
    }

    /// True when every register this instruction writes is free of older
    /// pending writers (conservative WAW ordering).
    pub fn dests_ready(&self, d: &Decoded) -> bool {
        let regs_ready = d.dests().filter_map(|r| r.track_index()).all(|i| self.clear_at(i));
        regs_ready && (!d.sets_flags || self.clear_at(FLAGS))
    }

    /// Reserves this instruction's destinations (issue time).
    pub fn reserve(&mut self, d: &Decoded) {
        for i in d.dests().filter_map(|r| r.track_index()) {
            self.pending[i] += 1;
        }
        if d.sets_flags {
            self.pending[FLAGS] += 1;
        }
    }

    /// Releases this instruction's destinations (writeback time).
    ///
    /// Each reservation is released exactly once; the count never wraps
    /// below zero.
    pub fn release(&mut self, d: &Decoded) {
        for i in d.dests().filter_map(|r| r.track_index()) {
            debug_assert!(self.pending[i] > 0, "scoreboard underflow on register {i}");
            self.pending[i] = self.pending[i].saturating_sub(1);
        }
        if d.sets_flags {
            debug_assert!(self.pending[FLAGS] > 0, "scoreboard underflow on flags");
            self.pending[FLAGS] = self.pending[FLAGS].saturating_sub(1);
        }
    }

    /// Clears every reservation (pipeline flush: nothing stays in flight).
    pub fn reset(&mut self) {
        self.pending = [0; TRACKED];
    }

    /// True when no register has a pending writer (quiescent pipeline).
    pub fn is_quiescent(&self) -> bool {
        self.pending.iter().all(|&c| c == 0)
    }
}
