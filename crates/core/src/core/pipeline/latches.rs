//! Stage buffers and in-flight slot records.
//!
//! This module defines the structures connecting the pipeline stages:
//! 1. **Stage buffers:** Double-buffered queues between Fetch→Decode and
//!    Decode→Issue. A stage reads its input's current side and writes the
//!    next side; buffers commit at end of tick, so nothing flows through two
//!    stages in one cycle and stage order within a tick cannot matter.
//! 2. **Slots:** The per-instruction record from issue to retirement.

use std::collections::VecDeque;

use crate::core::machine::execution::{Operands, Update};
use crate::core::pipeline::latency::UnitKind;
use crate::isa::instruction::Decoded;

/// A double-buffered inter-stage queue.
///
/// Entries pushed during a tick become visible only after [`commit`].
/// Entries the consumer leaves behind (stalls) stay at the front, in order.
///
/// [`commit`]: StageBuf::commit
#[derive(Debug, Default)]
pub struct StageBuf<T> {
    /// Entries visible to the consuming stage this cycle.
    pub cur: VecDeque<T>,
    /// Entries produced this cycle; hidden until commit.
    next: Vec<T>,
}

impl<T> StageBuf<T> {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self {
            cur: VecDeque::new(),
            next: Vec::new(),
        }
    }

    /// Queues an entry for the next cycle.
    pub fn push(&mut self, entry: T) {
        self.next.push(entry);
    }

    /// Total occupancy (visible + produced this cycle).
    pub fn len(&self) -> usize {
        self.cur.len() + self.next.len()
    }

    /// True when nothing is buffered on either side.
    pub fn is_empty(&self) -> bool {
        self.cur.is_empty() && self.next.is_empty()
    }

    /// Makes this cycle's output visible to the consumer.
    pub fn commit(&mut self) {
        self.cur.extend(self.next.drain(..));
    }

    /// Discards everything (flush).
    pub fn clear(&mut self) {
        self.cur.clear();
        self.next.clear();
    }

    /// Iterates over all buffered entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cur.iter().chain(self.next.iter())
    }
}

/// A fetched instruction word awaiting decode.
#[derive(Debug, Clone, Copy)]
pub struct FetchEntry {
    /// Fetch address.
    pub pc: u64,
    /// Raw word.
    pub word: u32,
}

/// A decoded instruction awaiting issue.
#[derive(Debug, Clone, Copy)]
pub struct DecodeEntry {
    /// Instruction address.
    pub pc: u64,
    /// Decoded record (possibly the Invalid class, carried to writeback).
    pub inst: Decoded,
}

/// Lifecycle of an in-flight slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Issued; waiting for its first execute cycle.
    Issued,
    /// Consuming execute cycles.
    Executing,
    /// Execution complete; retires at the next writeback.
    Retiring,
}

/// An in-flight instruction between issue and retirement.
#[derive(Debug)]
pub struct Slot {
    /// Program-order sequence number.
    pub seq: u64,
    /// Instruction address.
    pub pc: u64,
    /// Decoded record.
    pub inst: Decoded,
    /// Source values captured at issue.
    pub ops: Operands,
    /// Lifecycle state.
    pub state: SlotState,
    /// Execute cycles left.
    pub remaining: u64,
    /// Execute slot kind this instruction occupies.
    pub unit: UnitKind,
    /// Effects computed at execute-start; applied at writeback.
    pub update: Option<Update>,
    /// Byte range a store will write (issue-time, for memory-ordering
    /// hazard checks against younger loads).
    pub store_span: Option<(u64, u64)>,
}

/// Program-ordered collection of in-flight slots.
pub type SlotQueue = VecDeque<Slot>;
