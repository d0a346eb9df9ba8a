//! Fetch stage.
//!
//! Reads up to `width` consecutive instruction words per cycle from the
//! sequential fetch PC into the Fetch→Decode latch. Fetch stops while any
//! branch or SVC is unresolved (no branch prediction: the front end waits
//! for writeback to name the target), and while the latch is full.

use crate::core::machine::Machine;
use crate::core::pipeline::latches::FetchEntry;
use crate::core::pipeline::Pipeline;

/// Runs one fetch cycle.
pub fn run(p: &mut Pipeline, m: &mut Machine) {
    if p.has_unresolved_control() {
        m.stats.stalls_control += 1;
        return;
    }

    let mut fetched = 0;
    while fetched < p.width && p.decode_in.len() < p.width {
        let word = m.mem.read32(p.fetch_pc);
        p.decode_in.push(FetchEntry {
            pc: p.fetch_pc,
            word,
        });
        p.fetch_pc = p.fetch_pc.wrapping_add(4);
        fetched += 1;
    }
}
