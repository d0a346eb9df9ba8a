//! Decode stage.
//!
//! Translates fetched words into decoded records. Undecodable words become
//! the Invalid class and keep flowing: they fault only if they reach
//! writeback, so speculative garbage fetched past a taken branch or an SVC
//! is flushed harmlessly.

use tracing::trace;

use crate::core::machine::Machine;
use crate::core::pipeline::latches::DecodeEntry;
use crate::core::pipeline::Pipeline;
use crate::isa::{decode, disasm};

/// Runs one decode cycle.
pub fn run(p: &mut Pipeline, _m: &mut Machine) {
    while p.issue_in.len() < p.width {
        let Some(fetched) = p.decode_in.cur.pop_front() else {
            break;
        };
        let inst = decode(fetched.word);
        if p.trace {
            trace!(pc = format_args!("{:#x}", fetched.pc), "D  {}", disasm::format(fetched.pc, &inst));
        }
        p.issue_in.push(DecodeEntry {
            pc: fetched.pc,
            inst,
        });
    }
}
