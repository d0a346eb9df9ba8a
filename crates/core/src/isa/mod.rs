//! AArch64 instruction set support.
//!
//! This module covers everything between raw 32-bit instruction words and the
//! executable [`Decoded`] record:
//! 1. **Decode:** Group routing and field extraction for the user-mode subset.
//! 2. **Encode:** Canonical word builders (tests, program construction).
//! 3. **Disassembly:** Compact mnemonics for trace output.
//! 4. **ABI:** Register-role names for the Linux AArch64 convention.
//! 5. **System registers:** The small MRS/MSR surface.

/// Linux AArch64 ABI register roles.
pub mod abi;
/// Bit extraction and mask-construction helpers.
pub mod bits;
/// Instruction word → [`Decoded`] record.
pub mod decode;
/// Compact disassembler for tracing.
pub mod disasm;
/// Canonical instruction word builders.
pub mod encode;
/// Opcode classes and the decoded instruction record.
pub mod instruction;
/// System register identifiers for MRS/MSR.
pub mod sysreg;

pub use decode::decode;
pub use instruction::{Cond, Decoded, Extend, IndexMode, Op, ShiftKind};
