//! AArch64 user-mode system simulator library.
//!
//! This crate implements a cycle-accurate in-order AArch64 simulator calibrated
//! against an Apple M2-class micro-architecture. It provides:
//! 1. **Core:** 8-wide in-order pipeline (Fetch, Decode, Issue, Execute, Writeback),
//!    register file, and PSTATE flags.
//! 2. **Memory:** Sparse page-backed flat 64-bit virtual address space.
//! 3. **ISA:** Decoding and execution for the AArch64 user-mode subset
//!    (data processing, branches, loads/stores, system, FP dispatch).
//! 4. **OS:** The Linux/AArch64 syscall surface needed by static binaries.
//! 5. **Simulation:** [`Core`] façade, ELF loader, configuration, and statistics.

/// Common types (fault taxonomy, halt reasons, exit-code sentinels).
pub mod common;
/// Simulator configuration (defaults, latency table options, pipeline width).
pub mod config;
/// CPU core: architectural state, functional units, functional executor, pipeline.
pub mod core;
/// Instruction set: opcode classes, decoder, encoders, disassembler, ABI names.
pub mod isa;
/// Sparse page-backed virtual memory.
pub mod mem;
/// Linux/AArch64 syscall numbers and handler.
pub mod os;
/// Simulation: [`Core`] façade, ELF loader, and segment placement.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `SimConfig::default()` or deserialize from JSON.
pub use crate::config::SimConfig;
/// Architectural state owner: memory, registers, program break, host I/O.
pub use crate::core::Machine;
/// Top-level simulator façade; owns the machine and a timing model side-by-side.
pub use crate::sim::simulator::Core;
