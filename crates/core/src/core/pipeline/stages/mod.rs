//! The five pipeline stages.
//!
//! Each stage is a free function over the pipeline and the machine, run
//! back-to-front within a tick: Writeback, Execute, Issue, Decode, Fetch.

/// Decode stage: raw words → decoded records.
pub mod decode;
/// Execute stage: multi-cycle slot progression; loads read here.
pub mod execute;
/// Fetch stage: sequential instruction words from memory.
pub mod fetch;
/// Issue stage: hazard checks, operand capture, slot allocation.
pub mod issue;
/// Writeback stage: in-order retirement, branch resolution, SVC drain.
pub mod writeback;
