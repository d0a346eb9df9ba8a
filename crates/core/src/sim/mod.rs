//! Simulation layer.
//!
//! Everything between a program on disk and a running core:
//! 1. **Loader:** ELF parsing, segment placement, initial stack.
//! 2. **Simulator:** The [`Core`] façade over machine + timing model.
//!
//! [`Core`]: simulator::Core

/// ELF loading and address-space setup.
pub mod loader;
/// The [`Core`](simulator::Core) façade.
pub mod simulator;
