//! Linux/AArch64 syscall surface.
//!
//! This module implements the minimal OS personality a statically-linked
//! AArch64 Linux binary needs:
//! 1. **Numbers:** The AArch64 syscall number table and errno values.
//! 2. **Handler:** Dispatch on x8 with arguments in x0–x5 and the result
//!    placed in x0.
//!
//! Unknown syscalls are not errors for the simulator: they return `-ENOSYS`
//! to the program in-band, exactly as a kernel without the feature would.

/// Syscall numbers, errno values, and OS constants.
pub mod linux;

mod handler;

pub use handler::{dispatch, SyscallAction};
