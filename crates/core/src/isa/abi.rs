//! Linux AArch64 ABI register roles.
//!
//! Defines the register numbers the OS surface and loader care about. The
//! procedure-call roles follow AAPCS64; the syscall convention is the Linux
//! one (number in x8, arguments in x0–x5, result in x0).

/// First argument / syscall argument 0 / syscall result.
pub const REG_A0: usize = 0;
/// Second argument / syscall argument 1.
pub const REG_A1: usize = 1;
/// Third argument / syscall argument 2.
pub const REG_A2: usize = 2;
/// Fourth argument / syscall argument 3.
pub const REG_A3: usize = 3;
/// Fifth argument / syscall argument 4.
pub const REG_A4: usize = 4;
/// Sixth argument / syscall argument 5.
pub const REG_A5: usize = 5;
/// Syscall number register.
pub const REG_SYSCALL: usize = 8;
/// Frame pointer.
pub const REG_FP: usize = 29;
/// Link register, written by BL/BLR.
pub const REG_LR: usize = 30;
