//! System register identifiers for MRS/MSR.
//!
//! The user-mode surface is tiny: thread-local storage, the virtual counter,
//! and a handful of identification/FP-control registers that read as zero.
//! Identifiers are the 15-bit `o0:op1:CRn:CRm:op2` field packed exactly as
//! encoded in the instruction word (bits 19:5).

/// `TPIDR_EL0` — user thread pointer (TLS base).
pub const TPIDR_EL0: u32 = 0b1_011_1101_0000_010;

/// `TPIDRRO_EL0` — read-only thread pointer.
pub const TPIDRRO_EL0: u32 = 0b1_011_1101_0000_011;

/// `CNTVCT_EL0` — virtual counter value.
pub const CNTVCT_EL0: u32 = 0b1_011_1110_0000_010;

/// `CNTFRQ_EL0` — counter frequency.
pub const CNTFRQ_EL0: u32 = 0b1_011_1110_0000_000;

/// `MIDR_EL1` — main ID register (reads as zero here).
pub const MIDR_EL1: u32 = 0b1_000_0000_0000_000;

/// `FPCR` — floating-point control register (stub FP: reads as zero).
pub const FPCR: u32 = 0b1_011_0100_0100_000;

/// `FPSR` — floating-point status register (stub FP: reads as zero).
pub const FPSR: u32 = 0b1_011_0100_0100_001;

/// `DCZID_EL0` — data cache zero ID (DC ZVA prohibited: bit 4 set).
pub const DCZID_EL0: u32 = 0b1_011_0000_0000_111;

/// Value returned for `DCZID_EL0`: DZP=1 (DC ZVA not supported).
pub const DCZID_VALUE: u64 = 1 << 4;

/// Formats a system-register id for trace output.
pub fn name(id: u32) -> &'static str {
    match id {
        TPIDR_EL0 => "tpidr_el0",
        TPIDRRO_EL0 => "tpidrro_el0",
        CNTVCT_EL0 => "cntvct_el0",
        CNTFRQ_EL0 => "cntfrq_el0",
        MIDR_EL1 => "midr_el1",
        FPCR => "fpcr",
        FPSR => "fpsr",
        DCZID_EL0 => "dczid_el0",
        _ => "sysreg",
    }
}
