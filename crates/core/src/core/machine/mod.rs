//! Machine: the architectural-state owner.
//!
//! This module defines the central [`Machine`] structure holding everything a
//! program can observe: memory, registers, PSTATE, the OS-surface state
//! (program break, mmap cursor, TLS), and host I/O sinks. The timing models
//! live outside in [`crate::sim::simulator::Core`]; they borrow the machine
//! for the duration of a tick.

/// Functional executor: operand read, compute, retire.
pub mod execution;

use std::io::{self, Write};
use std::time::Instant;

use crate::common::error::HaltReason;
use crate::config::defaults;
use crate::core::arch::RegisterFile;
use crate::isa::sysreg;
use crate::mem::Memory;
use crate::stats::SimStats;

/// Base of the anonymous-mmap region, far above any static image.
pub const MMAP_BASE: u64 = 0x7000_0000_0000;

/// Architectural state: memory, registers, OS surface, host I/O, statistics.
///
/// Mutated only by instruction retirement and by the syscall handler during
/// the pipeline's drain window, so a single `&mut` borrow per tick is the
/// whole concurrency story.
pub struct Machine {
    /// Flat virtual memory.
    pub mem: Memory,
    /// Register file, PC, and PSTATE.
    pub regs: RegisterFile,
    /// Performance counters.
    pub stats: SimStats,

    /// Why the machine halted, if it has.
    halt: Option<HaltReason>,

    /// Current program break.
    pub(crate) brk: u64,
    /// Lowest address the break may shrink to (end of the loaded image).
    pub(crate) brk_base: u64,
    /// Next address handed out by anonymous mmap.
    pub(crate) mmap_top: u64,
    /// Pointer stored by `set_tid_address`.
    pub(crate) tid_address: u64,
    /// `TPIDR_EL0` (TLS base).
    pub(crate) tls: u64,
    /// Ranges recorded by `mprotect` (accepted, never enforced).
    pub(crate) mprotect_log: Vec<(u64, u64, u64)>,
    /// Host-clock origin for the monotonic clock.
    pub(crate) start: Instant,

    /// Host sink for fd 1.
    pub(crate) stdout: Box<dyn Write + Send>,
    /// Host sink for fd 2.
    pub(crate) stderr: Box<dyn Write + Send>,
}

impl Machine {
    /// Creates a machine with empty memory and zeroed registers, writing
    /// program output to the host's stdout/stderr.
    pub fn new() -> Self {
        Self {
            mem: Memory::new(),
            regs: RegisterFile::new(),
            stats: SimStats::default(),
            halt: None,
            brk: 0,
            brk_base: 0,
            mmap_top: MMAP_BASE,
            tid_address: 0,
            tls: 0,
            mprotect_log: Vec::new(),
            start: Instant::now(),
            stdout: Box::new(io::stdout()),
            stderr: Box::new(io::stderr()),
        }
    }

    /// Replaces the fd 1 / fd 2 sinks (test harnesses capture output here).
    pub fn set_output(&mut self, stdout: Box<dyn Write + Send>, stderr: Box<dyn Write + Send>) {
        self.stdout = stdout;
        self.stderr = stderr;
    }

    /// Seeds the program break (called by the loader with the end of the
    /// highest loaded segment, page-aligned).
    pub fn set_brk(&mut self, brk: u64) {
        self.brk = brk;
        self.brk_base = brk;
    }

    /// Current program break.
    pub fn brk(&self) -> u64 {
        self.brk
    }

    /// High-water mark of the anonymous-mmap region.
    pub fn mmap_top(&self) -> u64 {
        self.mmap_top
    }

    /// Ranges the program asked `mprotect` for (recorded, never enforced).
    pub fn mprotect_ranges(&self) -> &[(u64, u64, u64)] {
        &self.mprotect_log
    }

    /// The pointer registered via `set_tid_address`, if any.
    pub fn tid_address(&self) -> u64 {
        self.tid_address
    }

    /// Halts the machine. The first reason wins; later calls are ignored.
    pub fn halt(&mut self, reason: HaltReason) {
        if self.halt.is_none() {
            self.halt = Some(reason);
        }
    }

    /// True once the machine has halted.
    pub fn halted(&self) -> bool {
        self.halt.is_some()
    }

    /// The halt reason, if halted.
    pub fn halt_reason(&self) -> Option<&HaltReason> {
        self.halt.as_ref()
    }

    /// The signed exit code, if halted.
    pub fn exit_code(&self) -> Option<i64> {
        self.halt.as_ref().map(HaltReason::exit_code)
    }

    /// True if any FP result was produced by the stub unit (callers that
    /// depend on FP values should reject such runs).
    pub fn fp_stubbed(&self) -> bool {
        self.stats.fp_stub_results > 0
    }

    /// Resets architectural and OS state, keeping the host I/O sinks.
    pub fn reset(&mut self) {
        self.mem.clear();
        self.regs = RegisterFile::new();
        self.stats = SimStats::default();
        self.halt = None;
        self.brk = 0;
        self.brk_base = 0;
        self.mmap_top = MMAP_BASE;
        self.tid_address = 0;
        self.tls = 0;
        self.mprotect_log.clear();
        self.start = Instant::now();
    }

    /// Reads a system register (MRS).
    ///
    /// Unrecognized encodings read as zero, which keeps feature-probing
    /// startup code moving without modelling the full ID register space.
    pub fn sysreg_read(&self, id: u32) -> u64 {
        match id {
            sysreg::TPIDR_EL0 | sysreg::TPIDRRO_EL0 => self.tls,
            sysreg::CNTVCT_EL0 => self.stats.cycles,
            sysreg::CNTFRQ_EL0 => defaults::TIMER_FREQ_HZ,
            sysreg::DCZID_EL0 => sysreg::DCZID_VALUE,
            sysreg::MIDR_EL1 | sysreg::FPCR | sysreg::FPSR => 0,
            other => {
                tracing::debug!(sysreg = other, "mrs of unmodelled system register reads zero");
                0
            }
        }
    }

    /// Writes a system register (MSR). Only `TPIDR_EL0` has state; the rest
    /// are write-ignored.
    pub fn sysreg_write(&mut self, id: u32, value: u64) {
        match id {
            sysreg::TPIDR_EL0 => self.tls = value,
            sysreg::FPCR | sysreg::FPSR => {}
            other => {
                tracing::debug!(sysreg = other, value, "msr to unmodelled system register ignored");
            }
        }
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
