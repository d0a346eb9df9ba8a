//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for the AArch64 simulator. It
//! provides:
//! 1. **Cycle and CPI:** Total cycles, retired instructions, and derived
//!    metrics (CPI, IPC, MIPS).
//! 2. **Instruction mix:** Counts by category (ALU, load, store, branch,
//!    system, FP).
//! 3. **Stalls:** Data, structural, memory-ordering, and control stall cycles.
//! 4. **Flushes:** Taken-branch pipeline flushes.
//! 5. **OS surface:** Syscall count and stubbed-FP result count.

use std::time::Instant;

/// Simulation statistics tracking all performance counters.
///
/// All counters are monotonic during a run and reset with the core. Two runs
/// of the same program produce identical counter values; only the wall-clock
/// derived rates differ.
#[derive(Clone)]
pub struct SimStats {
    start_time: Instant,
    /// Total simulated cycles elapsed.
    pub cycles: u64,
    /// Number of instructions retired.
    pub instructions_retired: u64,

    /// Count of load instructions retired.
    pub inst_load: u64,
    /// Count of store instructions retired.
    pub inst_store: u64,
    /// Count of branch instructions retired.
    pub inst_branch: u64,
    /// Count of ALU (non-load/store/branch/system) instructions retired.
    pub inst_alu: u64,
    /// Count of system (SVC, MRS/MSR, hint) instructions retired.
    pub inst_system: u64,
    /// Count of FP-class instructions retired (stub unit).
    pub inst_fp: u64,

    /// Stall cycles due to data hazards (RAW/WAW on registers or flags).
    pub stalls_data: u64,
    /// Stall cycles due to structural hazards (no free execute slot).
    pub stalls_structural: u64,
    /// Stall cycles due to memory-ordering hazards (load behind a matching store).
    pub stalls_mem: u64,
    /// Stall cycles due to control flow (fetch stopped at an unresolved branch
    /// or syscall drain).
    pub stalls_control: u64,

    /// Pipeline flushes caused by taken branches resolved at writeback.
    pub flushes: u64,

    /// Number of syscalls dispatched.
    pub syscalls: u64,
    /// Number of FP results produced by the stub FP unit.
    pub fp_stub_results: u64,
}

impl Default for SimStats {
    /// Returns the default value.
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            inst_load: 0,
            inst_store: 0,
            inst_branch: 0,
            inst_alu: 0,
            inst_system: 0,
            inst_fp: 0,
            stalls_data: 0,
            stalls_structural: 0,
            stalls_mem: 0,
            stalls_control: 0,
            flushes: 0,
            syscalls: 0,
            fp_stub_results: 0,
        }
    }
}

impl SimStats {
    /// Total stall cycles across all causes.
    pub fn stalls(&self) -> u64 {
        self.stalls_data + self.stalls_structural + self.stalls_mem + self.stalls_control
    }

    /// Cycles per instruction. Returns 0.0 before anything retires.
    pub fn cpi(&self) -> f64 {
        if self.instructions_retired == 0 {
            0.0
        } else {
            self.cycles as f64 / self.instructions_retired as f64
        }
    }

    /// Prints a human-readable report to stdout.
    pub fn print(&self) {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = self.cycles.max(1);
        let instr = self.instructions_retired.max(1);
        let ipc = self.instructions_retired as f64 / cyc as f64;
        let mips = (self.instructions_retired as f64 / seconds) / 1_000_000.0;

        println!("\n==========================================================");
        println!("M2SIM AARCH64 SIMULATION STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {seconds:.4} s");
        println!("sim_cycles               {}", self.cycles);
        println!("sim_insts                {}", self.instructions_retired);
        println!("sim_ipc                  {ipc:.4}");
        println!("sim_cpi                  {:.4}", self.cpi());
        println!("sim_mips                 {mips:.2}");
        println!("----------------------------------------------------------");
        println!("CORE BREAKDOWN");
        let pct = |v: u64| (v as f64 / cyc as f64) * 100.0;
        println!("  stalls.data            {} ({:.2}%)", self.stalls_data, pct(self.stalls_data));
        println!(
            "  stalls.structural      {} ({:.2}%)",
            self.stalls_structural,
            pct(self.stalls_structural)
        );
        println!("  stalls.memory          {} ({:.2}%)", self.stalls_mem, pct(self.stalls_mem));
        println!(
            "  stalls.control         {} ({:.2}%)",
            self.stalls_control,
            pct(self.stalls_control)
        );
        println!("  flushes                {}", self.flushes);
        println!("----------------------------------------------------------");
        println!("INSTRUCTION MIX");
        let mix = |v: u64| (v as f64 / instr as f64) * 100.0;
        println!("  op.alu                 {} ({:.2}%)", self.inst_alu, mix(self.inst_alu));
        println!("  op.load                {} ({:.2}%)", self.inst_load, mix(self.inst_load));
        println!("  op.store               {} ({:.2}%)", self.inst_store, mix(self.inst_store));
        println!("  op.branch              {} ({:.2}%)", self.inst_branch, mix(self.inst_branch));
        println!("  op.system              {} ({:.2}%)", self.inst_system, mix(self.inst_system));
        println!("  op.fp                  {} ({:.2}%)", self.inst_fp, mix(self.inst_fp));
        println!("----------------------------------------------------------");
        println!("OS SURFACE");
        println!("  syscalls               {}", self.syscalls);
        println!("  fp_stub_results        {}", self.fp_stub_results);
        println!("==========================================================");
    }
}

/// The externally visible counter snapshot of the run contract.
///
/// Callers that only need the headline numbers read this instead of the full
/// [`SimStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    /// Total simulated cycles.
    pub cycles: u64,
    /// Instructions retired.
    pub instructions: u64,
    /// Total stall cycles.
    pub stalls: u64,
    /// Taken-branch flushes.
    pub flushes: u64,
}

impl From<&SimStats> for Stats {
    fn from(s: &SimStats) -> Self {
        Self {
            cycles: s.cycles,
            instructions: s.instructions_retired,
            stalls: s.stalls(),
            flushes: s.flushes,
        }
    }
}
