//! Configuration system for the AArch64 simulator.
//!
//! This module defines the configuration structures used to parameterize the
//! simulator. It provides:
//! 1. **Defaults:** Baseline timing constants calibrated to an Apple M2-class core.
//! 2. **Structures:** The latency table options and pipeline parameters.
//! 3. **Budgets:** Optional instruction/cycle caps for bounded runs.
//!
//! Configuration is supplied as JSON (CLI `--config`) or use
//! `SimConfig::default()` for the built-in M2 model.

use serde::Deserialize;

/// Default configuration constants for the simulator.
///
/// These values define the baseline timing model when not explicitly
/// overridden in a JSON configuration file. Execute latencies approximate
/// the Apple M2 performance core; issue-port counts are fixed here rather
/// than exposed as options.
pub mod defaults {
    /// Superscalar width: instructions fetched, issued, and retired per cycle.
    pub const PIPELINE_WIDTH: usize = 8;

    /// Integer ALU operation latency in cycles.
    pub const ALU_CYCLES: u64 = 1;

    /// Integer multiply latency in cycles.
    pub const MUL_CYCLES: u64 = 3;

    /// Integer divide latency in cycles.
    pub const DIV_CYCLES: u64 = 7;

    /// Load-to-use latency in cycles (L1 hit).
    pub const LOAD_CYCLES: u64 = 3;

    /// Store execute latency in cycles (data is written at retirement).
    pub const STORE_CYCLES: u64 = 1;

    /// Branch resolution latency in cycles.
    pub const BRANCH_CYCLES: u64 = 1;

    /// Scalar floating-point operation latency in cycles.
    pub const FP_CYCLES: u64 = 3;

    /// Integer ALU issue ports.
    pub const ALU_SLOTS: usize = 6;

    /// Integer multiply issue ports.
    pub const MUL_SLOTS: usize = 2;

    /// Integer divide issue ports (the divider is not pipelined on M2).
    pub const DIV_SLOTS: usize = 1;

    /// Load pipes.
    pub const LOAD_SLOTS: usize = 3;

    /// Store pipes.
    pub const STORE_SLOTS: usize = 2;

    /// Branch units.
    pub const BRANCH_SLOTS: usize = 2;

    /// Floating-point/SIMD pipes.
    pub const FP_SLOTS: usize = 4;

    /// System instruction slots (SVC, MRS/MSR, barriers are serialized).
    pub const SYSTEM_SLOTS: usize = 1;

    /// Cycles lost to a front-end refill after a taken-branch flush in the
    /// fast-timing model (fetch + decode + issue).
    pub const FLUSH_REFILL_CYCLES: u64 = 3;

    /// Virtual counter frequency reported by `CNTFRQ_EL0` (Apple SoCs run
    /// the generic timer at 24 MHz).
    pub const TIMER_FREQ_HZ: u64 = 24_000_000;
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use m2sim_core::config::SimConfig;
///
/// let config = SimConfig::default();
/// assert_eq!(config.latency.pipeline_width, 8);
/// assert_eq!(config.latency.div_cycles, 7);
/// ```
///
/// Deserializing from JSON (typical CLI usage):
///
/// ```
/// use m2sim_core::config::SimConfig;
///
/// let json = r#"{
///     "latency": { "load_cycles": 4, "pipeline_width": 4 },
///     "budget": { "max_instructions": 1000000 }
/// }"#;
///
/// let config: SimConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.latency.load_cycles, 4);
/// assert_eq!(config.latency.alu_cycles, 1);
/// assert_eq!(config.budget.max_instructions, Some(1000000));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimConfig {
    /// Execute latencies and pipeline width.
    #[serde(default)]
    pub latency: LatencyConfig,
    /// Optional run budgets.
    #[serde(default)]
    pub budget: BudgetConfig,
    /// Enable per-cycle pipeline tracing (very verbose).
    #[serde(default)]
    pub trace: bool,
}

/// Latency table options and pipeline width.
///
/// These are the recognized timing options; everything else in the timing
/// model (issue-port counts, flush refill) is a fixed M2 calibration
/// constant in [`defaults`].
#[derive(Debug, Clone, Deserialize)]
pub struct LatencyConfig {
    /// Integer ALU latency in cycles.
    #[serde(default = "LatencyConfig::default_alu")]
    pub alu_cycles: u64,

    /// Integer multiply latency in cycles.
    #[serde(default = "LatencyConfig::default_mul")]
    pub mul_cycles: u64,

    /// Integer divide latency in cycles.
    #[serde(default = "LatencyConfig::default_div")]
    pub div_cycles: u64,

    /// Load-to-use latency in cycles.
    #[serde(default = "LatencyConfig::default_load")]
    pub load_cycles: u64,

    /// Store execute latency in cycles.
    #[serde(default = "LatencyConfig::default_store")]
    pub store_cycles: u64,

    /// Branch resolution latency in cycles.
    #[serde(default = "LatencyConfig::default_branch")]
    pub branch_cycles: u64,

    /// Scalar FP latency in cycles.
    #[serde(default = "LatencyConfig::default_fp")]
    pub fp_cycles: u64,

    /// Superscalar width (instructions per cycle through every stage).
    #[serde(default = "LatencyConfig::default_width")]
    pub pipeline_width: usize,
}

impl LatencyConfig {
    /// Returns the default ALU latency.
    fn default_alu() -> u64 {
        defaults::ALU_CYCLES
    }

    /// Returns the default multiply latency.
    fn default_mul() -> u64 {
        defaults::MUL_CYCLES
    }

    /// Returns the default divide latency.
    fn default_div() -> u64 {
        defaults::DIV_CYCLES
    }

    /// Returns the default load latency.
    fn default_load() -> u64 {
        defaults::LOAD_CYCLES
    }

    /// Returns the default store latency.
    fn default_store() -> u64 {
        defaults::STORE_CYCLES
    }

    /// Returns the default branch latency.
    fn default_branch() -> u64 {
        defaults::BRANCH_CYCLES
    }

    /// Returns the default FP latency.
    fn default_fp() -> u64 {
        defaults::FP_CYCLES
    }

    /// Returns the default pipeline width.
    fn default_width() -> usize {
        defaults::PIPELINE_WIDTH
    }
}

impl Default for LatencyConfig {
    /// Creates the Apple M2 default timing model.
    fn default() -> Self {
        Self {
            alu_cycles: defaults::ALU_CYCLES,
            mul_cycles: defaults::MUL_CYCLES,
            div_cycles: defaults::DIV_CYCLES,
            load_cycles: defaults::LOAD_CYCLES,
            store_cycles: defaults::STORE_CYCLES,
            branch_cycles: defaults::BRANCH_CYCLES,
            fp_cycles: defaults::FP_CYCLES,
            pipeline_width: defaults::PIPELINE_WIDTH,
        }
    }
}

/// Optional run budgets.
///
/// When a budget is exceeded the core halts with the distinguished
/// budget-exceeded exit sentinel rather than a program exit code.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct BudgetConfig {
    /// Stop after this many retired instructions.
    #[serde(default)]
    pub max_instructions: Option<u64>,

    /// Stop after this many simulated cycles.
    #[serde(default)]
    pub max_cycles: Option<u64>,
}
