//! Execute latency table and functional-unit kinds.
//!
//! Maps every opcode class to `(execute cycles, unit kind)`. The table is
//! built from [`LatencyConfig`], so callers can inject their own timing; the
//! default numbers approximate the Apple M2 performance core. Issue-port
//! counts per unit kind are fixed calibration constants.

use crate::config::{defaults, LatencyConfig};
use crate::isa::instruction::Op;

/// Functional-unit kinds with dedicated execute slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Integer ALU.
    Alu,
    /// Integer multiplier.
    Mul,
    /// Integer divider.
    Div,
    /// Load pipe.
    MemLoad,
    /// Store pipe.
    MemStore,
    /// Branch unit.
    Branch,
    /// FP/SIMD pipe (stub results, real occupancy).
    Fp,
    /// Serialized system slot (SVC, MRS/MSR, barriers).
    System,
}

/// Number of distinct unit kinds.
pub const UNIT_KINDS: usize = 8;

impl UnitKind {
    /// Dense index for per-kind bookkeeping arrays.
    pub fn index(self) -> usize {
        match self {
            Self::Alu => 0,
            Self::Mul => 1,
            Self::Div => 2,
            Self::MemLoad => 3,
            Self::MemStore => 4,
            Self::Branch => 5,
            Self::Fp => 6,
            Self::System => 7,
        }
    }

    /// Execute slots available for this kind (M2 port counts).
    pub fn slots(self) -> usize {
        match self {
            Self::Alu => defaults::ALU_SLOTS,
            Self::Mul => defaults::MUL_SLOTS,
            Self::Div => defaults::DIV_SLOTS,
            Self::MemLoad => defaults::LOAD_SLOTS,
            Self::MemStore => defaults::STORE_SLOTS,
            Self::Branch => defaults::BRANCH_SLOTS,
            Self::Fp => defaults::FP_SLOTS,
            Self::System => defaults::SYSTEM_SLOTS,
        }
    }
}

/// Per-opcode-class execute latency and unit assignment.
#[derive(Debug, Clone)]
pub struct LatencyTable {
    alu: u64,
    mul: u64,
    div: u64,
    load: u64,
    store: u64,
    branch: u64,
    fp: u64,
}

impl LatencyTable {
    /// Builds the table from configuration. Latencies are clamped to at
    /// least one cycle.
    pub fn new(config: &LatencyConfig) -> Self {
        Self {
            alu: config.alu_cycles.max(1),
            mul: config.mul_cycles.max(1),
            div: config.div_cycles.max(1),
            load: config.load_cycles.max(1),
            store: config.store_cycles.max(1),
            branch: config.branch_cycles.max(1),
            fp: config.fp_cycles.max(1),
        }
    }

    /// The unit kind an opcode class executes on.
    pub fn unit(op: Op) -> UnitKind {
        match op {
            Op::Madd | Op::Msub | Op::Smaddl | Op::Smsubl | Op::Umaddl | Op::Umsubl
            | Op::Smulh | Op::Umulh => UnitKind::Mul,
            Op::Udiv | Op::Sdiv => UnitKind::Div,
            op if op.is_load() => UnitKind::MemLoad,
            op if op.is_store() => UnitKind::MemStore,
            op if op.is_branch() => UnitKind::Branch,
            Op::FpOp => UnitKind::Fp,
            Op::Svc | Op::Mrs | Op::Msr | Op::Barrier | Op::Invalid => UnitKind::System,
            _ => UnitKind::Alu,
        }
    }

    /// Execute cycles for an opcode class.
    pub fn cycles(&self, op: Op) -> u64 {
        match Self::unit(op) {
            UnitKind::Alu => self.alu,
            UnitKind::Mul => self.mul,
            UnitKind::Div => self.div,
            UnitKind::MemLoad => self.load,
            UnitKind::MemStore => self.store,
            UnitKind::Branch => self.branch,
            UnitKind::Fp => self.fp,
            UnitKind::System => 1,
        }
    }
}

impl Default for LatencyTable {
    fn default() -> Self {
        Self::new(&LatencyConfig::default())
    }
}
