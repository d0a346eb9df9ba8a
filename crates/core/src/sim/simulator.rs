//! The `Core` façade.
//!
//! Owns the machine and a timing model side-by-side and exposes the whole
//! run contract: `set_pc`, `tick`, `run`, `run_cycles`, `halted`,
//! `exit_code`, `stats`, `reset`. Keeping the timing model outside the
//! machine avoids the borrow-splitting hack of storing the pipeline inside
//! the state it mutates: each tick borrows the machine once.

use crate::common::error::HaltReason;
use crate::config::SimConfig;
use crate::core::machine::Machine;
use crate::core::pipeline::fast::FastTiming;
use crate::core::pipeline::Pipeline;
use crate::stats::{SimStats, Stats};

/// Which timing model drives the machine.
pub enum TimingModel {
    /// Full cycle-accurate pipeline.
    Pipelined(Box<Pipeline>),
    /// Collapsed fast-timing model.
    Fast(FastTiming),
}

/// Top-level simulator: architectural state plus a timing model.
pub struct Core {
    /// Architectural state (registers, memory, OS surface).
    pub machine: Machine,
    timing: TimingModel,
    config: SimConfig,
}

impl Core {
    /// Creates a core driven by the full cycle-accurate pipeline.
    pub fn new(config: &SimConfig) -> Self {
        Self {
            machine: Machine::new(),
            timing: TimingModel::Pipelined(Box::new(Pipeline::new(config))),
            config: config.clone(),
        }
    }

    /// Creates a core driven by the fast-timing model.
    pub fn new_fast(config: &SimConfig) -> Self {
        Self {
            machine: Machine::new(),
            timing: TimingModel::Fast(FastTiming::new(config)),
            config: config.clone(),
        }
    }

    /// Loads a program image (segments, break, stack) and seeds the PC.
    pub fn load_program(&mut self, program: &crate::sim::loader::Program, name: &str) {
        crate::sim::loader::load(&mut self.machine, program, name);
        self.set_pc(program.entry);
    }

    /// Seeds the architectural PC and redirects fetch.
    pub fn set_pc(&mut self, pc: u64) {
        self.machine.regs.set_pc(pc);
        if let TimingModel::Pipelined(p) = &mut self.timing {
            p.set_fetch_pc(pc);
        }
    }

    /// Advances the core by one cycle (full model) or one instruction
    /// (fast model). Each call counts cycles even after a halt, so a tick
    /// loop's cycle count equals the number of calls.
    pub fn tick(&mut self) {
        match &mut self.timing {
            TimingModel::Pipelined(p) => p.tick(&mut self.machine),
            TimingModel::Fast(f) => f.step(&mut self.machine),
        }
        if let Some(cap) = self.config.budget.max_cycles {
            if self.machine.stats.cycles >= cap && !self.machine.halted() {
                self.machine.halt(HaltReason::BudgetExceeded);
            }
        }
    }

    /// Runs until the machine halts; returns the signed exit code.
    ///
    /// Program exits return `X0 & 0xFF`; internal faults return the
    /// negative sentinels of the exit contract.
    pub fn run(&mut self) -> i64 {
        while !self.machine.halted() {
            self.tick();
        }
        self.machine
            .exit_code()
            .unwrap_or(crate::common::error::EXIT_DECODE_FAULT)
    }

    /// Runs for at most `n` more cycles. Returns true while still running.
    pub fn run_cycles(&mut self, n: u64) -> bool {
        for _ in 0..n {
            if self.machine.halted() {
                break;
            }
            self.tick();
        }
        !self.machine.halted()
    }

    /// True once the core has halted.
    pub fn halted(&self) -> bool {
        self.machine.halted()
    }

    /// The signed exit code, once halted.
    pub fn exit_code(&self) -> Option<i64> {
        self.machine.exit_code()
    }

    /// The headline counter snapshot.
    pub fn stats(&self) -> Stats {
        Stats::from(&self.machine.stats)
    }

    /// The full statistics record.
    pub fn sim_stats(&self) -> &SimStats {
        &self.machine.stats
    }

    /// True if any FP result came from the stub unit.
    pub fn fp_stubbed(&self) -> bool {
        self.machine.fp_stubbed()
    }

    /// Resets machine and timing model; host I/O sinks are kept.
    pub fn reset(&mut self) {
        self.machine.reset();
        match &mut self.timing {
            TimingModel::Pipelined(p) => **p = Pipeline::new(&self.config),
            TimingModel::Fast(f) => *f = FastTiming::new(&self.config),
        }
    }

    /// The pipeline, when the full model is driving (test observability).
    pub fn pipeline(&self) -> Option<&Pipeline> {
        match &self.timing {
            TimingModel::Pipelined(p) => Some(p),
            TimingModel::Fast(_) => None,
        }
    }
}
