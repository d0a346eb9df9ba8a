//! Test harness: a core with program loading and captured output.

use std::io::Write;
use std::sync::{Arc, Mutex};

use m2sim_core::core::arch::Pstate;
use m2sim_core::stats::Stats;
use m2sim_core::{Core, SimConfig};

/// A write sink the test can read back (stands in for host stdout/stderr).
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    /// Everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(mut v) = self.0.lock() {
            v.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A core plus captured program output.
pub struct TestContext {
    pub core: Core,
    out: Capture,
    err: Capture,
}

impl TestContext {
    /// Full cycle-accurate pipeline with the default M2 configuration.
    pub fn new() -> Self {
        Self::build(&SimConfig::default(), false)
    }

    /// Fast-timing model with the default configuration.
    pub fn fast() -> Self {
        Self::build(&SimConfig::default(), true)
    }

    /// Full pipeline with an explicit configuration.
    pub fn with_config(config: &SimConfig) -> Self {
        Self::build(config, false)
    }

    fn build(config: &SimConfig, fast: bool) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let mut core = if fast {
            Core::new_fast(config)
        } else {
            Core::new(config)
        };
        let out = Capture::default();
        let err = Capture::default();
        core.machine
            .set_output(Box::new(out.clone()), Box::new(err.clone()));
        Self { core, out, err }
    }

    /// Writes a sequence of instruction words at `addr` and sets the PC.
    pub fn load_program(mut self, addr: u64, words: &[u32]) -> Self {
        for (i, word) in words.iter().enumerate() {
            self.core.machine.mem.write32(addr + (i as u64) * 4, *word);
        }
        self.core.set_pc(addr);
        self
    }

    /// Sets a general-purpose register.
    pub fn set_reg(&mut self, n: usize, value: u64) {
        self.core.machine.regs.set_x(n, value);
    }

    /// Reads a general-purpose register.
    pub fn reg(&self, n: usize) -> u64 {
        self.core.machine.regs.x(n)
    }

    /// Current PSTATE flags.
    pub fn pstate(&self) -> Pstate {
        self.core.machine.regs.pstate
    }

    /// Runs to completion; returns the exit code.
    pub fn run(&mut self) -> i64 {
        self.core.run()
    }

    /// Advances exactly `n` ticks.
    pub fn ticks(&mut self, n: u64) {
        for _ in 0..n {
            self.core.tick();
        }
    }

    /// Headline counters.
    pub fn stats(&self) -> Stats {
        self.core.stats()
    }

    /// Captured program stdout.
    pub fn stdout(&self) -> Vec<u8> {
        self.out.contents()
    }

    /// Captured program stderr.
    pub fn stderr(&self) -> Vec<u8> {
        self.err.contents()
    }
}
