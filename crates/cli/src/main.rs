//! AArch64 cycle-accurate simulator CLI.
//!
//! This binary is the profile front-end for the core. It performs:
//! 1. **Run:** Load a statically-linked AArch64 Linux ELF and execute it to
//!    completion under the full pipeline or the fast-timing model.
//! 2. **Budgets:** Optional instruction and wall-clock caps.
//! 3. **Profiles:** Optional JSON CPU and memory profile reports for the
//!    calibration tooling.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use std::{fs, process};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use m2sim_core::common::error::{EXIT_BUDGET_EXCEEDED, EXIT_DECODE_FAULT};
use m2sim_core::sim::loader;
use m2sim_core::{Core, SimConfig};

#[derive(Parser, Debug)]
#[command(
    name = "m2sim",
    author,
    version,
    about = "AArch64 cycle-accurate simulator (Apple M2 model)",
    long_about = "Run a statically-linked AArch64 Linux ELF on a cycle-accurate in-order \
                  pipeline model.\n\nExamples:\n  m2sim bench.elf\n  m2sim --fast-timing --max-instr 100000000 bench.elf\n  m2sim --cpuprofile cpu.json --memprofile mem.json bench.elf"
)]
struct Cli {
    /// Statically-linked AArch64 Linux ELF to execute.
    elf: PathBuf,

    /// Use the full cycle-accurate pipeline (default).
    #[arg(long, conflicts_with = "fast_timing")]
    timing: bool,

    /// Use the fast-timing model (collapsed stages, ~10-20x faster).
    #[arg(long)]
    fast_timing: bool,

    /// Stop after this many retired instructions.
    #[arg(long, value_name = "N")]
    max_instr: Option<u64>,

    /// Stop after this much wall-clock time, in seconds.
    #[arg(long, value_name = "SECONDS")]
    duration: Option<f64>,

    /// Write a JSON CPU profile (cycles, stalls, instruction mix) here.
    #[arg(long, value_name = "PATH")]
    cpuprofile: Option<PathBuf>,

    /// Write a JSON memory profile (pages, break, mmap high-water) here.
    #[arg(long, value_name = "PATH")]
    memprofile: Option<PathBuf>,

    /// JSON configuration file overriding the built-in M2 model.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable per-cycle pipeline tracing (set RUST_LOG=trace to see it).
    #[arg(long)]
    trace: bool,

    /// Print the statistics report after the run.
    #[arg(long, default_value_t = true)]
    stats: bool,
}

/// Cycles simulated between wall-clock budget checks.
const DURATION_CHECK_CHUNK: u64 = 1 << 18;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("m2sim: cannot read config '{}': {e}", path.display());
                process::exit(2);
            });
            serde_json::from_str::<SimConfig>(&text).unwrap_or_else(|e| {
                eprintln!("m2sim: bad config '{}': {e}", path.display());
                process::exit(2);
            })
        }
        None => SimConfig::default(),
    };
    if let Some(n) = cli.max_instr {
        config.budget.max_instructions = Some(n);
    }
    config.trace |= cli.trace;

    let program = loader::load_elf(&cli.elf).unwrap_or_else(|e| {
        eprintln!("m2sim: {e}");
        process::exit(2);
    });

    let full_pipeline = cli.timing || !cli.fast_timing;
    let mut core = if full_pipeline {
        Core::new(&config)
    } else {
        Core::new_fast(&config)
    };
    let name = cli.elf.file_name().map_or_else(
        || cli.elf.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    );
    core.load_program(&program, &name);

    let started = Instant::now();
    let exit = match cli.duration.map(Duration::from_secs_f64) {
        None => core.run(),
        Some(limit) => loop {
            if !core.run_cycles(DURATION_CHECK_CHUNK) {
                break core.exit_code().unwrap_or(EXIT_DECODE_FAULT);
            }
            if started.elapsed() >= limit {
                eprintln!("m2sim: wall-clock budget reached, stopping");
                break EXIT_BUDGET_EXCEEDED;
            }
        },
    };

    if core.fp_stubbed() {
        eprintln!(
            "m2sim: warning: {} FP results came from the stub FP unit; numeric output is not meaningful",
            core.sim_stats().fp_stub_results
        );
    }
    if cli.stats {
        core.sim_stats().print();
    }
    if let Some(path) = &cli.cpuprofile {
        write_cpu_profile(&core, path);
    }
    if let Some(path) = &cli.memprofile {
        write_mem_profile(&core, path);
    }

    match exit {
        0..=255 => ExitCode::from(exit as u8),
        EXIT_BUDGET_EXCEEDED => {
            eprintln!("m2sim: halted: budget exceeded");
            ExitCode::from(124)
        }
        other => {
            eprintln!("m2sim: halted with fault (exit code {other})");
            ExitCode::FAILURE
        }
    }
}

/// Writes the CPU profile report: cycle/stall attribution and the
/// instruction mix, as consumed by the calibration scripts.
fn write_cpu_profile(core: &Core, path: &PathBuf) {
    let s = core.sim_stats();
    let profile = serde_json::json!({
        "cycles": s.cycles,
        "instructions": s.instructions_retired,
        "cpi": s.cpi(),
        "flushes": s.flushes,
        "stalls": {
            "data": s.stalls_data,
            "structural": s.stalls_structural,
            "memory": s.stalls_mem,
            "control": s.stalls_control,
        },
        "mix": {
            "alu": s.inst_alu,
            "load": s.inst_load,
            "store": s.inst_store,
            "branch": s.inst_branch,
            "system": s.inst_system,
            "fp": s.inst_fp,
        },
        "syscalls": s.syscalls,
        "fp_stub_results": s.fp_stub_results,
    });
    write_json(path, &profile);
}

/// Writes the memory profile report: footprint and allocator cursors.
fn write_mem_profile(core: &Core, path: &PathBuf) {
    let m = &core.machine;
    let pages = m.mem.pages_allocated();
    let profile = serde_json::json!({
        "pages_allocated": pages,
        "bytes_allocated": pages as u64 * m2sim_core::mem::PAGE_SIZE,
        "brk": m.brk(),
        "mmap_top": m.mmap_top(),
        "mprotect_calls": m.mprotect_ranges().len(),
    });
    write_json(path, &profile);
}

fn write_json(path: &PathBuf, value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            if let Err(e) = fs::write(path, text) {
                eprintln!("m2sim: cannot write profile '{}': {e}", path.display());
            }
        }
        Err(e) => eprintln!("m2sim: cannot serialize profile: {e}"),
    }
}
