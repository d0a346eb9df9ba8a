//! Fast-timing model behavior.
//!
//! The collapsed model must produce the same architectural results as the
//! full pipeline, with cycle accounting that still reflects hazards.

use pretty_assertions::assert_eq;

use crate::common::builder::*;
use crate::common::harness::TestContext;
use m2sim_core::common::error::EXIT_BUDGET_EXCEEDED;
use m2sim_core::config::{BudgetConfig, SimConfig};
use m2sim_core::Core;

const BASE: u64 = 0x1000;

fn looped_sum() -> Vec<u32> {
    // x1 = 0; x0 = 5; loop: add x1, x1, x0; subs x0, x0, #1; b.ne loop;
    // exit(x1 & 0xff)  -> 15
    vec![
        movz(1, 0, 0),
        movz(0, 5, 0),
        add_reg(1, 1, 0),   // 0x1008
        subs_imm(0, 0, 1),
        b_cond(1, -8),      // b.ne -> 0x1008
        movz(8, 93, 0),
        add_imm(0, 1, 0),   // exit code = x1
        svc0(),
    ]
}

#[test]
fn fast_model_matches_pipeline_results() {
    let mut fast = TestContext::fast().load_program(BASE, &looped_sum());
    let mut full = TestContext::new().load_program(BASE, &looped_sum());

    let fast_exit = fast.run();
    let full_exit = full.run();

    assert_eq!(fast_exit, 15);
    assert_eq!(full_exit, 15);
    assert_eq!(fast.reg(1), full.reg(1));
    assert_eq!(
        fast.stats().instructions,
        full.stats().instructions,
        "both models retire the same instruction stream"
    );
}

#[test]
fn fast_model_charges_hazards() {
    let mut tc = TestContext::fast().load_program(BASE, &looped_sum());
    let _ = tc.run();
    let s = tc.stats();

    assert!(s.cycles >= s.instructions, "CPI cannot drop below 1.0 here");
    assert_eq!(s.flushes, 4, "one flush per taken B.NE iteration");
    assert!(s.stalls > 0, "load-free RAW chains plus flush refills");
}

#[test]
fn fast_model_honors_the_instruction_budget() {
    let config = SimConfig {
        budget: BudgetConfig {
            max_instructions: Some(100),
            max_cycles: None,
        },
        ..SimConfig::default()
    };
    let mut core = Core::new_fast(&config);
    core.machine.mem.write32(BASE, b(0)); // B .
    core.set_pc(BASE);

    let exit = core.run();

    assert_eq!(exit, EXIT_BUDGET_EXCEEDED);
    assert_eq!(core.stats().instructions, 100);
}

#[test]
fn fast_model_is_deterministic() {
    let run = || {
        let mut tc = TestContext::fast().load_program(BASE, &looped_sum());
        let exit = tc.run();
        (exit, tc.stats())
    };
    assert_eq!(run(), run());
}
