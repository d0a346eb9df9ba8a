//! Architectural invariants.
//!
//! Retirement-rate bounds, scoreboard quiescence, functional/pipeline
//! equivalence, determinism, and the XZR/SP distinction, each checked on
//! running programs rather than in isolation.

use pretty_assertions::assert_eq;

use crate::common::builder::*;
use crate::common::harness::TestContext;
use m2sim_core::core::machine::{execution, Machine};

const BASE: u64 = 0x1000;

/// A program touching arithmetic, flags, branches, and memory, ending in
/// exit(7). Used by the equivalence and determinism checks.
fn mixed_program() -> Vec<u32> {
    vec![
        movz(0, 10, 0),            // x0 = 10
        movz(1, 3, 0),             // x1 = 3
        madd(2, 0, 1, 31),         // x2 = 30
        subs_imm(4, 2, 30),        // x4 = 0, Z set
        b_cond(0, 12),             // b.eq +12 (taken)
        movz(5, 0xBAD, 0),         //   (flushed)
        b(8),                      //   (flushed)
        movz(5, 0x600D, 0),        // x5 = 0x600d
        movz(6, 0x8000, 0),        // x6 = scratch base
        str64(2, 6, 0),            // [0x8000] = 30
        ldr64(7, 6, 0),            // x7 = 30
        strb(1, 6, 9),             // [0x8009] = 3
        ldrb(9, 6, 9),             // x9 = 3
        stp_pre(2, 7, 6, -16),     // x6 = 0x7ff0, [0x7ff0]=30, [0x7ff8]=30
        ldp_post(10, 11, 6, 16),   // x10 = x11 = 30, x6 = 0x8000
        udiv(12, 2, 1),            // x12 = 10
        movz(8, 93, 0),            // exit
        movz(0, 7, 0),
        svc0(),
    ]
}

#[test]
fn retirement_never_exceeds_width_times_cycles() {
    let mut tc = TestContext::new().load_program(
        BASE,
        &[
            0xF100_0400, // SUBS X0, X0, #1
            0x54FF_FFE1, // B.NE .-4
            svc0(),
        ],
    );
    tc.set_reg(0, 5);
    tc.set_reg(8, 93);

    for _ in 0..300 {
        tc.ticks(1);
        let s = tc.stats();
        assert!(
            s.instructions <= s.cycles * 8,
            "retirement bound violated: {} instructions in {} cycles",
            s.instructions,
            s.cycles
        );
        if tc.core.halted() {
            break;
        }
    }
    assert!(tc.core.halted());
}

#[test]
fn scoreboard_is_quiescent_after_a_run() {
    let mut tc = TestContext::new().load_program(BASE, &mixed_program());
    let exit = tc.run();
    assert_eq!(exit, 7);

    let pipeline = tc.core.pipeline().expect("full model");
    assert_eq!(pipeline.in_flight(), 0);
    assert!(
        pipeline.scoreboard().is_quiescent(),
        "every pending-writer count must be zero at quiescence"
    );
}

#[test]
fn pipeline_matches_the_functional_executor() {
    // Pipeline run.
    let mut tc = TestContext::new().load_program(BASE, &mixed_program());
    let pipeline_exit = tc.run();

    // Pure functional run of the same image.
    let mut m = Machine::new();
    for (i, word) in mixed_program().iter().enumerate() {
        m.mem.write32(BASE + (i as u64) * 4, *word);
    }
    m.regs.set_pc(BASE);
    for _ in 0..10_000 {
        if m.halted() {
            break;
        }
        execution::step(&mut m).expect("mixed program decodes fully");
    }

    assert_eq!(m.exit_code(), Some(pipeline_exit), "exit codes must agree");
    for n in 0..31 {
        assert_eq!(
            m.regs.x(n),
            tc.core.machine.regs.x(n),
            "x{n} differs between functional and pipeline runs"
        );
    }
    assert_eq!(m.regs.sp(), tc.core.machine.regs.sp());
    assert_eq!(m.regs.pstate, tc.core.machine.regs.pstate);
    for addr in [0x8000u64, 0x8009, 0x7FF0, 0x7FF8] {
        assert_eq!(
            m.mem.read64(addr),
            tc.core.machine.mem.read64(addr),
            "memory at {addr:#x} differs"
        );
    }
}

#[test]
fn repeated_runs_produce_identical_stats() {
    let run = || {
        let mut tc = TestContext::new().load_program(BASE, &mixed_program());
        let exit = tc.run();
        (exit, tc.stats())
    };

    let (exit_a, stats_a) = run();
    let (exit_b, stats_b) = run();

    assert_eq!(exit_a, exit_b);
    assert_eq!(stats_a, stats_b, "stats must be deterministic");
}

#[test]
fn xzr_discards_writes_and_sp_stays_separate() {
    // ADDS XZR, X1, #0 is CMP: the result is discarded, flags are kept.
    // The SP-encoded ADD must update the real stack pointer, not XZR.
    let mut tc = TestContext::new().load_program(
        BASE,
        &[
            adds_imm(31, 1, 0),  // CMP x1, #0 (writes xzr)
            add_imm(31, 31, 32), // ADD SP, SP, #32 (immediate form: 31 = SP)
            movz(8, 93, 0),
            movz(0, 0, 0),
            svc0(),
        ],
    );
    tc.set_reg(1, 5);
    tc.core.machine.regs.set_sp(0x9000);

    let exit = tc.run();

    assert_eq!(exit, 0);
    assert!(!tc.pstate().z, "CMP 5, #0 clears Z");
    assert_eq!(
        tc.core.machine.regs.sp(),
        0x9020,
        "SP-encoded form must target SP, not XZR"
    );
}

#[test]
fn each_taken_branch_flushes_exactly_once() {
    let mut tc = TestContext::new().load_program(
        BASE,
        &[
            b(8),            // taken -> 0x1008
            nop(),           //   (flushed)
            b(8),            // taken -> 0x1010
            nop(),           //   (flushed)
            movz(8, 93, 0),
            movz(0, 0, 0),
            svc0(),
        ],
    );

    let exit = tc.run();

    assert_eq!(exit, 0);
    assert_eq!(
        tc.stats().flushes,
        2,
        "one flush per taken branch, and the SVC drain is not a flush"
    );
}
