//! End-to-end scenarios with literal values.
//!
//! Each test builds a small program at a fixed address, runs it through the
//! full pipeline, and checks the architectural and statistical outcome.

use pretty_assertions::assert_eq;

use crate::common::builder::*;
use crate::common::harness::TestContext;
use m2sim_core::common::error::{EXIT_BUDGET_EXCEEDED, EXIT_DECODE_FAULT};
use m2sim_core::config::SimConfig;

const BASE: u64 = 0x1000;

#[test]
fn svc_exit_halts_with_x0() {
    let mut tc = TestContext::new().load_program(BASE, &[svc0()]);
    tc.set_reg(8, 93);
    tc.set_reg(0, 42);

    let exit = tc.run();

    assert_eq!(exit, 42);
    assert!(tc.core.halted());
    assert!(tc.stats().instructions >= 1);
}

#[test]
fn subs_sets_z_on_its_way_to_exit() {
    let mut tc = TestContext::new().load_program(
        BASE,
        &[
            0xF100_0400, // SUBS X0, X0, #1
            svc0(),
        ],
    );
    tc.set_reg(0, 1);
    tc.set_reg(8, 93);

    let exit = tc.run();

    assert_eq!(exit, 0);
    assert!(tc.pstate().z);
}

#[test]
fn backward_branch_loops_and_flushes() {
    let mut tc = TestContext::new().load_program(
        BASE,
        &[
            0xF100_0400, // SUBS X0, X0, #1
            0x54FF_FFE1, // B.NE .-4
            svc0(),
        ],
    );
    tc.set_reg(0, 2);
    tc.set_reg(8, 93);

    let exit = tc.run();
    let stats = tc.stats();

    assert!(tc.core.halted());
    assert_eq!(exit, 0);
    assert!(stats.flushes >= 1, "taken B.NE must flush");
    assert!(stats.instructions >= 5, "two loop iterations plus the SVC");
}

#[test]
fn add_immediate_retires_within_ten_ticks() {
    let mut tc = TestContext::new().load_program(
        BASE,
        &[0x9100_A821, nop(), nop(), nop(), nop()], // ADD X1, X1, #42
    );

    tc.ticks(10);

    assert_eq!(tc.reg(1), 42);
    assert_eq!(tc.stats().cycles, 10);
}

#[test]
fn write_syscall_reaches_host_stdout() {
    let mut tc = TestContext::new().load_program(
        BASE,
        &[
            svc0(),           // write(1, 0x2000, 3)
            movz(8, 93, 0),   // exit
            movz(0, 0, 0),
            svc0(),
        ],
    );
    tc.core.machine.mem.write_bytes(0x2000, b"hi\n");
    tc.set_reg(8, 64);
    tc.set_reg(0, 1);
    tc.set_reg(1, 0x2000);
    tc.set_reg(2, 3);

    let exit = tc.run();

    assert_eq!(exit, 0);
    assert_eq!(tc.stdout(), b"hi\n");
}

#[test]
fn budget_halts_a_tight_loop_at_exactly_1000() {
    let config = SimConfig {
        budget: m2sim_core::config::BudgetConfig {
            max_instructions: Some(1000),
            max_cycles: None,
        },
        ..SimConfig::default()
    };
    let mut tc = TestContext::with_config(&config).load_program(BASE, &[b(0)]); // B .

    let exit = tc.run();

    assert!(tc.core.halted());
    assert_eq!(exit, EXIT_BUDGET_EXCEEDED);
    assert_eq!(tc.stats().instructions, 1000);
}

#[test]
fn undecodable_word_faults_with_the_decode_sentinel() {
    let mut tc = TestContext::new().load_program(BASE, &[nop(), 0x0000_0000]);

    let exit = tc.run();

    assert!(tc.core.halted());
    assert_eq!(exit, EXIT_DECODE_FAULT);
}

#[test]
fn unknown_syscall_reports_enosys_and_continues() {
    let mut tc = TestContext::new().load_program(
        BASE,
        &[
            svc0(),         // syscall 9999 -> x0 = -ENOSYS, run continues
            movz(8, 93, 0),
            movz(0, 5, 0),
            svc0(),
        ],
    );
    tc.set_reg(8, 9999);

    let exit = tc.run();

    assert_eq!(exit, 5, "unknown syscall must not halt the core");
}
