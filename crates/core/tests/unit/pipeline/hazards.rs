//! Data, structural, and memory-ordering hazard tests.
//!
//! Short programs through the full pipeline, checking both the
//! architectural result (hazards must never change values) and the stall
//! accounting (hazards must cost cycles).

use pretty_assertions::assert_eq;

use crate::common::builder::*;
use crate::common::harness::TestContext;

const BASE: u64 = 0x1000;

/// Appends the exit(0) tail to a program body.
fn with_exit(mut words: Vec<u32>) -> Vec<u32> {
    words.extend_from_slice(&[movz(8, 93, 0), movz(0, 0, 0), svc0()]);
    words
}

#[test]
fn raw_chain_resolves_in_order() {
    let mut tc = TestContext::new().load_program(
        BASE,
        &with_exit(vec![
            movz(1, 5, 0),
            add_imm(2, 1, 1), // needs x1
            add_imm(3, 2, 1), // needs x2
            add_imm(4, 3, 1), // needs x3
        ]),
    );

    let exit = tc.run();

    assert_eq!(exit, 0);
    assert_eq!(tc.reg(2), 6);
    assert_eq!(tc.reg(3), 7);
    assert_eq!(tc.reg(4), 8);
    assert!(
        tc.core.sim_stats().stalls_data > 0,
        "a dependent chain must stall issue"
    );
}

#[test]
fn load_use_gets_the_loaded_value() {
    let mut tc = TestContext::new().load_program(
        BASE,
        &with_exit(vec![
            movz(6, 0x8000, 0),
            ldr64(1, 6, 0),
            add_imm(2, 1, 1), // load-use
        ]),
    );
    tc.core.machine.mem.write64(0x8000, 41);

    let exit = tc.run();

    assert_eq!(exit, 0);
    assert_eq!(tc.reg(1), 41);
    assert_eq!(tc.reg(2), 42);
}

#[test]
fn younger_load_waits_for_an_overlapping_store() {
    let mut tc = TestContext::new().load_program(
        BASE,
        &with_exit(vec![
            movz(6, 0x8000, 0),
            movz(1, 0x42, 0),
            str64(1, 6, 0),
            ldr64(2, 6, 0), // overlaps the in-flight store
        ]),
    );

    let exit = tc.run();

    assert_eq!(exit, 0);
    assert_eq!(tc.reg(2), 0x42, "the load must see the older store's data");
    assert!(
        tc.core.sim_stats().stalls_mem > 0,
        "the overlapping load must be held at issue"
    );
}

#[test]
fn disjoint_load_and_store_do_not_interfere() {
    let mut tc = TestContext::new().load_program(
        BASE,
        &with_exit(vec![
            movz(6, 0x8000, 0),
            movz(1, 0x42, 0),
            str64(1, 6, 0),
            ldr64(2, 6, 8), // different 8-byte range
        ]),
    );
    tc.core.machine.mem.write64(0x8008, 7);

    let exit = tc.run();

    assert_eq!(exit, 0);
    assert_eq!(tc.reg(2), 7);
}

#[test]
fn waw_keeps_program_order() {
    let mut tc = TestContext::new().load_program(
        BASE,
        &with_exit(vec![
            movz(1, 1, 0),
            movz(1, 2, 0),    // overwrites
            add_imm(2, 1, 0), // must see 2
        ]),
    );

    let exit = tc.run();

    assert_eq!(exit, 0);
    assert_eq!(tc.reg(1), 2);
    assert_eq!(tc.reg(2), 2);
}

#[test]
fn flag_producer_blocks_the_conditional_branch() {
    // subs; b.eq — the branch may not read stale flags.
    let mut tc = TestContext::new().load_program(
        BASE,
        &with_exit(vec![
            subs_imm(2, 1, 1), // x1=1 -> Z set
            b_cond(1, 8),      // b.ne +8 (not taken)
            movz(3, 7, 0),     // executes on the fall-through path
        ]),
    );
    tc.set_reg(1, 1);
    // Stale flags that would mispredict the branch if read too early.
    tc.core.machine.regs.pstate.z = false;

    let exit = tc.run();

    assert_eq!(exit, 0);
    assert_eq!(tc.reg(3), 7, "B.NE after SUBS(Z) must not be taken");
}

#[test]
fn divider_is_a_structural_bottleneck() {
    // Two independent divides compete for the single divide port.
    let mut tc = TestContext::new().load_program(
        BASE,
        &with_exit(vec![
            movz(1, 100, 0),
            movz(2, 5, 0),
            movz(3, 300, 0),
            movz(4, 3, 0),
            udiv(5, 1, 2),
            udiv(6, 3, 4),
        ]),
    );

    let exit = tc.run();

    assert_eq!(exit, 0);
    assert_eq!(tc.reg(5), 20);
    assert_eq!(tc.reg(6), 100);
    assert!(
        tc.core.sim_stats().stalls_structural > 0,
        "the second divide must wait for the single divide slot"
    );
}
