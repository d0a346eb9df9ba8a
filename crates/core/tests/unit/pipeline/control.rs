//! Control hazards: flushes, redirects, call/return.

use pretty_assertions::assert_eq;

use crate::common::builder::*;
use crate::common::harness::TestContext;

const BASE: u64 = 0x1000;

fn with_exit(mut words: Vec<u32>) -> Vec<u32> {
    words.extend_from_slice(&[movz(8, 93, 0), movz(0, 0, 0), svc0()]);
    words
}

#[test]
fn taken_branch_flushes_the_wrong_path() {
    // 0x1000: x1 = 10
    // 0x1004: x2 = 20
    // 0x1008: b +8 -> 0x1010
    // 0x100c: x3 = 99        (must be flushed)
    // 0x1010: x4 = 42        (branch target)
    let mut tc = TestContext::new().load_program(
        BASE,
        &with_exit(vec![
            movz(1, 10, 0),
            movz(2, 20, 0),
            b(8),
            movz(3, 99, 0),
            movz(4, 42, 0),
        ]),
    );

    let exit = tc.run();

    assert_eq!(exit, 0);
    assert_eq!(tc.reg(1), 10);
    assert_eq!(tc.reg(2), 20);
    assert_eq!(tc.reg(3), 0, "the wrong-path move must be flushed");
    assert_eq!(tc.reg(4), 42);
    assert_eq!(tc.stats().flushes, 1);
}

#[test]
fn not_taken_branch_continues_sequentially() {
    let mut tc = TestContext::new().load_program(
        BASE,
        &with_exit(vec![
            movz(1, 10, 0),
            cbnz(9, 8),       // x9 == 0: not taken
            movz(3, 33, 0),   // executes
        ]),
    );

    let exit = tc.run();

    assert_eq!(exit, 0);
    assert_eq!(tc.reg(3), 33);
    assert_eq!(tc.stats().flushes, 0, "a not-taken branch flushes nothing");
}

#[test]
fn call_and_return_through_the_pipeline() {
    // 0x1000: blr x5 -> 0x2000
    // 0x1004: x1 = 1 (after return)
    // then exit; callee at 0x2000: x9 = 7; ret
    let mut tc = TestContext::new()
        .load_program(BASE, &with_exit(vec![blr(5), movz(1, 1, 0)]))
        .load_program(0x2000, &[movz(9, 7, 0), ret()]);
    tc.core.set_pc(BASE);
    tc.set_reg(5, 0x2000);

    let exit = tc.run();

    assert_eq!(exit, 0);
    assert_eq!(tc.reg(9), 7);
    assert_eq!(tc.reg(1), 1);
    assert_eq!(tc.reg(30), BASE + 4, "BLR links past itself");
    assert_eq!(tc.stats().flushes, 2, "BLR and RET each redirect once");
}

#[test]
fn fetch_stops_at_an_unresolved_branch() {
    // While the CBZ is unresolved nothing past it may issue; the stores
    // behind a taken CBZ must never reach memory.
    let mut tc = TestContext::new().load_program(
        BASE,
        &with_exit(vec![
            movz(6, 0x8000, 0),
            movz(1, 1, 0),
            cbz(9, 12),       // x9 == 0: taken, skips both stores
            str64(1, 6, 0),   // (flushed)
            str64(1, 6, 8),   // (flushed)
        ]),
    );

    let exit = tc.run();

    assert_eq!(exit, 0);
    assert_eq!(tc.core.machine.mem.read64(0x8000), 0, "flushed store must not land");
    assert_eq!(tc.core.machine.mem.read64(0x8008), 0);
    assert!(tc.core.sim_stats().stalls_control > 0, "fetch must have stalled");
}

#[test]
fn svc_drains_and_resumes_at_the_next_instruction() {
    // getpid, then use its result.
    let mut tc = TestContext::new().load_program(
        BASE,
        &with_exit(vec![
            movz(8, 172, 0), // getpid
            svc0(),
            add_imm(1, 0, 0), // x1 = pid
        ]),
    );

    let exit = tc.run();

    assert_eq!(exit, 0);
    assert_eq!(tc.reg(1), 1000, "execution resumes with the syscall result");
}
