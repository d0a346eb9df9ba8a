//! Functional executor semantics.
//!
//! Single-instruction and short-sequence checks against the ARMv8 rules,
//! driven through `execution::step` on a bare machine.

use pretty_assertions::assert_eq;

use crate::common::builder::*;
use m2sim_core::core::machine::{execution, Machine};

const BASE: u64 = 0x1000;

/// Runs `words` functionally from `BASE` until the last word retires.
fn run_functional(words: &[u32], setup: impl FnOnce(&mut Machine)) -> Machine {
    let mut m = Machine::new();
    for (i, word) in words.iter().enumerate() {
        m.mem.write32(BASE + (i as u64) * 4, *word);
    }
    m.regs.set_pc(BASE);
    setup(&mut m);
    for _ in 0..words.len() * 4 {
        if m.halted() || m.regs.pc() >= BASE + (words.len() as u64) * 4 {
            break;
        }
        execution::step(&mut m).expect("test words must decode");
    }
    m
}

#[test]
fn movz_movk_builds_a_64_bit_constant() {
    let m = run_functional(
        &[
            movz(0, 0x1234, 3),
            movk(0, 0x5678, 2),
            movk(0, 0x9ABC, 1),
            movk(0, 0xDEF0, 0),
        ],
        |_| {},
    );
    assert_eq!(m.regs.x(0), 0x1234_5678_9ABC_DEF0);
}

#[test]
fn bl_links_and_ret_returns() {
    // 0x1000: bl +16 -> 0x1010
    // 0x1004: movz x1, #1        (after return)
    // 0x1008: movz x8, #93
    // 0x100c: svc #0             (exit 0)
    // 0x1010: movz x9, #7
    // 0x1014: ret
    let m = run_functional(
        &[bl(16), movz(1, 1, 0), movz(8, 93, 0), svc0(), movz(9, 7, 0), ret()],
        |_| {},
    );
    assert_eq!(m.regs.x(30), BASE + 4, "BL writes the return address");
    assert_eq!(m.regs.x(9), 7);
    assert_eq!(m.regs.x(1), 1, "execution resumes after RET");
    assert_eq!(m.exit_code(), Some(0));
}

#[test]
fn loads_zero_extend_and_ldrsw_sign_extends() {
    let m = run_functional(
        &[
            movz(6, 0x8000, 0),
            ldr32(1, 6, 0),  // 0xFFFFFFFF -> zero-extended
            ldrsw(2, 6, 0),  // -> sign-extended
            ldrb(3, 6, 3),   // top byte
        ],
        |m| m.mem.write32(0x8000, 0xFFFF_FFFF),
    );
    assert_eq!(m.regs.x(1), 0xFFFF_FFFF);
    assert_eq!(m.regs.x(2), 0xFFFF_FFFF_FFFF_FFFF);
    assert_eq!(m.regs.x(3), 0xFF);
}

#[test]
fn pre_and_post_index_update_the_base() {
    let m = run_functional(
        &[
            movz(6, 0x8000, 0),
            movz(0, 30, 0),
            movz(1, 40, 0),
            stp_pre(0, 1, 6, -16),   // x6 = 0x7ff0
            ldp_post(2, 3, 6, 16),   // x2 = 30, x3 = 40, x6 = 0x8000
        ],
        |_| {},
    );
    assert_eq!(m.regs.x(2), 30);
    assert_eq!(m.regs.x(3), 40);
    assert_eq!(m.regs.x(6), 0x8000);
    assert_eq!(m.mem.read64(0x7FF0), 30);
    assert_eq!(m.mem.read64(0x7FF8), 40);
}

#[test]
fn division_by_zero_yields_zero() {
    let m = run_functional(
        &[movz(1, 100, 0), movz(2, 0, 0), udiv(3, 1, 2)],
        |_| {},
    );
    assert_eq!(m.regs.x(3), 0);
}

#[test]
fn conditional_branch_follows_the_flags() {
    // subs x0, x0, #1 (x0=1 -> Z); b.eq +12 skips the 0xBAD move.
    let m = run_functional(
        &[
            subs_imm(0, 0, 1),
            b_cond(0, 12),
            movz(5, 0xBAD, 0),
            nop(),
            movz(5, 0x600D, 0),
        ],
        |m| m.regs.set_x(0, 1),
    );
    assert_eq!(m.regs.x(5), 0x600D);
    assert!(m.regs.pstate.z);
}

#[test]
fn cbnz_loops_until_zero() {
    // x0 = 3; loop: sub x0, x0, #1; cbnz x0, -4
    let m = run_functional(
        &[movz(0, 3, 0), sub_imm(0, 0, 1), cbnz(0, -4)],
        |_| {},
    );
    assert_eq!(m.regs.x(0), 0);
}

#[test]
fn stxr_reports_success_on_a_single_core() {
    let m = run_functional(
        &[
            movz(6, 0x8000, 0),
            0xC85F_7CC1, // LDXR X1, [X6]
            add_imm(1, 1, 1),
            0xC802_7CC1, // STXR W2, X1, [X6]
        ],
        |m| m.mem.write64(0x8000, 41),
    );
    assert_eq!(m.regs.x(1), 42);
    assert_eq!(m.regs.x(2), 0, "the exclusive store always succeeds");
    assert_eq!(m.mem.read64(0x8000), 42);
}

#[test]
fn fp_results_are_stubbed_and_flagged() {
    // FADD D0, D1, D2 (stub) followed by FMOV X0, D0 (stub to integer).
    let m = run_functional(
        &[
            0x1E62_2820, // FADD D0, D1, D2
            0x9E66_0000, // FMOV X0, D0
        ],
        |m| m.regs.set_x(0, 0xFFFF),
    );
    assert_eq!(m.regs.x(0), 0, "FP-to-integer moves produce the stub zero");
    assert!(m.fp_stubbed());
    assert_eq!(m.stats.fp_stub_results, 2);
}

#[test]
fn tls_moves_through_tpidr() {
    let m = run_functional(
        &[
            0xD51B_D041, // MSR TPIDR_EL0, X1
            0xD53B_D042, // MRS X2, TPIDR_EL0
        ],
        |m| m.regs.set_x(1, 0xCAFE),
    );
    assert_eq!(m.regs.x(2), 0xCAFE);
}
