//! AArch64 Instruction Decoder.
//!
//! This module turns 32-bit instruction words into [`Decoded`] records. It
//! follows the architecture's top-level routing: the `op0` field (bits 28:25)
//! selects one of four encoding groups (data processing immediate, branches
//! and system, loads and stores, data processing register) plus the FP/SIMD
//! space, and each group decoder extracts fields for its formats.
//!
//! The decoder is total: every word produces exactly one record. Words
//! outside the implemented user-mode subset decode to [`Op::Invalid`], which
//! faults when it reaches writeback (so speculatively fetched garbage behind
//! a taken branch never kills a run).

use crate::core::arch::regs::Reg;
use crate::isa::bits::{bit, decode_bit_masks, field, sign_extend};
use crate::isa::instruction::{Cond, Decoded, Extend, IndexMode, Op, ShiftKind};

/// Decodes one instruction word.
pub fn decode(word: u32) -> Decoded {
    let op0 = field(word, 28, 25);
    let decoded = match op0 {
        0b1000 | 0b1001 => dp_immediate(word),
        0b1010 | 0b1011 => branch_system(word),
        0b0100 | 0b0110 | 0b1100 | 0b1110 => load_store(word),
        0b0101 | 0b1101 => dp_register(word),
        0b0111 | 0b1111 => fp_simd(word),
        _ => invalid(word),
    };
    Decoded { raw: word, ..decoded }
}

/// The invalid-class record for `word`.
fn invalid(word: u32) -> Decoded {
    Decoded {
        raw: word,
        op: Op::Invalid,
        ..Decoded::default()
    }
}

// ── Data processing — immediate ───────────────────────────────────────────

fn dp_immediate(word: u32) -> Decoded {
    let sf = bit(word, 31);
    let rd = field(word, 4, 0);
    let rn = field(word, 9, 5);

    match field(word, 25, 23) {
        // PC-relative addressing.
        0b000 | 0b001 => {
            let immhi = u64::from(field(word, 23, 5));
            let immlo = u64::from(field(word, 30, 29));
            let imm = sign_extend((immhi << 2) | immlo, 21);
            let (op, imm) = if bit(word, 31) {
                (Op::Adrp, imm << 12)
            } else {
                (Op::Adr, imm)
            };
            Decoded {
                op,
                sf: true,
                dst: Some(Reg::gp(rd)),
                imm,
                ..Decoded::default()
            }
        }

        // Add/subtract immediate.
        0b010 => {
            let op = bit(word, 30);
            let s = bit(word, 29);
            let shifted = bit(word, 22);
            let imm = i64::from(field(word, 21, 10)) << if shifted { 12 } else { 0 };
            Decoded {
                op: match (op, s) {
                    (false, false) => Op::AddImm,
                    (false, true) => Op::AddsImm,
                    (true, false) => Op::SubImm,
                    (true, true) => Op::SubsImm,
                },
                sf,
                dst: Some(if s { Reg::gp(rd) } else { Reg::gp_or_sp(rd) }),
                src1: Reg::gp_or_sp(rn),
                imm,
                sets_flags: s,
                ..Decoded::default()
            }
        }

        // Logical immediate (bitmask immediates).
        0b100 => {
            let opc = field(word, 30, 29);
            let n = bit(word, 22);
            if !sf && n {
                return invalid(word);
            }
            let width = if sf { 64 } else { 32 };
            let Some((wmask, _)) =
                decode_bit_masks(n, field(word, 15, 10), field(word, 21, 16), true, width)
            else {
                return invalid(word);
            };
            Decoded {
                op: match opc {
                    0b00 => Op::AndImm,
                    0b01 => Op::OrrImm,
                    0b10 => Op::EorImm,
                    _ => Op::AndsImm,
                },
                sf,
                dst: Some(if opc == 0b11 { Reg::gp(rd) } else { Reg::gp_or_sp(rd) }),
                src1: Reg::gp(rn),
                imm: wmask as i64,
                sets_flags: opc == 0b11,
                ..Decoded::default()
            }
        }

        // Move wide immediate.
        0b101 => {
            let opc = field(word, 30, 29);
            let hw = field(word, 22, 21);
            if opc == 0b01 || (!sf && hw > 1) {
                return invalid(word);
            }
            let op = match opc {
                0b00 => Op::Movn,
                0b10 => Op::Movz,
                _ => Op::Movk,
            };
            Decoded {
                op,
                sf,
                dst: Some(Reg::gp(rd)),
                // MOVK merges into the existing destination value.
                src1: if op == Op::Movk { Reg::gp(rd) } else { Reg::Zr },
                imm: i64::from(field(word, 20, 5)),
                shift_amt: (hw * 16) as u8,
                ..Decoded::default()
            }
        }

        // Bitfield.
        0b110 => {
            let opc = field(word, 30, 29);
            let n = bit(word, 22);
            let immr = field(word, 21, 16);
            let imms = field(word, 15, 10);
            if opc == 0b11 || n != sf || (!sf && (immr >= 32 || imms >= 32)) {
                return invalid(word);
            }
            let width = if sf { 64 } else { 32 };
            if decode_bit_masks(n, imms, immr, false, width).is_none() {
                return invalid(word);
            }
            let op = match opc {
                0b00 => Op::Sbfm,
                0b01 => Op::Bfm,
                _ => Op::Ubfm,
            };
            Decoded {
                op,
                sf,
                dst: Some(Reg::gp(rd)),
                src1: Reg::gp(rn),
                // BFM inserts into the existing destination value.
                src2: if op == Op::Bfm { Reg::gp(rd) } else { Reg::Zr },
                imm: i64::from(imms),
                shift_amt: immr as u8,
                ..Decoded::default()
            }
        }

        // Extract (EXTR / ROR-immediate alias).
        0b111 => {
            let imms = field(word, 15, 10);
            if field(word, 30, 29) != 0 || bit(word, 22) != sf || bit(word, 21) || (!sf && imms >= 32)
            {
                return invalid(word);
            }
            Decoded {
                op: Op::Extr,
                sf,
                dst: Some(Reg::gp(rd)),
                src1: Reg::gp(rn),
                src2: Reg::gp(field(word, 20, 16)),
                shift_amt: imms as u8,
                ..Decoded::default()
            }
        }

        _ => invalid(word),
    }
}

// ── Branches, exception generation, system ────────────────────────────────

fn branch_system(word: u32) -> Decoded {
    // Conditional branch.
    if word & 0xFF00_0010 == 0x5400_0000 {
        return Decoded {
            op: Op::BCond,
            cond: Cond::from_bits(field(word, 3, 0)),
            imm: sign_extend(u64::from(field(word, 23, 5)), 19) << 2,
            ..Decoded::default()
        };
    }

    // Unconditional branch, immediate.
    if field(word, 30, 26) == 0b00101 {
        let link = bit(word, 31);
        return Decoded {
            op: if link { Op::Bl } else { Op::B },
            dst: link.then_some(Reg::X(30)),
            imm: sign_extend(u64::from(field(word, 25, 0)), 26) << 2,
            ..Decoded::default()
        };
    }

    // Compare and branch.
    if field(word, 30, 25) == 0b011010 {
        return Decoded {
            op: if bit(word, 24) { Op::Cbnz } else { Op::Cbz },
            sf: bit(word, 31),
            src1: Reg::gp(field(word, 4, 0)),
            imm: sign_extend(u64::from(field(word, 23, 5)), 19) << 2,
            ..Decoded::default()
        };
    }

    // Test bit and branch.
    if field(word, 30, 25) == 0b011011 {
        let bit_num = (field(word, 31, 31) << 5) | field(word, 23, 19);
        return Decoded {
            op: if bit(word, 24) { Op::Tbnz } else { Op::Tbz },
            sf: bit_num >= 32,
            src1: Reg::gp(field(word, 4, 0)),
            imm: sign_extend(u64::from(field(word, 18, 5)), 14) << 2,
            shift_amt: bit_num as u8,
            ..Decoded::default()
        };
    }

    // Unconditional branch, register.
    let masked = word & 0xFFFF_FC1F;
    if masked == 0xD61F_0000 || masked == 0xD63F_0000 || masked == 0xD65F_0000 {
        let (op, link) = match masked {
            0xD61F_0000 => (Op::Br, false),
            0xD63F_0000 => (Op::Blr, true),
            _ => (Op::Ret, false),
        };
        return Decoded {
            op,
            dst: link.then_some(Reg::X(30)),
            src1: Reg::gp(field(word, 9, 5)),
            ..Decoded::default()
        };
    }

    // Supervisor call.
    if word & 0xFFE0_001F == 0xD400_0001 {
        return Decoded {
            op: Op::Svc,
            imm: i64::from(field(word, 20, 5)),
            ..Decoded::default()
        };
    }

    // Hints (NOP, YIELD, WFE, BTI, pointer-auth hints, ...).
    if word & 0xFFFF_F01F == 0xD503_201F {
        return Decoded {
            op: Op::Nop,
            ..Decoded::default()
        };
    }

    // Barriers (CLREX, DSB, DMB, ISB) retire as ordering hints: the model
    // is single-core and in-order at retirement.
    if word & 0xFFFF_F01F == 0xD503_301F {
        return Decoded {
            op: Op::Barrier,
            ..Decoded::default()
        };
    }

    // MSR (immediate): PSTATE field writes (DAIF and friends) are
    // meaningless in a user-mode model.
    if word & 0xFFF8_F01F == 0xD500_401F {
        return Decoded {
            op: Op::Nop,
            ..Decoded::default()
        };
    }

    // SYS space (DC/IC/TLBI): cache maintenance has no effect here.
    if word & 0xFFF8_0000 == 0xD508_0000 {
        return Decoded {
            op: Op::Nop,
            ..Decoded::default()
        };
    }

    // MRS / MSR (register).
    if word >> 20 == 0xD53 {
        return Decoded {
            op: Op::Mrs,
            sf: true,
            dst: Some(Reg::gp(field(word, 4, 0))),
            imm: i64::from(field(word, 19, 5)),
            ..Decoded::default()
        };
    }
    if word >> 20 == 0xD51 {
        return Decoded {
            op: Op::Msr,
            sf: true,
            src1: Reg::gp(field(word, 4, 0)),
            imm: i64::from(field(word, 19, 5)),
            ..Decoded::default()
        };
    }

    invalid(word)
}

// ── Loads and stores ──────────────────────────────────────────────────────

fn load_store(word: u32) -> Decoded {
    let v = bit(word, 26);
    let rt = field(word, 4, 0);
    let rn = field(word, 9, 5);

    // Load/store exclusive and load-acquire/store-release.
    if word & 0x3F00_0000 == 0x0800_0000 {
        if bit(word, 21) {
            return invalid(word); // pair exclusives
        }
        let size = 1u8 << field(word, 31, 30);
        let ordered = bit(word, 23);
        let load = bit(word, 22);
        return match (load, ordered) {
            (true, false) => Decoded {
                op: Op::Ldxr,
                sf: size == 8,
                dst: Some(Reg::gp(rt)),
                src1: Reg::gp_or_sp(rn),
                size,
                ..Decoded::default()
            },
            (true, true) => Decoded {
                op: Op::Ldar,
                sf: size == 8,
                dst: Some(Reg::gp(rt)),
                src1: Reg::gp_or_sp(rn),
                size,
                ..Decoded::default()
            },
            (false, false) => Decoded {
                op: Op::Stxr,
                sf: size == 8,
                dst: Some(Reg::gp(field(word, 20, 16))), // status register
                src1: Reg::gp_or_sp(rn),
                src2: Reg::gp(rt),
                size,
                ..Decoded::default()
            },
            (false, true) => Decoded {
                op: Op::Stlr,
                sf: size == 8,
                src1: Reg::gp_or_sp(rn),
                src2: Reg::gp(rt),
                size,
                ..Decoded::default()
            },
        };
    }

    // Load register, literal.
    if word & 0x3B00_0000 == 0x1800_0000 {
        let opc = field(word, 31, 30);
        let imm = sign_extend(u64::from(field(word, 23, 5)), 19) << 2;
        if v {
            if opc == 0b11 {
                return invalid(word);
            }
            return Decoded {
                op: Op::FpLdr,
                src1: Reg::Zr, // PC-relative; no base register
                imm,
                size: 4 << opc,
                index: IndexMode::Offset,
                ..Decoded::default()
            };
        }
        return match opc {
            0b00 | 0b01 => Decoded {
                op: Op::LdrLit,
                sf: opc == 0b01,
                dst: Some(Reg::gp(rt)),
                imm,
                size: if opc == 0b01 { 8 } else { 4 },
                ..Decoded::default()
            },
            0b10 => Decoded {
                op: Op::LdrLit,
                sf: true,
                dst: Some(Reg::gp(rt)),
                imm,
                size: 4,
                signed: true,
                ..Decoded::default()
            },
            _ => Decoded {
                // PRFM (literal) is a hint.
                op: Op::Nop,
                ..Decoded::default()
            },
        };
    }

    // Load/store register pair.
    if word & 0x3800_0000 == 0x2800_0000 {
        let opc = field(word, 31, 30);
        let load = bit(word, 22);
        let index = match field(word, 24, 23) {
            0b01 => IndexMode::Post,
            0b11 => IndexMode::Pre,
            // 00 is the no-allocate hint pair; same addressing as offset.
            _ => IndexMode::Offset,
        };
        let (size, signed) = if v {
            if opc == 0b11 {
                return invalid(word);
            }
            (4u8 << opc, false)
        } else {
            match opc {
                0b00 => (4, false),
                0b10 => (8, false),
                0b01 if load => (4, true), // LDPSW
                _ => return invalid(word),
            }
        };
        let imm = sign_extend(u64::from(field(word, 21, 15)), 7) * i64::from(size);
        if v {
            return Decoded {
                op: if load { Op::FpLdr } else { Op::FpStr },
                src1: Reg::gp_or_sp(rn),
                imm,
                size: size * 2,
                index,
                ..Decoded::default()
            };
        }
        let rt2 = field(word, 14, 10);
        if load {
            return Decoded {
                op: Op::Ldp,
                sf: size == 8 || signed,
                dst: Some(Reg::gp(rt)),
                dst2: Some(Reg::gp(rt2)),
                src1: Reg::gp_or_sp(rn),
                imm,
                size,
                signed,
                index,
                ..Decoded::default()
            };
        }
        return Decoded {
            op: Op::Stp,
            sf: size == 8,
            src1: Reg::gp_or_sp(rn),
            src2: Reg::gp(rt),
            src3: Reg::gp(rt2),
            imm,
            size,
            index,
            ..Decoded::default()
        };
    }

    // Load/store register (immediate, register offset).
    if word & 0x3800_0000 == 0x3800_0000 {
        let size_bits = field(word, 31, 30);
        let opc = field(word, 23, 22);

        // Element size and class.
        let (bytes, load, signed, sf) = if v {
            let bytes: u8 = match (opc & 0b10 != 0, size_bits) {
                (false, s) => 1 << s,
                (true, 0b00) => 16,
                _ => return invalid(word),
            };
            (bytes, opc & 1 == 1, false, false)
        } else {
            let bytes = 1u8 << size_bits;
            match opc {
                0b00 => (bytes, false, false, size_bits == 0b11),
                0b01 => (bytes, true, false, size_bits == 0b11),
                0b10 => {
                    if size_bits == 0b11 {
                        // PRFM (immediate) is a hint.
                        return Decoded {
                            op: Op::Nop,
                            ..Decoded::default()
                        };
                    }
                    (bytes, true, true, true)
                }
                _ => {
                    if size_bits >= 0b10 {
                        return invalid(word);
                    }
                    (bytes, true, true, false)
                }
            }
        };

        let scale = bytes.trailing_zeros();

        match field(word, 25, 24) {
            // Unsigned scaled 12-bit offset.
            0b01 => {
                let imm = i64::from(field(word, 21, 10)) << scale;
                return ls_register(word, v, load, signed, sf, bytes, imm, IndexMode::Offset);
            }
            0b00 => {
                if bit(word, 21) {
                    // Register offset.
                    if field(word, 11, 10) != 0b10 {
                        return invalid(word); // LSE atomics / PAC loads
                    }
                    let option = field(word, 15, 13);
                    if option & 0b010 == 0 {
                        return invalid(word);
                    }
                    let amount = if bit(word, 12) { scale as u8 } else { 0 };
                    let mut d = ls_register(word, v, load, signed, sf, bytes, 0, IndexMode::Offset);
                    if d.op == Op::LdrImm {
                        d.op = Op::LdrReg;
                    } else if d.op == Op::StrImm {
                        d.op = Op::StrReg;
                    }
                    let rm = Reg::gp(field(word, 20, 16));
                    match d.op {
                        Op::StrReg | Op::FpStr => d.src3 = rm,
                        _ => d.src2 = rm,
                    }
                    d.extend = Extend::from_bits(option);
                    d.shift_amt = amount;
                    return d;
                }
                // 9-bit signed offset forms.
                let imm = sign_extend(u64::from(field(word, 20, 12)), 9);
                let index = match field(word, 11, 10) {
                    0b00 | 0b10 => IndexMode::Offset, // unscaled / unprivileged
                    0b01 => IndexMode::Post,
                    _ => IndexMode::Pre,
                };
                return ls_register(word, v, load, signed, sf, bytes, imm, index);
            }
            _ => return invalid(word),
        }
    }

    invalid(word)
}

/// Builds the record for a single-register load/store.
#[allow(clippy::fn_params_excessive_bools)]
fn ls_register(
    word: u32,
    v: bool,
    load: bool,
    signed: bool,
    sf: bool,
    bytes: u8,
    imm: i64,
    index: IndexMode,
) -> Decoded {
    let rt = field(word, 4, 0);
    let rn = field(word, 9, 5);
    if v {
        return Decoded {
            op: if load { Op::FpLdr } else { Op::FpStr },
            src1: Reg::gp_or_sp(rn),
            imm,
            size: bytes,
            index,
            ..Decoded::default()
        };
    }
    if load {
        Decoded {
            op: Op::LdrImm,
            sf,
            dst: Some(Reg::gp(rt)),
            src1: Reg::gp_or_sp(rn),
            imm,
            size: bytes,
            signed,
            index,
            ..Decoded::default()
        }
    } else {
        Decoded {
            op: Op::StrImm,
            sf,
            src1: Reg::gp_or_sp(rn),
            src2: Reg::gp(rt),
            imm,
            size: bytes,
            index,
            ..Decoded::default()
        }
    }
}

// ── Data processing — register ────────────────────────────────────────────

fn dp_register(word: u32) -> Decoded {
    let sf = bit(word, 31);
    let rd = field(word, 4, 0);
    let rn = field(word, 9, 5);
    let rm = field(word, 20, 16);

    if !bit(word, 28) {
        // Logical (shifted register).
        if !bit(word, 24) {
            let imm6 = field(word, 15, 10);
            if !sf && imm6 >= 32 {
                return invalid(word);
            }
            let opc = field(word, 30, 29);
            let negate = bit(word, 21);
            let op = match (opc, negate) {
                (0b00, false) => Op::AndReg,
                (0b00, true) => Op::BicReg,
                (0b01, false) => Op::OrrReg,
                (0b01, true) => Op::OrnReg,
                (0b10, false) => Op::EorReg,
                (0b10, true) => Op::EonReg,
                (0b11, false) => Op::AndsReg,
                (0b11, true) => Op::BicsReg,
                _ => return invalid(word),
            };
            return Decoded {
                op,
                sf,
                dst: Some(Reg::gp(rd)),
                src1: Reg::gp(rn),
                src2: Reg::gp(rm),
                shift: ShiftKind::from_bits(field(word, 23, 22)),
                shift_amt: imm6 as u8,
                sets_flags: opc == 0b11,
                ..Decoded::default()
            };
        }

        // Add/subtract (shifted register).
        if !bit(word, 21) {
            let imm6 = field(word, 15, 10);
            let shift = field(word, 23, 22);
            if shift == 0b11 || (!sf && imm6 >= 32) {
                return invalid(word);
            }
            let op = bit(word, 30);
            let s = bit(word, 29);
            return Decoded {
                op: match (op, s) {
                    (false, false) => Op::AddReg,
                    (false, true) => Op::AddsReg,
                    (true, false) => Op::SubReg,
                    (true, true) => Op::SubsReg,
                },
                sf,
                dst: Some(Reg::gp(rd)),
                src1: Reg::gp(rn),
                src2: Reg::gp(rm),
                shift: ShiftKind::from_bits(shift),
                shift_amt: imm6 as u8,
                sets_flags: s,
                ..Decoded::default()
            };
        }

        // Add/subtract (extended register).
        let imm3 = field(word, 12, 10);
        if field(word, 23, 22) != 0 || imm3 > 4 {
            return invalid(word);
        }
        let op = bit(word, 30);
        let s = bit(word, 29);
        return Decoded {
            op: match (op, s) {
                (false, false) => Op::AddExt,
                (false, true) => Op::AddsExt,
                (true, false) => Op::SubExt,
                (true, true) => Op::SubsExt,
            },
            sf,
            dst: Some(if s { Reg::gp(rd) } else { Reg::gp_or_sp(rd) }),
            src1: Reg::gp_or_sp(rn),
            src2: Reg::gp(rm),
            extend: Extend::from_bits(field(word, 15, 13)),
            shift_amt: imm3 as u8,
            sets_flags: s,
            ..Decoded::default()
        };
    }

    let group = field(word, 28, 21);

    // Add/subtract with carry.
    if group == 0b1101_0000 && field(word, 15, 10) == 0 {
        let op = bit(word, 30);
        let s = bit(word, 29);
        return Decoded {
            op: match (op, s) {
                (false, false) => Op::Adc,
                (false, true) => Op::Adcs,
                (true, false) => Op::Sbc,
                (true, true) => Op::Sbcs,
            },
            sf,
            dst: Some(Reg::gp(rd)),
            src1: Reg::gp(rn),
            src2: Reg::gp(rm),
            sets_flags: s,
            ..Decoded::default()
        };
    }

    // Conditional compare (register / immediate).
    if group == 0b1101_0010 && bit(word, 29) && !bit(word, 4) && !bit(word, 10) {
        let negative = !bit(word, 30); // CCMN adds, CCMP subtracts
        let immediate = bit(word, 11);
        let op = match (negative, immediate) {
            (true, true) => Op::CcmnImm,
            (true, false) => Op::CcmnReg,
            (false, true) => Op::CcmpImm,
            (false, false) => Op::CcmpReg,
        };
        return Decoded {
            op,
            sf,
            src1: Reg::gp(rn),
            src2: if immediate { Reg::Zr } else { Reg::gp(rm) },
            imm: if immediate { i64::from(rm) } else { 0 },
            cond: Cond::from_bits(field(word, 15, 12)),
            nzcv: field(word, 3, 0) as u8,
            sets_flags: true,
            ..Decoded::default()
        };
    }

    // Conditional select.
    if group == 0b1101_0100 && !bit(word, 29) {
        let op = match (bit(word, 30), field(word, 11, 10)) {
            (false, 0b00) => Op::Csel,
            (false, 0b01) => Op::Csinc,
            (true, 0b00) => Op::Csinv,
            (true, 0b01) => Op::Csneg,
            _ => return invalid(word),
        };
        return Decoded {
            op,
            sf,
            dst: Some(Reg::gp(rd)),
            src1: Reg::gp(rn),
            src2: Reg::gp(rm),
            cond: Cond::from_bits(field(word, 15, 12)),
            ..Decoded::default()
        };
    }

    // Data processing, 2-source.
    if group == 0b1101_0110 && !bit(word, 30) && !bit(word, 29) {
        let op = match field(word, 15, 10) {
            0b000010 => Op::Udiv,
            0b000011 => Op::Sdiv,
            0b001000 => Op::Lslv,
            0b001001 => Op::Lsrv,
            0b001010 => Op::Asrv,
            0b001011 => Op::Rorv,
            _ => return invalid(word),
        };
        return Decoded {
            op,
            sf,
            dst: Some(Reg::gp(rd)),
            src1: Reg::gp(rn),
            src2: Reg::gp(rm),
            ..Decoded::default()
        };
    }

    // Data processing, 1-source.
    if group == 0b1101_0110 && bit(word, 30) && !bit(word, 29) && field(word, 20, 16) == 0 {
        let op = match (field(word, 15, 10), sf) {
            (0b000000, _) => Op::Rbit,
            (0b000001, _) => Op::Rev16,
            (0b000010, true) => Op::Rev32,
            (0b000010, false) => Op::Rev,
            (0b000011, true) => Op::Rev,
            (0b000100, _) => Op::Clz,
            (0b000101, _) => Op::Cls,
            _ => return invalid(word),
        };
        return Decoded {
            op,
            sf,
            dst: Some(Reg::gp(rd)),
            src1: Reg::gp(rn),
            ..Decoded::default()
        };
    }

    // Data processing, 3-source (multiply-accumulate family).
    if field(word, 28, 24) == 0b11011 {
        let op31 = field(word, 23, 21);
        let o0 = bit(word, 15);
        let op = match (op31, o0) {
            (0b000, false) => Op::Madd,
            (0b000, true) => Op::Msub,
            (0b001, false) if sf => Op::Smaddl,
            (0b001, true) if sf => Op::Smsubl,
            (0b010, false) if sf => Op::Smulh,
            (0b101, false) if sf => Op::Umaddl,
            (0b101, true) if sf => Op::Umsubl,
            (0b110, false) if sf => Op::Umulh,
            _ => return invalid(word),
        };
        return Decoded {
            op,
            sf,
            dst: Some(Reg::gp(rd)),
            src1: Reg::gp(rn),
            src2: Reg::gp(rm),
            src3: Reg::gp(field(word, 14, 10)),
            ..Decoded::default()
        };
    }

    invalid(word)
}

// ── Scalar FP and SIMD ────────────────────────────────────────────────────

/// FP and SIMD data processing route to the stub FP unit. The only cases
/// that touch integer state are the conversion/FMOV forms that target or
/// source an X register; those keep the register operand so hazards and the
/// zero-stub result stay architecturally consistent.
fn fp_simd(word: u32) -> Decoded {
    // Conversion between floating-point and integer.
    if word & 0x7F20_FC00 == 0x1E20_0000 {
        let opcode = field(word, 18, 16);
        let to_general = matches!(opcode, 0b000 | 0b001 | 0b100 | 0b101 | 0b110);
        if to_general {
            return Decoded {
                op: Op::FpOp,
                sf: bit(word, 31),
                dst: Some(Reg::gp(field(word, 4, 0))),
                ..Decoded::default()
            };
        }
        return Decoded {
            op: Op::FpOp,
            sf: bit(word, 31),
            src1: Reg::gp(field(word, 9, 5)),
            ..Decoded::default()
        };
    }

    Decoded {
        op: Op::FpOp,
        ..Decoded::default()
    }
}
