//! Canonical instruction word builders.
//!
//! Re-encodes a [`Decoded`] record back into its canonical 32-bit word. Used
//! by the round-trip tests (encode → decode → encode must reproduce the word
//! for canonical forms) and by test programs that assemble instructions from
//! records. Classes without a single canonical word (the FP stub classes,
//! Invalid) return `None`.

use crate::core::arch::regs::Reg;
use crate::isa::bits::ones;
use crate::isa::instruction::{Decoded, IndexMode, Op};

/// Encodes the register operand into a 5-bit field.
fn r(reg: Reg) -> u32 {
    reg.encoding()
}

/// Encodes the optional destination (defaults to XZR/SP encoding 31).
fn rd(d: &Decoded) -> u32 {
    d.dst.map_or(31, Reg::encoding)
}

/// Finds the `(n, immr, imms)` encoding of a bitmask immediate.
///
/// The inverse of `DecodeBitMasks`: `value` must be a repetition of a
/// rotated run of ones over some element size. Returns `None` for values
/// that are not encodable (zero, all-ones, non-periodic patterns).
pub fn logical_imm(value: u64, width: u32) -> Option<(bool, u32, u32)> {
    let value = value & ones(width);
    if value == 0 || value == ones(width) {
        return None;
    }

    // Smallest element size whose replication reproduces the value.
    let mut esize = 2;
    while esize < width {
        let elem = value & ones(esize);
        let mut replicated = 0u64;
        let mut pos = 0;
        while pos < width {
            replicated |= elem << pos;
            pos += esize;
        }
        if replicated == value {
            break;
        }
        esize *= 2;
    }

    let elem = value & ones(esize);
    let count = elem.count_ones();
    if count == 0 || count == esize {
        return None;
    }

    // elem must equal ror(run, immr); search for the rotation that restores
    // the low run of ones.
    for immr in 0..esize {
        let restored = if immr == 0 {
            elem
        } else {
            ((elem << immr) | (elem >> (esize - immr))) & ones(esize)
        };
        if restored == ones(count) {
            let s = count - 1;
            let (n, imms) = if esize == 64 {
                (true, s)
            } else {
                (false, ((!(2 * esize - 1)) & 0x3F) | s)
            };
            return Some((n, immr, imms));
        }
    }
    None
}

/// Re-encodes a decoded record into its canonical instruction word.
pub fn encode(d: &Decoded) -> Option<u32> {
    let sf = u32::from(d.sf) << 31;
    match d.op {
        // ── Data processing, immediate ───────────────────────────────
        Op::AddImm | Op::AddsImm | Op::SubImm | Op::SubsImm => {
            let (op, s) = match d.op {
                Op::AddImm => (0, 0),
                Op::AddsImm => (0, 1),
                Op::SubImm => (1, 0),
                _ => (1, 1),
            };
            let imm = d.imm as u64;
            let (sh, imm12) = if imm & !0xFFF == 0 {
                (0, imm as u32)
            } else if imm & !0xFF_F000 == 0 {
                (1, (imm >> 12) as u32)
            } else {
                return None;
            };
            Some(
                sf | op << 30
                    | s << 29
                    | 0b100010 << 23
                    | sh << 22
                    | imm12 << 10
                    | r(d.src1) << 5
                    | rd(d),
            )
        }
        Op::AndImm | Op::OrrImm | Op::EorImm | Op::AndsImm => {
            let opc = match d.op {
                Op::AndImm => 0,
                Op::OrrImm => 1,
                Op::EorImm => 2,
                _ => 3,
            };
            let width = if d.sf { 64 } else { 32 };
            let (n, immr, imms) = logical_imm(d.imm as u64, width)?;
            Some(
                sf | opc << 29
                    | 0b100100 << 23
                    | u32::from(n) << 22
                    | immr << 16
                    | imms << 10
                    | r(d.src1) << 5
                    | rd(d),
            )
        }
        Op::Movn | Op::Movz | Op::Movk => {
            let opc = match d.op {
                Op::Movn => 0b00,
                Op::Movz => 0b10,
                _ => 0b11,
            };
            let hw = u32::from(d.shift_amt) / 16;
            Some(sf | opc << 29 | 0b100101 << 23 | hw << 21 | (d.imm as u32 & 0xFFFF) << 5 | rd(d))
        }
        Op::Sbfm | Op::Bfm | Op::Ubfm => {
            let opc = match d.op {
                Op::Sbfm => 0b00,
                Op::Bfm => 0b01,
                _ => 0b10,
            };
            Some(
                sf | opc << 29
                    | 0b100110 << 23
                    | u32::from(d.sf) << 22
                    | u32::from(d.shift_amt) << 16
                    | (d.imm as u32 & 0x3F) << 10
                    | r(d.src1) << 5
                    | rd(d),
            )
        }
        Op::Extr => Some(
            sf | 0b100111 << 23
                | u32::from(d.sf) << 22
                | r(d.src2) << 16
                | u32::from(d.shift_amt) << 10
                | r(d.src1) << 5
                | rd(d),
        ),
        Op::Adr | Op::Adrp => {
            let page = d.op == Op::Adrp;
            let imm = if page { d.imm >> 12 } else { d.imm } as u64;
            let immlo = (imm & 0b11) as u32;
            let immhi = ((imm >> 2) & 0x7FFFF) as u32;
            Some(u32::from(page) << 31 | immlo << 29 | 0b10000 << 24 | immhi << 5 | rd(d))
        }

        // ── Data processing, register ────────────────────────────────
        Op::AddReg | Op::AddsReg | Op::SubReg | Op::SubsReg => {
            let (op, s) = match d.op {
                Op::AddReg => (0, 0),
                Op::AddsReg => (0, 1),
                Op::SubReg => (1, 0),
                _ => (1, 1),
            };
            Some(
                sf | op << 30
                    | s << 29
                    | 0b01011 << 24
                    | d.shift.bits() << 22
                    | r(d.src2) << 16
                    | u32::from(d.shift_amt) << 10
                    | r(d.src1) << 5
                    | rd(d),
            )
        }
        Op::AddExt | Op::AddsExt | Op::SubExt | Op::SubsExt => {
            let (op, s) = match d.op {
                Op::AddExt => (0, 0),
                Op::AddsExt => (0, 1),
                Op::SubExt => (1, 0),
                _ => (1, 1),
            };
            Some(
                sf | op << 30
                    | s << 29
                    | 0b01011 << 24
                    | 1 << 21
                    | r(d.src2) << 16
                    | d.extend.bits() << 13
                    | u32::from(d.shift_amt) << 10
                    | r(d.src1) << 5
                    | rd(d),
            )
        }
        Op::AndReg | Op::BicReg | Op::OrrReg | Op::OrnReg | Op::EorReg | Op::EonReg
        | Op::AndsReg | Op::BicsReg => {
            let (opc, n) = match d.op {
                Op::AndReg => (0b00, 0),
                Op::BicReg => (0b00, 1),
                Op::OrrReg => (0b01, 0),
                Op::OrnReg => (0b01, 1),
                Op::EorReg => (0b10, 0),
                Op::EonReg => (0b10, 1),
                Op::AndsReg => (0b11, 0),
                _ => (0b11, 1),
            };
            Some(
                sf | opc << 29
                    | 0b01010 << 24
                    | d.shift.bits() << 22
                    | n << 21
                    | r(d.src2) << 16
                    | u32::from(d.shift_amt) << 10
                    | r(d.src1) << 5
                    | rd(d),
            )
        }
        Op::Adc | Op::Adcs | Op::Sbc | Op::Sbcs => {
            let (op, s) = match d.op {
                Op::Adc => (0, 0),
                Op::Adcs => (0, 1),
                Op::Sbc => (1, 0),
                _ => (1, 1),
            };
            Some(sf | op << 30 | s << 29 | 0b1101_0000 << 21 | r(d.src2) << 16 | r(d.src1) << 5 | rd(d))
        }
        Op::CcmnImm | Op::CcmpImm | Op::CcmnReg | Op::CcmpReg => {
            let op = u32::from(matches!(d.op, Op::CcmpImm | Op::CcmpReg));
            let immediate = matches!(d.op, Op::CcmnImm | Op::CcmpImm);
            let operand = if immediate { d.imm as u32 & 0x1F } else { r(d.src2) };
            Some(
                sf | op << 30
                    | 1 << 29
                    | 0b1101_0010 << 21
                    | operand << 16
                    | d.cond.bits() << 12
                    | u32::from(immediate) << 11
                    | r(d.src1) << 5
                    | u32::from(d.nzcv),
            )
        }
        Op::Csel | Op::Csinc | Op::Csinv | Op::Csneg => {
            let (op, op2) = match d.op {
                Op::Csel => (0, 0b00),
                Op::Csinc => (0, 0b01),
                Op::Csinv => (1, 0b00),
                _ => (1, 0b01),
            };
            Some(
                sf | op << 30
                    | 0b1101_0100 << 21
                    | r(d.src2) << 16
                    | d.cond.bits() << 12
                    | op2 << 10
                    | r(d.src1) << 5
                    | rd(d),
            )
        }
        Op::Udiv | Op::Sdiv | Op::Lslv | Op::Lsrv | Op::Asrv | Op::Rorv => {
            let opcode = match d.op {
                Op::Udiv => 0b000010,
                Op::Sdiv => 0b000011,
                Op::Lslv => 0b001000,
                Op::Lsrv => 0b001001,
                Op::Asrv => 0b001010,
                _ => 0b001011,
            };
            Some(sf | 0b1101_0110 << 21 | r(d.src2) << 16 | opcode << 10 | r(d.src1) << 5 | rd(d))
        }
        Op::Rbit | Op::Rev16 | Op::Rev32 | Op::Rev | Op::Clz | Op::Cls => {
            let opcode = match (d.op, d.sf) {
                (Op::Rbit, _) => 0b000000,
                (Op::Rev16, _) => 0b000001,
                (Op::Rev32, _) | (Op::Rev, false) => 0b000010,
                (Op::Rev, true) => 0b000011,
                (Op::Clz, _) => 0b000100,
                _ => 0b000101,
            };
            Some(sf | 1 << 30 | 0b1101_0110 << 21 | opcode << 10 | r(d.src1) << 5 | rd(d))
        }
        Op::Madd | Op::Msub | Op::Smaddl | Op::Smsubl | Op::Umaddl | Op::Umsubl | Op::Smulh
        | Op::Umulh => {
            let (op31, o0) = match d.op {
                Op::Madd => (0b000, 0),
                Op::Msub => (0b000, 1),
                Op::Smaddl => (0b001, 0),
                Op::Smsubl => (0b001, 1),
                Op::Smulh => (0b010, 0),
                Op::Umaddl => (0b101, 0),
                Op::Umsubl => (0b101, 1),
                _ => (0b110, 0),
            };
            Some(
                sf | 0b11011 << 24
                    | op31 << 21
                    | r(d.src2) << 16
                    | o0 << 15
                    | r(d.src3) << 10
                    | r(d.src1) << 5
                    | rd(d),
            )
        }

        // ── Branches ─────────────────────────────────────────────────
        Op::B | Op::Bl => {
            let link = u32::from(d.op == Op::Bl);
            Some(link << 31 | 0b00101 << 26 | ((d.imm >> 2) as u32 & 0x3FF_FFFF))
        }
        Op::BCond => Some(0x5400_0000 | ((d.imm >> 2) as u32 & 0x7FFFF) << 5 | d.cond.bits()),
        Op::Cbz | Op::Cbnz => Some(
            sf | 0b011010 << 25
                | u32::from(d.op == Op::Cbnz) << 24
                | ((d.imm >> 2) as u32 & 0x7FFFF) << 5
                | r(d.src1),
        ),
        Op::Tbz | Op::Tbnz => {
            let bit_num = u32::from(d.shift_amt);
            Some(
                (bit_num >> 5) << 31
                    | 0b011011 << 25
                    | u32::from(d.op == Op::Tbnz) << 24
                    | (bit_num & 0x1F) << 19
                    | ((d.imm >> 2) as u32 & 0x3FFF) << 5
                    | r(d.src1),
            )
        }
        Op::Br => Some(0xD61F_0000 | r(d.src1) << 5),
        Op::Blr => Some(0xD63F_0000 | r(d.src1) << 5),
        Op::Ret => Some(0xD65F_0000 | r(d.src1) << 5),

        // ── Loads and stores ─────────────────────────────────────────
        Op::LdrImm | Op::StrImm => {
            let load = d.op == Op::LdrImm;
            let size_bits = u32::from(d.size).trailing_zeros();
            let opc = ls_opc(load, d.signed, d.sf, d.size);
            let base = size_bits << 30 | 0b111 << 27 | opc << 22;
            match d.index {
                IndexMode::Offset => {
                    let scale = d.size.trailing_zeros();
                    if d.imm >= 0 && d.imm % i64::from(d.size) == 0 && (d.imm >> scale) < 4096 {
                        let imm12 = (d.imm >> scale) as u32;
                        Some(base | 1 << 24 | imm12 << 10 | r(d.src1) << 5 | ls_data(d, load))
                    } else {
                        // LDUR/STUR unscaled.
                        let imm9 = d.imm as u32 & 0x1FF;
                        Some(base | imm9 << 12 | r(d.src1) << 5 | ls_data(d, load))
                    }
                }
                IndexMode::Post | IndexMode::Pre => {
                    let mode = if d.index == IndexMode::Post { 0b01 } else { 0b11 };
                    let imm9 = d.imm as u32 & 0x1FF;
                    Some(base | imm9 << 12 | mode << 10 | r(d.src1) << 5 | ls_data(d, load))
                }
            }
        }
        Op::LdrReg | Op::StrReg => {
            let load = d.op == Op::LdrReg;
            let size_bits = u32::from(d.size).trailing_zeros();
            let opc = ls_opc(load, d.signed, d.sf, d.size);
            let rm = if load { d.src2 } else { d.src3 };
            Some(
                size_bits << 30
                    | 0b111 << 27
                    | opc << 22
                    | 1 << 21
                    | r(rm) << 16
                    | d.extend.bits() << 13
                    | u32::from(d.shift_amt != 0) << 12
                    | 0b10 << 10
                    | r(d.src1) << 5
                    | ls_data(d, load),
            )
        }
        Op::LdrLit => {
            let opc = if d.signed {
                0b10
            } else if d.sf {
                0b01
            } else {
                0b00
            };
            Some(opc << 30 | 0b011 << 27 | ((d.imm >> 2) as u32 & 0x7FFFF) << 5 | rd(d))
        }
        Op::Ldp | Op::Stp => {
            let load = d.op == Op::Ldp;
            let opc = if d.signed {
                0b01
            } else if d.size == 8 {
                0b10
            } else {
                0b00
            };
            let mode = match d.index {
                IndexMode::Post => 0b001,
                IndexMode::Offset => 0b010,
                IndexMode::Pre => 0b011,
            };
            let imm7 = (d.imm / i64::from(d.size)) as u32 & 0x7F;
            let (t, t2) = if load {
                (rd(d), d.dst2.map_or(31, Reg::encoding))
            } else {
                (r(d.src2), r(d.src3))
            };
            Some(
                opc << 30
                    | 0b101 << 27
                    | mode << 23
                    | u32::from(load) << 22
                    | imm7 << 15
                    | t2 << 10
                    | r(d.src1) << 5
                    | t,
            )
        }
        Op::Ldxr | Op::Ldar | Op::Stxr | Op::Stlr => {
            let size_bits = u32::from(d.size).trailing_zeros();
            let base = size_bits << 30 | 0b001000 << 24 | 0b11111 << 10 | r(d.src1) << 5;
            Some(match d.op {
                Op::Ldxr => base | 1 << 22 | 0b11111 << 16 | rd(d),
                Op::Ldar => base | 1 << 23 | 1 << 22 | 0b11111 << 16 | 1 << 15 | rd(d),
                Op::Stxr => base | rd(d) << 16 | r(d.src2),
                _ => base | 1 << 23 | 0b11111 << 16 | 1 << 15 | r(d.src2),
            })
        }

        // ── System ───────────────────────────────────────────────────
        Op::Nop => Some(0xD503_201F),
        Op::Barrier => Some(0xD503_3BBF), // DMB ISH
        Op::Svc => Some(0xD400_0001 | (d.imm as u32 & 0xFFFF) << 5),
        Op::Mrs => Some(0xD530_0000 | (d.imm as u32 & 0x7FFF) << 5 | rd(d)),
        Op::Msr => Some(0xD510_0000 | (d.imm as u32 & 0x7FFF) << 5 | r(d.src1)),

        Op::FpLdr | Op::FpStr | Op::FpOp | Op::Invalid => None,
    }
}

/// The `opc` field of single-register loads/stores.
fn ls_opc(load: bool, signed: bool, sf: bool, size: u8) -> u32 {
    if !load {
        0b00
    } else if !signed {
        0b01
    } else if sf {
        0b10
    } else {
        debug_assert!(size < 4);
        0b11
    }
}

/// The data register field (Rt) of a load or store.
fn ls_data(d: &Decoded, load: bool) -> u32 {
    if load { rd(d) } else { r(d.src2) }
}
