//! Integer ALU operations.
//!
//! Arithmetic, logic, shift, and bitfield primitives with ARMv8 flag
//! semantics. Every function is width-aware: `sf == false` operates on the
//! low 32 bits and zero-extends the result, exactly as W-register forms do.

use crate::core::arch::pstate::Pstate;
use crate::isa::bits::{decode_bit_masks, ones, ror};
use crate::isa::instruction::{Extend, ShiftKind};

/// Truncates a value to the operand width and zero-extends.
#[inline]
pub fn trunc(value: u64, sf: bool) -> u64 {
    if sf { value } else { value & 0xFFFF_FFFF }
}

/// Operand width in bits.
#[inline]
pub fn width(sf: bool) -> u32 {
    if sf { 64 } else { 32 }
}

/// The ARM `AddWithCarry` primitive: `a + b + carry_in` with NZCV.
///
/// C is the unsigned carry out of the operand width; V is signed overflow
/// into the sign bit. Subtraction is `add_with_carry(a, !b, true)`.
pub fn add_with_carry(a: u64, b: u64, carry_in: bool, sf: bool) -> (u64, Pstate) {
    if sf {
        let (s1, c1) = a.overflowing_add(b);
        let (sum, c2) = s1.overflowing_add(u64::from(carry_in));
        let n = sum >> 63 == 1;
        let v = (!(a ^ b) & (a ^ sum)) >> 63 == 1;
        (
            sum,
            Pstate {
                n,
                z: sum == 0,
                c: c1 || c2,
                v,
            },
        )
    } else {
        let a = a as u32;
        let b = b as u32;
        let (s1, c1) = a.overflowing_add(b);
        let (sum, c2) = s1.overflowing_add(u32::from(carry_in));
        let n = sum >> 31 == 1;
        let v = (!(a ^ b) & (a ^ sum)) >> 31 == 1;
        (
            u64::from(sum),
            Pstate {
                n,
                z: sum == 0,
                c: c1 || c2,
                v,
            },
        )
    }
}

/// Addition without flag computation.
#[inline]
pub fn add(a: u64, b: u64, sf: bool) -> u64 {
    trunc(a.wrapping_add(b), sf)
}

/// Subtraction without flag computation.
#[inline]
pub fn sub(a: u64, b: u64, sf: bool) -> u64 {
    trunc(a.wrapping_sub(b), sf)
}

/// Flag-setting subtraction (`SUBS`, `CMP`).
#[inline]
pub fn subs(a: u64, b: u64, sf: bool) -> (u64, Pstate) {
    add_with_carry(trunc(a, sf), trunc(!b, sf), true, sf)
}

/// Flag-setting addition (`ADDS`, `CMN`).
#[inline]
pub fn adds(a: u64, b: u64, sf: bool) -> (u64, Pstate) {
    add_with_carry(trunc(a, sf), trunc(b, sf), false, sf)
}

/// Flags produced by a logical result (`ANDS`/`BICS`): N and Z from the
/// result, C and V cleared.
pub fn logic_flags(result: u64, sf: bool) -> Pstate {
    Pstate {
        n: result >> (width(sf) - 1) & 1 == 1,
        z: result == 0,
        c: false,
        v: false,
    }
}

/// Shifts an operand by a (pre-masked) amount.
pub fn shift(value: u64, kind: ShiftKind, amount: u32, sf: bool) -> u64 {
    let value = trunc(value, sf);
    if amount == 0 {
        return value;
    }
    match (kind, sf) {
        (ShiftKind::Lsl, _) => trunc(value << amount, sf),
        (ShiftKind::Lsr, _) => value >> amount,
        (ShiftKind::Asr, true) => ((value as i64) >> amount) as u64,
        (ShiftKind::Asr, false) => u64::from(((value as u32 as i32) >> amount) as u32),
        (ShiftKind::Ror, true) => value.rotate_right(amount),
        (ShiftKind::Ror, false) => u64::from((value as u32).rotate_right(amount)),
    }
}

/// Extends and shifts an operand (`ADD (extended register)` and
/// register-offset addressing).
pub fn extend(value: u64, kind: Extend, left_shift: u32) -> u64 {
    let extended = match kind {
        Extend::Uxtb => value & 0xFF,
        Extend::Uxth => value & 0xFFFF,
        Extend::Uxtw => value & 0xFFFF_FFFF,
        Extend::Uxtx => value,
        Extend::Sxtb => (value as u8 as i8 as i64) as u64,
        Extend::Sxth => (value as u16 as i16 as i64) as u64,
        Extend::Sxtw => (value as u32 as i32 as i64) as u64,
        Extend::Sxtx => value,
    };
    extended.wrapping_shl(left_shift)
}

/// Signed or unsigned bitfield move (`SBFM`/`UBFM`), and `BFM` insertion.
///
/// `dst_old` is only read by `BFM`. Reserved mask encodings are rejected at
/// decode, so the mask construction here cannot fail for decoded records.
pub fn bitfield(
    signed: bool,
    insert: bool,
    src: u64,
    dst_old: u64,
    immr: u32,
    imms: u32,
    sf: bool,
) -> u64 {
    let w = width(sf);
    let Some((wmask, tmask)) = decode_bit_masks(sf, imms, immr, false, w) else {
        return 0;
    };
    let src = trunc(src, sf);
    let rotated = ror(src, immr, w);
    if insert {
        let bot = (trunc(dst_old, sf) & !wmask) | (rotated & wmask);
        return trunc((trunc(dst_old, sf) & !tmask) | (bot & tmask), sf);
    }
    let bot = rotated & wmask;
    if signed {
        let sign = src >> imms & 1 == 1;
        let top = if sign { ones(w) } else { 0 };
        trunc((top & !tmask) | (bot & tmask), sf)
    } else {
        bot & tmask
    }
}

/// Extract from a register pair (`EXTR`, the ROR-immediate alias).
pub fn extract(hi: u64, lo: u64, lsb: u32, sf: bool) -> u64 {
    if lsb == 0 {
        return trunc(lo, sf);
    }
    let w = width(sf);
    trunc((trunc(lo, sf) >> lsb) | (trunc(hi, sf) << (w - lsb)), sf)
}

/// Unsigned division; division by zero yields zero per ARMv8.
pub fn udiv(a: u64, b: u64, sf: bool) -> u64 {
    let a = trunc(a, sf);
    let b = trunc(b, sf);
    if b == 0 { 0 } else { a / b }
}

/// Signed division; division by zero yields zero, and the
/// most-negative / -1 case wraps to the most-negative value per ARMv8.
pub fn sdiv(a: u64, b: u64, sf: bool) -> u64 {
    if sf {
        let a = a as i64;
        let b = b as i64;
        if b == 0 {
            0
        } else {
            a.wrapping_div(b) as u64
        }
    } else {
        let a = a as u32 as i32;
        let b = b as u32 as i32;
        if b == 0 {
            0
        } else {
            u64::from(a.wrapping_div(b) as u32)
        }
    }
}

/// Count of leading zero bits at the operand width.
pub fn clz(value: u64, sf: bool) -> u64 {
    if sf {
        u64::from(value.leading_zeros())
    } else {
        u64::from((value as u32).leading_zeros())
    }
}

/// Count of leading sign bits (excluding the sign bit itself).
pub fn cls(value: u64, sf: bool) -> u64 {
    if sf {
        let v = value as i64;
        u64::from(if v < 0 { (!value).leading_zeros() } else { value.leading_zeros() }) - 1
    } else {
        let v = value as u32 as i32;
        let value = value as u32;
        u64::from(if v < 0 { (!value).leading_zeros() } else { value.leading_zeros() }) - 1
    }
}

/// Bit reversal at the operand width.
pub fn rbit(value: u64, sf: bool) -> u64 {
    if sf {
        value.reverse_bits()
    } else {
        u64::from((value as u32).reverse_bits())
    }
}

/// Byte reversal within each 16-bit halfword.
pub fn rev16(value: u64, sf: bool) -> u64 {
    let swapped = ((value & 0x00FF_00FF_00FF_00FF) << 8) | ((value >> 8) & 0x00FF_00FF_00FF_00FF);
    trunc(swapped, sf)
}

/// Byte reversal within each 32-bit word (64-bit form only).
pub fn rev32(value: u64) -> u64 {
    let lo = u64::from((value as u32).swap_bytes());
    let hi = u64::from(((value >> 32) as u32).swap_bytes());
    (hi << 32) | lo
}

/// Full-width byte reversal.
pub fn rev(value: u64, sf: bool) -> u64 {
    if sf {
        value.swap_bytes()
    } else {
        u64::from((value as u32).swap_bytes())
    }
}
