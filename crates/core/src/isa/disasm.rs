//! Compact disassembler for trace output.
//!
//! Formats a [`Decoded`] record as a short mnemonic string. This exists for
//! `tracing` output and fault messages, not for round-trip fidelity: aliases
//! are not reconstructed (`SUBS xzr, ...` prints as `subs`, not `cmp`).

use crate::core::arch::regs::Reg;
use crate::isa::instruction::{Decoded, IndexMode, Op};
use crate::isa::sysreg;

/// Formats a register operand at the record's operand width.
fn reg(r: Reg, sf: bool) -> String {
    match (r, sf) {
        (Reg::X(n), true) => format!("x{n}"),
        (Reg::X(n), false) => format!("w{n}"),
        (Reg::Zr, true) => "xzr".into(),
        (Reg::Zr, false) => "wzr".into(),
        (Reg::Sp, _) => "sp".into(),
    }
}

/// The bare mnemonic of an opcode class.
fn mnemonic(d: &Decoded) -> &'static str {
    match d.op {
        Op::AddImm | Op::AddReg | Op::AddExt => "add",
        Op::AddsImm | Op::AddsReg | Op::AddsExt => "adds",
        Op::SubImm | Op::SubReg | Op::SubExt => "sub",
        Op::SubsImm | Op::SubsReg | Op::SubsExt => "subs",
        Op::Adc => "adc",
        Op::Adcs => "adcs",
        Op::Sbc => "sbc",
        Op::Sbcs => "sbcs",
        Op::AndImm | Op::AndReg => "and",
        Op::OrrImm | Op::OrrReg => "orr",
        Op::EorImm | Op::EorReg => "eor",
        Op::AndsImm | Op::AndsReg => "ands",
        Op::BicReg => "bic",
        Op::OrnReg => "orn",
        Op::EonReg => "eon",
        Op::BicsReg => "bics",
        Op::Movn => "movn",
        Op::Movz => "movz",
        Op::Movk => "movk",
        Op::Sbfm => "sbfm",
        Op::Bfm => "bfm",
        Op::Ubfm => "ubfm",
        Op::Extr => "extr",
        Op::Adr => "adr",
        Op::Adrp => "adrp",
        Op::Lslv => "lsl",
        Op::Lsrv => "lsr",
        Op::Asrv => "asr",
        Op::Rorv => "ror",
        Op::Madd => "madd",
        Op::Msub => "msub",
        Op::Smaddl => "smaddl",
        Op::Smsubl => "smsubl",
        Op::Umaddl => "umaddl",
        Op::Umsubl => "umsubl",
        Op::Smulh => "smulh",
        Op::Umulh => "umulh",
        Op::Udiv => "udiv",
        Op::Sdiv => "sdiv",
        Op::Rbit => "rbit",
        Op::Rev16 => "rev16",
        Op::Rev32 => "rev32",
        Op::Rev => "rev",
        Op::Clz => "clz",
        Op::Cls => "cls",
        Op::Csel => "csel",
        Op::Csinc => "csinc",
        Op::Csinv => "csinv",
        Op::Csneg => "csneg",
        Op::CcmnImm | Op::CcmnReg => "ccmn",
        Op::CcmpImm | Op::CcmpReg => "ccmp",
        Op::B => "b",
        Op::Bl => "bl",
        Op::BCond => "b.",
        Op::Cbz => "cbz",
        Op::Cbnz => "cbnz",
        Op::Tbz => "tbz",
        Op::Tbnz => "tbnz",
        Op::Br => "br",
        Op::Blr => "blr",
        Op::Ret => "ret",
        Op::LdrImm | Op::LdrReg | Op::LdrLit => "ldr",
        Op::StrImm | Op::StrReg => "str",
        Op::Ldp => "ldp",
        Op::Stp => "stp",
        Op::Ldxr => "ldxr",
        Op::Stxr => "stxr",
        Op::Ldar => "ldar",
        Op::Stlr => "stlr",
        Op::FpLdr => "ldr.fp",
        Op::FpStr => "str.fp",
        Op::Nop => "nop",
        Op::Barrier => "dmb",
        Op::Svc => "svc",
        Op::Mrs => "mrs",
        Op::Msr => "msr",
        Op::FpOp => "fp",
        Op::Invalid => ".inst",
    }
}

/// Formats one decoded instruction at `pc`.
pub fn format(pc: u64, d: &Decoded) -> String {
    let m = mnemonic(d);
    match d.op {
        Op::Invalid => format!("{m} {:#010x}", d.raw),
        Op::Nop | Op::Barrier | Op::FpOp => m.to_string(),
        Op::Svc => format!("{m} #{}", d.imm),
        Op::Mrs => format!(
            "{m} {}, {}",
            reg(d.dst.unwrap_or(Reg::Zr), true),
            sysreg::name(d.imm as u32)
        ),
        Op::Msr => format!("{m} {}, {}", sysreg::name(d.imm as u32), reg(d.src1, true)),
        Op::B | Op::Bl => format!("{m} {:#x}", pc.wrapping_add(d.imm as u64)),
        Op::BCond => format!("b.{} {:#x}", d.cond.mnemonic(), pc.wrapping_add(d.imm as u64)),
        Op::Cbz | Op::Cbnz => format!(
            "{m} {}, {:#x}",
            reg(d.src1, d.sf),
            pc.wrapping_add(d.imm as u64)
        ),
        Op::Tbz | Op::Tbnz => format!(
            "{m} {}, #{}, {:#x}",
            reg(d.src1, d.sf),
            d.shift_amt,
            pc.wrapping_add(d.imm as u64)
        ),
        Op::Br | Op::Blr | Op::Ret => format!("{m} {}", reg(d.src1, true)),
        Op::Adr | Op::Adrp => {
            let base = if d.op == Op::Adrp { pc & !0xFFF } else { pc };
            format!(
                "{m} {}, {:#x}",
                reg(d.dst.unwrap_or(Reg::Zr), true),
                base.wrapping_add(d.imm as u64)
            )
        }
        Op::LdrLit => format!(
            "{m} {}, {:#x}",
            reg(d.dst.unwrap_or(Reg::Zr), d.sf),
            pc.wrapping_add(d.imm as u64)
        ),
        _ if d.op.is_load() || d.op.is_store() => {
            let data = if d.op.is_load() {
                reg(d.dst.unwrap_or(Reg::Zr), d.sf)
            } else {
                reg(d.src2, d.sf)
            };
            let addr = match d.index {
                IndexMode::Offset if d.imm == 0 => format!("[{}]", reg(d.src1, true)),
                IndexMode::Offset => format!("[{}, #{}]", reg(d.src1, true), d.imm),
                IndexMode::Pre => format!("[{}, #{}]!", reg(d.src1, true), d.imm),
                IndexMode::Post => format!("[{}], #{}", reg(d.src1, true), d.imm),
            };
            format!("{m} {data}, {addr}")
        }
        _ => {
            // Data-processing: dst, src1[, src2][, #imm]
            let mut out = format!("{m} {}", reg(d.dst.unwrap_or(Reg::Zr), d.sf));
            out.push_str(&format!(", {}", reg(d.src1, d.sf)));
            if d.src2 != Reg::Zr || matches!(d.op, Op::AddReg | Op::SubReg | Op::OrrReg) {
                out.push_str(&format!(", {}", reg(d.src2, d.sf)));
            }
            if d.imm != 0 {
                out.push_str(&format!(", #{:#x}", d.imm));
            }
            if matches!(d.op, Op::BCond | Op::Csel | Op::Csinc | Op::Csinv | Op::Csneg) {
                out.push_str(&format!(", {}", d.cond.mnemonic()));
            }
            out
        }
    }
}
