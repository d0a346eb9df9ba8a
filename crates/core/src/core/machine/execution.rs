//! Functional executor.
//!
//! Execution is split into three phases so the cycle-accurate pipeline and
//! the fast-timing model share one set of semantics:
//! 1. **[`read_operands`]** captures source values (issue time).
//! 2. **[`execute`]** computes results; loads read memory here
//!    (execute-start), stores only describe their write.
//! 3. **[`retire`]** commits registers, flags, PC, and store data
//!    (writeback time).
//!
//! [`step`] chains the three for one instruction and is the whole functional
//! emulator: the pipeline produces exactly the architectural states this
//! function produces, differing only in cycle accounting.

use crate::common::error::{Fault, HaltReason};
use crate::core::arch::pstate::Pstate;
use crate::core::machine::Machine;
use crate::core::units::{alu, bru, fpu, lsu};
use crate::isa::decode::decode;
use crate::isa::instruction::{Decoded, IndexMode, Op};
use crate::os;

/// Source operand values captured at issue.
#[derive(Debug, Clone, Copy, Default)]
pub struct Operands {
    /// Value of `src1` (base register for loads/stores).
    pub a: u64,
    /// Value of `src2`.
    pub b: u64,
    /// Value of `src3`.
    pub c: u64,
    /// PSTATE at capture time (producers have retired by issue).
    pub flags: Pstate,
}

/// A pending memory write, performed at retirement.
#[derive(Debug, Clone, Copy)]
pub struct StoreOp {
    /// Target address.
    pub addr: u64,
    /// Data (low `size` bytes); ignored for wide zero-fill stores.
    pub data: u64,
    /// Width in bytes (over 8 means a zero-fill block from the FP stub).
    pub size: u8,
}

/// Computed effects of one instruction, applied at retirement.
#[derive(Debug, Clone, Copy, Default)]
pub struct Update {
    /// Result for the primary destination.
    pub value: Option<u64>,
    /// Result for the secondary destination (LDP pair, STXR status).
    pub value2: Option<u64>,
    /// New base-register value for pre/post-indexed addressing.
    pub base: Option<u64>,
    /// New NZCV flags for flag-setting instructions.
    pub flags: Option<Pstate>,
    /// Taken-branch target; `None` means fall through to PC+4.
    pub branch: Option<u64>,
    /// Pending stores (two for STP).
    pub stores: [Option<StoreOp>; 2],
    /// System-register write (MSR).
    pub sysreg: Option<(u32, u64)>,
    /// The FP stub produced this result.
    pub fp_stub: bool,
}

/// Captures source operand values from the register file.
pub fn read_operands(m: &Machine, d: &Decoded) -> Operands {
    Operands {
        a: m.regs.read(d.src1),
        b: m.regs.read(d.src2),
        c: m.regs.read(d.src3),
        flags: m.regs.pstate,
    }
}

/// Effective address of a load/store, plus the written-back base value for
/// pre/post-indexed forms.
pub fn address(d: &Decoded, ops: &Operands, pc: u64) -> (u64, Option<u64>) {
    match d.op {
        Op::LdrLit => (pc.wrapping_add(d.imm as u64), None),
        Op::LdrReg => {
            let offset = alu::extend(ops.b, d.extend, u32::from(d.shift_amt));
            (ops.a.wrapping_add(offset), None)
        }
        Op::StrReg => {
            let offset = alu::extend(ops.c, d.extend, u32::from(d.shift_amt));
            (ops.a.wrapping_add(offset), None)
        }
        // FP loads/stores carry either an immediate or an offset register;
        // exactly one is nonzero, so the sum covers both addressing forms.
        Op::FpLdr | Op::FpStr => {
            let reg = if d.op == Op::FpLdr { ops.b } else { ops.c };
            let offset = alu::extend(reg, d.extend, u32::from(d.shift_amt));
            let base = ops.a.wrapping_add(offset);
            let stride = d.imm as u64;
            match d.index {
                IndexMode::Offset => (base.wrapping_add(stride), None),
                IndexMode::Pre => {
                    let ea = base.wrapping_add(stride);
                    (ea, Some(ea))
                }
                IndexMode::Post => (base, Some(base.wrapping_add(stride))),
            }
        }
        _ => {
            let stride = d.imm as u64;
            match d.index {
                IndexMode::Offset => (ops.a.wrapping_add(stride), None),
                IndexMode::Pre => {
                    let ea = ops.a.wrapping_add(stride);
                    (ea, Some(ea))
                }
                IndexMode::Post => (ops.a, Some(ops.a.wrapping_add(stride))),
            }
        }
    }
}

/// Computes the effects of one instruction.
///
/// Loads read memory here (execute-start). Nothing architectural is written;
/// [`retire`] applies the returned [`Update`].
pub fn execute(m: &Machine, d: &Decoded, ops: &Operands, pc: u64) -> Update {
    let sf = d.sf;
    let mut up = Update::default();

    match d.op {
        // ── Arithmetic, immediate and register ───────────────────────
        Op::AddImm => up.value = Some(alu::add(ops.a, d.imm as u64, sf)),
        Op::SubImm => up.value = Some(alu::sub(ops.a, d.imm as u64, sf)),
        Op::AddsImm => {
            let (v, f) = alu::adds(ops.a, d.imm as u64, sf);
            up.value = Some(v);
            up.flags = Some(f);
        }
        Op::SubsImm => {
            let (v, f) = alu::subs(ops.a, d.imm as u64, sf);
            up.value = Some(v);
            up.flags = Some(f);
        }
        Op::AddReg | Op::SubReg | Op::AddsReg | Op::SubsReg => {
            let b = alu::shift(ops.b, d.shift, u32::from(d.shift_amt), sf);
            match d.op {
                Op::AddReg => up.value = Some(alu::add(ops.a, b, sf)),
                Op::SubReg => up.value = Some(alu::sub(ops.a, b, sf)),
                Op::AddsReg => {
                    let (v, f) = alu::adds(ops.a, b, sf);
                    up.value = Some(v);
                    up.flags = Some(f);
                }
                _ => {
                    let (v, f) = alu::subs(ops.a, b, sf);
                    up.value = Some(v);
                    up.flags = Some(f);
                }
            }
        }
        Op::AddExt | Op::SubExt | Op::AddsExt | Op::SubsExt => {
            let b = alu::trunc(alu::extend(ops.b, d.extend, u32::from(d.shift_amt)), sf);
            match d.op {
                Op::AddExt => up.value = Some(alu::add(ops.a, b, sf)),
                Op::SubExt => up.value = Some(alu::sub(ops.a, b, sf)),
                Op::AddsExt => {
                    let (v, f) = alu::adds(ops.a, b, sf);
                    up.value = Some(v);
                    up.flags = Some(f);
                }
                _ => {
                    let (v, f) = alu::subs(ops.a, b, sf);
                    up.value = Some(v);
                    up.flags = Some(f);
                }
            }
        }
        Op::Adc | Op::Adcs => {
            let (v, f) = alu::add_with_carry(
                alu::trunc(ops.a, sf),
                alu::trunc(ops.b, sf),
                ops.flags.c,
                sf,
            );
            up.value = Some(v);
            if d.op == Op::Adcs {
                up.flags = Some(f);
            }
        }
        Op::Sbc | Op::Sbcs => {
            let (v, f) = alu::add_with_carry(
                alu::trunc(ops.a, sf),
                alu::trunc(!ops.b, sf),
                ops.flags.c,
                sf,
            );
            up.value = Some(v);
            if d.op == Op::Sbcs {
                up.flags = Some(f);
            }
        }

        // ── Logic ────────────────────────────────────────────────────
        Op::AndImm | Op::OrrImm | Op::EorImm | Op::AndsImm => {
            let b = d.imm as u64;
            let v = match d.op {
                Op::AndImm | Op::AndsImm => alu::trunc(ops.a, sf) & b,
                Op::OrrImm => alu::trunc(ops.a, sf) | b,
                _ => alu::trunc(ops.a ^ b, sf),
            };
            up.value = Some(v);
            if d.sets_flags {
                up.flags = Some(alu::logic_flags(v, sf));
            }
        }
        Op::AndReg | Op::BicReg | Op::OrrReg | Op::OrnReg | Op::EorReg | Op::EonReg
        | Op::AndsReg | Op::BicsReg => {
            let b = alu::shift(ops.b, d.shift, u32::from(d.shift_amt), sf);
            let b = match d.op {
                Op::BicReg | Op::OrnReg | Op::EonReg | Op::BicsReg => alu::trunc(!b, sf),
                _ => b,
            };
            let a = alu::trunc(ops.a, sf);
            let v = match d.op {
                Op::AndReg | Op::BicReg | Op::AndsReg | Op::BicsReg => a & b,
                Op::OrrReg | Op::OrnReg => a | b,
                _ => a ^ b,
            };
            up.value = Some(v);
            if d.sets_flags {
                up.flags = Some(alu::logic_flags(v, sf));
            }
        }

        // ── Moves and bitfields ──────────────────────────────────────
        Op::Movz => up.value = Some((d.imm as u64) << d.shift_amt),
        Op::Movn => up.value = Some(alu::trunc(!((d.imm as u64) << d.shift_amt), sf)),
        Op::Movk => {
            let keep = !(0xFFFFu64 << d.shift_amt);
            up.value = Some(alu::trunc(
                (ops.a & keep) | ((d.imm as u64) << d.shift_amt),
                sf,
            ));
        }
        Op::Sbfm | Op::Ubfm | Op::Bfm => {
            up.value = Some(alu::bitfield(
                d.op == Op::Sbfm,
                d.op == Op::Bfm,
                ops.a,
                ops.b, // BFM old destination; Zr otherwise
                u32::from(d.shift_amt),
                d.imm as u32,
                sf,
            ));
        }
        Op::Extr => up.value = Some(alu::extract(ops.a, ops.b, u32::from(d.shift_amt), sf)),
        Op::Adr => up.value = Some(pc.wrapping_add(d.imm as u64)),
        Op::Adrp => up.value = Some((pc & !0xFFF).wrapping_add(d.imm as u64)),

        // ── Shifts, multiplies, divides ──────────────────────────────
        Op::Lslv | Op::Lsrv | Op::Asrv | Op::Rorv => {
            let kind = match d.op {
                Op::Lslv => crate::isa::instruction::ShiftKind::Lsl,
                Op::Lsrv => crate::isa::instruction::ShiftKind::Lsr,
                Op::Asrv => crate::isa::instruction::ShiftKind::Asr,
                _ => crate::isa::instruction::ShiftKind::Ror,
            };
            let amount = (ops.b as u32) % alu::width(sf);
            up.value = Some(alu::shift(ops.a, kind, amount, sf));
        }
        Op::Madd => up.value = Some(alu::trunc(ops.c.wrapping_add(ops.a.wrapping_mul(ops.b)), sf)),
        Op::Msub => up.value = Some(alu::trunc(ops.c.wrapping_sub(ops.a.wrapping_mul(ops.b)), sf)),
        Op::Smaddl | Op::Smsubl => {
            let prod = i64::from(ops.a as u32 as i32).wrapping_mul(i64::from(ops.b as u32 as i32));
            up.value = Some(if d.op == Op::Smaddl {
                ops.c.wrapping_add(prod as u64)
            } else {
                ops.c.wrapping_sub(prod as u64)
            });
        }
        Op::Umaddl | Op::Umsubl => {
            let prod = u64::from(ops.a as u32).wrapping_mul(u64::from(ops.b as u32));
            up.value = Some(if d.op == Op::Umaddl {
                ops.c.wrapping_add(prod)
            } else {
                ops.c.wrapping_sub(prod)
            });
        }
        Op::Smulh => {
            let prod = i128::from(ops.a as i64) * i128::from(ops.b as i64);
            up.value = Some((prod >> 64) as u64);
        }
        Op::Umulh => {
            let prod = u128::from(ops.a) * u128::from(ops.b);
            up.value = Some((prod >> 64) as u64);
        }
        Op::Udiv => up.value = Some(alu::udiv(ops.a, ops.b, sf)),
        Op::Sdiv => up.value = Some(alu::sdiv(ops.a, ops.b, sf)),

        // ── One-source data processing ───────────────────────────────
        Op::Rbit => up.value = Some(alu::rbit(ops.a, sf)),
        Op::Rev16 => up.value = Some(alu::rev16(ops.a, sf)),
        Op::Rev32 => up.value = Some(alu::rev32(ops.a)),
        Op::Rev => up.value = Some(alu::rev(ops.a, sf)),
        Op::Clz => up.value = Some(alu::clz(ops.a, sf)),
        Op::Cls => up.value = Some(alu::cls(ops.a, sf)),

        // ── Conditional select and compare ───────────────────────────
        Op::Csel | Op::Csinc | Op::Csinv | Op::Csneg => {
            let v = if bru::cond_holds(d.cond, ops.flags) {
                alu::trunc(ops.a, sf)
            } else {
                match d.op {
                    Op::Csel => alu::trunc(ops.b, sf),
                    Op::Csinc => alu::add(ops.b, 1, sf),
                    Op::Csinv => alu::trunc(!ops.b, sf),
                    _ => alu::trunc(ops.b.wrapping_neg(), sf),
                }
            };
            up.value = Some(v);
        }
        Op::CcmpImm | Op::CcmpReg | Op::CcmnImm | Op::CcmnReg => {
            let operand = match d.op {
                Op::CcmpImm | Op::CcmnImm => d.imm as u64,
                _ => ops.b,
            };
            up.flags = Some(if bru::cond_holds(d.cond, ops.flags) {
                match d.op {
                    Op::CcmnImm | Op::CcmnReg => alu::adds(ops.a, operand, sf).1,
                    _ => alu::subs(ops.a, operand, sf).1,
                }
            } else {
                Pstate::from_nzcv(d.nzcv)
            });
        }

        // ── Branches ─────────────────────────────────────────────────
        Op::B => up.branch = Some(pc.wrapping_add(d.imm as u64)),
        Op::Bl => {
            up.value = Some(pc.wrapping_add(4));
            up.branch = Some(pc.wrapping_add(d.imm as u64));
        }
        Op::BCond => {
            if bru::cond_holds(d.cond, ops.flags) {
                up.branch = Some(pc.wrapping_add(d.imm as u64));
            }
        }
        Op::Cbz | Op::Cbnz => {
            let zero = alu::trunc(ops.a, sf) == 0;
            if zero == (d.op == Op::Cbz) {
                up.branch = Some(pc.wrapping_add(d.imm as u64));
            }
        }
        Op::Tbz | Op::Tbnz => {
            let set = ops.a >> d.shift_amt & 1 == 1;
            if set == (d.op == Op::Tbnz) {
                up.branch = Some(pc.wrapping_add(d.imm as u64));
            }
        }
        Op::Br | Op::Ret => up.branch = Some(ops.a),
        Op::Blr => {
            up.value = Some(pc.wrapping_add(4));
            up.branch = Some(ops.a);
        }

        // ── Loads ────────────────────────────────────────────────────
        Op::LdrImm | Op::LdrReg | Op::LdrLit | Op::Ldxr | Op::Ldar => {
            let (ea, wb) = address(d, ops, pc);
            up.value = Some(lsu::extend_load(
                m.mem.read_sized(ea, d.size),
                d.size,
                d.signed,
                sf,
            ));
            up.base = wb;
        }
        Op::Ldp => {
            let (ea, wb) = address(d, ops, pc);
            up.value = Some(lsu::extend_load(
                m.mem.read_sized(ea, d.size),
                d.size,
                d.signed,
                sf,
            ));
            up.value2 = Some(lsu::extend_load(
                m.mem.read_sized(ea.wrapping_add(u64::from(d.size)), d.size),
                d.size,
                d.signed,
                sf,
            ));
            up.base = wb;
        }
        Op::FpLdr => {
            let (_, wb) = address(d, ops, pc);
            up.base = wb;
            up.fp_stub = true;
        }

        // ── Stores ───────────────────────────────────────────────────
        Op::StrImm | Op::StrReg | Op::Stlr => {
            let (ea, wb) = address(d, ops, pc);
            up.stores[0] = Some(StoreOp {
                addr: ea,
                data: lsu::narrow_store(ops.b, d.size),
                size: d.size,
            });
            up.base = wb;
        }
        Op::Stxr => {
            // Single core: the exclusive always succeeds; status reads 0.
            let (ea, _) = address(d, ops, pc);
            up.stores[0] = Some(StoreOp {
                addr: ea,
                data: lsu::narrow_store(ops.b, d.size),
                size: d.size,
            });
            up.value = Some(0);
        }
        Op::Stp => {
            let (ea, wb) = address(d, ops, pc);
            up.stores[0] = Some(StoreOp {
                addr: ea,
                data: lsu::narrow_store(ops.b, d.size),
                size: d.size,
            });
            up.stores[1] = Some(StoreOp {
                addr: ea.wrapping_add(u64::from(d.size)),
                data: lsu::narrow_store(ops.c, d.size),
                size: d.size,
            });
            up.base = wb;
        }
        Op::FpStr => {
            let (ea, wb) = address(d, ops, pc);
            up.stores[0] = Some(StoreOp {
                addr: ea,
                data: fpu::STUB_RESULT,
                size: d.size,
            });
            up.base = wb;
            up.fp_stub = true;
        }

        // ── System ───────────────────────────────────────────────────
        Op::Nop | Op::Barrier | Op::Svc => {}
        Op::Mrs => up.value = Some(m.sysreg_read(d.imm as u32)),
        Op::Msr => up.sysreg = Some((d.imm as u32, ops.a)),
        Op::FpOp => {
            if d.dst.is_some() {
                up.value = Some(fpu::STUB_RESULT);
            }
            up.fp_stub = true;
        }

        // Invalid records fault before reaching execution.
        Op::Invalid => debug_assert!(false, "invalid record reached execute"),
    }

    up
}

/// Commits the effects of one instruction: registers, flags, stores, PC,
/// and the retirement statistics.
pub fn retire(m: &mut Machine, d: &Decoded, up: &Update, pc: u64) {
    if let (Some(dst), Some(v)) = (d.dst, up.value) {
        m.regs.write(dst, v);
    }
    if let (Some(dst2), Some(v)) = (d.dst2, up.value2) {
        m.regs.write(dst2, v);
    }
    if let (Some(base), Some(v)) = (d.base_writeback(), up.base) {
        m.regs.write(base, v);
    }
    if let Some(f) = up.flags {
        m.regs.pstate = f;
    }
    if let Some((id, v)) = up.sysreg {
        m.sysreg_write(id, v);
    }
    for store in up.stores.iter().flatten() {
        if store.size <= 8 {
            m.mem.write_sized(store.addr, store.data, store.size);
        } else {
            // Wide zero-fill from the FP stub.
            m.mem.write_bytes(store.addr, &vec![0u8; usize::from(store.size)]);
        }
    }
    m.regs.set_pc(up.branch.unwrap_or_else(|| pc.wrapping_add(4)));

    m.stats.instructions_retired += 1;
    if d.op.is_load() {
        m.stats.inst_load += 1;
    } else if d.op.is_store() {
        m.stats.inst_store += 1;
    } else if d.op.is_branch() {
        m.stats.inst_branch += 1;
    } else if matches!(d.op, Op::Svc | Op::Mrs | Op::Msr | Op::Nop | Op::Barrier) {
        m.stats.inst_system += 1;
    } else if d.op == Op::FpOp {
        m.stats.inst_fp += 1;
    } else {
        m.stats.inst_alu += 1;
    }
    if up.fp_stub {
        m.stats.fp_stub_results += 1;
    }
}

/// Outcome of one functional step.
#[derive(Debug, Clone, Copy)]
pub struct StepOutcome {
    /// The instruction that retired.
    pub decoded: Decoded,
    /// It redirected the PC.
    pub taken_branch: bool,
}

/// Fetches, decodes, executes, and retires one instruction.
///
/// Syscalls run synchronously; an exit syscall halts the machine. Errors
/// surface only for undecodable words.
pub fn step(m: &mut Machine) -> Result<StepOutcome, Fault> {
    let pc = m.regs.pc();
    let word = m.mem.read32(pc);
    let d = decode(word);
    if d.op == Op::Invalid {
        return Err(Fault::Decode { pc, word });
    }

    let ops = read_operands(m, &d);
    let up = execute(m, &d, &ops, pc);
    retire(m, &d, &up, pc);

    if d.op == Op::Svc {
        if let os::SyscallAction::Exit(code) = os::dispatch(m) {
            m.halt(HaltReason::Exit(code));
        }
    }

    Ok(StepOutcome {
        decoded: d,
        taken_branch: up.branch.is_some(),
    })
}
