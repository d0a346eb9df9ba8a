//! Opcode classes and the decoded instruction record.
//!
//! This module defines the [`Decoded`] record the rest of the simulator
//! consumes: one tagged opcode class plus resolved operands, immediates, and
//! control flags. The decoder produces exactly one record per 32-bit word;
//! unimplemented encodings use the [`Op::Invalid`] class, which faults when
//! it reaches writeback.

use crate::core::arch::regs::Reg;

/// AArch64 condition codes (the low bit inverts the sense of the pair).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub enum Cond {
    Eq = 0,
    Ne = 1,
    Cs = 2,
    Cc = 3,
    Mi = 4,
    Pl = 5,
    Vs = 6,
    Vc = 7,
    Hi = 8,
    Ls = 9,
    Ge = 10,
    Lt = 11,
    Gt = 12,
    Le = 13,
    #[default]
    Al = 14,
    Nv = 15,
}

impl Cond {
    /// Decodes a 4-bit condition field.
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0xF {
            0 => Self::Eq,
            1 => Self::Ne,
            2 => Self::Cs,
            3 => Self::Cc,
            4 => Self::Mi,
            5 => Self::Pl,
            6 => Self::Vs,
            7 => Self::Vc,
            8 => Self::Hi,
            9 => Self::Ls,
            10 => Self::Ge,
            11 => Self::Lt,
            12 => Self::Gt,
            13 => Self::Le,
            14 => Self::Al,
            _ => Self::Nv,
        }
    }

    /// The 4-bit encoding of this condition.
    pub fn bits(self) -> u32 {
        self as u32
    }

    /// The mnemonic suffix (`eq`, `ne`, ...).
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Cs => "cs",
            Self::Cc => "cc",
            Self::Mi => "mi",
            Self::Pl => "pl",
            Self::Vs => "vs",
            Self::Vc => "vc",
            Self::Hi => "hi",
            Self::Ls => "ls",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Gt => "gt",
            Self::Le => "le",
            Self::Al => "al",
            Self::Nv => "nv",
        }
    }
}

/// Shift applied to the second operand of shifted-register forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftKind {
    /// Logical shift left.
    #[default]
    Lsl,
    /// Logical shift right.
    Lsr,
    /// Arithmetic shift right.
    Asr,
    /// Rotate right (logical forms only).
    Ror,
}

impl ShiftKind {
    /// Decodes the 2-bit shift-type field.
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0 => Self::Lsl,
            1 => Self::Lsr,
            2 => Self::Asr,
            _ => Self::Ror,
        }
    }

    /// The 2-bit encoding of this shift type.
    pub fn bits(self) -> u32 {
        match self {
            Self::Lsl => 0,
            Self::Lsr => 1,
            Self::Asr => 2,
            Self::Ror => 3,
        }
    }
}

/// Operand extension for extended-register arithmetic and register-offset
/// addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub enum Extend {
    Uxtb,
    Uxth,
    Uxtw,
    #[default]
    Uxtx,
    Sxtb,
    Sxth,
    Sxtw,
    Sxtx,
}

impl Extend {
    /// Decodes the 3-bit option field.
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0b111 {
            0 => Self::Uxtb,
            1 => Self::Uxth,
            2 => Self::Uxtw,
            3 => Self::Uxtx,
            4 => Self::Sxtb,
            5 => Self::Sxth,
            6 => Self::Sxtw,
            _ => Self::Sxtx,
        }
    }

    /// The 3-bit encoding of this extension.
    pub fn bits(self) -> u32 {
        match self {
            Self::Uxtb => 0,
            Self::Uxth => 1,
            Self::Uxtw => 2,
            Self::Uxtx => 3,
            Self::Sxtb => 4,
            Self::Sxth => 5,
            Self::Sxtw => 6,
            Self::Sxtx => 7,
        }
    }
}

/// Addressing mode of a load/store with an immediate offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexMode {
    /// Plain base + offset; the base register is not written.
    #[default]
    Offset,
    /// Pre-index: base is updated before the access; access uses the new base.
    Pre,
    /// Post-index: access uses the old base; base is updated afterwards.
    Post,
}

/// Opcode classes of the implemented AArch64 user-mode subset.
///
/// One class covers every size/width variant of an operation; the record's
/// `sf`, `size`, and `signed` fields carry the variant. Aliases (MOV, CMP,
/// TST, LSL-immediate, CSET, ...) decode to their underlying class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub enum Op {
    // Data processing — immediate
    AddImm,
    AddsImm,
    SubImm,
    SubsImm,
    AndImm,
    OrrImm,
    EorImm,
    AndsImm,
    Movn,
    Movz,
    Movk,
    Sbfm,
    Bfm,
    Ubfm,
    Extr,
    Adr,
    Adrp,

    // Data processing — register
    AddReg,
    AddsReg,
    SubReg,
    SubsReg,
    AddExt,
    AddsExt,
    SubExt,
    SubsExt,
    Adc,
    Adcs,
    Sbc,
    Sbcs,
    AndReg,
    BicReg,
    OrrReg,
    OrnReg,
    EorReg,
    EonReg,
    AndsReg,
    BicsReg,
    Lslv,
    Lsrv,
    Asrv,
    Rorv,
    Madd,
    Msub,
    Smaddl,
    Smsubl,
    Umaddl,
    Umsubl,
    Smulh,
    Umulh,
    Udiv,
    Sdiv,
    Rbit,
    Rev16,
    Rev32,
    Rev,
    Clz,
    Cls,
    Csel,
    Csinc,
    Csinv,
    Csneg,
    CcmnImm,
    CcmpImm,
    CcmnReg,
    CcmpReg,

    // Branches
    B,
    Bl,
    BCond,
    Cbz,
    Cbnz,
    Tbz,
    Tbnz,
    Br,
    Blr,
    Ret,

    // Loads and stores
    LdrImm,
    StrImm,
    LdrReg,
    StrReg,
    LdrLit,
    Ldp,
    Stp,
    Ldxr,
    Stxr,
    Ldar,
    Stlr,
    FpLdr,
    FpStr,

    // System
    #[default]
    Nop,
    Barrier,
    Svc,
    Mrs,
    Msr,

    /// Scalar/vector FP and SIMD data processing (stub unit).
    FpOp,

    /// Unimplemented or reserved encoding; faults at writeback.
    Invalid,
}

impl Op {
    /// True for every control-transfer class (resolved at writeback).
    pub fn is_branch(self) -> bool {
        matches!(
            self,
            Self::B
                | Self::Bl
                | Self::BCond
                | Self::Cbz
                | Self::Cbnz
                | Self::Tbz
                | Self::Tbnz
                | Self::Br
                | Self::Blr
                | Self::Ret
        )
    }

    /// True for classes that redirect or serialize the front end
    /// (branches and SVC).
    pub fn is_control(self) -> bool {
        self.is_branch() || self == Self::Svc
    }

    /// True for memory loads (architectural reads at execute-start).
    pub fn is_load(self) -> bool {
        matches!(
            self,
            Self::LdrImm | Self::LdrReg | Self::LdrLit | Self::Ldp | Self::Ldxr | Self::Ldar | Self::FpLdr
        )
    }

    /// True for memory stores (data written at writeback).
    pub fn is_store(self) -> bool {
        matches!(
            self,
            Self::StrImm | Self::StrReg | Self::Stp | Self::Stxr | Self::Stlr | Self::FpStr
        )
    }
}

/// A decoded instruction.
///
/// Carries the opcode class, resolved register operands (the decoder settles
/// the XZR/SP ambiguity of encoded index 31), immediates, and control flags.
/// The record is plain data: reading one never touches architectural state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoded {
    /// Raw 32-bit instruction word.
    pub raw: u32,
    /// Opcode class.
    pub op: Op,
    /// 64-bit operand width (`sf` bit); 32-bit forms truncate and zero-extend.
    pub sf: bool,
    /// Destination register, if the class writes one.
    pub dst: Option<Reg>,
    /// Second destination (LDP data 2, STXR status register).
    pub dst2: Option<Reg>,
    /// First source (also the base register of loads/stores).
    pub src1: Reg,
    /// Second source (offset register, store data, ...).
    pub src2: Reg,
    /// Third source (MADD addend, STP data 2).
    pub src3: Reg,
    /// Immediate: offsets, logical masks, `imms` for bitfields, SVC number,
    /// system-register id for MRS/MSR.
    pub imm: i64,
    /// Shift type of shifted-register operands.
    pub shift: ShiftKind,
    /// Shift amount; also `immr` for bitfields, `hw*16` for move-wide,
    /// `lsb` for EXTR, bit number for TBZ/TBNZ.
    pub shift_amt: u8,
    /// Operand extension of extended-register and register-offset forms.
    pub extend: Extend,
    /// Addressing mode of immediate-offset loads/stores.
    pub index: IndexMode,
    /// Condition code of conditional forms.
    pub cond: Cond,
    /// Memory access size in bytes (1, 2, 4, 8, or 16 for pairs/SIMD).
    pub size: u8,
    /// Sign-extending load.
    pub signed: bool,
    /// Writes the NZCV flags.
    pub sets_flags: bool,
    /// NZCV nibble of conditional compares.
    pub nzcv: u8,
}

impl Decoded {
    /// True when execution reads the NZCV flags.
    pub fn reads_flags(&self) -> bool {
        matches!(
            self.op,
            Op::BCond
                | Op::Csel
                | Op::Csinc
                | Op::Csinv
                | Op::Csneg
                | Op::CcmnImm
                | Op::CcmpImm
                | Op::CcmnReg
                | Op::CcmpReg
                | Op::Adc
                | Op::Adcs
                | Op::Sbc
                | Op::Sbcs
        )
    }

    /// The base register written back by pre/post-indexed addressing, if any.
    pub fn base_writeback(&self) -> Option<Reg> {
        match self.index {
            IndexMode::Offset => None,
            IndexMode::Pre | IndexMode::Post => Some(self.src1),
        }
    }

    /// All register destinations this instruction writes (excluding flags).
    pub fn dests(&self) -> impl Iterator<Item = Reg> + '_ {
        self.dst
            .into_iter()
            .chain(self.dst2)
            .chain(self.base_writeback())
    }

    /// All register sources this instruction reads.
    pub fn sources(&self) -> [Reg; 3] {
        [self.src1, self.src2, self.src3]
    }
}
