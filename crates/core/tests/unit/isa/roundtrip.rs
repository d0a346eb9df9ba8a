//! Round-trip coverage of every supported opcode class.
//!
//! For each class, at least one canonical word: `encode(decode(word))` must
//! reproduce the word exactly. The decoder must also be total — any `u32`
//! decodes to exactly one record without panicking.

use proptest::prelude::*;

use m2sim_core::isa::encode::encode;
use m2sim_core::isa::{decode, Op};

/// Canonical words, one or more per opcode class, with their expected class.
///
/// Encodings cross-checked against a reference assembler.
const CANONICAL: &[(u32, Op)] = &[
    // Data processing, immediate.
    (0x9100_A821, Op::AddImm),  // add  x1, x1, #42
    (0xB100_0400, Op::AddsImm), // adds x0, x0, #1
    (0xD100_0400, Op::SubImm),  // sub  x0, x0, #1
    (0xF100_0400, Op::SubsImm), // subs x0, x0, #1
    (0x9240_1C20, Op::AndImm),  // and  x0, x1, #0xff
    (0xB240_1C20, Op::OrrImm),  // orr  x0, x1, #0xff
    (0xD240_1C20, Op::EorImm),  // eor  x0, x1, #0xff
    (0xF240_1C20, Op::AndsImm), // ands x0, x1, #0xff
    (0x9280_0540, Op::Movn),    // movn x0, #42
    (0xD280_0540, Op::Movz),    // movz x0, #42
    (0xF2B7_DDE5, Op::Movk),    // movk x5, #0xbeef, lsl #16
    (0x9344_1C20, Op::Sbfm),    // sbfm x0, x1, #4, #7
    (0xB378_1C20, Op::Bfm),     // bfi  x0, x1, #8, #8
    (0xD344_FC20, Op::Ubfm),    // lsr  x0, x1, #4
    (0x93C2_1020, Op::Extr),    // extr x0, x1, x2, #4
    (0x1000_0040, Op::Adr),     // adr  x0, .+8
    (0xB000_0000, Op::Adrp),    // adrp x0, .+0x1000
    // Data processing, register.
    (0x8B02_0020, Op::AddReg),  // add  x0, x1, x2
    (0xAB02_0020, Op::AddsReg), // adds x0, x1, x2
    (0xCB02_0020, Op::SubReg),  // sub  x0, x1, x2
    (0xEB02_0020, Op::SubsReg), // subs x0, x1, x2
    (0x8B22_4020, Op::AddExt),  // add  x0, x1, w2, uxtw
    (0x9A02_0020, Op::Adc),     // adc  x0, x1, x2
    (0xBA02_0020, Op::Adcs),    // adcs x0, x1, x2
    (0xDA02_0020, Op::Sbc),     // sbc  x0, x1, x2
    (0xFA02_0020, Op::Sbcs),    // sbcs x0, x1, x2
    (0x8A02_0020, Op::AndReg),  // and  x0, x1, x2
    (0x8A22_0020, Op::BicReg),  // bic  x0, x1, x2
    (0xAA02_0020, Op::OrrReg),  // orr  x0, x1, x2
    (0xAA22_0020, Op::OrnReg),  // orn  x0, x1, x2
    (0xCA02_0020, Op::EorReg),  // eor  x0, x1, x2
    (0xCA22_0020, Op::EonReg),  // eon  x0, x1, x2
    (0xEA02_0020, Op::AndsReg), // ands x0, x1, x2
    (0xEA22_0020, Op::BicsReg), // bics x0, x1, x2
    (0x9AC2_2020, Op::Lslv),    // lsl  x0, x1, x2
    (0x9AC2_2420, Op::Lsrv),    // lsr  x0, x1, x2
    (0x9AC2_2820, Op::Asrv),    // asr  x0, x1, x2
    (0x9AC2_2C20, Op::Rorv),    // ror  x0, x1, x2
    (0x9B02_0C20, Op::Madd),    // madd x0, x1, x2, x3
    (0x9B02_8C20, Op::Msub),    // msub x0, x1, x2, x3
    (0x9B22_0C20, Op::Smaddl),  // smaddl x0, w1, w2, x3
    (0x9B22_8C20, Op::Smsubl),  // smsubl x0, w1, w2, x3
    (0x9BA2_0C20, Op::Umaddl),  // umaddl x0, w1, w2, x3
    (0x9BA2_8C20, Op::Umsubl),  // umsubl x0, w1, w2, x3
    (0x9B42_7C20, Op::Smulh),   // smulh x0, x1, x2
    (0x9BC2_7C20, Op::Umulh),   // umulh x0, x1, x2
    (0x9AC2_0820, Op::Udiv),    // udiv x0, x1, x2
    (0x9AC2_0C20, Op::Sdiv),    // sdiv x0, x1, x2
    (0xDAC0_0020, Op::Rbit),    // rbit x0, x1
    (0xDAC0_0420, Op::Rev16),   // rev16 x0, x1
    (0xDAC0_0820, Op::Rev32),   // rev32 x0, x1
    (0xDAC0_0C20, Op::Rev),     // rev  x0, x1
    (0xDAC0_1020, Op::Clz),     // clz  x0, x1
    (0xDAC0_1420, Op::Cls),     // cls  x0, x1
    (0x9A82_0020, Op::Csel),    // csel  x0, x1, x2, eq
    (0x9A82_0420, Op::Csinc),   // csinc x0, x1, x2, eq
    (0xDA82_0020, Op::Csinv),   // csinv x0, x1, x2, eq
    (0xDA82_0420, Op::Csneg),   // csneg x0, x1, x2, eq
    (0xBA42_0824, Op::CcmnImm), // ccmn x1, #2, #4, eq
    (0xFA42_0824, Op::CcmpImm), // ccmp x1, #2, #4, eq
    (0xBA42_1020, Op::CcmnReg), // ccmn x1, x2, #0, ne
    (0xFA42_1020, Op::CcmpReg), // ccmp x1, x2, #0, ne
    // Branches.
    (0x1400_0002, Op::B),     // b   .+8
    (0x9400_0002, Op::Bl),    // bl  .+8
    (0x5400_0040, Op::BCond), // b.eq .+8
    (0xB400_0040, Op::Cbz),   // cbz  x0, .+8
    (0xB500_0040, Op::Cbnz),  // cbnz x0, .+8
    (0xB608_0040, Op::Tbz),   // tbz  x0, #33, .+8
    (0x3700_0040, Op::Tbnz),  // tbnz w0, #0, .+8
    (0xD61F_0020, Op::Br),    // br  x1
    (0xD63F_0020, Op::Blr),   // blr x1
    (0xD65F_03C0, Op::Ret),   // ret
    // Loads and stores.
    (0xF940_0BE0, Op::LdrImm), // ldr   x0, [sp, #16]
    (0xB940_0420, Op::LdrImm), // ldr   w0, [x1, #4]
    (0x3940_0420, Op::LdrImm), // ldrb  w0, [x1, #1]
    (0x7940_0420, Op::LdrImm), // ldrh  w0, [x1, #2]
    (0xB980_0420, Op::LdrImm), // ldrsw x0, [x1, #4]
    (0x3980_0020, Op::LdrImm), // ldrsb x0, [x1]
    (0x79C0_0020, Op::LdrImm), // ldrsh w0, [x1]
    (0xF85F_8020, Op::LdrImm), // ldur  x0, [x1, #-8]
    (0xF840_8C20, Op::LdrImm), // ldr   x0, [x1, #8]!
    (0xF900_0BE0, Op::StrImm), // str   x0, [sp, #16]
    (0x3900_0420, Op::StrImm), // strb  w0, [x1, #1]
    (0xF800_8420, Op::StrImm), // str   x0, [x1], #8
    (0xF862_6820, Op::LdrReg), // ldr   x0, [x1, x2]
    (0xF862_C820, Op::LdrReg), // ldr   x0, [x1, w2, sxtw]
    (0xF822_6820, Op::StrReg), // str   x0, [x1, x2]
    (0x5800_0040, Op::LdrLit), // ldr   x0, .+8
    (0x1800_0040, Op::LdrLit), // ldr   w0, .+8
    (0x9800_0040, Op::LdrLit), // ldrsw x0, .+8
    (0xA941_0440, Op::Ldp),    // ldp  x0, x1, [x2, #16]
    (0x6941_0440, Op::Ldp),    // ldpsw x0, x1, [x2, #8]
    (0xA8C1_7BFD, Op::Ldp),    // ldp  x29, x30, [sp], #16
    (0xA901_0440, Op::Stp),    // stp  x0, x1, [x2, #16]
    (0xA9BF_7BFD, Op::Stp),    // stp  x29, x30, [sp, #-16]!
    (0xC85F_7C20, Op::Ldxr),   // ldxr x0, [x1]
    (0xC802_7C20, Op::Stxr),   // stxr w2, x0, [x1]
    (0xC8DF_FC20, Op::Ldar),   // ldar x0, [x1]
    (0xC89F_FC20, Op::Stlr),   // stlr x0, [x1]
    // System.
    (0xD503_201F, Op::Nop),     // nop
    (0xD503_3BBF, Op::Barrier), // dmb ish
    (0xD400_0001, Op::Svc),     // svc #0
    (0xD53B_D043, Op::Mrs),     // mrs x3, tpidr_el0
    (0xD51B_D043, Op::Msr),     // msr tpidr_el0, x3
];

#[test]
fn every_class_round_trips_through_its_canonical_word() {
    for &(word, op) in CANONICAL {
        let decoded = decode(word);
        assert_eq!(decoded.op, op, "class of {word:#010x}");
        assert_eq!(
            encode(&decoded),
            Some(word),
            "re-encoding {word:#010x} ({op:?})"
        );
    }
}

#[test]
fn builder_words_decode_to_their_classes() {
    use crate::common::builder;
    assert_eq!(decode(builder::movz(3, 9, 1)).op, Op::Movz);
    assert_eq!(decode(builder::add_imm(1, 2, 3)).op, Op::AddImm);
    assert_eq!(decode(builder::madd(1, 2, 3, 4)).op, Op::Madd);
    assert_eq!(decode(builder::stp_pre(0, 1, 31, -32)).op, Op::Stp);
    assert_eq!(decode(builder::ldp_post(0, 1, 31, 32)).op, Op::Ldp);
    assert_eq!(decode(builder::cbnz(7, -16)).op, Op::Cbnz);
    assert_eq!(decode(builder::blr(9)).op, Op::Blr);
}

proptest! {
    /// The decoder is total: any word produces exactly one record.
    #[test]
    fn decode_never_panics(word in any::<u32>()) {
        let _ = decode(word);
    }

    /// Canonical re-encoding is stable: if a decoded word re-encodes, the
    /// re-encoded word decodes to an identical record class and operands.
    #[test]
    fn reencoding_is_stable(word in any::<u32>()) {
        let first = decode(word);
        if let Some(canonical) = encode(&first) {
            let second = decode(canonical);
            prop_assert_eq!(first.op, second.op);
            prop_assert_eq!(first.dst, second.dst);
            prop_assert_eq!(first.src1, second.src1);
            prop_assert_eq!(first.src2, second.src2);
            prop_assert_eq!(first.imm, second.imm);
            prop_assert_eq!(first.size, second.size);
            prop_assert_eq!(first.signed, second.signed);
            prop_assert_eq!(first.sets_flags, second.sets_flags);
        }
    }
}
