//! ELF loading and address-space setup.
//!
//! This module turns a statically-linked AArch64 Linux ELF into an initial
//! machine state. It performs:
//! 1. **Parsing:** `object`-based extraction of entry point and PT_LOAD
//!    segments into a [`Program`] record.
//! 2. **Placement:** [`load_segments`] writes segment bytes into memory;
//!    BSS (`mem_size > data.len()`) is zero by construction because
//!    unmapped reads are zero.
//! 3. **Process setup:** [`setup_stack`] builds the Linux process stack
//!    (argc/argv/envp/auxv) and seeds SP; the program break starts at the
//!    page-aligned end of the highest segment.

use std::fs;
use std::path::Path;

use object::{Architecture, Object, ObjectSegment};
use thiserror::Error;
use tracing::debug;

use crate::core::machine::Machine;
use crate::mem::{Memory, PAGE_SIZE};
use crate::os::linux;

/// Stack top for the simulated process (grows down; pages appear lazily).
pub const STACK_TOP: u64 = 0x7FFF_F000_0000;

/// Deterministic bytes reported through `AT_RANDOM`.
///
/// Real kernels pass fresh entropy; a simulator that wants reproducible
/// runs must not. Static libcs only use this for pointer-guard seeds.
const AT_RANDOM_BYTES: [u8; 16] = *b"m2sim-not-random";

/// Loader failures.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("cannot read program: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not a parseable ELF object.
    #[error("cannot parse ELF: {0}")]
    Parse(#[from] object::Error),
    /// The ELF is not AArch64.
    #[error("not an AArch64 ELF (architecture {0:?})")]
    WrongArchitecture(Architecture),
}

/// One loadable segment.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Target virtual address.
    pub vaddr: u64,
    /// File-backed bytes.
    pub data: Vec<u8>,
    /// In-memory size; the tail past `data.len()` is BSS.
    pub mem_size: u64,
}

/// A loaded program image: entry point plus segments.
#[derive(Debug, Clone)]
pub struct Program {
    /// Entry PC.
    pub entry: u64,
    /// PT_LOAD segments.
    pub segments: Vec<Segment>,
}

/// Parses a statically-linked AArch64 ELF from disk.
pub fn load_elf(path: impl AsRef<Path>) -> Result<Program, LoadError> {
    let bytes = fs::read(path.as_ref())?;
    parse_elf(&bytes)
}

/// Parses an in-memory ELF image.
pub fn parse_elf(bytes: &[u8]) -> Result<Program, LoadError> {
    let file = object::File::parse(bytes)?;
    if file.architecture() != Architecture::Aarch64 {
        return Err(LoadError::WrongArchitecture(file.architecture()));
    }

    let mut segments = Vec::new();
    for segment in file.segments() {
        let data = segment.data()?.to_vec();
        let mem_size = segment.size();
        if mem_size == 0 {
            continue;
        }
        segments.push(Segment {
            vaddr: segment.address(),
            data,
            mem_size,
        });
    }

    debug!(
        entry = format_args!("{:#x}", file.entry()),
        segments = segments.len(),
        "parsed ELF"
    );
    Ok(Program {
        entry: file.entry(),
        segments,
    })
}

/// Writes a program's segments into memory.
///
/// Returns the page-aligned end of the highest segment — the initial
/// program break. BSS needs no explicit zeroing: unmapped reads are zero.
pub fn load_segments(mem: &mut Memory, program: &Program) -> u64 {
    let mut end = 0u64;
    for segment in &program.segments {
        mem.write_bytes(segment.vaddr, &segment.data);
        end = end.max(segment.vaddr.wrapping_add(segment.mem_size));
    }
    (end + PAGE_SIZE - 1) & !(PAGE_SIZE - 1)
}

/// Builds the initial Linux process stack and seeds SP.
///
/// Layout (descending from [`STACK_TOP`]): argv[0] string and the
/// `AT_RANDOM` block, then a 16-byte-aligned vector of
/// `argc, argv, NULL, envp NULL, auxv…, AT_NULL`.
pub fn setup_stack(m: &mut Machine, program_name: &str) {
    // auxv keys (asm-generic).
    const AT_NULL: u64 = 0;
    const AT_PAGESZ: u64 = 6;
    const AT_UID: u64 = 11;
    const AT_EUID: u64 = 12;
    const AT_GID: u64 = 13;
    const AT_EGID: u64 = 14;
    const AT_CLKTCK: u64 = 17;
    const AT_SECURE: u64 = 23;
    const AT_RANDOM: u64 = 25;

    let mut sp = STACK_TOP;

    sp -= 16;
    let random_ptr = sp;
    m.mem.write_bytes(random_ptr, &AT_RANDOM_BYTES);

    let name = program_name.as_bytes();
    sp -= (name.len() as u64 + 1 + 15) & !15;
    let argv0_ptr = sp;
    m.mem.write_bytes(argv0_ptr, name);
    m.mem.write8(argv0_ptr + name.len() as u64, 0);

    let vector: [u64; 22] = [
        1,         // argc
        argv0_ptr, // argv[0]
        0,         // argv terminator
        0,         // envp terminator
        AT_PAGESZ, PAGE_SIZE,
        AT_CLKTCK, 100,
        AT_UID, linux::UID,
        AT_EUID, linux::UID,
        AT_GID, linux::UID,
        AT_EGID, linux::UID,
        AT_SECURE, 0,
        AT_RANDOM, random_ptr,
        AT_NULL, 0,
    ];
    sp -= (vector.len() * 8) as u64;
    debug_assert_eq!(sp % 16, 0, "AArch64 requires a 16-byte-aligned SP");
    for (i, value) in vector.iter().enumerate() {
        m.mem.write64(sp + (i as u64) * 8, *value);
    }

    m.regs.set_sp(sp);
}

/// Loads a program into a machine: segments, program break, and stack.
///
/// The caller still seeds the PC (through the façade, so fetch redirects
/// with it).
pub fn load(m: &mut Machine, program: &Program, program_name: &str) {
    let brk = load_segments(&mut m.mem, program);
    m.set_brk(brk);
    setup_stack(m, program_name);
}
