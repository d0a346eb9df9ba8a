//! Syscall dispatch.
//!
//! Dispatches on x8 against the number table, reads arguments from x0–x5,
//! and places the result in x0. Runs synchronously during the pipeline's
//! drain window (or inline in the functional step), so it may freely mutate
//! the machine.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::core::machine::Machine;
use crate::isa::abi;
use crate::mem::PAGE_SIZE;
use crate::os::linux::{self, EBADF, EINVAL, EIO, ENOSYS};

/// What the core should do after a syscall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyscallAction {
    /// Resume at PC+4.
    Continue,
    /// Halt; the program exited with this code.
    Exit(u8),
}

/// Rounds a length up to the next page boundary.
fn page_align(len: u64) -> u64 {
    (len + PAGE_SIZE - 1) & !(PAGE_SIZE - 1)
}

/// Handles the syscall described by the current register state.
pub fn dispatch(m: &mut Machine) -> SyscallAction {
    let number = m.regs.x(abi::REG_SYSCALL);
    let args = [
        m.regs.x(abi::REG_A0),
        m.regs.x(abi::REG_A1),
        m.regs.x(abi::REG_A2),
        m.regs.x(abi::REG_A3),
    ];
    m.stats.syscalls += 1;

    let result: i64 = match number {
        linux::SYS_EXIT | linux::SYS_EXIT_GROUP => {
            let code = (args[0] & 0xFF) as u8;
            debug!(code, "program exit");
            return SyscallAction::Exit(code);
        }

        linux::SYS_WRITE => sys_write(m, args[0], args[1], args[2]),

        linux::SYS_WRITEV => sys_writev(m, args[0], args[1], args[2]),

        linux::SYS_SET_TID_ADDRESS => {
            m.tid_address = args[0];
            linux::TID as i64
        }

        linux::SYS_CLOCK_GETTIME => sys_clock_gettime(m, args[0], args[1]),

        linux::SYS_GETPID => linux::PID as i64,
        linux::SYS_GETTID => linux::TID as i64,
        linux::SYS_GETUID | linux::SYS_GETEUID | linux::SYS_GETGID | linux::SYS_GETEGID => {
            linux::UID as i64
        }

        linux::SYS_BRK => {
            let requested = args[0];
            if requested >= m.brk_base {
                m.brk = requested;
            }
            // The break grows lazily: pages appear when the program writes.
            m.brk as i64
        }

        linux::SYS_MMAP => {
            let len = args[1];
            if len == 0 {
                -EINVAL
            } else {
                let addr = m.mmap_top;
                m.mmap_top += page_align(len);
                debug!(addr, len, "anonymous mmap");
                addr as i64
            }
        }

        linux::SYS_MUNMAP => 0,

        linux::SYS_MPROTECT => {
            // Accepted and recorded; the core enforces no protection.
            m.mprotect_log.push((args[0], args[1], args[2]));
            0
        }

        linux::SYS_PRLIMIT64 => {
            let old = args[3];
            if old != 0 {
                if args[1] != linux::RLIMIT_STACK {
                    debug!(resource = args[1], "prlimit64 reports infinity");
                }
                m.mem.write64(old, linux::RLIM_INFINITY);
                m.mem.write64(old.wrapping_add(8), linux::RLIM_INFINITY);
            }
            0
        }

        other => {
            debug!(number = other, "unknown syscall returns -ENOSYS");
            -ENOSYS
        }
    };

    m.regs.set_x(abi::REG_A0, result as u64);
    SyscallAction::Continue
}

/// `write`: fd 1 and 2 reach the host sinks; everything else is EBADF.
fn sys_write(m: &mut Machine, fd: u64, buf: u64, len: u64) -> i64 {
    let data = m.mem.read_bytes(buf, len as usize);
    let sink = match fd {
        1 => &mut m.stdout,
        2 => &mut m.stderr,
        _ => return -EBADF,
    };
    match sink.write_all(&data).and_then(|()| sink.flush()) {
        Ok(()) => len as i64,
        Err(e) => {
            warn!(fd, error = %e, "host write failed");
            -EIO
        }
    }
}

/// `writev`: gathers up to 1024 iovecs through the same sinks as `write`.
fn sys_writev(m: &mut Machine, fd: u64, iov: u64, iovcnt: u64) -> i64 {
    if fd != 1 && fd != 2 {
        return -EBADF;
    }
    if iovcnt > 1024 {
        return -EINVAL;
    }
    let mut total: i64 = 0;
    for i in 0..iovcnt {
        let base = m.mem.read64(iov + i * 16);
        let len = m.mem.read64(iov + i * 16 + 8);
        if len == 0 {
            continue;
        }
        let written = sys_write(m, fd, base, len);
        if written < 0 {
            return written;
        }
        total += written;
    }
    total
}

/// `clock_gettime`: realtime from the host wall clock, everything else from
/// the host monotonic clock relative to machine start.
fn sys_clock_gettime(m: &mut Machine, clock_id: u64, ts: u64) -> i64 {
    let (sec, nsec) = if clock_id == linux::CLOCK_REALTIME {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => (d.as_secs(), d.subsec_nanos()),
            Err(_) => (0, 0),
        }
    } else {
        let d = m.start.elapsed();
        (d.as_secs(), d.subsec_nanos())
    };
    if ts != 0 {
        m.mem.write64(ts, sec);
        m.mem.write64(ts.wrapping_add(8), u64::from(nsec));
    }
    0
}
