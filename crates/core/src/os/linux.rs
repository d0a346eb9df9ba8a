//! Linux AArch64 syscall numbers, errno values, and OS constants.
//!
//! Numbers follow the generic (asm-generic) table used by arm64.

/// `write(fd, buf, len)`.
pub const SYS_WRITE: u64 = 64;
/// `writev(fd, iov, iovcnt)`.
pub const SYS_WRITEV: u64 = 66;
/// `exit(status)`.
pub const SYS_EXIT: u64 = 93;
/// `exit_group(status)`.
pub const SYS_EXIT_GROUP: u64 = 94;
/// `set_tid_address(tidptr)`.
pub const SYS_SET_TID_ADDRESS: u64 = 96;
/// `clock_gettime(clockid, ts)`.
pub const SYS_CLOCK_GETTIME: u64 = 113;
/// `getpid()`.
pub const SYS_GETPID: u64 = 172;
/// `getuid()`.
pub const SYS_GETUID: u64 = 174;
/// `geteuid()`.
pub const SYS_GETEUID: u64 = 175;
/// `getgid()`.
pub const SYS_GETGID: u64 = 176;
/// `getegid()`.
pub const SYS_GETEGID: u64 = 177;
/// `gettid()`.
pub const SYS_GETTID: u64 = 178;
/// `brk(addr)`.
pub const SYS_BRK: u64 = 214;
/// `munmap(addr, len)`.
pub const SYS_MUNMAP: u64 = 215;
/// `mmap(addr, len, prot, flags, fd, off)`.
pub const SYS_MMAP: u64 = 222;
/// `mprotect(addr, len, prot)`.
pub const SYS_MPROTECT: u64 = 226;
/// `prlimit64(pid, resource, new, old)`.
pub const SYS_PRLIMIT64: u64 = 261;

/// Bad file descriptor.
pub const EBADF: i64 = 9;
/// I/O error.
pub const EIO: i64 = 5;
/// Invalid argument.
pub const EINVAL: i64 = 22;
/// Function not implemented.
pub const ENOSYS: i64 = 38;

/// The constant process id this machine reports.
pub const PID: u64 = 1000;
/// The constant thread id (single-threaded: equals the pid).
pub const TID: u64 = PID;
/// The constant uid/euid/gid/egid.
pub const UID: u64 = 1000;

/// `RLIMIT_STACK` resource number.
pub const RLIMIT_STACK: u64 = 3;
/// Unlimited rlimit value.
pub const RLIM_INFINITY: u64 = u64::MAX;

/// `CLOCK_REALTIME` clock id.
pub const CLOCK_REALTIME: u64 = 0;
