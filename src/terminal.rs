//! Controlling-terminal ownership.
//!
//! All of this is best-effort when standard input isn't a terminal (piped
//! input, as in tests and non-interactive invocations): callers are expected
//! to check `is_tty` first and skip these calls entirely rather than treat
//! `ENOTTY` as fatal.

use std::io;
use std::mem::MaybeUninit;

pub fn is_tty(fd: libc::c_int) -> bool {
    unsafe { libc::isatty(fd) == 1 }
}

pub fn save_modes(fd: libc::c_int) -> Option<libc::termios> {
    let mut term = MaybeUninit::<libc::termios>::uninit();
    if unsafe { libc::tcgetattr(fd, term.as_mut_ptr()) } == 0 {
        Some(unsafe { term.assume_init() })
    } else {
        None
    }
}

pub fn restore_modes(fd: libc::c_int, term: &libc::termios) {
    unsafe {
        libc::tcsetattr(fd, libc::TCSADRAIN, term);
    }
}

pub fn foreground_pgrp(fd: libc::c_int) -> io::Result<libc::pid_t> {
    let pgid = unsafe { libc::tcgetpgrp(fd) };
    if pgid < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(pgid)
    }
}

/// Transfer the terminal's foreground process group to `pgid`. Requires
/// `SIGTTOU` to already be ignored process-wide — otherwise a shell that is
/// not itself the foreground group would be stopped by this call.
pub fn set_foreground_pgrp(fd: libc::c_int, pgid: libc::pid_t) -> io::Result<()> {
    if unsafe { libc::tcsetpgrp(fd, pgid) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
