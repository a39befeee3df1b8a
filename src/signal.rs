//! Signal masking and handler installation.
//!
//! The reaper is a real `SIGCHLD` handler, not a polling thread — the shell
//! is single-threaded, so the handler runs on the same thread of execution,
//! interrupting it at whatever instruction it was at. It reaches shell state
//! through the process-singleton pointer installed by `shell::set_global`.

use std::io;
use std::mem::MaybeUninit;

/// RAII guard for the signal-masked critical section around fork + job-table
/// registration. Blocks `SIGCHLD` on construction, restores the prior mask
/// on drop — this is what makes job creation totally ordered with respect
/// to the reaper.
pub struct SigchldBlock {
    prev: libc::sigset_t,
}

impl SigchldBlock {
    pub fn new() -> Self {
        let set = sigchld_only_set();
        let mut prev = MaybeUninit::<libc::sigset_t>::uninit();
        unsafe {
            libc::sigprocmask(libc::SIG_BLOCK, &set, prev.as_mut_ptr());
        }
        SigchldBlock {
            // SAFETY: sigprocmask always populates oldset on success; this
            // call cannot fail with a valid signal set.
            prev: unsafe { prev.assume_init() },
        }
    }
}

impl Default for SigchldBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SigchldBlock {
    fn drop(&mut self) {
        unsafe {
            libc::sigprocmask(libc::SIG_SETMASK, &self.prev, std::ptr::null_mut());
        }
    }
}

fn sigchld_only_set() -> libc::sigset_t {
    let mut set = MaybeUninit::<libc::sigset_t>::uninit();
    unsafe {
        libc::sigemptyset(set.as_mut_ptr());
        libc::sigaddset(set.as_mut_ptr(), libc::SIGCHLD);
        set.assume_init()
    }
}

/// Block `SIGCHLD` and return the mask that was active beforehand, for the
/// `sigsuspend`-based wait in the foreground controller: block, check
/// state, `sigsuspend(&prev)` to atomically unblock-and-wait in one step so
/// no wakeup is lost between the check and the suspend.
pub fn block_sigchld_for_wait() -> libc::sigset_t {
    let set = sigchld_only_set();
    let mut prev = MaybeUninit::<libc::sigset_t>::uninit();
    unsafe {
        libc::sigprocmask(libc::SIG_BLOCK, &set, prev.as_mut_ptr());
        prev.assume_init()
    }
}

pub fn restore_mask(mask: &libc::sigset_t) {
    unsafe {
        libc::sigprocmask(libc::SIG_SETMASK, mask, std::ptr::null_mut());
    }
}

/// Suspend the shell until a signal is delivered, with `mask` as the signal
/// mask in effect while suspended (SIGCHLD unmasked in it, per above).
pub fn suspend_with(mask: &libc::sigset_t) {
    unsafe {
        libc::sigsuspend(mask);
    }
}

extern "C" fn sigchld_reap(_sig: libc::c_int) {
    // SAFETY: async-signal-safety is knowingly relaxed here, matching the
    // original reference handler's behavior of calling straight into
    // allocating, printing code from the handler (see REDESIGN FLAGS). The
    // shell is single-threaded, so there is no data race, only reentrancy,
    // and the reenterable state (the job table) is only ever touched here or
    // with SIGCHLD blocked.
    if let Some(shell) = unsafe { crate::shell::global_mut() } {
        shell.reap();
    }
}

extern "C" fn noop_handler(_sig: libc::c_int) {}

fn install(sig: libc::c_int, handler: extern "C" fn(libc::c_int)) -> io::Result<()> {
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = handler as usize;
        libc::sigemptyset(&mut action.sa_mask);
        action.sa_flags = libc::SA_RESTART;
        if libc::sigaction(sig, &action, std::ptr::null_mut()) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

fn ignore(sig: libc::c_int) -> io::Result<()> {
    unsafe {
        if libc::signal(sig, libc::SIG_IGN) == libc::SIG_ERR {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

/// Install the shell's signal disposition. Must run after `shell::set_global`
/// so a `SIGCHLD` arriving mid-install has a target.
pub fn install_handlers() -> io::Result<()> {
    install(libc::SIGCHLD, sigchld_reap)?;

    // The terminal driver sends these to the *foreground* process group.
    // While a pipeline is running that's the child group, not the shell; the
    // shell only ever observes them directly if it is itself foreground
    // (e.g. between prompts), in which case doing nothing is correct.
    install(libc::SIGINT, noop_handler)?;
    install(libc::SIGTSTP, noop_handler)?;

    // Ignored process-wide so the shell can call tcsetpgrp/write to the
    // terminal without being stopped by the driver itself.
    ignore(libc::SIGTTIN)?;
    ignore(libc::SIGTTOU)?;

    Ok(())
}
