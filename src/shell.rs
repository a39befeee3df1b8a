//! Shell bootstrap and the process-wide `Shell` value.
//!
//! The job table, shell pgid, saved terminal modes and next-jid counter all
//! live inside one `Shell` owned by `main`. The `SIGCHLD` handler can't
//! accept user context, so it reaches the same `Shell` through a raw
//! process-singleton pointer installed once at startup.

use std::io;

use crate::config::Limits;
use crate::job::JobState;
use crate::job_table::JobTable;
use crate::status;
use crate::terminal;

pub struct Shell {
    pub pgid: libc::pid_t,
    pub jobs: JobTable,
    pub limits: Limits,
    pub is_tty: bool,
    pub saved_termios: Option<libc::termios>,
}

impl Shell {
    /// Acquire the controlling terminal, become our own process group,
    /// save terminal modes, and hand ourselves the foreground. Tolerates
    /// `ENOTTY` (stdin is not a terminal) rather than failing — the shell
    /// still runs, it just never owns a terminal to hand off.
    pub fn bootstrap(limits: Limits) -> io::Result<Self> {
        let stdin_fd = libc::STDIN_FILENO;
        let is_tty = terminal::is_tty(stdin_fd);

        if is_tty {
            // Step 1: stop ourselves until we are the terminal's foreground
            // group. A shell launched interactively already is; this loop
            // only matters if tsh itself was launched into the background
            // of another job-controlling shell.
            loop {
                let own_pgid = unsafe { libc::getpgrp() };
                match terminal::foreground_pgrp(stdin_fd) {
                    Ok(fg) if fg == own_pgid => break,
                    Ok(_) => unsafe {
                        libc::kill(-own_pgid, libc::SIGTTIN);
                    },
                    Err(_) => break,
                }
            }
        }

        // Step 2: become our own process group leader. Best-effort: a
        // process that is already a session leader cannot change its own
        // pgid (EPERM), and is already its own group in that case anyway.
        let pid = unsafe { libc::getpid() };
        unsafe {
            libc::setpgid(pid, pid);
        }
        let pgid = unsafe { libc::getpgrp() };

        // Step 3: save terminal modes for later restoration.
        let saved_termios = if is_tty {
            terminal::save_modes(stdin_fd)
        } else {
            None
        };

        // Step 4: take the foreground.
        if is_tty {
            terminal::set_foreground_pgrp(stdin_fd, pgid)?;
        }

        log::debug!("shell bootstrapped: pgid={pgid} is_tty={is_tty}");

        Ok(Shell {
            pgid,
            jobs: JobTable::new(limits.max_jobs),
            limits,
            is_tty,
            saved_termios,
        })
    }

    /// Restore the terminal to its pre-shell state. Called once, at exit.
    pub fn restore_terminal(&self) {
        if !self.is_tty {
            return;
        }
        if let Some(term) = &self.saved_termios {
            terminal::restore_modes(libc::STDIN_FILENO, term);
        }
        let _ = terminal::set_foreground_pgrp(libc::STDIN_FILENO, self.pgid);
    }

    /// The `SIGCHLD` reaper: non-blockingly harvest every terminated or
    /// stopped child, keeping the job table consistent.
    ///
    /// A job is deleted only when its *leader* pid (the job's `pgid`)
    /// reports termination — terminations of intermediate pipeline stages
    /// are reaped (no zombies survive) but leave the job table entry alone.
    pub fn reap(&mut self) {
        loop {
            let mut raw_status: libc::c_int = 0;
            let waited = unsafe { libc::waitpid(-1, &mut raw_status, libc::WNOHANG | libc::WUNTRACED) };

            if waited == 0 {
                break;
            }
            if waited < 0 {
                // ECHILD: no children left to wait for. EINTR: retry.
                let err = io::Error::last_os_error();
                if err.raw_os_error() == Some(libc::EINTR) {
                    continue;
                }
                break;
            }

            if unsafe { libc::WIFSTOPPED(raw_status) } {
                let signal = unsafe { libc::WSTOPSIG(raw_status) };
                if let Some(job) = self.jobs.by_pgid_mut(waited) {
                    job.state = JobState::Stopped;
                    println!("Job [{}] ({}) stopped by signal {}", job.jid, job.pgid, signal);
                    log::debug!("job {} (pgid {}) stopped by signal {}", job.jid, job.pgid, signal);
                }
                continue;
            }

            if status::exit_code_from_wait_status(raw_status).is_some() {
                if self.jobs.delete(waited) {
                    log::debug!("reaped leader pid {waited}, job deleted");
                } else {
                    log::trace!("reaped non-leader pid {waited}");
                }
            }
        }
    }
}

static mut SHELL_PTR: *mut Shell = std::ptr::null_mut();

/// Install the process-singleton pointer the `SIGCHLD` handler uses to
/// reach the job table. Must be called exactly once, before
/// `signal::install_handlers`, and `shell` must outlive the process.
///
/// # Safety
/// The caller must ensure `shell` is not moved or dropped for the remainder
/// of the process, and that this is called before any signal that could
/// invoke the reaper is unblocked.
pub unsafe fn set_global(shell: &mut Shell) {
    unsafe {
        SHELL_PTR = shell as *mut Shell;
    }
}

/// # Safety
/// May only be called from within the `SIGCHLD` handler on the same thread
/// that called `set_global`; the shell is single-threaded so there is no
/// concurrent access, only handler reentrancy, which this module's signal
/// masking discipline prevents during critical sections.
pub unsafe fn global_mut() -> Option<&'static mut Shell> {
    unsafe { SHELL_PTR.as_mut() }
}
