//! The "waitfg" loop. Hands the terminal to a job's process group, blocks
//! until that group is no longer the tracked foreground job (terminated,
//! stopped, or backgrounded out from under it), then reclaims the terminal
//! for the shell.

use crate::job::JobState;
use crate::shell::Shell;
use crate::signal;

/// Block the calling thread until `pgid` is no longer running in the
/// foreground: either its job was deleted (leader exited) or its state left
/// `RunningForeground` (stopped by a signal, or moved to the background).
///
/// Uses the classic `sigsuspend` idiom rather than polling: block `SIGCHLD`,
/// check the job table, and if still waiting, atomically unblock-and-sleep
/// with `sigsuspend` so a `SIGCHLD` that arrives between the check and the
/// sleep is never missed.
pub fn wait_for(shell: &mut Shell, pgid: libc::pid_t) {
    if shell.is_tty {
        let _ = crate::terminal::set_foreground_pgrp(libc::STDIN_FILENO, pgid);
    }

    loop {
        let prev_mask = signal::block_sigchld_for_wait();

        let still_fg = match shell.jobs.by_pgid(pgid) {
            Some(job) => job.state == JobState::RunningForeground,
            None => false,
        };

        if !still_fg {
            signal::restore_mask(&prev_mask);
            break;
        }

        // Atomically restores `prev_mask` (SIGCHLD unblocked) and sleeps;
        // returns after any signal is delivered and handled.
        signal::suspend_with(&prev_mask);
        signal::restore_mask(&prev_mask);
    }

    if shell.is_tty {
        let _ = crate::terminal::set_foreground_pgrp(libc::STDIN_FILENO, shell.pgid);
    }
}
