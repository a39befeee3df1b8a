//! Pipeline Builder — forks one child per stage, wires N−1 pipes
//! between them, applies per-stage redirections, assigns every stage to one
//! process group, and registers a single job for the whole pipeline.
//!
//! Forking is done directly through `libc::fork`/`execvp` rather than
//! `std::process::Command`: an exec failure needs to leave a live child
//! behind that prints its own diagnostic and exits 1 — `Command::spawn`
//! instead surfaces exec failure to the *parent* as an `io::Error`, with no
//! child process ever existing to reap. Raw `fork` is the only way to get
//! that child-side behavior.

use std::ffi::CString;
use std::io;

use crate::error::{Result, ShellError};
use crate::job::JobState;
use crate::parser::ParsedLine;
use crate::redirect::{RedirectKind, Redirection};
use crate::shell::Shell;
use crate::signal::SigchldBlock;

/// Run one parsed pipeline to completion (foreground) or hand it to the job
/// table and return immediately (background).
pub fn run(shell: &mut Shell, parsed: ParsedLine, cmdline: &str) -> Result<()> {
    let n = parsed.stages.len();
    let background = parsed.background;

    // Block SIGCHLD for the whole fork+register window so the reaper
    // cannot observe and delete a job before it is recorded.
    let block = SigchldBlock::new();

    let mut prev_read: Option<libc::c_int> = None;
    let mut group_leader: libc::pid_t = 0;
    let mut spawn_err: Option<ShellError> = None;

    for (i, stage) in parsed.stages.iter().enumerate() {
        let is_last = i + 1 == n;

        let mut stage_pipe: Option<(libc::c_int, libc::c_int)> = None;
        if !is_last {
            let mut fds = [0 as libc::c_int; 2];
            if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
                spawn_err = Some(ShellError::PipelineConstruction(format!(
                    "pipe: {}",
                    io::Error::last_os_error()
                )));
                break;
            }
            stage_pipe = Some((fds[0], fds[1]));
        }

        log::trace!("forking stage {i} ({:?})", stage.words.first());
        let pid = unsafe { libc::fork() };

        if pid < 0 {
            if let Some((r, w)) = stage_pipe {
                unsafe {
                    libc::close(r);
                    libc::close(w);
                }
            }
            spawn_err = Some(ShellError::PipelineConstruction(format!(
                "fork: {}",
                io::Error::last_os_error()
            )));
            break;
        }

        if pid == 0 {
            // Child: never returns.
            child_exec(stage, prev_read, stage_pipe, group_leader, background, i == 0, shell.is_tty);
        }

        // Parent.
        if i == 0 {
            group_leader = pid;
        }
        // Race-defensive: both parent and child call setpgid on the child.
        // Whichever wins, the result is the same; EACCES/ESRCH from the
        // loser are expected and ignored.
        unsafe {
            libc::setpgid(pid, group_leader);
        }

        if let Some(fd) = prev_read {
            unsafe {
                libc::close(fd);
            }
        }
        prev_read = match stage_pipe {
            Some((r, w)) => {
                unsafe {
                    libc::close(w);
                }
                Some(r)
            }
            None => None,
        };

        log::debug!("stage {i} pid={pid} pgid={group_leader}");
    }

    if let Some(err) = spawn_err {
        if let Some(fd) = prev_read {
            unsafe {
                libc::close(fd);
            }
        }
        // Already-forked stages are left running; the reaper harvests them
        // normally. Nothing is registered in the job table.
        return Err(err);
    }

    let state = if background {
        JobState::RunningBackground
    } else {
        JobState::RunningForeground
    };
    let jid = shell.jobs.add(group_leader, state, cmdline.to_string())?;

    // Unblock SIGCHLD, ending the critical section.
    drop(block);

    if background {
        // `cmdline` is the raw input line, which already carries the
        // trailing `&` the user typed.
        println!("[{jid}] ({group_leader}) {cmdline}");
    } else {
        crate::foreground::wait_for(shell, group_leader);
    }

    Ok(())
}

/// Child-side setup after fork. Never returns: always ends in `execvp` or
/// `_exit`.
fn child_exec(
    stage: &crate::parser::Stage,
    read_fd: Option<libc::c_int>,
    stage_pipe: Option<(libc::c_int, libc::c_int)>,
    group_leader: libc::pid_t,
    background: bool,
    is_first: bool,
    is_tty: bool,
) -> ! {
    unsafe {
        // Restore the default signal disposition: unblock everything the
        // shell had blocked, and reset handlers/ignored signals the shell
        // installed — none of that should survive into the new program.
        let mut empty: libc::sigset_t = std::mem::zeroed();
        libc::sigemptyset(&mut empty);
        libc::sigprocmask(libc::SIG_SETMASK, &empty, std::ptr::null_mut());
        libc::signal(libc::SIGINT, libc::SIG_DFL);
        libc::signal(libc::SIGTSTP, libc::SIG_DFL);
        libc::signal(libc::SIGTTIN, libc::SIG_DFL);
        libc::signal(libc::SIGTTOU, libc::SIG_DFL);
        libc::signal(libc::SIGCHLD, libc::SIG_DFL);

        // Join (or create) the pipeline's process group.
        let target = if group_leader == 0 { 0 } else { group_leader };
        libc::setpgid(0, target);

        // Only the first stage of a foreground pipeline takes the terminal.
        if !background && is_first && is_tty {
            libc::tcsetpgrp(libc::STDIN_FILENO, libc::getpid());
        }

        // Wire standard input/output through the pipes (before redirections
        // so a stage's own `<`/`>` can override the adjacent pipe end).
        if let Some(r) = read_fd {
            libc::dup2(r, libc::STDIN_FILENO);
            libc::close(r);
        }
        if let Some((r, w)) = stage_pipe {
            libc::dup2(w, libc::STDOUT_FILENO);
            libc::close(w);
            libc::close(r);
        }

        if let Err(msg) = apply_redirections(&stage.redirections) {
            eprintln!("tsh: {msg}");
            libc::_exit(1);
        }

        let program = match CString::new(stage.words[0].as_str()) {
            Ok(s) => s,
            Err(_) => libc::_exit(127),
        };
        let args: Vec<CString> = stage
            .words
            .iter()
            .map(|w| CString::new(w.as_str()).unwrap_or_default())
            .collect();
        let mut argv: Vec<*const libc::c_char> = args.iter().map(|a| a.as_ptr()).collect();
        argv.push(std::ptr::null());

        libc::execvp(program.as_ptr(), argv.as_ptr());

        // execvp only returns on failure.
        println!("{}: Command not found", stage.words[0]);
        libc::_exit(1);
    }
}

/// Apply a stage's redirections in order, overriding whatever the pipe
/// wiring set up. Creation mode is 0644 for newly created files.
fn apply_redirections(redirections: &[Redirection]) -> std::result::Result<(), String> {
    for redir in redirections {
        let path = CString::new(redir.path.as_str())
            .map_err(|_| format!("{}: invalid path", redir.path))?;
        let (flags, fd) = match redir.kind {
            RedirectKind::In => (libc::O_RDONLY, libc::STDIN_FILENO),
            RedirectKind::Out => (libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC, libc::STDOUT_FILENO),
            RedirectKind::Append => (libc::O_WRONLY | libc::O_CREAT | libc::O_APPEND, libc::STDOUT_FILENO),
        };

        let opened = unsafe { libc::open(path.as_ptr(), flags, 0o644) };
        if opened < 0 {
            return Err(format!("{}: {}", redir.path, io::Error::last_os_error()));
        }
        unsafe {
            libc::dup2(opened, fd);
            libc::close(opened);
        }
    }
    Ok(())
}
