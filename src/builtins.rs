//! Built-in commands: `jobs`, `fg`, `bg`, `exit`.
//!
//! Dispatch happens before the Pipeline Builder ever sees a line — these
//! names are never looked up on PATH.

use crate::job::JobState;
use crate::shell::Shell;

/// A command line's first word, if it names a built-in.
pub fn lookup(name: &str) -> Option<Builtin> {
    match name {
        "jobs" => Some(Builtin::Jobs),
        "fg" => Some(Builtin::Fg),
        "bg" => Some(Builtin::Bg),
        "exit" => Some(Builtin::Exit),
        _ => None,
    }
}

pub enum Builtin {
    Jobs,
    Fg,
    Bg,
    Exit,
}

/// Run a recognized built-in. Returns `true` if the shell should exit.
pub fn run(builtin: Builtin, args: &[String], shell: &mut Shell) -> bool {
    match builtin {
        Builtin::Jobs => {
            jobs(shell);
            false
        }
        Builtin::Fg => {
            fg(shell, args);
            false
        }
        Builtin::Bg => {
            bg(shell, args);
            false
        }
        Builtin::Exit => true,
    }
}

fn jobs(shell: &Shell) {
    for job in shell.jobs.list() {
        println!(
            "[{}] ({}) {} {}",
            job.jid,
            job.pgid,
            job.state.display_word(),
            job.cmdline
        );
    }
}

/// A resolved `%jid` or bare-pid job spec.
enum JobSpec<'a> {
    Jid(u32),
    Pid(libc::pid_t),
    Invalid(&'a str),
}

fn parse_spec(raw: &str) -> JobSpec<'_> {
    if let Some(digits) = raw.strip_prefix('%') {
        match digits.parse::<u32>() {
            Ok(jid) => JobSpec::Jid(jid),
            Err(_) => JobSpec::Invalid(raw),
        }
    } else {
        match raw.parse::<libc::pid_t>() {
            Ok(pid) => JobSpec::Pid(pid),
            Err(_) => JobSpec::Invalid(raw),
        }
    }
}

/// Resolve a spec to a live job's pgid, printing the spec-appropriate
/// diagnostic on failure.
fn resolve(shell: &Shell, spec: &str) -> Option<libc::pid_t> {
    match parse_spec(spec) {
        JobSpec::Jid(jid) => match shell.jobs.by_jid(jid) {
            Some(job) => Some(job.pgid),
            None => {
                println!("{spec}: No such job");
                None
            }
        },
        JobSpec::Pid(pid) => match shell.jobs.by_pgid(pid) {
            Some(job) => Some(job.pgid),
            None => {
                println!("({pid}): No such process");
                None
            }
        },
        JobSpec::Invalid(raw) => {
            println!("tsh: {raw}: argument must be a PID or %jobid");
            None
        }
    }
}

fn bg(shell: &mut Shell, args: &[String]) {
    let Some(spec) = args.first() else {
        println!("tsh: bg: missing job argument");
        return;
    };
    let Some(pgid) = resolve(shell, spec) else {
        return;
    };

    unsafe {
        libc::kill(-pgid, libc::SIGCONT);
    }

    if let Some(job) = shell.jobs.by_pgid_mut(pgid) {
        job.state = JobState::RunningBackground;
        println!("[{}] ({}) {}", job.jid, job.pgid, job.cmdline);
    }
}

fn fg(shell: &mut Shell, args: &[String]) {
    let Some(spec) = args.first() else {
        println!("tsh: fg: missing job argument");
        return;
    };
    let Some(pgid) = resolve(shell, spec) else {
        return;
    };

    unsafe {
        libc::kill(-pgid, libc::SIGCONT);
    }

    if let Some(job) = shell.jobs.by_pgid_mut(pgid) {
        job.state = JobState::RunningForeground;
    } else {
        return;
    }

    crate::foreground::wait_for(shell, pgid);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_recognizes_all_four_builtins() {
        assert!(matches!(lookup("jobs"), Some(Builtin::Jobs)));
        assert!(matches!(lookup("fg"), Some(Builtin::Fg)));
        assert!(matches!(lookup("bg"), Some(Builtin::Bg)));
        assert!(matches!(lookup("exit"), Some(Builtin::Exit)));
        assert!(lookup("ls").is_none());
    }

    #[test]
    fn parse_spec_distinguishes_jid_and_pid_forms() {
        assert!(matches!(parse_spec("%3"), JobSpec::Jid(3)));
        assert!(matches!(parse_spec("1234"), JobSpec::Pid(1234)));
        assert!(matches!(parse_spec("%x"), JobSpec::Invalid(_)));
        assert!(matches!(parse_spec("abc"), JobSpec::Invalid(_)));
    }
}
