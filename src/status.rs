/// Map a raw `waitpid` status to shell-style exit code semantics, or `None`
/// if the status describes something other than termination (e.g. a stop).
///
/// Processes terminated by signal map to `128 + signal`, matching the
/// convention every POSIX shell uses for `$?`.
#[cfg(unix)]
pub fn exit_code_from_wait_status(raw_status: libc::c_int) -> Option<i32> {
    if unsafe { libc::WIFEXITED(raw_status) } {
        return Some(unsafe { libc::WEXITSTATUS(raw_status) });
    }

    if unsafe { libc::WIFSIGNALED(raw_status) } {
        let signal = unsafe { libc::WTERMSIG(raw_status) };
        return Some(128 + signal);
    }

    None
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;

    fn exited(code: i32) -> libc::c_int {
        // WIFEXITED/WEXITSTATUS encoding: low byte 0, exit code in bits 8-15.
        (code & 0xff) << 8
    }

    fn signaled(sig: i32) -> libc::c_int {
        // WIFSIGNALED/WTERMSIG encoding: signal number in the low 7 bits,
        // no core-dump bit set.
        sig & 0x7f
    }

    #[test]
    fn normal_exit_maps_to_its_code() {
        assert_eq!(exit_code_from_wait_status(exited(0)), Some(0));
        assert_eq!(exit_code_from_wait_status(exited(1)), Some(1));
        assert_eq!(exit_code_from_wait_status(exited(42)), Some(42));
    }

    #[test]
    fn death_by_signal_maps_to_128_plus_signal() {
        assert_eq!(
            exit_code_from_wait_status(signaled(libc::SIGINT)),
            Some(128 + libc::SIGINT)
        );
        assert_eq!(
            exit_code_from_wait_status(signaled(libc::SIGKILL)),
            Some(128 + libc::SIGKILL)
        );
    }
}
