/// The lifecycle state of a tracked job. `Undefined` marks an empty slot in
/// the job table and is never observed outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Undefined,
    RunningForeground,
    RunningBackground,
    Stopped,
}

impl JobState {
    /// The word `jobs` prints for this state. Never called on `Undefined`.
    pub fn display_word(self) -> &'static str {
        match self {
            JobState::RunningForeground => "Foreground",
            JobState::RunningBackground => "Running",
            JobState::Stopped => "Stopped",
            JobState::Undefined => "Undefined",
        }
    }
}

/// One record per active pipeline. `pgid` equals the PID of the pipeline's
/// first (leader) stage.
#[derive(Debug, Clone)]
pub struct Job {
    pub pgid: libc::pid_t,
    pub jid: u32,
    pub state: JobState,
    pub cmdline: String,
}
