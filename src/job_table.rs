use crate::error::{Result, ShellError};
use crate::job::{Job, JobState};

/// Bounded registry of active pipelines, keyed by both a small monotonic
/// job id and the OS process-group id.
///
/// Backed by a fixed-length array of slots rather than a growable map: an
/// `Undefined` slot is free, everything else is live. All operations are
/// meant to run with SIGCHLD blocked at the callsite (see `signal::mask`);
/// the table itself does no locking of its own.
pub struct JobTable {
    slots: Vec<Job>,
    next_jid: u32,
}

impl JobTable {
    pub fn new(capacity: usize) -> Self {
        JobTable {
            slots: (0..capacity).map(|_| Job::empty_slot()).collect(),
            next_jid: 1,
        }
    }

    /// Register a newly built pipeline. Fails if every slot is occupied.
    pub fn add(&mut self, pgid: libc::pid_t, state: JobState, cmdline: String) -> Result<u32> {
        let jid = self.next_jid;
        let slot = self
            .slots
            .iter_mut()
            .find(|job| job.state == JobState::Undefined)
            .ok_or(ShellError::TableFull)?;

        *slot = Job {
            pgid,
            jid,
            state,
            cmdline,
        };
        self.next_jid += 1;
        Ok(jid)
    }

    /// Clear the slot owning `pgid`. No-op if no live job has it.
    pub fn delete(&mut self, pgid: libc::pid_t) -> bool {
        match self.slots.iter_mut().find(|job| job.live() && job.pgid == pgid) {
            Some(slot) => {
                *slot = Job::empty_slot();
                true
            }
            None => false,
        }
    }

    pub fn by_pgid(&self, pgid: libc::pid_t) -> Option<&Job> {
        self.slots.iter().find(|job| job.live() && job.pgid == pgid)
    }

    pub fn by_pgid_mut(&mut self, pgid: libc::pid_t) -> Option<&mut Job> {
        self.slots.iter_mut().find(|job| job.live() && job.pgid == pgid)
    }

    pub fn by_jid(&self, jid: u32) -> Option<&Job> {
        self.slots.iter().find(|job| job.live() && job.jid == jid)
    }

    pub fn by_jid_mut(&mut self, jid: u32) -> Option<&mut Job> {
        self.slots.iter_mut().find(|job| job.live() && job.jid == jid)
    }

    pub fn pgid_to_jid(&self, pgid: libc::pid_t) -> u32 {
        self.by_pgid(pgid).map(|job| job.jid).unwrap_or(0)
    }

    /// Live jobs in ascending jid order, for `jobs` and for tests.
    pub fn list(&self) -> Vec<&Job> {
        let mut jobs: Vec<&Job> = self.slots.iter().filter(|job| job.live()).collect();
        jobs.sort_by_key(|job| job.jid);
        jobs
    }

    /// True if any live job is in the FG state (the at-most-one-FG invariant
    /// is enforced by the callers that transition jobs, not here).
    pub fn has_foreground(&self) -> bool {
        self.slots
            .iter()
            .any(|job| job.state == JobState::RunningForeground)
    }
}

impl Job {
    fn empty_slot() -> Self {
        Job {
            pgid: 0,
            jid: 0,
            state: JobState::Undefined,
            cmdline: String::new(),
        }
    }

    fn live(&self) -> bool {
        self.state != JobState::Undefined
    }
}
