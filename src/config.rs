/// Fixed capacities the shell enforces. There is no config file or
/// environment variable backing this — these are compile-time limits, so
/// they get one typed home instead of scattered literals.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Job table capacity.
    pub max_jobs: usize,
    /// Maximum pipeline stages separated by `|`.
    pub max_pipeline_stages: usize,
    /// Maximum words per pipeline stage.
    pub max_words_per_stage: usize,
    /// Maximum bytes read per input line.
    pub max_line_bytes: usize,
    /// Prompt string written before each read.
    pub prompt: &'static str,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_jobs: 16,
            max_pipeline_stages: 16,
            max_words_per_stage: 64,
            max_line_bytes: 1024,
            prompt: "tsh> ",
        }
    }
}
