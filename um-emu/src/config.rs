/// What the output instruction does with a value that is not a byte
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputPolicy {
    /// Fail the run
    #[default]
    Reject,
    /// Write the low 8 bits
    Truncate,
}

/// Runtime options for a [`crate::cpu::Cpu`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MachineConfig {
    pub output_policy: OutputPolicy,
    /// Fail the run once this many instructions have executed
    pub step_limit: Option<u64>,
    /// Log per-opcode instruction counts when the run ends
    pub profile: bool,
}

impl MachineConfig {
    pub fn with_output_policy(mut self, output_policy: OutputPolicy) -> Self {
        self.output_policy = output_policy;
        self
    }

    pub fn with_step_limit(mut self, step_limit: u64) -> Self {
        self.step_limit = Some(step_limit);
        self
    }

    pub fn with_profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }
}
