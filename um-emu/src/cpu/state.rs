use crate::{register::Registers, Word};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CpuState {
    /// Index of the next instruction in segment 0.
    pub(super) program_counter: Word,
    /// Register file.
    pub(super) registers: Registers,
}

impl CpuState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn program_counter(&self) -> Word {
        self.program_counter
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }
}
