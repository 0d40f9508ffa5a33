//! An emulator for the Universal Machine: eight 32-bit registers, a heap of word segments and
//! fourteen instructions.

use std::io::{Read, Write};

use tracing::error;

pub mod bitpack;
pub mod channels;
pub mod config;
pub mod cpu;
pub mod error;
pub mod instructions;
pub mod loader;
pub mod profile;
pub mod register;
pub mod segments;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{MachineConfig, OutputPolicy};
pub use cpu::{Cpu, ExitStatus, Status};
pub use error::{BitpackError, Fault};

/// The machine word. Registers, segment contents, handles and instructions are all words.
pub type Word = u32;

/// Number of general-purpose registers
pub const NUM_REGS: usize = 8;

/// Loads the program image and runs it to completion.
pub fn run(
    program: impl Read,
    input: impl Read,
    output: impl Write,
    config: MachineConfig,
) -> ExitStatus {
    match Cpu::load(program, input, output, config) {
        Ok(cpu) => cpu.run().0,
        Err(fault) => {
            error!("could not load program: {fault}");
            ExitStatus::Failed(fault)
        },
    }
}
