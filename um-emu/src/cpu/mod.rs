use std::io::{Read, Write};

use tracing::{debug, error, trace};

use crate::{
    channels::Channels,
    config::{MachineConfig, OutputPolicy},
    error::{Fault, Result},
    instructions::Instr,
    loader,
    profile::Profile,
    segments::{Handle, Segments},
    Word,
};
pub use state::CpuState;

pub mod state;

/// Where execution continues once an instruction has run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Next {
    /// The instruction after this one
    Advance,
    /// The given index of segment 0
    Jump(Word),
    Halt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Running,
    Halted,
    Failed,
}

/// How a run ended
#[derive(Debug)]
pub enum ExitStatus {
    Halted,
    Failed(Fault),
}

impl ExitStatus {
    /// The process exit code for this outcome: 0 for a clean halt, 1 for a fault
    pub fn code(&self) -> u8 {
        match self {
            ExitStatus::Halted => 0,
            ExitStatus::Failed(_) => 1,
        }
    }

    pub fn is_halted(&self) -> bool {
        matches!(self, ExitStatus::Halted)
    }
}

pub struct Cpu<R, W> {
    /// The program counter and registers
    state: CpuState,
    /// The segment store. Segment 0 is the running program
    mem: Segments,
    /// Byte input and output
    channels: Channels<R, W>,
    config: MachineConfig,
    profile: Profile,
    status: Status,
}

impl<R: Read, W: Write> Cpu<R, W> {
    /// Creates a machine that will run segment 0 of `mem` from its first word.
    pub fn new(mem: Segments, input: R, output: W, config: MachineConfig) -> Self {
        Self {
            state: CpuState::new(),
            mem,
            channels: Channels::new(input, output),
            config,
            profile: Profile::new(),
            status: Status::Running,
        }
    }

    /// Loads a program image and creates a machine to run it.
    pub fn load(program: impl Read, input: R, output: W, config: MachineConfig) -> Result<Self> {
        let mem = loader::load_program(program)?;
        Ok(Self::new(mem, input, output, config))
    }

    pub fn state(&self) -> &CpuState {
        &self.state
    }

    pub fn segments(&self) -> &Segments {
        &self.mem
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Executes one instruction. Returns the fault if this instruction failed. Once the machine
    /// has halted or failed, every segment has been released and further calls return the
    /// terminal status without doing anything.
    pub fn step(&mut self) -> Result<Status> {
        if self.status != Status::Running {
            return Ok(self.status);
        }

        match self.execute_instruction_and_update_pc() {
            Ok(Status::Running) => Ok(Status::Running),
            Ok(_) => {
                self.status = Status::Halted;
                self.mem.release_all();
                Ok(Status::Halted)
            },
            Err(fault) => {
                self.status = Status::Failed;
                self.mem.release_all();
                Err(fault)
            },
        }
    }

    /// Runs the program until it halts or faults. Returns how the run ended and how many of each
    /// instruction were executed.
    pub fn run(mut self) -> (ExitStatus, Profile) {
        let result = loop {
            match self.step() {
                Ok(Status::Running) => continue,
                Ok(_) => break Ok(()),
                Err(fault) => break Err(fault),
            }
        };

        // Output written before a fault is still delivered
        let flushed = self.channels.flush();
        let exit = match (result, flushed) {
            (Err(fault), _) => ExitStatus::Failed(fault),
            (Ok(()), Err(e)) => ExitStatus::Failed(e.into()),
            (Ok(()), Ok(())) => ExitStatus::Halted,
        };

        match &exit {
            ExitStatus::Halted => debug!(steps = self.profile.steps(), "machine halted"),
            ExitStatus::Failed(fault) => error!(
                pc = self.state.program_counter,
                steps = self.profile.steps(),
                "machine fault: {fault}"
            ),
        }
        if self.config.profile {
            self.profile.report();
        }

        (exit, self.profile)
    }

    fn fetch(&self, pc: Word) -> Result<Instr> {
        let program = self.mem.program()?;
        let word = program
            .get(pc as usize)
            .copied()
            .ok_or(Fault::PcOutOfBounds {
                pc,
                length: program.len(),
            })?;
        Instr::from_word(word)
    }

    /// Fetches, decodes and executes the instruction at the program counter, then moves the
    /// program counter.
    fn execute_instruction_and_update_pc(&mut self) -> Result<Status> {
        if let Some(limit) = self.config.step_limit {
            if self.profile.steps() >= limit {
                return Err(Fault::StepLimitExceeded(limit));
            }
        }

        let pc = self.state.program_counter;
        let instr = self.fetch(pc)?;
        trace!(pc, %instr, "execute");
        self.profile.record(instr.opcode());

        match self.execute(instr)? {
            Next::Advance => self.state.program_counter = pc.wrapping_add(1),
            Next::Jump(target) => self.state.program_counter = target,
            Next::Halt => return Ok(Status::Halted),
        }

        Ok(Status::Running)
    }

    /// Executes the given instruction without touching the program counter.
    fn execute(&mut self, instruction: Instr) -> Result<Next> {
        let regs = &mut self.state.registers;

        match instruction {
            Instr::ConditionalMove { out, src, cond } => {
                if regs[cond] != 0 {
                    regs[out] = regs[src];
                }
            },

            // Segment instructions
            Instr::SegLoad { out, seg, offset } => {
                regs[out] = self.mem.load(Handle(regs[seg]), regs[offset])?;
            },

            Instr::SegStore { seg, offset, val } => {
                self.mem.store(Handle(regs[seg]), regs[offset], regs[val])?;
            },

            Instr::MapSegment { out, len } => {
                let handle = self.mem.allocate(regs[len] as usize)?;
                regs[out] = handle.0;
            },

            Instr::UnmapSegment { seg } => {
                self.mem.free(Handle(regs[seg]))?;
            },

            // Arithmetic instructions
            Instr::Add { out, in1, in2 } => {
                regs[out] = regs[in1].wrapping_add(regs[in2]);
            },

            Instr::Multiply { out, in1, in2 } => {
                regs[out] = regs[in1].wrapping_mul(regs[in2]);
            },

            Instr::Divide { out, in1, in2 } => {
                regs[out] = regs[in1]
                    .checked_div(regs[in2])
                    .ok_or(Fault::DivideByZero)?;
            },

            Instr::Nand { out, in1, in2 } => {
                regs[out] = !(regs[in1] & regs[in2]);
            },

            // I/O instructions
            Instr::Output { val } => {
                let val = regs[val];
                let byte = match (u8::try_from(val), self.config.output_policy) {
                    (Ok(byte), _) => byte,
                    (Err(_), OutputPolicy::Truncate) => (val & 0xFF) as u8,
                    (Err(_), OutputPolicy::Reject) => return Err(Fault::OutputOutOfRange(val)),
                };
                self.channels.write_byte(byte)?;
            },

            Instr::Input { out } => {
                regs[out] = self.channels.read_byte()?;
            },

            // Control instructions
            Instr::Halt => return Ok(Next::Halt),

            Instr::LoadProgram { seg, target } => {
                // Segment 0 is only replaced when jumping to a different segment. Either way
                // execution continues exactly at the target, with no increment.
                if regs[seg] != 0 {
                    self.mem.install_as_segment_zero(Handle(regs[seg]))?;
                }
                return Ok(Next::Jump(regs[target]));
            },

            Instr::LoadImmediate { out, imm } => {
                regs[out] = imm;
            },
        }

        Ok(Next::Advance)
    }
}
