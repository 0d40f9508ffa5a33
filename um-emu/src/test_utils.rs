use crate::{
    config::MachineConfig,
    cpu::{Cpu, ExitStatus, Status},
    instructions::Instr,
    register::RegIdx,
    Word,
};

pub(crate) fn r(idx: u8) -> RegIdx {
    RegIdx(idx)
}

pub(crate) fn loadi(out: u8, imm: Word) -> Instr {
    Instr::LoadImmediate { out: r(out), imm }
}

/// Encodes a program as a big-endian image, the way it would be read from disk
pub(crate) fn program_bytes(program: &[Instr]) -> Vec<u8> {
    program
        .iter()
        .flat_map(|instr| instr.to_word().unwrap().to_be_bytes())
        .collect()
}

/// Runs the program to completion. Returns how it ended and everything it wrote.
pub(crate) fn run_program(program: &[Instr], input: &[u8]) -> (ExitStatus, Vec<u8>) {
    run_with_config(program, input, MachineConfig::default())
}

pub(crate) fn run_with_config(
    program: &[Instr],
    input: &[u8],
    config: MachineConfig,
) -> (ExitStatus, Vec<u8>) {
    let mut output = Vec::new();
    let exit = crate::run(&program_bytes(program)[..], input, &mut output, config);
    (exit, output)
}

/// Steps the program until it stops, keeping the machine around so its registers can be checked.
/// Panics if the program faults.
pub(crate) fn step_to_end<'a>(program: &[Instr], input: &'a [u8]) -> Cpu<&'a [u8], Vec<u8>> {
    let mut cpu = Cpu::load(
        &program_bytes(program)[..],
        input,
        Vec::new(),
        MachineConfig::default(),
    )
    .unwrap();
    while cpu.step().unwrap() == Status::Running {}
    cpu
}
