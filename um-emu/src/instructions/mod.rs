use std::fmt;

use rand::Rng;
use strum::{EnumCount, IntoEnumIterator};

use crate::{register::RegIdx, Word};

pub use encoding::{Operands, IMMEDIATE_BITLEN};
pub use opcode::Opcode;

pub mod encoding;
pub mod opcode;

/// A decoded instruction. Field names say what each register is used for; the comments give the
/// operand slot (A, B or C) the register is encoded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instr {
    /// `if r[cond] != 0 { r[out] = r[src] }`
    ConditionalMove {
        out: RegIdx,  // A
        src: RegIdx,  // B
        cond: RegIdx, // C
    },
    SegLoad {
        out: RegIdx,    // A
        seg: RegIdx,    // B
        offset: RegIdx, // C
    },
    SegStore {
        seg: RegIdx,    // A
        offset: RegIdx, // B
        val: RegIdx,    // C
    },
    Add {
        out: RegIdx, // A
        in1: RegIdx, // B
        in2: RegIdx, // C
    },
    Multiply {
        out: RegIdx,
        in1: RegIdx,
        in2: RegIdx,
    },
    Divide {
        out: RegIdx,
        in1: RegIdx,
        in2: RegIdx,
    },
    Nand {
        out: RegIdx,
        in1: RegIdx,
        in2: RegIdx,
    },
    Halt,
    MapSegment {
        out: RegIdx, // B
        len: RegIdx, // C
    },
    UnmapSegment {
        seg: RegIdx, // C
    },
    Output {
        val: RegIdx, // C
    },
    Input {
        out: RegIdx, // C
    },
    /// Replaces the program with a copy of segment `r[seg]` (unless it is 0) and jumps to
    /// `r[target]`
    LoadProgram {
        seg: RegIdx,    // B
        target: RegIdx, // C
    },
    LoadImmediate {
        out: RegIdx, // A, at bits 25..28
        imm: Word,
    },
}

impl Instr {
    pub fn opcode(&self) -> Opcode {
        use Instr::*;
        match self {
            ConditionalMove { .. } => Opcode::ConditionalMove,
            SegLoad { .. } => Opcode::SegLoad,
            SegStore { .. } => Opcode::SegStore,
            Add { .. } => Opcode::Add,
            Multiply { .. } => Opcode::Multiply,
            Divide { .. } => Opcode::Divide,
            Nand { .. } => Opcode::Nand,
            Halt => Opcode::Halt,
            MapSegment { .. } => Opcode::MapSegment,
            UnmapSegment { .. } => Opcode::UnmapSegment,
            Output { .. } => Opcode::Output,
            Input { .. } => Opcode::Input,
            LoadProgram { .. } => Opcode::LoadProgram,
            LoadImmediate { .. } => Opcode::LoadImmediate,
        }
    }

    /// Returns a random, valid instruction. Useful for testing
    pub fn rand(mut rng: impl Rng) -> Self {
        // Structure of an instruction is
        //     opcode  unused  a  b  c      (every opcode but load immediate)
        //     opcode  a  immediate         (load immediate)
        // <-- MSB                   LSB -->
        let opcode = Opcode::iter()
            .nth(rng.gen_range(0..Opcode::COUNT))
            .unwrap_or(Opcode::Halt);
        let operands: Word = rng.gen_range(0..1 << encoding::OPCODE_LSB);

        Self::with_opcode(opcode, operands)
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instr::*;
        let op = self.opcode();
        match *self {
            ConditionalMove { out, src, cond } => write!(f, "{op} {out}, {src}, {cond}"),
            SegLoad { out, seg, offset } => write!(f, "{op} {out}, {seg}, {offset}"),
            SegStore { seg, offset, val } => write!(f, "{op} {seg}, {offset}, {val}"),
            Add { out, in1, in2 }
            | Multiply { out, in1, in2 }
            | Divide { out, in1, in2 }
            | Nand { out, in1, in2 } => write!(f, "{op} {out}, {in1}, {in2}"),
            Halt => write!(f, "{op}"),
            MapSegment { out, len } => write!(f, "{op} {out}, {len}"),
            UnmapSegment { seg } => write!(f, "{op} {seg}"),
            Output { val } => write!(f, "{op} {val}"),
            Input { out } => write!(f, "{op} {out}"),
            LoadProgram { seg, target } => write!(f, "{op} {seg}, {target}"),
            LoadImmediate { out, imm } => write!(f, "{op} {out}, {imm}"),
        }
    }
}
