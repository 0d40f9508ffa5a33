use strum::{Display, EnumCount, EnumIter};

use super::Instr;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Display, EnumCount, EnumIter)]
#[rustfmt::skip]
#[repr(u8)]
pub enum Opcode {
    #[strum(serialize = "cmov")]
    ConditionalMove = 0,
    #[strum(serialize = "sload")]
    SegLoad         = 1,
    #[strum(serialize = "sstore")]
    SegStore        = 2,
    #[strum(serialize = "add")]
    Add             = 3,
    #[strum(serialize = "mul")]
    Multiply        = 4,
    #[strum(serialize = "div")]
    Divide          = 5,
    #[strum(serialize = "nand")]
    Nand            = 6,
    #[strum(serialize = "halt")]
    Halt            = 7,
    #[strum(serialize = "map")]
    MapSegment      = 8,
    #[strum(serialize = "unmap")]
    UnmapSegment    = 9,
    #[strum(serialize = "out")]
    Output          = 10,
    #[strum(serialize = "in")]
    Input           = 11,
    #[strum(serialize = "loadp")]
    LoadProgram     = 12,
    #[strum(serialize = "loadi")]
    LoadImmediate   = 13,
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    /// Fails with the input for the unassigned opcodes 14 and 15 and anything wider than 4 bits
    fn try_from(input: u8) -> Result<Opcode, u8> {
        use Opcode::*;
        match input {
            0 => Ok(ConditionalMove),
            1 => Ok(SegLoad),
            2 => Ok(SegStore),
            3 => Ok(Add),
            4 => Ok(Multiply),
            5 => Ok(Divide),
            6 => Ok(Nand),
            7 => Ok(Halt),
            8 => Ok(MapSegment),
            9 => Ok(UnmapSegment),
            10 => Ok(Output),
            11 => Ok(Input),
            12 => Ok(LoadProgram),
            13 => Ok(LoadImmediate),
            other => Err(other),
        }
    }
}

impl From<Instr> for Opcode {
    fn from(instr: Instr) -> Opcode {
        instr.opcode()
    }
}
