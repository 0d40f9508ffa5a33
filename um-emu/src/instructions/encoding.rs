use crate::{
    bitpack,
    error::{BitpackError, Fault, Result},
    instructions::{Instr, Opcode},
    register::RegIdx,
    Word,
};

pub(crate) const OPCODE_BITLEN: u32 = 4;
pub(crate) const OPCODE_LSB: u32 = 28;

const REG_BITLEN: u32 = 3;
const REG_A_LSB: u32 = 6;
const REG_B_LSB: u32 = 3;
const REG_C_LSB: u32 = 0;

/// Load immediate keeps its register just below the opcode
const IMM_REG_LSB: u32 = 25;
pub const IMMEDIATE_BITLEN: u32 = 25;

/// The operand fields of an instruction word, before they are given meaning by the opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
    Registers { a: RegIdx, b: RegIdx, c: RegIdx },
    Immediate { a: RegIdx, imm: Word },
}

pub(crate) fn instr_opcode(word: Word) -> u8 {
    bitpack::get_unsigned(word.into(), OPCODE_BITLEN, OPCODE_LSB) as u8
}

fn reg_field(word: Word, lsb: u32) -> RegIdx {
    RegIdx(bitpack::get_unsigned(word.into(), REG_BITLEN, lsb) as u8)
}

fn immediate_field(word: Word) -> Word {
    bitpack::get_unsigned(word.into(), IMMEDIATE_BITLEN, 0) as Word
}

impl Instr {
    //  An instruction word is laid out as follows, MSB first.
    //  | opcode (4) | unused (19) | a (3) | b (3) | c (3) |
    //  | opcode (4) | a (3) | immediate (25) |                  for load immediate
    //
    //  Operands an instruction doesn't use are ignored when decoding and encoded as 0.

    /// Splits an instruction word into its opcode number and operand fields. The opcode is not
    /// validated.
    pub fn decode(word: Word) -> (u8, Operands) {
        let opcode = instr_opcode(word);

        let operands = if opcode == Opcode::LoadImmediate as u8 {
            Operands::Immediate {
                a: reg_field(word, IMM_REG_LSB),
                imm: immediate_field(word),
            }
        } else {
            Operands::Registers {
                a: reg_field(word, REG_A_LSB),
                b: reg_field(word, REG_B_LSB),
                c: reg_field(word, REG_C_LSB),
            }
        };

        (opcode, operands)
    }

    /// Decodes an instruction word. Fails if the opcode is unassigned.
    pub fn from_word(word: Word) -> Result<Self> {
        let opcode = Opcode::try_from(instr_opcode(word))
            .map_err(|opcode| Fault::InvalidOpcode { opcode, word })?;
        Ok(Self::with_opcode(opcode, word))
    }

    /// Reads the operand fields `opcode` uses out of `word`. The opcode bits of `word` are
    /// ignored.
    pub(crate) fn with_opcode(opcode: Opcode, word: Word) -> Self {
        use Opcode::*;

        let a = || reg_field(word, REG_A_LSB);
        let b = || reg_field(word, REG_B_LSB);
        let c = || reg_field(word, REG_C_LSB);

        match opcode {
            ConditionalMove => Instr::ConditionalMove {
                out: a(),
                src: b(),
                cond: c(),
            },
            SegLoad => Instr::SegLoad {
                out: a(),
                seg: b(),
                offset: c(),
            },
            SegStore => Instr::SegStore {
                seg: a(),
                offset: b(),
                val: c(),
            },
            Add => Instr::Add {
                out: a(),
                in1: b(),
                in2: c(),
            },
            Multiply => Instr::Multiply {
                out: a(),
                in1: b(),
                in2: c(),
            },
            Divide => Instr::Divide {
                out: a(),
                in1: b(),
                in2: c(),
            },
            Nand => Instr::Nand {
                out: a(),
                in1: b(),
                in2: c(),
            },
            Halt => Instr::Halt,
            MapSegment => Instr::MapSegment {
                out: b(),
                len: c(),
            },
            UnmapSegment => Instr::UnmapSegment { seg: c() },
            Output => Instr::Output { val: c() },
            Input => Instr::Input { out: c() },
            LoadProgram => Instr::LoadProgram {
                seg: b(),
                target: c(),
            },
            LoadImmediate => Instr::LoadImmediate {
                out: reg_field(word, IMM_REG_LSB),
                imm: immediate_field(word),
            },
        }
    }

    /// Encodes this instruction as a word. Fails if a register index doesn't fit in 3 bits or an
    /// immediate doesn't fit in 25.
    #[rustfmt::skip]
    pub fn to_word(&self) -> std::result::Result<Word, BitpackError> {
        let op = self.opcode() as u8;
        let r0 = RegIdx(0);

        match *self {
            Instr::ConditionalMove { out, src, cond } => Self::encode(op, out, src, cond),
            Instr::SegLoad { out, seg, offset }       => Self::encode(op, out, seg, offset),
            Instr::SegStore { seg, offset, val }      => Self::encode(op, seg, offset, val),
            Instr::Add { out, in1, in2 }              => Self::encode(op, out, in1, in2),
            Instr::Multiply { out, in1, in2 }         => Self::encode(op, out, in1, in2),
            Instr::Divide { out, in1, in2 }           => Self::encode(op, out, in1, in2),
            Instr::Nand { out, in1, in2 }             => Self::encode(op, out, in1, in2),
            Instr::Halt                               => Self::encode(op, r0, r0, r0),
            Instr::MapSegment { out, len }            => Self::encode(op, r0, out, len),
            Instr::UnmapSegment { seg }               => Self::encode(op, r0, r0, seg),
            Instr::Output { val }                     => Self::encode(op, r0, r0, val),
            Instr::Input { out }                      => Self::encode(op, r0, r0, out),
            Instr::LoadProgram { seg, target }        => Self::encode(op, r0, seg, target),
            Instr::LoadImmediate { out, imm }         => Self::encode_immediate(op, out, imm),
        }
    }

    fn encode(
        opcode: u8,
        a: RegIdx,
        b: RegIdx,
        c: RegIdx,
    ) -> std::result::Result<Word, BitpackError> {
        let mut instr = 0u64;
        instr = bitpack::set_unsigned(instr, OPCODE_BITLEN, OPCODE_LSB, opcode.into())?;
        instr = bitpack::set_unsigned(instr, REG_BITLEN, REG_A_LSB, a.0.into())?;
        instr = bitpack::set_unsigned(instr, REG_BITLEN, REG_B_LSB, b.0.into())?;
        instr = bitpack::set_unsigned(instr, REG_BITLEN, REG_C_LSB, c.0.into())?;

        // Every field lies below bit 32
        Ok(instr as Word)
    }

    fn encode_immediate(
        opcode: u8,
        a: RegIdx,
        imm: Word,
    ) -> std::result::Result<Word, BitpackError> {
        let mut instr = 0u64;
        instr = bitpack::set_unsigned(instr, OPCODE_BITLEN, OPCODE_LSB, opcode.into())?;
        instr = bitpack::set_unsigned(instr, REG_BITLEN, IMM_REG_LSB, a.0.into())?;
        instr = bitpack::set_unsigned(instr, IMMEDIATE_BITLEN, 0, imm.into())?;

        Ok(instr as Word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_load_immediate() {
        let word = (13 << 28) | (5 << 25) | 100;
        assert_eq!(
            Instr::decode(word),
            (
                13,
                Operands::Immediate {
                    a: RegIdx(5),
                    imm: 100
                }
            )
        );
        assert_eq!(
            Instr::from_word(word).unwrap(),
            Instr::LoadImmediate {
                out: RegIdx(5),
                imm: 100
            }
        );
    }

    #[test]
    fn decode_register_fields() {
        let word = (3 << 28) | (1 << 6) | (2 << 3) | 3;
        let expected_operands = Operands::Registers {
            a: RegIdx(1),
            b: RegIdx(2),
            c: RegIdx(3),
        };
        assert_eq!(Instr::decode(word), (3, expected_operands));

        // The unused bits between the opcode and the registers don't matter
        let noisy = word | 0x0ABC_DE00;
        assert_eq!(Instr::decode(noisy), (3, expected_operands));
        assert_eq!(
            Instr::from_word(noisy).unwrap(),
            Instr::Add {
                out: RegIdx(1),
                in1: RegIdx(2),
                in2: RegIdx(3)
            }
        );
    }

    #[test]
    fn largest_immediate() {
        let word = 0xDFFF_FFFF;
        assert_eq!(
            Instr::from_word(word).unwrap(),
            Instr::LoadImmediate {
                out: RegIdx(7),
                imm: (1 << 25) - 1
            }
        );
    }

    #[test]
    fn unassigned_opcodes() {
        for word in [0xE000_0000, 0xF123_4567] {
            assert!(matches!(
                Instr::from_word(word),
                Err(Fault::InvalidOpcode { opcode, word: w }) if opcode == (word >> 28) as u8 && w == word
            ));
        }
        // Decoding fields alone doesn't validate the opcode
        assert_eq!(Instr::decode(0xE000_0000).0, 14);
    }

    #[test]
    fn known_encodings() {
        assert_eq!(Instr::Halt.to_word(), Ok(0x7000_0000));
        assert_eq!(Instr::Output { val: RegIdx(0) }.to_word(), Ok(0xA000_0000));
        assert_eq!(
            Instr::LoadImmediate {
                out: RegIdx(0),
                imm: 72
            }
            .to_word(),
            Ok(0xD000_0048)
        );
        assert_eq!(
            Instr::MapSegment {
                out: RegIdx(1),
                len: RegIdx(2)
            }
            .to_word(),
            Ok(0x8000_000A)
        );
    }

    #[test]
    fn encoding_rejects_wide_fields() {
        assert_eq!(
            Instr::LoadImmediate {
                out: RegIdx(0),
                imm: 1 << 25
            }
            .to_word(),
            Err(BitpackError::Overflow {
                value: 1 << 25,
                width: 25
            })
        );
        assert_eq!(
            Instr::Input { out: RegIdx(8) }.to_word(),
            Err(BitpackError::Overflow { value: 8, width: 3 })
        );
    }

    // Tests that Instr::from_word(instr.to_word()) is the identity on `instr`
    #[test]
    fn encoding_round_trip() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let instr = Instr::rand(&mut rng);
            let word = instr.to_word().unwrap();
            assert_eq!(Instr::from_word(word).unwrap(), instr);
        }
    }
}
