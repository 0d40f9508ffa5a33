use std::{
    fmt,
    ops::{Index, IndexMut},
};

use crate::{Word, NUM_REGS};

/// Index of a general-purpose register
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegIdx(pub u8);

impl RegIdx {
    pub fn is_valid(&self) -> bool {
        (self.0 as usize) < NUM_REGS
    }
}

impl fmt::Display for RegIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// The register file. Every register starts at 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers([Word; NUM_REGS]);

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[Word] {
        &self.0
    }
}

impl Index<RegIdx> for Registers {
    type Output = Word;

    fn index(&self, reg: RegIdx) -> &Word {
        &self.0[reg.0 as usize]
    }
}

impl IndexMut<RegIdx> for Registers {
    fn index_mut(&mut self, reg: RegIdx) -> &mut Word {
        &mut self.0[reg.0 as usize]
    }
}
