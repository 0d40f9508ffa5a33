use strum::{EnumCount, IntoEnumIterator};
use tracing::info;

use crate::instructions::Opcode;

/// How many times each opcode was executed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Profile {
    counts: [u64; Opcode::COUNT],
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, opcode: Opcode) {
        self.counts[opcode as usize] += 1;
    }

    pub fn count(&self, opcode: Opcode) -> u64 {
        self.counts[opcode as usize]
    }

    /// Total number of instructions executed
    pub fn steps(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Opcodes that ran at least once, most frequent first
    pub fn hottest(&self) -> Vec<(Opcode, u64)> {
        let mut counts: Vec<(Opcode, u64)> = Opcode::iter()
            .map(|op| (op, self.count(op)))
            .filter(|&(_, count)| count > 0)
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    pub fn report(&self) {
        let steps = self.steps();
        info!(steps, "execution profile");
        for (opcode, count) in self.hottest() {
            let share = 100.0 * count as f64 / steps as f64;
            info!("{opcode:>6}: {count:>12} ({share:5.1}%)");
        }
    }
}
