use std::io::Read;

use tracing::debug;

use crate::{
    bitpack,
    error::{BitpackError, Fault, Result},
    segments::{Handle, Segments},
    Word,
};

const WORD_BYTELEN: usize = 4;

/// Packs 4 bytes into a word, most significant byte first.
fn pack_word(bytes: &[u8]) -> std::result::Result<Word, BitpackError> {
    let mut word = 0u64;
    for (i, &byte) in bytes.iter().enumerate() {
        let lsb = 8 * (WORD_BYTELEN - 1 - i) as u32;
        word = bitpack::set_unsigned(word, 8, lsb, byte.into())?;
    }

    Ok(word as Word)
}

/// Reads a program image and returns a fresh segment store whose segment 0 holds it.
///
/// The image is a sequence of big-endian 32-bit words with no header. A trailing group of
/// fewer than 4 bytes is dropped.
pub fn load_program(mut reader: impl Read) -> Result<Segments> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let chunks = bytes.chunks_exact(WORD_BYTELEN);
    if !chunks.remainder().is_empty() {
        debug!(
            dropped = chunks.remainder().len(),
            "program image is not a whole number of words"
        );
    }
    let program = chunks.map(pack_word).collect::<std::result::Result<Vec<_>, _>>()?;

    let length = program.len();
    if Word::try_from(length).is_err() {
        return Err(Fault::ProgramTooLarge(length));
    }

    // The first allocation in an empty store is always segment 0
    let mut mem = Segments::new();
    let handle = mem.allocate(length)?;
    debug_assert_eq!(handle, Handle::PROGRAM);
    for (offset, word) in (0..).zip(program) {
        mem.store(handle, offset, word)?;
    }

    debug!(words = length, "loaded program");
    Ok(mem)
}
