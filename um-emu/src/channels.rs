use std::io::{self, Read, Write};

use crate::Word;

/// Value an input instruction produces once the input is exhausted
pub const END_OF_INPUT: Word = Word::MAX;

/// The machine's byte-oriented input and output.
pub struct Channels<R, W> {
    input: R,
    output: W,
}

impl<R: Read, W: Write> Channels<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Reads one byte, or returns [`END_OF_INPUT`] if the input is exhausted. Blocks until a
    /// byte is available.
    pub fn read_byte(&mut self) -> io::Result<Word> {
        // Anything the program wrote so far may be a prompt for this input
        self.output.flush()?;

        let mut buf = [0u8; 1];
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => return Ok(END_OF_INPUT),
                Ok(_) => return Ok(Word::from(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    pub fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.output.write_all(&[byte])
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }

    /// Returns the input and output, in that order
    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_until_end_of_input() {
        let mut channels = Channels::new(&b"hi"[..], Vec::new());
        assert_eq!(channels.read_byte().unwrap(), b'h' as Word);
        assert_eq!(channels.read_byte().unwrap(), b'i' as Word);
        assert_eq!(channels.read_byte().unwrap(), END_OF_INPUT);
        assert_eq!(channels.read_byte().unwrap(), 0xFFFF_FFFF);
    }

    #[test]
    fn writes_bytes_in_order() {
        let mut channels = Channels::new(io::empty(), Vec::new());
        for byte in [0u8, 72, 255] {
            channels.write_byte(byte).unwrap();
        }
        let (_, output) = channels.into_inner();
        assert_eq!(output, vec![0, 72, 255]);
    }
}
