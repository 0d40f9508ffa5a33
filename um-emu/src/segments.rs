use std::fmt;

use tracing::trace;

use crate::{
    error::{Fault, Result},
    Word,
};

/// Identifies a mapped segment. Handles are indices into the segment table, not addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(pub Word);

impl Handle {
    /// The segment holding the running program
    pub const PROGRAM: Handle = Handle(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The machine's memory: a table of fixed-length word arrays.
///
/// Unmapped handles are kept on a stack and handed out again, most recently unmapped first,
/// before the table grows. Segment 0 is the program; it can be overwritten with a copy of
/// another segment but never unmapped.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Segments {
    /// `None` marks a handle that has been unmapped
    table: Vec<Option<Box<[Word]>>>,
    /// Unmapped handles, most recent last
    reusable: Vec<Handle>,
}

impl Segments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a new zero-filled segment of `length` words and returns its handle.
    pub fn allocate(&mut self, length: usize) -> Result<Handle> {
        let segment = zeroed_segment(length)?;

        let handle = match self.reusable.pop() {
            Some(handle) => {
                self.table[handle.index()] = Some(segment);
                handle
            },
            None => {
                let handle = Word::try_from(self.table.len())
                    .map(Handle)
                    .map_err(|_| Fault::SegmentsExhausted)?;
                self.table.push(Some(segment));
                handle
            },
        };

        trace!(%handle, length, "mapped segment");
        Ok(handle)
    }

    /// Unmaps `handle`, making it available to a later [`Segments::allocate`].
    pub fn free(&mut self, handle: Handle) -> Result<()> {
        if handle == Handle::PROGRAM {
            return Err(Fault::UnmapSegmentZero);
        }

        match self.table.get_mut(handle.index()) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                self.reusable.push(handle);
                trace!(%handle, "unmapped segment");
                Ok(())
            },
            _ => Err(Fault::UnmappedSegment(handle)),
        }
    }

    pub fn load(&self, handle: Handle, offset: Word) -> Result<Word> {
        let segment = self.segment(handle)?;
        segment
            .get(offset as usize)
            .copied()
            .ok_or(Fault::OffsetOutOfBounds {
                handle,
                offset,
                length: segment.len(),
            })
    }

    pub fn store(&mut self, handle: Handle, offset: Word, value: Word) -> Result<()> {
        let segment = self.segment_mut(handle)?;
        let length = segment.len();
        let cell = segment
            .get_mut(offset as usize)
            .ok_or(Fault::OffsetOutOfBounds {
                handle,
                offset,
                length,
            })?;
        *cell = value;
        Ok(())
    }

    /// Number of words in the segment.
    pub fn length(&self, handle: Handle) -> Result<usize> {
        self.segment(handle).map(|segment| segment.len())
    }

    /// Replaces the program with a copy of the segment at `handle`. The source segment stays
    /// mapped and unchanged.
    pub fn install_as_segment_zero(&mut self, handle: Handle) -> Result<()> {
        if handle == Handle::PROGRAM {
            // Copying the program onto itself changes nothing, but the program must exist
            return self.segment(handle).map(|_| ());
        }

        let program = self.segment(handle)?.to_vec().into_boxed_slice();
        let length = program.len();
        match self.table.first_mut() {
            Some(slot) => *slot = Some(program),
            None => return Err(Fault::UnmappedSegment(Handle::PROGRAM)),
        }

        trace!(%handle, length, "installed program");
        Ok(())
    }

    /// The words of segment 0.
    pub fn program(&self) -> Result<&[Word]> {
        self.segment(Handle::PROGRAM)
    }

    /// Unmaps every segment, including the program.
    pub fn release_all(&mut self) {
        self.table = Vec::new();
        self.reusable = Vec::new();
    }

    /// Number of currently mapped segments.
    pub fn live_count(&self) -> usize {
        self.table.iter().filter(|slot| slot.is_some()).count()
    }

    fn segment(&self, handle: Handle) -> Result<&[Word]> {
        match self.table.get(handle.index()) {
            Some(Some(segment)) => Ok(&segment[..]),
            _ => Err(Fault::UnmappedSegment(handle)),
        }
    }

    fn segment_mut(&mut self, handle: Handle) -> Result<&mut [Word]> {
        match self.table.get_mut(handle.index()) {
            Some(Some(segment)) => Ok(&mut segment[..]),
            _ => Err(Fault::UnmappedSegment(handle)),
        }
    }
}

fn zeroed_segment(length: usize) -> Result<Box<[Word]>> {
    let mut words = Vec::new();
    words
        .try_reserve_exact(length)
        .map_err(|_| Fault::AllocationFailed { length })?;
    words.resize(length, 0);
    Ok(words.into_boxed_slice())
}
