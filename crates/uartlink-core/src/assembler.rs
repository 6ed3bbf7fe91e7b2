//! Receive-side line framing.
//!
//! A line ends at the first CR or LF. Terminators arriving on an empty buffer
//! are ignored. Once the buffer holds `capacity - 1` bytes further payload is
//! discarded and counted until the next terminator.

pub const CR: u8 = b'\r';
pub const LF: u8 = b'\n';

pub fn is_terminator(byte: u8) -> bool {
    byte == CR || byte == LF
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizedLine {
    bytes: Vec<u8>,
    dropped: usize,
    seq: u64,
}

impl FinalizedLine {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Bytes discarded while this line was assembled.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Number of lines finalized up to and including this one; 0 means none yet.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    Stored,
    Finalized,
    /// Terminator with nothing staged.
    Ignored,
    /// Buffer full, byte lost.
    Discarded,
}

pub struct LineAssembler {
    buf: Box<[u8]>,
    pos: usize,
    dropped: usize,
    last: FinalizedLine,
}

impl LineAssembler {
    /// `capacity` below 2 is raised to 2 so at least one byte can be staged.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity.max(2)].into_boxed_slice(),
            pos: 0,
            dropped: 0,
            last: FinalizedLine::default(),
        }
    }

    pub fn feed(&mut self, byte: u8) -> Feed {
        if is_terminator(byte) {
            if self.pos == 0 {
                return Feed::Ignored;
            }
            self.finalize();
            return Feed::Finalized;
        }

        if self.pos < self.buf.len() - 1 {
            self.buf[self.pos] = byte;
            self.pos += 1;
            Feed::Stored
        } else {
            self.dropped += 1;
            Feed::Discarded
        }
    }

    fn finalize(&mut self) {
        self.last = FinalizedLine {
            bytes: self.buf[..self.pos].to_vec(),
            dropped: self.dropped,
            seq: self.last.seq + 1,
        };
        self.pos = 0;
        self.dropped = 0;
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn pending(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    /// Bytes discarded so far for the line in progress.
    pub fn pending_dropped(&self) -> usize {
        self.dropped
    }

    pub fn last(&self) -> &FinalizedLine {
        &self.last
    }
}
