//! Export frame parsing.

/// Frame synchronization marker.
pub const FRAME_MARKER: [u8; 4] = [0x55; 4];

/// One `(address, payload)` memory write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportRecord<'a> {
    pub address: u16,
    pub payload: &'a [u8],
}

impl<'a> ExportRecord<'a> {
    /// The payload as little-endian 16-bit words with their addresses.
    ///
    /// A trailing odd byte is ignored.
    pub fn words(&self) -> impl Iterator<Item = (u16, u16)> + 'a {
        let base = self.address;
        self.payload
            .chunks_exact(2)
            .enumerate()
            .map(move |(i, pair)| {
                (
                    base.wrapping_add((i * 2) as u16),
                    u16::from_le_bytes([pair[0], pair[1]]),
                )
            })
    }
}

/// Iterator over the records of one received buffer.
///
/// Bytes before the first marker are discarded; a buffer without a marker
/// yields nothing. Markers between records are skipped. Iteration stops at a
/// record whose declared length runs past the end of the buffer and
/// [`FrameReader::truncated`] reports it.
#[derive(Debug)]
pub struct FrameReader<'a> {
    buf: &'a [u8],
    pos: usize,
    truncated: bool,
}

impl<'a> FrameReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        let pos = buf
            .windows(FRAME_MARKER.len())
            .position(|w| w == FRAME_MARKER)
            .map_or(buf.len(), |start| start + FRAME_MARKER.len());
        Self {
            buf,
            pos,
            truncated: false,
        }
    }

    /// True once a record ran past the end of the buffer.
    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

impl<'a> Iterator for FrameReader<'a> {
    type Item = ExportRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = &self.buf[self.pos..];
            if rest.starts_with(&FRAME_MARKER) {
                self.pos += FRAME_MARKER.len();
                continue;
            }
            if rest.len() < 4 {
                self.pos = self.buf.len();
                return None;
            }

            let address = u16::from_le_bytes([rest[0], rest[1]]);
            let len = usize::from(u16::from_le_bytes([rest[2], rest[3]]));
            if rest.len() - 4 < len {
                self.truncated = true;
                self.pos = self.buf.len();
                return None;
            }

            self.pos += 4 + len;
            return Some(ExportRecord {
                address,
                payload: &rest[4..4 + len],
            });
        }
    }
}
