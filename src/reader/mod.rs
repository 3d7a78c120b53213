#![doc = r#"
A cursor over borrowed bytes.

Every decoder in this crate (SMF header and tracks, the native event list and
the native document) pulls its input through a [`Reader`]. Running out of
input is always reported as [`ReaderErrorKind::OutOfBounds`], which callers
interpret as truncated data.
"#]

mod error;
pub use error::*;

use crate::{ChunkError, chunk::ChunkAlign};

/// A cursor over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct Reader<'slc> {
    data: &'slc [u8],
    position: usize,
}

impl<'slc> Reader<'slc> {
    /// Create a reader positioned at the start of `data`
    pub const fn from_byte_slice(data: &'slc [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// The offset of the next byte to be read
    pub const fn buffer_position(&self) -> usize {
        self.position
    }

    /// Bytes left to read
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// True once every byte has been consumed
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Look at the next byte without consuming it
    pub fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.position).copied()
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> ReadResult<u8> {
        let byte = self
            .data
            .get(self.position)
            .copied()
            .ok_or(ReaderError::oob(self.position))?;
        self.position += 1;
        Ok(byte)
    }

    /// Read exactly `N` bytes into an array
    pub fn read_exact_size<const N: usize>(&mut self) -> ReadResult<[u8; N]> {
        let slice = self.read_slice(N)?;
        let mut out = [0; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    /// Borrow the next `len` bytes
    pub fn read_slice(&mut self, len: usize) -> ReadResult<&'slc [u8]> {
        if len > self.remaining() {
            return Err(ReaderError::oob(self.position));
        }
        let slice = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    /// Skip `len` bytes
    pub fn skip(&mut self, len: usize) -> ReadResult<()> {
        self.read_slice(len).map(|_| ())
    }

    /// Read a big-endian u16
    pub fn read_u16_be(&mut self) -> ReadResult<u16> {
        self.read_exact_size().map(u16::from_be_bytes)
    }

    /// Read a big-endian u32
    pub fn read_u32_be(&mut self) -> ReadResult<u32> {
        self.read_exact_size().map(u32::from_be_bytes)
    }

    /// Read the next chunk: a 4-byte tag, a big-endian 32-bit length and
    /// the body.
    ///
    /// Returns `Ok(None)` when the input is exhausted. With
    /// [`ChunkAlign::Word`], the pad byte following an odd-length body is
    /// skipped.
    pub fn read_chunk(&mut self, align: ChunkAlign) -> ReadResult<Option<RawChunk<'slc>>> {
        if self.is_empty() {
            return Ok(None);
        }
        let tag: [u8; 4] = self.read_exact_size()?;
        let declared = self.read_u32_be()?;
        if declared as usize > self.remaining() {
            return Err(inv_data(
                self,
                ChunkError::LengthOutOfBounds {
                    tag,
                    declared,
                    available: self.remaining(),
                },
            ));
        }
        let offset = self.position;
        let data = self.read_slice(declared as usize)?;
        if align == ChunkAlign::Word && declared % 2 == 1 && !self.is_empty() {
            self.position += 1;
        }
        Ok(Some(RawChunk { tag, offset, data }))
    }

    /// Read the next chunk and require it to carry `tag`
    pub fn expect_chunk(&mut self, tag: [u8; 4], align: ChunkAlign) -> ReadResult<RawChunk<'slc>> {
        let position = self.position;
        match self.read_chunk(align)? {
            Some(chunk) if chunk.tag == tag => Ok(chunk),
            Some(chunk) => Err(ReaderError::invalid(
                position,
                ChunkError::Unexpected {
                    expected: tag,
                    found: chunk.tag,
                }
                .into(),
            )),
            None => Err(ReaderError::oob(position)),
        }
    }
}

/// A chunk whose body borrows from the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawChunk<'slc> {
    tag: [u8; 4],
    offset: usize,
    data: &'slc [u8],
}

impl<'slc> RawChunk<'slc> {
    /// The four byte chunk identifier
    pub const fn tag(&self) -> [u8; 4] {
        self.tag
    }
    /// True if the chunk carries `tag`
    pub fn is(&self, tag: &[u8; 4]) -> bool {
        &self.tag == tag
    }
    /// The offset of the body within the input
    pub const fn offset(&self) -> usize {
        self.offset
    }
    /// The chunk body
    pub const fn data(&self) -> &'slc [u8] {
        self.data
    }
    /// The declared length
    pub const fn len(&self) -> usize {
        self.data.len()
    }
    /// True if the body is empty
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    /// A reader over the body
    pub const fn reader(&self) -> Reader<'slc> {
        Reader::from_byte_slice(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseError;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_big_endian() {
        let mut reader = Reader::from_byte_slice(&[0x12, 0x34, 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(reader.read_u16_be().unwrap(), 0x1234);
        assert_eq!(reader.read_u32_be().unwrap(), 0x100);
        assert!(reader.is_empty());
        assert!(reader.read_u8().unwrap_err().is_out_of_bounds());
    }

    #[test]
    fn word_aligned_chunks_skip_pad() {
        let bytes = [
            b'A', b'B', b'C', b'D', 0, 0, 0, 1, 0x7F, 0x00, //
            b'E', b'F', b'G', b'H', 0, 0, 0, 0,
        ];
        let mut reader = Reader::from_byte_slice(&bytes);
        let first = reader.read_chunk(ChunkAlign::Word).unwrap().unwrap();
        assert_eq!(first.tag(), *b"ABCD");
        assert_eq!(first.data(), &[0x7F]);
        let second = reader.read_chunk(ChunkAlign::Word).unwrap().unwrap();
        assert!(second.is(b"EFGH"));
        assert!(second.is_empty());
        assert_eq!(reader.read_chunk(ChunkAlign::Word).unwrap(), None);
    }

    #[test]
    fn chunk_longer_than_input() {
        let bytes = [b'M', b'T', b'r', b'k', 0, 0, 0, 9, 0x00];
        let mut reader = Reader::from_byte_slice(&bytes);
        let err = reader.read_chunk(ChunkAlign::Byte).unwrap_err();
        assert_eq!(
            err.parse_error(),
            Some(&ParseError::Chunk(ChunkError::LengthOutOfBounds {
                tag: *b"MTrk",
                declared: 9,
                available: 1
            }))
        );
    }
}
