#![doc = r#"
Push-down chunk framing shared by SMF and the native document format.

A chunk is a 4-byte tag, a big-endian 32-bit length and a body. Chunks nest:
[`ChunkWriter::push`] opens a frame and [`ChunkWriter::pop`] closes it.

- Frames opened with [`ChunkLength::Unknown`] get their length back-patched
  on pop.
- Frames opened with [`ChunkLength::Known`] are zero-padded up to the
  declared size; writing past it is an error.
- With [`ChunkAlign::Word`] (IFF convention) an odd-length body is followed by
  one zero pad byte that is not counted in the length. SMF uses
  [`ChunkAlign::Byte`], which never pads.

# Example
```rust
# use midiseq::chunk::*;
let mut writer = ChunkWriter::new(ChunkAlign::Byte);
writer.push(*b"MTrk", ChunkLength::Unknown);
writer.write_bytes(&[0x00, 0xFF, 0x2F, 0x00]);
writer.pop().unwrap();
let bytes = writer.finish().unwrap();
assert_eq!(&bytes[..8], b"MTrk\x00\x00\x00\x04");
```
"#]

use crate::ChunkError;
use alloc::vec::Vec;

/// SMF `MThd` tag
pub const HEADER_TAG: [u8; 4] = *b"MThd";
/// SMF `MTrk` tag
pub const TRACK_TAG: [u8; 4] = *b"MTrk";

/// Whether odd-length chunks are padded to an even length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkAlign {
    /// No padding. Used for MIDI files.
    #[default]
    Byte,
    /// Pad odd-length bodies with one zero byte.
    Word,
}

/// The length a chunk is opened with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkLength {
    /// The body will be exactly this long, zero-padded on pop
    Known(u32),
    /// The length is patched in when the chunk is popped
    Unknown,
}

#[derive(Debug)]
struct Frame {
    tag: [u8; 4],
    length_at: usize,
    declared: ChunkLength,
}

/// Writes nested chunks into an in-memory buffer.
#[derive(Debug, Default)]
pub struct ChunkWriter {
    buf: Vec<u8>,
    stack: Vec<Frame>,
    align: ChunkAlign,
}

impl ChunkWriter {
    /// Create an empty writer
    pub fn new(align: ChunkAlign) -> Self {
        Self {
            buf: Vec::new(),
            stack: Vec::new(),
            align,
        }
    }

    /// Open a chunk
    pub fn push(&mut self, tag: [u8; 4], length: ChunkLength) {
        self.buf.extend_from_slice(&tag);
        let length_at = self.buf.len();
        let placeholder = match length {
            ChunkLength::Known(len) => len,
            ChunkLength::Unknown => 0,
        };
        self.buf.extend_from_slice(&placeholder.to_be_bytes());
        self.stack.push(Frame {
            tag,
            length_at,
            declared: length,
        });
    }

    /// Close the innermost chunk
    pub fn pop(&mut self) -> Result<(), ChunkError> {
        let frame = self.stack.pop().ok_or(ChunkError::Unbalanced)?;
        let body_start = frame.length_at + 4;
        let written = self.buf.len() - body_start;

        let len = match frame.declared {
            ChunkLength::Known(declared) => {
                if written > declared as usize {
                    return Err(ChunkError::FixedLengthExceeded {
                        tag: frame.tag,
                        declared,
                        written,
                    });
                }
                self.buf.resize(body_start + declared as usize, 0);
                declared
            }
            ChunkLength::Unknown => {
                let len = u32::try_from(written).map_err(|_| ChunkError::TooLarge(written))?;
                self.buf[frame.length_at..body_start].copy_from_slice(&len.to_be_bytes());
                len
            }
        };

        if self.align == ChunkAlign::Word && len % 2 == 1 {
            self.buf.push(0);
        }
        Ok(())
    }

    /// Number of open chunks
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Append raw bytes to the innermost chunk
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append one byte
    pub fn write_u8(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Append a big-endian u16
    pub fn write_u16_be(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Append a big-endian u32
    pub fn write_u32_be(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Direct access to the output, for encoders that append in place
    pub fn buffer_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }

    /// Return the written bytes. Every chunk must have been popped.
    pub fn finish(self) -> Result<Vec<u8>, ChunkError> {
        if !self.stack.is_empty() {
            return Err(ChunkError::StillOpen(self.stack.len()));
        }
        Ok(self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn back_patches_unknown_length() {
        let mut writer = ChunkWriter::new(ChunkAlign::Byte);
        writer.push(TRACK_TAG, ChunkLength::Unknown);
        writer.write_bytes(&[1, 2, 3]);
        writer.pop().unwrap();
        assert_eq!(
            writer.finish().unwrap(),
            [b'M', b'T', b'r', b'k', 0, 0, 0, 3, 1, 2, 3]
        );
    }

    #[test]
    fn pads_known_length_with_zeroes() {
        let mut writer = ChunkWriter::new(ChunkAlign::Byte);
        writer.push(HEADER_TAG, ChunkLength::Known(6));
        writer.write_u16_be(1);
        writer.pop().unwrap();
        let bytes = writer.finish().unwrap();
        assert_eq!(&bytes[4..], &[0, 0, 0, 6, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn known_length_overflow() {
        let mut writer = ChunkWriter::new(ChunkAlign::Byte);
        writer.push(*b"ABCD", ChunkLength::Known(1));
        writer.write_u16_be(0xFFFF);
        assert_eq!(
            writer.pop(),
            Err(ChunkError::FixedLengthExceeded {
                tag: *b"ABCD",
                declared: 1,
                written: 2
            })
        );
    }

    #[test]
    fn word_alignment_pads_odd_chunks_only() {
        let mut writer = ChunkWriter::new(ChunkAlign::Word);
        writer.push(*b"FORM", ChunkLength::Unknown);
        writer.push(*b"ODD ", ChunkLength::Unknown);
        writer.write_u8(7);
        writer.pop().unwrap();
        writer.push(*b"EVEN", ChunkLength::Unknown);
        writer.write_u16_be(7);
        writer.pop().unwrap();
        writer.pop().unwrap();
        let bytes = writer.finish().unwrap();
        // ODD: 8 + 1 + pad, EVEN: 8 + 2
        assert_eq!(&bytes[4..8], &20u32.to_be_bytes());
        assert_eq!(&bytes[16..18], &[7, 0]);
        assert_eq!(bytes.len(), 28);
    }

    #[test]
    fn midi_chunks_stay_odd() {
        let mut writer = ChunkWriter::new(ChunkAlign::Byte);
        writer.push(TRACK_TAG, ChunkLength::Unknown);
        writer.write_u8(0);
        writer.pop().unwrap();
        assert_eq!(writer.finish().unwrap().len(), 9);
    }

    #[test]
    fn unbalanced_frames() {
        let mut writer = ChunkWriter::new(ChunkAlign::Byte);
        assert_eq!(writer.pop(), Err(ChunkError::Unbalanced));
        writer.push(TRACK_TAG, ChunkLength::Unknown);
        assert_eq!(writer.depth(), 1);
        assert_eq!(writer.finish(), Err(ChunkError::StillOpen(1)));
    }
}
