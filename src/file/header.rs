use crate::{
    HeaderError, WriteError,
    chunk::{ChunkLength, ChunkWriter, HEADER_TAG},
    file::Timing,
    reader::{ReadResult, Reader, ReaderError, inv_data},
};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The three SMF layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum FormatType {
    /// Format 0: one track holding every channel
    SingleMultiChannel = 0,
    /// Format 1: tracks played together
    Simultaneous = 1,
    /// Format 2: independent patterns
    SequentiallyIndependent = 2,
}

#[doc = r#"
The contents of an `MThd` chunk.

The chunk must be at least six bytes long; anything after the division word
is ignored.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmfHeader {
    format: FormatType,
    track_count: u16,
    timing: Timing,
}

impl SmfHeader {
    /// Create a header
    pub const fn new(format: FormatType, track_count: u16, timing: Timing) -> Self {
        Self {
            format,
            track_count,
            timing,
        }
    }

    /// The file's layout
    pub const fn format(&self) -> FormatType {
        self.format
    }

    /// The number of tracks the header announces
    pub const fn track_count(&self) -> u16 {
        self.track_count
    }

    /// The time base of every track
    pub const fn timing(&self) -> Timing {
        self.timing
    }

    /// Read the `MThd` chunk at the start of a file
    pub fn read(reader: &mut Reader<'_>) -> ReadResult<Self> {
        let tag: [u8; 4] = reader.read_exact_size()?;
        if tag != HEADER_TAG {
            return Err(ReaderError::invalid(0, HeaderError::NotMidi(tag).into()));
        }
        let length_at = reader.buffer_position();
        let length = reader.read_u32_be()?;
        if length < 6 {
            return Err(ReaderError::invalid(
                length_at,
                HeaderError::Length(length).into(),
            ));
        }
        let body_at = reader.buffer_position();
        let mut body = Reader::from_byte_slice(reader.read_slice(length as usize)?);

        let format = body.read_u16_be()?;
        let format =
            FormatType::try_from(format).map_err(|_| inv_data(&body, HeaderError::Format(format)))?;
        let track_count = body.read_u16_be()?;
        let timing = Timing::read(&mut body).map_err(|e| e.offset_by(body_at))?;
        Ok(Self::new(format, track_count, timing))
    }

    /// Write the `MThd` chunk
    pub fn write(&self, out: &mut ChunkWriter) -> Result<(), WriteError> {
        out.push(HEADER_TAG, ChunkLength::Known(6));
        out.write_u16_be(self.format.into());
        out.write_u16_be(self.track_count);
        out.write_u16_be(self.timing.to_division());
        out.pop()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParseError, chunk::ChunkAlign, file::SmpteFps};
    use pretty_assertions::assert_eq;

    #[test]
    fn header_round_trip() {
        let header = SmfHeader::new(
            FormatType::Simultaneous,
            3,
            Timing::new_smpte(SmpteFps::Thirty, 80),
        );
        let mut out = ChunkWriter::new(ChunkAlign::Byte);
        header.write(&mut out).unwrap();
        let bytes = out.finish().unwrap();
        assert_eq!(bytes.len(), 14);
        assert_eq!(SmfHeader::read(&mut Reader::from_byte_slice(&bytes)), Ok(header));
    }

    #[test]
    fn long_header_is_tolerated() {
        let bytes = [
            b'M', b'T', b'h', b'd', 0, 0, 0, 8, 0, 0, 0, 1, 0x00, 0x60, 0xAA, 0xBB, b'M',
        ];
        let mut reader = Reader::from_byte_slice(&bytes);
        let header = SmfHeader::read(&mut reader).unwrap();
        assert_eq!(header.format(), FormatType::SingleMultiChannel);
        assert_eq!(header.timing(), Timing::TicksPerQuarterNote(96));
        assert_eq!(reader.buffer_position(), 16);
    }

    #[test]
    fn rejects_non_midi() {
        let err = SmfHeader::read(&mut Reader::from_byte_slice(b"RIFF\0\0\0\x06")).unwrap_err();
        assert_eq!(
            err.parse_error(),
            Some(&ParseError::Header(HeaderError::NotMidi(*b"RIFF")))
        );
        let err = SmfHeader::read(&mut Reader::from_byte_slice(b"MThd\0\0\0\x04\0\0\0\x01"))
            .unwrap_err();
        assert_eq!(
            err.parse_error(),
            Some(&ParseError::Header(HeaderError::Length(4)))
        );
    }
}
