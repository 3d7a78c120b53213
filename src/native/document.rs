#![doc = r#"
The native document container.

Documents are stored as word-aligned IFF chunks:

```text
SEQD
  HEAD   version u16, initial tempo u32, track count u16, zero padded to 16
  NAME   document name, UTF-8
  DEST   count u8, then per destination:
           channel u8, name (u16 length + UTF-8), port flag u8 [, port]
  MSTR   TRHD + EVTS of the master track
  TRAK   TRHD + EVTS, once per data track
TRHD     id u16, clock u8, name (u16 length + UTF-8)
EVTS     event list, see the parent module
```

Readers skip chunks they don't know. Only `HEAD` must come first.
"#]

use super::{read_event_list, write_event_list};
use crate::{
    NativeError, WriteError,
    chunk::{ChunkAlign, ChunkLength, ChunkWriter},
    destination::Destination,
    document::Document,
    reader::{ReadResult, Reader, RawChunk, inv_data},
    track::{ClockType, EventTrack},
};
use alloc::{string::String, vec::Vec};

/// Version written into `HEAD`. Newer documents are refused.
pub const NATIVE_VERSION: u16 = 1;

const DOCUMENT_TAG: [u8; 4] = *b"SEQD";
const HEAD_TAG: [u8; 4] = *b"HEAD";
const NAME_TAG: [u8; 4] = *b"NAME";
const DEST_TAG: [u8; 4] = *b"DEST";
const MASTER_TAG: [u8; 4] = *b"MSTR";
const TRACK_TAG: [u8; 4] = *b"TRAK";
const TRACK_HEADER_TAG: [u8; 4] = *b"TRHD";
const EVENTS_TAG: [u8; 4] = *b"EVTS";
const HEAD_LEN: u32 = 16;

/// Encode `document`
pub fn write_document(document: &Document) -> Result<Vec<u8>, WriteError> {
    let mut out = ChunkWriter::new(ChunkAlign::Word);
    out.push(DOCUMENT_TAG, ChunkLength::Unknown);

    out.push(HEAD_TAG, ChunkLength::Known(HEAD_LEN));
    out.write_u16_be(NATIVE_VERSION);
    out.write_u32_be(document.initial_tempo());
    out.write_u16_be(document.tracks().len().min(u16::MAX as usize) as u16);
    out.pop()?;

    out.push(NAME_TAG, ChunkLength::Unknown);
    out.write_bytes(document.name().as_bytes());
    out.pop()?;

    out.push(DEST_TAG, ChunkLength::Unknown);
    out.write_u8(document.destinations().len() as u8);
    for destination in document.destinations().iter() {
        out.write_u8(destination.channel());
        write_name(&mut out, destination.name())?;
        match destination.port() {
            Some(port) => {
                out.write_u8(1);
                write_name(&mut out, port)?;
            }
            None => out.write_u8(0),
        }
    }
    out.pop()?;

    out.push(MASTER_TAG, ChunkLength::Unknown);
    write_track(&mut out, document.master())?;
    out.pop()?;

    for track in document.tracks() {
        out.push(TRACK_TAG, ChunkLength::Unknown);
        write_track(&mut out, track)?;
        out.pop()?;
    }

    out.pop()?;
    Ok(out.finish()?)
}

fn write_name(out: &mut ChunkWriter, name: &str) -> Result<(), WriteError> {
    let len = u16::try_from(name.len()).map_err(|_| WriteError::NameTooLong(name.len()))?;
    out.write_u16_be(len);
    out.write_bytes(name.as_bytes());
    Ok(())
}

fn write_track(out: &mut ChunkWriter, track: &EventTrack) -> Result<(), WriteError> {
    out.push(TRACK_HEADER_TAG, ChunkLength::Unknown);
    out.write_u16_be(track.id());
    out.write_u8(track.clock().into());
    write_name(out, track.name())?;
    out.pop()?;

    out.push(EVENTS_TAG, ChunkLength::Unknown);
    write_event_list(track.events(), out.buffer_mut())?;
    out.pop()?;
    Ok(())
}

/// Decode a document written by [`write_document`]
pub fn read_document(bytes: &[u8]) -> ReadResult<Document> {
    let mut reader = Reader::from_byte_slice(bytes);
    let container = reader.expect_chunk(DOCUMENT_TAG, ChunkAlign::Word)?;
    let base = container.offset();
    let mut reader = container.reader();
    read_body(&mut reader).map_err(|e| e.offset_by(base))
}

fn read_body(reader: &mut Reader<'_>) -> ReadResult<Document> {
    let head = reader.expect_chunk(HEAD_TAG, ChunkAlign::Word)?;
    let mut fields = head.reader();
    let version = fields.read_u16_be()?;
    if version > NATIVE_VERSION {
        return Err(inv_data(&fields, NativeError::Version(version)).offset_by(head.offset()));
    }
    let initial_tempo = fields.read_u32_be()?;
    let _announced = fields.read_u16_be()?;

    let mut document = Document::new(String::new());
    document.set_initial_tempo(initial_tempo);

    while let Some(chunk) = reader.read_chunk(ChunkAlign::Word)? {
        let base = chunk.offset();
        let result = match chunk.tag() {
            NAME_TAG => utf8(&chunk.reader(), chunk.data()).map(|name| document.set_name(name)),
            DEST_TAG => read_destinations(chunk, &mut document),
            MASTER_TAG => read_track(chunk).map(|mut master| {
                let target = document.master_mut();
                target.set_name(master.name());
                target.merge(master.take_events());
            }),
            TRACK_TAG => read_track(chunk).map(|track| {
                document.insert_track(track);
            }),
            _tag => {
                #[cfg(feature = "tracing")]
                tracing::debug!(tag = ?_tag, "skipping unknown chunk");
                Ok(())
            }
        };
        result.map_err(|e| e.offset_by(base))?;
    }

    #[cfg(feature = "tracing")]
    if document.tracks().len() != _announced as usize {
        tracing::warn!(
            announced = _announced,
            found = document.tracks().len(),
            "track count differs from header"
        );
    }
    Ok(document)
}

fn utf8(reader: &Reader<'_>, bytes: &[u8]) -> ReadResult<String> {
    core::str::from_utf8(bytes)
        .map(String::from)
        .map_err(|_| inv_data(reader, NativeError::Utf8))
}

fn read_name(reader: &mut Reader<'_>) -> ReadResult<String> {
    let len = reader.read_u16_be()?;
    let bytes = reader.read_slice(len as usize)?;
    utf8(reader, bytes)
}

fn read_destinations(chunk: RawChunk<'_>, document: &mut Document) -> ReadResult<()> {
    let mut reader = chunk.reader();
    let count = reader.read_u8()?;
    for _ in 0..count {
        let channel = reader.read_u8()?;
        let name = read_name(&mut reader)?;
        let port = match reader.read_u8()? {
            0 => None,
            _ => Some(read_name(&mut reader)?),
        };
        let mut destination = Destination::new(name, channel)
            .map_err(|e| inv_data(&reader, NativeError::from(e)))?;
        if let Some(port) = port {
            destination = destination.with_port(port);
        }
        document
            .destinations_mut()
            .add(destination)
            .map_err(|e| inv_data(&reader, NativeError::from(e)))?;
    }
    Ok(())
}

fn read_track(chunk: RawChunk<'_>) -> ReadResult<EventTrack> {
    let mut reader = chunk.reader();
    let header = reader.expect_chunk(TRACK_HEADER_TAG, ChunkAlign::Word)?;
    let (id, clock, name) =
        read_track_header(&mut header.reader()).map_err(|e| e.offset_by(header.offset()))?;

    let events = reader.expect_chunk(EVENTS_TAG, ChunkAlign::Word)?;
    let decoded = read_event_list(events.data()).map_err(|e| e.offset_by(events.offset()))?;

    let mut track = EventTrack::new(id, clock);
    track.set_name(name);
    track.merge(decoded.events);
    Ok(track)
}

fn read_track_header(reader: &mut Reader<'_>) -> ReadResult<(u16, ClockType, String)> {
    let id = reader.read_u16_be()?;
    let clock = ClockType::from_code(reader.read_u8()?).map_err(|e| inv_data(reader, e))?;
    let name = read_name(reader)?;
    Ok((id, clock, name))
}
