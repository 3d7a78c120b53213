#![doc = r#"
The sequencer's own compact event list format.

# Layout
```text
origin        5 fixed 7-bit groups, start time + 2^31
per event:
  delta       VLQ, start minus the previous start
  command     1 byte: 0x80 | selected << 6 | kind
  duration    VLQ                      (kinds with a duration)
  length      VLQ, then raw bytes      (kinds with extended data)
  channel     1 fixed group            (kinds with a channel)
  fields      fixed 7-bit groups, one run per field
```

Apart from extended data, only command bytes have bit 7 set. That lets
[`read_event_list`] recover from damage: stray bytes where a command is
expected are skipped, and an unknown command is skipped together with the
data bytes behind it. Decoding resumes at the next command byte with a delta
of zero. Deltas lost this way shift later events earlier, so recovery is best
effort; [`NativeEvents::skipped`] counts the bytes it threw away.

# Field ranges
Each fixed field is as wide as its [`Attribute::range`]. Values outside that
range can only be built by filling in an [`EventBody`] directly; they are
clamped on write, as are negative durations. Events made through the
[`Event`] constructors, the attribute setters, or SMF import always round
trip unchanged.
"#]

/// The native document container
pub mod document;

use crate::{
    WriteError,
    event::{Attribute, Event, EventBody, EventKind, ExtendedData, Properties, split_command_byte},
    reader::{ReadResult, Reader},
    vlq::{read_fixed, read_vlq, write_fixed, write_vlq},
};
use alloc::vec::Vec;

const ORIGIN_BIAS: i64 = 1 << 31;
const CHANNEL_CEILING: u32 = 63;
const BYTE: u32 = 0x7F;
const FOURTEEN_BIT: u32 = 0x3FFF;
const WORD: u32 = u16::MAX as u32;
const SIGNED_BYTE: u32 = 0xFF;

const fn ceiling(attr: Attribute) -> u32 {
    attr.range().1 as u32
}

/// Events decoded by [`read_event_list`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NativeEvents {
    /// The decoded events, in stored order
    pub events: Vec<Event>,
    /// Bytes discarded while resynchronising
    pub skipped: usize,
}

/// Append `events`, which must be sorted by start time, to `out`
pub fn write_event_list(events: &[Event], out: &mut Vec<u8>) -> Result<(), WriteError> {
    let origin = events.first().map_or(0, Event::start);
    write_fixed(out, (origin as i64 + ORIGIN_BIAS) as u32, u32::MAX);

    let mut last = origin as i64;
    for event in events {
        let start = event.start() as i64;
        if start < last {
            return Err(WriteError::OutOfOrder { time: start, last });
        }
        let delta = u32::try_from(start - last).unwrap_or(u32::MAX);
        write_vlq(out, delta)?;
        last = start;

        out.push(event.command_byte());
        let properties = event.properties();
        if properties.contains(Properties::DURATION) {
            write_vlq(out, event.duration().max(0) as u32)?;
        }
        if let Some(data) = event.extended_data() {
            write_vlq(out, data.len() as u32)?;
            out.extend_from_slice(data);
        }
        if let Some(channel) = event.channel() {
            write_fixed(out, channel as u32, CHANNEL_CEILING);
        }
        write_fields(event.body(), out);
    }
    Ok(())
}

fn write_fields(body: &EventBody, out: &mut Vec<u8>) {
    let mut field = |value: u32, ceiling: u32| write_fixed(out, value, ceiling);
    match *body {
        EventBody::Note {
            pitch,
            attack_velocity,
            release_velocity,
            ..
        } => {
            field(pitch as u32, BYTE);
            field(attack_velocity as u32, BYTE);
            field(release_velocity as u32, BYTE);
        }
        EventBody::NoteOff {
            pitch,
            release_velocity,
            ..
        } => {
            field(pitch as u32, BYTE);
            field(release_velocity as u32, BYTE);
        }
        EventBody::ChannelAftertouch { pressure, .. } => field(pressure as u32, BYTE),
        EventBody::PolyAftertouch {
            pitch, pressure, ..
        } => {
            field(pitch as u32, BYTE);
            field(pressure as u32, BYTE);
        }
        EventBody::Controller {
            controller, value, ..
        } => {
            field(controller as u32, BYTE);
            field(value as u32, FOURTEEN_BIT);
        }
        EventBody::ProgramChange { program, .. } => field(program as u32, BYTE),
        EventBody::PitchBend { bend, .. } => field(bend as u32, FOURTEEN_BIT),
        EventBody::Text { text_type, .. } => field(text_type as u32, BYTE),
        EventBody::Tempo { tempo } => field(tempo, ceiling(Attribute::Tempo)),
        EventBody::TimeSig {
            numerator,
            beat_size,
        } => {
            field(numerator as u32, ceiling(Attribute::Numerator));
            field(beat_size as u32, ceiling(Attribute::BeatSize));
        }
        EventBody::Sequence {
            track_id,
            transposition,
            vpos,
            ..
        } => {
            field(track_id as u32, WORD);
            field((transposition as i16 + 128) as u32, SIGNED_BYTE);
            field(vpos as u32, BYTE);
        }
        EventBody::Repeat { count, .. } => field(count as u32, WORD),
        EventBody::Branch { track_id } => field(track_id as u32, WORD),
        EventBody::ChannelTranspose { transposition, .. } => {
            field((transposition as i16 + 128) as u32, SIGNED_BYTE)
        }
        EventBody::ChannelVolume { volume, .. } => field(volume as u32, BYTE),
        EventBody::Interpolate { value, .. } => field(value as u32, FOURTEEN_BIT),
        EventBody::TaskMarker { task } => field(task as u32, WORD),
        EventBody::SysEx { .. } | EventBody::End | EventBody::Stop => {}
    }
}

/// Decode an event list written by [`write_event_list`].
///
/// Damaged command bytes are skipped rather than reported; truncated or
/// malformed fields inside an event are errors.
pub fn read_event_list(bytes: &[u8]) -> ReadResult<NativeEvents> {
    let mut reader = Reader::from_byte_slice(bytes);
    let origin = read_fixed(&mut reader, u32::MAX)? as i64 - ORIGIN_BIAS;
    let mut time = origin;
    let mut decoded = NativeEvents::default();
    let mut resync = false;

    while !reader.is_empty() {
        if !resync {
            time += read_vlq(&mut reader)? as i64;
        }
        let command = reader.read_u8()?;
        if command & 0x80 == 0 {
            decoded.skipped += 1;
            resync = true;
            continue;
        }
        let (kind, selected) = match split_command_byte(command) {
            Ok(split) => split,
            Err(_code) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(code = _code, position = reader.buffer_position() - 1, "unknown event kind");
                decoded.skipped += 1;
                resync = true;
                continue;
            }
        };
        resync = false;

        let start = time.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        let mut event = read_event(&mut reader, kind, start)?;
        event.set_selected(selected);
        decoded.events.push(event);
    }
    #[cfg(feature = "tracing")]
    if decoded.skipped > 0 {
        tracing::warn!(skipped = decoded.skipped, "resynchronised native event list");
    }
    Ok(decoded)
}

fn read_event(reader: &mut Reader<'_>, kind: EventKind, start: i32) -> ReadResult<Event> {
    let properties = kind.properties();
    let duration = if properties.contains(Properties::DURATION) {
        read_vlq(reader)?.min(i32::MAX as u32) as i32
    } else {
        0
    };
    let data = if properties.contains(Properties::EXTENDED) {
        let len = read_vlq(reader)?;
        ExtendedData::from_bytes(reader.read_slice(len as usize)?)
    } else {
        ExtendedData::default()
    };
    let channel = if properties.contains(Properties::CHANNEL) {
        read_fixed(reader, CHANNEL_CEILING)? as u8
    } else {
        0
    };

    let mut field = |ceiling: u32| read_fixed(reader, ceiling);
    let signed = |raw: u32| (raw as i16 - 128) as i8;
    let body = match kind {
        EventKind::Note => EventBody::Note {
            channel,
            pitch: field(BYTE)? as u8,
            attack_velocity: field(BYTE)? as u8,
            release_velocity: field(BYTE)? as u8,
            duration,
        },
        EventKind::NoteOff => EventBody::NoteOff {
            channel,
            pitch: field(BYTE)? as u8,
            release_velocity: field(BYTE)? as u8,
        },
        EventKind::ChannelAftertouch => EventBody::ChannelAftertouch {
            channel,
            pressure: field(BYTE)? as u8,
        },
        EventKind::PolyAftertouch => EventBody::PolyAftertouch {
            channel,
            pitch: field(BYTE)? as u8,
            pressure: field(BYTE)? as u8,
        },
        EventKind::Controller => EventBody::Controller {
            channel,
            controller: field(BYTE)? as u8,
            value: field(FOURTEEN_BIT)? as u16,
        },
        EventKind::ProgramChange => EventBody::ProgramChange {
            channel,
            program: field(BYTE)? as u8,
        },
        EventKind::PitchBend => EventBody::PitchBend {
            channel,
            bend: field(FOURTEEN_BIT)? as u16,
        },
        EventKind::SysEx => EventBody::SysEx { channel, data },
        EventKind::Text => EventBody::Text {
            text_type: field(BYTE)? as u8,
            data,
        },
        EventKind::Tempo => EventBody::Tempo {
            tempo: field(ceiling(Attribute::Tempo))?,
        },
        EventKind::TimeSig => EventBody::TimeSig {
            numerator: field(ceiling(Attribute::Numerator))? as u8,
            beat_size: field(ceiling(Attribute::BeatSize))? as u8,
        },
        EventKind::Sequence => EventBody::Sequence {
            track_id: field(WORD)? as u16,
            transposition: signed(field(SIGNED_BYTE)?),
            vpos: field(BYTE)? as u8,
            duration,
        },
        EventKind::Repeat => EventBody::Repeat {
            count: field(WORD)? as u16,
            duration,
        },
        EventKind::Branch => EventBody::Branch {
            track_id: field(WORD)? as u16,
        },
        EventKind::End => EventBody::End,
        EventKind::ChannelTranspose => EventBody::ChannelTranspose {
            channel,
            transposition: signed(field(SIGNED_BYTE)?),
        },
        EventKind::ChannelVolume => EventBody::ChannelVolume {
            channel,
            volume: field(BYTE)? as u8,
        },
        EventKind::Interpolate => EventBody::Interpolate {
            value: field(FOURTEEN_BIT)? as u16,
            duration,
        },
        EventKind::Stop => EventBody::Stop,
        EventKind::TaskMarker => EventBody::TaskMarker {
            task: field(WORD)? as u16,
        },
    };
    Ok(Event::new(start, body))
}
