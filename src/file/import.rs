#![doc = r#"
Standard MIDI File import.

[`import_smf`] decodes a whole file into an [`ImportSink`]:

1. The `MThd` chunk fixes the format, announced track count and time base.
2. Sixteen destinations are created, one per MIDI channel.
3. Every `MTrk` chunk becomes a track; other chunks are skipped.
4. Note-ons are paired with their note-offs to give notes a duration.
5. Each track is referenced from the master track by a sequence event.

Damage inside a track only costs that track its remaining events; the import
goes on with the next chunk and records an [`ImportWarning`]. Broken chunk
framing ends the import with an [`ImportError`].
"#]

use crate::{
    DestinationError,
    chunk::{ChunkAlign, TRACK_TAG},
    event::{DEFAULT_RELEASE_VELOCITY, Event, EventBody, EventKind, TEXT_TRACK_NAME},
    file::{
        FormatType, ImportConfig, SmfHeader, Timing,
        track_reader::{SkipReason, TrackItem, TrackReader},
    },
    pitch::Pitch,
    reader::{Reader, ReaderError},
    track::ClockType,
};
use alloc::{string::String, vec::Vec};
use core::fmt;
use thiserror::Error;

/// Receives what [`import_smf`] decodes.
///
/// Track ids returned by [`ImportSink::add_track`] are passed back to the
/// other methods.
pub trait ImportSink {
    /// Create a destination on MIDI channel `channel` (1-16) and return
    /// its virtual channel
    fn add_destination(&mut self, name: String, channel: u8) -> Result<u8, DestinationError>;

    /// Create an empty track and return its id
    fn add_track(&mut self, clock: ClockType) -> u16;

    /// Merge decoded events into a track
    fn merge_events(&mut self, track: u16, events: Vec<Event>);

    /// Name a track
    fn set_track_name(&mut self, track: u16, name: &str);

    /// Merge events into the master track
    fn merge_master_events(&mut self, events: Vec<Event>);

    /// Set the tempo playback starts with, in thousandths of a BPM
    fn set_initial_tempo(&mut self, tempo: u32);
}

/// Errors that stop an import
#[derive(Debug, Error)]
pub enum ImportError {
    /// The file does not start with a valid `MThd` chunk
    #[error("Not a standard MIDI file: {0}")]
    NotSmf(ReaderError),
    /// A chunk header was truncated or declared more bytes than the file has
    #[error("Broken chunk structure: {0}")]
    Chunk(ReaderError),
    /// The sink had no room for the file's destinations
    #[error("Creating destinations: {0}")]
    Destination(#[from] DestinationError),
    /// The file could not be read
    #[cfg(feature = "std")]
    #[error("Reading file: {0}")]
    Io(#[from] std::io::Error),
}

/// Something the importer repaired or dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportWarning {
    /// A note-off with no sounding note to end
    UnmatchedNoteOff {
        /// Track id
        track: u16,
        /// Engine time
        time: i32,
        /// Virtual channel
        channel: u8,
        /// Note number
        pitch: Pitch,
    },
    /// A note still sounding at the end of the track; it was given a
    /// duration of zero
    HungNote {
        /// Track id
        track: u16,
        /// Engine time of the note-on
        time: i32,
        /// Virtual channel
        channel: u8,
        /// Note number
        pitch: Pitch,
    },
    /// A meta event type with no equivalent in the event model
    UnknownMeta {
        /// Track id
        track: u16,
        /// The meta type byte
        meta_type: u8,
    },
    /// Decoding stopped early; the events before the error were kept
    TrackAborted {
        /// Track id
        track: u16,
        /// Where and why decoding stopped, relative to the start of the file
        error: ReaderError,
    },
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmatchedNoteOff {
                track,
                time,
                channel,
                pitch,
            } => write!(
                f,
                "track {track}: note-off for {pitch} on channel {channel} at {time} has no note"
            ),
            Self::HungNote {
                track,
                time,
                channel,
                pitch,
            } => write!(
                f,
                "track {track}: note {pitch} on channel {channel} at {time} is never released"
            ),
            Self::UnknownMeta { track, meta_type } => {
                write!(f, "track {track}: skipped meta event {meta_type:#04X}")
            }
            Self::TrackAborted { track, error } => write!(f, "track {track}: {error}"),
        }
    }
}

/// What [`import_smf`] found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    format: FormatType,
    timing: Timing,
    tracks: Vec<u16>,
    warnings: Vec<ImportWarning>,
    skipped_chunks: usize,
}

impl ImportReport {
    /// The file's layout
    pub const fn format(&self) -> FormatType {
        self.format
    }
    /// The file's time base
    pub const fn timing(&self) -> Timing {
        self.timing
    }
    /// Ids of the tracks created, in file order
    pub fn tracks(&self) -> &[u16] {
        &self.tracks
    }
    /// Everything that was repaired or dropped
    pub fn warnings(&self) -> &[ImportWarning] {
        &self.warnings
    }
    /// Number of chunks that were not `MTrk`
    pub const fn skipped_chunks(&self) -> usize {
        self.skipped_chunks
    }
}

/// Decode the SMF in `bytes` into `sink`.
///
/// `source_name` names the destinations created for the file.
pub fn import_smf<S: ImportSink + ?Sized>(
    bytes: &[u8],
    source_name: &str,
    sink: &mut S,
    config: &ImportConfig,
) -> Result<ImportReport, ImportError> {
    let mut reader = Reader::from_byte_slice(bytes);
    let header = SmfHeader::read(&mut reader).map_err(ImportError::NotSmf)?;
    let timing = header.timing();
    let clock = timing.clock_type();

    let mut channel_map = [0u8; 16];
    for (nibble, slot) in channel_map.iter_mut().enumerate() {
        let channel = nibble as u8 + 1;
        *slot = sink.add_destination(config.destination_name(source_name, channel), channel)?;
    }

    let mut report = ImportReport {
        format: header.format(),
        timing,
        tracks: Vec::new(),
        warnings: Vec::new(),
        skipped_chunks: 0,
    };
    let mut sequences = Vec::new();
    let mut initial_tempo = None;

    while let Some(chunk) = reader
        .read_chunk(ChunkAlign::Byte)
        .map_err(ImportError::Chunk)?
    {
        if !chunk.is(&TRACK_TAG) {
            #[cfg(feature = "tracing")]
            tracing::debug!(tag = ?chunk.tag(), len = chunk.len(), "skipping chunk");
            report.skipped_chunks += 1;
            continue;
        }

        let id = sink.add_track(clock);
        #[cfg(feature = "tracing")]
        tracing::debug!(track = id, len = chunk.len(), "decoding track");

        let mut events = Vec::new();
        let mut decoder = TrackReader::new(chunk.data(), timing, channel_map);
        loop {
            match decoder.next_item() {
                Ok(None) => break,
                Ok(Some(TrackItem::Event(event))) => events.push(event),
                Ok(Some(TrackItem::Skipped(SkipReason::Meta(meta_type)))) => report
                    .warnings
                    .push(ImportWarning::UnknownMeta { track: id, meta_type }),
                Ok(Some(TrackItem::Skipped(_))) => {}
                Err(error) => {
                    let error = error.offset_by(chunk.offset());
                    #[cfg(feature = "tracing")]
                    tracing::warn!(track = id, %error, "track aborted");
                    report
                        .warnings
                        .push(ImportWarning::TrackAborted { track: id, error });
                    break;
                }
            }
        }

        fold_controller_lsb(&mut events);
        NoteMatcher::new(id).resolve(&mut events, &mut report.warnings);

        if let Some(name) = events.iter().find_map(track_name) {
            sink.set_track_name(id, &name);
        }
        if report.tracks.is_empty() {
            initial_tempo = events
                .iter()
                .take_while(|e| e.start() == 0)
                .find_map(|e| match e.body() {
                    EventBody::Tempo { tempo } => Some(*tempo),
                    _ => None,
                });
        }

        let duration = events
            .iter()
            .map(Event::end)
            .max()
            .unwrap_or(0)
            .clamp(0, i32::MAX as i64) as i32;
        sequences.push(Event::sequence(0, duration, id, vertical_position(id)));
        sink.merge_events(id, events);
        report.tracks.push(id);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        announced = header.track_count(),
        found = report.tracks.len(),
        warnings = report.warnings.len(),
        "import finished"
    );

    sink.merge_master_events(sequences);
    sink.set_initial_tempo(initial_tempo.unwrap_or(config.default_tempo));
    Ok(report)
}

fn track_name(event: &Event) -> Option<String> {
    match event.body() {
        EventBody::Text {
            text_type: TEXT_TRACK_NAME,
            ..
        } => event.text_content().map(|name| name.into_owned()),
        _ => None,
    }
}

/// Editor row of the sequence event that plays track `id`
const fn vertical_position(id: u16) -> u8 {
    let row = id.saturating_sub(1);
    if row > 127 { 127 } else { row as u8 }
}

/// Fold controller `n + 32` into a controller `n` that immediately precedes
/// it at the same time on the same channel, giving `n` its low seven bits.
fn fold_controller_lsb(events: &mut Vec<Event>) {
    let mut folded: Vec<Event> = Vec::with_capacity(events.len());
    for event in events.drain(..) {
        if let EventBody::Controller {
            channel,
            controller: lsb_number @ 32..=63,
            value: lsb,
        } = *event.body()
        {
            if let Some(EventBody::Controller {
                channel: msb_channel,
                controller,
                value,
            }) = folded
                .last_mut()
                .filter(|prev| prev.start() == event.start())
                .map(Event::body_mut)
                && *msb_channel == channel
                && *controller == lsb_number - 32
            {
                *value = (*value & !0x7F) | (lsb & 0x7F);
                continue;
            }
        }
        folded.push(event);
    }
    *events = folded;
}

/// Pairs note-ons with note-offs within one track.
///
/// A note-off ends the earliest sounding note with the same channel and
/// pitch. Note-off events are removed from the track; notes left sounding at
/// the end are hung notes.
#[derive(Debug, Clone, Default)]
pub struct NoteMatcher {
    track: u16,
    open: Vec<usize>,
}

impl NoteMatcher {
    /// A matcher for track `track`, used in warnings
    pub fn new(track: u16) -> Self {
        Self {
            track,
            open: Vec::new(),
        }
    }

    /// Give every note in `events` its duration and release velocity, and
    /// remove the note-offs
    pub fn resolve(&mut self, events: &mut Vec<Event>, warnings: &mut Vec<ImportWarning>) {
        self.open.clear();
        let mut keep = alloc::vec![true; events.len()];

        for index in 0..events.len() {
            let (off_channel, off_pitch, release) = match *events[index].body() {
                EventBody::Note { .. } => {
                    self.open.push(index);
                    continue;
                }
                EventBody::NoteOff {
                    channel,
                    pitch,
                    release_velocity,
                } => (channel, pitch, release_velocity),
                _ => continue,
            };
            keep[index] = false;
            let off_time = events[index].start();

            let found = self.open.iter().position(|&open| {
                matches!(*events[open].body(), EventBody::Note { channel, pitch, .. }
                    if channel == off_channel && pitch == off_pitch)
            });
            let Some(slot) = found else {
                #[cfg(feature = "tracing")]
                tracing::warn!(track = self.track, time = off_time, pitch = off_pitch, "unmatched note-off");
                warnings.push(ImportWarning::UnmatchedNoteOff {
                    track: self.track,
                    time: off_time,
                    channel: off_channel,
                    pitch: Pitch::new(off_pitch),
                });
                continue;
            };
            let note = &mut events[self.open.remove(slot)];
            let duration = off_time - note.start();
            if let EventBody::Note {
                release_velocity,
                duration: note_duration,
                ..
            } = note.body_mut()
            {
                *release_velocity = release;
                *note_duration = duration.max(0);
            }
        }

        for &index in &self.open {
            let note = &mut events[index];
            let time = note.start();
            if let EventBody::Note {
                channel,
                pitch,
                release_velocity,
                duration,
                ..
            } = note.body_mut()
            {
                *duration = 0;
                *release_velocity = DEFAULT_RELEASE_VELOCITY;
                #[cfg(feature = "tracing")]
                tracing::warn!(track = self.track, pitch = *pitch, "hung note");
                warnings.push(ImportWarning::HungNote {
                    track: self.track,
                    time,
                    channel: *channel,
                    pitch: Pitch::new(*pitch),
                });
            }
        }
        self.open.clear();

        let mut flags = keep.into_iter();
        events.retain(|_| flags.next().unwrap_or(true));
        debug_assert!(events.iter().all(|e| e.kind() != EventKind::NoteOff));
    }
}
