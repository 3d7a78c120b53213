#![doc = r#"
Standard MIDI File export.

[`export_smf`] writes a format 1 file: a tempo track carrying the document
name and initial tempo, followed by one `MTrk` per data track. Metered
documents are written at [`ExportConfig::metered_division`] ticks per
quarter note, which must lie in `1..=0x7FFF`; real-time documents at 25 fps with 40 ticks per frame, so one
file tick is one millisecond.

The whole file is encoded in memory. Nothing is returned unless every track
encoded cleanly.
"#]

use crate::{
    WriteError,
    chunk::{ChunkAlign, ChunkWriter},
    destination::ChannelLookup,
    event::{EventBody, TEXT_TRACK_NAME},
    file::{ExportConfig, FormatType, SmfHeader, SmpteFps, Timing, TrackWriter},
    track::{ClockType, EventTrack},
};
use alloc::vec::Vec;
use thiserror::Error;

/// Supplies what [`export_smf`] writes
pub trait ExportSource {
    /// Written as the name of the tempo track
    fn name(&self) -> &str;

    /// Tempo at the start of playback, in thousandths of a BPM
    fn initial_tempo(&self) -> u32;

    /// The tracks to write, each one sorted
    fn data_tracks(&self) -> &[EventTrack];

    /// Resolves the virtual channels of the tracks' events
    fn channels(&self) -> &dyn ChannelLookup;
}

/// Errors that stop an export
#[derive(Debug, Error)]
pub enum ExportError {
    /// A standard MIDI file has a single time base
    #[error("Tracks mix metered and real-time clocks")]
    MixedClockTypes,
    /// More tracks than a header can count
    #[error("{0} tracks don't fit in a MIDI file header")]
    TooManyTracks(usize),
    /// The metered division does not fit the header's 15-bit field
    #[error("Division {0} is outside 1..=32767 ticks per quarter note")]
    InvalidDivision(u16),
    /// An event could not be encoded
    #[error("Encoding: {0}")]
    Write(#[from] WriteError),
    /// The file could not be written
    #[cfg(feature = "std")]
    #[error("Writing file: {0}")]
    Io(#[from] std::io::Error),
}

/// Largest ticks per quarter note a header can hold
pub const MAX_METERED_DIVISION: u16 = 0x7FFF;

/// Division used for real-time documents: -25 fps, 40 ticks per frame
pub const REAL_TIME_TIMING: Timing = Timing::new_smpte(SmpteFps::TwentyFive, 40);

/// Encode `source` as a standard MIDI file
pub fn export_smf<S: ExportSource + ?Sized>(
    source: &S,
    config: &ExportConfig,
) -> Result<Vec<u8>, ExportError> {
    let tracks = source.data_tracks();
    let clock = tracks.first().map_or(ClockType::Metered, EventTrack::clock);
    if tracks.iter().any(|track| track.clock() != clock) {
        return Err(ExportError::MixedClockTypes);
    }
    let timing = match clock {
        ClockType::Metered => match config.metered_division {
            division @ 1..=MAX_METERED_DIVISION => Timing::new_ticks_per_quarter_note(division),
            division => return Err(ExportError::InvalidDivision(division)),
        },
        ClockType::Real => REAL_TIME_TIMING,
    };
    let track_count =
        u16::try_from(tracks.len() + 1).map_err(|_| ExportError::TooManyTracks(tracks.len()))?;

    let mut out = ChunkWriter::new(ChunkAlign::Byte);
    SmfHeader::new(FormatType::Simultaneous, track_count, timing).write(&mut out)?;

    let channels = source.channels();
    let mut tempo_track = TrackWriter::new(&mut out, timing, channels, config.running_status);
    tempo_track.write_track_name(0, source.name())?;
    tempo_track.write_tempo(0, source.initial_tempo())?;
    tempo_track.write_end_of_track(0)?;
    tempo_track.finish()?;

    for track in tracks {
        #[cfg(feature = "tracing")]
        tracing::debug!(track = track.id(), events = track.len(), "encoding track");
        let named = !track.name().is_empty();
        let mut writer = TrackWriter::new(&mut out, timing, channels, config.running_status);
        if named {
            writer.write_track_name(0, track.name())?;
        }
        for event in track.events() {
            // the track's own name replaces any stored name event
            if named
                && matches!(
                    event.body(),
                    EventBody::Text {
                        text_type: TEXT_TRACK_NAME,
                        ..
                    }
                )
            {
                continue;
            }
            writer.write_event(event)?;
        }
        writer.write_end_of_track(track.duration())?;
        writer.finish()?;
    }

    let bytes = out.finish().map_err(WriteError::from)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{destination::DestinationTable, event::Event};
    use alloc::vec;
    use pretty_assertions::assert_eq;

    struct Source {
        tracks: Vec<EventTrack>,
        channels: DestinationTable,
    }

    impl ExportSource for Source {
        fn name(&self) -> &str {
            "Song"
        }
        fn initial_tempo(&self) -> u32 {
            90_000
        }
        fn data_tracks(&self) -> &[EventTrack] {
            &self.tracks
        }
        fn channels(&self) -> &dyn ChannelLookup {
            &self.channels
        }
    }

    #[test]
    fn mixed_clocks_are_rejected() {
        let source = Source {
            tracks: vec![
                EventTrack::new(1, ClockType::Metered),
                EventTrack::new(2, ClockType::Real),
            ],
            channels: DestinationTable::new(),
        };
        assert!(matches!(
            export_smf(&source, &ExportConfig::default()),
            Err(ExportError::MixedClockTypes)
        ));
    }

    #[test]
    fn tempo_track_comes_first() {
        let source = Source {
            tracks: vec![],
            channels: DestinationTable::new(),
        };
        let bytes = export_smf(&source, &ExportConfig::default()).unwrap();
        assert_eq!(&bytes[..14], b"MThd\0\0\0\x06\0\x01\0\x01\x01\xE0");
        assert_eq!(
            &bytes[14..],
            [
                b'M', b'T', b'r', b'k', 0, 0, 0, 19, //
                0x00, 0xFF, 0x03, 0x04, b'S', b'o', b'n', b'g', //
                0x00, 0xFF, 0x51, 0x03, 0x0A, 0x2C, 0x2B, // 666667us
                0x00, 0xFF, 0x2F, 0x00,
            ]
        );
    }

    #[test]
    fn division_must_fit_the_header() {
        let source = Source {
            tracks: vec![EventTrack::new(1, ClockType::Metered)],
            channels: DestinationTable::new(),
        };
        for division in [0, 0x8000, u16::MAX] {
            let config = ExportConfig {
                metered_division: division,
                ..ExportConfig::default()
            };
            assert!(matches!(
                export_smf(&source, &config),
                Err(ExportError::InvalidDivision(d)) if d == division
            ));
        }
        let config = ExportConfig {
            metered_division: MAX_METERED_DIVISION,
            ..ExportConfig::default()
        };
        let bytes = export_smf(&source, &config).unwrap();
        assert_eq!(&bytes[12..14], &[0x7F, 0xFF]);
    }

    #[test]
    fn real_time_documents_use_milliseconds() {
        let mut track = EventTrack::new(1, ClockType::Real);
        track.merge(vec![Event::tempo(1_000, 100_000)]);
        let source = Source {
            tracks: vec![track],
            channels: DestinationTable::new(),
        };
        let bytes = export_smf(&source, &ExportConfig::default()).unwrap();
        assert_eq!(&bytes[12..14], &[0xE7, 0x28]);
        // second track: tempo 1000 ticks after the start
        let track = &bytes[14 + 27..];
        assert_eq!(&track[8..10], &[0x87, 0x68]);
    }
}
