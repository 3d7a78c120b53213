#![doc = r#"
Encoder for one `MTrk` chunk.

Events are written in start order. A [`Note`](crate::event::EventKind::Note)
is written as a note-on, and its note-off is queued until the writer passes
its end time. Queued note-offs leave in time order, then in the order their
notes were written, and always ahead of any event at the same time.
"#]

use crate::{
    WriteError,
    chunk::{ChunkLength, ChunkWriter, TRACK_TAG},
    destination::ChannelLookup,
    event::{Event, EventBody},
    file::Timing,
    message::{
        METRONOME_CLOCKS, MetaType, THIRTY_SECONDS_PER_QUARTER, VoiceEvent, VoiceMessage,
        micros_from_tempo, power_from_beat_size,
    },
    vlq::{VLQ_MAX, write_vlq},
};
use alloc::collections::BinaryHeap;
use core::cmp::Reverse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct PendingNoteOff {
    time: i64,
    seq: u64,
    channel: u8,
    pitch: u8,
    velocity: u8,
}

/// Writes the events of one track into an open `MTrk` chunk
pub struct TrackWriter<'w, 'c> {
    out: &'w mut ChunkWriter,
    timing: Timing,
    channels: &'c dyn ChannelLookup,
    use_running_status: bool,
    running_status: Option<u8>,
    last: i64,
    pending: BinaryHeap<Reverse<PendingNoteOff>>,
    seq: u64,
}

impl<'w, 'c> TrackWriter<'w, 'c> {
    /// Open an `MTrk` chunk in `out`.
    ///
    /// Virtual channels are resolved through `channels`; with
    /// `running_status`, repeated channel status bytes are omitted.
    pub fn new(
        out: &'w mut ChunkWriter,
        timing: Timing,
        channels: &'c dyn ChannelLookup,
        running_status: bool,
    ) -> Self {
        out.push(TRACK_TAG, ChunkLength::Unknown);
        Self {
            out,
            timing,
            channels,
            use_running_status: running_status,
            running_status: None,
            last: 0,
            pending: BinaryHeap::new(),
            seq: 0,
        }
    }

    /// Number of note-offs waiting to be written
    pub fn pending_note_offs(&self) -> usize {
        self.pending.len()
    }

    /// Write one event. Kinds that have no SMF form are ignored.
    pub fn write_event(&mut self, event: &Event) -> Result<(), WriteError> {
        let at = event.start() as i64;
        self.flush_note_offs(at)?;
        match event.body() {
            EventBody::Note {
                channel,
                pitch,
                attack_velocity,
                release_velocity,
                duration,
            } => {
                let channel = self.midi_channel(*channel)?;
                self.write_voice(
                    at,
                    channel,
                    VoiceEvent::NoteOn {
                        key: *pitch,
                        velocity: (*attack_velocity).max(1),
                    },
                )?;
                self.pending.push(Reverse(PendingNoteOff {
                    time: at + *duration as i64,
                    seq: self.seq,
                    channel,
                    pitch: *pitch,
                    velocity: *release_velocity,
                }));
                self.seq += 1;
            }
            EventBody::NoteOff {
                channel,
                pitch,
                release_velocity,
            } => {
                let channel = self.midi_channel(*channel)?;
                self.write_voice(
                    at,
                    channel,
                    VoiceEvent::NoteOff {
                        key: *pitch,
                        velocity: *release_velocity,
                    },
                )?;
            }
            EventBody::PolyAftertouch {
                channel,
                pitch,
                pressure,
            } => {
                let channel = self.midi_channel(*channel)?;
                self.write_voice(
                    at,
                    channel,
                    VoiceEvent::PolyPressure {
                        key: *pitch,
                        pressure: *pressure,
                    },
                )?;
            }
            EventBody::ChannelAftertouch { channel, pressure } => {
                let channel = self.midi_channel(*channel)?;
                self.write_voice(
                    at,
                    channel,
                    VoiceEvent::ChannelPressure {
                        pressure: *pressure,
                    },
                )?;
            }
            EventBody::Controller {
                channel,
                controller,
                value,
            } => {
                let channel = self.midi_channel(*channel)?;
                self.write_controller(at, channel, *controller, *value)?;
            }
            EventBody::ProgramChange { channel, program } => {
                let channel = self.midi_channel(*channel)?;
                self.write_voice(at, channel, VoiceEvent::Program { program: *program })?;
            }
            EventBody::PitchBend { channel, bend } => {
                let channel = self.midi_channel(*channel)?;
                self.write_voice(at, channel, VoiceEvent::PitchBend { bend: *bend })?;
            }
            EventBody::SysEx { data, .. } => {
                self.write_delta(at)?;
                self.running_status = None;
                let bytes = data.as_slice();
                let buf = self.out.buffer_mut();
                buf.push(0xF0);
                write_vlq(buf, bytes.len() as u32 + 1)?;
                buf.extend_from_slice(bytes);
                buf.push(0xF7);
            }
            EventBody::Text { text_type, data } => {
                let bytes = data.as_slice();
                let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                self.write_meta(at, *text_type, &bytes[..end])?;
            }
            EventBody::Tempo { tempo } => self.write_tempo(at as i32, *tempo)?,
            EventBody::TimeSig {
                numerator,
                beat_size,
            } => {
                self.write_meta(
                    at,
                    MetaType::TimeSignature.into(),
                    &[
                        *numerator,
                        power_from_beat_size(*beat_size),
                        METRONOME_CLOCKS,
                        THIRTY_SECONDS_PER_QUARTER,
                    ],
                )?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Write a tempo meta event, `tempo` in thousandths of a BPM
    pub fn write_tempo(&mut self, at: i32, tempo: u32) -> Result<(), WriteError> {
        let micros = micros_from_tempo(tempo);
        let [_, a, b, c] = micros.to_be_bytes();
        self.write_meta(at as i64, MetaType::Tempo.into(), &[a, b, c])
    }

    /// Write a track name meta event
    pub fn write_track_name(&mut self, at: i32, name: &str) -> Result<(), WriteError> {
        self.write_meta(at as i64, MetaType::TrackName.into(), name.as_bytes())
    }

    /// Flush every pending note-off, then write the end-of-track meta event
    /// at `at` or at the last written time, whichever is later.
    pub fn write_end_of_track(&mut self, at: i32) -> Result<(), WriteError> {
        self.flush_note_offs(i64::MAX)?;
        let file_at = self.file_time(at as i64).max(self.last);
        self.write_file_delta(file_at)?;
        self.out
            .write_bytes(&[0xFF, MetaType::EndOfTrack.into(), 0x00]);
        Ok(())
    }

    /// Close the `MTrk` chunk
    pub fn finish(self) -> Result<(), WriteError> {
        if !self.pending.is_empty() {
            return Err(WriteError::PendingNoteOffs(self.pending.len()));
        }
        self.out.pop()?;
        Ok(())
    }

    fn midi_channel(&self, destination: u8) -> Result<u8, WriteError> {
        match self.channels.channel_for(destination) {
            Some(channel @ 1..=16) => Ok(channel - 1),
            _ => Err(WriteError::NoChannel(destination)),
        }
    }

    fn flush_note_offs(&mut self, until: i64) -> Result<(), WriteError> {
        while let Some(Reverse(next)) = self.pending.peek().copied() {
            if next.time > until {
                break;
            }
            self.pending.pop();
            self.write_voice(
                next.time,
                next.channel,
                VoiceEvent::NoteOff {
                    key: next.pitch,
                    velocity: next.velocity,
                },
            )?;
        }
        Ok(())
    }

    fn write_controller(
        &mut self,
        at: i64,
        channel: u8,
        controller: u8,
        value: u16,
    ) -> Result<(), WriteError> {
        if controller >= 32 {
            return self.write_voice(
                at,
                channel,
                VoiceEvent::Control {
                    controller,
                    value: value.min(0x7F) as u8,
                },
            );
        }
        let msb = (value >> 7) as u8 & 0x7F;
        let lsb = (value & 0x7F) as u8;
        self.write_voice(
            at,
            channel,
            VoiceEvent::Control {
                controller,
                value: msb,
            },
        )?;
        if lsb != 0 {
            self.write_voice(
                at,
                channel,
                VoiceEvent::Control {
                    controller: controller + 32,
                    value: lsb,
                },
            )?;
        }
        Ok(())
    }

    fn write_voice(&mut self, at: i64, channel: u8, event: VoiceEvent) -> Result<(), WriteError> {
        self.write_delta(at)?;
        let running = if self.use_running_status {
            Some(&mut self.running_status)
        } else {
            None
        };
        VoiceMessage::new(channel, event).encode(self.out.buffer_mut(), running);
        Ok(())
    }

    fn write_meta(&mut self, at: i64, meta_type: u8, payload: &[u8]) -> Result<(), WriteError> {
        self.write_delta(at)?;
        self.running_status = None;
        let buf = self.out.buffer_mut();
        buf.extend_from_slice(&[0xFF, meta_type]);
        write_vlq(buf, payload.len() as u32)?;
        buf.extend_from_slice(payload);
        Ok(())
    }

    fn file_time(&self, engine: i64) -> i64 {
        let engine = engine.clamp(0, i32::MAX as i64) as i32;
        self.timing.from_engine_time(engine) as i64
    }

    fn write_delta(&mut self, at: i64) -> Result<(), WriteError> {
        let file_at = self.file_time(at);
        self.write_file_delta(file_at)
    }

    fn write_file_delta(&mut self, file_at: i64) -> Result<(), WriteError> {
        if file_at < self.last {
            return Err(WriteError::OutOfOrder {
                time: file_at,
                last: self.last,
            });
        }
        let delta = file_at - self.last;
        if delta > VLQ_MAX as i64 {
            return Err(WriteError::VlqOverflow(delta.min(u32::MAX as i64) as u32));
        }
        write_vlq(self.out.buffer_mut(), delta as u32)?;
        self.last = file_at;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkAlign;
    use alloc::vec::Vec;
    use pretty_assertions::assert_eq;

    fn identity(destination: u8) -> Option<u8> {
        (destination < 16).then_some(destination + 1)
    }

    /// Encode `events` into a track body using 480 ticks per quarter
    fn body(events: &[Event], running_status: bool) -> Result<Vec<u8>, WriteError> {
        let mut out = ChunkWriter::new(ChunkAlign::Byte);
        let mut writer = TrackWriter::new(
            &mut out,
            Timing::new_ticks_per_quarter_note(480),
            &identity,
            running_status,
        );
        for event in events {
            writer.write_event(event)?;
        }
        writer.write_end_of_track(0)?;
        writer.finish()?;
        Ok(out.finish()?[8..].to_vec())
    }

    #[test]
    fn note_offs_leave_in_time_order() {
        let bytes = body(
            &[
                Event::note(0, 200, 0, 60, 100),
                Event::note(0, 120, 0, 62, 100),
            ],
            false,
        )
        .unwrap();
        assert_eq!(
            bytes,
            [
                0x00, 0x90, 60, 100, //
                0x00, 0x90, 62, 100, //
                0x3C, 0x80, 62, 64, // t = 60
                0x28, 0x80, 60, 64, // t = 100
                0x00, 0xFF, 0x2F, 0x00,
            ]
        );
    }

    #[test]
    fn shorter_later_note_is_released_first() {
        let bytes = body(
            &[
                Event::note(0, 100, 0, 60, 100),
                Event::note(50, 10, 0, 62, 100),
            ],
            false,
        )
        .unwrap();
        assert_eq!(
            bytes,
            [
                0x00, 0x90, 60, 100, //
                0x19, 0x90, 62, 100, // t = 25
                0x05, 0x80, 62, 64, // t = 30
                0x14, 0x80, 60, 64, // t = 50
                0x00, 0xFF, 0x2F, 0x00,
            ]
        );
    }

    #[test]
    fn note_offs_come_before_events_at_the_same_time() {
        let bytes = body(
            &[
                Event::note(0, 960, 0, 60, 100),
                Event::note(960, 960, 0, 60, 100),
            ],
            true,
        )
        .unwrap();
        assert_eq!(
            bytes,
            [
                0x00, 0x90, 60, 100, //
                0x83, 0x60, 0x80, 60, 64, //
                0x00, 0x90, 60, 100, //
                0x83, 0x60, 0x80, 60, 64, //
                0x00, 0xFF, 0x2F, 0x00,
            ]
        );
    }

    #[test]
    fn running_status_on_output() {
        let events = [
            Event::controller(0, 1, 64, 127),
            Event::controller(0, 1, 64, 0),
        ];
        assert_eq!(
            body(&events, true).unwrap()[..7],
            [0x00, 0xB1, 64, 127, 0x00, 64, 0]
        );
        assert_eq!(
            body(&events, false).unwrap()[..8],
            [0x00, 0xB1, 64, 127, 0x00, 0xB1, 64, 0]
        );
    }

    #[test]
    fn fourteen_bit_controllers() {
        let bytes = body(
            &[
                Event::controller(0, 0, 7, (100 << 7) | 5),
                Event::controller(0, 0, 10, 64 << 7),
            ],
            false,
        )
        .unwrap();
        assert_eq!(
            bytes[..12],
            [0x00, 0xB0, 7, 100, 0x00, 0xB0, 39, 5, 0x00, 0xB0, 10, 64]
        );
        assert_eq!(bytes.len(), 16);
    }

    #[test]
    fn seven_bit_controllers_saturate() {
        let mut sustain = Event::controller(0, 0, 64, 0);
        sustain.set_attribute(crate::event::Attribute::Value, 200);
        let bytes = body(&[sustain, Event::controller(0, 0, 91, 0x3FFF)], false).unwrap();
        assert_eq!(
            bytes,
            [
                0x00, 0xB0, 64, 0x7F, //
                0x00, 0xB0, 91, 0x7F, //
                0x00, 0xFF, 0x2F, 0x00,
            ]
        );
    }

    #[test]
    fn sysex_and_meta_encoding() {
        let bytes = body(
            &[
                Event::sysex(0, 0, &[0x7E, 0x7F]),
                Event::time_sig(0, 6, 8),
                Event::tempo(0, 120_000),
                Event::text(0, 5, "la"),
            ],
            false,
        )
        .unwrap();
        assert_eq!(
            bytes,
            [
                0x00, 0xF0, 0x03, 0x7E, 0x7F, 0xF7, //
                0x00, 0xFF, 0x58, 0x04, 6, 3, 24, 8, //
                0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, //
                0x00, 0xFF, 0x05, 0x02, b'l', b'a', //
                0x00, 0xFF, 0x2F, 0x00,
            ]
        );
    }

    #[test]
    fn unmapped_destination() {
        assert_eq!(
            body(&[Event::program_change(0, 20, 1)], false),
            Err(WriteError::NoChannel(20))
        );
    }

    #[test]
    fn events_must_be_in_order() {
        assert_eq!(
            body(&[Event::end_of_track(0), Event::tempo(960, 1_000), Event::tempo(0, 1_000)], false),
            Err(WriteError::OutOfOrder { time: 0, last: 480 })
        );
    }

    #[test]
    fn finishing_with_pending_note_offs() {
        let mut out = ChunkWriter::new(ChunkAlign::Byte);
        let mut writer = TrackWriter::new(
            &mut out,
            Timing::new_ticks_per_quarter_note(480),
            &identity,
            false,
        );
        writer.write_event(&Event::note(0, 10, 0, 60, 1)).unwrap();
        assert_eq!(writer.pending_note_offs(), 1);
        assert_eq!(writer.finish(), Err(WriteError::PendingNoteOffs(1)));
    }
}
