#![doc = r#"
Pull decoder for the body of one `MTrk` chunk.

Each call to [`TrackReader::next_item`] consumes one track event and
translates it into an engine [`Event`], or reports what it skipped. Absolute
times are accumulated in file ticks and converted with the file's [`Timing`].

MIDI channels are translated to virtual channels through the channel map
given to [`TrackReader::new`]: event channel `n` becomes `channel_map[n]`.
"#]

use crate::{
    TrackError,
    event::{DEFAULT_RELEASE_VELOCITY, Event},
    file::Timing,
    message::{
        MetaType, VoiceEvent, VoiceMessage, VoiceStatus, beat_size_from_power, tempo_from_micros,
    },
    reader::{ReadResult, Reader, ReaderError, inv_data},
    vlq::read_vlq,
};

/// Why the reader consumed bytes without producing an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A meta event of a type the event model has no place for
    Meta(u8),
    /// An `F7` escape sequence
    Escape,
    /// A stray system real-time byte (`F8`-`FE`)
    RealTime(u8),
}

/// One decoded track event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackItem {
    /// An event for the engine
    Event(Event),
    /// Bytes that were skipped
    Skipped(SkipReason),
}

/// Decodes the events of one track
#[derive(Debug, Clone)]
pub struct TrackReader<'slc> {
    reader: Reader<'slc>,
    timing: Timing,
    channel_map: [u8; 16],
    running_status: Option<u8>,
    ticks: u64,
    time: i32,
    finished: bool,
}

impl<'slc> TrackReader<'slc> {
    /// Decode `bytes`, the body of an `MTrk` chunk
    pub const fn new(bytes: &'slc [u8], timing: Timing, channel_map: [u8; 16]) -> Self {
        Self {
            reader: Reader::from_byte_slice(bytes),
            timing,
            channel_map,
            running_status: None,
            ticks: 0,
            time: 0,
            finished: false,
        }
    }

    /// Offset of the next byte within the track body
    pub const fn position(&self) -> usize {
        self.reader.buffer_position()
    }

    /// Absolute time of the last event, in file ticks
    pub const fn file_ticks(&self) -> u64 {
        self.ticks
    }

    /// True once an end-of-track meta event was read
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Decode the next event.
    ///
    /// Returns `Ok(None)` at the end of the data or after an end-of-track
    /// meta event.
    pub fn next_item(&mut self) -> ReadResult<Option<TrackItem>> {
        if self.finished || self.reader.is_empty() {
            return Ok(None);
        }
        let delta = read_vlq(&mut self.reader)?;
        self.ticks += delta as u64;
        self.time = self
            .timing
            .to_engine_time(self.ticks)
            .map_err(|e| inv_data(&self.reader, e))?;

        let status_at = self.reader.buffer_position();
        let byte = self.reader.read_u8()?;
        let (status, first) = if byte & 0x80 == 0 {
            match self.running_status {
                Some(status) => (status, Some(byte)),
                None => {
                    return Err(ReaderError::invalid(
                        status_at,
                        TrackError::UnrecognizedStatus(byte).into(),
                    ));
                }
            }
        } else {
            (byte, None)
        };

        if let Some(kind) = VoiceStatus::from_status_byte(status) {
            self.running_status = Some(status);
            return self.read_voice(status, kind, first).map(Some);
        }

        let item = match status {
            0xF0 => {
                self.running_status = None;
                self.read_sysex()?
            }
            0xF7 => {
                self.running_status = None;
                let len = read_vlq(&mut self.reader)?;
                self.reader.skip(len as usize)?;
                TrackItem::Skipped(SkipReason::Escape)
            }
            0xFF => {
                self.running_status = None;
                self.read_meta()?
            }
            0xF8..=0xFE => TrackItem::Skipped(SkipReason::RealTime(status)),
            other => {
                return Err(ReaderError::invalid(
                    status_at,
                    TrackError::UnrecognizedStatus(other).into(),
                ));
            }
        };
        Ok(Some(item))
    }

    fn read_voice(
        &mut self,
        status: u8,
        kind: VoiceStatus,
        first: Option<u8>,
    ) -> ReadResult<TrackItem> {
        let a = match first {
            Some(a) => a,
            None => self.reader.read_u8()?,
        };
        let b = if kind.data_len() == 2 {
            self.reader.read_u8()?
        } else {
            0
        };
        let Some(message) = VoiceMessage::from_status(status, [a & 0x7F, b & 0x7F]) else {
            return Err(inv_data(
                &self.reader,
                TrackError::UnrecognizedStatus(status),
            ));
        };
        Ok(TrackItem::Event(self.voice_event(message)))
    }

    fn voice_event(&self, message: VoiceMessage) -> Event {
        let time = self.time;
        let channel = self.channel_map[message.channel() as usize];
        match *message.event() {
            VoiceEvent::NoteOff { key, velocity } => Event::note_off(time, channel, key, velocity),
            VoiceEvent::NoteOn { key, velocity: 0 } => {
                Event::note_off(time, channel, key, DEFAULT_RELEASE_VELOCITY)
            }
            VoiceEvent::NoteOn { key, velocity } => Event::note(time, 0, channel, key, velocity),
            VoiceEvent::PolyPressure { key, pressure } => {
                Event::poly_aftertouch(time, channel, key, pressure)
            }
            VoiceEvent::Control { controller, value } => {
                // controllers below 32 hold the MSB of a 14-bit value
                let value = if controller < 32 {
                    (value as u16) << 7
                } else {
                    value as u16
                };
                Event::controller(time, channel, controller, value)
            }
            VoiceEvent::Program { program } => Event::program_change(time, channel, program),
            VoiceEvent::ChannelPressure { pressure } => {
                Event::channel_aftertouch(time, channel, pressure)
            }
            VoiceEvent::PitchBend { bend } => Event::pitch_bend(time, channel, bend),
        }
    }

    fn read_sysex(&mut self) -> ReadResult<TrackItem> {
        let len = read_vlq(&mut self.reader)?;
        let mut data = self.reader.read_slice(len as usize)?;
        if let [rest @ .., 0xF7] = data {
            data = rest;
        }
        Ok(TrackItem::Event(Event::sysex(
            self.time,
            self.channel_map[0],
            data,
        )))
    }

    fn read_meta(&mut self) -> ReadResult<TrackItem> {
        let meta_type = self.reader.read_u8()?;
        let len = read_vlq(&mut self.reader)?;
        let payload_at = self.reader.buffer_position();
        let payload = self.reader.read_slice(len as usize)?;
        let short = |expected: u32| {
            ReaderError::invalid(
                payload_at,
                TrackError::MetaLength {
                    meta_type,
                    len,
                    expected,
                }
                .into(),
            )
        };

        let event = match MetaType::try_from(meta_type) {
            _ if MetaType::is_text(meta_type) => Event::text_bytes(self.time, meta_type, payload),
            Ok(MetaType::EndOfTrack) => {
                self.finished = true;
                Event::end_of_track(self.time)
            }
            Ok(MetaType::Tempo) => {
                let &[a, b, c, ..] = payload else {
                    return Err(short(3));
                };
                let micros = u32::from_be_bytes([0, a, b, c]);
                Event::tempo(self.time, tempo_from_micros(micros))
            }
            Ok(MetaType::TimeSignature) => {
                let &[numerator, power, ..] = payload else {
                    return Err(short(2));
                };
                Event::time_sig(self.time, numerator, beat_size_from_power(power))
            }
            _ => {
                #[cfg(feature = "tracing")]
                tracing::debug!(meta_type, len, "skipping meta event");
                return Ok(TrackItem::Skipped(SkipReason::Meta(meta_type)));
            }
        };
        Ok(TrackItem::Event(event))
    }
}

impl Iterator for TrackReader<'_> {
    type Item = ReadResult<TrackItem>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_item().transpose()
    }
}
