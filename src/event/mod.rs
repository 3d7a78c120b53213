#![doc = r#"
The sequencer's event model.

An [`Event`] is a start time, a selection flag and an [`EventBody`]: one
variant per [`EventKind`], each holding only the fields that kind needs.
What an event can do is described by its kind's static [`Properties`]; the
[`Attribute`] façade gives integer access to fields across kinds.

Attribute access never fails loudly. Asking for an attribute the kind does not
have returns `-1` from [`Event::attribute`] and `false` from
[`Event::set_attribute`]; values outside an attribute's range are clamped.

# Example
```rust
# use midiseq::prelude::*;
let mut note = Event::note(0, 480, 1, 60, 100);
assert_eq!(note.attribute(Attribute::Pitch), 60);
assert!(note.set_attribute(Attribute::Pitch, 300));
assert_eq!(note.attribute(Attribute::Pitch), 127);

assert_eq!(note.attribute(Attribute::Tempo), -1);
assert!(!note.set_attribute(Attribute::Tempo, 120_000));
```
"#]

mod attribute;
pub use attribute::*;

mod extended;
pub use extended::*;

mod kind;
pub use kind::*;

use alloc::{borrow::Cow, string::String, vec::Vec};

/// Engine ticks per quarter note on metered tracks. Real-time tracks count
/// milliseconds instead.
pub const TICKS_PER_QUARTER: i32 = 960;

/// Default tempo, 120 BPM in thousandths of a BPM
pub const DEFAULT_TEMPO: u32 = 120_000;

/// Release velocity given to notes that were never explicitly released
pub const DEFAULT_RELEASE_VELOCITY: u8 = 64;

/// Pitch bend value meaning "no bend"
pub const PITCH_BEND_CENTER: u16 = 0x2000;

/// Text meta type used for sequence and track names
pub const TEXT_TRACK_NAME: u8 = 0x03;

/// The kind-specific payload of an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum EventBody {
    Note {
        channel: u8,
        pitch: u8,
        attack_velocity: u8,
        release_velocity: u8,
        duration: i32,
    },
    NoteOff {
        channel: u8,
        pitch: u8,
        release_velocity: u8,
    },
    ChannelAftertouch {
        channel: u8,
        pressure: u8,
    },
    PolyAftertouch {
        channel: u8,
        pitch: u8,
        pressure: u8,
    },
    /// `value` is 14-bit for controllers below 32, 7-bit otherwise
    Controller {
        channel: u8,
        controller: u8,
        value: u16,
    },
    ProgramChange {
        channel: u8,
        program: u8,
    },
    PitchBend {
        channel: u8,
        bend: u16,
    },
    SysEx {
        channel: u8,
        data: ExtendedData,
    },
    /// `data` holds the text followed by a NUL byte
    Text {
        text_type: u8,
        data: ExtendedData,
    },
    Tempo {
        tempo: u32,
    },
    TimeSig {
        numerator: u8,
        beat_size: u8,
    },
    Sequence {
        track_id: u16,
        transposition: i8,
        vpos: u8,
        duration: i32,
    },
    Repeat {
        count: u16,
        duration: i32,
    },
    Branch {
        track_id: u16,
    },
    End,
    ChannelTranspose {
        channel: u8,
        transposition: i8,
    },
    ChannelVolume {
        channel: u8,
        volume: u8,
    },
    Interpolate {
        value: u16,
        duration: i32,
    },
    Stop,
    TaskMarker {
        task: u16,
    },
}

impl EventBody {
    /// The default payload for `kind`
    pub fn new(kind: EventKind) -> Self {
        use EventKind as K;
        match kind {
            K::Note => Self::Note {
                channel: 0,
                pitch: 60,
                attack_velocity: 64,
                release_velocity: DEFAULT_RELEASE_VELOCITY,
                duration: 0,
            },
            K::NoteOff => Self::NoteOff {
                channel: 0,
                pitch: 60,
                release_velocity: DEFAULT_RELEASE_VELOCITY,
            },
            K::ChannelAftertouch => Self::ChannelAftertouch {
                channel: 0,
                pressure: 0,
            },
            K::PolyAftertouch => Self::PolyAftertouch {
                channel: 0,
                pitch: 60,
                pressure: 0,
            },
            K::Controller => Self::Controller {
                channel: 0,
                controller: 0,
                value: 0,
            },
            K::ProgramChange => Self::ProgramChange {
                channel: 0,
                program: 0,
            },
            K::PitchBend => Self::PitchBend {
                channel: 0,
                bend: PITCH_BEND_CENTER,
            },
            K::SysEx => Self::SysEx {
                channel: 0,
                data: ExtendedData::default(),
            },
            K::Text => Self::Text {
                text_type: 1,
                data: ExtendedData::from_bytes(&[0]),
            },
            K::Tempo => Self::Tempo {
                tempo: DEFAULT_TEMPO,
            },
            K::TimeSig => Self::TimeSig {
                numerator: 4,
                beat_size: 4,
            },
            K::Sequence => Self::Sequence {
                track_id: 0,
                transposition: 0,
                vpos: 0,
                duration: 0,
            },
            K::Repeat => Self::Repeat {
                count: 2,
                duration: 0,
            },
            K::Branch => Self::Branch { track_id: 0 },
            K::End => Self::End,
            K::ChannelTranspose => Self::ChannelTranspose {
                channel: 0,
                transposition: 0,
            },
            K::ChannelVolume => Self::ChannelVolume {
                channel: 0,
                volume: 100,
            },
            K::Interpolate => Self::Interpolate {
                value: 0,
                duration: 0,
            },
            K::Stop => Self::Stop,
            K::TaskMarker => Self::TaskMarker { task: 0 },
        }
    }

    /// The kind of this payload
    pub const fn kind(&self) -> EventKind {
        use EventKind as K;
        match self {
            Self::Note { .. } => K::Note,
            Self::NoteOff { .. } => K::NoteOff,
            Self::ChannelAftertouch { .. } => K::ChannelAftertouch,
            Self::PolyAftertouch { .. } => K::PolyAftertouch,
            Self::Controller { .. } => K::Controller,
            Self::ProgramChange { .. } => K::ProgramChange,
            Self::PitchBend { .. } => K::PitchBend,
            Self::SysEx { .. } => K::SysEx,
            Self::Text { .. } => K::Text,
            Self::Tempo { .. } => K::Tempo,
            Self::TimeSig { .. } => K::TimeSig,
            Self::Sequence { .. } => K::Sequence,
            Self::Repeat { .. } => K::Repeat,
            Self::Branch { .. } => K::Branch,
            Self::End => K::End,
            Self::ChannelTranspose { .. } => K::ChannelTranspose,
            Self::ChannelVolume { .. } => K::ChannelVolume,
            Self::Interpolate { .. } => K::Interpolate,
            Self::Stop => K::Stop,
            Self::TaskMarker { .. } => K::TaskMarker,
        }
    }

    fn extended(&self) -> Option<&ExtendedData> {
        match self {
            Self::SysEx { data, .. } | Self::Text { data, .. } => Some(data),
            _ => None,
        }
    }

    fn extended_mut(&mut self) -> Option<&mut ExtendedData> {
        match self {
            Self::SysEx { data, .. } | Self::Text { data, .. } => Some(data),
            _ => None,
        }
    }
}

const fn non_negative(duration: i32) -> i32 {
    if duration < 0 { 0 } else { duration }
}

/// A single event in a track.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    start: i32,
    selected: bool,
    body: EventBody,
}

impl Event {
    /// Create an event from a start time and payload
    pub const fn new(start: i32, body: EventBody) -> Self {
        Self {
            start,
            selected: false,
            body,
        }
    }

    /// A note with the default release velocity. A negative duration
    /// becomes 0.
    pub const fn note(start: i32, duration: i32, channel: u8, pitch: u8, velocity: u8) -> Self {
        Self::new(
            start,
            EventBody::Note {
                channel,
                pitch,
                attack_velocity: velocity,
                release_velocity: DEFAULT_RELEASE_VELOCITY,
                duration: non_negative(duration),
            },
        )
    }

    /// A bare note-off
    pub const fn note_off(start: i32, channel: u8, pitch: u8, release_velocity: u8) -> Self {
        Self::new(
            start,
            EventBody::NoteOff {
                channel,
                pitch,
                release_velocity,
            },
        )
    }

    /// A control change
    pub const fn controller(start: i32, channel: u8, controller: u8, value: u16) -> Self {
        Self::new(
            start,
            EventBody::Controller {
                channel,
                controller,
                value,
            },
        )
    }

    /// A program change
    pub const fn program_change(start: i32, channel: u8, program: u8) -> Self {
        Self::new(start, EventBody::ProgramChange { channel, program })
    }

    /// A pitch bend, `bend` in 0..=16383
    pub const fn pitch_bend(start: i32, channel: u8, bend: u16) -> Self {
        Self::new(start, EventBody::PitchBend { channel, bend })
    }

    /// Channel pressure
    pub const fn channel_aftertouch(start: i32, channel: u8, pressure: u8) -> Self {
        Self::new(start, EventBody::ChannelAftertouch { channel, pressure })
    }

    /// Polyphonic key pressure
    pub const fn poly_aftertouch(start: i32, channel: u8, pitch: u8, pressure: u8) -> Self {
        Self::new(
            start,
            EventBody::PolyAftertouch {
                channel,
                pitch,
                pressure,
            },
        )
    }

    /// A system exclusive message. `bytes` excludes the `F0`/`F7` framing.
    pub fn sysex(start: i32, channel: u8, bytes: &[u8]) -> Self {
        Self::new(
            start,
            EventBody::SysEx {
                channel,
                data: ExtendedData::from_bytes(bytes),
            },
        )
    }

    /// A text event, stored NUL-terminated
    pub fn text(start: i32, text_type: u8, text: &str) -> Self {
        Self::text_bytes(start, text_type, text.as_bytes())
    }

    /// A text event from raw bytes, stored NUL-terminated
    pub fn text_bytes(start: i32, text_type: u8, bytes: &[u8]) -> Self {
        let mut buf = Vec::with_capacity(bytes.len() + 1);
        buf.extend_from_slice(bytes);
        buf.push(0);
        Self::new(
            start,
            EventBody::Text {
                text_type,
                data: buf.into(),
            },
        )
    }

    /// A tempo change in thousandths of a BPM, clamped to the
    /// [`Attribute::Tempo`] range
    pub const fn tempo(start: i32, tempo: u32) -> Self {
        let (min, max) = Attribute::Tempo.range();
        let tempo = if tempo < min as u32 {
            min as u32
        } else if tempo > max as u32 {
            max as u32
        } else {
            tempo
        };
        Self::new(start, EventBody::Tempo { tempo })
    }

    /// A time signature; `beat_size` is the denominator (4 for quarter notes)
    pub const fn time_sig(start: i32, numerator: u8, beat_size: u8) -> Self {
        Self::new(
            start,
            EventBody::TimeSig {
                numerator,
                beat_size,
            },
        )
    }

    /// Plays track `track_id` for `duration`
    pub const fn sequence(start: i32, duration: i32, track_id: u16, vpos: u8) -> Self {
        Self::new(
            start,
            EventBody::Sequence {
                track_id,
                transposition: 0,
                vpos,
                duration: non_negative(duration),
            },
        )
    }

    /// End of track marker
    pub const fn end_of_track(start: i32) -> Self {
        Self::new(start, EventBody::End)
    }

    /// Start time in engine ticks
    pub const fn start(&self) -> i32 {
        self.start
    }

    /// Move the event
    pub fn set_start(&mut self, start: i32) {
        self.start = start;
    }

    /// The payload
    pub const fn body(&self) -> &EventBody {
        &self.body
    }

    /// The payload, mutably
    pub fn body_mut(&mut self) -> &mut EventBody {
        &mut self.body
    }

    /// The event's kind
    pub const fn kind(&self) -> EventKind {
        self.body.kind()
    }

    /// Change the event's kind.
    ///
    /// The payload is replaced by the new kind's default, which releases any
    /// extended data the old payload held. Start time, selection, and the
    /// channel and duration (when both kinds have them) are kept.
    pub fn set_kind(&mut self, kind: EventKind) {
        if kind == self.kind() {
            return;
        }
        let channel = self.channel();
        let duration = self.duration();
        self.body = EventBody::new(kind);
        if let Some(channel) = channel {
            self.set_channel(channel);
        }
        self.set_duration(duration);
    }

    /// True if the event is selected in an editor
    pub const fn is_selected(&self) -> bool {
        self.selected
    }

    /// Select or deselect the event
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// The command byte: kind plus selection flag
    pub const fn command_byte(&self) -> u8 {
        command_byte(self.kind(), self.selected)
    }

    /// The static properties of this event's kind
    pub const fn properties(&self) -> Properties {
        self.kind().properties()
    }

    /// True if every flag in `mask` applies to this event
    pub const fn has_property(&self, mask: Properties) -> bool {
        self.kind().has_property(mask)
    }

    /// Duration in engine ticks, 0 for kinds without one
    pub const fn duration(&self) -> i32 {
        match self.body {
            EventBody::Note { duration, .. }
            | EventBody::Sequence { duration, .. }
            | EventBody::Repeat { duration, .. }
            | EventBody::Interpolate { duration, .. } => duration,
            _ => 0,
        }
    }

    /// Set the duration (negative values become 0). Returns false if the
    /// kind has no duration.
    pub fn set_duration(&mut self, value: i32) -> bool {
        match &mut self.body {
            EventBody::Note { duration, .. }
            | EventBody::Sequence { duration, .. }
            | EventBody::Repeat { duration, .. }
            | EventBody::Interpolate { duration, .. } => {
                *duration = value.max(0);
                true
            }
            _ => false,
        }
    }

    /// `start + duration`, widened so it cannot overflow
    pub const fn end(&self) -> i64 {
        self.start as i64 + self.duration() as i64
    }

    /// The virtual channel (destination id), if the kind has one
    pub const fn channel(&self) -> Option<u8> {
        use EventBody as B;
        match self.body {
            B::Note { channel, .. }
            | B::NoteOff { channel, .. }
            | B::ChannelAftertouch { channel, .. }
            | B::PolyAftertouch { channel, .. }
            | B::Controller { channel, .. }
            | B::ProgramChange { channel, .. }
            | B::PitchBend { channel, .. }
            | B::SysEx { channel, .. }
            | B::ChannelTranspose { channel, .. }
            | B::ChannelVolume { channel, .. } => Some(channel),
            _ => None,
        }
    }

    /// Set the virtual channel. Returns false if the kind has no channel.
    pub fn set_channel(&mut self, value: u8) -> bool {
        self.set_attribute(Attribute::Channel, value as i32)
    }

    /// Number of extended data bytes, 0 for kinds without extended data
    pub fn extended_data_size(&self) -> usize {
        self.body.extended().map_or(0, ExtendedData::len)
    }

    /// Resize the extended data. Returns false if the kind has none.
    pub fn set_extended_data_size(&mut self, len: usize) -> bool {
        match self.body.extended_mut() {
            Some(data) => {
                data.set_len(len);
                true
            }
            None => false,
        }
    }

    /// The extended data bytes
    pub fn extended_data(&self) -> Option<&[u8]> {
        self.body.extended().map(ExtendedData::as_slice)
    }

    /// The extended data bytes, mutably. Shared buffers are copied first.
    pub fn extended_data_mut(&mut self) -> Option<&mut [u8]> {
        self.body.extended_mut().map(ExtendedData::as_mut_slice)
    }

    /// How many events share this event's extended data buffer
    pub fn extended_data_use_count(&self) -> Option<usize> {
        self.body.extended().map(ExtendedData::use_count)
    }

    /// The text of a [`Text`](EventKind::Text) event, without its NUL terminator
    pub fn text_content(&self) -> Option<Cow<'_, str>> {
        let EventBody::Text { data, .. } = &self.body else {
            return None;
        };
        let bytes = data.as_slice();
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Some(String::from_utf8_lossy(&bytes[..end]))
    }

    /// True if the event has `attr`
    pub fn has_attribute(&self, attr: Attribute) -> bool {
        self.try_attribute(attr).is_some()
    }

    /// The value of `attr`, or `-1` if the kind does not have it.
    ///
    /// Attributes such as [`Attribute::Transposition`] can legitimately be
    /// `-1`; check [`Event::has_attribute`] or use [`Event::try_attribute`]
    /// when that matters.
    pub fn attribute(&self, attr: Attribute) -> i32 {
        self.try_attribute(attr).unwrap_or(-1)
    }

    /// The value of `attr`, if the kind has it
    pub fn try_attribute(&self, attr: Attribute) -> Option<i32> {
        use Attribute as A;
        use EventBody as B;
        match attr {
            A::Start => return Some(self.start),
            A::Selected => return Some(self.selected as i32),
            A::Duration => {
                return self
                    .has_property(Properties::DURATION)
                    .then_some(self.duration());
            }
            A::Channel => return self.channel().map(i32::from),
            _ => {}
        }
        let value = match (&self.body, attr) {
            (
                B::Note { pitch, .. } | B::NoteOff { pitch, .. } | B::PolyAftertouch { pitch, .. },
                A::Pitch | A::VPos,
            ) => *pitch as i32,
            (B::Note {
                attack_velocity, ..
            }, A::AttackVelocity) => *attack_velocity as i32,
            (
                B::Note {
                    release_velocity, ..
                }
                | B::NoteOff {
                    release_velocity, ..
                },
                A::ReleaseVelocity,
            ) => *release_velocity as i32,
            (B::Controller { controller, .. }, A::Controller | A::VPos) => *controller as i32,
            (B::Controller { value, .. } | B::Interpolate { value, .. }, A::Value) => {
                *value as i32
            }
            (B::ProgramChange { program, .. }, A::Program) => *program as i32,
            (
                B::ChannelAftertouch { pressure, .. } | B::PolyAftertouch { pressure, .. },
                A::Pressure,
            ) => *pressure as i32,
            (B::PitchBend { bend, .. }, A::Bend) => *bend as i32,
            (B::Text { text_type, .. }, A::TextType) => *text_type as i32,
            (B::Tempo { tempo }, A::Tempo) => *tempo as i32,
            (B::TimeSig { numerator, .. }, A::Numerator) => *numerator as i32,
            (B::TimeSig { beat_size, .. }, A::BeatSize) => *beat_size as i32,
            (B::Sequence { track_id, .. } | B::Branch { track_id }, A::TrackId) => {
                *track_id as i32
            }
            (
                B::Sequence { transposition, .. } | B::ChannelTranspose { transposition, .. },
                A::Transposition,
            ) => *transposition as i32,
            (B::Sequence { vpos, .. }, A::VPos) => *vpos as i32,
            (B::Repeat { count, .. }, A::RepeatCount) => *count as i32,
            (B::ChannelVolume { volume, .. }, A::Volume) => *volume as i32,
            (B::TaskMarker { task }, A::Task) => *task as i32,
            _ => return None,
        };
        Some(value)
    }

    /// Set `attr`, clamped to its range.
    ///
    /// Returns false, leaving the event untouched, if the kind does not have
    /// the attribute.
    pub fn set_attribute(&mut self, attr: Attribute, value: i32) -> bool {
        use Attribute as A;
        use EventBody as B;
        let v = attr.clamp(value);
        match attr {
            A::Start => {
                self.start = v;
                return true;
            }
            A::Selected => {
                self.selected = v != 0;
                return true;
            }
            A::Duration => return self.set_duration(v),
            _ => {}
        }
        match (&mut self.body, attr) {
            (
                B::Note { channel, .. }
                | B::NoteOff { channel, .. }
                | B::ChannelAftertouch { channel, .. }
                | B::PolyAftertouch { channel, .. }
                | B::Controller { channel, .. }
                | B::ProgramChange { channel, .. }
                | B::PitchBend { channel, .. }
                | B::SysEx { channel, .. }
                | B::ChannelTranspose { channel, .. }
                | B::ChannelVolume { channel, .. },
                A::Channel,
            ) => *channel = v as u8,
            (
                B::Note { pitch, .. } | B::NoteOff { pitch, .. } | B::PolyAftertouch { pitch, .. },
                A::Pitch | A::VPos,
            ) => *pitch = v as u8,
            (B::Note {
                attack_velocity, ..
            }, A::AttackVelocity) => *attack_velocity = v as u8,
            (
                B::Note {
                    release_velocity, ..
                }
                | B::NoteOff {
                    release_velocity, ..
                },
                A::ReleaseVelocity,
            ) => *release_velocity = v as u8,
            (B::Controller { controller, .. }, A::Controller | A::VPos) => *controller = v as u8,
            (B::Controller { value, .. } | B::Interpolate { value, .. }, A::Value) => {
                *value = v as u16
            }
            (B::ProgramChange { program, .. }, A::Program) => *program = v as u8,
            (
                B::ChannelAftertouch { pressure, .. } | B::PolyAftertouch { pressure, .. },
                A::Pressure,
            ) => *pressure = v as u8,
            (B::PitchBend { bend, .. }, A::Bend) => *bend = v as u16,
            (B::Text { text_type, .. }, A::TextType) => *text_type = v as u8,
            (B::Tempo { tempo }, A::Tempo) => *tempo = v as u32,
            (B::TimeSig { numerator, .. }, A::Numerator) => *numerator = v as u8,
            (B::TimeSig { beat_size, .. }, A::BeatSize) => *beat_size = v as u8,
            (B::Sequence { track_id, .. } | B::Branch { track_id }, A::TrackId) => {
                *track_id = v as u16
            }
            (
                B::Sequence { transposition, .. } | B::ChannelTranspose { transposition, .. },
                A::Transposition,
            ) => *transposition = v as i8,
            (B::Sequence { vpos, .. }, A::VPos) => *vpos = v as u8,
            (B::Repeat { count, .. }, A::RepeatCount) => *count = v as u16,
            (B::ChannelVolume { volume, .. }, A::Volume) => *volume = v as u8,
            (B::TaskMarker { task }, A::Task) => *task = v as u16,
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn attributes_follow_the_kind() {
        let event = Event::controller(10, 3, 7, 0x1234);
        assert_eq!(event.attribute(Attribute::Controller), 7);
        assert_eq!(event.attribute(Attribute::Value), 0x1234);
        assert_eq!(event.attribute(Attribute::Channel), 3);
        assert_eq!(event.attribute(Attribute::Start), 10);
        assert_eq!(event.attribute(Attribute::Pitch), -1);
        assert!(!event.has_attribute(Attribute::Duration));
    }

    #[test]
    fn set_attribute_clamps() {
        let mut event = Event::pitch_bend(0, 0, PITCH_BEND_CENTER);
        assert!(event.set_attribute(Attribute::Bend, 20_000));
        assert_eq!(event.attribute(Attribute::Bend), 16383);
        assert!(event.set_attribute(Attribute::Channel, -5));
        assert_eq!(event.channel(), Some(0));

        let mut note = Event::note(0, 10, 0, 60, 100);
        assert!(note.set_attribute(Attribute::AttackVelocity, 0));
        assert_eq!(note.attribute(Attribute::AttackVelocity), 1);
        assert!(note.set_attribute(Attribute::Duration, -20));
        assert_eq!(note.duration(), 0);
    }

    #[test]
    fn wrong_kind_is_a_sentinel_not_an_error() {
        let mut tempo = Event::tempo(0, 120_000);
        assert!(!tempo.set_attribute(Attribute::Pitch, 60));
        assert_eq!(tempo.attribute(Attribute::Channel), -1);
        assert_eq!(tempo, Event::tempo(0, 120_000));
    }

    #[test]
    fn changing_kind_releases_extended_data() {
        let mut sysex = Event::sysex(5, 2, &[0x7E, 0x7F, 0x09, 0x01]);
        let copy = sysex.clone();
        assert_eq!(copy.extended_data_use_count(), Some(2));

        sysex.set_kind(EventKind::ProgramChange);
        assert_eq!(copy.extended_data_use_count(), Some(1));
        assert_eq!(sysex.extended_data(), None);
        assert_eq!(sysex.channel(), Some(2));
        assert_eq!(sysex.start(), 5);
        assert!(!sysex.set_extended_data_size(4));
    }

    #[test]
    fn selection_survives_kind_changes() {
        let mut event = Event::note(0, 100, 1, 64, 90);
        event.set_selected(true);
        event.set_kind(EventKind::Sequence);
        assert!(event.is_selected());
        assert_eq!(event.duration(), 100);
        assert_eq!(event.command_byte(), 0x80 | 0x40 | EventKind::Sequence.code());
    }

    #[test]
    fn text_is_nul_terminated() {
        let event = Event::text(0, TEXT_TRACK_NAME, "Piano");
        assert_eq!(event.extended_data(), Some(&b"Piano\0"[..]));
        assert_eq!(event.text_content().unwrap(), "Piano");
        assert_eq!(event.attribute(Attribute::TextType), 3);
    }

    #[test]
    fn extended_data_resizes() {
        let mut event = Event::sysex(0, 0, &[1, 2]);
        assert!(event.set_extended_data_size(5));
        assert_eq!(event.extended_data_size(), 5);
        event.extended_data_mut().unwrap()[4] = 9;
        assert_eq!(event.extended_data(), Some(&[1, 2, 0, 0, 9][..]));
    }

    #[test]
    fn constructors_stay_in_range() {
        assert_eq!(Event::note(0, -5, 0, 60, 100).duration(), 0);
        assert_eq!(Event::sequence(0, i32::MIN, 1, 0).duration(), 0);
        assert_eq!(Event::tempo(0, u32::MAX).attribute(Attribute::Tempo), 1_000_000);
        assert_eq!(Event::tempo(0, 1).attribute(Attribute::Tempo), 1_000);
    }
}
