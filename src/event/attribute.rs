use core::fmt;
use num_enum::{IntoPrimitive, TryFromPrimitive};

#[doc = r#"
A named, integer-valued view of an event's fields.

Editors and the SMF layer use attributes to read and write event fields
without matching on the event's kind. Each attribute has a fixed range;
[`Event::set_attribute`](super::Event::set_attribute) clamps to it.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Attribute {
    /// Start time in engine ticks
    Start = 0,
    /// Duration in engine ticks
    Duration,
    /// Virtual channel (destination id)
    Channel,
    /// Note number
    Pitch,
    /// Note-on velocity
    AttackVelocity,
    /// Note-off velocity
    ReleaseVelocity,
    /// Controller number
    Controller,
    /// Controller or interpolation value
    Value,
    /// Program number
    Program,
    /// Aftertouch pressure
    Pressure,
    /// Pitch bend, 8192 is centered
    Bend,
    /// Text meta type (1 through 15)
    TextType,
    /// Tempo in thousandths of a beat per minute
    Tempo,
    /// Time signature numerator
    Numerator,
    /// Time signature denominator (a power of two)
    BeatSize,
    /// Track referenced by a sequence or branch
    TrackId,
    /// Transposition in semitones
    Transposition,
    /// Repeat count
    RepeatCount,
    /// Channel volume
    Volume,
    /// Editor row
    VPos,
    /// Selection flag, 0 or 1
    Selected,
    /// Playback task id
    Task,
}

impl Attribute {
    /// The inclusive range values are clamped to
    pub const fn range(self) -> (i32, i32) {
        use Attribute::*;
        match self {
            Start => (i32::MIN, i32::MAX),
            Duration => (0, i32::MAX),
            Channel => (0, 63),
            Pitch | ReleaseVelocity | Controller | Program | Pressure | Volume | VPos => (0, 127),
            AttackVelocity => (1, 127),
            Value | Bend => (0, 16383),
            TextType => (1, 15),
            Tempo => (1_000, 1_000_000),
            Numerator => (1, 255),
            BeatSize => (1, 128),
            TrackId | RepeatCount | Task => (0, 65535),
            Transposition => (-127, 127),
            Selected => (0, 1),
        }
    }

    /// Clamp `value` to this attribute's range
    pub const fn clamp(self, value: i32) -> i32 {
        let (min, max) = self.range();
        if value < min {
            min
        } else if value > max {
            max
        } else {
            value
        }
    }

    /// Human readable name
    pub const fn name(self) -> &'static str {
        use Attribute::*;
        match self {
            Start => "Start",
            Duration => "Duration",
            Channel => "Channel",
            Pitch => "Pitch",
            AttackVelocity => "Attack Velocity",
            ReleaseVelocity => "Release Velocity",
            Controller => "Controller",
            Value => "Value",
            Program => "Program",
            Pressure => "Pressure",
            Bend => "Bend",
            TextType => "Text Type",
            Tempo => "Tempo",
            Numerator => "Numerator",
            BeatSize => "Beat Size",
            TrackId => "Track",
            Transposition => "Transposition",
            RepeatCount => "Repeat Count",
            Volume => "Volume",
            VPos => "Vertical Position",
            Selected => "Selected",
            Task => "Task",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
