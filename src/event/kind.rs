use bitflags::bitflags;
use core::fmt;
use num_enum::{IntoPrimitive, TryFromPrimitive};

bitflags! {
    /// Static capabilities of an [`EventKind`].
    ///
    /// These govern which accessors are meaningful for an event and how it
    /// is serialized.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Properties: u8 {
        /// The event is routed to a virtual channel (destination)
        const CHANNEL = 1 << 0;
        /// The event spans time
        const DURATION = 1 << 1;
        /// The event corresponds to a MIDI message sent to a port
        const MIDI = 1 << 2;
        /// The event has a vertical position in an editor (pitch, controller...)
        const VPOS = 1 << 3;
        /// The event owns a variable-length buffer (sysex bytes, text)
        const EXTENDED = 1 << 4;
    }
}

#[doc = r#"
Every kind of event a track can hold.

The discriminant is the kind's command code, stored in bits 0..=5 of the
command byte. Bit 6 of the command byte is the selection flag and bit 7 is
always set when the byte is serialized.

# Example
```rust
# use midiseq::prelude::*;
assert!(EventKind::Note.has_property(Properties::DURATION));
assert!(!EventKind::Tempo.has_property(Properties::CHANNEL));
assert_eq!(EventKind::try_from(5u8).unwrap(), EventKind::Controller);
```
"#]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, TryFromPrimitive, IntoPrimitive,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum EventKind {
    /// A note with a duration
    Note = 1,
    /// A bare note-off, only seen transiently while importing
    NoteOff = 2,
    /// Channel pressure
    ChannelAftertouch = 3,
    /// Polyphonic key pressure
    PolyAftertouch = 4,
    /// Control change, 14-bit for controllers below 32
    Controller = 5,
    /// Program change
    ProgramChange = 6,
    /// Pitch bend, 14-bit
    PitchBend = 7,
    /// System exclusive message
    SysEx = 8,
    /// Text meta event
    Text = 9,
    /// Tempo change
    Tempo = 10,
    /// Time signature
    TimeSig = 11,
    /// Plays another track
    Sequence = 12,
    /// Repeats the enclosed span
    Repeat = 13,
    /// Jumps to another track
    Branch = 14,
    /// Marks the end of a track
    End = 15,
    /// Transposes a channel
    ChannelTranspose = 16,
    /// Sets a channel's volume
    ChannelVolume = 17,
    /// Interpolation marker used during playback
    Interpolate = 18,
    /// Stops playback
    Stop = 19,
    /// Marker for a playback task
    TaskMarker = 20,
}

impl EventKind {
    /// All kinds in command order
    pub const ALL: [EventKind; 20] = {
        use EventKind::*;
        [
            Note,
            NoteOff,
            ChannelAftertouch,
            PolyAftertouch,
            Controller,
            ProgramChange,
            PitchBend,
            SysEx,
            Text,
            Tempo,
            TimeSig,
            Sequence,
            Repeat,
            Branch,
            End,
            ChannelTranspose,
            ChannelVolume,
            Interpolate,
            Stop,
            TaskMarker,
        ]
    };

    /// The static property mask of this kind
    pub const fn properties(self) -> Properties {
        use EventKind::*;
        const C: u8 = Properties::CHANNEL.bits();
        const D: u8 = Properties::DURATION.bits();
        const M: u8 = Properties::MIDI.bits();
        const V: u8 = Properties::VPOS.bits();
        const X: u8 = Properties::EXTENDED.bits();
        let bits = match self {
            Note => C | D | M | V,
            NoteOff | PolyAftertouch | Controller => C | M | V,
            ChannelAftertouch | ProgramChange | PitchBend => C | M,
            SysEx => C | M | X,
            Text => X,
            Tempo | TimeSig | Branch | End | Stop | TaskMarker => 0,
            Sequence => D | V,
            Repeat | Interpolate => D,
            ChannelTranspose | ChannelVolume => C,
        };
        Properties::from_bits_truncate(bits)
    }

    /// True if every flag in `mask` is set for this kind
    pub const fn has_property(self, mask: Properties) -> bool {
        self.properties().contains(mask)
    }

    /// The command code
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Human readable name
    pub const fn name(self) -> &'static str {
        use EventKind::*;
        match self {
            Note => "Note",
            NoteOff => "Note Off",
            ChannelAftertouch => "Channel Aftertouch",
            PolyAftertouch => "Polyphonic Aftertouch",
            Controller => "Controller",
            ProgramChange => "Program Change",
            PitchBend => "Pitch Bend",
            SysEx => "System Exclusive",
            Text => "Text",
            Tempo => "Tempo",
            TimeSig => "Time Signature",
            Sequence => "Sequence",
            Repeat => "Repeat",
            Branch => "Branch",
            End => "End",
            ChannelTranspose => "Channel Transpose",
            ChannelVolume => "Channel Volume",
            Interpolate => "Interpolate",
            Stop => "Stop",
            TaskMarker => "Task Marker",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bit 7: set on every serialized command byte
pub const COMMAND_MARKER: u8 = 0x80;
/// Bit 6: the event is selected
pub const SELECTED_BIT: u8 = 0x40;
/// Bits 0..=5: the kind
pub const KIND_MASK: u8 = 0x3F;

/// Pack a kind and selection flag into a command byte
pub const fn command_byte(kind: EventKind, selected: bool) -> u8 {
    COMMAND_MARKER | if selected { SELECTED_BIT } else { 0 } | kind.code()
}

/// Split a command byte into its kind and selection flag.
///
/// Returns the raw kind code when it is not a known [`EventKind`].
pub fn split_command_byte(byte: u8) -> Result<(EventKind, bool), u8> {
    let code = byte & KIND_MASK;
    let kind = EventKind::try_from(code).map_err(|_| code)?;
    Ok((kind, byte & SELECTED_BIT != 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn codes_fit_the_kind_mask() {
        for kind in EventKind::ALL {
            assert_eq!(kind.code() & !KIND_MASK, 0);
            assert_eq!(EventKind::try_from(kind.code()).unwrap(), kind);
        }
    }

    #[test]
    fn command_byte_keeps_selection_orthogonal() {
        let byte = command_byte(EventKind::Note, true);
        assert_eq!(byte, 0x80 | 0x40 | 1);
        assert_eq!(split_command_byte(byte), Ok((EventKind::Note, true)));
        assert_eq!(
            split_command_byte(command_byte(EventKind::TaskMarker, false)),
            Ok((EventKind::TaskMarker, false))
        );
        assert_eq!(split_command_byte(0x80 | 0x3F), Err(0x3F));
    }

    #[test]
    fn property_table() {
        assert!(EventKind::Note.has_property(Properties::CHANNEL | Properties::DURATION));
        assert!(!EventKind::NoteOff.has_property(Properties::DURATION));
        assert!(EventKind::SysEx.has_property(Properties::EXTENDED | Properties::MIDI));
        assert!(EventKind::Text.has_property(Properties::EXTENDED));
        assert!(!EventKind::Text.has_property(Properties::MIDI));
        assert!(EventKind::Sequence.has_property(Properties::VPOS));
        assert_eq!(EventKind::End.properties(), Properties::empty());
    }
}
