#![doc = r#"
Raw MIDI messages as they appear on the wire.

# Hierarchy
```text
             |---------------|
             | Track Message |
             |---------------|
            /        |        \
|---------------| |-------| |------|
| Voice Message | | SysEx | | Meta |
|---------------| |-------| |------|
```

Voice messages carry a channel nibble and one or two data bytes. The SMF
track reader decodes them into [`VoiceMessage`]s before translating them into
engine [`Event`](crate::event::Event)s, and the track writer goes the other
way.
"#]

mod meta;
pub use meta::*;

use alloc::vec::Vec;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The high nibble of a channel voice status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum VoiceStatus {
    /// `0x8n`
    NoteOff = 0x8,
    /// `0x9n`
    NoteOn = 0x9,
    /// `0xAn`
    PolyPressure = 0xA,
    /// `0xBn`
    Control = 0xB,
    /// `0xCn`
    Program = 0xC,
    /// `0xDn`
    ChannelPressure = 0xD,
    /// `0xEn`
    PitchBend = 0xE,
}

impl VoiceStatus {
    /// Classify a status byte. `None` for anything outside `0x80..=0xEF`.
    pub fn from_status_byte(status: u8) -> Option<Self> {
        Self::try_from(status >> 4).ok()
    }

    /// Number of data bytes following the status
    pub const fn data_len(self) -> usize {
        match self {
            Self::Program | Self::ChannelPressure => 1,
            _ => 2,
        }
    }
}

/// The payload of a channel voice message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum VoiceEvent {
    NoteOff { key: u8, velocity: u8 },
    NoteOn { key: u8, velocity: u8 },
    PolyPressure { key: u8, pressure: u8 },
    Control { controller: u8, value: u8 },
    Program { program: u8 },
    ChannelPressure { pressure: u8 },
    /// 14-bit, 0x2000 is centered
    PitchBend { bend: u16 },
}

/// A channel voice message on a MIDI channel (0-15)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceMessage {
    channel: u8,
    event: VoiceEvent,
}

impl VoiceMessage {
    /// Create a message; the channel is masked to 0-15 and data bytes to
    /// 7 bits when encoded.
    pub const fn new(channel: u8, event: VoiceEvent) -> Self {
        Self {
            channel: channel & 0x0F,
            event,
        }
    }

    /// Build a message from a status byte and its data bytes.
    ///
    /// `data[1]` is ignored for one-byte messages.
    pub fn from_status(status: u8, data: [u8; 2]) -> Option<Self> {
        let kind = VoiceStatus::from_status_byte(status)?;
        let [a, b] = data;
        let event = match kind {
            VoiceStatus::NoteOff => VoiceEvent::NoteOff {
                key: a,
                velocity: b,
            },
            VoiceStatus::NoteOn => VoiceEvent::NoteOn {
                key: a,
                velocity: b,
            },
            VoiceStatus::PolyPressure => VoiceEvent::PolyPressure {
                key: a,
                pressure: b,
            },
            VoiceStatus::Control => VoiceEvent::Control {
                controller: a,
                value: b,
            },
            VoiceStatus::Program => VoiceEvent::Program { program: a },
            VoiceStatus::ChannelPressure => VoiceEvent::ChannelPressure { pressure: a },
            VoiceStatus::PitchBend => VoiceEvent::PitchBend {
                bend: (a & 0x7F) as u16 | ((b & 0x7F) as u16) << 7,
            },
        };
        Some(Self::new(status & 0x0F, event))
    }

    /// The channel nibble
    pub const fn channel(&self) -> u8 {
        self.channel
    }

    /// The payload
    pub const fn event(&self) -> &VoiceEvent {
        &self.event
    }

    /// The status byte
    pub const fn status(&self) -> u8 {
        let nibble = match self.event {
            VoiceEvent::NoteOff { .. } => VoiceStatus::NoteOff,
            VoiceEvent::NoteOn { .. } => VoiceStatus::NoteOn,
            VoiceEvent::PolyPressure { .. } => VoiceStatus::PolyPressure,
            VoiceEvent::Control { .. } => VoiceStatus::Control,
            VoiceEvent::Program { .. } => VoiceStatus::Program,
            VoiceEvent::ChannelPressure { .. } => VoiceStatus::ChannelPressure,
            VoiceEvent::PitchBend { .. } => VoiceStatus::PitchBend,
        };
        (nibble as u8) << 4 | self.channel
    }

    /// Append the message to `out`.
    ///
    /// When `running_status` holds this message's status byte, the status is
    /// omitted. `running_status` is updated either way.
    pub fn encode(&self, out: &mut Vec<u8>, running_status: Option<&mut Option<u8>>) {
        let status = self.status();
        match running_status {
            Some(latched) if *latched == Some(status) => {}
            Some(latched) => {
                *latched = Some(status);
                out.push(status);
            }
            None => out.push(status),
        }
        match self.event {
            VoiceEvent::NoteOff { key, velocity } | VoiceEvent::NoteOn { key, velocity } => {
                out.extend_from_slice(&[key & 0x7F, velocity & 0x7F])
            }
            VoiceEvent::PolyPressure { key, pressure } => {
                out.extend_from_slice(&[key & 0x7F, pressure & 0x7F])
            }
            VoiceEvent::Control { controller, value } => {
                out.extend_from_slice(&[controller & 0x7F, value & 0x7F])
            }
            VoiceEvent::Program { program } => out.push(program & 0x7F),
            VoiceEvent::ChannelPressure { pressure } => out.push(pressure & 0x7F),
            VoiceEvent::PitchBend { bend } => {
                out.extend_from_slice(&[(bend & 0x7F) as u8, ((bend >> 7) & 0x7F) as u8])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use pretty_assertions::assert_eq;

    #[test]
    fn data_lengths() {
        assert_eq!(VoiceStatus::from_status_byte(0xC3).unwrap().data_len(), 1);
        assert_eq!(VoiceStatus::from_status_byte(0xD0).unwrap().data_len(), 1);
        assert_eq!(VoiceStatus::from_status_byte(0x9F).unwrap().data_len(), 2);
        assert_eq!(VoiceStatus::from_status_byte(0xF0), None);
        assert_eq!(VoiceStatus::from_status_byte(0x40), None);
    }

    #[test]
    fn pitch_bend_is_split_seven_seven() {
        let msg = VoiceMessage::from_status(0xE2, [0x7F, 0x3F]).unwrap();
        assert_eq!(msg.channel(), 2);
        assert_eq!(msg.event(), &VoiceEvent::PitchBend { bend: 0x1FFF });
        let mut out = Vec::new();
        msg.encode(&mut out, None);
        assert_eq!(out, vec![0xE2, 0x7F, 0x3F]);
    }

    #[test]
    fn running_status_omits_repeated_status() {
        let mut latched = None;
        let mut out = Vec::new();
        let a = VoiceMessage::new(0, VoiceEvent::NoteOn { key: 60, velocity: 64 });
        let b = VoiceMessage::new(0, VoiceEvent::NoteOn { key: 62, velocity: 70 });
        let c = VoiceMessage::new(1, VoiceEvent::NoteOn { key: 64, velocity: 1 });
        a.encode(&mut out, Some(&mut latched));
        b.encode(&mut out, Some(&mut latched));
        c.encode(&mut out, Some(&mut latched));
        assert_eq!(out, vec![0x90, 60, 64, 62, 70, 0x91, 64, 1]);
    }
}
