#![doc = r#"
SMPTE time code frame rates.

A MIDI file can time its events in musical ticks (per quarter note) or in
SMPTE frames and ticks per frame. The SMPTE variant stores the frame rate as
a negative number in the high byte of the header's division word:

| byte | rate |
|------|------|
| -24  | 24 fps, film |
| -25  | 25 fps, PAL/SECAM |
| -29  | 30 fps drop-frame (29.97 fps NTSC color) |
| -30  | 30 fps non-drop |
"#]

use crate::SmpteError;

/// The possible frame rates of an SMPTE division
///
/// # Drop-Frame Timecode
///
/// `TwentyNine` is the 29.97 fps drop-frame rate. Frames are counted at the
/// nominal 30 fps, but frame numbers 0 and 1 are skipped at the start of
/// every minute that is not a multiple of ten, so the count stays aligned
/// with wall clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SmpteFps {
    /// 24 frames per second
    TwentyFour,
    /// 25 frames per second
    TwentyFive,
    /// 30 fps drop-frame
    TwentyNine,
    /// 30 frames per second
    Thirty,
}

/// Frames in ten minutes of drop-frame timecode
pub(crate) const DROP_FRAMES_PER_TEN_MINUTES: i64 = 17_982;
/// Frames in one (dropped) minute of drop-frame timecode
pub(crate) const DROP_FRAMES_PER_MINUTE: i64 = 1_798;

impl SmpteFps {
    /// Parse the signed high byte of a division word
    pub const fn from_division_byte(byte: i8) -> Result<Self, SmpteError> {
        Ok(match byte {
            -24 => Self::TwentyFour,
            -25 => Self::TwentyFive,
            -29 => Self::TwentyNine,
            -30 => Self::Thirty,
            _ => return Err(SmpteError::HeaderFrameTime(byte)),
        })
    }

    /// The signed byte stored in the division word
    pub const fn division_byte(&self) -> i8 {
        match self {
            Self::TwentyFour => -24,
            Self::TwentyFive => -25,
            Self::TwentyNine => -29,
            Self::Thirty => -30,
        }
    }

    /// The nominal frame count per second used for tick arithmetic.
    ///
    /// Drop-frame returns 30, not 29.
    pub const fn as_division(&self) -> u8 {
        match self {
            Self::TwentyFour => 24,
            Self::TwentyFive => 25,
            Self::TwentyNine => 30,
            Self::Thirty => 30,
        }
    }

    /// True for 29.97 fps drop-frame
    pub const fn is_drop_frame(&self) -> bool {
        matches!(self, Self::TwentyNine)
    }

    /// Frames skipped by drop-frame numbering up to `frame`
    pub(crate) const fn dropped_frames(frame: i64) -> i64 {
        (frame / DROP_FRAMES_PER_TEN_MINUTES) * 18
            + ((frame % DROP_FRAMES_PER_TEN_MINUTES - 2) / DROP_FRAMES_PER_MINUTE) * 2
    }
}

#[test]
fn division_bytes_round_trip() {
    for fps in [
        SmpteFps::TwentyFour,
        SmpteFps::TwentyFive,
        SmpteFps::TwentyNine,
        SmpteFps::Thirty,
    ] {
        assert_eq!(SmpteFps::from_division_byte(fps.division_byte()), Ok(fps));
    }
    assert_eq!(
        SmpteFps::from_division_byte(-31),
        Err(SmpteError::HeaderFrameTime(-31))
    );
}

#[test]
fn dropped_frame_counts() {
    assert_eq!(SmpteFps::dropped_frames(0), 0);
    assert_eq!(SmpteFps::dropped_frames(1), 0);
    assert_eq!(SmpteFps::dropped_frames(1800), 2);
    assert_eq!(SmpteFps::dropped_frames(17_982), 18);
    assert_eq!(SmpteFps::dropped_frames(17_982 + 1800), 20);
}
