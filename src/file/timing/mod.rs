mod smpte;
pub use smpte::*;

use crate::{
    HeaderError, ParseError, SmpteError, TrackError,
    event::TICKS_PER_QUARTER,
    micros::Micros,
    reader::{ReadResult, Reader, ReaderError},
    track::ClockType,
};

/// The header timing type.
///
/// This is either the number of ticks per quarter note or the SMPTE
/// alternative. It is fixed per file and applies to every track in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Timing {
    /// The file's delta times count ticks per quarter note
    TicksPerQuarterNote(u16),

    /// The file's delta times count SMPTE frames and subdivisions
    Smpte(SmpteHeader),
}

impl Timing {
    /// The tickrate per quarter note defines what a "quarter note" means.
    ///
    /// The leading bit of the u16 is disregarded, so 1-32767
    pub const fn new_ticks_per_quarter_note(tpqn: u16) -> Self {
        Self::TicksPerQuarterNote(tpqn & 0x7FFF)
    }

    /// Define the timing in terms of fps and ticks per frame
    pub const fn new_smpte(fps: SmpteFps, ticks_per_frame: u8) -> Self {
        Self::Smpte(SmpteHeader {
            fps,
            ticks_per_frame,
        })
    }

    /// Interpret the division word of an `MThd` chunk
    pub fn from_division(division: u16) -> Result<Self, ParseError> {
        let [hi, lo] = division.to_be_bytes();
        if hi & 0x80 == 0 {
            if division == 0 {
                return Err(HeaderError::ZeroTicksPerQuarterNote.into());
            }
            return Ok(Self::TicksPerQuarterNote(division));
        }
        let fps = SmpteFps::from_division_byte(hi as i8)?;
        if lo == 0 {
            return Err(SmpteError::ZeroTicksPerFrame.into());
        }
        Ok(Self::new_smpte(fps, lo))
    }

    pub(crate) fn read(reader: &mut Reader<'_>) -> ReadResult<Self> {
        let position = reader.buffer_position();
        let division = reader.read_u16_be()?;
        Self::from_division(division).map_err(|e| ReaderError::invalid(position, e))
    }

    /// The division word to store in an `MThd` chunk
    pub const fn to_division(&self) -> u16 {
        match self {
            Self::TicksPerQuarterNote(tpqn) => *tpqn & 0x7FFF,
            Self::Smpte(smpte) => {
                u16::from_be_bytes([smpte.fps.division_byte() as u8, smpte.ticks_per_frame])
            }
        }
    }

    /// Returns Some if the midi timing is defined
    /// as ticks per quarter note
    pub const fn ticks_per_quarter_note(&self) -> Option<u16> {
        match self {
            Self::TicksPerQuarterNote(t) => Some(*t),
            _ => None,
        }
    }

    /// Metered for ticks per quarter note, real time for SMPTE
    pub const fn clock_type(&self) -> ClockType {
        match self {
            Self::TicksPerQuarterNote(_) => ClockType::Metered,
            Self::Smpte(_) => ClockType::Real,
        }
    }

    /// Convert an absolute file time into engine time.
    ///
    /// Metered files scale to [`TICKS_PER_QUARTER`]; SMPTE files convert to
    /// milliseconds, with drop-frame correction for 30 fps drop-frame.
    pub fn to_engine_time(&self, file_ticks: u64) -> Result<i32, TrackError> {
        let engine = match self {
            Self::TicksPerQuarterNote(tpqn) => {
                (file_ticks as u128 * TICKS_PER_QUARTER as u128 / (*tpqn).max(1) as u128) as u64
            }
            Self::Smpte(smpte) => smpte.to_micros(file_ticks).as_ms_rounded(),
        };
        i32::try_from(engine).map_err(|_| TrackError::TooLong(file_ticks))
    }

    /// Convert engine time into an absolute file time, the inverse of
    /// [`Timing::to_engine_time`] (without drop-frame correction).
    pub fn from_engine_time(&self, engine: i32) -> u64 {
        let engine = engine.max(0) as u64;
        match self {
            Self::TicksPerQuarterNote(tpqn) => engine * *tpqn as u64 / TICKS_PER_QUARTER as u64,
            Self::Smpte(smpte) => engine * smpte.ticks_per_second() / 1_000,
        }
    }
}

/// A representation of the `smpte` timing for a MIDI file
#[derive(Debug, Clone, PartialEq, Eq, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmpteHeader {
    pub(crate) fps: SmpteFps,
    pub(crate) ticks_per_frame: u8,
}

impl SmpteHeader {
    /// Returns the frames per second
    pub const fn fps(&self) -> SmpteFps {
        self.fps
    }

    /// Returns the ticks per frame
    pub const fn ticks_per_frame(&self) -> u8 {
        self.ticks_per_frame
    }

    /// File ticks per second at the nominal frame rate
    pub const fn ticks_per_second(&self) -> u64 {
        self.fps.as_division() as u64 * self.ticks_per_frame as u64
    }

    /// Convert an absolute file time into microseconds
    pub fn to_micros(&self, file_ticks: u64) -> Micros {
        let rate = self.ticks_per_second().max(1) as u128;
        let mut micros = file_ticks as u128 * 1_000_000 / rate;
        if self.fps.is_drop_frame() {
            let frame = (file_ticks / self.ticks_per_frame.max(1) as u64) as i64;
            let dropped = SmpteFps::dropped_frames(frame).max(0) as u128;
            micros += dropped * 1_000_000 / 30;
        }
        Micros::new(micros.min(u64::MAX as u128) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_metered_division() {
        let timing = Timing::from_division(0x01E0).unwrap();
        assert_eq!(timing, Timing::TicksPerQuarterNote(480));
        assert_eq!(timing.clock_type(), ClockType::Metered);
        assert_eq!(timing.to_division(), 0x01E0);
    }

    #[test]
    fn parses_smpte_division() {
        let timing = Timing::from_division(0xE728).unwrap();
        assert_eq!(timing, Timing::new_smpte(SmpteFps::TwentyFive, 40));
        assert_eq!(timing.clock_type(), ClockType::Real);
        assert_eq!(timing.to_division(), 0xE728);
    }

    #[test]
    fn rejects_bad_divisions() {
        assert_eq!(
            Timing::from_division(0),
            Err(ParseError::Header(HeaderError::ZeroTicksPerQuarterNote))
        );
        assert_eq!(
            Timing::from_division(0xE100),
            Err(ParseError::Smpte(SmpteError::HeaderFrameTime(-31)))
        );
        assert_eq!(
            Timing::from_division(0xE700),
            Err(ParseError::Smpte(SmpteError::ZeroTicksPerFrame))
        );
    }

    #[test]
    fn metered_scaling() {
        let timing = Timing::new_ticks_per_quarter_note(480);
        assert_eq!(timing.to_engine_time(480), Ok(TICKS_PER_QUARTER));
        assert_eq!(timing.to_engine_time(120), Ok(240));
        assert_eq!(timing.from_engine_time(960), 480);
    }

    #[test]
    fn smpte_rounds_to_milliseconds() {
        // 24 fps * 4 ticks per frame: one tick is 10416.67us
        let timing = Timing::new_smpte(SmpteFps::TwentyFour, 4);
        assert_eq!(timing.to_engine_time(1), Ok(10));
        assert_eq!(timing.to_engine_time(96), Ok(1_000));

        let timing = Timing::new_smpte(SmpteFps::TwentyFive, 40);
        assert_eq!(timing.to_engine_time(1_234), Ok(1_234));
        assert_eq!(timing.from_engine_time(1_234), 1_234);
    }

    #[test]
    fn drop_frame_adds_eighteen_frames_per_ten_minutes() {
        let drop = Timing::new_smpte(SmpteFps::TwentyNine, 1);
        let plain = Timing::new_smpte(SmpteFps::Thirty, 1);
        let drop_ms = drop.to_engine_time(17_982).unwrap();
        let plain_ms = plain.to_engine_time(17_982).unwrap();
        assert_eq!(plain_ms, 599_400);
        assert_eq!(drop_ms - plain_ms, 600);
        // the first two frames of a ten minute block are never corrected
        assert_eq!(drop.to_engine_time(1), plain.to_engine_time(1));
    }

    #[test]
    fn overflow_is_track_too_long() {
        let timing = Timing::new_ticks_per_quarter_note(1);
        assert_eq!(
            timing.to_engine_time(u32::MAX as u64),
            Err(TrackError::TooLong(u32::MAX as u64))
        );
    }
}
