use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Meta event types, the byte following `0xFF`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum MetaType {
    SequenceNumber = 0x00,
    Text = 0x01,
    Copyright = 0x02,
    TrackName = 0x03,
    InstrumentName = 0x04,
    Lyric = 0x05,
    Marker = 0x06,
    CuePoint = 0x07,
    ChannelPrefix = 0x20,
    Port = 0x21,
    EndOfTrack = 0x2F,
    Tempo = 0x51,
    SmpteOffset = 0x54,
    TimeSignature = 0x58,
    KeySignature = 0x59,
    SequencerSpecific = 0x7F,
}

impl MetaType {
    /// True for the text family, `0x01..=0x07`
    pub const fn is_text(byte: u8) -> bool {
        matches!(byte, 0x01..=0x07)
    }
}

const MICROS_PER_MINUTE_MILLI: u64 = 60_000_000_000;

/// Largest tempo value a set-tempo meta event can hold
pub const MAX_MICROS_PER_QUARTER: u32 = 0x00FF_FFFF;

/// Slowest tempo an event can carry, in thousandths of a BPM
pub const MIN_TEMPO: u32 = 1_000;
/// Fastest tempo an event can carry, in thousandths of a BPM
pub const MAX_TEMPO: u32 = 1_000_000;

/// Convert a set-tempo value into engine tempo units (thousandths of a BPM),
/// rounded to nearest and clamped to [`MIN_TEMPO`]..=[`MAX_TEMPO`].
pub const fn tempo_from_micros(micros_per_quarter: u32) -> u32 {
    let usec = if micros_per_quarter == 0 {
        1
    } else {
        micros_per_quarter as u64
    };
    let tempo = (MICROS_PER_MINUTE_MILLI + usec / 2) / usec;
    if tempo > MAX_TEMPO as u64 {
        MAX_TEMPO
    } else if tempo < MIN_TEMPO as u64 {
        MIN_TEMPO
    } else {
        tempo as u32
    }
}

/// Convert engine tempo units into microseconds per quarter note, rounded to
/// nearest and limited to what fits in three bytes.
pub const fn micros_from_tempo(tempo: u32) -> u32 {
    let units = if tempo == 0 { 1 } else { tempo as u64 };
    let usec = (MICROS_PER_MINUTE_MILLI + units / 2) / units;
    if usec > MAX_MICROS_PER_QUARTER as u64 {
        MAX_MICROS_PER_QUARTER
    } else {
        usec as u32
    }
}

/// The beat size (time signature denominator) for a power-of-two exponent
pub const fn beat_size_from_power(power: u8) -> u8 {
    if power > 7 { 128 } else { 1 << power }
}

/// The exponent stored for a beat size; non powers of two round down
pub const fn power_from_beat_size(beat_size: u8) -> u8 {
    if beat_size == 0 {
        0
    } else {
        7 - beat_size.leading_zeros() as u8
    }
}

/// MIDI clocks per metronome click written with every time signature
pub const METRONOME_CLOCKS: u8 = 24;
/// Notated 32nd notes per quarter written with every time signature
pub const THIRTY_SECONDS_PER_QUARTER: u8 = 8;

#[test]
fn tempo_conversions() {
    assert_eq!(tempo_from_micros(500_000), 120_000);
    assert_eq!(micros_from_tempo(120_000), 500_000);
    assert_eq!(micros_from_tempo(1), MAX_MICROS_PER_QUARTER);
    assert_eq!(tempo_from_micros(1), MAX_TEMPO);
    assert_eq!(tempo_from_micros(0), MAX_TEMPO);
    assert_eq!(tempo_from_micros(59_999), MAX_TEMPO);
    assert_eq!(tempo_from_micros(MAX_MICROS_PER_QUARTER), 3_576);
    for tempo in (20_000..=240_000).step_by(997) {
        let back = tempo_from_micros(micros_from_tempo(tempo));
        assert!(back.abs_diff(tempo) <= 1, "{tempo} came back as {back}");
    }
}

#[test]
fn beat_sizes() {
    assert_eq!(beat_size_from_power(3), 8);
    assert_eq!(power_from_beat_size(8), 3);
    assert_eq!(power_from_beat_size(1), 0);
    assert_eq!(power_from_beat_size(12), 3);
}
