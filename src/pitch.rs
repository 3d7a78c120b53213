use core::fmt;

#[doc = r#"
A MIDI note number (0-127).

Note `60` is `C4`, note `0` is `C-1` and note `127` is `G9`. Import warnings
and log lines print pitches through this type.

# Example
```rust
# use midiseq::prelude::*;
let pitch = Pitch::new(61);
assert_eq!(pitch.key(), Key::CSharp);
assert_eq!(pitch.octave(), 4);
assert_eq!(pitch.to_string(), "C#4");
```
"#]
#[derive(Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pitch(u8);

impl Pitch {
    /// Create a pitch, clearing bit 7
    pub const fn new(byte: u8) -> Self {
        Self(byte & 0x7F)
    }

    /// The key within the octave
    pub const fn key(&self) -> Key {
        Key::from_semitone(self.0 % 12)
    }

    /// The octave, from -1 to 9
    pub const fn octave(&self) -> i8 {
        (self.0 / 12) as i8 - 1
    }
}

impl From<u8> for Pitch {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.key(), self.octave())
    }
}

/// The twelve keys of an octave
#[allow(missing_docs)]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Key {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl Key {
    const fn from_semitone(semitone: u8) -> Self {
        use Key::*;
        match semitone {
            0 => C,
            1 => CSharp,
            2 => D,
            3 => DSharp,
            4 => E,
            5 => F,
            6 => FSharp,
            7 => G,
            8 => GSharp,
            9 => A,
            10 => ASharp,
            _ => B,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Key::*;
        f.write_str(match self {
            C => "C",
            CSharp => "C#",
            D => "D",
            DSharp => "D#",
            E => "E",
            F => "F",
            FSharp => "F#",
            G => "G",
            GSharp => "G#",
            A => "A",
            ASharp => "A#",
            B => "B",
        })
    }
}

#[test]
fn pitch_names() {
    assert_eq!(Pitch::new(0).to_string(), "C-1");
    assert_eq!(Pitch::new(60).to_string(), "C4");
    assert_eq!(Pitch::new(127).to_string(), "G9");
    assert_eq!(Pitch::new(0x80 | 70).key(), Key::ASharp);
}
