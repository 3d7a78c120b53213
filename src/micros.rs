/// Unsigned microseconds, used when converting SMPTE file time into
/// engine milliseconds.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Micros(u64);

impl Micros {
    /// Creates a new instance of microseconds
    #[inline]
    pub const fn new(microseconds: u64) -> Self {
        Self(microseconds)
    }

    /// Whole milliseconds, rounded to nearest
    #[inline]
    pub const fn as_ms_rounded(&self) -> u64 {
        (self.0 + 500) / 1_000
    }
}

#[test]
fn rounds_to_nearest_millisecond() {
    assert_eq!(Micros::new(1_499).as_ms_rounded(), 1);
    assert_eq!(Micros::new(1_500).as_ms_rounded(), 2);
    assert_eq!(Micros::new(3_499).as_ms_rounded(), 3);
}
