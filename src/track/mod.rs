#![doc = r#"
Time-ordered event tracks.

An [`EventTrack`] keeps its events sorted by start time. Batches are merged
in with [`EventTrack::merge`]; events already in the track stay ahead of new
events that start at the same time, so repeated imports are deterministic.

Range queries come in two flavors:
- [`EventTrack::events_starting_in`] returns the events whose start lies in
  the range, found by binary search.
- [`EventTrack::events_overlapping`] also finds events that started earlier
  but are still sounding. The track remembers its longest duration, which
  bounds how far back the search has to look.

# Example
```rust
# use midiseq::prelude::*;
let mut track = EventTrack::new(1, ClockType::Metered);
track.merge(vec![Event::note(960, 480, 0, 64, 90), Event::note(0, 1920, 0, 60, 90)]);

assert_eq!(track.duration(), 1920);
assert_eq!(track.events_starting_in(500..1000).len(), 1);
assert_eq!(track.events_overlapping(500..1000).count(), 2);
```
"#]

use crate::{NativeError, event::Event};
use alloc::{string::String, vec::Vec};
use core::ops::Range;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// How a track counts time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ClockType {
    /// Engine ticks, [`TICKS_PER_QUARTER`](crate::event::TICKS_PER_QUARTER)
    /// to a quarter note
    #[default]
    Metered = 0,
    /// Milliseconds
    Real = 1,
}

impl ClockType {
    /// Decode a stored clock type
    pub fn from_code(code: u8) -> Result<Self, NativeError> {
        Self::try_from(code).map_err(|_| NativeError::ClockType(code))
    }
}

/// A named, sorted list of events
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventTrack {
    id: u16,
    clock: ClockType,
    name: String,
    events: Vec<Event>,
    max_duration: i32,
}

impl EventTrack {
    /// An empty track
    pub fn new(id: u16, clock: ClockType) -> Self {
        Self {
            id,
            clock,
            ..Default::default()
        }
    }

    /// The track id. The master track is 0.
    pub const fn id(&self) -> u16 {
        self.id
    }

    /// How the track counts time
    pub const fn clock(&self) -> ClockType {
        self.clock
    }

    /// The track name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the track
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The events, in start order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if the track holds no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The longest duration of any event in the track
    pub const fn max_duration(&self) -> i32 {
        self.max_duration
    }

    /// Merge a batch of events into the track.
    ///
    /// The batch does not need to be sorted. At equal start times, events
    /// already in the track come first and the batch keeps its own order.
    pub fn merge(&mut self, mut batch: Vec<Event>) {
        if batch.is_empty() {
            return;
        }
        batch.sort_by_key(Event::start);
        self.note_durations(&batch);

        let mut existing = core::mem::take(&mut self.events).into_iter().peekable();
        let mut merged = Vec::with_capacity(existing.len() + batch.len());
        for event in batch {
            while let Some(old) = existing.next_if(|old| old.start() <= event.start()) {
                merged.push(old);
            }
            merged.push(event);
        }
        merged.extend(existing);
        self.events = merged;
    }

    /// Append one event. Out of order events are merged instead.
    pub fn push(&mut self, event: Event) {
        match self.events.last() {
            Some(last) if last.start() > event.start() => self.merge(alloc::vec![event]),
            _ => {
                self.max_duration = self.max_duration.max(event.duration());
                self.events.push(event);
            }
        }
    }

    /// Remove and return every event, leaving the track empty
    pub fn take_events(&mut self) -> Vec<Event> {
        self.max_duration = 0;
        core::mem::take(&mut self.events)
    }

    /// The latest end time (`start + duration`) of any event, 0 when empty
    pub fn duration(&self) -> i32 {
        self.events
            .iter()
            .map(Event::end)
            .max()
            .unwrap_or(0)
            .clamp(0, i32::MAX as i64) as i32
    }

    /// Events whose start lies in `range`
    pub fn events_starting_in(&self, range: Range<i32>) -> &[Event] {
        let lo = self.events.partition_point(|e| e.start() < range.start);
        let hi = self.events.partition_point(|e| e.start() < range.end);
        &self.events[lo..hi.max(lo)]
    }

    /// Events that sound at any point in `range`.
    ///
    /// Events without a duration count when their start lies in the range.
    pub fn events_overlapping(&self, range: Range<i32>) -> impl Iterator<Item = &Event> + '_ {
        let earliest = range.start.saturating_sub(self.max_duration);
        let lo = self.events.partition_point(|e| e.start() < earliest);
        let hi = self.events.partition_point(|e| e.start() < range.end);
        let Range { start, end } = range;
        self.events[lo..hi.max(lo)]
            .iter()
            .filter(move |e| e.start() < end && (e.end() > start as i64 || e.start() >= start))
    }

    /// A forward cursor over the events
    pub fn cursor(&self) -> TrackCursor<'_> {
        TrackCursor {
            events: &self.events,
            index: 0,
        }
    }

    fn note_durations(&mut self, batch: &[Event]) {
        if let Some(longest) = batch.iter().map(Event::duration).max() {
            self.max_duration = self.max_duration.max(longest);
        }
    }

    pub(crate) fn set_id(&mut self, id: u16) {
        self.id = id;
    }
}

/// Walks a track's events in start order
#[derive(Debug, Clone)]
pub struct TrackCursor<'t> {
    events: &'t [Event],
    index: usize,
}

impl<'t> TrackCursor<'t> {
    /// The next event, without advancing
    pub fn peek(&self) -> Option<&'t Event> {
        self.events.get(self.index)
    }

    /// Move to the first event starting at or after `time`
    pub fn seek(&mut self, time: i32) {
        self.index = self.events.partition_point(|e| e.start() < time);
    }

    /// Index of the next event
    pub const fn position(&self) -> usize {
        self.index
    }
}

impl<'t> Iterator for TrackCursor<'t> {
    type Item = &'t Event;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.events.get(self.index)?;
        self.index += 1;
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use alloc::vec;
    use pretty_assertions::assert_eq;

    fn starts(track: &EventTrack) -> Vec<i32> {
        track.events().iter().map(Event::start).collect()
    }

    #[test]
    fn merge_keeps_existing_events_first() {
        let mut track = EventTrack::new(1, ClockType::Metered);
        track.merge(vec![Event::tempo(100, 1), Event::tempo(0, 2)]);
        track.merge(vec![Event::program_change(100, 0, 5), Event::end_of_track(50)]);
        assert_eq!(starts(&track), vec![0, 50, 100, 100]);
        assert_eq!(track.events()[2].kind(), EventKind::Tempo);
        assert_eq!(track.events()[3].kind(), EventKind::ProgramChange);
    }

    #[test]
    fn merge_is_stable_within_a_batch() {
        let mut track = EventTrack::new(1, ClockType::Metered);
        track.merge(vec![
            Event::controller(10, 0, 7, 1),
            Event::controller(5, 0, 7, 2),
            Event::controller(10, 0, 7, 3),
        ]);
        let values: Vec<i32> = track
            .events()
            .iter()
            .map(|e| e.attribute(crate::event::Attribute::Value))
            .collect();
        assert_eq!(values, vec![2, 1, 3]);
    }

    #[test]
    fn push_falls_back_to_merge() {
        let mut track = EventTrack::new(1, ClockType::Real);
        track.push(Event::end_of_track(10));
        track.push(Event::end_of_track(5));
        track.push(Event::end_of_track(20));
        assert_eq!(starts(&track), vec![5, 10, 20]);
    }

    #[test]
    fn duration_is_latest_end() {
        let mut track = EventTrack::new(1, ClockType::Metered);
        assert_eq!(track.duration(), 0);
        track.merge(vec![
            Event::note(0, 1000, 0, 60, 100),
            Event::note(500, 100, 0, 62, 100),
            Event::end_of_track(900),
        ]);
        assert_eq!(track.duration(), 1000);
        assert_eq!(track.max_duration(), 1000);
    }

    #[test]
    fn overlap_query_reaches_back() {
        let mut track = EventTrack::new(1, ClockType::Metered);
        track.merge(vec![
            Event::note(0, 100, 0, 60, 100),
            Event::note(0, 2000, 0, 48, 100),
            Event::note(1500, 10, 0, 67, 100),
            Event::tempo(1200, 100_000),
        ]);
        let hits: Vec<i32> = track
            .events_overlapping(1000..1300)
            .map(|e| e.attribute(crate::event::Attribute::Pitch))
            .collect();
        assert_eq!(hits, vec![48, -1]);
        assert!(track.events_starting_in(1000..1300).len() == 1);
        assert!(track.events_starting_in(2000..1000).is_empty());
    }

    #[test]
    fn cursor_seeks() {
        let mut track = EventTrack::new(1, ClockType::Metered);
        track.merge(vec![Event::end_of_track(0), Event::end_of_track(10), Event::end_of_track(20)]);
        let mut cursor = track.cursor();
        cursor.seek(5);
        assert_eq!(cursor.peek().map(Event::start), Some(10));
        assert_eq!(cursor.map(Event::start).collect::<Vec<_>>(), vec![10, 20]);
    }

    #[test]
    fn clock_codes() {
        assert_eq!(ClockType::from_code(1), Ok(ClockType::Real));
        assert_eq!(ClockType::from_code(7), Err(NativeError::ClockType(7)));
    }
}
