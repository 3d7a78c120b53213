#![doc = r#"
Named output destinations.

Events do not carry MIDI channels directly. A channel-bearing event stores a
virtual channel: the id of a [`Destination`] slot, which in turn names a MIDI
channel (1-16) and optionally a port. The table holds at most
[`MAX_DESTINATIONS`] slots.
"#]

use crate::DestinationError;
use alloc::{string::String, vec::Vec};

/// Number of destination slots a document can hold
pub const MAX_DESTINATIONS: usize = 64;

/// A named MIDI channel on an optional port
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Destination {
    name: String,
    channel: u8,
    port: Option<String>,
}

impl Destination {
    /// A destination on MIDI channel `channel` (1-16)
    pub fn new(name: impl Into<String>, channel: u8) -> Result<Self, DestinationError> {
        if !(1..=16).contains(&channel) {
            return Err(DestinationError::Channel(channel));
        }
        Ok(Self {
            name: name.into(),
            channel,
            port: None,
        })
    }

    /// Route this destination to a named port
    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIDI channel, 1-16
    pub const fn channel(&self) -> u8 {
        self.channel
    }

    /// Output port, if one was chosen
    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }
}

/// Resolves a virtual channel to a MIDI channel (1-16)
pub trait ChannelLookup {
    /// The MIDI channel for destination `destination`, if it exists
    fn channel_for(&self, destination: u8) -> Option<u8>;
}

impl<F> ChannelLookup for F
where
    F: Fn(u8) -> Option<u8>,
{
    fn channel_for(&self, destination: u8) -> Option<u8> {
        self(destination)
    }
}

/// The destination slots of a document, indexed by virtual channel
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DestinationTable {
    slots: Vec<Destination>,
}

impl DestinationTable {
    /// An empty table
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Add a destination and return its id
    pub fn add(&mut self, destination: Destination) -> Result<u8, DestinationError> {
        if self.slots.len() >= MAX_DESTINATIONS {
            return Err(DestinationError::Full(MAX_DESTINATIONS));
        }
        self.slots.push(destination);
        Ok((self.slots.len() - 1) as u8)
    }

    /// The destination with id `id`
    pub fn get(&self, id: u8) -> Option<&Destination> {
        self.slots.get(id as usize)
    }

    /// Number of destinations
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if there are no destinations
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Destinations in id order
    pub fn iter(&self) -> impl Iterator<Item = &Destination> {
        self.slots.iter()
    }

    /// The MIDI channel (1-16) of destination `id`
    pub fn channel_for(&self, id: u8) -> Option<u8> {
        self.get(id).map(Destination::channel)
    }

    /// The first destination that sends on MIDI channel `channel`
    pub fn destination_for_channel(&self, channel: u8) -> Option<u8> {
        self.slots
            .iter()
            .position(|d| d.channel == channel)
            .map(|id| id as u8)
    }
}

impl ChannelLookup for DestinationTable {
    fn channel_for(&self, destination: u8) -> Option<u8> {
        DestinationTable::channel_for(self, destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use pretty_assertions::assert_eq;

    #[test]
    fn channels_must_be_one_to_sixteen() {
        assert_eq!(Destination::new("x", 0), Err(DestinationError::Channel(0)));
        assert_eq!(Destination::new("x", 17), Err(DestinationError::Channel(17)));
        assert!(Destination::new("x", 16).is_ok());
    }

    #[test]
    fn lookups_both_ways() {
        let mut table = DestinationTable::new();
        let drums = table
            .add(Destination::new("Drums", 10).unwrap().with_port("USB"))
            .unwrap();
        let bass = table.add(Destination::new("Bass", 2).unwrap()).unwrap();
        assert_eq!((drums, bass), (0, 1));
        assert_eq!(table.channel_for(bass), Some(2));
        assert_eq!(table.channel_for(9), None);
        assert_eq!(table.destination_for_channel(10), Some(drums));
        assert_eq!(table.destination_for_channel(3), None);
        assert_eq!(table.get(drums).and_then(Destination::port), Some("USB"));
    }

    #[test]
    fn table_is_bounded() {
        let mut table = DestinationTable::new();
        for n in 0..MAX_DESTINATIONS {
            table
                .add(Destination::new(format!("d{n}"), 1).unwrap())
                .unwrap();
        }
        assert_eq!(
            table.add(Destination::new("one more", 1).unwrap()),
            Err(DestinationError::Full(MAX_DESTINATIONS))
        );
    }
}
