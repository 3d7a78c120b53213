#![doc = r#"
A sequencer document: destinations, a master track and data tracks.

The master track (id 0) arranges the data tracks with
[`Sequence`](crate::event::EventKind::Sequence) events. Data tracks are
numbered from 1.

A document is both the [`ImportSink`] and the [`ExportSource`] of the SMF
codec, and can be stored in the native format with
[`Document::save_native`].

# Example
```rust
# use midiseq::prelude::*;
let mut doc = Document::new("Sketch");
let piano = doc.destinations_mut().add(Destination::new("Piano", 1).unwrap()).unwrap();
let id = doc.add_track(ClockType::Metered);
doc.track_mut(id).unwrap().merge(vec![Event::note(0, 960, piano, 60, 100)]);

let smf = doc.to_smf(&ExportConfig::default()).unwrap();
let (copy, report) = Document::from_smf(&smf, "Sketch", &ImportConfig::default()).unwrap();
assert!(report.warnings().is_empty());
// the tempo track comes back as a track of its own
assert_eq!(copy.tracks().len(), 2);
assert_eq!(copy.tracks()[1].events()[0].duration(), 960);
```
"#]

use crate::{
    DestinationError, WriteError,
    destination::{ChannelLookup, Destination, DestinationTable},
    event::{DEFAULT_TEMPO, Event},
    file::{
        ExportConfig, ExportError, ExportSource, ImportConfig, ImportError, ImportReport,
        ImportSink, export_smf, import_smf,
    },
    native,
    reader::ReadResult,
    track::{ClockType, EventTrack},
};
use alloc::{string::String, vec::Vec};

/// Id of the master track
pub const MASTER_TRACK_ID: u16 = 0;

/// A complete sequence
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    name: String,
    destinations: DestinationTable,
    master: EventTrack,
    tracks: Vec<EventTrack>,
    initial_tempo: u32,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl Document {
    /// An empty document
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            destinations: DestinationTable::new(),
            master: EventTrack::new(MASTER_TRACK_ID, ClockType::Metered),
            tracks: Vec::new(),
            initial_tempo: DEFAULT_TEMPO,
        }
    }

    /// The document name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the document
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The destination table
    pub fn destinations(&self) -> &DestinationTable {
        &self.destinations
    }

    /// The destination table, mutably
    pub fn destinations_mut(&mut self) -> &mut DestinationTable {
        &mut self.destinations
    }

    /// The master track
    pub fn master(&self) -> &EventTrack {
        &self.master
    }

    /// The master track, mutably
    pub fn master_mut(&mut self) -> &mut EventTrack {
        &mut self.master
    }

    /// The data tracks, in creation order
    pub fn tracks(&self) -> &[EventTrack] {
        &self.tracks
    }

    /// A track by id; 0 is the master track
    pub fn track(&self, id: u16) -> Option<&EventTrack> {
        if id == MASTER_TRACK_ID {
            return Some(&self.master);
        }
        self.tracks.iter().find(|t| t.id() == id)
    }

    /// A track by id, mutably; 0 is the master track
    pub fn track_mut(&mut self, id: u16) -> Option<&mut EventTrack> {
        if id == MASTER_TRACK_ID {
            return Some(&mut self.master);
        }
        self.tracks.iter_mut().find(|t| t.id() == id)
    }

    /// Create an empty data track and return its id
    pub fn add_track(&mut self, clock: ClockType) -> u16 {
        let id = self
            .tracks
            .iter()
            .map(EventTrack::id)
            .max()
            .unwrap_or(MASTER_TRACK_ID)
            .saturating_add(1);
        self.tracks.push(EventTrack::new(id, clock));
        id
    }

    /// Add a track built elsewhere. Its id is replaced if it is already
    /// taken. Returns the id the track ended up with.
    pub fn insert_track(&mut self, mut track: EventTrack) -> u16 {
        if track.id() == MASTER_TRACK_ID || self.track(track.id()).is_some() {
            let id = self.add_track(track.clock());
            track.set_id(id);
            if let Some(slot) = self.tracks.last_mut() {
                *slot = track;
            }
            return id;
        }
        let id = track.id();
        self.tracks.push(track);
        id
    }

    /// Tempo at the start of playback, in thousandths of a BPM
    pub const fn initial_tempo(&self) -> u32 {
        self.initial_tempo
    }

    /// Set the starting tempo
    pub fn set_initial_tempo(&mut self, tempo: u32) {
        self.initial_tempo = tempo;
    }

    /// Import a standard MIDI file held in memory
    pub fn from_smf(
        bytes: &[u8],
        name: &str,
        config: &ImportConfig,
    ) -> Result<(Self, ImportReport), ImportError> {
        let mut document = Self::new(name);
        let report = import_smf(bytes, name, &mut document, config)?;
        Ok((document, report))
    }

    /// Encode the document as a standard MIDI file
    pub fn to_smf(&self, config: &ExportConfig) -> Result<Vec<u8>, ExportError> {
        export_smf(self, config)
    }

    /// Read and import a standard MIDI file. The document is named after
    /// the file.
    #[cfg(feature = "std")]
    pub fn import_file(
        path: impl AsRef<std::path::Path>,
        config: &ImportConfig,
    ) -> Result<(Self, ImportReport), ImportError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_smf(&bytes, &name, config)
    }

    /// Export to a standard MIDI file. Nothing is written if encoding fails.
    #[cfg(feature = "std")]
    pub fn export_file(
        &self,
        path: impl AsRef<std::path::Path>,
        config: &ExportConfig,
    ) -> Result<(), ExportError> {
        let bytes = self.to_smf(config)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Encode the document in the native format
    pub fn save_native(&self) -> Result<Vec<u8>, WriteError> {
        native::document::write_document(self)
    }

    /// Decode a document saved with [`Document::save_native`]
    pub fn load_native(bytes: &[u8]) -> ReadResult<Self> {
        native::document::read_document(bytes)
    }
}

impl ImportSink for Document {
    fn add_destination(&mut self, name: String, channel: u8) -> Result<u8, DestinationError> {
        self.destinations.add(Destination::new(name, channel)?)
    }

    fn add_track(&mut self, clock: ClockType) -> u16 {
        Document::add_track(self, clock)
    }

    fn merge_events(&mut self, track: u16, events: Vec<Event>) {
        if let Some(track) = self.track_mut(track) {
            track.merge(events);
        }
    }

    fn set_track_name(&mut self, track: u16, name: &str) {
        if let Some(track) = self.track_mut(track) {
            track.set_name(name);
        }
    }

    fn merge_master_events(&mut self, events: Vec<Event>) {
        self.master.merge(events);
    }

    fn set_initial_tempo(&mut self, tempo: u32) {
        self.initial_tempo = tempo;
    }
}

impl ExportSource for Document {
    fn name(&self) -> &str {
        &self.name
    }

    fn initial_tempo(&self) -> u32 {
        self.initial_tempo
    }

    fn data_tracks(&self) -> &[EventTrack] {
        &self.tracks
    }

    fn channels(&self) -> &dyn ChannelLookup {
        &self.destinations
    }
}
