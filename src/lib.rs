#![doc = r#"
# midiseq

A sequencer event model with a Standard MIDI File codec and a compact native
storage format.

- [`event`]: the event model. Times are in engine ticks
  ([`TICKS_PER_QUARTER`](event::TICKS_PER_QUARTER) per quarter note) on
  metered tracks and milliseconds on real-time tracks.
- [`track`], [`destination`], [`document`]: sorted event tracks, the
  virtual channel table and the document tying them together.
- [`file`]: importing and exporting Standard MIDI Files.
- [`native`]: the native event list and document format.
- [`message`], [`reader`], [`chunk`], [`vlq`]: the wire-level pieces both
  formats are built from.

# Example
```rust
use midiseq::prelude::*;

let mut doc = Document::new("Example");
let dest = doc.destinations_mut().add(Destination::new("Bass", 2).unwrap()).unwrap();
let id = doc.add_track(ClockType::Metered);
let track = doc.track_mut(id).unwrap();
track.merge(vec![
    Event::note(0, 960, dest, 40, 100),
    Event::note(960, 960, dest, 43, 100),
]);
assert_eq!(track.duration(), 1920);

let native = doc.save_native().unwrap();
assert_eq!(Document::load_native(&native).unwrap(), doc);
```

# Features
- `std` (default): file helpers and `std::error::Error` impls.
- `tracing` (default): diagnostics through the `tracing` crate.
- `serde`: `Serialize`/`Deserialize` for the data model.
"#]
#![warn(missing_docs)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod chunk;
pub mod destination;
pub mod document;
mod error;
pub use error::*;
pub mod event;
pub mod file;
pub mod message;
mod micros;
pub use micros::*;
pub mod native;
pub mod pitch;
pub mod reader;
pub mod track;
pub mod vlq;

/// Commonly used types
pub mod prelude {
    pub use crate::{
        error::*,
        destination::{ChannelLookup, Destination, DestinationTable},
        document::Document,
        event::{Attribute, Event, EventBody, EventKind, ExtendedData, Properties},
        file::{
            ExportConfig, ExportError, ExportSource, ImportConfig, ImportError, ImportReport,
            ImportSink, ImportWarning, SmpteFps, Timing, export_smf, import_smf,
        },
        micros::Micros,
        pitch::{Key, Pitch},
        reader::{ReadResult, Reader, ReaderError},
        track::{ClockType, EventTrack},
    };
}
