#![doc = r#"
Standard MIDI File import and export.

# Layout
```text
MThd <length 6> <format> <track count> <division>
MTrk <length> <delta> <event> <delta> <event> ...
MTrk ...
```

The codec never builds a file model of its own. Importing pushes decoded
events into an [`ImportSink`]; exporting pulls sorted tracks out of an
[`ExportSource`]. [`Document`](crate::document::Document) implements both.
"#]

mod config;
pub use config::*;

mod export;
pub use export::*;

mod header;
pub use header::*;

mod import;
pub use import::*;

mod timing;
pub use timing::*;

/// Decoding of a single `MTrk` body
pub mod track_reader;

mod track_writer;
pub use track_writer::*;

/// MIME type of standard MIDI files
pub const SMF_MIME_TYPE: &str = "audio/x-midi";

/// Other MIME types that name standard MIDI files
pub const SMF_MIME_ALIASES: [&str; 2] = ["audio/midi", "audio/mid"];

/// File extensions recognized as standard MIDI files
pub const SMF_EXTENSIONS: [&str; 3] = ["mid", "midi", "smf"];

/// True if a file looks like a standard MIDI file.
///
/// A declared MIME type decides when present; otherwise the extension is
/// checked, ignoring case.
#[cfg(feature = "std")]
pub fn is_midi_file(path: impl AsRef<std::path::Path>, declared_mime: Option<&str>) -> bool {
    if let Some(mime) = declared_mime {
        return mime.eq_ignore_ascii_case(SMF_MIME_TYPE)
            || SMF_MIME_ALIASES
                .iter()
                .any(|alias| mime.eq_ignore_ascii_case(alias));
    }
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SMF_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}
