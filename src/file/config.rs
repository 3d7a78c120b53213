use crate::event::DEFAULT_TEMPO;
use alloc::string::{String, ToString};

/// Runtime options for [`import_smf`](super::import_smf)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImportConfig {
    /// Tempo used when the first track has no tempo event at time zero,
    /// in thousandths of a BPM
    pub default_tempo: u32,
    /// Template for the 16 destinations created per file. `{source}` is
    /// replaced by the file's name and `{n}` by the MIDI channel (1-16).
    pub destination_name: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            default_tempo: DEFAULT_TEMPO,
            destination_name: "{source} {n}".to_string(),
        }
    }
}

impl ImportConfig {
    /// The destination name for MIDI channel `channel`
    pub fn destination_name(&self, source: &str, channel: u8) -> String {
        self.destination_name
            .replace("{source}", source)
            .replace("{n}", &channel.to_string())
    }
}

/// Runtime options for [`export_smf`](super::export_smf)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExportConfig {
    /// Ticks per quarter note written for metered documents
    pub metered_division: u16,
    /// Omit repeated channel status bytes
    pub running_status: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            metered_division: 480,
            running_status: false,
        }
    }
}

#[test]
fn destination_names() {
    let config = ImportConfig::default();
    assert_eq!(config.destination_name("song", 10), "song 10");
    let config = ImportConfig {
        destination_name: "{n}: {source}".to_string(),
        ..Default::default()
    };
    assert_eq!(config.destination_name("song", 1), "1: song");
}
