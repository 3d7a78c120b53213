use midiseq::prelude::*;
use pretty_assertions::assert_eq;

fn metered_doc() -> (Document, u8) {
    let mut doc = Document::new("Song");
    doc.set_initial_tempo(100_000);
    let piano = doc
        .destinations_mut()
        .add(Destination::new("Piano", 3).unwrap())
        .unwrap();
    let id = doc.add_track(ClockType::Metered);
    let track = doc.track_mut(id).unwrap();
    track.set_name("Piano");
    track.merge(vec![
        Event::note(0, 960, piano, 60, 100),
        Event::time_sig(0, 3, 4),
        Event::controller(480, piano, 7, (100 << 7) | 5),
        Event::tempo(960, 90_000),
        Event::sysex(1920, piano, &[0x7E, 0x7F, 0x09, 0x01]),
        Event::end_of_track(3840),
    ]);
    (doc, piano)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[test]
fn export_then_import() {
    let (doc, _) = metered_doc();
    let bytes = doc.to_smf(&ExportConfig::default()).unwrap();
    let (copy, report) = Document::from_smf(&bytes, "Song", &ImportConfig::default()).unwrap();

    assert!(report.warnings().is_empty());
    assert_eq!(report.timing(), Timing::new_ticks_per_quarter_note(480));
    assert_eq!(copy.initial_tempo(), 100_000);
    assert_eq!(copy.tracks().len(), 2);
    assert_eq!(copy.tracks()[0].name(), "Song");

    // MIDI channel 3 comes back as the file's third destination
    let track = &copy.tracks()[1];
    assert_eq!(track.name(), "Piano");
    assert_eq!(
        track.events(),
        [
            Event::text(0, 3, "Piano"),
            Event::note(0, 960, 2, 60, 100),
            Event::time_sig(0, 3, 4),
            Event::controller(480, 2, 7, (100 << 7) | 5),
            Event::tempo(960, 90_000),
            Event::sysex(1920, 0, &[0x7E, 0x7F, 0x09, 0x01]),
            Event::end_of_track(3840),
        ]
    );
    assert_eq!(
        copy.master().events(),
        [Event::sequence(0, 0, 1, 0), Event::sequence(0, 3840, 2, 1)]
    );
}

#[test]
fn fourteen_bit_controllers_on_the_wire() {
    let (doc, _) = metered_doc();
    let bytes = doc.to_smf(&ExportConfig::default()).unwrap();
    assert!(contains(&bytes, &[0xB2, 7, 100, 0x00, 0xB2, 39, 5]));
    // sysex framing: length counts the terminator
    assert!(contains(&bytes, &[0xF0, 0x05, 0x7E, 0x7F, 0x09, 0x01, 0xF7]));
}

#[test]
fn running_status_is_optional() {
    let mut doc = Document::new("Chords");
    let dest = doc
        .destinations_mut()
        .add(Destination::new("Keys", 1).unwrap())
        .unwrap();
    let id = doc.add_track(ClockType::Metered);
    doc.track_mut(id).unwrap().merge(vec![
        Event::note(0, 960, dest, 60, 100),
        Event::note(0, 960, dest, 64, 100),
    ]);

    let plain = doc.to_smf(&ExportConfig::default()).unwrap();
    assert!(contains(&plain, &[0x00, 0x90, 60, 100, 0x00, 0x90, 64, 100]));

    let config = ExportConfig {
        running_status: true,
        ..ExportConfig::default()
    };
    let compact = doc.to_smf(&config).unwrap();
    assert!(contains(&compact, &[0x00, 0x90, 60, 100, 0x00, 64, 100]));
    assert!(compact.len() < plain.len());

    let (copy, _) = Document::from_smf(&compact, "Chords", &ImportConfig::default()).unwrap();
    assert_eq!(
        copy.tracks()[1].events(),
        [
            Event::note(0, 960, 0, 60, 100),
            Event::note(0, 960, 0, 64, 100),
            Event::end_of_track(960),
        ]
    );
}

#[test]
fn compound_time_signatures_round_trip() {
    let mut doc = Document::new("Waltz");
    let id = doc.add_track(ClockType::Metered);
    doc.track_mut(id)
        .unwrap()
        .merge(vec![Event::time_sig(0, 3, 8), Event::time_sig(1440, 6, 8)]);

    let bytes = doc.to_smf(&ExportConfig::default()).unwrap();
    assert!(contains(&bytes, &[0xFF, 0x58, 0x04, 3, 3, 24, 8]));
    let (copy, _) = Document::from_smf(&bytes, "Waltz", &ImportConfig::default()).unwrap();
    assert_eq!(
        copy.tracks()[1].events(),
        [
            Event::time_sig(0, 3, 8),
            Event::time_sig(1440, 6, 8),
            Event::end_of_track(1440),
        ]
    );
}

#[test]
fn custom_division() {
    let (doc, _) = metered_doc();
    let config = ExportConfig {
        metered_division: 96,
        ..ExportConfig::default()
    };
    let bytes = doc.to_smf(&config).unwrap();
    assert_eq!(&bytes[12..14], &96u16.to_be_bytes());
    let (copy, _) = Document::from_smf(&bytes, "Song", &ImportConfig::default()).unwrap();
    assert_eq!(copy.tracks()[1].duration(), 3840);
}

#[test]
fn real_time_round_trip() {
    let mut doc = Document::new("Clock");
    let dest = doc
        .destinations_mut()
        .add(Destination::new("Lead", 1).unwrap())
        .unwrap();
    let id = doc.add_track(ClockType::Real);
    doc.track_mut(id)
        .unwrap()
        .merge(vec![Event::note(1000, 250, dest, 60, 100)]);

    let bytes = doc.to_smf(&ExportConfig::default()).unwrap();
    let (copy, report) = Document::from_smf(&bytes, "Clock", &ImportConfig::default()).unwrap();
    assert_eq!(report.timing(), Timing::new_smpte(SmpteFps::TwentyFive, 40));
    let track = &copy.tracks()[1];
    assert_eq!(track.clock(), ClockType::Real);
    assert_eq!(
        track.events(),
        [Event::note(1000, 250, 0, 60, 100), Event::end_of_track(1250)]
    );
}

#[test]
fn unknown_destination_fails_the_export() {
    let mut doc = Document::new("Broken");
    let id = doc.add_track(ClockType::Metered);
    doc.track_mut(id)
        .unwrap()
        .merge(vec![Event::program_change(0, 5, 1)]);
    assert!(matches!(
        doc.to_smf(&ExportConfig::default()),
        Err(ExportError::Write(WriteError::NoChannel(5)))
    ));
}

#[test]
fn mixed_clocks_leave_no_file() {
    let mut doc = Document::new("Mixed");
    doc.add_track(ClockType::Metered);
    doc.add_track(ClockType::Real);

    let path = std::env::temp_dir().join(format!("midiseq-mixed-{}.mid", std::process::id()));
    let _ = std::fs::remove_file(&path);
    assert!(matches!(
        doc.export_file(&path, &ExportConfig::default()),
        Err(ExportError::MixedClockTypes)
    ));
    assert!(!path.exists());
}

#[test]
fn files_are_named_after_their_stem() {
    let (doc, _) = metered_doc();
    let path = std::env::temp_dir().join(format!("midiseq-stem-{}.mid", std::process::id()));
    doc.export_file(&path, &ExportConfig::default()).unwrap();
    assert!(midiseq::file::is_midi_file(&path, None));

    let (copy, _) = Document::import_file(&path, &ImportConfig::default()).unwrap();
    std::fs::remove_file(&path).unwrap();
    let stem = path.file_stem().unwrap().to_string_lossy().into_owned();
    assert_eq!(copy.name(), stem);
    assert_eq!(
        copy.destinations().get(0).map(Destination::name),
        Some(format!("{stem} 1").as_str())
    );
}
