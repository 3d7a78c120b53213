use midiseq::{
    native::{NativeEvents, read_event_list, write_event_list},
    prelude::*,
};
use pretty_assertions::assert_eq;

fn smf_with_everything() -> Vec<u8> {
    let track: &[u8] = &[
        0x00, 0xFF, 0x03, 0x03, b'S', b'y', b'n', //
        0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, //
        0x00, 0x92, 60, 100, //
        0x60, 0xB2, 10, 64, //
        0x00, 0xE2, 0x00, 0x50, //
        0x60, 0x82, 60, 30, //
        0x00, 0xF0, 0x03, 0x41, 0x10, 0xF7, //
        0x00, 0xFF, 0x2F, 0x00,
    ];
    let mut bytes = b"MThd\0\0\0\x06\0\x01\0\x01\0\x60MTrk".to_vec();
    bytes.extend_from_slice(&(track.len() as u32).to_be_bytes());
    bytes.extend_from_slice(track);
    bytes
}

#[test]
fn imported_documents_survive_native_storage() {
    let (doc, report) =
        Document::from_smf(&smf_with_everything(), "Import", &ImportConfig::default()).unwrap();
    assert!(report.warnings().is_empty());

    let native = doc.save_native().unwrap();
    let loaded = Document::load_native(&native).unwrap();
    assert_eq!(loaded, doc);
    assert_eq!(loaded.destinations().len(), 16);
    assert_eq!(loaded.track(1).map(EventTrack::name), Some("Syn"));
}

#[test]
fn event_lists_keep_selection_and_negative_times() {
    let mut picked = Event::pitch_bend(-480, 2, 0x1FFF);
    picked.set_selected(true);
    let events = vec![
        picked,
        Event::note(-10, 20, 2, 48, 1),
        Event::text(0, 1, "cue"),
        Event::end_of_track(960),
    ];
    let mut bytes = Vec::new();
    write_event_list(&events, &mut bytes).unwrap();
    assert_eq!(
        read_event_list(&bytes).unwrap(),
        NativeEvents { events, skipped: 0 }
    );
}

#[test]
fn large_gaps_between_events() {
    let events = vec![Event::tempo(0, 60_000), Event::tempo(i32::MAX - 1, 61_000)];
    let mut bytes = Vec::new();
    // deltas beyond 28 bits don't fit a variable length quantity
    assert_eq!(
        write_event_list(&events, &mut bytes),
        Err(WriteError::VlqOverflow(i32::MAX as u32 - 1))
    );

    let events = vec![Event::tempo(0, 60_000), Event::tempo(0x0FFF_FFFF, 61_000)];
    let mut bytes = Vec::new();
    write_event_list(&events, &mut bytes).unwrap();
    assert_eq!(read_event_list(&bytes).unwrap().events, events);
}

#[test]
fn truncated_documents_fail() {
    let doc = Document::new("Short");
    let native = doc.save_native().unwrap();
    let error = Document::load_native(&native[..native.len() - 4]).unwrap_err();
    assert!(matches!(
        error.parse_error(),
        Some(ParseError::Chunk(ChunkError::LengthOutOfBounds { .. }))
    ));
}
