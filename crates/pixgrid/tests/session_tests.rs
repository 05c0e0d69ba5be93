use pixgrid::session::LoadWarning;
use pixgrid::store::{PIXELS_KEY, USERNAME_KEY};
use pixgrid::{DirStore, KeyValueStore, MemoryStore, PixelGrid, Rejected, Session, StorageError};
use tempfile::tempdir;

fn session_as(name: &str) -> Session<MemoryStore> {
    let mut session = Session::open(MemoryStore::new());
    session.set_username(name).unwrap();
    session
}

#[test]
fn test_place_saves_before_returning() {
    let mut session = session_as("ada");
    let placement = session.place(51.50501, -0.09001, 1_000).unwrap();
    assert!(placement.warning.is_none());

    let saved = session.store().load(PIXELS_KEY).unwrap().unwrap();
    let restored = PixelGrid::deserialize(&saved).unwrap();
    assert_eq!(restored.pixels(), &[placement.pixel]);
}

#[test]
fn test_second_placement_in_same_cell_is_rejected() {
    let mut session = session_as("ada");
    session.place(51.50501, -0.09001, 1).unwrap();
    let second = session.place(51.50503, -0.09002, 2);
    assert!(matches!(second, Err(Rejected::Duplicate { .. })));
    assert_eq!(session.grid().len(), 1);
}

#[test]
fn test_placement_without_username_is_rejected() {
    let mut session = Session::open(MemoryStore::new());
    assert!(matches!(session.place(1.0, 1.0, 1), Err(Rejected::Anonymous)));
    assert!(session.grid().is_empty());
}

#[test]
fn test_failed_save_still_places_pixel() {
    let mut session = session_as("ada");
    session.store_mut().set_fail_writes(true);

    let placement = session.place(10.0, 10.0, 1).unwrap();
    assert!(matches!(placement.warning, Some(StorageError::Unavailable(_))));
    assert_eq!(session.grid().len(), 1);
    assert_eq!(session.store().load(PIXELS_KEY).unwrap(), None);
}

#[test]
fn test_corrupt_saved_pixels_open_as_empty_map() {
    let store = MemoryStore::new()
        .with_entry(PIXELS_KEY, "[{\"lat\": oops")
        .with_entry(USERNAME_KEY, "ada");
    let mut session = Session::open(store);

    assert!(session.grid().is_empty());
    assert!(matches!(session.load_warning(), Some(LoadWarning::Corrupt(_))));
    assert_eq!(session.username(), Some("ada"));
    assert!(session.place(1.0, 1.0, 1).is_ok());
}

#[test]
fn test_missing_pixels_key_opens_without_warning() {
    let session = Session::open(MemoryStore::new());
    assert!(session.grid().is_empty());
    assert!(session.load_warning().is_none());
    assert_eq!(session.username(), None);
}

#[test]
fn test_username_is_trimmed_and_validated() {
    let mut session = Session::open(MemoryStore::new());
    assert!(session.set_username("   ").is_err());
    session.set_username("  ada  ").unwrap();
    assert_eq!(session.username(), Some("ada"));
    assert_eq!(
        session.store().load(USERNAME_KEY).unwrap().as_deref(),
        Some(&b"ada"[..])
    );
}

#[test]
fn test_state_survives_reopening_a_directory_store() {
    let dir = tempdir().unwrap();
    let placed = {
        let mut session = Session::open(DirStore::new(dir.path()).unwrap());
        session.set_username("ada").unwrap();
        session.select_color("#00FF00".parse().unwrap());
        let a = session.place(51.50501, -0.09001, 1).unwrap().pixel;
        let b = session.place(40.6892, -74.0445, 2).unwrap().pixel;
        vec![a, b]
    };

    let session = Session::open(DirStore::new(dir.path()).unwrap());
    assert_eq!(session.username(), Some("ada"));
    assert_eq!(session.grid().pixels(), placed.as_slice());
    assert_eq!(session.grid().pixels()[0].color.as_str(), "#00FF00");
}

#[test]
fn test_wipe_then_serialize_is_empty() {
    let mut session = session_as("ada");
    session.place(1.0, 1.0, 1).unwrap();
    session.place(2.0, 2.0, 2).unwrap();

    assert!(session.wipe().is_none());
    assert!(session.grid().is_empty());
    assert_eq!(session.export().unwrap().bytes, b"[]");
    assert_eq!(session.store().load(PIXELS_KEY).unwrap().as_deref(), Some(&b"[]"[..]));
}

#[test]
fn test_export_uses_pixels_json() {
    let mut session = session_as("ada");
    session.place(1.0, 1.0, 1).unwrap();
    let export = session.export().unwrap();
    assert_eq!(export.file_name, "pixels.json");
    assert_eq!(
        PixelGrid::deserialize(&export.bytes).unwrap().pixels(),
        session.grid().pixels()
    );
}

#[test]
fn test_import_onto_occupied_cell_keeps_both() {
    let mut session = session_as("ada");
    session.place(51.50501, -0.09001, 1).unwrap();
    let file = session.export().unwrap().bytes;

    let imported = session.import(&file).unwrap();
    assert_eq!(imported.pixels.len(), 1);
    assert_eq!(session.grid().len(), 2);

    let saved = session.store().load(PIXELS_KEY).unwrap().unwrap();
    assert_eq!(PixelGrid::deserialize(&saved).unwrap().len(), 2);
}

#[test]
fn test_bad_import_leaves_map_untouched() {
    let mut session = session_as("ada");
    session.place(1.0, 1.0, 1).unwrap();
    let before = session.grid().pixels().to_vec();

    let bad = br##"[{"lat":1.0,"lng":1.0,"color":"#ff0000","username":"bob","timestamp":1},{"lat":2.0}]"##;
    assert!(session.import(bad).is_err());
    assert_eq!(session.grid().pixels(), before.as_slice());
}

#[test]
fn test_preview_matches_placed_pixel() {
    let mut session = session_as("ada");
    let bounds = session.preview(-22.9519, -43.2105).unwrap();
    let pixel = session.place(-22.9519, -43.2105, 1).unwrap().pixel;
    assert_eq!(Some(bounds), pixel.bounds());
    assert_eq!(bounds.top_left(), pixel.position());
}

#[test]
fn test_points_off_the_map_are_not_placed_or_previewed() {
    let mut session = session_as("ada");
    assert_eq!(session.preview(0.0, f64::INFINITY), None);
    assert!(matches!(
        session.place(0.0, 1e300, 1),
        Err(Rejected::InvalidCoordinate { .. })
    ));
    assert!(session.grid().is_empty());
    assert_eq!(session.store().load(PIXELS_KEY).unwrap(), None);
}

#[test]
fn test_saved_pixels_off_the_map_open_as_corrupt() {
    let store = MemoryStore::new().with_entry(
        PIXELS_KEY,
        br##"[{"lat":0.0,"lng":1e300,"color":"#ff0000","username":"ada","timestamp":1}]"##,
    );
    let session = Session::open(store);
    assert!(session.grid().is_empty());
    assert!(matches!(session.load_warning(), Some(LoadWarning::Corrupt(_))));
}

#[test]
fn test_import_with_null_username_names_the_entry() {
    let mut session = session_as("ada");
    let file = br##"[{"lat":1.0,"lng":1.0,"color":"#ff0000","username":null,"timestamp":1}]"##;
    let err = session.import(file).unwrap_err();
    assert_eq!(err.to_string(), "pixel [0]: username is missing or empty");
    assert!(session.grid().is_empty());
}
