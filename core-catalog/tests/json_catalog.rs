//! JSON catalogs read from disk feeding the cursor and the browse tree.

use core_catalog::{
    browse, CatalogCursor, CatalogError, JsonSource, MusicSource, SourceState, BROWSE_ROOT_ID,
};
use bridge_traits::playback::RepeatMode;
use std::path::PathBuf;
use uuid::Uuid;

struct TempCatalog {
    dir: PathBuf,
}

impl TempCatalog {
    fn new(contents: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("msc-catalog-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("catalog.json"), contents).unwrap();
        Self { dir }
    }

    fn path(&self) -> PathBuf {
        self.dir.join("catalog.json")
    }
}

impl Drop for TempCatalog {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

const THREE_TRACKS: &str = r#"{"music":[
    {"id":"one","title":"One","artist":"A","source":"one.flac","duration":30},
    {"id":"two","title":"Two","artist":"B","source":"two.flac","duration":45},
    {"id":"three","title":"Three","artist":"C","source":"three.flac","duration":60}
]}"#;

#[tokio::test]
async fn loads_from_file_and_resolves_against_its_directory() {
    let catalog = TempCatalog::new(THREE_TRACKS);
    let source = JsonSource::from_path(catalog.path());

    assert_eq!(source.state(), SourceState::Created);
    source.load().await.unwrap();
    assert!(source.when_ready().await);

    let first = source.find("one").unwrap();
    let expected = format!("{}/one.flac", catalog.dir.to_string_lossy());
    assert_eq!(first.media_uri(), Some(expected.as_str()));
}

#[tokio::test]
async fn missing_file_is_io_error() {
    let source = JsonSource::from_path("/definitely/not/here/catalog.json");
    let err = source.load().await.unwrap_err();
    assert!(matches!(err, CatalogError::Io(_)));
    assert_eq!(source.state(), SourceState::Error);
}

#[tokio::test]
async fn loaded_items_drive_cursor_and_browse_tree() {
    let catalog = TempCatalog::new(THREE_TRACKS);
    let source = JsonSource::from_path(catalog.path());
    source.load().await.unwrap();

    let cursor = CatalogCursor::new(RepeatMode::All);
    cursor.load(source.items());
    assert_eq!(cursor.current().unwrap().id(), "one");
    assert_eq!(cursor.prev().unwrap().id(), "three");

    let listing = browse::children(&cursor.items(), BROWSE_ROOT_ID);
    assert_eq!(listing.len(), 3);
    assert_eq!(listing[1].description.title.as_deref(), Some("Two"));
}
