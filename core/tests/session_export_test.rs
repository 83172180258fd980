use std::fs;
use std::io::Read;

use cutter_core::codec::encode_png;
use cutter_core::compress::CompressOptions;
use cutter_core::export::{COMPRESSED_ARCHIVE_NAME, TILE_ARCHIVE_NAME, list_entries};
use cutter_core::{CutError, ImageDimensions, Session, SourceInput};
use tempfile::tempdir;

fn png(width: u32, height: u32, shade: u8) -> Vec<u8> {
    let dims = ImageDimensions::new(width, height);
    let pixels: Vec<u8> =
        (0..dims.rgba_len().unwrap()).map(|i| if i % 4 == 3 { 255 } else { shade }).collect();
    encode_png(dims, &pixels).expect("encode fixture")
}

fn loaded(width: u32, height: u32) -> Session {
    let mut session = Session::default();
    session.load("page.png", "image/png", png(width, height, 120)).expect("load");
    session
}

#[test]
fn download_all_archives_tiles_by_position() {
    let out = tempdir().unwrap();
    let mut session = loaded(30, 700);
    assert_eq!(session.crop().unwrap().len(), 3);

    let path = session.download_all(out.path()).expect("download all");
    assert!(path.ends_with(TILE_ARCHIVE_NAME));

    let names: Vec<String> =
        list_entries(&fs::read(&path).unwrap()).unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(names, ["cropped-image-1.png", "cropped-image-2.png", "cropped-image-3.png"]);
}

#[test]
fn archived_tiles_match_the_cropped_bytes() {
    let out = tempdir().unwrap();
    let mut session = loaded(12, 350);
    session.crop().unwrap();
    let path = session.download_all(out.path()).unwrap();

    let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    for (position, tile) in session.tiles().iter().enumerate() {
        let mut entry = archive.by_index(position).unwrap();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes, tile.bytes);
    }
}

#[test]
fn single_tile_download_is_a_png_named_by_position() {
    let out = tempdir().unwrap();
    let mut session = loaded(10, 610);
    session.crop().unwrap();

    let path = session.download_tile(2, out.path()).expect("download");
    assert_eq!(path.file_name().unwrap(), "cropped-image-3.png");
    let decoded = image::open(&path).expect("saved tile decodes");
    assert_eq!((decoded.width(), decoded.height()), (10, 10));
}

#[test]
fn batch_failure_names_position_and_keeps_nothing_new() {
    let mut session = Session::default();
    let inputs = vec![
        SourceInput::new("one.png", "image/png", png(8, 8, 10)),
        SourceInput::new("two.png", "image/png", b"truncated".to_vec()),
        SourceInput::new("three.png", "image/png", png(8, 8, 30)),
    ];

    let err = session.batch_crop(&inputs).unwrap_err();
    assert_eq!(err.batch_position(), Some(2));
    assert!(err.to_string().contains("two.png"));
    assert!(session.tiles().is_empty());
}

#[test]
fn batch_result_is_named_continuously_across_sources() {
    let out = tempdir().unwrap();
    let mut session = Session::default();
    let inputs = vec![
        SourceInput::new("a.png", "image/png", png(4, 10, 10)),
        SourceInput::new("b.png", "image/png", png(4, 5, 20)),
    ];
    let spec = cutter_core::TileSpec::unbounded(5);
    assert_eq!(session.batch_crop_with(&inputs, spec).unwrap().len(), 3);

    let path = session.download_tile(2, out.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), "cropped-image-3.png");
}

#[test]
fn compress_all_writes_bounded_jpegs() {
    let out = tempdir().unwrap();
    let options = CompressOptions { max_width_or_height: 64, ..CompressOptions::default() };
    let mut session = Session::default().with_compress_options(options);
    session.load("wide.png", "image/png", png(200, 120, 200)).unwrap();
    session.crop().unwrap();

    let path = session.compress_all(out.path()).expect("compress all");
    assert!(path.ends_with(COMPRESSED_ARCHIVE_NAME));

    let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    assert_eq!(archive.len(), 1);
    let mut entry = archive.by_name("compressed-cropped-image-1.jpg").unwrap();
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).unwrap();

    let decoded = image::load_from_memory_with_format(&bytes, image::ImageFormat::Jpeg).unwrap();
    assert!(decoded.width().max(decoded.height()) <= 64);
    assert!(bytes.len() <= options.max_size_bytes());
}

#[test]
fn nothing_to_download_before_a_crop() {
    let out = tempdir().unwrap();
    let session = loaded(10, 10);
    assert!(matches!(session.download_all(out.path()), Err(CutError::NoTiles)));
    assert!(matches!(session.compress_all(out.path()), Err(CutError::NoTiles)));
    assert!(fs::read_dir(out.path()).unwrap().next().is_none());
}

#[test]
fn unsupported_upload_changes_nothing() {
    let mut session = loaded(10, 900);
    session.crop().unwrap();

    let err = session.load("scan.webp", "image/webp", vec![0; 16]).unwrap_err();
    assert!(matches!(err, CutError::UnsupportedFormat { .. }));
    assert_eq!(session.source().map(|source| source.name.as_str()), Some("page.png"));
    assert_eq!(session.tiles().len(), 3);
    assert_eq!(session.settings().count(), 3);
}
