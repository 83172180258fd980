use std::io::Cursor;

use cutter_core::codec::{DecodedImage, SourceFormat, decode_source};
use cutter_core::pipeline::{cut, cut_encoded, plan};
use cutter_core::types::{ImageDimensions, TileSpec, derive_count};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb, RgbaImage};

/// Every pixel encodes its own coordinates, so any misplaced row shows up.
fn gradient(width: u32, height: u32) -> DecodedImage {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, (y / 256) as u8, 255]);
        }
    }
    DecodedImage { dimensions: ImageDimensions::new(width, height), pixels }
}

fn decode_tile(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory_with_format(bytes, ImageFormat::Png).expect("tile is a png").to_rgba8()
}

#[test]
fn tall_page_is_cut_into_full_bands_and_a_short_tail() {
    let source = gradient(40, 1000);
    let tiles = cut(&source, TileSpec::covering(40, 300, 1000)).expect("cut");

    let heights: Vec<u32> = tiles.iter().map(|tile| tile.dimensions.height).collect();
    let offsets: Vec<u32> = tiles.iter().map(|tile| tile.offset_y).collect();
    assert_eq!(heights, vec![300, 300, 300, 100]);
    assert_eq!(offsets, vec![0, 300, 600, 900]);
}

#[test]
fn short_wide_source_gives_a_single_tile() {
    let source = gradient(1200, 300);
    let tiles = cut(&source, TileSpec::covering(300, 300, 300)).expect("cut");

    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles[0].dimensions, ImageDimensions::new(300, 300));
}

#[test]
fn oversized_count_stops_at_the_bottom_edge() {
    let source = gradient(10, 1000);
    let tiles = cut(&source, TileSpec::new(10, 300, 10)).expect("cut");
    assert_eq!(tiles.len(), 4);
}

#[test]
fn tiles_decode_back_to_their_source_regions() {
    let source = gradient(17, 530);
    let tiles = cut(&source, TileSpec::covering(17, 128, 530)).expect("cut");

    for tile in &tiles {
        let decoded = decode_tile(&tile.bytes);
        let region = source
            .region(0, tile.offset_y, tile.dimensions.width, tile.dimensions.height)
            .expect("tile lies inside the source");
        assert_eq!(decoded.dimensions(), (region.width(), region.height()));
        assert_eq!(decoded.as_raw(), &region.pixels, "tile {} differs", tile.index);
    }
}

#[test]
fn derived_plans_cover_every_row_once() {
    let cases = [(1, 1), (299, 300), (300, 300), (301, 300), (1000, 7), (4096, 512)];
    for (height, tile_height) in cases {
        let dims = ImageDimensions::new(5, height);
        let bands = plan(dims, TileSpec::covering(5, tile_height, height));

        assert_eq!(bands.len() as u32, derive_count(height, tile_height));
        let mut next_row = 0;
        for band in &bands {
            assert_eq!(band.offset_y, next_row, "gap or overlap at {height}/{tile_height}");
            assert!(band.height <= tile_height);
            next_row = band.end_y();
        }
        assert_eq!(next_row, height);
    }
}

#[test]
fn zero_sized_source_yields_no_tiles() {
    let empty = DecodedImage { dimensions: ImageDimensions::new(0, 0), pixels: Vec::new() };
    assert!(cut(&empty, TileSpec::new(10, 10, 3)).expect("cut").is_empty());
}

#[test]
fn jpeg_sources_are_cut_like_png_sources() {
    let image = ImageBuffer::from_pixel(16, 50, Rgb([30u8, 120, 200]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image).write_to(&mut buf, ImageFormat::Jpeg).expect("encode jpeg");
    let bytes = buf.into_inner();

    let decoded = decode_source("photo.jpg", SourceFormat::Jpeg, &bytes).expect("decode");
    assert_eq!(decoded.dimensions, ImageDimensions::new(16, 50));

    let spec = TileSpec::covering(16, 20, 50);
    let tiles = cut_encoded("photo.jpg", SourceFormat::Jpeg, &bytes, spec).expect("cut");
    let heights: Vec<u32> = tiles.iter().map(|tile| tile.dimensions.height).collect();
    assert_eq!(heights, vec![20, 20, 10]);
    assert!(tiles.iter().all(|tile| decode_tile(&tile.bytes).get_pixel(0, 0)[3] == 255));
}

#[test]
fn garbage_bytes_fail_to_decode() {
    let spec = TileSpec::new(1, 1, 1);
    let err = cut_encoded("junk.png", SourceFormat::Png, b"not a png", spec).unwrap_err();
    assert!(err.to_string().contains("junk.png"));
}
