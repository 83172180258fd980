use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cutter_core::fs::{collect_inputs, read_input};
use cutter_core::{Session, SourceInput, TileSpec};
use tracing::info;

use crate::args::CutOptions;

/// Summary of one source as printed by `info`.
#[derive(Debug, PartialEq, Eq)]
pub struct SourceInfo {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub tile_height: u32,
    pub tile_count: u32,
}

pub fn info(file: &Path, height: u32) -> Result<SourceInfo> {
    let mut session = Session::default();
    let input = read_input(file)?;
    let dimensions = session
        .load(&input.name, &input.mime, input.bytes)
        .with_context(|| format!("loading {}", file.display()))?;
    session.set_height(height);

    let settings = session.settings();
    Ok(SourceInfo {
        name: input.name,
        width: dimensions.width,
        height: dimensions.height,
        tile_height: settings.height(),
        tile_count: settings.count(),
    })
}

/// Cut one file and write the result into `options.out`.
pub fn cut(file: &Path, options: &CutOptions) -> Result<(Session, Vec<PathBuf>)> {
    let mut session = Session::default().with_compress_options(options.compress_options());
    let input = read_input(file)?;
    session
        .load(&input.name, &input.mime, input.bytes)
        .with_context(|| format!("loading {}", file.display()))?;

    session.set_height(options.height);
    if let Some(width) = options.width {
        session.set_use_original_width(false);
        session.set_width(width);
    }
    let mut spec = session.settings().tile_spec();
    if let Some(count) = options.count {
        spec.tile_count = spec.tile_count.min(count);
    }

    let tiles = session.crop_with(spec).with_context(|| format!("cutting {}", file.display()))?;
    info!(tiles = tiles.len(), "cut {}", file.display());

    let written = export(&session, options)?;
    Ok((session, written))
}

/// Cut every image under `paths` with one shared spec and write the result into `options.out`.
pub fn batch(paths: &[PathBuf], options: &CutOptions) -> Result<(Session, Vec<PathBuf>)> {
    let files = collect_inputs(paths)?;
    anyhow::ensure!(!files.is_empty(), "no JPEG or PNG images found");

    let inputs = files
        .iter()
        .map(|path| read_input(path))
        .collect::<cutter_core::Result<Vec<SourceInput>>>()?;
    let spec = batch_spec(options);

    let mut session = Session::default().with_compress_options(options.compress_options());
    let tiles = session.batch_crop_with(&inputs, spec).context("batch cut failed")?;
    info!(sources = inputs.len(), tiles = tiles.len(), "batch cut");

    let written = export(&session, options)?;
    Ok((session, written))
}

fn batch_spec(options: &CutOptions) -> TileSpec {
    let mut spec = TileSpec::unbounded(options.height);
    if let Some(width) = options.width {
        spec.tile_width = width;
    }
    if let Some(count) = options.count {
        spec.tile_count = count;
    }
    spec
}

fn export(session: &Session, options: &CutOptions) -> Result<Vec<PathBuf>> {
    let out = options.out.as_path();
    fs::create_dir_all(out)
        .with_context(|| format!("creating output directory {}", out.display()))?;

    let written = match (options.compress, options.archive) {
        (false, true) => vec![session.download_all(out)?],
        (true, true) => vec![session.compress_all(out)?],
        (false, false) => (0..session.tiles().len())
            .map(|index| session.download_tile(index, out))
            .collect::<cutter_core::Result<Vec<_>>>()?,
        (true, false) => (0..session.tiles().len())
            .map(|index| session.compress_tile(index, out))
            .collect::<cutter_core::Result<Vec<_>>>()?,
    };
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{Cli, Command};
    use clap::Parser;
    use cutter_core::ImageDimensions;
    use cutter_core::codec::encode_png;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let dims = ImageDimensions::new(width, height);
        let bytes = encode_png(dims, &vec![90; dims.rgba_len().unwrap()]).unwrap();
        let path = dir.join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    fn options(extra: &[&str]) -> CutOptions {
        let mut argv = vec!["tile-cutter", "cut", "x.png"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Cut { options, .. } => options,
            _ => unreachable!(),
        }
    }

    #[test]
    fn info_reports_derived_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "page.png", 12, 1000);

        let summary = info(&path, 300).unwrap();
        assert_eq!(summary.width, 12);
        assert_eq!(summary.tile_count, 4);
    }

    #[test]
    fn cut_writes_one_png_per_tile() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "page.png", 8, 650);
        let out = dir.path().join("out");
        let out_arg = out.to_string_lossy().into_owned();

        let (session, written) = cut(&path, &options(&["--out", &out_arg])).unwrap();
        assert_eq!(session.tiles().len(), 3);
        let names: Vec<_> = written
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["cropped-image-1.png", "cropped-image-2.png", "cropped-image-3.png"]);
    }

    #[test]
    fn count_caps_tiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "page.png", 8, 650);
        let out_arg = dir.path().to_string_lossy().into_owned();

        let (session, _) = cut(&path, &options(&["--out", &out_arg, "--count", "1"])).unwrap();
        assert_eq!(session.tiles().len(), 1);
    }

    #[test]
    fn batch_archives_directory_in_natural_order() {
        let dir = tempfile::tempdir().unwrap();
        let scans = dir.path().join("scans");
        fs::create_dir(&scans).unwrap();
        write_png(&scans, "10.png", 4, 10);
        write_png(&scans, "2.png", 6, 10);
        let out_arg = dir.path().join("out").to_string_lossy().into_owned();

        let opts = options(&["--out", &out_arg, "--archive", "--height", "10"]);
        let (session, written) = batch(&[scans], &opts).unwrap();

        let widths: Vec<u32> = session.tiles().iter().map(|tile| tile.dimensions.width).collect();
        assert_eq!(widths, vec![6, 4]);
        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("cropped-images.zip"));
    }

    #[test]
    fn batch_with_no_images_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = batch(&[dir.path().to_path_buf()], &options(&[])).unwrap_err();
        assert!(err.to_string().contains("no JPEG or PNG"));
    }
}
