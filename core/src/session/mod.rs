//! Owned state of one interactive cutting session.
//!
//! Each public method is one user action. A failed action reports its error and leaves the
//! session as it was: a failed crop keeps the previous tiles, a failed compression never
//! touches the cropped tiles. Actions take `&mut self`, so one cannot start while another is
//! still running.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::codec::{self, SourceFormat};
use crate::compress::{self, CompressOptions};
use crate::error::CutError;
use crate::export;
use crate::pipeline::{self, EncodedTile, SourceInput};
use crate::settings::CropSettings;
use crate::Result;
use crate::stats::StatsCollector;
use crate::types::{ImageDimensions, TileSpec};

/// The currently loaded source, kept encoded and decoded again for each crop.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub name: String,
    pub format: SourceFormat,
    pub dimensions: ImageDimensions,
    bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct Session {
    source: Option<LoadedSource>,
    settings: CropSettings,
    tiles: Vec<EncodedTile>,
    compress: CompressOptions,
    stats: Arc<StatsCollector>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Arc::new(StatsCollector::new()))
    }
}

impl Session {
    /// Empty session recording into `stats`, with default settings and compression options.
    pub fn new(stats: Arc<StatsCollector>) -> Self {
        Self {
            source: None,
            settings: CropSettings::default(),
            tiles: Vec::new(),
            compress: CompressOptions::default(),
            stats,
        }
    }

    /// Replace the options used when compressing tiles.
    pub fn with_compress_options(mut self, options: CompressOptions) -> Self {
        self.compress = options;
        self
    }

    /// The last successfully loaded source, if any.
    pub fn source(&self) -> Option<&LoadedSource> {
        self.source.as_ref()
    }

    /// Current crop settings, including the derived tile count.
    pub fn settings(&self) -> &CropSettings {
        &self.settings
    }

    /// Tiles from the last successful crop or batch crop, in result order.
    pub fn tiles(&self) -> &[EncodedTile] {
        &self.tiles
    }

    /// Options used by `compress_tile` and `compress_all`.
    pub fn compress_options(&self) -> CompressOptions {
        self.compress
    }

    /// Shared collector this session records timings and counters into.
    pub fn stats(&self) -> &Arc<StatsCollector> {
        &self.stats
    }

    /// Accept an uploaded file.
    ///
    /// The MIME type is checked before anything else; then the bytes are decoded once to learn
    /// the dimensions and reset the settings for the new source. Existing tiles stay visible
    /// until the next crop replaces them.
    pub fn load(&mut self, name: &str, mime: &str, bytes: Vec<u8>) -> Result<ImageDimensions> {
        let format = SourceFormat::from_mime(name, mime).inspect_err(|err| warn!("{err}"))?;

        let started = Instant::now();
        let decoded = self.observe(codec::decode_source(name, format, &bytes))?;
        self.stats.record_decode(started.elapsed());

        let dimensions = decoded.dimensions;
        self.settings.attach_source(dimensions);
        self.source = Some(LoadedSource { name: name.to_string(), format, dimensions, bytes });
        info!(
            target: "session",
            name,
            width = dimensions.width,
            height = dimensions.height,
            "loaded source"
        );
        Ok(dimensions)
    }

    pub fn set_width(&mut self, width: u32) {
        self.settings.set_width(width);
    }

    pub fn set_height(&mut self, height: u32) {
        self.settings.set_height(height);
    }

    pub fn set_use_original_width(&mut self, enabled: bool) {
        self.settings.set_use_original_width(enabled);
    }

    /// Cut the loaded source with the current settings, replacing the previous tiles.
    pub fn crop(&mut self) -> Result<&[EncodedTile]> {
        let spec = self.settings.tile_spec();
        self.crop_with(spec)
    }

    /// Cut the loaded source with an explicit spec instead of the settings.
    pub fn crop_with(&mut self, spec: TileSpec) -> Result<&[EncodedTile]> {
        let source = self.source.as_ref().ok_or(CutError::NoSource)?;

        let started = Instant::now();
        let decoded = codec::decode_source(&source.name, source.format, &source.bytes);
        let decoded = self.observe(decoded)?;
        self.stats.record_decode(started.elapsed());

        let started = Instant::now();
        let tiles = self.observe(pipeline::cut(&decoded, spec))?;
        self.stats.record_cut(started.elapsed(), tiles.len());

        self.tiles = tiles;
        Ok(&self.tiles)
    }

    /// Cut several uploads with the current settings, replacing the previous tiles.
    ///
    /// Any failure leaves the previous tiles in place.
    pub fn batch_crop(&mut self, inputs: &[SourceInput]) -> Result<&[EncodedTile]> {
        let spec = self.settings.tile_spec();
        self.batch_crop_with(inputs, spec)
    }

    /// Cut several uploads with an explicit spec; see [`pipeline::cut_batch`].
    pub fn batch_crop_with(
        &mut self,
        inputs: &[SourceInput],
        spec: TileSpec,
    ) -> Result<&[EncodedTile]> {
        let tiles = self.observe(pipeline::cut_batch(inputs, spec, &self.stats))?;
        self.tiles = tiles;
        Ok(&self.tiles)
    }

    /// Drop the source and the tiles. Settings are kept.
    pub fn reset(&mut self) {
        self.source = None;
        self.tiles.clear();
        info!(target: "session", "session reset");
    }

    /// Save tile `index` as a PNG in `dir`.
    ///
    /// Files are named by position in the current result, which differs from
    /// `EncodedTile::index` after a batch crop.
    pub fn download_tile(&self, index: usize, dir: &Path) -> Result<PathBuf> {
        let tile = self.tile(index)?;
        self.save(dir, &export::tile_file_name(index as u32), &tile.bytes)
    }

    /// Save every tile into one zip archive in `dir`.
    pub fn download_all(&self, dir: &Path) -> Result<PathBuf> {
        if self.tiles.is_empty() {
            return Err(CutError::NoTiles);
        }
        let files = self.tiles.iter().enumerate().map(|(position, tile)| {
            (export::tile_file_name(position as u32), tile.bytes.as_slice())
        });
        let archive = self.observe(export::pack(files))?;
        self.save(dir, export::TILE_ARCHIVE_NAME, &archive)
    }

    /// Recompress tile `index` and save it as a JPEG in `dir`.
    pub fn compress_tile(&self, index: usize, dir: &Path) -> Result<PathBuf> {
        let tile = self.tile(index)?;
        let compressed = self.compress_one(tile, index as u32)?;
        self.save(dir, &export::compressed_file_name(index as u32), &compressed.bytes)
    }

    /// Recompress every tile in order and save them as one zip archive in `dir`.
    ///
    /// Nothing is written unless every tile compresses.
    pub fn compress_all(&self, dir: &Path) -> Result<PathBuf> {
        if self.tiles.is_empty() {
            return Err(CutError::NoTiles);
        }
        let mut files = Vec::with_capacity(self.tiles.len());
        for (position, tile) in self.tiles.iter().enumerate() {
            let compressed = self.compress_one(tile, position as u32)?;
            files.push((export::compressed_file_name(position as u32), compressed.bytes));
        }
        let archive = self.observe(export::pack(
            files.iter().map(|(name, bytes)| (name.clone(), bytes.as_slice())),
        ))?;
        self.save(dir, export::COMPRESSED_ARCHIVE_NAME, &archive)
    }

    fn tile(&self, index: usize) -> Result<&EncodedTile> {
        self.tiles.get(index).ok_or(CutError::TileOutOfRange { index, len: self.tiles.len() })
    }

    fn compress_one(&self, tile: &EncodedTile, position: u32) -> Result<compress::CompressedTile> {
        let started = Instant::now();
        let compressed = self.observe(compress::compress_tile(tile, position, self.compress))?;
        self.stats.record_compress(started.elapsed());
        Ok(compressed)
    }

    fn save(&self, dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.observe(export::save_file(dir, name, bytes))?;
        self.stats.record_saved(bytes.len());
        Ok(path)
    }

    /// Count and log a failure on its way out of an action.
    fn observe<T>(&self, result: Result<T>) -> Result<T> {
        result.inspect_err(|err| {
            self.stats.record_failure();
            warn!(target: "session", "action failed: {err}");
        })
    }
}
