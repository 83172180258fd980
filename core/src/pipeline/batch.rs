//! Sequential batch cutting over several sources sharing one tile spec.

use std::time::Instant;

use tracing::{error, info};

use crate::codec::{self, SourceFormat};
use crate::error::CutError;
use crate::stats::StatsCollector;
use crate::types::TileSpec;

use super::Result;
use super::tile::{self, EncodedTile};

/// One user-supplied file awaiting decode.
#[derive(Debug, Clone)]
pub struct SourceInput {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl SourceInput {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), mime: mime.into(), bytes }
    }

    pub fn format(&self) -> Result<SourceFormat> {
        SourceFormat::from_mime(&self.name, &self.mime)
    }
}

/// Cut every input in order and concatenate the tiles.
///
/// All inputs are checked against the format gate first, so an unsupported file rejects the
/// batch before anything is decoded. Sources are then decoded and cut one at a time; the
/// first failure discards every tile produced so far and reports the 1-based position of the
/// failing input.
///
/// Decode and cut timings are recorded in `stats` once per source.
pub fn cut_batch(
    inputs: &[SourceInput],
    spec: TileSpec,
    stats: &StatsCollector,
) -> Result<Vec<EncodedTile>> {
    let formats = inputs.iter().map(SourceInput::format).collect::<Result<Vec<_>>>()?;

    let mut all_tiles = Vec::new();
    for (position, (input, format)) in inputs.iter().zip(formats).enumerate() {
        let position = position + 1;
        match cut_one(input, format, spec, stats) {
            Ok(tiles) => all_tiles.extend(tiles),
            Err(err) => {
                error!(
                    target: "pipeline::batch",
                    position,
                    name = %input.name,
                    "batch aborted: {err}"
                );
                return Err(CutError::Batch {
                    position,
                    name: input.name.clone(),
                    source: Box::new(err),
                });
            }
        }
    }

    info!(
        target: "pipeline::batch",
        sources = inputs.len(),
        tiles = all_tiles.len(),
        "batch complete"
    );
    Ok(all_tiles)
}

fn cut_one(
    input: &SourceInput,
    format: SourceFormat,
    spec: TileSpec,
    stats: &StatsCollector,
) -> Result<Vec<EncodedTile>> {
    let started = Instant::now();
    let source = codec::decode_source(&input.name, format, &input.bytes)?;
    stats.record_decode(started.elapsed());

    let started = Instant::now();
    let tiles = tile::cut(&source, spec)?;
    stats.record_cut(started.elapsed(), tiles.len());
    Ok(tiles)
}
