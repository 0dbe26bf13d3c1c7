//! Whole-pack decoding
//!
//! Resolves the container, then decodes every model blob. Model blobs are
//! disjoint read-only slices, so they are decoded on the rayon pool.

use rayon::prelude::*;
use std::collections::BTreeMap;

use super::{Blob, Container, SlotKind};
use crate::config::DecodeConfig;
use crate::error::Result;
use crate::io::Endian;
use crate::model::Model;
use crate::warning::{Decoded, Warning, WarningSink};

/// Key of the track scenery model in [`Pack::models`]
pub const TRACK_MODEL_KEY: u32 = 0;

/// A decoded pack.
#[derive(Debug, Clone, PartialEq)]
pub struct Pack {
    pub container: Container,
    /// Track model at key 0, other models at 1, 2, ... in table order
    pub models: BTreeMap<u32, Model>,
    /// Texture and texture-data blobs, left undecoded
    pub textures: Vec<Blob>,
}

impl Pack {
    pub fn decode(buffer: &[u8]) -> Result<Decoded<Pack>> {
        Self::decode_with(buffer, &DecodeConfig::default())
    }

    /// Decode a pack and every model in it.
    ///
    /// Only container-level problems are errors. A model blob that fails
    /// to decode is reported as [`Warning::BlobDecodeFailed`] and left out.
    /// Warnings from a decoded model are wrapped in [`Warning::InSlot`].
    pub fn decode_with(buffer: &[u8], config: &DecodeConfig) -> Result<Decoded<Pack>> {
        let (container, warnings) = Container::resolve_with(buffer, config)?.into_parts();
        let mut sink = WarningSink::new();
        sink.extend(warnings);

        let mut jobs: Vec<(u32, &Blob)> = Vec::new();
        let mut textures = Vec::new();
        let mut next_key = TRACK_MODEL_KEY + 1;
        for blob in &container.blobs {
            match blob.kind {
                SlotKind::TrackModel => jobs.push((TRACK_MODEL_KEY, blob)),
                SlotKind::Model => {
                    jobs.push((next_key, blob));
                    next_key += 1;
                }
                SlotKind::Texture | SlotKind::TextureData => textures.push(blob.clone()),
                SlotKind::Padding => {}
            }
        }

        let endian = container.endian;
        let results: Vec<(u32, usize, Result<Decoded<Model>>)> = if config.container.parallel {
            jobs.par_iter()
                .map(|&(key, blob)| decode_blob(buffer, key, blob, endian, config))
                .collect()
        } else {
            jobs.iter()
                .map(|&(key, blob)| decode_blob(buffer, key, blob, endian, config))
                .collect()
        };

        let mut models = BTreeMap::new();
        for (key, slot, result) in results {
            match result {
                Ok(decoded) => {
                    let (model, warnings) = decoded.into_parts();
                    sink.extend(warnings.into_iter().map(|w| Warning::in_slot(slot, w)));
                    models.insert(key, model);
                }
                Err(e) => sink.push(Warning::BlobDecodeFailed {
                    slot,
                    reason: e.to_string(),
                }),
            }
        }

        Ok(sink.finish(Pack {
            container,
            models,
            textures,
        }))
    }

    pub fn track_model(&self) -> Option<&Model> {
        self.models.get(&TRACK_MODEL_KEY)
    }
}

fn decode_blob(
    buffer: &[u8],
    key: u32,
    blob: &Blob,
    endian: Endian,
    config: &DecodeConfig,
) -> (u32, usize, Result<Decoded<Model>>) {
    tracing::debug!("pack: decoding slot {} as model {}", blob.slot, key);
    (
        key,
        blob.slot,
        Model::decode_with_endian(blob.bytes(buffer), endian, config),
    )
}
