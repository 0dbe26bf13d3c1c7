//! Slot index classification
//!
//! The meaning of a blob in a pack is decided purely by which of the 64
//! offset-table slots points at it.

use serde::{Deserialize, Serialize};

/// Number of entries in the pack offset table
pub const SLOT_COUNT: usize = 64;

/// Semantic type of a pack slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKind {
    /// Ordinary MDL3 model
    Model,
    /// The MDL3 model carrying the track scenery
    TrackModel,
    /// TXS3 texture set
    Texture,
    /// Texture pixel data referenced by the track model
    TextureData,
    /// Anything this crate does not interpret
    Padding,
}

impl SlotKind {
    /// Whether blobs of this kind are MDL3 models.
    pub fn is_model(self) -> bool {
        matches!(self, Self::Model | Self::TrackModel)
    }

    pub fn is_texture(self) -> bool {
        matches!(self, Self::Texture | Self::TextureData)
    }
}

const fn build_slot_table() -> [SlotKind; SLOT_COUNT] {
    let mut table = [SlotKind::Padding; SLOT_COUNT];
    let mut i = 0;
    while i < 7 {
        table[i] = SlotKind::Model;
        i += 1;
    }
    table[1] = SlotKind::TrackModel;
    table[24] = SlotKind::Model;
    table[36] = SlotKind::Texture;
    table[43] = SlotKind::TextureData;
    table
}

/// Slot index to kind
pub const SLOT_TABLE: [SlotKind; SLOT_COUNT] = build_slot_table();

/// Classify a slot index. Indices past the table are padding.
pub fn classify(slot: usize) -> SlotKind {
    SLOT_TABLE.get(slot).copied().unwrap_or(SlotKind::Padding)
}
