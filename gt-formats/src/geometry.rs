//! Geometry value types shared by the model and track formats

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A position stored as three consecutive 32-bit floats.
pub type Vertex = Vec3;

/// A position with a yaw rotation (starting grid, pit boxes).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VertexRot {
    pub position: Vertex,
    pub rotation: f32,
}

impl VertexRot {
    pub fn new(x: f32, y: f32, z: f32, rotation: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            rotation,
        }
    }
}

/// A triangle as three vertex indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Face {
    pub a: u16,
    pub b: u16,
    pub c: u16,
}

impl Face {
    pub const fn new(a: u16, b: u16, c: u16) -> Self {
        Self { a, b, c }
    }

    pub fn indices(&self) -> [u16; 3] {
        [self.a, self.b, self.c]
    }

    /// Largest index referenced by this face.
    pub fn max_index(&self) -> u16 {
        self.a.max(self.b).max(self.c)
    }
}
