//! Walkable-surface processing for teleport targeting.
//!
//! A host navigation system hands over a raw [`Triangulation`]; the
//! [`reducer`] culls it down to a [`WalkableMesh`] under an [`AreaMask`],
//! and the [`border`] module traces the outline of what is left.
pub mod border;
pub mod reducer;
pub mod sampler;
pub mod selectable_area;

pub use border::{BorderPointSet, Edge, extract_borders};
pub use reducer::{MAX_WALKABLE_VERTICES, dedup_vertices, reduce};
pub use sampler::{NavSample, ProximitySampler};
pub use selectable_area::SelectableArea;

use cgmath::{InnerSpace, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bitset of navigation area tags. Bit `n` selects area tag `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaMask(pub u32);

impl AreaMask {
    pub const ALL: AreaMask = AreaMask(!0);
    pub const NONE: AreaMask = AreaMask(0);

    pub fn from_area(area: u8) -> Self {
        AreaMask(1u32.checked_shl(area as u32).unwrap_or(0))
    }

    /// Tags past bit 31 never match.
    pub fn contains_area(self, area: u8) -> bool {
        match 1u32.checked_shl(area as u32) {
            Some(bit) => self.0 & bit != 0,
            None => false,
        }
    }
}

impl Default for AreaMask {
    fn default() -> Self {
        AreaMask::ALL
    }
}

/// Errors raised while validating raw navigation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavMeshError {
    /// The index list does not split into whole triangles
    IndexCountNotTriangles { index_count: usize },

    /// One area tag per triangle is required
    AreaCountMismatch {
        triangle_count: usize,
        area_count: usize,
    },

    /// An index points past the end of the vertex list
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },
}

impl fmt::Display for NavMeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavMeshError::IndexCountNotTriangles { index_count } => {
                write!(f, "Index count {} is not a multiple of 3", index_count)
            }
            NavMeshError::AreaCountMismatch {
                triangle_count,
                area_count,
            } => {
                write!(
                    f,
                    "Expected {} area tags (one per triangle), found {}",
                    triangle_count, area_count
                )
            }
            NavMeshError::IndexOutOfRange {
                position,
                index,
                vertex_count,
            } => {
                write!(
                    f,
                    "Index {} at position {} is out of range for {} vertices",
                    index, position, vertex_count
                )
            }
        }
    }
}

impl std::error::Error for NavMeshError {}

/// Raw navigation triangulation as produced by the host navigation system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Triangulation {
    pub vertices: Vec<Vector3<f32>>,
    /// Triples into `vertices`, one per triangle
    pub indices: Vec<u32>,
    /// Area tag per triangle
    pub areas: Vec<u8>,
}

impl Triangulation {
    pub fn new(
        vertices: Vec<Vector3<f32>>,
        indices: Vec<u32>,
        areas: Vec<u8>,
    ) -> Result<Self, NavMeshError> {
        let triangulation = Triangulation {
            vertices,
            indices,
            areas,
        };
        triangulation.validate()?;
        Ok(triangulation)
    }

    pub fn validate(&self) -> Result<(), NavMeshError> {
        if self.indices.len() % 3 != 0 {
            return Err(NavMeshError::IndexCountNotTriangles {
                index_count: self.indices.len(),
            });
        }

        let triangle_count = self.indices.len() / 3;
        if self.areas.len() != triangle_count {
            return Err(NavMeshError::AreaCountMismatch {
                triangle_count,
                area_count: self.areas.len(),
            });
        }

        if let Some((position, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|&(_, &index)| index as usize >= self.vertices.len())
        {
            return Err(NavMeshError::IndexOutOfRange {
                position,
                index,
                vertex_count: self.vertices.len(),
            });
        }

        Ok(())
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Flat, in-mask subset of a [`Triangulation`].
///
/// Every triangle's normal is within tolerance of vertical and its area tag
/// is in the mask it was reduced with. Fewer than
/// [`MAX_WALKABLE_VERTICES`] vertices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalkableMesh {
    pub vertices: Vec<Vector3<f32>>,
    pub indices: Vec<u32>,
    pub areas: Vec<u8>,
}

impl WalkableMesh {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle(&self, triangle: usize) -> [Vector3<f32>; 3] {
        let base = triangle * 3;
        [
            self.vertices[self.indices[base] as usize],
            self.vertices[self.indices[base + 1] as usize],
            self.vertices[self.indices[base + 2] as usize],
        ]
    }

    /// Sum of triangle areas, in square units.
    pub fn surface_area(&self) -> f32 {
        (0..self.triangle_count())
            .map(|tri| {
                let [a, b, c] = self.triangle(tri);
                (b - a).cross(c - a).magnitude() * 0.5
            })
            .sum()
    }
}

/// Unnormalised plane normal of the triangle `(a, b, c)`.
pub(crate) fn triangle_normal(a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>) -> Vector3<f32> {
    (b - a).cross(c - a)
}


#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::vec3;

    #[test]
    fn test_area_mask_bits() {
        let mask = AreaMask(0b101);
        assert!(mask.contains_area(0));
        assert!(!mask.contains_area(1));
        assert!(mask.contains_area(2));
        assert!(!mask.contains_area(40));
        assert!(AreaMask::ALL.contains_area(31));
        assert_eq!(AreaMask::from_area(3), AreaMask(8));
    }

    #[test]
    fn test_triangulation_validation() {
        let vertices = vec![vec3(0.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0), vec3(0.0, 0.0, 1.0)];

        assert!(Triangulation::new(vertices.clone(), vec![0, 1, 2], vec![0]).is_ok());

        assert_eq!(
            Triangulation::new(vertices.clone(), vec![0, 1], vec![0]),
            Err(NavMeshError::IndexCountNotTriangles { index_count: 2 })
        );
        assert_eq!(
            Triangulation::new(vertices.clone(), vec![0, 1, 2], vec![]),
            Err(NavMeshError::AreaCountMismatch {
                triangle_count: 1,
                area_count: 0
            })
        );
        assert_eq!(
            Triangulation::new(vertices, vec![0, 1, 7], vec![0]),
            Err(NavMeshError::IndexOutOfRange {
                position: 2,
                index: 7,
                vertex_count: 3
            })
        );
    }

    #[test]
    fn test_walkable_surface_area() {
        let square = test_util::unit_square(0);
        let mesh = WalkableMesh {
            vertices: square.vertices,
            indices: square.indices,
            areas: square.areas,
        };
        assert!((mesh.surface_area() - 1.0).abs() < 1e-6);
    }
}
