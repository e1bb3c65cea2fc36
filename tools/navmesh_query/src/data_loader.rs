use anyhow::{Context, Result};
use arc_teleport::{Triangulation, WalkableMesh};
use cgmath::Vector3;
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, io::BufWriter, path::Path};
use tracing::info;

/// On-disk mesh layout: flat `[x, y, z]` vertex triples, triangle indices and
/// one area tag per triangle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshFile {
    pub vertices: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    #[serde(default)]
    pub areas: Vec<u8>,
}

impl MeshFile {
    /// Missing area tags default to area 0.
    pub fn into_triangulation(self) -> Result<Triangulation> {
        let vertices = self
            .vertices
            .into_iter()
            .map(|[x, y, z]| Vector3::new(x, y, z))
            .collect();

        let areas = if self.areas.is_empty() {
            vec![0; self.indices.len() / 3]
        } else {
            self.areas
        };

        Triangulation::new(vertices, self.indices, areas).context("Invalid triangulation")
    }
}

impl From<&WalkableMesh> for MeshFile {
    fn from(mesh: &WalkableMesh) -> Self {
        MeshFile {
            vertices: mesh.vertices.iter().map(|v| [v.x, v.y, v.z]).collect(),
            indices: mesh.indices.clone(),
            areas: mesh.areas.clone(),
        }
    }
}

pub fn load_triangulation(path: &Path) -> Result<Triangulation> {
    info!("Loading triangulation from {}", path.display());

    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mesh: MeshFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let triangulation = mesh
        .into_triangulation()
        .with_context(|| format!("Bad mesh data in {}", path.display()))?;

    info!(
        "Loaded {} vertices, {} triangles",
        triangulation.vertices.len(),
        triangulation.triangle_count()
    );
    Ok(triangulation)
}

pub fn save_walkable_mesh(mesh: &WalkableMesh, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &MeshFile::from(mesh))
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Wrote walkable mesh to {}", path.display());
    Ok(())
}
