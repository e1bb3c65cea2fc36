use cgmath::Vector3;

use super::{
    AreaMask, BorderPointSet, NavSample, ProximitySampler, Triangulation, WalkableMesh,
    extract_borders, reduce,
};
use crate::ribbon::RibbonMesh;

/// The walkable region a user may teleport within, with its outline.
///
/// Rebuilt whenever navigation data changes; read every frame by the arc
/// simulator (as its proximity sampler) and by whatever draws the border.
#[derive(Debug, Clone, Default)]
pub struct SelectableArea {
    mesh: WalkableMesh,
    borders: Vec<BorderPointSet>,
    border_meshes: Vec<RibbonMesh>,
    border_height: f32,
}

impl SelectableArea {
    pub fn new(border_height: f32) -> Self {
        SelectableArea {
            border_height,
            ..Default::default()
        }
    }

    /// Reduce `triangulation` to its walkable part under `area_mask`, then
    /// trace and wall its borders.
    pub fn rebuild(&mut self, triangulation: &Triangulation, area_mask: AreaMask) {
        self.mesh = reduce(triangulation, area_mask);
        self.borders = extract_borders(&self.mesh);
        self.build_border_meshes();

        crate::navmesh_log!(
            info,
            "Selectable area rebuilt: {} triangles, {} border polylines",
            self.mesh.triangle_count(),
            self.borders.len()
        );
    }

    pub fn clear(&mut self) {
        self.mesh = WalkableMesh::empty();
        self.borders.clear();
        self.border_meshes.clear();
    }

    /// Change the wall height. Only the wall meshes are regenerated.
    pub fn set_border_height(&mut self, height: f32) {
        self.border_height = height;
        self.build_border_meshes();
    }

    pub fn border_height(&self) -> f32 {
        self.border_height
    }

    pub fn mesh(&self) -> &WalkableMesh {
        &self.mesh
    }

    pub fn borders(&self) -> &[BorderPointSet] {
        &self.borders
    }

    pub fn border_meshes(&self) -> &[RibbonMesh] {
        &self.border_meshes
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }

    fn build_border_meshes(&mut self) {
        self.border_meshes = self
            .borders
            .iter()
            .map(|border| RibbonMesh::border_wall(&border.points, self.border_height))
            .collect();
    }
}

impl ProximitySampler for SelectableArea {
    fn sample_position(
        &self,
        point: Vector3<f32>,
        radius: f32,
        area_mask: AreaMask,
    ) -> Option<NavSample> {
        self.mesh.sample_position(point, radius, area_mask)
    }
}
