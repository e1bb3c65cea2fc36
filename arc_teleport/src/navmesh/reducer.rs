use cgmath::{InnerSpace, Vector3};

use super::{AreaMask, Triangulation, WalkableMesh, triangle_normal};

/// Walkable meshes are drawn with 16-bit index buffers.
pub const MAX_WALKABLE_VERTICES: usize = 65535;

/// `|normal . up|` must exceed this for a triangle to count as flat (~8 degrees).
pub const FLAT_NORMAL_THRESHOLD: f32 = 0.99;

/// Vertices closer than this on every axis are merged.
pub const DEDUP_EPSILON: f32 = 0.05;

/// Reduce a navigation triangulation to the flat triangles whose area tag is
/// in `area_mask`.
///
/// The input is left untouched; compaction runs in place over a single
/// working copy. Invalid input or a result with too many vertices for a
/// 16-bit index buffer yields an empty mesh.
pub fn reduce(triangulation: &Triangulation, area_mask: AreaMask) -> WalkableMesh {
    if let Err(err) = triangulation.validate() {
        crate::navmesh_log!(error, "Rejecting navigation triangulation: {}", err);
        return WalkableMesh::empty();
    }

    reduce_validated(triangulation.clone(), area_mask)
}

/// Same as [`reduce`], consuming the triangulation so no copy is needed.
pub fn reduce_owned(triangulation: Triangulation, area_mask: AreaMask) -> WalkableMesh {
    if let Err(err) = triangulation.validate() {
        crate::navmesh_log!(error, "Rejecting navigation triangulation: {}", err);
        return WalkableMesh::empty();
    }

    reduce_validated(triangulation, area_mask)
}

fn reduce_validated(mut triangulation: Triangulation, area_mask: AreaMask) -> WalkableMesh {
    let input_triangles = triangulation.triangle_count();
    let input_vertices = triangulation.vertices.len();

    let tri_size = cull_triangles(&mut triangulation, area_mask);
    let vert_size = compact_vertices(&mut triangulation, tri_size);

    if vert_size >= MAX_WALKABLE_VERTICES {
        crate::navmesh_log!(
            error,
            "Walkable navmesh too big ({} vertices, limit {}), narrow the area mask",
            vert_size,
            MAX_WALKABLE_VERTICES
        );
        return WalkableMesh::empty();
    }

    let Triangulation {
        mut vertices,
        mut indices,
        mut areas,
    } = triangulation;
    vertices.truncate(vert_size);
    indices.truncate(tri_size * 3);
    areas.truncate(tri_size);

    let merged = dedup_vertices(&mut vertices, &mut indices);
    let dropped = drop_invalid_triangles(&vertices, &mut indices, &mut areas);

    let mut walkable = Triangulation {
        vertices,
        indices,
        areas,
    };
    if dropped > 0 {
        // Dropped triangles may have been the only users of some vertices.
        let tri_size = walkable.triangle_count();
        let vert_size = compact_vertices(&mut walkable, tri_size);
        walkable.vertices.truncate(vert_size);
    }

    crate::navmesh_log!(
        debug,
        "Reduced navmesh: {} -> {} triangles, {} -> {} vertices ({} merged, {} dropped)",
        input_triangles,
        walkable.triangle_count(),
        input_vertices,
        walkable.vertices.len(),
        merged,
        dropped
    );

    WalkableMesh {
        vertices: walkable.vertices,
        indices: walkable.indices,
        areas: walkable.areas,
    }
}

fn is_walkable(triangulation: &Triangulation, triangle: usize, area_mask: AreaMask) -> bool {
    if !area_mask.contains_area(triangulation.areas[triangle]) {
        return false;
    }

    let base = triangle * 3;
    let a = triangulation.vertices[triangulation.indices[base] as usize];
    let b = triangulation.vertices[triangulation.indices[base + 1] as usize];
    let c = triangulation.vertices[triangulation.indices[base + 2] as usize];
    is_flat(a, b, c)
}

fn is_flat(a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>) -> bool {
    let normal = triangle_normal(a, b, c);
    let length = normal.magnitude();
    if length <= f32::EPSILON {
        return false;
    }

    (normal / length).dot(Vector3::unit_y()).abs() > FLAT_NORMAL_THRESHOLD
}

/// Move walkable triangles to the front by swapping rejected ones with the
/// tail. Returns the number of triangles kept.
fn cull_triangles(triangulation: &mut Triangulation, area_mask: AreaMask) -> usize {
    let mut tri_size = triangulation.triangle_count();
    let mut cursor = 0;

    while cursor < tri_size {
        if is_walkable(triangulation, cursor, area_mask) {
            cursor += 1;
            continue;
        }

        // Re-examine whatever lands at `cursor` on the next iteration.
        let last = tri_size - 1;
        triangulation.areas.swap(cursor, last);
        for corner in 0..3 {
            triangulation.indices.swap(cursor * 3 + corner, last * 3 + corner);
        }
        tri_size -= 1;
    }

    tri_size
}

/// Relabel the vertices referenced by the first `tri_size` triangles into a
/// dense prefix `[0, vert_size)`, in order of first reference.
///
/// Each newly discovered vertex is swapped into slot `vert_size`. Index
/// rewriting is deferred: `slot_of` tracks where every original vertex
/// currently lives, so each index is translated once when the walk reaches
/// it.
fn compact_vertices(triangulation: &mut Triangulation, tri_size: usize) -> usize {
    let vertex_count = triangulation.vertices.len();
    let mut slot_of: Vec<u32> = (0..vertex_count as u32).collect();
    let mut vertex_at: Vec<u32> = (0..vertex_count as u32).collect();
    let mut vert_size = 0usize;

    for position in 0..tri_size * 3 {
        let original = triangulation.indices[position];
        let slot = slot_of[original as usize] as usize;

        if slot >= vert_size {
            let front = vert_size;
            let displaced = vertex_at[front];

            triangulation.vertices.swap(slot, front);
            vertex_at.swap(slot, front);
            slot_of[original as usize] = front as u32;
            slot_of[displaced as usize] = slot as u32;

            vert_size += 1;
        }

        triangulation.indices[position] = slot_of[original as usize];
    }

    vert_size
}

fn is_duplicate(a: Vector3<f32>, b: Vector3<f32>) -> bool {
    (a.x - b.x).abs() < DEDUP_EPSILON
        && (a.y - b.y).abs() < DEDUP_EPSILON
        && (a.z - b.z).abs() < DEDUP_EPSILON
}

/// Merge vertices that lie within [`DEDUP_EPSILON`] of each other on every
/// axis and compact the vertex list. Returns the number of merges.
///
/// Pairwise and quadratic in the vertex count; navmesh vertex counts are
/// small enough that this only matters at edit time.
pub fn dedup_vertices(vertices: &mut Vec<Vector3<f32>>, indices: &mut [u32]) -> usize {
    let mut size = vertices.len();
    let mut merged = 0;

    let mut keep = 0;
    while keep < size {
        let mut candidate = keep + 1;
        while candidate < size {
            if !is_duplicate(vertices[keep], vertices[candidate]) {
                candidate += 1;
                continue;
            }

            // Fold `candidate` into `keep`, then move the last live vertex
            // into the freed slot and test it against `keep` as well.
            let last = size - 1;
            vertices[candidate] = vertices[last];
            for index in indices.iter_mut() {
                if *index as usize == candidate {
                    *index = keep as u32;
                } else if *index as usize == last {
                    *index = candidate as u32;
                }
            }

            size -= 1;
            merged += 1;
        }
        keep += 1;
    }

    vertices.truncate(size);
    merged
}

/// Remove triangles that merging squeezed down to a line or a point, or
/// tilted past [`FLAT_NORMAL_THRESHOLD`] by moving a corner.
fn drop_invalid_triangles(
    vertices: &[Vector3<f32>],
    indices: &mut Vec<u32>,
    areas: &mut Vec<u8>,
) -> usize {
    let triangle_count = areas.len();
    let mut write = 0;

    for read in 0..triangle_count {
        let (a, b, c) = (indices[read * 3], indices[read * 3 + 1], indices[read * 3 + 2]);
        if a == b || b == c || a == c {
            continue;
        }
        if !is_flat(vertices[a as usize], vertices[b as usize], vertices[c as usize]) {
            continue;
        }

        indices[write * 3] = a;
        indices[write * 3 + 1] = b;
        indices[write * 3 + 2] = c;
        areas[write] = areas[read];
        write += 1;
    }

    indices.truncate(write * 3);
    areas.truncate(write);
    triangle_count - write
}
