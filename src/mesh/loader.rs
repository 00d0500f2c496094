use nalgebra as na;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

use crate::error::LoadError;

/// Largest dimension of a normalized model, in world units.
pub const TARGET_SIZE: f32 = 3.0;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: na::Point3<f32>,
    pub max: na::Point3<f32>,
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: na::Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: na::Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn extend(&mut self, p: &na::Point3<f32>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn center(&self) -> na::Point3<f32> {
        na::center(&self.min, &self.max)
    }

    pub fn size(&self) -> na::Vector3<f32> {
        self.max - self.min
    }

    pub fn max_dimension(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }
}

/// Summary statistics derived from a loaded model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelInfo {
    pub mesh_count: usize,
    pub material_count: usize,
    pub triangle_count: usize,
    /// Bounding dimensions after normalization, rounded to two decimals
    pub dimensions: [f32; 3],
}

/// CPU-side geometry ready for upload: world-space positions and normals,
/// triangle-list indices, already centered at the origin and scaled so the
/// largest dimension equals [`TARGET_SIZE`].
pub struct SceneModel {
    pub positions: Vec<na::Point3<f32>>,
    pub normals: Vec<na::Vector3<f32>>,
    pub indices: Vec<u32>,
    pub info: ModelInfo,
    /// Largest post-scale dimension, used for camera framing
    pub max_dimension: f32,
}

#[derive(Default)]
struct Geometry {
    positions: Vec<na::Point3<f32>>,
    normals: Vec<na::Vector3<f32>>,
    indices: Vec<u32>,
    mesh_count: usize,
    materials: HashSet<Option<usize>>,
    triangle_count: usize,
}

/// Load a model file (supports .glb and .gltf)
pub fn load_model(path: &Path) -> Result<SceneModel, LoadError> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .ok_or_else(|| LoadError::MissingExtension(path.to_path_buf()))?;

    match extension.as_str() {
        "glb" | "gltf" => load_gltf(path),
        _ => Err(LoadError::UnsupportedFormat(extension)),
    }
}

fn load_gltf(path: &Path) -> Result<SceneModel, LoadError> {
    let (document, buffers, _images) = gltf::import(path)?;

    let mut geometry = Geometry::default();
    let identity = na::Matrix4::identity();

    if let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) {
        for node in scene.nodes() {
            collect_node(&node, &identity, &buffers, &mut geometry)?;
        }
    } else {
        // Document without a scene: read the meshes directly
        for mesh in document.meshes() {
            collect_mesh(&mesh, &identity, &buffers, &mut geometry)?;
        }
    }

    if geometry.positions.is_empty() || geometry.indices.is_empty() {
        return Err(LoadError::NoGeometry);
    }

    // Center at the origin and scale the largest dimension to TARGET_SIZE
    let mut aabb = Aabb::empty();
    for p in &geometry.positions {
        aabb.extend(p);
    }

    let center = aabb.center();
    let scale = normalize_scale(aabb.max_dimension());
    for p in &mut geometry.positions {
        *p = na::Point3::from((*p - center) * scale);
    }

    let size = aabb.size() * scale;
    let info = ModelInfo {
        mesh_count: geometry.mesh_count,
        material_count: geometry.materials.len(),
        triangle_count: geometry.triangle_count,
        dimensions: [round2(size.x), round2(size.y), round2(size.z)],
    };

    Ok(SceneModel {
        positions: geometry.positions,
        normals: geometry.normals,
        indices: geometry.indices,
        info,
        max_dimension: size.x.max(size.y).max(size.z),
    })
}

fn collect_node(
    node: &gltf::Node,
    parent: &na::Matrix4<f32>,
    buffers: &[gltf::buffer::Data],
    out: &mut Geometry,
) -> Result<(), LoadError> {
    let local: na::Matrix4<f32> = node.transform().matrix().into();
    let world = parent * local;

    if let Some(mesh) = node.mesh() {
        collect_mesh(&mesh, &world, buffers, out)?;
    }

    for child in node.children() {
        collect_node(&child, &world, buffers, out)?;
    }

    Ok(())
}

fn collect_mesh(
    mesh: &gltf::Mesh,
    world: &na::Matrix4<f32>,
    buffers: &[gltf::buffer::Data],
    out: &mut Geometry,
) -> Result<(), LoadError> {
    out.mesh_count += 1;
    let normal_matrix = normal_matrix(world);

    for primitive in mesh.primitives() {
        // Distinct materials; primitives without one share the default slot
        out.materials.insert(primitive.material().index());

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<na::Point3<f32>> = reader
            .read_positions()
            .ok_or(LoadError::MissingPositions)?
            .map(|p| world.transform_point(&na::Point3::from(p)))
            .collect();

        let read_indices = reader
            .read_indices()
            .map(|ix| ix.into_u32().collect::<Vec<u32>>());

        out.triangle_count +=
            primitive_triangle_count(read_indices.as_ref().map(|v| v.len()), positions.len());

        // Generate sequential indices for non-indexed geometry
        let indices = read_indices.unwrap_or_else(|| (0..positions.len() as u32).collect());

        let normals: Vec<na::Vector3<f32>> = match reader.read_normals() {
            Some(normals) => normals
                .map(|n| (normal_matrix * na::Vector3::from(n)).normalize())
                .collect(),
            None => compute_vertex_normals(&positions, &indices),
        };

        let vertex_offset = out.positions.len() as u32;
        out.positions.extend(positions);
        out.normals.extend(normals);
        out.indices.extend(indices.iter().map(|i| i + vertex_offset));
    }

    Ok(())
}

/// Triangle count for one primitive: index count over three when indexed,
/// vertex count over three otherwise, rounded to the nearest integer.
pub fn primitive_triangle_count(index_count: Option<usize>, vertex_count: usize) -> usize {
    let count = index_count.unwrap_or(vertex_count);
    (count as f64 / 3.0).round() as usize
}

/// Uniform scale mapping the largest dimension onto TARGET_SIZE.
/// Degenerate (zero-size) boxes are left unscaled.
pub fn normalize_scale(max_dimension: f32) -> f32 {
    if max_dimension > 0.0 {
        TARGET_SIZE / max_dimension
    } else {
        1.0
    }
}

pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

fn normal_matrix(world: &na::Matrix4<f32>) -> na::Matrix3<f32> {
    let linear = world.fixed_view::<3, 3>(0, 0).into_owned();
    linear
        .try_inverse()
        .map(|inv| inv.transpose())
        .unwrap_or(linear)
}

/// Smooth per-vertex normals accumulated from face normals, for primitives
/// that ship without normal data.
fn compute_vertex_normals(
    positions: &[na::Point3<f32>],
    indices: &[u32],
) -> Vec<na::Vector3<f32>> {
    let mut normals = vec![na::Vector3::zeros(); positions.len()];

    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let face = (positions[b] - positions[a]).cross(&(positions[c] - positions[a]));
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    normals
        .into_iter()
        .map(|n| n.try_normalize(1e-8).unwrap_or_else(na::Vector3::y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_center_and_size() {
        let mut aabb = Aabb::empty();
        aabb.extend(&na::Point3::new(-1.0, 0.0, 2.0));
        aabb.extend(&na::Point3::new(1.0, 4.0, 10.0));

        assert_eq!(aabb.center(), na::Point3::new(0.0, 2.0, 6.0));
        assert_eq!(aabb.size(), na::Vector3::new(2.0, 4.0, 8.0));
        assert_eq!(aabb.max_dimension(), 8.0);
    }

    #[test]
    fn test_normalize_scale_maps_largest_dimension_to_target() {
        // A (2, 4, 8) box scales by 3/8
        assert!((normalize_scale(8.0) - 0.375).abs() < 1e-6);
        assert!((8.0 * normalize_scale(8.0) - TARGET_SIZE).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_scale_degenerate_box() {
        assert_eq!(normalize_scale(0.0), 1.0);
    }

    #[test]
    fn test_triangle_count_indexed() {
        // 300 indices -> 100 triangles, regardless of vertex count
        assert_eq!(primitive_triangle_count(Some(300), 72), 100);
    }

    #[test]
    fn test_triangle_count_non_indexed() {
        assert_eq!(primitive_triangle_count(None, 300), 100);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(2.999), 3.0);
        assert_eq!(round2(-0.005001), -0.01);
    }

    #[test]
    fn test_computed_normals_face_up() {
        // CCW triangle in the XZ plane, viewed from +Y
        let positions = vec![
            na::Point3::new(0.0, 0.0, 0.0),
            na::Point3::new(0.0, 0.0, 1.0),
            na::Point3::new(1.0, 0.0, 0.0),
        ];
        let indices = vec![0, 1, 2];

        for n in compute_vertex_normals(&positions, &indices) {
            assert!((n - na::Vector3::y()).norm() < 1e-6);
        }
    }
}
