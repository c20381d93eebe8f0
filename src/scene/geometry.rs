use std::f32::consts::{PI, TAU};
use std::sync::Arc;

use glam::Vec3;

use super::SceneError;

/// Upper bound on any segment count, keeping vertex indices within `u32`
pub const MAX_SEGMENTS: u32 = 1024;

/// Triangle mesh with per-vertex attributes
///
/// UVs use a top-left origin so images upload without flipping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: [f32; 2]) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position.to_array());
        self.normals.push(normal.to_array());
        self.uvs.push(uv);
        index
    }

    /// Area-weighted vertex normals, for meshes imported without them
    pub fn compute_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            // out-of-range triangles are left for validate() to report
            let (Some(pa), Some(pb), Some(pc)) =
                (self.positions.get(a), self.positions.get(b), self.positions.get(c))
            else {
                continue;
            };
            let [pa, pb, pc] = [pa, pb, pc].map(|p| Vec3::from_array(*p));
            let face = (pb - pa).cross(pc - pa);
            accum[a] += face;
            accum[b] += face;
            accum[c] += face;
        }
        self.normals = accum
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
            .collect();
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        let count = self.positions.len();
        if count == 0 || self.indices.is_empty() {
            return Err(SceneError::InvalidGeometry("mesh has no triangles".into()));
        }
        if self.normals.len() != count || self.uvs.len() != count {
            return Err(SceneError::InvalidGeometry(format!(
                "attribute length mismatch: {} positions, {} normals, {} uvs",
                count,
                self.normals.len(),
                self.uvs.len()
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(SceneError::InvalidGeometry(
                "index count is not a multiple of 3".into(),
            ));
        }
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= count) {
            return Err(SceneError::InvalidGeometry(format!(
                "index {} out of range for {} vertices",
                bad, count
            )));
        }
        Ok(())
    }
}

/// Geometry descriptor. Sizes follow the usual primitive conventions:
/// boxes and planes are centred on the origin, planes face +Z.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    },
    Plane {
        width: f32,
        height: f32,
    },
    Mesh(Arc<MeshData>),
}

fn positive(name: &str, value: f32) -> Result<(), SceneError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SceneError::InvalidGeometry(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}

impl Geometry {
    pub fn cube(size: f32) -> Self {
        Geometry::Box {
            width: size,
            height: size,
            depth: size,
        }
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        match self {
            Geometry::Box {
                width,
                height,
                depth,
            } => {
                positive("width", *width)?;
                positive("height", *height)?;
                positive("depth", *depth)
            }
            Geometry::Sphere {
                radius,
                width_segments,
                height_segments,
            } => {
                positive("radius", *radius)?;
                if *width_segments < 3 || *height_segments < 2 {
                    return Err(SceneError::InvalidGeometry(format!(
                        "sphere needs at least 3x2 segments, got {}x{}",
                        width_segments, height_segments
                    )));
                }
                if *width_segments > MAX_SEGMENTS || *height_segments > MAX_SEGMENTS {
                    return Err(SceneError::InvalidGeometry(format!(
                        "sphere segments {}x{} exceed the limit of {}",
                        width_segments, height_segments, MAX_SEGMENTS
                    )));
                }
                Ok(())
            }
            Geometry::Cylinder {
                radius_top,
                radius_bottom,
                height,
                radial_segments,
            } => {
                positive("height", *height)?;
                let radii_ok = radius_top.is_finite()
                    && radius_bottom.is_finite()
                    && *radius_top >= 0.0
                    && *radius_bottom >= 0.0
                    && (*radius_top > 0.0 || *radius_bottom > 0.0);
                if !radii_ok {
                    return Err(SceneError::InvalidGeometry(format!(
                        "cylinder radii invalid: top {}, bottom {}",
                        radius_top, radius_bottom
                    )));
                }
                if !(3..=MAX_SEGMENTS).contains(radial_segments) {
                    return Err(SceneError::InvalidGeometry(format!(
                        "cylinder needs 3 to {} radial segments, got {}",
                        MAX_SEGMENTS, radial_segments
                    )));
                }
                Ok(())
            }
            Geometry::Plane { width, height } => {
                positive("width", *width)?;
                positive("height", *height)
            }
            Geometry::Mesh(mesh) => mesh.validate(),
        }
    }

    /// Validate, then build triangles
    pub fn tessellate(&self) -> Result<Arc<MeshData>, SceneError> {
        self.validate()?;
        let mesh = match self {
            Geometry::Box {
                width,
                height,
                depth,
            } => box_mesh(Vec3::new(*width, *height, *depth) * 0.5),
            Geometry::Sphere {
                radius,
                width_segments,
                height_segments,
            } => sphere_mesh(*radius, *width_segments, *height_segments),
            Geometry::Cylinder {
                radius_top,
                radius_bottom,
                height,
                radial_segments,
            } => cylinder_mesh(*radius_top, *radius_bottom, *height, *radial_segments),
            Geometry::Plane { width, height } => {
                let mut mesh = MeshData::default();
                push_quad(
                    &mut mesh,
                    Vec3::new(*width, *height, 0.0) * 0.5,
                    Vec3::Z,
                    Vec3::X,
                    Vec3::Y,
                );
                mesh
            }
            Geometry::Mesh(mesh) => return Ok(Arc::clone(mesh)),
        };
        Ok(Arc::new(mesh))
    }
}

/// One axis-aligned quad; `u x v` must equal `normal` for CCW winding
fn push_quad(mesh: &mut MeshData, half: Vec3, normal: Vec3, u: Vec3, v: Vec3) {
    let corner = |su: f32, sv: f32| (normal + u * su + v * sv) * half;
    let a = mesh.push_vertex(corner(-1.0, -1.0), normal, [0.0, 1.0]);
    let b = mesh.push_vertex(corner(1.0, -1.0), normal, [1.0, 1.0]);
    let c = mesh.push_vertex(corner(1.0, 1.0), normal, [1.0, 0.0]);
    let d = mesh.push_vertex(corner(-1.0, 1.0), normal, [0.0, 0.0]);
    mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
}

fn box_mesh(half: Vec3) -> MeshData {
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    ];
    let mut mesh = MeshData::default();
    for (normal, u, v) in faces {
        push_quad(&mut mesh, half, normal, u, v);
    }
    mesh
}

fn sphere_mesh(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let stride = width_segments + 1;

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let theta = v * PI;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * TAU;
            let normal = Vec3::new(
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            );
            mesh.push_vertex(normal * radius, normal, [u, v]);
        }
    }

    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * stride + ix + 1;
            let b = iy * stride + ix;
            let c = (iy + 1) * stride + ix;
            let d = (iy + 1) * stride + ix + 1;
            // pole rows collapse to a single triangle
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

fn cylinder_mesh(radius_top: f32, radius_bottom: f32, height: f32, radial_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let half_height = height * 0.5;
    let slope = (radius_bottom - radius_top) / height;
    let stride = radial_segments + 1;

    // side wall, top ring first
    for (row, radius, y) in [(0.0, radius_top, half_height), (1.0, radius_bottom, -half_height)] {
        for ix in 0..=radial_segments {
            let u = ix as f32 / radial_segments as f32;
            let theta = u * TAU;
            let (sin, cos) = theta.sin_cos();
            let normal = Vec3::new(sin, slope, cos).normalize();
            mesh.push_vertex(Vec3::new(radius * sin, y, radius * cos), normal, [u, row]);
        }
    }
    for ix in 0..radial_segments {
        let a = ix;
        let b = stride + ix;
        let c = stride + ix + 1;
        let d = ix + 1;
        mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    for (radius, sign) in [(radius_top, 1.0f32), (radius_bottom, -1.0f32)] {
        if radius > 0.0 {
            push_cap(&mut mesh, radius, half_height, sign, radial_segments);
        }
    }
    mesh
}

fn push_cap(mesh: &mut MeshData, radius: f32, half_height: f32, sign: f32, segments: u32) {
    let normal = Vec3::Y * sign;
    let center = mesh.push_vertex(Vec3::new(0.0, half_height * sign, 0.0), normal, [0.5, 0.5]);
    let ring_start = mesh.positions.len() as u32;
    for ix in 0..=segments {
        let theta = ix as f32 / segments as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        mesh.push_vertex(
            Vec3::new(radius * sin, half_height * sign, radius * cos),
            normal,
            [cos * 0.5 + 0.5, 0.5 - sin * 0.5 * sign],
        );
    }
    for ix in 0..segments {
        let i = ring_start + ix;
        if sign > 0.0 {
            mesh.indices.extend_from_slice(&[i, i + 1, center]);
        } else {
            mesh.indices.extend_from_slice(&[i + 1, i, center]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(mesh: &MeshData) {
        assert!(mesh.validate().is_ok(), "mesh should validate");
        for n in &mesh.normals {
            let len = Vec3::from_array(*n).length();
            assert!((len - 1.0).abs() < 1e-4, "normal not unit: {}", len);
        }
    }

    #[test]
    fn test_box_has_24_vertices_and_12_triangles() {
        let mesh = Geometry::cube(1.0).tessellate().unwrap();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert_well_formed(&mesh);
    }

    #[test]
    fn test_box_extents_match_dimensions() {
        let mesh = Geometry::Box {
            width: 2.0,
            height: 4.0,
            depth: 6.0,
        }
        .tessellate()
        .unwrap();
        let max = mesh
            .positions
            .iter()
            .fold(Vec3::splat(f32::MIN), |acc, p| acc.max(Vec3::from_array(*p)));
        assert_eq!(max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_box_winding_faces_outward() {
        let mesh = Geometry::cube(1.0).tessellate().unwrap();
        for tri in mesh.indices.chunks_exact(3) {
            let p: Vec<Vec3> = tri.iter().map(|&i| Vec3::from_array(mesh.positions[i as usize])).collect();
            let face = (p[1] - p[0]).cross(p[2] - p[0]);
            let normal = Vec3::from_array(mesh.normals[tri[0] as usize]);
            assert!(face.dot(normal) > 0.0);
        }
    }

    #[test]
    fn test_sphere_vertices_on_radius() {
        let mesh = Geometry::Sphere {
            radius: 0.5,
            width_segments: 32,
            height_segments: 32,
        }
        .tessellate()
        .unwrap();
        assert_eq!(mesh.vertex_count(), 33 * 33);
        // two pole rows contribute one triangle per segment instead of two
        assert_eq!(mesh.triangle_count(), 32 * 32 * 2 - 2 * 32);
        for p in &mesh.positions {
            assert!((Vec3::from_array(*p).length() - 0.5).abs() < 1e-5);
        }
        assert_well_formed(&mesh);
    }

    #[test]
    fn test_cylinder_with_caps() {
        let mesh = Geometry::Cylinder {
            radius_top: 0.5,
            radius_bottom: 0.5,
            height: 1.0,
            radial_segments: 32,
        }
        .tessellate()
        .unwrap();
        // wall: 2 rings of 33, caps: center + 33 each
        assert_eq!(mesh.vertex_count(), 2 * 33 + 2 * 34);
        assert_eq!(mesh.triangle_count(), 2 * 32 + 2 * 32);
        assert_well_formed(&mesh);
    }

    #[test]
    fn test_cone_skips_missing_cap() {
        let mesh = Geometry::Cylinder {
            radius_top: 0.0,
            radius_bottom: 1.0,
            height: 2.0,
            radial_segments: 8,
        }
        .tessellate()
        .unwrap();
        assert_eq!(mesh.triangle_count(), 2 * 8 + 8);
    }

    #[test]
    fn test_plane_faces_z() {
        let mesh = Geometry::Plane {
            width: 4.0,
            height: 2.0,
        }
        .tessellate()
        .unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert!(mesh.positions.iter().all(|p| p[2] == 0.0));
        assert!(mesh.normals.iter().all(|n| *n == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_invalid_descriptors_rejected() {
        assert!(Geometry::cube(0.0).tessellate().is_err());
        assert!(Geometry::cube(f32::NAN).tessellate().is_err());
        assert!(Geometry::Sphere {
            radius: 1.0,
            width_segments: 2,
            height_segments: 8,
        }
        .validate()
        .is_err());
        assert!(Geometry::Cylinder {
            radius_top: 0.0,
            radius_bottom: 0.0,
            height: 1.0,
            radial_segments: 8,
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_mesh_index_out_of_range() {
        let mesh = MeshData {
            positions: vec![[0.0; 3]; 3],
            normals: vec![[0.0, 1.0, 0.0]; 3],
            uvs: vec![[0.0; 2]; 3],
            indices: vec![0, 1, 3],
        };
        assert!(matches!(mesh.validate(), Err(SceneError::InvalidGeometry(_))));
    }

    #[test]
    fn test_compute_normals_flat_triangle() {
        let mut mesh = MeshData {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: Vec::new(),
            uvs: vec![[0.0; 2]; 3],
            indices: vec![0, 1, 2],
        };
        mesh.compute_normals();
        assert!(mesh.normals.iter().all(|n| *n == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_compute_normals_skips_out_of_range_triangle() {
        let mut mesh = MeshData {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: Vec::new(),
            uvs: vec![[0.0; 2]; 3],
            indices: vec![0, 1, 2, 0, 1, 7],
        };
        mesh.compute_normals();
        assert_eq!(mesh.normals.len(), 3);
        assert!(mesh.normals.iter().all(|n| *n == [0.0, 0.0, 1.0]));
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_segment_counts_above_limit_rejected() {
        let too_wide = Geometry::Sphere {
            radius: 1.0,
            width_segments: MAX_SEGMENTS + 1,
            height_segments: 8,
        };
        let too_tall = Geometry::Sphere {
            radius: 1.0,
            width_segments: 8,
            height_segments: u32::MAX,
        };
        let too_round = Geometry::Cylinder {
            radius_top: 1.0,
            radius_bottom: 1.0,
            height: 1.0,
            radial_segments: u32::MAX,
        };
        for geometry in [too_wide, too_tall, too_round] {
            assert!(matches!(
                geometry.tessellate(),
                Err(SceneError::InvalidGeometry(_))
            ));
        }

        let at_limit = Geometry::Cylinder {
            radius_top: 1.0,
            radius_bottom: 1.0,
            height: 1.0,
            radial_segments: MAX_SEGMENTS,
        };
        assert!(at_limit.validate().is_ok());
    }
}
