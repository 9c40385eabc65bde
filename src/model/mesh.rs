use glam::Vec3;

/// Triangulated geometry ready for upload.
///
/// `indices` name positions in `vertices` three at a time. `normals` is not
/// indexed: it holds one vector per emitted corner, in the same order as
/// `indices`, so a position shared by several faces may carry a different
/// normal on each of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Nothing to draw (positions alone do not produce triangles)
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn corner_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Positions as a flat `x, y, z, x, y, z, ...` slice
    pub fn flat_vertices(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Per-corner normals as a flat slice
    pub fn flat_normals(&self) -> &[f32] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Axis-aligned bounds of the declared positions
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.vertices.iter().map(|v| Vec3::from_array(*v));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), v| (min.min(v), max.max(v))))
    }

    /// Check the layout invariants the renderer relies on
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.indices.len() % 3 != 0 {
            return Err(format!("index count {} is not a multiple of 3", self.indices.len()));
        }
        if self.normals.len() != self.indices.len() {
            return Err(format!(
                "{} normals for {} corners",
                self.normals.len(),
                self.indices.len()
            ));
        }
        let count = self.vertices.len();
        if let Some(bad) = self.indices.iter().find(|&&i| i as usize >= count) {
            return Err(format!("index {bad} out of range for {count} vertices"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> Mesh {
        Mesh {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 2.0, -1.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn test_counts_and_flattening() {
        let mesh = single_triangle();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.corner_count(), 3);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.flat_vertices(), &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0, -1.0]);
        assert_eq!(mesh.flat_normals().len(), 9);
        assert!(mesh.check_invariants().is_ok());
    }

    #[test]
    fn test_bounds() {
        let (min, max) = single_triangle().bounds().unwrap();
        assert_eq!(min, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(max, Vec3::new(1.0, 2.0, 0.0));
        assert!(Mesh::empty().bounds().is_none());
    }

    #[test]
    fn test_invariant_violations() {
        let mut mesh = single_triangle();
        mesh.normals.pop();
        assert!(mesh.check_invariants().is_err());

        let mut mesh = single_triangle();
        mesh.indices[2] = 3;
        assert!(mesh.check_invariants().is_err());
    }

    #[test]
    fn test_positions_without_faces_are_empty() {
        let mesh = Mesh {
            vertices: vec![[1.0, 1.0, 1.0]],
            ..Mesh::empty()
        };
        assert!(mesh.is_empty());
        assert!(mesh.check_invariants().is_ok());
    }
}
