use glium::implement_vertex;

use crate::error::RenderError;

pub const FACE_COUNT: usize = 6;
pub const VERTICES_PER_FACE: usize = 4;

/// Two triangles per face, relative to the face's first vertex
const FACE_PATTERN: [u32; 6] = [0, 1, 2, 3, 2, 1];

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

implement_vertex!(Vertex, position, tex_coords);

const fn v(position: [f32; 3], tex_coords: [f32; 2]) -> Vertex {
    Vertex {
        position,
        tex_coords,
    }
}

/// The unit cube as six independent quads, each mapped onto its own region of the
/// texture atlas. Corners are repeated because neighbouring faces disagree on UVs.
pub fn cube_vertices() -> Vec<Vertex> {
    vec![
        // -X
        v([-1.0, -1.0, -1.0], [0.0, 0.0]),
        v([-1.0, -1.0, 1.0], [0.0, 0.5]),
        v([-1.0, 1.0, -1.0], [0.5, 0.0]),
        v([-1.0, 1.0, 1.0], [0.5, 0.5]),
        // +X
        v([1.0, -1.0, -1.0], [0.5, 0.0]),
        v([1.0, 1.0, -1.0], [1.0, 0.0]),
        v([1.0, -1.0, 1.0], [0.5, 0.5]),
        v([1.0, 1.0, 1.0], [1.0, 0.5]),
        // -Y
        v([-1.0, -1.0, -1.0], [0.5, 0.5]),
        v([1.0, -1.0, -1.0], [1.0, 0.5]),
        v([-1.0, -1.0, 1.0], [0.5, 1.0]),
        v([1.0, -1.0, 1.0], [1.0, 1.0]),
        // +Y
        v([-1.0, 1.0, -1.0], [0.0, 0.5]),
        v([-1.0, 1.0, 1.0], [0.0, 1.0]),
        v([1.0, 1.0, -1.0], [0.5, 0.5]),
        v([1.0, 1.0, 1.0], [0.5, 1.0]),
        // -Z
        v([-1.0, -1.0, -1.0], [0.25, 0.25]),
        v([-1.0, 1.0, -1.0], [0.75, 0.25]),
        v([1.0, -1.0, -1.0], [0.25, 0.75]),
        v([1.0, 1.0, -1.0], [0.75, 0.75]),
        // +Z
        v([-1.0, -1.0, 1.0], [0.0, 0.0]),
        v([1.0, -1.0, 1.0], [0.5, 0.0]),
        v([-1.0, 1.0, 1.0], [0.0, 0.5]),
        v([1.0, 1.0, 1.0], [0.5, 0.5]),
    ]
}

/// Faces are stored back to back, so the indices are the same pattern shifted by
/// four for every face.
pub fn cube_indices() -> Vec<u32> {
    (0..FACE_COUNT as u32)
        .flat_map(|face| {
            FACE_PATTERN.map(|offset| face * VERTICES_PER_FACE as u32 + offset)
        })
        .collect()
}

/// Returns the first index that does not point into the vertex list.
pub fn validate_indices(indices: &[u32], vertex_count: usize) -> Result<(), RenderError> {
    match indices
        .iter()
        .find(|&&index| usize::try_from(index).map_or(true, |i| i >= vertex_count))
    {
        Some(&index) => Err(RenderError::InvalidGeometry {
            index,
            vertex_count,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_24_vertices_and_36_indices() {
        let vertices = cube_vertices();
        let indices = cube_indices();
        assert_eq!(vertices.len(), FACE_COUNT * VERTICES_PER_FACE);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
        validate_indices(&indices, vertices.len()).unwrap();
    }

    #[test]
    fn every_face_uses_only_its_own_quad() {
        for (face, chunk) in cube_indices().chunks(6).enumerate() {
            let base = (face * VERTICES_PER_FACE) as u32;
            assert_eq!(
                chunk,
                [base, base + 1, base + 2, base + 3, base + 2, base + 1]
            );
        }
    }

    #[test]
    fn each_quad_is_planar_on_a_cube_face() {
        for quad in cube_vertices().chunks(VERTICES_PER_FACE) {
            let fixed_axis = (0..3).find(|&axis| {
                quad.iter()
                    .all(|vertex| vertex.position[axis] == quad[0].position[axis])
            });
            let axis = fixed_axis.expect("quad should lie on one face");
            assert_eq!(quad[0].position[axis].abs(), 1.0);
        }
    }

    #[test]
    fn uvs_stay_inside_the_atlas() {
        for vertex in cube_vertices() {
            assert!(vertex.tex_coords.iter().all(|c| (0.0..=1.0).contains(c)));
        }
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let err = validate_indices(&[0, 1, 2, 3, 24], 24).unwrap_err();
        assert!(matches!(
            err,
            RenderError::InvalidGeometry {
                index: 24,
                vertex_count: 24
            }
        ));
    }

    #[test]
    fn empty_index_list_is_valid() {
        assert!(validate_indices(&[], 0).is_ok());
    }
}
