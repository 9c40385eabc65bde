//! Wavefront OBJ subset loader.
//!
//! Understands `v`, `vn` and `f` records; every other line is skipped. Faces
//! must carry a normal index on every corner (`p/t/n` or `p//n`). Polygons
//! are fan-triangulated from their first corner, which is only correct for
//! convex, planar faces.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info, trace};

use crate::error::{LoadError, ParseErrorKind};
use crate::model::Mesh;

/// One `p/[t]/n` reference, still 1-based as written in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Corner {
    position: usize,
    normal: usize,
}

#[derive(Debug)]
struct Face {
    line: usize,
    corners: Vec<Corner>,
}

/// Load and triangulate the OBJ file at `path`
pub fn load_obj(path: impl AsRef<Path>) -> Result<Mesh, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::FileNotFound { path: path.to_path_buf() },
        _ => LoadError::Io { path: path.to_path_buf(), source },
    })?;

    let mesh = parse_reader(BufReader::new(file), path)?;

    match mesh.bounds() {
        Some((min, max)) => info!(
            "loaded {}: {} vertices, {} triangles, bounds {:?}..{:?}",
            path.display(),
            mesh.vertex_count(),
            mesh.triangle_count(),
            min,
            max
        ),
        None => info!("loaded {}: no vertices", path.display()),
    }
    Ok(mesh)
}

/// Parse OBJ text already in memory
pub fn parse_obj(text: &str) -> Result<Mesh, LoadError> {
    parse_reader(text.as_bytes(), Path::new("<memory>"))
}

/// Parse OBJ records from any buffered reader; `source` only labels I/O errors
pub fn parse_reader<R: BufRead>(reader: R, source: &Path) -> Result<Mesh, LoadError> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut faces: Vec<Face> = Vec::new();
    let mut skipped = 0usize;

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| LoadError::Io { path: source.to_path_buf(), source: e })?;
        let line_no = line_idx + 1;
        let mut parts = line.split_whitespace();

        let Some(tag) = parts.next() else { continue };
        match tag {
            "v" => positions.push(parse_triple("v", parts).map_err(|k| LoadError::parse(line_no, k))?),
            "vn" => normals.push(parse_triple("vn", parts).map_err(|k| LoadError::parse(line_no, k))?),
            "f" => {
                let corners = parts
                    .map(parse_corner)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|k| LoadError::parse(line_no, k))?;
                if corners.len() < 3 {
                    return Err(LoadError::parse(line_no, ParseErrorKind::TooFewCorners(corners.len())));
                }
                faces.push(Face { line: line_no, corners });
            }
            other => {
                trace!("line {line_no}: skipping '{other}' record");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        debug!("skipped {skipped} unsupported lines in {}", source.display());
    }

    triangulate(positions, &normals, &faces)
}

fn parse_triple<'a>(
    tag: &'static str,
    parts: impl Iterator<Item = &'a str>,
) -> Result<[f32; 3], ParseErrorKind> {
    let mut out = [0.0f32; 3];
    let mut found = 0;
    // Anything past the third component (e.g. the optional `w`) is ignored
    for (slot, token) in out.iter_mut().zip(parts) {
        *slot = token
            .parse::<f32>()
            .map_err(|_| ParseErrorKind::InvalidNumber(token.to_string()))?;
        found += 1;
    }
    if found < 3 {
        return Err(ParseErrorKind::MissingComponents { tag, found });
    }
    Ok(out)
}

/// Split `p/[t]/n`. The normal is whatever follows the second slash; the
/// texture field between the slashes may be empty and is not used.
fn parse_corner(token: &str) -> Result<Corner, ParseErrorKind> {
    let missing_normal = || ParseErrorKind::MissingNormal(token.to_string());

    let (position, rest) = token.split_once('/').ok_or_else(missing_normal)?;
    let (_texture, normal) = rest.split_once('/').ok_or_else(missing_normal)?;
    if normal.is_empty() {
        return Err(missing_normal());
    }

    Ok(Corner {
        position: parse_index(position)?,
        normal: parse_index(normal)?,
    })
}

fn parse_index(text: &str) -> Result<usize, ParseErrorKind> {
    match text.parse::<usize>() {
        Ok(index) if index >= 1 => Ok(index),
        _ => Err(ParseErrorKind::InvalidIndex(text.to_string())),
    }
}

/// Resolve a corner to its 0-based position index and its normal vector
fn resolve(
    corner: Corner,
    position_count: usize,
    normals: &[[f32; 3]],
) -> Result<(u32, [f32; 3]), ParseErrorKind> {
    if corner.position > position_count {
        return Err(ParseErrorKind::PositionOutOfRange {
            index: corner.position,
            count: position_count,
        });
    }
    let normal = normals
        .get(corner.normal - 1)
        .copied()
        .ok_or(ParseErrorKind::NormalOutOfRange { index: corner.normal, count: normals.len() })?;
    let index = u32::try_from(corner.position - 1).map_err(|_| ParseErrorKind::IndexOverflow)?;
    Ok((index, normal))
}

/// Fan-triangulate every face. Faces are resolved only after the whole file
/// has been read, so they may refer to records declared further down.
fn triangulate(
    positions: Vec<[f32; 3]>,
    normals: &[[f32; 3]],
    faces: &[Face],
) -> Result<Mesh, LoadError> {
    let corner_total: usize = faces.iter().map(|f| (f.corners.len() - 2) * 3).sum();
    let mut indices = Vec::with_capacity(corner_total);
    let mut corner_normals = Vec::with_capacity(corner_total);

    for face in faces {
        let resolved = face
            .corners
            .iter()
            .map(|&c| resolve(c, positions.len(), normals))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|k| LoadError::parse(face.line, k))?;

        for i in 1..resolved.len() - 1 {
            for &(index, normal) in [&resolved[0], &resolved[i], &resolved[i + 1]] {
                indices.push(index);
                corner_normals.push(normal);
            }
        }
    }

    Ok(Mesh {
        vertices: positions,
        normals: corner_normals,
        indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
vn 0 0 2
vn 0 0 3
vn 0 0 4
f 1/1/1 2/1/2 3/1/3 4/1/4
";

    fn parse_err(text: &str) -> (usize, ParseErrorKind) {
        match parse_obj(text) {
            Err(LoadError::Parse { line, kind }) => (line, kind),
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_single_triangle() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvn 0 1 0\nvn 1 0 0\nf 1/1/1 2/1/2 3/1/3\n").unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices, vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert_eq!(mesh.normals, vec![[0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_quad_fan_uses_each_triangles_own_normals() {
        let mesh = parse_obj(QUAD).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        let z: Vec<f32> = mesh.normals.iter().map(|n| n[2]).collect();
        assert_eq!(z, vec![1.0, 2.0, 3.0, 1.0, 3.0, 4.0]);
    }

    #[test]
    fn test_polygon_emits_corner_count_minus_two_triangles() {
        let mesh = parse_obj(
            "v 0 0 0\nv 1 0 0\nv 2 1 0\nv 1 2 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1 4//1 5//1\n",
        )
        .unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);
        assert_eq!(mesh.normals.len(), mesh.indices.len());
        assert!(mesh.check_invariants().is_ok());
    }

    #[test]
    fn test_empty_texture_field() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n").unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_no_faces_keeps_positions() {
        let mesh = parse_obj("# header\nv 1 2 3\nv 4 5 6\nvt 0 0\n").unwrap();
        assert!(mesh.is_empty());
        assert!(mesh.normals.is_empty());
        assert_eq!(mesh.vertices, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    }

    #[test]
    fn test_unknown_records_are_ignored() {
        let text = format!("mtllib x.mtl\no thing\ng group\ns off\nusemtl red\nvt 0.5 0.5\n\n{QUAD}");
        assert_eq!(parse_obj(&text).unwrap(), parse_obj(QUAD).unwrap());
    }

    #[test]
    fn test_forward_references_resolve() {
        let mesh = parse_obj("f 1//1 2//1 3//1\nv 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\n").unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_extra_components_are_ignored() {
        let mesh = parse_obj("v 1 2 3 1.0\n").unwrap();
        assert_eq!(mesh.vertices, vec![[1.0, 2.0, 3.0]]);
    }

    #[test]
    fn test_bare_index_is_rejected() {
        let (line, kind) = parse_err("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        assert_eq!(line, 4);
        assert_eq!(kind, ParseErrorKind::MissingNormal("1".into()));
    }

    #[test]
    fn test_missing_normal_field_is_rejected() {
        let (_, kind) = parse_err("v 0 0 0\nvn 0 0 1\nf 1/1 1/1 1/1\n");
        assert_eq!(kind, ParseErrorKind::MissingNormal("1/1".into()));

        let (_, kind) = parse_err("v 0 0 0\nvn 0 0 1\nf 1// 1// 1//\n");
        assert_eq!(kind, ParseErrorKind::MissingNormal("1//".into()));
    }

    #[test]
    fn test_out_of_range_indices_are_rejected() {
        let (line, kind) = parse_err("v 0 0 0\nv 1 0 0\nvn 0 0 1\nf 1//1 2//1 3//1\n");
        assert_eq!(line, 4);
        assert_eq!(kind, ParseErrorKind::PositionOutOfRange { index: 3, count: 2 });

        let (_, kind) = parse_err("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//2\n");
        assert_eq!(kind, ParseErrorKind::NormalOutOfRange { index: 2, count: 1 });
    }

    #[test]
    fn test_zero_and_negative_indices_are_rejected() {
        let (_, kind) = parse_err("v 0 0 0\nvn 0 0 1\nf 0//1 1//1 1//1\n");
        assert_eq!(kind, ParseErrorKind::InvalidIndex("0".into()));

        let (_, kind) = parse_err("v 0 0 0\nvn 0 0 1\nf -1//1 1//1 1//1\n");
        assert_eq!(kind, ParseErrorKind::InvalidIndex("-1".into()));
    }

    #[test]
    fn test_degenerate_face_is_rejected() {
        let (line, kind) = parse_err("v 0 0 0\nvn 0 0 1\nf 1//1 1//1\n");
        assert_eq!(line, 3);
        assert_eq!(kind, ParseErrorKind::TooFewCorners(2));
    }

    #[test]
    fn test_malformed_numbers_are_rejected() {
        let (line, kind) = parse_err("v 0 0 0\nv 1 zero 0\n");
        assert_eq!(line, 2);
        assert_eq!(kind, ParseErrorKind::InvalidNumber("zero".into()));

        let (_, kind) = parse_err("vn 0 1\n");
        assert_eq!(kind, ParseErrorKind::MissingComponents { tag: "vn", found: 2 });
    }

    #[test]
    fn test_missing_file() {
        let err = load_obj("definitely/not/here.obj").unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
    }
}
