use std::io::Write;
use std::path::Path;

use meshview::{load_obj, LoadError, ParseErrorKind};

fn write_obj(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".obj").tempfile().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loads_bundled_cube() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/cube.obj");
    let mesh = load_obj(&path).unwrap();

    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.triangle_count(), 12);
    assert_eq!(mesh.corner_count(), 36);
    assert_eq!(mesh.normals.len(), 36);
    mesh.check_invariants().unwrap();

    let (min, max) = mesh.bounds().unwrap();
    assert_eq!(min.to_array(), [-1.0, -1.0, -1.0]);
    assert_eq!(max.to_array(), [1.0, 1.0, 1.0]);

    // every triangle on the +Z face carries the +Z normal
    assert!(mesh.normals[..6].iter().all(|n| *n == [0.0, 0.0, 1.0]));
}

#[test]
fn loads_file_from_disk() {
    let file = write_obj(
        "# triangle with a comment\n\
         v 0 0 0\nv 1 0 0\nv 0 1 0\n\
         vn 0 0 1\n\
         usemtl none\n\
         f 1//1 2//1 3//1\n",
    );
    let mesh = load_obj(file.path()).unwrap();

    assert_eq!(mesh.indices, vec![0, 1, 2]);
    assert_eq!(mesh.normals, vec![[0.0, 0.0, 1.0]; 3]);
}

#[test]
fn reports_line_of_bad_record() {
    let file = write_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 9//1\n");

    match load_obj(file.path()) {
        Err(LoadError::Parse { line, kind }) => {
            assert_eq!(line, 5);
            assert_eq!(kind, ParseErrorKind::PositionOutOfRange { index: 9, count: 3 });
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn missing_file_is_reported_by_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.obj");

    match load_obj(&path) {
        Err(LoadError::FileNotFound { path: p }) => assert_eq!(p, path),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
}
