use criterion::{Criterion, criterion_group, criterion_main};
use glam::{Mat4, Vec3};
use scene_flattener::flatten::Flattener;
use scene_flattener::ingestion::{FaceCorner, Tessellation};
use scene_flattener::parsing::parse_matrix;
use scene_flattener::types::{MaterialTable, Shape, ShapeKind};

/// Generate a flat grid tessellation with `n x n` quads (2 triangles each),
/// per-vertex uvs and a single shared normal.
fn make_grid(n: usize) -> Tessellation {
    let verts_per_side = n + 1;
    let vertex_count = verts_per_side * verts_per_side;
    let mut positions = Vec::with_capacity(vertex_count * 3);
    let mut texcoords = Vec::with_capacity(vertex_count * 2);

    for y in 0..verts_per_side {
        for x in 0..verts_per_side {
            let fx = x as f32 / n as f32;
            let fy = y as f32 / n as f32;
            positions.extend_from_slice(&[fx, fy, 0.0]);
            texcoords.extend_from_slice(&[fx, fy]);
        }
    }

    let corner = |i: u32| FaceCorner::new(i, Some(0), Some(i));
    let mut faces = Vec::with_capacity(n * n * 6);
    for y in 0..n {
        for x in 0..n {
            let tl = (y * verts_per_side + x) as u32;
            let tr = tl + 1;
            let bl = tl + verts_per_side as u32;
            let br = bl + 1;
            faces.extend([tl, bl, tr, tr, bl, br].map(corner));
        }
    }

    Tessellation {
        positions,
        normals: vec![0.0, 0.0, 1.0],
        texcoords,
        faces,
    }
}

fn bench_weld(c: &mut Criterion) {
    // ~100K triangles: 224x224 grid = 50176 quads = 100352 triangles
    let tess = make_grid(224);
    let table = MaterialTable::new();
    let shape = Shape {
        source_file: Some("grid.obj".into()),
        transform: Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            glam::Quat::from_rotation_y(0.3),
            Vec3::new(1.0, 2.0, 3.0),
        ),
        ..Shape::new(ShapeKind::Mesh)
    };

    c.bench_function("weld_mesh_100k", |b| {
        b.iter(|| {
            let mut flattener = Flattener::new(&table);
            flattener.flatten_mesh(&shape, &tess).unwrap();
            flattener.finish()
        });
    });
}

fn bench_rectangles(c: &mut Criterion) {
    let table = MaterialTable::new();
    let shape = Shape::new(ShapeKind::Rectangle);

    c.bench_function("flatten_1k_rectangles", |b| {
        b.iter(|| {
            let mut flattener = Flattener::new(&table);
            for _ in 0..1000 {
                flattener.flatten_rectangle(&shape);
            }
            flattener.finish()
        });
    });
}

fn bench_parse_matrix(c: &mut Criterion) {
    let text = "0.5 0 0 1.25 0 0.5 0 -3 0 0 0.5 7.5 0 0 0 1";
    c.bench_function("parse_matrix", |b| b.iter(|| parse_matrix(text)));
}

criterion_group!(benches, bench_weld, bench_rectangles, bench_parse_matrix);
criterion_main!(benches);
