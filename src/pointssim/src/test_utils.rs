//! Synthetic point cloud generators for tests.
//!
//! Clouds with known geometry (planes, grids, spheres) give scoring and
//! estimation tests a ground truth to compare against.

use std::f64::consts::PI;

use crate::cloud::PointCloud;

/// Generate a square XY plane at height `z`.
///
/// # Arguments
/// * `size` - Side length of the square plane
/// * `interval` - Grid spacing between points
/// * `z` - Z coordinate of the plane
pub fn make_xy_plane(size: f64, interval: f64, z: f64) -> Vec<[f64; 3]> {
    let num_points = ((size / interval).round() as usize) + 1;
    let mut points = Vec::with_capacity(num_points * num_points);

    for i in 0..num_points {
        for j in 0..num_points {
            let x = interval * (j as f64);
            let y = interval * (i as f64);
            points.push([x, y, z]);
        }
    }

    points
}

/// Generate a 3D grid of points (cube).
///
/// # Arguments
/// * `size` - Side length of the cube
/// * `interval` - Grid spacing between points
/// * `offset` - Offset to apply to all points
pub fn make_cube_grid(size: f64, interval: f64, offset: [f64; 3]) -> Vec<[f64; 3]> {
    let num_points = ((size / interval).round() as usize) + 1;
    let mut points = Vec::with_capacity(num_points * num_points * num_points);

    for i in 0..num_points {
        for j in 0..num_points {
            for k in 0..num_points {
                let x = offset[0] + interval * (k as f64);
                let y = offset[1] + interval * (j as f64);
                let z = offset[2] + interval * (i as f64);
                points.push([x, y, z]);
            }
        }
    }

    points
}

/// Generate a half-cube: three orthogonal planes sharing the origin corner,
/// with the normal of the plane each point was generated on.
///
/// Points on the shared edges appear once per plane; the duplicate
/// coordinates are removed so the cloud is free of repeated points.
pub fn make_half_cubic(length: f64, interval: f64) -> PointCloud {
    let n = ((length / interval).round() as usize) + 1;
    let mut geometry = Vec::with_capacity(3 * n * n);
    let mut normals = Vec::with_capacity(3 * n * n);

    for i in 0..n {
        for j in 0..n {
            let u = interval * (j as f64);
            let v = interval * (i as f64);

            // XY plane (z=0)
            geometry.push([u, v, 0.0]);
            normals.push([0.0, 0.0, 1.0]);

            // YZ plane (x=0), skip the edge on the XY plane
            if v > 0.0 {
                geometry.push([0.0, u, v]);
                normals.push([1.0, 0.0, 0.0]);
            }

            // ZX plane (y=0), skip the edges on the other planes
            if u > 0.0 && v > 0.0 {
                geometry.push([u, 0.0, v]);
                normals.push([0.0, 1.0, 0.0]);
            }
        }
    }

    PointCloud::new(geometry).with_normals(normals)
}

/// Generate an evenly spread sphere surface (Fibonacci lattice) with exact
/// outward normals and curvature `1 / radius`.
pub fn make_sphere_surface(radius: f64, num_points: usize) -> PointCloud {
    let golden_angle = PI * (3.0 - 5.0_f64.sqrt());
    let mut geometry = Vec::with_capacity(num_points);
    let mut normals = Vec::with_capacity(num_points);

    for i in 0..num_points {
        let z = 1.0 - 2.0 * (i as f64 + 0.5) / num_points as f64;
        let r = (1.0 - z * z).sqrt();
        let theta = golden_angle * i as f64;
        let n = [r * theta.cos(), r * theta.sin(), z];

        geometry.push([radius * n[0], radius * n[1], radius * n[2]]);
        normals.push(n);
    }

    PointCloud::new(geometry)
        .with_normals(normals)
        .with_curvatures(vec![1.0 / radius; num_points])
}

/// Colors forming a smooth gradient along the x axis of the cloud.
pub fn gradient_colors(points: &[[f64; 3]]) -> Vec<[u8; 3]> {
    let (min, max) = compute_bounds(points);
    let span = (max[0] - min[0]).max(f64::EPSILON);
    points
        .iter()
        .map(|p| {
            let t = (p[0] - min[0]) / span;
            let v = (t * 255.0).round() as u8;
            [v, 255 - v, 128]
        })
        .collect()
}

/// Axis-aligned bounds of a point cloud.
fn compute_bounds(points: &[[f64; 3]]) -> ([f64; 3], [f64; 3]) {
    let mut min = [f64::MAX; 3];
    let mut max = [f64::MIN; 3];

    for p in points {
        for i in 0..3 {
            min[i] = min[i].min(p[i]);
            max[i] = max[i].max(p[i]);
        }
    }

    (min, max)
}
