//! City sources: random instances and CSV distance matrices.
//!
//! These feed the engine; the engine itself only needs a [`DistanceMetric`].
//!
//! [`DistanceMetric`]: super::metric::DistanceMetric

use super::metric::{DistanceMatrix, DistanceMetric, Point};
use crate::error::{Result, SsgaError};
use rand::Rng;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Side length of the square random cities are drawn from.
pub const COORDINATE_RANGE: f64 = 100.0;

/// `n` points with uniform coordinates in `[0, COORDINATE_RANGE)^2`.
pub fn random_cities<R: Rng>(n: usize, rng: &mut R) -> Vec<Point> {
    (0..n)
        .map(|id| {
            Point::new(
                id,
                rng.random_range(0.0..COORDINATE_RANGE),
                rng.random_range(0.0..COORDINATE_RANGE),
            )
        })
        .collect()
}

/// A random symmetric integer-weighted matrix.
///
/// Each edge gets a base weight in `1..=100`, then integer noise in
/// `-10..=10`, floored at 1. The diagonal is zero.
pub fn random_distance_matrix<R: Rng>(n: usize, rng: &mut R) -> Result<DistanceMatrix> {
    let mut rows = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let scale: f64 = rng.random_range(0.0..1.0);
            let base = (rng.random_range(1..100) as f64 * scale).clamp(1.0, 100.0).trunc();
            let noise = rng.random_range(-10..=10) as f64;
            let d = (base + noise).max(1.0);
            rows[i][j] = d;
            rows[j][i] = d;
        }
    }
    DistanceMatrix::new(rows)
}

/// Reads a comma-separated distance matrix.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn read_distance_matrix<R: BufRead>(reader: R) -> Result<DistanceMatrix> {
    let mut rows = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let row = trimmed
            .split(',')
            .map(|field| {
                field.trim().parse::<f64>().map_err(|e| {
                    SsgaError::city_source(format!(
                        "line {}: cannot parse {:?}: {e}",
                        line_no + 1,
                        field.trim()
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }
    DistanceMatrix::new(rows)
}

/// Reads a CSV distance matrix from a file.
pub fn read_distance_matrix_file<P: AsRef<Path>>(path: P) -> Result<DistanceMatrix> {
    let file = File::open(path)?;
    read_distance_matrix(BufReader::new(file))
}

/// Renders a metric as a right-aligned integer table.
pub fn format_matrix<M: DistanceMetric + ?Sized>(metric: &M) -> String {
    let n = metric.point_count();
    let mut out = String::new();
    for a in 0..n {
        let row: Vec<String> = (0..n)
            .map(|b| format!("{:3}", metric.distance(a, b) as i64))
            .collect();
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    out
}
