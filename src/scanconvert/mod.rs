pub mod delaunay;
pub mod mask;
pub mod resample;

use nalgebra::Point2;
use ndarray::Array2;
use rayon::prelude::*;

use crate::error::ConvertError;
use crate::io::ScanGeometryConfig;
use delaunay::TriangleMesh;

/// Cartesian coordinates of every point of the polar acquisition grid,
/// shape (num_lines, num_samples_along_lines).
///
/// `x_cart` holds the row coordinate, `y_cart` the column coordinate of each
/// sample in the curvilinear image. Computed once per configuration and held
/// read-only for the process lifetime; both the weight builder and the
/// inverse resampler consume it.
#[derive(Debug, Clone)]
pub struct SampleGrid {
    pub x_cart: Array2<f64>,
    pub y_cart: Array2<f64>,
}

/// `start + (end - start) * i / (n - 1)`, endpoints included.
#[inline]
fn linspace_at(start: f64, end: f64, n: usize, i: usize) -> f64 {
    if n <= 1 {
        return start;
    }
    start + (end - start) * i as f64 / (n - 1) as f64
}

impl SampleGrid {
    /// Builds the regular (angle, radius) mesh and converts each polar pair
    /// to cartesian: `x = r·cos(θ) + center_row`, `y = r·sin(θ) + center_col`.
    /// Angles vary along columns, radii along rows.
    pub fn compute(config: &ScanGeometryConfig) -> Self {
        let theta_min = config.angle_min_degrees.to_radians();
        let theta_max = config.angle_max_degrees.to_radians();
        let (num_lines, num_samples) = config.linear_shape();
        let [center_row, center_col] = config.center_coordinate_pixel;

        let mut x_cart = Array2::zeros((num_lines, num_samples));
        let mut y_cart = Array2::zeros((num_lines, num_samples));
        for i in 0..num_lines {
            let r = linspace_at(
                config.radius_start_pixels,
                config.radius_end_pixels,
                num_lines,
                i,
            );
            for j in 0..num_samples {
                let theta = linspace_at(theta_min, theta_max, num_samples, j);
                x_cart[[i, j]] = r * theta.cos() + center_row;
                y_cart[[i, j]] = r * theta.sin() + center_col;
            }
        }
        SampleGrid { x_cart, y_cart }
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.x_cart.dim()
    }

    /// Row-major flattening of the grid into 2D points, the order the
    /// forward converter indexes linear frames in.
    fn flat_points(&self) -> Vec<Point2<f64>> {
        self.x_cart
            .iter()
            .zip(self.y_cart.iter())
            .map(|(&x, &y)| Point2::new(x, y))
            .collect()
    }
}

/// Precomputed barycentric interpolation table mapping the irregular
/// cartesian samples onto the regular curvilinear output grid.
///
/// One row per output pixel: three indices into the flattened linear frame
/// and three coefficients summing to 1. Building this costs a triangulation
/// plus one point-location query per output pixel; applying it is a dot
/// product per pixel, which is what makes per-frame conversion cheap.
///
/// Pixels outside the convex hull of the sample grid get extrapolated
/// coefficients from the triangle the locate walk exited through. Their
/// values are undefined data by design and the validity mask suppresses
/// them downstream.
pub struct InterpolationWeights {
    vertices: Vec<[u32; 3]>,
    weights: Vec<[f64; 3]>,
    linear_shape: (usize, usize),
    image_size: usize,
}

impl InterpolationWeights {
    /// Convenience over [`InterpolationWeights::from_grid`] for callers
    /// that do not keep the sample grid around.
    pub fn build(config: &ScanGeometryConfig) -> Result<Self, ConvertError> {
        let grid = SampleGrid::compute(config);
        Self::from_grid(config, &grid)
    }

    /// Triangulates the flattened sample grid and resolves one barycentric
    /// row per output pixel. Output rows are processed in parallel; within
    /// a row each query starts its locate walk from the previous hit.
    pub fn from_grid(
        config: &ScanGeometryConfig,
        grid: &SampleGrid,
    ) -> Result<Self, ConvertError> {
        let mesh = TriangleMesh::build(grid.flat_points())?;
        let size = config.curvilinear_image_size;

        let rows: Vec<Vec<([u32; 3], [f64; 3])>> = (0..size)
            .into_par_iter()
            .map(|row| {
                let mut hint = 0;
                let mut out = Vec::with_capacity(size);
                for col in 0..size {
                    let query = Point2::new(row as f64, col as f64);
                    let location = mesh.locate(&query, hint);
                    hint = location.triangle;
                    let vertices = [
                        mesh.vertex(location.triangle, 0) as u32,
                        mesh.vertex(location.triangle, 1) as u32,
                        mesh.vertex(location.triangle, 2) as u32,
                    ];
                    let weights = mesh.barycentric(location.triangle, &query);
                    out.push((vertices, weights));
                }
                out
            })
            .collect();

        let mut vertices = Vec::with_capacity(size * size);
        let mut weights = Vec::with_capacity(size * size);
        for row in rows {
            for (v, w) in row {
                vertices.push(v);
                weights.push(w);
            }
        }

        Ok(Self {
            vertices,
            weights,
            linear_shape: grid.shape(),
            image_size: size,
        })
    }

    /// Number of output pixels covered, `curvilinear_image_size²`.
    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    #[inline]
    pub fn vertices(&self) -> &[[u32; 3]] {
        &self.vertices
    }

    #[inline]
    pub fn weights(&self) -> &[[f64; 3]] {
        &self.weights
    }

    /// Linear-frame shape these weights were built against.
    #[inline]
    pub fn linear_shape(&self) -> (usize, usize) {
        self.linear_shape
    }

    #[inline]
    pub fn image_size(&self) -> usize {
        self.image_size
    }
}

/// Forward scan conversion: one linear (lines × samples) frame into the
/// square curvilinear image, one barycentric dot product per output pixel.
///
/// The frame shape must match the grid the weights were built against;
/// a mismatch is a caller error, never silently reshaped.
pub fn scan_convert(
    linear_data: &Array2<f64>,
    config: &ScanGeometryConfig,
    weights: &InterpolationWeights,
) -> Result<Array2<f64>, ConvertError> {
    let expected = weights.linear_shape();
    if linear_data.dim() != expected {
        return Err(ConvertError::ShapeMismatch {
            expected,
            got: linear_data.dim(),
        });
    }
    if config.linear_shape() != expected || config.curvilinear_image_size != weights.image_size()
    {
        return Err(ConvertError::ShapeMismatch {
            expected,
            got: config.linear_shape(),
        });
    }

    let cols = expected.1;
    let value = |index: u32| {
        let index = index as usize;
        linear_data[[index / cols, index % cols]]
    };

    let size = weights.image_size();
    let mut out = Array2::zeros((size, size));
    for (pixel, (v, w)) in weights
        .vertices()
        .iter()
        .zip(weights.weights().iter())
        .enumerate()
    {
        out[[pixel / size, pixel % size]] =
            value(v[0]) * w[0] + value(v[1]) * w[1] + value(v[2]) * w[2];
    }
    Ok(out)
}

#[cfg(test)]
mod scanconvert_tests {
    use super::*;
    use crate::scanconvert::mask::ValidityMask;
    use crate::utils::test_utils::small_config;
    use approx::assert_relative_eq;

    #[test]
    fn test_sample_grid_shape_and_bounds() {
        let config = small_config();
        let grid = SampleGrid::compute(&config);
        assert_eq!(grid.shape(), config.linear_shape());

        let [center_row, center_col] = config.center_coordinate_pixel;
        let r = config.radius_end_pixels;
        for (&x, &y) in grid.x_cart.iter().zip(grid.y_cart.iter()) {
            assert!(x >= center_row - r && x <= center_row + r);
            assert!(y >= center_col - r && y <= center_col + r);
        }
    }

    #[test]
    fn test_sample_grid_matches_polar_formula_at_corners() {
        let config = small_config();
        let grid = SampleGrid::compute(&config);
        let (num_lines, num_samples) = config.linear_shape();
        let [center_row, center_col] = config.center_coordinate_pixel;

        // first row at radius_start, first column at angle_min
        let theta = config.angle_min_degrees.to_radians();
        let r = config.radius_start_pixels;
        assert_relative_eq!(
            grid.x_cart[[0, 0]],
            r * theta.cos() + center_row,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            grid.y_cart[[0, 0]],
            r * theta.sin() + center_col,
            epsilon = 1e-12
        );

        // last row at radius_end, last column at angle_max
        let theta = config.angle_max_degrees.to_radians();
        let r = config.radius_end_pixels;
        assert_relative_eq!(
            grid.x_cart[[num_lines - 1, num_samples - 1]],
            r * theta.cos() + center_row,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            grid.y_cart[[num_lines - 1, num_samples - 1]],
            r * theta.sin() + center_col,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_weight_rows_sum_to_one() {
        let config = small_config();
        let weights = InterpolationWeights::build(&config).unwrap();
        assert_eq!(weights.len(), config.curvilinear_image_size.pow(2));
        for row in weights.weights() {
            assert_relative_eq!(row[0] + row[1] + row[2], 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_scan_convert_rejects_shape_mismatch() {
        let config = small_config();
        let weights = InterpolationWeights::build(&config).unwrap();
        let (rows, cols) = config.linear_shape();
        let wrong = Array2::<f64>::zeros((rows + 1, cols));
        assert!(matches!(
            scan_convert(&wrong, &config, &weights),
            Err(ConvertError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_scan_convert_constant_frame_inside_mask() {
        // Scenario: an all-constant frame must come out constant everywhere
        // the mask trusts the output.
        let config = small_config();
        let weights = InterpolationWeights::build(&config).unwrap();
        let mask = ValidityMask::build(&config);

        let constant = 7.25;
        let frame = Array2::from_elem(config.linear_shape(), constant);
        let image = scan_convert(&frame, &config, &weights).unwrap();

        let mut checked = 0usize;
        for ((i, j), &m) in mask.array().indexed_iter() {
            if m == 1 {
                assert_relative_eq!(image[[i, j]], constant, epsilon = 1e-9);
                checked += 1;
            }
        }
        assert!(checked > 0, "mask left nothing to verify");
    }

    #[test]
    fn test_scan_convert_reproduces_linear_field() {
        // A field linear in cartesian coordinates passes through barycentric
        // interpolation unchanged, so every output pixel must equal the
        // field evaluated at its own coordinates.
        let config = small_config();
        let grid = SampleGrid::compute(&config);
        let weights = InterpolationWeights::from_grid(&config, &grid).unwrap();
        let mask = ValidityMask::build(&config);

        let field = |x: f64, y: f64| 2.0 * x - 0.5 * y + 3.0;
        let (rows, cols) = config.linear_shape();
        let mut frame = Array2::zeros((rows, cols));
        for i in 0..rows {
            for j in 0..cols {
                frame[[i, j]] = field(grid.x_cart[[i, j]], grid.y_cart[[i, j]]);
            }
        }

        let image = scan_convert(&frame, &config, &weights).unwrap();
        for ((i, j), &m) in mask.array().indexed_iter() {
            if m == 1 {
                assert_relative_eq!(
                    image[[i, j]],
                    field(i as f64, j as f64),
                    epsilon = 1e-6
                );
            }
        }
    }
}
