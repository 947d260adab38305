use ndarray::Array2;

use super::SampleGrid;

/// Interpolation order for direct coordinate resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpOrder {
    /// Order 0. The only order that cannot invent fractional class values,
    /// so label/segmentation frames go through this one.
    Nearest,
    /// Order 1, bilinear. Default for intensity frames.
    Linear,
    /// Order 3, Keys cubic convolution.
    Cubic,
}

impl InterpOrder {
    /// Maps the conventional numeric order used by resampling tools
    /// (0, 1 or 3) onto the enum.
    pub fn from_order(order: u8) -> Option<Self> {
        match order {
            0 => Some(Self::Nearest),
            1 => Some(Self::Linear),
            3 => Some(Self::Cubic),
            _ => None,
        }
    }
}

/// How a sampling kernel reads past the image edge.
#[derive(Clone, Copy)]
enum Boundary {
    /// Out-of-bounds taps read a constant fill value.
    Constant(f64),
    /// Out-of-bounds taps clamp to the nearest edge pixel.
    Clamp,
}

/// Inverse scan conversion: samples the curvilinear image at every
/// fractional coordinate of the sample grid, producing the linear-space
/// frame of shape (num_lines, num_samples_along_lines).
///
/// The coordinates are static per configuration and this runs once per
/// frame, so there is no precomputed weight table here — direct per-pixel
/// evaluation is cheap enough.
pub fn resample_to_linear(
    curvilinear: &Array2<f64>,
    grid: &SampleGrid,
    order: InterpOrder,
    boundary_value: f64,
) -> Array2<f64> {
    let (rows, cols) = grid.shape();
    let boundary = Boundary::Constant(boundary_value);
    let mut out = Array2::zeros((rows, cols));
    for i in 0..rows {
        for j in 0..cols {
            out[[i, j]] = sample(
                curvilinear,
                grid.x_cart[[i, j]],
                grid.y_cart[[i, j]],
                order,
                boundary,
            );
        }
    }
    out
}

/// Resizes an image with the `align_corners = false` convention common to
/// tensor libraries: destination pixel centers map to
/// `(dst + 0.5) · scale − 0.5` in the source, and edge taps clamp instead
/// of reading a fill value.
pub fn resize(image: &Array2<f64>, shape: (usize, usize), order: InterpOrder) -> Array2<f64> {
    let (src_rows, src_cols) = image.dim();
    let (dst_rows, dst_cols) = shape;
    let scale_rows = src_rows as f64 / dst_rows as f64;
    let scale_cols = src_cols as f64 / dst_cols as f64;

    let mut out = Array2::zeros(shape);
    for i in 0..dst_rows {
        let x = (i as f64 + 0.5) * scale_rows - 0.5;
        for j in 0..dst_cols {
            let y = (j as f64 + 0.5) * scale_cols - 0.5;
            out[[i, j]] = sample(image, x, y, order, Boundary::Clamp);
        }
    }
    out
}

/// Samples one fractional (row, col) location.
fn sample(image: &Array2<f64>, x: f64, y: f64, order: InterpOrder, boundary: Boundary) -> f64 {
    match order {
        InterpOrder::Nearest => {
            let i = (x + 0.5).floor() as i64;
            let j = (y + 0.5).floor() as i64;
            tap(image, i, j, boundary)
        }
        InterpOrder::Linear => {
            let i0 = x.floor();
            let j0 = y.floor();
            let fx = x - i0;
            let fy = y - j0;
            let (i0, j0) = (i0 as i64, j0 as i64);

            let mut acc = 0.0;
            for (di, wx) in [(0, 1.0 - fx), (1, fx)] {
                if wx == 0.0 {
                    continue;
                }
                for (dj, wy) in [(0, 1.0 - fy), (1, fy)] {
                    if wy == 0.0 {
                        continue;
                    }
                    acc += wx * wy * tap(image, i0 + di, j0 + dj, boundary);
                }
            }
            acc
        }
        InterpOrder::Cubic => {
            let i0 = x.floor();
            let j0 = y.floor();
            let fx = x - i0;
            let fy = y - j0;
            let (i0, j0) = (i0 as i64, j0 as i64);

            let mut acc = 0.0;
            for di in -1..=2 {
                let wx = cubic_kernel(di as f64 - fx);
                if wx == 0.0 {
                    continue;
                }
                for dj in -1..=2 {
                    let wy = cubic_kernel(dj as f64 - fy);
                    if wy == 0.0 {
                        continue;
                    }
                    acc += wx * wy * tap(image, i0 + di, j0 + dj, boundary);
                }
            }
            acc
        }
    }
}

#[inline]
fn tap(image: &Array2<f64>, i: i64, j: i64, boundary: Boundary) -> f64 {
    let (rows, cols) = image.dim();
    match boundary {
        Boundary::Constant(fill) => {
            if i < 0 || j < 0 || i >= rows as i64 || j >= cols as i64 {
                fill
            } else {
                image[[i as usize, j as usize]]
            }
        }
        Boundary::Clamp => {
            let i = i.clamp(0, rows as i64 - 1) as usize;
            let j = j.clamp(0, cols as i64 - 1) as usize;
            image[[i, j]]
        }
    }
}

/// Keys cubic convolution kernel with a = −0.5 (Catmull-Rom). Reproduces
/// linear fields exactly and has support [−2, 2].
fn cubic_kernel(t: f64) -> f64 {
    let t = t.abs();
    if t < 1.0 {
        (1.5 * t - 2.5) * t * t + 1.0
    } else if t < 2.0 {
        ((-0.5 * t + 2.5) * t - 4.0) * t + 2.0
    } else {
        0.0
    }
}
