use ndarray::Array2;

use crate::io::ScanGeometryConfig;

/// Static binary map of the trustworthy prediction region: 1 inside genuine
/// sensor coverage (away from its boundary), 0 elsewhere.
///
/// Computed once per configuration and applied multiplicatively to every
/// outgoing curvilinear prediction. Out-of-hull interpolation artifacts are
/// not errors anywhere in this crate — this mask is what suppresses them.
pub struct ValidityMask {
    mask: Array2<u8>,
}

impl ValidityMask {
    /// Rasterizes the annulus sector of the probe's field of view, clears
    /// the outermost one-pixel border, then erodes once with a square
    /// element of side `round(0.1 × curvilinear_image_size)` to shave off
    /// aliasing artifacts along the sector boundary.
    pub fn build(config: &ScanGeometryConfig) -> Self {
        let mut mask = rasterize_sector(config);
        clear_border(&mut mask);
        let kernel = (0.1 * config.curvilinear_image_size as f64).round() as usize;
        let mask = erode(&mask, kernel);
        ValidityMask { mask }
    }

    #[inline]
    pub fn array(&self) -> &Array2<u8> {
        &self.mask
    }

    /// Number of trusted pixels.
    pub fn count_ones(&self) -> usize {
        self.mask.iter().filter(|&&v| v == 1).count()
    }

    /// Multiplies an image by the mask, zeroing everything outside the
    /// trusted region. Shapes must agree.
    pub fn apply(&self, image: &Array2<f64>) -> Array2<f64> {
        debug_assert_eq!(image.dim(), self.mask.dim());
        let mut out = image.clone();
        out.zip_mut_with(&self.mask, |v, &m| {
            if m == 0 {
                *v = 0.0;
            }
        });
        out
    }
}

/// Filled annulus sector membership test, pixel by pixel.
///
/// Angles are measured in the image convention: 0° along increasing
/// columns, sweeping toward increasing rows, so the sector bounds are the
/// configured angles rotated by +90°.
fn rasterize_sector(config: &ScanGeometryConfig) -> Array2<u8> {
    let angle_from = 90.0 + config.angle_min_degrees;
    let span = config.angle_max_degrees - config.angle_min_degrees;
    let [center_row, center_col] = config.center_coordinate_pixel;
    let size = config.curvilinear_image_size;

    let mut mask = Array2::zeros((size, size));
    for ((row, col), v) in mask.indexed_iter_mut() {
        let dr = row as f64 - center_row;
        let dc = col as f64 - center_col;
        let radius = (dr * dr + dc * dc).sqrt();
        if radius <= config.radius_start_pixels || radius > config.radius_end_pixels {
            continue;
        }
        let angle = dr.atan2(dc).to_degrees();
        if (angle - angle_from).rem_euclid(360.0) <= span {
            *v = 1;
        }
    }
    mask
}

/// Forces the outermost one-pixel border to zero so a following erosion
/// pass shrinks the region from every edge, not only from the sector
/// outline.
fn clear_border(mask: &mut Array2<u8>) {
    let (rows, cols) = mask.dim();
    for j in 0..cols {
        mask[[0, j]] = 0;
        mask[[rows - 1, j]] = 0;
    }
    for i in 0..rows {
        mask[[i, 0]] = 0;
        mask[[i, cols - 1]] = 0;
    }
}

/// One binary erosion pass with a square structuring element of the given
/// side, anchored at `side / 2`. Neighborhoods reaching past the image edge
/// read 1, so border pixels only erode if the caller cleared the border
/// first.
///
/// The square element separates into a horizontal and a vertical min pass.
pub fn erode(mask: &Array2<u8>, kernel_size: usize) -> Array2<u8> {
    if kernel_size <= 1 {
        return mask.clone();
    }
    let anchor = (kernel_size / 2) as i64;
    let reach_fwd = kernel_size as i64 - 1 - anchor;

    let (rows, cols) = mask.dim();
    let at = |m: &Array2<u8>, i: i64, j: i64| -> u8 {
        if i < 0 || j < 0 || i >= rows as i64 || j >= cols as i64 {
            1
        } else {
            m[[i as usize, j as usize]]
        }
    };

    let mut horizontal = Array2::zeros((rows, cols));
    for i in 0..rows {
        for j in 0..cols {
            let mut min = 1u8;
            for d in -anchor..=reach_fwd {
                min = min.min(at(mask, i as i64, j as i64 + d));
                if min == 0 {
                    break;
                }
            }
            horizontal[[i, j]] = min;
        }
    }

    let mut out = Array2::zeros((rows, cols));
    for i in 0..rows {
        for j in 0..cols {
            let mut min = 1u8;
            for d in -anchor..=reach_fwd {
                min = min.min(at(&horizontal, i as i64 + d, j as i64));
                if min == 0 {
                    break;
                }
            }
            out[[i, j]] = min;
        }
    }
    out
}
