use crate::io::ScanGeometryConfig;

/// Small fan geometry that keeps the whole sector inside a 64 px image:
/// apex near the top edge, 20 lines of 40 samples each. Cheap enough for
/// every unit test that needs real weights.
pub fn small_config() -> ScanGeometryConfig {
    ScanGeometryConfig {
        angle_min_degrees: -25.0,
        angle_max_degrees: 25.0,
        radius_start_pixels: 8.0,
        radius_end_pixels: 56.0,
        num_lines: 20,
        num_samples_along_lines: 40,
        center_coordinate_pixel: [2.0, 32.0],
        curvilinear_image_size: 64,
    }
}

/// The reference scenario geometry: ±30° sector, radii 50..200, apex at
/// the center of a 512 px image.
pub fn scenario_config() -> ScanGeometryConfig {
    ScanGeometryConfig {
        angle_min_degrees: -30.0,
        angle_max_degrees: 30.0,
        radius_start_pixels: 50.0,
        radius_end_pixels: 200.0,
        num_lines: 128,
        num_samples_along_lines: 256,
        center_coordinate_pixel: [256.0, 256.0],
        curvilinear_image_size: 512,
    }
}

#[cfg(test)]
mod test_utils_tests {
    use super::*;

    #[test]
    fn test_fixture_configs_are_valid() {
        small_config().validate().unwrap();
        scenario_config().validate().unwrap();
    }
}
