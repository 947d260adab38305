use serde::Deserialize;

use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Geometry of a curvilinear probe's acquisition pattern, supplied once per
/// configuration and treated as read-only afterwards.
///
/// Field names match the configuration file keys one-to-one, so a missing or
/// misspelled key fails deserialization instead of silently defaulting.
///
/// `center_coordinate_pixel` is `[row, column]` of the sector apex in the
/// curvilinear image, matching the array-index convention used throughout
/// this crate (first axis = rows).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanGeometryConfig {
    pub angle_min_degrees: f64,
    pub angle_max_degrees: f64,
    pub radius_start_pixels: f64,
    pub radius_end_pixels: f64,
    pub num_lines: usize,
    pub num_samples_along_lines: usize,
    pub center_coordinate_pixel: [f64; 2],
    pub curvilinear_image_size: usize,
}

impl ScanGeometryConfig {
    /// Loads and validates a configuration from a `.toml` or `.json` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "toml" => Self::from_toml_str(&text),
            "json" => Self::from_json_str(&text),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Parses and validates a TOML configuration.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ScanGeometryConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: ScanGeometryConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the geometric invariants. Called by every loader; also
    /// available to callers that build the struct in code.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.radius_start_pixels >= 0.0 && self.radius_end_pixels > self.radius_start_pixels)
        {
            return Err(ConfigError::InvalidRadii {
                start: self.radius_start_pixels,
                end: self.radius_end_pixels,
            });
        }
        if !(self.angle_max_degrees > self.angle_min_degrees) {
            return Err(ConfigError::InvalidAngles {
                min: self.angle_min_degrees,
                max: self.angle_max_degrees,
            });
        }
        if self.curvilinear_image_size == 0 {
            return Err(ConfigError::ZeroImageSize);
        }
        if self.num_lines == 0 || self.num_samples_along_lines == 0 {
            return Err(ConfigError::EmptyGrid {
                num_lines: self.num_lines,
                num_samples: self.num_samples_along_lines,
            });
        }
        Ok(())
    }

    /// Shape of a linear-space frame: (num_lines, num_samples_along_lines).
    #[inline]
    pub fn linear_shape(&self) -> (usize, usize) {
        (self.num_lines, self.num_samples_along_lines)
    }

    /// Shape of the square curvilinear output image.
    #[inline]
    pub fn curvilinear_shape(&self) -> (usize, usize) {
        (self.curvilinear_image_size, self.curvilinear_image_size)
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use crate::utils::test_utils::small_config;

    const TOML_FIXTURE: &str = r#"
        angle_min_degrees = -30.0
        angle_max_degrees = 30.0
        radius_start_pixels = 50.0
        radius_end_pixels = 200.0
        num_lines = 128
        num_samples_along_lines = 256
        center_coordinate_pixel = [256.0, 256.0]
        curvilinear_image_size = 512
    "#;

    #[test]
    fn test_parse_toml_config() {
        let config = ScanGeometryConfig::from_toml_str(TOML_FIXTURE).unwrap();
        assert_eq!(config.num_lines, 128);
        assert_eq!(config.num_samples_along_lines, 256);
        assert_eq!(config.center_coordinate_pixel, [256.0, 256.0]);
        assert_eq!(config.linear_shape(), (128, 256));
        assert_eq!(config.curvilinear_shape(), (512, 512));
    }

    #[test]
    fn test_parse_json_config() {
        let json = r#"{
            "angle_min_degrees": -30.0,
            "angle_max_degrees": 30.0,
            "radius_start_pixels": 50.0,
            "radius_end_pixels": 200.0,
            "num_lines": 128,
            "num_samples_along_lines": 256,
            "center_coordinate_pixel": [256.0, 256.0],
            "curvilinear_image_size": 512
        }"#;
        let config = ScanGeometryConfig::from_json_str(json).unwrap();
        assert_eq!(
            config,
            ScanGeometryConfig::from_toml_str(TOML_FIXTURE).unwrap()
        );
    }

    #[test]
    fn test_missing_key_is_an_error() {
        // curvilinear_image_size left out on purpose
        let json = r#"{
            "angle_min_degrees": -30.0,
            "angle_max_degrees": 30.0,
            "radius_start_pixels": 50.0,
            "radius_end_pixels": 200.0,
            "num_lines": 128,
            "num_samples_along_lines": 256,
            "center_coordinate_pixel": [256.0, 256.0]
        }"#;
        assert!(matches!(
            ScanGeometryConfig::from_json_str(json),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let toml = format!("{}\nextra_key = 1\n", TOML_FIXTURE);
        assert!(matches!(
            ScanGeometryConfig::from_toml_str(&toml),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_radii() {
        let mut config = small_config();
        config.radius_end_pixels = config.radius_start_pixels;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRadii { .. })
        ));

        let mut config = small_config();
        config.radius_start_pixels = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRadii { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_angles() {
        let mut config = small_config();
        config.angle_max_degrees = config.angle_min_degrees - 5.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAngles { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_shapes() {
        let mut config = small_config();
        config.curvilinear_image_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroImageSize)));

        let mut config = small_config();
        config.num_lines = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn test_from_file_rejects_unknown_extension() {
        let path = std::env::temp_dir().join("sonowarp_test_config.yaml");
        std::fs::write(&path, "not: relevant").unwrap();
        let result = ScanGeometryConfig::from_file(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_from_file_roundtrip_toml() {
        let path = std::env::temp_dir().join("sonowarp_test_config.toml");
        std::fs::write(&path, TOML_FIXTURE).unwrap();
        let result = ScanGeometryConfig::from_file(&path);
        std::fs::remove_file(&path).ok();
        let config = result.unwrap();
        assert_eq!(config.curvilinear_image_size, 512);
    }
}
