//! Real-time curvilinear ultrasound scan conversion.
//!
//! Streams of sensor frames arrive in curvilinear (fan-shaped) space, the
//! segmentation model works on a rectangular linear grid, and predictions
//! have to go back to curvilinear space, every frame, before the next one
//! arrives. The expensive parts (Delaunay triangulation of the sample grid,
//! barycentric weight resolution, validity-mask rasterization) run once per
//! configuration; the per-frame path is a dot product per output pixel.
//!
//! Transport of frames and the model's internals are deliberately outside
//! this crate: frames come and go as plain `ndarray` arrays, inference is
//! abstracted behind [`SegmentationModel`].

mod error;
pub mod io;
pub mod pipeline;
pub mod scanconvert;
mod utils;

pub use error::{ConfigError, ConvertError};
pub use io::ScanGeometryConfig;
pub use pipeline::{FramePipeline, ScanConverter, SegmentationModel};
pub use scanconvert::mask::ValidityMask;
pub use scanconvert::resample::{resample_to_linear, resize, InterpOrder};
pub use scanconvert::{scan_convert, InterpolationWeights, SampleGrid};
