use anyhow::{bail, Context};
use ndarray::Array2;

use crate::error::ConvertError;
use crate::io::ScanGeometryConfig;
use crate::scanconvert::mask::ValidityMask;
use crate::scanconvert::resample::{resample_to_linear, resize, InterpOrder};
use crate::scanconvert::{scan_convert, InterpolationWeights, SampleGrid};

/// Opaque inference collaborator: a model-space tensor of fixed square size
/// in, a probability/logit tensor of matching spatial shape out. The
/// pipeline neither knows nor cares what runs inside.
pub trait SegmentationModel {
    /// Side length of the square model-space tensor.
    fn input_size(&self) -> usize;

    fn infer(&self, input: &Array2<f64>) -> anyhow::Result<Array2<f64>>;
}

/// Immutable bundle of the per-configuration derived artifacts: sample
/// grid, interpolation weights and validity mask.
///
/// Built once at configuration-load time, then shared read-only across the
/// frame loop — none of the per-frame calls allocate or mutate any of the
/// derived state, so concurrent readers need no synchronization.
pub struct ScanConverter {
    config: ScanGeometryConfig,
    grid: SampleGrid,
    weights: InterpolationWeights,
    mask: ValidityMask,
}

impl ScanConverter {
    /// Validates the configuration and precomputes all derived artifacts.
    /// This is the expensive call (triangulation + one point-location per
    /// output pixel); everything per-frame afterwards is cheap.
    pub fn new(config: ScanGeometryConfig) -> anyhow::Result<Self> {
        config.validate().context("invalid scan geometry config")?;
        let grid = SampleGrid::compute(&config);
        let weights = InterpolationWeights::from_grid(&config, &grid)
            .context("building interpolation weights")?;
        let mask = ValidityMask::build(&config);
        println!(
            "scan converter ready: {} weight rows, {} trusted mask pixels",
            weights.len(),
            mask.count_ones()
        );
        Ok(Self {
            config,
            grid,
            weights,
            mask,
        })
    }

    #[inline]
    pub fn config(&self) -> &ScanGeometryConfig {
        &self.config
    }

    #[inline]
    pub fn grid(&self) -> &SampleGrid {
        &self.grid
    }

    #[inline]
    pub fn weights(&self) -> &InterpolationWeights {
        &self.weights
    }

    #[inline]
    pub fn mask(&self) -> &ValidityMask {
        &self.mask
    }

    /// Curvilinear frame → linear grid (inverse scan conversion). Order 1
    /// for intensity frames; order 0 for labels.
    pub fn to_linear(
        &self,
        curvilinear: &Array2<f64>,
        order: InterpOrder,
        boundary_value: f64,
    ) -> Array2<f64> {
        resample_to_linear(curvilinear, &self.grid, order, boundary_value)
    }

    /// Linear frame → curvilinear image via the precomputed weights.
    pub fn to_curvilinear(&self, linear: &Array2<f64>) -> Result<Array2<f64>, ConvertError> {
        scan_convert(linear, &self.config, &self.weights)
    }

    /// Suppresses everything outside the sensor's trusted region.
    pub fn masked(&self, curvilinear: &Array2<f64>) -> Array2<f64> {
        self.mask.apply(curvilinear)
    }
}

/// Sequences one frame through the full path:
/// receive → inverse-resample into model space → infer → forward-convert
/// the prediction back to curvilinear space → mask → emit.
///
/// Transport of frames in and predictions out belongs to the caller.
pub struct FramePipeline<M: SegmentationModel> {
    converter: ScanConverter,
    model: M,
}

impl<M: SegmentationModel> FramePipeline<M> {
    pub fn new(converter: ScanConverter, model: M) -> Self {
        Self { converter, model }
    }

    #[inline]
    pub fn converter(&self) -> &ScanConverter {
        &self.converter
    }

    /// Processes one curvilinear sensor frame into a masked curvilinear
    /// prediction of the same square size.
    pub fn process_frame(&self, frame: &Array2<f64>) -> anyhow::Result<Array2<f64>> {
        let converter = &self.converter;
        let linear = converter.to_linear(frame, InterpOrder::Linear, 0.0);

        let model_size = self.model.input_size();
        let input = resize(&linear, (model_size, model_size), InterpOrder::Nearest);
        let prediction = self.model.infer(&input).context("model inference")?;
        if prediction.dim() != input.dim() {
            bail!(
                "model returned shape {:?}, expected {:?}",
                prediction.dim(),
                input.dim()
            );
        }

        let prediction = resize(&prediction, converter.config().linear_shape(), InterpOrder::Linear);
        let curvilinear = converter.to_curvilinear(&prediction)?;
        Ok(converter.masked(&curvilinear))
    }
}
