//! Stage construction seam.
//!
//! The orchestrator asks a [`StageBuilder`] for the audio graph and then for
//! each stage in chain order. A failing stage is left out of the chain; a
//! failing graph aborts the connect.

use auralis_stages::{
    BandwidthExtender, Interpolator, SpatialVirtualizer, Stage, StageContext, StageError,
    StageKind,
};

use crate::error::ConnectionError;

/// Builds the processing graph and its stages for one connection.
pub trait StageBuilder: Send {
    /// Acquires the host's audio graph for `context`.
    ///
    /// # Errors
    ///
    /// [`ConnectionError::GraphUnavailable`] when the host cannot run a
    /// graph in this format.
    fn open_graph(&mut self, context: &StageContext) -> Result<(), ConnectionError> {
        context
            .check()
            .map_err(|e| ConnectionError::GraphUnavailable(e.to_string()))
    }

    /// Builds one stage.
    ///
    /// # Errors
    ///
    /// Any [`StageError`]; the orchestrator then runs without this stage.
    fn build(&mut self, kind: StageKind, context: &StageContext)
    -> Result<Box<dyn Stage>, StageError>;
}

/// Builds every stage with its full feature set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStageBuilder;

impl StageBuilder for DefaultStageBuilder {
    fn build(
        &mut self,
        kind: StageKind,
        context: &StageContext,
    ) -> Result<Box<dyn Stage>, StageError> {
        Ok(match kind {
            StageKind::Interpolation => Box::new(Interpolator::new(context)?),
            StageKind::Extender => Box::new(BandwidthExtender::new(context)?),
            StageKind::Spatial => Box::new(SpatialVirtualizer::new(context)?),
        })
    }
}

/// Builds the extender without its FFT path, as on hosts with no
/// accelerator. Other stages are built as usual.
#[derive(Debug, Clone, Copy, Default)]
pub struct HarmonicOnlyBuilder;

impl StageBuilder for HarmonicOnlyBuilder {
    fn build(
        &mut self,
        kind: StageKind,
        context: &StageContext,
    ) -> Result<Box<dyn Stage>, StageError> {
        match kind {
            StageKind::Extender => Ok(Box::new(BandwidthExtender::without_fft(context)?)),
            other => DefaultStageBuilder.build(other, context),
        }
    }
}
