use crate::colors::{ColorConfig, HexColor, extract_dominant_colors};
use crate::decode::{decode_rgb, to_kornia_rgb};
use crate::engine::LabelEngine;
use crate::error::{FabricError, Result};
use crate::model::{LabelModel, LabelRequest};
use serde::Serialize;

/// The label and dominant colors computed for one uploaded image.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub fabric_type: String,
    pub dominant_colors: Vec<HexColor>,
}

/// Decodes uploads, labels them and extracts their dominant colors.
///
/// Built once at startup. `engine` is `None` when the label model failed to
/// load, in which case every classification fails with
/// [`FabricError::ModelNotLoaded`].
pub struct FabricClassifier<M: LabelModel + Send + 'static> {
    engine: Option<LabelEngine<M>>,
    colors: ColorConfig,
}

impl<M: LabelModel + Send + 'static> FabricClassifier<M> {
    pub fn new(engine: Option<LabelEngine<M>>, colors: ColorConfig) -> Self {
        Self { engine, colors }
    }

    pub fn ready(model: M, colors: ColorConfig) -> Self {
        Self::new(Some(LabelEngine::new(model)), colors)
    }

    pub fn unavailable(colors: ColorConfig) -> Self {
        Self::new(None, colors)
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    /// Runs the full pipeline on an uploaded file. Blocks while the model runs.
    pub fn classify(&self, bytes: &[u8]) -> Result<ClassificationResult> {
        let engine = self.engine.as_ref().ok_or(FabricError::ModelNotLoaded)?;

        let image = decode_rgb(bytes)?;
        log::debug!("Decoded {}x{} upload", image.width(), image.height());

        let labeled = engine.infer(LabelRequest {
            image: to_kornia_rgb(&image)?,
        })?;
        let dominant_colors = extract_dominant_colors(&image, &self.colors)?;

        Ok(ClassificationResult {
            fabric_type: labeled.label,
            dominant_colors,
        })
    }
}
