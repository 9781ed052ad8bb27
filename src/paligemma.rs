use crate::config::LabelerConfig;
use crate::model::{LabelModel, LabelRequest, LabelResponse};
use kornia_vlm::paligemma::{Paligemma, PaligemmaConfig, PaligemmaError};

/// Fabric labeler backed by the PaliGemma vision-language model.
pub struct PaligemmaLabeler {
    model: Paligemma,
    prompt: String,
    sample_len: usize,
}

impl PaligemmaLabeler {
    /// Loads the model weights. Runs once at startup.
    pub fn new(config: &LabelerConfig) -> Result<Self, PaligemmaError> {
        let model = Paligemma::new(PaligemmaConfig::default())?;
        Ok(Self {
            model,
            prompt: config.prompt.clone(),
            sample_len: config.sample_len,
        })
    }
}

impl LabelModel for PaligemmaLabeler {
    type Error = PaligemmaError;

    fn run(&mut self, request: LabelRequest) -> Result<LabelResponse, Self::Error> {
        let generated = self
            .model
            .inference(&request.image, &self.prompt, self.sample_len, false)?;

        Ok(LabelResponse {
            label: generated.trim().to_string(),
        })
    }
}
