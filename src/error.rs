use thiserror::Error;

/// Every way a classification request can fail.
#[derive(Error, Debug)]
pub enum FabricError {
    /// The label model failed to load at startup.
    #[error("Model not loaded. Please check the server logs.")]
    ModelNotLoaded,

    /// The upload carried no `image` field.
    #[error("No image file provided")]
    MissingInput,

    /// The multipart body could not be read.
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// The request body went over the configured upload limit.
    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    #[error("failed to decode image: {0}")]
    ImageDecode(String),

    #[error("invalid clustering request: {0}")]
    InvalidClusteringRequest(String),

    #[error("inference failed: {0}")]
    InferenceFailure(String),

    /// The blocking worker running the pipeline panicked or was cancelled.
    #[error("processing task failed: {0}")]
    TaskFailed(String),
}

impl FabricError {
    /// Returns true for errors caused by the client's request rather than by processing.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            FabricError::MissingInput
                | FabricError::InvalidUpload(_)
                | FabricError::PayloadTooLarge(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FabricError>;
