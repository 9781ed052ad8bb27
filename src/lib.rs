//! Fabric classification service.
//!
//! An uploaded image is labeled by a pretrained vision-language model and its
//! dominant colors are extracted with seeded k-means. Both results are returned
//! together from a single `POST /upload` endpoint.

pub mod classifier;
pub mod colors;
pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
pub mod kmeans;
pub mod model;
#[cfg(feature = "paligemma")]
pub mod paligemma;
pub mod server;

pub use classifier::{ClassificationResult, FabricClassifier};
pub use colors::{Cluster, ColorConfig, HexColor, extract_dominant_colors};
pub use config::{LabelerConfig, ServerConfig};
pub use engine::{LabelEngine, LabelEngineResponse};
pub use error::{FabricError, Result};
pub use model::{LabelModel, LabelRequest, LabelResponse};
#[cfg(feature = "paligemma")]
pub use paligemma::PaligemmaLabeler;
pub use server::router;
