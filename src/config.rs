use crate::colors::{ColorConfig, MAX_COLORS};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PROMPT: &str = "answer en what type of fabric is this?";
pub const DEFAULT_SAMPLE_LEN: usize = 20;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// How the label model is prompted.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelerConfig {
    pub prompt: String,
    /// Maximum number of tokens to generate.
    pub sample_len: usize,
}

impl Default for LabelerConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            sample_len: DEFAULT_SAMPLE_LEN,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest request body accepted on the upload route.
    pub max_upload_bytes: usize,
    pub labeler: LabelerConfig,
    pub colors: ColorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            labeler: LabelerConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// The `host:port` string to bind to.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Converts a megabyte count to bytes, saturating instead of overflowing.
pub fn megabytes_to_bytes(megabytes: usize) -> usize {
    megabytes.saturating_mul(1024 * 1024)
}

/// Parses the number of dominant colors, rejecting counts the clustering cannot serve.
pub fn parse_n_colors(value: &str) -> Result<usize, String> {
    let n_colors: usize = value
        .parse()
        .map_err(|e| format!("invalid number of colors {value:?}: {e}"))?;
    if n_colors == 0 || n_colors > MAX_COLORS {
        return Err(format!(
            "number of colors must be between 1 and {MAX_COLORS}, got {n_colors}"
        ));
    }
    Ok(n_colors)
}
