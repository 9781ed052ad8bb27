use argh::FromArgs;
use fabric_infernum::{
    ColorConfig, FabricClassifier, LabelEngine, LabelerConfig, PaligemmaLabeler, ServerConfig,
    config::{
        DEFAULT_HOST, DEFAULT_PORT, DEFAULT_PROMPT, DEFAULT_SAMPLE_LEN, megabytes_to_bytes,
        parse_n_colors,
    },
    router,
};
use std::sync::Arc;

const DEFAULT_N_COLORS: usize = 3;
const DEFAULT_MAX_UPLOAD_MB: usize = 10;

#[derive(FromArgs)]
/// Fabric classification server: labels uploaded images and extracts their dominant colors.
struct FabricArgs {
    /// the host to run the server on
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port to run the server on
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,

    /// number of dominant colors to return
    #[argh(option, default = "DEFAULT_N_COLORS", from_str_fn(parse_n_colors))]
    n_colors: usize,

    /// the prompt passed to the label model
    #[argh(option, default = "DEFAULT_PROMPT.to_string()")]
    prompt: String,

    /// maximum number of tokens the label model generates
    #[argh(option, default = "DEFAULT_SAMPLE_LEN")]
    sample_len: usize,

    /// largest accepted upload, in megabytes
    #[argh(option, default = "DEFAULT_MAX_UPLOAD_MB")]
    max_upload_mb: usize,
}

impl From<FabricArgs> for ServerConfig {
    fn from(args: FabricArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            max_upload_bytes: megabytes_to_bytes(args.max_upload_mb),
            labeler: LabelerConfig {
                prompt: args.prompt,
                sample_len: args.sample_len,
            },
            colors: ColorConfig {
                n_colors: args.n_colors,
                ..Default::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let config: ServerConfig = argh::from_env::<FabricArgs>().into();

    // a failed load leaves the server up but unable to classify
    let engine = match PaligemmaLabeler::new(&config.labeler) {
        Ok(model) => {
            log::info!("🧵 Label model loaded");
            Some(LabelEngine::new(model))
        }
        Err(e) => {
            log::error!("Error loading model: {e}");
            None
        }
    };

    let classifier = Arc::new(FabricClassifier::new(engine, config.colors.clone()));
    let app = router(classifier, config.max_upload_bytes);

    log::info!("🚀 Starting the server");
    log::info!("🔥 Listening on: {}", config.addr());
    log::info!("🔧 Press Ctrl+C to stop the server");

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
