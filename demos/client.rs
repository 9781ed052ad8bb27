use argh::FromArgs;
use reqwest::multipart::{Form, Part};
use std::path::PathBuf;

// defaults for the client
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3000;

#[derive(FromArgs)]
/// Upload an image to the fabric classification server and print the result
struct ClientArgs {
    /// the host to connect to
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port to connect to
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,

    /// the path to the image
    #[argh(option, short = 'i')]
    image_path: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: ClientArgs = argh::from_env();

    let file_name = args
        .image_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload")
        .to_string();
    let bytes = tokio::fs::read(&args.image_path).await?;

    let form = Form::new().part("image", Part::bytes(bytes).file_name(file_name));

    let response = reqwest::Client::new()
        .post(format!("http://{}:{}/upload", args.host, args.port))
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    let result = response.json::<serde_json::Value>().await?;
    println!("Status: {status}");
    println!("Result: {}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
