//! CLI for Editor AI - photo enhancement and mixing.

use clap::{Args, Parser, Subcommand};
use editor_ai::{
    EditorError, Enhancer, GeminiGateway, GeminiModel, GeneratedImage, Locale, Mixer,
    SourceImage,
};
use log::LevelFilter;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "editor-ai")]
#[command(about = "Enhance product photos or mix several photos with a generative image model")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API key (keep it out of shell history; prefer the env var)
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Base URL of the generation endpoint, e.g. your own key-holding server
    #[arg(long, env = "EDITOR_AI_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// Model id
    #[arg(long, default_value = "gemini-2.5-flash-image", global = true)]
    model: String,

    /// Language for messages (en, id)
    #[arg(long, default_value = "en", global = true)]
    locale: Locale,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit one photo following an instruction
    Enhance(EnhanceArgs),

    /// Blend two to four photos into one image
    Mix(MixArgs),
}

#[derive(Args)]
struct EnhanceArgs {
    /// The photo to edit
    image: PathBuf,

    /// Instruction describing the edit
    #[arg(short, long, required_unless_present = "auto", conflicts_with = "auto")]
    prompt: Option<String>,

    /// Use the built-in product-photography prompt
    #[arg(long)]
    auto: bool,

    /// Output file or directory (defaults to the current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct MixArgs {
    /// Photos to blend, in order
    #[arg(required = true, num_args = 1..)]
    images: Vec<PathBuf>,

    /// Instruction describing how to blend them
    #[arg(short, long)]
    prompt: String,

    /// Output file or directory (defaults to the current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn setup_logging(debug: bool) -> anyhow::Result<()> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("rustls", LevelFilter::Warn)
            .with_module_level("hyper_util", LevelFilter::Warn)
            .with_module_level("reqwest", LevelFilter::Warn);
    }
    logger
        .init()
        .map_err(|err| anyhow::anyhow!("failed to initialize logger: {err}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.debug)?;

    let gateway = build_gateway(&cli).map_err(|e| report(&e, cli.locale))?;

    let (image, output) = match cli.command {
        Commands::Enhance(ref args) => (enhance(gateway, args, cli.locale).await?, &args.output),
        Commands::Mix(ref args) => (mix(gateway, args, cli.locale).await?, &args.output),
    };

    let path = save(&image, output.as_deref()).map_err(|e| report(&e, cli.locale))?;
    print_result(&image, &path, cli.json)
}

fn build_gateway(cli: &Cli) -> editor_ai::Result<GeminiGateway> {
    let mut builder = GeminiGateway::builder().model(GeminiModel::from_id(&cli.model));
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref endpoint) = cli.endpoint {
        builder = builder.endpoint(endpoint);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build()
}

async fn enhance(
    gateway: GeminiGateway,
    args: &EnhanceArgs,
    locale: Locale,
) -> anyhow::Result<GeneratedImage> {
    let enhancer = Enhancer::with_locale(gateway, locale);

    let image = SourceImage::from_path(&args.image)
        .await
        .map_err(|e| report(&e, locale))?;
    enhancer.upload(image).map_err(|e| report(&e, locale))?;

    match args.prompt {
        Some(ref prompt) => enhancer.set_prompt(prompt),
        None => enhancer.use_auto_prompt(),
    }

    let outcome = until_interrupted(enhancer.submit()).await;
    enhancer.teardown();
    outcome.map_err(|e| report(&e, locale))
}

async fn mix(gateway: GeminiGateway, args: &MixArgs, locale: Locale) -> anyhow::Result<GeneratedImage> {
    let mixer = Mixer::with_locale(gateway, locale);

    let mut batch = Vec::with_capacity(args.images.len());
    for path in &args.images {
        batch.push(SourceImage::from_path(path).await.map_err(|e| report(&e, locale))?);
    }
    mixer.upload_batch(batch).map_err(|e| report(&e, locale))?;
    mixer.set_prompt(&args.prompt);

    let outcome = until_interrupted(mixer.submit()).await;
    mixer.teardown();
    outcome.map_err(|e| report(&e, locale))
}

/// Runs `submit` until it finishes or Ctrl-C arrives.
///
/// Dropping the submit future settles the workflow as cancelled.
async fn until_interrupted(
    submit: impl Future<Output = editor_ai::Result<GeneratedImage>>,
) -> editor_ai::Result<GeneratedImage> {
    tokio::select! {
        outcome = submit => outcome,
        _ = tokio::signal::ctrl_c() => {
            log::info!("interrupted, cancelling generation");
            Err(EditorError::Cancelled)
        }
    }
}

fn save(image: &GeneratedImage, output: Option<&Path>) -> editor_ai::Result<PathBuf> {
    match output {
        Some(path) if !path.is_dir() => {
            image.save(path)?;
            Ok(path.to_path_buf())
        }
        Some(dir) => image.save_to_dir(dir),
        None => image.save_to_dir("."),
    }
}

/// Prints the localized message and turns `err` into the process error.
fn report(err: &EditorError, locale: Locale) -> anyhow::Error {
    eprintln!("{}", err.user_message(locale));
    anyhow::anyhow!("{err}")
}

fn print_result(image: &GeneratedImage, path: &Path, json_output: bool) -> anyhow::Result<()> {
    let size_bytes = image.decode()?.len();

    if json_output {
        let result = serde_json::json!({
            "type": "image",
            "success": true,
            "output": path.display().to_string(),
            "size_bytes": size_bytes,
            "mime_type": image.mime_type,
            "model": image.metadata.model,
            "duration_ms": image.metadata.duration_ms,
            "text": image.metadata.text,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Generated image: {} ({} bytes)", path.display(), size_bytes);
        if let Some(duration) = image.metadata.duration_ms {
            println!("Duration: {}ms", duration);
        }
        if let Some(ref text) = image.metadata.text {
            println!("Model note: {}", text);
        }
    }

    Ok(())
}
