use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use coupon_core::ExtractedCoupon;
use coupon_extract::{build_prompt, normalize, Extractor, GeminiClient, INSTRUCTIONS};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "coupon-cli")]
#[command(about = "Extract structured coupon fields from pasted text")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Send coupon text to the model and print the extracted fields as JSON.
    Extract {
        /// Read the coupon text from this file instead of stdin.
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Normalize a saved raw model response without calling the model.
    Normalize {
        /// Read the raw response from this file instead of stdin.
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Print the prompt that `extract` would send.
    Prompt {
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract { file } => {
            let input = read_input(file.as_deref())?;
            let text = coupon_text(&input)?;
            let config = coupon_core::load_app_config()?;
            let gemini = GeminiClient::with_base_url(
                &config.gemini_api_key,
                &config.gemini_model,
                &config.gemini_base_url,
            )?;
            tracing::debug!(model = %config.gemini_model, text_len = text.len(), "extracting coupon");
            let coupon = Extractor::new(gemini).extract_coupon(text).await?;
            let extracted = ExtractedCoupon::new(coupon);
            tracing::info!(coupon_id = %extracted.id, "coupon extracted");
            print_json(&extracted)?;
        }
        Commands::Normalize { file } => {
            let raw = read_input(file.as_deref())?;
            tracing::debug!(raw_len = raw.len(), "normalizing saved model response");
            let coupon = normalize(Some(raw.as_str()))?;
            print_json(&coupon)?;
        }
        Commands::Prompt { file } => {
            let input = read_input(file.as_deref())?;
            let text = coupon_text(&input)?;
            println!("{}", build_prompt(INSTRUCTIONS, text));
        }
    }

    Ok(())
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Rejects blank input before any model call is made. Non-blank input is
/// passed through unchanged.
fn coupon_text(input: &str) -> anyhow::Result<&str> {
    if input.trim().is_empty() {
        anyhow::bail!("coupon text is empty");
    }
    Ok(input)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
