use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use pantry_core::{MaterialDraft, Won};
use pantry_ocr::{
    ExtractionConfig, ExtractionError, LineItem, MockRecognizer, PipelineError, ReceiptExtractor,
    ReceiptPipeline,
};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// OCR engine response (JSON)
    pub response: PathBuf,

    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct MaterialsArgs {
    /// OCR engine response (JSON)
    pub response: PathBuf,

    /// Purchase time (RFC 3339); defaults to now
    #[arg(long)]
    pub purchased_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Receipt image
    pub image: PathBuf,

    /// Saved OCR response the mock engine answers with
    #[arg(long)]
    pub response: PathBuf,

    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

pub fn load_config(
    path: Option<&Path>,
    single_pass: bool,
    row_tolerance: Option<f64>,
    column_tolerance: Option<f64>,
) -> anyhow::Result<ExtractionConfig> {
    let mut config = match path {
        Some(p) => ExtractionConfig::load(p)
            .with_context(|| format!("Failed to load config {}", p.display()))?,
        None => ExtractionConfig::default(),
    };
    if let Some(t) = row_tolerance {
        config = config.with_row_tolerance(t);
    } else if single_pass {
        config = config.single_pass();
    }
    if let Some(t) = column_tolerance {
        config = config.with_column_tolerance(t);
    }
    config.validate()?;
    Ok(config)
}

pub fn extract(args: ExtractArgs, config: ExtractionConfig) -> anyhow::Result<()> {
    let items = extract_from_file(&args.response, config)?;
    println!("{}", render(&items, args.format)?);
    Ok(())
}

pub fn materials(args: MaterialsArgs, config: ExtractionConfig) -> anyhow::Result<()> {
    let items = extract_from_file(&args.response, config)?;
    let purchased_at = args.purchased_at.unwrap_or_else(Utc::now);
    let drafts = to_materials(&items, purchased_at);
    println!("{}", serde_json::to_string_pretty(&drafts)?);
    Ok(())
}

pub async fn scan(args: ScanArgs, config: ExtractionConfig) -> anyhow::Result<()> {
    let response = read_response(&args.response)?;
    let pipeline = ReceiptPipeline::new(MockRecognizer::new(response), config);

    tracing::info!("Processing receipt: {}", args.image.display());
    let scan = pipeline.process_file(&args.image).await.map_err(|e| match e {
        PipelineError::Extraction(err) => user_facing(err),
        other => anyhow!(other),
    })?;

    println!("{}", render(&scan.items, args.format)?);
    Ok(())
}

fn extract_from_file(path: &Path, config: ExtractionConfig) -> anyhow::Result<Vec<LineItem>> {
    let response = read_response(path)?;
    let outcome = ReceiptExtractor::new(config)
        .extract(&response)
        .map_err(user_facing)?;
    match outcome.row_tolerance {
        Some(t) => tracing::info!("Extracted {} item(s) at row tolerance {t}", outcome.items.len()),
        None => tracing::warn!("No items found after {} attempt(s)", outcome.attempts),
    }
    Ok(outcome.items)
}

fn read_response(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn user_facing(err: ExtractionError) -> anyhow::Error {
    anyhow!("{} ({err})", err.user_message())
}

fn to_materials(items: &[LineItem], purchased_at: DateTime<Utc>) -> Vec<MaterialDraft> {
    items
        .iter()
        .map(|item| item.to_material(purchased_at))
        .filter(|draft| match draft.validate() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Skipping item '{}': {e}", draft.name);
                false
            }
        })
        .collect()
}

fn render(items: &[LineItem], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(items)?),
        OutputFormat::Table => Ok(render_table(items)),
    }
}

// Names go last: Hangul is double-width in a terminal, so padding them by
// char count would skew every column after them.
fn render_table(items: &[LineItem]) -> String {
    let mut out = format!("{:>12} {:>5} {:>12} {}\n", "PRICE", "QTY", "TOTAL", "NAME");
    for item in items {
        out.push_str(&format!(
            "{:>12} {:>5} {:>12} {}\n",
            Won::new(item.price).to_string(),
            item.quantity,
            Won::new(item.total).to_string(),
            item.name,
        ));
    }
    out.push_str(&format!("{} item(s)", items.len()));
    out
}
