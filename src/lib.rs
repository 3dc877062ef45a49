pub mod batch_service;
pub mod cli;
pub mod commands;
pub mod constants;
pub mod error;
pub mod fs_utils;
pub mod logging;
pub mod models;

use std::io::{self, BufRead};
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use llmapi::LLMClient;
use tracing::warn;

pub use batch_service::{AnthropicBatchService, BatchService};
pub use cli::{Cli, Command};
pub use commands::collect::download_all_results;
pub use commands::inspect::inspect_results;
pub use commands::parse::{load_filename_mapping, parse_results, ParsedResults};
pub use commands::requests::{create_batch_requests, create_custom_id};
pub use commands::status::{check_all_batches_status, collect_batch_status, BatchStatusReport};
pub use commands::submit::submit_batch_chunks;
pub use error::{BatchServiceError, WorkflowError};
pub use models::{BatchTrackingRecord, CoordinateEntry, FilenameMapping, ResultRecord};

use commands::submit::{longest_custom_id, oversized_custom_ids};
use constants::MAX_CUSTOM_ID_LEN;
use fs_utils::{read_json, write_json_pretty};

const PREVIEW_AFTER_DOWNLOAD: usize = 3;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Command::Submit {
            image_dir,
            chunk_size,
            delay_ms,
        } => run_submit(&cli, image_dir, *chunk_size, Duration::from_millis(*delay_ms)).await,
        Command::Status { yes } => run_status(&cli, *yes).await,
        Command::Download => run_download(&cli).await,
        Command::Parse { preview } => run_parse(&cli, *preview).await,
        Command::Inspect { lines } => run_inspect(&cli, *lines).await,
    }
}

fn build_service(cli: &Cli) -> Result<AnthropicBatchService, WorkflowError> {
    let api_key = cli
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(WorkflowError::MissingApiKey)?;

    Ok(AnthropicBatchService::new(LLMClient::new(
        api_key,
        cli.endpoint.trim(),
        cli.model.trim(),
        cli.max_tokens,
    )))
}

pub async fn load_manifest(path: &Path) -> anyhow::Result<Vec<BatchTrackingRecord>> {
    read_json(path)
        .await
        .with_context(|| format!("{} could not be loaded; run `geobatch submit` first", path.display()))
}

async fn run_submit(
    cli: &Cli,
    image_dir: &Path,
    chunk_size: usize,
    delay: Duration,
) -> anyhow::Result<()> {
    let service = build_service(cli)?;

    println!("Step 1: Creating batch requests...");
    let requests = create_batch_requests(image_dir, service.client(), &cli.mapping_file).await?;
    if requests.is_empty() {
        bail!("no requests created; check the image folder path");
    }
    println!("Created {} requests", requests.len());
    println!("Maximum custom_id length: {}", longest_custom_id(&requests));

    let oversized = oversized_custom_ids(&requests);
    if oversized.is_empty() {
        println!("All custom_ids are within the {MAX_CUSTOM_ID_LEN} character limit");
    } else {
        for custom_id in oversized {
            warn!(custom_id, len = custom_id.len(), "custom_id exceeds the length limit");
        }
    }

    println!("\nStep 2: Submitting batches in chunks...");
    let records = submit_batch_chunks(&service, &requests, chunk_size, delay).await;
    if records.is_empty() {
        bail!("failed to submit batches");
    }

    write_json_pretty(&cli.manifest_file, &records).await?;
    println!(
        "\nAll batches submitted! Created {} batch chunks; ids saved to {}",
        records.len(),
        cli.manifest_file.display()
    );
    for record in &records {
        println!("  Chunk {}: {}", record.chunk_num, record.batch_id);
    }

    println!("\nStep 3: Checking initial status...");
    check_all_batches_status(&service, &records).await;

    println!("\nYour batches are processing. Run `geobatch status` later to check on them.");
    Ok(())
}

async fn run_status(cli: &Cli, assume_yes: bool) -> anyhow::Result<()> {
    let records = load_manifest(&cli.manifest_file).await?;
    println!(
        "Loaded {} batch chunks from {}\n",
        records.len(),
        cli.manifest_file.display()
    );
    let service = build_service(cli)?;

    let parsed = check_then_download(
        &service,
        &records,
        &cli.results_file,
        &cli.mapping_file,
        assume_yes,
        &mut io::stdin().lock(),
    )
    .await?;
    if let Some(parsed) = parsed {
        print_preview(&parsed, PREVIEW_AFTER_DOWNLOAD);
    }
    Ok(())
}

/// Reports every job's status and, once all have ended and the operator
/// agrees (or `assume_yes` is set), downloads and parses the results.
///
/// Returns `None` when nothing was downloaded: jobs still running, the
/// operator declined, or no outcomes were available.
pub async fn check_then_download(
    service: &dyn BatchService,
    records: &[BatchTrackingRecord],
    results_file: &Path,
    mapping_file: &Path,
    assume_yes: bool,
    input: &mut impl BufRead,
) -> anyhow::Result<Option<ParsedResults>> {
    print_banner("CHECKING BATCH STATUS");
    if !check_all_batches_status(service, records).await {
        println!("\nSome batches are still processing. Run this command again later.");
        return Ok(None);
    }

    println!("\nAll batches are complete!");
    if !assume_yes && !cli::confirm("\nDownload results now?", input) {
        return Ok(None);
    }

    print_banner("DOWNLOADING RESULTS");
    if !download_all_results(service, records, results_file).await {
        println!("No results to save");
        return Ok(None);
    }

    print_banner("PARSING RESULTS");
    Ok(Some(parse_results(results_file, mapping_file).await?))
}

async fn run_download(cli: &Cli) -> anyhow::Result<()> {
    let records = load_manifest(&cli.manifest_file).await?;
    let service = build_service(cli)?;

    if download_all_results(&service, &records, &cli.results_file).await {
        println!("All results saved to {}", cli.results_file.display());
    } else {
        println!("No results to save");
    }
    Ok(())
}

async fn run_parse(cli: &Cli, preview: usize) -> anyhow::Result<()> {
    let parsed = parse_results(&cli.results_file, &cli.mapping_file).await?;
    print_preview(&parsed, preview);
    Ok(())
}

async fn run_inspect(cli: &Cli, lines: usize) -> anyhow::Result<()> {
    println!("Inspecting structure of {}...", cli.results_file.display());
    for summary in inspect_results(&cli.results_file, lines).await? {
        println!("\n{}", summary.render());
    }
    Ok(())
}

fn print_banner(title: &str) {
    println!("{}", "=".repeat(50));
    println!("{title}");
    println!("{}", "=".repeat(50));
}

fn print_preview(parsed: &ParsedResults, count: usize) {
    println!("\nParsed {} results", parsed.coordinates.len());
    if !parsed.failures.is_empty() {
        println!("{} requests failed", parsed.failures.len());
    }
    if count == 0 || parsed.coordinates.is_empty() {
        return;
    }

    println!("\nFirst {count} results:");
    for (index, entry) in parsed.coordinates.iter().take(count).enumerate() {
        println!("  {}. {}", index + 1, entry.filename);
        println!("     {}", entry.response);
        println!();
    }
}
