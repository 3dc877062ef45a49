use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::constants::{
    DEFAULT_ANTHROPIC_ENDPOINT, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_SUBMIT_DELAY_MS, MANIFEST_FILE, MAPPING_FILE, RESULTS_FILE,
};

#[derive(Debug, Parser)]
#[command(
    name = "geobatch",
    version,
    about = "Estimate where photos were taken using the Anthropic Message Batches API"
)]
pub struct Cli {
    /// Anthropic API key.
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "ANTHROPIC_ENDPOINT", default_value = DEFAULT_ANTHROPIC_ENDPOINT, global = true)]
    pub endpoint: String,

    #[arg(long, env = "GEOBATCH_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub model: String,

    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS, global = true)]
    pub max_tokens: u32,

    /// Identifier -> filename table written by `submit`.
    #[arg(long, default_value = MAPPING_FILE, global = true)]
    pub mapping_file: PathBuf,

    /// Submitted job manifest written by `submit`.
    #[arg(long, default_value = MANIFEST_FILE, global = true)]
    pub manifest_file: PathBuf,

    /// Newline-delimited results log written by `download`.
    #[arg(long, default_value = RESULTS_FILE, global = true)]
    pub results_file: PathBuf,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build one request per image in a directory and submit them in chunks.
    Submit {
        image_dir: PathBuf,
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, value_parser = parse_chunk_size)]
        chunk_size: usize,
        /// Pause between chunk submissions, in milliseconds.
        #[arg(long, default_value_t = DEFAULT_SUBMIT_DELAY_MS)]
        delay_ms: u64,
    },
    /// Report progress of submitted jobs; offer to download once all have ended.
    Status {
        /// Download without asking once every job has ended.
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Download the outcomes of every ended job into the results log.
    Download,
    /// Join the results log back to the original filenames.
    Parse {
        #[arg(long, default_value_t = 3)]
        preview: usize,
    },
    /// Print the structure of the first lines of the results log.
    Inspect {
        #[arg(long, default_value_t = 3)]
        lines: usize,
    },
}

fn parse_chunk_size(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("chunk size must be at least 1".to_string()),
        Ok(size) => Ok(size),
        Err(err) => Err(err.to_string()),
    }
}

/// Asks a yes/no question on stdout and reads the answer from `input`.
pub fn confirm(question: &str, input: &mut impl BufRead) -> bool {
    print!("{question} (y/n): ");
    let _ = io::stdout().flush();

    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => is_affirmative(&answer),
        Err(_) => false,
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
