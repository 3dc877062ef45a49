pub const DEFAULT_ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_CHUNK_SIZE: usize = 50;
pub const DEFAULT_SUBMIT_DELAY_MS: u64 = 1000;

pub const MAPPING_FILE: &str = "filename_mapping.json";
pub const MANIFEST_FILE: &str = "batch_ids.json";
pub const RESULTS_FILE: &str = "geolocation_results.jsonl";

pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

pub const CUSTOM_ID_PREFIX: &str = "geo";
pub const CUSTOM_ID_DIGEST_LEN: usize = 8;
pub const MAX_CUSTOM_ID_LEN: usize = 64;

pub const GEOLOCATION_PROMPT: &str = "You are a geolocation AI trained to estimate the latitude and longitude of any image based on visual features alone — such as architecture, vegetation, signage, weather, and landforms. Even without GPS or metadata, you must always provide your best guess. Please return the result in only this format with 4 decimal places: Latitude: <decimal> Longitude: <decimal>";
