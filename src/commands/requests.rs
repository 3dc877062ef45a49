use std::path::Path;

use llmapi::utils::encode_byte_to_base64;
use llmapi::{build_batch_request, BatchRequest, LLMClient, LLMMessage, LLMMessageType};
use tokio::fs;
use tracing::{info, warn};

use crate::constants::{
    CUSTOM_ID_DIGEST_LEN, CUSTOM_ID_PREFIX, GEOLOCATION_PROMPT, MAX_CUSTOM_ID_LEN,
};
use crate::error::WorkflowError;
use crate::fs_utils::{collect_image_files, write_json_pretty};
use crate::models::FilenameMapping;

/// `geo_<index>_<first 8 hex digits of md5(filename)>`.
///
/// The batch API caps identifiers at 64 characters. Should the index ever
/// push past that, the digest is shortened and the index kept intact.
pub fn create_custom_id(filename: &str, index: usize) -> String {
    let digest = format!("{:x}", md5::compute(filename.as_bytes()));
    let prefix = format!("{CUSTOM_ID_PREFIX}_{index}_");
    let digest_len = CUSTOM_ID_DIGEST_LEN.min(MAX_CUSTOM_ID_LEN.saturating_sub(prefix.len()));

    format!("{prefix}{}", &digest[..digest_len])
}

/// Builds one geolocation request per image in `image_dir` and writes the
/// identifier -> filename table to `mapping_path`, replacing any previous one.
///
/// Entries that cannot be read (directories, broken links, permission
/// errors) are logged and left out, but still consume their index, so every
/// identifier reflects the file's position among the listed names.
pub async fn create_batch_requests(
    image_dir: &Path,
    client: &LLMClient,
    mapping_path: &Path,
) -> Result<Vec<BatchRequest>, WorkflowError> {
    let images = collect_image_files(image_dir).await?;
    info!(count = images.len(), dir = %image_dir.display(), "found images to process");

    let mut requests = Vec::with_capacity(images.len());
    let mut mapping = FilenameMapping::new();

    for (index, image) in images.into_iter().enumerate() {
        let bytes = match fs::read(&image.path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(file = %image.file_name, error = %err, "error processing image, skipping");
                continue;
            }
        };

        let custom_id = create_custom_id(&image.file_name, index);
        let message = LLMMessage::new(
            Some(custom_id.clone()),
            "user",
            vec![
                LLMMessageType::image_named(encode_byte_to_base64(bytes), image.file_name.clone()),
                LLMMessageType::text(GEOLOCATION_PROMPT),
            ],
        );

        requests.push(build_batch_request(client, custom_id.clone(), vec![message]));
        mapping.insert(custom_id, image.file_name);
    }

    write_json_pretty(mapping_path, &mapping).await?;
    info!(path = %mapping_path.display(), entries = mapping.len(), "filename mapping saved");

    Ok(requests)
}
