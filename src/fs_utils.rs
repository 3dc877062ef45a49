use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tracing::warn;

use crate::constants::IMAGE_EXTENSIONS;
use crate::error::WorkflowError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub path: PathBuf,
}

/// Entries directly inside `dir` whose names carry an image extension, in
/// directory-listing order. Entries are not opened here, so a directory or
/// broken link with an image name is listed and fails later when read.
pub async fn collect_image_files(dir: &Path) -> Result<Vec<ImageFile>, WorkflowError> {
    let read_dir_error = |source| WorkflowError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir).await.map_err(read_dir_error)?;
    let mut images = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(read_dir_error)? {
        let file_name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                warn!(file_name = ?raw, "skipping file with a non UTF-8 name");
                continue;
            }
        };

        if !has_image_extension(&file_name) {
            continue;
        }

        images.push(ImageFile {
            file_name,
            path: entry.path(),
        });
    }

    Ok(images)
}

pub fn has_image_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

pub async fn read_to_string(path: &Path) -> Result<String, WorkflowError> {
    fs::read_to_string(path)
        .await
        .map_err(|source| WorkflowError::Read {
            path: path.to_path_buf(),
            source,
        })
}

pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, WorkflowError> {
    let contents = read_to_string(path).await?;
    serde_json::from_str(&contents).map_err(|source| WorkflowError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub async fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<(), WorkflowError> {
    let contents = serde_json::to_vec_pretty(value).map_err(|source| WorkflowError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_file_atomically(path, &contents).await
}

/// Writes `contents` to a sibling temp file and renames it over `path`, so
/// readers see either the previous file or the complete new one.
pub async fn write_file_atomically(path: &Path, contents: &[u8]) -> Result<(), WorkflowError> {
    let temp_path = temp_sibling(path);
    let write_error = |source| WorkflowError::Write {
        path: path.to_path_buf(),
        source,
    };

    fs::write(&temp_path, contents).await.map_err(write_error)?;
    if let Err(err) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(write_error(err));
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".tmp");
    path.with_file_name(name)
}
