use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

fn is_audio_file(path: &Path, extensions: &[String]) -> bool {
    let exts: Vec<String> = extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

/// Walk the assets directory and index audio files by file name.
///
/// Bare audio refs in the manifest resolve through this index, so clips may
/// live in subdirectories of the assets dir. When two files share a name the
/// first one found wins.
pub fn index_audio_files(dir: &Path, extensions: &[String]) -> BTreeMap<String, PathBuf> {
    let mut index: BTreeMap<String, PathBuf> = BTreeMap::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file() && is_audio_file(path, extensions) {
            if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                index
                    .entry(name.to_string())
                    .or_insert_with(|| path.to_path_buf());
            }
        }
    }

    index
}
