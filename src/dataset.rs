use crate::models::PlaylistRecord;
use anyhow::{Context, Result};
use std::path::Path;

/// Load playlist records from a JSON array file or a JSON Lines (`.jsonl`) file
pub fn load_playlists(path: &Path) -> Result<Vec<PlaylistRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset '{}'", path.display()))?;

    let is_jsonl = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"));

    if is_jsonl {
        parse_json_lines(&content)
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse dataset '{}' as a JSON array", path.display()))
    }
}

/// One record per non-blank line
pub fn parse_json_lines(content: &str) -> Result<Vec<PlaylistRecord>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Invalid playlist record on line {}", index + 1))
        })
        .collect()
}
