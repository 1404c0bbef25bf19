//! Safe filename generation utilities

use std::path::{Component, Path, PathBuf};

/// Name used when a title sanitizes down to nothing
const FALLBACK_STEM: &str = "download";

/// Strip a trailing extension from a title, the same way a path would be split.
///
/// Only the text after the last `/` is considered, and leading dots never
/// count as an extension separator (".hidden" stays as is).
pub fn title_stem(title: &str) -> &str {
    let name_start = title.rfind('/').map(|i| i + 1).unwrap_or(0);
    let name = &title[name_start..];

    match name.rfind('.') {
        Some(dot) if name[..dot].chars().any(|c| c != '.') => &title[..name_start + dot],
        _ => title,
    }
}

/// Build a header- and filesystem-safe display filename from a source title.
///
/// Keeps alphanumerics, spaces, hyphens and underscores, drops trailing
/// whitespace and appends the extension.
pub fn safe_display_name(title: &str, extension: &str) -> String {
    let cleaned: String = title_stem(title)
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let cleaned = cleaned.trim_end();

    let stem = if cleaned.is_empty() {
        FALLBACK_STEM
    } else {
        cleaned
    };

    format!("{}.{}", stem, extension.trim_start_matches('.'))
}

/// Guess the on-disk path a title would have been written to inside `dir`.
///
/// Returns `None` when the title would not name a plain file directly inside
/// `dir` (separators, `..`, absolute paths).
pub fn title_fallback_path(dir: &Path, title: &str, extension: &str) -> Option<PathBuf> {
    let name = format!(
        "{}.{}",
        title_stem(title),
        extension.trim_start_matches('.')
    );
    if name.contains(['/', '\\']) {
        return None;
    }

    let mut components = Path::new(&name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(dir.join(&name)),
        _ => None,
    }
}

/// Check if a filename ends with the given extension.
///
/// Case-insensitive, so `Song.MP3` counts as mp3.
pub fn has_extension(filename: &str, extension: &str) -> bool {
    let suffix = format!(".{}", extension.trim_start_matches('.'));
    filename.len() >= suffix.len()
        && filename
            .get(filename.len() - suffix.len()..)
            .map(|tail| tail.eq_ignore_ascii_case(&suffix))
            .unwrap_or(false)
}
