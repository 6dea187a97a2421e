//! Unified-diff parsing into structured file entries.
//!
//! Only the information the pipeline consumes is extracted: origin/result
//! paths (with `/dev/null` mapped to absence) and the hunk count per file.

use glob::Pattern;
use tracing::warn;

use crate::models::FileEntry;

/// Parse a unified diff into file entries.
pub fn parse_diff(diff: &str) -> Vec<FileEntry> {
    let mut entries = Vec::new();
    let mut current: Option<FileEntry> = None;

    for line in diff.lines() {
        if line.starts_with("diff --git ") {
            if let Some(entry) = current.take() {
                entries.push(entry);
            }
            current = Some(FileEntry {
                origin_path: None,
                result_path: None,
                chunk_count: 0,
            });
            continue;
        }

        let Some(entry) = current.as_mut() else {
            continue;
        };

        if let Some(path) = line.strip_prefix("--- ") {
            entry.origin_path = normalize_path(path, "a/");
        } else if let Some(path) = line.strip_prefix("+++ ") {
            entry.result_path = normalize_path(path, "b/");
        } else if line.starts_with("@@") {
            entry.chunk_count += 1;
        }
    }

    if let Some(entry) = current.take() {
        entries.push(entry);
    }

    entries
}

/// `/dev/null` means the side does not exist; the `a/`/`b/` prefix is
/// stripped from real paths.
fn normalize_path(raw: &str, prefix: &str) -> Option<String> {
    let path = raw.split('\t').next().unwrap_or(raw).trim();
    if path == "/dev/null" {
        return None;
    }
    Some(path.strip_prefix(prefix).unwrap_or(path).to_string())
}

/// Drop entries whose path matches any exclude glob. Unparseable patterns are
/// skipped with a warning rather than failing the run.
pub fn filter_excluded(entries: Vec<FileEntry>, exclude: &[String]) -> Vec<FileEntry> {
    let patterns: Vec<Pattern> = exclude
        .iter()
        .filter_map(|raw| match Pattern::new(raw) {
            Ok(pattern) => Some(pattern),
            Err(err) => {
                warn!(pattern = %raw, %err, "Ignoring invalid exclude pattern");
                None
            },
        })
        .collect();

    if patterns.is_empty() {
        return entries;
    }

    entries
        .into_iter()
        .filter(|entry| {
            let Some(path) = entry.path() else {
                return true;
            };
            !patterns.iter().any(|pattern| pattern.matches(path))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
diff --git a/src/lib.rs b/src/lib.rs
index 1111111..2222222 100644
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,4 +1,6 @@
 line
+added
@@ -10,3 +12,3 @@
 line
diff --git a/old_name.rs b/new_name.rs
similarity index 90%
rename from old_name.rs
rename to new_name.rs
--- a/old_name.rs
+++ b/new_name.rs
@@ -1 +1 @@
-old
+new
diff --git a/gone.txt b/gone.txt
deleted file mode 100644
--- a/gone.txt
+++ /dev/null
@@ -1,2 +0,0 @@
-bye
diff --git a/fresh.txt b/fresh.txt
new file mode 100644
--- /dev/null
+++ b/fresh.txt
@@ -0,0 +1 @@
+hi
";

    #[test]
    fn test_parse_paths_and_chunks() {
        let entries = parse_diff(SAMPLE);
        assert_eq!(entries.len(), 4);

        assert_eq!(entries[0].origin_path.as_deref(), Some("src/lib.rs"));
        assert_eq!(entries[0].result_path.as_deref(), Some("src/lib.rs"));
        assert_eq!(entries[0].chunk_count, 2);

        assert!(entries[1].is_renamed());
        assert!(entries[2].is_deleted());
        assert!(entries[3].is_created());
    }

    #[test]
    fn test_parse_empty_diff() {
        assert!(parse_diff("").is_empty());
    }

    #[test]
    fn test_filter_excluded() {
        let entries = parse_diff(SAMPLE);
        let filtered = filter_excluded(entries, &["src/*.rs".to_string()]);
        assert_eq!(filtered.len(), 3);
        assert!(filtered.iter().all(|e| e.path() != Some("src/lib.rs")));
    }

    #[test]
    fn test_filter_invalid_pattern_is_ignored() {
        let entries = parse_diff(SAMPLE);
        let filtered = filter_excluded(entries.clone(), &["[".to_string()]);
        assert_eq!(filtered.len(), entries.len());
    }
}
