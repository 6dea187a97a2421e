//! Structural analysis of a change: file types, complexity, pattern tags.
//!
//! Everything except the architecture call is pure and deterministic; the
//! architecture call's failure is deliberately not absorbed here and travels
//! up to the orchestrator's fallback.

use anyhow::Result;
use tracing::debug;

use crate::core::ai::AiService;
use crate::core::config::AnalysisConfig;
use crate::models::{CodebaseContext, Complexity, FileEntry, PullRequest};

/// Extensions that classify a path as script code.
const SCRIPT_EXTENSIONS: &[&str] = &[".js", ".ts"];

pub struct CodebaseAnalyzer {
    ai: AiService,
    config: AnalysisConfig,
}

impl CodebaseAnalyzer {
    pub fn new(ai: AiService, config: AnalysisConfig) -> Self {
        Self { ai, config }
    }

    /// Derive a [`CodebaseContext`] from the change's file list and commits.
    pub async fn analyze(&self, pr: &PullRequest, files: &[FileEntry]) -> Result<CodebaseContext> {
        let file_types = file_types(files);
        let complexity = self.assess_complexity(files);
        let patterns = extract_patterns(files);

        debug!(
            file_count = files.len(),
            ?complexity,
            pattern_count = patterns.len(),
            "Structural analysis complete"
        );

        let commit_messages: Vec<String> =
            pr.commits.iter().map(|c| c.message.clone()).collect();
        let analysis = self
            .ai
            .analyze_architecture(&file_types, &patterns, &commit_messages)
            .await?;

        Ok(CodebaseContext {
            architecture: analysis.architecture,
            patterns,
            conventions: analysis.conventions,
            tech_stack: file_types,
            complexity,
        })
    }

    /// Threshold classification; monotonic in both chunk and file counts.
    fn assess_complexity(&self, files: &[FileEntry]) -> Complexity {
        let total_chunks: usize = files.iter().map(|f| f.chunk_count).sum();
        let file_count = files.len();

        if total_chunks > self.config.high_chunks || file_count > self.config.high_files {
            Complexity::High
        } else if total_chunks > self.config.medium_chunks || file_count > self.config.medium_files
        {
            Complexity::Medium
        } else {
            Complexity::Low
        }
    }
}

/// Lowercase extension set of the resulting (or origin, for deletions) paths,
/// in insertion order.
pub fn file_types(files: &[FileEntry]) -> Vec<String> {
    let mut extensions = Vec::new();
    for file in files {
        let Some(path) = file.path() else { continue };
        let Some((_, extension)) = path.rsplit_once('.') else {
            continue;
        };
        let extension = extension.to_lowercase();
        if !extension.is_empty() && !extensions.contains(&extension) {
            extensions.push(extension);
        }
    }
    extensions
}

/// Derived membership tags, insertion-ordered, duplicates suppressed.
pub fn extract_patterns(files: &[FileEntry]) -> Vec<String> {
    let mut patterns = Vec::new();
    let mut push = |tag: &str, present: bool| {
        if present && !patterns.iter().any(|p| p == tag) {
            patterns.push(tag.to_string());
        }
    };

    push("file-creation", files.iter().any(|f| f.is_created()));
    push("file-deletion", files.iter().any(|f| f.is_deleted()));
    push("file-renaming", files.iter().any(|f| f.is_renamed()));

    push(
        "javascript-modification",
        files.iter().any(|f| {
            f.result_path
                .as_deref()
                .is_some_and(|p| SCRIPT_EXTENSIONS.iter().any(|ext| p.ends_with(ext)))
        }),
    );
    push(
        "configuration-change",
        any_path_contains(files, &["config", "package"]),
    );
    push(
        "test-modification",
        any_path_contains(files, &["test", "spec"]),
    );

    push("source-code-change", any_path_contains(files, &["src/"]));
    push(
        "documentation-change",
        any_path_contains(files, &["doc", "README"]),
    );
    push(
        "build-system-change",
        any_path_contains(files, &["build", "dist"]),
    );

    patterns
}

fn any_path_contains(files: &[FileEntry], markers: &[&str]) -> bool {
    files.iter().any(|f| {
        f.path()
            .is_some_and(|p| markers.iter().any(|m| p.contains(m)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(origin: Option<&str>, result: Option<&str>, chunks: usize) -> FileEntry {
        FileEntry {
            origin_path: origin.map(String::from),
            result_path: result.map(String::from),
            chunk_count: chunks,
        }
    }

    fn modified(path: &str, chunks: usize) -> FileEntry {
        entry(Some(path), Some(path), chunks)
    }

    fn analyzer_config() -> AnalysisConfig {
        AnalysisConfig::default()
    }

    fn assess(files: &[FileEntry]) -> Complexity {
        let total_chunks: usize = files.iter().map(|f| f.chunk_count).sum();
        let file_count = files.len();
        let config = analyzer_config();
        if total_chunks > config.high_chunks || file_count > config.high_files {
            Complexity::High
        } else if total_chunks > config.medium_chunks || file_count > config.medium_files {
            Complexity::Medium
        } else {
            Complexity::Low
        }
    }

    #[test]
    fn test_file_types_lowercase_deduped() {
        let files = vec![
            modified("src/main.RS", 1),
            modified("src/lib.rs", 1),
            modified("README.md", 1),
            modified("Makefile", 1),
        ];
        assert_eq!(file_types(&files), vec!["rs".to_string(), "md".to_string()]);
    }

    #[test]
    fn test_file_types_use_origin_for_deletions() {
        let files = vec![entry(Some("legacy/old.py"), None, 1)];
        assert_eq!(file_types(&files), vec!["py".to_string()]);
    }

    #[test]
    fn test_complexity_scenario_12_files_55_chunks() {
        let mut files: Vec<FileEntry> = (0..11).map(|i| modified(&format!("f{i}.rs"), 5)).collect();
        files.push(modified("f11.rs", 0));
        assert_eq!(files.len(), 12);
        assert_eq!(files.iter().map(|f| f.chunk_count).sum::<usize>(), 55);
        assert_eq!(assess(&files), Complexity::High);
    }

    #[test]
    fn test_complexity_thresholds() {
        // 1 file, 1 chunk
        assert_eq!(assess(&[modified("a.rs", 1)]), Complexity::Low);
        // 21 chunks in one file crosses the medium chunk threshold
        assert_eq!(assess(&[modified("a.rs", 21)]), Complexity::Medium);
        // 6 files cross the medium file threshold
        let six: Vec<FileEntry> = (0..6).map(|i| modified(&format!("f{i}.rs"), 1)).collect();
        assert_eq!(assess(&six), Complexity::Medium);
        // 51 chunks cross the high chunk threshold
        assert_eq!(assess(&[modified("a.rs", 51)]), Complexity::High);
        // 11 files cross the high file threshold
        let eleven: Vec<FileEntry> = (0..11).map(|i| modified(&format!("f{i}.rs"), 1)).collect();
        assert_eq!(assess(&eleven), Complexity::High);
    }

    #[test]
    fn test_complexity_monotonic_under_superset() {
        let base: Vec<FileEntry> = (0..4).map(|i| modified(&format!("f{i}.rs"), 5)).collect();
        let mut superset = base.clone();
        superset.push(modified("extra1.rs", 3));
        superset.push(modified("extra2.rs", 3));
        assert!(assess(&superset) >= assess(&base));
    }

    #[test]
    fn test_patterns_from_path_presence() {
        let files = vec![
            entry(None, Some("src/new.rs"), 1),
            entry(Some("src/gone.rs"), None, 1),
            entry(Some("src/a.rs"), Some("src/b.rs"), 1),
        ];
        let patterns = extract_patterns(&files);
        assert_eq!(&patterns[..3], &[
            "file-creation".to_string(),
            "file-deletion".to_string(),
            "file-renaming".to_string(),
        ]);
    }

    #[test]
    fn test_patterns_membership_tags() {
        let files = vec![
            modified("src/app.ts", 1),
            modified("package.json", 1),
            modified("tests/app.spec.ts", 1),
            modified("docs/guide.md", 1),
            modified("build/out.js", 1),
        ];
        let patterns = extract_patterns(&files);
        for tag in [
            "javascript-modification",
            "configuration-change",
            "test-modification",
            "source-code-change",
            "documentation-change",
            "build-system-change",
        ] {
            assert!(patterns.iter().any(|p| p == tag), "missing {tag}");
        }
    }

    #[test]
    fn test_source_code_change_requires_src_path() {
        let with_src = vec![modified("src/lib.rs", 1)];
        assert!(extract_patterns(&with_src)
            .iter()
            .any(|p| p == "source-code-change"));

        let without_src = vec![modified("lib.rs", 1)];
        assert!(!extract_patterns(&without_src)
            .iter()
            .any(|p| p == "source-code-change"));
    }
}
