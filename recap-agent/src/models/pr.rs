//! Change-request and diff-entry models.

use serde::{Deserialize, Serialize};

/// A commit belonging to the change request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    pub message: String,
}

/// Metadata of the change request under review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub author: String,
    #[serde(default)]
    pub commits: Vec<Commit>,
}

impl PullRequest {
    /// Repository identity used as the memory key, e.g. `acme/widgets`.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// One file touched by the diff.
///
/// Path presence encodes the change kind: no origin path means the file was
/// created, no result path means it was deleted, and differing paths mean it
/// was renamed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub origin_path: Option<String>,
    pub result_path: Option<String>,
    pub chunk_count: usize,
}

impl FileEntry {
    pub fn is_created(&self) -> bool {
        self.origin_path.is_none() && self.result_path.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.result_path.is_none() && self.origin_path.is_some()
    }

    pub fn is_renamed(&self) -> bool {
        match (&self.origin_path, &self.result_path) {
            (Some(origin), Some(result)) => origin != result,
            _ => false,
        }
    }

    /// The resulting path, falling back to the origin for deletions.
    pub fn path(&self) -> Option<&str> {
        self.result_path
            .as_deref()
            .or(self.origin_path.as_deref())
    }
}

/// Counts derived from the file list, shared by the technical-context block
/// and the deterministic fallback templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeStats {
    pub modified: usize,
    pub added: usize,
    pub deleted: usize,
    pub renamed: usize,
    pub total_chunks: usize,
    pub commit_count: usize,
}

impl ChangeStats {
    pub fn from_files(files: &[FileEntry], commit_count: usize) -> Self {
        Self {
            modified: files.iter().filter(|f| f.result_path.is_some()).count(),
            added: files.iter().filter(|f| f.is_created()).count(),
            deleted: files.iter().filter(|f| f.is_deleted()).count(),
            renamed: files.iter().filter(|f| f.is_renamed()).count(),
            total_chunks: files.iter().map(|f| f.chunk_count).sum(),
            commit_count,
        }
    }
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

    #[test]
    fn test_change_kinds_from_path_presence() {
        assert!(entry(None, Some("a.rs"), 1).is_created());
        assert!(entry(Some("a.rs"), None, 1).is_deleted());
        assert!(entry(Some("a.rs"), Some("b.rs"), 1).is_renamed());
        let modified = entry(Some("a.rs"), Some("a.rs"), 1);
        assert!(!modified.is_created() && !modified.is_deleted() && !modified.is_renamed());
    }

    #[test]
    fn test_path_prefers_result() {
        assert_eq!(entry(Some("old.rs"), Some("new.rs"), 1).path(), Some("new.rs"));
        assert_eq!(entry(Some("old.rs"), None, 1).path(), Some("old.rs"));
    }

    #[test]
    fn test_stats_counts() {
        let files = vec![
            entry(Some("src/a.rs"), Some("src/a.rs"), 3),
            entry(None, Some("src/b.rs"), 2),
            entry(Some("src/c.rs"), None, 1),
            entry(Some("src/d.rs"), Some("src/e.rs"), 4),
        ];
        let stats = ChangeStats::from_files(&files, 5);
        assert_eq!(stats.modified, 3); // everything with a result path
        assert_eq!(stats.added, 1);
        assert_eq!(stats.deleted, 1);
        assert_eq!(stats.renamed, 1);
        assert_eq!(stats.total_chunks, 10);
        assert_eq!(stats.commit_count, 5);
    }

    #[test]
    fn test_slug() {
        let pr = PullRequest {
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
            number: 7,
            title: String::new(),
            description: String::new(),
            author: "dev".to_string(),
            commits: vec![],
        };
        assert_eq!(pr.slug(), "acme/widgets");
    }
}
