use crate::error::{IndexerError, Result};
use crate::store::ParseFailure;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// One markdown file of the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusFile {
    /// Forward-slash path relative to the corpus root.
    pub path: String,
    pub content: String,
}

/// Enumerates the markdown files under a corpus root.
///
/// Hidden entries and `.gitignore`d paths are skipped. Paths come back sorted so the
/// enumeration order of the file system never reaches the graph.
#[derive(Debug, Clone)]
pub struct CorpusScanner {
    root: PathBuf,
}

impl CorpusScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative paths of every `*.md` file, sorted.
    pub fn scan(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(IndexerError::InvalidPath(format!(
                "corpus root {} is not a readable directory",
                self.root.display()
            )));
        }
        std::fs::read_dir(&self.root).map_err(|e| {
            IndexerError::InvalidPath(format!("corpus root {}: {e}", self.root.display()))
        })?;

        let walker = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(true)
            .require_git(false)
            .build();

        let mut paths = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Skipping unreadable corpus entry: {err}");
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            if let Some(relative) = self.relative(path) {
                paths.push(relative);
            }
        }
        paths.sort();
        log::debug!("Found {} markdown files under {}", paths.len(), self.root.display());
        Ok(paths)
    }

    /// Scan and read every file. Files that cannot be read become failures.
    pub async fn read_all(&self) -> Result<(Vec<CorpusFile>, Vec<ParseFailure>)> {
        let mut files = Vec::new();
        let mut failures = Vec::new();
        for path in self.scan()? {
            match tokio::fs::read_to_string(self.root.join(&path)).await {
                Ok(content) => files.push(CorpusFile { path, content }),
                Err(err) => {
                    log::warn!("Failed to read {path}: {err}");
                    failures.push(ParseFailure {
                        path,
                        reason: format!("unreadable: {err}"),
                    });
                }
            }
        }
        Ok((files, failures))
    }

    fn relative(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("/"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(root: &Path, path: &str, content: &str) {
        let full = root.join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
    }

    #[test]
    fn keeps_visible_markdown_sorted() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "specs/z.md", "# Z");
        write(temp.path(), "features/a.md", "# A");
        write(temp.path(), "prd.md", "# PRD");
        write(temp.path(), "notes.txt", "not markdown");
        write(temp.path(), ".drafts/hidden.md", "# Hidden");
        write(temp.path(), "build/out.md", "# Generated");
        write(temp.path(), ".gitignore", "build/\n");

        let paths = CorpusScanner::new(temp.path()).scan().unwrap();
        assert_eq!(paths, vec!["features/a.md", "prd.md", "specs/z.md"]);
    }

    #[test]
    fn missing_root_is_fatal() {
        let temp = TempDir::new().unwrap();
        let err = CorpusScanner::new(temp.path().join("nope")).scan().unwrap_err();
        assert!(matches!(err, IndexerError::InvalidPath(_)));
    }

    #[tokio::test]
    async fn reads_contents() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.md", "# A <!-- id: spec_a -->");

        let (files, failures) = CorpusScanner::new(temp.path()).read_all().await.unwrap();
        assert!(failures.is_empty());
        assert_eq!(
            files,
            vec![CorpusFile {
                path: "a.md".to_string(),
                content: "# A <!-- id: spec_a -->".to_string(),
            }]
        );
    }
}
