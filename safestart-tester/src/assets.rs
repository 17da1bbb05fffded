use std::fs;
use std::path::{Path, PathBuf};

use safestart_core::{ContentDocument, ContentError, ContentLoader, RankTable};

const BUNDLED_CONTENT: &str =
    include_str!("../../safestart-web/static/assets/data/content.json");

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid content document {path}: {source}")]
    Content {
        path: PathBuf,
        #[source]
        source: ContentError,
    },
    #[error("invalid rank table {path}: {source}")]
    Ranks {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Content and rank table the scenarios run against.
///
/// Defaults to the document bundled with the web crate; either part can be
/// overridden from disk.
#[derive(Debug, Clone, Default)]
pub struct TesterAssets {
    content_path: Option<PathBuf>,
    ranks_path: Option<PathBuf>,
}

impl TesterAssets {
    #[must_use]
    pub fn new(content_path: Option<PathBuf>, ranks_path: Option<PathBuf>) -> Self {
        Self {
            content_path,
            ranks_path,
        }
    }

    #[must_use]
    pub fn content_label(&self) -> String {
        self.content_path
            .as_deref()
            .map_or_else(|| "bundled".to_string(), |p| p.display().to_string())
    }
}

fn read(path: &Path) -> Result<String, AssetError> {
    fs::read_to_string(path).map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })
}

impl ContentLoader for TesterAssets {
    type Error = AssetError;

    fn load_content(&self) -> Result<ContentDocument, Self::Error> {
        match &self.content_path {
            Some(path) => {
                ContentDocument::from_json(&read(path)?).map_err(|source| AssetError::Content {
                    path: path.clone(),
                    source,
                })
            }
            None => ContentDocument::from_json(BUNDLED_CONTENT).map_err(|source| {
                AssetError::Content {
                    path: PathBuf::from("<bundled>"),
                    source,
                }
            }),
        }
    }

    fn load_ranks(&self) -> Result<Option<RankTable>, Self::Error> {
        let Some(path) = &self.ranks_path else {
            return Ok(None);
        };
        RankTable::from_json(&read(path)?)
            .map(Some)
            .map_err(|source| AssetError::Ranks {
                path: path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_assets_load() {
        let assets = TesterAssets::default();
        assert_eq!(assets.load_content().unwrap().quiz.len(), 8);
        assert!(assets.load_ranks().unwrap().is_none());
        assert_eq!(assets.content_label(), "bundled");
    }

    #[test]
    fn missing_override_reports_path() {
        let assets = TesterAssets::new(Some(PathBuf::from("/nonexistent/content.json")), None);
        let err = assets.load_content().unwrap_err();
        assert!(err.to_string().contains("/nonexistent/content.json"));
    }
}
