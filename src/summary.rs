//! Repository summary extraction
//!
//! Composes the tree listing, structure analysis and README lookup into a
//! [`RepoSummary`]. Gateway failures never escape from here: a missing tree
//! becomes an empty forest and a missing README an empty string.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analyzer::{analyze_structure, KeyFileCatalog};
use crate::github::{FileContent, RepoGateway};
use crate::tree::{fetch_tree, TreeNode};

/// README file names tried in order.
pub const README_VARIANTS: &[&str] = &[
    "README.md",
    "readme.md",
    "Readme.md",
    "README.txt",
    "readme.txt",
    "README",
    "readme",
];

/// Everything the context formatter needs about one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSummary {
    pub readme: String,
    pub tree: Vec<TreeNode>,
    /// File count per extension. Keyed alphabetically, so languages with
    /// equal counts are listed alphabetically rather than in traversal order.
    pub languages: BTreeMap<String, usize>,
    pub key_files: Vec<String>,
    pub top_level_dirs: Vec<String>,
}

/// First README variant that decodes to non-empty text, or `""`.
pub async fn fetch_readme(gateway: &dyn RepoGateway, owner: &str, repo: &str) -> String {
    for name in README_VARIANTS {
        match gateway.read_file(owner, repo, name).await {
            Ok(FileContent::Text(text)) if !text.trim().is_empty() => {
                tracing::debug!(file = name, "Found README");
                return text;
            }
            Ok(_) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => tracing::debug!(file = name, error = %e, "README lookup failed"),
        }
    }
    String::new()
}

/// Fetch and analyze a repository.
#[tracing::instrument(skip(gateway, catalog))]
pub async fn extract_repo_summary(
    gateway: &dyn RepoGateway,
    owner: &str,
    repo: &str,
    catalog: &KeyFileCatalog,
) -> RepoSummary {
    let tree = fetch_tree(gateway, owner, repo).await;
    let stats = analyze_structure(&tree, catalog);
    let readme = fetch_readme(gateway, owner, repo).await;

    tracing::info!(
        languages = stats.languages.len(),
        key_files = stats.key_files.len(),
        readme_chars = readme.chars().count(),
        "Extracted repository summary"
    );

    RepoSummary {
        readme,
        tree,
        languages: stats.languages,
        key_files: stats.key_files,
        top_level_dirs: stats.top_level_dirs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::fake::FakeGateway;
    use crate::github::{BinaryFileInfo, BinaryKind};

    #[tokio::test]
    async fn test_extract_scenario() {
        let gateway = FakeGateway::new()
            .with_text("src/main.py", "print('hi')\n")
            .with_text("src/utils/helpers.py", "def help():\n    pass\n")
            .with_text("README.md", "# Demo\n");

        let summary =
            extract_repo_summary(&gateway, "octo", "demo", &KeyFileCatalog::default()).await;

        assert_eq!(summary.readme, "# Demo\n");
        assert_eq!(summary.top_level_dirs, vec!["src"]);
        assert_eq!(summary.languages.get("py"), Some(&2));
        assert_eq!(summary.languages.get("md"), Some(&1));
        assert_eq!(summary.key_files, vec!["src/main.py"]);
        assert_eq!(summary.tree.len(), 2);
    }

    #[tokio::test]
    async fn test_readme_variant_order() {
        let gateway = FakeGateway::new()
            .with_text("readme.txt", "plain readme")
            .with_text("README", "bare readme");
        assert_eq!(fetch_readme(&gateway, "o", "r").await, "plain readme");
    }

    #[tokio::test]
    async fn test_empty_and_binary_readmes_are_skipped() {
        let gateway = FakeGateway::new()
            .with_text("README.md", "   \n")
            .with_file(
                "readme.md",
                FileContent::Binary(BinaryFileInfo {
                    is_binary: true,
                    name: "readme.md".to_string(),
                    size: 10,
                    download_url: String::new(),
                    kind: BinaryKind::Binary,
                    encoding: "base64".to_string(),
                }),
            )
            .with_text("README", "fallback");
        assert_eq!(fetch_readme(&gateway, "o", "r").await, "fallback");
    }

    #[tokio::test]
    async fn test_offline_gateway_degrades_to_empty() {
        let gateway = FakeGateway::offline();
        let summary =
            extract_repo_summary(&gateway, "o", "r", &KeyFileCatalog::default()).await;
        assert_eq!(summary, RepoSummary::default());
    }

    #[test]
    fn test_serializes_camel_case() {
        let summary = RepoSummary {
            top_level_dirs: vec!["src".to_string()],
            key_files: vec!["setup.py".to_string()],
            ..Default::default()
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["topLevelDirs"][0], "src");
        assert_eq!(json["keyFiles"][0], "setup.py");
    }
}
