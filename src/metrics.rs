//! Static statistics for Python sources and dependency manifests.
//!
//! These are regex approximations. They count keywords and signatures, they
//! do not parse.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::github::{CommitInfo, FileContent, RepoGateway};
use crate::tree::{fetch_tree, file_paths};

/// One `def` found in a Python file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    pub parameters: Vec<String>,
    /// 1-based line of the `def`
    pub line_number: usize,
}

/// Per-file statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileComplexity {
    pub cyclomatic_complexity: usize,
    pub lines_of_code: usize,
    pub functions: Vec<FunctionInfo>,
}

/// `dependencies` / `devDependencies` from `package.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsDependencies {
    #[serde(default)]
    pub dependencies: serde_json::Map<String, serde_json::Value>,
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dependencies {
    /// Non-empty lines of `requirements.txt`
    pub python: Vec<String>,
    pub javascript: JsDependencies,
}

fn branch_pattern() -> &'static Regex {
    static BRANCH: OnceLock<Regex> = OnceLock::new();
    BRANCH.get_or_init(|| {
        Regex::new(r"\b(if|for|while|except|with|def|class)\b").expect("static branch pattern")
    })
}

fn def_pattern() -> &'static Regex {
    static DEF: OnceLock<Regex> = OnceLock::new();
    DEF.get_or_init(|| Regex::new(r"def\s+(\w+)\s*\((.*?)\):").expect("static def pattern"))
}

/// One plus the number of branching keywords.
pub fn cyclomatic_complexity(code: &str) -> usize {
    branch_pattern().find_iter(code).count() + 1
}

/// Every single-line `def name(params):` signature.
pub fn analyze_functions(code: &str) -> Vec<FunctionInfo> {
    def_pattern()
        .captures_iter(code)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str().to_string();
            let parameters = caps
                .get(2)
                .map(|m| {
                    m.as_str()
                        .split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default();
            let line_number = code[..whole.start()].matches('\n').count() + 1;
            Some(FunctionInfo {
                name,
                parameters,
                line_number,
            })
        })
        .collect()
}

pub fn file_complexity(code: &str) -> FileComplexity {
    FileComplexity {
        cyclomatic_complexity: cyclomatic_complexity(code),
        lines_of_code: code.lines().count(),
        functions: analyze_functions(code),
    }
}

/// Statistics for every `.py` file in the repository, keyed by path.
///
/// Files that cannot be read or are not text are left out.
#[tracing::instrument(skip(gateway))]
pub async fn analyze_complexity(
    gateway: &dyn RepoGateway,
    owner: &str,
    repo: &str,
) -> BTreeMap<String, FileComplexity> {
    let tree = fetch_tree(gateway, owner, repo).await;
    let mut report = BTreeMap::new();

    for path in file_paths(&tree).into_iter().filter(|p| p.ends_with(".py")) {
        match gateway.read_file(owner, repo, &path).await {
            Ok(FileContent::Text(code)) if !code.is_empty() => {
                report.insert(path, file_complexity(&code));
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(path = %path, error = %e, "Skipping unreadable file"),
        }
    }

    tracing::info!(files = report.len(), "Complexity analysis finished");
    report
}

/// Requirements lines, trimmed, blanks dropped.
pub fn parse_requirements(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/// Dependency objects from a `package.json`; invalid JSON yields empty maps.
pub fn parse_package_json(text: &str) -> JsDependencies {
    serde_json::from_str(text).unwrap_or_default()
}

async fn read_text(gateway: &dyn RepoGateway, owner: &str, repo: &str, path: &str) -> Option<String> {
    match gateway.read_file(owner, repo, path).await {
        Ok(content) => content.into_text(),
        Err(e) => {
            if !e.is_not_found() {
                tracing::warn!(path, error = %e, "Could not read manifest");
            }
            None
        }
    }
}

/// Python and JavaScript dependencies declared at the repository root.
#[tracing::instrument(skip(gateway))]
pub async fn get_dependencies(gateway: &dyn RepoGateway, owner: &str, repo: &str) -> Dependencies {
    let python = read_text(gateway, owner, repo, "requirements.txt")
        .await
        .map(|t| parse_requirements(&t))
        .unwrap_or_default();
    let javascript = read_text(gateway, owner, repo, "package.json")
        .await
        .map(|t| parse_package_json(&t))
        .unwrap_or_default();

    Dependencies { python, javascript }
}

/// Recent commits; empty when the listing fails.
#[tracing::instrument(skip(gateway))]
pub async fn commit_history(gateway: &dyn RepoGateway, owner: &str, repo: &str) -> Vec<CommitInfo> {
    gateway.list_commits(owner, repo).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Commit history unavailable");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::fake::FakeGateway;

    const SAMPLE: &str = "\
import os

class Loader:
    def __init__(self, root):
        self.root = root

    def load(self, name, *, strict=False):
        if strict and not os.path.exists(name):
            raise FileNotFoundError(name)
        for part in name.split('/'):
            while part:
                part = part[1:]
        with open(name) as f:
            return f.read()

def main():
    try:
        Loader('.').load('x')
    except OSError:
        pass
";

    #[test]
    fn test_cyclomatic_complexity_counts_keywords() {
        // class, def x3, if, for, while, with, except = 9
        assert_eq!(cyclomatic_complexity(SAMPLE), 10);
        assert_eq!(cyclomatic_complexity(""), 1);
        // Word boundaries: "iffy" and "format" do not count
        assert_eq!(cyclomatic_complexity("iffy = format"), 1);
    }

    #[test]
    fn test_analyze_functions() {
        let functions = analyze_functions(SAMPLE);
        let names: Vec<&str> = functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["__init__", "load", "main"]);

        assert_eq!(functions[0].parameters, vec!["self", "root"]);
        assert_eq!(functions[0].line_number, 4);
        assert_eq!(functions[1].parameters, vec!["self", "name", "*", "strict=False"]);
        assert_eq!(functions[1].line_number, 7);
        assert!(functions[2].parameters.is_empty());
        assert_eq!(functions[2].line_number, 16);
    }

    #[test]
    fn test_multiline_signatures_are_missed() {
        assert!(analyze_functions("def split(\n    a,\n    b,\n):\n    pass\n").is_empty());
    }

    #[test]
    fn test_parse_manifests() {
        assert_eq!(
            parse_requirements("flask==3.0\n\n  requests>=2  \n"),
            vec!["flask==3.0", "requests>=2"]
        );

        let js = parse_package_json(
            r#"{"name": "web", "dependencies": {"react": "^18.0.0"}, "devDependencies": {"vite": "^5"}}"#,
        );
        assert_eq!(js.dependencies["react"], "^18.0.0");
        assert_eq!(js.dev_dependencies["vite"], "^5");

        assert_eq!(parse_package_json("not json"), JsDependencies::default());
        assert!(parse_package_json(r#"{"name": "bare"}"#).dependencies.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_complexity_only_python() {
        let gateway = FakeGateway::new()
            .with_text("pkg/loader.py", SAMPLE)
            .with_text("pkg/empty.py", "")
            .with_text("web/app.js", "function f() { if (x) {} }");

        let report = analyze_complexity(&gateway, "o", "r").await;
        assert_eq!(report.len(), 1);
        let loader = &report["pkg/loader.py"];
        assert_eq!(loader.cyclomatic_complexity, 10);
        assert_eq!(loader.lines_of_code, SAMPLE.lines().count());
        assert_eq!(loader.functions.len(), 3);
    }

    #[tokio::test]
    async fn test_dependencies_from_gateway() {
        let gateway = FakeGateway::new()
            .with_text("requirements.txt", "numpy\npandas\n")
            .with_text("package.json", r#"{"dependencies": {"axios": "1.6.0"}}"#);
        let deps = get_dependencies(&gateway, "o", "r").await;
        assert_eq!(deps.python, vec!["numpy", "pandas"]);
        assert_eq!(deps.javascript.dependencies["axios"], "1.6.0");
        assert!(deps.javascript.dev_dependencies.is_empty());

        let none = get_dependencies(&FakeGateway::new(), "o", "r").await;
        assert_eq!(none, Dependencies::default());
    }

    #[tokio::test]
    async fn test_commit_history_degrades() {
        let mut gateway = FakeGateway::new();
        gateway.commits.push(CommitInfo {
            sha: "abc123".to_string(),
            author: "Ada".to_string(),
            date: None,
            message: "Initial commit".to_string(),
        });
        assert_eq!(commit_history(&gateway, "o", "r").await.len(), 1);
        assert!(commit_history(&FakeGateway::offline(), "o", "r").await.is_empty());
    }
}
