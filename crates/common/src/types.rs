//! Core types for selenese test cases

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// A single step of a recorded test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    /// A selenese command (action, accessor or assertion)
    Action {
        name: String,
        #[serde(default)]
        target: String,
        #[serde(default)]
        value: String,
    },

    /// A free-text comment
    Comment { text: String },

    /// A line copied verbatim into the generated script
    RawLine { text: String },
}

/// Discriminant of a [`Command`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Action,
    Comment,
    RawLine,
}

impl Command {
    pub fn action(name: impl Into<String>, target: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Action {
            name: name.into(),
            target: target.into(),
            value: value.into(),
        }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self::Comment { text: text.into() }
    }

    pub fn raw_line(text: impl Into<String>) -> Self {
        Self::RawLine { text: text.into() }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Action { .. } => CommandKind::Action,
            Command::Comment { .. } => CommandKind::Comment,
            Command::RawLine { .. } => CommandKind::RawLine,
        }
    }

    /// Command name; `None` for comments and raw lines
    pub fn name(&self) -> Option<&str> {
        match self {
            Command::Action { name, .. } => Some(name),
            _ => None,
        }
    }

    /// One-line human rendering, e.g. `verifyText(id=foo, bar)`
    pub fn to_line(&self) -> String {
        match self {
            Command::Action { name, target, value } => {
                let args: Vec<&str> = [target.as_str(), value.as_str()]
                    .into_iter()
                    .filter(|a| !a.is_empty())
                    .collect();
                format!("{}({})", name, args.join(", "))
            }
            Command::Comment { text } => format!("// {}", text),
            Command::RawLine { text } => text.clone(),
        }
    }
}

/// A recorded test case
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Test case title (used for the generated class name)
    #[serde(default)]
    pub title: String,

    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,

    /// Root address of the system under test
    #[serde(default)]
    pub base_url: String,

    /// Commands in execution order
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl TestCase {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn push(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Title with the IDE's fallback for unnamed test cases
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }

    /// Parse a test case from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    /// Parse a test case from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::from)
    }

    /// Parse a test case file, choosing the format from the extension
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            Some("json") => Self::from_json(&content),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Load all test cases below a directory.
    ///
    /// Every file is loaded on its own: a malformed file or an unreadable
    /// directory entry yields an `Err` for that path only.
    pub fn load_all(dir: &Path) -> Vec<(PathBuf, Result<Self>)> {
        let mut cases = Vec::new();

        for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(dir).to_path_buf();
                    warn!("Cannot read {}: {}", path.display(), e);
                    cases.push((path, Err(Error::from(e))));
                    continue;
                }
            };
            let is_case = entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml" || ext == "json")
                    .unwrap_or(false);
            if !is_case {
                continue;
            }

            debug!("Loading test case {}", entry.path().display());
            let case = Self::from_file(entry.path());
            if let Err(e) = &case {
                warn!("Cannot load {}: {}", entry.path().display(), e);
            }
            cases.push((entry.into_path(), case));
        }

        cases
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_case() {
        let yaml = r##"
title: login
description: Log into the console
base_url: http://localhost:8080
commands:
  - kind: action
    name: open
    target: /login
  - kind: comment
    text: fill the form
  - kind: action
    name: type
    target: id=user
    value: admin
  - kind: raw_line
    text: "# raw"
"##;
        let case = TestCase::from_yaml(yaml).unwrap();
        assert_eq!(case.title, "login");
        assert_eq!(case.commands.len(), 4);
        assert_eq!(case.commands[0], Command::action("open", "/login", ""));
        assert_eq!(case.commands[1].kind(), CommandKind::Comment);
        assert_eq!(case.commands[3], Command::raw_line("# raw"));
    }

    #[test]
    fn test_to_line() {
        assert_eq!(Command::action("click", "id=go", "").to_line(), "click(id=go)");
        assert_eq!(Command::action("type", "id=q", "abc").to_line(), "type(id=q, abc)");
    }

    #[test]
    fn test_display_title_fallback() {
        assert_eq!(TestCase::default().display_title(), "Untitled");
        assert_eq!(TestCase::new("Login").display_title(), "Login");
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.html");
        std::fs::write(&path, "<html/>").unwrap();
        assert!(matches!(TestCase::from_file(&path), Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_load_all_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.yaml"), "title: b\n").unwrap();
        std::fs::write(dir.path().join("a.json"), r#"{"title": "a"}"#).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let cases = TestCase::load_all(dir.path());
        let titles: Vec<&str> = cases
            .iter()
            .map(|(_, c)| c.as_ref().unwrap().title.as_str())
            .collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[test]
    fn test_load_all_keeps_going_after_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.yaml"), "commands: [not, a, command\n").unwrap();
        std::fs::write(dir.path().join("b.yaml"), "title: b\n").unwrap();

        let cases = TestCase::load_all(dir.path());
        assert_eq!(cases.len(), 2);
        assert!(cases[0].0.ends_with("a.yaml"));
        assert!(matches!(cases[0].1, Err(Error::Yaml(_))));
        assert_eq!(cases[1].1.as_ref().unwrap().title, "b");
    }

    #[test]
    fn test_load_all_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let cases = TestCase::load_all(&missing);
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].0, missing);
        assert!(matches!(cases[0].1, Err(Error::Walk(_))));
    }
}
