//! Parse Command

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use selenese_ats::Formatter;
use selenese_ats_common::{Command, CommandKind};

use super::write_file;
use crate::output::{print_list, print_success, print_warnings, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct ParseArgs {
    /// Generated ATS script
    pub input: PathBuf,

    /// Save the recovered test case; JSON for a `.json` file, YAML otherwise
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// One recovered command
#[derive(Serialize)]
pub struct CommandDisplay {
    pub index: usize,
    pub kind: CommandKind,
    pub command: String,
    pub target: String,
    pub value: String,
}

impl CommandDisplay {
    fn new(index: usize, command: &Command) -> Self {
        let (name, target, value) = match command {
            Command::Action { name, target, value } => (name.clone(), target.clone(), value.clone()),
            Command::Comment { text } | Command::RawLine { text } => {
                (String::new(), text.clone(), String::new())
            }
        };
        Self {
            index: index + 1,
            kind: command.kind(),
            command: name,
            target,
            value,
        }
    }
}

impl TableDisplay for CommandDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["#", "Kind", "Command", "Target", "Value"]
    }

    fn row(&self) -> Vec<String> {
        let kind = match self.kind {
            CommandKind::Action => "action",
            CommandKind::Comment => "comment",
            CommandKind::RawLine => "line",
        };
        vec![
            self.index.to_string(),
            kind.to_string(),
            self.command.clone(),
            self.target.clone(),
            self.value.clone(),
        ]
    }
}

pub fn execute(args: ParseArgs, formatter: &Formatter, format: OutputFormat) -> Result<()> {
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let outcome = formatter.parse(&text);
    print_warnings(&outcome.warnings);

    if let Some(path) = args.output {
        let content = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::to_string_pretty(&outcome.test_case)?,
            _ => outcome.test_case.to_yaml()?,
        };
        write_file(&path, &content)?;
        print_success(&format!(
            "Recovered {} commands into {}",
            outcome.test_case.commands.len(),
            path.display()
        ));
        return Ok(());
    }

    let rows: Vec<CommandDisplay> = outcome
        .test_case
        .commands
        .iter()
        .enumerate()
        .map(|(i, c)| CommandDisplay::new(i, c))
        .collect();
    print_list(&rows, format);
    Ok(())
}
