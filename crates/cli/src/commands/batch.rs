//! Batch Command

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tracing::{debug, error};

use selenese_ats::Formatter;
use selenese_ats_common::TestCase;

use super::write_file;
use crate::output::{print_list, print_warnings, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct BatchArgs {
    /// Directory searched recursively for test case files
    pub input_dir: PathBuf,

    /// Directory receiving the scripts, mirroring the input layout
    #[arg(short, long, default_value = "ats")]
    pub output_dir: PathBuf,

    /// Extension of the generated scripts
    #[arg(long, default_value = "ats")]
    pub extension: String,
}

/// Outcome of one test case
#[derive(Serialize)]
pub struct BatchResult {
    pub input: String,
    pub output: Option<String>,
    pub commands: usize,
    pub warnings: usize,
    pub error: Option<String>,
}

impl TableDisplay for BatchResult {
    fn headers() -> Vec<&'static str> {
        vec!["Test Case", "Script", "Commands", "Warnings", "Status"]
    }

    fn row(&self) -> Vec<String> {
        let status = match &self.error {
            None => "✓ ok".green().to_string(),
            Some(e) => format!("{} {}", "✗".red(), e),
        };
        vec![
            self.input.clone(),
            self.output.clone().unwrap_or_default(),
            self.commands.to_string(),
            self.warnings.to_string(),
            status,
        ]
    }
}

fn script_path(args: &BatchArgs, input: &Path) -> PathBuf {
    let relative = input.strip_prefix(&args.input_dir).unwrap_or(input);
    args.output_dir.join(relative).with_extension(&args.extension)
}

fn convert(
    args: &BatchArgs,
    formatter: &Formatter,
    input: &Path,
    loaded: &selenese_ats_common::Result<TestCase>,
) -> BatchResult {
    let mut result = BatchResult {
        input: input.display().to_string(),
        output: None,
        commands: 0,
        warnings: 0,
        error: None,
    };

    let test_case = match loaded {
        Ok(test_case) => test_case,
        Err(e) => {
            result.error = Some(e.to_string());
            return result;
        }
    };
    result.commands = test_case.commands.len();

    let generated = match formatter.generate(test_case) {
        Ok(generated) => generated,
        Err(e) => {
            error!("{}: {}", input.display(), e);
            result.error = Some(e.to_string());
            return result;
        }
    };
    print_warnings(&generated.warnings);
    result.warnings = generated.warnings.len();

    let output = script_path(args, input);
    match write_file(&output, &generated.text) {
        Ok(()) => {
            debug!("Wrote {}", output.display());
            result.output = Some(output.display().to_string());
        }
        Err(e) => result.error = Some(format!("{:#}", e)),
    }
    result
}

pub fn execute(args: BatchArgs, formatter: &Formatter, format: OutputFormat) -> Result<()> {
    let cases = TestCase::load_all(&args.input_dir);
    debug!("Found {} test cases below {}", cases.len(), args.input_dir.display());

    let results: Vec<BatchResult> = cases
        .iter()
        .map(|(path, loaded)| convert(&args, formatter, path, loaded))
        .collect();
    print_list(&results, format);

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    if failed > 0 {
        bail!("{} of {} test cases failed", failed, results.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use selenese_ats::FormatterOptions;
    use selenese_ats_common::Command;

    #[test]
    fn test_batch_mirrors_layout() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::create_dir(input.path().join("auth")).unwrap();
        let case = TestCase::new("login")
            .with_base_url("http://sut/")
            .push(Command::action("open", "/login", ""));
        std::fs::write(input.path().join("auth/login.yaml"), case.to_yaml().unwrap()).unwrap();

        let args = BatchArgs {
            input_dir: input.path().to_path_buf(),
            output_dir: output.path().to_path_buf(),
            extension: "ats".to_string(),
        };
        execute(args, &Formatter::new(FormatterOptions::default()), OutputFormat::Plain).unwrap();

        let script = std::fs::read_to_string(output.path().join("auth/login.ats")).unwrap();
        assert!(script.contains("class TC_LOGIN(TestCase):"));
    }

    #[test]
    fn test_batch_reports_failures() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let case = TestCase::new("bad").push(Command::action("no such", "", ""));
        std::fs::write(input.path().join("bad.yaml"), case.to_yaml().unwrap()).unwrap();

        let args = BatchArgs {
            input_dir: input.path().to_path_buf(),
            output_dir: output.path().to_path_buf(),
            extension: "ats".to_string(),
        };
        let err = execute(args, &Formatter::default(), OutputFormat::Plain).unwrap_err();
        assert!(err.to_string().contains("1 of 1"));
    }

    #[test]
    fn test_batch_converts_around_malformed_file() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("a_broken.yaml"), "commands: {").unwrap();
        let case = TestCase::new("fine").push(Command::action("open", "/", ""));
        std::fs::write(input.path().join("b_fine.yaml"), case.to_yaml().unwrap()).unwrap();

        let args = BatchArgs {
            input_dir: input.path().to_path_buf(),
            output_dir: output.path().to_path_buf(),
            extension: "ats".to_string(),
        };
        let err = execute(args, &Formatter::default(), OutputFormat::Plain).unwrap_err();
        assert!(err.to_string().contains("1 of 2"));
        assert!(output.path().join("b_fine.ats").exists());
    }
}
