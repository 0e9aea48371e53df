//! Check Command
//!
//! Dry run of a generation: lists the parameters the script will declare and
//! reports warnings without writing anything.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use selenese_ats::{catalog, ExternalParameter, Formatter, Provenance};
use selenese_ats_common::TestCase;

use crate::output::{print_list, print_success, print_warnings, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct CheckArgs {
    /// Test case file (YAML or JSON)
    pub input: PathBuf,
}

#[derive(Serialize)]
pub struct ParameterDisplay {
    pub name: String,
    pub param_type: String,
    pub default: String,
    pub provenance: Provenance,
}

impl From<ExternalParameter> for ParameterDisplay {
    fn from(p: ExternalParameter) -> Self {
        Self {
            name: p.name,
            param_type: p.param_type.to_string(),
            default: p.default,
            provenance: p.provenance,
        }
    }
}

impl TableDisplay for ParameterDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "Type", "Default", "Source"]
    }

    fn row(&self) -> Vec<String> {
        let source = match self.provenance {
            Provenance::Base => "base",
            Provenance::Static => "static",
            Provenance::Dynamic => "dynamic",
        };
        vec![
            self.name.clone(),
            self.param_type.clone(),
            self.default.clone(),
            source.to_string(),
        ]
    }
}

pub fn execute(args: CheckArgs, formatter: &Formatter, format: OutputFormat) -> Result<()> {
    let test_case = TestCase::from_file(&args.input)
        .with_context(|| format!("loading test case {}", args.input.display()))?;
    let generated = formatter
        .generate(&test_case)
        .with_context(|| format!("generating {}", args.input.display()))?;

    let parameters: Vec<ParameterDisplay> = formatter
        .parameters(&test_case)
        .into_iter()
        .map(ParameterDisplay::from)
        .collect();
    print_list(&parameters, format);
    print_warnings(&generated.warnings);

    let checks = test_case
        .commands
        .iter()
        .filter_map(|c| c.name())
        .filter(|name| catalog::is_check(name))
        .count();
    print_success(&format!(
        "{}: {} commands, {} checks, {} warnings",
        test_case.display_title(),
        test_case.commands.len(),
        checks,
        generated.warnings.len()
    ));
    Ok(())
}
