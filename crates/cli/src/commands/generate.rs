//! Generate Command

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use selenese_ats::Formatter;
use selenese_ats_common::TestCase;

use super::write_file;
use crate::output::{print_success, print_warnings};

#[derive(Args)]
pub struct GenerateArgs {
    /// Test case file (YAML or JSON)
    pub input: PathBuf,

    /// Write the script to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn execute(args: GenerateArgs, formatter: &Formatter) -> Result<()> {
    let test_case = TestCase::from_file(&args.input)
        .with_context(|| format!("loading test case {}", args.input.display()))?;
    info!("Generating {} from {}", test_case.display_title(), args.input.display());

    let generated = formatter
        .generate(&test_case)
        .with_context(|| format!("generating {}", args.input.display()))?;
    print_warnings(&generated.warnings);

    match args.output {
        Some(path) => {
            write_file(&path, &generated.text)?;
            print_success(&format!(
                "Wrote {} ({} commands)",
                path.display(),
                test_case.commands.len()
            ));
        }
        None => print!("{}", generated.text),
    }
    Ok(())
}
