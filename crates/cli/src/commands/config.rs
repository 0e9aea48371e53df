//! Init-Config Command

use std::path::Path;

use anyhow::{bail, Result};
use clap::Args;

use selenese_ats::{FormatterOptions, TargetPlatform};

use crate::output::print_success;

#[derive(Args)]
pub struct InitConfigArgs {
    /// Overwrite an existing options file
    #[arg(long)]
    pub force: bool,
}

pub fn execute(args: InitConfigArgs, path: &Path, platform: TargetPlatform) -> Result<()> {
    if path.exists() && !args.force {
        bail!("{} already exists, use --force to overwrite it", path.display());
    }
    FormatterOptions::for_platform(platform).save(path)?;
    print_success(&format!("Wrote default {} options to {}", platform.as_str(), path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selenese-ats.toml");

        execute(InitConfigArgs { force: false }, &path, TargetPlatform::WebDriver).unwrap();
        let options = FormatterOptions::load(&path).unwrap();
        assert_eq!(options.platform, TargetPlatform::WebDriver);

        assert!(execute(InitConfigArgs { force: false }, &path, TargetPlatform::RemoteControl).is_err());
        execute(InitConfigArgs { force: true }, &path, TargetPlatform::RemoteControl).unwrap();
        assert_eq!(
            FormatterOptions::load(&path).unwrap().platform,
            TargetPlatform::RemoteControl
        );
    }
}
