//! Formatter configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FormatError, FormatResult};

/// Backend flavour of the generated script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPlatform {
    /// Selenium Remote Control probe
    #[default]
    RemoteControl,
    /// Selenium WebDriver probe
    WebDriver,
}

impl TargetPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetPlatform::RemoteControl => "remote_control",
            TargetPlatform::WebDriver => "web_driver",
        }
    }
}

/// Options used during header, body and footer generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterOptions {
    /// Port variable the commands are sent through
    pub receiver: String,

    /// Selenium RC host
    pub rc_host: String,

    /// Selenium RC port
    pub rc_port: String,

    /// Browser identifier
    pub environment: String,

    /// Super class of the generated test case class
    pub super_class: String,

    /// Indentation unit: `tab` or a number of spaces
    pub indent: String,

    /// Indentation depth of the generated commands
    pub initial_indents: usize,

    /// Test system interface port name
    pub tsi_port: String,

    /// Probe type used in the adapter binding
    pub probe_type: String,

    /// Probe URI used in the adapter binding
    pub probe_uri: String,

    /// Static parameters, one `PX_NAME:type:default` record per line
    pub static_parameters: String,

    /// Dump the command echo; without it the script cannot be parsed back
    pub show_selenese: bool,

    /// Backend flavour
    pub platform: TargetPlatform,

    /// Seconds a `waitFor*` command polls before failing
    pub wait_for_seconds: u64,

    /// Timeout passed to the page load wait of `*AndWait` commands
    pub page_load_timeout: String,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        Self {
            receiver: "sel".to_string(),
            rc_host: "localhost".to_string(),
            rc_port: "4444".to_string(),
            environment: "firefox".to_string(),
            super_class: "TestCase".to_string(),
            indent: "tab".to_string(),
            initial_indents: 2,
            tsi_port: "selenium_rc".to_string(),
            probe_type: "selenium".to_string(),
            probe_uri: "probe:selenium".to_string(),
            static_parameters: String::new(),
            show_selenese: true,
            platform: TargetPlatform::RemoteControl,
            wait_for_seconds: 60,
            page_load_timeout: "30000".to_string(),
        }
    }
}

impl FormatterOptions {
    /// Defaults for the given platform
    pub fn for_platform(platform: TargetPlatform) -> Self {
        Self::default().with_platform(platform)
    }

    /// Switch platform, updating the probe settings that depend on it
    pub fn with_platform(mut self, platform: TargetPlatform) -> Self {
        self.platform = platform;
        match platform {
            TargetPlatform::RemoteControl => {
                self.tsi_port = "selenium_rc".to_string();
                self.probe_type = "selenium".to_string();
                self.probe_uri = "probe:selenium".to_string();
            }
            TargetPlatform::WebDriver => {
                self.tsi_port = "selenium_wd".to_string();
                self.probe_type = "selenium.webdriver".to_string();
                self.probe_uri = "probe:selenium.webdriver".to_string();
            }
        }
        self
    }

    /// Append a static parameter record
    pub fn add_static_parameter(&mut self, name: &str, kind: &str, default: &str) {
        if !self.static_parameters.is_empty() && !self.static_parameters.ends_with('\n') {
            self.static_parameters.push('\n');
        }
        self.static_parameters
            .push_str(&format!("{}:{}:{}\n", name, kind, default));
    }

    /// One indentation unit
    pub fn indent_unit(&self) -> FormatResult<String> {
        if self.indent == "tab" {
            return Ok("\t".to_string());
        }
        self.indent
            .trim()
            .parse::<usize>()
            .map(|n| " ".repeat(n))
            .map_err(|_| {
                FormatError::InvalidOptions(format!(
                    "indent must be 'tab' or a number of spaces, got '{}'",
                    self.indent
                ))
            })
    }

    /// Check the options before a generation pass
    pub fn validate(&self) -> FormatResult<()> {
        self.indent_unit()?;
        if self.wait_for_seconds == 0 {
            return Err(FormatError::InvalidOptions(
                "wait_for_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load options from a TOML file, falling back to defaults when absent
    pub fn load(path: &Path) -> FormatResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let options: Self = toml::from_str(&content)?;
            Ok(options)
        } else {
            Ok(Self::default())
        }
    }

    /// Save options to a TOML file
    pub fn save(&self, path: &Path) -> FormatResult<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webdriver_overrides_probe() {
        let options = FormatterOptions::for_platform(TargetPlatform::WebDriver);
        assert_eq!(options.tsi_port, "selenium_wd");
        assert_eq!(options.probe_type, "selenium.webdriver");
        assert_eq!(options.probe_uri, "probe:selenium.webdriver");
        assert_eq!(options.receiver, "sel");
    }

    #[test]
    fn test_indent_unit() {
        let mut options = FormatterOptions::default();
        assert_eq!(options.indent_unit().unwrap(), "\t");
        options.indent = "4".to_string();
        assert_eq!(options.indent_unit().unwrap(), "    ");
        options.indent = "wide".to_string();
        assert!(matches!(options.indent_unit(), Err(FormatError::InvalidOptions(_))));
    }

    #[test]
    fn test_add_static_parameter() {
        let mut options = FormatterOptions::default();
        options.add_static_parameter("PX_A", "integer", "1");
        options.add_static_parameter("PX_B", "string", "x");
        assert_eq!(options.static_parameters, "PX_A:integer:1\nPX_B:string:x\n");
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let options = FormatterOptions::load(&dir.path().join("none.toml")).unwrap();
        assert_eq!(options, FormatterOptions::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf/options.toml");
        let mut options = FormatterOptions::for_platform(TargetPlatform::WebDriver);
        options.wait_for_seconds = 15;
        options.save(&path).unwrap();

        let loaded = FormatterOptions::load(&path).unwrap();
        assert_eq!(loaded, options);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let options: FormatterOptions = toml::from_str("receiver = \"browser\"\n").unwrap();
        assert_eq!(options.receiver, "browser");
        assert_eq!(options.rc_port, "4444");
        assert!(options.show_selenese);
    }
}
