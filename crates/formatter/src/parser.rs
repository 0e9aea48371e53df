//! Reverse parser
//!
//! Recovers a test case from a generated script. Only the command echo, the
//! description line and the server URL parameter are read; everything else
//! in the script is ignored.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use selenese_ats_common::{Command, TestCase};

use crate::assembler::{Formatter, COMMENT_MARKER, LINE_MARKER};
use crate::params::xml_unescape;
use crate::warning::Warning;

static ECHO_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#selenese:(.*?)\|(.*)\|(.*)").expect("valid regex"));

static DESCRIPTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"# <description>(.*?):\s(.*)</description>").expect("valid regex"));

static BASE_URL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"# <parameter name="PX_SELENIUM_SERVER_URL" default="(.*)" type="string"><!\[CDATA\[\]\]></parameter>"#,
    )
    .expect("valid regex")
});

/// Result of parsing a script
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    pub test_case: TestCase,
    pub warnings: Vec<Warning>,
}

impl Formatter {
    /// Parse a generated script back into a test case.
    ///
    /// Never fails: a script that does not look generated yields an empty
    /// test case and a [`Warning::NoCommandsFound`].
    pub fn parse(&self, text: &str) -> ParseOutcome {
        let mut test_case = TestCase::default();

        for line in text.lines() {
            if let Some(caps) = ECHO_LINE.captures(line) {
                let op = caps[1].trim();
                let target = caps[2].trim();
                let value = caps[3].trim();
                let command = match op {
                    COMMENT_MARKER => Command::comment(target),
                    LINE_MARKER => Command::raw_line(target),
                    _ => Command::action(op, target, value),
                };
                test_case.commands.push(command);
            }
            if let Some(caps) = DESCRIPTION_LINE.captures(line) {
                test_case.title = xml_unescape(&caps[1]);
                test_case.description = Some(xml_unescape(&caps[2]));
            }
            if let Some(caps) = BASE_URL_LINE.captures(line) {
                test_case.base_url = xml_unescape(&caps[1]);
            }
            if let Some(hook) = &self.hooks().on_parsed_line {
                hook(&mut test_case, line);
            }
        }

        debug!(
            "Parsed {} commands from {} lines",
            test_case.commands.len(),
            text.lines().count()
        );

        let warnings = self.self_check(&test_case, text);
        for warning in &warnings {
            warn!("{}", warning);
        }

        ParseOutcome {
            test_case,
            warnings,
        }
    }

    fn self_check(&self, test_case: &TestCase, original: &str) -> Vec<Warning> {
        if test_case.commands.is_empty() {
            return vec![Warning::NoCommandsFound];
        }

        let mut warnings = Vec::new();
        if test_case.base_url.is_empty() {
            warnings.push(Warning::UnresolvedBaseUrl);
        }
        match self.generate(test_case) {
            Ok(regenerated) => {
                let original_len = original.chars().count();
                let regenerated_len = regenerated.text.chars().count();
                if original_len != regenerated_len {
                    warnings.push(Warning::RoundTripMismatch {
                        original_len,
                        regenerated_len,
                    });
                }
            }
            Err(e) => warnings.push(Warning::RegenerationFailed {
                reason: e.to_string(),
            }),
        }
        warnings
    }
}
