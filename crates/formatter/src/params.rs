//! External (`PX_*`) parameters and argument literals
//!
//! Command arguments may embed parameter references using the syntax
//! `[regexp:]${PX_NAME[:default]}`. Testerman resolves such parameters at run
//! time from the metadata block, so the formatter has to
//!
//! - declare them in the metadata block (*dynamic* parameters, discovered by
//!   scanning the commands, and *static* parameters, configured once in the
//!   options),
//! - turn every argument into a Python expression that substitutes the
//!   runtime value of the parameter.
//!
//! References to variables assigned by earlier `store*` commands (`${myVar}`)
//! are substituted the same way.

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use selenese_ats_common::Command;

/// What a Testerman parameter name looks like
pub const PX_NAME_PATTERN: &str = "PX_[_A-Z0-9]+";

static PX_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{}$", PX_NAME_PATTERN)).expect("valid regex"));

static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}:]+)(?::([^}]*))?\}").expect("valid regex"));

static PX_WITH_DEFAULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^({})(:.*)?$", PX_NAME_PATTERN)).expect("valid regex"));

static FLAGGED_PX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^\$\{{({})(:.*)?\}}$", PX_NAME_PATTERN)).expect("valid regex")
});

static STATIC_RECORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^({}):(.+?):(.+)$", PX_NAME_PATTERN)).expect("valid regex")
});

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+$").expect("valid regex"));

/// Names assigned by `store*` commands so far
pub type Variables = HashSet<String>;

/// Declared type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Integer,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(ParamType::String),
            "integer" => Some(ParamType::Integer),
            _ => None,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter declaration comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Always emitted by the formatter
    Base,
    /// Configured in the options
    Static,
    /// Discovered in a command argument
    Dynamic,
}

/// A parameter resolved by Testerman at run time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalParameter {
    pub name: String,
    pub param_type: ParamType,
    pub default: String,
    pub provenance: Provenance,
}

impl ExternalParameter {
    /// Metadata block line declaring this parameter
    pub fn metadata_line(&self) -> String {
        format!(
            "# <parameter name=\"{}\" default=\"{}\" type=\"{}\"><![CDATA[]]></parameter>",
            self.name,
            xml_escape(&self.default),
            self.param_type
        )
    }
}

/// Escape text for a metadata attribute or element
pub fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}

/// Inverse of [`xml_escape`]
pub fn xml_unescape(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&amp;", "&")
}

/// A piece of an argument: literal text or a substituted reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Reference { name: &'a str, default: Option<&'a str> },
}

/// `PX_MY_PARA` -> true, `myvar` -> false
pub fn is_parameter_name(name: &str) -> bool {
    PX_NAME.is_match(name)
}

/// Split an argument into literal and reference segments.
///
/// `${NAME[:default]}` is a reference when NAME is a parameter name, or when
/// it is a stored variable and no default is given. Anything else stays
/// literal.
pub fn segments<'a>(text: &'a str, vars: &Variables) -> Vec<Segment<'a>> {
    let mut out = Vec::new();
    let mut last = 0;

    for caps in REFERENCE.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let name = name.as_str();
        let default = caps.get(2).map(|m| m.as_str());

        let recognized = is_parameter_name(name) || (default.is_none() && vars.contains(name));
        if !recognized {
            continue;
        }

        if whole.start() > last {
            out.push(Segment::Literal(&text[last..whole.start()]));
        }
        out.push(Segment::Reference {
            name,
            default: default.filter(|d| !d.is_empty()),
        });
        last = whole.end();
    }

    if last < text.len() {
        out.push(Segment::Literal(&text[last..]));
    }
    out
}

fn parameter_references(text: &str) -> impl Iterator<Item = (&str, Option<&str>)> {
    REFERENCE.captures_iter(text).filter_map(|caps| {
        let name = caps.get(1)?.as_str();
        if !is_parameter_name(name) {
            return None;
        }
        let default = caps.get(2).map(|m| m.as_str()).filter(|d| !d.is_empty());
        Some((name, default))
    })
}

/// Name of the first parameter referenced in `text`
pub fn extract_name(text: &str) -> Option<String> {
    parameter_references(text).next().map(|(name, _)| name.to_string())
}

/// Literal default of the first parameter referenced in `text`; `None` for a
/// bare reference
pub fn extract_default(text: &str) -> Option<String> {
    parameter_references(text)
        .next()
        .and_then(|(_, default)| default.map(str::to_string))
}

/// `integer` iff the whole value is a base-10 numeral
pub fn infer_type(value: &str) -> ParamType {
    if INTEGER.is_match(value) {
        ParamType::Integer
    } else {
        ParamType::String
    }
}

/// Collapse `${PX_A:1}`, `${PX_A}`, `PX_A:1` down to `PX_A`. Other text is
/// returned as is.
pub fn strip_to_name(text: &str) -> String {
    if let Some(caps) = FLAGGED_PX.captures(text) {
        return caps[1].to_string();
    }
    if let Some(caps) = PX_WITH_DEFAULT.captures(text) {
        return caps[1].to_string();
    }
    text.to_string()
}

/// Quote a literal as a Python string
pub fn quote_literal(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\r', "\\r")
        .replace('\n', "\\n");
    let unicode = value.chars().any(|c| c as u32 >= 128);
    format!("{}\"{}\"", if unicode { "u" } else { "" }, escaped)
}

/// Python expression converting a variable to a string
pub fn stringify(name: &str) -> String {
    format!("str({})", name)
}

/// Turn an argument into a Python string expression.
///
/// - `${PX_A:42}` -> `str(PX_A)`
/// - `id=${PX_A}_x` -> `"id=" + str(PX_A) + "_x"`
/// - `plain` -> `"plain"`
pub fn to_target_string_expression(text: &str, vars: &Variables) -> String {
    let segs = segments(text, vars);
    if !segs.iter().any(|s| matches!(s, Segment::Reference { .. })) {
        return quote_literal(text);
    }

    segs.iter()
        .map(|seg| match seg {
            Segment::Literal(lit) => quote_literal(lit),
            Segment::Reference { name, .. } => stringify(name),
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

fn escape_for_log(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\r', "\\r")
        .replace('\n', "\\n")
}

/// Render an argument for use inside a single-quoted `log('...')` message.
///
/// - `abc` -> `"abc"`
/// - `x${PX_A}` -> `"x' + str(PX_A) + '" [using PX_A]`
pub fn log_fragment(text: &str, vars: &Variables) -> String {
    let segs = segments(text, vars);
    let mut body = String::new();
    let mut used: Option<&str> = None;

    for seg in &segs {
        match seg {
            Segment::Literal(lit) => body.push_str(&escape_for_log(lit)),
            Segment::Reference { name, .. } => {
                body.push_str(&format!("' + {} + '", stringify(name)));
                if used.is_none() && is_parameter_name(name) {
                    used = Some(name);
                }
            }
        }
    }

    match used {
        Some(name) => format!("\"{}\" [using {}]", body, name),
        None => format!("\"{}\"", body),
    }
}

/// Testerman `pattern()` template for a regular expression argument.
///
/// Literal segments are kept raw; references are resolved before wrapping.
/// When no raw-string delimiter can hold the literals, the pattern falls back
/// to a plain quoted string.
pub fn regex_template(text: &str, vars: &Variables) -> String {
    let segs = segments(text, vars);
    let literals = || {
        segs.iter().filter_map(|s| match s {
            Segment::Literal(lit) => Some(*lit),
            _ => None,
        })
    };

    let quote = if !literals().any(|l| l.contains('"')) {
        '"'
    } else if !literals().any(|l| l.contains('\'')) {
        '\''
    } else {
        debug!("Pattern {:?} contains both quote characters, not using a regexp", text);
        return quote_literal(text);
    };

    let mut parts: Vec<String> = segs
        .iter()
        .map(|seg| match seg {
            Segment::Literal(lit) => format!("r{q}{}{q}", lit, q = quote),
            Segment::Reference { name, .. } => stringify(name),
        })
        .collect();

    match segs.first() {
        None => parts.push(format!("r{q}{q}", q = quote)),
        Some(Segment::Reference { .. }) => parts.insert(0, format!("r{q}{q}", q = quote)),
        _ => {}
    }

    format!("pattern({})", parts.join(" + "))
}

/// Parse the static parameter block of the options.
///
/// One `PX_NAME:type:default` record per line; lines that do not match are
/// skipped.
pub fn parse_static_parameters(block: &str) -> Vec<ExternalParameter> {
    block
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let caps = STATIC_RECORD.captures(line);
            let parsed = caps.and_then(|caps| {
                let param_type = ParamType::parse(&caps[2])?;
                Some(ExternalParameter {
                    name: caps[1].to_string(),
                    param_type,
                    default: caps[3].to_string(),
                    provenance: Provenance::Static,
                })
            });
            if parsed.is_none() {
                debug!("Skipping malformed static parameter line {:?}", line);
            }
            parsed
        })
        .collect()
}

/// Collect the parameters declared with a default inside command arguments.
///
/// Only the first occurrence carrying a default declares a parameter; names
/// in `declared` (base and static parameters) are never re-declared.
pub fn scan_dynamic_parameters(
    commands: &[Command],
    declared: &HashSet<String>,
) -> Vec<ExternalParameter> {
    let mut seen: HashSet<String> = declared.clone();
    let mut out = Vec::new();

    for command in commands {
        let Command::Action { target, value, .. } = command else {
            continue;
        };
        for arg in [target, value] {
            for (name, default) in parameter_references(arg) {
                let Some(default) = default else { continue };
                if seen.contains(name) {
                    continue;
                }
                seen.insert(name.to_string());
                out.push(ExternalParameter {
                    name: name.to_string(),
                    param_type: infer_type(default),
                    default: default.to_string(),
                    provenance: Provenance::Dynamic,
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn no_vars() -> Variables {
        Variables::new()
    }

    #[test_case("42", ParamType::Integer ; "integer")]
    #[test_case("-7", ParamType::Integer ; "negative integer")]
    #[test_case("abc", ParamType::String ; "word")]
    #[test_case("4.2", ParamType::String ; "decimal")]
    #[test_case("", ParamType::String ; "empty")]
    fn test_infer_type(value: &str, expected: ParamType) {
        assert_eq!(infer_type(value), expected);
    }

    #[test]
    fn test_extract_name_and_default() {
        assert_eq!(extract_name("${PX_FOO:1}").as_deref(), Some("PX_FOO"));
        assert_eq!(extract_default("${PX_FOO:1}").as_deref(), Some("1"));
        assert_eq!(extract_name("regexp:${PX_FOO}").as_deref(), Some("PX_FOO"));
        assert_eq!(extract_default("${PX_FOO}"), None);
        assert_eq!(extract_default("${PX_FOO:}"), None);
        assert_eq!(extract_default("${PX_URL:42:http://host/}").as_deref(), Some("42:http://host/"));
        assert_eq!(extract_name("${px_lower:1}"), None);
        assert_eq!(extract_name("no reference"), None);
    }

    #[test_case("${PX_A:42}", "PX_A")]
    #[test_case("${PX_A}", "PX_A")]
    #[test_case("PX_A:42", "PX_A")]
    #[test_case("PX_A", "PX_A")]
    #[test_case("myVar", "myVar")]
    fn test_strip_to_name(input: &str, expected: &str) {
        assert_eq!(strip_to_name(input), expected);
    }

    #[test]
    fn test_string_expression_pure_reference() {
        assert_eq!(to_target_string_expression("${PX_A:42}", &no_vars()), "str(PX_A)");
    }

    #[test]
    fn test_string_expression_mixture() {
        assert_eq!(
            to_target_string_expression("id=${PX_A}_x", &no_vars()),
            "\"id=\" + str(PX_A) + \"_x\""
        );
        assert_eq!(
            to_target_string_expression("${PX_A}-${PX_B:2}", &no_vars()),
            "str(PX_A) + \"-\" + str(PX_B)"
        );
    }

    #[test]
    fn test_string_expression_literal_escaping() {
        assert_eq!(to_target_string_expression("a\"b\\c", &no_vars()), r#""a\"b\\c""#);
        assert_eq!(to_target_string_expression("l1\r\nl2", &no_vars()), r#""l1\r\nl2""#);
        assert_eq!(to_target_string_expression("café", &no_vars()), "u\"café\"");
    }

    #[test]
    fn test_unmatched_reference_is_literal() {
        assert_eq!(to_target_string_expression("${lower}", &no_vars()), "\"${lower}\"");
    }

    #[test]
    fn test_stored_variable_reference() {
        let mut vars = Variables::new();
        vars.insert("total".to_string());
        assert_eq!(
            to_target_string_expression("sum: ${total}", &vars),
            "\"sum: \" + str(total)"
        );
        // defaults are only meaningful for parameters
        assert_eq!(to_target_string_expression("${total:1}", &vars), "\"${total:1}\"");
    }

    #[test]
    fn test_log_fragment() {
        assert_eq!(log_fragment("abc", &no_vars()), "\"abc\"");
        assert_eq!(log_fragment("it's", &no_vars()), "\"it\\'s\"");
        assert_eq!(
            log_fragment("x${PX_A:1}", &no_vars()),
            "\"x' + str(PX_A) + '\" [using PX_A]"
        );
    }

    #[test]
    fn test_regex_template() {
        assert_eq!(regex_template("ab.*", &no_vars()), "pattern(r\"ab.*\")");
        assert_eq!(
            regex_template("a${PX_A}b", &no_vars()),
            "pattern(r\"a\" + str(PX_A) + r\"b\")"
        );
        assert_eq!(regex_template("${PX_A}", &no_vars()), "pattern(r\"\" + str(PX_A))");
        assert_eq!(regex_template("say \"hi\"", &no_vars()), "pattern(r'say \"hi\"')");
        assert_eq!(regex_template("\"'", &no_vars()), r#""\"'""#);
    }

    #[test]
    fn test_parse_static_parameters_skips_malformed() {
        let params = parse_static_parameters(
            "PX_MY_PARAM:integer:42\ngarbage\nPX_URL:string:http://x:8080/\nPX_BAD:float:1\r\n\n",
        );
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "PX_MY_PARAM");
        assert_eq!(params[0].param_type, ParamType::Integer);
        assert_eq!(params[1].default, "http://x:8080/");
        assert!(params.iter().all(|p| p.provenance == Provenance::Static));
    }

    #[test]
    fn test_scan_dynamic_parameters_dedup() {
        let commands = vec![
            Command::action("type", "id=a", "${PX_FOO:1}"),
            Command::action("type", "id=b", "${PX_FOO}"),
            Command::action("type", "id=c", "${PX_FOO:2}"),
            Command::action("open", "${PX_PATH:/home}", ""),
            Command::comment("${PX_IGNORED:1}"),
        ];
        let params = scan_dynamic_parameters(&commands, &HashSet::new());
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "PX_FOO");
        assert_eq!(params[0].default, "1");
        assert_eq!(params[0].param_type, ParamType::Integer);
        assert_eq!(params[1].name, "PX_PATH");
        assert_eq!(params[1].param_type, ParamType::String);
    }

    #[test]
    fn test_scan_skips_already_declared() {
        let commands = vec![Command::action("type", "id=a", "${PX_SELENIUM_RC_PORT:1}")];
        let declared: HashSet<String> = ["PX_SELENIUM_RC_PORT".to_string()].into();
        assert!(scan_dynamic_parameters(&commands, &declared).is_empty());
    }

    #[test]
    fn test_metadata_line_escapes_default() {
        let p = ExternalParameter {
            name: "PX_GREETING".to_string(),
            param_type: ParamType::String,
            default: "say \"hi\" & <wave>".to_string(),
            provenance: Provenance::Dynamic,
        };
        assert_eq!(
            p.metadata_line(),
            "# <parameter name=\"PX_GREETING\" default=\"say &quot;hi&quot; &amp; &lt;wave>\" type=\"string\"><![CDATA[]]></parameter>"
        );
    }

    #[test_case("plain" ; "plain")]
    #[test_case("a=\"1\" & b<2" ; "every special character")]
    #[test_case("&quot;" ; "already escaped text")]
    fn test_xml_escape_is_reversible(text: &str) {
        assert_eq!(xml_unescape(&xml_escape(text)), text);
    }

    #[test]
    fn test_metadata_line() {
        let p = ExternalParameter {
            name: "PX_FOO".to_string(),
            param_type: ParamType::Integer,
            default: "1".to_string(),
            provenance: Provenance::Dynamic,
        };
        assert_eq!(
            p.metadata_line(),
            "# <parameter name=\"PX_FOO\" default=\"1\" type=\"integer\"><![CDATA[]]></parameter>"
        );
    }
}
