//! Selenium call expressions
//!
//! A [`Call`] is one Selenium API invocation with its raw selenese
//! arguments. Translating it yields the Python statement that sends it to
//! the probe port and a one-line rendering for log messages.

use crate::options::{FormatterOptions, TargetPlatform};
use crate::params::{self, Variables};

/// Parameter holding the server root URL
pub const SERVER_URL_PARAMETER: &str = "PX_SELENIUM_SERVER_URL";

/// A Selenium API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub name: String,
    /// Raw selenese arguments, possibly containing parameter references
    pub args: Vec<String>,
}

impl Call {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// Result of translating a [`Call`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translated {
    /// Statement dispatching the call to the probe
    pub send_expr: String,
    /// `name(arg1, arg2)` without quote characters, for logs only
    pub line_repr: String,
}

/// Per-platform replacement for a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rewrite {
    /// Send under another name
    Rename(&'static str),
    /// Send under another name, prefixing a relative URL argument with the
    /// server URL parameter
    Navigate(&'static str),
    /// Replace the command with an inline comment
    Comment(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct RewriteRule {
    pub command: &'static str,
    pub rewrite: Rewrite,
}

const REMOTE_CONTROL_RULES: &[RewriteRule] = &[];

const WEB_DRIVER_RULES: &[RewriteRule] = &[
    RewriteRule {
        command: "open",
        rewrite: Rewrite::Navigate("get"),
    },
    RewriteRule {
        command: "type",
        rewrite: Rewrite::Rename("send_keys"),
    },
    RewriteRule {
        command: "waitForPageToLoad",
        rewrite: Rewrite::Comment("implicitly wait"),
    },
];

/// Rewrite table of a platform
pub fn rewrite_rules(platform: TargetPlatform) -> &'static [RewriteRule] {
    match platform {
        TargetPlatform::RemoteControl => REMOTE_CONTROL_RULES,
        TargetPlatform::WebDriver => WEB_DRIVER_RULES,
    }
}

fn find_rewrite(platform: TargetPlatform, name: &str) -> Option<Rewrite> {
    rewrite_rules(platform)
        .iter()
        .find(|rule| rule.command == name)
        .map(|rule| rule.rewrite)
}

fn is_absolute_url(expr: &str) -> bool {
    let literal = expr.strip_prefix('u').unwrap_or(expr);
    literal.starts_with("\"http://") || literal.starts_with("\"https://")
}

/// Translates calls for one receiver and platform
#[derive(Debug, Clone)]
pub struct Translator {
    receiver: String,
    platform: TargetPlatform,
}

impl Translator {
    pub fn new(options: &FormatterOptions) -> Self {
        Self {
            receiver: options.receiver.clone(),
            platform: options.platform,
        }
    }

    /// Translate a call
    pub fn translate(&self, call: &Call, vars: &Variables) -> Translated {
        let args: Vec<String> = call
            .args
            .iter()
            .map(|arg| params::to_target_string_expression(arg, vars))
            .collect();

        let line_repr = line_repr(&call.name, &args);

        let send_expr = match find_rewrite(self.platform, &call.name) {
            None => self.send(&call.name, &args),
            Some(Rewrite::Rename(name)) => self.send(name, &args),
            Some(Rewrite::Navigate(name)) => {
                let mut args = args;
                if let Some(url) = args.first_mut() {
                    if !is_absolute_url(url) {
                        *url = format!("{} + {}", SERVER_URL_PARAMETER, url);
                    }
                }
                self.send(name, &args)
            }
            Some(Rewrite::Comment(text)) => format!("# {}", text),
        };

        Translated {
            send_expr,
            line_repr,
        }
    }

    fn send(&self, name: &str, args: &[String]) -> String {
        let mut out = String::new();
        if !self.receiver.is_empty() {
            out.push_str(&self.receiver);
            out.push('.');
        }
        out.push_str("send([\"");
        out.push_str(name);
        out.push('"');
        for arg in args {
            out.push_str(", ");
            out.push_str(arg);
        }
        out.push_str("])");
        out
    }
}

/// `verifyText("locator", "pattern")` -> `verifyText(locator, pattern)`
pub fn line_repr(name: &str, translated_args: &[String]) -> String {
    format!("{}({})", name, translated_args.join(", ")).replace(['"', '\''], "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translate(platform: TargetPlatform, name: &str, args: &[&str]) -> Translated {
        let options = FormatterOptions::for_platform(platform);
        let call = Call::new(name, args.iter().map(|a| a.to_string()).collect());
        Translator::new(&options).translate(&call, &Variables::new())
    }

    #[test]
    fn test_default_send() {
        let t = translate(TargetPlatform::RemoteControl, "click", &["id=go"]);
        assert_eq!(t.send_expr, r#"sel.send(["click", "id=go"])"#);
        assert_eq!(t.line_repr, "click(id=go)");
    }

    #[test]
    fn test_no_args() {
        let t = translate(TargetPlatform::RemoteControl, "getTitle", &[]);
        assert_eq!(t.send_expr, r#"sel.send(["getTitle"])"#);
        assert_eq!(t.line_repr, "getTitle()");
    }

    #[test]
    fn test_empty_receiver() {
        let options = FormatterOptions {
            receiver: String::new(),
            ..Default::default()
        };
        let call = Call::new("refresh", vec![]);
        let t = Translator::new(&options).translate(&call, &Variables::new());
        assert_eq!(t.send_expr, r#"send(["refresh"])"#);
    }

    #[test]
    fn test_parameter_argument() {
        let t = translate(TargetPlatform::RemoteControl, "type", &["id=q", "${PX_Q:abc}"]);
        assert_eq!(t.send_expr, r#"sel.send(["type", "id=q", str(PX_Q)])"#);
        assert_eq!(t.line_repr, "type(id=q, str(PX_Q))");
    }

    #[test]
    fn test_remote_control_keeps_names() {
        let t = translate(TargetPlatform::RemoteControl, "open", &["/login"]);
        assert_eq!(t.send_expr, r#"sel.send(["open", "/login"])"#);
    }

    #[test]
    fn test_web_driver_open_relative() {
        let t = translate(TargetPlatform::WebDriver, "open", &["/login"]);
        assert_eq!(
            t.send_expr,
            r#"sel.send(["get", PX_SELENIUM_SERVER_URL + "/login"])"#
        );
        assert_eq!(t.line_repr, "open(/login)");
    }

    #[test]
    fn test_web_driver_open_absolute() {
        let t = translate(TargetPlatform::WebDriver, "open", &["https://example.org/"]);
        assert_eq!(t.send_expr, r#"sel.send(["get", "https://example.org/"])"#);
    }

    #[test]
    fn test_web_driver_type_and_page_load() {
        let t = translate(TargetPlatform::WebDriver, "type", &["id=q", "x"]);
        assert_eq!(t.send_expr, r#"sel.send(["send_keys", "id=q", "x"])"#);

        let t = translate(TargetPlatform::WebDriver, "waitForPageToLoad", &["30000"]);
        assert_eq!(t.send_expr, "# implicitly wait");
    }

    #[test]
    fn test_line_repr_strips_quotes() {
        assert_eq!(
            line_repr("verifyText", &["\"it's\"".to_string(), "\"x\"".to_string()]),
            "verifyText(its, x)"
        );
    }
}
