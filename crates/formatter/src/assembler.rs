//! Document assembly
//!
//! [`Formatter::generate`] turns a [`TestCase`] into a complete ATS script:
//!
//! ```text
//! # __METADATA__BEGIN__          metadata block (description, parameters)
//! # __METADATA__END__
//! #selenese: open | / |          command echo, read back by the parser
//! class TC_LOGIN(TestCase):      test case class
//!     def body(self):
//!         port_map(...)
//!         <translated commands>
//!         port_unmap(...)
//! bind(...)                      adapter configuration
//! verdict = TC_LOGIN().execute() control part
//! ```

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use selenese_ats_common::{Command, TestCase};

use crate::catalog::{self, Definition, ReturnShape, Role};
use crate::context::GenerationContext;
use crate::error::{FormatError, FormatResult};
use crate::expression::{Call, Translated, Translator, SERVER_URL_PARAMETER};
use crate::hooks::Hooks;
use crate::options::FormatterOptions;
use crate::params::{self, ExternalParameter, ParamType, Provenance, Segment, Variables};
use crate::verify::{self, BranchConfig, Check, CheckSubject, MatchTemplate, SLEEP_SECONDS};
use crate::warning::Warning;

/// Marker of a command echo line
pub const ECHO_PREFIX: &str = "#selenese:";

/// Echo marker of comment commands
pub const COMMENT_MARKER: &str = "comment";

/// Echo marker of raw line commands
pub const LINE_MARKER: &str = "line";

/// Description used when the test case has none
pub const DEFAULT_DESCRIPTION: &str = "This is the description";

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").expect("valid regex"));

/// Output of a generation pass
#[derive(Debug, Clone, Serialize)]
pub struct Generated {
    pub text: String,
    pub warnings: Vec<Warning>,
}

/// Translates test cases to ATS scripts and back
#[derive(Debug, Default)]
pub struct Formatter {
    options: FormatterOptions,
    hooks: Hooks,
}

impl Formatter {
    pub fn new(options: FormatterOptions) -> Self {
        Self {
            options,
            hooks: Hooks::default(),
        }
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn options(&self) -> &FormatterOptions {
        &self.options
    }

    pub(crate) fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Generate the ATS script of a test case
    pub fn generate(&self, test_case: &TestCase) -> FormatResult<Generated> {
        self.options.validate()?;
        validate_test_case(test_case)?;

        let unit = self.options.indent_unit()?;
        let checks = test_case
            .commands
            .iter()
            .filter_map(Command::name)
            .filter(|name| catalog::is_check(name))
            .count();
        let mut ctx = GenerationContext::new(checks);

        for (index, command) in test_case.commands.iter().enumerate() {
            if let Some(name) = command.name() {
                if catalog::is_experimental_array_check(name) {
                    ctx.warn(Warning::ExperimentalCommand {
                        index,
                        command: name.to_string(),
                    });
                }
            }
        }

        debug!(
            "Generating {} ({} commands, {} checks)",
            test_case.display_title(),
            test_case.commands.len(),
            checks
        );

        let mut text = self.header(test_case, &unit);

        let translator = Translator::new(&self.options);
        let indent = unit.repeat(self.options.initial_indents);
        for (index, command) in test_case.commands.iter().enumerate() {
            debug!("Translating command #{}: {}", index + 1, command.to_line());
            for line in self.command_lines(index, command, &translator, &unit, &mut ctx)? {
                if !line.is_empty() {
                    text.push_str(&indent);
                }
                text.push_str(&line);
                text.push('\n');
            }
        }

        text.push_str(&self.footer(test_case, &unit));

        Ok(Generated {
            text,
            warnings: ctx.into_warnings(),
        })
    }

    /// Every parameter declared in the metadata block of a test case, in
    /// emission order
    pub fn parameters(&self, test_case: &TestCase) -> Vec<ExternalParameter> {
        let base = |name: &str, param_type, default: &str| ExternalParameter {
            name: name.to_string(),
            param_type,
            default: default.to_string(),
            provenance: Provenance::Base,
        };
        let mut out = vec![
            base("PX_SELENIUM_RC_HOST", ParamType::String, &self.options.rc_host),
            base("PX_SELENIUM_BROWSER", ParamType::String, &self.options.environment),
            base("PX_SELENIUM_RC_PORT", ParamType::Integer, &self.options.rc_port),
            base(SERVER_URL_PARAMETER, ParamType::String, &test_case.base_url),
            base("PX_SELENIUM_CLOSE_BROWSER", ParamType::Integer, "1"),
        ];
        out.extend(params::parse_static_parameters(&self.options.static_parameters));

        let declared: HashSet<String> = out.iter().map(|p| p.name.clone()).collect();
        out.extend(params::scan_dynamic_parameters(&test_case.commands, &declared));
        out
    }

    fn header(&self, test_case: &TestCase, unit: &str) -> String {
        let o = &self.options;
        let mut out = Hooks::render(&self.hooks.before_metadata, test_case);

        out.push_str("# __METADATA__BEGIN__\n");
        out.push_str("# <?xml version=\"1.0\" encoding=\"utf-8\" ?>\n");
        out.push_str("# <metadata version=\"1.0\">\n");
        out.push_str(&format!(
            "# <description>{}: {}</description>\n",
            params::xml_escape(test_case.display_title()),
            params::xml_escape(test_case.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION))
        ));
        out.push_str("# <prerequisites>prerequisites</prerequisites>\n");
        out.push_str("# <parameters>\n");
        for parameter in self.parameters(test_case) {
            out.push_str(&parameter.metadata_line());
            out.push('\n');
        }
        out.push_str("# </parameters>\n");
        out.push_str("# </metadata>\n");
        out.push_str("# __METADATA__END__\n");
        out.push_str(&Hooks::render(&self.hooks.after_metadata, test_case));
        out.push('\n');

        if o.show_selenese {
            out.push_str(&command_echo(&test_case.commands));
        }
        out.push_str("\n\n");

        out.push_str(&Hooks::render(&self.hooks.before_class_definition, test_case));
        out.push_str(&format!(
            "class {}({}):\n",
            class_name(test_case),
            o.super_class
        ));
        out.push_str(&format!("{}# here might be python docstrings\n", unit));
        out.push_str(&format!("{}def body(self):\n", unit));
        let body = unit.repeat(2);
        out.push_str(&format!("{}#set up (port mapping)\n", body));
        out.push_str(&format!("{}{} = self.mtc['sel']\n", body, o.receiver));
        out.push_str(&format!(
            "{}port_map({}, self.system['{}'])\n",
            body, o.receiver, o.tsi_port
        ));
        out.push_str(&format!("\n{}#selenium commands\n", body));
        out.push_str(&Hooks::render(&self.hooks.before_first_command, test_case));
        out
    }

    fn footer(&self, test_case: &TestCase, unit: &str) -> String {
        let o = &self.options;
        let body = unit.repeat(2);
        let class = class_name(test_case);
        let mut out = String::from("\n");

        out.push_str(&format!("{}# (port unmapping)\n", body));
        out.push_str(&format!(
            "{}port_unmap({}, self.system['{}'])\n",
            body, o.receiver, o.tsi_port
        ));
        out.push_str(&Hooks::render(&self.hooks.after_class_definition, test_case));
        out.push_str("\n\n##\n# Test Adapter Configurations\n##\n");
        out.push_str(&format!(
            "bind('{}', '{}', '{}', server_url = {}, rc_host = PX_SELENIUM_RC_HOST, \
             rc_port = PX_SELENIUM_RC_PORT, browser = PX_SELENIUM_BROWSER, \
             auto_shutdown = PX_SELENIUM_CLOSE_BROWSER)\n",
            o.tsi_port, o.probe_uri, o.probe_type, SERVER_URL_PARAMETER
        ));
        out.push_str("\n\n##\n# Control definition\n##\n");
        out.push_str(&format!("verdict = {}().execute()\n", class));
        out.push_str("#if (verdict == PASS):\n");
        out.push_str(&format!("{}# execute other test cases ...\n", unit));
        out.push('\n');
        out
    }

    /// Unindented lines of one translated command
    fn command_lines(
        &self,
        index: usize,
        command: &Command,
        translator: &Translator,
        unit: &str,
        ctx: &mut GenerationContext,
    ) -> FormatResult<Vec<String>> {
        let (name, target, value) = match command {
            Command::Comment { text } => {
                return Ok(text
                    .lines()
                    .map(|line| {
                        if line.is_empty() {
                            String::new()
                        } else {
                            format!("# {}", line)
                        }
                    })
                    .collect())
            }
            Command::RawLine { text } => return Ok(vec![text.clone()]),
            Command::Action { name, target, value } => (name, target, value),
        };

        let lines = match catalog::definition(name) {
            Definition::Echo => vec![format!(
                "log({})",
                params::to_target_string_expression(target, &ctx.variables)
            )],
            Definition::Pause => pause_lines(index, target, ctx)?,
            Definition::Store => {
                let variable = variable_name(index, value)?;
                let expr = params::to_target_string_expression(target, &ctx.variables);
                ctx.variables.insert(variable.clone());
                vec![format!("{} = {}", variable, expr)]
            }
            Definition::Action => {
                let call = Call::new(name.as_str(), action_args(target, value));
                vec![translator.translate(&call, &ctx.variables).send_expr]
            }
            Definition::ActionAndWait { action } => {
                let call = Call::new(action, action_args(target, value));
                let wait = Call::new(
                    "waitForPageToLoad",
                    vec![self.options.page_load_timeout.clone()],
                );
                vec![
                    translator.translate(&call, &ctx.variables).send_expr,
                    translator.translate(&wait, &ctx.variables).send_expr,
                ]
            }
            Definition::Accessor {
                role,
                accessor,
                negated,
            } => {
                let arity = accessor
                    .arity
                    .unwrap_or(if value.is_empty() { 0 } else { 1 });
                let (args, rest) = split_fields(arity, target, value);
                let call = Call::new(accessor.name.as_str(), args);
                let translated = translator.translate(&call, &ctx.variables);
                let subject = CheckSubject {
                    translated: &translated,
                    index,
                    command: name,
                    returns_array: accessor.returns_array(),
                };

                let check = match accessor.shape {
                    ReturnShape::Boolean => Check::Boolean { expected: true },
                    ReturnShape::Value => value_check(&rest, &ctx.variables),
                };
                let check = if negated { check.negate() } else { check };

                match role {
                    Role::Store => self.store_lines(index, &translated, &rest, ctx)?,
                    Role::Assert | Role::Verify => {
                        let branches =
                            verify::build_branches(&check, subject, role == Role::Assert, ctx);
                        let mut lines = vec![translated.send_expr.clone()];
                        lines.extend(self.render_alt(&translated, &branches, unit));
                        lines
                    }
                    Role::WaitFor => {
                        let wait =
                            verify::build_wait(&check, subject, self.options.wait_for_seconds, ctx);
                        let mut lines = vec![
                            format!(
                                "# {} is used to wait a little before the next send()",
                                wait.sleep_timer
                            ),
                            format!(
                                "{t} = Timer({}, '{t}')",
                                SLEEP_SECONDS,
                                t = wait.sleep_timer
                            ),
                            format!(
                                "# {} is the local watchdog (see branch conditions in next alt)",
                                wait.watchdog_timer
                            ),
                            format!(
                                "{t} = Timer({}, '{t}')",
                                wait.watchdog_seconds,
                                t = wait.watchdog_timer
                            ),
                            format!("{}.start()", wait.watchdog_timer),
                            translated.send_expr.clone(),
                        ];
                        lines.extend(self.render_alt(&translated, &wait.branches, unit));
                        lines
                    }
                }
            }
        };
        Ok(lines)
    }

    fn store_lines(
        &self,
        index: usize,
        translated: &Translated,
        variable: &str,
        ctx: &mut GenerationContext,
    ) -> FormatResult<Vec<String>> {
        let variable = variable_name(index, variable)?;
        let lines = vec![
            format!("# store (selenium): {} = {}", variable, translated.line_repr),
            translated.send_expr.clone(),
            format!("{}receive(value = '{}')", self.port_prefix(), variable),
            format!("{v} = value('{v}')", v = variable),
            format!(
                "log('{} = %s' % {})",
                variable,
                params::stringify(&variable)
            ),
        ];
        ctx.variables.insert(variable);
        Ok(lines)
    }

    fn port_prefix(&self) -> String {
        if self.options.receiver.is_empty() {
            String::new()
        } else {
            format!("{}.", self.options.receiver)
        }
    }

    /// `alt([...])` statement followed by an empty line
    fn render_alt(&self, translated: &Translated, branches: &[BranchConfig], unit: &str) -> Vec<String> {
        let lambda = |body: &str| format!("{}{}lambda: {},", unit, unit, body);
        let mut lines = vec!["alt([".to_string()];

        for branch in branches {
            let condition = match (&branch.timer, branch.timer_is_condition) {
                (Some(timer), true) => format!("{}.TIMEOUT", timer),
                _ => {
                    let template = match &branch.template {
                        Some(MatchTemplate::Expr(expr)) => format!("template = {}", expr),
                        Some(MatchTemplate::Any) => format!("template = {}", verify::TEMPLATE_ANY),
                        None => String::new(),
                    };
                    format!("{}RECEIVE({})", self.port_prefix(), template)
                }
            };
            lines.push(format!("{}[ {},", unit, condition));

            if let Some(verdict) = branch.verdict {
                lines.push(lambda(&format!("self.setverdict({})", verdict.token())));
            }
            if let Some(message) = &branch.log_message {
                lines.push(lambda(&format!("log('{}')", message)));
            }
            if branch.abort_on_match {
                lines.push(lambda("stop()"));
            }
            if let (Some(timer), true) = (&branch.timer, branch.timer_starts_on_match) {
                lines.push(lambda(&format!("{}.start()", timer)));
            }
            if branch.resend_on_match {
                lines.push(lambda(&translated.send_expr));
            }
            if branch.repeat_on_match {
                lines.push(lambda("REPEAT"));
            }
            if branch.is_terminal {
                lines.push(lambda("RETURN"));
            }
            lines.push(format!("{}],", unit));
        }

        lines.push("])".to_string());
        lines.push(String::new());
        lines
    }
}

/// Reject commands that would corrupt the document or could not be read
/// back from the command echo
fn validate_test_case(test_case: &TestCase) -> FormatResult<()> {
    let invalid = |index, reason: String| FormatError::InvalidTestCase { index, reason };

    for (index, command) in test_case.commands.iter().enumerate() {
        let fields = match command {
            Command::Action { name, target, value } => {
                if name.is_empty() {
                    return Err(invalid(index, "has an empty name".to_string()));
                }
                if !IDENTIFIER.is_match(name) {
                    return Err(invalid(index, format!("has an invalid name '{}'", name)));
                }
                if name == COMMENT_MARKER || name == LINE_MARKER {
                    return Err(invalid(
                        index,
                        format!("uses the reserved echo marker '{}' as its name", name),
                    ));
                }
                if value.contains('|') {
                    return Err(invalid(index, "has a '|' in its value".to_string()));
                }
                vec![("target", target), ("value", value)]
            }
            Command::Comment { text } | Command::RawLine { text } => vec![("text", text)],
        };

        for (field, text) in fields {
            if text.contains(['\n', '\r']) {
                return Err(invalid(index, format!("has a line break in its {}", field)));
            }
        }
    }
    Ok(())
}

/// `TC_` followed by the upper-cased title, anything but `[A-Z0-9]`
/// replaced with `_`
pub fn class_name(test_case: &TestCase) -> String {
    let title: String = test_case
        .display_title()
        .to_uppercase()
        .chars()
        .map(|c| if c.is_ascii_uppercase() || c.is_ascii_digit() { c } else { '_' })
        .collect();
    format!("TC_{}", title)
}

/// The command echo block; empty when there are no commands
pub fn command_echo(commands: &[Command]) -> String {
    if commands.is_empty() {
        return String::new();
    }
    let mut out = String::from(
        "# Please do not alter the following command list. It is used to extract a Selenium IDE test case from this ats file.\n\
         # command list (command | target | value):\n",
    );
    for command in commands {
        let (op, target, value) = match command {
            Command::Action { name, target, value } => (name.as_str(), target.as_str(), value.as_str()),
            Command::Comment { text } => (COMMENT_MARKER, text.as_str(), ""),
            Command::RawLine { text } => (LINE_MARKER, text.as_str(), ""),
        };
        out.push_str(&format!("{} {} | {} | {}\n", ECHO_PREFIX, op, target, value));
    }
    out
}

fn action_args(target: &str, value: &str) -> Vec<String> {
    if !value.is_empty() {
        vec![target.to_string(), value.to_string()]
    } else if !target.is_empty() {
        vec![target.to_string()]
    } else {
        Vec::new()
    }
}

/// Split `target`/`value` into the accessor arguments and the field that
/// follows them (expected pattern or variable name)
fn split_fields(arity: usize, target: &str, value: &str) -> (Vec<String>, String) {
    let fields = [target, value];
    let n = arity.min(fields.len());
    let args = fields[..n].iter().map(|f| f.to_string()).collect();
    let rest = fields.get(n).map(|f| f.to_string()).unwrap_or_default();
    (args, rest)
}

fn variable_name(index: usize, text: &str) -> FormatResult<String> {
    let name = params::strip_to_name(text.trim());
    if name.is_empty() {
        return Err(FormatError::InvalidTestCase {
            index,
            reason: "stores into an empty variable name".to_string(),
        });
    }
    Ok(name)
}

fn pause_lines(index: usize, target: &str, ctx: &mut GenerationContext) -> FormatResult<Vec<String>> {
    let millis = target
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|millis| millis.is_finite() && *millis >= 0.0)
        .ok_or_else(|| FormatError::InvalidTestCase {
            index,
            reason: format!("pauses for '{}', expected milliseconds", target),
        })?;
    let seconds = (millis / 1000.0).round() as i64;
    let timer = ctx.next_timer();
    Ok(vec![
        format!("#sleep for {} seconds (selenium command: pause())", seconds),
        format!("{t} = Timer({}, '{t}')", seconds, t = timer),
        format!("{}.start()", timer),
        format!("{}.timeout() #blocking", timer),
    ])
}

fn has_wildcard(text: &str, vars: &Variables) -> bool {
    params::segments(text, vars).iter().any(|seg| {
        matches!(seg, Segment::Literal(lit) if lit.contains(['*', '?']))
    })
}

/// Convert a selenese glob into an anchored regular expression, keeping
/// parameter references intact
pub fn glob_to_regex(glob: &str, vars: &Variables) -> String {
    let mut out = String::from("^");
    for seg in params::segments(glob, vars) {
        match seg {
            Segment::Literal(lit) => {
                for c in lit.chars() {
                    match c {
                        '*' => out.push_str(".*"),
                        '?' => out.push('.'),
                        '\\' | '.' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' => {
                            out.push('\\');
                            out.push(c);
                        }
                        c => out.push(c),
                    }
                }
            }
            Segment::Reference { name, .. } => {
                out.push_str("${");
                out.push_str(name);
                out.push('}');
            }
        }
    }
    out.push('$');
    out
}

/// Check of a value accessor against a selenese pattern
fn value_check(pattern: &str, vars: &Variables) -> Check {
    if let Some(rest) = pattern
        .strip_prefix("regexp:")
        .or_else(|| pattern.strip_prefix("regex:"))
    {
        return Check::Regex {
            pattern: rest.to_string(),
            matches: true,
        };
    }
    if let Some(rest) = pattern.strip_prefix("regexpi:") {
        return Check::Regex {
            pattern: format!("(?i){}", rest),
            matches: true,
        };
    }
    if let Some(rest) = pattern.strip_prefix("exact:") {
        return Check::Equality {
            pattern: rest.to_string(),
            equals: true,
        };
    }

    let glob = pattern.strip_prefix("glob:").unwrap_or(pattern);
    if has_wildcard(glob, vars) {
        Check::Regex {
            pattern: glob_to_regex(glob, vars),
            matches: true,
        }
    } else {
        Check::Equality {
            pattern: glob.to_string(),
            equals: true,
        }
    }
}
