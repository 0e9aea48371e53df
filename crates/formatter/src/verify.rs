//! Verification branches
//!
//! Testerman checks the response of a Selenium call with an `alt` statement:
//! an ordered list of branches, each guarded by a receive template or a timer
//! timeout. This module decides which branches a check needs and what each
//! branch does when it matches; the assembler turns them into text.
//!
//! ```text
//! sel.send(["isEditable", "id=foo"])
//! alt([
//!     [ sel.RECEIVE(template = True),          <- expected outcome
//!         lambda: self.setverdict(PASS),          (only for the last check)
//!         lambda: log('...'),
//!     ],
//!     [ sel.RECEIVE(template = any_or_none()), <- anything else
//!         lambda: self.setverdict(FAIL),
//!         lambda: log('...'),
//!         lambda: stop(),                         (assert only)
//!     ],
//! ])
//! ```
//!
//! `waitFor*` commands reuse the same branches: the failing branch becomes a
//! "not yet" branch that arms a short sleep timer, the sleep timer resends the
//! call, and a watchdog timer ends the loop.

use crate::context::GenerationContext;
use crate::expression::Translated;
use crate::params;
use crate::warning::Warning;

/// Template matching any response
pub const TEMPLATE_ANY: &str = "any_or_none()";

/// Seconds between two polls of a `waitFor*` command
pub const SLEEP_SECONDS: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn token(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
        }
    }
}

/// Receive template of a branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchTemplate {
    /// A Python template expression
    Expr(String),
    /// The catch-all template
    Any,
}

/// One branch of an `alt` statement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchConfig {
    pub template: Option<MatchTemplate>,
    pub verdict: Option<Verdict>,
    pub log_message: Option<String>,
    pub abort_on_match: bool,
    pub repeat_on_match: bool,
    pub timer: Option<String>,
    pub timer_starts_on_match: bool,
    /// The branch fires on the timer's timeout instead of a receive
    pub timer_is_condition: bool,
    pub resend_on_match: bool,
    /// Leave the `alt` even though other branches repeat
    pub is_terminal: bool,
}

/// What a check compares the accessor result with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// `is*` accessors
    Boolean { expected: bool },
    /// `get*` accessors compared with an exact (possibly parameterized) value
    Equality { pattern: String, equals: bool },
    /// `get*` accessors matched against a regular expression
    Regex { pattern: String, matches: bool },
}

impl Check {
    /// The same check with its expectation flipped
    pub fn negate(self) -> Self {
        match self {
            Check::Boolean { expected } => Check::Boolean { expected: !expected },
            Check::Equality { pattern, equals } => Check::Equality {
                pattern,
                equals: !equals,
            },
            Check::Regex { pattern, matches } => Check::Regex {
                pattern,
                matches: !matches,
            },
        }
    }
}

/// The call being checked
#[derive(Debug, Clone, Copy)]
pub struct CheckSubject<'a> {
    pub translated: &'a Translated,
    /// Position of the command in the test case
    pub index: usize,
    /// Selenese command name, for warnings
    pub command: &'a str,
    /// The accessor returns an array (`getAll*`)
    pub returns_array: bool,
}

/// Timers and branches of a `waitFor*` structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitStructure {
    pub sleep_timer: String,
    pub watchdog_timer: String,
    pub watchdog_seconds: u64,
    pub branches: Vec<BranchConfig>,
}

/// Wrap a template so that it matches one element of a three element array.
///
/// Testerman compares the received message with the template directly, so an
/// array cannot be joined before matching.
fn array_template(template: String) -> String {
    format!("[{any}, {}, {any}]", template, any = TEMPLATE_ANY)
}

fn pass_if_last(ctx: &mut GenerationContext) -> Option<Verdict> {
    if ctx.is_last_check() {
        Some(Verdict::Pass)
    } else {
        None
    }
}

/// Build the two branches of a check: the expected template first, then the
/// catch-all.
///
/// Only the last check of a document sets a pass verdict, so that an early
/// success does not mark the whole test case as passed.
pub fn build_branches(
    check: &Check,
    subject: CheckSubject<'_>,
    is_assert: bool,
    ctx: &mut GenerationContext,
) -> Vec<BranchConfig> {
    let pass = pass_if_last(ctx);
    let line = &subject.translated.line_repr;

    let (template, expected_log, positive) = match check {
        Check::Boolean { expected } => {
            let template = if *expected { "True" } else { "False" };
            let first = BranchConfig {
                template: Some(MatchTemplate::Expr(template.to_string())),
                verdict: pass,
                log_message: Some(format!("{} == {} -> Good!", line, template)),
                abort_on_match: false,
                ..Default::default()
            };
            let second = BranchConfig {
                template: Some(MatchTemplate::Any),
                verdict: Some(Verdict::Fail),
                log_message: Some(format!("{} != {} -> Bad!", line, template)),
                abort_on_match: is_assert,
                ..Default::default()
            };
            return vec![first, second];
        }
        Check::Equality { pattern, equals } => (
            params::to_target_string_expression(pattern, &ctx.variables),
            params::log_fragment(pattern, &ctx.variables),
            *equals,
        ),
        Check::Regex { pattern, matches } => (
            params::regex_template(pattern, &ctx.variables),
            format!("regexp:{}", params::log_fragment(pattern, &ctx.variables)),
            *matches,
        ),
    };

    let template = if subject.returns_array {
        ctx.warn(Warning::ArrayPattern {
            index: subject.index,
            command: subject.command.to_string(),
        });
        array_template(template)
    } else {
        template
    };

    let (good, bad) = ("Good!", "Bad!");
    let first = BranchConfig {
        template: Some(MatchTemplate::Expr(template)),
        verdict: if positive { pass } else { Some(Verdict::Fail) },
        log_message: Some(format!(
            "{} == {} -> {}",
            line,
            expected_log,
            if positive { good } else { bad }
        )),
        abort_on_match: if positive { false } else { is_assert },
        ..Default::default()
    };
    let second = BranchConfig {
        template: Some(MatchTemplate::Any),
        verdict: if positive { Some(Verdict::Fail) } else { pass },
        log_message: Some(format!(
            "{} != {} -> {}",
            line,
            expected_log,
            if positive { bad } else { good }
        )),
        abort_on_match: if positive { is_assert } else { false },
        ..Default::default()
    };
    vec![first, second]
}

/// Build the polling structure of a `waitFor*` command.
///
/// Resulting branches, in order: the expected outcome, the "not yet" branch
/// (arms the sleep timer and repeats), the sleep timeout (resends the call
/// and repeats) and the terminal watchdog timeout.
pub fn build_wait(
    check: &Check,
    subject: CheckSubject<'_>,
    watchdog_seconds: u64,
    ctx: &mut GenerationContext,
) -> WaitStructure {
    let mut branches = build_branches(check, subject, false, ctx);

    let sleep_timer = ctx.next_timer();
    if let Some(not_yet) = branches
        .iter_mut()
        .find(|b| b.verdict == Some(Verdict::Fail))
    {
        not_yet.verdict = None;
        not_yet.log_message = None;
        not_yet.repeat_on_match = true;
        not_yet.timer = Some(sleep_timer.clone());
        not_yet.timer_starts_on_match = true;
    }

    branches.push(BranchConfig {
        timer: Some(sleep_timer.clone()),
        timer_is_condition: true,
        repeat_on_match: true,
        resend_on_match: true,
        ..Default::default()
    });

    let watchdog_timer = ctx.next_timer();
    branches.push(BranchConfig {
        timer: Some(watchdog_timer.clone()),
        timer_is_condition: true,
        verdict: Some(Verdict::Fail),
        log_message: Some(format!(
            "Waiting for {} timed out!",
            subject.translated.line_repr
        )),
        abort_on_match: true,
        is_terminal: true,
        ..Default::default()
    });

    WaitStructure {
        sleep_timer,
        watchdog_timer,
        watchdog_seconds,
        branches,
    }
}
