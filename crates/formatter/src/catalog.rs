//! Command definitions
//!
//! Selenese derives most command names from the accessors of the Selenium
//! API: `isTextPresent` yields `assertTextPresent`, `verifyTextNotPresent`,
//! `waitForTextPresent`, `storeTextPresent`; `getText` yields
//! `assertText`, `assertNotText`, and so on. This module maps a command name
//! back to what it means.

/// What an accessor returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    /// `is*` accessors
    Boolean,
    /// `get*` accessors
    Value,
}

/// How a check-yielding command treats the accessor result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Abort the test on mismatch
    Assert,
    /// Record the failure and continue
    Verify,
    /// Poll until the result matches or the watchdog fires
    WaitFor,
    /// Assign the result to a variable
    Store,
}

impl Role {
    pub fn is_check(&self) -> bool {
        !matches!(self, Role::Store)
    }
}

/// A Selenium accessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    pub name: String,
    pub shape: ReturnShape,
    /// Number of locator/argument parameters; `None` when unknown
    pub arity: Option<usize>,
}

impl Accessor {
    /// `getAll*` accessors return arrays
    pub fn returns_array(&self) -> bool {
        self.name.starts_with("getAll") && self.name.len() > "getAll".len()
    }
}

/// Meaning of a command name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    /// `echo(message)`
    Echo,
    /// `pause(milliseconds)`
    Pause,
    /// `store(expression, variableName)`
    Store,
    /// Any other command sent as is
    Action,
    /// `<action>AndWait`: the action followed by a page load wait
    ActionAndWait { action: String },
    /// A command built on an accessor
    Accessor {
        role: Role,
        accessor: Accessor,
        negated: bool,
    },
}

impl Definition {
    /// Whether the command produces a verification (and thus a verdict)
    pub fn is_check(&self) -> bool {
        matches!(self, Definition::Accessor { role, .. } if role.is_check())
    }
}

const BOOLEAN_ACCESSORS: &[(&str, usize)] = &[
    ("isAlertPresent", 0),
    ("isConfirmationPresent", 0),
    ("isPromptPresent", 0),
    ("isChecked", 1),
    ("isCookiePresent", 1),
    ("isEditable", 1),
    ("isElementPresent", 1),
    ("isSomethingSelected", 1),
    ("isTextPresent", 1),
    ("isVisible", 1),
    ("isOrdered", 2),
];

const VALUE_ACCESSORS: &[(&str, usize)] = &[
    ("getAlert", 0),
    ("getAllButtons", 0),
    ("getAllFields", 0),
    ("getAllLinks", 0),
    ("getAllWindowIds", 0),
    ("getAllWindowNames", 0),
    ("getAllWindowTitles", 0),
    ("getBodyText", 0),
    ("getConfirmation", 0),
    ("getCookie", 0),
    ("getHtmlSource", 0),
    ("getLocation", 0),
    ("getMouseSpeed", 0),
    ("getPrompt", 0),
    ("getSpeed", 0),
    ("getTitle", 0),
    ("getAttribute", 1),
    ("getAttributeFromAllWindows", 1),
    ("getCookieByName", 1),
    ("getCssCount", 1),
    ("getCursorPosition", 1),
    ("getElementHeight", 1),
    ("getElementIndex", 1),
    ("getElementPositionLeft", 1),
    ("getElementPositionTop", 1),
    ("getElementWidth", 1),
    ("getEval", 1),
    ("getExpression", 1),
    ("getSelectOptions", 1),
    ("getSelectedId", 1),
    ("getSelectedIds", 1),
    ("getSelectedIndex", 1),
    ("getSelectedIndexes", 1),
    ("getSelectedLabel", 1),
    ("getSelectedLabels", 1),
    ("getSelectedValue", 1),
    ("getSelectedValues", 1),
    ("getTable", 1),
    ("getText", 1),
    ("getValue", 1),
    ("getXpathCount", 1),
];

/// Actions whose names look like accessor-based commands
const PREFIXED_ACTIONS: &[&str] = &[
    "assertErrorOnNext",
    "assertFailureOnNext",
    "verifyErrorOnNext",
    "verifyFailureOnNext",
    "waitForCondition",
    "waitForFrameToLoad",
    "waitForPageToLoad",
    "waitForPopUp",
];

const ROLE_PREFIXES: &[(&str, Role)] = &[
    ("assert", Role::Assert),
    ("verify", Role::Verify),
    ("waitFor", Role::WaitFor),
    ("store", Role::Store),
];

fn lookup(base: &str) -> Option<Accessor> {
    let boolean = format!("is{}", base);
    if let Some((name, arity)) = BOOLEAN_ACCESSORS.iter().find(|(n, _)| *n == boolean) {
        return Some(Accessor {
            name: name.to_string(),
            shape: ReturnShape::Boolean,
            arity: Some(*arity),
        });
    }
    let value = format!("get{}", base);
    VALUE_ACCESSORS
        .iter()
        .find(|(n, _)| *n == value)
        .map(|(name, arity)| Accessor {
            name: name.to_string(),
            shape: ReturnShape::Value,
            arity: Some(*arity),
        })
}

fn starts_uppercase(s: &str) -> bool {
    s.chars().next().map(|c| c.is_ascii_uppercase()).unwrap_or(false)
}

/// Resolve the base of an accessor-based command, e.g. `NotText` ->
/// (`getText`, negated)
fn resolve_accessor(base: &str) -> (Accessor, bool) {
    if let Some(accessor) = lookup(base) {
        return (accessor, false);
    }
    if let Some(positive) = base.strip_suffix("NotPresent") {
        if let Some(accessor) = lookup(&format!("{}Present", positive)) {
            return (accessor, true);
        }
    }
    if let Some(rest) = base.strip_prefix("Not") {
        if starts_uppercase(rest) {
            if let Some(accessor) = lookup(rest) {
                return (accessor, true);
            }
        }
    }

    let (base, negated) = match base.strip_prefix("Not") {
        Some(rest) if starts_uppercase(rest) => (rest, true),
        _ => (base, false),
    };
    (
        Accessor {
            name: format!("get{}", base),
            shape: ReturnShape::Value,
            arity: None,
        },
        negated,
    )
}

/// Look up the definition of a command name
pub fn definition(name: &str) -> Definition {
    match name {
        "echo" => return Definition::Echo,
        "pause" => return Definition::Pause,
        "store" => return Definition::Store,
        _ => {}
    }
    if PREFIXED_ACTIONS.contains(&name) {
        return Definition::Action;
    }
    if let Some(action) = name.strip_suffix("AndWait") {
        if !action.is_empty() {
            return Definition::ActionAndWait {
                action: action.to_string(),
            };
        }
    }

    for (prefix, role) in ROLE_PREFIXES {
        let Some(base) = name.strip_prefix(prefix) else {
            continue;
        };
        if !starts_uppercase(base) {
            continue;
        }
        let (accessor, negated) = resolve_accessor(base);
        return Definition::Accessor {
            role: *role,
            accessor,
            negated: negated && role.is_check(),
        };
    }

    Definition::Action
}

/// Whether the command yields a verification
pub fn is_check(name: &str) -> bool {
    definition(name).is_check()
}

/// `assertAll*`, `verifyAll*`, `waitForAll*`
pub fn is_experimental_array_check(name: &str) -> bool {
    ["assert", "verify", "waitFor"].iter().any(|prefix| {
        name.strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix("All"))
            .map(|rest| !rest.is_empty())
            .unwrap_or(false)
    })
}
