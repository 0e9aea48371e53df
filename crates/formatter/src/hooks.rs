//! Extension points
//!
//! Hooks let an embedder inject text at fixed places of the generated
//! document, or extract its own data from every line of a parsed one. All of
//! them are optional; an absent hook contributes nothing.

use std::fmt;

use selenese_ats_common::TestCase;

/// Produces text inserted at a fixed place of the document
pub type TextHook = Box<dyn Fn(&TestCase) -> String + Send + Sync>;

/// Called with every line of a parsed document
pub type LineHook = Box<dyn Fn(&mut TestCase, &str) + Send + Sync>;

#[derive(Default)]
pub struct Hooks {
    /// First text of the document
    pub before_metadata: Option<TextHook>,
    pub after_metadata: Option<TextHook>,
    pub before_class_definition: Option<TextHook>,
    /// Inserted after the port unmapping, before the adapter configuration
    pub after_class_definition: Option<TextHook>,
    /// Inserted right before the first translated command
    pub before_first_command: Option<TextHook>,
    pub on_parsed_line: Option<LineHook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before_metadata(mut self, hook: impl Fn(&TestCase) -> String + Send + Sync + 'static) -> Self {
        self.before_metadata = Some(Box::new(hook));
        self
    }

    pub fn after_metadata(mut self, hook: impl Fn(&TestCase) -> String + Send + Sync + 'static) -> Self {
        self.after_metadata = Some(Box::new(hook));
        self
    }

    pub fn before_class_definition(
        mut self,
        hook: impl Fn(&TestCase) -> String + Send + Sync + 'static,
    ) -> Self {
        self.before_class_definition = Some(Box::new(hook));
        self
    }

    pub fn after_class_definition(
        mut self,
        hook: impl Fn(&TestCase) -> String + Send + Sync + 'static,
    ) -> Self {
        self.after_class_definition = Some(Box::new(hook));
        self
    }

    pub fn before_first_command(
        mut self,
        hook: impl Fn(&TestCase) -> String + Send + Sync + 'static,
    ) -> Self {
        self.before_first_command = Some(Box::new(hook));
        self
    }

    pub fn on_parsed_line(mut self, hook: impl Fn(&mut TestCase, &str) + Send + Sync + 'static) -> Self {
        self.on_parsed_line = Some(Box::new(hook));
        self
    }

    /// Run a text hook; empty when unset
    pub(crate) fn render(hook: &Option<TextHook>, test_case: &TestCase) -> String {
        hook.as_ref().map(|h| h(test_case)).unwrap_or_default()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before_metadata", &self.before_metadata.is_some())
            .field("after_metadata", &self.after_metadata.is_some())
            .field("before_class_definition", &self.before_class_definition.is_some())
            .field("after_class_definition", &self.after_class_definition.is_some())
            .field("before_first_command", &self.before_first_command.is_some())
            .field("on_parsed_line", &self.on_parsed_line.is_some())
            .finish()
    }
}
