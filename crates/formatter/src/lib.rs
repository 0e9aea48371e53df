//! selenese-ats Formatter
//!
//! This crate translates recorded Selenium test cases ("selenese") into
//! Testerman ATS scripts and parses generated scripts back:
//! - Builds the metadata block with the parameters the script expects
//! - Echoes every command so the script can be read back
//! - Turns checks into `alt` statements with verdicts, timers and retries
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Formatter (assembler)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  generate(TestCase) -> Generated { text, warnings }         │
//! │    ├── header: metadata block, command echo, class          │
//! │    ├── per command                                          │
//! │    │     ├── catalog::definition(name)                      │
//! │    │     ├── expression::Translator  -> send statement      │
//! │    │     └── verify::build_*         -> alt branches        │
//! │    └── footer: port unmapping, bind(), control part         │
//! │  parse(text) -> ParseOutcome { test_case, warnings }        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  params: ${PX_NAME[:default]} references, literals          │
//! │  options: FormatterOptions (TOML)    hooks: Hooks           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use selenese_ats::{Formatter, FormatterOptions};
//! use selenese_ats_common::{Command, TestCase};
//!
//! let test_case = TestCase::new("login")
//!     .with_base_url("http://localhost:8080")
//!     .push(Command::action("open", "/login", ""))
//!     .push(Command::action("assertTitle", "Login", ""));
//!
//! let formatter = Formatter::new(FormatterOptions::default());
//! let generated = formatter.generate(&test_case).unwrap();
//! let parsed = formatter.parse(&generated.text);
//! assert_eq!(parsed.test_case.commands, test_case.commands);
//! ```

pub mod assembler;
pub mod catalog;
pub mod context;
pub mod error;
pub mod expression;
pub mod hooks;
pub mod options;
pub mod params;
pub mod parser;
pub mod verify;
pub mod warning;

pub use assembler::{Formatter, Generated};
pub use error::{FormatError, FormatResult};
pub use hooks::Hooks;
pub use options::{FormatterOptions, TargetPlatform};
pub use params::{ExternalParameter, ParamType, Provenance};
pub use parser::ParseOutcome;
pub use warning::Warning;
