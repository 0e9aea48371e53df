//! selenese-ats CLI
//!
//! Command-line front-end generating Testerman ATS scripts from selenese
//! test case files and recovering test cases from generated scripts.

pub mod commands;
pub mod output;
