//! Syntax support for the Stata language.
//!
//! The heart of this crate is the external scanner of the Stata grammar
//! ([`scanner`], exported to C by [`ffi`]): the single piece of state telling
//! whether a `*` opens a comment or multiplies two things.
//!
//! Around it lives a complete front end, driving the very same scanner:
//!
//! 1. [`source`] collects the `.do`, `.ado` and `.doh` files of a directory
//! 2. [`parser::tokenizer`] turns a file into tokens
//! 3. [`parser`] builds a syntax tree out of them
//! 4. [`highlight`] classifies tokens into editor captures
//!
//! `check_package` chains the first three steps and reports what went wrong.
//! [`statement`] picks the lines to run out of a file being edited, keeping
//! `///` continued statements whole.

use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files::Error as FilesError;
use codespan_reporting::term::termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use codespan_reporting::term::{self, Config};
use log::debug;
use std::io::Write;
use std::path::Path;

pub mod ffi;
pub mod highlight;
pub mod name;
pub mod parser;
pub mod position;
pub mod scanner;
pub mod source;
pub mod statement;
mod utils;

use source::{SourceFileError, SourceFileId, SourceFiles};

// We may be able to not list all errors by asking a trait
// AsDiagnostic instead. Maybe. Or just a Diagnostic.
#[derive(Debug)]
pub enum CheckError {
    LoadingFiles(Vec<SourceFileError>),
    Source(parser::Error, SourceFileId),
    /// Diagnostics couldn't be written
    Report(FilesError),
}

impl CheckError {
    pub fn as_diagnostic(&self) -> Diagnostic<SourceFileId> {
        match self {
            CheckError::Source(err, file_id) => err.diagnostic(*file_id),
            CheckError::LoadingFiles(errors) => {
                let notes = errors
                    .iter()
                    .map(|error| {
                        format!(
                            "{}\n{}\n{}",
                            error.file_name(),
                            error.message(),
                            error.note().unwrap_or_default()
                        )
                    })
                    .collect();

                Diagnostic::error()
                    .with_message("Error while loading the source files")
                    .with_notes(notes)
            }
            CheckError::Report(err) => Diagnostic::bug()
                .with_message("Diagnostics couldn't be reported")
                .with_notes(vec![err.to_string()]),
        }
    }
}

impl From<Vec<SourceFileError>> for CheckError {
    fn from(errors: Vec<SourceFileError>) -> Self {
        CheckError::LoadingFiles(errors)
    }
}

impl From<FilesError> for CheckError {
    fn from(err: FilesError) -> Self {
        CheckError::Report(err)
    }
}

impl From<std::io::Error> for CheckError {
    fn from(err: std::io::Error) -> Self {
        CheckError::Report(err.into())
    }
}

/// Writes progress and diagnostics to the terminal
pub struct Reporter {
    writer: StandardStream,
    config: Config,
}

impl Reporter {
    pub fn stderr(color: ColorChoice) -> Reporter {
        Reporter {
            writer: StandardStream::stderr(color),
            config: Config {
                tab_width: 2,
                ..Config::default()
            },
        }
    }

    pub fn success(&mut self, text: &str) -> std::io::Result<()> {
        self.writer
            .set_color(ColorSpec::new().set_bold(true).set_fg(Some(Color::Green)))?;
        write!(&mut self.writer, "success")?;
        self.writer.reset()?;
        writeln!(&mut self.writer, " {}", text)
    }

    pub fn emit(
        &mut self,
        files: &SourceFiles,
        diagnostic: &Diagnostic<SourceFileId>,
    ) -> Result<(), FilesError> {
        term::emit(&mut self.writer.lock(), &self.config, files, diagnostic)
    }

    /// Emit an error which stopped the check before any file could be kept
    /// around. Labels pointing into a file can't be rendered here.
    pub fn abort(&mut self, err: &CheckError) -> Result<(), FilesError> {
        self.emit(&SourceFiles::new(), &err.as_diagnostic())
    }
}

/// Summary of a check run
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct CheckReport {
    pub parsed: usize,
    pub failed: usize,
}

/// Parse every Stata file under `path`, reporting the syntax errors found.
pub fn check_package(path: &Path, reporter: &mut Reporter) -> Result<CheckReport, CheckError> {
    debug!("phase: load sources");
    let sources = source::load_sources(path)?;

    // Syntax errors don't stop the run, we report all of them at the end
    let mut diagnostics: Vec<Diagnostic<SourceFileId>> = vec![];
    let mut parsed = 0;

    debug!("phase: parse sources");
    for (id, file) in sources.iter() {
        match parser::parse(file.file()) {
            Ok(_) => parsed += 1,
            Err(err) => diagnostics.push(CheckError::Source(err, id).as_diagnostic()),
        }
    }

    reporter.success(&format!("parsed {} files", parsed))?;

    for diagnostic in &diagnostics {
        reporter.emit(&sources, diagnostic)?;
    }

    Ok(CheckReport {
        parsed,
        failed: diagnostics.len(),
    })
}
