//! Terminal output for the CLI.
//!
//! Diagnostics go to stderr, colored by severity. Command results (rendered
//! HTML, JSON indexes) go to stdout uncolored so they can be piped.

use console::{Style, Term};

#[derive(Clone, Copy)]
enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    fn style(self) -> Style {
        match self {
            Self::Info => Style::new(),
            Self::Success => Style::new().green(),
            Self::Warning => Style::new().yellow(),
            Self::Error => Style::new().red().bold(),
        }
    }
}

pub(crate) struct Output {
    diagnostics: Term,
    results: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            diagnostics: Term::stderr(),
            results: Term::stdout(),
        }
    }

    fn emit(&self, severity: Severity, msg: &str) {
        // A closed stderr is not worth failing the command over.
        let _ = self
            .diagnostics
            .write_line(&severity.style().apply_to(msg).to_string());
    }

    pub(crate) fn info(&self, msg: &str) {
        self.emit(Severity::Info, msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.emit(Severity::Success, msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.emit(Severity::Warning, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.emit(Severity::Error, msg);
    }

    /// Write a command result to stdout.
    pub(crate) fn result(&self, text: &str) -> std::io::Result<()> {
        self.results.write_line(text)
    }
}
