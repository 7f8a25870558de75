//! User-facing console output
//!
//! Build steps are printed as colored, indented lines. The indentation width
//! comes from the manifest root (`tab`). Diagnostics go through `tracing`
//! instead; this is only what the person running the build reads.

use colored::{ColoredString, Colorize};

/// Colored, indented printer for build progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Console {
    indent: usize,
    quiet: bool,
}

impl Console {
    pub fn new(indent: usize) -> Self {
        Self { indent, quiet: false }
    }

    /// A console that prints nothing
    pub fn quiet() -> Self {
        Self { indent: 0, quiet: true }
    }

    fn emit(&self, depth: usize, text: String) {
        if self.quiet {
            return;
        }
        println!("{:width$}{}", "", text, width = depth * self.indent);
    }

    /// `> text <` banner used for the manifest header
    pub fn banner(&self, text: &str) {
        self.emit(0, format!("> {} <", text).magenta().to_string());
    }

    /// Segment title
    pub fn heading(&self, number: usize, text: &str) {
        self.emit(0, format!("{}{}", format!("{}. ", number).cyan(), text.blue()));
    }

    /// Step group inside a segment ("Setup component(s)", ...)
    pub fn section(&self, text: &str) {
        self.emit(0, text.cyan().to_string());
    }

    /// An action with a highlighted verb, e.g. `- Download hekate`
    pub fn action(&self, depth: usize, verb: &str, text: &str) {
        self.emit(depth, format!("{}{}", verb.green(), text));
    }

    /// A file-level step with a yellow label, e.g. `Extract a.zip to /sd`
    pub fn step(&self, depth: usize, label: &str, text: &str) {
        self.emit(depth, format!("{}{}", label.yellow(), text));
    }

    pub fn info(&self, depth: usize, text: &str) {
        self.emit(depth, text.to_string());
    }

    pub fn success(&self, depth: usize, text: &str) {
        self.emit(depth, paint_success(text).to_string());
    }

    pub fn warn(&self, depth: usize, text: &str) {
        self.emit(depth, text.yellow().to_string());
    }

    pub fn error(&self, depth: usize, text: &str) {
        self.emit(depth, text.red().to_string());
    }
}

fn paint_success(text: &str) -> ColoredString {
    format!("\u{2714} {}", text).green()
}

impl Default for Console {
    fn default() -> Self {
        Self::new(crate::manifest::parser::DEFAULT_INDENT)
    }
}
