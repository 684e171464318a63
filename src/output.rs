//! User-facing output: message channels, record rendering and raw bytes.
//!
//! Messages (info/warning/error) go to stderr on the console so that records
//! and raw exports on stdout stay machine-parseable.

use crate::core::job::{FieldMap, JobView};
use crate::utils::template::Template;
use owo_colors::OwoColorize;
use std::io::{self, IsTerminal, Write};

/// Sink for everything a command shows the user.
pub trait Output {
    fn info(&mut self, message: &str);
    fn warning(&mut self, message: &str);
    fn error(&mut self, message: &str);
    /// One line per entry on the primary stream.
    fn lines(&mut self, lines: &[String]);
    /// Structured key/value records on the primary stream.
    fn records(&mut self, records: &[FieldMap]);
    /// Bytes copied verbatim to the primary stream.
    fn raw(&mut self, bytes: &[u8]) -> io::Result<()>;
}

pub struct ConsoleOutput {
    color: bool,
}

impl ConsoleOutput {
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal(),
        }
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Output for ConsoleOutput {
    fn info(&mut self, message: &str) {
        eprintln!("{}", message.trim_end());
    }

    fn warning(&mut self, message: &str) {
        let message = message.trim_end();
        if self.color {
            eprintln!("{}", message.yellow());
        } else {
            eprintln!("{message}");
        }
    }

    fn error(&mut self, message: &str) {
        let message = message.trim_end();
        if self.color {
            eprintln!("{}", message.red().bold());
        } else {
            eprintln!("{message}");
        }
    }

    fn lines(&mut self, lines: &[String]) {
        let mut stdout = io::stdout().lock();
        let written = lines
            .iter()
            .try_for_each(|line| writeln!(stdout, "{line}"));
        report_stdout_error(written);
    }

    fn records(&mut self, records: &[FieldMap]) {
        match serde_yaml::to_string(records) {
            Ok(rendered) => {
                report_stdout_error(io::stdout().lock().write_all(rendered.as_bytes()));
            }
            Err(e) => tracing::error!("Failed to render records: {e}"),
        }
    }

    fn raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()
    }
}

/// A closed pipe (e.g. `| head`) is not an error.
fn ignore_broken_pipe(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

fn report_stdout_error(result: io::Result<()>) {
    if let Err(e) = ignore_broken_pipe(result) {
        tracing::error!("Failed to write to stdout: {e}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Info,
    Warning,
    Error,
}

/// In-memory sink, for tests and for embedding the workflows.
#[derive(Debug, Default)]
pub struct BufferedOutput {
    messages: Vec<(Channel, String)>,
    lines: Vec<String>,
    records: Vec<FieldMap>,
    raw: Vec<u8>,
}

impl BufferedOutput {
    pub fn messages(&self, channel: Channel) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn records(&self) -> &[FieldMap] {
        &self.records
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }
}

impl Output for BufferedOutput {
    fn info(&mut self, message: &str) {
        self.messages.push((Channel::Info, message.trim_end().to_string()));
    }

    fn warning(&mut self, message: &str) {
        self.messages
            .push((Channel::Warning, message.trim_end().to_string()));
    }

    fn error(&mut self, message: &str) {
        self.messages.push((Channel::Error, message.trim_end().to_string()));
    }

    fn lines(&mut self, lines: &[String]) {
        self.lines.extend_from_slice(lines);
    }

    fn records(&mut self, records: &[FieldMap]) {
        self.records.extend_from_slice(records);
    }

    fn raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.raw.extend_from_slice(bytes);
        Ok(())
    }
}

/// How job records are rendered, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStyle {
    /// Full key/value map per record.
    Verbose,
    /// `%field%` template per record.
    Custom(Template),
    /// Precomputed one-line summary per record.
    Basic,
}

impl RecordStyle {
    /// Verbose wins over a custom format, which wins over the default.
    pub fn new(verbose: bool, outformat: Option<&str>) -> Self {
        match (verbose, outformat) {
            (true, _) => RecordStyle::Verbose,
            (false, Some(format)) => RecordStyle::Custom(Template::new(format)),
            (false, None) => RecordStyle::Basic,
        }
    }
}

pub fn render_records<V: JobView, O: Output + ?Sized>(
    style: &RecordStyle,
    records: &[V],
    output: &mut O,
) {
    match style {
        RecordStyle::Verbose => {
            let maps: Vec<FieldMap> = records.iter().map(JobView::field_map).collect();
            output.records(&maps);
        }
        RecordStyle::Custom(template) => {
            let lines: Vec<String> = records
                .iter()
                .map(|record| template.render(&record.field_map()))
                .collect();
            output.lines(&lines);
        }
        RecordStyle::Basic => {
            let lines: Vec<String> = records.iter().map(JobView::basic_string).collect();
            output.lines(&lines);
        }
    }
}
