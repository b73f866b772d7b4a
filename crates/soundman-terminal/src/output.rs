//! Categorized output capture.
//!
//! Everything a command prints goes through an [`Emitter`], which records the
//! message in the buffer of its [`OutputCategory`] and forwards it to an
//! [`OutputSink`] for display. The shell clears the buffers before every
//! command, so after a command returns they hold exactly what it produced.

use std::io::{self, Write};

use serde::Serialize;
use soundman_types::error::SoundError;

/// Messages in the error category starting with this prefix are displayed but
/// never recorded.
pub const TIMING_PREFIX: &str = "Elapsed:";

/// Classification of an emitted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputCategory {
    /// User-facing error (bad argument, unknown command).
    Error,
    /// Failure raised by a command's machinery.
    Exception,
    /// Status feedback that is not part of the command's result.
    Feedback,
    /// Normal command output.
    Output,
    /// Long output meant for a pager.
    Paged,
    /// Warning.
    Warning,
}

impl OutputCategory {
    /// Every category, in buffer order.
    pub const ALL: [OutputCategory; 6] = [
        Self::Error,
        Self::Exception,
        Self::Feedback,
        Self::Output,
        Self::Paged,
        Self::Warning,
    ];

    /// Lowercase name, as used in JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Exception => "exception",
            Self::Feedback => "feedback",
            Self::Output => "output",
            Self::Paged => "paged",
            Self::Warning => "warning",
        }
    }

    /// Whether the category is written to stderr on a console.
    pub fn is_diagnostic(self) -> bool {
        !matches!(self, Self::Output | Self::Paged)
    }
}

impl std::fmt::Display for OutputCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six per-category message sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputBuffers {
    pub error: Vec<String>,
    pub exception: Vec<String>,
    pub feedback: Vec<String>,
    pub output: Vec<String>,
    pub paged: Vec<String>,
    pub warning: Vec<String>,
}

impl OutputBuffers {
    /// Messages recorded in `category`.
    pub fn get(&self, category: OutputCategory) -> &[String] {
        match category {
            OutputCategory::Error => &self.error,
            OutputCategory::Exception => &self.exception,
            OutputCategory::Feedback => &self.feedback,
            OutputCategory::Output => &self.output,
            OutputCategory::Paged => &self.paged,
            OutputCategory::Warning => &self.warning,
        }
    }

    fn get_mut(&mut self, category: OutputCategory) -> &mut Vec<String> {
        match category {
            OutputCategory::Error => &mut self.error,
            OutputCategory::Exception => &mut self.exception,
            OutputCategory::Feedback => &mut self.feedback,
            OutputCategory::Output => &mut self.output,
            OutputCategory::Paged => &mut self.paged,
            OutputCategory::Warning => &mut self.warning,
        }
    }

    /// Empty every category.
    pub fn clear(&mut self) {
        for category in OutputCategory::ALL {
            self.get_mut(category).clear();
        }
    }

    /// True if no category holds a message.
    pub fn is_empty(&self) -> bool {
        OutputCategory::ALL
            .iter()
            .all(|&c| self.get(c).is_empty())
    }

    /// True if an error or exception was recorded.
    pub fn has_failures(&self) -> bool {
        !self.error.is_empty() || !self.exception.is_empty()
    }
}

/// What a command invocation (or batch) returns to a programmatic caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionResult {
    /// Value set by the handler, if any.
    pub result: Option<serde_json::Value>,
    /// Output captured while the command ran.
    pub output: OutputBuffers,
}

/// Where emitted messages are displayed.
pub trait OutputSink {
    /// Display one message.
    fn show(&mut self, category: OutputCategory, message: &str);

    /// Display the input prompt (no trailing newline).
    fn prompt(&mut self, _prompt: &str) {}

    /// Display the startup banner.
    fn banner(&mut self, banner: &str) {
        self.show(OutputCategory::Output, banner);
    }

    /// Clear the screen.
    fn clear_screen(&mut self) {}
}

/// Discards everything. For library use where only the captured buffers matter.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn show(&mut self, _category: OutputCategory, _message: &str) {}
}

const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD_GREEN: &str = "\x1b[1;32m";

/// Writes to the process's stdout/stderr, optionally with ANSI colors.
///
/// Write failures (a closed pipe, say) are ignored: the message is already
/// captured in the buffers.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    color: bool,
}

impl ConsoleSink {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, category: OutputCategory) -> (&'static str, &'static str) {
        if !self.color {
            return ("", "");
        }
        match category {
            OutputCategory::Error | OutputCategory::Exception => (RED, RESET),
            OutputCategory::Warning => (YELLOW, RESET),
            _ => ("", ""),
        }
    }
}

impl OutputSink for ConsoleSink {
    fn show(&mut self, category: OutputCategory, message: &str) {
        let (start, end) = self.paint(category);
        let _ = if category.is_diagnostic() {
            writeln!(io::stderr().lock(), "{start}{message}{end}")
        } else {
            writeln!(io::stdout().lock(), "{start}{message}{end}")
        };
    }

    fn prompt(&mut self, prompt: &str) {
        let mut out = io::stdout().lock();
        let _ = write!(out, "{prompt}");
        let _ = out.flush();
    }

    fn banner(&mut self, banner: &str) {
        let _ = if self.color {
            writeln!(io::stdout().lock(), "{BOLD_GREEN}{banner}{RESET}")
        } else {
            writeln!(io::stdout().lock(), "{banner}")
        };
    }

    fn clear_screen(&mut self) {
        let mut out = io::stdout().lock();
        let _ = write!(out, "\x1b[2J\x1b[H");
        let _ = out.flush();
    }
}

/// Records emitted messages per category and forwards them to a sink.
pub struct Emitter {
    buffers: OutputBuffers,
    sink: Box<dyn OutputSink>,
}

impl Emitter {
    pub fn new(sink: Box<dyn OutputSink>) -> Self {
        Self {
            buffers: OutputBuffers::default(),
            sink,
        }
    }

    /// Record and display a message.
    ///
    /// A message equal to the last one recorded in the same category is
    /// dropped entirely. In the error category, empty messages are dropped
    /// and timing lines are displayed without being recorded.
    pub fn emit(&mut self, category: OutputCategory, message: impl Into<String>) {
        let message = message.into();
        let buffer = self.buffers.get_mut(category);
        if buffer.last() == Some(&message) {
            return;
        }
        if category == OutputCategory::Error {
            if message.is_empty() {
                return;
            }
            if !message.starts_with(TIMING_PREFIX) {
                buffer.push(message.clone());
            }
        } else {
            buffer.push(message.clone());
        }
        self.sink.show(category, &message);
    }

    pub fn output(&mut self, message: impl Into<String>) {
        self.emit(OutputCategory::Output, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.emit(OutputCategory::Error, message);
    }

    pub fn exception(&mut self, message: impl Into<String>) {
        self.emit(OutputCategory::Exception, message);
    }

    pub fn feedback(&mut self, message: impl Into<String>) {
        self.emit(OutputCategory::Feedback, message);
    }

    pub fn paged(&mut self, message: impl Into<String>) {
        self.emit(OutputCategory::Paged, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.emit(OutputCategory::Warning, message);
    }

    /// Record a failed command: user mistakes go to the error category,
    /// everything else to the exception category.
    pub fn report(&mut self, err: &SoundError) {
        if err.is_user_error() {
            log::debug!("command rejected: {err}");
            self.error(err.to_string());
        } else {
            log::warn!("command failed: {err}");
            self.exception(err.to_string());
        }
    }

    /// Captured messages since the last clear.
    pub fn buffers(&self) -> &OutputBuffers {
        &self.buffers
    }

    /// Drop all captured messages.
    pub fn clear(&mut self) {
        self.buffers.clear();
    }

    /// The display behind this emitter.
    pub fn sink(&mut self) -> &mut dyn OutputSink {
        self.sink.as_mut()
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("buffers", &self.buffers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Sink that remembers what was displayed.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingSink {
        pub(crate) shown: Rc<RefCell<Vec<(OutputCategory, String)>>>,
        pub(crate) prompts: Rc<RefCell<Vec<String>>>,
        pub(crate) clears: Rc<RefCell<usize>>,
    }

    impl OutputSink for RecordingSink {
        fn show(&mut self, category: OutputCategory, message: &str) {
            self.shown.borrow_mut().push((category, message.to_string()));
        }
        fn prompt(&mut self, prompt: &str) {
            self.prompts.borrow_mut().push(prompt.to_string());
        }
        fn clear_screen(&mut self) {
            *self.clears.borrow_mut() += 1;
        }
    }

    fn recording() -> (Emitter, RecordingSink) {
        let sink = RecordingSink::default();
        (Emitter::new(Box::new(sink.clone())), sink)
    }

    #[test]
    fn emit_records_and_forwards() {
        let (mut em, sink) = recording();
        em.output("hello");
        assert_eq!(em.buffers().output, vec!["hello"]);
        assert_eq!(
            *sink.shown.borrow(),
            vec![(OutputCategory::Output, "hello".to_string())]
        );
    }

    #[test]
    fn each_helper_targets_its_category() {
        let (mut em, _) = recording();
        em.output("o");
        em.error("e");
        em.exception("x");
        em.feedback("f");
        em.paged("p");
        em.warning("w");
        let b = em.buffers();
        assert_eq!(b.output, vec!["o"]);
        assert_eq!(b.error, vec!["e"]);
        assert_eq!(b.exception, vec!["x"]);
        assert_eq!(b.feedback, vec!["f"]);
        assert_eq!(b.paged, vec!["p"]);
        assert_eq!(b.warning, vec!["w"]);
    }

    #[test]
    fn identical_consecutive_errors_recorded_once() {
        let (mut em, sink) = recording();
        em.error("volume_set: bad value");
        em.error("volume_set: bad value");
        assert_eq!(em.buffers().error.len(), 1);
        assert_eq!(sink.shown.borrow().len(), 1);
    }

    #[test]
    fn distinct_consecutive_errors_both_recorded() {
        let (mut em, _) = recording();
        em.error("first");
        em.error("second");
        assert_eq!(em.buffers().error, vec!["first", "second"]);
    }

    #[test]
    fn repeat_after_different_message_is_kept() {
        let (mut em, _) = recording();
        em.warning("a");
        em.warning("b");
        em.warning("a");
        assert_eq!(em.buffers().warning, vec!["a", "b", "a"]);
    }

    #[test]
    fn dedupe_is_per_category() {
        let (mut em, _) = recording();
        em.output("same");
        em.feedback("same");
        assert_eq!(em.buffers().output, vec!["same"]);
        assert_eq!(em.buffers().feedback, vec!["same"]);
    }

    #[test]
    fn empty_error_is_dropped() {
        let (mut em, sink) = recording();
        em.error("");
        assert!(em.buffers().error.is_empty());
        assert!(sink.shown.borrow().is_empty());
    }

    #[test]
    fn timing_error_is_shown_not_recorded() {
        let (mut em, sink) = recording();
        em.error("Elapsed: 1.2ms");
        em.error("Elapsed: 1.2ms");
        assert!(em.buffers().error.is_empty());
        assert_eq!(sink.shown.borrow().len(), 2);
    }

    #[test]
    fn empty_output_is_recorded() {
        let (mut em, _) = recording();
        em.output("");
        assert_eq!(em.buffers().output, vec![""]);
    }

    #[test]
    fn clear_empties_every_category() {
        let (mut em, _) = recording();
        for category in OutputCategory::ALL {
            em.emit(category, "x");
        }
        assert!(!em.buffers().is_empty());
        em.clear();
        assert!(em.buffers().is_empty());
    }

    #[test]
    fn clear_resets_dedupe() {
        let (mut em, _) = recording();
        em.error("boom");
        em.clear();
        em.error("boom");
        assert_eq!(em.buffers().error, vec!["boom"]);
    }

    #[test]
    fn report_splits_user_errors_from_failures() {
        let (mut em, _) = recording();
        em.report(&SoundError::UnknownCommand("louder".into()));
        em.report(&SoundError::Backend("no mixer".into()));
        assert_eq!(em.buffers().error, vec!["unknown command: louder"]);
        assert_eq!(em.buffers().exception, vec!["sound backend error: no mixer"]);
    }

    #[test]
    fn has_failures() {
        let mut b = OutputBuffers::default();
        assert!(!b.has_failures());
        b.warning.push("w".into());
        assert!(!b.has_failures());
        b.exception.push("x".into());
        assert!(b.has_failures());
    }

    #[test]
    fn category_names() {
        let names: Vec<&str> = OutputCategory::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            names,
            vec!["error", "exception", "feedback", "output", "paged", "warning"]
        );
        assert_eq!(OutputCategory::Paged.to_string(), "paged");
    }

    #[test]
    fn diagnostic_categories() {
        assert!(OutputCategory::Error.is_diagnostic());
        assert!(OutputCategory::Feedback.is_diagnostic());
        assert!(!OutputCategory::Output.is_diagnostic());
        assert!(!OutputCategory::Paged.is_diagnostic());
    }

    #[test]
    fn execution_result_serializes() {
        let mut output = OutputBuffers::default();
        output.output.push("Current volume | 0".into());
        let r = ExecutionResult {
            result: Some(serde_json::json!({"volume": 0})),
            output,
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["result"]["volume"], 0);
        assert_eq!(v["output"]["output"][0], "Current volume | 0");
        assert!(v["output"]["error"].as_array().unwrap().is_empty());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn no_two_adjacent_entries_equal(
                msgs in proptest::collection::vec("[ab]{0,2}", 0..30),
            ) {
                let mut em = Emitter::new(Box::new(NullSink));
                for m in &msgs {
                    em.warning(m.clone());
                }
                let recorded = &em.buffers().warning;
                for pair in recorded.windows(2) {
                    prop_assert_ne!(&pair[0], &pair[1]);
                }
            }
        }
    }
}
