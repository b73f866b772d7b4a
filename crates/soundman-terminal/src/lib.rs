//! Command interpreter and buffered shell.
//!
//! The shell is a registry-based dispatch system. Commands implement the
//! `Command` trait and are registered by name. Every message a command emits
//! is recorded per output category, so callers can run commands
//! programmatically and inspect what they printed.

mod history;
mod interpreter;
mod output;
mod shell;
pub mod sound_commands;

/// Session history with optional file persistence.
pub use history::History;
/// Argument schema, parsed values, command trait and context, registry.
pub use interpreter::{ArgSchema, ArgValue, Command, CommandRegistry, Context, Flow, tokenize};
/// Output categories, capture buffers and display sinks.
pub use output::{
    ConsoleSink, Emitter, ExecutionResult, NullSink, OutputBuffers, OutputCategory, OutputSink,
    TIMING_PREFIX,
};
/// The buffered shell.
pub use shell::{Shell, ShellState};
/// Register the volume command set into a registry.
pub use sound_commands::register_sound_commands;
