//! The buffered command shell.
//!
//! A [`Shell`] owns the command registry, the sound backend, the output
//! buffers and the history. Commands run either from an interactive loop
//! ([`Shell::run_interactive`]) or programmatically
//! ([`Shell::execute_commands`], [`Shell::execute_command`],
//! [`Shell::run_function`]); both paths go through the same dispatch and
//! capture every message the command emits.

use std::io::BufRead;
use std::time::Instant;

use soundman_audio::Sound;
use soundman_types::config::ShellConfig;
use soundman_types::error::{Result, SoundError};

use crate::history::History;
use crate::interpreter::{CommandRegistry, Context, Flow};
use crate::output::{
    Emitter, ExecutionResult, OutputBuffers, OutputCategory, OutputSink, TIMING_PREFIX,
};
use crate::sound_commands::register_sound_commands;

/// Whether a command is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    /// Waiting for input. Buffers hold the previous command's output.
    Idle,
    /// A handler is running.
    Executing,
}

/// Interactive and programmatic front end to the volume commands.
pub struct Shell {
    config: ShellConfig,
    registry: CommandRegistry,
    sound: Box<dyn Sound>,
    out: Emitter,
    history: History,
    result: Option<serde_json::Value>,
    state: ShellState,
}

impl Shell {
    /// Build a shell with the volume command set registered.
    ///
    /// If the configured history file cannot be read, the shell starts with
    /// an empty in-memory history.
    pub fn new(config: ShellConfig, sound: Box<dyn Sound>, sink: Box<dyn OutputSink>) -> Self {
        let history = match &config.history_file {
            Some(path) => History::with_file(config.max_history, path).unwrap_or_else(|e| {
                log::warn!("could not load history from {}: {e}", path.display());
                History::new(config.max_history)
            }),
            None => History::new(config.max_history),
        };
        let mut registry = CommandRegistry::new();
        register_sound_commands(&mut registry);
        Self {
            config,
            registry,
            sound,
            out: Emitter::new(sink),
            history,
            result: None,
            state: ShellState::Idle,
        }
    }

    /// Registry, for adding commands beyond the volume set.
    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Output captured by the most recent command.
    pub fn buffers(&self) -> &OutputBuffers {
        self.out.buffers()
    }

    /// Result value set by the most recent command.
    pub fn result(&self) -> Option<&serde_json::Value> {
        self.result.as_ref()
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn sound(&self) -> &dyn Sound {
        self.sound.as_ref()
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Exit code for the process: the result value if it is an integer
    /// that fits, otherwise 0.
    pub fn exit_code(&self) -> i32 {
        self.result
            .as_ref()
            .and_then(serde_json::Value::as_i64)
            .and_then(|code| i32::try_from(code).ok())
            .unwrap_or(0)
    }

    /// Pre-command hook: forget the previous command's output and result.
    fn clear_buffers(&mut self) {
        self.out.clear();
        self.result = None;
    }

    fn snapshot(&self) -> ExecutionResult {
        ExecutionResult {
            result: self.result.clone(),
            output: self.out.buffers().clone(),
        }
    }

    /// Run one input line through the hook, dispatch, and error reporting.
    fn run_line(&mut self, line: &str) -> Flow {
        if line.trim().is_empty() {
            return Flow::Continue;
        }
        self.run_dispatched(|registry, ctx| registry.dispatch(line, ctx))
    }

    /// Clear the buffers, run `f` against the registry, and report its error.
    fn run_dispatched<F>(&mut self, f: F) -> Flow
    where
        F: FnOnce(&CommandRegistry, &mut Context<'_>) -> Result<Flow>,
    {
        self.clear_buffers();
        self.state = ShellState::Executing;
        let started = Instant::now();

        let outcome = {
            let mut ctx = Context {
                sound: self.sound.as_mut(),
                out: &mut self.out,
                history: &mut self.history,
                result: &mut self.result,
            };
            f(&self.registry, &mut ctx)
        };
        let flow = outcome.unwrap_or_else(|e| {
            self.out.report(&e);
            Flow::Continue
        });

        if self.config.timing {
            self.out
                .error(format!("{TIMING_PREFIX} {:?}", started.elapsed()));
        }
        self.state = ShellState::Idle;
        flow
    }

    /// Run a batch of command lines.
    ///
    /// Buffers are cleared before the batch and again before each command, so
    /// the returned output is what the last command left behind. A command
    /// that returns [`Flow::Quit`] ends the batch early.
    pub fn execute_commands<I, S>(&mut self, commands: I) -> ExecutionResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.clear_buffers();
        for command in commands {
            if self.run_line(command.as_ref()) == Flow::Quit {
                log::debug!("batch stopped by quit");
                break;
            }
        }
        self.snapshot()
    }

    /// Run a single command line.
    pub fn execute_command(&mut self, command: &str) -> ExecutionResult {
        self.execute_commands([command])
    }

    /// Call `f` as if it were a command: buffers are cleared first, its output
    /// is captured, and an `Err` is reported like a failed command.
    pub fn run_function<F>(&mut self, f: F) -> ExecutionResult
    where
        F: FnOnce(&mut Context<'_>) -> Result<()>,
    {
        self.clear_buffers();
        self.state = ShellState::Executing;
        let outcome = {
            let mut ctx = Context {
                sound: self.sound.as_mut(),
                out: &mut self.out,
                history: &mut self.history,
                result: &mut self.result,
            };
            f(&mut ctx)
        };
        if let Err(e) = outcome {
            self.out.report(&e);
        }
        self.state = ShellState::Idle;
        self.snapshot()
    }

    /// Read-eval-print loop over `input` until `quit` or end of input.
    ///
    /// The configured startup script runs after the banner, before the first
    /// prompt. Returns the exit code (see [`Shell::exit_code`]). Only a
    /// failure to read input ends the loop with an error.
    pub fn run_interactive(&mut self, input: &mut dyn BufRead) -> Result<i32> {
        if !self.config.intro.is_empty() {
            let intro = self.config.intro.clone();
            self.out.sink().banner(&intro);
        }

        if let Some(script) = self.config.startup_script.clone() {
            log::info!("running startup script {}", script.display());
            let flow = self.run_dispatched(|registry, ctx| registry.run_script(&script, ctx));
            if flow == Flow::Quit {
                return Ok(self.exit_code());
            }
        }

        let mut raw = Vec::new();
        loop {
            let prompt = self.config.prompt.clone();
            self.out.sink().prompt(&prompt);

            raw.clear();
            if input.read_until(b'\n', &mut raw)? == 0 {
                // Leave the terminal on a fresh line after ^D.
                self.out.sink().show(OutputCategory::Output, "");
                log::debug!("end of input");
                break;
            }

            let Ok(line) = std::str::from_utf8(&raw) else {
                self.run_dispatched(|_, _| {
                    Err(SoundError::InvalidArgument(
                        "input line is not valid UTF-8".to_string(),
                    ))
                });
                continue;
            };

            self.history.push(line);
            if self.run_line(line) == Flow::Quit {
                break;
            }
        }
        Ok(self.exit_code())
    }
}
