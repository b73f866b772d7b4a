//! Command trait, argument schemas, registry, and dispatch logic.

use std::cell::Cell;
use std::collections::HashMap;
use std::path::Path;

use soundman_audio::Sound;
use soundman_types::error::{Result, SoundError};

use crate::history::History;
use crate::output::Emitter;

/// What the shell should do after a command returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading commands.
    Continue,
    /// Leave the command loop.
    Quit,
}

/// Accepted arguments of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgSchema {
    /// The command takes no arguments.
    NoArgs,
    /// Exactly one integer in `min..=max`.
    Integer {
        name: &'static str,
        min: i64,
        max: i64,
    },
}

/// A validated argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgValue {
    Integer(i64),
}

impl ArgValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
        }
    }
}

impl ArgSchema {
    /// Check raw argument tokens against the schema.
    pub fn parse(&self, command: &str, args: &[String]) -> Result<Vec<ArgValue>> {
        match *self {
            Self::NoArgs => {
                if args.is_empty() {
                    Ok(Vec::new())
                } else {
                    Err(SoundError::InvalidArgument(format!(
                        "{command}: takes no arguments, got '{}'",
                        args.join(" ")
                    )))
                }
            },
            Self::Integer { name, min, max } => {
                let [raw] = args else {
                    return Err(SoundError::InvalidArgument(format!(
                        "{command}: expected 1 argument <{name}>, got {}",
                        args.len()
                    )));
                };
                let value: i64 = raw.parse().map_err(|_| {
                    SoundError::InvalidArgument(format!(
                        "{command}: argument {name}: invalid int value: '{raw}'"
                    ))
                })?;
                if !(min..=max).contains(&value) {
                    return Err(SoundError::InvalidArgument(format!(
                        "{command}: argument {name}: must be between {min} and {max}, got {value}"
                    )));
                }
                Ok(vec![ArgValue::Integer(value)])
            },
        }
    }
}

/// Everything a command may touch while it runs.
pub struct Context<'a> {
    /// The volume backend.
    pub sound: &'a mut dyn Sound,
    /// Captured, categorized output.
    pub out: &'a mut Emitter,
    /// Interactive history.
    pub history: &'a mut History,
    /// Result value handed back to programmatic callers.
    pub result: &'a mut Option<serde_json::Value>,
}

impl Context<'_> {
    /// Set the value returned in the execution result.
    pub fn set_result(&mut self, value: impl Into<serde_json::Value>) {
        *self.result = Some(value.into());
    }
}

/// A single executable command.
pub trait Command {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "volume_set <value>").
    fn usage(&self) -> &str;

    /// Command category for grouping in `help` output.
    fn category(&self) -> &str {
        "general"
    }

    /// Arguments the command accepts. Checked before `execute` runs.
    fn args(&self) -> ArgSchema {
        ArgSchema::NoArgs
    }

    /// Execute the command with validated arguments.
    fn execute(&self, args: &[ArgValue], ctx: &mut Context<'_>) -> Result<Flow>;
}

/// Commands handled by the registry itself.
const BUILTINS: [(&str, &str); 4] = [
    ("help", "List commands, or describe one"),
    ("history", "Show, clear or re-run the command history"),
    ("clear", "Clear the screen"),
    ("run_script", "Run the commands in a file"),
];

/// Category the built-ins are listed under in `help`.
const BUILTIN_CATEGORY: &str = "Shell Commands";

/// How deep `run_script` and `history run` may nest.
const MAX_NESTING: usize = 16;

/// Registry of available commands with dispatch.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
    depth: Cell<usize>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            depth: Cell::new(0),
        }
    }

    /// Register a command. Replaces any existing command with the same name.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        self.commands.insert(cmd.name().to_ascii_lowercase(), cmd);
    }

    /// Look up a command by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands
            .get(name.to_ascii_lowercase().as_str())
            .map(|c| c.as_ref())
    }

    /// Parse a command line and run the command it names.
    ///
    /// The leading token selects the command; the remaining tokens are checked
    /// against its [`ArgSchema`]. Command names are case-insensitive.
    pub fn dispatch(&self, line: &str, ctx: &mut Context<'_>) -> Result<Flow> {
        let tokens = tokenize(line.trim())?;
        let Some((name, rest)) = tokens.split_first() else {
            return Ok(Flow::Continue);
        };
        let name_lower = name.to_ascii_lowercase();

        // Intercept built-in commands that need registry or history access.
        match name_lower.as_str() {
            "help" => return self.execute_help(rest, ctx),
            "history" => return self.execute_history(rest, ctx),
            "run_script" => {
                let [path] = rest else {
                    return Err(SoundError::InvalidArgument(
                        "run_script: usage: run_script <path>".to_string(),
                    ));
                };
                return self.run_script(Path::new(path), ctx);
            },
            "clear" => {
                ArgSchema::NoArgs.parse("clear", rest)?;
                ctx.out.sink().clear_screen();
                return Ok(Flow::Continue);
            },
            _ => {},
        }

        match self.commands.get(name_lower.as_str()) {
            Some(cmd) => {
                let args = cmd.args().parse(cmd.name(), rest)?;
                log::debug!("dispatching {} {:?}", cmd.name(), args);
                cmd.execute(&args, ctx)
            },
            None => Err(SoundError::UnknownCommand(name.clone())),
        }
    }

    /// Built-in help with access to the registry.
    fn execute_help(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Flow> {
        if let Some(name) = args.first() {
            let name_lower = name.to_ascii_lowercase();
            if let Some((builtin, desc)) = BUILTINS.iter().find(|(b, _)| *b == name_lower) {
                ctx.out
                    .output(format!("{builtin} ({BUILTIN_CATEGORY})\n  {desc}"));
                return Ok(Flow::Continue);
            }
            return match self.commands.get(name_lower.as_str()) {
                Some(cmd) => {
                    ctx.out.output(format!(
                        "{} ({})\n  {}\n  Usage: {}",
                        cmd.name(),
                        cmd.category(),
                        cmd.description(),
                        cmd.usage()
                    ));
                    Ok(Flow::Continue)
                },
                None => Err(SoundError::UnknownCommand(name.clone())),
            };
        }

        // Group commands by category.
        let mut categories: HashMap<&str, Vec<(&str, &str)>> = HashMap::new();
        for (name, desc) in BUILTINS {
            categories
                .entry(BUILTIN_CATEGORY)
                .or_default()
                .push((name, desc));
        }
        for cmd in self.commands.values() {
            categories
                .entry(cmd.category())
                .or_default()
                .push((cmd.name(), cmd.description()));
        }

        let mut cats: Vec<(&str, Vec<(&str, &str)>)> = categories.into_iter().collect();
        cats.sort_by_key(|(cat, _)| *cat);

        let mut out = String::from("Documented commands (use 'help <command>' for details):\n");
        for (cat, mut cmds) in cats {
            cmds.sort_by_key(|(name, _)| *name);
            out.push_str(&format!("\n{cat}\n"));
            out.push_str(&"=".repeat(cat.len()));
            out.push('\n');
            for (name, desc) in &cmds {
                out.push_str(&format!("{name:<14}{desc}\n"));
            }
        }
        ctx.out.output(out.trim_end().to_string());
        Ok(Flow::Continue)
    }

    /// Return a sorted list of (name, description) pairs.
    pub fn list_commands(&self) -> Vec<(&str, &str)> {
        let mut cmds: Vec<(&str, &str)> = self
            .commands
            .values()
            .map(|c| (c.name(), c.description()))
            .collect();
        cmds.sort_by_key(|(name, _)| *name);
        cmds
    }

    /// Dispatch each line of a command file.
    ///
    /// Blank lines and `#` comments are skipped. A failing line is reported
    /// and the script goes on; `quit` ends it and is passed up.
    pub fn run_script(&self, path: &Path, ctx: &mut Context<'_>) -> Result<Flow> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SoundError::InvalidArgument(format!(
                "run_script: cannot read {}: {e}",
                path.display()
            ))
        })?;
        log::debug!("running script {}", path.display());
        self.nested(|| {
            for line in text.lines().map(str::trim) {
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                match self.dispatch(line, ctx) {
                    Ok(Flow::Quit) => return Ok(Flow::Quit),
                    Ok(Flow::Continue) => {},
                    Err(e) => ctx.out.report(&e),
                }
            }
            Ok(Flow::Continue)
        })
    }

    /// Built-in `history` command.
    fn execute_history(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Flow> {
        match args {
            [] => {},
            [sub] if sub == "clear" => {
                ctx.history.clear();
                ctx.out.feedback("History cleared.");
                return Ok(Flow::Continue);
            },
            [sub, index] if sub == "run" => {
                let len = ctx.history.len();
                let n = index
                    .parse::<usize>()
                    .ok()
                    .filter(|n| (1..=len).contains(n))
                    .ok_or_else(|| {
                        SoundError::InvalidArgument(format!(
                            "history run: no entry '{index}' (history has {len})"
                        ))
                    })?;
                let line = ctx.history.entries()[n - 1].clone();
                ctx.out.feedback(line.as_str());
                return self.nested(|| self.dispatch(&line, ctx));
            },
            _ => {
                return Err(SoundError::InvalidArgument(
                    "history: usage: history [clear | run <N>]".to_string(),
                ));
            },
        }
        if ctx.history.is_empty() {
            ctx.out.output("(no history)");
            return Ok(Flow::Continue);
        }
        let mut out = String::new();
        for (i, entry) in ctx.history.entries().iter().enumerate() {
            out.push_str(&format!("  {:4}  {entry}\n", i + 1));
        }
        ctx.out.output(out.trim_end().to_string());
        Ok(Flow::Continue)
    }

    /// Run `f` one level deeper, refusing past [`MAX_NESTING`].
    fn nested<F>(&self, f: F) -> Result<Flow>
    where
        F: FnOnce() -> Result<Flow>,
    {
        let depth = self.depth.get();
        if depth >= MAX_NESTING {
            return Err(SoundError::InvalidArgument(format!(
                "scripts and history runs nest at most {MAX_NESTING} deep"
            )));
        }
        self.depth.set(depth + 1);
        let flow = f();
        self.depth.set(depth);
        flow
    }

    /// Number of registered commands (built-ins excluded).
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tokenizer: handles single quotes, double quotes, and backslash escapes.
// ---------------------------------------------------------------------------

/// Tokenize a command line respecting quotes and backslash escapes.
///
/// - Single-quoted strings preserve all characters literally.
/// - Inside double quotes a backslash only escapes `"` and `\`.
/// - Backslash escapes the next character outside of quotes.
pub fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();
    let mut in_single = false;
    let mut in_double = false;

    while let Some(ch) = chars.next() {
        if in_single {
            if ch == '\'' {
                in_single = false;
            } else {
                current.push(ch);
            }
        } else if in_double {
            match ch {
                '"' => in_double = false,
                '\\' => match chars.next_if(|&next| next == '"' || next == '\\') {
                    Some(escaped) => current.push(escaped),
                    None => current.push('\\'),
                },
                _ => current.push(ch),
            }
        } else {
            match ch {
                '\'' => in_single = true,
                '"' => in_double = true,
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                },
                c if c.is_whitespace() => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                },
                _ => current.push(ch),
            }
        }
    }

    if in_single {
        return Err(SoundError::InvalidArgument(
            "unterminated single quote".to_string(),
        ));
    }
    if in_double {
        return Err(SoundError::InvalidArgument(
            "unterminated double quote".to_string(),
        ));
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    Ok(tokens)
}
