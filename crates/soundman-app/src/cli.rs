//! Command-line argument handling.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use soundman_types::config::BackendKind;

pub const USAGE: &str = "\
Usage: soundman [OPTIONS] [COMMAND ...]

Without commands, starts the interactive shell. Each COMMAND argument is one
command line (quote it if it has arguments, e.g. \"volume_set 40\"); they run
in order and the process exits.

Options:
  -c, --config <PATH>     Read settings from a TOML file (default: $SOUNDMAN_CONFIG)
  -b, --backend <NAME>    Sound backend: wpctl or memory
      --json              Print the captured result of the commands as JSON
  -h, --help              Show this help";

/// Parsed command-line arguments.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Args {
    pub config: Option<PathBuf>,
    pub backend: Option<BackendKind>,
    pub json: bool,
    pub help: bool,
    pub commands: Vec<String>,
}

/// Parse arguments (without the program name).
pub fn parse<I>(args: I) -> Result<Args>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if !parsed.commands.is_empty() {
            // Everything after the first command is another command.
            parsed.commands.push(arg);
            continue;
        }
        match arg.as_str() {
            "-c" | "--config" => {
                let path = args.next().context("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            },
            "-b" | "--backend" => {
                let name = args.next().context("--backend needs a name")?;
                parsed.backend = Some(name.parse()?);
            },
            "--json" => parsed.json = true,
            "-h" | "--help" => parsed.help = true,
            "--" => parsed.commands.extend(args.by_ref()),
            flag if flag.starts_with('-') && flag.len() > 1 => {
                bail!("unknown option: {flag}\n\n{USAGE}")
            },
            _ => parsed.commands.push(arg),
        }
    }
    if parsed.json && parsed.commands.is_empty() && !parsed.help {
        bail!("--json needs at least one command");
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_arguments_is_interactive() {
        assert_eq!(args(&[]).unwrap(), Args::default());
    }

    #[test]
    fn options_and_commands() {
        let a = args(&[
            "--config",
            "/etc/soundman.toml",
            "-b",
            "memory",
            "--json",
            "volume_set 4",
            "status",
        ])
        .unwrap();
        assert_eq!(a.config, Some(PathBuf::from("/etc/soundman.toml")));
        assert_eq!(a.backend, Some(BackendKind::Memory));
        assert!(a.json);
        assert_eq!(a.commands, vec!["volume_set 4", "status"]);
    }

    #[test]
    fn options_after_first_command_are_commands() {
        let a = args(&["status", "--json"]).unwrap();
        assert!(!a.json);
        assert_eq!(a.commands, vec!["status", "--json"]);
    }

    #[test]
    fn double_dash_ends_options() {
        let a = args(&["--", "-weird"]).unwrap();
        assert_eq!(a.commands, vec!["-weird"]);
    }

    #[test]
    fn missing_option_value() {
        assert!(args(&["--config"]).is_err());
        assert!(args(&["--backend"]).is_err());
    }

    #[test]
    fn bad_backend() {
        assert!(args(&["--backend", "alsa"]).is_err());
    }

    #[test]
    fn unknown_option() {
        let err = args(&["--loud"]).unwrap_err();
        assert!(err.to_string().contains("unknown option: --loud"));
    }

    #[test]
    fn json_without_commands() {
        assert!(args(&["--json"]).is_err());
    }

    #[test]
    fn help_flag() {
        assert!(args(&["-h"]).unwrap().help);
    }
}
