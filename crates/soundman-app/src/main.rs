//! Sound Manager entry point.
//!
//! Starts the interactive volume shell, or runs the commands given on the
//! command line and exits.

mod cli;

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};

use soundman_audio::backend_from_config;
use soundman_terminal::{ConsoleSink, NullSink, OutputSink, Shell};
use soundman_types::config::ShellConfig;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "SOUNDMAN_CONFIG";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = cli::parse(std::env::args().skip(1))?;
    if args.help {
        println!("{}", cli::USAGE);
        return Ok(());
    }

    let mut config = load_config(args.config.clone())?;
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    log::info!("Starting Sound Manager (backend: {:?})", config.backend);

    let sound = backend_from_config(&config);
    let color = config.color && io::stdout().is_terminal();

    if args.commands.is_empty() {
        let mut shell = Shell::new(config, sound, Box::new(ConsoleSink::new(color)));
        let mut input = io::stdin().lock();
        let code = shell.run_interactive(&mut input)?;
        log::info!("Sound Manager exiting with code {code}");
        std::process::exit(code);
    }

    let sink: Box<dyn OutputSink> = if args.json {
        Box::new(NullSink)
    } else {
        Box::new(ConsoleSink::new(color))
    };
    let mut shell = Shell::new(config, sound, sink);
    let result = shell.execute_commands(&args.commands);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    let code = if result.output.has_failures() {
        1
    } else {
        shell.exit_code()
    };
    std::process::exit(code);
}

/// Load the configuration from `--config`, else `$SOUNDMAN_CONFIG`, else
/// built-in defaults.
fn load_config(path: Option<PathBuf>) -> Result<ShellConfig> {
    let path = path.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
    match path {
        Some(path) => ShellConfig::load(&path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ShellConfig::default()),
    }
}
