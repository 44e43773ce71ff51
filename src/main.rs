//! localdeps CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use localdeps::cli::{Cli, CommandDispatcher};
use localdeps::config::{find_project_root, load_config};
use localdeps::shell::is_ci;
use localdeps::ui::{create_ui, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("localdeps=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("localdeps=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("localdeps starting with args: {:?}", cli);

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    // Explicit --project wins; otherwise walk up from the current directory
    let project_root = cli.project.clone().unwrap_or_else(|| {
        let cwd = std::env::current_dir().unwrap_or_default();
        find_project_root(&cwd).unwrap_or(cwd)
    });

    // Flags beat the configured default
    let output_mode = if cli.quiet {
        OutputMode::Quiet
    } else if cli.verbose {
        OutputMode::Verbose
    } else {
        load_config(&project_root, cli.config.as_deref())
            .ok()
            .and_then(|config| config.default_output)
            .map(OutputMode::from)
            .unwrap_or_default()
    };

    let mut ui = create_ui(!is_ci(), output_mode);

    let dispatcher =
        CommandDispatcher::new(project_root).with_config_override(cli.config.clone());

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
