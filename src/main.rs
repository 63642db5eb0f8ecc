use std::io;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use form_autofill::cli::commands::{
    build_backend, cmd_assist, cmd_detect, cmd_fill, cmd_serve, cmd_suggest,
};
use form_autofill::cli::config::{Cli, Commands, load_config, resolve_gemini};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref());

    // Resolve Gemini settings: CLI > config > env > build-time > defaults
    let env_key = std::env::var("GEMINI_API_KEY").ok();
    let gemini = resolve_gemini(&cli, &config, env_key.as_deref());
    let mock_response = cli.mock_response.as_deref();

    match &cli.command {
        Commands::Detect { page } => {
            cmd_detect(page)?;
        }
        Commands::Suggest { page, requirements } => {
            let backend = build_backend(&gemini, mock_response)?;
            if !cmd_suggest(page, requirements, backend)? {
                std::process::exit(1);
            }
        }
        Commands::Fill {
            page,
            values,
            output,
        } => {
            cmd_fill(page, values, output.as_deref())?;
        }
        Commands::Assist {
            page,
            requirements,
            output,
            yes,
        } => {
            let backend = build_backend(&gemini, mock_response)?;
            let stdin = io::stdin();
            let stdout = io::stdout();
            let filled = cmd_assist(
                page,
                requirements,
                output.as_deref(),
                *yes,
                Duration::from_millis(config.review.reset_delay_ms),
                backend,
                &mut stdin.lock(),
                &mut stdout.lock(),
            )?;
            if !filled {
                std::process::exit(1);
            }
        }
        Commands::Serve => {
            let backend = build_backend(&gemini, mock_response)?;
            cmd_serve(backend)?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise -v count picks the level. Logs go to stderr so
/// `serve` keeps stdout for protocol lines.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
