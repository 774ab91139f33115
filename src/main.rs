mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "certlist=debug" } else { "certlist=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args = Cli::parse();
    init_tracing(args.verbose);
    cli::context::init(args.config.as_deref());

    let result = match &args.command {
        Commands::Tree {
            keyring,
            batch_size,
            filter,
            search,
        } => cli::commands::tree::execute(
            keyring,
            *batch_size,
            filter.as_deref(),
            search.as_deref(),
        ),
        Commands::List { keyring } => cli::commands::list::execute(keyring),
        Commands::Classify { keyring, all } => cli::commands::classify::execute(keyring, *all),
        Commands::Filters => cli::commands::filters::execute(),
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}
