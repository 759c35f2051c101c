// ============================================================
// File: main.rs
//
// Description:
//   Entry point for the `ordtrees` shell. Reads commands from
//   standard input and writes responses to standard output, so
//   the shell can be driven by scripts as well as by hand.
//
// Notes:
//   - Logs go to standard error; set `RUST_LOG` to adjust them.
//   - The B-tree order comes from the first argument or
//     `ORDTREES_ORDER` (see `config.rs`).
// ============================================================
use std::io;

use ordtrees::{repl_loop, Session, ShellConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ordtrees=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = match ShellConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let mut session = match Session::new(&config) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Failed to start session: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(order = config.order, "shell ready");

    // Hand off to the main command loop
    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(e) = repl_loop(&mut session, stdin.lock(), &mut stdout.lock()) {
        tracing::error!("I/O error: {e}");
        std::process::exit(1);
    }
}
