use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use todo_server::cli::{init_tracing, ServeArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServeArgs::parse();
    init_tracing(args.verbose, args.quiet)?;

    let store = args
        .open_store()
        .with_context(|| format!("failed to open database {}", args.database.display()))?;
    if !args.no_seed {
        store.seed_if_empty().await.context("failed to seed database")?;
    }

    let addr = args.addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, todo_server::app(store))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
