//! Command-line and environment configuration for the server binary.

use std::io::IsTerminal;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use crate::store::{StoreError, TodoStore};

/// Database path that selects a throwaway in-memory store.
pub const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Clone, Parser)]
#[command(name = "todo-server", version, about = "HTTP API for the todo list")]
pub struct ServeArgs {
    /// Address to bind.
    #[arg(long, env = "TODO_BIND", default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// SQLite database file, or `:memory:`.
    #[arg(long, env = "TODO_DATABASE", default_value = "todos.db")]
    pub database: PathBuf,

    /// Skip inserting sample rows into an empty database.
    #[arg(long, env = "TODO_NO_SEED")]
    pub no_seed: bool,

    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,
}

impl ServeArgs {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn open_store(&self) -> Result<TodoStore, StoreError> {
        if self.database.as_os_str() == IN_MEMORY {
            TodoStore::open_in_memory()
        } else {
            TodoStore::open(&self.database)
        }
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 2 {
        "trace"
    } else if verbose == 1 {
        "debug"
    } else {
        "info"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize tracing: {e}"))
}
