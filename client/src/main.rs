use std::io::IsTerminal;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use todo_client::config::{ClientConfig, DEFAULT_BASE_URL};
use todo_client::MainViewModel;
use todo_core::TodoId;

#[derive(Debug, Parser)]
#[command(name = "todo", version, about = "Terminal front end for the todo API")]
struct Cli {
    /// Base URL of the todo API.
    #[arg(long, env = "TODO_API_URL", default_value = DEFAULT_BASE_URL)]
    url: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "TODO_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show all items.
    List,
    /// Create an item.
    Add { title: Vec<String> },
    /// Flip the done flag of an item.
    Toggle { id: TodoId },
    /// Remove an item.
    Delete { id: TodoId },
}

fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize tracing: {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = ClientConfig {
        base_url: cli.url.clone(),
        timeout: Duration::from_secs(cli.timeout_secs),
    };
    let api = config.connect().context("failed to create API client")?;
    let vm = MainViewModel::new(api);

    let _busy_log = vm.is_busy().subscribe(|busy| debug!(busy = *busy, "view model busy"));

    vm.load_command().execute(None).await;

    match cli.command.unwrap_or(Command::List) {
        Command::List => {}
        Command::Add { title } => {
            vm.new_title().set(title.join(" "));
            vm.add_command().execute(None).await;
            // The command stays disabled for a blank draft; surface why.
            if vm.error_message().get().is_none() && !vm.add_command().can_execute(None) {
                vm.error_message().set(Some(
                    todo_client::view_model::TITLE_REQUIRED_MESSAGE.to_string(),
                ));
            }
        }
        Command::Toggle { id } => match find(&vm, id) {
            Some(item) => vm.toggle_command().execute(Some(item)).await,
            None => missing(&vm, id),
        },
        Command::Delete { id } => match find(&vm, id) {
            Some(item) => vm.delete_command().execute(Some(item)).await,
            None => missing(&vm, id),
        },
    }

    render(&vm);
    Ok(if vm.error_message().get().is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn find(vm: &MainViewModel, id: TodoId) -> Option<todo_core::TodoItemDto> {
    vm.items().find(|item| item.id == id)
}

fn missing(vm: &MainViewModel, id: TodoId) {
    if vm.error_message().get().is_none() {
        vm.error_message().set(Some(format!("No task with id {id}.")));
    }
}

fn render(vm: &MainViewModel) {
    for item in vm.items().snapshot() {
        let mark = if item.is_done { 'x' } else { ' ' };
        println!("[{mark}] {:>4}  {}", item.id, item.title);
    }
    println!(
        "{} total, {} done, {} remaining",
        vm.total_count().get(),
        vm.done_count().get(),
        vm.remaining_count().get()
    );
    if let Some(message) = vm.error_message().get() {
        eprintln!("{message}");
    }
}
