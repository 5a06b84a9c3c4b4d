//! Rubico CLI - Customer management from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # List customers, newest first
//! rubico list
//!
//! # Search and sort
//! rubico list --search march --sort name-asc --page 2
//!
//! # Add a customer through the three-step wizard
//! rubico add
//!
//! # Edit, show or delete by ID
//! rubico edit 0f8e2c1a-1b2c-4d5e-8f90-123456789abc
//! rubico show 0f8e2c1a-1b2c-4d5e-8f90-123456789abc
//! rubico delete 0f8e2c1a-1b2c-4d5e-8f90-123456789abc --yes
//! ```
//!
//! # Commands
//!
//! - `list` - Show one page of customers
//! - `add` - Create a customer interactively
//! - `edit` - Change a customer interactively
//! - `delete` - Remove a customer after confirmation
//! - `show` - Print one customer
//!
//! Configuration comes from `RUBICO_*` environment variables (see
//! `rubico_app::config`). Logs go to stderr; set `RUST_LOG` to change the
//! level.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rubico_app::{AppConfig, AppError, CustomerApp, SortOrder};
use rubico_core::CustomerId;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Prompter;

#[derive(Parser)]
#[command(name = "rubico")]
#[command(author, version, about = "Rubico customer management")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List customers
    List {
        /// Filter by name, email or phone
        #[arg(short, long)]
        search: Option<String>,

        /// Sort order (recent, oldest, name-asc, name-desc)
        #[arg(long, default_value = "recent")]
        sort: SortOrder,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Add a customer
    Add,
    /// Edit a customer
    Edit {
        /// Customer ID
        id: CustomerId,
    },
    /// Delete a customer
    Delete {
        /// Customer ID
        id: CustomerId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show one customer
    Show {
        /// Customer ID
        id: CustomerId,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rubico=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let stdin = io::stdin();
    let mut prompt = Prompter::new(stdin.lock(), io::stdout().lock());

    match run(cli, &mut prompt).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            let _ = writeln!(prompt.output(), "Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

/// Run one command. `Ok(false)` means the command ran but did not succeed
/// (cancelled, or a failure notice was shown).
async fn run<R: BufRead, W: Write>(
    cli: Cli,
    prompt: &mut Prompter<R, W>,
) -> Result<bool, AppError> {
    let config = AppConfig::from_env()?;
    let repo = rubico_app::open_repository(&config).await?;
    let mut app = CustomerApp::new(repo, config.page_size);

    let ok = match cli.command {
        Commands::List { search, sort, page } => {
            if !app.load().await {
                return Ok(commands::report_notice(&mut app, prompt.output())?);
            }
            if let Some(search) = search {
                app.set_search(search);
            }
            app.set_sort(sort);
            app.set_page(page);
            commands::list::print_page(&app, prompt.output())?;
            true
        }
        Commands::Add => {
            app.open_add();
            commands::form::run(&mut app, prompt).await?
        }
        Commands::Edit { id } => {
            if app.open_edit(&id).await {
                commands::form::run(&mut app, prompt).await?
            } else {
                commands::report_notice(&mut app, prompt.output())?
            }
        }
        Commands::Delete { id, yes } => {
            if !app.load().await {
                return Ok(commands::report_notice(&mut app, prompt.output())?);
            }
            commands::delete::run(&mut app, prompt, &id, yes).await?
        }
        Commands::Show { id } => {
            if !app.load().await {
                return Ok(commands::report_notice(&mut app, prompt.output())?);
            }
            let Some(customer) = app.customers().iter().find(|c| c.id == id) else {
                return Err(AppError::NotFound(format!("customer {id}")));
            };
            commands::show::print_customer(customer, prompt.output())?;
            true
        }
    };
    Ok(ok)
}
