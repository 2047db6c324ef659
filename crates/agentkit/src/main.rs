// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AgentKit - a WhatsApp AI assistant bot.
//!
//! This is the binary entry point for the relay and its admin commands.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod assistants;
mod config_check;
mod serve;

use clap::{Parser, Subcommand};

/// AgentKit - a WhatsApp AI assistant bot.
#[derive(Parser, Debug)]
#[command(name = "agentkit", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the WhatsApp relay.
    Serve,
    /// Manage OpenAI assistants.
    Assistants {
        #[command(subcommand)]
        action: AssistantsAction,
    },
    /// Inspect AgentKit configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum AssistantsAction {
    /// Create the stock WhatsApp assistant.
    Create,
    /// List existing assistants, newest first.
    List {
        /// Maximum number of assistants to show.
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Validate the merged configuration and print a summary.
    Check,
}

fn load_or_exit(validate: bool) -> agentkit_config::AgentKitConfig {
    let loaded = if validate {
        agentkit_config::load_and_validate()
    } else {
        agentkit_config::load_with_diagnostics()
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            agentkit_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => {
            let config = load_or_exit(true);
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Assistants { action }) => {
            let config = load_or_exit(false);
            match action {
                AssistantsAction::Create => assistants::run_create(&config).await,
                AssistantsAction::List { limit } => assistants::run_list(&config, limit).await,
            }
        }
        Some(Commands::Config {
            action: ConfigAction::Check,
        }) => {
            let config = load_or_exit(true);
            config_check::run_check(&config);
        }
        None => {
            println!("agentkit: use --help for available commands");
        }
    }
}
