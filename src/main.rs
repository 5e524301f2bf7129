use std::fs::File;
use std::path::PathBuf;
use std::process;
#[macro_use]
extern crate log;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde_json::json;

use stellar_save::{
    replay::{find_group, replay},
    FileStorage, GroupId, Network, NewGroup, Store, StoreConfig,
};

/// Savings-group store backed by a local JSON file
#[derive(Parser, Debug)]
#[clap(name = "stellar-save", version)]
struct Cli {
    /// Storage directory, overrides STELLAR_SAVE_DIR
    #[clap(long)]
    dir: Option<PathBuf>,

    /// Storage key, overrides STELLAR_SAVE_KEY
    #[clap(long)]
    key: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current state as JSON
    Show,
    Connect {
        address: String,
    },
    Disconnect,
    Network {
        network: Network,
    },
    AddGroup {
        name: String,
        target: Decimal,
    },
    /// GROUP is a group id or name
    Contribute {
        group: String,
        #[clap(allow_hyphen_values = true)]
        amount: Decimal,
    },
    /// Without GROUP the active group is cleared
    Select {
        group: Option<String>,
    },
    Reset,
    /// Show what the router would do with PATH
    Visit {
        path: String,
    },
    /// Apply a CSV file of actions
    Replay {
        file: PathBuf,
    },
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        error!("{e:#}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = StoreConfig::from_env();
    if let Some(dir) = cli.dir {
        config.storage_dir = dir;
    }
    if let Some(key) = cli.key {
        config.store_key = key;
    }

    let mut store = Store::open(FileStorage::new(&config.storage_dir), &config.store_key);

    match cli.command {
        Command::Show => {}
        Command::Connect { address } => store.connect_wallet(address),
        Command::Disconnect => store.disconnect_wallet(),
        Command::Network { network } => store.set_network(network),
        Command::AddGroup { name, target } => {
            let id = store.add_group(NewGroup::new(name, target));
            println!("{id}");
            return Ok(());
        }
        Command::Contribute { group, amount } => {
            let id = find_group(&store, &group).unwrap_or_else(|| GroupId::from(group));
            store.try_contribute_to_group(&id, amount)?;
        }
        Command::Select { group } => {
            let id = group.map(|key| find_group(&store, &key).unwrap_or_else(|| GroupId::from(key)));
            store.set_active_group(id);
        }
        Command::Reset => store.reset_savings(),
        Command::Visit { path } => {
            println!("{:?}", stellar_save::resolve(&path, &store));
            return Ok(());
        }
        Command::Replay { file } => {
            let reader = File::open(&file)
                .with_context(|| format!("Unable to open {}", file.display()))?;
            let applied = replay(reader, &mut store);
            info!("Applied {applied} action(s) from {}", file.display());
        }
    }

    let state = store.state();
    let view = json!({
        "persisted": state.persisted(),
        "notifications": state.ui.notifications(),
        "isMobileMenuOpen": state.ui.is_mobile_menu_open(),
    });
    println!("{}", serde_json::to_string_pretty(&view)?);

    Ok(())
}
