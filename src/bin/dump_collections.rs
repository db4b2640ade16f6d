use std::env;
use std::sync::Arc;

use admin_data_access::config::Config;
use admin_data_access::models::EntityKind;
use admin_data_access::services::facade::DataAccessFacade;
use admin_data_access::services::local_store::{FileStore, KeyValueStore};
use admin_data_access::services::token_store::TokenStore;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_json<T: Serialize>(kind: EntityKind, records: &[T]) -> Result<(), Box<dyn std::error::Error>> {
    println!("== {} ({} records)", kind.collection(), records.len());
    println!("{}", serde_json::to_string_pretty(records)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,admin_data_access=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().collect();
    let kinds = match args.get(1) {
        None => EntityKind::ALL.to_vec(),
        Some(name) => match name.parse::<EntityKind>() {
            Ok(kind) => vec![kind],
            Err(e) => {
                eprintln!("{}", e);
                eprintln!("Usage: {} [customers|traders|files|products]", args[0]);
                std::process::exit(1);
            }
        },
    };

    let config = Config::from_env()?;
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.local_store_dir));
    let tokens = Arc::new(TokenStore::new(store.clone()));
    let facade = DataAccessFacade::from_config(&config, tokens, store)?;

    tracing::info!(tiers = ?facade.tier_names(), "Dumping collections");

    for kind in kinds {
        match kind {
            EntityKind::Customer => print_json(kind, &facade.customers().list().await?)?,
            EntityKind::Trader => print_json(kind, &facade.traders().list().await?)?,
            EntityKind::File => print_json(kind, &facade.files().list().await?)?,
            EntityKind::Product => print_json(kind, &facade.products().list().await?)?,
        }
    }

    Ok(())
}
