use std::env;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;

use leadstore::engine::{DocStore, Persistence};
use leadstore::server::Router;
use leadstore::{AdvertisementOps, EnquiryOps, UserOps};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long)]
    data_dir: Option<String>,

    #[arg(short, long)]
    port: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let data_dir = args
        .data_dir
        .or_else(|| env::var("LEADSTORE_DATA_DIR").ok())
        .unwrap_or_else(|| "data".to_string());

    let port = args
        .port
        .or_else(|| env::var("LEADSTORE_PORT").ok())
        .unwrap_or_else(|| "7201".to_string());

    let persistence = Arc::new(Persistence::new(&data_dir)?);
    let store = Arc::new(DocStore::open(persistence)?);

    let router = Router::new(store.clone());

    println!("Starting Leadstore Daemon...");
    println!(
        "Engine started. Loaded {} enquiries, {} users, {} advertisements.",
        store.list_enquiries().await?.len(),
        store.list_users().await?.len(),
        store.list_advertisements().await?.len()
    );
    println!("Leadstore listening on :{} (TCP)", port);

    tokio::select! {
        res = router.listen(&port) => {
            if let Err(e) = res {
                eprintln!("TCP Server failed: {}", e);
            }
        }
        _ = signal::ctrl_c() => {
            println!("\nShutdown signal received. Finalizing disk writes...");
            store.wait().await;
            println!("Persistence complete. Exiting.");
        }
    }

    Ok(())
}
