use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use leadstore::model::{
    AdvertisementDraft, AdvertisementPatch, EnquiryDraft, EnquiryPatch, Session, UserDraft,
    UserPatch,
};
use leadstore::sdk::{self, export, queries};
use leadstore::{AdvertisementOps, EnquiryOps, UserOps};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "data")]
    data_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Log in and keep the session for later admin commands.
    Login { username: String, password: String },
    Logout,
    Whoami,
    Enquiries,
    /// Add an enquiry from an inline JSON draft (validated + duplicate-checked).
    AddEnquiry { json: String },
    UpdateEnquiry { id: String, json: String },
    DeleteEnquiry { id: String },
    SearchEnquiries { query: String },
    Stats,
    ExportEnquiries {
        #[arg(short, long)]
        out: Option<String>,
    },
    Users,
    AddUser { json: String },
    UpdateUser { id: String, json: String },
    DeleteUser { id: String },
    Ads,
    /// Bulk-import advertisement rows from a JSON array file.
    ImportAds { file: String },
    UpdateAd { id: String, json: String },
    DeleteAd { id: String },
    ExportAds {
        #[arg(short, long)]
        out: Option<String>,
    },
}

fn session_path(data_dir: &str) -> PathBuf {
    PathBuf::from(data_dir).join(leadstore::SESSION_FILE)
}

fn load_session(data_dir: &str) -> anyhow::Result<Session> {
    let content = fs::read_to_string(session_path(data_dir))
        .context("not logged in - run `leadstore login <username> <password>` first")?;
    Ok(serde_json::from_str(&content)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let store = sdk::new(&cli.data_dir).await?;

    match cli.command {
        Commands::Login { username, password } => {
            let session = store.login(&username, &password).await?;
            // In remote mode nothing else has created the data dir yet.
            fs::create_dir_all(&cli.data_dir)?;
            fs::write(
                session_path(&cli.data_dir),
                serde_json::to_string_pretty(&session)?,
            )?;
            println!("Logged in as {} ({:?})", session.username, session.role);
        }
        Commands::Logout => {
            let path = session_path(&cli.data_dir);
            if path.exists() {
                fs::remove_file(path)?;
            }
            println!("Logged out");
        }
        Commands::Whoami => {
            let session = load_session(&cli.data_dir)?;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        Commands::Enquiries => {
            let list = store.list_enquiries().await?;
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        Commands::AddEnquiry { json } => {
            let draft: EnquiryDraft = serde_json::from_str(&json)?;
            let saved = queries::save_enquiry(store.as_ref(), draft).await?;
            println!("{}", serde_json::to_string_pretty(&saved)?);
        }
        Commands::UpdateEnquiry { id, json } => {
            let patch: EnquiryPatch = serde_json::from_str(&json)?;
            store.update_enquiry(&id, patch).await?;
            println!("OK");
        }
        Commands::DeleteEnquiry { id } => {
            let session = load_session(&cli.data_dir)?;
            store.delete_enquiry(&session, &id).await?;
            println!("OK");
        }
        Commands::SearchEnquiries { query } => {
            let hits = queries::search_enquiries(store.as_ref(), &query).await?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Commands::Stats => {
            let stats = queries::enquiry_stats(store.as_ref()).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::ExportEnquiries { out } => {
            let list = store.list_enquiries().await?;
            let path = out.unwrap_or_else(|| export::export_filename("enquiries"));
            fs::write(&path, export::enquiries_to_csv(&list))?;
            println!("Exported {} enquiries to {}", list.len(), path);
        }
        Commands::Users => {
            let list = store.list_users().await?;
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        Commands::AddUser { json } => {
            let mut draft: UserDraft = serde_json::from_str(&json)?;
            if draft.created_by.is_none() {
                draft.created_by = load_session(&cli.data_dir).ok().map(|s| s.username);
            }
            let user = queries::create_user(store.as_ref(), draft).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Commands::UpdateUser { id, json } => {
            let patch: UserPatch = serde_json::from_str(&json)?;
            store.update_user(&id, patch).await?;
            println!("OK");
        }
        Commands::DeleteUser { id } => {
            let session = load_session(&cli.data_dir)?;
            store.delete_user(&session, &id).await?;
            println!("OK");
        }
        Commands::Ads => {
            let list = store.list_advertisements().await?;
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        Commands::ImportAds { file } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("could not read import file {}", file))?;
            let rows: Vec<AdvertisementDraft> = serde_json::from_str(&content)?;
            let operator = load_session(&cli.data_dir).ok().map(|s| s.username);
            let report =
                queries::import_advertisements(store.as_ref(), rows, operator.as_deref()).await?;
            println!("Imported: {}, failed: {}", report.imported, report.failed);
            for err in &report.errors {
                println!("  {}", err);
            }
        }
        Commands::UpdateAd { id, json } => {
            let patch: AdvertisementPatch = serde_json::from_str(&json)?;
            store.update_advertisement(&id, patch).await?;
            println!("OK");
        }
        Commands::DeleteAd { id } => {
            let session = load_session(&cli.data_dir)?;
            store.delete_advertisement(&session, &id).await?;
            println!("OK");
        }
        Commands::ExportAds { out } => {
            let list = store.list_advertisements().await?;
            let path = out.unwrap_or_else(|| export::export_filename("advertisements"));
            fs::write(&path, export::advertisements_to_csv(&list))?;
            println!("Exported {} advertisement enquiries to {}", list.len(), path);
        }
    }

    Ok(())
}
