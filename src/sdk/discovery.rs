use std::env;
use std::sync::Arc;

use crate::engine::{DocStore, Persistence};
use crate::sdk::Client;
use crate::{LeadStore, Result};

/// Initializes a [`LeadStore`] based on the environment.
///
/// `new` automatically detects whether to connect to a remote daemon or
/// initialize the local embedded engine:
///
/// 1. If the `LEADSTORE_ADDR` environment variable is set, it connects to
///    that address in **Remote Mode**. A configured host that cannot be
///    reached is a hard error; there is no silent fallback to a local
///    store, because an operator must find out immediately when nothing
///    they do is going to be saved where they think it is.
/// 2. Otherwise, it opens a [`DocStore`] with [`Persistence`] in the
///    specified `data_dir` in **Embedded Mode**.
///
/// # Examples
///
/// ```no_run
/// use leadstore::sdk;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let store = sdk::new("./data").await?;
///     Ok(())
/// }
/// ```
pub async fn new(data_dir: &str) -> Result<Arc<dyn LeadStore>> {
    if let Ok(addr) = env::var("LEADSTORE_ADDR") {
        if !addr.is_empty() {
            let client = Client::connect(&addr).await?;
            return Ok(Arc::new(client));
        }
    }

    let persistence = Arc::new(Persistence::new(data_dir)?);
    let store = DocStore::open(persistence)?;
    Ok(Arc::new(store))
}
