use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use crate::model::Database;
use crate::Result;

#[allow(unused_imports)]
use crate::engine::DocStore;

/// Handles disk I/O for the [`DocStore`].
///
/// The entire dataset is one pretty-printed JSON file inside the data
/// directory. Saves use an atomic "write-then-rename" strategy so an
/// interrupted write can never leave a half-serialized document behind;
/// the previous file survives until the rename.
pub struct Persistence {
    file_path: PathBuf,
}

impl Persistence {
    /// Initializes a new `Persistence` handler in the specified directory.
    ///
    /// If the directory does not exist, it will be created.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self {
            file_path: dir.join(crate::DATABASE_FILE),
        })
    }

    /// Writes the whole document to disk atomically.
    pub fn save(&self, db: &Database) -> Result<()> {
        let temp_path = self.file_path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(db)?;

        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &self.file_path)?;

        Ok(())
    }

    /// Loads the document, tolerating absence and corruption.
    ///
    /// A missing file initializes an empty document and writes it back
    /// immediately. A file that fails to parse is logged and treated as
    /// empty; availability wins over strict integrity here.
    pub fn load(&self) -> Result<Database> {
        if !self.file_path.exists() {
            let db = Database::default();
            self.save(&db)?;
            return Ok(db);
        }

        let content = fs::read(&self.file_path)?;
        match serde_json::from_slice(&content) {
            Ok(db) => Ok(db),
            Err(e) => {
                warn!(
                    "Could not unmarshal database from {:?}, starting empty: {}",
                    self.file_path, e
                );
                Ok(Database::default())
            }
        }
    }

    /// Path of the backing file, mainly for diagnostics.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}
