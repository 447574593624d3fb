//! # Storage Layer
//!
//! The [`DataStore`] trait is everything the defect collection needs from a
//! persistence backend: the record file and the image directory.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: production storage under a data directory
//!   - Records in a single JSON array file (`defects.json` by default)
//!   - Images in `images/<uuid>.png`
//!   - Record file replaced atomically (temp file + rename)
//!
//! - [`memory::InMemoryStore`]: in-memory storage for tests, with switches to
//!   make saves or image writes fail
//!
//! ## Storage Format
//!
//! ```text
//! data/
//! ├── defects.json        # Every defect record, insertion order (JSON array)
//! ├── config.json         # Optional server configuration
//! └── images/
//!     └── {uuid}.png      # One decoded image per record
//! ```
//!
//! The store is a whole-file rewrite design: the caller always hands over the
//! full record sequence, never a delta.

use crate::error::Result;
use crate::model::Defect;

pub mod fs;
pub mod memory;

/// Result of reading the record file at startup.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The file existed and parsed.
    Loaded(Vec<Defect>),
    /// No file was present; an empty one has been created.
    Created,
}

pub trait DataStore {
    /// Human-readable location of the record data, for logs and errors.
    fn location(&self) -> String;

    /// Read the persisted record sequence, creating an empty record file when
    /// none exists. A file that cannot be read or parsed is an error.
    fn load_defects(&mut self) -> Result<LoadOutcome>;

    /// Replace the persisted record sequence with `defects`.
    fn save_defects(&mut self, defects: &[Defect]) -> Result<()>;

    /// Move an unreadable record file out of the way so a fresh one can be
    /// started. Returns a description of where the old data went.
    fn quarantine_defects(&mut self) -> Result<String>;

    /// Persist image bytes under a newly generated filename and return that
    /// filename (never a full path).
    fn write_image(&mut self, bytes: &[u8]) -> Result<String>;

    /// Read an image by filename. `Ok(None)` when there is no such image.
    fn read_image(&self, filename: &str) -> Result<Option<Vec<u8>>>;
}
