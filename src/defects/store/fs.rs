use super::{DataStore, LoadOutcome};
use crate::error::{DefectError, Result};
use crate::image::{is_plain_filename, new_image_filename};
use crate::model::Defect;
use chrono::Utc;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const DEFAULT_RECORDS_FILE: &str = "defects.json";
pub const DEFAULT_IMAGES_DIR: &str = "images";

pub struct FileStore {
    records_file: PathBuf,
    images_dir: PathBuf,
}

impl FileStore {
    /// Store rooted at `data_dir` with the default file layout.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            records_file: data_dir.join(DEFAULT_RECORDS_FILE),
            images_dir: data_dir.join(DEFAULT_IMAGES_DIR),
        }
    }

    pub fn with_records_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.records_file = path.into();
        self
    }

    pub fn with_images_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.images_dir = path.into();
        self
    }

    pub fn records_file(&self) -> &Path {
        &self.records_file
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Create the record file's directory and the image directory.
    pub fn ensure_dirs(&self) -> Result<()> {
        if let Some(parent) = self.records_file.parent() {
            ensure_dir(parent)?;
        }
        ensure_dir(&self.images_dir)
    }

    fn write_records(&self, defects: &[Defect]) -> Result<()> {
        let content = serde_json::to_string_pretty(defects).map_err(DefectError::Serialization)?;
        let dir = self
            .records_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        // Atomic replace: a crash mid-write leaves the old file intact
        let tmp_file = dir.join(format!(".defects-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(DefectError::Io)?;
        if let Err(e) = fs::rename(&tmp_file, &self.records_file) {
            let _ = fs::remove_file(&tmp_file);
            return Err(DefectError::Io(e));
        }
        Ok(())
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        fs::create_dir_all(path).map_err(DefectError::Io)?;
        tracing::info!(dir = %path.display(), "created directory");
    }
    Ok(())
}

impl DataStore for FileStore {
    fn location(&self) -> String {
        self.records_file.display().to_string()
    }

    fn load_defects(&mut self) -> Result<LoadOutcome> {
        self.ensure_dirs()?;
        let content = match fs::read_to_string(&self.records_file) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.write_records(&[])?;
                return Ok(LoadOutcome::Created);
            }
            Err(e) => return Err(DefectError::Io(e)),
        };
        let defects: Vec<Defect> =
            serde_json::from_str(&content).map_err(DefectError::Serialization)?;
        Ok(LoadOutcome::Loaded(defects))
    }

    fn save_defects(&mut self, defects: &[Defect]) -> Result<()> {
        self.write_records(defects)
    }

    fn quarantine_defects(&mut self) -> Result<String> {
        let mut name = self.records_file.as_os_str().to_owned();
        name.push(format!(".corrupt-{}", Utc::now().timestamp_millis()));
        let target = PathBuf::from(name);
        fs::rename(&self.records_file, &target).map_err(DefectError::Io)?;
        Ok(target.display().to_string())
    }

    fn write_image(&mut self, bytes: &[u8]) -> Result<String> {
        ensure_dir(&self.images_dir)?;
        let filename = new_image_filename();
        let path = self.images_dir.join(&filename);
        fs::write(&path, bytes).map_err(DefectError::Io)?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "image written");
        Ok(filename)
    }

    fn read_image(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        if !is_plain_filename(filename) {
            return Ok(None);
        }
        let path = self.images_dir.join(filename);
        if !path.is_file() {
            return Ok(None);
        }
        fs::read(&path).map(Some).map_err(DefectError::Io)
    }
}
