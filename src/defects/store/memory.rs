use super::{DataStore, LoadOutcome};
use crate::error::{DefectError, Result};
use crate::image::new_image_filename;
use crate::model::Defect;
use std::collections::HashMap;

/// In-memory storage for testing and development.
/// Does NOT persist data.
#[derive(Default)]
pub struct InMemoryStore {
    saved: Option<Vec<Defect>>,
    images: HashMap<String, Vec<u8>>,
    corrupt: bool,
    fail_saves: bool,
    fail_image_writes: bool,
    save_count: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds `defects`, as if read from a record file.
    pub fn with_defects(defects: Vec<Defect>) -> Self {
        Self {
            saved: Some(defects),
            ..Self::default()
        }
    }

    /// Store whose record "file" cannot be parsed.
    pub fn corrupt() -> Self {
        Self {
            corrupt: true,
            ..Self::default()
        }
    }

    /// Make every subsequent `save_defects` call fail.
    pub fn fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    /// Make every subsequent `write_image` call fail.
    pub fn fail_image_writes(&mut self, fail: bool) {
        self.fail_image_writes = fail;
    }

    /// What the last successful save wrote, if anything.
    pub fn saved(&self) -> Option<&[Defect]> {
        self.saved.as_deref()
    }

    pub fn save_count(&self) -> usize {
        self.save_count
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

impl DataStore for InMemoryStore {
    fn location(&self) -> String {
        "memory".to_string()
    }

    fn load_defects(&mut self) -> Result<LoadOutcome> {
        if self.corrupt {
            return Err(DefectError::Store("record data is corrupt".to_string()));
        }
        match &self.saved {
            Some(defects) => Ok(LoadOutcome::Loaded(defects.clone())),
            None => {
                self.saved = Some(Vec::new());
                Ok(LoadOutcome::Created)
            }
        }
    }

    fn save_defects(&mut self, defects: &[Defect]) -> Result<()> {
        if self.fail_saves {
            return Err(DefectError::Store("simulated save failure".to_string()));
        }
        self.saved = Some(defects.to_vec());
        self.save_count += 1;
        Ok(())
    }

    fn quarantine_defects(&mut self) -> Result<String> {
        self.corrupt = false;
        self.saved = None;
        Ok("memory".to_string())
    }

    fn write_image(&mut self, bytes: &[u8]) -> Result<String> {
        if self.fail_image_writes {
            return Err(DefectError::Store("simulated image write failure".to_string()));
        }
        let filename = new_image_filename();
        self.images.insert(filename.clone(), bytes.to_vec());
        Ok(filename)
    }

    fn read_image(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.images.get(filename).cloned())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use crate::model::NewDefect;

    /// 1x1 transparent PNG.
    pub const PIXEL_PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    pub fn pixel_data_url() -> String {
        format!("data:image/png;base64,{}", PIXEL_PNG_B64)
    }

    /// A complete, valid create request.
    pub fn crack_report() -> NewDefect {
        NewDefect {
            defect_id: None,
            image_url: Some(pixel_data_url()),
            defect_type: Some("Crack".to_string()),
            severity: Some("High".to_string()),
            location: Some("Beam 3".to_string()),
            description: Some("Visible crack".to_string()),
            status: None,
            reported_by: None,
            assigned_to: None,
        }
    }

    pub fn crack_report_with_id(id: &str) -> NewDefect {
        NewDefect {
            defect_id: Some(id.to_string()),
            ..crack_report()
        }
    }
}
