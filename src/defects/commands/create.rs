use crate::collection::DefectCollection;
use crate::config::ValidationConfig;
use crate::error::{DefectError, Result};
use crate::image::decode_data_url;
use crate::model::{filled, generate_defect_id, Defect, NewDefect, DEFAULT_REPORTER, DEFAULT_STATUS};
use crate::store::DataStore;
use chrono::{DateTime, Duration, Utc};

/// Validate a submission, store its image and append the new record.
///
/// The returned record carries the bare image filename. Nothing is written
/// unless every check passes; once the image is on disk it stays there even
/// if saving the record file fails afterwards.
pub fn run<S: DataStore>(
    collection: &mut DefectCollection<S>,
    validation: &ValidationConfig,
    input: NewDefect,
) -> Result<Defect> {
    let (Some(defect_type), Some(severity), Some(location), Some(description)) = (
        filled(&input.defect_type),
        filled(&input.severity),
        filled(&input.location),
        filled(&input.description),
    ) else {
        tracing::warn!("missing required fields in defect submission");
        return Err(DefectError::MissingFields);
    };

    let image = decode_data_url(input.image_url.as_deref().unwrap_or_default()).map_err(|e| {
        tracing::warn!(reason = %e, "invalid or missing image data");
        DefectError::InvalidImage(e.to_string())
    })?;
    tracing::debug!(subtype = %image.subtype, bytes = image.bytes.len(), "decoded image payload");

    validation.check_severity(severity)?;
    let status = match filled(&input.status) {
        Some(status) => {
            validation.check_status(status)?;
            status
        }
        None => DEFAULT_STATUS,
    };

    let now = Utc::now();
    let defect_id = match filled(&input.defect_id) {
        Some(id) if collection.contains(id) => {
            tracing::warn!(id, "rejected duplicate defect id");
            return Err(DefectError::DuplicateId(id.to_string()));
        }
        Some(id) => id.to_string(),
        None => unused_generated_id(collection, now),
    };

    let image_file = collection.write_image(&image.bytes).map_err(|e| {
        tracing::error!(error = %e, "failed to save image");
        DefectError::Store(format!("failed to save image: {}", e))
    })?;

    let defect = Defect {
        defect_id,
        timestamp: now,
        image_url: image_file,
        defect_type: defect_type.to_string(),
        severity: severity.to_string(),
        location: location.to_string(),
        description: description.to_string(),
        status: status.to_string(),
        reported_by: filled(&input.reported_by)
            .unwrap_or(DEFAULT_REPORTER)
            .to_string(),
        assigned_to: filled(&input.assigned_to).map(str::to_string),
    };

    collection.push(defect.clone());
    collection
        .save_all()
        .map_err(|e| DefectError::Store(format!("failed to save defect data: {}", e)))?;

    tracing::info!(id = %defect.defect_id, image = %defect.image_url, "defect created");
    Ok(defect)
}

// Two submissions in the same millisecond would otherwise collide.
fn unused_generated_id<S: DataStore>(collection: &DefectCollection<S>, now: DateTime<Utc>) -> String {
    let mut at = now;
    loop {
        let id = generate_defect_id(at);
        if !collection.contains(&id) {
            return id;
        }
        at += Duration::milliseconds(1);
    }
}
