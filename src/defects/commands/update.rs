use crate::collection::DefectCollection;
use crate::config::ValidationConfig;
use crate::error::{DefectError, Result};
use crate::model::{filled, Defect, DefectPatch};
use crate::store::DataStore;

/// Merge `patch` into the record `id` and persist.
///
/// Text fields keep their stored value when the patch leaves them empty.
/// `assigned_to` is the exception: it is always replaced, so omitting it
/// unassigns the defect.
pub fn run<S: DataStore>(
    collection: &mut DefectCollection<S>,
    validation: &ValidationConfig,
    image_route: &str,
    id: &str,
    patch: DefectPatch,
) -> Result<Defect> {
    if !collection.contains(id) {
        return Err(DefectError::DefectNotFound(id.to_string()));
    }
    if let Some(severity) = filled(&patch.severity) {
        validation.check_severity(severity)?;
    }
    if let Some(status) = filled(&patch.status) {
        validation.check_status(status)?;
    }

    let defect = collection
        .get_mut(id)
        .ok_or_else(|| DefectError::DefectNotFound(id.to_string()))?;
    apply(defect, patch);
    let updated = defect.with_image_route(image_route);

    collection
        .save_all()
        .map_err(|e| DefectError::Store(format!("failed to update defect: {}", e)))?;

    tracing::info!(id, status = %updated.status, "defect updated");
    Ok(updated)
}

fn apply(defect: &mut Defect, patch: DefectPatch) {
    merge(&mut defect.defect_type, patch.defect_type);
    merge(&mut defect.severity, patch.severity);
    merge(&mut defect.location, patch.location);
    merge(&mut defect.description, patch.description);
    merge(&mut defect.status, patch.status);
    defect.assigned_to = patch.assigned_to;
}

fn merge(field: &mut String, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        *field = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{create, get};
    use crate::config::OnCorrupt;
    use crate::model::NewDefect;
    use crate::store::memory::fixtures::crack_report_with_id;
    use crate::store::memory::InMemoryStore;

    const ROUTE: &str = "/api/images";

    fn collection() -> (DefectCollection<InMemoryStore>, Defect) {
        let mut collection = DefectCollection::load(InMemoryStore::new(), OnCorrupt::Fail).unwrap();
        let input = NewDefect {
            assigned_to: Some("Crew B".into()),
            ..crack_report_with_id("D-1")
        };
        let created = create::run(&mut collection, &ValidationConfig::default(), input).unwrap();
        (collection, created)
    }

    #[test]
    fn status_only_patch_changes_status_and_clears_assignee() {
        let (mut collection, created) = collection();
        let patch = DefectPatch {
            status: Some("Resolved".into()),
            ..DefectPatch::default()
        };
        let updated = run(&mut collection, &ValidationConfig::default(), ROUTE, "D-1", patch).unwrap();

        assert_eq!(updated.status, "Resolved");
        assert_eq!(updated.assigned_to, None);
        assert_eq!(updated.defect_type, created.defect_type);
        assert_eq!(updated.severity, created.severity);
        assert_eq!(updated.location, created.location);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.reported_by, created.reported_by);
        assert_eq!(updated.timestamp, created.timestamp);
        assert_eq!(updated.image_url, format!("{}/{}", ROUTE, created.image_url));

        let fetched = get::run(&collection, ROUTE, "D-1").unwrap();
        assert_eq!(fetched, updated);
    }

    #[test]
    fn assignee_is_replaced_verbatim() {
        let (mut collection, _) = collection();
        let patch = DefectPatch {
            assigned_to: Some("Crew C".into()),
            ..DefectPatch::default()
        };
        let updated = run(&mut collection, &ValidationConfig::default(), ROUTE, "D-1", patch).unwrap();
        assert_eq!(updated.assigned_to.as_deref(), Some("Crew C"));
    }

    #[test]
    fn empty_strings_keep_existing_values() {
        let (mut collection, created) = collection();
        let patch = DefectPatch {
            defect_type: Some(String::new()),
            description: Some(String::new()),
            location: Some("Beam 4".into()),
            ..DefectPatch::default()
        };
        let updated = run(&mut collection, &ValidationConfig::default(), ROUTE, "D-1", patch).unwrap();

        assert_eq!(updated.defect_type, created.defect_type);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.location, "Beam 4");
    }

    #[test]
    fn update_is_persisted() {
        let (mut collection, _) = collection();
        let patch = DefectPatch {
            severity: Some("Low".into()),
            ..DefectPatch::default()
        };
        run(&mut collection, &ValidationConfig::default(), ROUTE, "D-1", patch).unwrap();

        let saved = collection.store().saved().unwrap();
        assert_eq!(saved[0].severity, "Low");
        assert!(!saved[0].image_url.starts_with('/'));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let (mut collection, _) = collection();
        let err = run(
            &mut collection,
            &ValidationConfig::default(),
            ROUTE,
            "missing",
            DefectPatch::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DefectError::DefectNotFound(_)));
    }

    #[test]
    fn invalid_status_leaves_record_untouched() {
        let (mut collection, created) = collection();
        let validation = ValidationConfig {
            statuses: vec!["New".into(), "Resolved".into()],
            severities: vec![],
        };
        let patch = DefectPatch {
            status: Some("Bogus".into()),
            ..DefectPatch::default()
        };
        let err = run(&mut collection, &validation, ROUTE, "D-1", patch).unwrap_err();

        assert_eq!(err.status_code(), 400);
        assert_eq!(collection.get("D-1").unwrap(), &created);
    }

    #[test]
    fn save_failure_is_reported_but_change_stays_in_memory() {
        let (mut collection, _) = collection();
        collection.store_mut().fail_saves(true);
        let patch = DefectPatch {
            status: Some("Resolved".into()),
            ..DefectPatch::default()
        };
        let err = run(&mut collection, &ValidationConfig::default(), ROUTE, "D-1", patch).unwrap_err();

        assert_eq!(err.status_code(), 500);
        assert_eq!(collection.get("D-1").unwrap().status, "Resolved");
        assert_eq!(collection.store().saved().unwrap()[0].status, "New");
    }
}
