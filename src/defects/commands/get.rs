use crate::collection::DefectCollection;
use crate::error::{DefectError, Result};
use crate::model::Defect;
use crate::store::DataStore;

pub fn run<S: DataStore>(
    collection: &DefectCollection<S>,
    image_route: &str,
    id: &str,
) -> Result<Defect> {
    collection
        .get(id)
        .map(|defect| defect.with_image_route(image_route))
        .ok_or_else(|| DefectError::DefectNotFound(id.to_string()))
}
