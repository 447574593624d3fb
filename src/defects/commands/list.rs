use crate::collection::DefectCollection;
use crate::model::Defect;
use crate::store::DataStore;

/// Every record in insertion order, image references rewritten for retrieval.
pub fn run<S: DataStore>(collection: &DefectCollection<S>, image_route: &str) -> Vec<Defect> {
    collection
        .records()
        .iter()
        .map(|defect| defect.with_image_route(image_route))
        .collect()
}
