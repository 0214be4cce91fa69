//! Record fields straight from a catalog object.

use crate::catalog::CatalogObject;
use crate::extractor::model::PartialRecord;

pub fn from_object(object: &CatalogObject) -> PartialRecord {
    PartialRecord {
        english_name: object.name().map(str::to_string),
        cover_image: object.cover_image().map(str::to_string),
        platforms: object.platforms(),
        release_date: object.first_release_date().map(str::to_string),
        score: object.review_score(),
    }
}
