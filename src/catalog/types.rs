//! Response schemas for the catalog's GraphQL queries. Every field is
//! optional; the catalog drops fields freely and nulls are common.

use serde::{Deserialize, Deserializer};

use crate::extractor::model::Platforms;

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchData {
    pub search_objects_by_name: Option<SearchObjects>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchObjects {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub objects: Vec<CatalogObject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlugData {
    pub get_object_by_slug: Option<CatalogObject>,
}

/// A game object as returned by search and by slug lookup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogObject {
    pub url: Option<String>,
    pub slug: Option<String>,
    pub metadata: Option<ObjectMetadata>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub object_regions: Vec<ObjectRegion>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub promo_images: Vec<PromoImage>,
    pub review_object: Option<ReviewObject>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    pub names: Option<Names>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Names {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectRegion {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub releases: Vec<Release>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub date: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub platform_attributes: Vec<PlatformAttribute>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformAttribute {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromoImage {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewObject {
    pub score: Option<serde_json::Value>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl CatalogObject {
    pub fn name(&self) -> Option<&str> {
        non_empty(self.metadata.as_ref()?.names.as_ref()?.name.as_ref())
    }

    fn releases(&self) -> impl Iterator<Item = &Release> {
        self.object_regions.iter().flat_map(|r| r.releases.iter())
    }

    /// First non-empty release date across regions, in source order.
    pub fn first_release_date(&self) -> Option<&str> {
        self.releases().find_map(|r| non_empty(r.date.as_ref()))
    }

    /// Union of platform names across regional releases, first occurrence
    /// order, without duplicates.
    pub fn platforms(&self) -> Platforms {
        self.releases()
            .flat_map(|r| r.platform_attributes.iter())
            .filter_map(|p| non_empty(p.name.as_ref()))
            .collect()
    }

    /// Primary image, else the first promotional image with a URL.
    pub fn cover_image(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| non_empty(m.image_url.as_ref()))
            .or_else(|| self.promo_images.iter().find_map(|i| non_empty(i.url.as_ref())))
    }

    /// Review score rendered as text, if the object has been reviewed.
    pub fn review_score(&self) -> Option<String> {
        match self.review_object.as_ref()?.score.as_ref()? {
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    /// Absolute detail-page reference, built from the object's URL path or,
    /// failing that, its slug.
    pub fn detail_url(&self, site_url: &str) -> Option<String> {
        let site_url = site_url.trim_end_matches('/');
        if let Some(url) = non_empty(self.url.as_ref()) {
            return Some(if url.starts_with("http://") || url.starts_with("https://") {
                url.to_string()
            } else {
                format!("{site_url}/{}", url.trim_start_matches('/'))
            });
        }
        non_empty(self.slug.as_ref()).map(|slug| format!("{site_url}/games/{slug}"))
    }
}
