use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::Deref;

/// Placeholder for an unresolved release date, name or platform list.
pub const UNKNOWN: &str = "unknown";
/// Placeholder for a game without a locatable score.
pub const UNRATED: &str = "unrated";
/// Placeholder for a game without a locatable cover image.
pub const NO_COVER: &str = "no-cover-found";

/// Values a model or page may use to mean "nothing here".
const PLACEHOLDERS: &[&str] = &["", "unknown", "未知", "unrated", "未评分", "n/a", "none", "null"];

pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    PLACEHOLDERS.contains(&value.as_str()) || value == NO_COVER
}

/// Ordered platform names without duplicates (case-sensitive).
///
/// Serializes as a JSON array, or as the string `"unknown"` when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Platforms(Vec<String>);

impl Platforms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name` unless it is blank or already present. Returns whether
    /// it was added.
    pub fn push(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() || self.0.iter().any(|p| p == name) {
            return false;
        }
        self.0.push(name.to_string());
        true
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Deref for Platforms {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> Extend<S> for Platforms {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for name in iter {
            self.push(name);
        }
    }
}

impl<S: Into<String>> FromIterator<S> for Platforms {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut platforms = Self::new();
        platforms.extend(iter);
        platforms
    }
}

impl Serialize for Platforms {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_empty() {
            serializer.serialize_str(UNKNOWN)
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Platforms {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Many(Vec<Option<String>>),
            One(String),
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            None => Self::new(),
            Some(Raw::Many(names)) => names
                .into_iter()
                .flatten()
                .filter(|n| !is_placeholder(n))
                .collect(),
            Some(Raw::One(joined)) if is_placeholder(&joined) => Self::new(),
            Some(Raw::One(joined)) => joined.split([',', '、']).collect(),
        })
    }
}

/// The final metadata record. Every field is always present; unresolved
/// fields hold a sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub english_name: String,
    pub cover_image: String,
    pub platforms: Platforms,
    pub release_date: String,
    pub score: String,
    #[serde(rename = "url")]
    pub detail_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chinese_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_name: Option<String>,
}

impl GameRecord {
    /// Attach the original query and the name it was resolved to.
    pub fn with_names(mut self, chinese_name: &str, translated_name: &str) -> Self {
        self.chinese_name = Some(chinese_name.to_string());
        self.translated_name = Some(translated_name.to_string());
        self
    }
}

/// What one extraction strategy managed to find.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialRecord {
    pub english_name: Option<String>,
    pub cover_image: Option<String>,
    pub platforms: Platforms,
    pub release_date: Option<String>,
    pub score: Option<String>,
}

impl PartialRecord {
    /// Complete the record, substituting sentinels for missing fields.
    pub fn into_record(self, detail_ref: &str) -> GameRecord {
        fn or_sentinel(value: Option<String>, sentinel: &str) -> String {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !is_placeholder(v))
                .unwrap_or_else(|| sentinel.to_string())
        }

        GameRecord {
            english_name: or_sentinel(self.english_name, UNKNOWN),
            cover_image: or_sentinel(self.cover_image, NO_COVER),
            platforms: self.platforms,
            release_date: or_sentinel(self.release_date, UNKNOWN),
            score: or_sentinel(self.score, UNRATED),
            detail_url: detail_ref.to_string(),
            chinese_name: None,
            translated_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn platforms_dedup_case_sensitively() {
        let platforms: Platforms = ["PC", "pc", "PC", " Xbox One ", ""].into_iter().collect();
        assert_eq!(platforms.as_slice(), ["PC", "pc", "Xbox One"]);
    }

    #[test]
    fn empty_platforms_serialize_as_unknown() {
        assert_eq!(serde_json::to_value(Platforms::new()).unwrap(), json!("unknown"));
        let platforms = Platforms::from_iter(["PC"]);
        assert_eq!(serde_json::to_value(platforms).unwrap(), json!(["PC"]));
    }

    #[test]
    fn platforms_accept_list_or_string() {
        let from_list: Platforms = serde_json::from_value(json!(["PC", null, "PC", "Switch"])).unwrap();
        assert_eq!(from_list.as_slice(), ["PC", "Switch"]);

        let from_string: Platforms = serde_json::from_value(json!("PC, PlayStation 4")).unwrap();
        assert_eq!(from_string.as_slice(), ["PC", "PlayStation 4"]);

        let unknown: Platforms = serde_json::from_value(json!("未知")).unwrap();
        assert!(unknown.is_empty());
    }

    #[test]
    fn empty_partial_record_is_all_sentinels() {
        let record = PartialRecord::default().into_record("https://www.ign.com/games/x");
        assert_eq!(record.english_name, UNKNOWN);
        assert_eq!(record.cover_image, NO_COVER);
        assert!(record.platforms.is_empty());
        assert_eq!(record.release_date, UNKNOWN);
        assert_eq!(record.score, UNRATED);
        assert_eq!(record.detail_url, "https://www.ign.com/games/x");

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "english_name": "unknown",
                "cover_image": "no-cover-found",
                "platforms": "unknown",
                "release_date": "unknown",
                "score": "unrated",
                "url": "https://www.ign.com/games/x"
            })
        );
    }

    #[test]
    fn placeholder_values_become_sentinels() {
        let record = PartialRecord {
            score: Some("未评分".to_string()),
            release_date: Some("  ".to_string()),
            ..Default::default()
        }
        .into_record("ref");
        assert_eq!(record.score, UNRATED);
        assert_eq!(record.release_date, UNKNOWN);
    }

    #[test]
    fn names_are_serialized_once_attached() {
        let record = PartialRecord {
            english_name: Some("Titanfall 2".to_string()),
            ..Default::default()
        }
        .into_record("ref")
        .with_names("泰坦陨落2", "Titanfall 2");

        let text = serde_json::to_string(&record).unwrap();
        assert!(text.contains(r#""chinese_name":"泰坦陨落2""#));
        assert!(text.contains(r#""translated_name":"Titanfall 2""#));
    }
}
