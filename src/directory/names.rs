use serde::{Deserialize, Deserializer, Serialize};

/// Shown when a venue has no usable name.
pub const UNKNOWN_RESTAURANT: &str = "Unknown Restaurant";

/// One `(language tag, display name)` pair from the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedName {
    pub lang: String,
    pub value: String,
}

impl LocalizedName {
    /// Convenience constructor, mostly for tests and fakes.
    pub fn new(lang: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            value: value.into(),
        }
    }
}

/// Two-level language priority for picking a display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePreference {
    pub primary: String,
    pub fallback: String,
}

impl LanguagePreference {
    pub fn new(primary: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            fallback: fallback.into(),
        }
    }

    /// Primary language, then fallback, then the first entry, then
    /// [`UNKNOWN_RESTAURANT`].
    pub fn resolve(&self, names: &[LocalizedName]) -> String {
        names
            .iter()
            .find(|n| n.lang == self.primary)
            .or_else(|| names.iter().find(|n| n.lang == self.fallback))
            .or_else(|| names.first())
            .map(|n| n.value.clone())
            .unwrap_or_else(|| UNKNOWN_RESTAURANT.to_string())
    }
}

/// Reads a `name` field that should be a list of `{lang, value}` objects.
/// Anything else, including individual malformed entries, is dropped rather
/// than failing the whole response.
pub(crate) fn lenient_names<'de, D>(deserializer: D) -> Result<Vec<LocalizedName>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.map(names_from_value).unwrap_or_default())
}

fn names_from_value(value: serde_json::Value) -> Vec<LocalizedName> {
    let serde_json::Value::Array(entries) = value else {
        return Vec::new();
    };

    entries
        .into_iter()
        .filter_map(|entry| {
            let lang = entry.get("lang")?.as_str()?;
            let value = entry.get("value")?.as_str()?;
            if value.trim().is_empty() {
                return None;
            }
            Some(LocalizedName::new(lang, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pref() -> LanguagePreference {
        LanguagePreference::new("he", "en")
    }

    #[test]
    fn test_fallback_language_wins_over_first_entry() {
        let names = vec![LocalizedName::new("fr", "X"), LocalizedName::new("en", "Y")];
        assert_eq!(pref().resolve(&names), "Y");
    }

    #[test]
    fn test_primary_language_wins() {
        let names = vec![
            LocalizedName::new("en", "Pizza Place"),
            LocalizedName::new("he", "פיצה"),
        ];
        assert_eq!(pref().resolve(&names), "פיצה");
    }

    #[test]
    fn test_first_entry_when_no_preferred_language() {
        let names = vec![LocalizedName::new("de", "Z")];
        assert_eq!(pref().resolve(&names), "Z");
    }

    #[test]
    fn test_placeholder_for_empty_list() {
        assert_eq!(pref().resolve(&[]), UNKNOWN_RESTAURANT);
    }

    #[test]
    fn test_malformed_entries_are_dropped() {
        let raw = serde_json::json!([
            {"lang": "en"},
            {"lang": 3, "value": "bad"},
            {"lang": "de", "value": ""},
            {"lang": "fi", "value": "Ok"}
        ]);
        assert_eq!(names_from_value(raw), vec![LocalizedName::new("fi", "Ok")]);
        assert!(names_from_value(serde_json::json!("not a list")).is_empty());
    }
}
