use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::store::Row;

pub const DEFAULT_SITE_NAME: &str = "Sentinel Intelligence Group";

/// Site-wide settings as the layout consumes them. Missing keys fall back to defaults; keys
/// without a typed slot are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteSettings {
    pub site_name: String,
    pub tagline: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: String,
    pub social_links: Value,
    pub extra: Map<String, Value>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: DEFAULT_SITE_NAME.to_string(),
            tagline: "Intelligence-led security for a complex world".to_string(),
            contact_email: "info@sentinelintel.com".to_string(),
            contact_phone: String::new(),
            address: String::new(),
            social_links: json!({}),
            extra: Map::new(),
        }
    }
}

impl SiteSettings {
    /// Builds settings from `site_settings` rows (`key` and JSON `value`).
    pub fn from_rows(rows: &[Row]) -> Self {
        let mut settings = Self::default();
        for row in rows {
            let Some(key) = row.get("key").and_then(Value::as_str) else { continue };
            let value = row.get("value").cloned().unwrap_or(Value::Null);
            settings.apply(key, value);
        }
        settings
    }

    fn apply(&mut self, key: &str, value: Value) {
        let slot = match key {
            "site_name" => &mut self.site_name,
            "tagline" => &mut self.tagline,
            "contact_email" => &mut self.contact_email,
            "contact_phone" => &mut self.contact_phone,
            "address" => &mut self.address,
            "social_links" => {
                if value.is_object() {
                    self.social_links = value;
                }
                return;
            }
            _ => {
                self.extra.insert(key.to_string(), value);
                return;
            }
        };
        // Null or non-string values keep the default.
        if let Some(text) = value.as_str().filter(|s| !s.trim().is_empty()) {
            *slot = text.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setting(key: &str, value: Value) -> Row {
        json!({ "key": key, "value": value }).as_object().cloned().unwrap()
    }

    #[test]
    fn missing_keys_use_defaults() {
        let settings = SiteSettings::from_rows(&[]);
        assert_eq!(settings.site_name, DEFAULT_SITE_NAME);
        assert_eq!(settings.social_links, json!({}));
    }

    #[test]
    fn stored_values_override_and_extras_are_kept() {
        let rows = vec![
            setting("site_name", json!("Acme Intel")),
            setting("tagline", Value::Null),
            setting("social_links", json!({ "linkedin": "https://linkedin.com/acme" })),
            setting("hero_video", json!({ "url": "/media/hero.mp4" })),
        ];
        let settings = SiteSettings::from_rows(&rows);
        assert_eq!(settings.site_name, "Acme Intel");
        assert_eq!(settings.tagline, SiteSettings::default().tagline);
        assert_eq!(settings.social_links["linkedin"], json!("https://linkedin.com/acme"));
        assert_eq!(settings.extra["hero_video"]["url"], json!("/media/hero.mp4"));
    }
}
