use std::collections::BTreeMap;

use serde_json::Value;

use super::kind::{ContentSpec, FieldType};
use super::ContentError;
use crate::store::Row;

/// Columns the store and the action layer own. Input may never set them.
pub const SYSTEM_FIELDS: &[&str] = &["id", "created_at", "updated_at", "created_by", "updated_by"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Full record: required fields must be present.
    Create,
    /// Partial update: only supplied fields are checked.
    Patch,
}

/// Checks `input` against the descriptor and returns the accepted columns. Nothing here touches
/// the store.
pub fn validate_fields(spec: &ContentSpec, input: &Row, mode: Mode) -> Result<Row, ContentError> {
    let mut errors = BTreeMap::new();
    let mut accepted = Row::new();

    for (name, value) in input {
        if SYSTEM_FIELDS.contains(&name.as_str()) {
            errors.insert(name.clone(), format!("{} is managed by the system", name));
            continue;
        }
        let Some(field) = spec.field(name) else {
            errors.insert(name.clone(), format!("Unknown field for {}", spec.route));
            continue;
        };
        if let Err(message) = check_type(field.ty, value) {
            errors.insert(name.clone(), message);
            continue;
        }
        if field.required && is_blank(value) {
            errors.insert(name.clone(), format!("{} is required", humanize(name)));
            continue;
        }
        accepted.insert(name.clone(), value.clone());
    }

    if spec.slug && mode == Mode::Patch {
        if let Some(value) = input.get("slug") {
            if is_blank(value) {
                accepted.remove("slug");
                errors.insert("slug".to_string(), "Slug cannot be empty".to_string());
            }
        }
    }

    if spec.slug {
        if let Some(Value::String(slug)) = accepted.get("slug") {
            if slugify(slug) != *slug {
                errors.insert(
                    "slug".to_string(),
                    "Slug may only contain lowercase letters, numbers and hyphens".to_string(),
                );
            }
        }
    }

    if mode == Mode::Create {
        for field in spec.fields.iter().filter(|f| f.required) {
            if !input.contains_key(field.name) && !errors.contains_key(field.name) {
                errors.insert(field.name.to_string(), format!("{} is required", humanize(field.name)));
            }
        }
    }

    if !errors.is_empty() {
        tracing::debug!("rejected {} input: {:?}", spec.route, errors);
        return Err(ContentError::fields(errors));
    }
    Ok(accepted)
}

fn check_type(ty: FieldType, value: &Value) -> Result<(), String> {
    if value.is_null() {
        return Ok(());
    }
    let ok = match ty {
        FieldType::Text => value.is_string(),
        FieldType::Bool => value.is_boolean(),
        FieldType::Int => value.is_i64(),
        FieldType::Timestamp => value
            .as_str()
            .map(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok())
            .unwrap_or(false),
        FieldType::JsonArray => value.is_array(),
        FieldType::JsonObject => value.is_object(),
        FieldType::Json => true,
    };
    if ok {
        Ok(())
    } else {
        Err(format!("Expected {}", ty.describe()))
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn humanize(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// URL slug from a title: lowercase ASCII alphanumerics joined by single hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}
