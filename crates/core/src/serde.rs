//! Serde helpers for HTML form submissions.

use serde::{Deserialize, Deserializer};

/// Deserialize an optional string, treating blank input as `None`.
///
/// Browsers submit empty text inputs as `name=`, which would otherwise land
/// as `Some("")`.
pub fn deserialize_blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "deserialize_blank_as_none")]
        name: Option<String>,
    }

    #[test]
    fn blank_values_become_none() {
        let form: Form = serde_json::from_str(r#"{"name": "   "}"#).unwrap();
        assert_eq!(form.name, None);
    }

    #[test]
    fn missing_values_become_none() {
        let form: Form = serde_json::from_str("{}").unwrap();
        assert_eq!(form.name, None);
    }

    #[test]
    fn values_are_kept_untrimmed() {
        let form: Form = serde_json::from_str(r#"{"name": "Ada Lovelace "}"#).unwrap();
        assert_eq!(form.name.as_deref(), Some("Ada Lovelace "));
    }
}
