use serde::{Deserialize, Deserializer};

use crate::api_error::ApiError;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Text(String),
}

/// Accepts an id sent either as a JSON number or as a numeric string.
/// `null` and blank strings read as absent.
pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Int(id)) => Ok(Some(id)),
        Some(RawId::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(RawId::Text(s)) => match s.trim().parse::<i64>() {
            Ok(id) => Ok(Some(id)),
            Err(e) => Err(serde::de::Error::custom(e.to_string())),
        },
    }
}

/// Same rules as [`optional_id`] for a raw query-string value.
pub fn parse_id(raw: Option<&str>, field: &str) -> Result<Option<i64>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("{field} must be an integer"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "optional_id")]
        id: Option<i64>,
    }

    fn id_of(json: &str) -> Option<i64> {
        serde_json::from_str::<Form>(json).unwrap().id
    }

    #[test]
    fn id_from_number_or_string() {
        assert_eq!(id_of(r#"{"id": 7}"#), Some(7));
        assert_eq!(id_of(r#"{"id": " 42 "}"#), Some(42));
        assert_eq!(id_of(r#"{"id": ""}"#), None);
        assert_eq!(id_of(r#"{"id": null}"#), None);
        assert_eq!(id_of("{}"), None);
    }

    #[test]
    fn non_numeric_id_is_rejected() {
        assert!(serde_json::from_str::<Form>(r#"{"id": "abc"}"#).is_err());
        assert!(parse_id(Some("abc"), "user_id").is_err());
        assert_eq!(parse_id(Some("12"), "user_id").unwrap(), Some(12));
        assert_eq!(parse_id(None, "user_id").unwrap(), None);
    }
}
