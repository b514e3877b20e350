use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Format of `last_update` in the persisted config.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SyncConfig {
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,

    /// Keys this tool does not know about, kept so a rewrite loses nothing.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One upstream repository and the files tracked in it.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RepositoryConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_paths: Option<Vec<String>>,

    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RepositoryConfig {
    pub fn new(repo_url: &str, file_paths: &[&str]) -> Self {
        Self {
            repo_url: Some(repo_url.to_string()),
            file_paths: Some(file_paths.iter().map(|p| p.to_string()).collect()),
            ..Default::default()
        }
    }
}

pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// `Option<DateTime<Utc>>` as a `YYYY-MM-DDTHH:MM:SSZ` string; null and "" both read as unset.
mod timestamp {
    use super::{format_timestamp, parse_timestamp, TIMESTAMP_FORMAT};
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(t) => s.serialize_str(&format_timestamp(t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse_timestamp(s).map(Some).ok_or_else(|| {
                D::Error::custom(format!(
                    "last_update \"{s}\" does not match {TIMESTAMP_FORMAT}"
                ))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn last_update_round_trips_in_fixed_format() {
        let json = r#"{"repo_url":"iDvel/rime-ice","file_paths":["en_dicts/en.dict.yaml"],"last_update":"2024-05-01T10:20:30Z"}"#;
        let repo: RepositoryConfig = serde_json::from_str(json).unwrap();

        assert_eq!(
            repo.last_update,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap())
        );
        let back = serde_json::to_string(&repo).unwrap();
        assert!(back.contains("\"last_update\":\"2024-05-01T10:20:30Z\""));
    }

    #[test]
    fn empty_or_null_last_update_is_unset() {
        let a: RepositoryConfig = serde_json::from_str(r#"{"last_update":""}"#).unwrap();
        let b: RepositoryConfig = serde_json::from_str(r#"{"last_update":null}"#).unwrap();
        let c: RepositoryConfig = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(a.last_update, None);
        assert_eq!(b.last_update, None);
        assert_eq!(c.last_update, None);
    }

    #[test]
    fn malformed_last_update_is_rejected() {
        let r = serde_json::from_str::<RepositoryConfig>(r#"{"last_update":"yesterday"}"#);
        assert!(r.is_err());
    }

    #[test]
    fn unknown_keys_survive_a_rewrite() {
        let json = r#"{"repositories":[{"repo_url":"a/b","file_paths":[],"note":"keep"}],"comment":"x"}"#;
        let cfg: SyncConfig = serde_json::from_str(json).unwrap();
        let out = serde_json::to_value(&cfg).unwrap();

        assert_eq!(out["comment"], "x");
        assert_eq!(out["repositories"][0]["note"], "keep");
    }
}
