//! JSON decoding with path context for WebDriver responses.

use anyhow::Result;

/// Deserialize, and on failure report the serde path that diverged so
/// protocol mismatches are diagnosable from the log line alone.
pub fn decode_with_path<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    match serde_path_to_error::deserialize(value) {
        Ok(decoded) => Ok(decoded),
        Err(err) => {
            let path = err.path().to_string();
            let inner = err.into_inner();
            if path.is_empty() || path == "." {
                Err(anyhow::anyhow!("{inner}"))
            } else {
                Err(anyhow::anyhow!("at path '{path}': {inner}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Session {
        #[serde(rename = "sessionId")]
        session_id: String,
    }

    #[test]
    fn decodes_valid_value() {
        let session: Session = decode_with_path(json!({"sessionId": "abc"})).unwrap();
        assert_eq!(session.session_id, "abc");
    }

    #[test]
    fn error_names_the_failing_path() {
        let err = decode_with_path::<Session>(json!({"sessionId": 42})).unwrap_err();
        assert!(err.to_string().contains("sessionId"));
    }
}
