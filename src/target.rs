// Data shapes for one upload: how the user identified the service request,
// the id it resolved to, the file being attached and the outcome.

use crate::error::{AttachError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Lookup window start used when none is given. The API itself defaults to
/// the last two years, which misses older requests.
pub const DEFAULT_FROM_DATE: &str = "2000-01-01";

/// The two mutually exclusive ways of naming a service request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetSelector {
    Numeric(u64),
    Named { name: String, core_id: String },
}

/// A service request id known to be usable in an upload URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedTarget {
    request_id: u64,
}

impl ResolvedTarget {
    pub fn new(request_id: u64) -> Result<Self> {
        if request_id == 0 {
            return Err(AttachError::Argument(
                "service request id must be a positive integer".into(),
            ));
        }
        Ok(ResolvedTarget { request_id })
    }

    pub fn request_id(&self) -> u64 {
        self.request_id
    }
}

/// Everything the CLI collected for a single invocation.
#[derive(Clone, Debug)]
pub struct UploadRequest {
    pub target: TargetSelector,
    pub file_path: PathBuf,
    pub attachment_name: String,
    pub verbose: bool,
    pub from_date: NaiveDate,
}

/// Outcome of a successful upload call.
#[derive(Clone, Debug)]
pub struct UploadResult {
    pub success: bool,
    pub http_status: u16,
    pub message: String,
    /// Parsed response body when the API answered with JSON.
    pub body: Option<serde_json::Value>,
}

/// A local file read fully into memory, ready to become a multipart part.
#[derive(Clone, Debug)]
pub struct Attachment {
    pub path: PathBuf,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Read the whole file. The handle is closed before this returns, on
    /// success and on error.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| AttachError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("attachment")
            .to_string();
        Ok(Attachment {
            path: path.to_path_buf(),
            file_name,
            bytes,
        })
    }
}

/// Response of `cores/{core_id}/service_requests.json`.
#[derive(Deserialize, Debug)]
pub(crate) struct LookupResponse {
    pub ilab_response: LookupBody,
}

#[derive(Deserialize, Debug)]
pub(crate) struct LookupBody {
    #[serde(default)]
    pub service_requests: Vec<ServiceRequestSummary>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ServiceRequestSummary {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
}

impl LookupResponse {
    /// Ids of the requests whose name is exactly `name`. Entries that carry
    /// no name are trusted to match, since the API filtered on it.
    pub fn matching_ids(&self, name: &str) -> Vec<u64> {
        self.ilab_response
            .service_requests
            .iter()
            .filter(|sr| sr.name.as_deref().map_or(true, |n| n == name))
            .map(|sr| sr.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn zero_is_not_a_valid_request_id() {
        assert!(matches!(
            ResolvedTarget::new(0),
            Err(AttachError::Argument(_))
        ));
        assert_eq!(ResolvedTarget::new(123456).unwrap().request_id(), 123456);
    }

    #[test]
    fn load_reads_full_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"line one\nline two\n").unwrap();

        let attachment = Attachment::load(file.path()).unwrap();
        assert_eq!(attachment.bytes, b"line one\nline two\n");
        assert_eq!(
            attachment.file_name,
            file.path().file_name().unwrap().to_str().unwrap()
        );
    }

    #[test]
    fn load_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");

        match Attachment::load(&missing) {
            Err(AttachError::FileNotFound { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn lookup_filters_loose_name_matches() {
        let response: LookupResponse = serde_json::from_str(
            r#"{"ilab_response": {"service_requests": [
                {"id": 11, "name": "123-JRG"},
                {"id": 12, "name": "123-JRG-2"},
                {"id": 13}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(response.matching_ids("123-JRG"), vec![11, 13]);
    }

    #[test]
    fn lookup_without_request_list_is_empty() {
        let response: LookupResponse =
            serde_json::from_str(r#"{"ilab_response": {}}"#).unwrap();
        assert!(response.matching_ids("anything").is_empty());
    }
}
