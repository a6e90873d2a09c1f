// API client module: a small blocking HTTP client for the two iLab
// endpoints this tool needs, the service request lookup by name and the
// attachment upload. Each call is a single request with no retry.

use crate::config::Config;
use crate::error::{AttachError, Result};
use crate::target::{Attachment, LookupResponse, ResolvedTarget, TargetSelector, UploadResult};
use reqwest::blocking::{multipart, Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use chrono::NaiveDate;
use reqwest::Url;
use std::path::Path;
use tracing::{debug, info};

/// Multipart field carrying the file content.
const FILE_FIELD: &str = "attachment[uploaded_data]";
/// Multipart field carrying the caption. The iLab UI shows it as the note
/// under the file.
const CAPTION_FIELD: &str = "attachment[name]";

/// Blocking client bound to one API base URL and one bearer token.
pub struct ApiClient {
    client: Client,
    api_base: Url,
    from_date: NaiveDate,
}

impl ApiClient {
    /// Build a client whose every request carries the configured token.
    pub fn new(config: &Config, from_date: NaiveDate) -> Result<Self> {
        let client = Client::builder()
            .default_headers(auth_headers(config)?)
            .build()?;
        Ok(ApiClient {
            client,
            api_base: config.api_base.clone(),
            from_date,
        })
    }

    /// Turn a `TargetSelector` into a request id. Numeric ids are returned as-is
    /// without touching the network; names are looked up within their core.
    pub fn resolve_target(&self, selector: &TargetSelector) -> Result<ResolvedTarget> {
        match selector {
            TargetSelector::Numeric(id) => ResolvedTarget::new(*id),
            TargetSelector::Named { name, core_id } => {
                let target = self.find_by_name(name, core_id)?;
                info!(name = %name, core_id = %core_id, request_id = target.request_id(), "resolved service request");
                Ok(target)
            }
        }
    }

    fn find_by_name(&self, name: &str, core_id: &str) -> Result<ResolvedTarget> {
        let mut url = self.endpoint_in_segments(&["cores", core_id, "service_requests.json"])?;
        url.query_pairs_mut()
            .append_pair("name", name)
            .append_pair("from_date", &self.from_date.format("%Y-%m-%d").to_string());

        debug!(%url, "looking up service request by name");
        let res = self.client.get(url).send()?;
        let body = check_status(res)?;

        let lookup: LookupResponse = serde_json::from_str(&body)
            .map_err(|e| AttachError::InvalidResponse(format!("service request lookup: {e}")))?;
        let ids = lookup.matching_ids(name);
        match ids.as_slice() {
            [] => Err(AttachError::NotFound {
                name: name.to_string(),
                core_id: core_id.to_string(),
            }),
            [id] => ResolvedTarget::new(*id).map_err(|_| {
                AttachError::InvalidResponse(format!("service request '{name}' has id 0"))
            }),
            _ => Err(AttachError::AmbiguousRequest {
                name: name.to_string(),
                core_id: core_id.to_string(),
                ids,
            }),
        }
    }

    /// Read `file_path` and attach it to the target request under `caption`.
    pub fn upload_attachment(
        &self,
        target: &ResolvedTarget,
        file_path: &Path,
        caption: &str,
    ) -> Result<UploadResult> {
        let attachment = Attachment::load(file_path)?;
        self.send_attachment(target, attachment, caption)
    }

    /// POST an already loaded file as multipart/form-data. The file bytes
    /// move into the request body.
    pub fn send_attachment(
        &self,
        target: &ResolvedTarget,
        attachment: Attachment,
        caption: &str,
    ) -> Result<UploadResult> {
        let mut url = self.endpoint("attachments")?;
        url.query_pairs_mut()
            .append_pair("object_class", "ServiceItem")
            .append_pair("id", &target.request_id().to_string());

        debug!(%url, bytes = attachment.bytes.len(), file = %attachment.path.display(), "uploading attachment");
        let part = multipart::Part::bytes(attachment.bytes).file_name(attachment.file_name);
        let form = multipart::Form::new()
            .text(CAPTION_FIELD, caption.to_string())
            .part(FILE_FIELD, part);

        let res = self.client.post(url).multipart(form).send()?;
        let http_status = res.status().as_u16();
        let message = check_status(res)?;

        Ok(UploadResult {
            success: true,
            http_status,
            body: serde_json::from_str(&message).ok(),
            message,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_base
            .join(path)
            .map_err(|e| AttachError::Configuration(format!("cannot build URL for '{path}': {e}")))
    }

    /// Append `segments` to the base path. Each segment is percent-encoded,
    /// so `/`, `?` or `#` inside one cannot change the request target.
    fn endpoint_in_segments(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AttachError::Configuration(format!("API base URL '{}' cannot take a path", self.api_base))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Authorization header for every request. Marked sensitive so it is kept
/// out of reqwest's own debug output.
fn auth_headers(config: &Config) -> Result<HeaderMap> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", config.token.expose()))
        .map_err(|_| {
            AttachError::Configuration("API token contains characters not allowed in a header".into())
        })?;
    value.set_sensitive(true);
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

/// Return the body of a 2xx response, or classify the failure.
fn check_status(res: Response) -> Result<String> {
    let status = res.status();
    debug!(status = status.as_u16(), headers = ?res.headers(), "response received");
    if status.is_success() {
        return Ok(res.text()?);
    }
    // The status already says what went wrong; the body is only detail.
    let body = res.text().unwrap_or_default();
    match status.as_u16() {
        code @ (401 | 403) => Err(AttachError::Auth { status: code, body }),
        code => Err(AttachError::Api { status: code, body }),
    }
}
