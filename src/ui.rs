// UI layer: runs the single upload flow and reports the outcome. The order
// of steps matters: configuration and the local file are checked before
// the first request goes out.

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::Result;
use crate::target::{Attachment, ResolvedTarget, TargetSelector, UploadRequest, UploadResult};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Execute one upload. `config` is built by the caller so that a missing
/// token fails before this is reached.
pub fn run(config: &Config, request: &UploadRequest) -> Result<()> {
    let attachment = Attachment::load(&request.file_path)?;
    let api = ApiClient::new(config, request.from_date)?;

    let target = api.resolve_target(&request.target)?;
    if let (true, TargetSelector::Named { name, .. }) = (request.verbose, &request.target) {
        println!("iLab ID for {name}: {}", target.request_id());
    }

    let spinner = (!request.verbose).then(|| uploading_spinner(&attachment));
    let file_path = attachment.path.clone();
    let outcome = api.send_attachment(&target, attachment, &request.attachment_name);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    report(request, &file_path, &target, &outcome?);
    Ok(())
}

/// Spinner on stderr while the upload runs. indicatif hides it when stderr
/// is not a terminal.
fn uploading_spinner(attachment: &Attachment) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(format!("Uploading {}...", attachment.file_name));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn report(
    request: &UploadRequest,
    file_path: &Path,
    target: &ResolvedTarget,
    result: &UploadResult,
) {
    if request.verbose {
        match &result.body {
            Some(json) => println!(
                "{}",
                serde_json::to_string_pretty(json).unwrap_or_else(|_| result.message.clone())
            ),
            None => println!("HTTP {} {}", result.http_status, result.message),
        }
        return;
    }
    let shown = std::fs::canonicalize(file_path).unwrap_or_else(|_| file_path.to_path_buf());
    println!(
        "{} uploaded to iLab request {}.",
        shown.display(),
        target.request_id()
    );
}
