// Command line surface.
//
// `Args` is parsed by `clap`; conflicting or incomplete identifier flags are
// rejected during parsing, before any configuration is read or any request
// is sent. `Args::into_request` then folds the optional flags into the
// tagged `TargetSelector` the rest of the crate works with.

use crate::config::{API_BASE_ENV, DEFAULT_API_BASE};
use crate::error::{AttachError, Result};
use crate::target::{TargetSelector, UploadRequest, DEFAULT_FROM_DATE};
use chrono::NaiveDate;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Add an attachment (file) to an iLab service request.
///
/// Requires the API bearer token in the ILAB_API_TOKEN environment variable.
#[derive(Parser, Debug)]
#[command(version, about)]
#[command(group(ArgGroup::new("target").required(true).args(["id", "name"])))]
pub struct Args {
    /// The internal iLab id of the service request.
    #[arg(short = 'i', long = "id", value_parser = clap::value_parser!(u64).range(1..))]
    pub id: Option<u64>,

    /// The iLab name of the service request. Needs --core-id.
    #[arg(long = "name", requires = "core_id")]
    pub name: Option<String>,

    /// Your iLab core id, used to look up a request by name.
    #[arg(
        short = 'c',
        long = "core-id",
        requires = "name",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub core_id: Option<u64>,

    /// Path of the file to attach.
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,

    /// Note shown under the attachment in the iLab UI.
    #[arg(short = 'n', long = "note")]
    pub note: String,

    /// Log each API call and print the full response.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Oldest request creation date (YYYY-MM-DD) searched by --name.
    #[arg(long = "from-date", default_value = DEFAULT_FROM_DATE, value_parser = parse_date)]
    pub from_date: NaiveDate,

    /// Base URL of the iLab API.
    #[arg(long = "api-base", env = API_BASE_ENV, default_value = DEFAULT_API_BASE)]
    pub api_base: String,
}

impl Args {
    /// Fold the identifier flags into a `TargetSelector` and expand `~/` in the
    /// file path.
    pub fn into_request(self) -> Result<UploadRequest> {
        let target = match (self.id, self.name, self.core_id) {
            (Some(_), Some(_), _) => {
                return Err(AttachError::Argument(
                    "--id and --name are mutually exclusive".into(),
                ))
            }
            (Some(id), None, _) => TargetSelector::Numeric(id),
            (None, Some(name), Some(core_id)) => {
                if name.trim().is_empty() {
                    return Err(AttachError::Argument("--name must not be empty".into()));
                }
                TargetSelector::Named {
                    name,
                    core_id: core_id.to_string(),
                }
            }
            (None, Some(_), None) => {
                return Err(AttachError::Argument(
                    "--core-id is required to look up a request by name".into(),
                ))
            }
            (None, None, _) => {
                return Err(AttachError::Argument(
                    "one of --id or --name is required".into(),
                ))
            }
        };

        if self.note.trim().is_empty() {
            return Err(AttachError::Argument("--note must not be empty".into()));
        }

        Ok(UploadRequest {
            target,
            file_path: expand_home(self.file),
            attachment_name: self.note,
            verbose: self.verbose,
            from_date: self.from_date,
        })
    }
}

fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("'{raw}' is not a valid YYYY-MM-DD date: {e}"))
}

/// Replace a leading `~` component with the home directory, for paths that
/// reached us quoted and unexpanded by the shell.
fn expand_home(path: PathBuf) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path,
        },
        Err(_) => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> std::result::Result<Args, clap::Error> {
        let mut full = vec!["ilab-attach"];
        full.extend_from_slice(args);
        Args::try_parse_from(full)
    }

    #[test]
    fn numeric_id_becomes_numeric_target() {
        let req = parse(&["--id", "123456", "-f", "readme.txt", "-n", "A Test"])
            .unwrap()
            .into_request()
            .unwrap();
        assert_eq!(req.target, TargetSelector::Numeric(123456));
        assert_eq!(req.attachment_name, "A Test");
        assert_eq!(req.from_date, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        assert!(!req.verbose);
    }

    #[test]
    fn name_and_core_become_named_target() {
        let req = parse(&["--name", "123-JRG", "-c", "1234", "-f", "a.txt", "-n", "x", "-v"])
            .unwrap()
            .into_request()
            .unwrap();
        assert_eq!(
            req.target,
            TargetSelector::Named {
                name: "123-JRG".into(),
                core_id: "1234".into()
            }
        );
        assert!(req.verbose);
    }

    #[test]
    fn id_and_name_conflict() {
        let err = parse(&["--id", "1", "--name", "x", "-c", "1", "-f", "a", "-n", "b"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn name_requires_core_id() {
        let err = parse(&["--name", "x", "-f", "a", "-n", "b"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn one_identifier_is_required() {
        let err = parse(&["-f", "a", "-n", "b"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn zero_id_is_rejected_by_parser() {
        assert!(parse(&["--id", "0", "-f", "a", "-n", "b"]).is_err());
    }

    #[test]
    fn bad_from_date_is_rejected() {
        for bad in ["2015/03/14", "2015-13-99", "2023-02-30"] {
            let err = parse(&["--id", "1", "-f", "a", "-n", "b", "--from-date", bad]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueValidation, "{bad} was accepted");
        }
        let args = parse(&["--id", "1", "-f", "a", "-n", "b", "--from-date", "2015-03-14"]).unwrap();
        assert_eq!(args.from_date, NaiveDate::from_ymd_opt(2015, 3, 14).unwrap());
    }

    #[test]
    fn into_request_rejects_both_modes_when_built_directly() {
        let args = Args {
            id: Some(5),
            name: Some("x".into()),
            core_id: Some(1),
            file: PathBuf::from("a"),
            note: "b".into(),
            verbose: false,
            from_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            api_base: DEFAULT_API_BASE.into(),
        };
        assert!(matches!(args.into_request(), Err(AttachError::Argument(_))));
    }

    #[test]
    fn core_id_must_be_a_positive_integer() {
        for bad in ["../attachments", "1234?x=", "12#frag", "0"] {
            let err = parse(&["--name", "x", "-c", bad, "-f", "a", "-n", "b"]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueValidation, "{bad} was accepted");
        }
    }

    #[test]
    fn blank_note_is_rejected() {
        let args = parse(&["--id", "1", "-f", "a", "-n", "  "]).unwrap();
        assert!(matches!(args.into_request(), Err(AttachError::Argument(_))));
    }

    #[test]
    fn tilde_is_expanded_when_home_is_known() {
        let expanded = expand_home(PathBuf::from("~/readme.txt"));
        match dirs::home_dir() {
            Some(home) => assert_eq!(expanded, home.join("readme.txt")),
            None => assert_eq!(expanded, PathBuf::from("~/readme.txt")),
        }
        assert_eq!(expand_home(PathBuf::from("docs/a.txt")), PathBuf::from("docs/a.txt"));
    }
}
