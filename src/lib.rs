// Library root
// -----------
// This crate exposes a small library surface for the `ilab-attach` CLI,
// which adds a file attachment to an iLab service request.
//
// Module responsibilities:
// - `api`: blocking HTTP calls to the iLab API (lookup by name, upload).
// - `cli`: clap argument definitions and their conversion to a request.
// - `config`: bearer token and API base URL.
// - `error`: the error taxonomy and exit codes.
// - `logging`: tracing subscriber setup.
// - `target`: request identifiers, attachment and result types.
// - `ui`: the upload flow and what gets printed.
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod target;
pub mod ui;
