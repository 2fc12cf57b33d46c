//! Command-line front end for the directory core.
//!
//! # Responsibility
//! - Decode argv + JSON stdin into typed service parameters.
//! - Print result entities as JSON and map error kinds to exit status.
//!
//! The core treats its transport as an external collaborator; this binary
//! is that collaborator in its smallest useful form.

use dirbook_core::db::open_db;
use dirbook_core::{
    default_log_level, init_logging, DirectoryDraft, DirectoryService, RepoError,
    SqliteDirectoryRepository,
};
use std::io::Read;
use std::process::ExitCode;

const DB_FILE_NAME: &str = "dirbook.sqlite3";
const USAGE: &str = "usage: dirbook_cli <list | get <id> | add | update <id> | delete <id>>
  add and update read a directory entry as JSON from stdin, for example:
  {\"name\":\"Ada\",\"phone_number\":\"555\",\"address\":{\"city\":\"London\"}}";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    init_process_logging();

    // Schema bootstrap failure is fatal: there is no degraded mode without
    // the schema.
    let mut conn =
        open_db(DB_FILE_NAME).map_err(|err| format!("cannot open database: {err}"))?;
    let repo = SqliteDirectoryRepository::try_new(&mut conn)
        .map_err(|err| format!("storage not ready: {err}"))?;
    let mut service = DirectoryService::new(repo);

    match args {
        [command] if command == "list" => {
            let entries = service.list().map_err(render_error)?;
            println!("{}", to_json(&entries)?);
            Ok(())
        }
        [command, id] if command == "get" => {
            let entry = service.get(id).map_err(render_error)?;
            println!("{}", to_json(&entry)?);
            Ok(())
        }
        [command] if command == "add" => {
            let draft = read_draft_from_stdin()?;
            let entry = service.create(&draft).map_err(render_error)?;
            println!("{}", to_json(&entry)?);
            Ok(())
        }
        [command, id] if command == "update" => {
            let draft = read_draft_from_stdin()?;
            let entry = service.update(id, &draft).map_err(render_error)?;
            println!("{}", to_json(&entry)?);
            Ok(())
        }
        [command, id] if command == "delete" => {
            service.delete(id).map_err(render_error)?;
            println!("{{\"message\":\"directory deleted\"}}");
            Ok(())
        }
        _ => Err(USAGE.to_string()),
    }
}

fn init_process_logging() {
    let log_dir = std::env::temp_dir().join("dirbook-logs");
    if let Some(dir) = log_dir.to_str() {
        if let Err(message) = init_logging(default_log_level(), dir) {
            eprintln!("warning: logging disabled: {message}");
        }
    }
}

fn read_draft_from_stdin() -> Result<DirectoryDraft, String> {
    let mut body = String::new();
    std::io::stdin()
        .read_to_string(&mut body)
        .map_err(|err| format!("cannot read stdin: {err}"))?;
    serde_json::from_str(&body).map_err(|err| format!("invalid request body: {err}"))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| format!("cannot encode response: {err}"))
}

// The HTTP collaborator would map these to 400/404/500; here they become
// exit-status messages with storage detail kept out of the not-found and
// validation paths.
fn render_error(err: RepoError) -> String {
    match err {
        RepoError::Validation(inner) => format!("invalid request: {inner}"),
        RepoError::NotFound(_) => "directory not found".to_string(),
        other => format!("internal error: {other}"),
    }
}
