mod config;
mod error;
mod importer;
mod parse;
mod provision;
mod record;
mod store;

use clap::Parser;
use config::{Args, Config};
use env_logger::Env;
use importer::{Importer, Summary};
use log::{debug, error, info, warn};
use provision::ProvisioningClient;
use std::process::ExitCode;
use store::SqliteStore;

/// Run one import. The input is opened before the database so that a bad
/// input file leaves the database untouched.
#[inline]
fn execute(config: &Config) -> Result<Summary, error::ImportError> {
    info!("start extracting {}", config.input.display());
    let rows = parse::open(&config.input)?;

    let client = ProvisioningClient::new(config)?;
    let store = SqliteStore::open(&config.database)?;

    let mut importer = Importer::new(client, store);
    let summary = importer.import(rows)?;

    match importer.into_store().count() {
        Ok(stored) => info!("{} holds {stored} provisioned users", config.database.display()),
        Err(err) => warn!("cannot count stored users: {err}"),
    }
    Ok(summary)
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = match Config::load(args) {
        Ok(config) => config,
        Err(error) => {
            error!("{error}");
            return ExitCode::FAILURE;
        }
    };
    debug!("{config:?}");

    match execute(&config) {
        Ok(summary) => {
            info!(
                "processed {} rows: {} provisioned, {} skipped",
                summary.processed,
                summary.persisted,
                summary.skipped.len()
            );
            ExitCode::SUCCESS
        }
        Err(error) => {
            error!("Fatal Error: {error}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::execute;
    use crate::{
        config::{Args, Config, FileConfig},
        error::ImportError,
        provision::tests::serve_once,
        record::tests::USER_ID,
    };
    use clap::Parser;
    use rusqlite::Connection;
    use std::{fs, path::Path};

    const HEADER: &str = "source_member_id,access_code,group_name,first_name,last_name,email,gender,birth_date,profile,password";

    fn config(base_url: &str, input: &Path, database: &Path) -> Config {
        let args = Args::try_parse_from([
            "provision-import",
            input.to_str().expect("Bad input path"),
            "--base-url",
            base_url,
            "--client-id",
            "cid",
            "--client-secret",
            "secret",
            "--database",
            database.to_str().expect("Bad database path"),
        ])
        .expect("Failed to parse args");
        Config::resolve(args, FileConfig::default()).expect("Failed to resolve")
    }

    fn write_input(path: &Path) {
        let row = format!("{USER_ID},tok1,grp1,Jane,Doe,jane@x.com,F,2000-01-01,p,pw");
        fs::write(path, format!("{HEADER}\n{row}\n")).expect("Failed to write input");
    }

    #[test]
    fn wrong_extension_leaves_no_database() {
        let dir = tempfile::tempdir().expect("Failed to create dir");
        let input = dir.path().join("users.txt");
        let database = dir.path().join("out.db");
        write_input(&input);

        let result = execute(&config("http://127.0.0.1:9", &input, &database));

        assert!(matches!(result, Err(ImportError::FormatError(_))));
        assert!(!database.exists());
    }

    #[test]
    fn missing_input_leaves_no_database() {
        let dir = tempfile::tempdir().expect("Failed to create dir");
        let input = dir.path().join("absent.csv");
        let database = dir.path().join("out.db");

        let result = execute(&config("http://127.0.0.1:9", &input, &database));

        assert!(matches!(result, Err(ImportError::IoError(_))));
        assert!(!database.exists());
    }

    #[test]
    fn provision_into_sqlite() {
        let dir = tempfile::tempdir().expect("Failed to create dir");
        let input = dir.path().join("users.csv");
        let database = dir.path().join("out.db");
        write_input(&input);

        let (base_url, handle) = serve_once(r#"{"access_token":"abc123"}"#);
        let summary = execute(&config(&base_url, &input, &database)).expect("Failed to import");
        let (request_line, _, payload) = handle.join().expect("Server panicked");

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.persisted, 1);
        assert!(summary.skipped.is_empty());
        assert_eq!(request_line, "POST /users HTTP/1.1");
        assert_eq!(payload["user"]["source_member_id"], USER_ID);

        let conn = Connection::open(&database).expect("Failed to open database");
        let (group_token, group_name, auth_token): (String, String, String) = conn
            .query_row(
                "SELECT group_token, group_name, auth_token FROM provisioned_users WHERE user_id = ?1",
                [USER_ID],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .expect("Entry not stored");

        assert_eq!(group_token, "tok1");
        assert_eq!(group_name, "grp1");
        assert_eq!(auth_token, "abc123");
    }
}
