//! Mailchimp Import: Read, Parse, and Import Subscriber Exports into PostgreSQL
//!
//! This application reads a Mailchimp subscriber export from standard input, parses its
//! comma-separated records, and imports every subscriber into the mailing-list PostgreSQL
//! database, collected under a list created for the run.
//!
//! ## Purpose
//! The goal is a small, predictable pipeline for moving an exported subscriber file into
//! the email service database, with each imported row durable as soon as it is written.
//!
//! ## Design Overview
//! - **Parsing**: Streams CSV records from standard input using the `parse` module.
//! - **Importing**: Creates the run's list and writes subscriber and membership rows via
//!   the `import` module.
//! - **Summary**: Logs how many rows were imported and how many subscribers were created
//!   or reused.
//!
//! ## Dependencies
//! - **`tokio`**: For the asynchronous runtime driving database operations.
//! - **`tokio-postgres`**: For PostgreSQL database interaction over the local socket.
//! - **`csv` and `encoding_rs`**: For reading byte-level CSV records and decoding their
//!   Latin-1 family fields.
//! - **`log` and `env_logger`**: For structured logging instead of `println!`.
//! - **`clap`**: For parsing command-line arguments to configure the application.
//! - **`chrono`**: Provides the local timestamp embedded in the created list's name.
//!
//! ## Usage
//! 1. Ensure the email service database is reachable through its local socket (e.g.,
//!    database `attendly_email_service`, user `tt`, socket directory
//!    `/var/run/postgresql`).
//! 2. Configure the application using environment variables or command-line arguments:
//!    ```sh
//!    export ACCOUNT_EMAIL=owner@example.com
//!    export DB_SOCKET=/var/run/postgresql
//!    export DB_NAME=attendly_email_service
//!    ```
//! 3. Run the application with the export file on standard input:
//!    ```sh
//!    cargo run -- --account-email owner@example.com < subscribers.csv
//!    ```
//! 4. To import everything in one transaction instead of committing row by row:
//!    ```sh
//!    cargo run -- --single-transaction < subscribers.csv
//!    ```
//! 5. Logs are written to stderr, controlled by the `RUST_LOG` environment variable:
//!    ```sh
//!    export RUST_LOG=info
//!    cargo run < subscribers.csv
//!    ```
//!
//! ## Notes
//! - The input must contain no header row; every line is treated as a subscriber.
//! - Columns are `email, first_name, last_name`; anything after the third column is
//!   ignored.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use mailchimp_import::config::Config;
use mailchimp_import::import::{connect, run_import};
use mailchimp_import::parse::SubscriberRecords;
use std::io;
use std::path::PathBuf;

/// Command-line arguments for configuring the Mailchimp import.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
  /// Email address of the account that will own the imported list.
  #[clap(long, env = "ACCOUNT_EMAIL", default_value = "sendgrid@eventarc.com")]
  account_email: String,

  /// Directory containing the PostgreSQL Unix socket.
  #[clap(long, env = "DB_SOCKET", default_value = "/var/run/postgresql")]
  db_socket: PathBuf,

  /// Database user name.
  #[clap(long, env = "DB_USER", default_value = "tt")]
  db_user: String,

  /// Database password.
  #[clap(long, env = "DB_PASSWORD", default_value = "tt")]
  db_password: String,

  /// Name of the database to connect to.
  #[clap(long, env = "DB_NAME", default_value = "attendly_email_service")]
  db_name: String,

  /// Run the whole import in one transaction instead of committing per statement.
  #[clap(long, action)]
  single_transaction: bool,
}

/// Orchestrates reading, parsing, and importing a subscriber export.
///
/// This function:
/// 1. Loads configuration from environment variables or command-line arguments.
/// 2. Opens the database session over the configured Unix socket.
/// 3. Streams CSV records from standard input through the import.
/// 4. Logs a summary of the completed run.
///
/// # Returns
/// - `Ok(())` if the whole input was imported.
/// - `Err(anyhow::Error)` if any step fails (e.g., unknown account, malformed row,
///   database error).
#[tokio::main]
async fn main() -> Result<()> {
  // Initialize logging
  env_logger::init();

  // Parse command-line arguments
  let args = Args::parse();
  info!("Starting Mailchimp import for account: {}", args.account_email);

  let config = Config {
    account_email: args.account_email,
    db_socket: args.db_socket,
    db_user: args.db_user,
    db_password: args.db_password,
    db_name: args.db_name,
  };

  // Open the database session
  let mut client = connect(&config).await?;

  // Stream records from standard input
  let records = SubscriberRecords::new(io::stdin().lock());

  let summary = if args.single_transaction {
    let transaction = client
      .transaction()
      .await
      .context("Failed to start transaction")?;
    let summary = run_import(&transaction, &config.account_email, records).await?;
    transaction
      .commit()
      .await
      .context("Failed to commit transaction")?;
    summary
  } else {
    run_import(&client, &config.account_email, records).await?
  };

  info!(
    "Imported {} row(s) into list {}: {} subscriber(s) created, {} reused",
    summary.rows, summary.list_id, summary.subscribers_created, summary.subscribers_reused
  );

  Ok(())
}
