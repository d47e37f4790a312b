//! Runtime configuration for an import run.
//!
//! All values are assembled by the binary from command-line arguments or
//! environment variables and handed to the import pipeline as one struct, so
//! the library itself never reads the process environment.

use std::path::PathBuf;

/// Connection and account settings for a single import run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Email address of the account that will own the imported list.
    pub account_email: String,
    /// Directory containing the PostgreSQL Unix socket (e.g., "/var/run/postgresql").
    pub db_socket: PathBuf,
    /// Database user name.
    pub db_user: String,
    /// Database password.
    pub db_password: String,
    /// Name of the database to connect to.
    pub db_name: String,
}
