use crate::config::Config;
use crate::error::{ImportError, ImportResult};
use crate::parse::SubscriberRecord;
use chrono::{Local, NaiveDateTime};
use log::{debug, error, info};
use tokio_postgres::{Client, GenericClient, NoTls};

/// Prefix of the name given to every list created by an import run.
pub const LIST_NAME_PREFIX: &str = "imported-list ";

/// Counters describing what a completed import run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
  /// Identifier of the list created for this run.
  pub list_id: i64,
  /// Number of input rows imported.
  pub rows: u64,
  /// Number of subscriber rows created because the email was not known yet.
  pub subscribers_created: u64,
  /// Number of existing subscriber rows reused for already-known emails.
  pub subscribers_reused: u64,
}

/// Opens a database session over the configured Unix socket.
///
/// Connects to PostgreSQL using the socket directory, user, password, and database
/// name from the configuration. The connection task is spawned onto the runtime and
/// logs its own error if the session breaks while the import is running. No TLS is
/// used, as the socket never leaves the local machine.
///
/// # Arguments
///
/// * `config` - Connection settings for the import run.
///
/// # Returns
///
/// * `Ok(Client)` - An open database session.
/// * `Err(ImportError::Connection)` - The session could not be established.
///
/// # Examples
///
/// ```rust,no_run
/// use mailchimp_import::config::Config;
/// use mailchimp_import::import::connect;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = Config {
///         account_email: "owner@example.com".to_string(),
///         db_socket: "/var/run/postgresql".into(),
///         db_user: "tt".to_string(),
///         db_password: "tt".to_string(),
///         db_name: "attendly_email_service".to_string(),
///     };
///     let _client = connect(&config).await?;
///     Ok(())
/// }
/// ```
pub async fn connect(config: &Config) -> ImportResult<Client> {
  let (client, connection) = tokio_postgres::Config::new()
    .host_path(&config.db_socket)
    .user(&config.db_user)
    .password(&config.db_password)
    .dbname(&config.db_name)
    .connect(NoTls)
    .await
    .map_err(ImportError::Connection)?;

  tokio::spawn(async move {
    if let Err(e) = connection.await {
      error!("Database connection error: {}", e);
    }
  });

  Ok(client)
}

/// Imports a full subscriber export under the given operator account.
///
/// This function:
/// 1. Resolves the account id for `account_email`.
/// 2. Creates one list named after the current local time, owned by that account.
/// 3. Imports every record from `records` into the new list.
///
/// The list name is fixed once at the start of the run, so every run produces
/// exactly one list no matter how long the import takes.
///
/// # Arguments
///
/// * `client` - An open database session or transaction to run the import on.
/// * `account_email` - Email address of the account that will own the list.
/// * `records` - Parsed subscriber records, usually a `SubscriberRecords` iterator.
///
/// # Returns
///
/// * `Ok(ImportSummary)` - Counters for the completed run.
/// * `Err(ImportError)` - The account was not found, a record was malformed, or a
///   statement failed. Rows committed before the failure stay in the database.
///
/// # Examples
///
/// ```rust,no_run
/// use mailchimp_import::config::Config;
/// use mailchimp_import::import::{connect, run_import};
/// use mailchimp_import::parse::SubscriberRecords;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = Config {
///         account_email: "owner@example.com".to_string(),
///         db_socket: "/var/run/postgresql".into(),
///         db_user: "tt".to_string(),
///         db_password: "tt".to_string(),
///         db_name: "attendly_email_service".to_string(),
///     };
///     let client = connect(&config).await?;
///     let records = SubscriberRecords::new(&b"alice@example.com,Alice,Anderson\n"[..]);
///     run_import(&client, &config.account_email, records).await?;
///     Ok(())
/// }
/// ```
pub async fn run_import<C, I>(
  client: &C,
  account_email: &str,
  records: I,
) -> ImportResult<ImportSummary>
where
  C: GenericClient,
  I: IntoIterator<Item = ImportResult<SubscriberRecord>>,
{
  let account_id = resolve_account(client, account_email).await?;

  let name = list_name(Local::now().naive_local());
  let list_id = create_list(client, account_id, &name).await?;
  info!("Created list {} ({})", list_id, name);

  import_subscribers(client, account_id, list_id, records).await
}

/// Imports subscriber records into an existing list.
///
/// For each record, an existing subscriber row for the same email and account is
/// reused if present, otherwise a new one is inserted. The subscriber is then
/// linked to the list. Stored names are never overwritten with input values, and
/// a repeated email within one run produces one link row per occurrence. Records
/// are processed strictly in input order; the first error stops the run.
///
/// # Arguments
///
/// * `client` - An open database session or transaction to run the import on.
/// * `account_id` - Identifier of the account owning the subscribers.
/// * `list_id` - Identifier of the list to link each subscriber to.
/// * `records` - Parsed subscriber records.
///
/// # Returns
///
/// * `Ok(ImportSummary)` - Counters for the completed run.
/// * `Err(ImportError)` - A record was malformed or a statement failed.
pub async fn import_subscribers<C, I>(
  client: &C,
  account_id: i64,
  list_id: i64,
  records: I,
) -> ImportResult<ImportSummary>
where
  C: GenericClient,
  I: IntoIterator<Item = ImportResult<SubscriberRecord>>,
{
  let mut summary = ImportSummary {
    list_id,
    rows: 0,
    subscribers_created: 0,
    subscribers_reused: 0,
  };

  for record in records {
    let record = record?;

    let subscriber_id = match find_subscriber(client, &record.email, account_id).await? {
      Some(id) => {
        summary.subscribers_reused += 1;
        id
      }
      None => {
        let id = insert_subscriber(client, account_id, &record).await?;
        summary.subscribers_created += 1;
        id
      }
    };

    link_subscriber(client, list_id, subscriber_id).await?;
    summary.rows += 1;
    debug!(
      "Row {}: linked subscriber {} to list {}",
      record.row, subscriber_id, list_id
    );
  }

  Ok(summary)
}

/// Looks up the account id for the given email address.
///
/// # Arguments
///
/// * `client` - An open database session or transaction.
/// * `email` - Email address identifying the account.
///
/// # Returns
///
/// * `Ok(i64)` - Identifier of the first matching account row.
/// * `Err(ImportError::AccountNotFound)` - No account has this email.
async fn resolve_account<C: GenericClient>(client: &C, email: &str) -> ImportResult<i64> {
  let rows = client
    .query("SELECT id FROM account WHERE email = $1", &[&email])
    .await?;

  match rows.first() {
    Some(row) => Ok(row.get(0)),
    None => Err(ImportError::AccountNotFound(email.to_string())),
  }
}

/// Creates the list that this run imports into and returns its id.
///
/// # Arguments
///
/// * `client` - An open database session or transaction.
/// * `account_id` - Identifier of the account owning the list.
/// * `name` - Name for the new list.
///
/// # Returns
///
/// * `Ok(i64)` - Identifier of the created list row.
/// * `Err(ImportError::Database)` - The insert failed.
async fn create_list<C: GenericClient>(
  client: &C,
  account_id: i64,
  name: &str,
) -> ImportResult<i64> {
  let row = client
    .query_one(
      "INSERT INTO list (account_id, name, status) VALUES ($1, $2, 'active') RETURNING id",
      &[&account_id, &name],
    )
    .await?;

  Ok(row.get(0))
}

/// Finds an existing subscriber row for the given email under the given account.
///
/// # Arguments
///
/// * `client` - An open database session or transaction.
/// * `email` - The subscriber's email address.
/// * `account_id` - Identifier of the account owning the subscriber.
///
/// # Returns
///
/// * `Ok(Some(i64))` - Identifier of the first matching subscriber row.
/// * `Ok(None)` - No subscriber with this email exists under the account.
async fn find_subscriber<C: GenericClient>(
  client: &C,
  email: &str,
  account_id: i64,
) -> ImportResult<Option<i64>> {
  let rows = client
    .query(
      "SELECT id FROM subscriber WHERE email = $1 AND account_id = $2",
      &[&email, &account_id],
    )
    .await?;

  Ok(rows.first().map(|row| row.get(0)))
}

/// Inserts a new active subscriber row and returns its id.
///
/// # Arguments
///
/// * `client` - An open database session or transaction.
/// * `account_id` - Identifier of the account owning the subscriber.
/// * `record` - The parsed record supplying email and name fields.
///
/// # Returns
///
/// * `Ok(i64)` - Identifier of the created subscriber row.
/// * `Err(ImportError::Database)` - The insert failed.
async fn insert_subscriber<C: GenericClient>(
  client: &C,
  account_id: i64,
  record: &SubscriberRecord,
) -> ImportResult<i64> {
  let row = client
    .query_one(
      "INSERT INTO subscriber (account_id, first_name, last_name, email, status) \
       VALUES ($1, $2, $3, $4, $5) RETURNING id",
      &[
        &account_id,
        &record.first_name,
        &record.last_name,
        &record.email,
        &"active",
      ],
    )
    .await?;

  Ok(row.get(0))
}

/// Links a subscriber to a list with an active membership row.
///
/// # Arguments
///
/// * `client` - An open database session or transaction.
/// * `list_id` - Identifier of the list.
/// * `subscriber_id` - Identifier of the subscriber.
///
/// # Returns
///
/// * `Ok(())` - The link row was inserted.
/// * `Err(ImportError::Database)` - The insert failed.
async fn link_subscriber<C: GenericClient>(
  client: &C,
  list_id: i64,
  subscriber_id: i64,
) -> ImportResult<()> {
  client
    .execute(
      "INSERT INTO list_subscriber (list_id, subscriber_id, status) VALUES ($1, $2, $3)",
      &[&list_id, &subscriber_id, &"active"],
    )
    .await?;

  Ok(())
}

/// Formats the name of the list created for a run starting at `now`.
fn list_name(now: NaiveDateTime) -> String {
  format!("{}{}", LIST_NAME_PREFIX, now.format("%Y-%m-%d %H:%M:%S"))
}
