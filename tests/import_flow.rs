//! End-to-end import scenarios against a live PostgreSQL database.
//!
//! These tests need a disposable database to write to. Set `TEST_DB_PARAMS` to a
//! `tokio-postgres` connection string (e.g., "host=localhost user=postgres
//! password=postgres dbname=mailchimp_import_test") to run them; without it every
//! test skips. The schema is created on first use and all tables are truncated at
//! the start of the run.

use chrono::NaiveDateTime;
use mailchimp_import::error::ImportError;
use mailchimp_import::import::{run_import, LIST_NAME_PREFIX};
use mailchimp_import::parse::SubscriberRecords;
use tokio_postgres::{Client, NoTls};

const SCHEMA: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS account (
        id BIGSERIAL PRIMARY KEY,
        email TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS list (
        id BIGSERIAL PRIMARY KEY,
        account_id BIGINT NOT NULL REFERENCES account(id),
        name TEXT NOT NULL,
        status TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS subscriber (
        id BIGSERIAL PRIMARY KEY,
        account_id BIGINT NOT NULL REFERENCES account(id),
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL,
        status TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS list_subscriber (
        list_id BIGINT NOT NULL REFERENCES list(id),
        subscriber_id BIGINT NOT NULL REFERENCES subscriber(id),
        status TEXT NOT NULL
    )",
];

/// Connects to the test database named by `TEST_DB_PARAMS` and resets its contents.
async fn test_client() -> Option<Client> {
    let params = match std::env::var("TEST_DB_PARAMS") {
        Ok(params) => params,
        Err(_) => {
            eprintln!("skipping import flow test: TEST_DB_PARAMS not set");
            return None;
        }
    };

    let (client, connection) = tokio_postgres::connect(&params, NoTls)
        .await
        .expect("failed to connect to test database");
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("test database connection error: {}", e);
        }
    });

    for statement in SCHEMA {
        client
            .execute(statement, &[])
            .await
            .expect("failed to create test schema");
    }
    client
        .execute("TRUNCATE TABLE account, list, subscriber, list_subscriber CASCADE", &[])
        .await
        .expect("failed to truncate test tables");

    Some(client)
}

async fn count(client: &Client, table: &str) -> i64 {
    let query = format!("SELECT COUNT(*) FROM {}", table);
    let row = client
        .query_one(query.as_str(), &[])
        .await
        .expect("count query failed");
    row.get(0)
}

async fn scalar_text(client: &Client, query: &str, param: &str) -> String {
    let row = client
        .query_one(query, &[&param])
        .await
        .expect("lookup query failed");
    row.get(0)
}

/// Runs the import scenarios in sequence against one shared database.
#[tokio::test]
async fn import_flow_end_to_end() {
    let mut client = match test_client().await {
        Some(client) => client,
        None => return,
    };

    // An unknown operator email fails before any list is created.
    let records = SubscriberRecords::new(&b"alice@example.com,Alice,Anderson\n"[..]);
    let err = run_import(&client, "missing@example.com", records)
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::AccountNotFound(_)));
    assert_eq!(count(&client, "list").await, 0);

    client
        .execute("INSERT INTO account (email) VALUES ($1)", &[&"owner@example.com"])
        .await
        .expect("failed to seed account");

    // A fresh import creates one list, dedupes the repeated email, and links every row.
    let input = "alice@example.com,Alice,Anderson\n\
                 bob@example.com,Bob,Brown\n\
                 alice@example.com,Alicia,Anderson\n";
    let summary = run_import(
        &client,
        "owner@example.com",
        SubscriberRecords::new(input.as_bytes()),
    )
    .await
    .expect("import failed");

    assert_eq!(summary.rows, 3);
    assert_eq!(summary.subscribers_created, 2);
    assert_eq!(summary.subscribers_reused, 1);
    assert_eq!(count(&client, "list").await, 1);
    assert_eq!(count(&client, "subscriber").await, 2);
    assert_eq!(count(&client, "list_subscriber").await, 3);

    // The created list is active and named after the run's start time.
    let name = scalar_text(
        &client,
        "SELECT name FROM list WHERE status = $1",
        "active",
    )
    .await;
    let stamp = name
        .strip_prefix(LIST_NAME_PREFIX)
        .expect("list name missing prefix");
    NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S")
        .expect("list name timestamp unparsable");

    // The duplicate row reused Alice's subscriber; her stored name is untouched.
    let first_name = scalar_text(
        &client,
        "SELECT first_name FROM subscriber WHERE email = $1",
        "alice@example.com",
    )
    .await;
    assert_eq!(first_name, "Alice");

    // Importing the same input again makes a second list but no new subscribers.
    let summary = run_import(
        &client,
        "owner@example.com",
        SubscriberRecords::new(input.as_bytes()),
    )
    .await
    .expect("second import failed");

    assert_eq!(summary.subscribers_created, 0);
    assert_eq!(summary.subscribers_reused, 3);
    assert_eq!(count(&client, "list").await, 2);
    assert_eq!(count(&client, "subscriber").await, 2);
    assert_eq!(count(&client, "list_subscriber").await, 6);

    // Empty input still creates the run's list and nothing else.
    let summary = run_import(&client, "owner@example.com", SubscriberRecords::new(&b""[..]))
        .await
        .expect("empty import failed");

    assert_eq!(summary.rows, 0);
    assert_eq!(count(&client, "list").await, 3);
    assert_eq!(count(&client, "subscriber").await, 2);
    assert_eq!(count(&client, "list_subscriber").await, 6);

    // A malformed row stops the run but keeps the rows imported before it.
    let records = SubscriberRecords::new(&b"carol@example.com,Carol,Clark\nbroken-line\n"[..]);
    let err = run_import(&client, "owner@example.com", records)
        .await
        .unwrap_err();
    match err {
        ImportError::MalformedRow { row, fields } => {
            assert_eq!(row, 2);
            assert_eq!(fields, 1);
        }
        other => panic!("expected MalformedRow, got {:?}", other),
    }
    assert_eq!(count(&client, "list").await, 4);
    assert_eq!(count(&client, "subscriber").await, 3);
    assert_eq!(count(&client, "list_subscriber").await, 7);

    // Inside a transaction the same failure leaves no trace once it rolls back.
    {
        let transaction = client
            .transaction()
            .await
            .expect("failed to start transaction");
        let records = SubscriberRecords::new(&b"dave@example.com,Dave,Dunn\nbad\n"[..]);
        let err = run_import(&transaction, "owner@example.com", records)
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::MalformedRow { .. }));
    }
    assert_eq!(count(&client, "list").await, 4);
    assert_eq!(count(&client, "subscriber").await, 3);
    assert_eq!(count(&client, "list_subscriber").await, 7);

    // A committed transaction behaves like the default mode.
    let transaction = client
        .transaction()
        .await
        .expect("failed to start transaction");
    let records = SubscriberRecords::new(&b"eve@example.com,Eve,Evans\n"[..]);
    let summary = run_import(&transaction, "owner@example.com", records)
        .await
        .expect("transactional import failed");
    transaction
        .commit()
        .await
        .expect("failed to commit transaction");

    assert_eq!(summary.rows, 1);
    assert_eq!(summary.subscribers_created, 1);
    assert_eq!(count(&client, "list").await, 5);
    assert_eq!(count(&client, "subscriber").await, 4);
    assert_eq!(count(&client, "list_subscriber").await, 8);
}
