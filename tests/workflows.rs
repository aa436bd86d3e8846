//! Workflow Integration Tests
//!
//! Drives every menu workflow end to end against an in-memory `SQLite`
//! database with a scripted console: operator input is a byte buffer and
//! both output streams are captured.

#![cfg(feature = "sqlite")]

use pretty_assertions::assert_eq;
use std::io::Cursor;

use mechanic_shop::engine::sqlite::SqliteEngine;
use mechanic_shop::workflow::{
    add_car, add_customer, add_mechanic, cars_before_1995_under_50000_miles,
    close_service_request, customers_by_total_bill, customers_with_bill_under_100,
    customers_with_more_than_20_cars, insert_service_request, run_menu, top_k_serviced_cars,
    AddCarOutcome,
};
use mechanic_shop::{ConnectionConfig, Console, ShopClient, ShopError, SqlValue};

// ============================================================================
// Test Helpers
// ============================================================================

type TestConsole = Console<Cursor<Vec<u8>>, Vec<u8>, Vec<u8>>;
type TestClient = ShopClient<SqliteEngine>;

const SCHEMA: &[&str] = &[
    "CREATE TABLE customer (id INTEGER PRIMARY KEY, fname TEXT NOT NULL, lname TEXT NOT NULL, \
     phone TEXT NOT NULL, address TEXT NOT NULL)",
    "CREATE TABLE mechanic (id INTEGER PRIMARY KEY, fname TEXT NOT NULL, lname TEXT NOT NULL, \
     experience INTEGER NOT NULL)",
    "CREATE TABLE car (vin TEXT PRIMARY KEY, make TEXT NOT NULL, model TEXT NOT NULL, \
     year INTEGER NOT NULL)",
    "CREATE TABLE owns (ownership_id INTEGER PRIMARY KEY, customer_id INTEGER NOT NULL, \
     car_vin TEXT NOT NULL)",
    "CREATE TABLE service_request (rid INTEGER PRIMARY KEY, customer_id INTEGER NOT NULL, \
     car_vin TEXT NOT NULL, date TEXT NOT NULL, odometer INTEGER NOT NULL, complain TEXT)",
];

const SEED: &[&str] = &[
    "INSERT INTO customer VALUES (1, 'John', 'Smith', '555-0101', '1 Oak St')",
    "INSERT INTO customer VALUES (2, 'Mary', 'Jones', '555-0102', '2 Elm St')",
    "INSERT INTO customer VALUES (7, 'Lee', 'Park', '555-0107', '7 Pine St')",
    "INSERT INTO mechanic VALUES (3, 'Rosa', 'Diaz', 12)",
    "INSERT INTO car VALUES ('VIN0001', 'Toyota', 'Corolla', 1992)",
    "INSERT INTO car VALUES ('VIN0002', 'Ford', 'Escort', 1990)",
    "INSERT INTO car VALUES ('VIN0003', 'Honda', 'Civic', 2005)",
    "INSERT INTO owns VALUES (1, 1, 'VIN0001')",
    "INSERT INTO owns VALUES (2, 2, 'VIN0002')",
    "INSERT INTO owns VALUES (3, 2, 'VIN0003')",
    "INSERT INTO service_request VALUES (1, 1, 'VIN0001', '2020-01-10', 30000, 'Oil leak')",
    "INSERT INTO service_request VALUES (2, 2, 'VIN0002', '2021-05-02', 60000, 'Rattle')",
    "INSERT INTO service_request VALUES (3, 2, 'VIN0003', '2023-01-01', 15000, 'Tires')",
    "INSERT INTO service_request VALUES (5, 2, 'VIN0003', '2022-07-19', 10000, 'Brakes')",
];

/// Shop database with the schema and no rows
async fn empty_shop() -> TestClient {
    let config = ConnectionConfig::sqlite(":memory:".into());
    let mut client = TestClient::connect(&config).await.expect("Failed to open database");
    for ddl in SCHEMA {
        client.run_update(ddl, &[]).await.expect("Failed to create table");
    }
    client
}

/// Shop database with a few customers, cars and service requests
async fn seeded_shop() -> TestClient {
    let mut client = empty_shop().await;
    for insert in SEED {
        client.run_update(insert, &[]).await.expect("Failed to seed");
    }
    client
}

fn console(input: &str) -> TestConsole {
    Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new(), Vec::new())
}

fn outputs(console: TestConsole) -> (String, String) {
    let (out, err) = console.into_outputs();
    (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
}

async fn rows(client: &mut TestClient, sql: &str) -> Vec<Vec<String>> {
    client
        .run_query_rows(sql, &[])
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.into_iter().map(|v| v.unwrap_or_else(|| "null".to_string())).collect())
        .collect()
}

async fn count(client: &mut TestClient, table: &str) -> String {
    rows(client, &format!("SELECT COUNT(*) FROM {table}")).await[0][0].clone()
}

// ============================================================================
// Client Primitives
// ============================================================================

#[tokio::test]
async fn test_exists_is_presence_for_many_rows() {
    let mut client = seeded_shop().await;
    for i in 0..5 {
        client
            .run_update("INSERT INTO owns (ownership_id, customer_id, car_vin) VALUES ($1, $2, $3)", &[
                SqlValue::Int(100 + i),
                SqlValue::Int(7),
                SqlValue::Text(format!("FLEET{i}")),
            ])
            .await
            .unwrap();
    }

    let matching = client
        .run_query_exists("SELECT * FROM owns WHERE customer_id = $1", &[SqlValue::Int(7)])
        .await
        .unwrap();
    assert_eq!(matching, 1);

    let none = client
        .run_query_exists("SELECT * FROM owns WHERE customer_id = $1", &[SqlValue::Int(99)])
        .await
        .unwrap();
    assert_eq!(none, 0);
}

#[tokio::test]
async fn test_print_writes_header_once_then_rows() {
    let mut client = seeded_shop().await;
    let mut out = Vec::new();

    let printed = client
        .run_query_print(&mut out, "SELECT vin, make, year FROM car ORDER BY vin", &[])
        .await
        .unwrap();

    assert_eq!(printed, 3);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "vin\tmake\tyear\t\n\
         VIN0001\tToyota\t1992\t\n\
         VIN0002\tFord\t1990\t\n\
         VIN0003\tHonda\t2005\t\n"
    );
}

#[tokio::test]
async fn test_print_empty_result_writes_nothing() {
    let mut client = seeded_shop().await;
    let mut out = Vec::new();

    let printed = client
        .run_query_print(&mut out, "SELECT * FROM car WHERE vin = $1", &[SqlValue::from("NOPE")])
        .await
        .unwrap();

    assert_eq!(printed, 0);
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_failed_statement_is_an_error() {
    let mut client = seeded_shop().await;
    let err = client
        .run_update("INSERT INTO customer VALUES (1, 'Dup', 'Key', '', '')", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::QueryFailed(_) | ShopError::EngineError { .. }));
}

#[tokio::test]
async fn test_disconnect_consumes_client() {
    let client = seeded_shop().await;
    client.disconnect().await;
}

// ============================================================================
// AddCustomer / AddMechanic
// ============================================================================

#[tokio::test]
async fn test_add_customer_uses_max_plus_one() {
    let mut client = seeded_shop().await;
    let mut c = console("Ada\nLovelace\n555-0199\n12 Analytical Way\n");

    let id = add_customer(&mut client, &mut c).await.unwrap();
    assert_eq!(id, 8);

    let saved = rows(&mut client, "SELECT id, fname, lname, phone, address FROM customer WHERE id = 8").await;
    assert_eq!(saved, vec![vec!["8", "Ada", "Lovelace", "555-0199", "12 Analytical Way"]]);

    let (out, err) = outputs(c);
    assert_eq!(out, "Enter first name: Enter last name: Enter phone: Enter address: ");
    assert!(err.is_empty());
}

#[tokio::test]
async fn test_consecutive_customers_get_consecutive_ids() {
    let mut client = seeded_shop().await;
    let mut c = console("A\nOne\n1\nx\nB\nTwo\n2\ny\n");

    assert_eq!(add_customer(&mut client, &mut c).await.unwrap(), 8);
    assert_eq!(add_customer(&mut client, &mut c).await.unwrap(), 9);
}

#[tokio::test]
async fn test_add_customer_keeps_quotes_verbatim() {
    let mut client = seeded_shop().await;
    let mut c = console("Miles\nO'Brien\n555'; DROP TABLE car; --\nDS9\n");

    add_customer(&mut client, &mut c).await.unwrap();

    let saved = rows(&mut client, "SELECT lname, phone FROM customer WHERE id = 8").await;
    assert_eq!(saved, vec![vec!["O'Brien", "555'; DROP TABLE car; --"]]);
    assert_eq!(count(&mut client, "car").await, "3");
}

#[tokio::test]
async fn test_add_customer_on_empty_table_fails_before_prompting() {
    let mut client = empty_shop().await;
    let mut c = console("Ada\nLovelace\n555\nSomewhere\n");

    let err = add_customer(&mut client, &mut c).await.unwrap_err();
    assert_eq!(err.error_code(), "MISSING_VALUE");
    assert_eq!(count(&mut client, "customer").await, "0");

    let (out, _) = outputs(c);
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_add_mechanic_uses_max_plus_one() {
    let mut client = seeded_shop().await;
    let mut c = console("Tom\nMagnum\n8\n");

    let id = add_mechanic(&mut client, &mut c).await.unwrap();
    assert_eq!(id, 4);

    let saved = rows(&mut client, "SELECT id, fname, lname, experience FROM mechanic WHERE id = 4").await;
    assert_eq!(saved, vec![vec!["4", "Tom", "Magnum", "8"]]);

    let (out, _) = outputs(c);
    assert_eq!(out, "Enter first name: Enter last name: Enter years of experience: ");
}

#[tokio::test]
async fn test_add_mechanic_rejects_non_numeric_experience() {
    let mut client = seeded_shop().await;
    let mut c = console("Tom\nMagnum\nlots\n");

    let err = add_mechanic(&mut client, &mut c).await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_INPUT");
    assert_eq!(count(&mut client, "mechanic").await, "1");
}

// ============================================================================
// AddCar
// ============================================================================

#[tokio::test]
async fn test_add_car_inserts_new_vin() {
    let mut client = seeded_shop().await;
    let mut c = console("1HGCM82633A004352\nHonda\nAccord\n1998\n");

    let outcome = add_car(&mut client, &mut c).await.unwrap();
    assert_eq!(outcome, AddCarOutcome::Inserted("1HGCM82633A004352".to_string()));

    let saved =
        rows(&mut client, "SELECT vin, make, model, year FROM car WHERE vin = '1HGCM82633A004352'").await;
    assert_eq!(saved, vec![vec!["1HGCM82633A004352", "Honda", "Accord", "1998"]]);
    assert_eq!(count(&mut client, "car").await, "4");

    let (out, _) = outputs(c);
    assert_eq!(out, "Enter VIN: Enter make: Enter model: Enter year (Format XXXX): ");
    assert!(!out.contains("already exists"));
}

#[tokio::test]
async fn test_add_car_rejects_duplicate_vin() {
    let mut client = seeded_shop().await;
    let mut c = console("VIN0002\nShould\nNot\nBeRead\n");

    let outcome = add_car(&mut client, &mut c).await.unwrap();
    assert_eq!(outcome, AddCarOutcome::Duplicate("VIN0002".to_string()));
    assert_eq!(count(&mut client, "car").await, "3");

    let (out, err) = outputs(c);
    assert_eq!(
        out,
        "Enter VIN: vin\tmake\tmodel\tyear\t\n\
         VIN0002\tFord\tEscort\t1990\t\n\
         VIN already exists in database\n"
    );
    assert!(err.is_empty());
}

#[tokio::test]
async fn test_add_car_rejects_bad_year() {
    let mut client = seeded_shop().await;
    let mut c = console("VIN0099\nKia\nRio\n'98\n");

    let err = add_car(&mut client, &mut c).await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_INPUT");
    assert_eq!(count(&mut client, "car").await, "3");
}

// ============================================================================
// InsertServiceRequest
// ============================================================================

#[tokio::test]
async fn test_service_request_for_existing_customer() {
    let mut client = seeded_shop().await;
    let mut c = console(concat!(
        "Smith\n", "Y\n",      // last name, confirmed
        "1\n",                 // customer id
        "N\n",                 // no new car
        "VIN0001\n", "Brakes squeal\n", "2024-03-15\n", "42000\n",
    ));

    let rid = insert_service_request(&mut client, &mut c).await.unwrap();
    assert_eq!(rid, Some(6));

    let saved = rows(
        &mut client,
        "SELECT rid, customer_id, car_vin, date, odometer, complain FROM service_request WHERE rid = 6",
    )
    .await;
    assert_eq!(saved, vec![vec!["6", "1", "VIN0001", "2024-03-15", "42000", "Brakes squeal"]]);

    let (out, err) = outputs(c);
    assert!(out.contains("id\tfname\tlname\tphone\taddress\t\n1\tJohn\tSmith\t555-0101\t1 Oak St\t\n"));
    assert!(out.contains("Listing customer's cars (vin):\ncar_vin\tmake\tmodel\t\nVIN0001\tToyota\tCorolla\t\n"));
    assert!(out.ends_with("Service request opened\n"));
    assert!(err.is_empty());
}

#[tokio::test]
async fn test_last_name_loop_waits_for_yes() {
    let mut client = seeded_shop().await;
    let mut c = console(concat!(
        "Smyth\n", "n\n",
        "Smiht\n", "yes\n",
        "Smith\n", "\n",
        "Smith\n", "y\n",
        "1\n", "N\n", "VIN0001\n", "Check engine light\n", "2024-04-01\n", "43000\n",
    ));

    let rid = insert_service_request(&mut client, &mut c).await.unwrap();
    assert_eq!(rid, Some(6));

    let (out, _) = outputs(c);
    assert_eq!(out.matches("Enter a last name: ").count(), 4);
    assert!(out.contains("Smyth; is this correct? (Y/N): "));
    assert!(!out.contains("Last name not in database"));
}

#[tokio::test]
async fn test_unknown_last_name_declined() {
    let mut client = seeded_shop().await;
    let mut c = console("Nobody\nY\nN\n");

    let rid = insert_service_request(&mut client, &mut c).await.unwrap();
    assert_eq!(rid, None);
    assert_eq!(count(&mut client, "customer").await, "3");
    assert_eq!(count(&mut client, "service_request").await, "4");

    let (out, _) = outputs(c);
    assert!(out.contains("Last name not in database\nCreate new customer? (Y/N): Ok, returning to main menu\n"));
}

#[tokio::test]
async fn test_unknown_last_name_creates_customer_and_car() {
    let mut client = seeded_shop().await;
    let mut c = console(concat!(
        "Nobody\n", "Y\n",
        "Y\n", "Ann\n", "Nobody\n", "555-0110\n", "10 Birch St\n",
        "8\n",
        "Y\n", "WVWZZZ1JZXW000001\n", "Volkswagen\n", "Golf\n", "1999\n",
        "WVWZZZ1JZXW000001\n", "Won't start\n", "2024-05-20\n", "120500\n",
    ));

    let rid = insert_service_request(&mut client, &mut c).await.unwrap();
    assert_eq!(rid, Some(6));

    let customer = rows(&mut client, "SELECT id, fname, lname FROM customer WHERE lname = 'Nobody'").await;
    assert_eq!(customer, vec![vec!["8", "Ann", "Nobody"]]);

    let car = rows(&mut client, "SELECT make, model, year FROM car WHERE vin = 'WVWZZZ1JZXW000001'").await;
    assert_eq!(car, vec![vec!["Volkswagen", "Golf", "1999"]]);

    let request = rows(&mut client, "SELECT customer_id, car_vin, odometer FROM service_request WHERE rid = 6").await;
    assert_eq!(request, vec![vec!["8", "WVWZZZ1JZXW000001", "120500"]]);

    let (out, _) = outputs(c);
    assert_eq!(out.matches("creating...").count(), 2);
}

#[tokio::test]
async fn test_service_request_bad_date_aborts() {
    let mut client = seeded_shop().await;
    let mut c = console("Jones\nY\n2\nN\nVIN0002\nNoise\n15/03/2024\n1000\n");

    let err = insert_service_request(&mut client, &mut c).await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_INPUT");
    assert_eq!(count(&mut client, "service_request").await, "4");
}

#[tokio::test]
async fn test_service_request_inline_failure_aborts() {
    let mut client = empty_shop().await;
    let mut c = console("Nobody\nY\nY\nAnn\nNobody\n555\nAddr\n");

    let err = insert_service_request(&mut client, &mut c).await.unwrap_err();
    assert_eq!(err.error_code(), "MISSING_VALUE");
    assert_eq!(count(&mut client, "service_request").await, "0");
}

#[tokio::test]
async fn test_service_request_input_closed() {
    let mut client = seeded_shop().await;
    let mut c = console("Smith\nY\n");

    let err = insert_service_request(&mut client, &mut c).await.unwrap_err();
    assert!(matches!(err, ShopError::InputClosed));
}

// ============================================================================
// Listings
// ============================================================================

#[tokio::test]
async fn test_customers_with_more_than_20_cars() {
    let mut client = seeded_shop().await;
    let mut c = console("");
    assert_eq!(customers_with_more_than_20_cars(&mut client, &mut c).await.unwrap(), 0);
    let (out, _) = outputs(c);
    assert_eq!(out, "No customer owns more than 20 cars\n");

    for i in 0..21 {
        client
            .run_update("INSERT INTO owns (ownership_id, customer_id, car_vin) VALUES ($1, $2, $3)", &[
                SqlValue::Int(100 + i),
                SqlValue::Int(7),
                SqlValue::Text(format!("FLEET{i:02}")),
            ])
            .await
            .unwrap();
    }

    let mut c = console("");
    assert_eq!(customers_with_more_than_20_cars(&mut client, &mut c).await.unwrap(), 1);
    let (out, _) = outputs(c);
    assert_eq!(out, "fname\tlname\tcars\t\nLee\tPark\t21\t\n");
}

#[tokio::test]
async fn test_cars_before_1995_under_50000_miles() {
    let mut client = seeded_shop().await;
    let mut c = console("");

    assert_eq!(cars_before_1995_under_50000_miles(&mut client, &mut c).await.unwrap(), 1);

    let (out, _) = outputs(c);
    assert_eq!(out, "make\tmodel\tyear\t\nToyota\tCorolla\t1992\t\n");
}

#[tokio::test]
async fn test_top_k_serviced_cars() {
    let mut client = seeded_shop().await;
    let mut c = console("2\n");

    assert_eq!(top_k_serviced_cars(&mut client, &mut c).await.unwrap(), 2);

    let (out, _) = outputs(c);
    assert_eq!(out, "Enter k: make\tmodel\tservices\t\nHonda\tCivic\t2\t\nToyota\tCorolla\t1\t\n");
}

#[tokio::test]
async fn test_top_k_rejects_non_positive_k() {
    let mut client = seeded_shop().await;

    let mut c = console("0\n");
    let err = top_k_serviced_cars(&mut client, &mut c).await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_INPUT");

    let mut c = console("many\n");
    let err = top_k_serviced_cars(&mut client, &mut c).await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_INPUT");
}

#[tokio::test]
async fn test_billing_entries_are_not_implemented() {
    let mut client = seeded_shop().await;
    let mut c = console("");

    let err = close_service_request(&mut client, &mut c).await.unwrap_err();
    assert_eq!(err.message(), "CloseServiceRequest is not implemented");

    let err = customers_with_bill_under_100(&mut client, &mut c).await.unwrap_err();
    assert_eq!(err.message(), "ListCustomersWithBillLessThan100 is not implemented");

    let err = customers_by_total_bill(&mut client, &mut c).await.unwrap_err();
    assert_eq!(err.error_code(), "NOT_IMPLEMENTED");

    let (out, _) = outputs(c);
    assert!(out.is_empty());
}

// ============================================================================
// Main Menu
// ============================================================================

#[tokio::test]
async fn test_menu_reprompts_and_reports_errors() {
    let mut client = seeded_shop().await;
    let mut c = console("abc\n12\n5\n11\n");

    run_menu(&mut client, &mut c).await.unwrap();

    let (out, err) = outputs(c);
    assert_eq!(out.matches("MAIN MENU").count(), 3);
    assert_eq!(out.matches("Your input is invalid!").count(), 1);
    assert_eq!(err, "CloseServiceRequest is not implemented\n");
}

#[tokio::test]
async fn test_menu_runs_workflow_then_exits() {
    let mut client = seeded_shop().await;
    let mut c = console("3\nVIN0100\nKia\nRio\n2011\n11\n");

    run_menu(&mut client, &mut c).await.unwrap();

    let saved = rows(&mut client, "SELECT make, model, year FROM car WHERE vin = 'VIN0100'").await;
    assert_eq!(saved, vec![vec!["Kia", "Rio", "2011"]]);

    let (out, err) = outputs(c);
    assert_eq!(out.matches("MAIN MENU").count(), 2);
    assert!(err.is_empty());
}

#[tokio::test]
async fn test_menu_survives_failed_workflow() {
    let mut client = empty_shop().await;
    let mut c = console("1\n11\n");

    run_menu(&mut client, &mut c).await.unwrap();

    let (out, err) = outputs(c);
    assert_eq!(out.matches("MAIN MENU").count(), 2);
    assert!(err.starts_with("Missing value:"));
}

#[tokio::test]
async fn test_menu_ends_at_end_of_input() {
    let mut client = seeded_shop().await;

    let mut c = console("");
    run_menu(&mut client, &mut c).await.unwrap();

    let mut c = console("1\nAda\n");
    run_menu(&mut client, &mut c).await.unwrap();
    assert_eq!(count(&mut client, "customer").await, "3");
}
