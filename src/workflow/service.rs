//! InsertServiceRequest
//!
//! Opens a service request for a customer found by last name:
//! 1. read and confirm a last name (repeat until the operator answers `Y`/`y`)
//! 2. if no customer has it, offer to add one; declining ends the workflow
//! 3. print the matching customers and read the chosen customer id
//! 4. list the customer's cars and optionally add a new car
//! 5. read VIN, complaint, date and odometer, then insert with `MAX(rid) + 1`
//!
//! The typed customer id and VIN are not checked against what was printed;
//! the database's own constraints decide.

use std::io::{BufRead, Write};

use crate::client::ShopClient;
use crate::console::Console;
use crate::engine::{DatabaseEngine, SqlValue};
use crate::error::Result;
use crate::workflow::{add_car, add_customer, next_id, parse_date, parse_int};

const FIND_BY_LAST_NAME: &str = "SELECT * FROM customer WHERE lname = $1";

const CARS_OF_CUSTOMER: &str = "SELECT o.car_vin, c.make, c.model \
     FROM owns o, car c \
     WHERE o.customer_id = $1 AND o.car_vin = c.vin";

const MAX_RID: &str = "SELECT MAX(rid) FROM service_request";

/// `odometer` may be a domain over `int4`; the cast types the parameter as plain `int4`
const INSERT: &str = "INSERT INTO service_request (rid, customer_id, car_vin, date, odometer, complain) \
     VALUES ($1, $2, $3, $4, CAST($5 AS INTEGER), $6)";

/// Open a service request; returns the new request id, or `None` if the
/// operator declined to create a missing customer
pub async fn insert_service_request(
    client: &mut ShopClient<impl DatabaseEngine>,
    console: &mut Console<impl BufRead, impl Write, impl Write>,
) -> Result<Option<i32>> {
    let last_name = loop {
        let candidate = console.prompt("Enter a last name: ")?;
        if console.confirm(&format!("{candidate}; is this correct? (Y/N): "))? {
            break candidate;
        }
    };
    let by_last_name = [SqlValue::from(last_name.as_str())];

    if client.run_query_exists(FIND_BY_LAST_NAME, &by_last_name).await? < 1 {
        console.say("Last name not in database")?;
        if !console.confirm("Create new customer? (Y/N): ")? {
            console.say("Ok, returning to main menu")?;
            return Ok(None);
        }
        add_customer(client, console).await?;
        console.say("\n\ncreating...\n")?;
    }

    client.run_query_print(console.out(), FIND_BY_LAST_NAME, &by_last_name).await?;
    let customer_id = console.prompt("Enter the correct ID of your customer: ")?;
    let customer_id = parse_int("customer id", &customer_id)?;

    console.say("\nListing customer's cars (vin):")?;
    client.run_query_print(console.out(), CARS_OF_CUSTOMER, &[SqlValue::Int(customer_id)]).await?;

    if console.confirm("Create new car? (Y/N): ")? {
        add_car(client, console).await?;
        console.say("\n\ncreating...\n")?;
    }

    let vin = console.prompt("Enter the VIN of the problem car: ")?;
    let complaint = console.prompt("Enter the problem: ")?;
    let date = console.prompt("Enter the date (YYYY-MM-DD): ")?;
    let date = parse_date("date", &date)?;
    let odometer = console.prompt("Enter odometer reading: ")?;
    let odometer = parse_int("odometer reading", &odometer)?;

    let rid = next_id(client, MAX_RID).await?;

    client
        .run_update(INSERT, &[
            SqlValue::Int(rid),
            SqlValue::Int(customer_id),
            vin.into(),
            date.into(),
            SqlValue::Int(odometer),
            complaint.into(),
        ])
        .await?;

    console.say("\n\nService request opened")?;
    tracing::info!(rid, customer_id, "service request opened");
    Ok(Some(rid))
}
