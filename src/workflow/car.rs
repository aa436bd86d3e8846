//! AddCar
//!
//! The VIN is the car's key. An existing VIN is shown to the operator and the
//! workflow stops without inserting; that is a rejection, not an error.

use std::io::{BufRead, Write};

use crate::client::ShopClient;
use crate::console::Console;
use crate::engine::{DatabaseEngine, SqlValue};
use crate::error::Result;
use crate::workflow::parse_int;

const FIND_BY_VIN: &str = "SELECT * FROM car WHERE vin = $1";

/// `year` may be a domain over `int4`; the cast types the parameter as plain `int4`
const INSERT: &str =
    "INSERT INTO car (vin, make, model, year) VALUES ($1, $2, $3, CAST($4 AS INTEGER))";

/// What `add_car` did with the submitted VIN
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddCarOutcome {
    /// A new car row was inserted
    Inserted(String),
    /// A car with this VIN already exists; nothing was inserted
    Duplicate(String),
}

/// Prompt for a new car and insert it unless its VIN is taken
pub async fn add_car(
    client: &mut ShopClient<impl DatabaseEngine>,
    console: &mut Console<impl BufRead, impl Write, impl Write>,
) -> Result<AddCarOutcome> {
    let vin = console.prompt("Enter VIN: ")?;

    let existing = client
        .run_query_print(console.out(), FIND_BY_VIN, &[SqlValue::from(vin.as_str())])
        .await?;
    if existing >= 1 {
        console.say("VIN already exists in database")?;
        return Ok(AddCarOutcome::Duplicate(vin));
    }

    let make = console.prompt("Enter make: ")?;
    let model = console.prompt("Enter model: ")?;
    let year = console.prompt("Enter year (Format XXXX): ")?;
    let year = parse_int("year", &year)?;

    client
        .run_update(INSERT, &[
            SqlValue::from(vin.as_str()),
            make.into(),
            model.into(),
            SqlValue::Int(year),
        ])
        .await?;

    tracing::info!(vin = %vin, "car added");
    Ok(AddCarOutcome::Inserted(vin))
}
