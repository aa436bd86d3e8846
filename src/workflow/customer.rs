//! AddCustomer

use std::io::{BufRead, Write};

use crate::client::ShopClient;
use crate::console::Console;
use crate::engine::{DatabaseEngine, SqlValue};
use crate::error::Result;
use crate::workflow::next_id;

const MAX_ID: &str = "SELECT MAX(id) FROM customer";

const INSERT: &str =
    "INSERT INTO customer (id, fname, lname, phone, address) VALUES ($1, $2, $3, $4, $5)";

/// Prompt for a new customer and insert it, returning the assigned id
pub async fn add_customer(
    client: &mut ShopClient<impl DatabaseEngine>,
    console: &mut Console<impl BufRead, impl Write, impl Write>,
) -> Result<i32> {
    let id = next_id(client, MAX_ID).await?;

    let fname = console.prompt("Enter first name: ")?;
    let lname = console.prompt("Enter last name: ")?;
    let phone = console.prompt("Enter phone: ")?;
    let address = console.prompt("Enter address: ")?;

    client
        .run_update(INSERT, &[
            SqlValue::Int(id),
            fname.into(),
            lname.into(),
            phone.into(),
            address.into(),
        ])
        .await?;

    tracing::info!(id, "customer added");
    Ok(id)
}
