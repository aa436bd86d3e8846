//! AddMechanic

use std::io::{BufRead, Write};

use crate::client::ShopClient;
use crate::console::Console;
use crate::engine::{DatabaseEngine, SqlValue};
use crate::error::Result;
use crate::workflow::{next_id, parse_int};

const MAX_ID: &str = "SELECT MAX(id) FROM mechanic";

/// `experience` may be a domain over `int4`; the cast types the parameter as plain `int4`
const INSERT: &str = "INSERT INTO mechanic (id, fname, lname, experience) \
     VALUES ($1, $2, $3, CAST($4 AS INTEGER))";

/// Prompt for a new mechanic and insert it, returning the assigned id
pub async fn add_mechanic(
    client: &mut ShopClient<impl DatabaseEngine>,
    console: &mut Console<impl BufRead, impl Write, impl Write>,
) -> Result<i32> {
    let id = next_id(client, MAX_ID).await?;

    let fname = console.prompt("Enter first name: ")?;
    let lname = console.prompt("Enter last name: ")?;
    let experience = console.prompt("Enter years of experience: ")?;
    let experience = parse_int("years of experience", &experience)?;

    client
        .run_update(INSERT, &[
            SqlValue::Int(id),
            fname.into(),
            lname.into(),
            SqlValue::Int(experience),
        ])
        .await?;

    tracing::info!(id, "mechanic added");
    Ok(id)
}
