//! Listings and the billing entries
//!
//! The three listings print their result set and return the row count.
//! Closing a request and the two bill-based listings need billing data the
//! shop schema does not carry, so they fail with `NotImplemented`.

use std::io::{BufRead, Write};

use crate::client::ShopClient;
use crate::console::Console;
use crate::engine::{DatabaseEngine, SqlValue};
use crate::error::{Result, ShopError};
use crate::workflow::{parse_int, MenuChoice};

const MORE_THAN_20_CARS: &str = "SELECT c.fname, c.lname, COUNT(DISTINCT o.car_vin) AS cars \
     FROM customer c JOIN owns o ON o.customer_id = c.id \
     GROUP BY c.id, c.fname, c.lname \
     HAVING COUNT(DISTINCT o.car_vin) > 20 \
     ORDER BY c.lname, c.fname";

const BEFORE_1995_UNDER_50000: &str = "SELECT DISTINCT c.make, c.model, c.year \
     FROM car c JOIN service_request s ON s.car_vin = c.vin \
     WHERE c.year < 1995 AND s.odometer < 50000 \
     ORDER BY c.year, c.make, c.model";

const TOP_K_SERVICED: &str = "SELECT c.make, c.model, COUNT(s.rid) AS services \
     FROM car c JOIN service_request s ON s.car_vin = c.vin \
     GROUP BY c.vin, c.make, c.model \
     ORDER BY services DESC, c.vin \
     LIMIT $1";

/// CloseServiceRequest
pub async fn close_service_request(
    _client: &mut ShopClient<impl DatabaseEngine>,
    _console: &mut Console<impl BufRead, impl Write, impl Write>,
) -> Result<()> {
    Err(ShopError::not_implemented(MenuChoice::CloseServiceRequest.label()))
}

/// ListCustomersWithBillLessThan100
pub async fn customers_with_bill_under_100(
    _client: &mut ShopClient<impl DatabaseEngine>,
    _console: &mut Console<impl BufRead, impl Write, impl Write>,
) -> Result<()> {
    Err(ShopError::not_implemented(MenuChoice::ListCustomersWithBillLessThan100.label()))
}

/// ListCustomersInDescendingOrderOfTheirTotalBill
pub async fn customers_by_total_bill(
    _client: &mut ShopClient<impl DatabaseEngine>,
    _console: &mut Console<impl BufRead, impl Write, impl Write>,
) -> Result<()> {
    Err(ShopError::not_implemented(
        MenuChoice::ListCustomersInDescendingOrderOfTheirTotalBill.label(),
    ))
}

/// First and last name of customers owning more than 20 distinct cars
pub async fn customers_with_more_than_20_cars(
    client: &mut ShopClient<impl DatabaseEngine>,
    console: &mut Console<impl BufRead, impl Write, impl Write>,
) -> Result<usize> {
    let count = client.run_query_print(console.out(), MORE_THAN_20_CARS, &[]).await?;
    if count == 0 {
        console.say("No customer owns more than 20 cars")?;
    }
    Ok(count)
}

/// Make, model and year of cars built before 1995 serviced at under 50000 miles
pub async fn cars_before_1995_under_50000_miles(
    client: &mut ShopClient<impl DatabaseEngine>,
    console: &mut Console<impl BufRead, impl Write, impl Write>,
) -> Result<usize> {
    let count = client.run_query_print(console.out(), BEFORE_1995_UNDER_50000, &[]).await?;
    if count == 0 {
        console.say("No matching cars")?;
    }
    Ok(count)
}

/// Make, model and request count of the k most-serviced cars
pub async fn top_k_serviced_cars(
    client: &mut ShopClient<impl DatabaseEngine>,
    console: &mut Console<impl BufRead, impl Write, impl Write>,
) -> Result<usize> {
    let k = console.prompt("Enter k: ")?;
    let k = parse_int("k", &k)?;
    if k < 1 {
        return Err(ShopError::invalid_input(format!("k must be at least 1, got {k}")));
    }

    let count = client
        .run_query_print(console.out(), TOP_K_SERVICED, &[SqlValue::BigInt(i64::from(k))])
        .await?;
    if count == 0 {
        console.say("No service requests recorded")?;
    }
    Ok(count)
}
