//! Interactive Workflows
//!
//! One async function per menu entry. Every workflow receives the session's
//! [`ShopClient`] and [`Console`] explicitly; nothing is held in globals.
//!
//! # Error Flow
//! Workflows return `Result`. The menu loop prints a failed workflow's error
//! on the console's error stream and shows the menu again. Business-rule
//! rejections (duplicate VIN, unknown last name) are not errors: they print a
//! message and return normally.
//!
//! # Identifiers
//! New customer, mechanic and service-request identifiers are `MAX(id) + 1`.
//! An empty table has no maximum, which is reported as
//! [`ShopError::MissingValue`] rather than silently starting from a default.

use chrono::NaiveDate;
use std::io::{BufRead, Write};

use crate::client::ShopClient;
use crate::console::Console;
use crate::engine::DatabaseEngine;
use crate::error::{Result, ShopError};

mod car;
mod customer;
mod mechanic;
mod report;
mod service;

pub use car::{add_car, AddCarOutcome};
pub use customer::add_customer;
pub use mechanic::add_mechanic;
pub use report::{
    cars_before_1995_under_50000_miles, close_service_request, customers_by_total_bill,
    customers_with_bill_under_100, customers_with_more_than_20_cars, top_k_serviced_cars,
};
pub use service::insert_service_request;

/// Main menu entries, numbered as shown to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    AddCustomer,
    AddMechanic,
    AddCar,
    InsertServiceRequest,
    CloseServiceRequest,
    ListCustomersWithBillLessThan100,
    ListCustomersWithMoreThan20Cars,
    ListCarsBefore1995With50000Miles,
    ListKCarsWithTheMostServices,
    ListCustomersInDescendingOrderOfTheirTotalBill,
    Exit,
}

impl MenuChoice {
    /// Every entry in menu order
    pub const ALL: [Self; 11] = [
        Self::AddCustomer,
        Self::AddMechanic,
        Self::AddCar,
        Self::InsertServiceRequest,
        Self::CloseServiceRequest,
        Self::ListCustomersWithBillLessThan100,
        Self::ListCustomersWithMoreThan20Cars,
        Self::ListCarsBefore1995With50000Miles,
        Self::ListKCarsWithTheMostServices,
        Self::ListCustomersInDescendingOrderOfTheirTotalBill,
        Self::Exit,
    ];

    /// Menu number (1-based)
    #[must_use]
    pub const fn number(self) -> i32 {
        match self {
            Self::AddCustomer => 1,
            Self::AddMechanic => 2,
            Self::AddCar => 3,
            Self::InsertServiceRequest => 4,
            Self::CloseServiceRequest => 5,
            Self::ListCustomersWithBillLessThan100 => 6,
            Self::ListCustomersWithMoreThan20Cars => 7,
            Self::ListCarsBefore1995With50000Miles => 8,
            Self::ListKCarsWithTheMostServices => 9,
            Self::ListCustomersInDescendingOrderOfTheirTotalBill => 10,
            Self::Exit => 11,
        }
    }

    /// Menu label, spelled as operators have always seen it
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AddCustomer => "AddCustomer",
            Self::AddMechanic => "AddMechanic",
            Self::AddCar => "AddCar",
            Self::InsertServiceRequest => "InsertServiceRequest",
            Self::CloseServiceRequest => "CloseServiceRequest",
            Self::ListCustomersWithBillLessThan100 => "ListCustomersWithBillLessThan100",
            Self::ListCustomersWithMoreThan20Cars => "ListCustomersWithMoreThan20Cars",
            Self::ListCarsBefore1995With50000Miles => "ListCarsBefore1995With50000Milles",
            Self::ListKCarsWithTheMostServices => "ListKCarsWithTheMostServices",
            Self::ListCustomersInDescendingOrderOfTheirTotalBill => {
                "ListCustomersInDescendingOrderOfTheirTotalBill"
            }
            Self::Exit => "< EXIT",
        }
    }

    /// Entry for a menu number, `None` if no entry has that number
    #[must_use]
    pub fn from_number(number: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.number() == number)
    }
}

/// Run one menu entry
///
/// `Exit` is a no-op here; the menu loop handles it.
pub async fn dispatch(
    choice: MenuChoice,
    client: &mut ShopClient<impl DatabaseEngine>,
    console: &mut Console<impl BufRead, impl Write, impl Write>,
) -> Result<()> {
    match choice {
        MenuChoice::AddCustomer => add_customer(client, console).await.map(drop),
        MenuChoice::AddMechanic => add_mechanic(client, console).await.map(drop),
        MenuChoice::AddCar => add_car(client, console).await.map(drop),
        MenuChoice::InsertServiceRequest => insert_service_request(client, console).await.map(drop),
        MenuChoice::CloseServiceRequest => close_service_request(client, console).await,
        MenuChoice::ListCustomersWithBillLessThan100 => {
            customers_with_bill_under_100(client, console).await
        }
        MenuChoice::ListCustomersWithMoreThan20Cars => {
            customers_with_more_than_20_cars(client, console).await.map(drop)
        }
        MenuChoice::ListCarsBefore1995With50000Miles => {
            cars_before_1995_under_50000_miles(client, console).await.map(drop)
        }
        MenuChoice::ListKCarsWithTheMostServices => {
            top_k_serviced_cars(client, console).await.map(drop)
        }
        MenuChoice::ListCustomersInDescendingOrderOfTheirTotalBill => {
            customers_by_total_bill(client, console).await
        }
        MenuChoice::Exit => Ok(()),
    }
}

/// Show the menu and run entries until the operator exits or input ends
///
/// Workflow failures are reported on the error stream and do not end the loop.
pub async fn run_menu(
    client: &mut ShopClient<impl DatabaseEngine>,
    console: &mut Console<impl BufRead, impl Write, impl Write>,
) -> Result<()> {
    loop {
        console.show_menu()?;

        let number = match console.read_choice() {
            Ok(number) => number,
            Err(ShopError::InputClosed) => return Ok(()),
            Err(e) => return Err(e),
        };

        // Numbers outside the menu just show it again
        let Some(choice) = MenuChoice::from_number(number) else {
            continue;
        };
        if choice == MenuChoice::Exit {
            return Ok(());
        }

        tracing::debug!(workflow = choice.label(), "dispatch");
        match dispatch(choice, client, console).await {
            Ok(()) => {}
            Err(ShopError::InputClosed) => return Ok(()),
            Err(e) => {
                tracing::debug!(workflow = choice.label(), code = e.error_code(), "workflow failed");
                console.report_error(&e)?;
            }
        }
    }
}

/// Next identifier for a table: one more than the current maximum
///
/// `max_query` must select a single `MAX(..)` value.
pub(crate) async fn next_id(
    client: &mut ShopClient<impl DatabaseEngine>,
    max_query: &str,
) -> Result<i32> {
    let rows = client.run_query_rows(max_query, &[]).await?;
    let max = rows
        .first()
        .and_then(|row| row.first())
        .and_then(Option::as_deref)
        .ok_or_else(|| {
            ShopError::missing_value(format!("no existing identifier returned by '{max_query}'"))
        })?;

    let max: i32 = max.trim().parse().map_err(|_| {
        ShopError::query_failed(format!("identifier '{max}' is not an integer"))
    })?;

    max.checked_add(1)
        .ok_or_else(|| ShopError::query_failed(format!("identifier {max} cannot be incremented")))
}

/// Parse a whole-number field typed by the operator
pub(crate) fn parse_int(field: &str, text: &str) -> Result<i32> {
    text.trim()
        .parse()
        .map_err(|_| ShopError::invalid_input(format!("{field} must be a whole number, got '{text}'")))
}

/// Parse a `YYYY-MM-DD` date typed by the operator
pub(crate) fn parse_date(field: &str, text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| {
        ShopError::invalid_input(format!("{field} must be a date like 2024-01-31, got '{text}'"))
    })
}
