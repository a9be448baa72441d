//! Command line timetable client for the Swiss public transport API
//! ([transport.opendata.ch](http://transport.opendata.ch)).
//!
//! The pipeline is linear: parse the command line into a [`ConnectionQuery`],
//! fetch the raw connections with [`TimetableClient`], flatten each one with
//! [`normalize`] and print them with [`render_connections`].

pub mod cli;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod models;
pub mod query;
pub mod table;

pub use cli::{Invocation, NaturalLanguageArgs, StructuredArgs};
pub use client::TimetableClient;
pub use config::ClientConfig;
pub use connection::{normalize, DisplayRow, Occupancy};
pub use error::{FahrplanError, Result};
pub use models::RawConnection;
pub use query::{ConnectionQuery, TimeMode};
pub use table::{render_connections, TablePrinter};

/// Printed instead of a table when the API found nothing
pub const NO_CONNECTIONS: &str = "No connections found.";

/// Normalize every connection, then render the table into a buffer.
///
/// Nothing is returned unless all connections normalized, so a bad record
/// never leaves a half-printed table behind. An empty result renders as
/// [`NO_CONNECTIONS`] rather than a bare header.
pub fn render_table(connections: &[RawConnection]) -> Result<Vec<u8>> {
    if connections.is_empty() {
        return Ok(format!("{NO_CONNECTIONS}\n").into_bytes());
    }

    let rows = connections
        .iter()
        .map(normalize)
        .collect::<Result<Vec<DisplayRow>>>()?;

    let mut out = Vec::new();
    render_connections(&mut out, &rows)?;
    Ok(out)
}
