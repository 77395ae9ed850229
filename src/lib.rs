//! Track student-housing listings and their interest queues.
//!
//! [`scrapers`] turns the portal's listing widgets into [`Accommodation`]s;
//! [`store`] keeps them in SQLite for later lookup. The two never call each
//! other; the binary wires them together.

pub mod config;
pub mod error;
pub mod models;
pub mod scrapers;
pub mod store;

pub use error::{Error, Result};
pub use models::{Accommodation, ListingDetails, QueuePoints, DIRECT_ALLOCATION};
pub use store::{AccommodationStore, Filter};
