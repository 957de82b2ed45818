pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod venue;

pub use config::Config;
pub use error::{CatalogError, ReservationError, SeatError};
pub use models::{Commitment, HeldSeat, Hold, Seat, SeatStatus};
pub use services::{HoldLedger, ReservationService};
pub use venue::{Row, Venue, VenueKind};
