pub mod commitment;
pub mod hold;
pub mod seat;

pub use commitment::Commitment;
pub use hold::{HeldSeat, Hold};
pub use seat::{Seat, SeatStatus};
