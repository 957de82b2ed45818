pub mod ledger;
pub mod reservation;

pub use ledger::HoldLedger;
pub use reservation::ReservationService;
