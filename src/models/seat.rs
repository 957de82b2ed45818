use serde::{Deserialize, Serialize};

use crate::error::SeatError;

/// Статусы места: свободно, забронировано, продано.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatStatus {
    Available,
    Held,
    Committed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub row_id: String,
    pub number: u32,
    pub price: f64,
    status: SeatStatus,
}

impl Seat {
    pub fn new(row_id: impl Into<String>, number: u32, price: f64) -> Self {
        Self {
            row_id: row_id.into(),
            number,
            price,
            status: SeatStatus::Available,
        }
    }

    pub fn status(&self) -> SeatStatus {
        self.status
    }

    pub fn is_available(&self) -> bool {
        self.status == SeatStatus::Available
    }

    /// Available -> Held. Единственный путь забронировать место.
    pub fn hold(&mut self) -> Result<(), SeatError> {
        if self.status != SeatStatus::Available {
            return Err(self.not_available());
        }
        self.status = SeatStatus::Held;
        Ok(())
    }

    /// Held -> Committed. Терминальный статус, дальше переходов нет.
    pub fn commit(&mut self) -> Result<(), SeatError> {
        if self.status != SeatStatus::Held {
            return Err(self.not_held());
        }
        self.status = SeatStatus::Committed;
        Ok(())
    }

    /// Held -> Available. Возврат места в продажу по таймауту или отмене.
    pub fn release(&mut self) -> Result<(), SeatError> {
        if self.status != SeatStatus::Held {
            return Err(self.not_held());
        }
        self.status = SeatStatus::Available;
        Ok(())
    }

    fn not_available(&self) -> SeatError {
        SeatError::NotAvailable {
            row_id: self.row_id.clone(),
            number: self.number,
            status: self.status,
        }
    }

    fn not_held(&self) -> SeatError {
        SeatError::NotHeld {
            row_id: self.row_id.clone(),
            number: self.number,
            status: self.status,
        }
    }
}
