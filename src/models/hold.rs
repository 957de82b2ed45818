use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ссылка на место внутри брони. Цена зафиксирована в момент создания
/// брони и больше не меняется.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeldSeat {
    pub row_id: String,
    pub number: u32,
    pub price: f64,
}

/// Временная бронь: конкретные места за конкретным пользователем до
/// подтверждения или истечения срока.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hold {
    pub id: u64,
    /// Места брони, отсортированы по номеру. Все места из одного ряда.
    pub seats: Vec<HeldSeat>,
    pub total_price: f64,
    pub requester: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Hold {
    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }
}
