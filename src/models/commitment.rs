use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::hold::HeldSeat;

/// Подтверждённая покупка. Создаётся один раз при подтверждении брони
/// и больше не изменяется.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commitment {
    /// Уникальный код подтверждения (UUID v4).
    pub code: String,
    pub requester: String,
    pub seats: Vec<HeldSeat>,
    pub total_price: f64,
    pub confirmed_at: DateTime<Utc>,
}
