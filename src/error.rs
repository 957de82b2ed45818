use thiserror::Error;

use crate::models::SeatStatus;

/// Ошибки уровня сервиса бронирования. Это единственные ошибки,
/// которые видит внешний вызывающий код.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReservationError {
    /// Недостаточно мест: либо мест меньше, чем запрошено, либо ни в одном
    /// ряду нет непрерывного блока нужной длины.
    #[error("there are not enough seats available")]
    InsufficientInventory,

    /// Hold с таким id не существует (или уже истёк и был удалён).
    #[error("hold {0} does not exist")]
    UnknownHold(u64),

    /// Hold существует, но принадлежит другому пользователю.
    #[error("hold {0} is not owned by this requester")]
    OwnershipMismatch(u64),

    /// Срок брони истёк, места вернулись в продажу.
    #[error("hold {0} has expired")]
    HoldExpired(u64),

    /// Места из брони уже проданы. Признак нарушения консистентности.
    #[error("seats in hold {0} were already committed")]
    AlreadyConsumed(u64),
}

/// Недопустимый переход статуса места. Локальная ошибка: всегда
/// перехватывается и конвертируется до выхода наружу.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeatError {
    #[error("seat {row_id}{number} is not available (status {status:?})")]
    NotAvailable {
        row_id: String,
        number: u32,
        status: SeatStatus,
    },
    #[error("seat {row_id}{number} is not held (status {status:?})")]
    NotHeld {
        row_id: String,
        number: u32,
        status: SeatStatus,
    },
}

/// Ошибка выделения блока внутри ряда. Наружу не выходит: сервис либо
/// переходит к следующему ряду, либо возвращает `InsufficientInventory`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("there is no contiguous block of the requested size in this row")]
    InsufficientContiguousSeats,
    /// Переход статуса не удался: блок увели из-под нас.
    #[error(transparent)]
    Seat(#[from] SeatError),
}

/// Ошибки построения каталога мест. Фатальны на старте, в рантайме не встречаются.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Место вставлено не в свой ряд.
    #[error("seat belongs to row {seat_row}, not row {row_id}")]
    RowMismatch { row_id: String, seat_row: String },
}
