//! reservation.rs
//!
//! Сервис бронирования: ранжирует ряды по политике площадки, создаёт брони
//! на лучшие непрерывные блоки, подтверждает их в покупки и ведёт живой
//! счётчик свободных мест.
//!
//! Счётчик — производный кеш, а не второй источник истины: он корректируется
//! ровно на каждом переходе места в Available и обратно, и в тестах
//! сверяется с полным сканом в точках покоя.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{ReservationError, RowError};
use crate::models::{Commitment, Hold, SeatStatus};
use crate::venue::{Venue, VenueKind};

use super::ledger::HoldLedger;

/// Внутреннее состояние сервиса. Отдельная структура, чтобы таймеры ledger'а
/// могли держать Weak-ссылку и не продлевать жизнь площадки.
pub(crate) struct ServiceInner {
    venue: Venue,
    available: AtomicUsize,
    ledger: HoldLedger,
    commitments: Mutex<HashMap<String, Commitment>>,
    hold_ttl: Duration,
}

impl ServiceInner {
    /// Путь истечения брони: вернуть ещё забронированные места в продажу.
    /// Уже проданные места не трогаем — подтверждение выиграло гонку.
    pub(crate) fn expire_hold(&self, hold_id: u64) {
        let Some(hold) = self.ledger.take_fired(hold_id) else {
            // Подтверждение или отмена успели первыми
            return;
        };
        let released = self.release_hold_seats(&hold);
        info!(
            hold_id,
            requester = %hold.requester,
            released,
            "⏰ hold expired, seats returned to inventory"
        );
    }

    /// Освобождает места брони и возвращает их в счётчик. Общий код для
    /// истечения и явной отмены.
    fn release_hold_seats(&self, hold: &Hold) -> usize {
        let row_id = &hold.seats[0].row_id;
        let mut released = 0usize;
        {
            let mut row = self
                .venue
                .row(row_id)
                .expect("hold seats reference an existing row")
                .lock()
                .unwrap();
            for seat in &hold.seats {
                match row.release_seat(seat.number) {
                    Ok(()) => released += 1,
                    // Место уже продано: release для него не существует
                    Err(_) => {}
                }
            }
        }
        self.notify_seats_released(released);
        released
    }

    /// Уведомление "места вернулись в продажу": прямой вызов в счётчик,
    /// без реестра слушателей.
    fn notify_seats_released(&self, count: usize) {
        self.available.fetch_add(count, Ordering::Relaxed);
    }
}

/// Публичный фасад бронирования для одного события.
#[derive(Clone)]
pub struct ReservationService {
    inner: Arc<ServiceInner>,
}

impl ReservationService {
    pub fn new(venue: Venue, hold_ttl: Duration) -> Self {
        let available = venue.available_scan();
        info!(
            venue = venue.name(),
            kind = ?venue.kind(),
            seats = available,
            ttl_secs = hold_ttl.as_secs(),
            "reservation service ready"
        );
        Self {
            inner: Arc::new(ServiceInner {
                venue,
                available: AtomicUsize::new(available),
                ledger: HoldLedger::new(),
                commitments: Mutex::new(HashMap::new()),
                hold_ttl,
            }),
        }
    }

    /// Собирает сервис из конфигурации: шаблон площадки + TTL брони.
    pub fn from_config(config: &Config) -> Self {
        let row_ids: Vec<&str> = config.venue.rows.iter().map(String::as_str).collect();
        let kind = VenueKind::parse(&config.venue.kind)
            .expect("VENUE_KIND must be 'screen' or 'stage'");
        let venue = Venue::with_layout(
            &config.venue.name,
            Utc::now(),
            kind,
            &row_ids,
            config.venue.seats_per_row,
            config.venue.seat_price,
        );
        Self::new(venue, Duration::from_secs(config.hold.ttl_seconds))
    }

    /// Живой счётчик свободных мест, O(1).
    pub fn available_seat_count(&self) -> usize {
        self.inner.available.load(Ordering::Relaxed)
    }

    /// Находит и бронирует лучшие `count` мест, сидящих вместе в одном ряду.
    ///
    /// Ряды обходятся в порядке предпочтения площадки; выигрывает первый ряд
    /// с подходящим блоком. Ряд, чей блок увели конкурентным запросом,
    /// пропускается — вызывающий не видит ошибку из-за проигранной гонки,
    /// пока остаются другие ряды.
    pub fn find_and_hold_seats(
        &self,
        count: usize,
        requester: &str,
    ) -> Result<Hold, ReservationError> {
        if count == 0 || count > self.available_seat_count() {
            return Err(ReservationError::InsufficientInventory);
        }

        for row_id in self.inner.venue.ranked_row_ids() {
            let seats = {
                let mut row = self
                    .inner
                    .venue
                    .row(row_id)
                    .expect("ranked ids come from the venue itself")
                    .lock()
                    .unwrap();
                match row.allocate(count) {
                    Ok(seats) => seats,
                    Err(RowError::InsufficientContiguousSeats) => continue,
                    Err(RowError::Seat(e)) => {
                        debug!(row_id, error = %e, "row block raced away, trying next row");
                        continue;
                    }
                }
            };

            // fetch_sub после успеха: места уже переведены в Held под
            // мьютексом ряда, счётчик догоняет их атомарно
            self.inner.available.fetch_sub(count, Ordering::Relaxed);

            let now = Utc::now();
            let hold = Hold {
                id: self.inner.ledger.next_hold_id(),
                total_price: seats.iter().map(|s| s.price).sum(),
                seats,
                requester: requester.to_string(),
                created_at: now,
                expires_at: now
                    + chrono::Duration::from_std(self.inner.hold_ttl)
                        .expect("hold ttl fits in a chrono duration"),
            };
            self.inner
                .ledger
                .arm(hold.clone(), self.inner.hold_ttl, Arc::downgrade(&self.inner));

            info!(
                hold_id = hold.id,
                requester,
                row = row_id,
                seats = hold.seat_count(),
                total = hold.total_price,
                "🎫 seats held"
            );
            return Ok(hold);
        }

        // Суммарно мест хватает, но единого блока нет ни в одном ряду
        Err(ReservationError::InsufficientInventory)
    }

    /// Подтверждает бронь в покупку и возвращает код подтверждения.
    ///
    /// Запись забирается из реестра до каких-либо действий с местами, поэтому
    /// подтверждение и истечение взаимоисключающи: у брони ровно один
    /// терминальный исход.
    pub fn confirm_hold(
        &self,
        hold_id: u64,
        requester: &str,
    ) -> Result<String, ReservationError> {
        let hold = self.inner.ledger.take_for_owner(hold_id, requester)?;

        {
            let mut row = self
                .inner
                .venue
                .row(&hold.seats[0].row_id)
                .expect("hold seats reference an existing row")
                .lock()
                .unwrap();

            // Двухфазно: сначала проверяем все места, потом переводим.
            // Частично подтверждённая бронь невозможна.
            for seat in &hold.seats {
                match row.seat_status(seat.number) {
                    Some(SeatStatus::Held) => {}
                    Some(SeatStatus::Available) => {
                        // Страховка: таймер должен был удалить запись раньше
                        return Err(ReservationError::HoldExpired(hold_id));
                    }
                    Some(SeatStatus::Committed) | None => {
                        error!(
                            hold_id,
                            row = %seat.row_id,
                            number = seat.number,
                            "seat already committed under an active hold, consistency bug"
                        );
                        return Err(ReservationError::AlreadyConsumed(hold_id));
                    }
                }
            }
            for seat in &hold.seats {
                row.commit_seat(seat.number)
                    .expect("seat was verified Held under this row lock");
            }
        }

        let code = Uuid::new_v4().to_string();
        let commitment = Commitment {
            code: code.clone(),
            requester: hold.requester.clone(),
            seats: hold.seats.clone(),
            total_price: hold.total_price,
            confirmed_at: Utc::now(),
        };
        self.inner
            .commitments
            .lock()
            .unwrap()
            .insert(code.clone(), commitment);

        info!(hold_id, requester, code = %code, "✅ hold confirmed");
        Ok(code)
    }

    /// Явная отмена брони владельцем: таймер снимается, места сразу
    /// возвращаются в продажу.
    pub fn cancel_hold(&self, hold_id: u64, requester: &str) -> Result<(), ReservationError> {
        let hold = self.inner.ledger.take_for_owner(hold_id, requester)?;
        let released = self.inner.release_hold_seats(&hold);
        info!(hold_id, requester, released, "hold cancelled");
        Ok(())
    }

    /// Покупка по коду подтверждения.
    pub fn commitment(&self, code: &str) -> Option<Commitment> {
        self.inner.commitments.lock().unwrap().get(code).cloned()
    }

    /// Количество активных броней.
    pub fn outstanding_holds(&self) -> usize {
        self.inner.ledger.outstanding()
    }

    /// Полный пересчёт свободных мест. Сверка счётчика в тестах и
    /// диагностике, не горячий путь.
    pub fn available_scan(&self) -> usize {
        self.inner.venue.available_scan()
    }
}
