//! row.rs
//!
//! Ряд мест и алгоритм выбора лучшего непрерывного блока. Ряд умеет найти
//! самый длинный отрезок свободных мест и выбрать из него блок, максимально
//! близкий к центру ряда.

use std::collections::BTreeMap;

use crate::error::{CatalogError, RowError, SeatError};
use crate::models::{HeldSeat, Seat, SeatStatus};

/// Лучший непрерывный отрезок свободных мест: первый номер и длина.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestRun {
    pub start: u32,
    pub len: usize,
}

impl BestRun {
    fn end(&self) -> u32 {
        self.start + self.len as u32 - 1
    }
}

/// Ряд владеет своими местами. Все мутации статусов идут через методы ряда,
/// поэтому кеш лучшего отрезка инвалидируется в одном месте.
#[derive(Debug)]
pub struct Row {
    id: String,
    seats: BTreeMap<u32, Seat>,
    /// None — кеш устарел; Some(None) — свободных отрезков нет.
    best_run: Option<Option<BestRun>>,
}

impl Row {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            seats: BTreeMap::new(),
            best_run: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    /// Добавляет место в ряд. Используется только при построении каталога.
    pub fn add_seat(&mut self, seat: Seat) -> Result<(), CatalogError> {
        if seat.row_id != self.id {
            return Err(CatalogError::RowMismatch {
                row_id: self.id.clone(),
                seat_row: seat.row_id,
            });
        }
        self.best_run = None;
        self.seats.insert(seat.number, seat);
        Ok(())
    }

    /// Длина самого длинного непрерывного отрезка свободных мест.
    pub fn max_contiguous(&mut self) -> usize {
        self.best_run().map(|run| run.len).unwrap_or(0)
    }

    /// Лучший отрезок, с ленивым пересчётом кеша.
    fn best_run(&mut self) -> Option<BestRun> {
        if let Some(cached) = self.best_run {
            return cached;
        }
        let computed = self.scan_best_run();
        self.best_run = Some(computed);
        computed
    }

    /// Однопроходный скан ряда по возрастанию номеров. Отрезок рвётся на
    /// занятом месте и на разрыве нумерации. При равной длине побеждает
    /// первый найденный отрезок.
    fn scan_best_run(&self) -> Option<BestRun> {
        let mut best: Option<BestRun> = None;
        let mut current: Option<BestRun> = None;
        let mut prev_number: Option<u32> = None;

        for seat in self.seats.values() {
            let adjacent = prev_number == Some(seat.number.wrapping_sub(1));
            if seat.is_available() {
                current = match current {
                    Some(run) if adjacent => Some(BestRun {
                        start: run.start,
                        len: run.len + 1,
                    }),
                    _ => Some(BestRun {
                        start: seat.number,
                        len: 1,
                    }),
                };
                if current.map(|r| r.len) > best.map(|r| r.len) {
                    best = current;
                }
            } else {
                current = None;
            }
            prev_number = Some(seat.number);
        }

        best
    }

    /// Выбирает и бронирует лучший блок из `count` мест. Вычисление блока и
    /// перевод мест в Held происходят за один вызов: снаружи ряд закрыт
    /// мьютексом, поэтому никто не может увести блок между этими шагами.
    pub fn allocate(&mut self, count: usize) -> Result<Vec<HeldSeat>, RowError> {
        let run = self
            .best_run()
            .filter(|run| run.len >= count)
            .ok_or(RowError::InsufficientContiguousSeats)?;

        let numbers = self.pick_block(run, count);
        self.best_run = None;

        let mut held: Vec<u32> = Vec::with_capacity(count);
        for number in &numbers {
            let seat = self
                .seats
                .get_mut(number)
                .expect("block numbers come from the seat map");
            if let Err(e) = seat.hold() {
                // Блок увели — откатываем уже взятые места, ряд пропускаем
                self.rollback(&held);
                return Err(RowError::Seat(e));
            }
            held.push(*number);
        }

        Ok(numbers
            .into_iter()
            .map(|number| {
                let seat = &self.seats[&number];
                HeldSeat {
                    row_id: seat.row_id.clone(),
                    number,
                    price: seat.price,
                }
            })
            .collect())
    }

    fn rollback(&mut self, held: &[u32]) {
        for number in held {
            if let Some(seat) = self.seats.get_mut(number) {
                let _ = seat.release();
            }
        }
    }

    /// Выбор номеров блока внутри отрезка. Середина считается как
    /// `первый номер + размер / 2` и для отрезка, и для ряда.
    ///
    /// - середина отрезка ниже середины ряда — берём верхние `count` номеров;
    /// - выше — нижние `count`;
    /// - совпадает (пустой ряд) — от середины наружу, правый сосед первым:
    ///   справа `ceil(remaining/2)`, слева `floor(remaining/2)`. Если окно
    ///   упирается в границу отрезка, сдвигаем его внутрь.
    fn pick_block(&self, run: BestRun, count: usize) -> Vec<u32> {
        debug_assert!(count > 0 && count <= run.len);
        if count == run.len {
            return (run.start..=run.end()).collect();
        }

        let first_number = *self.seats.keys().next().expect("row is not empty");
        let row_mid = i64::from(first_number) + self.seats.len() as i64 / 2;
        let run_mid = i64::from(run.start) + run.len as i64 / 2;

        if run_mid < row_mid {
            let end = run.end();
            (end - count as u32 + 1..=end).collect()
        } else if run_mid > row_mid {
            (run.start..run.start + count as u32).collect()
        } else {
            let remaining = count as i64 - 1;
            let left = remaining / 2;
            let right = remaining - left;
            let mut lo = run_mid - left;
            let mut hi = run_mid + right;
            if lo < i64::from(run.start) {
                let shift = i64::from(run.start) - lo;
                lo += shift;
                hi += shift;
            }
            if hi > i64::from(run.end()) {
                let shift = hi - i64::from(run.end());
                lo -= shift;
                hi -= shift;
            }
            (lo as u32..=hi as u32).collect()
        }
    }

    /// Held -> Available для одного места, с инвалидацией кеша.
    pub fn release_seat(&mut self, number: u32) -> Result<(), SeatError> {
        self.best_run = None;
        let seat = self
            .seats
            .get_mut(&number)
            .expect("released seats always exist in their row");
        seat.release()
    }

    /// Held -> Committed для одного места, с инвалидацией кеша.
    pub fn commit_seat(&mut self, number: u32) -> Result<(), SeatError> {
        self.best_run = None;
        let seat = self
            .seats
            .get_mut(&number)
            .expect("committed seats always exist in their row");
        seat.commit()
    }

    pub fn seat_status(&self, number: u32) -> Option<SeatStatus> {
        self.seats.get(&number).map(|seat| seat.status())
    }

    /// Полный пересчёт свободных мест. Только для стартового подсчёта,
    /// диагностики и тестов — не для горячего пути.
    pub fn available_count(&self) -> usize {
        self.seats.values().filter(|seat| seat.is_available()).count()
    }
}
