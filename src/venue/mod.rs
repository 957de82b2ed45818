//! Каталог мест одного события: ряды, политика обхода рядов, сборка из
//! шаблона или явного списка мест.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::models::Seat;

pub mod row;

pub use row::Row;

/// Тип площадки определяет порядок предпочтения рядов.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueKind {
    /// Кино: худшие места впереди, заполняем с задних рядов.
    Screen,
    /// Сцена: лучшие места впереди, заполняем с передних рядов.
    Stage,
}

impl VenueKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "screen" => Some(VenueKind::Screen),
            "stage" => Some(VenueKind::Stage),
            _ => None,
        }
    }
}

/// Все ряды одного события. Набор рядов фиксируется при построении,
/// дальше меняются только статусы мест под мьютексами рядов.
#[derive(Debug)]
pub struct Venue {
    name: String,
    starts_at: DateTime<Utc>,
    kind: VenueKind,
    rows: BTreeMap<String, Mutex<Row>>,
}

impl Venue {
    /// Собирает площадку из шаблона: список рядов, мест в ряду, единая цена.
    /// Места нумеруются с 1.
    pub fn with_layout(
        name: impl Into<String>,
        starts_at: DateTime<Utc>,
        kind: VenueKind,
        row_ids: &[&str],
        seats_per_row: u32,
        price: f64,
    ) -> Self {
        let mut rows = BTreeMap::new();
        for row_id in row_ids {
            let mut row = Row::new(*row_id);
            for number in 1..=seats_per_row {
                row.add_seat(Seat::new(*row_id, number, price))
                    .expect("template seats always carry their own row id");
            }
            rows.insert((*row_id).to_string(), Mutex::new(row));
        }
        Self {
            name: name.into(),
            starts_at,
            kind,
            rows,
        }
    }

    /// Собирает площадку из явного списка мест. `RowMismatch` здесь
    /// невозможен (ряд выбирается по row_id места), но остаётся в контракте
    /// `Row::add_seat` на случай ручной сборки рядов.
    pub fn from_seats(
        name: impl Into<String>,
        starts_at: DateTime<Utc>,
        kind: VenueKind,
        seats: Vec<Seat>,
    ) -> Result<Self, CatalogError> {
        let mut rows: BTreeMap<String, Mutex<Row>> = BTreeMap::new();
        for seat in seats {
            let row = rows
                .entry(seat.row_id.clone())
                .or_insert_with(|| Mutex::new(Row::new(seat.row_id.clone())));
            row.get_mut().unwrap().add_seat(seat)?;
        }
        Ok(Self {
            name: name.into(),
            starts_at,
            kind,
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn starts_at(&self) -> DateTime<Utc> {
        self.starts_at
    }

    pub fn kind(&self) -> VenueKind {
        self.kind
    }

    /// Идентификаторы рядов в порядке предпочтения площадки: для кино от
    /// дальнего ряда к ближнему, для сцены наоборот.
    pub fn ranked_row_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.rows.keys().map(String::as_str).collect();
        if self.kind == VenueKind::Screen {
            ids.reverse();
        }
        ids
    }

    pub fn row(&self, row_id: &str) -> Option<&Mutex<Row>> {
        self.rows.get(row_id)
    }

    pub fn total_seats(&self) -> usize {
        self.rows
            .values()
            .map(|row| row.lock().unwrap().seat_count())
            .sum()
    }

    /// Полный пересчёт свободных мест по всем рядам. Стартовый подсчёт и
    /// сверка в тестах; горячий путь работает со счётчиком сервиса.
    pub fn available_scan(&self) -> usize {
        self.rows
            .values()
            .map(|row| row.lock().unwrap().available_count())
            .sum()
    }
}
