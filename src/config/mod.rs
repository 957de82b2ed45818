use serde::Deserialize;
use std::env;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub venue: VenueConfig,
    pub hold: HoldConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub rust_log: String,
}

// Шаблон площадки по умолчанию
#[derive(Debug, Clone, Deserialize)]
pub struct VenueConfig {
    pub name: String,
    /// Идентификаторы рядов по порядку от сцены/экрана.
    pub rows: Vec<String>,
    pub seats_per_row: u32,
    pub seat_price: f64,
    /// "screen" или "stage" — от этого зависит порядок обхода рядов.
    pub kind: String,
}

// Настройки жизни брони
#[derive(Debug, Clone, Deserialize)]
pub struct HoldConfig {
    /// Сколько секунд бронь ждёт подтверждения до автоотмены.
    pub ttl_seconds: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "seathold=debug".to_string()),
            },
            venue: VenueConfig {
                name: env::var("VENUE_NAME").unwrap_or_else(|_| "Main Hall".to_string()),
                rows: env::var("VENUE_ROWS")
                    .unwrap_or_else(|_| "A,B,C,D,E,F,G".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                seats_per_row: env::var("VENUE_SEATS_PER_ROW")
                    .unwrap_or_else(|_| "12".to_string())
                    .parse()
                    .expect("VENUE_SEATS_PER_ROW must be a valid number"),
                seat_price: env::var("VENUE_SEAT_PRICE")
                    .unwrap_or_else(|_| "20.0".to_string())
                    .parse()
                    .expect("VENUE_SEAT_PRICE must be a valid number"),
                kind: env::var("VENUE_KIND").unwrap_or_else(|_| "stage".to_string()),
            },
            hold: HoldConfig {
                ttl_seconds: env::var("HOLD_TTL_SECONDS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .expect("HOLD_TTL_SECONDS must be a valid number"),
            },
        }
    }
}
