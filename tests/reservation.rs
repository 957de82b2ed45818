//! Сквозные сценарии бронирования: ранжирование рядов, жизненный цикл
//! брони (hold -> confirm / expire / cancel) и сверка живого счётчика с
//! полным сканом в точках покоя. Таймеры проверяются на приостановленном
//! времени tokio, без реальных ожиданий.

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use seathold::{ReservationError, ReservationService, Venue, VenueKind};

const ROWS: [&str; 7] = ["A", "B", "C", "D", "E", "F", "G"];
const TTL: Duration = Duration::from_secs(300);

fn stage_service() -> ReservationService {
    let venue = Venue::with_layout("Theater", Utc::now(), VenueKind::Stage, &ROWS, 12, 20.0);
    ReservationService::new(venue, TTL)
}

fn screen_service() -> ReservationService {
    let venue = Venue::with_layout("Movie", Utc::now(), VenueKind::Screen, &ROWS, 12, 20.0);
    ReservationService::new(venue, TTL)
}

async fn let_holds_expire() {
    // На паузе время прыгает сразу к дедлайну таймера
    tokio::time::sleep(TTL + Duration::from_secs(1)).await;
}

#[tokio::test(start_paused = true)]
async fn screen_venue_fills_from_the_back() {
    let service = screen_service();
    assert_eq!(service.available_seat_count(), 84);

    // Для кино лучшие места сзади: первый запрос уходит в ряд G
    let hold = service.find_and_hold_seats(7, "u1").unwrap();
    assert_eq!(hold.seat_count(), 7);
    assert!(hold.seats.iter().all(|s| s.row_id == "G"));
    assert_eq!(hold.total_price, 140.0);
    assert_eq!(service.available_seat_count(), 77);

    // В G осталось максимум 3 подряд — следующий блок из 8 берётся из F
    let hold = service.find_and_hold_seats(8, "u1").unwrap();
    assert!(hold.seats.iter().all(|s| s.row_id == "F"));
    assert_eq!(service.available_seat_count(), 69);
    assert_eq!(service.available_scan(), 69);
}

#[tokio::test(start_paused = true)]
async fn stage_venue_centers_block_in_front_row() {
    let service = stage_service();

    let hold = service.find_and_hold_seats(5, "u1").unwrap();
    let numbers: Vec<u32> = hold.seats.iter().map(|s| s.number).collect();
    assert!(hold.seats.iter().all(|s| s.row_id == "A"));
    assert_eq!(numbers, vec![5, 6, 7, 8, 9]);

    // Повторный запрос получает те же места, но уже в ряду B
    let hold = service.find_and_hold_seats(5, "u1").unwrap();
    let numbers: Vec<u32> = hold.seats.iter().map(|s| s.number).collect();
    assert!(hold.seats.iter().all(|s| s.row_id == "B"));
    assert_eq!(numbers, vec![5, 6, 7, 8, 9]);
}

#[tokio::test(start_paused = true)]
async fn confirm_produces_commitment_and_survives_expiry() {
    let service = stage_service();
    let hold = service.find_and_hold_seats(5, "u1").unwrap();
    let code = service.confirm_hold(hold.id, "u1").unwrap();
    assert_eq!(service.available_seat_count(), 79);

    let commitment = service.commitment(&code).unwrap();
    assert_eq!(commitment.requester, "u1");
    assert_eq!(commitment.total_price, 100.0);
    assert_eq!(commitment.seats, hold.seats);

    // Проданные места не возвращаются по таймеру
    let_holds_expire().await;
    assert_eq!(service.available_seat_count(), 79);
    assert_eq!(service.available_scan(), 79);

    // Блок из 9 в ряд A уже не помещается — уходит в B
    let hold = service.find_and_hold_seats(9, "u1").unwrap();
    assert!(hold.seats.iter().all(|s| s.row_id == "B"));

    // А блок из 2 в ряду A ещё есть
    let hold = service.find_and_hold_seats(2, "u1").unwrap();
    assert!(hold.seats.iter().all(|s| s.row_id == "A"));
}

#[tokio::test(start_paused = true)]
async fn expired_hold_releases_seats_and_rejects_confirm() {
    let service = stage_service();
    let hold = service.find_and_hold_seats(5, "u1").unwrap();
    assert_eq!(service.available_seat_count(), 79);
    assert_eq!(service.outstanding_holds(), 1);

    let_holds_expire().await;

    // Места вернулись, счётчик совпадает со сканом
    assert_eq!(service.available_seat_count(), 84);
    assert_eq!(service.available_scan(), 84);
    assert_eq!(service.outstanding_holds(), 0);

    // Позднее подтверждение отличимо от несуществующей брони
    assert_eq!(
        service.confirm_hold(hold.id, "u1"),
        Err(ReservationError::HoldExpired(hold.id))
    );
}

#[tokio::test(start_paused = true)]
async fn double_confirm_fails_second_time() {
    let service = stage_service();
    let hold = service.find_and_hold_seats(5, "u1").unwrap();
    service.confirm_hold(hold.id, "u1").unwrap();

    // Запись уже забрана из реестра: у брони ровно один терминальный исход
    assert_eq!(
        service.confirm_hold(hold.id, "u1"),
        Err(ReservationError::UnknownHold(hold.id))
    );
    assert_eq!(service.available_seat_count(), 79);
}

#[tokio::test(start_paused = true)]
async fn wrong_requester_cannot_confirm_or_cancel() {
    let service = stage_service();
    let hold = service.find_and_hold_seats(7, "u1").unwrap();

    assert_eq!(
        service.confirm_hold(hold.id, "u2"),
        Err(ReservationError::OwnershipMismatch(hold.id))
    );
    assert_eq!(
        service.cancel_hold(hold.id, "u2"),
        Err(ReservationError::OwnershipMismatch(hold.id))
    );

    // Чужая попытка ничего не изменила: бронь жива и подтверждается владельцем
    assert_eq!(service.available_seat_count(), 77);
    assert_eq!(service.outstanding_holds(), 1);
    service.confirm_hold(hold.id, "u1").unwrap();
    assert_eq!(service.available_scan(), 77);
}

#[tokio::test(start_paused = true)]
async fn unknown_hold_is_reported() {
    let service = stage_service();
    assert_eq!(
        service.confirm_hold(9999, "u1"),
        Err(ReservationError::UnknownHold(9999))
    );
}

#[tokio::test(start_paused = true)]
async fn insufficient_inventory_fast_path() {
    let service = stage_service();
    assert_eq!(
        service.find_and_hold_seats(85, "u1"),
        Err(ReservationError::InsufficientInventory)
    );
    assert_eq!(
        service.find_and_hold_seats(0, "u1"),
        Err(ReservationError::InsufficientInventory)
    );
    assert_eq!(service.available_seat_count(), 84);
}

#[tokio::test(start_paused = true)]
async fn scattered_seats_do_not_satisfy_one_request() {
    // Два ряда по 4 места; после двух броней по 3 остаются два одиночных
    // места в разных рядах
    let venue = Venue::with_layout("Club", Utc::now(), VenueKind::Stage, &["A", "B"], 4, 10.0);
    let service = ReservationService::new(venue, TTL);

    service.find_and_hold_seats(3, "u1").unwrap();
    service.find_and_hold_seats(3, "u1").unwrap();
    assert_eq!(service.available_seat_count(), 2);

    // Суммарно мест хватает, но единого блока из 2 нет
    assert_eq!(
        service.find_and_hold_seats(2, "u2"),
        Err(ReservationError::InsufficientInventory)
    );
    assert_eq!(service.available_seat_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn cancel_returns_seats_immediately() {
    let service = stage_service();
    let hold = service.find_and_hold_seats(4, "u1").unwrap();
    assert_eq!(service.available_seat_count(), 80);

    service.cancel_hold(hold.id, "u1").unwrap();
    assert_eq!(service.available_seat_count(), 84);
    assert_eq!(service.available_scan(), 84);
    assert_eq!(service.outstanding_holds(), 0);

    // Отменённая бронь больше не подтверждается
    assert_eq!(
        service.confirm_hold(hold.id, "u1"),
        Err(ReservationError::UnknownHold(hold.id))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_holds_get_disjoint_seats() {
    let service = stage_service();

    let mut handles = Vec::new();
    for i in 0..20 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.find_and_hold_seats(2, &format!("user-{i}"))
        }));
    }

    let mut taken: HashSet<(String, u32)> = HashSet::new();
    let mut held_total = 0usize;
    for handle in handles {
        let hold = handle.await.unwrap().expect("84 seats fit 20 pairs");
        held_total += hold.seat_count();
        for seat in &hold.seats {
            // Одно место не может оказаться в двух бронях
            assert!(
                taken.insert((seat.row_id.clone(), seat.number)),
                "seat {}{} held twice",
                seat.row_id,
                seat.number
            );
        }
    }

    assert_eq!(held_total, 40);
    assert_eq!(service.available_seat_count(), 44);
    assert_eq!(service.available_scan(), 44);
}

#[tokio::test(start_paused = true)]
async fn counter_matches_scan_through_mixed_lifecycle() {
    let service = stage_service();

    let confirmed = service.find_and_hold_seats(6, "u1").unwrap();
    let cancelled = service.find_and_hold_seats(4, "u2").unwrap();
    let abandoned = service.find_and_hold_seats(3, "u3").unwrap();
    assert_eq!(service.available_seat_count(), service.available_scan());

    service.confirm_hold(confirmed.id, "u1").unwrap();
    assert_eq!(service.available_seat_count(), service.available_scan());

    service.cancel_hold(cancelled.id, "u2").unwrap();
    assert_eq!(service.available_seat_count(), service.available_scan());

    let_holds_expire().await;
    assert_eq!(service.available_seat_count(), 78);
    assert_eq!(service.available_seat_count(), service.available_scan());
    assert_eq!(
        service.confirm_hold(abandoned.id, "u3"),
        Err(ReservationError::HoldExpired(abandoned.id))
    );
}
