//! ledger.rs
//!
//! Реестр активных броней и их таймеров истечения. На каждую бронь ledger
//! взводит одноразовую отложенную задачу; подтверждение или отмена снимают
//! её через abort. Арбитром гонки "подтверждение против истечения" служит
//! мьютекс реестра: терминальный исход достаётся тому, кто первым забрал
//! запись из реестра.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, Weak};
use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::debug;

use crate::error::ReservationError;
use crate::models::Hold;

use super::reservation::ServiceInner;

struct LedgerEntry {
    hold: Hold,
    timer: AbortHandle,
}

pub struct HoldLedger {
    holds: Mutex<HashMap<u64, LedgerEntry>>,
    /// Id сработавших броней. Позволяет отличить "бронь истекла" от
    /// "брони никогда не было" при позднем подтверждении.
    expired: Mutex<HashSet<u64>>,
    next_id: AtomicU64,
}

impl HoldLedger {
    pub fn new() -> Self {
        Self {
            holds: Mutex::new(HashMap::new()),
            expired: Mutex::new(HashSet::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Новый id брони. Атомарный счётчик: коллизии между одновременно
    /// живущими бронями исключены по построению.
    pub fn next_hold_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Регистрирует бронь и взводит таймер истечения. Задача таймера держит
    /// только Weak-ссылку на сервис: после смерти площадки ей некого будить.
    /// Вставка и spawn идут под общим мьютексом реестра, поэтому даже
    /// мгновенно сработавший таймер увидит запись.
    pub(crate) fn arm(&self, hold: Hold, ttl: Duration, service: Weak<ServiceInner>) {
        let hold_id = hold.id;
        let mut holds = self.holds.lock().unwrap();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(service) = service.upgrade() {
                service.expire_hold(hold_id);
            }
        })
        .abort_handle();
        holds.insert(hold_id, LedgerEntry { hold, timer });
        debug!(hold_id, ttl_secs = ttl.as_secs(), "hold armed");
    }

    /// Забирает бронь для подтверждения или отмены. Владелец проверяется под
    /// мьютексом; при несовпадении запись остаётся в реестре и таймер
    /// продолжает тикать. При успехе таймер снимается (abort после
    /// срабатывания — no-op, не ошибка).
    pub fn take_for_owner(&self, hold_id: u64, requester: &str) -> Result<Hold, ReservationError> {
        let mut holds = self.holds.lock().unwrap();
        let Some(entry) = holds.get(&hold_id) else {
            if self.expired.lock().unwrap().contains(&hold_id) {
                return Err(ReservationError::HoldExpired(hold_id));
            }
            return Err(ReservationError::UnknownHold(hold_id));
        };
        if entry.hold.requester != requester {
            return Err(ReservationError::OwnershipMismatch(hold_id));
        }
        let entry = holds.remove(&hold_id).expect("entry was just looked up");
        drop(holds);
        entry.timer.abort();
        Ok(entry.hold)
    }

    /// Забирает бронь из сработавшего таймера. None означает, что
    /// подтверждение или отмена успели первыми — тогда делать нечего.
    pub(crate) fn take_fired(&self, hold_id: u64) -> Option<Hold> {
        let mut holds = self.holds.lock().unwrap();
        let entry = holds.remove(&hold_id)?;
        self.expired.lock().unwrap().insert(hold_id);
        Some(entry.hold)
    }

    pub fn outstanding(&self) -> usize {
        self.holds.lock().unwrap().len()
    }
}

impl Drop for HoldLedger {
    fn drop(&mut self) {
        // Таймеры живут не дольше реестра
        let holds = self.holds.get_mut().unwrap();
        for entry in holds.values() {
            entry.timer.abort();
        }
    }
}
