/// 경매별 작업 직렬화
/// 같은 경매에 대한 삭제 요청은 하나씩 처리하고, 다른 경매는 서로 기다리지 않는다.
// region:    --- Imports
use crate::listing::model::AuctionId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

// endregion: --- Imports

type RecordLock = Arc<tokio::sync::Mutex<()>>;

// region:    --- Record Locks
#[derive(Clone, Default)]
pub struct RecordLocks {
    locks: Arc<Mutex<HashMap<AuctionId, RecordLock>>>,
}

impl RecordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 경매 잠금 획득. 앞선 작업이 끝날 때까지 기다린다.
    pub async fn lock(&self, id: AuctionId) -> RecordGuard {
        let lock = self
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_default()
            .clone();
        let guard = lock.lock_owned().await;
        debug!("{:<12} --> 경매 잠금 획득 id: {}", "Locks", id);

        RecordGuard {
            id,
            locks: self.locks.clone(),
            guard: Some(guard),
        }
    }

    /// 잡혀 있거나 대기 중인 경매 수
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 드롭되면 잠금을 풀고, 기다리는 쪽이 없으면 항목을 지운다.
pub struct RecordGuard {
    id: AuctionId,
    locks: Arc<Mutex<HashMap<AuctionId, RecordLock>>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for RecordGuard {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        self.guard.take();
        if locks
            .get(&self.id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.id);
        }
        debug!("{:<12} --> 경매 잠금 해제 id: {}", "Locks", self.id);
    }
}
// endregion: --- Record Locks
