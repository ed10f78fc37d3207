/// 진행 중인 경매 생성 흐름 관리
/// 흐름마다 작성기 하나를 단독으로 보관하고, 같은 초안에 대한 커밋이 겹치지 않도록 막는다.
// region:    --- Imports
use crate::error::DraftAccessError;
use crate::listing::composer::DraftComposer;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

// endregion: --- Imports

pub type DraftId = u64;

enum DraftSlot {
    Open(DraftComposer),
    Committing,
}

// region:    --- Draft Registry
#[derive(Clone, Default)]
pub struct DraftRegistry {
    next_id: Arc<AtomicU64>,
    slots: Arc<Mutex<HashMap<DraftId, DraftSlot>>>,
}

impl DraftRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 새 초안 흐름 시작
    pub async fn open(&self) -> DraftId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.slots
            .lock()
            .await
            .insert(id, DraftSlot::Open(DraftComposer::new()));
        info!("{:<12} --> 초안 흐름 시작 id: {}", "Drafts", id);
        id
    }

    /// 작성기에 접근. 커밋 중인 초안은 Busy.
    pub async fn with_composer<R>(
        &self,
        id: DraftId,
        f: impl FnOnce(&mut DraftComposer) -> R,
    ) -> Result<R, DraftAccessError> {
        let mut slots = self.slots.lock().await;
        match slots.get_mut(&id) {
            Some(DraftSlot::Open(composer)) => Ok(f(composer)),
            Some(DraftSlot::Committing) => Err(DraftAccessError::Busy(id)),
            None => Err(DraftAccessError::Unknown(id)),
        }
    }

    /// 커밋 시작. 작성기를 꺼내고 슬롯을 커밋 중으로 표시한다.
    pub async fn begin_commit(&self, id: DraftId) -> Result<DraftComposer, DraftAccessError> {
        let mut slots = self.slots.lock().await;
        match slots.remove(&id) {
            Some(DraftSlot::Open(composer)) => {
                slots.insert(id, DraftSlot::Committing);
                debug!("{:<12} --> 커밋 시작 id: {}", "Drafts", id);
                Ok(composer)
            }
            Some(DraftSlot::Committing) => {
                slots.insert(id, DraftSlot::Committing);
                Err(DraftAccessError::Busy(id))
            }
            None => Err(DraftAccessError::Unknown(id)),
        }
    }

    /// 커밋 성공: 초안 흐름 종료
    pub async fn complete_commit(&self, id: DraftId) {
        self.slots.lock().await.remove(&id);
        info!("{:<12} --> 초안 흐름 종료 id: {}", "Drafts", id);
    }

    /// 커밋 실패: 작성기를 그대로 되돌린다
    pub async fn abort_commit(&self, id: DraftId, composer: DraftComposer) {
        self.slots
            .lock()
            .await
            .insert(id, DraftSlot::Open(composer));
        debug!("{:<12} --> 커밋 실패, 초안 복원 id: {}", "Drafts", id);
    }

    /// 초안 흐름 포기
    pub async fn abandon(&self, id: DraftId) -> Result<(), DraftAccessError> {
        let mut slots = self.slots.lock().await;
        match slots.get(&id) {
            Some(DraftSlot::Open(_)) => {
                slots.remove(&id);
                info!("{:<12} --> 초안 흐름 포기 id: {}", "Drafts", id);
                Ok(())
            }
            Some(DraftSlot::Committing) => Err(DraftAccessError::Busy(id)),
            None => Err(DraftAccessError::Unknown(id)),
        }
    }
}
// endregion: --- Draft Registry
