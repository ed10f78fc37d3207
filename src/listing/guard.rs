// region:    --- Imports
use crate::error::{ListingError, StoreError};
use crate::listing::model::AuctionId;
use crate::store::AuctionStore;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Lifecycle Guard
/// 초안(INACTIVE) 상태의 경매만 삭제한다.
/// 없는 경매는 NotFound, 초안이 아니면 InvalidState로 실패하며 삭제 요청은 보내지 않는다.
/// 조회 후 삭제 전에 행이 사라지거나 상태가 바뀌면 저장소의 조건부 삭제 결과를 같은 오류로 돌려준다.
pub async fn guarded_delete(store: &dyn AuctionStore, id: AuctionId) -> Result<(), ListingError> {
    info!("{:<12} --> 경매 삭제 요청 id: {}", "Guard", id);

    let auction = match store.find_by_id(id).await? {
        Some(auction) => auction,
        None => {
            warn!("{:<12} --> 경매를 찾을 수 없습니다 id: {}", "Guard", id);
            return Err(ListingError::NotFound { id });
        }
    };

    if !auction.status.is_draft() {
        warn!(
            "{:<12} --> 초안 상태가 아니라 삭제할 수 없습니다 id: {}, status: {}",
            "Guard", id, auction.status
        );
        return Err(ListingError::InvalidState {
            id,
            status: auction.status,
        });
    }

    match store.delete_by_id(id).await {
        Ok(()) => {}
        Err(StoreError::Missing { .. }) => {
            warn!("{:<12} --> 삭제 직전에 경매가 사라졌습니다 id: {}", "Guard", id);
            return Err(ListingError::NotFound { id });
        }
        Err(StoreError::NotDraft { status, .. }) => {
            warn!(
                "{:<12} --> 삭제 직전에 상태가 바뀌었습니다 id: {}, status: {}",
                "Guard", id, status
            );
            return Err(ListingError::InvalidState { id, status });
        }
        Err(e) => return Err(e.into()),
    }
    info!("{:<12} --> 경매 삭제 완료 id: {}", "Guard", id);

    Ok(())
}
// endregion: --- Lifecycle Guard
