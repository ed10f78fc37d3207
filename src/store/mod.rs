// region:    --- Imports
use crate::database::DatabaseManager;
use crate::error::StoreError;
use crate::listing::model::{AuctionId, NewAuction, OwnerId, PersistedAuction};
use crate::query::handlers::{self, AuctionRow, DraftDeletion};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

// endregion: --- Imports

// region:    --- Auction Store Trait
/// 경매 저장소 트레이트
/// 식별자와 상태는 저장소만 부여한다.
#[async_trait]
pub trait AuctionStore: Send + Sync {
    async fn find_by_id(&self, id: AuctionId) -> Result<Option<PersistedAuction>, StoreError>;

    /// 새 경매 저장. id를 부여하고 상태를 INACTIVE로 둔다.
    async fn create(&self, auction: NewAuction) -> Result<PersistedAuction, StoreError>;

    /// 초안(INACTIVE)일 때만 삭제한다. 확인과 삭제는 원자적이어야 한다.
    /// 행이 없으면 Missing, 초안이 아니면 NotDraft.
    async fn delete_by_id(&self, id: AuctionId) -> Result<(), StoreError>;

    /// 판매자의 경매 목록 (최신순)
    async fn list_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<PersistedAuction>, StoreError>;
}
// endregion: --- Auction Store Trait

// region:    --- Postgres Auction Store
/// Postgres 경매 저장소
pub struct PostgresAuctionStore {
    db_manager: Arc<DatabaseManager>,
}

impl PostgresAuctionStore {
    pub fn new(db_manager: Arc<DatabaseManager>) -> Self {
        Self { db_manager }
    }
}

#[async_trait]
impl AuctionStore for PostgresAuctionStore {
    async fn find_by_id(&self, id: AuctionId) -> Result<Option<PersistedAuction>, StoreError> {
        handlers::get_auction(&self.db_manager, id)
            .await?
            .map(PersistedAuction::try_from)
            .transpose()
    }

    async fn create(&self, auction: NewAuction) -> Result<PersistedAuction, StoreError> {
        let row = handlers::insert_auction(&self.db_manager, auction).await?;
        PersistedAuction::try_from(row)
    }

    async fn delete_by_id(&self, id: AuctionId) -> Result<(), StoreError> {
        match handlers::delete_draft_auction(&self.db_manager, id).await? {
            DraftDeletion::Deleted => Ok(()),
            DraftDeletion::Missing => {
                warn!("{:<12} --> 삭제할 행이 없습니다 id: {}", "Store", id);
                Err(StoreError::Missing { id })
            }
            DraftDeletion::NotDraft(status) => {
                warn!(
                    "{:<12} --> 초안이 아니라 삭제하지 않았습니다 id: {}, status: {}",
                    "Store", id, status
                );
                Err(StoreError::NotDraft {
                    id,
                    status: status.into(),
                })
            }
        }
    }

    async fn list_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<PersistedAuction>, StoreError> {
        handlers::get_owner_auctions(&self.db_manager, owner_id.as_str().to_string())
            .await?
            .into_iter()
            .map(PersistedAuction::try_from)
            .collect()
    }
}

impl TryFrom<AuctionRow> for PersistedAuction {
    type Error = StoreError;

    fn try_from(row: AuctionRow) -> Result<Self, Self::Error> {
        let category = row
            .category
            .parse()
            .map_err(|e| StoreError::Decode(format!("auction {}: {}", row.id, e)))?;

        Ok(PersistedAuction {
            id: row.id,
            title: row.title,
            description: row.description,
            starting_price: row.starting_price,
            start_date: row.start_date,
            end_date: row.end_date,
            category,
            image_reference: row.image_url,
            owner_id: OwnerId::new(row.owner_id),
            status: row.status.into(),
            created_at: row.created_at,
        })
    }
}
// endregion: --- Postgres Auction Store
