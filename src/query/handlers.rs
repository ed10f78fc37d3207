// region:    --- Imports
use super::queries;
use crate::database::DatabaseManager;
use crate::listing::model::{AuctionId, NewAuction};
use chrono::{DateTime, Utc};
use sqlx::Error as SqlxError;
use tracing::info;

// endregion: --- Imports

// region:    --- Row Model
/// auctions 테이블 행
#[derive(Debug, sqlx::FromRow)]
pub struct AuctionRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub starting_price: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub category: String,
    pub image_url: String,
    pub owner_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// 초안 삭제 결과
#[derive(Debug, PartialEq, Eq)]
pub enum DraftDeletion {
    Deleted,
    Missing,
    /// 행은 있지만 INACTIVE가 아님 (현재 상태)
    NotDraft(String),
}
// endregion: --- Row Model

// region:    --- Query Handlers

/// 경매 조회
pub async fn get_auction(
    db_manager: &DatabaseManager,
    auction_id: AuctionId,
) -> Result<Option<AuctionRow>, SqlxError> {
    info!("{:<12} --> 경매 조회 id: {}", "Query", auction_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, AuctionRow>(queries::GET_AUCTION)
                    .bind(auction_id)
                    .fetch_optional(&mut **tx)
                    .await
            })
        })
        .await
}

/// 판매자별 경매 조회
pub async fn get_owner_auctions(
    db_manager: &DatabaseManager,
    owner_id: String,
) -> Result<Vec<AuctionRow>, SqlxError> {
    info!("{:<12} --> 판매자 경매 조회 owner: {}", "Query", owner_id);
    db_manager
        .transaction(move |tx| {
            Box::pin(async move {
                sqlx::query_as::<_, AuctionRow>(queries::GET_OWNER_AUCTIONS)
                    .bind(owner_id)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 경매 생성
pub async fn insert_auction(
    db_manager: &DatabaseManager,
    auction: NewAuction,
) -> Result<AuctionRow, SqlxError> {
    info!("{:<12} --> 경매 생성 title: {}", "Query", auction.title);
    db_manager
        .transaction(move |tx| {
            Box::pin(async move {
                sqlx::query_as::<_, AuctionRow>(queries::INSERT_AUCTION)
                    .bind(auction.title)
                    .bind(auction.description)
                    .bind(auction.starting_price)
                    .bind(auction.start_date)
                    .bind(auction.end_date)
                    .bind(auction.category.as_str())
                    .bind(auction.image_reference)
                    .bind(auction.owner_id.as_str().to_string())
                    .fetch_one(&mut **tx)
                    .await
            })
        })
        .await
}

/// 초안 경매 삭제
/// 상태 조건과 삭제를 한 문장으로 처리하고, 지워진 행이 없으면 같은 트랜잭션에서 이유를 확인한다.
pub async fn delete_draft_auction(
    db_manager: &DatabaseManager,
    auction_id: AuctionId,
) -> Result<DraftDeletion, SqlxError> {
    info!("{:<12} --> 초안 경매 삭제 id: {}", "Query", auction_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let result = sqlx::query(queries::DELETE_DRAFT_AUCTION)
                    .bind(auction_id)
                    .execute(&mut **tx)
                    .await?;
                if result.rows_affected() > 0 {
                    return Ok(DraftDeletion::Deleted);
                }

                let status: Option<String> = sqlx::query_scalar(queries::GET_AUCTION_STATUS)
                    .bind(auction_id)
                    .fetch_optional(&mut **tx)
                    .await?;

                Ok::<_, SqlxError>(match status {
                    Some(status) => DraftDeletion::NotDraft(status),
                    None => DraftDeletion::Missing,
                })
            })
        })
        .await
}

// endregion: --- Query Handlers
