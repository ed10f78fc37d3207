use crate::listing::model::{AuctionId, Category, OwnerId, PersistedAuction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum ListingEvent {
    // 초안 생성 이벤트
    DraftCreated {
        auction_id: AuctionId,
        owner_id: OwnerId,
        category: Category,
        timestamp: DateTime<Utc>,
    },
    // 초안 삭제 이벤트
    DraftDeleted {
        auction_id: AuctionId,
        timestamp: DateTime<Utc>,
    },
}

impl ListingEvent {
    pub fn draft_created(auction: &PersistedAuction) -> Self {
        ListingEvent::DraftCreated {
            auction_id: auction.id,
            owner_id: auction.owner_id.clone(),
            category: auction.category,
            timestamp: Utc::now(),
        }
    }

    pub fn draft_deleted(auction_id: AuctionId) -> Self {
        ListingEvent::DraftDeleted {
            auction_id,
            timestamp: Utc::now(),
        }
    }

    pub fn auction_id(&self) -> AuctionId {
        match self {
            ListingEvent::DraftCreated { auction_id, .. }
            | ListingEvent::DraftDeleted { auction_id, .. } => *auction_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            ListingEvent::DraftCreated { .. } => "DraftCreated",
            ListingEvent::DraftDeleted { .. } => "DraftDeleted",
        }
    }
}
