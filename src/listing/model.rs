// region:    --- Imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// endregion: --- Imports

// region:    --- Identity
/// 저장소가 부여하는 경매 식별자
pub type AuctionId = i64;

/// 세션에서 전달되는 판매자 식별자 (내용은 해석하지 않음)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
// endregion: --- Identity

// region:    --- Category
/// 경매 카테고리 (고정된 닫힌 집합)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Art,
    Collectables,
    Electronics,
    Vehicles,
    Watches,
    Fashion,
    Shoes,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl Category {
    /// 화면 표시 순서
    pub const ALL: [Category; 7] = [
        Category::Art,
        Category::Collectables,
        Category::Electronics,
        Category::Vehicles,
        Category::Watches,
        Category::Fashion,
        Category::Shoes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Art => "Art",
            Category::Collectables => "Collectables",
            Category::Electronics => "Electronics",
            Category::Vehicles => "Vehicles",
            Category::Watches => "Watches",
            Category::Fashion => "Fashion",
            Category::Shoes => "Shoes",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
// endregion: --- Category

// region:    --- Status
/// 경매 상태
/// INACTIVE(초안)만 이 서비스에서 의미를 가진다. 나머지 상태는 다른 서비스가 관리하므로
/// 값을 그대로 보존한다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuctionStatus {
    Inactive,
    Other(String),
}

impl AuctionStatus {
    pub const INACTIVE: &'static str = "INACTIVE";

    pub fn as_str(&self) -> &str {
        match self {
            AuctionStatus::Inactive => Self::INACTIVE,
            AuctionStatus::Other(status) => status,
        }
    }

    /// 삭제 가능한 초안 상태인지 여부
    pub fn is_draft(&self) -> bool {
        matches!(self, AuctionStatus::Inactive)
    }
}

impl From<String> for AuctionStatus {
    fn from(status: String) -> Self {
        if status == Self::INACTIVE {
            AuctionStatus::Inactive
        } else {
            AuctionStatus::Other(status)
        }
    }
}

impl From<&str> for AuctionStatus {
    fn from(status: &str) -> Self {
        Self::from(status.to_string())
    }
}

impl From<AuctionStatus> for String {
    fn from(status: AuctionStatus) -> Self {
        match status {
            AuctionStatus::Inactive => AuctionStatus::INACTIVE.to_string(),
            AuctionStatus::Other(status) => status,
        }
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
// endregion: --- Status

// region:    --- Draft
/// 작성 중인 경매 초안. 값이 아직 들어오지 않은 필드는 None.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub starting_price: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub category: Option<Category>,
    pub image_reference: Option<String>,
}

/// 저장소에 보내는 경매 생성 요청
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuction {
    pub title: String,
    pub description: String,
    pub starting_price: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub category: Category,
    pub image_reference: String,
    pub owner_id: OwnerId,
}
// endregion: --- Draft

// region:    --- Persisted Auction
/// 저장된 경매
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedAuction {
    pub id: AuctionId,
    pub title: String,
    pub description: String,
    pub starting_price: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub category: Category,
    pub image_reference: String,
    pub owner_id: OwnerId,
    pub status: AuctionStatus,
    pub created_at: DateTime<Utc>,
}
// endregion: --- Persisted Auction
