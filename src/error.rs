// region:    --- Imports
use crate::drafts::DraftId;
use crate::listing::composer::DraftField;
use crate::listing::model::{AuctionId, AuctionStatus};
use rdkafka::error::KafkaError;
use rdkafka::types::RDKafkaErrorCode;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

// endregion: --- Imports

// region:    --- Validation
/// 위반된 검증 규칙 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Required,
    Blank,
    Negative,
    DateOrder,
}

/// 하나의 규칙 위반
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: DraftField,
    pub rule: Rule,
    pub message: String,
}

impl Violation {
    pub fn new(field: DraftField, rule: Rule, message: impl Into<String>) -> Self {
        Self {
            field,
            rule,
            message: message.into(),
        }
    }
}

/// 커밋 전제 조건 위반 목록 (항상 하나 이상)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn has(&self, field: DraftField, rule: Rule) -> bool {
        self.violations
            .iter()
            .any(|v| v.field == field && v.rule == rule)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.violations.iter().map(|v| v.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}
// endregion: --- Validation

// region:    --- Listing Error
/// 초안 커밋과 초안 삭제에서 호출자에게 그대로 전달되는 오류
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("auction not found: {id}")]
    NotFound { id: AuctionId },

    #[error("auction {id} is not in draft status (status: {status})")]
    InvalidState { id: AuctionId, status: AuctionStatus },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
// endregion: --- Listing Error

// region:    --- Collaborator Errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("auction {id} was not deleted: no such row")]
    Missing { id: AuctionId },

    #[error("auction {id} was not deleted: status is {status}")]
    NotDraft { id: AuctionId, status: AuctionStatus },

    #[error("stored auction could not be decoded: {0}")]
    Decode(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// 연결을 얻지 못한 경우는 Unavailable, 나머지는 Database
impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if matches!(
            e,
            sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::WorkerCrashed
                | sqlx::Error::Io(_)
        ) {
            return StoreError::Unavailable(e.to_string());
        }
        StoreError::Database(e)
    }
}

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("kafka error: {0}")]
    Kafka(#[from] KafkaError),

    #[error("topic {topic} could not be created: {code:?}")]
    Topic {
        topic: String,
        code: RDKafkaErrorCode,
    },

    #[error("event serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("configuration error: {0}")]
    Load(#[from] ::config::ConfigError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftAccessError {
    #[error("draft not found: {0}")]
    Unknown(DraftId),

    #[error("draft {0} is being committed")]
    Busy(DraftId),
}
// endregion: --- Collaborator Errors
