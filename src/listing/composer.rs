/// 경매 초안 작성기
/// 1. 필드 단위 갱신 (마지막 값 우선)
/// 2. 스키마 검증
/// 3. 커밋 (생성 요청 1회)
// region:    --- Imports
use crate::error::{ListingError, Rule, ValidationErrors, Violation};
use crate::listing::model::{AuctionDraft, Category, NewAuction, OwnerId, PersistedAuction};
use crate::store::AuctionStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

// endregion: --- Imports

// region:    --- Fields
/// 초안 필드 이름
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    Title,
    Description,
    StartingPrice,
    StartDate,
    EndDate,
    Category,
    ImageReference,
    OwnerId,
}

impl DraftField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftField::Title => "title",
            DraftField::Description => "description",
            DraftField::StartingPrice => "startingPrice",
            DraftField::StartDate => "startDate",
            DraftField::EndDate => "endDate",
            DraftField::Category => "category",
            DraftField::ImageReference => "imageReference",
            DraftField::OwnerId => "ownerId",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 입력 소스 하나가 만들어 낸 새 값
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum DraftUpdate {
    Title(String),
    Description(String),
    StartingPrice(i64),
    StartDate(DateTime<Utc>),
    EndDate(DateTime<Utc>),
    Category(Category),
}

impl DraftUpdate {
    pub fn field(&self) -> DraftField {
        match self {
            DraftUpdate::Title(_) => DraftField::Title,
            DraftUpdate::Description(_) => DraftField::Description,
            DraftUpdate::StartingPrice(_) => DraftField::StartingPrice,
            DraftUpdate::StartDate(_) => DraftField::StartDate,
            DraftUpdate::EndDate(_) => DraftField::EndDate,
            DraftUpdate::Category(_) => DraftField::Category,
        }
    }
}
// endregion: --- Fields

// region:    --- Draft Composer
/// 하나의 생성 흐름이 단독으로 소유하는 초안 작성기
#[derive(Debug, Clone, Default)]
pub struct DraftComposer {
    draft: AuctionDraft,
}

impl DraftComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 현재 초안
    pub fn draft(&self) -> &AuctionDraft {
        &self.draft
    }

    /// 필드 값 갱신. 같은 필드는 마지막에 적용된 값이 남는다.
    pub fn set_field(&mut self, update: DraftUpdate) {
        debug!("{:<12} --> 필드 갱신: {}", "Composer", update.field());
        let draft = &mut self.draft;
        match update {
            DraftUpdate::Title(title) => draft.title = Some(title),
            DraftUpdate::Description(description) => draft.description = Some(description),
            DraftUpdate::StartingPrice(price) => draft.starting_price = Some(price),
            DraftUpdate::StartDate(date) => draft.start_date = Some(date),
            DraftUpdate::EndDate(date) => draft.end_date = Some(date),
            DraftUpdate::Category(category) => draft.category = Some(category),
        }
    }

    /// 업로드가 끝난 이미지 주소 반영
    pub fn set_image_reference(&mut self, url: impl Into<String>) {
        let url = url.into();
        debug!("{:<12} --> 이미지 갱신: {}", "Composer", url);
        self.draft.image_reference = Some(url);
    }

    /// 스키마 검증. 실패한 필드 이름과 메시지를 돌려준다 (통과 시 빈 맵).
    pub fn validate(&self) -> BTreeMap<DraftField, String> {
        let mut violations = Vec::new();
        self.check_schema(&mut violations);
        violations
            .into_iter()
            .map(|v| (v.field, v.message))
            .collect()
    }

    /// 현재 값들로 생성 요청을 만든다. 위반 사항은 전부 모아서 돌려준다.
    pub fn build_request(&self, owner_id: &OwnerId) -> Result<NewAuction, ValidationErrors> {
        let mut violations = Vec::new();
        let schema = self.check_schema(&mut violations);
        let image_reference = required_text(
            &self.draft.image_reference,
            DraftField::ImageReference,
            "Image",
            &mut violations,
        );

        if owner_id.is_blank() {
            violations.push(Violation::new(
                DraftField::OwnerId,
                Rule::Required,
                "Owner is required",
            ));
        }

        if let (Some(start), Some(end)) = (schema.start_date, schema.end_date) {
            if start >= end {
                violations.push(Violation::new(
                    DraftField::EndDate,
                    Rule::DateOrder,
                    "End date must be after start date",
                ));
            }
        }

        match (schema, image_reference) {
            (
                SchemaValues {
                    title: Some(title),
                    description: Some(description),
                    starting_price: Some(starting_price),
                    start_date: Some(start_date),
                    end_date: Some(end_date),
                    category: Some(category),
                },
                Some(image_reference),
            ) if violations.is_empty() => Ok(NewAuction {
                title,
                description,
                starting_price,
                start_date,
                end_date,
                category,
                image_reference,
                owner_id: owner_id.clone(),
            }),
            _ => Err(ValidationErrors::new(violations)),
        }
    }

    /// 커밋. 검증을 통과한 경우에만 저장소에 생성 요청을 정확히 한 번 보낸다.
    pub async fn commit(
        &self,
        owner_id: &OwnerId,
        store: &dyn AuctionStore,
    ) -> Result<PersistedAuction, ListingError> {
        let request = match self.build_request(owner_id) {
            Ok(request) => request,
            Err(errors) => {
                warn!("{:<12} --> 커밋 거부: {}", "Composer", errors);
                return Err(errors.into());
            }
        };

        info!(
            "{:<12} --> 경매 생성 요청: owner={}, title={}",
            "Composer", request.owner_id, request.title
        );
        let created = store.create(request).await?;
        info!("{:<12} --> 경매 생성 완료 id: {}", "Composer", created.id);

        Ok(created)
    }

    fn check_schema(&self, violations: &mut Vec<Violation>) -> SchemaValues {
        let draft = &self.draft;

        let title = required_text(&draft.title, DraftField::Title, "Title", violations);
        let description = required_text(
            &draft.description,
            DraftField::Description,
            "Description",
            violations,
        );

        let starting_price = match draft.starting_price {
            None => {
                violations.push(Violation::new(
                    DraftField::StartingPrice,
                    Rule::Required,
                    "Starting price is required",
                ));
                None
            }
            Some(price) if price < 0 => {
                violations.push(Violation::new(
                    DraftField::StartingPrice,
                    Rule::Negative,
                    "Starting price must be zero or greater",
                ));
                None
            }
            Some(price) => Some(price),
        };

        let start_date = required(draft.start_date, DraftField::StartDate, "Start date", violations);
        let end_date = required(draft.end_date, DraftField::EndDate, "End date", violations);
        let category = required(draft.category, DraftField::Category, "Category", violations);

        SchemaValues {
            title,
            description,
            starting_price,
            start_date,
            end_date,
            category,
        }
    }
}

/// 스키마 검증을 통과한 값들 (실패한 필드는 None)
struct SchemaValues {
    title: Option<String>,
    description: Option<String>,
    starting_price: Option<i64>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    category: Option<Category>,
}

fn required<T: Copy>(
    value: Option<T>,
    field: DraftField,
    label: &str,
    violations: &mut Vec<Violation>,
) -> Option<T> {
    if value.is_none() {
        violations.push(Violation::new(
            field,
            Rule::Required,
            format!("{} is required", label),
        ));
    }
    value
}

fn required_text(
    value: &Option<String>,
    field: DraftField,
    label: &str,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    match value {
        None => {
            violations.push(Violation::new(
                field,
                Rule::Required,
                format!("{} is required", label),
            ));
            None
        }
        Some(text) if text.trim().is_empty() => {
            violations.push(Violation::new(
                field,
                Rule::Blank,
                format!("{} must not be empty", label),
            ));
            None
        }
        Some(text) => Some(text.clone()),
    }
}
// endregion: --- Draft Composer
