// region:    --- Imports
use crate::drafts::{DraftId, DraftRegistry};
use crate::error::{DraftAccessError, ListingError};
use crate::listing::composer::{DraftComposer, DraftUpdate};
use crate::listing::events::ListingEvent;
use crate::listing::guard::guarded_delete;
use crate::listing::model::{AuctionDraft, AuctionId, Category, OwnerId, PersistedAuction};
use crate::message_broker::ListingPublisher;
use crate::record_locks::RecordLocks;
use crate::store::AuctionStore;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

// endregion: --- Imports

/// 세션에서 확인된 판매자 식별자를 담는 헤더
pub const OWNER_HEADER: &str = "x-owner-id";

// region:    --- App State
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AuctionStore>,
    pub publisher: Arc<dyn ListingPublisher>,
    pub drafts: DraftRegistry,
    pub delete_locks: RecordLocks,
}

impl AppState {
    pub fn new(store: Arc<dyn AuctionStore>, publisher: Arc<dyn ListingPublisher>) -> Self {
        Self {
            store,
            publisher,
            drafts: DraftRegistry::new(),
            delete_locks: RecordLocks::new(),
        }
    }
}

/// 라우터 설정
pub fn routes(state: AppState, body_limit_bytes: usize) -> Router {
    // 프론트엔드 개발 서버를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/categories", get(handle_get_categories))
        .route("/drafts", post(handle_open_draft))
        .route(
            "/drafts/:id",
            patch(handle_compose_field).delete(handle_abandon_draft),
        )
        .route("/drafts/:id/image", put(handle_compose_image))
        .route("/drafts/:id/validation", get(handle_validate_draft))
        .route("/drafts/:id/commit", post(handle_commit_draft))
        .route(
            "/auctions/:id",
            get(handle_get_auction).delete(handle_delete_auction),
        )
        .route("/owners/:owner_id/auctions", get(handle_get_owner_auctions))
        .layer(cors)
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .with_state(state)
}
// endregion: --- App State

// region:    --- Payloads
#[derive(Debug, Serialize)]
pub struct DraftView<'a> {
    pub draft_id: DraftId,
    pub draft: &'a AuctionDraft,
}

#[derive(Debug, Deserialize)]
pub struct ImagePayload {
    pub image_reference: String,
}
// endregion: --- Payloads

// region:    --- Draft Handlers

/// 카테고리 목록
pub async fn handle_get_categories() -> impl IntoResponse {
    Json(Category::ALL)
}

/// 초안 흐름 시작
pub async fn handle_open_draft(State(state): State<AppState>) -> impl IntoResponse {
    let draft_id = state.drafts.open().await;
    (
        StatusCode::CREATED,
        Json(serde_json::json!({ "draft_id": draft_id })),
    )
}

/// 초안 필드 갱신
pub async fn handle_compose_field(
    State(state): State<AppState>,
    Path(draft_id): Path<DraftId>,
    Json(update): Json<DraftUpdate>,
) -> Response {
    info!(
        "{:<12} --> 초안 필드 갱신 id: {}, field: {}",
        "Handler",
        draft_id,
        update.field()
    );
    state
        .drafts
        .with_composer(draft_id, |composer| {
            composer.set_field(update);
            draft_response(draft_id, composer.draft())
        })
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

/// 업로드된 이미지 반영
pub async fn handle_compose_image(
    State(state): State<AppState>,
    Path(draft_id): Path<DraftId>,
    Json(payload): Json<ImagePayload>,
) -> Response {
    info!("{:<12} --> 초안 이미지 갱신 id: {}", "Handler", draft_id);
    state
        .drafts
        .with_composer(draft_id, |composer| {
            composer.set_image_reference(payload.image_reference);
            draft_response(draft_id, composer.draft())
        })
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

/// 초안 검증 결과
pub async fn handle_validate_draft(
    State(state): State<AppState>,
    Path(draft_id): Path<DraftId>,
) -> Response {
    state
        .drafts
        .with_composer(draft_id, |composer| {
            let errors = composer.validate();
            Json(serde_json::json!({
                "valid": errors.is_empty(),
                "errors": errors,
            }))
            .into_response()
        })
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

/// 초안 커밋
pub async fn handle_commit_draft(
    State(state): State<AppState>,
    Path(draft_id): Path<DraftId>,
    headers: HeaderMap,
) -> Response {
    let owner_id = OwnerId::new(
        headers
            .get(OWNER_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default(),
    );
    info!(
        "{:<12} --> 초안 커밋 요청 id: {}, owner: {}",
        "Handler", draft_id, owner_id
    );

    let composer = match state.drafts.begin_commit(draft_id).await {
        Ok(composer) => composer,
        Err(e) => return e.into_response(),
    };

    // 요청이 끊겨도 커밋은 별도 태스크에서 끝까지 진행되고 슬롯이 정리된다
    let task = tokio::spawn(finish_commit(state, draft_id, owner_id, composer));
    match task.await {
        Ok(Ok(auction)) => (StatusCode::CREATED, Json(auction)).into_response(),
        Ok(Err(e)) => e.into_response(),
        Err(e) => {
            error!("{:<12} --> 커밋 작업 실패 id: {}: {}", "Handler", draft_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string(), "code": "COMMIT_FAILED" })),
            )
                .into_response()
        }
    }
}

/// 커밋 실행 후 결과에 따라 초안 슬롯을 닫거나 되돌린다
async fn finish_commit(
    state: AppState,
    draft_id: DraftId,
    owner_id: OwnerId,
    composer: DraftComposer,
) -> Result<PersistedAuction, ListingError> {
    match composer.commit(&owner_id, state.store.as_ref()).await {
        Ok(auction) => {
            state.drafts.complete_commit(draft_id).await;
            publish(state.publisher.as_ref(), ListingEvent::draft_created(&auction)).await;
            Ok(auction)
        }
        Err(e) => {
            state.drafts.abort_commit(draft_id, composer).await;
            Err(e)
        }
    }
}

/// 초안 흐름 포기
pub async fn handle_abandon_draft(
    State(state): State<AppState>,
    Path(draft_id): Path<DraftId>,
) -> Response {
    match state.drafts.abandon(draft_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

fn draft_response(draft_id: DraftId, draft: &AuctionDraft) -> Response {
    Json(DraftView { draft_id, draft }).into_response()
}

// endregion: --- Draft Handlers

// region:    --- Auction Handlers

/// 경매 조회
pub async fn handle_get_auction(
    State(state): State<AppState>,
    Path(auction_id): Path<AuctionId>,
) -> Response {
    info!("{:<12} --> 경매 조회 id: {}", "Handler", auction_id);
    match state.store.find_by_id(auction_id).await {
        Ok(Some(auction)) => Json(auction).into_response(),
        Ok(None) => ListingError::NotFound { id: auction_id }.into_response(),
        Err(e) => ListingError::from(e).into_response(),
    }
}

/// 초안 경매 삭제
pub async fn handle_delete_auction(
    State(state): State<AppState>,
    Path(auction_id): Path<AuctionId>,
) -> Response {
    info!("{:<12} --> 경매 삭제 요청 id: {}", "Handler", auction_id);
    let _lock = state.delete_locks.lock(auction_id).await;
    match guarded_delete(state.store.as_ref(), auction_id).await {
        Ok(()) => {
            publish(state.publisher.as_ref(), ListingEvent::draft_deleted(auction_id)).await;
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// 판매자 경매 목록
pub async fn handle_get_owner_auctions(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> Response {
    info!("{:<12} --> 판매자 경매 조회 owner: {}", "Handler", owner_id);
    match state.store.list_by_owner(&OwnerId::new(owner_id)).await {
        Ok(auctions) => Json(auctions).into_response(),
        Err(e) => ListingError::from(e).into_response(),
    }
}

// endregion: --- Auction Handlers

// region:    --- Responses

/// 알림 발행. 저장은 이미 끝났으므로 실패해도 응답은 바꾸지 않는다.
async fn publish(publisher: &dyn ListingPublisher, event: ListingEvent) {
    if let Err(e) = publisher.publish(&event).await {
        error!(
            "{:<12} --> {} 이벤트 발행 실패 id: {}: {}",
            "Handler",
            event.event_type(),
            event.auction_id(),
            e
        );
    }
}

impl IntoResponse for ListingError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ListingError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::json!({
                    "error": self.to_string(),
                    "code": "VALIDATION_FAILED",
                    "violations": errors.violations(),
                }),
            ),
            ListingError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": self.to_string(), "code": "NOT_FOUND" }),
            ),
            ListingError::InvalidState { status, .. } => (
                StatusCode::CONFLICT,
                serde_json::json!({
                    "error": self.to_string(),
                    "code": "NOT_DRAFT",
                    "status": status,
                }),
            ),
            ListingError::Store(e) => {
                error!("{:<12} --> 저장소 오류: {}", "Handler", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": self.to_string(), "code": "STORE_ERROR" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for DraftAccessError {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            DraftAccessError::Unknown(_) => (StatusCode::NOT_FOUND, "DRAFT_NOT_FOUND"),
            DraftAccessError::Busy(_) => (StatusCode::CONFLICT, "DRAFT_BUSY"),
        };
        (
            status,
            Json(serde_json::json!({ "error": self.to_string(), "code": code })),
        )
            .into_response()
    }
}

// endregion: --- Responses
