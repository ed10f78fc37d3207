mod common;

use auction_listing_service::drafts::DraftId;
use auction_listing_service::error::DraftAccessError;
use auction_listing_service::handlers::{self, AppState, OWNER_HEADER};
use auction_listing_service::listing::composer::DraftUpdate;
use auction_listing_service::listing::events::ListingEvent;
use auction_listing_service::listing::model::Category;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue};
use common::{at, init_tracing, InMemoryAuctionStore, RecordingPublisher};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::{sleep, timeout};

/// 테스트 서버
struct TestServer {
    base_url: String,
    store: Arc<InMemoryAuctionStore>,
    publisher: Arc<RecordingPublisher>,
    client: Client,
}

impl TestServer {
    /// 메모리 저장소로 서버를 띄운다 (임의 포트)
    async fn start() -> Self {
        init_tracing();
        let store = Arc::new(InMemoryAuctionStore::new());
        let publisher = Arc::new(RecordingPublisher::default());
        let state = AppState::new(store.clone(), publisher.clone());
        let routes = handlers::routes(state, 1024 * 1024);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, routes.into_make_service())
                .await
                .unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            store,
            publisher,
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn open_draft(&self) -> u64 {
        let response = self.client.post(self.url("/drafts")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.unwrap();
        body["draft_id"].as_u64().unwrap()
    }

    async fn compose(&self, draft_id: u64, field: &str, value: Value) -> reqwest::Response {
        self.client
            .patch(self.url(&format!("/drafts/{}", draft_id)))
            .json(&json!({ "field": field, "value": value }))
            .send()
            .await
            .unwrap()
    }

    async fn compose_image(&self, draft_id: u64, url: &str) -> reqwest::Response {
        self.client
            .put(self.url(&format!("/drafts/{}/image", draft_id)))
            .json(&json!({ "image_reference": url }))
            .send()
            .await
            .unwrap()
    }

    async fn commit(&self, draft_id: u64, owner: &str) -> reqwest::Response {
        self.client
            .post(self.url(&format!("/drafts/{}/commit", draft_id)))
            .header(OWNER_HEADER, owner)
            .send()
            .await
            .unwrap()
    }

    /// 예시 초안 작성
    async fn compose_vintage_watch(&self, draft_id: u64, end_date: &str) {
        let fields = [
            ("title", json!("Vintage Watch")),
            ("description", json!("Mint condition")),
            ("startingPrice", json!(100)),
            ("startDate", json!("2024-01-01T10:00:00Z")),
            ("endDate", json!(end_date)),
            ("category", json!("Watches")),
        ];
        for (field, value) in fields {
            let response = self.compose(draft_id, field, value).await;
            assert_eq!(response.status(), StatusCode::OK, "field {}", field);
        }
        let response = self.compose_image(draft_id, "https://img/x.png").await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

/// 초안 작성 후 커밋
#[tokio::test]
async fn test_compose_and_commit() {
    let server = TestServer::start().await;
    let draft_id = server.open_draft().await;
    server
        .compose_vintage_watch(draft_id, "2024-01-02T10:00:00Z")
        .await;

    let response = server
        .client
        .get(server.url(&format!("/drafts/{}/validation", draft_id)))
        .send()
        .await
        .unwrap();
    let validation: Value = response.json().await.unwrap();
    assert_eq!(validation["valid"], true);

    let response = server.commit(draft_id, "seller-1").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["title"], "Vintage Watch");
    assert_eq!(created["description"], "Mint condition");
    assert_eq!(created["startingPrice"], 100);
    assert_eq!(created["category"], "Watches");
    assert_eq!(created["imageReference"], "https://img/x.png");
    assert_eq!(created["ownerId"], "seller-1");
    assert_eq!(created["status"], "INACTIVE");

    assert_eq!(server.store.create_requests().len(), 1);
    let id = created["id"].as_i64().unwrap();
    assert_eq!(
        server.publisher.events().iter().map(|e| e.auction_id()).collect::<Vec<_>>(),
        vec![id]
    );
    assert!(matches!(
        server.publisher.events()[0],
        ListingEvent::DraftCreated { .. }
    ));

    // 커밋이 끝난 초안은 더 이상 없다
    let response = server.commit(draft_id, "seller-1").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "DRAFT_NOT_FOUND");

    // 판매자 목록에 나타난다
    let listings: Value = server
        .client
        .get(server.url("/owners/seller-1/auctions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listings.as_array().unwrap().len(), 1);
    assert_eq!(listings[0]["id"], id);
}

/// 날짜 순서 위반
#[tokio::test]
async fn test_commit_with_end_before_start() {
    let server = TestServer::start().await;
    let draft_id = server.open_draft().await;
    server
        .compose_vintage_watch(draft_id, "2023-12-31T10:00:00Z")
        .await;

    let response = server.commit(draft_id, "seller-1").await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_FAILED");
    let violations = body["violations"].as_array().unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0]["field"], "endDate");
    assert_eq!(violations[0]["rule"], "date_order");
    assert!(server.store.create_requests().is_empty());
    assert!(server.publisher.events().is_empty());

    // 초안은 남아 있으므로 고쳐서 다시 커밋할 수 있다
    let response = server
        .compose(draft_id, "endDate", json!("2024-01-03T10:00:00Z"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = server.commit(draft_id, "seller-1").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(server.store.create_requests().len(), 1);
}

/// 세션 식별자 없이 커밋
#[tokio::test]
async fn test_commit_without_owner() {
    let server = TestServer::start().await;
    let draft_id = server.open_draft().await;
    server
        .compose_vintage_watch(draft_id, "2024-01-02T10:00:00Z")
        .await;

    let response = server
        .client
        .post(server.url(&format!("/drafts/{}/commit", draft_id)))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["violations"][0]["field"], "ownerId");
    assert!(server.store.create_requests().is_empty());
}

/// 검증 결과 조회
#[tokio::test]
async fn test_validation_lists_missing_fields() {
    let server = TestServer::start().await;
    let draft_id = server.open_draft().await;
    server.compose(draft_id, "title", json!("Sneakers")).await;
    server.compose(draft_id, "startingPrice", json!(-1)).await;

    let validation: Value = server
        .client
        .get(server.url(&format!("/drafts/{}/validation", draft_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(validation["valid"], false);
    let errors = validation["errors"].as_object().unwrap();
    assert!(!errors.contains_key("title"));
    assert_eq!(
        errors["startingPrice"],
        "Starting price must be zero or greater"
    );
    for field in ["description", "startDate", "endDate", "category"] {
        assert!(errors.contains_key(field), "missing {}", field);
    }
}

/// 잘못된 필드 갱신은 초안에 닿지 않는다
#[tokio::test]
async fn test_unknown_field_is_rejected() {
    let server = TestServer::start().await;
    let draft_id = server.open_draft().await;

    let response = server.compose(draft_id, "status", json!("ACTIVE")).await;
    assert!(response.status().is_client_error());

    let response = server.compose(draft_id, "category", json!("Toys")).await;
    assert!(response.status().is_client_error());

    let response = server.compose(999, "title", json!("Ghost")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// 초안 삭제 가드
#[tokio::test]
async fn test_guarded_delete() {
    let server = TestServer::start().await;
    let draft = server.store.seed("INACTIVE");
    let active = server.store.seed("ACTIVE");

    let response = server
        .client
        .delete(server.url(&format!("/auctions/{}", active)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "NOT_DRAFT");
    assert_eq!(body["status"], "ACTIVE");

    let response = server
        .client
        .delete(server.url(&format!("/auctions/{}", draft)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(server.store.delete_requests(), 1);
    let events = server.publisher.events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        ListingEvent::DraftDeleted { auction_id, .. } if auction_id == draft
    ));

    let response = server
        .client
        .delete(server.url(&format!("/auctions/{}", draft)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "NOT_FOUND");

    let response = server
        .client
        .get(server.url(&format!("/auctions/{}", active)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_categories() {
    let server = TestServer::start().await;

    let categories: Vec<String> = server
        .client
        .get(server.url("/categories"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(
        categories,
        vec!["Art", "Collectables", "Electronics", "Vehicles", "Watches", "Fashion", "Shoes"]
    );
}

/// 저장소 장애 시 500과 함께 초안은 유지된다
#[tokio::test]
async fn test_store_failure_keeps_draft() {
    let server = TestServer::start().await;
    let draft_id = server.open_draft().await;
    server
        .compose_vintage_watch(draft_id, "2024-01-02T10:00:00Z")
        .await;
    server.store.fail_requests();

    let response = server.commit(draft_id, "seller-1").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "STORE_ERROR");

    let response = server
        .client
        .get(server.url(&format!("/drafts/{}/validation", draft_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// 같은 경매에 대한 동시 삭제 요청은 차례로 처리된다
#[tokio::test]
async fn test_concurrent_delete_requests() {
    let server = TestServer::start().await;
    let draft = server.store.seed("INACTIVE");
    server.store.yield_after_reads();
    let url = server.url(&format!("/auctions/{}", draft));

    let (first, second) = tokio::join!(
        server.client.delete(&url).send(),
        server.client.delete(&url).send()
    );

    let mut statuses = vec![first.unwrap().status(), second.unwrap().status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::NO_CONTENT, StatusCode::NOT_FOUND]);
    assert!(!server.store.contains(draft));
    assert_eq!(server.publisher.events().len(), 1);
}

/// 메모리 상태에 직접 초안을 만들어 둔다
async fn open_vintage_watch(state: &AppState) -> DraftId {
    let draft_id = state.drafts.open().await;
    state
        .drafts
        .with_composer(draft_id, |composer| {
            composer.set_field(DraftUpdate::Title("Vintage Watch".to_string()));
            composer.set_field(DraftUpdate::Description("Mint condition".to_string()));
            composer.set_field(DraftUpdate::StartingPrice(100));
            composer.set_field(DraftUpdate::StartDate(at(2024, 1, 1, 10)));
            composer.set_field(DraftUpdate::EndDate(at(2024, 1, 2, 10)));
            composer.set_field(DraftUpdate::Category(Category::Watches));
            composer.set_image_reference("https://img/x.png");
        })
        .await
        .unwrap();
    draft_id
}

fn owner_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(OWNER_HEADER, HeaderValue::from_static("seller-1"));
    headers
}

/// 응답 전에 요청이 끊겨도 커밋은 끝나고 초안 흐름이 닫힌다
#[tokio::test]
async fn test_dropped_commit_request_still_completes() {
    init_tracing();
    let store = Arc::new(InMemoryAuctionStore::new());
    let publisher = Arc::new(RecordingPublisher::default());
    let state = AppState::new(store.clone(), publisher.clone());
    let draft_id = open_vintage_watch(&state).await;
    store.hold_creates();

    let request = handlers::handle_commit_draft(
        State(state.clone()),
        Path(draft_id),
        owner_headers(),
    );
    assert!(timeout(Duration::from_millis(50), request).await.is_err());
    assert_eq!(
        state.drafts.with_composer(draft_id, |_| ()).await.unwrap_err(),
        DraftAccessError::Busy(draft_id)
    );

    store.release_creates();
    timeout(Duration::from_secs(2), async {
        while publisher.events().is_empty() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    assert_eq!(store.create_requests().len(), 1);
    assert!(matches!(
        publisher.events()[0],
        ListingEvent::DraftCreated { .. }
    ));
    assert_eq!(
        state.drafts.begin_commit(draft_id).await.unwrap_err(),
        DraftAccessError::Unknown(draft_id)
    );
}

/// 끊긴 요청의 커밋이 실패하면 초안은 그대로 돌아온다
#[tokio::test]
async fn test_dropped_commit_request_restores_draft_on_failure() {
    init_tracing();
    let store = Arc::new(InMemoryAuctionStore::new());
    let publisher = Arc::new(RecordingPublisher::default());
    let state = AppState::new(store.clone(), publisher.clone());
    let draft_id = open_vintage_watch(&state).await;
    store.hold_creates();
    store.fail_requests();

    let request = handlers::handle_commit_draft(
        State(state.clone()),
        Path(draft_id),
        owner_headers(),
    );
    assert!(timeout(Duration::from_millis(50), request).await.is_err());

    store.release_creates();
    let title = timeout(Duration::from_secs(2), async {
        loop {
            if let Ok(title) = state
                .drafts
                .with_composer(draft_id, |composer| composer.draft().title.clone())
                .await
            {
                return title;
            }
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    assert_eq!(title.as_deref(), Some("Vintage Watch"));
    assert_eq!(store.create_requests().len(), 1);
    assert!(publisher.events().is_empty());
    assert!(state.drafts.abandon(draft_id).await.is_ok());
}
