#![allow(dead_code)]

use async_trait::async_trait;
use auction_listing_service::error::{BrokerError, StoreError};
use auction_listing_service::listing::events::ListingEvent;
use auction_listing_service::listing::model::{
    AuctionId, AuctionStatus, Category, NewAuction, OwnerId, PersistedAuction,
};
use auction_listing_service::message_broker::ListingPublisher;
use auction_listing_service::store::AuctionStore;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

/// 테스트용 메모리 저장소. 생성/삭제 요청 횟수를 센다.
#[derive(Default)]
pub struct InMemoryAuctionStore {
    auctions: Mutex<BTreeMap<AuctionId, PersistedAuction>>,
    created: Mutex<Vec<NewAuction>>,
    next_id: AtomicUsize,
    delete_requests: AtomicUsize,
    fail: AtomicBool,
    hold_creates: AtomicBool,
    release: Notify,
    yield_on_find: AtomicBool,
}

impl InMemoryAuctionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 이후 모든 요청을 실패시킨다
    pub fn fail_requests(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// 이후 생성 요청은 release_creates 호출 전까지 응답하지 않는다
    pub fn hold_creates(&self) {
        self.hold_creates.store(true, Ordering::SeqCst);
    }

    pub fn release_creates(&self) {
        self.hold_creates.store(false, Ordering::SeqCst);
        self.release.notify_one();
    }

    /// 조회 결과를 읽은 뒤 다른 태스크에 양보한다
    pub fn yield_after_reads(&self) {
        self.yield_on_find.store(true, Ordering::SeqCst);
    }

    /// 다른 서비스가 상태를 바꾼 것처럼 갱신
    pub fn set_status(&self, id: AuctionId, status: &str) {
        if let Some(auction) = self.auctions.lock().unwrap().get_mut(&id) {
            auction.status = AuctionStatus::from(status);
        }
    }

    pub fn create_requests(&self) -> Vec<NewAuction> {
        self.created.lock().unwrap().clone()
    }

    pub fn delete_requests(&self) -> usize {
        self.delete_requests.load(Ordering::SeqCst)
    }

    pub fn contains(&self, id: AuctionId) -> bool {
        self.auctions.lock().unwrap().contains_key(&id)
    }

    /// 임의의 상태로 경매를 넣어 둔다
    pub fn seed(&self, status: &str) -> AuctionId {
        let id = self.allocate_id();
        let auction = PersistedAuction {
            id,
            title: format!("Seeded {}", id),
            description: "seeded auction".to_string(),
            starting_price: 1000,
            start_date: at(2024, 1, 1, 10),
            end_date: at(2024, 1, 2, 10),
            category: Category::Art,
            image_reference: "https://img/seed.png".to_string(),
            owner_id: OwnerId::new("seller-1"),
            status: AuctionStatus::from(status),
            created_at: Utc::now(),
        };
        self.auctions.lock().unwrap().insert(id, auction);
        id
    }

    fn allocate_id(&self) -> AuctionId {
        (self.next_id.fetch_add(1, Ordering::SeqCst) + 1) as AuctionId
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("storage offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AuctionStore for InMemoryAuctionStore {
    async fn find_by_id(&self, id: AuctionId) -> Result<Option<PersistedAuction>, StoreError> {
        self.check()?;
        let found = self.auctions.lock().unwrap().get(&id).cloned();
        if self.yield_on_find.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        Ok(found)
    }

    async fn create(&self, auction: NewAuction) -> Result<PersistedAuction, StoreError> {
        if self.hold_creates.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        self.created.lock().unwrap().push(auction.clone());
        self.check()?;
        let id = self.allocate_id();
        let persisted = PersistedAuction {
            id,
            title: auction.title,
            description: auction.description,
            starting_price: auction.starting_price,
            start_date: auction.start_date,
            end_date: auction.end_date,
            category: auction.category,
            image_reference: auction.image_reference,
            owner_id: auction.owner_id,
            status: AuctionStatus::Inactive,
            created_at: Utc::now(),
        };
        self.auctions.lock().unwrap().insert(id, persisted.clone());
        Ok(persisted)
    }

    async fn delete_by_id(&self, id: AuctionId) -> Result<(), StoreError> {
        self.delete_requests.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut auctions = self.auctions.lock().unwrap();
        let status = match auctions.get(&id) {
            Some(auction) => auction.status.clone(),
            None => return Err(StoreError::Missing { id }),
        };
        if !status.is_draft() {
            return Err(StoreError::NotDraft { id, status });
        }
        auctions.remove(&id);
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<PersistedAuction>, StoreError> {
        self.check()?;
        let mut auctions: Vec<PersistedAuction> = self
            .auctions
            .lock()
            .unwrap()
            .values()
            .filter(|auction| &auction.owner_id == owner_id)
            .cloned()
            .collect();
        auctions.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(auctions)
    }
}

/// 발행된 이벤트를 기록하는 퍼블리셔
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<ListingEvent>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<ListingEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl ListingPublisher for RecordingPublisher {
    async fn publish(&self, event: &ListingEvent) -> Result<(), BrokerError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

/// 트레이싱 초기화 (여러 번 호출해도 안전)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .without_time()
        .with_target(false)
        .with_test_writer()
        .try_init();
}
