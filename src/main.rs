// region:    --- Imports
use auction_listing_service::config::Config;
use auction_listing_service::database::DatabaseManager;
use auction_listing_service::handlers::{self, AppState};
use auction_listing_service::message_broker::KafkaManager;
use auction_listing_service::store::PostgresAuctionStore;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 설정 로드
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{:<12} --> 설정 로드 실패: {}", "Main", e);
            return Err(e.into());
        }
    };

    // DatabaseManager 생성
    let db_manager = match DatabaseManager::connect(&config.database).await {
        Ok(db_manager) => Arc::new(db_manager),
        Err(e) => {
            error!("{:<12} --> 데이터베이스 연결 실패: {:?}", "Main", e);
            return Err(e.into());
        }
    };

    // 데이터베이스 초기화
    if let Err(e) = db_manager
        .initialize_database(config.database.reset_on_start)
        .await
    {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // Kafka 매니저 생성 및 토픽 준비
    let kafka_manager = KafkaManager::new(&config.kafka)?;
    if let Err(e) = kafka_manager
        .create_topic(
            &config.kafka.topic,
            config.kafka.partitions,
            config.kafka.replication,
        )
        .await
    {
        error!("{:<12} --> Kafka 초기화 실패: {}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> Kafka 초기화 성공", "Main");

    let state = AppState::new(
        Arc::new(PostgresAuctionStore::new(db_manager)),
        kafka_manager.get_producer(),
    );
    let routes_all = handlers::routes(state, config.server.body_limit_bytes);

    // 리스너 생성
    let listener = TcpListener::bind(config.server.listen_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
