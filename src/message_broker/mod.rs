// region:    --- Imports
use crate::config::KafkaConfig;
use crate::error::BrokerError;
use crate::listing::events::ListingEvent;
use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::types::RDKafkaErrorCode;
use rdkafka::ClientConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

// endregion: --- Imports

// region:    --- Listing Publisher
/// 경매 변경 알림 발행 트레이트
#[async_trait]
pub trait ListingPublisher: Send + Sync {
    async fn publish(&self, event: &ListingEvent) -> Result<(), BrokerError>;
}
// endregion: --- Listing Publisher

// region:    --- Kafka Producer
#[derive(Clone)]
pub struct KafkaProducer {
    producer: Arc<FutureProducer>,
    topic: String,
}

/// KafkaProducer 구현
impl KafkaProducer {
    pub fn new(brokers: &str, topic: &str) -> Result<Self, BrokerError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(KafkaProducer {
            producer: Arc::new(producer),
            topic: topic.to_string(),
        })
    }

    /// 메시지 전송
    pub async fn send_message(&self, key: &str, value: &str) -> Result<(), BrokerError> {
        info!(
            "{:<12} --> Kafka 메시지 전송: topic={}, key={}",
            "Producer", self.topic, key
        );
        let record = FutureRecord::to(&self.topic).key(key).payload(value);

        self.producer
            .send(record, Duration::from_secs(0))
            .await
            .map_err(|(e, _)| BrokerError::Kafka(e))?;

        Ok(())
    }
}

#[async_trait]
impl ListingPublisher for KafkaProducer {
    async fn publish(&self, event: &ListingEvent) -> Result<(), BrokerError> {
        debug!("{:<12} --> 이벤트 발행: {}", "Producer", event.event_type());
        let payload = serde_json::to_string(event)?;
        self.send_message(&event.auction_id().to_string(), &payload)
            .await
    }
}

// endregion: --- Kafka Producer

// region:    --- Kafka Manager
pub struct KafkaManager {
    producer: Arc<KafkaProducer>,
    brokers: String,
}

/// KafkaManager 구현
impl KafkaManager {
    pub fn new(config: &KafkaConfig) -> Result<Self, BrokerError> {
        let producer = Arc::new(KafkaProducer::new(&config.brokers, &config.topic)?);

        Ok(KafkaManager {
            producer,
            brokers: config.brokers.clone(),
        })
    }

    /// 프로듀서 반환
    pub fn get_producer(&self) -> Arc<KafkaProducer> {
        Arc::clone(&self.producer)
    }

    /// 토픽 생성 (이미 있으면 그대로 사용)
    pub async fn create_topic(
        &self,
        topic_name: &str,
        num_partitions: i32,
        replication_factor: i32,
    ) -> Result<(), BrokerError> {
        info!("{:<12} --> Kafka 토픽 생성 시작: {}", "Manager", topic_name);

        let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .create()?;

        let new_topic = NewTopic::new(
            topic_name,
            num_partitions,
            TopicReplication::Fixed(replication_factor),
        );

        let results = admin_client
            .create_topics(&[new_topic], &AdminOptions::new())
            .await?;

        for result in results {
            match result {
                Ok(topic) => info!("{:<12} --> Kafka 토픽 생성 성공: {}", "Manager", topic),
                Err((topic, RDKafkaErrorCode::TopicAlreadyExists)) => {
                    info!("{:<12} --> Kafka 토픽이 이미 존재합니다: {}", "Manager", topic)
                }
                Err((topic, code)) => {
                    error!(
                        "{:<12} --> Kafka 토픽 생성 실패: {} ({:?})",
                        "Manager", topic, code
                    );
                    return Err(BrokerError::Topic { topic, code });
                }
            }
        }

        Ok(())
    }
}

// endregion: --- Kafka Manager
