// region:    --- Imports
use crate::error::ConfigError;
use ::config::Environment;
use serde::Deserialize;
use std::net::SocketAddr;

// endregion: --- Imports

// region:    --- Config
/// 서비스 설정 (환경 변수에서 읽음)
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub kafka: KafkaConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// 시작 시 스키마 재생성 여부
    pub reset_on_start: bool,
}

#[derive(Debug, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
    pub topic: String,
    pub partitions: i32,
    pub replication: i32,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub body_limit_bytes: usize,
}

/// 환경 변수 그대로의 평평한 설정 (DATABASE_URL -> database_url)
#[derive(Debug, Deserialize)]
struct EnvSettings {
    database_url: Option<String>,
    database_max_connections: u32,
    database_reset: bool,
    kafka_brokers: String,
    kafka_topic: String,
    kafka_partitions: i32,
    kafka_replication: i32,
    listen_addr: SocketAddr,
    body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Environment::default())
    }

    /// 주어진 환경 변수 소스에 기본값을 덧씌워 설정 생성
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let settings: EnvSettings = ::config::Config::builder()
            .set_default("database_max_connections", 5)?
            .set_default("database_reset", false)?
            .set_default("kafka_brokers", "localhost:9092")?
            .set_default("kafka_topic", "listings")?
            .set_default("kafka_partitions", 1)?
            .set_default("kafka_replication", 1)?
            .set_default("listen_addr", "0.0.0.0:3000")?
            .set_default("body_limit_bytes", 1024 * 1024)?
            .add_source(environment.try_parsing(true))
            .build()?
            .try_deserialize()?;

        let database = DatabaseConfig {
            url: settings
                .database_url
                .filter(|url| !url.trim().is_empty())
                .ok_or(ConfigError::Missing("DATABASE_URL"))?,
            max_connections: settings.database_max_connections,
            reset_on_start: settings.database_reset,
        };

        let kafka = KafkaConfig {
            brokers: settings.kafka_brokers,
            topic: settings.kafka_topic,
            partitions: settings.kafka_partitions,
            replication: settings.kafka_replication,
        };

        let server = ServerConfig {
            listen_addr: settings.listen_addr,
            body_limit_bytes: settings.body_limit_bytes,
        };

        Ok(Config {
            database,
            kafka,
            server,
        })
    }
}
// endregion: --- Config
