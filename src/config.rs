use std::net::{IpAddr, Ipv4Addr};

use rocket::figment::{
    Figment,
    providers::{Env, Serialized},
};
use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

pub const CANDIDATE_SERVICE_NAME: &str = "candidate-service";
pub const TEST_SERVICE_NAME: &str = "test-service";

const DEFAULT_JWT_SECRET: &str = "TEMP_SECRET";

/// Environment variables shared by both services, read without a prefix.
const SHARED_KEYS: [&str; 2] = ["jwt_secret", "otel_exporter_otlp_endpoint"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateServiceConfig {
    pub database_url: String,
    pub address: IpAddr,
    pub port: u16,
    #[serde(deserialize_with = "scalar_as_string")]
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub test_service_url: String,
    pub request_timeout_secs: u64,
    pub otel_exporter_otlp_endpoint: Option<String>,
}

impl Default for CandidateServiceConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://candidate_service.db".to_string(),
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8000,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            access_token_minutes: 60,
            test_service_url: "http://127.0.0.1:8001".to_string(),
            request_timeout_secs: 10,
            otel_exporter_otlp_endpoint: None,
        }
    }
}

impl CandidateServiceConfig {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::raw().only(&SHARED_KEYS))
            .merge(Env::prefixed("CANDIDATE_SERVICE_"))
    }

    pub fn load() -> Result<Self, rocket::figment::Error> {
        Self::figment().extract()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestServiceConfig {
    pub database_url: String,
    pub address: IpAddr,
    pub port: u16,
    #[serde(deserialize_with = "scalar_as_string")]
    pub jwt_secret: String,
    pub candidate_service_url: String,
    pub request_timeout_secs: u64,
    pub otel_exporter_otlp_endpoint: Option<String>,
}

impl Default for TestServiceConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://test_service.db".to_string(),
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8001,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            candidate_service_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: 10,
            otel_exporter_otlp_endpoint: None,
        }
    }
}

impl TestServiceConfig {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::raw().only(&SHARED_KEYS))
            .merge(Env::prefixed("TEST_SERVICE_"))
    }

    pub fn load() -> Result<Self, rocket::figment::Error> {
        Self::figment().extract()
    }
}

/// Accepts any scalar as text. Env values such as `JWT_SECRET=12345678` are
/// read as numbers by figment.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct ScalarVisitor;

    impl Visitor<'_> for ScalarVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number or boolean")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<String, E> {
            Ok(value)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i128<E: de::Error>(self, value: i128) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_u128<E: de::Error>(self, value: u128) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_char<E: de::Error>(self, value: char) -> Result<String, E> {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(ScalarVisitor)
}

/// Rocket's own settings with the service's bind address and port applied.
pub fn rocket_figment(address: IpAddr, port: u16) -> Figment {
    rocket::Config::figment()
        .merge(("address", address))
        .merge(("port", port))
}
