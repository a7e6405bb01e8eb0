#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use serial_test::serial;

    use crate::config::{CandidateServiceConfig, TestServiceConfig};
    use crate::env::load_environment;

    #[test]
    #[serial]
    fn test_candidate_service_defaults() {
        temp_env::with_vars_unset(
            [
                "JWT_SECRET",
                "OTEL_EXPORTER_OTLP_ENDPOINT",
                "CANDIDATE_SERVICE_PORT",
                "CANDIDATE_SERVICE_DATABASE_URL",
            ],
            || {
                let config = CandidateServiceConfig::load().unwrap();
                assert_eq!(config, CandidateServiceConfig::default());
                assert_eq!(config.port, 8000);
                assert_eq!(config.address, IpAddr::V4(Ipv4Addr::LOCALHOST));
                assert!(config.otel_exporter_otlp_endpoint.is_none());
            },
        );
    }

    #[test]
    #[serial]
    fn test_prefixed_and_shared_variables() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some("shared-secret")),
                ("OTEL_EXPORTER_OTLP_ENDPOINT", Some("http://collector:4317")),
                ("CANDIDATE_SERVICE_PORT", Some("9000")),
                ("TEST_SERVICE_PORT", Some("9001")),
                ("TEST_SERVICE_CANDIDATE_SERVICE_URL", Some("http://candidates:9000")),
            ],
            || {
                let candidate = CandidateServiceConfig::load().unwrap();
                assert_eq!(candidate.port, 9000);
                assert_eq!(candidate.jwt_secret, "shared-secret");
                assert_eq!(
                    candidate.otel_exporter_otlp_endpoint.as_deref(),
                    Some("http://collector:4317")
                );

                let test = TestServiceConfig::load().unwrap();
                assert_eq!(test.port, 9001);
                assert_eq!(test.jwt_secret, "shared-secret");
                assert_eq!(test.candidate_service_url, "http://candidates:9000");
            },
        );
    }

    #[test]
    #[serial]
    fn test_numeric_jwt_secret_is_read_as_text() {
        temp_env::with_var("JWT_SECRET", Some("12345678"), || {
            let candidate = CandidateServiceConfig::load().unwrap();
            assert_eq!(candidate.jwt_secret, "12345678");

            let test = TestServiceConfig::load().unwrap();
            assert_eq!(test.jwt_secret, "12345678");
        });

        temp_env::with_var("JWT_SECRET", Some("true"), || {
            let candidate = CandidateServiceConfig::load().unwrap();
            assert_eq!(candidate.jwt_secret, "true");
        });
    }

    #[test]
    #[serial]
    fn test_invalid_port_is_rejected() {
        temp_env::with_var("TEST_SERVICE_PORT", Some("not-a-port"), || {
            assert!(TestServiceConfig::load().is_err());
        });
    }

    #[test]
    #[serial]
    fn test_environment_report_lists_missing_files() {
        temp_env::with_vars_unset(["JWT_SECRET", "RUST_LOG"], || {
            let environment = load_environment("unknown-service").unwrap();
            assert!(environment.loaded.contains(&"config/common.env".to_string()));
            assert!(
                environment
                    .missing
                    .contains(&"config/unknown-service.env".to_string())
            );
        });
    }
}
