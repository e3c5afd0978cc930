use async_trait::async_trait;
use splitdns_application::ports::DomainListSource;
use splitdns_application::use_cases::LoadDomainPolicyUseCase;
use splitdns_domain::config::PolicyConfig;
use splitdns_domain::{Classification, DomainError, ReverseZonePolicy};
use std::sync::Arc;

struct StaticSource(&'static str);

#[async_trait]
impl DomainListSource for StaticSource {
    async fn fetch(&self) -> Result<String, DomainError> {
        Ok(self.0.to_string())
    }

    fn location(&self) -> &str {
        "memory"
    }
}

struct FailingSource;

#[async_trait]
impl DomainListSource for FailingSource {
    async fn fetch(&self) -> Result<String, DomainError> {
        Err(DomainError::DomainListLoad {
            source_name: "http://unreachable.invalid/list.txt".into(),
            reason: "connection refused".into(),
        })
    }

    fn location(&self) -> &str {
        "http://unreachable.invalid/list.txt"
    }
}

#[tokio::test]
async fn test_loads_primary_list_from_source() {
    let use_case =
        LoadDomainPolicyUseCase::new(Some(Arc::new(StaticSource("example.cn\n\nqq.com\n"))));

    let policy = use_case.execute(&PolicyConfig::default()).await;

    assert_eq!(policy.primary_len(), 2);
    assert_eq!(policy.classify("www.qq.com"), Classification::Primary);
    assert_eq!(policy.classify("example.org"), Classification::Alternate);
    assert_eq!(policy.classify("printer.lan"), Classification::Local);
}

#[tokio::test]
async fn test_unreachable_source_is_not_fatal() {
    let use_case = LoadDomainPolicyUseCase::new(Some(Arc::new(FailingSource)));

    let policy = use_case.execute(&PolicyConfig::default()).await;

    assert_eq!(policy.primary_len(), 0);
    assert_eq!(policy.classify("www.qq.com"), Classification::Alternate);
    assert_eq!(policy.classify("router.local"), Classification::Local);
}

#[tokio::test]
async fn test_config_suffixes_and_reverse_zones_applied() {
    let config = PolicyConfig {
        domain_list: String::new(),
        local_suffixes: vec!["home.arpa".into()],
        banned_suffixes: vec!["ads.example".into()],
        reverse_zones: ReverseZonePolicy::Local,
    };

    let policy = LoadDomainPolicyUseCase::new(None).execute(&config).await;

    assert_eq!(policy.classify("nas.home.arpa"), Classification::Local);
    assert_eq!(policy.classify("printer.lan"), Classification::Alternate);
    assert_eq!(policy.classify("1.1.168.192.in-addr.arpa"), Classification::Local);
    assert!(policy.is_banned("tracker.ads.example"));
    assert!(!policy.is_banned("example"));
}
