use async_trait::async_trait;
use splitdns_domain::DomainError;

/// Where the primary domain list comes from (file, URL).
#[async_trait]
pub trait DomainListSource: Send + Sync {
    /// Whole list as UTF-8 text, one domain per line.
    async fn fetch(&self) -> Result<String, DomainError>;

    fn location(&self) -> &str;
}
