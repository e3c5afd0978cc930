use async_trait::async_trait;
use splitdns_application::ports::DomainListSource;
use splitdns_domain::DomainError;
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpDomainListSource {
    url: String,
    client: reqwest::Client,
}

impl HttpDomainListSource {
    pub fn new(url: impl Into<String>) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(concat!("splitdns/", env!("CARGO_PKG_VERSION")))
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| DomainError::ConfigError(format!("HTTP client: {}", e)))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    fn load_error(&self, reason: String) -> DomainError {
        DomainError::DomainListLoad {
            source_name: self.url.clone(),
            reason,
        }
    }
}

#[async_trait]
impl DomainListSource for HttpDomainListSource {
    async fn fetch(&self) -> Result<String, DomainError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.load_error(format!("fetch error: {}", e)))?;

        if !response.status().is_success() {
            return Err(self.load_error(format!("HTTP {}", response.status().as_u16())));
        }

        response
            .text()
            .await
            .map_err(|e| self.load_error(format!("read error: {}", e)))
    }

    fn location(&self) -> &str {
        &self.url
    }
}
