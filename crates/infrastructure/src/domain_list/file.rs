use async_trait::async_trait;
use splitdns_application::ports::DomainListSource;
use splitdns_domain::DomainError;
use std::path::PathBuf;

pub struct FileDomainListSource {
    path: PathBuf,
    location: String,
}

impl FileDomainListSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let location = path.display().to_string();
        Self { path, location }
    }
}

#[async_trait]
impl DomainListSource for FileDomainListSource {
    async fn fetch(&self) -> Result<String, DomainError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| DomainError::DomainListLoad {
                source_name: self.location.clone(),
                reason: e.to_string(),
            })
    }

    fn location(&self) -> &str {
        &self.location
    }
}
