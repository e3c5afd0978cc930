//! Where the primary domain list is read from.

mod file;
mod http;

pub use file::FileDomainListSource;
pub use http::HttpDomainListSource;

use splitdns_application::ports::DomainListSource;
use splitdns_domain::DomainError;
use std::sync::Arc;

/// `http://` and `https://` locations are downloaded; anything else is a
/// local path.
pub fn source_for(location: &str) -> Result<Arc<dyn DomainListSource>, DomainError> {
    let lower = location.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(Arc::new(HttpDomainListSource::new(location)?))
    } else {
        Ok(Arc::new(FileDomainListSource::new(location)))
    }
}
