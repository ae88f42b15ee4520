//! Safe-browsing collaborator (§6): injected for future use, not
//! invoked by this core. Kept as a trait so a caller can wire in a real
//! check without changing the VA's construction signature later.

use async_trait::async_trait;

#[async_trait]
pub trait SafeBrowsing: Send + Sync {
    async fn is_listed(&self, name: &str) -> bool;
}

#[derive(Debug, Default)]
pub struct NoopSafeBrowsing;

#[async_trait]
impl SafeBrowsing for NoopSafeBrowsing {
    async fn is_listed(&self, _name: &str) -> bool {
        false
    }
}
