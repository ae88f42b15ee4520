//! An in-memory `DnsResolver` test double, analogous to the teacher
//! crate's `caches::test::TestCache`: not `#[cfg(test)]`-gated, so
//! downstream integration tests can depend on it directly.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::caa::CaaRecord;
use crate::resolver::{DnsError, DnsResolver};

#[derive(Default)]
pub struct StaticResolver {
    a_records: RwLock<HashMap<String, Vec<Ipv4Addr>>>,
    txt_records: RwLock<HashMap<String, Vec<String>>>,
    caa_records: RwLock<HashMap<String, Vec<CaaRecord>>>,
    caa_errors: RwLock<HashMap<String, DnsError>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_a(self, name: &str, addresses: Vec<Ipv4Addr>) -> Self {
        self.a_records
            .write()
            .unwrap()
            .insert(name.to_string(), addresses);
        self
    }

    pub fn with_txt(self, name: &str, values: Vec<String>) -> Self {
        self.txt_records
            .write()
            .unwrap()
            .insert(name.to_string(), values);
        self
    }

    pub fn with_caa(self, name: &str, records: Vec<CaaRecord>) -> Self {
        self.caa_records
            .write()
            .unwrap()
            .insert(name.to_string(), records);
        self
    }

    /// Configures `name` to fail CAA lookups; used to prove the ancestor
    /// walk never actually queries a given name (e.g. the TLD).
    pub fn with_caa_error_on(self, name: &str) -> Self {
        self.caa_errors.write().unwrap().insert(
            name.to_string(),
            DnsError::Other("unexpected CAA query".to_string()),
        );
        self
    }
}

#[async_trait]
impl DnsResolver for StaticResolver {
    async fn lookup_host(&self, name: &str) -> Result<Vec<Ipv4Addr>, DnsError> {
        Ok(self
            .a_records
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default())
    }

    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, DnsError> {
        Ok(self
            .txt_records
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default())
    }

    async fn lookup_caa(&self, name: &str) -> Result<Vec<CaaRecord>, DnsError> {
        if let Some(err) = self.caa_errors.read().unwrap().get(name) {
            return Err(err.clone());
        }
        Ok(self
            .caa_records
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default())
    }
}
