use crate::{Error, Result};
use std::collections::BTreeSet;

#[cfg(feature = "hickory")]
pub mod hickory;
pub mod memory;
pub mod records;

#[cfg(feature = "hickory")]
pub use hickory::HickoryResolver;
pub use memory::MemoryResolver;
pub use records::{AddressRecord, PointerRecord, ServiceRecord};

/// Typed DNS record lookup.
///
/// This is the only network seam of the crate. Implementations must be
/// callable concurrently from many resolutions and must report "no records
/// of this type" as an empty result. `Err` is reserved for malformed names
/// ([`Error::MalformedInput`]) and hard failures ([`Error::LookupFailure`]).
#[async_trait::async_trait]
pub trait Resolver: Send + Sync {
    async fn lookup_naptr(&self, domain: &str) -> Result<BTreeSet<PointerRecord>>;
    async fn lookup_srv(&self, domain: &str) -> Result<BTreeSet<ServiceRecord>>;
    async fn lookup_a(&self, domain: &str) -> Result<Vec<AddressRecord>>;
    async fn lookup_aaaa(&self, domain: &str) -> Result<Vec<AddressRecord>>;

    /// A records followed by AAAA records.
    async fn lookup_addresses(&self, domain: &str) -> Result<Vec<AddressRecord>> {
        let mut records = self.lookup_a(domain).await?;
        records.extend(self.lookup_aaaa(domain).await?);
        Ok(records)
    }
}

#[async_trait::async_trait]
impl<R: Resolver + ?Sized> Resolver for std::sync::Arc<R> {
    async fn lookup_naptr(&self, domain: &str) -> Result<BTreeSet<PointerRecord>> {
        (**self).lookup_naptr(domain).await
    }
    async fn lookup_srv(&self, domain: &str) -> Result<BTreeSet<ServiceRecord>> {
        (**self).lookup_srv(domain).await
    }
    async fn lookup_a(&self, domain: &str) -> Result<Vec<AddressRecord>> {
        (**self).lookup_a(domain).await
    }
    async fn lookup_aaaa(&self, domain: &str) -> Result<Vec<AddressRecord>> {
        (**self).lookup_aaaa(domain).await
    }
}

/// Lowercases and strips one trailing dot.
pub fn normalize_domain(domain: &str) -> String {
    domain.trim_end_matches('.').to_ascii_lowercase()
}

/// Basic DNS name syntax check.
///
/// Labels may contain `_` so that SRV owner names such as
/// `_sip._udp.example.com` pass.
pub fn validate_domain(domain: &str) -> Result<()> {
    let name = domain.strip_suffix('.').unwrap_or(domain);
    if name.is_empty() {
        return Err(Error::MalformedInput("empty domain name".to_string()));
    }
    if name.len() > 253 {
        return Err(Error::MalformedInput(format!(
            "domain name too long: {} octets",
            name.len()
        )));
    }
    for label in name.split('.') {
        if label.is_empty() || label.len() > 63 {
            return Err(Error::MalformedInput(format!(
                "invalid label length in {}",
                domain
            )));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(Error::MalformedInput(format!(
                "label {} in {} starts or ends with '-'",
                label, domain
            )));
        }
        if !label
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(Error::MalformedInput(format!(
                "invalid character in {}",
                domain
            )));
        }
    }
    Ok(())
}
