use super::{
    normalize_domain, validate_domain, AddressRecord, PointerRecord, Resolver, ServiceRecord,
};
use crate::{Error, Result};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::trace;

#[derive(Debug, Default)]
struct Zone {
    naptr: HashMap<String, BTreeSet<PointerRecord>>,
    srv: HashMap<String, BTreeSet<ServiceRecord>>,
    a: HashMap<String, Vec<AddressRecord>>,
    aaaa: HashMap<String, Vec<AddressRecord>>,
    failing: HashSet<String>,
}

/// In-memory zone implementing [`Resolver`].
///
/// Used for static routing tables and as a test double. Names are matched
/// case-insensitively and with or without a trailing dot. A domain marked
/// with [`MemoryResolver::fail`] answers every query with
/// [`Error::LookupFailure`].
///
/// ```rust
/// use sip_locator::resolver::MemoryResolver;
///
/// let dns = MemoryResolver::new();
/// dns.add_srv("_sip._udp.example.com", 10, 60, 5060, "sip1.example.com");
/// dns.add_a("sip1.example.com", "10.0.0.1".parse().unwrap());
/// assert_eq!(dns.query_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MemoryResolver {
    zone: Mutex<Zone>,
    queries: AtomicUsize,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_naptr(
        &self,
        owner: &str,
        order: u16,
        preference: u16,
        flags: &str,
        service: &str,
        replacement: &str,
    ) {
        let record = PointerRecord::new(
            owner,
            order,
            preference,
            flags,
            service,
            normalize_domain(replacement),
        );
        self.add_pointer_record(record);
    }

    pub fn add_pointer_record(&self, mut record: PointerRecord) {
        record.owner = normalize_domain(&record.owner);
        let mut zone = self.zone.lock().unwrap();
        zone.naptr
            .entry(record.owner.clone())
            .or_default()
            .insert(record);
    }

    pub fn add_srv(&self, owner: &str, priority: u16, weight: u16, port: u16, target: &str) {
        let owner = normalize_domain(owner);
        let record =
            ServiceRecord::new(owner.clone(), priority, weight, port, normalize_domain(target));
        let mut zone = self.zone.lock().unwrap();
        zone.srv.entry(owner).or_default().insert(record);
    }

    /// Adds an A or AAAA record depending on the address family.
    pub fn add_a(&self, owner: &str, address: IpAddr) {
        let owner = normalize_domain(owner);
        let record = AddressRecord::new(owner.clone(), address);
        let mut zone = self.zone.lock().unwrap();
        let table = match address {
            IpAddr::V4(_) => &mut zone.a,
            IpAddr::V6(_) => &mut zone.aaaa,
        };
        table.entry(owner).or_default().push(record);
    }

    pub fn add_aaaa(&self, owner: &str, address: IpAddr) {
        self.add_a(owner, address)
    }

    pub fn fail(&self, owner: &str) {
        self.zone.lock().unwrap().failing.insert(normalize_domain(owner));
    }

    /// Number of lookups answered so far, including failed ones.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn begin(&self, kind: &str, domain: &str) -> Result<String> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        validate_domain(domain)?;
        let name = normalize_domain(domain);
        trace!(kind, domain = %name, "memory lookup");
        if self.zone.lock().unwrap().failing.contains(&name) {
            return Err(Error::LookupFailure(name, "SERVFAIL".to_string()));
        }
        Ok(name)
    }
}

#[async_trait::async_trait]
impl Resolver for MemoryResolver {
    async fn lookup_naptr(&self, domain: &str) -> Result<BTreeSet<PointerRecord>> {
        let name = self.begin("NAPTR", domain)?;
        let zone = self.zone.lock().unwrap();
        Ok(zone.naptr.get(&name).cloned().unwrap_or_default())
    }

    async fn lookup_srv(&self, domain: &str) -> Result<BTreeSet<ServiceRecord>> {
        let name = self.begin("SRV", domain)?;
        let zone = self.zone.lock().unwrap();
        Ok(zone.srv.get(&name).cloned().unwrap_or_default())
    }

    async fn lookup_a(&self, domain: &str) -> Result<Vec<AddressRecord>> {
        let name = self.begin("A", domain)?;
        let zone = self.zone.lock().unwrap();
        Ok(zone.a.get(&name).cloned().unwrap_or_default())
    }

    async fn lookup_aaaa(&self, domain: &str) -> Result<Vec<AddressRecord>> {
        let name = self.begin("AAAA", domain)?;
        let zone = self.zone.lock().unwrap();
        Ok(zone.aaaa.get(&name).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_records_are_empty() {
        let dns = MemoryResolver::new();
        assert!(dns.lookup_naptr("example.com").await.unwrap().is_empty());
        assert!(dns.lookup_srv("_sip._udp.example.com").await.unwrap().is_empty());
        assert!(dns.lookup_addresses("example.com").await.unwrap().is_empty());
        assert_eq!(dns.query_count(), 4);
    }

    #[tokio::test]
    async fn test_malformed_query() {
        let dns = MemoryResolver::new();
        let err = dns.lookup_a("bad..name").await.unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[tokio::test]
    async fn test_failing_domain() {
        let dns = MemoryResolver::new();
        dns.add_a("example.com", "10.0.0.1".parse().unwrap());
        dns.fail("Example.COM.");
        let err = dns.lookup_a("example.com").await.unwrap_err();
        assert!(err.is_lookup_failure());
    }

    #[tokio::test]
    async fn test_addresses_a_before_aaaa() {
        let dns = MemoryResolver::new();
        dns.add_aaaa("host.example.com", "2001:db8::1".parse().unwrap());
        dns.add_a("host.example.com", "10.0.0.1".parse().unwrap());
        let addrs: Vec<IpAddr> = dns
            .lookup_addresses("HOST.example.com.")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.address)
            .collect();
        assert_eq!(
            addrs,
            vec![
                "10.0.0.1".parse::<IpAddr>().unwrap(),
                "2001:db8::1".parse::<IpAddr>().unwrap()
            ]
        );
    }

    #[tokio::test]
    async fn test_naptr_ordered_set() {
        let dns = MemoryResolver::new();
        dns.add_naptr("example.com", 20, 10, "s", "SIP+D2U", "_sip._udp.example.com");
        dns.add_naptr("example.com", 10, 50, "s", "SIP+D2T", "_sip._tcp.example.com");
        dns.add_naptr("example.com", 10, 50, "s", "SIP+D2T", "_sip._tcp.example.com");
        let records: Vec<_> = dns.lookup_naptr("example.com").await.unwrap().into_iter().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].service, "SIP+D2T");
    }
}
