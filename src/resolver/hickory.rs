use super::{
    normalize_domain, validate_domain, AddressRecord, PointerRecord, Resolver, ServiceRecord,
};
use crate::{Error, Result};
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::proto::ProtoErrorKind;
use hickory_resolver::{ResolveError, ResolveErrorKind, TokioResolver};
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::trace;

/// [`Resolver`] backed by hickory-dns.
///
/// Queries are always issued for the fully qualified name so that search
/// domains from the system configuration never apply.
#[derive(Debug, Clone)]
pub struct HickoryResolver {
    resolver: Arc<TokioResolver>,
}

impl HickoryResolver {
    /// Uses the system DNS configuration (`/etc/resolv.conf` on unix).
    pub fn from_system() -> Result<Self> {
        let resolver = TokioResolver::builder_tokio()
            .map_err(|e| Error::LookupFailure("system configuration".to_string(), e.to_string()))?
            .build();
        Ok(Self {
            resolver: Arc::new(resolver),
        })
    }

    pub fn with_config(config: ResolverConfig, opts: ResolverOpts) -> Self {
        let resolver =
            TokioResolver::builder_with_config(config, TokioConnectionProvider::default())
                .with_options(opts)
                .build();
        Self {
            resolver: Arc::new(resolver),
        }
    }

    fn query_name(domain: &str) -> Result<(String, String)> {
        validate_domain(domain)?;
        let name = normalize_domain(domain);
        let fqdn = format!("{}.", name);
        Ok((name, fqdn))
    }
}

/// NXDOMAIN and NODATA both surface as `NoRecordsFound`.
fn is_no_records_error(error: &ResolveError) -> bool {
    if let ResolveErrorKind::Proto(proto_error) = error.kind() {
        matches!(proto_error.kind(), ProtoErrorKind::NoRecordsFound { .. })
    } else {
        false
    }
}

fn lookup_error<T: Default>(name: &str, error: ResolveError) -> Result<T> {
    if is_no_records_error(&error) {
        trace!(domain = %name, "no records");
        Ok(T::default())
    } else {
        Err(Error::LookupFailure(name.to_string(), error.to_string()))
    }
}

#[async_trait::async_trait]
impl Resolver for HickoryResolver {
    async fn lookup_naptr(&self, domain: &str) -> Result<BTreeSet<PointerRecord>> {
        let (name, fqdn) = Self::query_name(domain)?;
        trace!(domain = %name, "NAPTR query");
        let lookup = match self.resolver.lookup(fqdn, RecordType::NAPTR).await {
            Ok(lookup) => lookup,
            Err(e) => return lookup_error(&name, e),
        };
        let records = lookup
            .iter()
            .filter_map(|rdata| match rdata {
                RData::NAPTR(naptr) => Some(PointerRecord {
                    owner: name.clone(),
                    order: naptr.order(),
                    preference: naptr.preference(),
                    flags: String::from_utf8_lossy(naptr.flags()).into_owned(),
                    service: String::from_utf8_lossy(naptr.services()).into_owned(),
                    regexp: String::from_utf8_lossy(naptr.regexp()).into_owned(),
                    replacement: normalize_domain(&naptr.replacement().to_utf8()),
                }),
                _ => None,
            })
            .collect();
        Ok(records)
    }

    async fn lookup_srv(&self, domain: &str) -> Result<BTreeSet<ServiceRecord>> {
        let (name, fqdn) = Self::query_name(domain)?;
        trace!(domain = %name, "SRV query");
        let lookup = match self.resolver.srv_lookup(fqdn).await {
            Ok(lookup) => lookup,
            Err(e) => return lookup_error(&name, e),
        };
        let records = lookup
            .iter()
            .filter_map(|srv| {
                let target = normalize_domain(&srv.target().to_utf8());
                // "." means the service is decidedly not available
                if target.is_empty() {
                    return None;
                }
                Some(ServiceRecord::new(
                    name.clone(),
                    srv.priority(),
                    srv.weight(),
                    srv.port(),
                    target,
                ))
            })
            .collect();
        Ok(records)
    }

    async fn lookup_a(&self, domain: &str) -> Result<Vec<AddressRecord>> {
        let (name, fqdn) = Self::query_name(domain)?;
        trace!(domain = %name, "A query");
        match self.resolver.ipv4_lookup(fqdn).await {
            Ok(lookup) => Ok(lookup
                .iter()
                .map(|a| AddressRecord::new(name.clone(), IpAddr::V4(a.0)))
                .collect()),
            Err(e) => lookup_error(&name, e),
        }
    }

    async fn lookup_aaaa(&self, domain: &str) -> Result<Vec<AddressRecord>> {
        let (name, fqdn) = Self::query_name(domain)?;
        trace!(domain = %name, "AAAA query");
        match self.resolver.ipv6_lookup(fqdn).await {
            Ok(lookup) => Ok(lookup
                .iter()
                .map(|aaaa| AddressRecord::new(name.clone(), IpAddr::V6(aaaa.0)))
                .collect()),
            Err(e) => lookup_error(&name, e),
        }
    }
}
