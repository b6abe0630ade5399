//! RFC 3263 resolution of a SIP URI into an ordered list of hops.
//!
//! Decision order for one URI:
//!
//! 1. Numeric host (or `maddr`): no DNS at all; transport and port come from
//!    the URI or their defaults.
//! 2. Explicit port: no NAPTR and no SRV; A/AAAA on the host.
//! 3. Transport: explicit `transport=` parameter, else the top NAPTR pointer,
//!    else one branch per configured default transport.
//! 4. SRV per branch, ordered by the [`selector`](crate::selector). Without
//!    SRV data the host itself is used at the transport's default port.
//! 5. A then AAAA per target; hops are concatenated in branch and SRV order
//!    and de-duplicated.
//!
//! Branches and targets are resolved concurrently; the output order is fixed
//! by the plan, never by completion order.
use crate::hop::{Hop, HopHost};
use crate::resolver::{PointerRecord, Resolver, ServiceRecord};
use crate::rsip_ext::{locate_params, LocateParams, TargetHost};
use crate::selector::{select_pointers, select_services, ServiceTag};
use crate::{Error, Result};
use futures::future::join_all;
use rand::rngs::StdRng;
use rsip::Transport;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub mod config;
pub mod transport;

pub use config::{LocatorBuilder, LocatorConfig};
use transport::{default_transport, explicit_transport, is_secure_transport, srv_name};

struct LocatorInner {
    resolver: Arc<dyn Resolver>,
    config: LocatorConfig,
    rng: Mutex<StdRng>,
}

/// Resolves SIP URIs into ordered [`Hop`] lists. Cheap to clone.
#[derive(Clone)]
pub struct Locator {
    inner: Arc<LocatorInner>,
}

/// One transport branch: which SRV name to query for which transport.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Branch {
    transport: Transport,
    srv_name: String,
}

#[derive(Debug, Default)]
struct BranchOutcome {
    srv_found: bool,
    hops: Vec<Hop>,
    error: Option<Error>,
}

impl Locator {
    pub fn new<R: Resolver + 'static>(resolver: R, config: LocatorConfig) -> Result<Self> {
        LocatorBuilder::new()
            .with_resolver(resolver)
            .with_config(config)
            .build()
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.inner.config
    }

    /// Resolves `uri` into hops in the order they should be tried.
    pub async fn locate(&self, uri: &rsip::Uri) -> Result<Vec<Hop>> {
        let params = locate_params(uri)?;
        self.locate_params(&params).await
    }

    pub async fn locate_params(&self, params: &LocateParams) -> Result<Vec<Hop>> {
        let explicit = params
            .transport
            .map(|t| explicit_transport(t, params.secure, &self.inner.config.supported_transports))
            .transpose()?;

        match &params.target {
            TargetHost::Numeric(ip) => {
                let transport = match explicit {
                    Some(transport) => transport,
                    None => self.implicit_transport(params.secure)?,
                };
                let port = params.port.unwrap_or_else(|| transport.default_port().into());
                debug!(%ip, port, ?transport, "numeric host, skipping DNS");
                Ok(vec![Hop::new(*ip, port, transport)])
            }
            TargetHost::Symbolic(domain) => {
                self.locate_domain(domain, params.secure, params.port, explicit)
                    .await
            }
        }
    }

    async fn locate_domain(
        &self,
        domain: &str,
        secure: bool,
        port: Option<u16>,
        explicit: Option<Transport>,
    ) -> Result<Vec<Hop>> {
        if let Some(port) = port {
            let transport = match explicit {
                Some(transport) => transport,
                None => self.implicit_transport(secure)?,
            };
            debug!(domain, port, ?transport, "explicit port, skipping NAPTR and SRV");
            let (hops, error) = match self.resolve_target(domain, port, transport).await {
                Ok(hops) => (hops, None),
                Err(e) => (Vec::new(), Some(e)),
            };
            return finish(domain, hops, error, false, transport, port);
        }

        let mut last_error = None;
        let branches = match explicit {
            Some(transport) => vec![self.branch(domain, transport)?],
            None => match self.naptr_branch(domain, secure).await {
                Ok(Some(branch)) => vec![branch],
                Ok(None) => self.default_branches(domain, secure)?,
                Err(e) => {
                    warn!(domain, error = %e, "NAPTR lookup failed, using default transports");
                    last_error = Some(e);
                    self.default_branches(domain, secure)?
                }
            },
        };

        let outcomes = join_all(branches.iter().map(|b| self.resolve_branch(b))).await;

        let mut hops = Vec::new();
        let mut srv_found = false;
        for outcome in outcomes {
            srv_found |= outcome.srv_found;
            hops.extend(outcome.hops);
            if outcome.error.is_some() {
                last_error = outcome.error;
            }
        }

        let fallback = match branches.first() {
            Some(branch) => branch.transport,
            None => self.implicit_transport(secure)?,
        };
        let fallback_port: u16 = fallback.default_port().into();

        if !srv_found {
            debug!(domain, transport = ?fallback, "no SRV records, using host addresses");
            match self.resolve_target(domain, fallback_port, fallback).await {
                Ok(found) => hops.extend(found),
                Err(e) => last_error = Some(e),
            }
        }

        finish(domain, hops, last_error, srv_found, fallback, fallback_port)
    }

    fn branch(&self, domain: &str, transport: Transport) -> Result<Branch> {
        let srv_name = srv_name(transport, domain)
            .ok_or_else(|| Error::UnsupportedTransport(transport.to_string()))?;
        Ok(Branch {
            transport,
            srv_name,
        })
    }

    fn supports(&self, transport: Transport) -> bool {
        self.inner.config.supported_transports.contains(&transport)
    }

    /// UDP for `sip`, TLS for `sips`, provided the configuration supports it.
    fn implicit_transport(&self, secure: bool) -> Result<Transport> {
        let transport = default_transport(secure);
        if !self.supports(transport) {
            return Err(Error::UnsupportedTransport(transport.to_string()));
        }
        Ok(transport)
    }

    /// Transport and SRV name from the most preferred usable NAPTR pointer.
    async fn naptr_branch(&self, domain: &str, secure: bool) -> Result<Option<Branch>> {
        if !self.inner.config.enable_naptr {
            return Ok(None);
        }
        let records = self.inner.resolver.lookup_naptr(domain).await?;
        let eligible: Vec<&PointerRecord> = records
            .iter()
            .filter(|r| match ServiceTag::parse(&r.service) {
                Some(tag) => (!secure || tag.is_secure()) && self.supports(tag.transport()),
                None => false,
            })
            .collect();
        let selected = select_pointers(eligible);
        let Some((top, tag)) = selected
            .first()
            .and_then(|r| ServiceTag::parse(&r.service).map(|tag| (r, tag)))
        else {
            debug!(domain, "no usable NAPTR records");
            return Ok(None);
        };
        let transport = tag.transport();
        let srv_name = if top.replacement.is_empty() {
            self.branch(domain, transport)?.srv_name
        } else {
            top.replacement.clone()
        };
        debug!(domain, service = %tag, srv = %srv_name, "selected NAPTR pointer");
        Ok(Some(Branch {
            transport,
            srv_name,
        }))
    }

    fn default_branches(&self, domain: &str, secure: bool) -> Result<Vec<Branch>> {
        let transports: Vec<Transport> = self
            .inner
            .config
            .default_transports
            .iter()
            .copied()
            .filter(|t| self.supports(*t) && (!secure || is_secure_transport(*t)))
            .collect();
        if transports.is_empty() {
            return Err(Error::UnsupportedTransport(format!(
                "no {} default transport for {}",
                if secure { "secure" } else { "supported" },
                domain
            )));
        }
        transports
            .into_iter()
            .map(|t| self.branch(domain, t))
            .collect()
    }

    async fn resolve_branch(&self, branch: &Branch) -> BranchOutcome {
        let records = match self.inner.resolver.lookup_srv(&branch.srv_name).await {
            Ok(records) => records,
            Err(e) => {
                warn!(srv = %branch.srv_name, error = %e, "SRV lookup failed");
                return BranchOutcome {
                    error: Some(e),
                    ..Default::default()
                };
            }
        };
        if records.is_empty() {
            return BranchOutcome::default();
        }

        let ordered = self.order_services(&records);
        let results = join_all(
            ordered
                .iter()
                .map(|r| self.resolve_target(&r.target, r.port, branch.transport)),
        )
        .await;

        let mut outcome = BranchOutcome {
            srv_found: true,
            ..Default::default()
        };
        for (record, result) in ordered.iter().zip(results) {
            match result {
                Ok(hops) => outcome.hops.extend(hops),
                Err(e) => {
                    warn!(srv_target = %record.target, error = %e, "skipping SRV target");
                    outcome.error = Some(e);
                }
            }
        }
        outcome
    }

    fn order_services<'a, I>(&self, records: I) -> Vec<ServiceRecord>
    where
        I: IntoIterator<Item = &'a ServiceRecord>,
    {
        // A panic mid-draw leaves the generator usable.
        let mut rng = self.inner.rng.lock().unwrap_or_else(|e| e.into_inner());
        select_services(records, self.inner.config.selection, &mut *rng)
    }

    /// A then AAAA for `name`. One family failing is tolerated when the
    /// other answers.
    async fn resolve_target(&self, name: &str, port: u16, transport: Transport) -> Result<Vec<Hop>> {
        let resolver = &self.inner.resolver;
        let (a, aaaa) = futures::join!(resolver.lookup_a(name), resolver.lookup_aaaa(name));
        let records = match (a, aaaa) {
            (Ok(mut a), Ok(aaaa)) => {
                a.extend(aaaa);
                a
            }
            (Ok(found), Err(e)) | (Err(e), Ok(found)) => {
                warn!(name, error = %e, "partial address lookup failure");
                found
            }
            (Err(_), Err(e)) => return Err(e),
        };
        Ok(records
            .into_iter()
            .map(|r| Hop::new(r.address, port, transport))
            .collect())
    }
}

fn finish(
    domain: &str,
    hops: Vec<Hop>,
    last_error: Option<Error>,
    srv_found: bool,
    transport: Transport,
    port: u16,
) -> Result<Vec<Hop>> {
    let mut seen = HashSet::new();
    let hops: Vec<Hop> = hops.into_iter().filter(|h| seen.insert(h.clone())).collect();
    if !hops.is_empty() {
        return Ok(hops);
    }
    match last_error {
        Some(e) => Err(Error::ResolutionFailure(domain.to_string(), Box::new(e))),
        // Published SRV targets without addresses never fall back to the host.
        None if srv_found => Err(Error::ResolutionFailure(
            domain.to_string(),
            Box::new(Error::LookupFailure(
                domain.to_string(),
                "no SRV target has addresses".to_string(),
            )),
        )),
        None => {
            debug!(domain, port, ?transport, "nothing resolved, using literal host");
            Ok(vec![Hop::new(
                HopHost::Name(domain.to_string()),
                port,
                transport,
            )])
        }
    }
}
