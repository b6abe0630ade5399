use super::{Locator, LocatorInner};
use crate::resolver::Resolver;
use crate::selector::SelectionMode;
use crate::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rsip::Transport;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorConfig {
    /// Transports tried, in order, when a domain publishes no usable NAPTR.
    pub default_transports: Vec<Transport>,
    pub supported_transports: Vec<Transport>,
    pub selection: SelectionMode,
    pub enable_naptr: bool,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            default_transports: vec![Transport::Udp, Transport::Tcp, Transport::Tls],
            supported_transports: vec![
                Transport::Udp,
                Transport::Tcp,
                Transport::Tls,
                Transport::Sctp,
                Transport::TlsSctp,
            ],
            selection: SelectionMode::Weighted,
            enable_naptr: true,
        }
    }
}

/// Builder for [`Locator`].
///
/// ```rust
/// use sip_locator::{resolver::MemoryResolver, LocatorBuilder, SelectionMode};
///
/// let locator = LocatorBuilder::new()
///     .with_resolver(MemoryResolver::new())
///     .with_selection_mode(SelectionMode::Deterministic)
///     .build()
///     .unwrap();
/// assert_eq!(locator.config().selection, SelectionMode::Deterministic);
/// ```
pub struct LocatorBuilder {
    resolver: Option<Arc<dyn Resolver>>,
    config: LocatorConfig,
    rng_seed: Option<u64>,
}

impl Default for LocatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LocatorBuilder {
    pub fn new() -> Self {
        Self {
            resolver: None,
            config: LocatorConfig::default(),
            rng_seed: None,
        }
    }

    pub fn with_resolver<R: Resolver + 'static>(mut self, resolver: R) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn with_config(mut self, config: LocatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_default_transports(mut self, transports: Vec<Transport>) -> Self {
        self.config.default_transports = transports;
        self
    }

    pub fn with_supported_transports(mut self, transports: Vec<Transport>) -> Self {
        self.config.supported_transports = transports;
        self
    }

    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.config.selection = mode;
        self
    }

    /// Seeds the weighted SRV draw so resolutions are reproducible.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn disable_naptr(mut self) -> Self {
        self.config.enable_naptr = false;
        self
    }

    /// Without an explicit resolver the system DNS configuration is used.
    pub fn build(self) -> Result<Locator> {
        let resolver = match self.resolver {
            Some(resolver) => resolver,
            None => default_resolver()?,
        };
        let rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Locator {
            inner: Arc::new(LocatorInner {
                resolver,
                config: self.config,
                rng: Mutex::new(rng),
            }),
        })
    }
}

#[cfg(feature = "hickory")]
fn default_resolver() -> Result<Arc<dyn Resolver>> {
    Ok(Arc::new(crate::resolver::HickoryResolver::from_system()?))
}

#[cfg(not(feature = "hickory"))]
fn default_resolver() -> Result<Arc<dyn Resolver>> {
    Err(crate::Error::LookupFailure(
        "resolver".to_string(),
        "no resolver configured and the hickory feature is disabled".to_string(),
    ))
}
