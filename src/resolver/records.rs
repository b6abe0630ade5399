use std::cmp::Ordering;
use std::net::IpAddr;

/// NAPTR answer (RFC 3403) as used by RFC 3263 transport discovery.
///
/// Natural ordering is `(order, preference)`, then the remaining fields so
/// that ordered containers stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PointerRecord {
    pub owner: String,
    pub order: u16,
    pub preference: u16,
    pub flags: String,
    pub service: String,
    pub regexp: String,
    pub replacement: String,
}

impl PointerRecord {
    pub fn new(
        owner: impl Into<String>,
        order: u16,
        preference: u16,
        flags: impl Into<String>,
        service: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            order,
            preference,
            flags: flags.into(),
            service: service.into(),
            regexp: String::new(),
            replacement: replacement.into(),
        }
    }

    pub fn with_regexp(mut self, regexp: impl Into<String>) -> Self {
        self.regexp = regexp.into();
        self
    }

    /// Terminal "s" flag: the replacement names an SRV record set.
    pub fn is_terminal_srv(&self) -> bool {
        self.flags.eq_ignore_ascii_case("s") && self.regexp.is_empty()
    }
}

impl Ord for PointerRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order
            .cmp(&other.order)
            .then_with(|| self.preference.cmp(&other.preference))
            .then_with(|| self.flags.cmp(&other.flags))
            .then_with(|| self.service.cmp(&other.service))
            .then_with(|| self.regexp.cmp(&other.regexp))
            .then_with(|| self.replacement.cmp(&other.replacement))
            .then_with(|| self.owner.cmp(&other.owner))
    }
}

impl PartialOrd for PointerRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// SRV answer (RFC 2782).
///
/// Natural ordering is priority ascending, weight descending, then target
/// ascending; sorting by it is the deterministic selection order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceRecord {
    pub owner: String,
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

impl ServiceRecord {
    pub fn new(
        owner: impl Into<String>,
        priority: u16,
        weight: u16,
        port: u16,
        target: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            priority,
            weight,
            port,
            target: target.into(),
        }
    }
}

impl Ord for ServiceRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.weight.cmp(&self.weight))
            .then_with(|| self.target.cmp(&other.target))
            .then_with(|| self.port.cmp(&other.port))
            .then_with(|| self.owner.cmp(&other.owner))
    }
}

impl PartialOrd for ServiceRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A or AAAA answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddressRecord {
    pub owner: String,
    pub address: IpAddr,
}

impl AddressRecord {
    pub fn new(owner: impl Into<String>, address: IpAddr) -> Self {
        Self {
            owner: owner.into(),
            address,
        }
    }
}
