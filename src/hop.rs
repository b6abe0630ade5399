use crate::resolver::validate_domain;
use crate::{Error, Result};
use rsip::Transport;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// Host part of a [`Hop`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HopHost {
    Ip(IpAddr),
    /// Unresolved name, produced only by the literal-host fallback.
    Name(String),
}

impl fmt::Display for HopHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HopHost::Ip(IpAddr::V6(ip)) => write!(f, "[{}]", ip),
            HopHost::Ip(ip) => write!(f, "{}", ip),
            HopHost::Name(name) => f.write_str(name),
        }
    }
}

impl From<IpAddr> for HopHost {
    fn from(ip: IpAddr) -> Self {
        HopHost::Ip(ip)
    }
}

impl From<HopHost> for rsip::Host {
    fn from(host: HopHost) -> Self {
        match host {
            HopHost::Ip(ip) => rsip::Host::IpAddr(ip),
            HopHost::Name(name) => rsip::Host::Domain(name.into()),
        }
    }
}

/// One concrete destination candidate for a SIP request.
///
/// The port is always concrete. The textual form is `host:port/TRANSPORT`,
/// e.g. `127.0.0.1:5060/TCP` or `[2001:db8::1]:5061/TLS`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hop {
    pub host: HopHost,
    pub port: u16,
    pub transport: Transport,
}

impl Hop {
    pub fn new(host: impl Into<HopHost>, port: u16, transport: Transport) -> Self {
        Self {
            host: host.into(),
            port,
            transport,
        }
    }

    pub fn socket_addr(&self) -> Option<SocketAddr> {
        match self.host {
            HopHost::Ip(ip) => Some(SocketAddr::new(ip, self.port)),
            HopHost::Name(_) => None,
        }
    }
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.host, self.port, self.transport)
    }
}

impl FromStr for Hop {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        HopParser::strict().parse(s)
    }
}

/// Hop descriptors only name the transports RFC 3263 can locate.
fn parse_transport_token(token: &str) -> Option<Transport> {
    match token.parse::<Transport>() {
        Ok(Transport::Ws | Transport::Wss) | Err(_) => None,
        Ok(transport) => Some(transport),
    }
}

/// Strict parser for `host:port/transport` descriptors.
///
/// Any deviation is an error; there is no best-effort result. IPv6 hosts
/// must be bracketed.
///
/// ```rust
/// use sip_locator::HopParser;
///
/// let hop = HopParser::strict().parse("127.0.0.1:5060/TCP").unwrap();
/// assert_eq!(hop.port, 5060);
/// assert!(HopParser::strict().parse("example.org:5060/TCP").is_err());
/// assert!(HopParser::permissive().parse("example.org:5060/TCP").is_ok());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HopParser {
    allow_names: bool,
}

impl HopParser {
    /// Only literal IPv4/IPv6 hosts.
    pub fn strict() -> Self {
        Self { allow_names: false }
    }

    /// Literal addresses and syntactically valid domain names.
    pub fn permissive() -> Self {
        Self { allow_names: true }
    }

    pub fn parse(&self, input: &str) -> Result<Hop> {
        let (host_port, token) = input
            .rsplit_once('/')
            .ok_or_else(|| invalid(input, "missing transport"))?;
        let transport =
            parse_transport_token(token).ok_or_else(|| invalid(input, "unknown transport"))?;

        let (host, port) = if let Some(rest) = host_port.strip_prefix('[') {
            let (host, after) = rest
                .split_once(']')
                .ok_or_else(|| invalid(input, "unterminated IPv6 literal"))?;
            let port = after
                .strip_prefix(':')
                .ok_or_else(|| invalid(input, "missing port"))?;
            let ip: std::net::Ipv6Addr = host
                .parse()
                .map_err(|_| invalid(input, "invalid IPv6 literal"))?;
            (HopHost::Ip(IpAddr::V6(ip)), port)
        } else {
            let (host, port) = host_port
                .rsplit_once(':')
                .ok_or_else(|| invalid(input, "missing port"))?;
            (self.parse_host(input, host)?, port)
        };

        Ok(Hop {
            host,
            port: parse_port(input, port)?,
            transport,
        })
    }

    fn parse_host(&self, input: &str, host: &str) -> Result<HopHost> {
        if host.is_empty() {
            return Err(invalid(input, "empty host"));
        }
        if host.contains(':') {
            return Err(invalid(input, "IPv6 host must be bracketed"));
        }
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(HopHost::Ip(ip));
        }
        if !self.allow_names {
            return Err(invalid(input, "host is not a literal address"));
        }
        validate_domain(host).map_err(|_| invalid(input, "invalid host name"))?;
        Ok(HopHost::Name(host.to_ascii_lowercase()))
    }
}

fn parse_port(input: &str, port: &str) -> Result<u16> {
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(input, "port is not numeric"));
    }
    match port.parse::<u16>() {
        Ok(p) if p > 0 => Ok(p),
        _ => Err(invalid(input, "port out of range")),
    }
}

fn invalid(input: &str, reason: &str) -> Error {
    Error::InvalidHop(format!("{}: {}", input, reason))
}
