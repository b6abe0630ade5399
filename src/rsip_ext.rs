use crate::{Error, Result};
use rsip::{Host, Param, Scheme, Transport, Uri};
use std::net::IpAddr;

/// Resolution target of a URI after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetHost {
    Numeric(IpAddr),
    Symbolic(String),
}

/// The fields of a SIP URI that drive server location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocateParams {
    pub target: TargetHost,
    pub secure: bool,
    pub port: Option<u16>,
    pub transport: Option<Transport>,
}

pub fn is_secure(uri: &Uri) -> Result<bool> {
    match uri.scheme.as_ref() {
        Some(Scheme::Sips) => Ok(true),
        Some(Scheme::Sip) | None => Ok(false),
        Some(Scheme::Other(other)) => Err(Error::MalformedInput(format!(
            "unsupported URI scheme: {}",
            other
        ))),
    }
}

pub fn transport_param(uri: &Uri) -> Option<Transport> {
    uri.params.iter().find_map(|p| match p {
        Param::Transport(t) => Some(*t),
        _ => None,
    })
}

pub fn maddr_param(uri: &Uri) -> Option<String> {
    uri.params.iter().find_map(|p| match p {
        Param::Maddr(maddr) => Some(maddr.to_string()),
        Param::Other(name, Some(value)) if name.to_string().eq_ignore_ascii_case("maddr") => {
            Some(value.to_string())
        }
        _ => None,
    })
}

/// Parses a host string as an IP literal, accepting bracketed IPv6.
pub fn parse_numeric_host(host: &str) -> Option<IpAddr> {
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    host.parse::<IpAddr>().ok()
}

pub fn classify_host(host: &str) -> TargetHost {
    match parse_numeric_host(host) {
        Some(ip) => TargetHost::Numeric(ip),
        None => TargetHost::Symbolic(host.trim_end_matches('.').to_ascii_lowercase()),
    }
}

/// Extracts scheme, target, port and transport from `uri`.
///
/// `maddr`, when present, replaces the host as the resolution target.
pub fn locate_params(uri: &Uri) -> Result<LocateParams> {
    let secure = is_secure(uri)?;
    let target = match maddr_param(uri) {
        Some(maddr) => classify_host(&maddr),
        None => match &uri.host_with_port.host {
            Host::IpAddr(ip) => TargetHost::Numeric(*ip),
            Host::Domain(domain) => classify_host(&domain.to_string()),
        },
    };
    if let TargetHost::Symbolic(name) = &target {
        crate::resolver::validate_domain(name)?;
    }
    let port = match uri.host_with_port.port.clone() {
        Some(p) => {
            let p: u16 = p.into();
            if p == 0 {
                return Err(Error::MalformedInput("port 0 in URI".to_string()));
            }
            Some(p)
        }
        None => None,
    };
    Ok(LocateParams {
        target,
        secure,
        port,
        transport: transport_param(uri),
    })
}
