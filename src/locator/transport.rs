//! Transport rules from RFC 3261 §19.1.2 and RFC 3263 §4.
use crate::{Error, Result};
use rsip::Transport;

/// Secure transports usable for `sips` resolution. WSS is secure but has no
/// SRV service, so it never qualifies.
pub fn is_secure_transport(transport: Transport) -> bool {
    transport.is_secure() && transport != Transport::Wss
}

/// Transport used when nothing else decides: UDP for `sip`, TLS for `sips`.
pub fn default_transport(secure: bool) -> Transport {
    if secure {
        Transport::Tls
    } else {
        Transport::Udp
    }
}

/// `_service._proto` label pair for an SRV query.
pub fn srv_prefix(transport: Transport) -> Option<&'static str> {
    match transport {
        Transport::Udp => Some("_sip._udp"),
        Transport::Tcp => Some("_sip._tcp"),
        Transport::Sctp => Some("_sip._sctp"),
        Transport::Tls => Some("_sips._tcp"),
        Transport::TlsSctp => Some("_sips._sctp"),
        Transport::Ws | Transport::Wss => None,
    }
}

pub fn srv_name(transport: Transport, domain: &str) -> Option<String> {
    srv_prefix(transport).map(|prefix| format!("{}.{}", prefix, domain))
}

/// Validates a `transport=` URI parameter against the scheme and the locally
/// supported set.
///
/// For `sips` the parameter names the layer under TLS, so `tcp` becomes TLS
/// and `sctp` becomes TLS-SCTP; `udp` has no secure form.
pub fn explicit_transport(
    transport: Transport,
    secure: bool,
    supported: &[Transport],
) -> Result<Transport> {
    let transport = if secure {
        match transport {
            Transport::Tcp | Transport::Tls => Transport::Tls,
            Transport::Sctp | Transport::TlsSctp => Transport::TlsSctp,
            other => {
                return Err(Error::UnsupportedTransport(format!(
                    "{} with sips",
                    other
                )))
            }
        }
    } else {
        transport
    };
    if srv_prefix(transport).is_none() || !supported.contains(&transport) {
        return Err(Error::UnsupportedTransport(transport.to_string()));
    }
    Ok(transport)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Transport; 5] = [
        Transport::Udp,
        Transport::Tcp,
        Transport::Tls,
        Transport::Sctp,
        Transport::TlsSctp,
    ];

    #[test]
    fn test_secure_transports() {
        assert!(is_secure_transport(Transport::Tls));
        assert!(is_secure_transport(Transport::TlsSctp));
        assert!(!is_secure_transport(Transport::Wss));
        assert!(!is_secure_transport(Transport::Tcp));
    }

    #[test]
    fn test_srv_names() {
        assert_eq!(
            srv_name(Transport::Tls, "example.com").unwrap(),
            "_sips._tcp.example.com"
        );
        assert_eq!(
            srv_name(Transport::Udp, "example.com").unwrap(),
            "_sip._udp.example.com"
        );
        assert!(srv_name(Transport::Ws, "example.com").is_none());
    }

    #[test]
    fn test_explicit_transport_secure() {
        assert_eq!(
            explicit_transport(Transport::Tcp, true, &ALL).unwrap(),
            Transport::Tls
        );
        assert_eq!(
            explicit_transport(Transport::Sctp, true, &ALL).unwrap(),
            Transport::TlsSctp
        );
        assert!(matches!(
            explicit_transport(Transport::Udp, true, &ALL),
            Err(Error::UnsupportedTransport(_))
        ));
    }

    #[test]
    fn test_explicit_transport_unsupported() {
        assert_eq!(
            explicit_transport(Transport::Tcp, false, &ALL).unwrap(),
            Transport::Tcp
        );
        assert!(explicit_transport(Transport::Ws, false, &ALL).is_err());
        assert!(explicit_transport(Transport::Sctp, false, &[Transport::Udp]).is_err());
    }
}
