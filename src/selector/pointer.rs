use crate::resolver::PointerRecord;
use rsip::Transport;
use std::fmt;

/// RFC 3263 NAPTR service tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceTag {
    SipD2U,
    SipD2T,
    SipD2S,
    SipsD2T,
    SipsD2S,
}

impl ServiceTag {
    pub fn parse(service: &str) -> Option<Self> {
        match service.to_ascii_uppercase().as_str() {
            "SIP+D2U" => Some(ServiceTag::SipD2U),
            "SIP+D2T" => Some(ServiceTag::SipD2T),
            "SIP+D2S" => Some(ServiceTag::SipD2S),
            "SIPS+D2T" => Some(ServiceTag::SipsD2T),
            "SIPS+D2S" => Some(ServiceTag::SipsD2S),
            _ => None,
        }
    }

    pub fn transport(&self) -> Transport {
        match self {
            ServiceTag::SipD2U => Transport::Udp,
            ServiceTag::SipD2T => Transport::Tcp,
            ServiceTag::SipD2S => Transport::Sctp,
            ServiceTag::SipsD2T => Transport::Tls,
            ServiceTag::SipsD2S => Transport::TlsSctp,
        }
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, ServiceTag::SipsD2T | ServiceTag::SipsD2S)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceTag::SipD2U => "SIP+D2U",
            ServiceTag::SipD2T => "SIP+D2T",
            ServiceTag::SipD2S => "SIP+D2S",
            ServiceTag::SipsD2T => "SIPS+D2T",
            ServiceTag::SipsD2S => "SIPS+D2S",
        }
    }
}

impl fmt::Display for ServiceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selects the usable pointers of the most preferred order tier.
///
/// Records without the terminal `"s"` flag, with a non-empty regexp or with
/// an unrecognized service are dropped first. The result is drawn entirely
/// from the lowest `order` present and sorted by preference, remaining ties
/// broken by the record's total order.
pub fn select_pointers<'a, I>(records: I) -> Vec<PointerRecord>
where
    I: IntoIterator<Item = &'a PointerRecord>,
{
    let mut usable: Vec<PointerRecord> = records
        .into_iter()
        .filter(|r| r.is_terminal_srv() && ServiceTag::parse(&r.service).is_some())
        .cloned()
        .collect();

    let Some(min_order) = usable.iter().map(|r| r.order).min() else {
        return usable;
    };
    usable.retain(|r| r.order == min_order);
    usable.sort();
    usable
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naptr(order: u16, preference: u16, flags: &str, service: &str) -> PointerRecord {
        PointerRecord::new(
            "example.com",
            order,
            preference,
            flags,
            service,
            "_sip._udp.example.com",
        )
    }

    #[test]
    fn test_lowest_order_tier_only() {
        let records = vec![
            naptr(20, 1, "s", "SIP+D2U"),
            naptr(10, 30, "s", "SIP+D2T"),
            naptr(10, 5, "s", "SIPS+D2T"),
            naptr(30, 0, "s", "SIP+D2S"),
        ];
        let selected = select_pointers(&records);
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|r| r.order == 10));
        assert_eq!(selected[0].service, "SIPS+D2T");
        assert_eq!(selected[1].service, "SIP+D2T");
    }

    #[test]
    fn test_unusable_records_dropped_before_tiering() {
        // The order-1 records are unusable, so order 2 wins.
        let records = vec![
            naptr(1, 1, "u", "SIP+D2U"),
            naptr(1, 1, "s", "E2U+sip"),
            naptr(1, 1, "s", "SIP+D2U").with_regexp("!^.*$!sip:info@example.com!"),
            naptr(2, 7, "S", "sip+d2t"),
        ];
        let selected = select_pointers(&records);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].order, 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(select_pointers(&Vec::new()).is_empty());
    }

    #[test]
    fn test_preference_non_decreasing_and_repeatable() {
        let records = vec![
            naptr(5, 9, "s", "SIP+D2U"),
            naptr(5, 1, "s", "SIP+D2S"),
            naptr(5, 9, "s", "SIP+D2T"),
            naptr(5, 3, "s", "SIPS+D2S"),
        ];
        let first = select_pointers(&records);
        let prefs: Vec<u16> = first.iter().map(|r| r.preference).collect();
        assert_eq!(prefs, vec![1, 3, 9, 9]);
        // equal preference falls back to the service string
        assert_eq!(first[2].service, "SIP+D2T");

        let mut reversed = records.clone();
        reversed.reverse();
        assert_eq!(select_pointers(&reversed), first);
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn test_service_tag_mapping() {
        assert_eq!(ServiceTag::parse("SIP+D2U").unwrap().transport(), Transport::Udp);
        assert_eq!(ServiceTag::parse("sips+d2t").unwrap().transport(), Transport::Tls);
        assert_eq!(
            ServiceTag::parse("SIPS+D2S").unwrap().transport(),
            Transport::TlsSctp
        );
        assert!(ServiceTag::SipsD2T.is_secure());
        assert!(!ServiceTag::SipD2T.is_secure());
        assert!(ServiceTag::parse("SIP+D2W").is_none());
    }
}
