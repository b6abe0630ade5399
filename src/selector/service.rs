use super::SelectionMode;
use crate::resolver::ServiceRecord;
use rand::Rng;
use std::collections::BTreeMap;

/// Orders SRV records for contact (RFC 2782).
///
/// Records are grouped by priority ascending and tiers are never interleaved.
/// Inside a tier the order depends on `mode`; every input record appears
/// exactly once in the output.
pub fn select_services<'a, I, R>(records: I, mode: SelectionMode, rng: &mut R) -> Vec<ServiceRecord>
where
    I: IntoIterator<Item = &'a ServiceRecord>,
    R: Rng,
{
    match mode {
        SelectionMode::Deterministic => {
            let mut ordered: Vec<ServiceRecord> = records.into_iter().cloned().collect();
            ordered.sort();
            ordered
        }
        SelectionMode::Weighted => {
            let mut tiers: BTreeMap<u16, Vec<ServiceRecord>> = BTreeMap::new();
            for record in records {
                tiers.entry(record.priority).or_default().push(record.clone());
            }
            let mut ordered = Vec::new();
            for (_, tier) in tiers {
                ordered.extend(order_by_weight(tier, rng));
            }
            ordered
        }
    }
}

/// Weighted random ordering of a single priority tier.
///
/// Members are walked in weight-ascending order. Each round draws a value in
/// `1..=W`, `W` being the total remaining weight, and picks the first member
/// whose running weight sum reaches it; that member is removed and the round
/// repeats until the tier is empty. Zero-weight members never reach the drawn
/// value, so they only come out once all weighted members are gone, and then
/// in random order.
pub fn order_by_weight<R: Rng>(mut tier: Vec<ServiceRecord>, rng: &mut R) -> Vec<ServiceRecord> {
    tier.sort_by(|a, b| {
        a.weight
            .cmp(&b.weight)
            .then_with(|| a.target.cmp(&b.target))
            .then_with(|| a.port.cmp(&b.port))
    });

    let mut ordered = Vec::with_capacity(tier.len());
    while !tier.is_empty() {
        let total_weight: u32 = tier.iter().map(|r| r.weight as u32).sum();
        let selected_idx = if total_weight == 0 {
            rng.random_range(0..tier.len())
        } else {
            let pick = rng.random_range(1..=total_weight);
            let mut running = 0u32;
            tier.iter()
                .position(|r| {
                    running += r.weight as u32;
                    r.weight > 0 && running >= pick
                })
                .unwrap_or(tier.len() - 1)
        };
        ordered.push(tier.remove(selected_idx));
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn srv(priority: u16, weight: u16, target: &str) -> ServiceRecord {
        ServiceRecord::new("_sip._udp.example.com", priority, weight, 5060, target)
    }

    fn targets(records: &[ServiceRecord]) -> Vec<&str> {
        records.iter().map(|r| r.target.as_str()).collect()
    }

    #[test]
    fn test_deterministic_weight_then_target() {
        let records = vec![
            srv(20, 100, "z.example.com"),
            srv(10, 5, "b.example.com"),
            srv(10, 50, "c.example.com"),
            srv(10, 5, "a.example.com"),
            srv(10, 0, "d.example.com"),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let ordered = select_services(&records, SelectionMode::Deterministic, &mut rng);
        assert_eq!(
            targets(&ordered),
            vec![
                "c.example.com",
                "a.example.com",
                "b.example.com",
                "d.example.com",
                "z.example.com"
            ]
        );
        let again = select_services(&records, SelectionMode::Deterministic, &mut rng);
        assert_eq!(ordered, again);
    }

    #[test]
    fn test_weighted_keeps_priority_tiers() {
        let records = vec![
            srv(30, 1000, "late.example.com"),
            srv(10, 1, "a.example.com"),
            srv(20, 500, "mid.example.com"),
            srv(10, 0, "b.example.com"),
            srv(10, 7, "c.example.com"),
        ];
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let ordered = select_services(&records, SelectionMode::Weighted, &mut rng);
            assert_eq!(ordered.len(), records.len());
            let priorities: Vec<u16> = ordered.iter().map(|r| r.priority).collect();
            assert_eq!(priorities, vec![10, 10, 10, 20, 30]);
            // zero weight goes last in its tier
            assert_eq!(ordered[2].target, "b.example.com");
        }
    }

    #[test]
    fn test_weighted_all_zero_weights() {
        let tier = vec![srv(1, 0, "a"), srv(1, 0, "b"), srv(1, 0, "c")];
        let mut rng = StdRng::seed_from_u64(3);
        let mut ordered = order_by_weight(tier.clone(), &mut rng);
        assert_eq!(ordered.len(), 3);
        ordered.sort();
        let mut expected = tier;
        expected.sort();
        assert_eq!(ordered, expected);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let records = vec![
            srv(1, 10, "a"),
            srv(1, 20, "b"),
            srv(1, 30, "c"),
            srv(1, 40, "d"),
        ];
        let first = select_services(
            &records,
            SelectionMode::Weighted,
            &mut StdRng::seed_from_u64(99),
        );
        let second = select_services(
            &records,
            SelectionMode::Weighted,
            &mut StdRng::seed_from_u64(99),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_first_draw_follows_weight_ratio() {
        let records = vec![srv(1, 10, "light"), srv(1, 30, "medium"), srv(1, 60, "heavy")];
        let mut rng = StdRng::seed_from_u64(2782);
        let trials = 20_000;
        let mut firsts: HashMap<String, usize> = HashMap::new();
        for _ in 0..trials {
            let ordered = select_services(&records, SelectionMode::Weighted, &mut rng);
            *firsts.entry(ordered[0].target.clone()).or_default() += 1;
        }
        for (target, expected) in [("light", 0.10), ("medium", 0.30), ("heavy", 0.60)] {
            let observed = *firsts.get(target).unwrap_or(&0) as f64 / trials as f64;
            assert!(
                (observed - expected).abs() < 0.02,
                "{} selected first {:.3}, expected {:.2}",
                target,
                observed,
                expected
            );
        }
    }

    #[test]
    fn test_input_not_mutated() {
        let records = vec![srv(2, 1, "b"), srv(1, 1, "a")];
        let snapshot = records.clone();
        let mut rng = StdRng::seed_from_u64(5);
        let _ = select_services(&records, SelectionMode::Weighted, &mut rng);
        assert_eq!(records, snapshot);
    }
}
