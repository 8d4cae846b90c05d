use proptest::prelude::*;

use rucie::combinatorics::count_ghf_ras;
use rucie::{AddressingError, RasAddrEngine, RasParams};

fn params(
    n_orb: usize,
    n_elec: usize,
    max_hole: usize,
    n_ras1: usize,
    max_elec: usize,
    n_ras3: usize,
) -> RasParams {
    RasParams {
        n_orb,
        n_elec,
        max_hole,
        n_ras1,
        max_elec,
        n_ras3,
    }
}

/// Every string of `n_orb` symbols with `n_elec` ones that respects the RAS limits
fn enumerate_space(p: &RasParams) -> Vec<String> {
    let n3_start = p.n_orb - p.n_ras3;
    (0u32..(1u32 << p.n_orb))
        .filter(|bits| bits.count_ones() as usize == p.n_elec)
        .map(|bits| {
            (0..p.n_orb)
                .map(|i| if bits & (1 << i) != 0 { '1' } else { '0' })
                .collect::<String>()
        })
        .filter(|s| {
            let holes = s[..p.n_ras1].bytes().filter(|&b| b == b'0').count();
            let particles = s[n3_start..].bytes().filter(|&b| b == b'1').count();
            holes <= p.max_hole && particles <= p.max_elec
        })
        .collect()
}

fn assert_bijection(p: RasParams) {
    let engine = RasAddrEngine::new(p).unwrap();
    let space = enumerate_space(&p);
    assert_eq!(engine.n_configs(), space.len() as u64, "{:?}", p);

    let mut seen = vec![false; space.len()];
    for config in &space {
        let addr = engine.addressing(config).unwrap();
        assert!(addr >= 1 && addr <= engine.n_configs());
        let slot = &mut seen[(addr - 1) as usize];
        assert!(!*slot, "{:?}: address {} assigned twice", p, addr);
        *slot = true;
        assert_eq!(&engine.de_addressing_joined(addr).unwrap(), config);
    }
    for addr in 1..=engine.n_configs() {
        let config = engine.de_addressing_joined(addr).unwrap();
        assert_eq!(engine.addressing(&config).unwrap(), addr);
    }
}

#[test]
fn test_bijection_over_small_spaces() {
    for n_orb in 1..=8 {
        for n_elec in 0..=n_orb {
            for n_ras1 in 0..=n_elec.min(n_orb) {
                for n_ras3 in 0..=(n_orb - n_ras1) {
                    for max_hole in 0..=n_ras1 {
                        for max_elec in 0..=n_ras3.min(n_elec) {
                            let p = params(n_orb, n_elec, max_hole, n_ras1, max_elec, n_ras3);
                            // spaces whose every category is empty cannot be addressed
                            if enumerate_space(&p).is_empty() {
                                continue;
                            }
                            assert_bijection(p);
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn test_count_matches_counting_utility() {
    for p in [
        params(6, 3, 1, 2, 1, 2),
        params(10, 5, 2, 3, 2, 4),
        params(12, 6, 1, 4, 2, 4),
        params(20, 10, 2, 6, 2, 8),
    ] {
        let engine = RasAddrEngine::new(p).unwrap();
        let nos = engine.subspace_sizes();
        assert_eq!(
            count_ghf_ras(p.max_hole, p.max_elec, nos, p.n_elec).unwrap(),
            engine.n_configs()
        );
        assert_eq!(engine.gas_categories().unwrap().n_configs(), engine.n_configs());
    }
}

#[test]
fn test_degenerate_cas() {
    // no electrons: one configuration, all empty
    let engine = RasAddrEngine::new(RasParams::cas(5, 0)).unwrap();
    assert_eq!(engine.n_configs(), 1);
    assert_eq!(engine.de_addressing_joined(1).unwrap(), "00000");
    assert_eq!(engine.addressing("00000"), Ok(1));

    // completely filled
    let engine = RasAddrEngine::new(RasParams::cas(4, 4)).unwrap();
    assert_eq!(engine.n_configs(), 1);
    assert_eq!(engine.de_addressing_joined(1).unwrap(), "1111");

    // a single orbital
    let engine = RasAddrEngine::new(RasParams::cas(1, 1)).unwrap();
    assert_eq!(engine.addressing("1"), Ok(1));
}

#[test]
fn test_large_space_round_trip() {
    let engine = RasAddrEngine::new(params(40, 20, 2, 10, 2, 10)).unwrap();
    let n = engine.n_configs();
    let probes = [1, 2, n / 3, n / 2, n - 1, n];
    let configs = engine.de_addressing_batch(&probes).unwrap();
    for config in &configs {
        assert_eq!(config.len(), 40);
        assert_eq!(config.bytes().filter(|&b| b == b'1').count(), 20);
    }
    assert_eq!(engine.addressing_batch(&configs).unwrap(), probes.to_vec());
}

#[test]
fn test_wide_cas_with_few_electrons() {
    // C(70, 35) does not fit in u64, but only the 2-electron array is ever needed
    let engine = RasAddrEngine::new(RasParams::cas(70, 2)).unwrap();
    assert_eq!(engine.n_configs(), 2415);
    assert!(engine.address_array(2, 70).is_some());
    assert!(engine.address_array(35, 70).is_none());

    let mut first = "11".to_string();
    first.push_str(&"0".repeat(68));
    assert_eq!(engine.addressing(&first), Ok(1));
    for addr in [1, 2, 70, 1208, 2414, 2415] {
        let config = engine.de_addressing_joined(addr).unwrap();
        assert_eq!(engine.addressing(&config), Ok(addr));
    }
}

#[test]
fn test_wide_ras2_with_few_electrons() {
    let p = params(74, 4, 1, 2, 1, 2);
    let engine = RasAddrEngine::new(p).unwrap();
    let nos = engine.subspace_sizes();
    assert_eq!(nos, [2, 70, 2]);
    assert_eq!(
        count_ghf_ras(p.max_hole, p.max_elec, nos, p.n_elec).unwrap(),
        engine.n_configs()
    );

    let n = engine.n_configs();
    let probes: Vec<u64> = vec![1, 2, n / 4, n / 2, n - 1, n];
    let configs = engine.de_addressing_batch(&probes).unwrap();
    assert_eq!(engine.addressing_batch(&configs).unwrap(), probes);
}

#[test]
fn test_overflowing_space_is_reported() {
    let err = RasAddrEngine::new(RasParams::cas(70, 35)).unwrap_err();
    assert!(matches!(err, AddressingError::Overflow { .. }));
}

fn ras_params() -> impl Strategy<Value = RasParams> {
    (2usize..=12)
        .prop_flat_map(|n_orb| (Just(n_orb), 1..=n_orb))
        .prop_flat_map(|(n_orb, n_elec)| (Just(n_orb), Just(n_elec), 0..=n_elec.min(n_orb)))
        .prop_flat_map(|(n_orb, n_elec, n_ras1)| {
            (Just(n_orb), Just(n_elec), Just(n_ras1), 0..=(n_orb - n_ras1))
        })
        .prop_flat_map(|(n_orb, n_elec, n_ras1, n_ras3)| {
            (
                Just(n_orb),
                Just(n_elec),
                Just(n_ras1),
                Just(n_ras3),
                0..=n_ras1,
                0..=n_ras3.min(n_elec),
            )
        })
        .prop_map(|(n_orb, n_elec, n_ras1, n_ras3, max_hole, max_elec)| {
            params(n_orb, n_elec, max_hole, n_ras1, max_elec, n_ras3)
        })
}

proptest! {
    #[test]
    fn prop_de_addressing_inverts_addressing(p in ras_params(), pick in any::<u64>()) {
        let engine = RasAddrEngine::new(p).unwrap();
        let nos = engine.subspace_sizes();
        prop_assert_eq!(
            count_ghf_ras(p.max_hole, p.max_elec, nos, p.n_elec).unwrap(),
            engine.n_configs()
        );
        prop_assume!(engine.n_configs() > 0);

        let addr = pick % engine.n_configs() + 1;
        let parts = engine.de_addressing(addr).unwrap();
        prop_assert_eq!(parts[0].len(), nos[0]);
        prop_assert_eq!(parts[1].len(), nos[1]);
        prop_assert_eq!(parts[2].len(), nos[2]);

        let joined = parts.concat();
        let holes = parts[0].bytes().filter(|&b| b == b'0').count();
        let particles = parts[2].bytes().filter(|&b| b == b'1').count();
        prop_assert!(holes <= p.max_hole);
        prop_assert!(particles <= p.max_elec);
        prop_assert_eq!(engine.addressing(&joined).unwrap(), addr);
    }

    #[test]
    fn prop_addresses_follow_category_layout(p in ras_params()) {
        let engine = RasAddrEngine::new(p).unwrap();
        let mut expected_offset = 0u64;
        for c in engine.valid_categories() {
            prop_assert_eq!(c.offset, Some(expected_offset));
            expected_offset += c.size;
        }
        prop_assert_eq!(expected_offset, engine.n_configs());
    }
}
