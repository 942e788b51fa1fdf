//! Cross-module invariants checked over randomized datasets and filter states.

use std::collections::BTreeMap;

use approx::assert_relative_eq;
use mosaic_core::encode::{inflation_color, OpacityScale};
use mosaic_core::filter::{select, FilterState};
use mosaic_core::hierarchy::{build_hierarchy, HierarchyParams, Member};
use mosaic_core::partition::{weighted_tree, Partitioner, Rect, Squarified};
use mosaic_core::record::{Record, SectorShares};
use mosaic_core::{compose_scene, top_k, MosaicConfig};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const CONTINENTS: [&str; 6] = ["Africa", "Asia", "Europe", "North America", "Oceania", "South America"];

fn random_records(rng: &mut StdRng, n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            let year = rng.gen_range(2000..2004);
            let continent = CONTINENTS[rng.gen_range(0..CONTINENTS.len())];
            let gdp = match rng.gen_range(0..10) {
                0 => f64::NAN,
                1 => 0.0,
                _ => 10f64.powf(rng.gen_range(6.0..13.0)),
            };
            let mut r = Record::new(year, format!("C{i:03}"), continent, gdp);
            if rng.gen_bool(0.8) {
                r = r.with_unemployment(rng.gen_range(0.0..30.0));
            }
            if rng.gen_bool(0.8) {
                r = r.with_inflation(rng.gen_range(-20.0..40.0));
            }
            if rng.gen_bool(0.7) {
                r = r.with_sectors(SectorShares::new(
                    rng.gen_range(0.0..30.0),
                    rng.gen_range(0.0..50.0),
                    rng.gen_range(0.0..80.0),
                    rng.gen_range(0.0..60.0),
                    rng.gen_range(0.0..60.0),
                ));
            }
            r
        })
        .collect()
}

fn random_filter(rng: &mut StdRng, records: &[Record]) -> FilterState {
    let mut f = FilterState::new(rng.gen_range(2000..2004));
    if rng.gen_bool(0.3) {
        let picks: Vec<&str> = CONTINENTS.choose_multiple(rng, 2).copied().collect();
        f = f.with_continents(picks);
    }
    if rng.gen_bool(0.3) {
        let picks: Vec<String> = records
            .choose_multiple(rng, 25)
            .map(|r| r.country.clone())
            .collect();
        f = f.with_countries(picks);
    }
    f
}

#[test]
fn continent_weight_equals_filtered_gdp() {
    let mut rng = StdRng::seed_from_u64(7);
    let params = HierarchyParams::default();
    for _ in 0..40 {
        let records = random_records(&mut rng, 200);
        let filter = random_filter(&mut rng, &records);

        let mut expected: BTreeMap<&str, f64> = BTreeMap::new();
        for r in select(&records, &filter) {
            *expected.entry(r.continent_key()).or_default() += r.gdp;
        }

        let root = build_hierarchy(&records, &filter, &params);
        assert_eq!(root.continents.len(), expected.len());
        for group in &root.continents {
            assert_relative_eq!(group.weight(), expected[group.name.as_str()], max_relative = 1e-9);
        }
    }
}

#[test]
fn remainder_exists_exactly_when_truncating() {
    let mut rng = StdRng::seed_from_u64(11);
    let params = HierarchyParams::default();
    for _ in 0..40 {
        let records = random_records(&mut rng, 300);
        let filter = FilterState::new(rng.gen_range(2000..2004));
        let root = build_hierarchy(&records, &filter, &params);

        for group in &root.continents {
            let in_scope = select(&records, &filter)
                .into_iter()
                .filter(|r| r.continent_key() == group.name)
                .count();
            let remainders = group
                .members
                .iter()
                .filter(|m| matches!(m, Member::Remainder(_)))
                .count();
            assert_eq!(remainders, usize::from(in_scope > params.top_n));
            assert_eq!(group.countries().count(), in_scope.min(params.top_n));
            if let Some(rem) = group.remainder() {
                assert_eq!(rem.count, in_scope - params.top_n);
            }
        }
    }
}

#[test]
fn sector_slices_conserve_country_gdp() {
    let mut rng = StdRng::seed_from_u64(23);
    let records = random_records(&mut rng, 400);
    for year in 2000..2004 {
        let root = build_hierarchy(&records, &FilterState::new(year), &HierarchyParams::default());
        for country in root.continents.iter().flat_map(|g| g.countries()) {
            if country.is_leaf() {
                continue;
            }
            let shares: f64 = country.sectors.iter().map(|s| s.share).sum();
            assert_relative_eq!(shares, 1.0, max_relative = 1e-12);
            assert_relative_eq!(country.weight(), country.gdp, max_relative = 1e-12);
            assert!(country.sectors.iter().all(|s| s.share >= 1e-6));
        }
    }
}

#[test]
fn ranking_and_hierarchy_agree_on_scope() {
    let mut rng = StdRng::seed_from_u64(31);
    let records = random_records(&mut rng, 250);
    for _ in 0..30 {
        let filter = random_filter(&mut rng, &records);
        let root = build_hierarchy(&records, &filter, &HierarchyParams::default());
        let ranked = top_k(&records, &filter, usize::MAX);

        let tree_total = root.weight();
        let rank_total: f64 = ranked.iter().map(|s| s.gdp).sum();
        assert_relative_eq!(tree_total, rank_total, max_relative = 1e-9);
        assert!(ranked.windows(2).all(|w| w[0].gdp >= w[1].gdp));
    }
}

#[test]
fn empty_continent_filter_is_a_no_op_for_ranking() {
    let mut rng = StdRng::seed_from_u64(43);
    let records = random_records(&mut rng, 150);
    let base = FilterState::new(2001);
    let explicit_none = FilterState::new(2001).with_continents(Vec::<String>::new());
    assert_eq!(top_k(&records, &base, 10), top_k(&records, &explicit_none, 10));
}

#[test]
fn rebuilds_are_deterministic() {
    let mut rng = StdRng::seed_from_u64(59);
    let records = random_records(&mut rng, 200);
    let filter = FilterState::new(2002);
    let cfg = MosaicConfig::default();

    let a = build_hierarchy(&records, &filter, &cfg.hierarchy);
    let b = build_hierarchy(&records, &filter, &cfg.hierarchy);
    assert_eq!(a, b);

    let bounds = Rect::new(0.0, 0.0, 960.0, 600.0).to_polygon();
    let pa = Squarified::default().partition(&weighted_tree(&a), &bounds);
    let pb = Squarified::default().partition(&weighted_tree(&b), &bounds);
    assert_eq!(compose_scene(&a, &pa, &cfg), compose_scene(&b, &pb, &cfg));
}

#[test]
fn encoders_are_total() {
    let scale = OpacityScale::default();
    let mut rng = StdRng::seed_from_u64(71);
    let specials = [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 0.0, -0.0];
    let samples = specials
        .into_iter()
        .chain((0..500).map(|_| rng.gen_range(-1e4..1e4)));
    for v in samples {
        let o = scale.opacity(Some(v));
        assert!((0.0..=1.0).contains(&o), "opacity {o} for {v}");
        // channels are u8, so only the call itself can fail
        let _ = inflation_color(Some(v));
    }
}
