// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Property-Based Tests (proptest) for fusion-geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for fusion-geometry using proptest.
//!
//! Covers: boundary scan accounting and |Z| filter, ρ_N monotonicity and
//! end values, surface selection, triangularity clamping.

use fusion_geometry::chease::scale_chease_profiles;
use fusion_geometry::eqdsk::extract_boundary;
use fusion_geometry::miller::{
    clamp_triangularity, miller_point, reconstruct_miller_surfaces, select_surface_indices,
};
use fusion_types::config::{BoundaryScanConfig, MillerParams};
use fusion_types::constants::EQDSK_TOKEN_PATTERN;
use fusion_types::state::{ProfileChannel, RawProfileTable};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn scan_config(z_limit: f64) -> BoundaryScanConfig {
    BoundaryScanConfig {
        data_offset: 1,
        token_pattern: EQDSK_TOKEN_PATTERN.to_string(),
        z_limit,
    }
}

fn boundary_text(pairs: &[(f64, f64)], odd: Option<f64>) -> String {
    let mut text = String::from("  header  3 129 129\n");
    for (k, (r, z)) in pairs.iter().enumerate() {
        text.push_str(&format!(" {r:.6E} {z:.6E}"));
        if k % 2 == 1 {
            text.push('\n');
        }
    }
    if let Some(v) = odd {
        text.push_str(&format!(" {v:.6E}"));
    }
    text.push('\n');
    text
}

fn table_from_rho(rho_tor: &[f64]) -> RawProfileTable {
    let n = rho_tor.len();
    let mut columns: BTreeMap<String, Vec<f64>> = ProfileChannel::ALL
        .iter()
        .map(|c| (c.name().to_string(), vec![1.0; n]))
        .collect();
    columns.insert(ProfileChannel::RhoToroidal.name().into(), rho_tor.to_vec());
    RawProfileTable::from_columns(columns).unwrap()
}

/// Strictly increasing normalized toroidal-flux radius starting at 0.
fn rho_profile() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.01f64..1.0, 1..80).prop_map(|steps| {
        let mut rho = vec![0.0];
        let mut acc = 0.0;
        for s in steps {
            acc += s;
            rho.push(acc);
        }
        let total = acc;
        rho.iter().map(|v| v / total).collect()
    })
}

// ── Boundary Scan ────────────────────────────────────────────────────

proptest! {
    /// accepted + rejected == floor(tokens / 2)
    #[test]
    fn scan_accounts_for_every_pair(
        pairs in prop::collection::vec((0.5f64..10.0, -8.0f64..8.0), 1..120),
        odd in prop::option::of(0.5f64..10.0),
        z_limit in 0.5f64..6.0,
    ) {
        let text = boundary_text(&pairs, odd);
        let out = extract_boundary(&text, &scan_config(z_limit)).unwrap();
        let expected_tokens = 2 * pairs.len() + usize::from(odd.is_some());
        prop_assert_eq!(out.token_count, expected_tokens);
        prop_assert_eq!(out.accepted.len() + out.rejected.len(), expected_tokens / 2);
    }

    /// Every accepted point satisfies |Z| <= limit; every rejected one exceeds it.
    #[test]
    fn scan_filter_respects_limit(
        pairs in prop::collection::vec((0.5f64..10.0, -8.0f64..8.0), 1..120),
        z_limit in 0.5f64..6.0,
    ) {
        let text = boundary_text(&pairs, None);
        let out = extract_boundary(&text, &scan_config(z_limit)).unwrap();
        for p in &out.accepted {
            prop_assert!(p.z.abs() <= z_limit);
        }
        for rej in &out.rejected {
            prop_assert!(rej.point.z.abs() > z_limit);
            prop_assert_eq!(rej.token_index % 2, 0);
        }
    }

    /// Accepted points keep file order.
    #[test]
    fn scan_preserves_order(n in 3usize..60) {
        let pairs: Vec<(f64, f64)> = (0..n).map(|i| (1.0 + i as f64, 0.0)).collect();
        let out = extract_boundary(&boundary_text(&pairs, None), &scan_config(3.99)).unwrap();
        prop_assert!(out.accepted.windows(2).all(|w| w[0].r < w[1].r));
    }
}

// ── Profile Normalization ────────────────────────────────────────────

proptest! {
    /// ρ_N is non-decreasing with ρ_N[0] == 0 and ρ_N[last] == 1.
    #[test]
    fn rho_norm_is_monotone_unit_interval(
        rho_tor in rho_profile(),
        r_major in 0.5f64..10.0,
        b_0 in 0.5f64..12.0,
    ) {
        let set = scale_chease_profiles(&table_from_rho(&rho_tor), r_major, b_0, true).unwrap();
        let n = set.n_rho();
        prop_assert_eq!(set.rho_norm[0], 0.0);
        prop_assert!((set.rho_norm[n - 1] - 1.0).abs() < 1e-12);
        for i in 1..n {
            prop_assert!(set.rho_norm[i] >= set.rho_norm[i - 1]);
            prop_assert!(set.phi[i] >= set.phi[i - 1]);
        }
    }

    /// Recovered ρ_N equals the input toroidal-flux radius normalized to its edge.
    #[test]
    fn rho_norm_recovers_input_radius(rho_tor in rho_profile(), r_major in 0.5f64..10.0) {
        let set = scale_chease_profiles(&table_from_rho(&rho_tor), r_major, 5.3, true).unwrap();
        for (i, &rho) in rho_tor.iter().enumerate() {
            prop_assert!((set.rho_norm[i] - rho).abs() < 1e-9);
        }
    }
}

// ── Miller Reconstruction ────────────────────────────────────────────

proptest! {
    /// The boundary index is always selected, indices are strictly increasing
    /// and the axis is never selected.
    #[test]
    fn selection_always_includes_boundary(n_rho in 2usize..300, k in 1usize..40) {
        let idx = select_surface_indices(n_rho, k).unwrap();
        prop_assert_eq!(*idx.last().unwrap(), n_rho - 1);
        prop_assert!(idx.len() <= k.max(1));
        prop_assert!(idx.iter().all(|&i| i >= 1));
        prop_assert!(idx.windows(2).all(|w| w[0] < w[1]));
    }

    /// The surface at n_rho-1 is the only one tagged as boundary.
    #[test]
    fn reconstruction_tags_last_surface(rho_tor in rho_profile(), k in 1usize..20) {
        let set = scale_chease_profiles(&table_from_rho(&rho_tor), 6.2, 5.3, true).unwrap();
        let params = MillerParams { n_surfaces: k, n_theta: 16 };
        let rec = reconstruct_miller_surfaces(&set, 2.0, &params).unwrap();
        let boundary = rec.boundary().unwrap();
        prop_assert_eq!(boundary.surface.index, set.n_rho() - 1);
        prop_assert_eq!(rec.surfaces().filter(|s| s.is_boundary()).count(), 1);
    }

    /// Clamped triangularity never leaves [-0.99, 0.99] and the mapping stays finite.
    #[test]
    fn triangularity_clamp_keeps_asin_domain(delta in -5.0f64..5.0, theta in 0.0f64..6.3) {
        let d = clamp_triangularity(delta);
        prop_assert!((-0.99..=0.99).contains(&d));
        let p = miller_point(6.2, 0.0, 2.0, 1.8, delta, theta);
        prop_assert!(p.r.is_finite() && p.z.is_finite());
    }
}
