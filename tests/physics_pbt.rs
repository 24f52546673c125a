#[macro_use]
mod common;

use common::{run_ticks, EngineBuilder};
use observer_data::Particle;
use observer_reality_lib::model::config::Surface;
use observer_reality_lib::model::connections::build_connections;
use observer_reality_lib::model::forces::integrate;
use observer_reality_lib::model::spatial_hash::SpatialHash;
use observer_reality_lib::model::telemetry::potential_energy;
use observer_reality_lib::model::ObserverMode;
use proptest::prelude::*;
use std::collections::HashSet;

prop_compose! {
    fn arb_particle()(
        x in 0.0f64..400.0,
        y in 0.0f64..300.0,
        vx in -3.0f64..3.0,
        vy in -3.0f64..3.0
    ) -> (f64, f64, f64, f64) {
        (x, y, vx, vy)
    }
}

fn particles_from(specs: &[(f64, f64, f64, f64)]) -> Vec<Particle> {
    specs
        .iter()
        .enumerate()
        .map(|(i, &(x, y, vx, vy))| Particle::new(i as u32, x, y).with_velocity(vx, vy))
        .collect()
}

fn arb_mode() -> impl Strategy<Value = ObserverMode> {
    prop::sample::select(ObserverMode::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_integration_clamps_extreme_velocity(
        x in 0.0f64..800.0,
        y in 0.0f64..600.0,
        vx in -1e6f64..1e6,
        vy in -1e6f64..1e6
    ) {
        let surface = Surface::default();
        let mut p = Particle::new(0, x, y).with_velocity(vx, vy);
        integrate(&mut p, surface);
        prop_assert!(surface.contains(p.x, p.y), "({}, {})", p.x, p.y);
    }

    #[test]
    fn test_engine_positions_stay_in_bounds(
        specs in prop::collection::vec(arb_particle(), 1..40),
        mode in arb_mode(),
        heat in 1.0f64..50.0
    ) {
        let mut builder = EngineBuilder::new().with_observer(mode).with_surface(400.0, 300.0);
        for &(x, y, vx, vy) in &specs {
            builder = builder.with_moving_particle(x, y, vx, vy);
        }
        let mut engine = builder.build();
        engine.pause();
        engine.add_heat(heat);
        run_ticks(&mut engine, 5);
        engine.play();
        run_ticks(&mut engine, 5);
        assert_in_bounds!(engine);
    }

    #[test]
    fn test_connections_unique_and_never_self(
        specs in prop::collection::vec(arb_particle(), 0..80),
        distance in 5.0f64..150.0
    ) {
        let ps = particles_from(&specs);
        let edges = build_connections(&ps, distance, 10_000, &mut SpatialHash::default());
        let mut seen = HashSet::new();
        for e in &edges {
            prop_assert!(e.source < e.target);
            prop_assert!(seen.insert((e.source, e.target)));
            prop_assert!(e.distance > 0.0 && e.distance < distance);
        }

        // Same pair set as the quadratic definition.
        let mut expected = HashSet::new();
        for a in &ps {
            for b in &ps {
                let d = a.distance_to(b);
                if a.id < b.id && d > 0.0 && d < distance {
                    expected.insert((a.id, b.id));
                }
            }
        }
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn test_potential_energy_is_permutation_symmetric(
        specs in prop::collection::vec(arb_particle(), 2..40),
        seed in any::<u64>()
    ) {
        let ps = particles_from(&specs);
        let mut shuffled = ps.clone();
        // Deterministic Fisher-Yates driven by the generated seed.
        let mut state = seed;
        for i in (1..shuffled.len()).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let j = (state >> 33) as usize % (i + 1);
            shuffled.swap(i, j);
        }
        let a = potential_energy(&ps, 100.0);
        let b = potential_energy(&shuffled, 100.0);
        prop_assert!((a - b).abs() <= 1e-9 * a.abs().max(1.0), "{} vs {}", a, b);
    }

    #[test]
    fn test_heat_round_trip_restores_velocities(
        specs in prop::collection::vec(arb_particle(), 1..30),
        factor in 0.1f64..5.0
    ) {
        let mut builder = EngineBuilder::new();
        for &(x, y, vx, vy) in &specs {
            builder = builder.with_moving_particle(x, y, vx, vy);
        }
        let mut engine = builder.build();
        let before: Vec<(f64, f64)> = engine.particles().iter().map(|p| (p.vx, p.vy)).collect();
        engine.add_heat(factor);
        engine.remove_heat(1.0 / factor);
        for (p, (vx, vy)) in engine.particles().iter().zip(before) {
            prop_assert!((p.vx - vx).abs() < 1e-9);
            prop_assert!((p.vy - vy).abs() < 1e-9);
        }
    }
}
