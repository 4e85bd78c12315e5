//! Integration tests for truckpack-engine.

use std::sync::Arc;
use truckpack_core::Phase;
use truckpack_engine::{
    access, verify, Config, Item, SolveStatus, Solver, SortPolicy, Strategy, TruckPacker, Vec3,
    VehicleSelection, VehicleSpec,
};

fn solve(config: Config, items: &[Item], vehicle: &VehicleSpec) -> truckpack_engine::Solution {
    let solution = TruckPacker::new(config).solve(items, vehicle).unwrap();
    let report = verify(vehicle, items, &solution);
    assert!(report.is_valid(), "violations: {:?}", report.violations);
    solution
}

mod scenario_tests {
    use super::*;

    #[test]
    fn test_scenario_exact_fill() {
        let vehicle = VehicleSpec::new(40, 40, 20);
        let items = vec![
            Item::new(0, 40, 20, 10),
            Item::new(1, 40, 20, 10),
            Item::new(2, 10, 40, 10),
            Item::new(3, 30, 40, 10),
        ];

        let solution = solve(Config::default(), &items, &vehicle);

        assert!(solution.is_sat());
        assert_eq!(solution.vehicles_used, 1);
        assert!(solution.placements.iter().all(|p| p.vehicle == 0));
        let occupied: u128 = solution.placements.iter().map(|p| p.volume()).sum();
        assert_eq!(occupied, 32000);
        assert_eq!(occupied, vehicle.volume());

        // Largest item first, at the origin.
        assert_eq!(solution.placements[3].position, Vec3::zeros());
        assert_eq!(solution.placements[0].position, Vec3::new(0, 0, 10));
        assert_eq!(solution.placements[1].position, Vec3::new(0, 20, 10));
        assert_eq!(solution.placements[2].position, Vec3::new(30, 0, 0));
    }

    #[test]
    fn test_scenario_tall_blocks_need_separate_vehicles() {
        let vehicle = VehicleSpec::new(20, 20, 20);
        let items = vec![
            Item::new(0, 20, 20, 15),
            Item::new(1, 20, 20, 15),
            Item::new(2, 10, 10, 10),
        ];

        let solution = solve(Config::default(), &items, &vehicle);

        assert!(solution.is_sat());
        assert_ne!(solution.placements[0].vehicle, solution.placements[1].vehicle);
        // The 20x20x5 slab left above a block cannot take the cube.
        assert_eq!(solution.vehicles_used, 3);
    }

    #[test]
    fn test_scenario_delivery_order_default_policy() {
        let vehicle = VehicleSpec::new(40, 40, 20);
        let items = vec![
            Item::new(0, 10, 10, 10).with_delivery(1),
            Item::new(1, 10, 10, 10).with_delivery(2),
        ];

        let solution = solve(Config::default(), &items, &vehicle);

        // A sits at the origin, so B cannot share its vehicle.
        assert_eq!(solution.placements[0].position, Vec3::zeros());
        assert_eq!(solution.placements[0].vehicle, 0);
        assert_eq!(solution.placements[1].vehicle, 1);
    }

    #[test]
    fn test_scenario_delivery_order_lifo_policy() {
        let vehicle = VehicleSpec::new(40, 40, 20);
        let items = vec![
            Item::new(0, 10, 10, 10).with_delivery(1),
            Item::new(1, 10, 10, 10).with_delivery(2),
        ];
        let config = Config::default().with_sort_policy(SortPolicy::DeliveryThenVolume);

        let solution = solve(config, &items, &vehicle);

        assert_eq!(solution.vehicles_used, 1);
        let a = &solution.placements[0];
        let b = &solution.placements[1];
        assert_eq!(b.position, Vec3::zeros());
        assert_eq!(a.position, Vec3::new(0, 10, 0));
        assert!(access::holds(&a.aabb(), &b.aabb()));
    }

    #[test]
    fn test_scenario_unseparable_ranks_open_second_vehicle() {
        // One cube fills the vehicle, so the ranks cannot be separated.
        let vehicle = VehicleSpec::new(10, 10, 10);
        let items = vec![
            Item::new(0, 10, 10, 10).with_delivery(1),
            Item::new(1, 10, 10, 10).with_delivery(2),
        ];

        for policy in [SortPolicy::VolumeDescending, SortPolicy::DeliveryThenVolume] {
            let solution = solve(Config::default().with_sort_policy(policy), &items, &vehicle);
            assert_eq!(solution.vehicles_used, 2);
        }
    }

    #[test]
    fn test_unranked_items_share_freely() {
        let vehicle = VehicleSpec::new(40, 40, 20);
        let items = vec![
            Item::new(0, 10, 10, 10).with_delivery(1),
            Item::new(1, 10, 10, 10),
            Item::new(2, 10, 10, 10).with_delivery(1),
        ];

        let solution = solve(Config::default(), &items, &vehicle);
        assert_eq!(solution.vehicles_used, 1);
    }
}

mod fail_fast_tests {
    use super::*;

    #[test]
    fn test_oversized_item_makes_instance_unsat() {
        let vehicle = VehicleSpec::new(40, 40, 20);
        let mut items: Vec<Item> = (0..20).map(|i| Item::new(i, 10, 10, 10)).collect();
        items.push(Item::new(20, 50, 50, 50));

        let solution = TruckPacker::default_config().solve(&items, &vehicle).unwrap();

        assert_eq!(solution.status, SolveStatus::Unsat);
        assert!(solution.placements.is_empty());
        assert_eq!(solution.infeasible.as_ref().map(|i| i.item), Some(20));
        assert!(verify(&vehicle, &items, &solution).is_valid());
    }

    #[test]
    fn test_rotation_avoids_unsat() {
        let vehicle = VehicleSpec::new(40, 40, 20);
        let items = vec![Item::new(0, 20, 30, 40)];

        let solution = solve(Config::default(), &items, &vehicle);
        assert!(solution.is_sat());
        assert_eq!(solution.placements[0].far_corner().z, 20);
    }
}

mod strategy_tests {
    use super::*;

    fn workload() -> (Vec<Item>, VehicleSpec) {
        let vehicle = VehicleSpec::new(60, 40, 40);
        let items = (0..40)
            .map(|i| {
                let step = i as u32;
                let item = Item::new(i, 10 + (step % 4) * 5, 10 + (step % 3) * 5, 10 + (step % 2) * 10);
                if i % 5 == 0 {
                    item.with_delivery(1 + step % 3)
                } else {
                    item
                }
            })
            .collect();
        (items, vehicle)
    }

    #[test]
    fn test_every_strategy_is_valid() {
        let (items, vehicle) = workload();

        for strategy in [Strategy::Greedy, Strategy::LocalSearch, Strategy::MultiStart] {
            let config = Config::default()
                .with_strategy(strategy)
                .with_improvement_iterations(300)
                .with_restarts(3);
            let solution = solve(config, &items, &vehicle);

            assert_eq!(solution.placements.len(), items.len());
            assert!(solution.vehicles_used >= solution.lower_bound);
            assert_eq!(solution.strategy.as_deref(), Some(strategy.name()));
        }
    }

    #[test]
    fn test_improvement_never_adds_vehicles() {
        let (items, vehicle) = workload();

        let greedy = solve(Config::default(), &items, &vehicle);
        let local = solve(
            Config::default()
                .with_strategy(Strategy::LocalSearch)
                .with_improvement_iterations(500),
            &items,
            &vehicle,
        );
        let multi = solve(
            Config::default()
                .with_strategy(Strategy::MultiStart)
                .with_improvement_iterations(200),
            &items,
            &vehicle,
        );

        assert!(local.vehicles_used <= greedy.vehicles_used);
        // Restart 0 replays the greedy order before improving it.
        assert!(multi.vehicles_used <= greedy.vehicles_used);
    }

    #[test]
    fn test_best_fit_and_support_are_valid() {
        let (items, vehicle) = workload();
        let config = Config::default()
            .with_vehicle_selection(VehicleSelection::BestFit)
            .with_min_support(0.5);

        let solution = solve(config, &items, &vehicle);
        assert_eq!(solution.placements.len(), items.len());

        for p in solution.placements.iter().filter(|p| p.z() > 0) {
            let base = (p.extent.x * p.extent.y) as u64;
            let supported: u64 = solution
                .placements_in(p.vehicle)
                .filter(|q| q.far_corner().z == p.z())
                .map(|q| q.aabb().footprint_overlap(&p.aabb()))
                .sum();
            assert!(supported * 2 >= base, "item {} is unsupported", p.item);
        }
    }
}

mod determinism_tests {
    use super::*;

    #[test]
    fn test_repeated_runs_are_identical() {
        let vehicle = VehicleSpec::new(50, 30, 30);
        let items: Vec<Item> = (0..30)
            .map(|i| Item::new(i, 10 + (i as u32 % 3) * 10, 10, 10 + (i as u32 % 2) * 5))
            .collect();

        for strategy in [Strategy::Greedy, Strategy::LocalSearch, Strategy::MultiStart] {
            let config = Config::default()
                .with_strategy(strategy)
                .with_seed(99)
                .with_improvement_iterations(300)
                .with_restarts(3);

            let first = solve(config.clone(), &items, &vehicle);
            let second = solve(config, &items, &vehicle);
            assert_eq!(first.placements, second.placements, "{:?}", strategy);
        }
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let vehicle = VehicleSpec::new(100, 60, 60);
        let items: Vec<Item> = (0..80)
            .map(|i| Item::new(i, 10 + (i as u32 % 5) * 4, 10 + (i as u32 % 3) * 6, 12))
            .collect();

        let parallel = solve(Config::default(), &items, &vehicle);
        let sequential = solve(Config::default().with_parallel(false), &items, &vehicle);
        assert_eq!(parallel.placements, sequential.placements);
    }
}

mod deadline_tests {
    use super::*;

    #[test]
    fn test_tight_deadline_still_places_everything() {
        let vehicle = VehicleSpec::new(100, 50, 50);
        let items: Vec<Item> = (0..400)
            .map(|i| Item::new(i, 10 + (i as u32 % 4) * 5, 10 + (i as u32 % 3) * 5, 10))
            .collect();
        let config = Config::default()
            .with_strategy(Strategy::LocalSearch)
            .with_time_limit(1);

        let solution = solve(config, &items, &vehicle);
        assert!(solution.is_sat());
        assert_eq!(solution.placements.len(), items.len());
    }

    #[test]
    fn test_cancel_after_construction_returns_incomplete_plan() {
        // Greedy needs three vehicles against a lower bound of two, so the
        // improvement pass has work to abandon.
        let vehicle = VehicleSpec::new(20, 20, 20);
        let items = vec![
            Item::new(0, 20, 20, 15),
            Item::new(1, 20, 20, 15),
            Item::new(2, 10, 10, 10),
        ];
        let packer = Arc::new(TruckPacker::new(
            Config::default()
                .with_strategy(Strategy::LocalSearch)
                .with_improvement_iterations(100_000),
        ));

        let handle = packer.clone();
        let solution = packer
            .solve_with_progress(
                &items,
                &vehicle,
                Box::new(move |info| {
                    if info.phase == Phase::Constructed {
                        handle.cancel();
                    }
                }),
            )
            .unwrap();

        assert!(solution.cancelled);
        assert!(solution.heuristic_incomplete);
        assert!(solution.is_sat());
        assert_eq!(solution.placements.len(), items.len());
        assert_eq!(solution.lower_bound, 2);
        let report = verify(&vehicle, &items, &solution);
        assert!(report.is_valid(), "violations: {:?}", report.violations);
    }
}

mod large_dimension_tests {
    use super::*;

    #[test]
    fn test_huge_vehicle_volume_does_not_overflow() {
        let vehicle = VehicleSpec::new(3_000_000, 3_000_000, 3_000_000);
        let items = vec![Item::new(0, 10, 10, 10)];

        let solution = solve(Config::default(), &items, &vehicle);

        assert!(solution.is_sat());
        assert_eq!(solution.vehicles_used, 1);
        assert_eq!(solution.lower_bound, 1);
        assert_eq!(vehicle.volume(), 27_000_000_000_000_000_000);
    }

    #[test]
    fn test_many_large_items_sum_without_overflow() {
        let vehicle = VehicleSpec::new(4_000_000, 4_000_000, 4_000_000);
        let items: Vec<Item> = (0..8)
            .map(|i| Item::new(i, 2_000_000, 2_000_000, 2_000_000))
            .collect();

        let solution = solve(Config::default(), &items, &vehicle);

        assert!(solution.is_sat());
        assert_eq!(solution.vehicles_used, 1);
        assert_eq!(solution.lower_bound, 1);
        assert!((solution.utilization - 1.0).abs() < 1e-9);
    }
}
