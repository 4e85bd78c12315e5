//! Integration tests for truckpack-core.

use truckpack_core::geometry::{Item, Orientation, Vec3, VehicleSpec};
use truckpack_core::placement::{Placement, PlacementStats};
use truckpack_core::result::{Infeasibility, SolveSummary, Solution};
use truckpack_core::solver::{Config, SortPolicy, Strategy};
use truckpack_core::AABB3D;

mod orientation_tests {
    use super::*;

    #[test]
    fn test_table_matches_reference_order() {
        let reference = Vec3::new(40, 20, 10);
        let expected = [
            Vec3::new(40, 20, 10),
            Vec3::new(40, 10, 20),
            Vec3::new(20, 40, 10),
            Vec3::new(20, 10, 40),
            Vec3::new(10, 40, 20),
            Vec3::new(10, 20, 40),
        ];

        for (index, extent) in expected.iter().enumerate() {
            let orientation = Orientation::from_index(index).unwrap();
            assert_eq!(orientation.apply(&reference), *extent, "orientation {}", index);
        }
    }

    #[test]
    fn test_every_extent_maps_back() {
        let item = Item::new(0, 7, 11, 13);
        for orientation in Orientation::ALL {
            let extent = item.extent(orientation);
            assert_eq!(
                Orientation::from_effective(item.dimensions(), &extent),
                Some(orientation)
            );
        }
    }

    #[test]
    fn test_volume_is_rotation_invariant() {
        let item = Item::new(0, 7, 11, 13);
        for (_, extent) in item.distinct_orientations() {
            assert_eq!(extent.x as u128 * extent.y as u128 * extent.z as u128, item.volume());
        }
    }
}

mod aabb_tests {
    use super::*;

    #[test]
    fn test_face_contact_is_not_overlap() {
        let a = AABB3D::from_corner(Vec3::zeros(), Vec3::new(10, 20, 30));
        let right = AABB3D::from_corner(Vec3::new(10, 0, 0), Vec3::new(5, 5, 5));
        let behind = AABB3D::from_corner(Vec3::new(0, 20, 0), Vec3::new(5, 5, 5));
        let above = AABB3D::from_corner(Vec3::new(0, 0, 30), Vec3::new(5, 5, 5));

        assert!(!a.intersects(&right));
        assert!(!a.intersects(&behind));
        assert!(!a.intersects(&above));
    }

    #[test]
    fn test_containment() {
        let bounds = Vec3::new(40, 40, 20);
        assert!(AABB3D::from_corner(Vec3::new(30, 0, 10), Vec3::new(10, 40, 10)).is_within(&bounds));
        assert!(!AABB3D::from_corner(Vec3::new(31, 0, 10), Vec3::new(10, 40, 10)).is_within(&bounds));
    }
}

mod placement_tests {
    use super::*;

    #[test]
    fn test_far_corner_is_near_plus_extent() {
        let item = Item::new(5, 30, 40, 10);
        let orientation = Orientation::Whl;
        let extent = item.extent(orientation);
        let p = Placement::new(5, 2, orientation, Vec3::new(1, 2, 3), extent);

        assert_eq!(p.far_corner(), Vec3::new(1, 2, 3) + extent);
        assert_eq!(p.volume(), item.volume());
    }

    #[test]
    fn test_placement_stats_computation() {
        let extent = Vec3::new(1, 1, 1);
        let placements: Vec<Placement> = (0..6)
            .map(|i| {
                Placement::new(
                    i,
                    i % 2,
                    Orientation::ALL[i % 3],
                    Vec3::new(i as u32, 0, 0),
                    extent,
                )
            })
            .collect();

        let stats = PlacementStats::from_placements(&placements);
        assert_eq!(stats.count, 6);
        assert_eq!(stats.rotated_count, 4);
        assert_eq!(stats.vehicle_distribution.get(&0), Some(&3));
        assert_eq!(stats.orientation_distribution.len(), 3);
    }
}

mod config_tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.strategy, Strategy::Greedy);
        assert_eq!(config.sort_policy, SortPolicy::VolumeDescending);
        assert_eq!(config.time_limit_ms, 0);
        assert_eq!(config.seed, 42);
        assert!(config.min_support_ratio.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_support_rejected() {
        assert!(Config::default().with_min_support(-0.1).validate().is_err());
    }
}

mod solution_tests {
    use super::*;

    #[test]
    fn test_unsat_summary() {
        let solution = Solution::unsat(Infeasibility {
            item: 0,
            dimensions: Vec3::new(50, 50, 50),
        })
        .with_strategy("Greedy");

        let summary = SolveSummary::from(&solution);
        assert_eq!(summary.total_placed, 0);
        assert_eq!(summary.vehicles_used, 0);
        assert!(!solution.is_sat());
    }

    #[test]
    fn test_vehicle_validation() {
        assert!(VehicleSpec::new(1, 1, 1).validate().is_ok());
        assert!(VehicleSpec::new(1, 0, 1).validate().is_err());
    }
}
