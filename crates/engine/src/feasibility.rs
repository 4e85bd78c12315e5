//! Fail-fast screening of items against an empty vehicle.

use truckpack_core::{Infeasibility, Item, VehicleSpec, Volume};

/// Returns the first item that fits no orientation of an empty vehicle.
pub fn first_infeasible(items: &[Item], vehicle: &VehicleSpec) -> Option<Infeasibility> {
    items
        .iter()
        .find(|item| {
            !item
                .distinct_orientations()
                .iter()
                .any(|(_, extent)| vehicle.admits(extent))
        })
        .map(|item| Infeasibility {
            item: item.id(),
            dimensions: *item.dimensions(),
        })
}

/// Volume lower bound on the vehicle count, `max(1, ceil(total / capacity))`.
///
/// Zero for an empty item list.
pub fn volume_lower_bound(items: &[Item], vehicle: &VehicleSpec) -> usize {
    if items.is_empty() {
        return 0;
    }
    let capacity = vehicle.volume().max(1);
    let total: Volume = items.iter().map(Item::volume).sum();
    (total.div_ceil(capacity) as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_feasible() {
        let vehicle = VehicleSpec::new(40, 40, 20);
        let items = vec![Item::new(0, 40, 20, 10), Item::new(1, 10, 40, 10)];
        assert!(first_infeasible(&items, &vehicle).is_none());
    }

    #[test]
    fn test_rotation_rescues_item() {
        // Too tall as given, fits lying down.
        let vehicle = VehicleSpec::new(40, 40, 20);
        let items = vec![Item::new(0, 10, 10, 35)];
        assert!(first_infeasible(&items, &vehicle).is_none());
    }

    #[test]
    fn test_names_first_offender() {
        let vehicle = VehicleSpec::new(20, 20, 20);
        let items = vec![
            Item::new(0, 10, 10, 10),
            Item::new(1, 30, 5, 5),
            Item::new(2, 50, 50, 50),
        ];
        let infeasible = first_infeasible(&items, &vehicle).unwrap();
        assert_eq!(infeasible.item, 1);
        assert_eq!(infeasible.dimensions, *items[1].dimensions());
    }

    #[test]
    fn test_volume_lower_bound() {
        let vehicle = VehicleSpec::new(10, 10, 10);
        assert_eq!(volume_lower_bound(&[], &vehicle), 0);
        assert_eq!(volume_lower_bound(&[Item::new(0, 1, 1, 1)], &vehicle), 1);

        let items: Vec<Item> = (0..3).map(|i| Item::new(i, 10, 10, 6)).collect();
        assert_eq!(volume_lower_bound(&items, &vehicle), 2);
    }
}
