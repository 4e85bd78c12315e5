//! Problem instance types.

use serde::{Deserialize, Serialize};
use truckpack_core::{Item, VehicleSpec, Volume};

/// Summary of an instance, for reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceInfo {
    /// Instance name (file stem or generator tag).
    pub name: String,
    /// Vehicle interior dimensions as `[length, width, height]`.
    pub vehicle: [u32; 3],
    /// Number of items.
    pub item_count: usize,
    /// Items carrying a delivery rank.
    pub ranked_items: usize,
    /// Distinct delivery ranks.
    pub distinct_ranks: usize,
    /// Sum of item volumes.
    pub total_volume: Volume,
}

/// A parsed loading instance: one vehicle type and the items to load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// Instance name.
    pub name: String,
    /// Interior dimensions shared by every vehicle.
    pub vehicle: VehicleSpec,
    /// Items in input order; `items[i].id() == i`.
    pub items: Vec<Item>,
}

impl Instance {
    /// Creates an unnamed instance.
    pub fn new(vehicle: VehicleSpec, items: Vec<Item>) -> Self {
        Self {
            name: "instance".into(),
            vehicle,
            items,
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns instance information.
    pub fn info(&self) -> InstanceInfo {
        let mut ranks: Vec<u32> = self.items.iter().filter_map(Item::delivery).collect();
        let ranked_items = ranks.len();
        ranks.sort_unstable();
        ranks.dedup();

        InstanceInfo {
            name: self.name.clone(),
            vehicle: [
                self.vehicle.length(),
                self.vehicle.width(),
                self.vehicle.height(),
            ],
            item_count: self.items.len(),
            ranked_items,
            distinct_ranks: ranks.len(),
            total_volume: self.items.iter().map(Item::volume).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_counts_ranks() {
        let instance = Instance::new(
            VehicleSpec::new(40, 40, 20),
            vec![
                Item::new(0, 10, 10, 10).with_delivery(2),
                Item::new(1, 10, 10, 10).with_delivery(2),
                Item::new(2, 20, 10, 10).with_delivery(1),
                Item::new(3, 10, 10, 10),
            ],
        )
        .with_name("ranks");

        let info = instance.info();
        assert_eq!(info.name, "ranks");
        assert_eq!(info.vehicle, [40, 40, 20]);
        assert_eq!(info.item_count, 4);
        assert_eq!(info.ranked_items, 3);
        assert_eq!(info.distinct_ranks, 2);
        assert_eq!(info.total_volume, 5000);
    }
}
