//! Seeded random instance generator with three difficulty tiers.

use crate::instance::Instance;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use truckpack_core::{Item, VehicleSpec};

/// Smallest vehicle the generator draws.
pub const MIN_VEHICLE: Dimensions = Dimensions::new(20, 20, 20);
/// Largest vehicle the generator draws.
pub const MAX_VEHICLE: Dimensions = Dimensions::new(400, 210, 220);
/// Smallest item the generator draws.
pub const MIN_ITEM: Dimensions = Dimensions::new(10, 10, 10);
/// Largest item the generator draws.
pub const MAX_ITEM: Dimensions = Dimensions::new(500, 500, 500);

/// Errors raised by the generator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("Invalid dimensions '{0}': expected LxWxH")]
    InvalidDimensions(String),

    #[error("{what} cap {requested} must lie between {min} and {max}")]
    CapOutOfRange {
        what: &'static str,
        requested: Dimensions,
        min: Dimensions,
        max: Dimensions,
    },
}

/// A length × width × height triple, written `LxWxH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub length: u32,
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Creates a triple.
    pub const fn new(length: u32, width: u32, height: u32) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    fn fits_between(&self, min: &Dimensions, max: &Dimensions) -> bool {
        (min.length..=max.length).contains(&self.length)
            && (min.width..=max.width).contains(&self.width)
            && (min.height..=max.height).contains(&self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.length, self.width, self.height)
    }
}

impl FromStr for Dimensions {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<u32> = s
            .split('x')
            .map(|p| p.trim().parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|_| GenerateError::InvalidDimensions(s.to_string()))?;

        match parts.as_slice() {
            [l, w, h] => Ok(Self::new(*l, *w, *h)),
            _ => Err(GenerateError::InvalidDimensions(s.to_string())),
        }
    }
}

/// Difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum League {
    /// Up to 10 unranked items.
    #[default]
    Bronze,
    /// Up to 100 unranked items.
    Silver,
    /// Up to 1000 items with delivery ranks.
    Gold,
}

impl League {
    /// Largest item count for this tier.
    pub fn max_items(self) -> usize {
        match self {
            League::Bronze => 10,
            League::Silver => 100,
            League::Gold => 1000,
        }
    }

    /// Largest delivery rank, or `None` when items are unranked.
    pub fn max_rank(self) -> Option<u32> {
        match self {
            League::Gold => Some(1000),
            _ => None,
        }
    }

    /// Lowercase tag.
    pub fn name(self) -> &'static str {
        match self {
            League::Bronze => "bronze",
            League::Silver => "silver",
            League::Gold => "gold",
        }
    }
}

/// Generator settings.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub league: League,
    pub seed: u64,
    pub max_vehicle: Dimensions,
    pub max_item: Dimensions,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            league: League::Bronze,
            seed: 42,
            max_vehicle: MAX_VEHICLE,
            max_item: MAX_ITEM,
        }
    }
}

impl GeneratorConfig {
    pub fn new(league: League, seed: u64) -> Self {
        Self {
            league,
            seed,
            ..Default::default()
        }
    }

    pub fn with_max_vehicle(mut self, max: Dimensions) -> Self {
        self.max_vehicle = max;
        self
    }

    pub fn with_max_item(mut self, max: Dimensions) -> Self {
        self.max_item = max;
        self
    }

    /// Caps may only shrink the default ranges.
    pub fn validate(&self) -> Result<(), GenerateError> {
        if !self.max_vehicle.fits_between(&MIN_VEHICLE, &MAX_VEHICLE) {
            return Err(GenerateError::CapOutOfRange {
                what: "vehicle",
                requested: self.max_vehicle,
                min: MIN_VEHICLE,
                max: MAX_VEHICLE,
            });
        }
        if !self.max_item.fits_between(&MIN_ITEM, &MAX_ITEM) {
            return Err(GenerateError::CapOutOfRange {
                what: "item",
                requested: self.max_item,
                min: MIN_ITEM,
                max: MAX_ITEM,
            });
        }
        Ok(())
    }
}

/// Draws one dimension in `min..=max`, rounded down to a multiple of 10.
fn draw_dimension(rng: &mut StdRng, min: u32, max: u32) -> u32 {
    (rng.gen_range(min..=max) / 10) * 10
}

fn draw_triple(rng: &mut StdRng, min: &Dimensions, max: &Dimensions) -> Dimensions {
    Dimensions::new(
        draw_dimension(rng, min.length, max.length),
        draw_dimension(rng, min.width, max.width),
        draw_dimension(rng, min.height, max.height),
    )
}

/// Generates an instance. The same config always yields the same instance.
pub fn generate(config: &GeneratorConfig) -> Result<Instance, GenerateError> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let v = draw_triple(&mut rng, &MIN_VEHICLE, &config.max_vehicle);
    let count = rng.gen_range(1..=config.league.max_items());

    let items = (0..count)
        .map(|id| {
            let d = draw_triple(&mut rng, &MIN_ITEM, &config.max_item);
            let item = Item::new(id, d.length, d.width, d.height);
            match config.league.max_rank() {
                // Zero stands in for the unranked marker.
                Some(max_rank) => match rng.gen_range(0..=max_rank) {
                    0 => item,
                    rank => item.with_delivery(rank),
                },
                None => item,
            }
        })
        .collect();

    log::debug!(
        "Generated {} instance: {} items, vehicle {}",
        config.league.name(),
        count,
        v
    );

    Ok(Instance::new(VehicleSpec::new(v.length, v.width, v.height), items)
        .with_name(format!("{}-{}", config.league.name(), config.seed)))
}
