// Sample catalog generation for demos and local testing


use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

use super::CatalogEntry;
use crate::{PartsError, Result};

pub const DEFAULT_SAMPLE_COUNT: usize = 50;

const PART_NUMBER_MIN: u32 = 10_000_000;
const PART_NUMBER_MAX: u32 = 99_999_999;

/// Number of distinct eight digit part numbers available to one batch
pub const MAX_SAMPLE_COUNT: usize = (PART_NUMBER_MAX - PART_NUMBER_MIN + 1) as usize;

const REFRIGERATOR_PARTS: &[(&str, &str)] = &[
    (
        "Refrigerator Water Filter",
        "High-quality refrigerator water filter that removes contaminants and improves taste. Compatible with most major refrigerator brands.",
    ),
    (
        "Refrigerator Door Gasket",
        "Durable refrigerator door gasket seal that prevents cold air loss and maintains proper temperature. Easy to install.",
    ),
    (
        "Refrigerator Thermostat",
        "Precision refrigerator thermostat that controls temperature accurately. Replacement part for various refrigerator models.",
    ),
    (
        "Refrigerator Evaporator Fan Motor",
        "Quiet and efficient evaporator fan motor for the refrigerator cooling system. OEM replacement part.",
    ),
    (
        "Refrigerator Defrost Timer",
        "Automatic defrost timer that cycles defrost mode. Compatible with multiple refrigerator brands.",
    ),
    (
        "Refrigerator Ice Maker Assembly",
        "Complete ice maker assembly with all necessary components. Easy installation with included instructions.",
    ),
    (
        "Refrigerator Door Shelf",
        "Spacious refrigerator door shelf for organizing food items. Adjustable and easy to clean.",
    ),
    (
        "Refrigerator Crisper Drawer",
        "Large capacity crisper drawer for storing fruits and vegetables. Helps maintain freshness.",
    ),
    (
        "Refrigerator Compressor Relay",
        "Reliable compressor relay that starts and protects the refrigerator compressor. OEM quality replacement.",
    ),
    (
        "Refrigerator Temperature Sensor",
        "Accurate temperature sensor that monitors refrigerator temperature. Essential for proper cooling.",
    ),
    (
        "Refrigerator Drain Pan",
        "Heavy-duty drain pan that collects condensation. Prevents water damage to the floor.",
    ),
    (
        "Refrigerator Door Hinge",
        "Durable door hinge that ensures smooth door operation. Reinforced design for long-lasting use.",
    ),
    (
        "Refrigerator Water Inlet Valve",
        "Reliable water inlet valve for ice maker and water dispenser. Prevents leaks and ensures proper water flow.",
    ),
    (
        "Refrigerator Control Board",
        "Advanced control board that manages refrigerator functions. OEM replacement with full compatibility.",
    ),
    (
        "Refrigerator Door Bin",
        "Door bin for storing condiments and beverages. Easy to remove for cleaning.",
    ),
];

const DISHWASHER_PARTS: &[(&str, &str)] = &[
    (
        "Dishwasher Upper Rack",
        "Adjustable upper rack for dishwasher. Provides flexible loading options for dishes and utensils.",
    ),
    (
        "Dishwasher Lower Spray Arm",
        "Efficient lower spray arm that distributes water evenly. Ensures thorough cleaning of dishes.",
    ),
    (
        "Dishwasher Door Latch",
        "Secure door latch that keeps the dishwasher door closed during the cycle. Prevents leaks.",
    ),
    (
        "Dishwasher Door Gasket",
        "Watertight door gasket that prevents leaks. Essential for proper dishwasher operation.",
    ),
    (
        "Dishwasher Heating Element",
        "Heating element that dries dishes effectively. Energy-efficient design reduces operating costs.",
    ),
    (
        "Dishwasher Water Inlet Valve",
        "Reliable water inlet valve that controls water flow. Prevents leaks and ensures proper filling.",
    ),
    (
        "Dishwasher Circulation Pump",
        "Quiet circulation pump that moves water throughout the dishwasher. OEM quality replacement.",
    ),
    (
        "Dishwasher Filter",
        "High-quality filter that traps food particles. Easy to clean and maintain.",
    ),
    (
        "Dishwasher Detergent Dispenser",
        "Automatic detergent dispenser that releases detergent at the right time. Reliable operation.",
    ),
    (
        "Dishwasher Rack Roller",
        "Smooth rack roller that allows easy rack movement. Durable construction for long-lasting use.",
    ),
    (
        "Dishwasher Drain Pump",
        "Efficient drain pump that removes water after the cycle. Prevents standing water and odors.",
    ),
    (
        "Dishwasher Rinse Aid Dispenser",
        "Automatic rinse aid dispenser that improves drying. Reduces water spots on dishes.",
    ),
    (
        "Dishwasher Float Switch",
        "Float switch that monitors water level. Prevents overfilling and protects the dishwasher.",
    ),
    (
        "Dishwasher Door Hinge",
        "Durable door hinge that ensures smooth door operation. Reinforced design.",
    ),
    (
        "Dishwasher Spray Nozzle",
        "Precision spray nozzle that directs water flow. Ensures thorough cleaning coverage.",
    ),
];

/// Generate `count` shuffled entries, half refrigerator and half dishwasher
/// (the odd one out is a dishwasher part). Part numbers are `PS` followed by
/// eight digits and unique within the batch, so `count` may not exceed
/// [`MAX_SAMPLE_COUNT`].
#[inline]
pub fn generate_sample_catalog<R: Rng + ?Sized>(
    count: usize,
    rng: &mut R,
) -> Result<Vec<CatalogEntry>> {
    if count > MAX_SAMPLE_COUNT {
        return Err(PartsError::Catalog(format!(
            "Cannot generate {} parts: only {} unique part numbers exist",
            count, MAX_SAMPLE_COUNT
        )));
    }

    let refrigerator_count = count / 2;
    let mut used = HashSet::with_capacity(count);
    let mut entries = Vec::with_capacity(count);

    for index in 0..count {
        let (category, parts) = if index < refrigerator_count {
            ("refrigerator", REFRIGERATOR_PARTS)
        } else {
            ("dishwasher", DISHWASHER_PARTS)
        };

        let Some(&(title, description)) = parts.choose(rng) else {
            continue;
        };

        let part_number = loop {
            let candidate = format!("PS{}", rng.gen_range(PART_NUMBER_MIN..=PART_NUMBER_MAX));
            if used.insert(candidate.clone()) {
                break candidate;
            }
        };

        entries.push(CatalogEntry {
            category: category.to_string(),
            part_number,
            title: title.to_string(),
            description: description.to_string(),
            url: String::new(),
        });
    }

    entries.shuffle(rng);
    Ok(entries)
}
