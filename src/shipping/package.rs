use serde::Serialize;

use crate::models::Dimensions;

const MIN_HEIGHT_CM: i32 = 2;
const MIN_WIDTH_CM: i32 = 11;
const MIN_LENGTH_CM: i32 = 16;
const MIN_WEIGHT_GRAMS: i32 = 100;

/// A single volume holding every item of an order.
///
/// Items are stacked: heights add up while width and length take the largest item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Package {
    pub weight_grams: i32,
    pub height_cm: i32,
    pub width_cm: i32,
    pub length_cm: i32,
}

impl Package {
    pub fn from_items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = (Dimensions, i32)>,
    {
        let mut package = Package {
            weight_grams: 0,
            height_cm: 0,
            width_cm: 0,
            length_cm: 0,
        };
        for (dims, quantity) in items {
            let quantity = quantity.max(0);
            package.weight_grams += dims.weight_grams.max(0) * quantity;
            package.height_cm += dims.height_cm.max(0) * quantity;
            package.width_cm = package.width_cm.max(dims.width_cm);
            package.length_cm = package.length_cm.max(dims.length_cm);
        }
        package.weight_grams = package.weight_grams.max(MIN_WEIGHT_GRAMS);
        package.height_cm = package.height_cm.max(MIN_HEIGHT_CM);
        package.width_cm = package.width_cm.max(MIN_WIDTH_CM);
        package.length_cm = package.length_cm.max(MIN_LENGTH_CM);
        package
    }

    /// Weight in whole kilograms, any started kilogram counts, at least one.
    pub fn billable_kg(&self) -> i64 {
        let grams = i64::from(self.weight_grams.max(0));
        ((grams + 999) / 1000).max(1)
    }

    pub fn weight_kg(&self) -> f64 {
        f64::from(self.weight_grams) / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(weight_grams: i32, height_cm: i32, width_cm: i32, length_cm: i32) -> Dimensions {
        Dimensions {
            weight_grams,
            height_cm,
            width_cm,
            length_cm,
        }
    }

    #[test]
    fn stacks_items_and_sums_weight() {
        let package = Package::from_items([(dims(300, 4, 20, 25), 2), (dims(500, 6, 30, 20), 1)]);
        assert_eq!(package.weight_grams, 1_100);
        assert_eq!(package.height_cm, 14);
        assert_eq!(package.width_cm, 30);
        assert_eq!(package.length_cm, 25);
    }

    #[test]
    fn applies_carrier_minimums() {
        let package = Package::from_items([(dims(20, 1, 5, 5), 1)]);
        assert_eq!(package.weight_grams, 100);
        assert_eq!(package.height_cm, 2);
        assert_eq!(package.width_cm, 11);
        assert_eq!(package.length_cm, 16);
    }

    #[test]
    fn billable_kg_rounds_up() {
        let light = Package::from_items([(dims(300, 4, 20, 25), 1)]);
        assert_eq!(light.billable_kg(), 1);
        let heavy = Package::from_items([(dims(1_001, 4, 20, 25), 1)]);
        assert_eq!(heavy.billable_kg(), 2);
    }
}
