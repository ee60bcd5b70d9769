use super::{Package, ShippingOption, is_local, local_delivery};

struct FlatRate {
    id: &'static str,
    name: &'static str,
    base: i64,
    per_kg: i64,
    delivery_days: i32,
}

const RATES: [FlatRate; 2] = [
    FlatRate {
        id: "fallback-pac",
        name: "PAC",
        base: 1_500,
        per_kg: 500,
        delivery_days: 8,
    },
    FlatRate {
        id: "fallback-sedex",
        name: "SEDEX",
        base: 2_500,
        per_kg: 900,
        delivery_days: 3,
    },
];

/// Quote used when the shipping provider is unavailable.
///
/// Local destinations ship for free; elsewhere each service charges a base
/// fee plus a fee per started kilogram.
pub fn quote(destination: &str, package: &Package) -> Vec<ShippingOption> {
    if is_local(destination) {
        return vec![local_delivery()];
    }

    let kg = package.billable_kg();
    RATES
        .iter()
        .map(|rate| ShippingOption {
            id: rate.id.to_string(),
            name: rate.name.to_string(),
            company: "Correios".to_string(),
            price: rate.base + rate.per_kg * kg,
            delivery_days: rate.delivery_days,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dimensions;

    fn package(weight_grams: i32) -> Package {
        Package::from_items([(
            Dimensions {
                weight_grams,
                height_cm: 4,
                width_cm: 20,
                length_cm: 25,
            },
            1,
        )])
    }

    #[test]
    fn local_postal_code_ships_for_free() {
        let options = quote("28950000", &package(2_500));
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].price, 0);
        assert_eq!(options[0].id, "local");
    }

    #[test]
    fn remote_postal_code_uses_base_plus_per_kg() {
        let options = quote("01310100", &package(2_500));
        assert_eq!(options.len(), 2);
        // 3 started kilograms
        assert_eq!(options[0].price, 1_500 + 500 * 3);
        assert_eq!(options[1].price, 2_500 + 900 * 3);
    }

    #[test]
    fn light_parcels_pay_for_one_kilogram() {
        let options = quote("01310100", &package(200));
        assert_eq!(options[0].price, 2_000);
    }
}
