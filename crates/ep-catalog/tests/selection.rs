//! Closest-fit-above selection against the built-in catalog.

use ep_catalog::{DeviceLookup, builtin_devices};
use ep_core::{ProtectionRequirement, ProtectionRole, RcdType, TripCharacteristic};
use proptest::prelude::*;

#[test]
fn devices_for_role_lists_only_that_role() {
    let catalog = builtin_devices();
    for role in ProtectionRole::ALL {
        for dev in catalog.devices_for_role(role) {
            assert_eq!(dev.role(), Some(role));
        }
    }
    assert!(catalog.devices_for_role(ProtectionRole::Rcbo).len() >= 2);
}

#[test]
fn rcd_selection_respects_pole_count() {
    let catalog = builtin_devices();
    let req = ProtectionRequirement::rcd(30, RcdType::A, 4).with_rated_current(40);
    let dev = catalog.select_device(&req).unwrap();
    assert_eq!(dev.id.as_str(), "rcd-40a-30ma-a-4p");
    assert_eq!(dev.te_width, 4);
}

#[test]
fn unknown_device_lookup_is_none() {
    let catalog = builtin_devices();
    assert!(catalog.find_device(&"does-not-exist".into()).is_none());
}

proptest! {
    #[test]
    fn selected_mcb_is_the_smallest_sufficient(amps in 1_u32..40) {
        let catalog = builtin_devices();
        let req = ProtectionRequirement::mcb(amps, TripCharacteristic::B).with_poles(1);
        match catalog.select_device(&req) {
            Some(dev) => {
                prop_assert!(dev.satisfies(&req));
                for other in catalog.devices_for_role(ProtectionRole::Mcb) {
                    if other.satisfies(&req) {
                        prop_assert!(other.rated_current_a >= dev.rated_current_a);
                    }
                }
            }
            None => {
                prop_assert!(catalog
                    .devices_for_role(ProtectionRole::Mcb)
                    .iter()
                    .all(|dev| !dev.satisfies(&req)));
            }
        }
    }
}
