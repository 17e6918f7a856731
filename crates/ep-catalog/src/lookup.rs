//! Device lookup and closest-fit-above selection.

use std::collections::HashMap;
use std::path::Path;

use ep_core::{DeviceId, ProtectionRequirement, ProtectionRole};
use serde::{Deserialize, Serialize};

use crate::device::CabinetDevice;
use crate::{CatalogError, CatalogResult};

/// Read access to a device catalog.
///
/// The derivation engine only ever talks to the catalog through this trait.
pub trait DeviceLookup {
    fn find_device(&self, id: &DeviceId) -> Option<&CabinetDevice>;

    /// All devices filling `role`, in catalog order.
    fn devices_for_role(&self, role: ProtectionRole) -> Vec<&CabinetDevice>;

    /// Closest fit above: among devices satisfying `req`, the one with the
    /// smallest (rated current, fault current, id).
    fn select_device(&self, req: &ProtectionRequirement) -> Option<&CabinetDevice> {
        self.devices_for_role(req.role)
            .into_iter()
            .filter(|dev| dev.satisfies(req))
            .min_by(|a, b| {
                (a.rated_current_a, a.fault_current_ma, &a.id).cmp(&(
                    b.rated_current_a,
                    b.fault_current_ma,
                    &b.id,
                ))
            })
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct CatalogFile {
    devices: Vec<CabinetDevice>,
}

/// In-memory device catalog with an id index.
#[derive(Debug, Clone, Default)]
pub struct DeviceCatalog {
    devices: Vec<CabinetDevice>,
    by_id: HashMap<DeviceId, usize>,
}

impl DeviceCatalog {
    pub fn from_devices(devices: Vec<CabinetDevice>) -> CatalogResult<Self> {
        let mut by_id = HashMap::with_capacity(devices.len());
        for (idx, dev) in devices.iter().enumerate() {
            if by_id.insert(dev.id.clone(), idx).is_some() {
                return Err(CatalogError::Duplicate {
                    what: "device",
                    id: dev.id.to_string(),
                });
            }
        }
        Ok(Self { devices, by_id })
    }

    /// Parse a catalog from YAML of the form `devices: [...]`.
    pub fn from_yaml_str(content: &str) -> CatalogResult<Self> {
        let file: CatalogFile = serde_yaml::from_str(content)?;
        let catalog = Self::from_devices(file.devices)?;
        tracing::debug!(devices = catalog.len(), "loaded device catalog");
        Ok(catalog)
    }

    pub fn load_yaml(path: &Path) -> CatalogResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn devices(&self) -> &[CabinetDevice] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl DeviceLookup for DeviceCatalog {
    fn find_device(&self, id: &DeviceId) -> Option<&CabinetDevice> {
        self.by_id.get(id).map(|&idx| &self.devices[idx])
    }

    fn devices_for_role(&self, role: ProtectionRole) -> Vec<&CabinetDevice> {
        self.devices
            .iter()
            .filter(|dev| dev.role() == Some(role))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceCategory;
    use ep_core::{RcdType, TripCharacteristic};

    fn rcd(id: &str, amps: u32, ma: u32) -> CabinetDevice {
        CabinetDevice {
            id: id.into(),
            label: format!("FI {amps}A {ma}mA"),
            category: DeviceCategory::Rcd,
            te_width: 2,
            poles: Some(2),
            rated_current_a: Some(amps),
            characteristic: None,
            fault_current_ma: Some(ma),
            rcd_type: Some(RcdType::A),
        }
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = DeviceCatalog::from_devices(vec![rcd("x", 40, 30), rcd("x", 63, 30)]);
        assert!(matches!(err, Err(CatalogError::Duplicate { .. })));
    }

    #[test]
    fn select_picks_smallest_rating_above() {
        let catalog = DeviceCatalog::from_devices(vec![
            rcd("rcd-63", 63, 30),
            rcd("rcd-25", 25, 30),
            rcd("rcd-40", 40, 30),
            rcd("rcd-40-300", 40, 300),
        ])
        .unwrap();

        let req = ProtectionRequirement::rcd(30, RcdType::A, 2).with_rated_current(32);
        assert_eq!(catalog.select_device(&req).unwrap().id.as_str(), "rcd-40");

        let req = ProtectionRequirement::rcd(100, RcdType::A, 2).with_rated_current(32);
        assert_eq!(catalog.select_device(&req).unwrap().id.as_str(), "rcd-40-300");

        let req = ProtectionRequirement::rcd(30, RcdType::A, 2).with_rated_current(80);
        assert!(catalog.select_device(&req).is_none());
    }

    #[test]
    fn select_ties_break_on_id() {
        let catalog = DeviceCatalog::from_devices(vec![rcd("rcd-b", 40, 30), rcd("rcd-a", 40, 30)])
            .unwrap();
        let req = ProtectionRequirement::new(ProtectionRole::Rcd);
        assert_eq!(catalog.select_device(&req).unwrap().id.as_str(), "rcd-a");
    }

    #[test]
    fn yaml_catalog_parses() {
        let yaml = r#"
devices:
  - id: mcb-b16
    label: LSS B16A
    category: mcb
    te_width: 1
    poles: 1
    rated_current_a: 16
    characteristic: B
"#;
        let catalog = DeviceCatalog::from_yaml_str(yaml).unwrap();
        assert_eq!(catalog.len(), 1);
        let dev = catalog.find_device(&"mcb-b16".into()).unwrap();
        assert_eq!(dev.characteristic, Some(TripCharacteristic::B));
        assert_eq!(catalog.devices_for_role(ProtectionRole::Mcb).len(), 1);
        assert!(catalog.devices_for_role(ProtectionRole::Rcd).is_empty());
    }
}
