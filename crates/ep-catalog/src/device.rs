//! Cabinet devices.

use ep_core::{DeviceId, ProtectionRequirement, ProtectionRole, RcdType, TripCharacteristic};
use serde::{Deserialize, Serialize};

/// What a cabinet device is, as far as the engine cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCategory {
    Mcb,
    Rcd,
    Rcbo,
    Afdd,
    RcdTypeB,
    MeterFuse,
    Meter,
    MainSwitch,
    SurgeProtection,
    Terminal,
}

impl DeviceCategory {
    /// The protective role this device fills, if any.
    pub fn role(self) -> Option<ProtectionRole> {
        match self {
            DeviceCategory::Mcb => Some(ProtectionRole::Mcb),
            DeviceCategory::Rcd => Some(ProtectionRole::Rcd),
            DeviceCategory::Rcbo => Some(ProtectionRole::Rcbo),
            DeviceCategory::Afdd => Some(ProtectionRole::Afdd),
            DeviceCategory::RcdTypeB => Some(ProtectionRole::RcdTypeB),
            _ => None,
        }
    }
}

/// A device that can be mounted in a distribution board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabinetDevice {
    pub id: DeviceId,
    pub label: String,
    pub category: DeviceCategory,
    /// Occupied rail width in TE.
    pub te_width: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poles: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rated_current_a: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characteristic: Option<TripCharacteristic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault_current_ma: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rcd_type: Option<RcdType>,
}

impl CabinetDevice {
    pub fn role(&self) -> Option<ProtectionRole> {
        self.category.role()
    }

    /// Whether this device can fill `req`.
    ///
    /// Non-numeric fields must match when the requirement sets them; numeric
    /// ratings must be at least the required value.
    pub fn satisfies(&self, req: &ProtectionRequirement) -> bool {
        if self.role() != Some(req.role) {
            return false;
        }
        if req.poles.is_some() && self.poles != req.poles {
            return false;
        }
        if req.characteristic.is_some() && self.characteristic != req.characteristic {
            return false;
        }
        if req.rcd_type.is_some() && self.rcd_type != req.rcd_type {
            return false;
        }
        at_least(self.rated_current_a, req.rated_current_a)
            && at_least(self.fault_current_ma, req.fault_current_ma)
    }
}

fn at_least(have: Option<u32>, need: Option<u32>) -> bool {
    match need {
        None => true,
        Some(need) => have.is_some_and(|have| have >= need),
    }
}
