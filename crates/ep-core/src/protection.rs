//! Protective-device vocabulary shared by the catalog, the project schema and
//! the derivation engine.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::EpError;

/// Fault current assumed for an RCD requirement that leaves it unset (mA).
pub const DEFAULT_FAULT_CURRENT_MA: u32 = 30;
/// Pole count assumed for an RCD requirement that leaves it unset.
pub const DEFAULT_RCD_POLES: u8 = 2;
/// Rated current assumed for an RCD requirement that leaves it unset (A).
pub const DEFAULT_RCD_RATED_CURRENT_A: u32 = 40;

/// Class of protective device a consumer demands.
///
/// Variant order is the canonical order of merged requirements and resolved
/// devices on a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectionRole {
    Mcb,
    Rcd,
    Rcbo,
    Afdd,
    RcdTypeB,
}

impl ProtectionRole {
    pub const ALL: [ProtectionRole; 5] = [
        ProtectionRole::Mcb,
        ProtectionRole::Rcd,
        ProtectionRole::Rcbo,
        ProtectionRole::Afdd,
        ProtectionRole::RcdTypeB,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProtectionRole::Mcb => "LSS (MCB)",
            ProtectionRole::Rcd => "FI (RCD)",
            ProtectionRole::Rcbo => "FI/LS (RCBO)",
            ProtectionRole::Afdd => "AFDD",
            ProtectionRole::RcdTypeB => "RCD Typ B",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ProtectionRole::Mcb => "mcb",
            ProtectionRole::Rcd => "rcd",
            ProtectionRole::Rcbo => "rcbo",
            ProtectionRole::Afdd => "afdd",
            ProtectionRole::RcdTypeB => "rcd_type_b",
        }
    }

    /// Standalone residual-current roles, the ones that can be shared.
    pub fn is_standalone_rcd(self) -> bool {
        matches!(self, ProtectionRole::Rcd | ProtectionRole::RcdTypeB)
    }
}

impl fmt::Display for ProtectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ProtectionRole {
    type Err = EpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProtectionRole::ALL
            .into_iter()
            .find(|role| role.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EpError::Parse {
                what: "protection role",
                value: s.to_string(),
            })
    }
}

/// MCB trip characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TripCharacteristic {
    B,
    C,
    D,
}

impl fmt::Display for TripCharacteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TripCharacteristic::B => "B",
            TripCharacteristic::C => "C",
            TripCharacteristic::D => "D",
        };
        f.write_str(s)
    }
}

/// RCD sensitivity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RcdType {
    #[serde(rename = "AC")]
    Ac,
    A,
    F,
    B,
}

impl fmt::Display for RcdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RcdType::Ac => "AC",
            RcdType::A => "A",
            RcdType::F => "F",
            RcdType::B => "B",
        };
        f.write_str(s)
    }
}

/// A demand for one class of protective device.
///
/// Numeric fields (`rated_current_a`, `fault_current_ma`) merge by maximum;
/// the remaining fields must agree between consumers sharing a circuit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProtectionRequirement {
    pub role: ProtectionRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rated_current_a: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characteristic: Option<TripCharacteristic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault_current_ma: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rcd_type: Option<RcdType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poles: Option<u8>,
}

impl ProtectionRequirement {
    pub fn new(role: ProtectionRole) -> Self {
        Self {
            role,
            rated_current_a: None,
            characteristic: None,
            fault_current_ma: None,
            rcd_type: None,
            poles: None,
        }
    }

    pub fn mcb(rated_current_a: u32, characteristic: TripCharacteristic) -> Self {
        Self::new(ProtectionRole::Mcb)
            .with_rated_current(rated_current_a)
            .with_characteristic(characteristic)
    }

    pub fn rcd(fault_current_ma: u32, rcd_type: RcdType, poles: u8) -> Self {
        Self::new(ProtectionRole::Rcd)
            .with_fault_current(fault_current_ma)
            .with_rcd_type(rcd_type)
            .with_poles(poles)
    }

    pub fn with_rated_current(mut self, amps: u32) -> Self {
        self.rated_current_a = Some(amps);
        self
    }

    pub fn with_characteristic(mut self, characteristic: TripCharacteristic) -> Self {
        self.characteristic = Some(characteristic);
        self
    }

    pub fn with_fault_current(mut self, milliamps: u32) -> Self {
        self.fault_current_ma = Some(milliamps);
        self
    }

    pub fn with_rcd_type(mut self, rcd_type: RcdType) -> Self {
        self.rcd_type = Some(rcd_type);
        self
    }

    pub fn with_poles(mut self, poles: u8) -> Self {
        self.poles = Some(poles);
        self
    }

    /// Short human-readable descriptor, e.g. `B16A` or `40A 30mA A 2P`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        match (self.characteristic, self.rated_current_a) {
            (Some(c), Some(a)) => parts.push(format!("{c}{a}A")),
            (None, Some(a)) => parts.push(format!("{a}A")),
            (Some(c), None) => parts.push(c.to_string()),
            (None, None) => {}
        }
        if let Some(ma) = self.fault_current_ma {
            parts.push(format!("{ma}mA"));
        }
        if let Some(t) = self.rcd_type {
            parts.push(t.to_string());
        }
        if let Some(p) = self.poles {
            parts.push(format!("{p}P"));
        }
        if parts.is_empty() {
            self.role.label().to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// Grouping hint carried by a symbol type's protection profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupingHint {
    Socket,
    Light,
    Dedicated,
    #[default]
    Special,
}

impl GroupingHint {
    pub fn key(self) -> &'static str {
        match self {
            GroupingHint::Socket => "socket",
            GroupingHint::Light => "light",
            GroupingHint::Dedicated => "dedicated",
            GroupingHint::Special => "special",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GroupingHint::Socket => "Steckdosen",
            GroupingHint::Light => "Beleuchtung",
            GroupingHint::Dedicated => "Einzelverbraucher",
            GroupingHint::Special => "Sonderstromkreis",
        }
    }
}

/// Protection demanded by a symbol type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProtectionProfile {
    #[serde(default)]
    pub requirements: Vec<ProtectionRequirement>,
    #[serde(default)]
    pub dedicated_circuit: bool,
    #[serde(default)]
    pub grouping_hint: GroupingHint,
}

impl ProtectionProfile {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn shared(grouping_hint: GroupingHint, requirements: Vec<ProtectionRequirement>) -> Self {
        Self {
            requirements,
            dedicated_circuit: false,
            grouping_hint,
        }
    }

    pub fn dedicated(requirements: Vec<ProtectionRequirement>) -> Self {
        Self {
            requirements,
            dedicated_circuit: true,
            grouping_hint: GroupingHint::Dedicated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_key() {
        for role in ProtectionRole::ALL {
            assert_eq!(role.key().parse::<ProtectionRole>().unwrap(), role);
        }
        assert!("fuse".parse::<ProtectionRole>().is_err());
    }

    #[test]
    fn role_serializes_snake_case() {
        let json = serde_json::to_string(&ProtectionRole::RcdTypeB).unwrap();
        assert_eq!(json, "\"rcd_type_b\"");
    }

    #[test]
    fn describe_requirements() {
        assert_eq!(
            ProtectionRequirement::mcb(16, TripCharacteristic::B).describe(),
            "B16A"
        );
        assert_eq!(
            ProtectionRequirement::rcd(30, RcdType::A, 2)
                .with_rated_current(40)
                .describe(),
            "40A 30mA A 2P"
        );
        assert_eq!(
            ProtectionRequirement::new(ProtectionRole::Afdd).describe(),
            "AFDD"
        );
    }

    #[test]
    fn missing_fields_default_on_deserialize() {
        let req: ProtectionRequirement = serde_json::from_str(r#"{"role":"mcb"}"#).unwrap();
        assert_eq!(req, ProtectionRequirement::new(ProtectionRole::Mcb));
    }

    #[test]
    fn standalone_rcd_roles() {
        assert!(ProtectionRole::Rcd.is_standalone_rcd());
        assert!(ProtectionRole::RcdTypeB.is_standalone_rcd());
        assert!(!ProtectionRole::Rcbo.is_standalone_rcd());
    }
}
