//! Built-in catalog used by the demo project, the CLI default and tests.

use ep_core::{
    GroupingHint, ProtectionProfile, ProtectionRequirement, ProtectionRole, RcdType,
    TripCharacteristic,
};

use crate::device::{CabinetDevice, DeviceCategory};
use crate::lookup::DeviceCatalog;
use crate::symbols::{
    ArticleKind, ArticleLine, Attributes, KnxProperties, SymbolCatalog, SymbolCategory,
    SymbolDefinition,
};

struct Rating {
    poles: u8,
    amps: Option<u32>,
    characteristic: Option<TripCharacteristic>,
    fault_ma: Option<u32>,
    rcd_type: Option<RcdType>,
}

fn device(id: &str, label: &str, category: DeviceCategory, te_width: u8, r: Rating) -> CabinetDevice {
    CabinetDevice {
        id: id.into(),
        label: label.to_string(),
        category,
        te_width,
        poles: Some(r.poles),
        rated_current_a: r.amps,
        characteristic: r.characteristic,
        fault_current_ma: r.fault_ma,
        rcd_type: r.rcd_type,
    }
}

fn mcb(id: &str, c: TripCharacteristic, amps: u32, poles: u8) -> CabinetDevice {
    let label = if poles == 1 {
        format!("LSS {c}{amps}A")
    } else {
        format!("LSS {c}{amps}A {poles}p")
    };
    device(
        id,
        &label,
        DeviceCategory::Mcb,
        poles,
        Rating {
            poles,
            amps: Some(amps),
            characteristic: Some(c),
            fault_ma: None,
            rcd_type: None,
        },
    )
}

fn rcd(id: &str, category: DeviceCategory, amps: u32, ma: u32, t: RcdType, poles: u8) -> CabinetDevice {
    device(
        id,
        &format!("FI {amps}A {ma}mA Typ {t} {poles}p"),
        category,
        poles,
        Rating {
            poles,
            amps: Some(amps),
            characteristic: None,
            fault_ma: Some(ma),
            rcd_type: Some(t),
        },
    )
}

fn supply(id: &str, label: &str, category: DeviceCategory, te_width: u8, amps: Option<u32>) -> CabinetDevice {
    device(
        id,
        label,
        category,
        te_width,
        Rating {
            poles: 3,
            amps,
            characteristic: None,
            fault_ma: None,
            rcd_type: None,
        },
    )
}

/// Devices of a typical residential cabinet.
pub fn builtin_devices() -> DeviceCatalog {
    use DeviceCategory as D;
    use TripCharacteristic::{B, C};

    let devices = vec![
        mcb("mcb-b10-1p", B, 10, 1),
        mcb("mcb-b13-1p", B, 13, 1),
        mcb("mcb-b16-1p", B, 16, 1),
        mcb("mcb-b20-1p", B, 20, 1),
        mcb("mcb-c16-1p", C, 16, 1),
        mcb("mcb-b16-3p", B, 16, 3),
        mcb("mcb-c32-3p", C, 32, 3),
        rcd("rcd-25a-30ma-a-2p", D::Rcd, 25, 30, RcdType::A, 2),
        rcd("rcd-40a-30ma-a-2p", D::Rcd, 40, 30, RcdType::A, 2),
        rcd("rcd-63a-30ma-a-2p", D::Rcd, 63, 30, RcdType::A, 2),
        rcd("rcd-40a-30ma-a-4p", D::Rcd, 40, 30, RcdType::A, 4),
        rcd("rcd-63a-30ma-a-4p", D::Rcd, 63, 30, RcdType::A, 4),
        rcd("rcd-40a-300ma-a-4p", D::Rcd, 40, 300, RcdType::A, 4),
        rcd("rcdb-40a-30ma-4p", D::RcdTypeB, 40, 30, RcdType::B, 4),
        rcd("rcdb-63a-30ma-4p", D::RcdTypeB, 63, 30, RcdType::B, 4),
        device(
            "rcbo-b16-30ma-2p",
            "FI/LS B16A 30mA",
            D::Rcbo,
            2,
            Rating {
                poles: 2,
                amps: Some(16),
                characteristic: Some(B),
                fault_ma: Some(30),
                rcd_type: Some(RcdType::A),
            },
        ),
        device(
            "rcbo-b20-30ma-2p",
            "FI/LS B20A 30mA",
            D::Rcbo,
            2,
            Rating {
                poles: 2,
                amps: Some(20),
                characteristic: Some(B),
                fault_ma: Some(30),
                rcd_type: Some(RcdType::A),
            },
        ),
        device(
            "afdd-16a-2p",
            "AFDD 16A",
            D::Afdd,
            2,
            Rating {
                poles: 2,
                amps: Some(16),
                characteristic: None,
                fault_ma: None,
                rcd_type: None,
            },
        ),
        supply("sls-35a", "SLS E35A", D::MeterFuse, 3, Some(35)),
        supply("sls-50a", "SLS E50A", D::MeterFuse, 3, Some(50)),
        supply("sls-63a", "SLS E63A", D::MeterFuse, 3, Some(63)),
        supply("meter-ehz", "eHZ Zählerplatz", D::Meter, 4, None),
        supply("main-switch-63a", "Hauptschalter 63A 3p", D::MainSwitch, 3, Some(63)),
        supply("main-switch-100a", "Hauptschalter 100A 3p", D::MainSwitch, 3, Some(100)),
        supply("spd-t1t2", "SPD Typ 1+2", D::SurgeProtection, 4, None),
        supply("spd-t2", "SPD Typ 2", D::SurgeProtection, 4, None),
    ];

    DeviceCatalog::from_devices(devices).expect("built-in device ids are unique")
}

fn article(description: &str, kind: ArticleKind, quantity: f64, unit: &str, unit_price: f64) -> ArticleLine {
    ArticleLine {
        id: format!("tpl-{}", description.to_ascii_lowercase().replace(' ', "-")).into(),
        description: description.to_string(),
        kind,
        quantity,
        unit: unit.to_string(),
        unit_price,
    }
}

fn symbol(
    key: &str,
    label: &str,
    category: SymbolCategory,
    mount_height_cm: u32,
    cable_type: &str,
    protection: ProtectionProfile,
    default_articles: Vec<ArticleLine>,
) -> SymbolDefinition {
    SymbolDefinition {
        key: key.into(),
        label: label.to_string(),
        category,
        default_attributes: Attributes {
            color: "Reinweiß".to_string(),
            mount_height_cm,
            cable_type: cable_type.to_string(),
            board_label: None,
        },
        default_knx: KnxProperties::default(),
        default_articles,
        is_distributor: category == SymbolCategory::Distributor,
        protection,
    }
}

fn rcd_a(poles: u8) -> ProtectionRequirement {
    ProtectionRequirement::rcd(30, RcdType::A, poles).with_rated_current(40)
}

/// Symbol types of a typical residential installation.
pub fn builtin_symbols() -> SymbolCatalog {
    use ArticleKind::{Material, Service};
    use SymbolCategory as S;
    use TripCharacteristic::{B, C};

    let socket_profile = ProtectionProfile::shared(
        GroupingHint::Socket,
        vec![ProtectionRequirement::mcb(16, B).with_poles(1), rcd_a(2)],
    );
    let light_profile = ProtectionProfile::shared(
        GroupingHint::Light,
        vec![ProtectionRequirement::mcb(10, B).with_poles(1), rcd_a(2)],
    );
    let appliance_profile = ProtectionProfile::dedicated(vec![
        ProtectionRequirement::mcb(16, B).with_poles(1),
        rcd_a(2),
    ]);

    let definitions = vec![
        symbol(
            "grounded_socket",
            "Schutzkontaktsteckdose",
            S::Socket,
            30,
            "NYM-J 3x1,5",
            socket_profile.clone(),
            vec![
                article("Steckdose SCHUKO", Material, 1.0, "Stk", 6.90),
                article("Installation Steckdose", Service, 0.25, "h", 58.0),
            ],
        ),
        symbol(
            "double_socket",
            "Doppelsteckdose",
            S::Socket,
            30,
            "NYM-J 3x1,5",
            socket_profile,
            vec![
                article("Steckdose SCHUKO", Material, 2.0, "Stk", 6.90),
                article("Rahmen 2-fach", Material, 1.0, "Stk", 3.40),
                article("Installation Steckdose", Service, 0.4, "h", 58.0),
            ],
        ),
        symbol(
            "outdoor_socket",
            "Außensteckdose",
            S::Socket,
            30,
            "NYM-J 3x2,5",
            ProtectionProfile::shared(
                GroupingHint::Special,
                vec![ProtectionRequirement::new(ProtectionRole::Rcbo)
                    .with_rated_current(16)
                    .with_characteristic(B)
                    .with_fault_current(30)
                    .with_poles(2)],
            ),
            vec![article("Steckdose IP44", Material, 1.0, "Stk", 14.50)],
        ),
        symbol(
            "ceiling_light",
            "Deckenleuchte",
            S::Light,
            250,
            "NYM-J 3x1,5",
            light_profile.clone(),
            vec![
                article("Deckenauslass", Material, 1.0, "Stk", 2.10),
                article("Installation Leuchte", Service, 0.3, "h", 58.0),
            ],
        ),
        symbol(
            "wall_light",
            "Wandleuchte",
            S::Light,
            180,
            "NYM-J 3x1,5",
            light_profile,
            vec![article("Wandauslass", Material, 1.0, "Stk", 2.10)],
        ),
        symbol(
            "switch",
            "Ausschalter",
            S::Switch,
            105,
            "NYM-J 3x1,5",
            ProtectionProfile::none(),
            vec![article("Schalter Wippe", Material, 1.0, "Stk", 5.20)],
        ),
        symbol(
            "motion_sensor",
            "Bewegungsmelder",
            S::Sensor,
            250,
            "NYM-J 3x1,5",
            ProtectionProfile::none(),
            vec![article("Bewegungsmelder 180°", Material, 1.0, "Stk", 39.0)],
        ),
        symbol(
            "smoke_detector",
            "Rauchwarnmelder",
            S::Safety,
            250,
            "",
            ProtectionProfile::none(),
            vec![article("Rauchwarnmelder", Material, 1.0, "Stk", 24.0)],
        ),
        symbol(
            "network_socket",
            "Netzwerkdose",
            S::Network,
            30,
            "Cat.7",
            ProtectionProfile::none(),
            vec![article("Datendose 2xRJ45", Material, 1.0, "Stk", 18.0)],
        ),
        symbol(
            "stove",
            "Herd",
            S::Homedevice,
            30,
            "NYM-J 5x2,5",
            ProtectionProfile::dedicated(vec![
                ProtectionRequirement::mcb(16, B).with_poles(3),
                rcd_a(4),
            ]),
            vec![
                article("Herdanschlussdose", Material, 1.0, "Stk", 8.50),
                article("Anschluss Herd", Service, 0.5, "h", 58.0),
            ],
        ),
        symbol(
            "dishwasher",
            "Geschirrspüler",
            S::Homedevice,
            30,
            "NYM-J 3x2,5",
            appliance_profile.clone(),
            vec![article("Geräteanschlussdose", Material, 1.0, "Stk", 4.80)],
        ),
        symbol(
            "washing_machine",
            "Waschmaschine",
            S::Homedevice,
            30,
            "NYM-J 3x2,5",
            appliance_profile,
            vec![article("Steckdose SCHUKO", Material, 1.0, "Stk", 6.90)],
        ),
        symbol(
            "wallbox",
            "Wallbox",
            S::Homedevice,
            120,
            "NYM-J 5x6",
            ProtectionProfile::dedicated(vec![
                ProtectionRequirement::mcb(32, C).with_poles(3),
                ProtectionRequirement::new(ProtectionRole::RcdTypeB)
                    .with_rated_current(40)
                    .with_fault_current(30)
                    .with_rcd_type(RcdType::B)
                    .with_poles(4),
            ]),
            vec![
                article("Wallbox 11kW", Material, 1.0, "Stk", 690.0),
                article("Montage Wallbox", Service, 2.0, "h", 58.0),
            ],
        ),
        symbol(
            "bedroom_outlet_afdd",
            "Steckdose Schlafraum (AFDD)",
            S::Socket,
            30,
            "NYM-J 3x1,5",
            ProtectionProfile::shared(
                GroupingHint::Socket,
                vec![
                    ProtectionRequirement::mcb(16, B).with_poles(1),
                    rcd_a(2),
                    ProtectionRequirement::new(ProtectionRole::Afdd).with_rated_current(16),
                ],
            ),
            vec![article("Steckdose SCHUKO", Material, 1.0, "Stk", 6.90)],
        ),
        symbol(
            "distribution_board",
            "Unterverteilung",
            S::Distributor,
            140,
            "NYM-J 5x10",
            ProtectionProfile::none(),
            vec![article("Kleinverteiler 3-reihig", Material, 1.0, "Stk", 85.0)],
        ),
        symbol(
            "equipotential_bonding",
            "Potentialausgleich",
            S::Grounding,
            30,
            "H07V-K 1x16",
            ProtectionProfile::none(),
            vec![article("PA-Schiene", Material, 1.0, "Stk", 12.0)],
        ),
        symbol(
            "door_intercom",
            "Türsprechstelle",
            S::Intercom,
            150,
            "J-Y(St)Y 2x2x0,8",
            ProtectionProfile::none(),
            vec![],
        ),
    ];

    SymbolCatalog::from_definitions(definitions).expect("built-in symbol keys are unique")
}
