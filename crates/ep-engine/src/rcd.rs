//! Shared-RCD grouping.
//!
//! Circuits with a standalone RCD (and no RCBO) on the same board share one
//! RCD when their fault current, RCD type and pole count agree. Manual pins
//! win over the automatic key; a pin naming an automatic group's id joins that
//! group. Every bucket is split into chunks of at most `max_per_group`
//! circuits in ascending circuit id order, chunk `n > 0` taking the id
//! `{base}#{n}`. Group ids in the output are unique.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use ep_catalog::DeviceLookup;
use ep_core::{
    BoardId, CircuitId, DEFAULT_FAULT_CURRENT_MA, DEFAULT_RCD_POLES, DEFAULT_RCD_RATED_CURRENT_A,
    DeviceId, GroupingHint, ProtectionRequirement, ProtectionRole, RcdGroupId, RcdType, RoomId,
};
use ep_project::{Project, RcdGroupOverride, RcdGroupingStrategy};
use serde::{Deserialize, Serialize};

use crate::circuit::DerivedCircuit;

/// A set of circuits behind one physical RCD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RcdGroup {
    pub id: RcdGroupId,
    pub board_id: BoardId,
    /// What the shared RCD must satisfy; rated current is the members' maximum.
    pub requirement: ProtectionRequirement,
    /// `None` when no catalog device satisfies the requirement.
    pub device_id: Option<DeviceId>,
    /// Ascending.
    pub circuit_ids: Vec<CircuitId>,
    pub manual: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct RcdGroupingOptions<'a> {
    pub max_per_group: usize,
    pub manual_overrides: &'a [RcdGroupOverride],
    pub strategy: RcdGroupingStrategy,
}

impl<'a> RcdGroupingOptions<'a> {
    pub fn from_project(project: &'a Project) -> Self {
        Self {
            max_per_group: project.max_per_rcd,
            manual_overrides: &project.rcd_overrides,
            strategy: project.rcd_strategy,
        }
    }
}

/// Id for a new manual group created on `board`.
pub fn new_manual_group_id(board: &BoardId) -> RcdGroupId {
    RcdGroupId::new(format!(
        "manual-{}-{}",
        board,
        chrono::Utc::now().timestamp_millis()
    ))
}

/// The RCD requirement a circuit could share, or `None` if the circuit is not
/// eligible (no standalone RCD, or an RCBO with its own).
pub fn shareable_rcd(circuit: &DerivedCircuit) -> Option<&ProtectionRequirement> {
    if circuit.has_role(ProtectionRole::Rcbo) {
        return None;
    }
    circuit
        .requirements
        .iter()
        .find(|r| r.role.is_standalone_rcd())
}

struct Candidate<'a> {
    circuit: &'a DerivedCircuit,
    rcd: &'a ProtectionRequirement,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RcdKey {
    board: BoardId,
    fault_current_ma: u32,
    rcd_type: RcdType,
    poles: u8,
    room: Option<RoomId>,
    rated_current_a: Option<u32>,
    hint: Option<GroupingHint>,
}

impl RcdKey {
    fn new(c: &Candidate<'_>, strategy: &RcdGroupingStrategy) -> Self {
        let default_type = if c.rcd.role == ProtectionRole::RcdTypeB {
            RcdType::B
        } else {
            RcdType::A
        };
        Self {
            board: c.circuit.board_id.clone(),
            fault_current_ma: c.rcd.fault_current_ma.unwrap_or(DEFAULT_FAULT_CURRENT_MA),
            rcd_type: c.rcd.rcd_type.unwrap_or(default_type),
            poles: c.rcd.poles.unwrap_or(DEFAULT_RCD_POLES),
            room: strategy
                .separate_by_room
                .then(|| c.circuit.room_id.clone()),
            rated_current_a: strategy
                .separate_by_rated_current
                .then(|| c.circuit.mcb_rated_current().unwrap_or(0)),
            hint: strategy
                .separate_by_type
                .then_some(c.circuit.grouping_hint),
        }
    }

    fn group_id(&self) -> RcdGroupId {
        let mut id = format!(
            "rcd-{}-{}ma-{}-{}p",
            self.board,
            self.fault_current_ma,
            self.rcd_type.to_string().to_ascii_lowercase(),
            self.poles
        );
        if let Some(room) = &self.room {
            id.push_str(&format!("-{room}"));
        }
        if let Some(amps) = self.rated_current_a {
            id.push_str(&format!("-{amps}a"));
        }
        if let Some(hint) = self.hint {
            id.push('-');
            id.push_str(hint.key());
        }
        RcdGroupId::new(id)
    }
}

/// Group circuits by shared RCD.
///
/// Automatic groups come first in key order (including those joined by pins,
/// which are flagged `manual`), followed by manual groups in id order.
/// Single-member buckets are still emitted as groups.
pub fn group_by_shared_rcd(
    circuits: &[DerivedCircuit],
    devices: &impl DeviceLookup,
    options: &RcdGroupingOptions<'_>,
) -> Vec<RcdGroup> {
    let max_per_group = options.max_per_group.max(1);

    // Last override per circuit wins, matching upsert semantics.
    let mut pins: HashMap<&CircuitId, &RcdGroupId> = HashMap::new();
    for ov in options.manual_overrides {
        match &ov.rcd_group_id {
            Some(group) => pins.insert(&ov.circuit_id, group),
            None => pins.remove(&ov.circuit_id),
        };
    }

    let mut pinned: BTreeMap<RcdGroupId, Vec<Candidate<'_>>> = BTreeMap::new();
    let mut pool = Vec::new();
    for circuit in circuits {
        let Some(rcd) = shareable_rcd(circuit) else {
            continue;
        };
        let candidate = Candidate { circuit, rcd };
        match pins.get(&circuit.id) {
            Some(&group) => pinned.entry(group.clone()).or_default().push(candidate),
            None => pool.push(candidate),
        }
    }

    let mut manual = Vec::with_capacity(pinned.len());
    for (group_id, mut members) in pinned {
        members.sort_by(|a, b| a.circuit.id.cmp(&b.circuit.id));
        let Some(board) = members.first().map(|c| c.circuit.board_id.clone()) else {
            continue;
        };
        let (same, other): (Vec<_>, Vec<_>) = members
            .into_iter()
            .partition(|c| c.circuit.board_id == board);
        if !other.is_empty() {
            tracing::debug!(group = %group_id, ignored = other.len(), "ignoring pins from another board");
        }
        pool.extend(other);
        manual.push((group_id, board, same));
    }

    let mut automatic: BTreeMap<RcdKey, Vec<Candidate<'_>>> = BTreeMap::new();
    for candidate in pool {
        let key = RcdKey::new(&candidate, &options.strategy);
        automatic.entry(key).or_default().push(candidate);
    }

    let auto_ids: HashMap<RcdGroupId, RcdKey> = automatic
        .keys()
        .map(|key| (key.group_id(), key.clone()))
        .collect();
    let mut joined: BTreeSet<RcdKey> = BTreeSet::new();
    let mut standalone = Vec::with_capacity(manual.len());
    for (group_id, board, members) in manual {
        match auto_ids.get(&group_id) {
            Some(key) if key.board == board => {
                if let Some(bucket) = automatic.get_mut(key) {
                    bucket.extend(members);
                    joined.insert(key.clone());
                }
            }
            _ => standalone.push((group_id, members)),
        }
    }

    let mut taken = HashSet::new();
    let mut groups = Vec::new();
    for (key, members) in automatic {
        let pinned_in = joined.contains(&key);
        let id = key.group_id();
        split_into_chunks(id, members, max_per_group, pinned_in, devices, &mut taken, &mut groups);
    }
    for (group_id, members) in standalone {
        split_into_chunks(group_id, members, max_per_group, true, devices, &mut taken, &mut groups);
    }

    tracing::debug!(groups = groups.len(), "grouped circuits by shared RCD");
    groups
}

fn split_into_chunks(
    base_id: RcdGroupId,
    mut members: Vec<Candidate<'_>>,
    max_per_group: usize,
    manual: bool,
    devices: &impl DeviceLookup,
    taken: &mut HashSet<RcdGroupId>,
    out: &mut Vec<RcdGroup>,
) {
    members.sort_by(|a, b| a.circuit.id.cmp(&b.circuit.id));
    for (idx, chunk) in members.chunks(max_per_group).enumerate() {
        let id = if idx == 0 {
            base_id.clone()
        } else {
            RcdGroupId::new(format!("{base_id}#{idx}"))
        };
        let id = claim_id(id, taken);
        if let Some(group) = build_group(id, chunk, manual, devices) {
            out.push(group);
        }
    }
}

/// `id`, or `id#{n}` with the smallest `n` not yet emitted.
fn claim_id(id: RcdGroupId, taken: &mut HashSet<RcdGroupId>) -> RcdGroupId {
    if taken.insert(id.clone()) {
        return id;
    }
    tracing::debug!(group = %id, "group id already in use");
    let mut n = 1;
    loop {
        let candidate = RcdGroupId::new(format!("{id}#{n}"));
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn build_group(
    id: RcdGroupId,
    members: &[Candidate<'_>],
    manual: bool,
    devices: &impl DeviceLookup,
) -> Option<RcdGroup> {
    let first = members.first()?;
    let rated = members
        .iter()
        .map(|c| c.rcd.rated_current_a.unwrap_or(DEFAULT_RCD_RATED_CURRENT_A))
        .max()
        .unwrap_or(DEFAULT_RCD_RATED_CURRENT_A);
    let requirement = first.rcd.clone().with_rated_current(rated);
    let device_id = devices.select_device(&requirement).map(|d| d.id.clone());
    if device_id.is_none() {
        tracing::debug!(group = %id, requirement = %requirement.describe(), "no catalog RCD for group");
    }

    Some(RcdGroup {
        id,
        board_id: first.circuit.board_id.clone(),
        requirement,
        device_id,
        circuit_ids: members.iter().map(|c| c.circuit.id.clone()).collect(),
        manual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::CircuitOrigin;
    use ep_catalog::builtin_devices;
    use ep_core::TripCharacteristic;

    fn circuit(id: &str, board: &str, reqs: Vec<ProtectionRequirement>) -> DerivedCircuit {
        DerivedCircuit {
            id: id.into(),
            name: id.to_string(),
            board_id: board.into(),
            room_id: "r1".into(),
            grouping_hint: GroupingHint::Socket,
            origin: CircuitOrigin::Automatic,
            symbol_ids: vec![],
            requirements: reqs,
            devices: vec![],
            cable_ids: vec![],
            manual_devices: false,
            conflicts: vec![],
        }
    }

    fn socket(id: &str, board: &str) -> DerivedCircuit {
        circuit(
            id,
            board,
            vec![
                ProtectionRequirement::mcb(16, TripCharacteristic::B),
                ProtectionRequirement::rcd(30, RcdType::A, 2),
            ],
        )
    }

    fn options(max: usize, overrides: &[RcdGroupOverride]) -> RcdGroupingOptions<'_> {
        RcdGroupingOptions {
            max_per_group: max,
            manual_overrides: overrides,
            strategy: RcdGroupingStrategy::default(),
        }
    }

    #[test]
    fn three_circuits_split_into_two_and_one() {
        let circuits = vec![socket("c3", "v1"), socket("c1", "v1"), socket("c2", "v1")];
        let groups = group_by_shared_rcd(&circuits, &builtin_devices(), &options(2, &[]));

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, "rcd-v1-30ma-a-2p".into());
        assert_eq!(groups[0].circuit_ids, vec![CircuitId::from("c1"), CircuitId::from("c2")]);
        assert_eq!(groups[1].id, "rcd-v1-30ma-a-2p#1".into());
        assert_eq!(groups[1].circuit_ids, vec![CircuitId::from("c3")]);
        assert_eq!(groups[0].device_id, Some("rcd-40a-30ma-a-2p".into()));
    }

    #[test]
    fn rcbo_and_rcd_less_circuits_are_not_grouped() {
        let rcbo = circuit(
            "c1",
            "v1",
            vec![
                ProtectionRequirement::new(ProtectionRole::Rcbo).with_rated_current(16),
                ProtectionRequirement::rcd(30, RcdType::A, 2),
            ],
        );
        let bare = circuit("c2", "v1", vec![ProtectionRequirement::mcb(16, TripCharacteristic::B)]);
        let groups = group_by_shared_rcd(&[rcbo, bare], &builtin_devices(), &options(6, &[]));
        assert!(groups.is_empty());
    }

    #[test]
    fn manual_pin_wins_and_comes_last() {
        let circuits = vec![socket("a", "v1"), socket("b", "v1")];
        let overrides = vec![RcdGroupOverride {
            circuit_id: "a".into(),
            rcd_group_id: Some("manual-V1-123".into()),
        }];
        let groups = group_by_shared_rcd(&circuits, &builtin_devices(), &options(6, &overrides));

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].circuit_ids, vec![CircuitId::from("b")]);
        assert!(!groups[0].manual);
        assert_eq!(groups[1].id, "manual-V1-123".into());
        assert_eq!(groups[1].circuit_ids, vec![CircuitId::from("a")]);
        assert!(groups[1].manual);
    }

    #[test]
    fn pin_to_automatic_group_joins_it() {
        let circuits = vec![socket("a", "v1"), socket("b", "v1"), socket("c", "v1")];
        let overrides = vec![RcdGroupOverride {
            circuit_id: "c".into(),
            rcd_group_id: Some("rcd-v1-30ma-a-2p".into()),
        }];
        let groups = group_by_shared_rcd(&circuits, &builtin_devices(), &options(6, &overrides));

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, "rcd-v1-30ma-a-2p".into());
        assert_eq!(groups[0].circuit_ids.len(), 3);
        assert!(groups[0].manual);
    }

    #[test]
    fn group_ids_stay_unique_when_pins_reuse_chunk_ids() {
        let circuits = vec![
            socket("a", "v1"),
            socket("b", "v1"),
            socket("c", "v1"),
            socket("d", "v2"),
        ];
        let overrides = vec![
            RcdGroupOverride {
                circuit_id: "d".into(),
                rcd_group_id: Some("rcd-v1-30ma-a-2p".into()),
            },
            RcdGroupOverride {
                circuit_id: "c".into(),
                rcd_group_id: Some("rcd-v1-30ma-a-2p#1".into()),
            },
        ];
        let groups = group_by_shared_rcd(&circuits, &builtin_devices(), &options(1, &overrides));

        let ids: HashSet<&RcdGroupId> = groups.iter().map(|g| &g.id).collect();
        assert_eq!(ids.len(), groups.len());
        let d = groups
            .iter()
            .find(|g| g.circuit_ids.contains(&CircuitId::from("d")))
            .unwrap();
        assert_eq!(d.board_id, "v2".into());
        assert!(d.manual);
    }

    #[test]
    fn chunk_ids_do_not_collide_with_room_suffixes() {
        let mut in_x_1 = socket("c3", "v1");
        in_x_1.room_id = "x-1".into();
        let mut circuits = vec![socket("c1", "v1"), socket("c2", "v1"), in_x_1];
        for c in circuits.iter_mut().take(2) {
            c.room_id = "x".into();
        }
        let mut opts = options(1, &[]);
        opts.strategy.separate_by_room = true;
        let groups = group_by_shared_rcd(&circuits, &builtin_devices(), &opts);

        let ids: Vec<&str> = groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["rcd-v1-30ma-a-2p-x", "rcd-v1-30ma-a-2p-x#1", "rcd-v1-30ma-a-2p-x-1"]
        );
    }

    #[test]
    fn null_override_returns_circuit_to_automatic() {
        let circuits = vec![socket("a", "v1"), socket("b", "v1")];
        let overrides = vec![
            RcdGroupOverride {
                circuit_id: "a".into(),
                rcd_group_id: Some("manual-v1-1".into()),
            },
            RcdGroupOverride {
                circuit_id: "a".into(),
                rcd_group_id: None,
            },
            RcdGroupOverride {
                circuit_id: "gone".into(),
                rcd_group_id: Some("manual-v1-1".into()),
            },
        ];
        let groups = group_by_shared_rcd(&circuits, &builtin_devices(), &options(6, &overrides));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].circuit_ids.len(), 2);
    }

    #[test]
    fn pins_across_boards_stay_on_their_board() {
        let circuits = vec![socket("a", "v1"), socket("b", "v2")];
        let overrides: Vec<_> = ["a", "b"]
            .iter()
            .map(|c| RcdGroupOverride {
                circuit_id: (*c).into(),
                rcd_group_id: Some("manual-v1-1".into()),
            })
            .collect();
        let groups = group_by_shared_rcd(&circuits, &builtin_devices(), &options(6, &overrides));

        assert_eq!(groups.len(), 2);
        for g in &groups {
            assert!(g.circuit_ids.iter().all(|id| {
                circuits.iter().find(|c| &c.id == id).map(|c| &c.board_id) == Some(&g.board_id)
            }));
        }
        let manual = groups.iter().find(|g| g.manual).unwrap();
        assert_eq!(manual.circuit_ids, vec![CircuitId::from("a")]);
    }

    #[test]
    fn strategy_flags_split_buckets() {
        let mut light = socket("c2", "v1");
        light.grouping_hint = GroupingHint::Light;
        light.requirements[0].rated_current_a = Some(10);
        let circuits = vec![socket("c1", "v1"), light];

        let mut opts = options(6, &[]);
        assert_eq!(group_by_shared_rcd(&circuits, &builtin_devices(), &opts).len(), 1);

        opts.strategy.separate_by_type = true;
        let groups = group_by_shared_rcd(&circuits, &builtin_devices(), &opts);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, "rcd-v1-30ma-a-2p-socket".into());

        opts.strategy = RcdGroupingStrategy {
            separate_by_rated_current: true,
            ..RcdGroupingStrategy::default()
        };
        let groups = group_by_shared_rcd(&circuits, &builtin_devices(), &opts);
        let ids: Vec<&str> = groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["rcd-v1-30ma-a-2p-10a", "rcd-v1-30ma-a-2p-16a"]);
    }

    #[test]
    fn shared_rating_is_member_maximum() {
        let mut big = socket("c2", "v1");
        big.requirements[1].rated_current_a = Some(63);
        let circuits = vec![socket("c1", "v1"), big];
        let groups = group_by_shared_rcd(&circuits, &builtin_devices(), &options(6, &[]));
        assert_eq!(groups[0].requirement.rated_current_a, Some(63));
        assert_eq!(groups[0].device_id, Some("rcd-63a-30ma-a-2p".into()));
    }

    #[test]
    fn zero_limit_is_clamped() {
        let circuits = vec![socket("c1", "v1"), socket("c2", "v1")];
        let groups = group_by_shared_rcd(&circuits, &builtin_devices(), &options(0, &[]));
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn manual_ids_carry_board_and_timestamp() {
        let id = new_manual_group_id(&"hv".into());
        let rest = id.as_str().strip_prefix("manual-hv-").unwrap();
        assert!(rest.parse::<i64>().is_ok());
    }
}
