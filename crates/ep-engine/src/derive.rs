//! Circuit derivation: placed symbols to circuits with resolved devices.
//!
//! Symbols are partitioned per board:
//! - a dedicated profile gets a singleton circuit `sk-{board}-{symbol}`
//! - a symbol naming a circuit group joins that group if it sits on the
//!   group's board
//! - everything else is keyed by (board, grouping hint, signature), where the
//!   signature lists the non-numeric requirement fields per role
//!
//! Ids are derived from those keys, never from input order, so editing one
//! circuit leaves the ids of all others untouched. Circuit ids are unique: a
//! group naming an id already held by a dedicated circuit dissolves into
//! automatic grouping, and an automatic id already taken gets a `#{n}` suffix.

use std::collections::{BTreeMap, HashMap, HashSet};

use ep_catalog::{DeviceLookup, SymbolCatalog, SymbolDefinition};
use ep_core::{
    BoardId, CableId, CircuitId, GroupingHint, ProtectionRequirement, ProtectionRole, RcdType,
    SymbolId, TripCharacteristic,
};
use ep_project::{Building, Cable, CircuitDevice, CircuitGroupOverride, PlacedSymbol, Project};
use sha2::{Digest, Sha256};

use crate::circuit::{CircuitOrigin, DerivedCircuit};
use crate::merge::merge_requirements;

/// Inputs of [`derive_circuits`], borrowed from a project.
#[derive(Debug, Clone, Copy)]
pub struct CircuitInputs<'a> {
    pub symbols: &'a [PlacedSymbol],
    pub building: &'a Building,
    pub circuit_group_overrides: &'a [CircuitGroupOverride],
    pub cables: &'a [Cable],
}

impl<'a> CircuitInputs<'a> {
    pub fn from_project(project: &'a Project) -> Self {
        Self {
            symbols: &project.symbols,
            building: &project.building,
            circuit_group_overrides: &project.circuit_group_overrides,
            cables: &project.cables,
        }
    }
}

struct Member<'a> {
    symbol: &'a PlacedSymbol,
    def: &'a SymbolDefinition,
    board: BoardId,
    requirements: &'a [ProtectionRequirement],
}

struct Bucket<'a> {
    origin: CircuitOrigin,
    board: BoardId,
    hint: GroupingHint,
    members: Vec<Member<'a>>,
}

type Signature = Vec<(
    ProtectionRole,
    Option<TripCharacteristic>,
    Option<RcdType>,
    Option<u8>,
)>;

fn signature(requirements: &[ProtectionRequirement]) -> Signature {
    let mut sig: Signature = requirements
        .iter()
        .map(|r| (r.role, r.characteristic, r.rcd_type, r.poles))
        .collect();
    sig.sort();
    sig.dedup();
    sig
}

/// `base`, or `base#{n}` with the smallest `n` not yet taken.
fn unused_id<V>(base: CircuitId, taken: &BTreeMap<CircuitId, V>) -> CircuitId {
    if !taken.contains_key(&base) {
        return base;
    }
    let mut n = 1;
    loop {
        let id = CircuitId::new(format!("{base}#{n}"));
        if !taken.contains_key(&id) {
            return id;
        }
        n += 1;
    }
}

fn automatic_id(board: &BoardId, hint: GroupingHint, sig: &Signature) -> CircuitId {
    let mut hasher = Sha256::new();
    let sig_json = serde_json::to_string(sig).unwrap_or_default();
    hasher.update(sig_json.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    CircuitId::new(format!("sk-{}-{}-{}", board, hint.key(), &digest[..8]))
}

/// Derive all circuits of a plan.
///
/// Total over any input: symbols of unknown type, symbols without protection
/// requirements and stale overrides are skipped. The result is sorted by
/// (board, circuit id).
pub fn derive_circuits(
    inputs: &CircuitInputs<'_>,
    symbol_catalog: &SymbolCatalog,
    devices: &impl DeviceLookup,
) -> Vec<DerivedCircuit> {
    let overrides: HashMap<&CircuitId, &CircuitGroupOverride> = inputs
        .circuit_group_overrides
        .iter()
        .map(|o| (&o.group_id, o))
        .collect();

    let mut members = Vec::with_capacity(inputs.symbols.len());
    for symbol in inputs.symbols {
        let Some(def) = symbol_catalog.find(&symbol.symbol_key) else {
            tracing::debug!(symbol = %symbol.id, key = %symbol.symbol_key, "skipping symbol of unknown type");
            continue;
        };
        let requirements = symbol
            .protection_overrides
            .as_deref()
            .unwrap_or(&def.protection.requirements);
        if requirements.is_empty() {
            continue;
        }

        let forced = symbol
            .circuit_group
            .as_ref()
            .and_then(|g| overrides.get(g))
            .and_then(|o| o.board_id.clone());
        let board = forced
            .or_else(|| symbol.board_id.clone())
            .unwrap_or_else(BoardId::unassigned);

        members.push(Member {
            symbol,
            def,
            board,
            requirements,
        });
    }
    members.sort_by(|a, b| a.symbol.id.cmp(&b.symbol.id));

    let mut buckets: BTreeMap<CircuitId, Bucket<'_>> = BTreeMap::new();
    let mut explicit: BTreeMap<CircuitId, Vec<Member<'_>>> = BTreeMap::new();
    let mut automatic = Vec::new();

    for member in members {
        let symbol = member.symbol;
        if member.def.protection.dedicated_circuit {
            let id = unused_id(
                CircuitId::new(format!("sk-{}-{}", member.board, symbol.id)),
                &buckets,
            );
            buckets.insert(
                id,
                Bucket {
                    origin: CircuitOrigin::Dedicated,
                    board: member.board.clone(),
                    hint: member.def.protection.grouping_hint,
                    members: vec![member],
                },
            );
        } else if let Some(group) = &symbol.circuit_group {
            explicit.entry(group.clone()).or_default().push(member);
        } else {
            automatic.push(member);
        }
    }

    for (group_id, group_members) in explicit {
        if buckets.contains_key(&group_id) {
            tracing::debug!(group = %group_id, moved = group_members.len(), "group id names a dedicated circuit, members fall back to automatic grouping");
            automatic.extend(group_members);
            continue;
        }
        let Some(first) = group_members.first() else {
            continue;
        };
        let board = overrides
            .get(&group_id)
            .and_then(|o| o.board_id.clone())
            .unwrap_or_else(|| first.board.clone());
        let hint = first.def.protection.grouping_hint;

        let (inside, outside): (Vec<_>, Vec<_>) =
            group_members.into_iter().partition(|m| m.board == board);
        if !outside.is_empty() {
            tracing::debug!(group = %group_id, moved = outside.len(), "group members on another board fall back to automatic grouping");
        }
        automatic.extend(outside);
        if inside.is_empty() {
            continue;
        }
        buckets.insert(
            group_id,
            Bucket {
                origin: CircuitOrigin::Explicit,
                board,
                hint,
                members: inside,
            },
        );
    }

    let mut keyed: BTreeMap<(BoardId, GroupingHint, Signature), Vec<Member<'_>>> = BTreeMap::new();
    for member in automatic {
        let key = (
            member.board.clone(),
            member.def.protection.grouping_hint,
            signature(member.requirements),
        );
        keyed.entry(key).or_default().push(member);
    }
    for ((board, hint, sig), members) in keyed {
        let id = unused_id(automatic_id(&board, hint, &sig), &buckets);
        buckets.insert(
            id,
            Bucket {
                origin: CircuitOrigin::Automatic,
                board,
                hint,
                members,
            },
        );
    }

    let mut circuits: Vec<DerivedCircuit> = buckets
        .into_iter()
        .map(|(id, bucket)| {
            let ov = overrides.get(&id).copied();
            build_circuit(id, bucket, ov, inputs, devices)
        })
        .collect();
    circuits.sort_by(|a, b| (&a.board_id, &a.id).cmp(&(&b.board_id, &b.id)));

    tracing::debug!(circuits = circuits.len(), "derived circuits");
    circuits
}

fn build_circuit(
    id: CircuitId,
    mut bucket: Bucket<'_>,
    ov: Option<&CircuitGroupOverride>,
    inputs: &CircuitInputs<'_>,
    devices: &impl DeviceLookup,
) -> DerivedCircuit {
    bucket.members.sort_by(|a, b| a.symbol.id.cmp(&b.symbol.id));

    let merged = merge_requirements(bucket.members.iter().map(|m| m.requirements));
    if !merged.conflicts.is_empty() {
        tracing::debug!(circuit = %id, conflicts = merged.conflicts.len(), "circuit members disagree on protection");
    }

    let symbol_ids: Vec<SymbolId> = bucket.members.iter().map(|m| m.symbol.id.clone()).collect();
    let room_id = bucket
        .members
        .first()
        .map(|m| m.symbol.room_id.clone())
        .unwrap_or_default();

    let (resolved, manual_devices) = match ov.and_then(|o| o.device_overrides.as_ref()) {
        Some(list) => (override_devices(&id, list, devices), true),
        None => (select_devices(&id, &merged.requirements, devices), false),
    };

    let name = ov
        .and_then(|o| o.name.clone())
        .unwrap_or_else(|| default_name(&id, &bucket, &merged.requirements, inputs.building));
    let board_id = ov.and_then(|o| o.board_id.clone()).unwrap_or(bucket.board);

    DerivedCircuit {
        cable_ids: attached_cables(inputs.cables, &symbol_ids),
        id,
        name,
        board_id,
        room_id,
        grouping_hint: bucket.hint,
        origin: bucket.origin,
        symbol_ids,
        requirements: merged.requirements,
        devices: resolved,
        manual_devices,
        conflicts: merged.conflicts,
    }
}

fn select_devices(
    id: &CircuitId,
    requirements: &[ProtectionRequirement],
    devices: &impl DeviceLookup,
) -> Vec<CircuitDevice> {
    requirements
        .iter()
        .filter_map(|req| match devices.select_device(req) {
            Some(dev) => Some(CircuitDevice {
                role: req.role,
                device_id: dev.id.clone(),
            }),
            None => {
                tracing::debug!(circuit = %id, requirement = %req.describe(), "no catalog device satisfies requirement");
                None
            }
        })
        .collect()
}

fn override_devices(
    id: &CircuitId,
    list: &[CircuitDevice],
    devices: &impl DeviceLookup,
) -> Vec<CircuitDevice> {
    list.iter()
        .filter(|d| {
            let known = devices.find_device(&d.device_id).is_some();
            if !known {
                tracing::warn!(circuit = %id, device = %d.device_id, "dropping unknown device from override");
            }
            known
        })
        .cloned()
        .collect()
}

fn attached_cables(cables: &[Cable], symbol_ids: &[SymbolId]) -> Vec<CableId> {
    let members: HashSet<&SymbolId> = symbol_ids.iter().collect();
    let mut ids: Vec<CableId> = cables
        .iter()
        .filter(|c| c.symbol_ids.iter().any(|s| members.contains(s)))
        .map(|c| c.id.clone())
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

fn default_name(
    id: &CircuitId,
    bucket: &Bucket<'_>,
    requirements: &[ProtectionRequirement],
    building: &Building,
) -> String {
    let Some(first) = bucket.members.first() else {
        return id.to_string();
    };
    let first_room = &first.symbol.room_id;

    match bucket.origin {
        CircuitOrigin::Dedicated => match building.room_name(first_room) {
            Some(room) => format!("{} – {}", first.def.label, room),
            None => first.def.label.clone(),
        },
        CircuitOrigin::Explicit => format!("Gruppe {id}"),
        CircuitOrigin::Automatic => {
            let descriptor = requirements
                .iter()
                .find(|r| r.role == ProtectionRole::Mcb)
                .or(requirements.first())
                .map(ProtectionRequirement::describe);
            let mut name = match descriptor {
                Some(d) => format!("{} {}", bucket.hint.label(), d),
                None => bucket.hint.label().to_string(),
            };
            let shared_room = bucket.members.iter().all(|m| &m.symbol.room_id == first_room);
            if shared_room && let Some(room) = building.room_name(first_room) {
                name.push_str(" – ");
                name.push_str(room);
            }
            name
        }
    }
}
