//! Per-role merging of member requirements.

use std::collections::BTreeMap;

use ep_core::{ProtectionRequirement, ProtectionRole, RcdType, TripCharacteristic};

use crate::circuit::{ConflictField, MergeConflict};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedRequirements {
    /// One requirement per role, in role order.
    pub requirements: Vec<ProtectionRequirement>,
    pub conflicts: Vec<MergeConflict>,
}

struct RoleMerge {
    merged: ProtectionRequirement,
    characteristics: Vec<TripCharacteristic>,
    rcd_types: Vec<RcdType>,
    poles: Vec<u8>,
}

fn push_distinct<T: PartialEq>(seen: &mut Vec<T>, value: Option<T>) {
    if let Some(value) = value
        && !seen.contains(&value)
    {
        seen.push(value);
    }
}

fn max_opt(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

impl RoleMerge {
    fn new(role: ProtectionRole) -> Self {
        Self {
            merged: ProtectionRequirement::new(role),
            characteristics: vec![],
            rcd_types: vec![],
            poles: vec![],
        }
    }

    fn absorb(&mut self, req: &ProtectionRequirement) {
        let m = &mut self.merged;
        m.rated_current_a = max_opt(m.rated_current_a, req.rated_current_a);
        m.fault_current_ma = max_opt(m.fault_current_ma, req.fault_current_ma);
        m.characteristic = m.characteristic.or(req.characteristic);
        m.rcd_type = m.rcd_type.or(req.rcd_type);
        m.poles = m.poles.or(req.poles);

        push_distinct(&mut self.characteristics, req.characteristic);
        push_distinct(&mut self.rcd_types, req.rcd_type);
        push_distinct(&mut self.poles, req.poles);
    }

    fn conflicts(&self, out: &mut Vec<MergeConflict>) {
        let role = self.merged.role;
        let mut check = |field, values: Vec<String>| {
            if values.len() > 1 {
                out.push(MergeConflict {
                    role,
                    field,
                    values,
                });
            }
        };
        check(
            ConflictField::Characteristic,
            self.characteristics.iter().map(ToString::to_string).collect(),
        );
        check(
            ConflictField::RcdType,
            self.rcd_types.iter().map(ToString::to_string).collect(),
        );
        check(
            ConflictField::Poles,
            self.poles.iter().map(ToString::to_string).collect(),
        );
    }
}

/// Merge the requirement lists of a circuit's members, given in ascending
/// member id order.
///
/// Rated and fault currents take the maximum. Characteristic, RCD type and
/// pole count must agree where set; the first member setting a field wins and
/// every disagreement is reported as a [`MergeConflict`].
pub fn merge_requirements<'a, I>(members: I) -> MergedRequirements
where
    I: IntoIterator<Item = &'a [ProtectionRequirement]>,
{
    let mut by_role: BTreeMap<ProtectionRole, RoleMerge> = BTreeMap::new();
    for reqs in members {
        for req in reqs {
            by_role
                .entry(req.role)
                .or_insert_with(|| RoleMerge::new(req.role))
                .absorb(req);
        }
    }

    let mut conflicts = Vec::new();
    for merge in by_role.values() {
        merge.conflicts(&mut conflicts);
    }

    MergedRequirements {
        requirements: by_role.into_values().map(|m| m.merged).collect(),
        conflicts,
    }
}
