//! Full derivation over the demo project.

use std::path::PathBuf;

use ep_app::{DerivationCache, PlanOptions, derive_plan, list_boards, load_project, save_project};
use ep_core::{BoardId, CircuitId, RcdGroupId};
use ep_engine::{CircuitOrigin, UpstreamSlot, parts_list};

fn demo_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop(); // crates
    path.pop(); // repo root
    path.push("demos");
    path.push("projects");
    path.push("einfamilienhaus.yaml");
    path
}

#[test]
fn demo_project_derives_a_consistent_plan() {
    let project = load_project(&demo_path()).expect("Failed to load demo project");
    let symbols = ep_app::symbol_catalog();
    let devices = ep_app::device_catalog(None).unwrap();
    let plan = derive_plan(&project, &symbols, &devices, &PlanOptions::default());

    let board_ids: Vec<&str> = plan.boards.iter().map(|b| b.board_id.as_str()).collect();
    assert_eq!(board_ids, vec!["hv", "uv-og", "unassigned"]);

    let worktop = plan
        .circuits
        .iter()
        .find(|c| c.id == CircuitId::from("kueche-arbeitsplatte"))
        .expect("explicit group circuit");
    assert_eq!(worktop.name, "Küche Arbeitsplatte");
    assert_eq!(worktop.origin, CircuitOrigin::Explicit);
    assert_eq!(worktop.symbol_ids.len(), 2);
    assert!(worktop.cable_ids.iter().any(|c| c.as_str() == "k-kueche-1"));

    let stove_group = plan
        .rcd_groups
        .iter()
        .find(|g| g.id == RcdGroupId::from("manual-hv-herd"))
        .expect("pinned stove group");
    assert!(stove_group.manual);
    assert_eq!(
        stove_group.circuit_ids,
        vec![CircuitId::from("sk-hv-s-kueche-herd")]
    );

    for group in &plan.rcd_groups {
        assert!(group.circuit_ids.len() <= project.max_per_rcd);
    }

    let hv = plan.board(&BoardId::from("hv")).unwrap();
    assert_eq!(hv.supplies.len(), 1);
    assert!(
        hv.supplies[0]
            .devices
            .iter()
            .any(|d| d.slot == UpstreamSlot::SurgeProtection)
    );
    assert!(hv.cabinet.rails >= 1);
    assert!(hv.cabinet.entries.iter().all(|e| e.rail < hv.cabinet.rails));

    let boards = list_boards(&project);
    assert_eq!(boards.len(), 3);
    assert!(parts_list(&project.symbols).total > 0.0);
}

#[test]
fn demo_project_roundtrips_through_json() {
    let project = load_project(&demo_path()).unwrap();
    let path = std::env::temp_dir().join("ep_app_demo_roundtrip.json");
    save_project(&path, &project).unwrap();
    let loaded = load_project(&path).unwrap();
    assert_eq!(project, loaded);
}

#[test]
fn cached_plan_matches_fresh_derivation() {
    let project = load_project(&demo_path()).unwrap();
    let symbols = ep_app::symbol_catalog();
    let devices = ep_app::device_catalog(None).unwrap();
    let options = PlanOptions {
        max_per_rcd: Some(2),
        ..PlanOptions::default()
    };

    let mut cache = DerivationCache::new();
    let cached = cache
        .get_or_derive(&project, &symbols, &devices, &options)
        .clone();
    cache.get_or_derive(&project, &symbols, &devices, &options);

    assert_eq!(cached, derive_plan(&project, &symbols, &devices, &options));
    assert_eq!(cache.hits(), 1);
    assert!(cached.rcd_groups.iter().all(|g| g.circuit_ids.len() <= 2));
}
