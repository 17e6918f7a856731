use std::path::Path;

use ep_catalog::builtin_symbols;

#[test]
fn demos_load_and_validate() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/projects");
    let demos = ["einfamilienhaus.yaml"];

    for name in demos {
        let path = root.join(name);
        let project = ep_project::load_yaml(&path)
            .unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        ep_project::validate_project(&project)
            .unwrap_or_else(|e| panic!("Failed to validate {}: {}", name, e));

        let catalog = builtin_symbols();
        for symbol in &project.symbols {
            assert!(
                catalog.find(&symbol.symbol_key).is_some(),
                "{}: unknown symbol type {}",
                name,
                symbol.symbol_key
            );
        }
    }
}
