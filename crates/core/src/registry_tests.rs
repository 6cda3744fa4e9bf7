use super::*;

const PROBE_REGISTRY: &str = r#"{
    "registry-format": "mplane",
    "registry-uri": "http://example.com/registry/probe",
    "registry-revision": 3,
    "includes": ["http://ict-mplane.eu/registry/core"],
    "elements": [
        {"name": "probe.temperature.c", "prim": "real", "desc": "Probe temperature"}
    ]
}"#;

#[test]
fn core_registry_is_always_present() {
    let registries = Registries::new().unwrap();
    let core = registries.core().unwrap();
    assert_eq!(core.uri(), CORE_REGISTRY_URI);
    let element = core.element("destination.ip4").unwrap();
    assert_eq!(element.primitive(), Primitive::Address);
    assert_eq!(element.namespace(), CORE_REGISTRY_URI);
}

#[test]
fn unknown_element_names_the_registry() {
    let registries = Registries::new().unwrap();
    let err = registries.core().unwrap().element("no.such.thing").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnknownElement {
            name: "no.such.thing".to_string(),
            registry: CORE_REGISTRY_URI.to_string(),
        }
    );
}

#[test]
fn includes_are_merged_before_own_elements() {
    let registries = Registries::new().unwrap();
    let probe = registries.load_json(PROBE_REGISTRY).unwrap();
    assert_eq!(probe.revision(), 3);
    assert!(probe.element("source.ip4").is_ok());
    let own = probe.element("probe.temperature.c").unwrap();
    assert_eq!(own.primitive(), Primitive::Real);
    assert_eq!(own.namespace(), "http://example.com/registry/probe");
    assert_eq!(
        probe.elements().last().map(|e| e.name()),
        Some("probe.temperature.c")
    );
}

#[test]
fn loaded_registries_are_shared_between_clones() {
    let registries = Registries::new().unwrap();
    let other = registries.clone();
    let loaded = registries.load_json(PROBE_REGISTRY).unwrap();
    let fetched = other.get("http://example.com/registry/probe").unwrap();
    assert!(Arc::ptr_eq(&loaded, &fetched));
}

#[test]
fn registries_load_from_file_uris() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("probe.json");
    std::fs::write(&path, PROBE_REGISTRY).unwrap();

    let registries = Registries::new().unwrap();
    let uri = format!("file://{}", path.display());
    let registry = registries.get(&uri).unwrap();
    assert_eq!(registry.uri(), "http://example.com/registry/probe");
    // Cached under both names
    assert!(registries.get("http://example.com/registry/probe").is_ok());
}

#[test]
fn remote_registries_are_not_fetched() {
    let registries = Registries::new().unwrap();
    assert!(matches!(
        registries.get("http://example.com/registry/unknown"),
        Err(ParseError::UnknownRegistry(_))
    ));
}

#[test]
fn malformed_documents_are_rejected() {
    let registries = Registries::new().unwrap();
    assert!(matches!(
        registries.load_json("{}"),
        Err(ParseError::InvalidRegistry(_))
    ));
    let wrong_format = r#"{"registry-format": "other", "registry-uri": "x"}"#;
    assert!(matches!(
        registries.load_json(wrong_format),
        Err(ParseError::InvalidRegistry(_))
    ));
    let bad_prim = r#"{"registry-format": "mplane", "registry-uri": "y",
        "elements": [{"name": "a", "prim": "object"}]}"#;
    assert!(matches!(
        registries.load_json(bad_prim),
        Err(ParseError::UnknownPrimitive(_))
    ));
}
