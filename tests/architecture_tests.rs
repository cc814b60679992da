//! Layering checks over the source tree.

mod support;

use support::architecture::production_lines_containing;

#[test]
fn domain_has_no_framework_or_outer_layer_imports() {
    let hits = production_lines_containing(
        "src/domain",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "crate::port",
            "tokio::",
            "reqwest::",
        ],
    );

    assert!(hits.is_empty(), "found forbidden imports in domain layer: {hits:#?}");
}

#[test]
fn ports_depend_only_on_domain() {
    let hits = production_lines_containing(
        "src/port",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "reqwest::",
        ],
    );

    assert!(hits.is_empty(), "found outer-layer imports in ports: {hits:#?}");
}

#[test]
fn application_reaches_services_through_ports() {
    let hits = production_lines_containing(
        "src/application",
        &["crate::adapter", "crate::infrastructure", "reqwest::"],
    );

    assert!(
        hits.is_empty(),
        "application layer imports adapters or infrastructure directly: {hits:#?}"
    );
}

#[test]
fn testkit_is_not_used_by_production_code() {
    let hits = production_lines_containing(
        "src",
        &["crate::testkit", "ndvi_retriever::testkit"],
    );
    let hits: Vec<_> = hits
        .into_iter()
        .filter(|(path, _, _)| !path.starts_with("src/testkit/"))
        .collect();

    assert!(hits.is_empty(), "production code depends on testkit: {hits:#?}");
}

#[test]
fn infrastructure_does_not_reach_into_the_cli() {
    let hits = production_lines_containing("src/infrastructure", &["crate::adapter::inbound"]);

    assert!(hits.is_empty(), "infrastructure imports the inbound adapter: {hits:#?}");
}
