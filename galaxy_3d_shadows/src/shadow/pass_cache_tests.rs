use super::*;

const PROJECTED: &str = "ProjectedShadowmapsTemplate";
const ESM: &str = "EsmShadowmapsTemplate";

fn manager_with_pipeline(name: &str, templates: &[(&str, &str)]) -> RenderGraphManager {
    let mut manager = RenderGraphManager::new();
    manager.create_render_graph(name).unwrap();
    for (pass, template) in templates {
        manager.add_pass(name, pass, template).unwrap();
    }
    manager
}

#[test]
fn test_role_template_lookup() {
    assert_eq!(PassRole::ProjectedShadowmaps.template_name(), PROJECTED);
    assert_eq!(PassRole::EsmShadowmaps.template_name(), ESM);
    assert!(PassRole::ALL.iter().all(|role| !role.template_name().is_empty()));
}

#[test]
fn test_new_caches_existing_passes() {
    let mut manager = manager_with_pipeline("main", &[
        ("Shadows", PROJECTED),
        ("EsmFilter", ESM),
        ("Forward", "ForwardTemplate"),
    ]);
    let cache = PassCache::new(&mut manager, true);

    assert_eq!(cache.live_passes(PassRole::ProjectedShadowmaps).len(), 1);
    assert_eq!(cache.live_passes(PassRole::EsmShadowmaps)[0].name(), "EsmFilter");
}

#[test]
fn test_empty_pipeline_set_has_no_passes() {
    let mut manager = RenderGraphManager::new();
    let cache = PassCache::new(&mut manager, true);
    for role in PassRole::ALL {
        assert!(cache.live_passes(role).is_empty());
        assert!(!cache.has_live_pass(role));
    }
}

#[test]
fn test_esm_passes_need_a_projected_pass_in_same_pipeline() {
    let mut manager = manager_with_pipeline("main", &[("Shadows", PROJECTED)]);
    manager.create_render_graph("tools").unwrap();
    manager.add_pass("tools", "EsmFilter", ESM).unwrap();

    let cache = PassCache::new(&mut manager, true);
    assert!(cache.has_live_pass(PassRole::ProjectedShadowmaps));
    assert!(!cache.has_live_pass(PassRole::EsmShadowmaps));
}

#[test]
fn test_esm_disabled_ignores_filter_passes() {
    let mut manager = manager_with_pipeline("main", &[("Shadows", PROJECTED), ("EsmFilter", ESM)]);
    let cache = PassCache::new(&mut manager, false);
    assert!(!cache.esm_enabled());
    assert!(cache.live_passes(PassRole::EsmShadowmaps).is_empty());
}

#[test]
fn test_process_events_picks_up_new_pipeline() {
    let mut manager = RenderGraphManager::new();
    let mut cache = PassCache::new(&mut manager, true);
    assert!(!cache.process_events(&manager));

    manager.create_render_graph("main").unwrap();
    manager.add_pass("main", "Shadows", PROJECTED).unwrap();

    assert!(!cache.has_live_pass(PassRole::ProjectedShadowmaps));
    assert!(cache.process_events(&manager));
    assert!(cache.has_live_pass(PassRole::ProjectedShadowmaps));
    // Queue is drained
    assert!(!cache.process_events(&manager));
}

#[test]
fn test_process_events_drops_removed_pipeline() {
    let mut manager = manager_with_pipeline("main", &[("Shadows", PROJECTED)]);
    let mut cache = PassCache::new(&mut manager, true);

    manager.remove_render_graph("main");
    assert!(cache.process_events(&manager));
    assert!(cache.live_passes(PassRole::ProjectedShadowmaps).is_empty());
}

#[test]
fn test_dropped_pass_is_skipped_before_events_are_processed() {
    let mut manager = manager_with_pipeline("main", &[("Shadows", PROJECTED)]);
    let cache = PassCache::new(&mut manager, true);

    // Removed and dropped while the event is still queued
    drop(manager.remove_pass("main", "Shadows"));

    assert!(cache.live_passes(PassRole::ProjectedShadowmaps).is_empty());
    assert!(!cache.has_live_pass(PassRole::ProjectedShadowmaps));
}
