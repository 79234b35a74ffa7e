/// Cache of the render passes that consume projected shadow data.
///
/// Passes are found by role through a template lookup table and held as
/// `Weak` references: a pass dropped between a pipeline change and its use
/// is simply not fed. Pipeline changes arrive as events on a queue that
/// is drained at a fixed point in the frame, before flushing.

use std::sync::{Arc, Weak};
use crossbeam_channel::Receiver;
use rustc_hash::FxHashMap;
use crate::engine_debug;
use crate::render_graph::{RenderGraph, RenderGraphEvent, RenderGraphManager, RenderPass};

/// Kind of pass the shadow processor feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassRole {
    /// Renders the shadow maps of every caster
    ProjectedShadowmaps,
    /// Filters shadow maps for exponential shadow mapping
    EsmShadowmaps,
}

/// Template each role is instantiated from
const ROLE_TEMPLATES: [(PassRole, &str); 2] = [
    (PassRole::ProjectedShadowmaps, "ProjectedShadowmapsTemplate"),
    (PassRole::EsmShadowmaps, "EsmShadowmapsTemplate"),
];

impl PassRole {
    pub const ALL: [PassRole; 2] = [PassRole::ProjectedShadowmaps, PassRole::EsmShadowmaps];

    pub fn template_name(&self) -> &'static str {
        ROLE_TEMPLATES.iter()
            .find(|(role, _)| role == self)
            .map(|(_, template)| *template)
            .unwrap_or_default()
    }
}

pub struct PassCache {
    passes: FxHashMap<PassRole, Vec<Weak<RenderPass>>>,
    events: Receiver<RenderGraphEvent>,
    esm_enabled: bool,
}

impl PassCache {
    /// Subscribe to `manager` and cache the passes it currently holds
    pub fn new(manager: &mut RenderGraphManager, esm_enabled: bool) -> Self {
        let mut cache = Self {
            passes: FxHashMap::default(),
            events: manager.subscribe(),
            esm_enabled,
        };
        cache.rebuild(manager);
        cache
    }

    /// Drain pending pipeline events, rebuilding once if there were any
    ///
    /// Returns true when the cache was rebuilt.
    pub fn process_events(&mut self, manager: &RenderGraphManager) -> bool {
        let drained = self.events.try_iter().count();
        if drained == 0 {
            return false;
        }
        engine_debug!("galaxy3d::PassCache",
            "{} pipeline event(s), rescanning passes", drained);
        self.rebuild(manager);
        true
    }

    /// Rescan every render graph
    pub fn rebuild(&mut self, manager: &RenderGraphManager) {
        self.passes.clear();
        for graph in manager.render_graphs() {
            let projected = Self::collect(graph, PassRole::ProjectedShadowmaps);
            // Filtering only makes sense where the maps are rendered
            if self.esm_enabled && !projected.is_empty() {
                let esm = Self::collect(graph, PassRole::EsmShadowmaps);
                self.passes.entry(PassRole::EsmShadowmaps).or_default().extend(esm);
            }
            self.passes.entry(PassRole::ProjectedShadowmaps).or_default().extend(projected);
        }
    }

    fn collect(graph: &RenderGraph, role: PassRole) -> Vec<Weak<RenderPass>> {
        graph.passes_with_template(role.template_name())
            .map(Arc::downgrade)
            .collect()
    }

    /// Passes of `role` that are still alive
    pub fn live_passes(&self, role: PassRole) -> Vec<Arc<RenderPass>> {
        self.passes.get(&role)
            .map(|passes| passes.iter().filter_map(Weak::upgrade).collect())
            .unwrap_or_default()
    }

    pub fn has_live_pass(&self, role: PassRole) -> bool {
        self.passes.get(&role)
            .is_some_and(|passes| passes.iter().any(|p| p.strong_count() > 0))
    }

    pub fn esm_enabled(&self) -> bool {
        self.esm_enabled
    }
}

#[cfg(test)]
#[path = "pass_cache_tests.rs"]
mod tests;
