/// Render graph: one render pipeline and its ordered passes.
///
/// Render graphs can only be created and modified through
/// `RenderGraphManager`, so every structural change is observed.

use std::sync::Arc;
use super::render_pass::RenderPass;

pub struct RenderGraph {
    name: String,
    passes: Vec<Arc<RenderPass>>,
}

impl RenderGraph {
    /// Internal only, created via RenderGraphManager::create_render_graph()
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            passes: Vec::new(),
        }
    }

    /// Graph (pipeline) name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Passes in execution order
    pub fn passes(&self) -> &[Arc<RenderPass>] {
        &self.passes
    }

    /// Find a pass by name
    pub fn pass(&self, name: &str) -> Option<&Arc<RenderPass>> {
        self.passes.iter().find(|p| p.name() == name)
    }

    /// All passes instantiated from `template`
    pub fn passes_with_template<'a>(&'a self, template: &'a str) -> impl Iterator<Item = &'a Arc<RenderPass>> + 'a {
        self.passes.iter().filter(move |p| p.template() == template)
    }

    pub(crate) fn push_pass(&mut self, pass: Arc<RenderPass>) {
        self.passes.push(pass);
    }

    pub(crate) fn take_pass(&mut self, name: &str) -> Option<Arc<RenderPass>> {
        let index = self.passes.iter().position(|p| p.name() == name)?;
        Some(self.passes.remove(index))
    }
}
