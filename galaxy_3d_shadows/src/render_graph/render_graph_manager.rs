/// Central render graph manager.
///
/// Owns the active render graphs (pipelines) by name and notifies
/// subscribers of every structural change through a channel.

use std::sync::Arc;
use crossbeam_channel::{Receiver, Sender};
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::{engine_bail, engine_err};
use super::render_graph::RenderGraph;
use super::render_pass::RenderPass;

/// Structural change of the active pipeline set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderGraphEvent {
    /// A render graph was created
    Added(String),
    /// A render graph was removed
    Removed(String),
    /// A pass was added to or removed from a render graph
    PassesChanged(String),
}

pub struct RenderGraphManager {
    render_graphs: FxHashMap<String, RenderGraph>,
    subscribers: Vec<Sender<RenderGraphEvent>>,
}

impl RenderGraphManager {
    /// Create a new empty render graph manager
    pub fn new() -> Self {
        Self {
            render_graphs: FxHashMap::default(),
            subscribers: Vec::new(),
        }
    }

    /// Open a new event queue
    ///
    /// The receiver sees every event published after this call.
    /// Dropped receivers are pruned on the next publish.
    pub fn subscribe(&mut self) -> Receiver<RenderGraphEvent> {
        let (sender, receiver) = crossbeam_channel::unbounded();
        self.subscribers.push(sender);
        receiver
    }

    fn publish(&mut self, event: RenderGraphEvent) {
        self.subscribers.retain(|sender| sender.send(event.clone()).is_ok());
    }

    /// Create a new named render graph
    ///
    /// # Errors
    ///
    /// Returns an error if a render graph with the same name already exists.
    pub fn create_render_graph(&mut self, name: &str) -> Result<&RenderGraph> {
        if self.render_graphs.contains_key(name) {
            engine_bail!("galaxy3d::RenderGraphManager",
                "RenderGraph '{}' already exists", name);
        }

        self.render_graphs.insert(name.to_string(), RenderGraph::new(name));
        self.publish(RenderGraphEvent::Added(name.to_string()));
        self.render_graphs.get(name)
            .ok_or_else(|| engine_err!("galaxy3d::RenderGraphManager",
                "RenderGraph '{}' vanished after insertion", name))
    }

    /// Get a render graph by name
    pub fn render_graph(&self, name: &str) -> Option<&RenderGraph> {
        self.render_graphs.get(name)
    }

    /// Iterate over all render graphs (arbitrary order)
    pub fn render_graphs(&self) -> impl Iterator<Item = &RenderGraph> {
        self.render_graphs.values()
    }

    /// Remove a render graph by name
    ///
    /// Returns the removed render graph, or None if not found.
    pub fn remove_render_graph(&mut self, name: &str) -> Option<RenderGraph> {
        let removed = self.render_graphs.remove(name)?;
        self.publish(RenderGraphEvent::Removed(name.to_string()));
        Some(removed)
    }

    /// Append a pass to a render graph
    ///
    /// # Errors
    ///
    /// Returns an error if the graph does not exist or already has a pass
    /// with the same name.
    pub fn add_pass(&mut self, graph_name: &str, pass_name: &str, template: &str) -> Result<Arc<RenderPass>> {
        let graph = match self.render_graphs.get_mut(graph_name) {
            Some(graph) => graph,
            None => engine_bail!("galaxy3d::RenderGraphManager",
                "RenderGraph '{}' not found", graph_name),
        };
        if graph.pass(pass_name).is_some() {
            engine_bail!("galaxy3d::RenderGraphManager",
                "Pass '{}' already exists in RenderGraph '{}'", pass_name, graph_name);
        }

        let pass = Arc::new(RenderPass::new(pass_name, template));
        graph.push_pass(pass.clone());
        self.publish(RenderGraphEvent::PassesChanged(graph_name.to_string()));
        Ok(pass)
    }

    /// Remove a pass from a render graph
    ///
    /// Returns the removed pass, or None if the graph or pass was not found.
    pub fn remove_pass(&mut self, graph_name: &str, pass_name: &str) -> Option<Arc<RenderPass>> {
        let pass = self.render_graphs.get_mut(graph_name)?.take_pass(pass_name)?;
        self.publish(RenderGraphEvent::PassesChanged(graph_name.to_string()));
        Some(pass)
    }

    /// Get the number of render graphs
    pub fn render_graph_count(&self) -> usize {
        self.render_graphs.len()
    }

    /// Get all render graph names
    pub fn render_graph_names(&self) -> Vec<&str> {
        self.render_graphs.keys().map(|k| k.as_str()).collect()
    }

    /// Remove all render graphs
    pub fn clear(&mut self) {
        let names: Vec<String> = self.render_graphs.keys().cloned().collect();
        self.render_graphs.clear();
        for name in names {
            self.publish(RenderGraphEvent::Removed(name));
        }
    }
}

impl Default for RenderGraphManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "render_graph_manager_tests.rs"]
mod tests;
