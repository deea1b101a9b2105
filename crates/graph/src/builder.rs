// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Graph assembly and the streaming executor.
//! A builder/compile split (`build()` yielding an immutable, runnable
//! graph) that emits a combined `tasks`/`updates`/interrupt stream instead
//! of returning a final state, since the orchestrator needs per-node
//! events to translate into sequenced workflow events.

use crate::chunk::{GraphChunk, InterruptPayload};
use crate::error::GraphError;
use crate::node::{Node, NodeContext};
use amelia_core::{Clock, PipelineState};
use futures::stream::{self, BoxStream};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Sentinel destination terminating graph execution.
pub const END: &str = "__end__";

type Router = Arc<dyn Fn(&PipelineState) -> String + Send + Sync>;

enum Edge {
    Direct(String),
    Conditional { router: Router, routes: HashMap<String, String> },
}

/// Builds a [`CompiledGraph`] by registering nodes and edges via `add_node`,
/// `add_edge`, `add_conditional_edges`, `set_entry_point`, plus
/// `interrupt_before` for declaring human-in-the-loop suspension points.
pub struct GraphBuilder<C: Clock> {
    nodes: HashMap<String, Arc<dyn Node<C>>>,
    edges: HashMap<String, Edge>,
    entry_point: Option<String>,
    interrupt_before: HashSet<String>,
}

impl<C: Clock> Default for GraphBuilder<C> {
    fn default() -> Self {
        Self { nodes: HashMap::new(), edges: HashMap::new(), entry_point: None, interrupt_before: HashSet::new() }
    }
}

impl<C: Clock> GraphBuilder<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Arc<dyn Node<C>>) -> &mut Self {
        self.nodes.insert(node.name().to_string(), node);
        self
    }

    pub fn add_edge(&mut self, from: &str, to: &str) -> &mut Self {
        self.edges.insert(from.to_string(), Edge::Direct(to.to_string()));
        self
    }

    pub fn add_conditional_edges(
        &mut self,
        from: &str,
        router: impl Fn(&PipelineState) -> String + Send + Sync + 'static,
        routes: HashMap<String, String>,
    ) -> &mut Self {
        self.edges.insert(from.to_string(), Edge::Conditional { router: Arc::new(router), routes });
        self
    }

    pub fn set_entry_point(&mut self, name: &str) -> &mut Self {
        self.entry_point = Some(name.to_string());
        self
    }

    /// Declares `name` as a node the graph suspends *before* running,
    /// persisting its position for resume.
    pub fn interrupt_before(&mut self, name: &str) -> &mut Self {
        self.interrupt_before.insert(name.to_string());
        self
    }

    pub fn build(&mut self) -> Result<CompiledGraph<C>, GraphError> {
        let entry_point = self.entry_point.clone().ok_or(GraphError::MissingEntryPoint)?;
        Ok(CompiledGraph {
            nodes: std::mem::take(&mut self.nodes),
            edges: std::mem::take(&mut self.edges),
            entry_point,
            interrupt_before: std::mem::take(&mut self.interrupt_before),
        })
    }
}

pub struct CompiledGraph<C: Clock> {
    nodes: HashMap<String, Arc<dyn Node<C>>>,
    edges: HashMap<String, Edge>,
    entry_point: String,
    interrupt_before: HashSet<String>,
}

enum Phase {
    /// About to run `node`; not yet checked against `interrupt_before`.
    Start(String),
    /// `node` cleared the interrupt check and is now running.
    Running(String),
    Finished,
}

struct Cursor<C: Clock> {
    graph: Arc<CompiledGraph<C>>,
    ctx: NodeContext<C>,
    state: PipelineState,
    phase: Phase,
    /// True for exactly the node execution resumed into; suppresses a
    /// re-trigger of the interrupt that was already satisfied by approval.
    skip_interrupt_once: bool,
}

impl<C: Clock + 'static> CompiledGraph<C> {
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn resolve_edge(&self, from: &str, state: &PipelineState) -> Result<String, GraphError> {
        match self.edges.get(from) {
            None => Ok(END.to_string()),
            Some(Edge::Direct(to)) => Ok(to.clone()),
            Some(Edge::Conditional { router, routes }) => {
                let label = router(state);
                routes
                    .get(&label)
                    .cloned()
                    .ok_or_else(|| GraphError::UnknownRoute { node: from.to_string(), label })
            }
        }
    }

    /// Streams `tasks`/`updates`/interrupt chunks starting from
    /// `resume_from` (the graph's entry point if `None`). When
    /// `resume_from` names a node under `interrupt_before`, that interrupt
    /// is not re-triggered — the caller already resolved it via approval.
    pub fn invoke_streaming(
        self: Arc<Self>,
        state: PipelineState,
        ctx: NodeContext<C>,
        resume_from: Option<String>,
    ) -> BoxStream<'static, Result<GraphChunk, GraphError>> {
        let skip_interrupt_once = resume_from.is_some();
        let start = resume_from.unwrap_or_else(|| self.entry_point.clone());
        let cursor = Cursor { graph: self, ctx, state, phase: Phase::Start(start), skip_interrupt_once };

        Box::pin(stream::unfold(cursor, |mut cursor| async move {
            loop {
                match cursor.phase {
                    Phase::Finished => return None,
                    Phase::Start(ref name) if name == END => {
                        cursor.phase = Phase::Finished;
                        return None;
                    }
                    Phase::Start(ref name) => {
                        if !cursor.graph.nodes.contains_key(name) {
                            cursor.phase = Phase::Finished;
                            return Some((Err(GraphError::UnknownNode(name.clone())), cursor));
                        }
                        if cursor.graph.interrupt_before.contains(name) && !cursor.skip_interrupt_once {
                            let node = name.clone();
                            let reason = cursor.state.interrupt_reason.clone();
                            cursor.phase = Phase::Finished;
                            return Some((Ok(GraphChunk::Interrupt(InterruptPayload { node, reason })), cursor));
                        }
                        cursor.skip_interrupt_once = false;
                        let name = name.clone();
                        cursor.phase = Phase::Running(name.clone());
                        return Some((Ok(GraphChunk::Tasks(name)), cursor));
                    }
                    Phase::Running(ref name) => {
                        let node = match cursor.graph.nodes.get(name) {
                            Some(n) => n.clone(),
                            None => {
                                let missing = name.clone();
                                cursor.phase = Phase::Finished;
                                return Some((Err(GraphError::UnknownNode(missing)), cursor));
                            }
                        };
                        let update = match node.run(&cursor.state, &cursor.ctx).await {
                            Ok(u) => u,
                            Err(e) => {
                                cursor.phase = Phase::Finished;
                                return Some((Err(e), cursor));
                            }
                        };
                        update.clone().merge_into(&mut cursor.state);
                        let next = match cursor.graph.resolve_edge(name, &cursor.state) {
                            Ok(n) => n,
                            Err(e) => {
                                cursor.phase = Phase::Finished;
                                return Some((Err(e), cursor));
                            }
                        };
                        cursor.phase = Phase::Start(next);
                        return Some((Ok(GraphChunk::Updates(update)), cursor));
                    }
                }
            }
        }))
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
