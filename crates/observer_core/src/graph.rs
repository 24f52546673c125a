//! Analysis of the proximity graph as a network.

use observer_data::Connection;
use petgraph::algo::connected_components;
use petgraph::graph::UnGraph;

/// Undirected view of the current edge list over `node_count` particles.
pub struct ProximityGraph {
    graph: UnGraph<u32, f64>,
}

impl ProximityGraph {
    /// Builds the graph. Edges referring to ids `>= node_count` are ignored.
    pub fn new(node_count: usize, connections: &[Connection]) -> Self {
        let mut graph: UnGraph<u32, f64> = UnGraph::with_capacity(node_count, connections.len());
        let nodes: Vec<_> = (0..node_count).map(|i| graph.add_node(i as u32)).collect();
        for c in connections {
            if let (Some(&a), Some(&b)) = (nodes.get(c.source as usize), nodes.get(c.target as usize)) {
                graph.add_edge(a, b, c.distance);
            }
        }
        Self { graph }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of connected components; isolated particles count individually.
    #[must_use]
    pub fn component_count(&self) -> usize {
        connected_components(&self.graph)
    }

    #[must_use]
    pub fn mean_degree(&self) -> f64 {
        let n = self.node_count();
        if n == 0 {
            return 0.0;
        }
        2.0 * self.edge_count() as f64 / n as f64
    }

    /// Mean degree relative to the complete graph, in `[0, 1]`.
    #[must_use]
    pub fn connectivity(&self) -> f64 {
        let n = self.node_count();
        if n < 2 {
            return 0.0;
        }
        self.mean_degree() / (n - 1) as f64
    }

    /// Rough integrated-information estimate Φ.
    ///
    /// Peaks at half connectivity: fully disconnected parts integrate nothing,
    /// and a complete graph is too uniform to differentiate.
    #[must_use]
    pub fn integrated_information(&self) -> f64 {
        let n = self.node_count();
        if n < 2 {
            return 0.0;
        }
        let k = self.connectivity();
        k * n as f64 * (1.0 - (0.5 - k).abs() * 2.0)
    }
}
