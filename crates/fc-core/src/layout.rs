//! Force-directed layout simulation.
//!
//! Follows d3-force semantics so imported charts settle the way users
//! expect: a spring force along links, many-body repulsion between all node
//! pairs, and a centering force toward the viewport centre. The simulation
//! advances in discrete ticks; each tick mutates node positions in place.
//!
//! Energy (`alpha`) decays toward `alpha_target` every tick. A structural
//! change calls [`Simulation::reseed`], which resets `alpha` to 1 so the
//! chart visibly settles again. While a node is pinned the simulation only
//! copies the pin into its position.

use crate::graph::Graph;
use crate::id::NodeId;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The canvas (viewport) dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Tunables for the simulation. Defaults match d3-force.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Spring rest length along links.
    pub link_distance: f32,
    /// Many-body strength; negative repels.
    pub charge_strength: f32,
    /// Below this distance the charge force stops growing.
    pub distance_min: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    /// Energy floor held while a node is dragged.
    pub alpha_target_drag: f32,
    /// Fraction of velocity lost per tick.
    pub velocity_decay: f32,
    /// Radius of the first ring in the initial phyllotaxis placement.
    pub initial_radius: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            link_distance: 100.0,
            charge_strength: -400.0,
            distance_min: 1.0,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            alpha_target_drag: 0.3,
            velocity_decay: 0.4,
            initial_radius: 10.0,
        }
    }
}

/// Golden-angle step of the initial spiral.
const INITIAL_ANGLE: f32 = std::f32::consts::PI * 0.763_932; // π(3 − √5)

/// Per-link spring parameters resolved against the current topology.
#[derive(Debug, Clone, Copy)]
struct Spring {
    source: usize,
    target: usize,
    strength: f32,
    bias: f32,
}

/// The running layout state. Node positions live on the graph itself.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: LayoutConfig,
    viewport: Viewport,
    alpha: f32,
    alpha_target: f32,
    /// Link topology keyed by node sequence position.
    topology: DiGraph<NodeId, ()>,
    springs: Vec<Spring>,
    rng: Lcg,
}

impl Simulation {
    pub fn new(config: LayoutConfig, viewport: Viewport) -> Self {
        Self {
            config,
            viewport,
            alpha: 1.0,
            alpha_target: 0.0,
            topology: DiGraph::new(),
            springs: Vec::new(),
            rng: Lcg::default(),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Resize the canvas; the centre force follows on the next tick.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
    }

    /// Hold energy up while a drag is in progress.
    pub fn hold(&mut self) {
        self.set_alpha_target(self.config.alpha_target_drag);
    }

    /// Let energy decay to rest again.
    pub fn release(&mut self) {
        self.set_alpha_target(0.0);
    }

    /// Whether another tick would still move anything.
    pub fn is_running(&self) -> bool {
        self.alpha >= self.config.alpha_min || self.alpha_target >= self.config.alpha_min
    }

    /// Restart after a structural change: place new nodes, rebuild the link
    /// topology, and reset energy to maximum.
    pub fn reseed(&mut self, graph: &mut Graph) {
        self.place_new_nodes(graph);
        self.rebuild_topology(graph);
        self.alpha = 1.0;
        log::debug!(
            "layout reseeded: {} nodes, {} links",
            graph.nodes.len(),
            graph.links.len()
        );
    }

    /// Advance one step. Returns whether the simulation is still running.
    pub fn tick(&mut self, graph: &mut Graph) -> bool {
        if !self.is_running() {
            return false;
        }
        if self.topology.node_count() != graph.nodes.len()
            || self.topology.edge_count() != graph.links.len()
        {
            // Structural change without a reseed; resync without touching alpha.
            self.place_new_nodes(graph);
            self.rebuild_topology(graph);
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        let alpha = self.alpha;

        self.apply_links(graph, alpha);
        self.apply_charge(graph, alpha);
        self.apply_center(graph);
        self.integrate(graph);

        log::trace!("tick alpha={alpha:.4}");
        self.is_running()
    }

    /// Tick until settled or `max_ticks` is reached. Returns ticks taken.
    pub fn run(&mut self, graph: &mut Graph, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.tick(graph) {
            ticks += 1;
        }
        ticks
    }

    // ─── Setup ───────────────────────────────────────────────────────────

    fn place_new_nodes(&mut self, graph: &mut Graph) {
        let (cx, cy) = self.viewport.center();
        for (i, node) in graph.nodes.iter_mut().enumerate() {
            if node.placed {
                continue;
            }
            let radius = self.config.initial_radius * (0.5 + i as f32).sqrt();
            let angle = i as f32 * INITIAL_ANGLE;
            node.x = cx + radius * angle.cos();
            node.y = cy + radius * angle.sin();
            node.vx = 0.0;
            node.vy = 0.0;
            node.placed = true;
        }
    }

    fn rebuild_topology(&mut self, graph: &Graph) {
        let mut topology = DiGraph::with_capacity(graph.nodes.len(), graph.links.len());
        let mut by_id: HashMap<NodeId, NodeIndex> = HashMap::with_capacity(graph.nodes.len());
        for node in &graph.nodes {
            by_id.insert(node.id, topology.add_node(node.id));
        }
        for link in &graph.links {
            if let (Some(&s), Some(&t)) = (by_id.get(&link.source), by_id.get(&link.target)) {
                topology.add_edge(s, t, ());
            } else {
                log::warn!("layout skipped dangling link {} -> {}", link.source, link.target);
            }
        }

        let degree = |idx: NodeIndex| {
            topology.edges_directed(idx, Direction::Outgoing).count()
                + topology.edges_directed(idx, Direction::Incoming).count()
        };
        self.springs = topology
            .edge_indices()
            .filter_map(|e| topology.edge_endpoints(e))
            .map(|(s, t)| {
                let (ds, dt) = (degree(s) as f32, degree(t) as f32);
                Spring {
                    source: s.index(),
                    target: t.index(),
                    strength: 1.0 / ds.min(dt),
                    bias: ds / (ds + dt),
                }
            })
            .collect();
        self.topology = topology;
    }

    // ─── Forces ──────────────────────────────────────────────────────────

    fn apply_links(&mut self, graph: &mut Graph, alpha: f32) {
        let distance = self.config.link_distance;
        for spring in &self.springs {
            let (s, t) = (&graph.nodes[spring.source], &graph.nodes[spring.target]);
            let mut x = t.x + t.vx - s.x - s.vx;
            let mut y = t.y + t.vy - s.y - s.vy;
            if x == 0.0 {
                x = self.rng.jiggle();
            }
            if y == 0.0 {
                y = self.rng.jiggle();
            }
            let len = (x * x + y * y).sqrt();
            let k = (len - distance) / len * alpha * spring.strength;
            x *= k;
            y *= k;

            let b = spring.bias;
            let target = &mut graph.nodes[spring.target];
            target.vx -= x * b;
            target.vy -= y * b;
            let source = &mut graph.nodes[spring.source];
            source.vx += x * (1.0 - b);
            source.vy += y * (1.0 - b);
        }
    }

    fn apply_charge(&mut self, graph: &mut Graph, alpha: f32) {
        let strength = self.config.charge_strength;
        let min2 = self.config.distance_min * self.config.distance_min;
        let n = graph.nodes.len();
        let positions: Vec<(f32, f32)> = graph.nodes.iter().map(|n| (n.x, n.y)).collect();

        for i in 0..n {
            let (xi, yi) = positions[i];
            let (mut dvx, mut dvy) = (0.0, 0.0);
            for (j, &(xj, yj)) in positions.iter().enumerate() {
                if i == j {
                    continue;
                }
                let mut x = xj - xi;
                let mut y = yj - yi;
                if x == 0.0 {
                    x = self.rng.jiggle();
                }
                if y == 0.0 {
                    y = self.rng.jiggle();
                }
                let mut l = x * x + y * y;
                if l < min2 {
                    l = (min2 * l).sqrt();
                }
                let w = strength * alpha / l;
                dvx += x * w;
                dvy += y * w;
            }
            let node = &mut graph.nodes[i];
            node.vx += dvx;
            node.vy += dvy;
        }
    }

    fn apply_center(&self, graph: &mut Graph) {
        if graph.nodes.is_empty() {
            return;
        }
        let (cx, cy) = self.viewport.center();
        let n = graph.nodes.len() as f32;
        let (sx, sy) = graph
            .nodes
            .iter()
            .fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
        let (dx, dy) = (sx / n - cx, sy / n - cy);
        for node in &mut graph.nodes {
            node.x -= dx;
            node.y -= dy;
        }
    }

    fn integrate(&self, graph: &mut Graph) {
        let keep = 1.0 - self.config.velocity_decay;
        for node in &mut graph.nodes {
            match node.pin {
                Some(pin) => {
                    node.x = pin.x;
                    node.y = pin.y;
                    node.vx = 0.0;
                    node.vy = 0.0;
                }
                None => {
                    node.vx *= keep;
                    node.vy *= keep;
                    node.x += node.vx;
                    node.y += node.vy;
                }
            }
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(LayoutConfig::default(), Viewport::default())
    }
}

/// Deterministic linear congruential generator (same constants as d3-force)
/// used to separate coincident nodes.
#[derive(Debug, Clone)]
struct Lcg(u64);

impl Default for Lcg {
    fn default() -> Self {
        Self(1)
    }
}

impl Lcg {
    const A: u64 = 1_664_525;
    const C: u64 = 1_013_904_223;
    const M: u64 = 4_294_967_296;

    fn next(&mut self) -> f32 {
        self.0 = (Self::A.wrapping_mul(self.0).wrapping_add(Self::C)) % Self::M;
        (self.0 as f64 / Self::M as f64) as f32
    }

    fn jiggle(&mut self) -> f32 {
        (self.next() - 0.5) * 1e-6
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    fn chain(n: usize) -> Graph {
        let mut g = Graph::default();
        let mut prev = None;
        for i in 0..n {
            let id = g.add_node(Category::Verb, format!("n{i}")).unwrap();
            if let Some(p) = prev {
                g.add_link(p, id);
            }
            prev = Some(id);
        }
        g
    }

    #[test]
    fn reseed_places_unplaced_nodes_near_center() {
        let mut g = chain(4);
        let mut sim = Simulation::default();
        sim.reseed(&mut g);
        for node in &g.nodes {
            assert!(node.placed);
            assert!((node.x - 400.0).abs() < 50.0);
            assert!((node.y - 300.0).abs() < 50.0);
        }
        assert_eq!(sim.alpha(), 1.0);
    }

    #[test]
    fn alpha_decays_to_rest() {
        let mut g = chain(3);
        let mut sim = Simulation::default();
        sim.reseed(&mut g);
        let ticks = sim.run(&mut g, 1000);
        assert!(ticks < 400, "took {ticks} ticks");
        assert!(!sim.is_running());
        assert!(!sim.tick(&mut g));
    }

    #[test]
    fn degree_weights_follow_link_counts() {
        let mut g = chain(3);
        let mut sim = Simulation::default();
        sim.reseed(&mut g);
        // 1 -> 2 -> 3: degrees 1, 2, 1.
        let s = sim.springs[0];
        assert!((s.strength - 1.0).abs() < 1e-6);
        assert!((s.bias - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn pinned_node_holds_its_pin() {
        let mut g = chain(3);
        let mut sim = Simulation::default();
        sim.reseed(&mut g);
        let id = g.nodes[1].id;
        g.pin(id, 10.0, 20.0);
        for _ in 0..50 {
            sim.tick(&mut g);
        }
        let n = g.node(id).unwrap();
        assert_eq!((n.x, n.y), (10.0, 20.0));
        assert_eq!((n.vx, n.vy), (0.0, 0.0));
    }

    #[test]
    fn hold_keeps_simulation_alive() {
        let mut g = chain(2);
        let mut sim = Simulation::default();
        sim.reseed(&mut g);
        sim.run(&mut g, 1000);
        assert!(!sim.is_running());

        sim.hold();
        assert!(sim.tick(&mut g));
        for _ in 0..500 {
            sim.tick(&mut g);
        }
        assert!((sim.alpha() - 0.3).abs() < 0.01);

        sim.release();
        sim.run(&mut g, 1000);
        assert!(!sim.is_running());
    }

    #[test]
    fn coincident_nodes_separate() {
        let mut g = Graph::default();
        g.add_node(Category::Verb, "a");
        g.add_node(Category::Verb, "b");
        for node in &mut g.nodes {
            node.x = 400.0;
            node.y = 300.0;
            node.placed = true;
        }
        let mut sim = Simulation::default();
        sim.reseed(&mut g);
        sim.run(&mut g, 1000);
        let (a, b) = (&g.nodes[0], &g.nodes[1]);
        let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
        assert!(d > 10.0, "nodes stayed together: {d}");
        assert!(a.x.is_finite() && b.y.is_finite());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: LayoutConfig = serde_json::from_str(r#"{"link_distance": 150}"#).unwrap();
        assert_eq!(cfg.link_distance, 150.0);
        assert_eq!(cfg.charge_strength, -400.0);
    }
}
