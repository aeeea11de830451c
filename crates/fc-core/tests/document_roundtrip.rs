//! Integration tests: export → import preserves the logical document.

use fc_core::{Category, Graph, Link, NodeId, Simulation, export_json, import_json};
use pretty_assertions::assert_eq;

fn sorted_links(graph: &Graph) -> Vec<(String, String)> {
    let mut pairs: Vec<_> = graph
        .links
        .iter()
        .map(|l| (l.source.to_string(), l.target.to_string()))
        .collect();
    pairs.sort();
    pairs
}

#[test]
fn fixture_survives_export_import() {
    let original = import_json(include_str!("fixtures/checkout.json")).unwrap();
    let reimported = import_json(&export_json(&original)).unwrap();

    assert_eq!(reimported.name, "Checkout");
    let records = |g: &Graph| -> Vec<(NodeId, Category, String)> {
        g.nodes
            .iter()
            .map(|n| (n.id, n.category, n.content.clone()))
            .collect()
    };
    assert_eq!(records(&reimported), records(&original));
    assert_eq!(sorted_links(&reimported), sorted_links(&original));
}

#[test]
fn edited_graph_roundtrip_ignores_layout_state() {
    let mut graph = Graph::new("Edited");
    let a = graph.add_node(Category::Start, "Begin").unwrap();
    let b = graph.add_node(Category::Decision, "ok?").unwrap();
    let c = graph.add_node(Category::End, "Stop").unwrap();
    graph.add_link(a, b);
    graph.add_link(b, c);
    graph.add_link(b, b);
    graph.add_link(a, b);
    graph.remove_node(c);
    graph.rename_node(b, "still ok?");

    let mut sim = Simulation::default();
    sim.reseed(&mut graph);
    sim.run(&mut graph, 50);
    graph.pin(a, 5.0, 5.0);

    let back = import_json(&export_json(&graph)).unwrap();
    assert_eq!(back.name, "Edited");
    assert_eq!(back.nodes.len(), 2);
    assert_eq!(back.node(b).unwrap().content, "still ok?");
    assert!(back.nodes.iter().all(|n| !n.placed && n.pin.is_none()));
    assert_eq!(
        back.links,
        vec![Link::new(a, b), Link::new(b, b), Link::new(a, b)]
    );
}

#[test]
fn export_is_stable_json() {
    let graph = import_json(include_str!("fixtures/checkout.json")).unwrap();
    let once = export_json(&graph);
    let twice = export_json(&import_json(&once).unwrap());
    assert_eq!(once, twice);
}
