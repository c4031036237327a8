use anyhow::{Context, Result};
use fnv::FnvHashMap;
use osmpbfreader::{NodeId, OsmObj, OsmPbfReader, Tags};
use routemap::{Coord, RouteMap};
use std::collections::HashSet;
use std::fs::File;

fn is_way_routable(tags: &Tags, only_highways: bool) -> bool {
    if only_highways && !tags.contains_key("highway") {
        return false;
    }
    // Exclude areas and non-linear ways
    if tags.get("area").map(|v| v == "yes").unwrap_or(false) {
        return false;
    }
    true
}

/// Builds an undirected road map from an OSM `.pbf`, labelled by OSM node id and weighted
/// by segment length in meters.
pub fn load_route_map(path: &str, only_highways: bool) -> Result<RouteMap<i64>> {
    // Pass 1: collect routable ways and the set of node ids they reference
    let file = File::open(path).with_context(|| format!("opening {}", path))?;
    let mut pbf = OsmPbfReader::new(file);

    let mut needed_nodes: HashSet<NodeId> = HashSet::new();
    let mut ways: Vec<Vec<NodeId>> = Vec::new();

    for obj in pbf.iter() {
        let obj = obj?;
        if let OsmObj::Way(w) = obj {
            if is_way_routable(&w.tags, only_highways) {
                needed_nodes.extend(w.nodes.iter().copied());
                ways.push(w.nodes);
            }
        }
    }

    println!(
        "Collected {} routable ways; {} unique node refs",
        ways.len(),
        needed_nodes.len()
    );

    // Pass 2: read coordinates for needed nodes
    let file2 = File::open(path).with_context(|| format!("reopening {}", path))?;
    let mut pbf2 = OsmPbfReader::new(file2);

    let mut coords: FnvHashMap<NodeId, Coord> = FnvHashMap::default();
    for obj in pbf2.iter() {
        let obj = obj?;
        if let OsmObj::Node(n) = obj {
            if needed_nodes.contains(&n.id) {
                coords.insert(n.id, Coord { lat: n.lat(), lon: n.lon() });
            }
        }
    }

    println!(
        "Loaded coordinates for {} nodes actually present",
        coords.len()
    );

    let mut map = RouteMap::new();
    for (nid, coord) in coords.iter() {
        map.add_vertex(nid.0);
        map.add_coords(&nid.0, coord.lat, coord.lon)?;
    }

    for nodes in &ways {
        for pair in nodes.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (ca, cb) = match (coords.get(&a), coords.get(&b)) {
                (Some(ca), Some(cb)) => (ca, cb),
                _ => continue,
            };
            let weight = ca.haversine_meters(cb);
            if weight.is_finite() && weight > 0.0 {
                if let (Some(u), Some(v)) = (map.vertex(&a.0), map.vertex(&b.0)) {
                    map.add_edge(u, v, weight)?;
                }
            }
        }
    }

    Ok(map)
}
