use anyhow::{Context, Result};
use clap::Parser;
use csv::Writer;
use routemap::{reconstruct_path, Error};
use std::time::SystemTime;

mod osm;

#[derive(Parser, Debug)]
#[command(name = "osm")]
#[command(about = "Build a road map from an OSM .pbf and run Dijkstra from a source node id.", long_about = None)]
struct Cli {
    /// Path to the .osm.pbf file
    #[arg(short, long)]
    pbf: String,

    /// OSM node id to run Dijkstra from
    #[arg(short, long)]
    source: i64,

    /// OSM node id to route to. Prints the route instead of the distance summary.
    #[arg(short, long)]
    dest: Option<i64>,

    /// Output CSV (node_id, distance_m). If omitted, prints a summary to stdout.
    #[arg(short, long)]
    out: Option<String>,

    /// Include unreachable nodes in output with infinite distance
    #[arg(long, default_value_t = false)]
    include_unreachable: bool,

    /// Only include 'highway' ways (recommended). If false, attempts to include all linear ways.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    only_highways: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let map = osm::load_route_map(&cli.pbf, cli.only_highways)?;
    let graph = map.graph();
    println!(
        "Graph: {} nodes, {} undirected edges",
        graph.num_vertices(),
        graph.num_edges()
    );

    let source = map
        .vertex(&cli.source)
        .ok_or_else(|| Error::UnknownLabel(cli.source.to_string()))
        .context("source node is not on a routable way")?;

    let now = SystemTime::now();
    let table = map.dijkstra(source)?;
    if let Ok(elapsed) = now.elapsed() {
        println!("{} s", elapsed.as_secs_f64());
    }

    if let Some(dest) = cli.dest {
        let dest = map
            .vertex(&dest)
            .ok_or_else(|| Error::UnknownLabel(dest.to_string()))
            .context("destination node is not on a routable way")?;
        let route = reconstruct_path(&table, dest)?;
        println!("type\tlatitude\tlongitude\telement\tcost");
        for waypoint in &route {
            let label = map.label(waypoint.vertex)?;
            if let Some(coord) = map.coords(waypoint.vertex) {
                println!(
                    "W\t{}\t{}\t{}\t{:.2}",
                    coord.lat, coord.lon, label, waypoint.cost
                );
            }
        }
        return Ok(());
    }

    if let Some(out_path) = cli.out {
        let mut wtr =
            Writer::from_path(&out_path).with_context(|| format!("creating CSV {}", &out_path))?;
        wtr.write_record(["node_id", "distance_m"])?;
        for (v, settled) in table.iter() {
            let nid = map.label(v)?;
            wtr.write_record(&[nid.to_string(), format!("{:.6}", settled.distance)])?;
        }
        let mut written = table.len();
        if cli.include_unreachable {
            for v in graph.vertices().filter(|v| !table.contains(*v)) {
                wtr.write_record(&[map.label(v)?.to_string(), String::from("inf")])?;
                written += 1;
            }
        }
        wtr.flush()?;
        println!("Wrote distances for {} nodes to {}", written, out_path);
    } else {
        println!("Nodes: {}", graph.num_vertices());
        println!("Reachable from {}: {}", cli.source, table.len());
        // Settle order is by distance, so the last entry is the farthest.
        if let Some((_, farthest)) = table.iter().last() {
            println!("Max finite distance (m): {:.2}", farthest.distance);
        }
    }

    Ok(())
}
