use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use csv::Writer;
use routemap::reader::{read_csv_file, read_route_file, Weighting};
use routemap::{Error, RouteMap};
use std::time::SystemTime;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Node/Edge records
    Route,
    /// node_id,neighbor_id,weight rows with a header
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "routes")]
#[command(about = "Load a route map from a text or CSV file and find shortest routes from a source node.", long_about = None)]
struct Cli {
    /// Path to the route or CSV file
    #[arg(short, long)]
    file: String,

    #[arg(long, value_enum, default_value_t = Format::Route)]
    format: Format,

    /// Label of the node to start from
    #[arg(short, long)]
    source: i64,

    /// Label of the node to route to. Without it the whole settled table is printed.
    #[arg(short, long)]
    dest: Option<i64>,

    /// Edge field used as the weight of route files
    #[arg(short, long, value_enum, default_value_t = Weighting::Time)]
    weight: Weighting,

    /// Also write the result as CSV
    #[arg(short, long)]
    out: Option<String>,
}

fn load(cli: &Cli) -> Result<RouteMap<i64>> {
    let map = match cli.format {
        Format::Route => read_route_file(&cli.file, cli.weight),
        Format::Csv => read_csv_file(&cli.file),
    };
    map.with_context(|| format!("reading {}", &cli.file))
}

fn vertex_of(map: &RouteMap<i64>, label: i64) -> Result<routemap::Vertex> {
    map.vertex(&label)
        .ok_or_else(|| Error::UnknownLabel(label.to_string()))
        .with_context(|| format!("node {} is not in the map", label))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let map = load(&cli)?;
    println!(
        "Read {} vertices and {} edges",
        map.graph().num_vertices(),
        map.graph().num_edges()
    );
    println!("{}", map);

    let source = vertex_of(&map, cli.source)?;
    let mut rows: Vec<[String; 3]> = Vec::new();

    if let Some(dest) = cli.dest {
        let dest = vertex_of(&map, dest)?;
        let now = SystemTime::now();
        let route = map.shortest_path(source, dest)?;
        if let Ok(elapsed) = now.elapsed() {
            println!("{} s", elapsed.as_secs_f64());
        }

        println!("type\tlatitude\tlongitude\telement\tcost");
        for waypoint in &route {
            let label = map.label(waypoint.vertex)?;
            let (lat, lon) = match map.coords(waypoint.vertex) {
                Some(coord) => (coord.lat.to_string(), coord.lon.to_string()),
                None => (String::from("-"), String::from("-")),
            };
            println!("W\t{}\t{}\t{}\t{}", lat, lon, label, waypoint.cost);
            rows.push([label.to_string(), waypoint.cost.to_string(), String::new()]);
        }
    } else {
        let now = SystemTime::now();
        let table = map.dijkstra(source)?;
        if let Ok(elapsed) = now.elapsed() {
            println!("{} s", elapsed.as_secs_f64());
        }

        println!("Vertex\tLength\tPreceding Vertex");
        for (v, settled) in table.iter() {
            let label = map.label(v)?;
            let predecessor = match settled.predecessor {
                Some(p) => map.label(p)?.to_string(),
                None => String::from("None"),
            };
            println!("{}\t\t{}\t\t{}", label, settled.distance, predecessor);
            rows.push([label.to_string(), settled.distance.to_string(), predecessor]);
        }
    }

    if let Some(out_path) = cli.out {
        let mut wtr =
            Writer::from_path(&out_path).with_context(|| format!("creating CSV {}", &out_path))?;
        wtr.write_record(["node_id", "cost", "predecessor"])?;
        for row in &rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        println!("Wrote {} rows to {}", rows.len(), out_path);
    }

    Ok(())
}
