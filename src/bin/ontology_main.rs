use anyhow::{Context, Result};
use log::{info, warn};
use std::env;
use std::path::PathBuf;

use evidence_export::api_client::{self, GraphQlClient};
use evidence_export::env_loader;
use evidence_export::ontology::{self, OntologySources};

#[tokio::main]
async fn main() -> Result<()> {
    env_loader::load_env();
    env_logger::init();

    info!("Starting ontology export...");

    let args: Vec<String> = env::args().collect();
    let output_path = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("ontology_wired.jsonl")
    };

    // Only the static resource host is contacted, so no API ping here.
    let client = GraphQlClient::new(api_client::build_client_config())?;
    let sources = OntologySources::from_env();
    let ontology = ontology::load_ontology(&client, &sources)
        .await
        .context("Failed to load ontology resources")?;

    let graph = ontology.graph();
    info!(
        "Ontology graph has {} nodes and {} edges.",
        graph.node_count(),
        graph.edge_count()
    );
    if graph.has_cycle() {
        warn!("Ontology graph contains a cycle.");
    }
    let roots = graph.roots();
    if roots.len() != 1 {
        warn!("Expected a single root, found {}: {:?}", roots.len(), roots);
    }

    let mut lines = String::new();
    for node in &ontology.nodes {
        lines.push_str(&serde_json::to_string(node)?);
        lines.push('\n');
    }
    tokio::fs::write(&output_path, lines)
        .await
        .with_context(|| format!("Failed to write {:?}", output_path))?;

    info!("Ontology export completed successfully!");
    println!("\n🌳 Wired ontology with {} nodes written to {:?}", ontology.nodes.len(), output_path);
    Ok(())
}
