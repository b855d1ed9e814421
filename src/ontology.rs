// ontology.rs
use log::{debug, info, warn};
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::api_client::ResourceFetcher;
use crate::error::OntologyError;

pub const ROOT_ID: &str = "EFO_ROOT";
pub const ROOT_NAME: &str = "root";

pub const DEFAULT_THERAPEUTIC_AREAS_URL: &str =
    "https://storage.googleapis.com/open-targets-data-releases/alpha-rewrite/static/ontology/therapeutic_area.txt";
pub const DEFAULT_EFO_URL: &str =
    "https://storage.googleapis.com/open-targets-data-releases/alpha-rewrite/static/ontology/diseases_efo.jsonl";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OntologyNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "parentIds", default)]
    pub parent_ids: Vec<String>,
}

impl OntologyNode {
    pub fn root() -> Self {
        OntologyNode {
            id: ROOT_ID.to_string(),
            name: ROOT_NAME.to_string(),
            parent_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OntologySources {
    pub therapeutic_areas_url: String,
    pub efo_url: String,
}

impl Default for OntologySources {
    fn default() -> Self {
        OntologySources {
            therapeutic_areas_url: DEFAULT_THERAPEUTIC_AREAS_URL.to_string(),
            efo_url: DEFAULT_EFO_URL.to_string(),
        }
    }
}

impl OntologySources {
    pub fn from_env() -> Self {
        let defaults = OntologySources::default();
        OntologySources {
            therapeutic_areas_url: std::env::var("THERAPEUTIC_AREAS_URL").unwrap_or(defaults.therapeutic_areas_url),
            efo_url: std::env::var("EFO_URL").unwrap_or(defaults.efo_url),
        }
    }
}

/// Newline-delimited therapeutic area ids; blank lines are ignored.
pub fn parse_therapeutic_areas(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// JSON-lines ontology nodes. The first malformed line aborts parsing.
pub fn parse_nodes(text: &str) -> Result<Vec<OntologyNode>, OntologyError> {
    let mut nodes = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let node = serde_json::from_str(line).map_err(|source| OntologyError::MalformedLine { line: idx + 1, source })?;
        nodes.push(node);
    }
    Ok(nodes)
}

/// Disease ontology rewired under a single synthetic root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ontology {
    pub nodes: Vec<OntologyNode>,
    #[serde(rename = "therapeuticAreas")]
    pub therapeutic_areas: Vec<String>,
}

impl Ontology {
    /// Points every therapeutic area at `EFO_ROOT` and appends the root exactly once.
    pub fn wire(nodes: Vec<OntologyNode>, therapeutic_areas: Vec<String>) -> Self {
        let areas: HashSet<&str> = therapeutic_areas.iter().map(String::as_str).collect();
        let mut wired: Vec<OntologyNode> = nodes
            .into_iter()
            .filter(|node| {
                if node.id == ROOT_ID {
                    warn!("Dropping '{}' node found in source ontology", ROOT_ID);
                    false
                } else {
                    true
                }
            })
            .map(|mut node| {
                if areas.contains(node.id.as_str()) {
                    node.parent_ids = vec![ROOT_ID.to_string()];
                }
                node
            })
            .collect();
        wired.push(OntologyNode::root());

        debug!(
            "Wired ontology with {} nodes under {} therapeutic areas",
            wired.len(),
            therapeutic_areas.len()
        );
        Ontology {
            nodes: wired,
            therapeutic_areas,
        }
    }

    pub fn node(&self, id: &str) -> Option<&OntologyNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Directed parent -> child graph. Parents missing from the node list are skipped.
    pub fn graph(&self) -> OntologyGraph {
        let mut graph = DiGraph::<String, ()>::new();
        let mut node_map: HashMap<String, NodeIndex> = HashMap::new();

        for node in &self.nodes {
            node_map
                .entry(node.id.clone())
                .or_insert_with(|| graph.add_node(node.id.clone()));
        }
        let mut dangling = 0usize;
        for node in &self.nodes {
            let child = node_map[&node.id];
            for parent_id in &node.parent_ids {
                match node_map.get(parent_id) {
                    Some(&parent) => {
                        graph.add_edge(parent, child, ());
                    }
                    None => dangling += 1,
                }
            }
        }
        if dangling > 0 {
            warn!("{} parent references point outside the ontology", dangling);
        }
        OntologyGraph { graph, node_map }
    }
}

pub struct OntologyGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl OntologyGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Ids of nodes without parents.
    pub fn roots(&self) -> Vec<String> {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph.neighbors_directed(idx, Direction::Incoming).next().is_none())
            .map(|idx| self.graph[idx].clone())
            .collect()
    }

    /// Every ancestor of `id`, the node itself excluded.
    pub fn ancestors(&self, id: &str) -> HashSet<String> {
        let mut visited = HashSet::new();
        let Some(&start) = self.node_map.get(id) else {
            return visited;
        };
        let mut stack: Vec<NodeIndex> = self.graph.neighbors_directed(start, Direction::Incoming).collect();

        while let Some(current) = stack.pop() {
            let current_id = self.graph[current].clone();
            if visited.insert(current_id) {
                for parent in self.graph.neighbors_directed(current, Direction::Incoming) {
                    if !visited.contains(&self.graph[parent]) {
                        stack.push(parent);
                    }
                }
            }
        }
        visited
    }

    /// Therapeutic areas the disease falls under, in `areas` order. A therapeutic
    /// area is its own area.
    pub fn therapeutic_areas_of(&self, id: &str, areas: &[String]) -> Vec<String> {
        let ancestors = self.ancestors(id);
        areas
            .iter()
            .filter(|area| area.as_str() == id || ancestors.contains(area.as_str()))
            .cloned()
            .collect()
    }
}

/// Fetches both static resources concurrently and wires them.
pub async fn load_ontology<F>(fetcher: &F, sources: &OntologySources) -> Result<Ontology, OntologyError>
where
    F: ResourceFetcher + ?Sized,
{
    info!("Loading ontology from {} and {}", sources.therapeutic_areas_url, sources.efo_url);
    let (areas_text, efo_text) = tokio::try_join!(
        fetcher.fetch_text(&sources.therapeutic_areas_url),
        fetcher.fetch_text(&sources.efo_url),
    )?;

    let therapeutic_areas = parse_therapeutic_areas(&areas_text);
    let nodes = parse_nodes(&efo_text)?;
    info!(
        "Fetched {} ontology nodes and {} therapeutic areas",
        nodes.len(),
        therapeutic_areas.len()
    );
    Ok(Ontology::wire(nodes, therapeutic_areas))
}
