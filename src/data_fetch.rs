use log::info;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::api_client::QueryExecutor;
use crate::batch_aggregator::{fetch_at_path, BatchAggregator, BatchSettings};
use crate::error::FetchError;
use crate::models::{
    DiseaseAssociation, Gene2PhenotypeEvidence, IntOgenEvidence, Interaction, Pathways, PhewasEvidence, SafetyProfile,
};

pub const ASSOCIATIONS_QUERY: &str = r#"
query AssociationsQuery(
  $ensemblId: String!
  $index: Int!
  $size: Int!
  $aggregationFilters: [AggregationFilter!]
) {
  target(ensemblId: $ensemblId) {
    id
    associatedDiseases(
      page: { index: $index, size: $size }
      aggregationFilters: $aggregationFilters
    ) {
      count
      rows {
        disease {
          id
          name
        }
        score
        datatypeScores {
          componentId: id
          score
        }
      }
    }
  }
}
"#;
pub const ASSOCIATIONS_PATH: &str = "data.target.associatedDiseases";

pub const INTERACTIONS_QUERY: &str = r#"
query InteractionsQuery(
  $ensgId: String!
  $sourceDatabase: String
  $index: Int!
  $size: Int!
) {
  target(ensemblId: $ensgId) {
    id
    interactions(
      sourceDatabase: $sourceDatabase
      page: { index: $index, size: $size }
    ) {
      count
      rows {
        intA
        intB
        score
        count
        targetB {
          id
          approvedSymbol
        }
        speciesB {
          mnemonic
        }
        evidences {
          interactionIdentifier
          interactionTypeShortName
          hostOrganismScientificName
          interactionDetectionMethodShortName
          participantDetectionMethodA {
            shortName
          }
          participantDetectionMethodB {
            shortName
          }
          expansionMethodShortName
          evidenceScore
          pubmedId
        }
      }
    }
  }
}
"#;
pub const INTERACTIONS_PATH: &str = "data.target.interactions";

pub const SAFETY_QUERY: &str = r#"
query SafetyQuery($ensgId: String!) {
  target(ensgId: $ensgId) {
    id
    details {
      safety {
        adverseEffects {
          organsSystemsAffected { code mappedTerm preferredTerm }
          activationEffects { groupKey terms }
          inhibitionEffects { groupKey terms }
          references { pubmedId refLink pubUrl refLabel }
        }
        safetyRiskInfo {
          organsSystemsAffected { code mappedTerm preferredTerm }
          safetyLiability
          references { pubmedId refLink pubUrl refLabel }
        }
      }
    }
  }
}
"#;
pub const SAFETY_PATH: &str = "data.target.details.safety";

pub const PATHWAYS_QUERY: &str = r#"
query PathwaysQuery($ensgId: String!) {
  target(ensgId: $ensgId) {
    id
    details {
      pathways {
        topLevelPathways { id name isAssociated }
        lowLevelPathways { id name parents { id name } }
      }
    }
  }
}
"#;
pub const PATHWAYS_PATH: &str = "data.target.details.pathways";

pub const PHEWAS_QUERY: &str = r#"
query PhewasCatalogQuery($ensemblId: String!, $efoId: String!, $size: Int!) {
  disease(efoId: $efoId) {
    id
    evidences(
      ensemblIds: [$ensemblId]
      enableIndirect: true
      datasourceIds: ["phewas_catalog"]
      size: $size
    ) {
      rows {
        disease { id name }
        diseaseFromSource
        variantRsId
        variantFunctionalConsequence { id label }
        resourceScore
        studyCases
        oddsRatio
      }
    }
  }
}
"#;

pub const GENE2PHENOTYPE_QUERY: &str = r#"
query Gene2PhenotypeQuery($ensemblId: String!, $efoId: String!, $size: Int!) {
  disease(efoId: $efoId) {
    id
    evidences(
      ensemblIds: [$ensemblId]
      enableIndirect: true
      datasourceIds: ["gene2phenotype"]
      size: $size
    ) {
      rows {
        disease { id name }
        diseaseFromSource
        allelicRequirements
        confidence
        target { id approvedSymbol }
        literature
      }
    }
  }
}
"#;

pub const INTOGEN_QUERY: &str = r#"
query IntOgenQuery($ensemblId: String!, $efoId: String!, $size: Int!) {
  disease(efoId: $efoId) {
    id
    evidences(
      ensemblIds: [$ensemblId]
      enableIndirect: true
      datasourceIds: ["intogen"]
      size: $size
    ) {
      rows {
        disease { id name }
        variations { numberMutatedSamples numberSamplesTested }
        resourceScore
        significantDriverMethods
        cohortId
        cohortShortName
        cohortDescription
        target { id approvedSymbol }
      }
    }
  }
}
"#;
pub const EVIDENCE_ROWS_PATH: &str = "data.disease.evidences.rows";

/// Interaction resources the platform exposes per target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionSource {
    Reactome,
    String,
}

impl InteractionSource {
    pub fn id(self) -> &'static str {
        match self {
            InteractionSource::Reactome => "reactome",
            InteractionSource::String => "string",
        }
    }
}

/// Fetches every disease associated with the target, across all pages.
pub async fn fetch_associations<E>(
    executor: &E,
    ensembl_id: &str,
    aggregation_filters: Option<Value>,
    settings: BatchSettings,
) -> Result<Vec<DiseaseAssociation>, FetchError>
where
    E: QueryExecutor + ?Sized,
{
    info!("Fetching disease associations for '{}'...", ensembl_id);
    let mut variables = Map::new();
    variables.insert("ensemblId".to_string(), Value::from(ensembl_id));
    variables.insert("aggregationFilters".to_string(), aggregation_filters.unwrap_or(Value::Null));

    let result = BatchAggregator::new(executor, ASSOCIATIONS_QUERY, variables, ASSOCIATIONS_PATH)
        .with_settings(settings)
        .fetch_all::<DiseaseAssociation>()
        .await?;
    info!("Fetched {} disease associations for '{}'.", result.items.len(), ensembl_id);
    Ok(result.items)
}

/// Fetches every interaction partner of the target reported by one source.
pub async fn fetch_interactions<E>(
    executor: &E,
    ensembl_id: &str,
    source: InteractionSource,
    settings: BatchSettings,
) -> Result<Vec<Interaction>, FetchError>
where
    E: QueryExecutor + ?Sized,
{
    info!("Fetching {} interactions for '{}'...", source.id(), ensembl_id);
    let mut variables = Map::new();
    variables.insert("ensgId".to_string(), Value::from(ensembl_id));
    variables.insert("sourceDatabase".to_string(), Value::from(source.id()));

    let result = BatchAggregator::new(executor, INTERACTIONS_QUERY, variables, INTERACTIONS_PATH)
        .with_settings(settings)
        .fetch_all::<Interaction>()
        .await?;
    info!(
        "Fetched {} {} interactions for '{}'.",
        result.items.len(),
        source.id(),
        ensembl_id
    );
    Ok(result.items)
}

pub async fn fetch_safety<E>(executor: &E, ensembl_id: &str) -> Result<SafetyProfile, FetchError>
where
    E: QueryExecutor + ?Sized,
{
    info!("Fetching safety profile for '{}'...", ensembl_id);
    let mut variables = Map::new();
    variables.insert("ensgId".to_string(), Value::from(ensembl_id));
    fetch_at_path(executor, SAFETY_QUERY, &variables, SAFETY_PATH).await
}

pub async fn fetch_pathways<E>(executor: &E, ensembl_id: &str) -> Result<Pathways, FetchError>
where
    E: QueryExecutor + ?Sized,
{
    info!("Fetching pathways for '{}'...", ensembl_id);
    let mut variables = Map::new();
    variables.insert("ensgId".to_string(), Value::from(ensembl_id));
    fetch_at_path(executor, PATHWAYS_QUERY, &variables, PATHWAYS_PATH).await
}

/// Genetic evidence sources read from the disease side for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneticSource {
    PhewasCatalog,
    Gene2Phenotype,
    IntOgen,
}

impl GeneticSource {
    pub fn query(self) -> &'static str {
        match self {
            GeneticSource::PhewasCatalog => PHEWAS_QUERY,
            GeneticSource::Gene2Phenotype => GENE2PHENOTYPE_QUERY,
            GeneticSource::IntOgen => INTOGEN_QUERY,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GeneticSource::PhewasCatalog => "PheWAS Catalog",
            GeneticSource::Gene2Phenotype => "Gene2Phenotype",
            GeneticSource::IntOgen => "IntOGen",
        }
    }
}

async fn fetch_evidence_rows<E, T>(
    executor: &E,
    source: GeneticSource,
    ensembl_id: &str,
    efo_id: &str,
    size: usize,
) -> Result<Vec<T>, FetchError>
where
    E: QueryExecutor + ?Sized,
    T: DeserializeOwned,
{
    if size == 0 {
        return Err(FetchError::InvalidPageSize);
    }
    info!("Fetching {} evidence for '{}' and '{}'...", source.label(), ensembl_id, efo_id);
    let mut variables = Map::new();
    variables.insert("ensemblId".to_string(), Value::from(ensembl_id));
    variables.insert("efoId".to_string(), Value::from(efo_id));
    variables.insert("size".to_string(), Value::from(size));
    let rows: Vec<T> = fetch_at_path(executor, source.query(), &variables, EVIDENCE_ROWS_PATH).await?;
    info!("Fetched {} {} evidence rows.", rows.len(), source.label());
    Ok(rows)
}

pub async fn fetch_phewas<E>(executor: &E, ensembl_id: &str, efo_id: &str, size: usize) -> Result<Vec<PhewasEvidence>, FetchError>
where
    E: QueryExecutor + ?Sized,
{
    fetch_evidence_rows(executor, GeneticSource::PhewasCatalog, ensembl_id, efo_id, size).await
}

pub async fn fetch_gene2phenotype<E>(
    executor: &E,
    ensembl_id: &str,
    efo_id: &str,
    size: usize,
) -> Result<Vec<Gene2PhenotypeEvidence>, FetchError>
where
    E: QueryExecutor + ?Sized,
{
    fetch_evidence_rows(executor, GeneticSource::Gene2Phenotype, ensembl_id, efo_id, size).await
}

pub async fn fetch_intogen<E>(executor: &E, ensembl_id: &str, efo_id: &str, size: usize) -> Result<Vec<IntOgenEvidence>, FetchError>
where
    E: QueryExecutor + ?Sized,
{
    fetch_evidence_rows(executor, GeneticSource::IntOgen, ensembl_id, efo_id, size).await
}
