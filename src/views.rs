//! Per-view state holders.
//!
//! Each view owns its state exclusively and only writes it after a load has
//! fully succeeded inside a live [`ViewScope`]. A failed or disposed load leaves
//! the view empty, so renderers never see partial data.

use log::{info, warn};
use serde_json::Value;
use std::sync::Arc;

use crate::api_client::{QueryExecutor, ResourceFetcher};
use crate::batch_aggregator::BatchSettings;
use crate::color_scale::QuantizeScale;
use crate::columns;
use crate::data_fetch::{self, InteractionSource};
use crate::error::FetchError;
use crate::models::{AssociationRow, DiseaseAssociation, Interaction, InteractionEvidence};
use crate::ontology::{self, Ontology, OntologySources};
use crate::projection::{project, CategoryVocabulary, TableProjection};
use crate::selection::MasterDetailSelection;
use crate::view_scope::ViewScope;

struct AssociationsState {
    associations: Vec<DiseaseAssociation>,
    ontology: Ontology,
}

/// Disease associations of one target laid over the disease ontology.
pub struct AssociationsView {
    ensembl_id: String,
    aggregation_filters: Option<Value>,
    vocabulary: CategoryVocabulary,
    state: Option<AssociationsState>,
}

impl AssociationsView {
    pub fn new(ensembl_id: impl Into<String>, aggregation_filters: Option<Value>) -> Self {
        AssociationsView {
            ensembl_id: ensembl_id.into(),
            aggregation_filters,
            vocabulary: columns::data_type_vocabulary(),
            state: None,
        }
    }

    /// Loads the ontology resources and all association pages together.
    pub async fn load<C>(
        &mut self,
        client: &C,
        sources: &OntologySources,
        settings: BatchSettings,
        scope: &ViewScope,
    ) -> Result<(), FetchError>
    where
        C: QueryExecutor + ResourceFetcher + ?Sized,
    {
        let ensembl_id = self.ensembl_id.clone();
        let filters = self.aggregation_filters.clone();
        let (ontology, associations) = scope
            .run(async {
                let loaded = tokio::try_join!(
                    async { ontology::load_ontology(client, sources).await.map_err(FetchError::from) },
                    data_fetch::fetch_associations(client, &ensembl_id, filters, settings),
                )?;
                Ok(loaded)
            })
            .await?;

        info!(
            "Associations view for '{}' loaded {} rows over {} ontology nodes",
            self.ensembl_id,
            associations.len(),
            ontology.nodes.len()
        );
        self.state = Some(AssociationsState { associations, ontology });
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_some()
    }

    pub fn ontology(&self) -> Option<&Ontology> {
        self.state.as_ref().map(|s| &s.ontology)
    }

    pub fn rows(&self) -> Vec<AssociationRow> {
        let Some(state) = &self.state else {
            return Vec::new();
        };
        let graph = state.ontology.graph();
        if graph.has_cycle() {
            warn!("Ontology graph contains a cycle; therapeutic areas may be incomplete");
        }
        columns::association_rows(
            &state.associations,
            &self.ensembl_id,
            &self.vocabulary,
            Some((&graph, state.ontology.therapeutic_areas.as_slice())),
        )
    }

    pub fn projection(&self, scale: Arc<QuantizeScale>) -> TableProjection {
        project(&self.rows(), &columns::association_columns(&self.vocabulary, scale))
    }
}

/// Reactome interactions: a partner table driving an evidence table.
pub struct ReactomeInteractionsView {
    ensembl_id: String,
    selection: Option<MasterDetailSelection<Interaction>>,
}

impl ReactomeInteractionsView {
    pub fn new(ensembl_id: impl Into<String>) -> Self {
        ReactomeInteractionsView {
            ensembl_id: ensembl_id.into(),
            selection: None,
        }
    }

    pub async fn load<E>(&mut self, executor: &E, settings: BatchSettings, scope: &ViewScope) -> Result<(), FetchError>
    where
        E: QueryExecutor + ?Sized,
    {
        let rows = scope
            .run(data_fetch::fetch_interactions(
                executor,
                &self.ensembl_id,
                InteractionSource::Reactome,
                settings,
            ))
            .await?;
        self.selection = Some(MasterDetailSelection::new(rows));
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.selection.is_some()
    }

    pub fn selection(&self) -> Option<&MasterDetailSelection<Interaction>> {
        self.selection.as_ref()
    }

    /// Selects a partner row; returns `None` when nothing is loaded or the index is out of range.
    pub fn select_row(&mut self, index: usize) -> Option<&[InteractionEvidence]> {
        self.selection.as_mut()?.select_row(index)
    }

    pub fn master_projection(&self) -> TableProjection {
        let rows = self.selection.as_ref().map(|s| s.rows()).unwrap_or(&[]);
        project(rows, &columns::reactome_interaction_columns())
    }

    pub fn detail_projection(&self) -> TableProjection {
        let details = self
            .selection
            .as_ref()
            .map(|s| s.current_detail_rows())
            .unwrap_or(&[]);
        project(details, &columns::reactome_evidence_columns())
    }
}

/// STRING interactions rendered as a heatmap of per-method scores.
pub struct StringInteractionsView {
    ensembl_id: String,
    rows: Option<Vec<Interaction>>,
}

impl StringInteractionsView {
    pub fn new(ensembl_id: impl Into<String>) -> Self {
        StringInteractionsView {
            ensembl_id: ensembl_id.into(),
            rows: None,
        }
    }

    pub async fn load<E>(&mut self, executor: &E, settings: BatchSettings, scope: &ViewScope) -> Result<(), FetchError>
    where
        E: QueryExecutor + ?Sized,
    {
        let rows = scope
            .run(data_fetch::fetch_interactions(
                executor,
                &self.ensembl_id,
                InteractionSource::String,
                settings,
            ))
            .await?;
        self.rows = Some(rows);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.rows.is_some()
    }

    pub fn projection(&self, scale: Arc<QuantizeScale>) -> TableProjection {
        project(self.rows.as_deref().unwrap_or(&[]), &columns::string_heatmap_columns(scale))
    }
}
