use anyhow::{anyhow, Result};
use chrono::Local;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use evidence_export::api_client;
use evidence_export::batch_aggregator::BatchSettings;
use evidence_export::color_scale::QuantizeScale;
use evidence_export::columns;
use evidence_export::data_fetch;
use evidence_export::env_loader;
use evidence_export::error::FetchError;
use evidence_export::excel_writer::{self, ExportSummary, SheetData};
use evidence_export::ontology::OntologySources;
use evidence_export::projection::project;
use evidence_export::view_scope::ViewScope;
use evidence_export::views::{AssociationsView, ReactomeInteractionsView, StringInteractionsView};

#[tokio::main]
async fn main() -> Result<()> {
    env_loader::load_env();
    env_logger::init();

    info!("Starting evidence export.");

    let args: Vec<String> = std::env::args().collect();
    let ensembl_id = args
        .get(1)
        .cloned()
        .ok_or_else(|| anyhow!("Usage: evidence-export <ENSEMBL_ID> [SYMBOL] [REACTOME_ROW] [EFO_ID]"))?;
    let symbol = args.get(2).cloned().unwrap_or_else(|| ensembl_id.clone());
    let reactome_row = args.get(3).and_then(|v| v.parse::<usize>().ok());
    // Genetic evidence is per target-disease pair and only fetched when a disease is given.
    let efo_id = args.get(4).cloned();

    let client = api_client::connect(api_client::build_client_config()).await?;
    info!("Platform API client ready.");

    let mut settings = BatchSettings::from_env();
    settings.show_progress = true;
    let sources = OntologySources::from_env();

    // Ctrl-C tears the views down; anything still in flight is discarded.
    let scope = ViewScope::new();
    {
        let scope = scope.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, discarding in-flight loads");
                scope.dispose();
            }
        });
    }

    let mut associations = AssociationsView::new(ensembl_id.clone(), None);
    let mut reactome = ReactomeInteractionsView::new(ensembl_id.clone());
    let mut string = StringInteractionsView::new(ensembl_id.clone());

    let (assoc_res, reactome_res, string_res, safety_res, pathways_res) = tokio::join!(
        associations.load(&client, &sources, settings, &scope),
        reactome.load(&client, settings, &scope),
        string.load(&client, settings, &scope),
        scope.run(data_fetch::fetch_safety(&client, &ensembl_id)),
        scope.run(data_fetch::fetch_pathways(&client, &ensembl_id)),
    );

    let genetic = match &efo_id {
        Some(efo_id) => Some(tokio::join!(
            scope.run(data_fetch::fetch_phewas(&client, &ensembl_id, efo_id, settings.page_size)),
            scope.run(data_fetch::fetch_gene2phenotype(&client, &ensembl_id, efo_id, settings.page_size)),
            scope.run(data_fetch::fetch_intogen(&client, &ensembl_id, efo_id, settings.page_size)),
        )),
        None => None,
    };

    if scope.is_disposed() {
        return Err(anyhow!("Export interrupted before all views finished loading"));
    }
    report_failure("associations", assoc_res.err());
    report_failure("Reactome interactions", reactome_res.err());
    report_failure("STRING interactions", string_res.err());
    let safety = safety_res.map_err(|e| report_failure("safety", Some(e))).ok();
    let pathways = pathways_res.map_err(|e| report_failure("pathways", Some(e))).ok();

    if let Some(index) = reactome_row {
        if reactome.select_row(index).is_none() {
            warn!("Reactome row {} does not exist, keeping the first row selected", index);
        }
    }

    // Views that failed to load render nothing.
    let scale = Arc::new(QuantizeScale::default());
    let mut sheets = Vec::new();
    if associations.is_loaded() {
        sheets.push(SheetData::new("Associations", associations.projection(Arc::clone(&scale))));
    }
    if string.is_loaded() {
        sheets.push(SheetData::new("STRING interactions", string.projection(Arc::clone(&scale))));
    }
    if reactome.is_loaded() {
        sheets.push(SheetData::new("Reactome interactions", reactome.master_projection()));
        sheets.push(SheetData::new("Reactome evidence", reactome.detail_projection()));
    }
    if let Some(safety) = &safety {
        sheets.push(SheetData::new(
            "Safety effects",
            project(&safety.adverse_effects, &columns::safety_effect_download_columns()),
        ));
        sheets.push(SheetData::new(
            "Safety risks",
            project(&safety.safety_risk_info, &columns::safety_risk_download_columns()),
        ));
    }
    if let Some(pathways) = &pathways {
        sheets.push(SheetData::new(
            "Top-level pathways",
            project(&pathways.top_level_pathways, &columns::top_level_pathway_columns()),
        ));
        sheets.push(SheetData::new(
            "Pathways",
            project(&pathways.low_level_pathways, &columns::low_level_pathway_columns()),
        ));
    }

    if let Some((phewas, gene2phenotype, intogen)) = genetic {
        match phewas {
            Ok(rows) => sheets.push(SheetData::new("PheWAS Catalog", project(&rows, &columns::phewas_columns()))),
            Err(e) => report_failure("PheWAS Catalog", Some(e)),
        }
        match gene2phenotype {
            Ok(rows) => sheets.push(SheetData::new(
                "Gene2Phenotype",
                project(&rows, &columns::gene2phenotype_columns()),
            )),
            Err(e) => report_failure("Gene2Phenotype", Some(e)),
        }
        match intogen {
            Ok(rows) => sheets.push(SheetData::new("IntOGen", project(&rows, &columns::intogen_columns()))),
            Err(e) => report_failure("IntOGen", Some(e)),
        }
    }

    if sheets.is_empty() {
        return Err(anyhow!("No view loaded for '{}', nothing to export", ensembl_id));
    }

    let timestamp_suffix = Local::now().format("%Y%m%d%H%M%S").to_string();
    let export_file_path = PathBuf::from(format!("{}_evidence_export_{}.xlsx", symbol, timestamp_suffix));
    let summary = ExportSummary {
        target_id: ensembl_id.clone(),
        symbol: symbol.clone(),
    };

    info!("Writing {} tables to Excel file: {:?}", sheets.len(), export_file_path);
    excel_writer::write_excel_file(&export_file_path, &sheets, Some(&summary))?;
    info!("Export for {} ({}) completed successfully.", symbol, ensembl_id);

    println!("\n📊 Evidence for {} exported to {:?}", symbol, export_file_path);
    Ok(())
}

fn report_failure(view: &str, error: Option<FetchError>) {
    if let Some(e) = error {
        warn!("Failed to load {} view, it will be left out of the export: {}", view, e);
    }
}
