use regex::Regex;
use std::sync::{Arc, LazyLock};

use crate::color_scale::QuantizeScale;
use crate::models::{
    AdverseEffect, AssociationRow, DataTypeScore, DetectionMethod, DiseaseAssociation, DiseaseRef, EffectGroup,
    Gene2PhenotypeEvidence, IntOgenEvidence, Interaction, InteractionEvidence, LowLevelPathway, OrganSystem,
    PhewasEvidence, SafetyReference, SafetyRisk, TopLevelPathway,
};
use crate::ontology::OntologyGraph;
use crate::projection::{find_score, Category, CategoryVocabulary, ColumnDef, DisplayValue, Link, NA_LABEL};

static WORD_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+|([a-z0-9])([A-Z])").expect("valid separator pattern"));

/// `ACUTE_DOSING` and `acuteDosing` both become `Acute dosing`.
pub fn humanize_key(key: &str) -> String {
    let spaced = WORD_SEPARATOR.replace_all(key, |caps: &regex::Captures| match (caps.get(1), caps.get(2)) {
        (Some(lower), Some(upper)) => format!("{} {}", lower.as_str(), upper.as_str()),
        _ => " ".to_string(),
    });
    let lowered = spaced.trim().to_lowercase();
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `DEVELOPMENTAL disorder` becomes `Developmental disorder`.
pub fn sentence_case(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn disease_url(id: &str) -> String {
    format!("https://platform.opentargets.org/disease/{}", id)
}

fn disease_link(disease: &DiseaseRef) -> DisplayValue {
    DisplayValue::Link(Link::new(&disease.name, disease_url(&disease.id)))
}

fn number_or_na(value: Option<f64>) -> DisplayValue {
    match value {
        Some(n) if n.is_finite() => DisplayValue::Number(n),
        _ => DisplayValue::text(NA_LABEL),
    }
}

fn epmc_url(pubmed_id: &str) -> String {
    format!("https://europepmc.org/article/MED/{}", pubmed_id)
}

// ---- Disease associations ----

/// Association data types in display order, paired with the component ids the API reports.
pub const DATA_TYPES: [(&str, &str, &str); 7] = [
    ("TEXT_MINING", "literature", "Text mining"),
    ("DIFFERENTIAL_EXPRESSION", "rna_expression", "RNA expression"),
    ("GENETIC_ASSOCIATION", "genetic_association", "Genetic associations"),
    ("SOMATIC_MUTATION", "somatic_mutation", "Somatic mutations"),
    ("KNOWN_DRUGS", "known_drug", "Drugs"),
    ("ANIMAL_MODELS", "animal_model", "Animal models"),
    ("PATHWAYS", "affected_pathway", "Pathways & systems biology"),
];

pub fn data_type_vocabulary() -> CategoryVocabulary {
    let categories = DATA_TYPES
        .iter()
        .map(|(id, key, label)| Category {
            id: id.to_string(),
            key: key.to_string(),
            label: label.to_string(),
        })
        .collect();
    CategoryVocabulary::new(categories, 0.0)
}

/// Shapes raw associations into rows with one score per data type and their therapeutic areas.
pub fn association_rows(
    associations: &[DiseaseAssociation],
    target_id: &str,
    vocabulary: &CategoryVocabulary,
    ontology: Option<(&OntologyGraph, &[String])>,
) -> Vec<AssociationRow> {
    associations
        .iter()
        .map(|assoc| AssociationRow {
            disease: assoc.disease.clone(),
            target_id: target_id.to_string(),
            score: assoc.score,
            scores_by_data_type: vocabulary
                .resolve_all(&assoc.datatype_scores)
                .into_iter()
                .map(|(data_type_id, score)| DataTypeScore { data_type_id, score })
                .collect(),
            therapeutic_areas: ontology
                .map(|(graph, areas)| graph.therapeutic_areas_of(&assoc.disease.id, areas))
                .unwrap_or_default(),
        })
        .collect()
}

pub fn association_columns(vocabulary: &CategoryVocabulary, scale: Arc<QuantizeScale>) -> Vec<ColumnDef<AssociationRow>> {
    let mut columns = vec![
        ColumnDef::new("disease", "Disease", |r: &AssociationRow| DisplayValue::text(&r.disease.name)),
        ColumnDef::new("diseaseId", "Disease ID", |r: &AssociationRow| {
            DisplayValue::Link(Link::new(&r.disease.id, disease_url(&r.disease.id)))
        }),
        {
            let scale = Arc::clone(&scale);
            ColumnDef::new("score", "Overall association score", move |r: &AssociationRow| {
                DisplayValue::heat(&*scale, Some(r.score))
            })
        },
    ];
    for category in vocabulary.categories() {
        let scale = Arc::clone(&scale);
        let data_type_id = category.id.clone();
        let default_score = vocabulary.default_score();
        columns.push(ColumnDef::new(category.id.clone(), category.label.clone(), move |r: &AssociationRow| {
            let score = r
                .scores_by_data_type
                .iter()
                .find(|s| s.data_type_id == data_type_id)
                .map(|s| s.score)
                .unwrap_or(default_score);
            DisplayValue::heat(&*scale, Some(score))
        }));
    }
    columns.push(ColumnDef::new("therapeuticAreas", "Therapeutic areas", |r: &AssociationRow| {
        DisplayValue::List(r.therapeutic_areas.clone())
    }));
    columns
}

// ---- STRING interaction heatmap ----

/// Evidence method columns as (column id, label, detection method short name).
pub const STRING_METHODS: [(&str, &str, &str); 8] = [
    ("neighbourhood", "Neighbourhood", "gene neighbourhood"),
    ("geneFusion", "Gene fusion", "domain fusion"),
    ("occurance", "Co-occurrance", "cooccurence"),
    ("expression", "Co-expression", "coexpression"),
    ("experiments", "Experiments", "experimental"),
    ("databases", "Databases", "database"),
    ("textMining", "Text mining", "text mining"),
    ("homology", "Homology", "by homology"),
];

pub fn string_heatmap_columns(scale: Arc<QuantizeScale>) -> Vec<ColumnDef<Interaction>> {
    let mut columns = vec![
        ColumnDef::new("partner", "Interactor B", |r: &Interaction| DisplayValue::text(r.partner_label())),
        {
            let scale = Arc::clone(&scale);
            ColumnDef::new("overallScore", "Overall interaction score", move |r: &Interaction| {
                DisplayValue::heat(&*scale, r.score)
            })
        },
    ];
    for (id, label, method) in STRING_METHODS {
        let scale = Arc::clone(&scale);
        columns.push(ColumnDef::new(id, label, move |r: &Interaction| {
            DisplayValue::heat(&*scale, find_score(&r.evidences, method))
        }));
    }
    columns
}

// ---- Reactome interactions (master) and evidence (detail) ----

pub fn reactome_interaction_columns() -> Vec<ColumnDef<Interaction>> {
    vec![
        ColumnDef::new("targetB", "Interactor B", |r: &Interaction| DisplayValue::text(r.partner_label())),
        ColumnDef::new("species", "Species", |r: &Interaction| {
            DisplayValue::text_or_na(r.species_b.as_ref().and_then(|s| s.mnemonic.as_deref()))
        }),
        ColumnDef::new("altId", "Alt ID", |r: &Interaction| match r.int_b.as_deref() {
            Some(id) => DisplayValue::Link(Link::new(id, format!("http://uniprot.org/uniprot/{}", id))),
            None => DisplayValue::text(NA_LABEL),
        }),
        ColumnDef::new("sizeEvidences", "Interaction evidence", |r: &Interaction| match r.count {
            Some(count) => DisplayValue::Integer(count),
            None => DisplayValue::Integer(r.evidences.len() as i64),
        }),
    ]
}

fn method_names(methods: &[DetectionMethod]) -> Vec<String> {
    methods.iter().filter_map(|m| m.short_name.clone()).collect()
}

pub fn reactome_evidence_columns() -> Vec<ColumnDef<InteractionEvidence>> {
    vec![
        ColumnDef::new("interactionIdentifier", "ID", |e: &InteractionEvidence| {
            match e.interaction_identifier.as_deref() {
                Some(id) => DisplayValue::Link(Link::new(id, format!("https://reactome.org/content/detail/{}", id))),
                None => DisplayValue::text(NA_LABEL),
            }
        }),
        ColumnDef::new("interaction", "Interaction", |e: &InteractionEvidence| {
            DisplayValue::text_or_na(e.interaction_type_short_name.as_deref())
        }),
        ColumnDef::new("hostOrganism", "Host organism", |e: &InteractionEvidence| {
            DisplayValue::text_or_na(e.host_organism_scientific_name.as_deref())
        }),
        ColumnDef::new("methods", "Detection methods", |e: &InteractionEvidence| {
            let mut parts = Vec::new();
            let a = method_names(&e.participant_detection_method_a);
            if !a.is_empty() {
                parts.push(format!("A: {}", a.join(", ")));
            }
            if let Some(method) = &e.interaction_detection_method_short_name {
                parts.push(format!("Interaction: {}", method));
            }
            let b = method_names(&e.participant_detection_method_b);
            if !b.is_empty() {
                parts.push(format!("B: {}", b.join(", ")));
            }
            if let Some(expansion) = &e.expansion_method_short_name {
                parts.push(format!("Expansion: {}", expansion));
            }
            DisplayValue::List(parts)
        }),
        ColumnDef::new("pubmedId", "Publication", |e: &InteractionEvidence| match e.pubmed_id.as_deref() {
            Some(id) if !id.contains("unassigned") => {
                DisplayValue::Link(Link::new(id, format!("http://europepmc.org/abstract/MED/{}", id)))
            }
            Some(id) => DisplayValue::text(id),
            None => DisplayValue::Empty,
        }),
    ]
}

// ---- Safety ----

fn coded_organs(organs: &[OrganSystem], term: fn(&OrganSystem) -> Option<&String>) -> DisplayValue {
    DisplayValue::List(
        organs
            .iter()
            .filter(|o| o.code.is_some())
            .filter_map(|o| term(o).cloned())
            .collect(),
    )
}

fn effect_groups(groups: &[EffectGroup]) -> DisplayValue {
    DisplayValue::List(
        groups
            .iter()
            .filter(|g| !g.terms.is_empty())
            .map(|g| format!("{}: {}", humanize_key(&g.group_key), g.terms.join(", ")))
            .collect(),
    )
}

fn reference_links(references: &[SafetyReference]) -> DisplayValue {
    DisplayValue::Links(
        references
            .iter()
            .filter(|r| r.pubmed_id.is_some() || r.ref_link.is_some())
            .map(|r| {
                let label = r
                    .ref_label
                    .clone()
                    .or_else(|| r.pubmed_id.as_ref().map(|id| format!("Pubmed ID: {}", id)))
                    .unwrap_or_else(|| "(no name)".to_string());
                let url = r.pub_url.clone().or_else(|| r.ref_link.clone()).unwrap_or_default();
                Link::new(label, url)
            })
            .collect(),
    )
}

pub fn safety_effect_columns() -> Vec<ColumnDef<AdverseEffect>> {
    vec![
        ColumnDef::new("organs_systems_affected", "Main organs & systems affected", |r: &AdverseEffect| {
            coded_organs(&r.organs_systems_affected, |o| o.mapped_term.as_ref())
        }),
        ColumnDef::new("activation_effects", "Agonism or activation effects", |r: &AdverseEffect| {
            effect_groups(&r.activation_effects)
        }),
        ColumnDef::new("inhibition_effects", "Antagonism or inhibition effects", |r: &AdverseEffect| {
            effect_groups(&r.inhibition_effects)
        }),
        ColumnDef::new("references", "Publications", |r: &AdverseEffect| reference_links(&r.references)),
    ]
}

pub fn safety_risk_columns() -> Vec<ColumnDef<SafetyRisk>> {
    vec![
        ColumnDef::new("organs_systems_affected", "Main organs & systems affected", |r: &SafetyRisk| {
            coded_organs(&r.organs_systems_affected, |o| o.preferred_term.as_ref())
        }),
        ColumnDef::new("safety_liability", "Safety liability information", |r: &SafetyRisk| {
            DisplayValue::text_or_na(r.safety_liability.as_deref())
        }),
        ColumnDef::new("references", "Publications", |r: &SafetyRisk| reference_links(&r.references)),
    ]
}

/// Download shape of the adverse effects table: every organ's preferred term,
/// effect terms flattened across groups and every reference URL.
pub fn safety_effect_download_columns() -> Vec<ColumnDef<AdverseEffect>> {
    vec![
        ColumnDef::new("organs_systems_affected", "Main organs & systems affected", |r: &AdverseEffect| {
            preferred_terms(&r.organs_systems_affected)
        }),
        ColumnDef::new("activation_effects", "Agonism or activation effects", |r: &AdverseEffect| {
            flattened_terms(&r.activation_effects)
        }),
        ColumnDef::new("inhibition_effects", "Antagonism or inhibition effects", |r: &AdverseEffect| {
            flattened_terms(&r.inhibition_effects)
        }),
        ColumnDef::new("references", "Publications", |r: &AdverseEffect| reference_urls(&r.references)),
    ]
}

pub fn safety_risk_download_columns() -> Vec<ColumnDef<SafetyRisk>> {
    vec![
        ColumnDef::new("organs_systems_affected", "Main organs & systems affected", |r: &SafetyRisk| {
            preferred_terms(&r.organs_systems_affected)
        }),
        ColumnDef::new("safety_liability", "Safety liability information", |r: &SafetyRisk| {
            match r.safety_liability.as_deref() {
                Some(text) => DisplayValue::text(text),
                None => DisplayValue::Empty,
            }
        }),
        ColumnDef::new("references", "Publications", |r: &SafetyRisk| reference_urls(&r.references)),
    ]
}

fn preferred_terms(organs: &[OrganSystem]) -> DisplayValue {
    DisplayValue::List(organs.iter().filter_map(|o| o.preferred_term.clone()).collect())
}

fn flattened_terms(groups: &[EffectGroup]) -> DisplayValue {
    DisplayValue::List(groups.iter().flat_map(|g| g.terms.iter().cloned()).collect())
}

fn reference_urls(references: &[SafetyReference]) -> DisplayValue {
    DisplayValue::List(references.iter().filter_map(|r| r.pub_url.clone()).collect())
}

// ---- Genetic evidence ----

pub fn phewas_columns() -> Vec<ColumnDef<PhewasEvidence>> {
    vec![
        ColumnDef::new("disease", "Disease/phenotype", |e: &PhewasEvidence| disease_link(&e.disease)),
        ColumnDef::new("diseaseFromSource", "Reported disease/phenotype [Phecode]", |e: &PhewasEvidence| {
            DisplayValue::text_or_na(e.disease_from_source.as_deref())
        }),
        ColumnDef::new("variantRsId", "Variant", |e: &PhewasEvidence| match e.variant_rs_id.as_deref() {
            Some(rs_id) => DisplayValue::Link(Link::new(rs_id, format!("https://identifiers.org/ncbi/DBSNP:{}", rs_id))),
            None => DisplayValue::text(NA_LABEL),
        }),
        ColumnDef::new("variantFunctionalConsequence", "Functional consequence", |e: &PhewasEvidence| {
            match &e.variant_functional_consequence {
                Some(consequence) => {
                    let label = consequence.label.as_deref().map(sentence_case).unwrap_or_default();
                    let accession = consequence.id.get(3..).unwrap_or_default();
                    DisplayValue::Link(Link::new(label, format!("https://identifiers.org/SO:{}", accession)))
                }
                None => DisplayValue::text(NA_LABEL),
            }
        }),
        ColumnDef::new("studyCases", "Cases", |e: &PhewasEvidence| match e.study_cases {
            Some(cases) => DisplayValue::Integer(cases),
            None => DisplayValue::text(NA_LABEL),
        }),
        ColumnDef::new("oddsRatio", "Odds ratio", |e: &PhewasEvidence| number_or_na(e.odds_ratio)),
        ColumnDef::new("resourceScore", "P-value", |e: &PhewasEvidence| number_or_na(e.resource_score)),
    ]
}

pub fn gene2phenotype_columns() -> Vec<ColumnDef<Gene2PhenotypeEvidence>> {
    vec![
        ColumnDef::new("disease", "Disease/phenotype", |e: &Gene2PhenotypeEvidence| disease_link(&e.disease)),
        ColumnDef::new("diseaseFromSource", "Reported disease/phenotype", |e: &Gene2PhenotypeEvidence| {
            match e.disease_from_source.as_deref() {
                Some(name) => DisplayValue::text(sentence_case(name)),
                None => DisplayValue::text(NA_LABEL),
            }
        }),
        ColumnDef::new("allelicRequirements", "Allelic requirement", |e: &Gene2PhenotypeEvidence| {
            match &e.allelic_requirements {
                Some(requirements) => DisplayValue::List(requirements.clone()),
                None => DisplayValue::text(NA_LABEL),
            }
        }),
        ColumnDef::new("confidence", "Confidence", |e: &Gene2PhenotypeEvidence| {
            let symbol = e.target.as_ref().and_then(|t| t.approved_symbol.as_deref());
            match (e.confidence.as_deref(), symbol) {
                (Some(confidence), Some(symbol)) => DisplayValue::Link(Link::new(
                    confidence,
                    format!("https://www.ebi.ac.uk/gene2phenotype/search?panel=ALL&search_term={}", symbol),
                )),
                _ => DisplayValue::text(NA_LABEL),
            }
        }),
        ColumnDef::new("literature", "Literature", |e: &Gene2PhenotypeEvidence| {
            DisplayValue::Links(
                e.literature
                    .iter()
                    .filter(|id| id.as_str() != "NA")
                    .map(|id| Link::new(id, epmc_url(id)))
                    .collect(),
            )
        }),
    ]
}

pub fn intogen_columns() -> Vec<ColumnDef<IntOgenEvidence>> {
    vec![
        ColumnDef::new("disease", "Disease/phenotype", |e: &IntOgenEvidence| disease_link(&e.disease)),
        ColumnDef::new("numberMutatedSamples", "Mutated / Total samples", |e: &IntOgenEvidence| {
            let first = e.variations.first();
            match first.map(|v| (v.number_mutated_samples, v.number_samples_tested)) {
                Some((Some(mutated), Some(tested))) if mutated != 0 && tested != 0 => {
                    DisplayValue::text(format!("{}/{}", mutated, tested))
                }
                _ => DisplayValue::text(NA_LABEL),
            }
        }),
        ColumnDef::new("resourceScore", "Combined p-value", |e: &IntOgenEvidence| number_or_na(e.resource_score)),
        ColumnDef::new("significantDriverMethods", "Cancer driver methods", |e: &IntOgenEvidence| {
            match &e.significant_driver_methods {
                Some(methods) => DisplayValue::List(methods.clone()),
                None => DisplayValue::text(NA_LABEL),
            }
        }),
        ColumnDef::new("cohortShortName", "Cohort information", |e: &IntOgenEvidence| {
            match (e.cohort_short_name.as_deref(), e.cohort_description.as_deref()) {
                (Some(short_name), Some(description)) if !short_name.is_empty() && !description.is_empty() => {
                    DisplayValue::Link(Link::new(
                        format!("{} {}", short_name, description),
                        format!(
                            "https://www.intogen.org/search?gene={}&cohort={}",
                            e.target_symbol().unwrap_or_default(),
                            e.cohort_id.as_deref().unwrap_or_default()
                        ),
                    ))
                }
                _ => DisplayValue::text(NA_LABEL),
            }
        }),
    ]
}

// ---- Pathways ----

pub fn top_level_pathway_columns() -> Vec<ColumnDef<TopLevelPathway>> {
    vec![
        ColumnDef::new("name", "Top-level pathway", |p: &TopLevelPathway| DisplayValue::text(&p.name)),
        ColumnDef::new("id", "Reactome ID", |p: &TopLevelPathway| DisplayValue::text(&p.id)),
        ColumnDef::new("isAssociated", "Associated", |p: &TopLevelPathway| DisplayValue::Bool(p.is_associated)),
    ]
}

pub fn low_level_pathway_columns() -> Vec<ColumnDef<LowLevelPathway>> {
    vec![
        ColumnDef::new("name", "Pathway", |p: &LowLevelPathway| DisplayValue::text(&p.name)),
        ColumnDef::new("id", "Reactome ID", |p: &LowLevelPathway| {
            DisplayValue::Link(Link::new(&p.id, format!("https://reactome.org/content/detail/{}", p.id)))
        }),
        ColumnDef::new("parents", "Top-level pathway", |p: &LowLevelPathway| {
            DisplayValue::List(p.parents.iter().map(|parent| parent.name.clone()).collect())
        }),
        ColumnDef::new("diagram", "View diagram", |p: &LowLevelPathway| {
            DisplayValue::Links(vec![
                Link::new("SVG", format!("https://reactome.org/ContentService/exporter/diagram/{}.svg", p.id)),
                Link::new("PNG", format!("https://reactome.org/ContentService/exporter/diagram/{}.png", p.id)),
            ])
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DatatypeScore, Species, TargetRef};
    use crate::projection::project;

    fn evidence(method: &str, score: Option<f64>) -> InteractionEvidence {
        InteractionEvidence {
            interaction_detection_method_short_name: Some(method.to_string()),
            evidence_score: score,
            ..Default::default()
        }
    }

    #[test]
    fn humanize_handles_snake_and_camel_case() {
        assert_eq!(humanize_key("ACUTE_DOSING"), "Acute dosing");
        assert_eq!(humanize_key("chronicDosing"), "Chronic dosing");
        assert_eq!(humanize_key("developmental"), "Developmental");
        assert_eq!(humanize_key(""), "");
    }

    #[test]
    fn association_rows_fill_missing_data_types_with_zero() {
        let assoc = DiseaseAssociation {
            disease: DiseaseRef {
                id: "EFO_1".into(),
                name: "asthma".into(),
            },
            score: 0.7,
            datatype_scores: vec![DatatypeScore {
                component_id: "literature".into(),
                score: Some(0.4),
            }],
        };
        let rows = association_rows(&[assoc], "ENSG1", &data_type_vocabulary(), None);
        let scores = &rows[0].scores_by_data_type;
        assert_eq!(scores.len(), DATA_TYPES.len());
        assert_eq!(scores[0].data_type_id, "TEXT_MINING");
        assert_eq!(scores[0].score, 0.4);
        assert!(scores[1..].iter().all(|s| s.score == 0.0));
        assert_eq!(rows[0].target_id, "ENSG1");
    }

    #[test]
    fn string_heatmap_marks_missing_methods_as_no_data() {
        let scale = Arc::new(QuantizeScale::default());
        let interaction = Interaction {
            int_b: Some("P1".into()),
            score: Some(0.9),
            evidences: vec![evidence("coexpression", Some(0.3)), evidence("coexpression", Some(0.8))],
            ..Default::default()
        };
        let table = project(&[interaction], &string_heatmap_columns(Arc::clone(&scale)));
        assert_eq!(table.columns.len(), 2 + STRING_METHODS.len());

        match table.cell(0, "expression") {
            Some(DisplayValue::Heat(cell)) => assert_eq!(cell.score, Some(0.3)),
            other => panic!("unexpected cell: {:?}", other),
        }
        match table.cell(0, "homology") {
            Some(DisplayValue::Heat(cell)) => {
                assert_eq!(cell.score, None);
                assert_eq!(cell.color, scale.no_data());
            }
            other => panic!("unexpected cell: {:?}", other),
        }
    }

    #[test]
    fn reactome_columns_render_sparse_records() {
        let bare = Interaction::default();
        let table = project(&[bare], &reactome_interaction_columns());
        assert_eq!(table.cell(0, "species"), Some(&DisplayValue::text(NA_LABEL)));
        assert_eq!(table.cell(0, "sizeEvidences"), Some(&DisplayValue::Integer(0)));

        let full = Interaction {
            int_b: Some("P1".into()),
            target_b: Some(TargetRef {
                id: "ENSG2".into(),
                approved_symbol: Some("MAP2K1".into()),
            }),
            species_b: Some(Species {
                mnemonic: Some("human".into()),
            }),
            count: Some(4),
            ..Default::default()
        };
        let table = project(&[full], &reactome_interaction_columns());
        assert_eq!(table.cell(0, "targetB"), Some(&DisplayValue::text("MAP2K1")));
        assert_eq!(table.cell(0, "sizeEvidences"), Some(&DisplayValue::Integer(4)));
    }

    #[test]
    fn unassigned_pubmed_ids_are_not_linked() {
        let e = InteractionEvidence {
            pubmed_id: Some("unassigned1304".into()),
            ..Default::default()
        };
        let table = project(&[e], &reactome_evidence_columns());
        assert_eq!(table.cell(0, "pubmedId"), Some(&DisplayValue::text("unassigned1304")));
    }

    #[test]
    fn safety_columns_filter_uncoded_organs_and_unlinked_references() {
        let effect = AdverseEffect {
            organs_systems_affected: vec![
                OrganSystem {
                    code: Some("C1".into()),
                    mapped_term: Some("heart".into()),
                    preferred_term: Some("Heart".into()),
                },
                OrganSystem {
                    code: None,
                    mapped_term: Some("liver".into()),
                    preferred_term: None,
                },
            ],
            activation_effects: vec![EffectGroup {
                group_key: "ACUTE_DOSING".into(),
                terms: vec!["arrhythmia".into()],
            }],
            inhibition_effects: vec![],
            references: vec![
                SafetyReference {
                    pubmed_id: Some("123".into()),
                    pub_url: Some("http://europepmc.org/abstract/MED/123".into()),
                    ..Default::default()
                },
                SafetyReference {
                    ref_label: Some("orphan".into()),
                    ..Default::default()
                },
            ],
        };
        let table = project(&[effect], &safety_effect_columns());
        assert_eq!(table.cell(0, "organs_systems_affected").unwrap().to_plain_text(), "heart");
        assert_eq!(
            table.cell(0, "activation_effects").unwrap().to_plain_text(),
            "Acute dosing: arrhythmia"
        );
        assert_eq!(table.cell(0, "inhibition_effects").unwrap().to_plain_text(), "");
        assert_eq!(
            table.cell(0, "references").unwrap().to_plain_text(),
            "http://europepmc.org/abstract/MED/123"
        );
    }

    fn organ(code: Option<&str>, term: &str) -> OrganSystem {
        OrganSystem {
            code: code.map(str::to_string),
            mapped_term: Some(term.to_lowercase()),
            preferred_term: Some(term.to_string()),
        }
    }

    #[test]
    fn safety_download_keeps_every_organ_term_and_url() {
        let effect = AdverseEffect {
            organs_systems_affected: vec![organ(Some("C1"), "Heart"), organ(None, "Liver")],
            activation_effects: vec![EffectGroup {
                group_key: "ACUTE_DOSING".into(),
                terms: vec!["arrhythmia".into(), "qt".into()],
            }],
            inhibition_effects: vec![],
            references: vec![SafetyReference {
                pub_url: Some("http://hecatos".into()),
                ..Default::default()
            }],
        };
        let table = project(&[effect], &safety_effect_download_columns());
        assert_eq!(table.cell(0, "organs_systems_affected").unwrap().to_plain_text(), "Heart, Liver");
        assert_eq!(table.cell(0, "activation_effects").unwrap().to_plain_text(), "arrhythmia, qt");
        assert_eq!(table.cell(0, "inhibition_effects").unwrap().to_plain_text(), "");
        assert_eq!(table.cell(0, "references").unwrap().to_plain_text(), "http://hecatos");
    }

    #[test]
    fn safety_risk_columns_render_liability_and_organs() {
        let risk = SafetyRisk {
            organs_systems_affected: vec![organ(Some("C2"), "Kidney"), organ(None, "Skin")],
            safety_liability: None,
            references: vec![SafetyReference {
                ref_link: Some("http://ref".into()),
                ref_label: Some("Study".into()),
                ..Default::default()
            }],
        };
        let table = project(std::slice::from_ref(&risk), &safety_risk_columns());
        assert_eq!(table.cell(0, "organs_systems_affected").unwrap().to_plain_text(), "Kidney");
        assert_eq!(table.cell(0, "safety_liability"), Some(&DisplayValue::text(NA_LABEL)));
        assert_eq!(
            table.cell(0, "references"),
            Some(&DisplayValue::Links(vec![Link::new("Study", "http://ref")]))
        );

        let download = project(&[risk], &safety_risk_download_columns());
        assert_eq!(download.cell(0, "organs_systems_affected").unwrap().to_plain_text(), "Kidney, Skin");
        assert_eq!(download.cell(0, "safety_liability"), Some(&DisplayValue::Empty));
        assert_eq!(download.cell(0, "references").unwrap().to_plain_text(), "");
    }

    #[test]
    fn pathway_columns_link_reactome_diagrams() {
        let top = TopLevelPathway {
            id: "R-HSA-162582".into(),
            name: "Signal Transduction".into(),
            is_associated: true,
        };
        let table = project(&[top], &top_level_pathway_columns());
        assert_eq!(table.cell(0, "isAssociated"), Some(&DisplayValue::Bool(true)));
        assert_eq!(table.cell(0, "id"), Some(&DisplayValue::text("R-HSA-162582")));

        let low = LowLevelPathway {
            id: "R-HSA-5673001".into(),
            name: "RAF/MAP kinase cascade".into(),
            parents: vec![crate::models::PathwayRef {
                id: "R-HSA-162582".into(),
                name: "Signal Transduction".into(),
            }],
        };
        let table = project(&[low], &low_level_pathway_columns());
        assert_eq!(
            table.cell(0, "id").unwrap().to_plain_text(),
            "https://reactome.org/content/detail/R-HSA-5673001"
        );
        assert_eq!(table.cell(0, "parents").unwrap().to_plain_text(), "Signal Transduction");
        assert_eq!(
            table.cell(0, "diagram").unwrap().to_plain_text(),
            "https://reactome.org/ContentService/exporter/diagram/R-HSA-5673001.svg, \
             https://reactome.org/ContentService/exporter/diagram/R-HSA-5673001.png"
        );
    }

    #[test]
    fn phewas_columns_fall_back_to_na() {
        let full = PhewasEvidence {
            disease: DiseaseRef {
                id: "EFO_1".into(),
                name: "asthma".into(),
            },
            variant_rs_id: Some("rs123".into()),
            variant_functional_consequence: Some(crate::models::VariantConsequence {
                id: "SO_0001583".into(),
                label: Some("MISSENSE_VARIANT".into()),
            }),
            study_cases: Some(250),
            odds_ratio: Some(1.25),
            resource_score: Some(1e-8),
            ..Default::default()
        };
        let table = project(&[full, PhewasEvidence::default()], &phewas_columns());
        assert_eq!(
            table.cell(0, "variantFunctionalConsequence"),
            Some(&DisplayValue::Link(Link::new("Missense_variant", "https://identifiers.org/SO:0001583")))
        );
        assert_eq!(table.cell(0, "studyCases"), Some(&DisplayValue::Integer(250)));
        assert_eq!(table.cell(0, "oddsRatio"), Some(&DisplayValue::Number(1.25)));
        assert_eq!(table.cell(0, "resourceScore"), Some(&DisplayValue::Number(1e-8)));
        for column in ["diseaseFromSource", "variantRsId", "variantFunctionalConsequence", "studyCases", "oddsRatio"] {
            assert_eq!(table.cell(1, column), Some(&DisplayValue::text(NA_LABEL)), "column {}", column);
        }
    }

    #[test]
    fn gene2phenotype_links_need_a_symbol() {
        let with_symbol = Gene2PhenotypeEvidence {
            confidence: Some("definitive".into()),
            target: Some(TargetRef {
                id: "ENSG1".into(),
                approved_symbol: Some("BRAF".into()),
            }),
            allelic_requirements: Some(vec!["monoallelic".into()]),
            literature: vec!["NA".into(), "1234".into()],
            ..Default::default()
        };
        let without_symbol = Gene2PhenotypeEvidence {
            confidence: Some("definitive".into()),
            ..Default::default()
        };
        let table = project(&[with_symbol, without_symbol], &gene2phenotype_columns());
        assert_eq!(
            table.cell(0, "confidence").unwrap().to_plain_text(),
            "https://www.ebi.ac.uk/gene2phenotype/search?panel=ALL&search_term=BRAF"
        );
        assert_eq!(
            table.cell(0, "literature"),
            Some(&DisplayValue::Links(vec![Link::new("1234", "https://europepmc.org/article/MED/1234")]))
        );
        assert_eq!(table.cell(0, "allelicRequirements").unwrap().to_plain_text(), "monoallelic");
        assert_eq!(table.cell(1, "confidence"), Some(&DisplayValue::text(NA_LABEL)));
        assert_eq!(table.cell(1, "allelicRequirements"), Some(&DisplayValue::text(NA_LABEL)));
    }

    #[test]
    fn intogen_reads_first_variation_only() {
        let evidence = IntOgenEvidence {
            variations: vec![
                crate::models::MutatedSamples {
                    number_mutated_samples: Some(12),
                    number_samples_tested: Some(400),
                },
                crate::models::MutatedSamples {
                    number_mutated_samples: Some(1),
                    number_samples_tested: Some(2),
                },
            ],
            cohort_id: Some("TCGA_SKCM".into()),
            cohort_short_name: Some("TCGA_SKCM".into()),
            cohort_description: Some("Skin cutaneous melanoma".into()),
            target: Some(TargetRef {
                id: "ENSG1".into(),
                approved_symbol: Some("BRAF".into()),
            }),
            ..Default::default()
        };
        let table = project(&[evidence, IntOgenEvidence::default()], &intogen_columns());
        assert_eq!(table.cell(0, "numberMutatedSamples"), Some(&DisplayValue::text("12/400")));
        assert_eq!(
            table.cell(0, "cohortShortName").unwrap().to_plain_text(),
            "https://www.intogen.org/search?gene=BRAF&cohort=TCGA_SKCM"
        );
        assert_eq!(table.cell(1, "numberMutatedSamples"), Some(&DisplayValue::text(NA_LABEL)));
        assert_eq!(table.cell(1, "resourceScore"), Some(&DisplayValue::text(NA_LABEL)));
        assert_eq!(table.cell(1, "cohortShortName"), Some(&DisplayValue::text(NA_LABEL)));
    }
}
