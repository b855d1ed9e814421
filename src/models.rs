use serde::{Deserialize, Deserializer, Serialize};

use crate::projection::CategoryScored;
use crate::selection::HasDetails;

// Raw records as returned by the platform API. Every nested collection
// defaults to empty so a missing or null field never fails deserialization.

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRef {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatatypeScore {
    #[serde(deserialize_with = "nullable")]
    pub component_id: String,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseAssociation {
    pub disease: DiseaseRef,
    #[serde(default)]
    pub score: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub datatype_scores: Vec<DatatypeScore>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRef {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(default)]
    pub approved_symbol: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Species {
    #[serde(default)]
    pub mnemonic: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionMethod {
    #[serde(default)]
    pub short_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InteractionEvidence {
    pub interaction_identifier: Option<String>,
    pub interaction_type_short_name: Option<String>,
    pub host_organism_scientific_name: Option<String>,
    pub interaction_detection_method_short_name: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub participant_detection_method_a: Vec<DetectionMethod>,
    #[serde(deserialize_with = "nullable")]
    pub participant_detection_method_b: Vec<DetectionMethod>,
    pub expansion_method_short_name: Option<String>,
    pub evidence_score: Option<f64>,
    pub pubmed_id: Option<String>,
}

/// One interaction partner of the queried target with its supporting evidence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Interaction {
    pub int_a: Option<String>,
    pub int_b: Option<String>,
    pub target_b: Option<TargetRef>,
    pub species_b: Option<Species>,
    #[serde(alias = "scoring")]
    pub score: Option<f64>,
    pub count: Option<i64>,
    #[serde(deserialize_with = "nullable")]
    pub evidences: Vec<InteractionEvidence>,
}

impl Interaction {
    /// Approved symbol of the partner when it is a known target, otherwise its raw id.
    pub fn partner_label(&self) -> String {
        self.target_b
            .as_ref()
            .and_then(|t| t.approved_symbol.clone())
            .or_else(|| self.int_b.clone())
            .unwrap_or_default()
    }
}

impl HasDetails for Interaction {
    type Detail = InteractionEvidence;

    fn details(&self) -> &[InteractionEvidence] {
        &self.evidences
    }
}

impl CategoryScored for InteractionEvidence {
    fn category_id(&self) -> Option<&str> {
        self.interaction_detection_method_short_name.as_deref()
    }

    fn category_score(&self) -> Option<f64> {
        self.evidence_score
    }
}

impl CategoryScored for DatatypeScore {
    fn category_id(&self) -> Option<&str> {
        Some(&self.component_id)
    }

    fn category_score(&self) -> Option<f64> {
        self.score
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganSystem {
    pub code: Option<String>,
    pub mapped_term: Option<String>,
    pub preferred_term: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EffectGroup {
    #[serde(deserialize_with = "nullable")]
    pub group_key: String,
    #[serde(deserialize_with = "nullable")]
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SafetyReference {
    pub pubmed_id: Option<String>,
    pub ref_link: Option<String>,
    pub pub_url: Option<String>,
    pub ref_label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdverseEffect {
    #[serde(deserialize_with = "nullable")]
    pub organs_systems_affected: Vec<OrganSystem>,
    #[serde(deserialize_with = "nullable")]
    pub activation_effects: Vec<EffectGroup>,
    #[serde(deserialize_with = "nullable")]
    pub inhibition_effects: Vec<EffectGroup>,
    #[serde(deserialize_with = "nullable")]
    pub references: Vec<SafetyReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SafetyRisk {
    #[serde(deserialize_with = "nullable")]
    pub organs_systems_affected: Vec<OrganSystem>,
    pub safety_liability: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub references: Vec<SafetyReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SafetyProfile {
    #[serde(deserialize_with = "nullable")]
    pub adverse_effects: Vec<AdverseEffect>,
    #[serde(deserialize_with = "nullable")]
    pub safety_risk_info: Vec<SafetyRisk>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopLevelPathway {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub is_associated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathwayRef {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LowLevelPathway {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub parents: Vec<PathwayRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pathways {
    #[serde(deserialize_with = "nullable")]
    pub top_level_pathways: Vec<TopLevelPathway>,
    #[serde(deserialize_with = "nullable")]
    pub low_level_pathways: Vec<LowLevelPathway>,
}

// Target-disease genetic evidence.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantConsequence {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhewasEvidence {
    pub disease: DiseaseRef,
    pub disease_from_source: Option<String>,
    pub variant_rs_id: Option<String>,
    pub variant_functional_consequence: Option<VariantConsequence>,
    pub resource_score: Option<f64>,
    pub study_cases: Option<i64>,
    pub odds_ratio: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Gene2PhenotypeEvidence {
    pub disease: DiseaseRef,
    pub disease_from_source: Option<String>,
    pub allelic_requirements: Option<Vec<String>>,
    pub confidence: Option<String>,
    pub target: Option<TargetRef>,
    #[serde(deserialize_with = "nullable")]
    pub literature: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MutatedSamples {
    pub number_mutated_samples: Option<i64>,
    pub number_samples_tested: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntOgenEvidence {
    pub disease: DiseaseRef,
    #[serde(deserialize_with = "nullable")]
    pub variations: Vec<MutatedSamples>,
    pub resource_score: Option<f64>,
    pub significant_driver_methods: Option<Vec<String>>,
    pub cohort_id: Option<String>,
    pub cohort_short_name: Option<String>,
    pub cohort_description: Option<String>,
    pub target: Option<TargetRef>,
}

impl IntOgenEvidence {
    /// Approved symbol of the evidence target, if reported.
    pub fn target_symbol(&self) -> Option<&str> {
        self.target.as_ref().and_then(|t| t.approved_symbol.as_deref())
    }
}

// Shaped rows handed to the association table.

/// Score of one data type for one association; absent data types carry the default.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTypeScore {
    pub data_type_id: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationRow {
    pub disease: DiseaseRef,
    pub target_id: String,
    pub score: f64,
    pub scores_by_data_type: Vec<DataTypeScore>,
    pub therapeutic_areas: Vec<String>,
}
