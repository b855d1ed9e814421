//! Projection of nested evidence records into flat tables.
//!
//! A [`ColumnDef`] pairs a header with a pure extractor over one record type.
//! [`project`] runs every extractor over every record and yields a
//! [`TableProjection`] that renderers consume without knowing the record shape.

use std::fmt;
use std::sync::Arc;

use crate::color_scale::{ColorScale, Rgb};

pub const NA_LABEL: &str = "N/A";
pub const NO_DATA_LABEL: &str = "No data";

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub label: String,
    pub url: String,
}

impl Link {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Link {
            label: label.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatCell {
    pub score: Option<f64>,
    pub color: Rgb,
    pub title: String,
}

/// A rendered cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayValue {
    Empty,
    Text(String),
    Number(f64),
    Integer(i64),
    Bool(bool),
    List(Vec<String>),
    Link(Link),
    Links(Vec<Link>),
    Heat(HeatCell),
}

impl DisplayValue {
    pub fn text(value: impl Into<String>) -> Self {
        DisplayValue::Text(value.into())
    }

    /// Text when present, the `N/A` label otherwise.
    pub fn text_or_na(value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => DisplayValue::text(v),
            _ => DisplayValue::text(NA_LABEL),
        }
    }

    /// Heat cell whose title is the score itself; only a missing score reads as "No data".
    pub fn heat(scale: &dyn ColorScale, score: Option<f64>) -> Self {
        let title = match score {
            Some(s) => s.to_string(),
            None => NO_DATA_LABEL.to_string(),
        };
        DisplayValue::Heat(HeatCell {
            score,
            color: scale.color(score),
            title,
        })
    }

    /// Flat text used for downloads: lists join with ", " and links export their URL.
    pub fn to_plain_text(&self) -> String {
        match self {
            DisplayValue::Empty => String::new(),
            DisplayValue::Text(t) => t.clone(),
            DisplayValue::Number(n) => n.to_string(),
            DisplayValue::Integer(i) => i.to_string(),
            DisplayValue::Bool(b) => b.to_string(),
            DisplayValue::List(items) => items.join(", "),
            DisplayValue::Link(link) => link.url.clone(),
            DisplayValue::Links(links) => links.iter().map(|l| l.url.as_str()).collect::<Vec<_>>().join(", "),
            DisplayValue::Heat(cell) => cell.score.map(|s| s.to_string()).unwrap_or_default(),
        }
    }
}

pub type Extractor<R> = Arc<dyn Fn(&R) -> DisplayValue + Send + Sync>;

/// A column over records of type `R`.
pub struct ColumnDef<R> {
    pub id: String,
    pub label: String,
    extract: Extractor<R>,
}

impl<R> ColumnDef<R> {
    pub fn new<F>(id: impl Into<String>, label: impl Into<String>, extract: F) -> Self
    where
        F: Fn(&R) -> DisplayValue + Send + Sync + 'static,
    {
        ColumnDef {
            id: id.into(),
            label: label.into(),
            extract: Arc::new(extract),
        }
    }

    pub fn render(&self, record: &R) -> DisplayValue {
        (self.extract)(record)
    }

    pub fn header(&self) -> ColumnHeader {
        ColumnHeader {
            id: self.id.clone(),
            label: self.label.clone(),
        }
    }
}

impl<R> Clone for ColumnDef<R> {
    fn clone(&self) -> Self {
        ColumnDef {
            id: self.id.clone(),
            label: self.label.clone(),
            extract: Arc::clone(&self.extract),
        }
    }
}

impl<R> fmt::Debug for ColumnDef<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeader {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableProjection {
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<Vec<DisplayValue>>,
}

impl TableProjection {
    pub fn column_index(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    pub fn cell(&self, row: usize, column_id: &str) -> Option<&DisplayValue> {
        let col = self.column_index(column_id)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One row per record, one cell per column, both in input order.
pub fn project<R>(records: &[R], columns: &[ColumnDef<R>]) -> TableProjection {
    TableProjection {
        columns: columns.iter().map(ColumnDef::header).collect(),
        rows: records
            .iter()
            .map(|record| columns.iter().map(|c| c.render(record)).collect())
            .collect(),
    }
}

/// A sparse per-category score carried by an evidence record.
pub trait CategoryScored {
    fn category_id(&self) -> Option<&str>;
    fn category_score(&self) -> Option<f64>;
}

/// Score of the first entry whose category matches; `None` when absent or unscored.
pub fn find_score<S: CategoryScored>(scores: &[S], category_id: &str) -> Option<f64> {
    scores
        .iter()
        .find(|s| s.category_id() == Some(category_id))
        .and_then(CategoryScored::category_score)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Identifier shown to users, e.g. `GENETIC_ASSOCIATION`.
    pub id: String,
    /// Identifier carried by the records, e.g. `genetic_association`.
    pub key: String,
    pub label: String,
}

/// Fixed category vocabulary with the default used when a record lacks a category.
#[derive(Debug, Clone)]
pub struct CategoryVocabulary {
    categories: Vec<Category>,
    default_score: f64,
}

impl CategoryVocabulary {
    pub fn new(categories: Vec<Category>, default_score: f64) -> Self {
        CategoryVocabulary {
            categories,
            default_score,
        }
    }

    /// Vocabulary whose record keys equal the category ids.
    pub fn from_ids(ids: &[&str], default_score: f64) -> Self {
        let categories = ids
            .iter()
            .map(|id| Category {
                id: id.to_string(),
                key: id.to_string(),
                label: id.to_string(),
            })
            .collect();
        CategoryVocabulary::new(categories, default_score)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn default_score(&self) -> f64 {
        self.default_score
    }

    pub fn resolve<S: CategoryScored>(&self, scores: &[S], category_id: &str) -> f64 {
        self.categories
            .iter()
            .find(|c| c.id == category_id)
            .and_then(|c| find_score(scores, &c.key))
            .unwrap_or(self.default_score)
    }

    /// Every category in vocabulary order paired with its resolved score.
    pub fn resolve_all<S: CategoryScored>(&self, scores: &[S]) -> Vec<(String, f64)> {
        self.categories
            .iter()
            .map(|c| (c.id.clone(), find_score(scores, &c.key).unwrap_or(self.default_score)))
            .collect()
    }
}
