//! In-memory catalog and the keyword filter engine.
//!
//! A [`Catalog`] is a fixed, ordered list of [`Record`]s sharing one field
//! set. Filtering is a linear scan:
//!
//! 1. Parse the query string into a [`KeywordSet`].
//! 2. An empty keyword set selects every record.
//! 3. Otherwise a record is selected when any keyword is a case-sensitive
//!    substring of any of its field values.
//! 4. Selected records are projected onto the requested output fields, in
//!    catalog order.

use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::keywords::KeywordSet;

/// Field projected when no other output field is configured.
pub const DEFAULT_OUTPUT_FIELD: &str = "name";

/// Value emitted for a projected field missing from a record.
pub const DEFAULT_PLACEHOLDER: &str = "N/A";

/// A catalog entry: field name to free-text value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Value of `field`, if the record has it.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Field names present in this record, sorted.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Field values, in field-name order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.values().map(String::as_str)
    }

    /// True when any keyword occurs verbatim in any field value.
    pub fn matches_any(&self, keywords: &KeywordSet) -> bool {
        keywords
            .iter()
            .any(|kw| self.values().any(|value| value.contains(kw)))
    }
}

/// Errors raised while building a catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog field set is empty")]
    NoFields,

    #[error("record {index} has field \"{field}\" which is not in the catalog field set")]
    UnknownField { index: usize, field: String },
}

/// Errors raised while filtering. Zero matches is not an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("no output fields requested")]
    EmptyProjection,

    #[error("output field \"{field}\" is not part of the catalog field set {known:?}")]
    UnknownField { field: String, known: Vec<String> },
}

/// Which fields to emit for each matching record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    /// Output fields in order. The first one is the primary field.
    pub fields: Vec<String>,
    /// Emitted when a record lacks one of the fields.
    pub placeholder: String,
}

impl Projection {
    /// Projection onto `fields`, emitting `placeholder` for missing values.
    pub fn new(fields: Vec<String>, placeholder: impl Into<String>) -> Self {
        Self {
            fields,
            placeholder: placeholder.into(),
        }
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(vec![DEFAULT_OUTPUT_FIELD.to_string()], DEFAULT_PLACEHOLDER)
    }
}

/// One projected record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedRow {
    pub values: Vec<String>,
}

impl ProjectedRow {
    /// Value of the first projected field.
    pub fn primary(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or_default()
    }
}

/// Projected matches in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredResult {
    pub rows: Vec<ProjectedRow>,
}

impl FilteredResult {
    /// Number of matching rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when nothing matched.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First projected value of every row, in catalog order.
    pub fn primary_values(&self) -> Vec<&str> {
        self.rows.iter().map(ProjectedRow::primary).collect()
    }
}

/// A fixed, ordered collection of records with a shared field set.
#[derive(Debug, Clone)]
pub struct Catalog {
    fields: Vec<String>,
    records: Vec<Record>,
}

impl Catalog {
    /// Build a catalog, rejecting records that use fields outside `fields`.
    pub fn new(fields: Vec<String>, records: Vec<Record>) -> Result<Self, CatalogError> {
        if fields.is_empty() {
            return Err(CatalogError::NoFields);
        }
        for (index, record) in records.iter().enumerate() {
            if let Some(field) = record.field_names().find(|f| !fields.iter().any(|k| k == *f)) {
                return Err(CatalogError::UnknownField {
                    index,
                    field: field.to_string(),
                });
            }
        }
        Ok(Self { fields, records })
    }

    /// The built-in restaurant sample catalog.
    pub fn sample() -> Self {
        let records = SAMPLE_RESTAURANTS
            .iter()
            .map(|(name, description)| {
                Record::new()
                    .with("name", *name)
                    .with("description", *description)
            })
            .collect();
        Self {
            fields: vec!["name".to_string(), "description".to_string()],
            records,
        }
    }

    /// The shared field set.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// All records, in catalog order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the catalog holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Parse `query` into keywords and filter with them.
    pub fn filter(
        &self,
        query: &str,
        projection: &Projection,
    ) -> Result<FilteredResult, FilterError> {
        self.filter_keywords(&KeywordSet::parse(query), projection)
    }

    /// Filter with an already-parsed keyword set.
    ///
    /// An empty keyword set selects the whole catalog.
    pub fn filter_keywords(
        &self,
        keywords: &KeywordSet,
        projection: &Projection,
    ) -> Result<FilteredResult, FilterError> {
        self.check_projection(projection)?;

        let rows = self
            .records
            .iter()
            .filter(|record| keywords.is_empty() || record.matches_any(keywords))
            .map(|record| project(record, projection))
            .collect();

        Ok(FilteredResult { rows })
    }

    fn check_projection(&self, projection: &Projection) -> Result<(), FilterError> {
        if projection.fields.is_empty() {
            return Err(FilterError::EmptyProjection);
        }
        if let Some(field) = projection
            .fields
            .iter()
            .find(|f| !self.fields.contains(f))
        {
            return Err(FilterError::UnknownField {
                field: field.clone(),
                known: self.fields.clone(),
            });
        }
        Ok(())
    }
}

fn project(record: &Record, projection: &Projection) -> ProjectedRow {
    let values = projection
        .fields
        .iter()
        .map(|field| {
            record
                .get(field)
                .unwrap_or(projection.placeholder.as_str())
                .to_string()
        })
        .collect();
    ProjectedRow { values }
}

const SAMPLE_RESTAURANTS: [(&str, &str); 9] = [
    ("猪肉饺子馆", "手工制作的猪肉馅饺子，口味多样。"),
    ("猪肉荣", "主打猪肉料理，招牌菜是红烧肉和糖醋里脊。"),
    (
        "川味小厨",
        "正宗四川风味，以麻辣口味为主，特色菜有辣子鸡和麻婆豆腐。",
    ),
    ("老北京炸酱面馆", "提供地道的北京炸酱面，还有各种老北京小吃。"),
    ("意式风情餐厅", "浪漫的意大利餐厅，提供各种意大利面、披萨和牛排。"),
    ("通心粉先生", "各种口味的通心粉是本店特色，也有少量其他西式简餐。"),
    ("辣味海鲜", "以各种香辣口味的海鲜为主打，适合喜欢重口味的食客。"),
    ("素食主义", "提供各种健康美味的素食菜肴。"),
    ("麻辣烫专门店", "自选食材的麻辣烫，可以根据喜好选择辣度。"),
];
