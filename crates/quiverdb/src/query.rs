//! Typed query model: target vectors, scalar filters, and results.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use quiverdb_core::{Key, Record, Scalar, Schema};
use quiverdb_vector::euclidean_distance_squared;

use crate::error::{Error, Result};

/// Comparison operator of a scalar filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
}

/// An equality/inequality/range predicate on one scalar field.
///
/// `Eq`/`Ne` use union equality: values of different tags are never
/// equal. The ordering operators are defined only when the stored value
/// and the filter value share a tag; across tags they evaluate to
/// `false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarFilter {
    /// The scalar field name.
    pub field: String,
    /// The comparison operator.
    pub op: FilterOp,
    /// The right-hand value.
    pub value: Scalar,
}

/// One target vector of a query, with its field and weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryVector {
    /// The vector field name.
    pub field: String,
    /// The target vector.
    pub target: Vec<f32>,
    /// Weight of this field in the fused distance.
    pub weight: f32,
}

/// A search request.
///
/// Multi-vector queries rank candidates by the weighted sum of per-field
/// squared L2 distances and return the `limit` globally smallest.
///
/// # Example
///
/// ```ignore
/// use quiverdb::{FilterOp, Query};
///
/// let query = Query::new()
///     .with_limit(10)
///     .add_vector("text", vec![0.1; 128])
///     .add_weighted_vector("image", vec![0.2; 64], 0.5)
///     .add_filter("year", FilterOp::Ge, 2020i64);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Maximum number of results; zero short-circuits every search to an
    /// empty result.
    pub limit: usize,
    /// Target vectors in declaration order.
    pub vectors: Vec<QueryVector>,
    /// Conjunctive scalar filters.
    pub filters: Vec<ScalarFilter>,
}

impl Query {
    /// Create an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the result limit.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Add a target vector with the default weight of 1.0.
    #[must_use]
    pub fn add_vector(self, field: impl Into<String>, target: Vec<f32>) -> Self {
        self.add_weighted_vector(field, target, 1.0)
    }

    /// Add a target vector with an explicit weight.
    #[must_use]
    pub fn add_weighted_vector(
        mut self,
        field: impl Into<String>,
        target: Vec<f32>,
        weight: f32,
    ) -> Self {
        self.vectors.push(QueryVector { field: field.into(), target, weight });
        self
    }

    /// Add a scalar filter.
    #[must_use]
    pub fn add_filter(
        mut self,
        field: impl Into<String>,
        op: FilterOp,
        value: impl Into<Scalar>,
    ) -> Self {
        self.filters.push(ScalarFilter { field: field.into(), op, value: value.into() });
        self
    }
}

/// One search hit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QueryResult {
    /// The matching record's key.
    pub id: Key,
    /// The fused distance; results are always sorted ascending.
    pub distance: f32,
}

impl PartialEq for QueryResult {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}

impl Eq for QueryResult {}

impl PartialOrd for QueryResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueryResult {
    fn cmp(&self, other: &Self) -> Ordering {
        // Distance-only ordering; NaN compares equal to keep the order
        // total, and valid distance calculations never produce it.
        self.distance.partial_cmp(&other.distance).unwrap_or(Ordering::Equal)
    }
}

/// A query vector resolved against the schema.
pub(crate) struct ResolvedVector<'a> {
    /// Position of the field in `schema.vector_fields` and in every
    /// record's vector tuple.
    pub field_idx: usize,
    pub target: &'a [f32],
    pub weight: f32,
}

/// A filter resolved against the schema; evaluation is infallible.
pub(crate) struct ResolvedFilter<'a> {
    scalar_idx: usize,
    op: FilterOp,
    value: &'a Scalar,
}

impl ResolvedFilter<'_> {
    /// Evaluate this filter against a record.
    pub fn matches(&self, record: &Record) -> bool {
        let scalar = &record.scalars[self.scalar_idx];
        match self.op {
            FilterOp::Eq => scalar == self.value,
            FilterOp::Ne => scalar != self.value,
            FilterOp::Gt => matches!(scalar.partial_cmp(self.value), Some(Ordering::Greater)),
            FilterOp::Ge => matches!(
                scalar.partial_cmp(self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lt => matches!(scalar.partial_cmp(self.value), Some(Ordering::Less)),
            FilterOp::Le => {
                matches!(scalar.partial_cmp(self.value), Some(Ordering::Less | Ordering::Equal))
            }
        }
    }
}

/// A query validated against the schema once, up front.
///
/// After resolution every per-record operation is infallible: field
/// positions are bound, dimensions are checked, and weights are known to
/// be positive and finite.
pub(crate) struct ResolvedQuery<'a> {
    pub limit: usize,
    pub vectors: Vec<ResolvedVector<'a>>,
    pub filters: Vec<ResolvedFilter<'a>>,
}

impl<'a> ResolvedQuery<'a> {
    /// Validate `query` against `schema`.
    pub fn resolve(schema: &Schema, query: &'a Query) -> Result<Self> {
        let mut vectors = Vec::with_capacity(query.vectors.len());
        for qv in &query.vectors {
            let field_idx = schema
                .vector_field_index(&qv.field)
                .ok_or_else(|| Error::NotFound(format!("vector field '{}'", qv.field)))?;
            let dim = schema.vector_fields[field_idx].dim;
            if qv.target.len() != dim {
                return Err(Error::InvalidArgument(format!(
                    "query vector for field '{}' has dimension {}, expected {dim}",
                    qv.field,
                    qv.target.len()
                )));
            }
            if !qv.weight.is_finite() || qv.weight <= 0.0 {
                return Err(Error::InvalidArgument(format!(
                    "weight for field '{}' must be positive and finite",
                    qv.field
                )));
            }
            vectors.push(ResolvedVector { field_idx, target: &qv.target, weight: qv.weight });
        }

        let mut filters = Vec::with_capacity(query.filters.len());
        for filter in &query.filters {
            let scalar_idx = schema
                .scalar_field_index(&filter.field)
                .ok_or_else(|| Error::NotFound(format!("scalar field '{}'", filter.field)))?;
            filters.push(ResolvedFilter { scalar_idx, op: filter.op, value: &filter.value });
        }

        Ok(Self { limit: query.limit, vectors, filters })
    }

    /// Whether a record passes every filter.
    pub fn passes_filters(&self, record: &Record) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }

    /// The fused distance of a record: the weighted sum of per-field
    /// squared L2 distances, in field declaration order.
    pub fn fused_distance(&self, record: &Record) -> f32 {
        let mut total = 0.0;
        for qv in &self.vectors {
            total += qv.weight
                * euclidean_distance_squared(qv.target, &record.vectors[qv.field_idx]);
        }
        total
    }
}
