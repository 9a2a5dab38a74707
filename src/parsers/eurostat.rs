//! Eurostat JSON-stat 2.0 datasets.
//!
//! A dataset is a dense cube stored sparsely:
//!
//! - `id`: dimension names, in storage order
//! - `size`: cardinality of each dimension, same order
//! - `dimension.<id>.category.index`: category code → position (or an array of codes)
//! - `value`: linear offset → number (object keyed by offset, or a dense array)
//!
//! Storage is row-major with the last dimension varying fastest, so
//! `offset = Σ index[d] * stride[d]` where `stride[d]` is the product of the sizes
//! of all dimensions after `d`.

use serde_json::{Map, Value};

use crate::domain::{RawObservation, SeriesDescriptor, SourceId};
use crate::error::PipelineError;

const TIME_DIMENSION: &str = "time";
const GEO_DIMENSION: &str = "geo";

fn shape_error(message: impl Into<String>) -> PipelineError {
    PipelineError::data_shape(SourceId::Eurostat, message)
}

/// One populated cell of the cube.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonStatRow {
    pub offset: usize,
    /// Category code per dimension, in `JsonStatTable::dimensions` order.
    pub categories: Vec<String>,
    pub value: f64,
}

/// Long-form view of a JSON-stat cube: one row per populated offset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonStatTable {
    pub dimensions: Vec<String>,
    pub rows: Vec<JsonStatRow>,
}

impl JsonStatTable {
    pub fn dimension_index(&self, name: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d == name)
    }

    /// All category codes of one dimension, row by row.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.dimension_index(name)?;
        Some(self.rows.iter().map(|r| r.categories[idx].as_str()).collect())
    }

    pub fn values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.value).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Flatten a JSON-stat dataset into long form.
///
/// Offsets missing from `value` (or `null`) are missing data and produce no row.
/// Rows come out in ascending offset order.
pub fn flatten_jsonstat(payload: &Value) -> Result<JsonStatTable, PipelineError> {
    let ids: Vec<String> = payload
        .get("id")
        .and_then(Value::as_array)
        .ok_or_else(|| shape_error("missing 'id' array"))?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect::<Option<_>>()
        .ok_or_else(|| shape_error("'id' must contain strings"))?;

    let sizes: Vec<usize> = payload
        .get("size")
        .and_then(Value::as_array)
        .ok_or_else(|| shape_error("missing 'size' array"))?
        .iter()
        .map(|v| v.as_u64().and_then(|n| usize::try_from(n).ok()))
        .collect::<Option<_>>()
        .ok_or_else(|| shape_error("'size' must contain non-negative integers"))?;

    if ids.len() != sizes.len() {
        return Err(shape_error(format!(
            "'id' has {} dimension(s) but 'size' has {}",
            ids.len(),
            sizes.len()
        )));
    }

    let dimensions = payload
        .get("dimension")
        .and_then(Value::as_object)
        .ok_or_else(|| shape_error("missing 'dimension' object"))?;

    // stride[d] = product of sizes of all dimensions after d
    let mut strides = vec![1usize; sizes.len()];
    let mut total = 1usize;
    for d in (0..sizes.len()).rev() {
        strides[d] = total;
        total = total
            .checked_mul(sizes[d])
            .ok_or_else(|| shape_error("cube is too large"))?;
    }

    let mut labels = Vec::with_capacity(ids.len());
    for (id, &size) in ids.iter().zip(&sizes) {
        labels.push(category_labels(dimensions, id, size)?);
    }

    let mut rows = Vec::new();
    for (offset, value) in populated_values(payload)? {
        if offset >= total {
            return Err(shape_error(format!(
                "value offset {offset} is outside the cube ({total} cells)"
            )));
        }

        let mut categories = Vec::with_capacity(ids.len());
        let mut remainder = offset;
        for d in 0..ids.len() {
            let index = remainder / strides[d];
            remainder %= strides[d];
            let label = labels[d][index].clone().ok_or_else(|| {
                shape_error(format!("dimension '{}' has no category at index {index}", ids[d]))
            })?;
            categories.push(label);
        }

        rows.push(JsonStatRow {
            offset,
            categories,
            value,
        });
    }
    rows.sort_by_key(|r| r.offset);

    Ok(JsonStatTable {
        dimensions: ids,
        rows,
    })
}

/// Category code at each position of one dimension.
///
/// `size` must not exceed the number of categories the dimension declares; the
/// label table is only allocated once that holds.
fn category_labels(
    dimensions: &Map<String, Value>,
    id: &str,
    size: usize,
) -> Result<Vec<Option<String>>, PipelineError> {
    let category = dimensions
        .get(id)
        .and_then(|d| d.get("category"))
        .ok_or_else(|| shape_error(format!("dimension '{id}' has no category block")))?;

    let declared = match category.get("index") {
        Some(Value::Object(index)) => index.len(),
        Some(Value::Array(codes)) => codes.len(),
        // A single-category dimension may omit `index` and carry only `label`.
        None if size == 1 => 1,
        _ => return Err(shape_error(format!("dimension '{id}' has no category index"))),
    };
    if size > declared {
        return Err(shape_error(format!(
            "dimension '{id}': size {size} exceeds its {declared} categories"
        )));
    }

    let mut labels = vec![None; size];
    match category.get("index") {
        Some(Value::Object(index)) => {
            for (code, position) in index {
                let position = position
                    .as_u64()
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| shape_error(format!("dimension '{id}': bad index for '{code}'")))?;
                let slot = labels.get_mut(position).ok_or_else(|| {
                    shape_error(format!("dimension '{id}': index {position} exceeds size {size}"))
                })?;
                *slot = Some(code.clone());
            }
        }
        Some(Value::Array(codes)) => {
            if codes.len() > size {
                return Err(shape_error(format!(
                    "dimension '{id}': {} categories exceed size {size}",
                    codes.len()
                )));
            }
            for (position, code) in codes.iter().enumerate() {
                let code = code
                    .as_str()
                    .ok_or_else(|| shape_error(format!("dimension '{id}': category codes must be strings")))?;
                labels[position] = Some(code.to_string());
            }
        }
        _ => {
            let code = category
                .get("label")
                .and_then(Value::as_object)
                .and_then(|l| l.keys().next())
                .ok_or_else(|| shape_error(format!("dimension '{id}' has neither index nor label")))?;
            labels[0] = Some(code.clone());
        }
    }
    Ok(labels)
}

fn populated_values(payload: &Value) -> Result<Vec<(usize, f64)>, PipelineError> {
    let as_number = |offset: usize, v: &Value| -> Result<Option<f64>, PipelineError> {
        match v {
            Value::Null => Ok(None),
            Value::Number(n) => Ok(n.as_f64()),
            other => Err(shape_error(format!("value at offset {offset} is not a number: {other}"))),
        }
    };

    let mut out = Vec::new();
    match payload.get("value") {
        Some(Value::Object(map)) => {
            for (key, v) in map {
                let offset: usize = key
                    .parse()
                    .map_err(|_| shape_error(format!("value key '{key}' is not an offset")))?;
                if let Some(x) = as_number(offset, v)? {
                    out.push((offset, x));
                }
            }
        }
        Some(Value::Array(items)) => {
            for (offset, v) in items.iter().enumerate() {
                if let Some(x) = as_number(offset, v)? {
                    out.push((offset, x));
                }
            }
        }
        _ => return Err(shape_error("missing 'value' mapping")),
    }
    Ok(out)
}

/// Observations for one registry row.
///
/// Uses the `time` dimension as the period and keeps only cells whose other
/// dimensions agree with the row's `geo` and `series_key` filters. Dimensions
/// the row does not constrain are not filtered.
pub fn parse_eurostat(payload: &Value, row: &SeriesDescriptor) -> Result<Vec<RawObservation>, PipelineError> {
    let table = flatten_jsonstat(payload)?;
    let time = table
        .dimension_index(TIME_DIMENSION)
        .ok_or_else(|| shape_error("dataset has no 'time' dimension"))?;

    let mut constraints: Vec<(usize, &str)> = Vec::new();
    if let Some(geo) = table.dimension_index(GEO_DIMENSION) {
        constraints.push((geo, row.country_code.as_str()));
    }
    for (name, value) in row.series_filters().unwrap_or_default() {
        if name.eq_ignore_ascii_case(GEO_DIMENSION) {
            continue;
        }
        if let Some(idx) = table.dimension_index(name) {
            constraints.push((idx, value));
        }
    }

    let mut out: Vec<RawObservation> = table
        .rows
        .iter()
        .filter(|r| constraints.iter().all(|&(idx, want)| r.categories[idx] == want))
        .map(|r| RawObservation::new(r.categories[time].clone(), r.value))
        .collect();
    out.sort_by(|a, b| a.period.cmp(&b.period));
    Ok(out)
}
