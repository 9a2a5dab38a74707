//! Frequency canonicalization: every series leaves the pipeline on an annual grid.

use std::collections::BTreeMap;

use crate::domain::{AggregationPolicy, Frequency, RawObservation, SourceId, year_of_period};
use crate::error::PipelineError;

/// One observation on the annual grid.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualPoint {
    pub period: String,
    pub year: i32,
    pub value: f64,
}

/// Put raw observations on an annual grid, sorted by period.
///
/// Annual series pass through unchanged. Anything finer is grouped by year
/// and each group collapses to one point per `policy`, labelled with the year.
pub fn canonicalize(
    raw: Vec<RawObservation>,
    frequency_raw: &str,
    policy: AggregationPolicy,
    source_id: SourceId,
) -> Result<Vec<AnnualPoint>, PipelineError> {
    let mut dated = Vec::with_capacity(raw.len());
    for obs in raw {
        let year = year_of_period(&obs.period).ok_or_else(|| {
            PipelineError::data_shape(source_id, format!("cannot derive a year from period '{}'", obs.period))
        })?;
        dated.push((year, obs));
    }

    if !Frequency::parse(frequency_raw).is_sub_annual() {
        let mut out: Vec<AnnualPoint> = dated
            .into_iter()
            .map(|(year, obs)| AnnualPoint {
                period: obs.period,
                year,
                value: obs.value,
            })
            .collect();
        out.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.period.cmp(&b.period)));
        return Ok(out);
    }

    let mut groups: BTreeMap<i32, Vec<RawObservation>> = BTreeMap::new();
    for (year, obs) in dated {
        groups.entry(year).or_default().push(obs);
    }

    Ok(groups
        .into_iter()
        .map(|(year, mut group)| {
            let value = match policy {
                AggregationPolicy::Mean => group.iter().map(|o| o.value).sum::<f64>() / group.len() as f64,
                AggregationPolicy::Last => {
                    group.sort_by(|a, b| a.period.cmp(&b.period));
                    group.last().map(|o| o.value).unwrap_or(f64::NAN)
                }
            };
            AnnualPoint {
                period: year.to_string(),
                year,
                value,
            }
        })
        .collect())
}
