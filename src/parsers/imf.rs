//! IMF DataMapper API payloads: `values[indicator][country_iso3][year] = value`.

use serde_json::Value;

use crate::domain::{RawObservation, SourceId};
use crate::error::PipelineError;

fn shape_error(message: impl Into<String>) -> PipelineError {
    PipelineError::data_shape(SourceId::Imf, message)
}

/// Extract one indicator/country branch as yearly observations, ascending by year.
///
/// The payload may be the full API response (`{"values": {...}, "api": {...}}`)
/// or the bare `values` map. A missing indicator or country key is an error; a
/// present but empty year map is simply no data.
pub fn parse_imf(payload: &Value, indicator_code: &str, country_iso3: &str) -> Result<Vec<RawObservation>, PipelineError> {
    let values = payload.get("values").unwrap_or(payload);
    if !values.is_object() {
        return Err(shape_error("expected an object of indicator values"));
    }

    let by_country = values
        .get(indicator_code)
        .ok_or_else(|| shape_error(format!("indicator '{indicator_code}' not present in payload")))?;
    let by_year = by_country
        .get(country_iso3)
        .ok_or_else(|| {
            shape_error(format!(
                "country '{country_iso3}' not present under indicator '{indicator_code}'"
            ))
        })?
        .as_object()
        .ok_or_else(|| shape_error(format!("'{indicator_code}/{country_iso3}' is not a year map")))?;

    let mut rows: Vec<(i32, RawObservation)> = Vec::with_capacity(by_year.len());
    for (year, value) in by_year {
        let parsed_year: i32 = year
            .trim()
            .parse()
            .map_err(|_| shape_error(format!("'{year}' is not a year")))?;
        let value = match value {
            Value::Null => continue,
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
        .ok_or_else(|| shape_error(format!("value for {year} is not a number")))?;
        rows.push((parsed_year, RawObservation::new(year.trim(), value)));
    }
    rows.sort_by_key(|(year, _)| *year);

    Ok(rows.into_iter().map(|(_, obs)| obs).collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extracts_branch_in_year_order() {
        let payload = json!({"values": {"NGDPD": {"LTU": {"2020": 56.5, "2019": 54.0}}}});
        let rows = parse_imf(&payload, "NGDPD", "LTU").unwrap();
        assert_eq!(
            rows,
            vec![
                RawObservation::new("2019", 54.0),
                RawObservation::new("2020", 56.5),
            ]
        );
    }

    #[test]
    fn accepts_bare_values_map() {
        let payload = json!({"NGDPD": {"LTU": {"2019": 54.0, "2020": 56.5}}});
        let rows = parse_imf(&payload, "NGDPD", "LTU").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].period, "2019");
    }

    #[test]
    fn other_branches_are_ignored() {
        let payload = json!({"values": {
            "NGDPD": {"LTU": {"2019": 54.0}, "LVA": {"2019": 34.0}},
            "PCPIPCH": {"LTU": {"2019": 2.2}}
        }});
        let rows = parse_imf(&payload, "NGDPD", "LVA").unwrap();
        assert_eq!(rows, vec![RawObservation::new("2019", 34.0)]);
    }

    #[test]
    fn absent_keys_are_shape_errors_but_empty_branch_is_not() {
        let payload = json!({"values": {"NGDPD": {"LTU": {}}}});
        assert!(parse_imf(&payload, "NGDPD", "LTU").unwrap().is_empty());

        let err = parse_imf(&payload, "PCPIPCH", "LTU").unwrap_err();
        assert!(matches!(err, PipelineError::DataShape { .. }));
        assert!(err.to_string().contains("PCPIPCH"));

        let err = parse_imf(&payload, "NGDPD", "LVA").unwrap_err();
        assert!(err.to_string().contains("LVA"));

        assert!(parse_imf(&json!({"api": {"version": "1"}}), "NGDPD", "LTU").is_err());
    }

    #[test]
    fn null_values_are_skipped_and_bad_years_rejected() {
        let payload = json!({"values": {"LUR": {"LTU": {"2019": 6.3, "2020": null}}}});
        assert_eq!(parse_imf(&payload, "LUR", "LTU").unwrap().len(), 1);

        let payload = json!({"values": {"LUR": {"LTU": {"latest": 6.3}}}});
        assert!(parse_imf(&payload, "LUR", "LTU").is_err());
    }
}
