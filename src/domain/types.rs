//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - built and annotated in-memory by the pipeline stages
//! - exported to CSV/JSON
//! - printed as terminal reports

use std::fmt;

use clap::ValueEnum;
use serde::{Serialize, Serializer};

/// Statistical data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    WorldBank,
    Eurostat,
    Imf,
}

impl SourceId {
    pub const ALL: [SourceId; 3] = [SourceId::WorldBank, SourceId::Eurostat, SourceId::Imf];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceId::WorldBank => "world_bank",
            SourceId::Eurostat => "eurostat",
            SourceId::Imf => "imf",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            SourceId::WorldBank => "World Bank",
            SourceId::Eurostat => "Eurostat",
            SourceId::Imf => "IMF",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How closely a provider's native series matches the canonical indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingQuality {
    /// The native series measures exactly the canonical indicator.
    Exact,
    /// Closest available substitute (different frequency, unit or scope).
    Proxy,
}

impl MappingQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            MappingQuality::Exact => "exact",
            MappingQuality::Proxy => "proxy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointStatus {
    Resolved,
    Unresolved,
}

impl EndpointStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EndpointStatus::Resolved => "resolved",
            EndpointStatus::Unresolved => "unresolved",
        }
    }
}

/// Why a row ended up with its endpoint status.
///
/// Serialized as a flat reason code (`ok`, `missing_required_parameters`, `http_404`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionReason {
    Ok,
    MissingRequiredParameters,
    /// Validator reached the endpoint but it answered with a non-2xx status.
    HttpError(u16),
    /// 2xx response whose media type is not JSON.
    UnsupportedContentType,
    TransportError,
}

impl fmt::Display for ResolutionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionReason::Ok => f.write_str("ok"),
            ResolutionReason::MissingRequiredParameters => f.write_str("missing_required_parameters"),
            ResolutionReason::HttpError(status) => write!(f, "http_{status}"),
            ResolutionReason::UnsupportedContentType => f.write_str("unsupported_content_type"),
            ResolutionReason::TransportError => f.write_str("transport_error"),
        }
    }
}

impl Serialize for ResolutionReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Reporting granularity parsed from a provider-native frequency token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Annual,
    SemiAnnual,
    Quarterly,
    Monthly,
    Weekly,
    Daily,
    /// Token we do not recognize; treated as sub-annual so it still lands on a yearly grid.
    Unknown,
}

impl Frequency {
    /// Token used for `frequency_canonical` on every output row.
    pub const CANONICAL: &'static str = "A";

    pub fn parse(raw: &str) -> Frequency {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" | "Y" | "ANNUAL" | "YEARLY" => Frequency::Annual,
            "S" | "H" | "SEMIANNUAL" => Frequency::SemiAnnual,
            "Q" | "QUARTERLY" => Frequency::Quarterly,
            "M" | "MONTHLY" => Frequency::Monthly,
            "W" | "WEEKLY" => Frequency::Weekly,
            "D" | "B" | "DAILY" => Frequency::Daily,
            _ => Frequency::Unknown,
        }
    }

    pub fn is_sub_annual(self) -> bool {
        !matches!(self, Frequency::Annual)
    }
}

/// One (indicator, source) pairing in the series registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesDescriptor {
    pub indicator_id: String,
    pub source_id: SourceId,
    pub source_name: String,
    pub dataset_code: Option<String>,
    pub indicator_code: Option<String>,
    /// Provider-specific dimension filters, `key=value` pairs joined by `&`.
    pub series_key: Option<String>,
    pub mapping_quality: MappingQuality,
    pub specificity_note: Option<String>,
    pub frequency_raw: String,
    pub unit_raw: String,
    pub country_code: String,
    pub country_code_iso3: String,

    pub resolved_url: Option<String>,
    pub endpoint_status: Option<EndpointStatus>,
    pub resolution_reason: Option<ResolutionReason>,
    /// HTTP status seen by the endpoint validator, if it got that far.
    pub http_status: Option<u16>,
}

impl SeriesDescriptor {
    pub fn is_resolved(&self) -> bool {
        self.endpoint_status == Some(EndpointStatus::Resolved)
    }

    /// Parsed `series_key` filters, in declaration order.
    ///
    /// Returns `None` if the key is absent/blank or any component is malformed
    /// (missing `=`, empty name or empty value).
    pub fn series_filters(&self) -> Option<Vec<(&str, &str)>> {
        let key = self.series_key.as_deref()?.trim();
        if key.is_empty() {
            return None;
        }
        let mut out = Vec::new();
        for part in key.split('&') {
            let (name, value) = part.split_once('=')?;
            let (name, value) = (name.trim(), value.trim());
            if name.is_empty() || value.is_empty() {
                return None;
            }
            out.push((name, value));
        }
        Some(out)
    }
}

/// A single parsed data point before tagging and canonicalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawObservation {
    /// Native period label, e.g. `2020`, `2020-01`, `2020M01`, `2020-Q1`.
    pub period: String,
    pub value: f64,
}

impl RawObservation {
    pub fn new(period: impl Into<String>, value: f64) -> Self {
        Self {
            period: period.into(),
            value,
        }
    }
}

/// Output row of the unified observation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub indicator_id: String,
    pub source_id: SourceId,
    pub mapping_quality: MappingQuality,
    pub period: String,
    pub year: i32,
    pub value: f64,
    pub frequency_raw: String,
    pub frequency_canonical: String,
    pub unit_raw: String,
}

/// Policy for collapsing a sub-annual series onto a yearly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AggregationPolicy {
    /// Arithmetic mean of all periods in the year.
    #[default]
    Mean,
    /// Value of the latest period in the year.
    Last,
}

impl AggregationPolicy {
    pub fn parse(raw: &str) -> Option<AggregationPolicy> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mean" => Some(AggregationPolicy::Mean),
            "last" => Some(AggregationPolicy::Last),
            _ => None,
        }
    }
}

/// Leading four-digit year of a period label (`2020`, `2020-01`, `2020M01`, `2020-Q1`).
pub fn year_of_period(period: &str) -> Option<i32> {
    let head = period.trim().get(..4)?;
    if !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    head.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_reason_codes() {
        assert_eq!(ResolutionReason::Ok.to_string(), "ok");
        assert_eq!(
            ResolutionReason::MissingRequiredParameters.to_string(),
            "missing_required_parameters"
        );
        assert_eq!(ResolutionReason::HttpError(404).to_string(), "http_404");
        assert_eq!(
            serde_json::to_string(&ResolutionReason::TransportError).unwrap(),
            "\"transport_error\""
        );
    }

    #[test]
    fn frequency_tokens() {
        assert_eq!(Frequency::parse("A"), Frequency::Annual);
        assert_eq!(Frequency::parse(" m "), Frequency::Monthly);
        assert!(Frequency::parse("Q").is_sub_annual());
        assert!(!Frequency::parse("annual").is_sub_annual());
        assert!(Frequency::parse("??").is_sub_annual());
    }

    #[test]
    fn aggregation_policy_accepts_only_documented_names() {
        assert_eq!(AggregationPolicy::parse(" Mean "), Some(AggregationPolicy::Mean));
        assert_eq!(AggregationPolicy::parse("last"), Some(AggregationPolicy::Last));
        assert_eq!(AggregationPolicy::parse("avg"), None);
        assert_eq!(AggregationPolicy::parse("average"), None);
    }

    #[test]
    fn year_of_period_handles_common_labels() {
        assert_eq!(year_of_period("2020"), Some(2020));
        assert_eq!(year_of_period("2020-01"), Some(2020));
        assert_eq!(year_of_period("2020M01"), Some(2020));
        assert_eq!(year_of_period("2021-Q3"), Some(2021));
        assert_eq!(year_of_period("20"), None);
        assert_eq!(year_of_period("Y2020"), None);
    }

    #[test]
    fn series_filters_reject_malformed_components() {
        let mut row = SeriesDescriptor {
            indicator_id: "x".into(),
            source_id: SourceId::Eurostat,
            source_name: "Eurostat".into(),
            dataset_code: Some("ds".into()),
            indicator_code: None,
            series_key: Some("freq=A&unit=PC_GDP".into()),
            mapping_quality: MappingQuality::Exact,
            specificity_note: None,
            frequency_raw: "A".into(),
            unit_raw: "PC_GDP".into(),
            country_code: "LT".into(),
            country_code_iso3: "LTU".into(),
            resolved_url: None,
            endpoint_status: None,
            resolution_reason: None,
            http_status: None,
        };
        assert_eq!(
            row.series_filters(),
            Some(vec![("freq", "A"), ("unit", "PC_GDP")])
        );

        row.series_key = Some("freq=A&unit=".into());
        assert_eq!(row.series_filters(), None);
        row.series_key = Some("freq".into());
        assert_eq!(row.series_filters(), None);
        row.series_key = Some("  ".into());
        assert_eq!(row.series_filters(), None);
    }
}
