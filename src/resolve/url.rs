//! Provider URL templates.

use crate::domain::{SeriesDescriptor, SourceId};

pub const WORLD_BANK_BASE_URL: &str = "https://api.worldbank.org/v2";
pub const EUROSTAT_BASE_URL: &str = "https://ec.europa.eu/eurostat/api/dissemination/statistics/1.0/data";
pub const IMF_BASE_URL: &str = "https://www.imf.org/external/datamapper/api/v1";

/// Build the request URL for a registry row.
///
/// Returns `None` when a field the source's template needs is absent or blank;
/// nothing is ever substituted with a placeholder.
pub fn resolve_url(row: &SeriesDescriptor) -> Option<String> {
    match row.source_id {
        SourceId::WorldBank => {
            let indicator = required(row.indicator_code.as_deref())?;
            let country = required(Some(row.country_code.as_str()))?;
            Some(format!(
                "{WORLD_BANK_BASE_URL}/country/{country}/indicator/{indicator}?format=json"
            ))
        }
        SourceId::Eurostat => {
            let dataset = required(row.dataset_code.as_deref())?;
            let country = required(Some(row.country_code.as_str()))?;
            let filters = row.series_filters()?;

            let mut url = format!("{EUROSTAT_BASE_URL}/{dataset}?geo={country}");
            for (name, value) in filters {
                if name.eq_ignore_ascii_case("geo") {
                    continue;
                }
                url.push('&');
                url.push_str(name);
                url.push('=');
                url.push_str(value);
            }
            url.push_str("&format=JSON&lang=EN");
            Some(url)
        }
        SourceId::Imf => {
            let indicator = required(row.indicator_code.as_deref())?;
            let country = required(Some(row.country_code_iso3.as_str()))?;
            Some(format!("{IMF_BASE_URL}/{indicator}/{country}"))
        }
    }
}

fn required(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|v| !v.is_empty())
}
