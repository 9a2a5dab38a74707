//! Indicator → source mapping table and the registry builder.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info};

use crate::domain::MappingQuality::{Exact, Proxy};
use crate::domain::{MappingQuality, SeriesDescriptor, SourceId};
use crate::error::PipelineError;
use crate::registry::countries::{Country, lookup_country};
use crate::resolve::url::resolve_url;

/// One provider's native series for a canonical indicator.
#[derive(Debug, Clone, Copy)]
struct SourceMapping {
    source_id: SourceId,
    dataset_code: Option<&'static str>,
    indicator_code: Option<&'static str>,
    /// Dimension filters without `geo`; the country is added at resolution time.
    series_key: Option<&'static str>,
    quality: MappingQuality,
    note: Option<&'static str>,
    frequency: &'static str,
    unit: &'static str,
}

#[derive(Debug, Clone, Copy)]
struct IndicatorSpec {
    id: &'static str,
    label: &'static str,
    sources: &'static [SourceMapping],
}

const fn world_bank(code: &'static str, quality: MappingQuality, note: Option<&'static str>, unit: &'static str) -> SourceMapping {
    SourceMapping {
        source_id: SourceId::WorldBank,
        dataset_code: Some("WDI"),
        indicator_code: Some(code),
        series_key: None,
        quality,
        note,
        frequency: "A",
        unit,
    }
}

const fn eurostat(
    dataset: &'static str,
    series_key: &'static str,
    quality: MappingQuality,
    note: Option<&'static str>,
    frequency: &'static str,
    unit: &'static str,
) -> SourceMapping {
    SourceMapping {
        source_id: SourceId::Eurostat,
        dataset_code: Some(dataset),
        indicator_code: None,
        series_key: Some(series_key),
        quality,
        note,
        frequency,
        unit,
    }
}

const fn imf(code: &'static str, quality: MappingQuality, note: Option<&'static str>, unit: &'static str) -> SourceMapping {
    SourceMapping {
        source_id: SourceId::Imf,
        dataset_code: Some("WEO"),
        indicator_code: Some(code),
        series_key: None,
        quality,
        note,
        frequency: "A",
        unit,
    }
}

static CATALOG: &[IndicatorSpec] = &[
    IndicatorSpec {
        id: "gdp_current_usd",
        label: "GDP, current US$",
        sources: &[
            world_bank("NY.GDP.MKTP.CD", Exact, None, "current US$"),
            eurostat(
                "nama_10_gdp",
                "freq=A&unit=CP_MEUR&na_item=B1GQ",
                Proxy,
                Some("Million EUR at current prices, not US$"),
                "A",
                "CP_MEUR",
            ),
            imf(
                "NGDPD",
                Proxy,
                Some("Billions of US$; WEO vintage includes staff projections"),
                "billions US$",
            ),
        ],
    },
    IndicatorSpec {
        id: "gdp_growth_real",
        label: "Real GDP growth, annual %",
        sources: &[
            world_bank("NY.GDP.MKTP.KD.ZG", Exact, None, "annual %"),
            eurostat(
                "nama_10_gdp",
                "freq=A&unit=CLV_PCH_PRE&na_item=B1GQ",
                Exact,
                None,
                "A",
                "CLV_PCH_PRE",
            ),
            imf("NGDP_RPCH", Exact, None, "annual %"),
        ],
    },
    IndicatorSpec {
        id: "inflation_cpi_yoy",
        label: "CPI inflation, annual %",
        sources: &[
            world_bank("FP.CPI.TOTL.ZG", Exact, None, "annual %"),
            eurostat(
                "prc_hicp_manr",
                "freq=M&unit=RCH_A&coicop=CP00",
                Proxy,
                Some("Monthly HICP annual rate of change; averaged to annual"),
                "M",
                "RCH_A",
            ),
            imf("PCPIPCH", Exact, None, "annual % (period average)"),
        ],
    },
    IndicatorSpec {
        id: "unemployment_rate",
        label: "Unemployment rate, % of labour force",
        sources: &[
            world_bank(
                "SL.UEM.TOTL.ZS",
                Proxy,
                Some("ILO modelled estimate, ages 15+"),
                "% of labour force",
            ),
            eurostat(
                "une_rt_a",
                "freq=A&age=Y15-74&sex=T&unit=PC_ACT",
                Exact,
                None,
                "A",
                "PC_ACT",
            ),
            imf("LUR", Exact, None, "% of labour force"),
        ],
    },
    IndicatorSpec {
        id: "lending_interest_rate",
        label: "Lending interest rate, %",
        sources: &[
            world_bank("FR.INR.LEND", Exact, None, "%"),
            eurostat(
                "irt_lt_mcby_m",
                "freq=M&int_rt=MCBY",
                Proxy,
                Some("Monthly 10-year government bond yield (convergence criterion), not bank lending"),
                "M",
                "PC",
            ),
        ],
    },
    IndicatorSpec {
        id: "current_account_pct_gdp",
        label: "Current account balance, % of GDP",
        sources: &[
            world_bank("BN.CAB.XOKA.GD.ZS", Exact, None, "% of GDP"),
            eurostat(
                "bop_gdp6_q",
                "freq=Q&bop_item=CA&stk_flow=BAL&partner=WRL_REST&unit=PC_GDP&s_adj=NSA",
                Proxy,
                Some("Quarterly ratios averaged to annual"),
                "Q",
                "PC_GDP",
            ),
            imf("BCA_NGDPD", Exact, None, "% of GDP"),
        ],
    },
    IndicatorSpec {
        id: "government_debt_pct_gdp",
        label: "General government gross debt, % of GDP",
        sources: &[
            world_bank(
                "GC.DOD.TOTL.GD.ZS",
                Proxy,
                Some("Central government only"),
                "% of GDP",
            ),
            eurostat(
                "gov_10dd_edpt1",
                "freq=A&unit=PC_GDP&sector=S13&na_item=GD",
                Exact,
                None,
                "A",
                "PC_GDP",
            ),
            imf("GGXWDG_NGDP", Exact, None, "% of GDP"),
        ],
    },
];

/// Minimum number of distinct sources required for the core indicators.
const CORE_COVERAGE: &[(&str, usize)] = &[
    ("gdp_current_usd", 3),
    ("inflation_cpi_yoy", 3),
    ("lending_interest_rate", 2),
];

/// Canonical indicator ids, in catalog order.
pub fn canonical_indicators() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|spec| spec.id)
}

/// Human-readable label for a canonical indicator id.
pub fn indicator_label(indicator_id: &str) -> Option<&'static str> {
    CATALOG.iter().find(|spec| spec.id == indicator_id).map(|spec| spec.label)
}

/// Build the series registry for one country.
///
/// Rows are emitted indicator by indicator, sources in catalog order, with
/// `resolved_url` pre-filled. Endpoint status is left empty for the
/// resolution stage.
pub fn build_series_registry(country_code: &str) -> Result<Vec<SeriesDescriptor>, PipelineError> {
    let country = lookup_country(country_code).ok_or_else(|| {
        PipelineError::Configuration(format!(
            "unsupported country code '{country_code}': no ISO3 mapping"
        ))
    })?;

    let mut rows = Vec::new();
    for spec in CATALOG {
        for mapping in spec.sources {
            rows.push(descriptor(spec, mapping, country));
        }
    }

    check_registry_coverage(&rows)?;

    info!(
        country = country.iso2,
        rows = rows.len(),
        indicators = CATALOG.len(),
        "built series registry"
    );
    Ok(rows)
}

fn descriptor(spec: &IndicatorSpec, mapping: &SourceMapping, country: &Country) -> SeriesDescriptor {
    let country_code = match mapping.source_id {
        SourceId::Eurostat => country.eurostat_geo,
        SourceId::WorldBank | SourceId::Imf => country.iso2,
    };

    let mut row = SeriesDescriptor {
        indicator_id: spec.id.to_string(),
        source_id: mapping.source_id,
        source_name: mapping.source_id.display_name().to_string(),
        dataset_code: mapping.dataset_code.map(str::to_string),
        indicator_code: mapping.indicator_code.map(str::to_string),
        series_key: mapping.series_key.map(str::to_string),
        mapping_quality: mapping.quality,
        specificity_note: mapping.note.map(str::to_string),
        frequency_raw: mapping.frequency.to_string(),
        unit_raw: mapping.unit.to_string(),
        country_code: country_code.to_string(),
        country_code_iso3: country.iso3.to_string(),
        resolved_url: None,
        endpoint_status: None,
        resolution_reason: None,
        http_status: None,
    };
    row.resolved_url = resolve_url(&row);
    debug!(
        indicator = spec.id,
        source = %mapping.source_id,
        url = row.resolved_url.as_deref().unwrap_or("-"),
        "registry row"
    );
    row
}

/// Verify the registry's mapping invariants.
///
/// - every canonical indicator has at least one mapping
/// - core indicators reach their minimum number of distinct sources
/// - every proxy mapping carries a specificity note
pub fn check_registry_coverage(rows: &[SeriesDescriptor]) -> Result<(), PipelineError> {
    let mut sources: HashMap<&str, BTreeSet<SourceId>> = HashMap::new();
    for row in rows {
        sources
            .entry(row.indicator_id.as_str())
            .or_default()
            .insert(row.source_id);

        if row.mapping_quality == MappingQuality::Proxy
            && row.specificity_note.as_deref().is_none_or(|n| n.trim().is_empty())
        {
            return Err(PipelineError::Configuration(format!(
                "proxy mapping {}/{} has no specificity note",
                row.indicator_id, row.source_id
            )));
        }
    }

    for indicator in canonical_indicators() {
        if !sources.contains_key(indicator) {
            return Err(PipelineError::Configuration(format!(
                "indicator '{indicator}' has no source mapping"
            )));
        }
    }

    for &(indicator, minimum) in CORE_COVERAGE {
        let n = sources.get(indicator).map(BTreeSet::len).unwrap_or(0);
        if n < minimum {
            return Err(PipelineError::Configuration(format!(
                "indicator '{indicator}' is mapped by {n} source(s); at least {minimum} required"
            )));
        }
    }

    Ok(())
}
