//! Static country-code table.

/// Codes for one country in each provider's preferred system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    /// ISO 3166-1 alpha-2 (World Bank).
    pub iso2: &'static str,
    /// ISO 3166-1 alpha-3 (IMF datamapper).
    pub iso3: &'static str,
    /// Eurostat `geo` code; differs from ISO2 for Greece.
    pub eurostat_geo: &'static str,
    pub name: &'static str,
}

const fn country(iso2: &'static str, iso3: &'static str, eurostat_geo: &'static str, name: &'static str) -> Country {
    Country {
        iso2,
        iso3,
        eurostat_geo,
        name,
    }
}

static COUNTRIES: &[Country] = &[
    country("AT", "AUT", "AT", "Austria"),
    country("BE", "BEL", "BE", "Belgium"),
    country("DE", "DEU", "DE", "Germany"),
    country("DK", "DNK", "DK", "Denmark"),
    country("EE", "EST", "EE", "Estonia"),
    country("ES", "ESP", "ES", "Spain"),
    country("FI", "FIN", "FI", "Finland"),
    country("FR", "FRA", "FR", "France"),
    country("GR", "GRC", "EL", "Greece"),
    country("IE", "IRL", "IE", "Ireland"),
    country("IT", "ITA", "IT", "Italy"),
    country("LT", "LTU", "LT", "Lithuania"),
    country("LV", "LVA", "LV", "Latvia"),
    country("NL", "NLD", "NL", "Netherlands"),
    country("PL", "POL", "PL", "Poland"),
    country("PT", "PRT", "PT", "Portugal"),
    country("SE", "SWE", "SE", "Sweden"),
];

/// Every country the registry can be built for.
pub fn supported_countries() -> &'static [Country] {
    COUNTRIES
}

/// Look up a country by its 2-letter code (case-insensitive; `EL` is accepted for Greece).
pub fn lookup_country(code: &str) -> Option<&'static Country> {
    let code = code.trim();
    COUNTRIES
        .iter()
        .find(|c| c.iso2.eq_ignore_ascii_case(code) || c.eurostat_geo.eq_ignore_ascii_case(code))
}
