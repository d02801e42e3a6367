use rand::Rng;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

use crate::quiz::Country;

/// Every question needs one target and three distractors.
pub const MIN_COUNTRIES: usize = 4;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog has {found} unique countries, at least {MIN_COUNTRIES} are required")]
    TooFewCountries { found: usize },
    #[error("country code '{0}' appears more than once")]
    DuplicateCode(String),
    #[error("country name '{0}' appears more than once")]
    DuplicateName(String),
    #[error("catalog entry #{0} has a blank code or name")]
    BlankEntry(usize),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
}

// ISO 3166-1 alpha-2, lowercase to match flag image URLs
const BUILTIN_COUNTRIES: &[(&str, &str)] = &[
    ("ar", "Argentina"),
    ("au", "Australia"),
    ("at", "Austria"),
    ("bd", "Bangladesh"),
    ("be", "Belgium"),
    ("br", "Brazil"),
    ("ca", "Canada"),
    ("cl", "Chile"),
    ("cn", "China"),
    ("co", "Colombia"),
    ("hr", "Croatia"),
    ("cu", "Cuba"),
    ("cz", "Czechia"),
    ("dk", "Denmark"),
    ("eg", "Egypt"),
    ("ee", "Estonia"),
    ("et", "Ethiopia"),
    ("fi", "Finland"),
    ("fr", "France"),
    ("de", "Germany"),
    ("gh", "Ghana"),
    ("gr", "Greece"),
    ("hu", "Hungary"),
    ("is", "Iceland"),
    ("in", "India"),
    ("id", "Indonesia"),
    ("ie", "Ireland"),
    ("il", "Israel"),
    ("it", "Italy"),
    ("jm", "Jamaica"),
    ("jp", "Japan"),
    ("ke", "Kenya"),
    ("lv", "Latvia"),
    ("lt", "Lithuania"),
    ("mx", "Mexico"),
    ("ma", "Morocco"),
    ("np", "Nepal"),
    ("nl", "Netherlands"),
    ("nz", "New Zealand"),
    ("ng", "Nigeria"),
    ("no", "Norway"),
    ("pk", "Pakistan"),
    ("pe", "Peru"),
    ("ph", "Philippines"),
    ("pl", "Poland"),
    ("pt", "Portugal"),
    ("ro", "Romania"),
    ("sa", "Saudi Arabia"),
    ("za", "South Africa"),
    ("kr", "South Korea"),
    ("es", "Spain"),
    ("se", "Sweden"),
    ("ch", "Switzerland"),
    ("th", "Thailand"),
    ("tr", "Turkey"),
    ("ua", "Ukraine"),
    ("gb", "United Kingdom"),
    ("us", "United States"),
    ("uy", "Uruguay"),
    ("vn", "Vietnam"),
];

/// Read-only list of countries questions are drawn from.
///
/// Only constructible through validation, so holding one guarantees at least
/// [`MIN_COUNTRIES`] entries with distinct codes and distinct names. Names
/// must be unique too, since players answer by tapping a name.
#[derive(Debug, Clone)]
pub struct CountryCatalog {
    countries: Vec<Country>,
}

impl CountryCatalog {
    pub fn new(countries: Vec<Country>) -> Result<Self, CatalogError> {
        let mut seen_codes = HashSet::new();
        let mut seen_names = HashSet::new();
        for (idx, country) in countries.iter().enumerate() {
            if country.code.trim().is_empty() || country.name.trim().is_empty() {
                return Err(CatalogError::BlankEntry(idx));
            }
            if !seen_codes.insert(country.code.as_str()) {
                return Err(CatalogError::DuplicateCode(country.code.clone()));
            }
            // Same folding as `Question::find_option`
            if !seen_names.insert(country.name.trim().to_ascii_lowercase()) {
                return Err(CatalogError::DuplicateName(country.name.clone()));
            }
        }
        if countries.len() < MIN_COUNTRIES {
            return Err(CatalogError::TooFewCountries {
                found: countries.len(),
            });
        }

        Ok(Self { countries })
    }

    pub fn builtin() -> Result<Self, CatalogError> {
        let countries = BUILTIN_COUNTRIES
            .iter()
            .map(|(code, name)| Country::new(*code, *name))
            .collect();
        Self::new(countries)
    }

    /// Expects a JSON array of `{ "code": ..., "name": ... }` objects.
    pub fn from_reader(reader: impl Read) -> Result<Self, CatalogError> {
        let countries: Vec<Country> = serde_json::from_reader(reader)?;
        Self::new(countries)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn get_random_country<R: Rng + ?Sized>(&self, rng: &mut R) -> &Country {
        let idx = rng.gen_range(0..self.countries.len());
        &self.countries[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn countries(codes: &[&str]) -> Vec<Country> {
        codes
            .iter()
            .map(|code| Country::new(*code, code.to_uppercase()))
            .collect()
    }

    #[test]
    fn builtin_catalog_passes_validation() {
        let builtin = CountryCatalog::builtin().unwrap();
        assert_eq!(builtin.countries().len(), BUILTIN_COUNTRIES.len());
    }

    #[test]
    fn rejects_catalog_smaller_than_four() {
        let err = CountryCatalog::new(countries(&["a", "b", "c"])).unwrap_err();
        assert!(matches!(err, CatalogError::TooFewCountries { found: 3 }));
    }

    #[test]
    fn rejects_duplicate_codes() {
        let err = CountryCatalog::new(countries(&["a", "b", "c", "d", "b"])).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateCode(code) if code == "b"));
    }

    #[test]
    fn duplicates_cannot_pad_a_small_catalog() {
        let err = CountryCatalog::new(countries(&["a", "a", "b", "c"])).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateCode(_)));
    }

    #[test]
    fn rejects_names_that_only_differ_in_case_or_spacing() {
        let list = vec![
            Country::new("cd", "Congo"),
            Country::new("cg", " congo "),
            Country::new("fr", "France"),
            Country::new("de", "Germany"),
        ];
        let err = CountryCatalog::new(list).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateName(name) if name == " congo "));
    }

    #[test]
    fn rejects_blank_entries() {
        let mut list = countries(&["a", "b", "c", "d"]);
        list[2].name = "  ".to_string();
        let err = CountryCatalog::new(list).unwrap_err();
        assert!(matches!(err, CatalogError::BlankEntry(2)));
    }

    #[test]
    fn loads_catalog_from_json() {
        let json = r#"[
            {"code": "fr", "name": "France"},
            {"code": "de", "name": "Germany"},
            {"code": "it", "name": "Italy"},
            {"code": "es", "name": "Spain"}
        ]"#;
        let catalog = CountryCatalog::from_reader(json.as_bytes()).unwrap();
        assert_eq!(catalog.countries().len(), 4);
        assert_eq!(catalog.countries()[1], Country::new("de", "Germany"));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let err = CountryCatalog::from_reader("not json".as_bytes()).unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = CountryCatalog::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }

    #[test]
    fn random_country_comes_from_catalog() {
        let catalog = CountryCatalog::new(countries(&["a", "b", "c", "d"])).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let picked = catalog.get_random_country(&mut rng);
            assert!(catalog.countries().contains(picked));
        }
    }
}
