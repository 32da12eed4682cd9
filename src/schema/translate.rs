//! Source-language to canonical column-name translation.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::parser::Table;

#[derive(Debug, Deserialize)]
struct TranslationEntry {
    ee: String,
    en: String,
}

/// Column-name mapping, loaded from a JSON array:
/// ```json
/// [
///   { "ee": "Juhtumi nr", "en": "case_number" },
///   { "ee": "Toimumisaeg", "en": "time" }
/// ]
/// ```
#[derive(Debug, Clone, Default)]
pub struct Translations {
    entries: Vec<(String, String)>,
    lookup: HashMap<String, String>,
}

impl Translations {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read translation table '{path}'"))?;
        Self::from_json(&content).with_context(|| format!("Invalid translation table '{path}'"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let entries: Vec<TranslationEntry> = serde_json::from_str(content)?;
        Ok(Self::from_pairs(entries.into_iter().map(|e| (e.ee, e.en))))
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let mut translations = Translations::default();
        for (source, canonical) in pairs {
            let (source, canonical) = (source.into(), canonical.into());
            // Later entries win.
            if translations
                .lookup
                .insert(source.clone(), canonical.clone())
                .is_none()
            {
                translations.entries.push((source, canonical));
            } else if let Some(entry) = translations.entries.iter_mut().find(|(s, _)| *s == source)
            {
                entry.1 = canonical;
            }
        }
        translations
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.lookup.get(source).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Translation mismatches found while renaming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationReport {
    /// Table columns with no mapping entry, left unrenamed.
    pub untranslated: Vec<String>,
    /// Mapping entries whose source column is not in the table.
    pub stale: Vec<String>,
}

impl TranslationReport {
    pub fn is_clean(&self) -> bool {
        self.untranslated.is_empty() && self.stale.is_empty()
    }
}

/// Renames table columns through `translations`, warning about mismatches.
///
/// Never drops a column and never fails.
pub fn rename_with_check(mut table: Table, translations: &Translations) -> (Table, TranslationReport) {
    let present: HashSet<&str> = table.headers.iter().map(String::as_str).collect();

    let report = TranslationReport {
        untranslated: table
            .headers
            .iter()
            .filter(|h| translations.get(h).is_none())
            .cloned()
            .collect(),
        stale: translations
            .entries
            .iter()
            .filter(|(source, _)| !present.contains(source.as_str()))
            .map(|(source, _)| source.clone())
            .collect(),
    };

    if !report.untranslated.is_empty() {
        warn!(
            columns = %report.untranslated.join(", "),
            "No translations found for the following columns"
        );
    }
    if !report.stale.is_empty() {
        warn!(
            translations = %report.stale.join(", "),
            "No matching columns found for the following translations"
        );
    }

    for header in &mut table.headers {
        if let Some(canonical) = translations.get(header) {
            *header = canonical.to_string();
        }
    }

    (table, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str]) -> Table {
        Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: vec![headers.iter().map(|_| Some("1".to_string())).collect()],
        }
    }

    #[test]
    fn test_renames_known_columns() {
        let translations =
            Translations::from_pairs([("Juhtumi nr", "case_number"), ("Toimumisaeg", "time")]);
        let (renamed, report) = rename_with_check(table(&["Juhtumi nr", "Toimumisaeg"]), &translations);
        assert_eq!(renamed.headers, vec!["case_number", "time"]);
        assert!(report.is_clean());
    }

    #[test]
    fn test_untranslated_columns_pass_through() {
        let translations = Translations::from_pairs([("Juhtumi nr", "case_number")]);
        let (renamed, report) = rename_with_check(table(&["Juhtumi nr", "Ilmastik"]), &translations);
        assert_eq!(renamed.headers, vec!["case_number", "Ilmastik"]);
        assert_eq!(report.untranslated, vec!["Ilmastik"]);
        assert_eq!(renamed.rows[0].len(), 2);
    }

    #[test]
    fn test_stale_entries_are_reported() {
        let translations =
            Translations::from_pairs([("Juhtumi nr", "case_number"), ("Tee km", "route_km_marker")]);
        let (_, report) = rename_with_check(table(&["Juhtumi nr"]), &translations);
        assert_eq!(report.stale, vec!["Tee km"]);
        assert!(report.untranslated.is_empty());
    }

    #[test]
    fn test_from_json_reads_ee_en_entries() {
        let translations =
            Translations::from_json(r#"[{"ee": "Tee km", "en": "route_km_marker"}]"#).unwrap();
        assert_eq!(translations.get("Tee km"), Some("route_km_marker"));
        assert_eq!(translations.len(), 1);
    }

    #[test]
    fn test_bundled_translation_table_covers_required_columns() {
        let translations =
            Translations::from_json(include_str!("../../data/column_name_translations.json"))
                .unwrap();
        let canonical: HashSet<&str> = translations.entries.iter().map(|(_, en)| en.as_str()).collect();
        for column in crate::schema::Column::required() {
            assert!(canonical.contains(column.name()), "missing {column}");
        }
    }
}
