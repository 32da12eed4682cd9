use crate::analyzers::aggregate::aggregate_by_day;
use crate::analyzers::join::join_categories;
use crate::analyzers::types::{DaySeries, JoinedDaySeries};
use crate::config::RunConfig;
use crate::filter::filter_area;
use crate::normalize::{NormalizeSummary, normalize};
use crate::parser::Table;
use crate::schema::{AccidentRecord, TranslationReport, Translations, rename_with_check};
use crate::stats::{CategoryStats, InterventionStats, Period};
use anyhow::{Result, bail};
use tracing::{info, warn};

/// Everything one analysis run produces.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub translation: TranslationReport,
    pub normalize: NormalizeSummary,
    pub filtered: Vec<AccidentRecord>,
    pub series: Vec<DaySeries>,
    pub joined: JoinedDaySeries,
    pub stats: Vec<CategoryStats>,
    pub intervention: Vec<InterventionStats>,
}

/// Runs translation, normalization, area filtering, aggregation and the join
/// over a raw source table.
#[tracing::instrument(skip_all, fields(rows = table.len()))]
pub fn analyze(table: Table, translations: &Translations, config: &RunConfig) -> Result<AnalysisOutput> {
    config.validate()?;

    let (table, translation) = rename_with_check(table, translations);
    let normalized = normalize(&table, config.missing_values)?;
    let filtered = filter_area(&normalized.records, &config.area);

    let rules = config.category_rules();
    let [first, second] = rules.as_slice() else {
        bail!("expected two categories, got {}", rules.len());
    };

    let series = vec![
        aggregate_by_day(&filtered, first),
        aggregate_by_day(&filtered, second),
    ];
    let joined = join_categories(&series[0], &series[1])?;

    let stats: Vec<CategoryStats> = rules
        .iter()
        .map(|rule| CategoryStats::from_records(rule, Period::All, &filtered))
        .collect();
    for s in stats.iter().filter(|s| !s.has_data()) {
        warn!(category = %s.category, "No data for category");
    }

    let intervention = match config.intervention_date {
        Some(date) => rules
            .iter()
            .map(|rule| InterventionStats::from_records(rule, date, &filtered))
            .collect(),
        None => Vec::new(),
    };

    let [first_total, second_total] = joined.totals();
    info!(
        filtered = filtered.len(),
        days = joined.rows.len(),
        first = %first.name,
        first_total,
        second = %second.name,
        second_total,
        "Analysis complete"
    );

    Ok(AnalysisOutput {
        translation,
        normalize: normalized.summary,
        filtered,
        series,
        joined,
        stats,
        intervention,
    })
}
