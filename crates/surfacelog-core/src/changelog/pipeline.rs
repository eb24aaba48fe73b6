//! Batch changelog generation over a pool of release batches.

use crate::changelog::assembler::{attach_changelog, ChangelogAssembler};
use crate::changelog::strategy::ChangelogStrategy;
use crate::config::ChangelogConfig;
use crate::errors::{ExError, Result};
use crate::layout::LayoutRegistry;
use crate::model::{ReleaseBatch, Series, VersionedRecord};
use crate::{log_op_end, log_op_start, log_series_skipped};
use surfacelog_core_types::{RunContext, RunId};

/// A series that produced no changelog, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSeries {
    pub series_id: String,
    pub code: &'static str,
    pub message: String,
}

/// Summary of one generation run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerationReport {
    pub run_id: RunId,
    pub generated: usize,
    pub skipped: Vec<SkippedSeries>,
}

impl GenerationReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerationOutput {
    /// The newest record of every generated series, changelog attached.
    pub records: Vec<VersionedRecord>,
    pub report: GenerationReport,
}

/// Group `releases` with `strategy` and attach a changelog to the newest
/// record of each series.
///
/// Never fails as a whole: a series whose changelog cannot be built is logged
/// and listed in the report, and the run moves on.
pub fn generate_changelogs(
    strategy: &dyn ChangelogStrategy,
    registry: &LayoutRegistry,
    releases: &[ReleaseBatch],
    config: &ChangelogConfig,
) -> GenerationOutput {
    let ctx = RunContext::new();
    log_op_start!(
        "generate_changelogs",
        run_id = ctx.run_id.as_str(),
        strategy = strategy.name(),
        batch_count = releases.len()
    );
    let start = std::time::Instant::now();

    let mut output = GenerationOutput {
        records: Vec::new(),
        report: GenerationReport {
            run_id: ctx.run_id.clone(),
            ..GenerationReport::default()
        },
    };

    let groups = if strategy.should_generate_changelogs(releases) {
        strategy.group_records(releases)
    } else {
        Vec::new()
    };
    let series_len = groups.len();

    for series in groups {
        match generate_one(strategy, registry, &series, config) {
            Ok(record) => {
                output.records.push(record);
                output.report.generated += 1;
            }
            Err(e) => {
                log_series_skipped!(
                    "generate_changelogs",
                    e.clone(),
                    run_id = ctx.run_id.as_str(),
                    series_id = series.identity()
                );
                let ex: ExError = e.into();
                output.report.skipped.push(SkippedSeries {
                    series_id: series.identity().to_string(),
                    code: ex.code(),
                    message: ex.message().to_string(),
                });
            }
        }
    }

    log_op_end!(
        "generate_changelogs",
        duration_ms = start.elapsed().as_millis() as u64,
        run_id = ctx.run_id.as_str(),
        series_len = series_len,
        entry_count = output.report.generated
    );
    output
}

fn generate_one(
    strategy: &dyn ChangelogStrategy,
    registry: &LayoutRegistry,
    series: &Series,
    config: &ChangelogConfig,
) -> Result<VersionedRecord> {
    let version_key = strategy.version_key();
    let representative = series.representative(version_key)?;
    let layout = registry.layout_for(representative, &config.kind_field)?;
    let changelog = ChangelogAssembler::new(layout, version_key)
        .with_expand_ordered_arrays(config.expand_ordered_arrays)
        .assemble(series)?;
    Ok(attach_changelog(
        representative,
        &changelog,
        &config.changelog_field,
        version_key,
    ))
}
