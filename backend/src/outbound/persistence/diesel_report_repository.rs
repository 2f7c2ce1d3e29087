//! PostgreSQL-backed `ReportRepository` implementation using Diesel ORM.
//!
//! A report is written as one transaction: the report row, then each rule
//! result followed by its violations. Child identifiers are generated here
//! and creation timestamps come from the database, so a stored tree is
//! fully identified only once the transaction commits.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::Text;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{ReportRepository, ReportRepositoryError};
use crate::domain::{
    NewSchemaReport, ReportId, ReportSummary, RuleResult, SchemaReport, SubgraphSummary, Trend,
    UNKNOWN_SUBGRAPH, Violation, ViolationLocation,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{
    NewReportRow, NewRuleResultRow, NewViolationRow, ReportRow, RuleResultRow,
    SubgraphSummaryRow, ViolationRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{rule_results, schema_reports, violations};

const SUBGRAPH_SUMMARIES_SQL: &str = r#"
WITH ranked AS (
    SELECT
        COALESCE(subgraph_name, $1) AS name,
        score,
        "timestamp",
        ROW_NUMBER() OVER (
            PARTITION BY COALESCE(subgraph_name, $1)
            ORDER BY "timestamp" DESC, created_at DESC, id DESC
        ) AS rank,
        COUNT(*) OVER (PARTITION BY COALESCE(subgraph_name, $1)) AS report_count
    FROM schema_reports
)
SELECT
    latest.name,
    latest.score AS latest_score,
    latest."timestamp" AS latest_report,
    latest.report_count,
    previous.score AS previous_score
FROM ranked AS latest
LEFT JOIN ranked AS previous
    ON previous.name = latest.name AND previous.rank = 2
WHERE latest.rank = 1
ORDER BY latest."timestamp" DESC NULLS LAST, latest.name ASC
"#;

/// Diesel-backed implementation of the report repository port.
#[derive(Clone)]
pub struct DieselReportRepository {
    pool: DbPool,
}

impl DieselReportRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReportRepositoryError {
    map_basic_pool_error(error, ReportRepositoryError::connection)
}

fn map_diesel_error(operation: &str) -> impl FnOnce(diesel::result::Error) -> ReportRepositoryError {
    move |error| {
        map_basic_diesel_error(
            error,
            operation,
            ReportRepositoryError::query,
            ReportRepositoryError::connection,
        )
    }
}

fn to_column<T>(value: T, field: &str) -> Result<i32, ReportRepositoryError>
where
    T: TryInto<i32> + Copy + std::fmt::Display,
{
    value.try_into().map_err(|_| {
        ReportRepositoryError::query(format!("{field} value {value} exceeds storage range"))
    })
}

fn from_column(value: i32, field: &str) -> Result<u32, ReportRepositoryError> {
    u32::try_from(value).map_err(|_| {
        ReportRepositoryError::query(format!("stored {field} value {value} is negative"))
    })
}

fn optional_from_column(
    value: Option<i32>,
    field: &str,
) -> Result<Option<u32>, ReportRepositoryError> {
    value.map(|inner| from_column(inner, field)).transpose()
}

/// Rows for one report, converted up front so the transaction only runs SQL.
struct ReportInsert<'a> {
    report: NewReportRow<'a>,
    rule_results: Vec<(NewRuleResultRow<'a>, Vec<NewViolationRow<'a>>)>,
}

fn build_insert(report: &NewSchemaReport) -> Result<ReportInsert<'_>, ReportRepositoryError> {
    let report_id = *report.id().as_uuid();
    let rule_results = report
        .rule_results()
        .iter()
        .enumerate()
        .map(|(position, rule)| {
            let rule_result_id = Uuid::new_v4();
            let violations = rule
                .violations
                .iter()
                .enumerate()
                .map(|(index, violation)| {
                    let location = &violation.location;
                    Ok(NewViolationRow {
                        id: Uuid::new_v4(),
                        rule_result_id,
                        position: to_column(index, "violation position")?,
                        message: violation.message.as_str(),
                        location_line: location
                            .line
                            .map(|line| to_column(line, "location line"))
                            .transpose()?,
                        location_column: location
                            .column
                            .map(|column| to_column(column, "location column"))
                            .transpose()?,
                        location_field: location.field.as_deref(),
                        location_type: location.type_name.as_deref(),
                        location_coordinate: location.coordinate.as_deref(),
                    })
                })
                .collect::<Result<Vec<_>, ReportRepositoryError>>()?;
            let row = NewRuleResultRow {
                id: rule_result_id,
                report_id,
                position: to_column(position, "rule result position")?,
                rule_name: rule.rule_name.as_str(),
                violation_count: to_column(rule.violation_count(), "violation count")?,
                message: rule.message.as_str(),
            };
            Ok((row, violations))
        })
        .collect::<Result<Vec<_>, ReportRepositoryError>>()?;

    Ok(ReportInsert {
        report: NewReportRow {
            id: report_id,
            subgraph_name: report.subgraph_name(),
            score: report.score(),
            total_fields: to_column(report.total_fields(), "total fields")?,
            total_weighted_violations: report.total_weighted_violations(),
            timestamp: report.timestamp(),
            metadata: report.metadata(),
        },
        rule_results,
    })
}

/// Read model for a freshly committed report.
///
/// Child rows default their `created_at` to `NOW()`, which is constant within
/// a transaction, so the report's timestamp applies to the whole tree.
fn stored_tree(
    report: &NewSchemaReport,
    insert: &ReportInsert<'_>,
    created_at: DateTime<Utc>,
) -> SchemaReport {
    let rule_results = report
        .rule_results()
        .iter()
        .zip(&insert.rule_results)
        .map(|(rule, (rule_row, violation_rows))| RuleResult {
            id: rule_row.id,
            report_id: report.id(),
            rule_name: rule.rule_name.clone(),
            violation_count: rule_row.violation_count.unsigned_abs(),
            message: rule.message.clone(),
            violations: rule
                .violations
                .iter()
                .zip(violation_rows)
                .map(|(violation, row)| Violation {
                    id: row.id,
                    rule_result_id: rule_row.id,
                    message: violation.message.clone(),
                    location: violation.location.clone(),
                    created_at,
                })
                .collect(),
            created_at,
        })
        .collect();

    let mut stored = SchemaReport {
        id: report.id(),
        subgraph_name: report.subgraph_name().to_owned(),
        score: report.score(),
        total_fields: report.total_fields(),
        total_weighted_violations: report.total_weighted_violations(),
        timestamp: report.timestamp(),
        metadata: report.metadata().cloned(),
        created_at,
        rule_results,
    };
    stored.apply_read_order();
    stored
}

fn row_to_summary(row: ReportRow) -> Result<ReportSummary, ReportRepositoryError> {
    let ReportRow {
        id,
        subgraph_name,
        score,
        total_fields,
        total_weighted_violations,
        timestamp,
        metadata: _,
        created_at,
    } = row;

    Ok(ReportSummary {
        id: ReportId::from_uuid(id),
        subgraph_name: subgraph_name.unwrap_or_else(|| UNKNOWN_SUBGRAPH.to_owned()),
        score,
        total_fields: from_column(total_fields, "total_fields")?,
        total_weighted_violations,
        timestamp,
        created_at,
    })
}

fn row_to_violation(row: ViolationRow) -> Result<Violation, ReportRepositoryError> {
    Ok(Violation {
        id: row.id,
        rule_result_id: row.rule_result_id,
        message: row.message,
        location: ViolationLocation {
            line: optional_from_column(row.location_line, "location_line")?,
            column: optional_from_column(row.location_column, "location_column")?,
            field: row.location_field,
            type_name: row.location_type,
            coordinate: row.location_coordinate,
        },
        created_at: row.created_at,
    })
}

/// Assemble the report tree, attaching violations to their rule results.
///
/// `rule_rows` and `violation_rows` arrive in read order; grouping keeps it.
fn assemble_report(
    mut report_row: ReportRow,
    rule_rows: Vec<RuleResultRow>,
    violation_rows: Vec<ViolationRow>,
) -> Result<SchemaReport, ReportRepositoryError> {
    let mut grouped: HashMap<Uuid, Vec<Violation>> = HashMap::new();
    for row in violation_rows {
        let violation = row_to_violation(row)?;
        grouped
            .entry(violation.rule_result_id)
            .or_default()
            .push(violation);
    }

    let rule_results = rule_rows
        .into_iter()
        .map(|row| {
            Ok(RuleResult {
                id: row.id,
                report_id: ReportId::from_uuid(row.report_id),
                rule_name: row.rule_name,
                violation_count: from_column(row.violation_count, "violation_count")?,
                message: row.message,
                violations: grouped.remove(&row.id).unwrap_or_default(),
                created_at: row.created_at,
            })
        })
        .collect::<Result<Vec<_>, ReportRepositoryError>>()?;

    let metadata = report_row.metadata.take();
    let summary = row_to_summary(report_row)?;
    Ok(SchemaReport {
        id: summary.id,
        subgraph_name: summary.subgraph_name,
        score: summary.score,
        total_fields: summary.total_fields,
        total_weighted_violations: summary.total_weighted_violations,
        timestamp: summary.timestamp,
        metadata,
        created_at: summary.created_at,
        rule_results,
    })
}

fn row_to_subgraph_summary(
    row: SubgraphSummaryRow,
) -> Result<SubgraphSummary, ReportRepositoryError> {
    let report_count = u64::try_from(row.report_count).map_err(|_| {
        ReportRepositoryError::query(format!("negative report count for {}", row.name))
    })?;
    Ok(SubgraphSummary {
        trend: Trend::from_scores(row.latest_score, row.previous_score),
        name: row.name,
        latest_score: row.latest_score,
        latest_report: row.latest_report,
        report_count,
    })
}

fn limit_to_i64(limit: u32) -> i64 {
    i64::from(limit)
}

#[async_trait]
impl ReportRepository for DieselReportRepository {
    async fn store(&self, report: &NewSchemaReport) -> Result<SchemaReport, ReportRepositoryError> {
        let insert = build_insert(report)?;
        let rows = &insert;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let created_at: DateTime<Utc> = conn
            .transaction(|conn| {
                async move {
                    let created_at = diesel::insert_into(schema_reports::table)
                        .values(&rows.report)
                        .returning(schema_reports::created_at)
                        .get_result::<DateTime<Utc>>(conn)
                        .await?;

                    for (rule_row, violation_rows) in &rows.rule_results {
                        diesel::insert_into(rule_results::table)
                            .values(rule_row)
                            .execute(conn)
                            .await?;
                        if !violation_rows.is_empty() {
                            diesel::insert_into(violations::table)
                                .values(violation_rows)
                                .execute(conn)
                                .await?;
                        }
                    }
                    Ok::<_, diesel::result::Error>(created_at)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error("store report"))?;

        debug!(report_id = %report.id(), %created_at, "report transaction committed");
        Ok(stored_tree(report, &insert, created_at))
    }

    async fn find_by_id(&self, id: &ReportId) -> Result<SchemaReport, ReportRepositoryError> {
        let report_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows = conn
            .transaction(|conn| {
                async move {
                    let Some(report_row) = schema_reports::table
                        .filter(schema_reports::id.eq(report_id))
                        .select(ReportRow::as_select())
                        .first::<ReportRow>(conn)
                        .await
                        .optional()?
                    else {
                        return Ok(None);
                    };

                    let rule_rows: Vec<RuleResultRow> = rule_results::table
                        .filter(rule_results::report_id.eq(report_id))
                        .order((
                            rule_results::violation_count.desc(),
                            rule_results::rule_name.asc(),
                            rule_results::position.asc(),
                        ))
                        .select(RuleResultRow::as_select())
                        .load(conn)
                        .await?;

                    let rule_ids: Vec<Uuid> = rule_rows.iter().map(|row| row.id).collect();
                    let violation_rows: Vec<ViolationRow> = if rule_ids.is_empty() {
                        Vec::new()
                    } else {
                        violations::table
                            .filter(violations::rule_result_id.eq_any(&rule_ids))
                            .order((
                                violations::location_line.asc().nulls_last(),
                                violations::location_column.asc().nulls_last(),
                                violations::position.asc(),
                            ))
                            .select(ViolationRow::as_select())
                            .load(conn)
                            .await?
                    };

                    Ok::<_, diesel::result::Error>(Some((report_row, rule_rows, violation_rows)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error("load report"))?;

        let (report_row, rule_rows, violation_rows) =
            rows.ok_or_else(|| ReportRepositoryError::not_found(*id))?;
        assemble_report(report_row, rule_rows, violation_rows)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<ReportSummary>, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ReportRow> = schema_reports::table
            .order((
                schema_reports::timestamp.desc(),
                schema_reports::created_at.desc(),
                schema_reports::id.desc(),
            ))
            .limit(limit_to_i64(limit))
            .select(ReportRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("list recent reports"))?;

        rows.into_iter().map(row_to_summary).collect()
    }

    async fn list_by_subgraph(
        &self,
        subgraph_name: &str,
        limit: u32,
    ) -> Result<Vec<ReportSummary>, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = schema_reports::table.into_boxed();
        query = if subgraph_name == UNKNOWN_SUBGRAPH {
            query.filter(
                schema_reports::subgraph_name
                    .eq(subgraph_name)
                    .or(schema_reports::subgraph_name.is_null()),
            )
        } else {
            query.filter(schema_reports::subgraph_name.eq(subgraph_name))
        };

        let rows: Vec<ReportRow> = query
            .order((
                schema_reports::timestamp.desc(),
                schema_reports::created_at.desc(),
                schema_reports::id.desc(),
            ))
            .limit(limit_to_i64(limit))
            .select(ReportRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("list subgraph reports"))?;

        rows.into_iter().map(row_to_summary).collect()
    }

    async fn subgraph_summaries(&self) -> Result<Vec<SubgraphSummary>, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<SubgraphSummaryRow> = sql_query(SUBGRAPH_SUMMARIES_SQL)
            .bind::<Text, _>(UNKNOWN_SUBGRAPH)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("summarise subgraphs"))?;

        rows.into_iter().map(row_to_subgraph_summary).collect()
    }

    async fn total_count(&self) -> Result<u64, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = schema_reports::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error("count reports"))?;

        u64::try_from(count)
            .map_err(|_| ReportRepositoryError::query(format!("negative report count {count}")))
    }

    async fn health_check(&self) -> Result<(), ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error("health check"))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion and error mapping.

    use chrono::TimeZone;
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::*;
    use crate::domain::{NewRuleResult, NewViolation, ReportDraft};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[fixture]
    fn report_row() -> ReportRow {
        ReportRow {
            id: Uuid::new_v4(),
            subgraph_name: None,
            score: 64.0,
            total_fields: 30,
            total_weighted_violations: 3.5,
            timestamp: at(9),
            metadata: Some(json!({ "run": 7 })),
            created_at: at(10),
        }
    }

    fn rule_row(report_id: Uuid, name: &str, count: i32) -> RuleResultRow {
        RuleResultRow {
            id: Uuid::new_v4(),
            report_id,
            rule_name: name.to_owned(),
            violation_count: count,
            message: format!("{name} message"),
            created_at: at(10),
        }
    }

    fn violation_row(rule_result_id: Uuid, line: Option<i32>) -> ViolationRow {
        ViolationRow {
            id: Uuid::new_v4(),
            rule_result_id,
            message: "issue".to_owned(),
            location_line: line,
            location_column: None,
            location_field: None,
            location_type: Some("Query".to_owned()),
            location_coordinate: None,
            created_at: at(10),
        }
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(
            repo_err,
            ReportRepositoryError::Connection { message } if message == "connection refused"
        ));
    }

    #[rstest]
    fn diesel_error_carries_operation() {
        let repo_err = map_diesel_error("count reports")(diesel::result::Error::NotFound);
        assert!(matches!(
            repo_err,
            ReportRepositoryError::Query { message } if message.starts_with("count reports: ")
        ));
    }

    #[rstest]
    fn null_subgraph_name_reads_as_unknown(report_row: ReportRow) {
        let summary = row_to_summary(report_row).expect("row converts");
        assert_eq!(summary.subgraph_name, UNKNOWN_SUBGRAPH);
    }

    #[rstest]
    fn negative_stored_integers_are_rejected(mut report_row: ReportRow) {
        report_row.total_fields = -1;
        let error = row_to_summary(report_row).expect_err("negative rejected");
        assert!(matches!(error, ReportRepositoryError::Query { .. }));
    }

    #[rstest]
    fn assemble_groups_violations_under_their_rule(report_row: ReportRow) {
        let first = rule_row(report_row.id, "Alpha", 2);
        let second = rule_row(report_row.id, "Beta", 1);
        let violation_rows = vec![
            violation_row(first.id, Some(1)),
            violation_row(second.id, Some(2)),
            violation_row(first.id, None),
        ];
        let first_id = first.id;

        let report = assemble_report(report_row, vec![first, second], violation_rows)
            .expect("tree assembles");
        assert_eq!(report.metadata, Some(json!({ "run": 7 })));

        let names: Vec<_> = report
            .rule_results
            .iter()
            .map(|rule| rule.rule_name.as_str())
            .collect();
        assert_eq!(names, ["Alpha", "Beta"]);
        let alpha = report.rule_results.as_slice().first().expect("alpha");
        assert_eq!(alpha.id, first_id);
        assert_eq!(alpha.violations.len(), 2);
        let lines: Vec<_> = alpha
            .violations
            .iter()
            .map(|violation| violation.location.line)
            .collect();
        assert_eq!(lines, [Some(1), None]);
    }

    #[rstest]
    #[case::up(85.0, Some(70.0), Trend::Up)]
    #[case::down(70.0, Some(85.0), Trend::Down)]
    #[case::single(70.0, None, Trend::Stable)]
    fn summary_rows_compute_trend(
        #[case] latest: f64,
        #[case] previous: Option<f64>,
        #[case] expected: Trend,
    ) {
        let row = SubgraphSummaryRow {
            name: "catalog".to_owned(),
            latest_score: latest,
            latest_report: at(12),
            report_count: 2,
            previous_score: previous,
        };
        let summary = row_to_subgraph_summary(row).expect("row converts");
        assert_eq!(summary.trend, expected);
        assert_eq!(summary.report_count, 2);
    }

    #[rstest]
    fn build_insert_derives_counts_and_positions() {
        let report = NewSchemaReport::try_from(ReportDraft {
            id: ReportId::random(),
            subgraph_name: Some("catalog".to_owned()),
            score: 50.0,
            total_fields: 9,
            total_weighted_violations: 2.0,
            timestamp: at(8),
            metadata: None,
            rule_results: vec![
                NewRuleResult {
                    rule_name: "first".to_owned(),
                    message: String::new(),
                    violations: Vec::new(),
                },
                NewRuleResult {
                    rule_name: "second".to_owned(),
                    message: String::new(),
                    violations: vec![
                        NewViolation {
                            message: "a".to_owned(),
                            location: ViolationLocation {
                                line: Some(4),
                                ..ViolationLocation::default()
                            },
                        },
                        NewViolation {
                            message: "b".to_owned(),
                            location: ViolationLocation::default(),
                        },
                    ],
                },
            ],
        })
        .expect("draft is valid");

        let insert = build_insert(&report).expect("rows build");

        assert_eq!(insert.report.subgraph_name, "catalog");
        let (second, second_violations) = insert.rule_results.get(1).expect("second rule");
        assert_eq!(second.position, 1);
        assert_eq!(second.violation_count, 2);
        let positions: Vec<_> = second_violations.iter().map(|row| row.position).collect();
        assert_eq!(positions, [0, 1]);
        assert!(second_violations.iter().all(|row| row.rule_result_id == second.id));
    }

    #[rstest]
    fn build_insert_rejects_values_beyond_column_range() {
        let report = NewSchemaReport::try_from(ReportDraft {
            id: ReportId::random(),
            subgraph_name: None,
            score: 1.0,
            total_fields: u32::MAX,
            total_weighted_violations: 0.0,
            timestamp: at(8),
            metadata: None,
            rule_results: Vec::new(),
        })
        .expect("draft is valid");

        let Err(error) = build_insert(&report) else {
            panic!("total fields exceeds INTEGER");
        };
        assert!(matches!(error, ReportRepositoryError::Query { .. }));
    }
}
