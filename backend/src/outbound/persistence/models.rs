//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Nullable, Text, Timestamptz};
use uuid::Uuid;

use super::schema::{rule_results, schema_reports, violations};

/// Row struct for reading from the schema_reports table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schema_reports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReportRow {
    pub id: Uuid,
    pub subgraph_name: Option<String>,
    pub score: f64,
    pub total_fields: i32,
    pub total_weighted_violations: f64,
    pub timestamp: DateTime<Utc>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for new reports; `created_at` comes from the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema_reports)]
pub(crate) struct NewReportRow<'a> {
    pub id: Uuid,
    pub subgraph_name: &'a str,
    pub score: f64,
    pub total_fields: i32,
    pub total_weighted_violations: f64,
    pub timestamp: DateTime<Utc>,
    pub metadata: Option<&'a serde_json::Value>,
}

/// Row struct for reading from the rule_results table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = rule_results)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RuleResultRow {
    pub id: Uuid,
    pub report_id: Uuid,
    pub rule_name: String,
    pub violation_count: i32,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rule_results)]
pub(crate) struct NewRuleResultRow<'a> {
    pub id: Uuid,
    pub report_id: Uuid,
    pub position: i32,
    pub rule_name: &'a str,
    pub violation_count: i32,
    pub message: &'a str,
}

/// Row struct for reading from the violations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = violations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ViolationRow {
    pub id: Uuid,
    pub rule_result_id: Uuid,
    pub message: String,
    pub location_line: Option<i32>,
    pub location_column: Option<i32>,
    pub location_field: Option<String>,
    pub location_type: Option<String>,
    pub location_coordinate: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = violations)]
pub(crate) struct NewViolationRow<'a> {
    pub id: Uuid,
    pub rule_result_id: Uuid,
    pub position: i32,
    pub message: &'a str,
    pub location_line: Option<i32>,
    pub location_column: Option<i32>,
    pub location_field: Option<&'a str>,
    pub location_type: Option<&'a str>,
    pub location_coordinate: Option<&'a str>,
}

/// Result row of the per-subgraph summary query.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct SubgraphSummaryRow {
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = Double)]
    pub latest_score: f64,
    #[diesel(sql_type = Timestamptz)]
    pub latest_report: DateTime<Utc>,
    #[diesel(sql_type = BigInt)]
    pub report_count: i64,
    #[diesel(sql_type = Nullable<Double>)]
    pub previous_score: Option<f64>,
}
