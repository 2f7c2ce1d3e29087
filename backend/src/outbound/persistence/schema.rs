//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the schema, regenerate with `diesel print-schema` or
//! update by hand.

diesel::table! {
    /// One scoring run submitted by the scanner.
    schema_reports (id) {
        /// Primary key, generated when the submission is translated.
        id -> Uuid,
        /// NULL only on legacy rows; read as `Unknown`.
        subgraph_name -> Nullable<Text>,
        score -> Float8,
        total_fields -> Int4,
        total_weighted_violations -> Float8,
        /// Caller-supplied event time of the run.
        timestamp -> Timestamptz,
        /// Opaque caller metadata.
        metadata -> Nullable<Jsonb>,
        /// Assigned by the database on insert.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Outcome of one rule against one report.
    rule_results (id) {
        id -> Uuid,
        report_id -> Uuid,
        /// Zero-based submission order within the report.
        position -> Int4,
        rule_name -> Text,
        violation_count -> Int4,
        message -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Individual issues flagged by a rule.
    violations (id) {
        id -> Uuid,
        rule_result_id -> Uuid,
        /// Zero-based submission order within the rule result.
        position -> Int4,
        message -> Text,
        location_line -> Nullable<Int4>,
        location_column -> Nullable<Int4>,
        location_field -> Nullable<Text>,
        location_type -> Nullable<Text>,
        location_coordinate -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(rule_results -> schema_reports (report_id));
diesel::joinable!(violations -> rule_results (rule_result_id));

diesel::allow_tables_to_appear_in_same_query!(schema_reports, rule_results, violations);
