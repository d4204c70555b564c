//! PostgreSQL event store
//!
//! The table carries a trigger that rejects UPDATE and DELETE, so even a
//! direct SQL session cannot rewrite history. This layer only ever issues
//! INSERT and SELECT.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::EventStore;
use crate::audit::error::{AuditError, AuditResult};
use crate::audit::models::{
    AuditEvent, AuditQueryLog, EventFilter, NewAuditEvent, NewQueryLog,
};

const EVENT_COLUMNS: &str = "id, timestamp, event_type, severity, user_id, user_email, \
     target_type, target_id, target_repr, client_id, household_id, \
     description, data, old_values, new_values, ip_address, user_agent, request_id";

/// Event store backed by the `audit_events` table
#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// A primary-key conflict means somebody tried to write over an existing
/// event id.
fn map_insert_error(err: sqlx::Error) -> AuditError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return AuditError::ImmutabilityViolation;
        }
    }
    AuditError::Storage(err)
}

/// Append filter conditions and collect the SQL fragments, numbering binds
/// in the order the values will be attached.
fn push_filter_conditions(filter: &EventFilter, sql: &mut String, bind_count: &mut usize) {
    let mut conditions = Vec::new();

    if filter.event_type.is_some() {
        conditions.push(format!("event_type = ${}", bind_count));
        *bind_count += 1;
    }
    if filter.severity.is_some() {
        conditions.push(format!("severity = ${}", bind_count));
        *bind_count += 1;
    }
    if filter.user_id.is_some() {
        conditions.push(format!("user_id = ${}", bind_count));
        *bind_count += 1;
    }
    if filter.target_type.is_some() {
        conditions.push(format!("target_type = ${}", bind_count));
        *bind_count += 1;
    }
    if filter.target_id.is_some() {
        conditions.push(format!("target_id = ${}", bind_count));
        *bind_count += 1;
    }
    if filter.client_id.is_some() {
        conditions.push(format!("client_id = ${}", bind_count));
        *bind_count += 1;
    }
    if filter.household_id.is_some() {
        conditions.push(format!("household_id = ${}", bind_count));
        *bind_count += 1;
    }
    if filter.start_time.is_some() {
        conditions.push(format!("timestamp >= ${}", bind_count));
        *bind_count += 1;
    }
    if filter.end_time.is_some() {
        conditions.push(format!("timestamp <= ${}", bind_count));
        *bind_count += 1;
    }

    for condition in conditions {
        sql.push_str(" AND ");
        sql.push_str(&condition);
    }
}

/// Attach filter values in the same order the conditions were numbered
fn bind_filter_values<'q>(
    filter: &'q EventFilter,
    mut query: sqlx::query::QueryAs<'q, sqlx::Postgres, AuditEvent, sqlx::postgres::PgArguments>,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, AuditEvent, sqlx::postgres::PgArguments> {
    if let Some(event_type) = filter.event_type {
        query = query.bind(event_type.as_str());
    }
    if let Some(severity) = filter.severity {
        query = query.bind(severity.as_str());
    }
    if let Some(user_id) = filter.user_id {
        query = query.bind(user_id);
    }
    if let Some(ref target_type) = filter.target_type {
        query = query.bind(target_type);
    }
    if let Some(ref target_id) = filter.target_id {
        query = query.bind(target_id);
    }
    if let Some(client_id) = filter.client_id {
        query = query.bind(client_id);
    }
    if let Some(household_id) = filter.household_id {
        query = query.bind(household_id);
    }
    if let Some(start_time) = filter.start_time {
        query = query.bind(start_time);
    }
    if let Some(end_time) = filter.end_time {
        query = query.bind(end_time);
    }
    query
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn append(&self, event: NewAuditEvent) -> AuditResult<AuditEvent> {
        let row = event.into_event();

        let record = sqlx::query_as::<_, AuditEvent>(&format!(
            r#"
            INSERT INTO audit_events (
                id, timestamp, event_type, severity, user_id, user_email,
                target_type, target_id, target_repr, client_id, household_id,
                description, data, old_values, new_values,
                ip_address, user_agent, request_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18)
            RETURNING {EVENT_COLUMNS}
            "#,
        ))
        .bind(row.id)
        .bind(row.timestamp)
        .bind(&row.event_type)
        .bind(&row.severity)
        .bind(row.user_id)
        .bind(&row.user_email)
        .bind(&row.target_type)
        .bind(&row.target_id)
        .bind(&row.target_repr)
        .bind(row.client_id)
        .bind(row.household_id)
        .bind(&row.description)
        .bind(&row.data)
        .bind(&row.old_values)
        .bind(&row.new_values)
        .bind(&row.ip_address)
        .bind(&row.user_agent)
        .bind(&row.request_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        debug!(
            event_id = %record.id,
            event_type = %record.event_type,
            "Appended audit event"
        );

        Ok(record)
    }

    async fn get(&self, id: Uuid) -> AuditResult<Option<AuditEvent>> {
        let record = sqlx::query_as::<_, AuditEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM audit_events WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn query(&self, filter: &EventFilter) -> AuditResult<Vec<AuditEvent>> {
        let mut sql = format!("SELECT {EVENT_COLUMNS} FROM audit_events WHERE 1=1");
        let mut bind_count = 1;

        push_filter_conditions(filter, &mut sql, &mut bind_count);

        sql.push_str(" ORDER BY timestamp DESC, id DESC");
        sql.push_str(&format!(" LIMIT ${}", bind_count));
        bind_count += 1;
        sql.push_str(&format!(" OFFSET ${}", bind_count));

        let query = sqlx::query_as::<_, AuditEvent>(&sql);
        let query = bind_filter_values(filter, query)
            .bind(filter.effective_limit())
            .bind(filter.offset);

        let records = query.fetch_all(&self.pool).await?;

        debug!(count = records.len(), "Queried audit events");

        Ok(records)
    }

    async fn count(&self, filter: &EventFilter) -> AuditResult<i64> {
        let mut sql = String::from("SELECT COUNT(*) FROM audit_events WHERE 1=1");
        let mut bind_count = 1;

        push_filter_conditions(filter, &mut sql, &mut bind_count);

        let mut query = sqlx::query_scalar::<_, i64>(&sql);

        if let Some(event_type) = filter.event_type {
            query = query.bind(event_type.as_str());
        }
        if let Some(severity) = filter.severity {
            query = query.bind(severity.as_str());
        }
        if let Some(user_id) = filter.user_id {
            query = query.bind(user_id);
        }
        if let Some(ref target_type) = filter.target_type {
            query = query.bind(target_type);
        }
        if let Some(ref target_id) = filter.target_id {
            query = query.bind(target_id);
        }
        if let Some(client_id) = filter.client_id {
            query = query.bind(client_id);
        }
        if let Some(household_id) = filter.household_id {
            query = query.bind(household_id);
        }
        if let Some(start_time) = filter.start_time {
            query = query.bind(start_time);
        }
        if let Some(end_time) = filter.end_time {
            query = query.bind(end_time);
        }

        let count = query.fetch_one(&self.pool).await?;

        Ok(count)
    }

    async fn record_query_log(&self, log: NewQueryLog) -> AuditResult<AuditQueryLog> {
        let row = log.into_row();

        let record = sqlx::query_as::<_, AuditQueryLog>(
            r#"
            INSERT INTO audit_query_log (
                id, timestamp, user_id, user_email, query_type,
                query_params, result_count, ip_address
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, timestamp, user_id, user_email, query_type,
                      query_params, result_count, ip_address
            "#,
        )
        .bind(row.id)
        .bind(row.timestamp)
        .bind(row.user_id)
        .bind(&row.user_email)
        .bind(&row.query_type)
        .bind(&row.query_params)
        .bind(row.result_count)
        .bind(row.ip_address)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        debug!(
            query_type = %record.query_type,
            result_count = record.result_count,
            "Recorded audit query log"
        );

        Ok(record)
    }
}
