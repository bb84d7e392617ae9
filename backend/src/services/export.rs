//! Data export service
//!
//! Renders a user's health records as CSV for spreadsheets.

use crate::error::{ServiceError, ServiceResult};
use crate::repositories::{HealthRepository, UserRepository};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use wellness_tracker_shared::models::HealthRecord;

/// One CSV line per health record
#[derive(Debug, Serialize)]
struct HealthCsvRow {
    recorded_at: String,
    height_m: f64,
    weight_kg: f64,
    bmi: f64,
    blood_pressure: String,
    heart_rate: Option<i32>,
}

impl From<HealthRecord> for HealthCsvRow {
    fn from(record: HealthRecord) -> Self {
        Self {
            recorded_at: record.recorded_at.to_rfc3339(),
            height_m: record.height,
            weight_kg: record.weight,
            bmi: (record.bmi * 100.0).round() / 100.0,
            blood_pressure: record
                .blood_pressure
                .map(|bp| bp.to_string())
                .unwrap_or_default(),
            heart_rate: record.heart_rate,
        }
    }
}

/// Export service
#[derive(Clone)]
pub struct ExportService {
    users: Arc<dyn UserRepository>,
    health: Arc<dyn HealthRepository>,
}

impl ExportService {
    pub fn new(users: Arc<dyn UserRepository>, health: Arc<dyn HealthRepository>) -> Self {
        Self { users, health }
    }

    /// All of the user's health records, oldest first
    pub async fn export_health_records_csv(&self, username: &str) -> ServiceResult<String> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User '{}' not found", username)))?;

        let mut records = self.health.list_records(user.id, i64::MAX).await?;
        records.reverse();

        let count = records.len();
        let rows: Vec<HealthCsvRow> = records.into_iter().map(HealthCsvRow::from).collect();
        let csv = to_csv(&rows)?;

        info!(user_id = %user.id, count, "Health records exported");
        Ok(csv)
    }
}

/// Serialize rows with a header line
fn to_csv<T: Serialize>(rows: &[T]) -> ServiceResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row)
            .map_err(|e| anyhow::anyhow!("CSV serialization error: {}", e))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("CSV flush error: {}", e))?;
    String::from_utf8(bytes)
        .map_err(|e| ServiceError::Internal(anyhow::anyhow!("CSV encoding error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MemoryStore, NewUser};
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;
    use wellness_tracker_shared::models::BloodPressure;

    #[tokio::test]
    async fn test_export_oldest_first_with_header() {
        let store = MemoryStore::new();
        let user = store
            .create_user(NewUser {
                id: Uuid::new_v4(),
                username: "hana".to_string(),
                email: "hana@example.com".to_string(),
                phone: None,
                password_hash: "unused".to_string(),
            })
            .await
            .unwrap();

        let first = Utc.with_ymd_and_hms(2025, 1, 1, 7, 0, 0).unwrap();
        for (offset, weight, bp) in [
            (1, 69.0, None),
            (0, 70.0, Some(BloodPressure { systolic: 120, diastolic: 80 })),
        ] {
            let record = HealthRecord {
                id: Uuid::new_v4(),
                user_id: user.id,
                height: 1.75,
                weight,
                bmi: weight / (1.75 * 1.75),
                blood_pressure: bp,
                heart_rate: Some(60),
                recorded_at: first + Duration::days(offset),
            };
            HealthRepository::create_record(&store, record)
                .await
                .unwrap();
        }

        let service = ExportService::new(Arc::new(store.clone()), Arc::new(store));
        let csv = service.export_health_records_csv("hana").await.unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "recorded_at,height_m,weight_kg,bmi,blood_pressure,heart_rate"
        );
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2025-01-01"));
        assert!(lines[1].contains("120/80"));
        assert!(lines[2].starts_with("2025-01-02"));
    }

    #[tokio::test]
    async fn test_export_unknown_user() {
        let store = MemoryStore::new();
        let service = ExportService::new(Arc::new(store.clone()), Arc::new(store));
        assert!(matches!(
            service.export_health_records_csv("nobody").await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
