//! Device activity entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{ActivityDay, DeviceActivity, SampleError};
use sqlx::types::Json;
use sqlx::FromRow;

/// Database row mapping for the device_activity table.
#[derive(Debug, Clone, FromRow)]
pub struct DeviceActivityEntity {
    pub id: i64,
    pub device_id: i64,
    pub activity_date: NaiveDate,
    pub day_number: i16,
    pub samples: Option<Json<Vec<i32>>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DeviceActivityEntity> for DeviceActivity {
    type Error = SampleError;

    fn try_from(entity: DeviceActivityEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            device_id: entity.device_id,
            activity_date: entity.activity_date,
            day: ActivityDay::from_day_number(entity.day_number)?,
            samples: entity.samples.map(|Json(samples)| samples),
        })
    }
}
