//! Alert settings repository for database operations.
//!
//! The table holds at most one row, pinned to `id = 1`.

use domain::models::AlertSettings;
use sqlx::PgPool;

use crate::entities::AlertSettingsEntity;
use crate::metrics::QueryTimer;

const SETTINGS_ROW_ID: i16 = 1;

/// Repository for the alert settings singleton.
#[derive(Clone)]
pub struct AlertSettingsRepository {
    pool: PgPool,
}

impl AlertSettingsRepository {
    /// Creates a new AlertSettingsRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Read the settings row.
    pub async fn find(&self) -> Result<Option<AlertSettingsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_alert_settings");
        let result = sqlx::query_as::<_, AlertSettingsEntity>(
            r#"
            SELECT * FROM alert_settings WHERE id = $1
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Read the settings row, inserting `defaults` first if it does not exist.
    ///
    /// An existing row is never overwritten.
    pub async fn load_or_init(
        &self,
        defaults: &AlertSettings,
    ) -> Result<AlertSettingsEntity, sqlx::Error> {
        let timer = QueryTimer::new("load_or_init_alert_settings");
        sqlx::query(
            r#"
            INSERT INTO alert_settings
                (id, lower_threshold, upper_threshold, is_active,
                 email_notifications, push_notifications)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .bind(defaults.lower_threshold)
        .bind(defaults.upper_threshold)
        .bind(defaults.is_active)
        .bind(defaults.email_notifications)
        .bind(defaults.push_notifications)
        .execute(&self.pool)
        .await?;

        let result = sqlx::query_as::<_, AlertSettingsEntity>(
            r#"
            SELECT * FROM alert_settings WHERE id = $1
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Persist `settings`, creating the row if needed.
    pub async fn save(&self, settings: &AlertSettings) -> Result<AlertSettingsEntity, sqlx::Error> {
        let timer = QueryTimer::new("save_alert_settings");
        let result = sqlx::query_as::<_, AlertSettingsEntity>(
            r#"
            INSERT INTO alert_settings
                (id, lower_threshold, upper_threshold, is_active,
                 email_notifications, push_notifications)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                lower_threshold = EXCLUDED.lower_threshold,
                upper_threshold = EXCLUDED.upper_threshold,
                is_active = EXCLUDED.is_active,
                email_notifications = EXCLUDED.email_notifications,
                push_notifications = EXCLUDED.push_notifications,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .bind(settings.lower_threshold)
        .bind(settings.upper_threshold)
        .bind(settings.is_active)
        .bind(settings.email_notifications)
        .bind(settings.push_notifications)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
