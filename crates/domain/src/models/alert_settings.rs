//! Alert threshold settings and the alert level classifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Default lower threshold (percent offline) below which everything is green.
pub const DEFAULT_LOWER_THRESHOLD: i32 = 30;

/// Default upper threshold (percent offline) above which alerts turn red.
pub const DEFAULT_UPPER_THRESHOLD: i32 = 70;

/// Traffic-light classification of an offline percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Green,
    Yellow,
    Red,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Green => "green",
            AlertLevel::Yellow => "yellow",
            AlertLevel::Red => "red",
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised when threshold values are inconsistent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThresholdError {
    #[error("Thresholds must be between 0 and 100 (got lower={lower}, upper={upper})")]
    OutOfRange { lower: i32, upper: i32 },

    #[error("Lower threshold ({lower}) must be less than upper threshold ({upper})")]
    NotOrdered { lower: i32, upper: i32 },
}

/// Checks `0 <= lower < upper <= 100`.
pub fn check_thresholds(lower: i32, upper: i32) -> Result<(), ThresholdError> {
    if !(0..=100).contains(&lower) || !(0..=100).contains(&upper) {
        return Err(ThresholdError::OutOfRange { lower, upper });
    }
    if lower >= upper {
        return Err(ThresholdError::NotOrdered { lower, upper });
    }
    Ok(())
}

/// The singleton alert configuration.
///
/// Loaded once at startup and held in application state; every update is
/// written through to the `alert_settings` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AlertSettings {
    pub lower_threshold: i32,
    pub upper_threshold: i32,
    pub is_active: bool,
    pub email_notifications: bool,
    pub push_notifications: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            lower_threshold: DEFAULT_LOWER_THRESHOLD,
            upper_threshold: DEFAULT_UPPER_THRESHOLD,
            is_active: true,
            email_notifications: false,
            push_notifications: false,
            updated_at: None,
        }
    }
}

impl AlertSettings {
    /// Classifies an offline percentage.
    ///
    /// Disabled alerting is always green. Comparisons are strict, so values
    /// equal to either threshold fall into the yellow band.
    pub fn alert_level(&self, offline_percentage: f64) -> AlertLevel {
        if !self.is_active {
            return AlertLevel::Green;
        }
        if offline_percentage < f64::from(self.lower_threshold) {
            AlertLevel::Green
        } else if offline_percentage > f64::from(self.upper_threshold) {
            AlertLevel::Red
        } else {
            AlertLevel::Yellow
        }
    }

    /// Whether any notification channel is switched on.
    pub fn notifications_enabled(&self) -> bool {
        self.email_notifications || self.push_notifications
    }

    /// Returns a copy with the request applied, rejecting inconsistent thresholds.
    pub fn apply(&self, request: &UpdateAlertSettingsRequest) -> Result<Self, ThresholdError> {
        let updated = Self {
            lower_threshold: request.lower_threshold,
            upper_threshold: request.upper_threshold,
            is_active: request.is_active.unwrap_or(self.is_active),
            email_notifications: request
                .email_notifications
                .unwrap_or(self.email_notifications),
            push_notifications: request
                .push_notifications
                .unwrap_or(self.push_notifications),
            updated_at: self.updated_at,
        };
        check_thresholds(updated.lower_threshold, updated.upper_threshold)?;
        Ok(updated)
    }
}

/// Request payload for updating the alert settings.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateAlertSettingsRequest {
    #[validate(range(min = 0, max = 100, message = "Lower threshold must be between 0 and 100"))]
    pub lower_threshold: i32,

    #[validate(range(min = 0, max = 100, message = "Upper threshold must be between 0 and 100"))]
    pub upper_threshold: i32,

    pub is_active: Option<bool>,
    pub email_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
}

/// Request payload for classifying an arbitrary percentage.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyRequest {
    pub offline_percentage: f64,
}

/// Classification result.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyResponse {
    pub offline_percentage: f64,
    pub alert_level: AlertLevel,
}
