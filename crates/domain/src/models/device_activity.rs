//! Daily device activity samples.
//!
//! Each device keeps at most two rows: today (day 1) and yesterday (day 2).
//! A row holds 288 status codes, one per five-minute bucket since midnight.

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Number of five-minute buckets in a day.
pub const SAMPLES_PER_DAY: usize = 288;

/// Width of a sample bucket.
pub const SAMPLE_INTERVAL_MINUTES: u32 = 5;

/// No sample recorded for the bucket.
pub const SAMPLE_NO_DATA: i32 = 0;
pub const SAMPLE_ONLINE: i32 = 1;
pub const SAMPLE_OFFLINE: i32 = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SampleError {
    #[error("Sample index {index} is out of range (expected 0..=287)")]
    IndexOutOfRange { index: usize },

    #[error("Unknown activity day {0} (expected 1 or 2)")]
    UnknownDay(i16),
}

/// Slot in the two-day ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityDay {
    Today,
    Yesterday,
}

impl ActivityDay {
    pub fn day_number(&self) -> i16 {
        match self {
            ActivityDay::Today => 1,
            ActivityDay::Yesterday => 2,
        }
    }

    /// Calendar date this slot holds when the current date is `today`.
    pub fn date_for(&self, today: NaiveDate) -> NaiveDate {
        match self {
            ActivityDay::Today => today,
            ActivityDay::Yesterday => today - Duration::days(1),
        }
    }

    pub fn from_day_number(day: i16) -> Result<Self, SampleError> {
        match day {
            1 => Ok(ActivityDay::Today),
            2 => Ok(ActivityDay::Yesterday),
            other => Err(SampleError::UnknownDay(other)),
        }
    }
}

/// Bucket index for a wall-clock time: `floor(minutes_since_midnight / 5)`.
pub fn sample_index(time: NaiveTime) -> usize {
    ((time.hour() * 60 + time.minute()) / SAMPLE_INTERVAL_MINUTES) as usize
}

/// One device's samples for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceActivity {
    pub device_id: i64,
    pub activity_date: NaiveDate,
    pub day: ActivityDay,
    /// `None` until the first sample is written.
    pub samples: Option<Vec<i32>>,
}

impl DeviceActivity {
    pub fn new(device_id: i64, activity_date: NaiveDate, day: ActivityDay) -> Self {
        Self {
            device_id,
            activity_date,
            day,
            samples: None,
        }
    }

    /// Status code at `index`, or [`SAMPLE_NO_DATA`] when the bucket was never
    /// written, the stored array is short, or the index is past the end of day.
    pub fn get_sample_status(&self, index: usize) -> i32 {
        self.samples
            .as_ref()
            .and_then(|samples| samples.get(index).copied())
            .unwrap_or(SAMPLE_NO_DATA)
    }

    /// Writes one bucket.
    ///
    /// The first write allocates a zero-filled day; a short stored array is
    /// padded to full length. Indices past the end of the day are rejected.
    pub fn set_sample_status(&mut self, index: usize, status: i32) -> Result<(), SampleError> {
        if index >= SAMPLES_PER_DAY {
            return Err(SampleError::IndexOutOfRange { index });
        }
        let samples = self
            .samples
            .get_or_insert_with(|| vec![SAMPLE_NO_DATA; SAMPLES_PER_DAY]);
        if samples.len() < SAMPLES_PER_DAY {
            samples.resize(SAMPLES_PER_DAY, SAMPLE_NO_DATA);
        }
        samples[index] = status;
        Ok(())
    }

    /// Full-length copy of the samples with missing buckets as no-data.
    pub fn samples_or_default(&self) -> Vec<i32> {
        (0..SAMPLES_PER_DAY)
            .map(|i| self.get_sample_status(i))
            .collect()
    }

    /// Number of buckets holding `status`.
    pub fn count_status(&self, status: i32) -> usize {
        self.samples
            .as_ref()
            .map(|samples| {
                samples
                    .iter()
                    .take(SAMPLES_PER_DAY)
                    .filter(|s| **s == status)
                    .count()
            })
            .unwrap_or(0)
    }
}

/// Query selecting which day to return.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityQuery {
    #[serde(default = "default_day")]
    pub day: i16,
}

fn default_day() -> i16 {
    1
}

/// Activity as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ActivityResponse {
    pub device_id: i64,
    pub day: ActivityDay,
    pub activity_date: Option<NaiveDate>,
    pub samples: Vec<i32>,
    pub online_samples: usize,
    pub offline_samples: usize,
}

impl ActivityResponse {
    pub fn new(device_id: i64, day: ActivityDay, activity: Option<DeviceActivity>) -> Self {
        match activity {
            Some(activity) => Self {
                device_id,
                day,
                activity_date: Some(activity.activity_date),
                samples: activity.samples_or_default(),
                online_samples: activity.count_status(SAMPLE_ONLINE),
                offline_samples: activity.count_status(SAMPLE_OFFLINE),
            },
            None => Self {
                device_id,
                day,
                activity_date: None,
                samples: vec![SAMPLE_NO_DATA; SAMPLES_PER_DAY],
                online_samples: 0,
                offline_samples: 0,
            },
        }
    }
}

/// Request payload for writing one sample.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetSampleRequest {
    #[validate(range(min = 0, max = 2, message = "Status must be 0 (no data), 1 (online) or 2 (offline)"))]
    pub status: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> DeviceActivity {
        DeviceActivity::new(1, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(), ActivityDay::Today)
    }

    #[test]
    fn test_day_dates() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(ActivityDay::Today.date_for(today), today);
        assert_eq!(
            ActivityDay::Yesterday.date_for(today),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_unset_returns_no_data() {
        let activity = today();
        assert_eq!(activity.get_sample_status(0), SAMPLE_NO_DATA);
        assert_eq!(activity.get_sample_status(287), SAMPLE_NO_DATA);
        assert!(activity.samples.is_none());
    }

    #[test]
    fn test_set_then_get_every_index() {
        let mut activity = today();
        for i in 0..SAMPLES_PER_DAY {
            let status = (i % 3) as i32;
            activity.set_sample_status(i, status).unwrap();
            assert_eq!(activity.get_sample_status(i), status);
        }
    }

    #[test]
    fn test_first_write_allocates_full_day() {
        let mut activity = today();
        activity.set_sample_status(100, SAMPLE_ONLINE).unwrap();

        let samples = activity.samples.as_ref().unwrap();
        assert_eq!(samples.len(), SAMPLES_PER_DAY);
        assert_eq!(samples.iter().filter(|s| **s != SAMPLE_NO_DATA).count(), 1);
        assert_eq!(activity.get_sample_status(99), SAMPLE_NO_DATA);
    }

    #[test]
    fn test_out_of_range() {
        let mut activity = today();
        assert_eq!(
            activity.set_sample_status(288, SAMPLE_ONLINE),
            Err(SampleError::IndexOutOfRange { index: 288 })
        );
        assert!(activity.samples.is_none());
        assert_eq!(activity.get_sample_status(5000), SAMPLE_NO_DATA);
    }

    #[test]
    fn test_short_stored_array() {
        let mut activity = today();
        activity.samples = Some(vec![SAMPLE_ONLINE; 10]);

        assert_eq!(activity.get_sample_status(9), SAMPLE_ONLINE);
        assert_eq!(activity.get_sample_status(10), SAMPLE_NO_DATA);

        activity.set_sample_status(200, SAMPLE_OFFLINE).unwrap();
        let samples = activity.samples.as_ref().unwrap();
        assert_eq!(samples.len(), SAMPLES_PER_DAY);
        assert_eq!(samples[9], SAMPLE_ONLINE);
        assert_eq!(samples[200], SAMPLE_OFFLINE);
    }

    #[test]
    fn test_sample_index() {
        let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert_eq!(sample_index(at(0, 0)), 0);
        assert_eq!(sample_index(at(0, 4)), 0);
        assert_eq!(sample_index(at(0, 5)), 1);
        assert_eq!(sample_index(at(12, 0)), 144);
        assert_eq!(sample_index(at(23, 59)), 287);
        assert_eq!(
            sample_index(NaiveTime::from_hms_opt(23, 59, 59).unwrap()),
            SAMPLES_PER_DAY - 1
        );
    }

    #[test]
    fn test_day_numbers() {
        assert_eq!(ActivityDay::Today.day_number(), 1);
        assert_eq!(ActivityDay::from_day_number(2), Ok(ActivityDay::Yesterday));
        assert_eq!(ActivityDay::from_day_number(3), Err(SampleError::UnknownDay(3)));
    }

    #[test]
    fn test_counts_and_response() {
        let mut activity = today();
        activity.set_sample_status(0, SAMPLE_ONLINE).unwrap();
        activity.set_sample_status(1, SAMPLE_ONLINE).unwrap();
        activity.set_sample_status(2, SAMPLE_OFFLINE).unwrap();

        let response = ActivityResponse::new(1, ActivityDay::Today, Some(activity));
        assert_eq!(response.online_samples, 2);
        assert_eq!(response.offline_samples, 1);
        assert_eq!(response.samples.len(), SAMPLES_PER_DAY);
    }

    #[test]
    fn test_response_without_row() {
        let response = ActivityResponse::new(9, ActivityDay::Yesterday, None);
        assert!(response.activity_date.is_none());
        assert_eq!(response.samples, vec![SAMPLE_NO_DATA; SAMPLES_PER_DAY]);
    }

    #[test]
    fn test_set_sample_request_validation() {
        assert!(SetSampleRequest { status: 1 }.validate().is_ok());
        assert!(SetSampleRequest { status: 7 }.validate().is_err());
    }
}
