//! Expiration checks.
//!
//! `ExpirationDate` is a UTC calendar date; a license is usable through the
//! whole of that day and expired from the next day on. These checks say
//! nothing about authenticity and belong after a successful verify.

use crate::document::LicenseFile;
use crate::error::{LicenseError, LicenseResult};
use crate::metadata::DATE_FORMAT;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

impl LicenseFile {
    /// Parses `ExpirationDate`.
    pub fn expiration_date(&self) -> LicenseResult<NaiveDate> {
        if self.expiration_date.trim().is_empty() {
            return Err(LicenseError::MissingExpirationDate);
        }
        parse_date("ExpirationDate", &self.expiration_date)
    }

    /// Parses `IssueDate`.
    pub fn issue_date(&self) -> LicenseResult<NaiveDate> {
        parse_date("IssueDate", &self.issue_date)
    }

    /// Returns true if the license has expired as of today (UTC).
    pub fn expired(&self) -> LicenseResult<bool> {
        self.expired_on(Utc::now().date_naive())
    }

    /// Returns true if the license has expired as of `today`.
    pub fn expired_on(&self, today: NaiveDate) -> LicenseResult<bool> {
        Ok(today > self.expiration_date()?)
    }

    /// Time left until the start of the expiration day (UTC); negative
    /// once that instant has passed.
    pub fn expires_in(&self) -> LicenseResult<Duration> {
        self.expires_in_at(Utc::now())
    }

    /// [`LicenseFile::expires_in`] evaluated at `now`.
    pub fn expires_in_at(&self, now: DateTime<Utc>) -> LicenseResult<Duration> {
        let expires_at = self.expiration_date()?.and_time(NaiveTime::MIN).and_utc();
        Ok(expires_at - now)
    }

    /// Whole days left, counted in UTC calendar days; zero on the expiration
    /// day and negative once expired.
    pub fn expires_in_days(&self) -> LicenseResult<i64> {
        self.expires_in_days_on(Utc::now().date_naive())
    }

    /// [`LicenseFile::expires_in_days`] evaluated on `today`.
    pub fn expires_in_days_on(&self, today: NaiveDate) -> LicenseResult<i64> {
        Ok((self.expiration_date()? - today).num_days())
    }
}

fn parse_date(field: &'static str, value: &str) -> LicenseResult<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| LicenseError::InvalidDate {
        field,
        value: value.to_string(),
    })
}
