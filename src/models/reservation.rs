use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::reservations;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Reservation {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub reservation_date: NaiveDate,
    pub reservation_time: NaiveTime,
    pub guests: i32,
    pub special_requests: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reservations)]
pub struct NewReservation {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub reservation_date: NaiveDate,
    pub reservation_time: NaiveTime,
    pub guests: i32,
    pub special_requests: Option<String>,
    pub status: String,
}

/// Partial update; `None` fields keep their current value.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = reservations)]
pub struct ReservationChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub reservation_date: Option<NaiveDate>,
    pub reservation_time: Option<NaiveTime>,
    pub guests: Option<i32>,
    pub special_requests: Option<String>,
    pub status: Option<String>,
}

impl ReservationChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.reservation_date.is_none()
            && self.reservation_time.is_none()
            && self.guests.is_none()
            && self.special_requests.is_none()
            && self.status.is_none()
    }
}

/// All three states are mutually reachable; no machine is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ReservationStatus::Pending),
            "confirmed" => Some(ReservationStatus::Confirmed),
            "cancelled" => Some(ReservationStatus::Cancelled),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips() {
        for s in [
            ReservationStatus::Pending,
            ReservationStatus::Confirmed,
            ReservationStatus::Cancelled,
        ] {
            assert_eq!(ReservationStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(ReservationStatus::parse("no-show"), None);
    }

    #[test]
    fn empty_changeset_is_detected() {
        assert!(ReservationChanges::default().is_empty());
        let changes = ReservationChanges {
            guests: Some(4),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
