use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::reservation::{
    NewReservation, Reservation, ReservationChanges, ReservationStatus,
};
use crate::schema::reservations;
use crate::validation::Violations;

const MAX_GUESTS: i32 = 20;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateReservationRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// ISO date, e.g. "2025-08-14"; must be after today.
    pub reservation_date: Option<String>,
    /// 24h wall-clock time, e.g. "19:30".
    pub reservation_time: Option<String>,
    pub guests: Option<i32>,
    pub special_requests: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateReservationRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub reservation_date: Option<String>,
    pub reservation_time: Option<String>,
    pub guests: Option<i32>,
    pub special_requests: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateReservationStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListReservationsParams {
    pub status: Option<String>,
    /// Restrict to one reservation date (ISO).
    pub date: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    15
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReservationResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub reservation_date: String,
    pub reservation_time: String,
    pub guests: i32,
    pub special_requests: Option<String>,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListReservationsResponse {
    pub items: Vec<ReservationResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

fn reservation_response(r: Reservation) -> ReservationResponse {
    ReservationResponse {
        id: r.id,
        name: r.name,
        email: r.email,
        phone: r.phone,
        reservation_date: r.reservation_date.to_string(),
        reservation_time: r.reservation_time.format("%H:%M").to_string(),
        guests: r.guests,
        special_requests: r.special_requests,
        status: r.status,
        created_at: r.created_at.to_rfc3339(),
    }
}

// ── Validation ───────────────────────────────────────────────────────────────

fn parse_date(v: &mut Violations, field: &str, raw: Option<&str>) -> Option<NaiveDate> {
    match raw.map(str::trim) {
        None | Some("") => {
            v.add(field, "is required");
            None
        }
        Some(s) => match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                v.add(field, "must be a date in YYYY-MM-DD format");
                None
            }
        },
    }
}

fn parse_time(v: &mut Violations, field: &str, raw: Option<&str>) -> Option<NaiveTime> {
    match raw.map(str::trim) {
        None | Some("") => {
            v.add(field, "is required");
            None
        }
        Some(s) => match NaiveTime::parse_from_str(s, "%H:%M") {
            Ok(time) => Some(time),
            Err(_) => {
                v.add(field, "must be a time in HH:MM format");
                None
            }
        },
    }
}

fn check_guests(v: &mut Violations, guests: Option<i32>, required: bool) -> Option<i32> {
    match guests {
        Some(g) if (1..=MAX_GUESTS).contains(&g) => Some(g),
        Some(_) => {
            v.add("guests", format!("must be between 1 and {MAX_GUESTS}"));
            None
        }
        None => {
            if required {
                v.add("guests", "is required");
            }
            None
        }
    }
}

fn validate_create_reservation(
    req: &CreateReservationRequest,
    today: NaiveDate,
) -> Result<NewReservation, Violations> {
    let mut v = Violations::new();

    let name = v.require_str("name", req.name.as_deref(), 255);
    let email = v.require_email("email", req.email.as_deref(), 255);
    let phone = v.require_str("phone", req.phone.as_deref(), 20);
    let date = parse_date(&mut v, "reservation_date", req.reservation_date.as_deref());
    if let Some(d) = date {
        if d <= today {
            v.add("reservation_date", "must be after today");
        }
    }
    let time = parse_time(&mut v, "reservation_time", req.reservation_time.as_deref());
    let guests = check_guests(&mut v, req.guests, true);
    let special_requests = v.optional_str("special_requests", req.special_requests.as_deref(), 1000);

    v.check()?;

    Ok(NewReservation {
        id: Uuid::new_v4(),
        name: name.unwrap_or_default(),
        email: email.unwrap_or_default(),
        phone: phone.unwrap_or_default(),
        reservation_date: date.unwrap_or(today),
        reservation_time: time.unwrap_or(NaiveTime::MIN),
        guests: guests.unwrap_or(1),
        special_requests,
        // Every new reservation starts pending regardless of the payload.
        status: ReservationStatus::Pending.as_str().to_string(),
    })
}

fn validate_update_reservation(
    req: &UpdateReservationRequest,
) -> Result<ReservationChanges, Violations> {
    let mut v = Violations::new();
    let mut changes = ReservationChanges::default();

    if req.name.is_some() {
        changes.name = v.require_str("name", req.name.as_deref(), 255);
    }
    if req.email.is_some() {
        changes.email = v.require_email("email", req.email.as_deref(), 255);
    }
    if req.phone.is_some() {
        changes.phone = v.require_str("phone", req.phone.as_deref(), 20);
    }
    if req.reservation_date.is_some() {
        changes.reservation_date = parse_date(&mut v, "reservation_date", req.reservation_date.as_deref());
    }
    if req.reservation_time.is_some() {
        changes.reservation_time = parse_time(&mut v, "reservation_time", req.reservation_time.as_deref());
    }
    changes.guests = check_guests(&mut v, req.guests, false);
    changes.special_requests = v.optional_str("special_requests", req.special_requests.as_deref(), 1000);
    if let Some(raw) = req.status.as_deref().map(str::trim) {
        match ReservationStatus::parse(raw) {
            Some(s) => changes.status = Some(s.as_str().to_string()),
            None => v.add("status", "must be one of: pending, confirmed, cancelled"),
        }
    }

    v.check()?;
    Ok(changes)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /reservations
#[utoipa::path(
    post,
    path = "/reservations",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = ReservationResponse),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "reservations"
)]
pub async fn create_reservation(
    pool: web::Data<DbPool>,
    body: web::Json<CreateReservationRequest>,
) -> Result<HttpResponse, AppError> {
    let today = Utc::now().date_naive();
    let new_reservation = validate_create_reservation(&body.into_inner(), today)?;

    let created = web::block(move || {
        let mut conn = pool.get()?;

        Ok::<_, AppError>(
            diesel::insert_into(reservations::table)
                .values(&new_reservation)
                .returning(Reservation::as_returning())
                .get_result::<Reservation>(&mut conn)?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(reservation_response(created)))
}

/// GET /reservations
///
/// Paginated listing for the admin panel, newest slots first, optionally
/// filtered by status and/or date.
#[utoipa::path(
    get,
    path = "/reservations",
    params(
        ("status" = Option<String>, Query, description = "Filter: pending, confirmed or cancelled"),
        ("date" = Option<String>, Query, description = "Filter: one reservation date (YYYY-MM-DD)"),
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 15, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated reservations", body = ListReservationsResponse),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "reservations"
)]
pub async fn list_reservations(
    pool: web::Data<DbPool>,
    query: web::Query<ListReservationsParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);
    let offset = (page - 1) * limit;

    let date = match params.date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(s) => match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(_) => {
                let mut v = Violations::new();
                v.add("date", "must be a date in YYYY-MM-DD format");
                return Err(v.into());
            }
        },
    };
    let status = params.status;

    let result = web::block(move || {
        let mut conn = pool.get()?;

        let mut count_q = reservations::table
            .select(diesel::dsl::count_star())
            .into_boxed();
        let mut rows_q = reservations::table.select(Reservation::as_select()).into_boxed();
        if let Some(status) = &status {
            count_q = count_q.filter(reservations::status.eq(status.clone()));
            rows_q = rows_q.filter(reservations::status.eq(status.clone()));
        }
        if let Some(date) = date {
            count_q = count_q.filter(reservations::reservation_date.eq(date));
            rows_q = rows_q.filter(reservations::reservation_date.eq(date));
        }

        let total: i64 = count_q.first(&mut conn)?;
        let rows = rows_q
            .order((
                reservations::reservation_date.desc(),
                reservations::reservation_time.desc(),
            ))
            .limit(limit)
            .offset(offset)
            .load::<Reservation>(&mut conn)?;

        Ok::<_, AppError>(ListReservationsResponse {
            items: rows.into_iter().map(reservation_response).collect(),
            total,
            page,
            limit,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(result))
}

/// GET /reservations/today
#[utoipa::path(
    get,
    path = "/reservations/today",
    responses(
        (status = 200, description = "Today's reservations ordered by time", body = [ReservationResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "reservations"
)]
pub async fn todays_reservations(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let today = Utc::now().date_naive();

    let result = web::block(move || {
        let mut conn = pool.get()?;

        let rows = reservations::table
            .filter(reservations::reservation_date.eq(today))
            .order(reservations::reservation_time.asc())
            .select(Reservation::as_select())
            .load::<Reservation>(&mut conn)?;

        Ok::<_, AppError>(rows.into_iter().map(reservation_response).collect::<Vec<_>>())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(result))
}

/// GET /reservations/upcoming
#[utoipa::path(
    get,
    path = "/reservations/upcoming",
    responses(
        (status = 200, description = "Reservations from today onwards", body = [ReservationResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "reservations"
)]
pub async fn upcoming_reservations(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let today = Utc::now().date_naive();

    let result = web::block(move || {
        let mut conn = pool.get()?;

        let rows = reservations::table
            .filter(reservations::reservation_date.ge(today))
            .order((
                reservations::reservation_date.asc(),
                reservations::reservation_time.asc(),
            ))
            .select(Reservation::as_select())
            .load::<Reservation>(&mut conn)?;

        Ok::<_, AppError>(rows.into_iter().map(reservation_response).collect::<Vec<_>>())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(result))
}

/// GET /reservations/{id}
#[utoipa::path(
    get,
    path = "/reservations/{id}",
    params(
        ("id" = Uuid, Path, description = "Reservation UUID"),
    ),
    responses(
        (status = 200, description = "Reservation found", body = ReservationResponse),
        (status = 404, description = "Reservation not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "reservations"
)]
pub async fn get_reservation(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let reservation_id = path.into_inner();

    let result = web::block(move || {
        let mut conn = pool.get()?;

        Ok::<_, AppError>(
            reservations::table
                .find(reservation_id)
                .select(Reservation::as_select())
                .first(&mut conn)
                .optional()?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match result {
        Some(r) => Ok(HttpResponse::Ok().json(reservation_response(r))),
        None => Err(AppError::NotFound),
    }
}

/// PATCH /reservations/{id}
///
/// Partial update of contact details, slot, party size or status.
#[utoipa::path(
    patch,
    path = "/reservations/{id}",
    params(
        ("id" = Uuid, Path, description = "Reservation UUID"),
    ),
    request_body = UpdateReservationRequest,
    responses(
        (status = 200, description = "Reservation updated", body = ReservationResponse),
        (status = 404, description = "Reservation not found"),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "reservations"
)]
pub async fn update_reservation(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateReservationRequest>,
) -> Result<HttpResponse, AppError> {
    let reservation_id = path.into_inner();
    let changes = validate_update_reservation(&body.into_inner())?;

    let result = web::block(move || {
        let mut conn = pool.get()?;

        if changes.is_empty() {
            return Ok::<_, AppError>(
                reservations::table
                    .find(reservation_id)
                    .select(Reservation::as_select())
                    .first(&mut conn)
                    .optional()?,
            );
        }

        Ok(diesel::update(reservations::table.find(reservation_id))
            .set(&changes)
            .returning(Reservation::as_returning())
            .get_result::<Reservation>(&mut conn)
            .optional()?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match result {
        Some(r) => Ok(HttpResponse::Ok().json(reservation_response(r))),
        None => Err(AppError::NotFound),
    }
}

/// PATCH /reservations/{id}/status
#[utoipa::path(
    patch,
    path = "/reservations/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Reservation UUID"),
    ),
    request_body = UpdateReservationStatusRequest,
    responses(
        (status = 200, description = "Reservation updated", body = ReservationResponse),
        (status = 404, description = "Reservation not found"),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "reservations"
)]
pub async fn update_reservation_status(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateReservationStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let reservation_id = path.into_inner();

    let mut v = Violations::new();
    let status = match body.into_inner().status.as_deref().map(str::trim) {
        None | Some("") => {
            v.add("status", "is required");
            None
        }
        Some(raw) => match ReservationStatus::parse(raw) {
            Some(s) => Some(s),
            None => {
                v.add("status", "must be one of: pending, confirmed, cancelled");
                None
            }
        },
    };
    v.check()?;
    let status = status.unwrap_or(ReservationStatus::Pending);

    let result = web::block(move || {
        let mut conn = pool.get()?;

        Ok::<_, AppError>(
            diesel::update(reservations::table.find(reservation_id))
                .set(reservations::status.eq(status.as_str()))
                .returning(Reservation::as_returning())
                .get_result::<Reservation>(&mut conn)
                .optional()?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match result {
        Some(r) => Ok(HttpResponse::Ok().json(reservation_response(r))),
        None => Err(AppError::NotFound),
    }
}

/// DELETE /reservations/{id}
#[utoipa::path(
    delete,
    path = "/reservations/{id}",
    params(
        ("id" = Uuid, Path, description = "Reservation UUID"),
    ),
    responses(
        (status = 204, description = "Reservation deleted"),
        (status = 404, description = "Reservation not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "reservations"
)]
pub async fn delete_reservation(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let reservation_id = path.into_inner();

    let deleted = web::block(move || {
        let mut conn = pool.get()?;
        Ok::<_, AppError>(
            diesel::delete(reservations::table.find(reservation_id)).execute(&mut conn)?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if deleted == 0 {
        return Err(AppError::NotFound);
    }
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 5).unwrap()
    }

    fn valid_request() -> CreateReservationRequest {
        CreateReservationRequest {
            name: Some("Bob Example".to_string()),
            email: Some("bob@example.com".to_string()),
            phone: Some("+15559876543".to_string()),
            reservation_date: Some("2025-08-14".to_string()),
            reservation_time: Some("19:30".to_string()),
            guests: Some(4),
            special_requests: Some("Window table".to_string()),
        }
    }

    #[test]
    fn valid_reservation_passes_and_starts_pending() {
        let r = validate_create_reservation(&valid_request(), base_date()).unwrap();
        assert_eq!(r.status, "pending");
        assert_eq!(r.guests, 4);
        assert_eq!(r.reservation_time, NaiveTime::from_hms_opt(19, 30, 0).unwrap());
    }

    #[test]
    fn past_or_same_day_dates_are_rejected() {
        for date in ["2025-08-05", "2025-08-04"] {
            let mut req = valid_request();
            req.reservation_date = Some(date.to_string());
            let err = validate_create_reservation(&req, base_date()).unwrap_err();
            let json = serde_json::to_value(&err).unwrap();
            assert!(json.get("reservation_date").is_some(), "accepted {date}");
        }
    }

    #[test]
    fn malformed_time_is_rejected() {
        let mut req = valid_request();
        req.reservation_time = Some("7pm".to_string());
        let err = validate_create_reservation(&req, base_date()).unwrap_err();
        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("reservation_time").is_some());
    }

    #[test]
    fn guest_bounds_are_enforced() {
        for guests in [0, 21, -3] {
            let mut req = valid_request();
            req.guests = Some(guests);
            let err = validate_create_reservation(&req, base_date()).unwrap_err();
            let json = serde_json::to_value(&err).unwrap();
            assert!(json.get("guests").is_some(), "accepted {guests}");
        }
    }

    #[test]
    fn update_rejects_unknown_status() {
        let req = UpdateReservationRequest {
            status: Some("no-show".to_string()),
            ..Default::default()
        };
        assert!(validate_update_reservation(&req).is_err());
    }

    #[test]
    fn update_accepts_partial_payload() {
        let req = UpdateReservationRequest {
            guests: Some(6),
            status: Some("confirmed".to_string()),
            ..Default::default()
        };
        let changes = validate_update_reservation(&req).unwrap();
        assert_eq!(changes.guests, Some(6));
        assert_eq!(changes.status.as_deref(), Some("confirmed"));
        assert!(changes.name.is_none());
    }
}
