use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde_json::{json, Value};

use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::site_setting::SiteSetting;
use crate::schema::site_settings;

// Settings are stored one row per logical key, each carrying both language
// variants; the payloads below expose them as explicit _en/_ar pairs so the
// caller decides the language per request.

fn settings_map(conn: &mut PgConnection) -> Result<HashMap<String, SiteSetting>, AppError> {
    let rows: Vec<SiteSetting> = site_settings::table
        .select(SiteSetting::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(|s| (s.key.clone(), s)).collect())
}

fn en(map: &HashMap<String, SiteSetting>, key: &str) -> Value {
    map.get(key)
        .and_then(|s| s.value_en.clone())
        .map_or(Value::Null, Value::String)
}

fn ar(map: &HashMap<String, SiteSetting>, key: &str) -> Value {
    map.get(key)
        .and_then(|s| s.value_ar.clone())
        .map_or(Value::Null, Value::String)
}

fn info_payload(map: &HashMap<String, SiteSetting>) -> Value {
    json!({
        "name_en": en(map, "restaurant_name"),
        "name_ar": ar(map, "restaurant_name"),
        "description_en": en(map, "description"),
        "description_ar": ar(map, "description"),
        "logo": en(map, "logo"),
        "hero_image": en(map, "hero_image"),
    })
}

fn contact_payload(map: &HashMap<String, SiteSetting>) -> Value {
    json!({
        "phone": en(map, "phone"),
        "email": en(map, "email"),
        "address_en": en(map, "address"),
        "address_ar": ar(map, "address"),
        "google_maps_url": en(map, "google_maps_url"),
        "opening_hours_en": en(map, "opening_hours"),
        "opening_hours_ar": ar(map, "opening_hours"),
    })
}

fn social_payload(map: &HashMap<String, SiteSetting>) -> Value {
    json!({
        "facebook": en(map, "facebook_url"),
        "instagram": en(map, "instagram_url"),
        "twitter": en(map, "twitter_url"),
        "youtube": en(map, "youtube_url"),
    })
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /site/settings
///
/// Every stored setting keyed by its name, both language variants included.
#[utoipa::path(
    get,
    path = "/site/settings",
    responses(
        (status = 200, description = "All site settings keyed by name"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "site"
)]
pub async fn get_settings(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let result = web::block(move || {
        let mut conn = pool.get()?;
        let map = settings_map(&mut conn)?;

        let payload: serde_json::Map<String, Value> = map
            .into_iter()
            .map(|(key, s)| {
                (
                    key,
                    json!({
                        "value_en": s.value_en,
                        "value_ar": s.value_ar,
                        "type": s.setting_type,
                    }),
                )
            })
            .collect();
        Ok::<_, AppError>(Value::Object(payload))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(result))
}

/// GET /site/info
#[utoipa::path(
    get,
    path = "/site/info",
    responses(
        (status = 200, description = "Restaurant name, description and imagery"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "site"
)]
pub async fn get_info(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let result = web::block(move || {
        let mut conn = pool.get()?;
        let map = settings_map(&mut conn)?;
        Ok::<_, AppError>(info_payload(&map))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(result))
}

/// GET /site/contact
#[utoipa::path(
    get,
    path = "/site/contact",
    responses(
        (status = 200, description = "Contact details and opening hours"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "site"
)]
pub async fn get_contact(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let result = web::block(move || {
        let mut conn = pool.get()?;
        let map = settings_map(&mut conn)?;
        Ok::<_, AppError>(contact_payload(&map))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(result))
}

/// GET /site/social
#[utoipa::path(
    get,
    path = "/site/social",
    responses(
        (status = 200, description = "Social media links"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "site"
)]
pub async fn get_social(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let result = web::block(move || {
        let mut conn = pool.get()?;
        let map = settings_map(&mut conn)?;
        Ok::<_, AppError>(social_payload(&map))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(result))
}

/// GET /site/all
///
/// Info, contact and social sections composed in one payload for the
/// public site's initial load.
#[utoipa::path(
    get,
    path = "/site/all",
    responses(
        (status = 200, description = "Composed site data: info, contact, social"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "site"
)]
pub async fn get_all(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let result = web::block(move || {
        let mut conn = pool.get()?;
        let map = settings_map(&mut conn)?;
        Ok::<_, AppError>(json!({
            "info": info_payload(&map),
            "contact": contact_payload(&map),
            "social": social_payload(&map),
        }))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(result))
}
