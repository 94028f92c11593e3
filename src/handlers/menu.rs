use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::{BigDecimal, RoundingMode, Zero};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::menu_item::{MenuItem, MenuItemChanges, NewMenuItem};
use crate::schema::menu_items;
use crate::validation::Violations;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateMenuItemRequest {
    pub name_en: Option<String>,
    pub name_ar: Option<String>,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: Option<String>,
    pub category: Option<String>,
    /// Stored path or URL of the item photo.
    pub image: Option<String>,
    pub is_available: Option<bool>,
    pub sort_order: Option<i32>,
}

/// Same fields as creation but everything optional; absent fields are left
/// unchanged.
pub type UpdateMenuItemRequest = CreateMenuItemRequest;

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuItemResponse {
    pub id: Uuid,
    pub name_en: String,
    pub name_ar: String,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    pub price: String,
    pub category: String,
    pub image: Option<String>,
    pub is_available: bool,
    pub sort_order: i32,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuCatalogResponse {
    pub items: Vec<MenuItemResponse>,
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MenuQuery {
    pub category: Option<String>,
}

fn menu_item_response(item: MenuItem) -> MenuItemResponse {
    MenuItemResponse {
        id: item.id,
        name_en: item.name_en,
        name_ar: item.name_ar,
        description_en: item.description_en,
        description_ar: item.description_ar,
        price: item.price.to_string(),
        category: item.category,
        image: item.image,
        is_available: item.is_available,
        sort_order: item.sort_order,
        created_at: item.created_at.to_rfc3339(),
    }
}

// ── Validation ───────────────────────────────────────────────────────────────

fn parse_price(v: &mut Violations, raw: Option<&str>, required: bool) -> Option<BigDecimal> {
    match raw.map(str::trim) {
        None | Some("") => {
            if required {
                v.add("price", "is required");
            }
            None
        }
        Some(s) => match BigDecimal::from_str(s) {
            Ok(price) if price >= BigDecimal::zero() => {
                Some(price.with_scale_round(2, RoundingMode::HalfUp))
            }
            Ok(_) => {
                v.add("price", "must not be negative");
                None
            }
            Err(_) => {
                v.add("price", "must be a decimal amount such as \"9.99\"");
                None
            }
        },
    }
}

fn validate_create_menu_item(req: &CreateMenuItemRequest) -> Result<NewMenuItem, Violations> {
    let mut v = Violations::new();

    let name_en = v.require_str("name_en", req.name_en.as_deref(), 255);
    let name_ar = v.require_str("name_ar", req.name_ar.as_deref(), 255);
    let description_en = v.optional_str("description_en", req.description_en.as_deref(), 2000);
    let description_ar = v.optional_str("description_ar", req.description_ar.as_deref(), 2000);
    let price = parse_price(&mut v, req.price.as_deref(), true);
    let category = v.require_str("category", req.category.as_deref(), 100);
    let image = v.optional_str("image", req.image.as_deref(), 255);

    v.check()?;

    Ok(NewMenuItem {
        id: Uuid::new_v4(),
        name_en: name_en.unwrap_or_default(),
        name_ar: name_ar.unwrap_or_default(),
        description_en,
        description_ar,
        price: price.unwrap_or_default(),
        category: category.unwrap_or_default(),
        image,
        is_available: req.is_available.unwrap_or(true),
        sort_order: req.sort_order.unwrap_or(0),
    })
}

fn validate_update_menu_item(req: &UpdateMenuItemRequest) -> Result<MenuItemChanges, Violations> {
    let mut v = Violations::new();
    let mut changes = MenuItemChanges::default();

    if req.name_en.is_some() {
        changes.name_en = v.require_str("name_en", req.name_en.as_deref(), 255);
    }
    if req.name_ar.is_some() {
        changes.name_ar = v.require_str("name_ar", req.name_ar.as_deref(), 255);
    }
    changes.description_en = v.optional_str("description_en", req.description_en.as_deref(), 2000);
    changes.description_ar = v.optional_str("description_ar", req.description_ar.as_deref(), 2000);
    changes.price = parse_price(&mut v, req.price.as_deref(), false);
    if req.category.is_some() {
        changes.category = v.require_str("category", req.category.as_deref(), 100);
    }
    changes.image = v.optional_str("image", req.image.as_deref(), 255);
    changes.is_available = req.is_available;
    changes.sort_order = req.sort_order;

    v.check()?;
    Ok(changes)
}

fn distinct_categories(conn: &mut PgConnection) -> Result<Vec<String>, AppError> {
    Ok(menu_items::table
        .select(menu_items::category)
        .distinct()
        .order(menu_items::category.asc())
        .load(conn)?)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /menu
///
/// Available items for the public site, optionally filtered by category,
/// in display order.
#[utoipa::path(
    get,
    path = "/menu",
    params(
        ("category" = Option<String>, Query, description = "Restrict to one category"),
    ),
    responses(
        (status = 200, description = "Available menu items", body = [MenuItemResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "menu"
)]
pub async fn list_menu(
    pool: web::Data<DbPool>,
    query: web::Query<MenuQuery>,
) -> Result<HttpResponse, AppError> {
    let category = query.into_inner().category;

    let result = web::block(move || {
        let mut conn = pool.get()?;

        let mut q = menu_items::table
            .filter(menu_items::is_available.eq(true))
            .select(MenuItem::as_select())
            .into_boxed();
        if let Some(category) = category {
            q = q.filter(menu_items::category.eq(category));
        }
        let items = q
            .order((menu_items::sort_order.asc(), menu_items::name_en.asc()))
            .load::<MenuItem>(&mut conn)?;

        Ok::<_, AppError>(items.into_iter().map(menu_item_response).collect::<Vec<_>>())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(result))
}

/// GET /menu/all
///
/// Items and the category list in a single payload, saving the public site
/// a round trip.
#[utoipa::path(
    get,
    path = "/menu/all",
    responses(
        (status = 200, description = "Available items plus categories", body = MenuCatalogResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "menu"
)]
pub async fn menu_catalog(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let result = web::block(move || {
        let mut conn = pool.get()?;

        let items = menu_items::table
            .filter(menu_items::is_available.eq(true))
            .order((menu_items::sort_order.asc(), menu_items::name_en.asc()))
            .select(MenuItem::as_select())
            .load::<MenuItem>(&mut conn)?;
        let categories = distinct_categories(&mut conn)?;

        Ok::<_, AppError>(MenuCatalogResponse {
            items: items.into_iter().map(menu_item_response).collect(),
            categories,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(result))
}

/// GET /menu/categories
#[utoipa::path(
    get,
    path = "/menu/categories",
    responses(
        (status = 200, description = "Distinct category names", body = [String]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "menu"
)]
pub async fn list_categories(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let result = web::block(move || {
        let mut conn = pool.get()?;
        distinct_categories(&mut conn)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(result))
}

/// GET /menu/admin/all
///
/// Every item including the currently unavailable ones, for the admin
/// panel.
#[utoipa::path(
    get,
    path = "/menu/admin/all",
    responses(
        (status = 200, description = "All menu items", body = [MenuItemResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "menu"
)]
pub async fn list_all_menu(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let result = web::block(move || {
        let mut conn = pool.get()?;

        let items = menu_items::table
            .order((menu_items::sort_order.asc(), menu_items::name_en.asc()))
            .select(MenuItem::as_select())
            .load::<MenuItem>(&mut conn)?;

        Ok::<_, AppError>(items.into_iter().map(menu_item_response).collect::<Vec<_>>())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(result))
}

/// GET /menu/{id}
#[utoipa::path(
    get,
    path = "/menu/{id}",
    params(
        ("id" = Uuid, Path, description = "Menu item UUID"),
    ),
    responses(
        (status = 200, description = "Menu item found", body = MenuItemResponse),
        (status = 404, description = "Menu item not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "menu"
)]
pub async fn get_menu_item(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();

    let result = web::block(move || {
        let mut conn = pool.get()?;

        Ok::<_, AppError>(
            menu_items::table
                .find(item_id)
                .select(MenuItem::as_select())
                .first(&mut conn)
                .optional()?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match result {
        Some(item) => Ok(HttpResponse::Ok().json(menu_item_response(item))),
        None => Err(AppError::NotFound),
    }
}

/// POST /menu
#[utoipa::path(
    post,
    path = "/menu",
    request_body = CreateMenuItemRequest,
    responses(
        (status = 201, description = "Menu item created", body = MenuItemResponse),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "menu"
)]
pub async fn create_menu_item(
    pool: web::Data<DbPool>,
    body: web::Json<CreateMenuItemRequest>,
) -> Result<HttpResponse, AppError> {
    let new_item = validate_create_menu_item(&body.into_inner())?;

    let created = web::block(move || {
        let mut conn = pool.get()?;

        Ok::<_, AppError>(
            diesel::insert_into(menu_items::table)
                .values(&new_item)
                .returning(MenuItem::as_returning())
                .get_result::<MenuItem>(&mut conn)?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(menu_item_response(created)))
}

/// PUT /menu/{id}
///
/// Partial update; only the provided fields change.
#[utoipa::path(
    put,
    path = "/menu/{id}",
    params(
        ("id" = Uuid, Path, description = "Menu item UUID"),
    ),
    request_body = UpdateMenuItemRequest,
    responses(
        (status = 200, description = "Menu item updated", body = MenuItemResponse),
        (status = 404, description = "Menu item not found"),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "menu"
)]
pub async fn update_menu_item(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateMenuItemRequest>,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();
    let changes = validate_update_menu_item(&body.into_inner())?;

    let result = web::block(move || {
        let mut conn = pool.get()?;

        if changes.is_empty() {
            return Ok::<_, AppError>(
                menu_items::table
                    .find(item_id)
                    .select(MenuItem::as_select())
                    .first(&mut conn)
                    .optional()?,
            );
        }

        Ok(diesel::update(menu_items::table.find(item_id))
            .set(&changes)
            .returning(MenuItem::as_returning())
            .get_result::<MenuItem>(&mut conn)
            .optional()?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match result {
        Some(item) => Ok(HttpResponse::Ok().json(menu_item_response(item))),
        None => Err(AppError::NotFound),
    }
}

/// DELETE /menu/{id}
///
/// Removes the item from the menu. Historical order lines carry their own
/// snapshot and are not touched.
#[utoipa::path(
    delete,
    path = "/menu/{id}",
    params(
        ("id" = Uuid, Path, description = "Menu item UUID"),
    ),
    responses(
        (status = 204, description = "Menu item deleted"),
        (status = 404, description = "Menu item not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "menu"
)]
pub async fn delete_menu_item(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();

    let deleted = web::block(move || {
        let mut conn = pool.get()?;
        Ok::<_, AppError>(diesel::delete(menu_items::table.find(item_id)).execute(&mut conn)?)
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

    fn valid_request() -> CreateMenuItemRequest {
        CreateMenuItemRequest {
            name_en: Some("Grilled Salmon".to_string()),
            name_ar: Some("سلمون مشوي".to_string()),
            description_en: Some("Fresh Atlantic salmon".to_string()),
            description_ar: None,
            price: Some("28.99".to_string()),
            category: Some("main".to_string()),
            image: None,
            is_available: None,
            sort_order: Some(4),
        }
    }

    #[test]
    fn valid_item_passes_and_defaults_apply() {
        let item = validate_create_menu_item(&valid_request()).unwrap();
        assert_eq!(item.name_en, "Grilled Salmon");
        assert_eq!(item.price.to_string(), "28.99");
        assert!(item.is_available);
        assert_eq!(item.sort_order, 4);
    }

    #[test]
    fn missing_names_and_price_are_reported() {
        let err = validate_create_menu_item(&CreateMenuItemRequest::default()).unwrap_err();
        let json = serde_json::to_value(&err).unwrap();
        for field in ["name_en", "name_ar", "price", "category"] {
            assert!(json.get(field).is_some(), "no violation for {field}");
        }
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut req = valid_request();
        req.price = Some("-1.00".to_string());
        let err = validate_create_menu_item(&req).unwrap_err();
        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("price").is_some());
    }

    #[test]
    fn junk_price_is_rejected() {
        let mut req = valid_request();
        req.price = Some("cheap".to_string());
        assert!(validate_create_menu_item(&req).is_err());
    }

    #[test]
    fn update_accepts_partial_payload() {
        let req = UpdateMenuItemRequest {
            price: Some("30.50".to_string()),
            is_available: Some(false),
            ..Default::default()
        };
        let changes = validate_update_menu_item(&req).unwrap();
        assert_eq!(changes.price.unwrap().to_string(), "30.50");
        assert_eq!(changes.is_available, Some(false));
        assert!(changes.name_en.is_none());
    }

    #[test]
    fn update_with_no_fields_is_empty() {
        let changes = validate_update_menu_item(&UpdateMenuItemRequest::default()).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn update_still_validates_provided_fields() {
        let req = UpdateMenuItemRequest {
            name_en: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(validate_update_menu_item(&req).is_err());
    }
}
