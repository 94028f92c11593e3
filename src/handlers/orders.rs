use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use bigdecimal::{BigDecimal, Zero};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::menu_item::MenuItem;
use crate::models::order::{NewOrder, Order, OrderStatus, PaymentMethod, PaymentStatus};
use crate::models::order_line::{NewOrderLine, OrderLine};
use crate::schema::{menu_items, order_lines, orders};
use crate::validation::Violations;
use crate::{order_number, pricing};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    /// Menu item to order; must reference an existing item.
    pub id: Option<Uuid>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    /// "card" or "cod"
    pub payment_method: Option<String>,
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub order_status: Option<String>,
    pub payment_status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub id: Uuid,
    pub menu_item_id: Uuid,
    pub item_name_en: String,
    pub item_name_ar: String,
    pub item_description_en: Option<String>,
    pub item_description_ar: Option<String>,
    pub category: String,
    /// Decimal amount as a string to avoid floating-point issues, e.g. "9.99"
    pub unit_price: String,
    pub quantity: i32,
    pub total_price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub payment_method: String,
    pub payment_status: String,
    pub order_status: String,
    pub subtotal: String,
    pub tax: String,
    pub delivery_fee: String,
    pub total: String,
    pub special_instructions: Option<String>,
    pub created_at: String,
    pub lines: Vec<OrderLineResponse>,
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Validation ───────────────────────────────────────────────────────────────

#[derive(Debug)]
struct LineInput {
    menu_item_id: Uuid,
    quantity: i32,
}

#[derive(Debug)]
struct OrderInput {
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    delivery_address: String,
    payment_method: PaymentMethod,
    special_instructions: Option<String>,
    items: Vec<LineInput>,
}

/// Structural validation of the intake payload. Runs before any storage
/// access; menu item existence is checked later, inside the transaction.
fn validate_create_order(req: &CreateOrderRequest) -> Result<OrderInput, Violations> {
    let mut v = Violations::new();

    let customer_name = v.require_str("customer_name", req.customer_name.as_deref(), 255);
    let customer_email = v.require_email("customer_email", req.customer_email.as_deref(), 255);
    let customer_phone = v.require_str("customer_phone", req.customer_phone.as_deref(), 20);
    let delivery_address = v.require_str("delivery_address", req.delivery_address.as_deref(), 2000);
    let special_instructions = v.optional_str("special_instructions", req.special_instructions.as_deref(), 2000);

    let payment_method = match req.payment_method.as_deref().map(str::trim) {
        None | Some("") => {
            v.add("payment_method", "is required");
            None
        }
        Some(raw) => match PaymentMethod::parse(raw) {
            Some(m) => Some(m),
            None => {
                v.add("payment_method", "must be one of: card, cod");
                None
            }
        },
    };

    if req.items.is_empty() {
        v.add("items", "at least one item is required");
    }
    let mut items = Vec::with_capacity(req.items.len());
    for (i, item) in req.items.iter().enumerate() {
        let id = match item.id {
            Some(id) => Some(id),
            None => {
                v.add(format!("items.{i}.id"), "is required");
                None
            }
        };
        let quantity = match item.quantity {
            Some(q) if q >= 1 => Some(q),
            Some(_) => {
                v.add(format!("items.{i}.quantity"), "must be at least 1");
                None
            }
            None => {
                v.add(format!("items.{i}.quantity"), "is required");
                None
            }
        };
        if let (Some(menu_item_id), Some(quantity)) = (id, quantity) {
            items.push(LineInput { menu_item_id, quantity });
        }
    }

    v.check()?;

    // All accumulators are Some once `check` passed.
    Ok(OrderInput {
        customer_name: customer_name.unwrap_or_default(),
        customer_email: customer_email.unwrap_or_default(),
        customer_phone: customer_phone.unwrap_or_default(),
        delivery_address: delivery_address.unwrap_or_default(),
        payment_method: payment_method.unwrap_or(PaymentMethod::Cod),
        special_instructions,
        items,
    })
}

// ── Shared query helpers ─────────────────────────────────────────────────────

fn order_response(order: Order, lines: Vec<OrderLine>) -> OrderResponse {
    OrderResponse {
        id: order.id,
        order_number: order.order_number,
        customer_name: order.customer_name,
        customer_email: order.customer_email,
        customer_phone: order.customer_phone,
        delivery_address: order.delivery_address,
        payment_method: order.payment_method,
        payment_status: order.payment_status,
        order_status: order.order_status,
        subtotal: order.subtotal.to_string(),
        tax: order.tax.to_string(),
        delivery_fee: order.delivery_fee.to_string(),
        total: order.total.to_string(),
        special_instructions: order.special_instructions,
        created_at: order.created_at.to_rfc3339(),
        lines: lines
            .into_iter()
            .map(|l| OrderLineResponse {
                id: l.id,
                menu_item_id: l.menu_item_id,
                item_name_en: l.item_name_en,
                item_name_ar: l.item_name_ar,
                item_description_en: l.item_description_en,
                item_description_ar: l.item_description_ar,
                category: l.category,
                unit_price: l.unit_price.to_string(),
                quantity: l.quantity,
                total_price: l.total_price.to_string(),
            })
            .collect(),
    }
}

fn lines_for(conn: &mut PgConnection, order_id: Uuid) -> Result<Vec<OrderLine>, AppError> {
    Ok(order_lines::table
        .filter(order_lines::order_id.eq(order_id))
        .order(order_lines::created_at.asc())
        .select(OrderLine::as_select())
        .load(conn)?)
}

/// Loads a page of orders together with their lines in two queries.
fn attach_lines(conn: &mut PgConnection, rows: Vec<Order>) -> Result<Vec<OrderResponse>, AppError> {
    let ids: Vec<Uuid> = rows.iter().map(|o| o.id).collect();
    let lines: Vec<OrderLine> = order_lines::table
        .filter(order_lines::order_id.eq_any(&ids))
        .order(order_lines::created_at.asc())
        .select(OrderLine::as_select())
        .load(conn)?;

    let mut by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
    for line in lines {
        by_order.entry(line.order_id).or_default().push(line);
    }

    Ok(rows
        .into_iter()
        .map(|o| {
            let lines = by_order.remove(&o.id).unwrap_or_default();
            order_response(o, lines)
        })
        .collect())
}

/// Picks an order number not currently in use. The suffix space makes a
/// conflict vanishingly rare; the probe loop is bounded and the unique index
/// on `orders.order_number` still backstops the race window.
fn unused_order_number(conn: &mut PgConnection) -> Result<String, AppError> {
    for _ in 0..5 {
        let candidate = order_number::generate();
        let taken: bool = diesel::select(diesel::dsl::exists(
            orders::table.filter(orders::order_number.eq(&candidate)),
        ))
        .get_result(conn)?;
        if !taken {
            return Ok(candidate);
        }
    }
    Err(AppError::Internal(
        "could not allocate a unique order number".to_string(),
    ))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Creates an order together with its lines. Each line snapshots the menu
/// item's name, description, category and price at this moment, so later
/// menu edits never rewrite order history. All inserts and the totals
/// update run inside a single database transaction; a failure anywhere
/// leaves no rows behind.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderResponse),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    pool: web::Data<DbPool>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let input = validate_create_order(&body.into_inner())?;

    let created = web::block(move || {
        let mut conn = pool.get()?;

        conn.transaction::<_, AppError, _>(|conn| {
            // Resolve every referenced menu item up front; an unknown id
            // fails the whole request before anything is written.
            let ids: Vec<Uuid> = input.items.iter().map(|l| l.menu_item_id).collect();
            let found: Vec<MenuItem> = menu_items::table
                .filter(menu_items::id.eq_any(&ids))
                .select(MenuItem::as_select())
                .load(conn)?;
            let by_id: HashMap<Uuid, MenuItem> =
                found.into_iter().map(|m| (m.id, m)).collect();

            let mut missing = Violations::new();
            for (i, line) in input.items.iter().enumerate() {
                if !by_id.contains_key(&line.menu_item_id) {
                    missing.add(format!("items.{i}.id"), "must reference an existing menu item");
                }
            }
            missing.check()?;

            // Monetary fields start at zero; the real amounts are written
            // once the lines exist.
            let zero = BigDecimal::zero().with_scale(2);
            let order_id = Uuid::new_v4();
            let new_order = NewOrder {
                id: order_id,
                order_number: unused_order_number(conn)?,
                customer_name: input.customer_name,
                customer_email: input.customer_email,
                customer_phone: input.customer_phone,
                delivery_address: input.delivery_address,
                payment_method: input.payment_method.as_str().to_string(),
                payment_status: PaymentStatus::Pending.as_str().to_string(),
                order_status: OrderStatus::Pending.as_str().to_string(),
                subtotal: zero.clone(),
                tax: zero.clone(),
                delivery_fee: zero.clone(),
                total: zero,
                special_instructions: input.special_instructions,
            };
            diesel::insert_into(orders::table)
                .values(&new_order)
                .execute(conn)?;

            let new_lines: Vec<NewOrderLine> = input
                .items
                .iter()
                .map(|line| {
                    let item = &by_id[&line.menu_item_id];
                    NewOrderLine {
                        id: Uuid::new_v4(),
                        order_id,
                        menu_item_id: item.id,
                        item_name_en: item.name_en.clone(),
                        item_name_ar: item.name_ar.clone(),
                        item_description_en: item.description_en.clone(),
                        item_description_ar: item.description_ar.clone(),
                        category: item.category.clone(),
                        unit_price: item.price.clone(),
                        quantity: line.quantity,
                        total_price: pricing::line_total(&item.price, line.quantity),
                    }
                })
                .collect();
            diesel::insert_into(order_lines::table)
                .values(&new_lines)
                .execute(conn)?;

            let totals =
                pricing::compute_totals(new_lines.iter().map(|l| l.total_price.clone()));
            diesel::update(orders::table.find(order_id))
                .set((
                    orders::subtotal.eq(&totals.subtotal),
                    orders::tax.eq(&totals.tax),
                    orders::delivery_fee.eq(&totals.delivery_fee),
                    orders::total.eq(&totals.total),
                ))
                .execute(conn)?;

            // No payment gateway exists; a card order is considered settled
            // the moment it is accepted.
            if input.payment_method == PaymentMethod::Card {
                diesel::update(orders::table.find(order_id))
                    .set(orders::payment_status.eq(PaymentStatus::Paid.as_str()))
                    .execute(conn)?;
            }

            let order: Order = orders::table
                .find(order_id)
                .select(Order::as_select())
                .first(conn)?;
            let lines = lines_for(conn, order_id)?;
            Ok(order_response(order, lines))
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(created))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let result = web::block(move || {
        let mut conn = pool.get()?;

        let order = orders::table
            .find(order_id)
            .select(Order::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok::<_, AppError>(None);
        };

        let lines = lines_for(&mut conn, order.id)?;
        Ok(Some(order_response(order, lines)))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match result {
        Some(order) => Ok(HttpResponse::Ok().json(order)),
        None => Err(AppError::NotFound),
    }
}

/// GET /orders/number/{order_number}
///
/// Same payload as the id lookup, addressed by the human-readable number
/// customers receive on their receipt.
#[utoipa::path(
    get,
    path = "/orders/number/{order_number}",
    params(
        ("order_number" = String, Path, description = "Generated order number, e.g. ORD-20250714-X4T9QK"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order_by_number(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let number = path.into_inner();

    let result = web::block(move || {
        let mut conn = pool.get()?;

        let order = orders::table
            .filter(orders::order_number.eq(&number))
            .select(Order::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok::<_, AppError>(None);
        };

        let lines = lines_for(&mut conn, order.id)?;
        Ok(Some(order_response(order, lines)))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match result {
        Some(order) => Ok(HttpResponse::Ok().json(order)),
        None => Err(AppError::NotFound),
    }
}

/// GET /orders/customer/{email}
#[utoipa::path(
    get,
    path = "/orders/customer/{email}",
    params(
        ("email" = String, Path, description = "Customer email address"),
    ),
    responses(
        (status = 200, description = "Orders for the customer, newest first", body = [OrderResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_orders_by_customer(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let email = path.into_inner();

    let result = web::block(move || {
        let mut conn = pool.get()?;

        let rows = orders::table
            .filter(orders::customer_email.eq(&email))
            .order(orders::created_at.desc())
            .select(Order::as_select())
            .load(&mut conn)?;

        attach_lines(&mut conn, rows)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(result))
}

/// GET /orders
///
/// Paginated list of orders with their lines, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    pool: web::Data<DbPool>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);
    let offset = (page - 1) * limit;

    let result = web::block(move || {
        let mut conn = pool.get()?;

        let total: i64 = orders::table.count().get_result(&mut conn)?;

        let rows = orders::table
            .select(Order::as_select())
            .order(orders::created_at.desc())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)?;

        let items = attach_lines(&mut conn, rows)?;

        Ok::<_, AppError>(ListOrdersResponse {
            items,
            total,
            page,
            limit,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(result))
}

/// PATCH /orders/{id}/status
///
/// Sets the fulfilment status and, optionally, the payment status. Both
/// enums are strictly validated but no transition graph is enforced.
#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let req = body.into_inner();

    let mut v = Violations::new();
    let order_status = match req.order_status.as_deref().map(str::trim) {
        None | Some("") => {
            v.add("order_status", "is required");
            None
        }
        Some(raw) => match OrderStatus::parse(raw) {
            Some(s) => Some(s),
            None => {
                v.add(
                    "order_status",
                    "must be one of: pending, confirmed, preparing, ready, delivered, cancelled",
                );
                None
            }
        },
    };
    let payment_status = match req.payment_status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match PaymentStatus::parse(raw) {
            Some(s) => Some(s),
            None => {
                v.add("payment_status", "must be one of: pending, paid, failed");
                None
            }
        },
    };
    v.check()?;
    let order_status = order_status.unwrap_or(OrderStatus::Pending);

    let result = web::block(move || {
        let mut conn = pool.get()?;

        let updated: Option<Order> = match payment_status {
            Some(ps) => diesel::update(orders::table.find(order_id))
                .set((
                    orders::order_status.eq(order_status.as_str()),
                    orders::payment_status.eq(ps.as_str()),
                ))
                .returning(Order::as_returning())
                .get_result(&mut conn)
                .optional()?,
            None => diesel::update(orders::table.find(order_id))
                .set(orders::order_status.eq(order_status.as_str()))
                .returning(Order::as_returning())
                .get_result(&mut conn)
                .optional()?,
        };

        let Some(order) = updated else {
            return Ok::<_, AppError>(None);
        };

        let lines = lines_for(&mut conn, order.id)?;
        Ok(Some(order_response(order, lines)))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match result {
        Some(order) => Ok(HttpResponse::Ok().json(order)),
        None => Err(AppError::NotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateOrderRequest {
        CreateOrderRequest {
            customer_name: Some("Alice Example".to_string()),
            customer_email: Some("alice@example.com".to_string()),
            customer_phone: Some("+15551234567".to_string()),
            delivery_address: Some("123 Main Street".to_string()),
            payment_method: Some("cod".to_string()),
            special_instructions: None,
            items: vec![OrderItemRequest {
                id: Some(Uuid::new_v4()),
                quantity: Some(2),
            }],
        }
    }

    #[test]
    fn valid_request_passes() {
        let input = validate_create_order(&valid_request()).unwrap();
        assert_eq!(input.customer_name, "Alice Example");
        assert_eq!(input.payment_method, PaymentMethod::Cod);
        assert_eq!(input.items.len(), 1);
        assert_eq!(input.items[0].quantity, 2);
    }

    #[test]
    fn missing_fields_are_reported_per_field() {
        let err = validate_create_order(&CreateOrderRequest::default()).unwrap_err();
        let json = serde_json::to_value(&err).unwrap();
        for field in [
            "customer_name",
            "customer_email",
            "customer_phone",
            "delivery_address",
            "payment_method",
            "items",
        ] {
            assert!(json.get(field).is_some(), "no violation for {field}");
        }
    }

    #[test]
    fn unknown_payment_method_is_rejected() {
        let mut req = valid_request();
        req.payment_method = Some("paypal".to_string());
        let err = validate_create_order(&req).unwrap_err();
        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("payment_method").is_some());
    }

    #[test]
    fn card_is_a_valid_payment_method() {
        let mut req = valid_request();
        req.payment_method = Some("card".to_string());
        let input = validate_create_order(&req).unwrap();
        assert_eq!(input.payment_method, PaymentMethod::Card);
    }

    #[test]
    fn empty_item_list_is_rejected() {
        let mut req = valid_request();
        req.items = vec![];
        let err = validate_create_order(&req).unwrap_err();
        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("items").is_some());
    }

    #[test]
    fn zero_quantity_is_rejected_with_positional_field() {
        let mut req = valid_request();
        req.items.push(OrderItemRequest {
            id: Some(Uuid::new_v4()),
            quantity: Some(0),
        });
        let err = validate_create_order(&req).unwrap_err();
        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("items.1.quantity").is_some());
    }

    #[test]
    fn missing_item_id_is_rejected_with_positional_field() {
        let mut req = valid_request();
        req.items = vec![OrderItemRequest {
            id: None,
            quantity: Some(1),
        }];
        let err = validate_create_order(&req).unwrap_err();
        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("items.0.id").is_some());
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut req = valid_request();
        req.customer_email = Some("not-an-email".to_string());
        let err = validate_create_order(&req).unwrap_err();
        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("customer_email").is_some());
    }
}
