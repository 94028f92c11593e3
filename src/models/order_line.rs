use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::order_lines;

/// Snapshot of a menu item as it was when the order was placed. Later edits
/// or deletion of the menu item never reach back into these rows, so
/// `menu_item_id` is a plain reference without a foreign key.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_lines)]
#[diesel(belongs_to(crate::models::order::Order))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub item_name_en: String,
    pub item_name_ar: String,
    pub item_description_en: Option<String>,
    pub item_description_ar: Option<String>,
    pub category: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
    pub total_price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_lines)]
pub struct NewOrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub item_name_en: String,
    pub item_name_ar: String,
    pub item_description_en: Option<String>,
    pub item_description_ar: Option<String>,
    pub category: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
    pub total_price: BigDecimal,
}
