use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::menu_items;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = menu_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MenuItem {
    pub id: Uuid,
    pub name_en: String,
    pub name_ar: String,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    pub price: BigDecimal,
    pub category: String,
    pub image: Option<String>,
    pub is_available: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = menu_items)]
pub struct NewMenuItem {
    pub id: Uuid,
    pub name_en: String,
    pub name_ar: String,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    pub price: BigDecimal,
    pub category: String,
    pub image: Option<String>,
    pub is_available: bool,
    pub sort_order: i32,
}

/// Partial update; `None` fields keep their current value.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = menu_items)]
pub struct MenuItemChanges {
    pub name_en: Option<String>,
    pub name_ar: Option<String>,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    pub price: Option<BigDecimal>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub is_available: Option<bool>,
    pub sort_order: Option<i32>,
}

impl MenuItemChanges {
    pub fn is_empty(&self) -> bool {
        self.name_en.is_none()
            && self.name_ar.is_none()
            && self.description_en.is_none()
            && self.description_ar.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.image.is_none()
            && self.is_available.is_none()
            && self.sort_order.is_none()
    }
}
