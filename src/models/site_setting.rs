use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::site_settings;

/// One keyed setting with both language variants. The `setting_type` column
/// (stored as `type`) is a rendering hint for the admin panel, nothing more.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = site_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SiteSetting {
    pub id: Uuid,
    pub key: String,
    pub value_en: Option<String>,
    pub value_ar: Option<String>,
    pub setting_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
