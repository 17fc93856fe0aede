use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Created lazily on first OAuth login, keyed by the provider's subject id.
/// Never updated or deleted afterwards.
#[derive(Debug, Clone, Queryable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: String,
    pub oauth_id: String,
    pub username: String,
    pub email: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub id: String,
    pub oauth_id: String,
    pub username: String,
    pub email: Option<String>,
    pub created_at: String,
}
