//! Cache entry entity for SeaORM.

use relief_core::domain::CacheKey;
use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cache")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub key: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub value: Json,
    pub expires_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    /// Full row for an upsert.
    pub fn for_upsert(key: &CacheKey, value: Json, expires_at: DateTimeWithTimeZone) -> Self {
        Self {
            key: Set(key.as_str().to_owned()),
            value: Set(value),
            expires_at: Set(expires_at),
        }
    }
}
