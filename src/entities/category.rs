use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category row. Size and packaging are stored as their wire tokens
/// (`PEQUENO`…, `LATA`…).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Category name; identity, matched case-insensitively by queries
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,

    /// Size class wire token
    pub size: String,

    /// Packaging class wire token
    pub packaging: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product::Entity")]
    Products,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
