use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product row. `current_stock` is the materialized balance maintained by
/// the stock ledger; it is never recomputed from the movement log.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Product name; identity, matched case-insensitively by queries
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,

    /// Unit price
    pub unit_price: Decimal,

    /// Free-text unit label (e.g. "Liter")
    pub unit: String,

    /// Current stock balance
    pub current_stock: i32,

    /// Minimum stock threshold (reporting only)
    pub min_stock: i32,

    /// Maximum stock capacity
    pub max_stock: i32,

    /// Referenced category name
    pub category_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryName",
        to = "super::category::Column::Name"
    )]
    Category,
    #[sea_orm(has_many = "super::movement::Entity")]
    Movements,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::movement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
