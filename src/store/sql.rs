use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionError, TransactionTrait,
};
use std::sync::Arc;

use crate::entities::{category, movement, product};
use crate::errors::ServiceError;
use crate::models::{Category, Movement, MovementKind, Product};
use crate::store::InventoryStore;

/// Relational backend over sea-orm. Writes that touch more than one row,
/// or that pair a uniqueness/referential check with a mutation, run inside
/// a database transaction so the check and the write cannot be split.
#[derive(Clone)]
pub struct SqlStore {
    db: Arc<DatabaseConnection>,
}

impl SqlStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn norm(name: &str) -> String {
    name.trim().to_lowercase()
}

fn lower_name_eq<C: ColumnTrait>(column: C, name: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).eq(norm(name))
}

fn map_tx_err(err: TransactionError<ServiceError>) -> ServiceError {
    match err {
        TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
        TransactionError::Transaction(service_err) => service_err,
    }
}

fn corrupt(field: &str, value: &str) -> ServiceError {
    ServiceError::InternalError(format!("Stored {} token is not recognized: {}", field, value))
}

fn category_from_row(row: category::Model) -> Result<Category, ServiceError> {
    Ok(Category {
        size: row.size.parse().map_err(|_| corrupt("size", &row.size))?,
        packaging: row
            .packaging
            .parse()
            .map_err(|_| corrupt("packaging", &row.packaging))?,
        name: row.name,
    })
}

fn category_to_row(category: &Category) -> category::ActiveModel {
    category::ActiveModel {
        name: Set(category.name.clone()),
        size: Set(category.size.to_string()),
        packaging: Set(category.packaging.to_string()),
    }
}

fn product_from_row(row: product::Model) -> Product {
    Product {
        name: row.name,
        unit_price: row.unit_price,
        unit: row.unit,
        current_stock: row.current_stock,
        min_stock: row.min_stock,
        max_stock: row.max_stock,
        category: row.category_name,
    }
}

fn movement_from_row(row: movement::Model) -> Result<Movement, ServiceError> {
    Ok(Movement {
        id: row.id,
        kind: row.kind.parse().map_err(|_| corrupt("kind", &row.kind))?,
        product_name: row.product_name,
        occurred_at: row.occurred_at,
        quantity: row.quantity,
    })
}

#[async_trait]
impl InventoryStore for SqlStore {
    async fn insert_category(&self, cat: Category) -> Result<(), ServiceError> {
        self.db
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    let taken = category::Entity::find()
                        .filter(lower_name_eq(category::Column::Name, &cat.name))
                        .count(txn)
                        .await?;
                    if taken > 0 {
                        return Err(ServiceError::conflict(format!(
                            "Category already exists: {}",
                            cat.name
                        )));
                    }
                    category_to_row(&cat).insert(txn).await?;
                    Ok(())
                })
            })
            .await
            .map_err(map_tx_err)
    }

    async fn find_category(&self, name: &str) -> Result<Option<Category>, ServiceError> {
        let row = category::Entity::find()
            .filter(lower_name_eq(category::Column::Name, name))
            .one(&*self.db)
            .await?;
        row.map(category_from_row).transpose()
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ServiceError> {
        let rows = category::Entity::find()
            .order_by(
                Expr::expr(Func::lower(Expr::col(category::Column::Name))),
                Order::Asc,
            )
            .all(&*self.db)
            .await?;
        rows.into_iter().map(category_from_row).collect()
    }

    async fn update_category(&self, cat: Category) -> Result<(), ServiceError> {
        self.db
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = category::Entity::find()
                        .filter(lower_name_eq(category::Column::Name, &cat.name))
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::not_found(format!("Category not found: {}", cat.name))
                        })?;
                    let mut row: category::ActiveModel = existing.into();
                    row.size = Set(cat.size.to_string());
                    row.packaging = Set(cat.packaging.to_string());
                    row.update(txn).await?;
                    Ok(())
                })
            })
            .await
            .map_err(map_tx_err)
    }

    async fn delete_category(&self, name: &str) -> Result<(), ServiceError> {
        let name = name.to_string();
        self.db
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = category::Entity::find()
                        .filter(lower_name_eq(category::Column::Name, &name))
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::not_found(format!("Category not found: {}", name))
                        })?;
                    let in_use = product::Entity::find()
                        .filter(lower_name_eq(product::Column::CategoryName, &name))
                        .count(txn)
                        .await?;
                    if in_use > 0 {
                        return Err(ServiceError::conflict(format!(
                            "Category has products and cannot be deleted: {}",
                            name
                        )));
                    }
                    category::Entity::delete_by_id(existing.name).exec(txn).await?;
                    Ok(())
                })
            })
            .await
            .map_err(map_tx_err)
    }

    async fn insert_product(&self, prod: Product) -> Result<(), ServiceError> {
        self.db
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    let taken = product::Entity::find()
                        .filter(lower_name_eq(product::Column::Name, &prod.name))
                        .count(txn)
                        .await?;
                    if taken > 0 {
                        return Err(ServiceError::conflict(format!(
                            "Product already exists: {}",
                            prod.name
                        )));
                    }
                    let category_rows = category::Entity::find()
                        .filter(lower_name_eq(category::Column::Name, &prod.category))
                        .count(txn)
                        .await?;
                    if category_rows == 0 {
                        return Err(ServiceError::not_found(format!(
                            "Category not found: {}",
                            prod.category
                        )));
                    }
                    product::ActiveModel {
                        name: Set(prod.name.clone()),
                        unit_price: Set(prod.unit_price),
                        unit: Set(prod.unit.clone()),
                        current_stock: Set(prod.current_stock),
                        min_stock: Set(prod.min_stock),
                        max_stock: Set(prod.max_stock),
                        category_name: Set(prod.category.clone()),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .map_err(map_tx_err)
    }

    async fn find_product(&self, name: &str) -> Result<Option<Product>, ServiceError> {
        let row = product::Entity::find()
            .filter(lower_name_eq(product::Column::Name, name))
            .one(&*self.db)
            .await?;
        Ok(row.map(product_from_row))
    }

    async fn list_products(&self) -> Result<Vec<Product>, ServiceError> {
        let rows = product::Entity::find()
            .order_by(
                Expr::expr(Func::lower(Expr::col(product::Column::Name))),
                Order::Asc,
            )
            .all(&*self.db)
            .await?;
        Ok(rows.into_iter().map(product_from_row).collect())
    }

    async fn update_product(&self, prod: Product) -> Result<(), ServiceError> {
        self.db
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    let category_rows = category::Entity::find()
                        .filter(lower_name_eq(category::Column::Name, &prod.category))
                        .count(txn)
                        .await?;
                    if category_rows == 0 {
                        return Err(ServiceError::not_found(format!(
                            "Category not found: {}",
                            prod.category
                        )));
                    }
                    let existing = product::Entity::find()
                        .filter(lower_name_eq(product::Column::Name, &prod.name))
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::not_found(format!("Product not found: {}", prod.name))
                        })?;
                    let mut row: product::ActiveModel = existing.into();
                    row.unit_price = Set(prod.unit_price);
                    row.unit = Set(prod.unit.clone());
                    row.current_stock = Set(prod.current_stock);
                    row.min_stock = Set(prod.min_stock);
                    row.max_stock = Set(prod.max_stock);
                    row.category_name = Set(prod.category.clone());
                    row.update(txn).await?;
                    Ok(())
                })
            })
            .await
            .map_err(map_tx_err)
    }

    async fn delete_product(&self, name: &str) -> Result<(), ServiceError> {
        let name = name.to_string();
        self.db
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = product::Entity::find()
                        .filter(lower_name_eq(product::Column::Name, &name))
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::not_found(format!("Product not found: {}", name))
                        })?;
                    let referenced = movement::Entity::find()
                        .filter(lower_name_eq(movement::Column::ProductName, &name))
                        .count(txn)
                        .await?;
                    if referenced > 0 {
                        return Err(ServiceError::conflict(format!(
                            "Product has movements and cannot be deleted: {}",
                            name
                        )));
                    }
                    product::Entity::delete_by_id(existing.name).exec(txn).await?;
                    Ok(())
                })
            })
            .await
            .map_err(map_tx_err)
    }

    async fn products_in_category(&self, category_name: &str) -> Result<Vec<Product>, ServiceError> {
        let rows = product::Entity::find()
            .filter(lower_name_eq(product::Column::CategoryName, category_name))
            .order_by(
                Expr::expr(Func::lower(Expr::col(product::Column::Name))),
                Order::Asc,
            )
            .all(&*self.db)
            .await?;
        Ok(rows.into_iter().map(product_from_row).collect())
    }

    async fn apply_movement(
        &self,
        prod: Product,
        mov: Movement,
    ) -> Result<(), ServiceError> {
        self.db
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = product::Entity::find()
                        .filter(lower_name_eq(product::Column::Name, &prod.name))
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::not_found(format!("Product not found: {}", prod.name))
                        })?;
                    let mut row: product::ActiveModel = existing.into();
                    row.current_stock = Set(prod.current_stock);
                    row.update(txn).await?;

                    movement::ActiveModel {
                        id: Set(mov.id),
                        product_name: Set(mov.product_name.clone()),
                        kind: Set(mov.kind.to_string()),
                        quantity: Set(mov.quantity),
                        occurred_at: Set(mov.occurred_at),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .map_err(map_tx_err)
    }

    async fn list_movements(&self) -> Result<Vec<Movement>, ServiceError> {
        let rows = movement::Entity::find()
            .order_by_desc(movement::Column::OccurredAt)
            .all(&*self.db)
            .await?;
        rows.into_iter().map(movement_from_row).collect()
    }

    async fn movements_for_product(&self, prod: &str) -> Result<Vec<Movement>, ServiceError> {
        let rows = movement::Entity::find()
            .filter(lower_name_eq(movement::Column::ProductName, prod))
            .order_by_desc(movement::Column::OccurredAt)
            .all(&*self.db)
            .await?;
        rows.into_iter().map(movement_from_row).collect()
    }

    async fn movements_by_kind(&self, kind: MovementKind) -> Result<Vec<Movement>, ServiceError> {
        let rows = movement::Entity::find()
            .filter(movement::Column::Kind.eq(kind.to_string()))
            .order_by_desc(movement::Column::OccurredAt)
            .all(&*self.db)
            .await?;
        rows.into_iter().map(movement_from_row).collect()
    }

    async fn clear_all(&self) -> Result<(), ServiceError> {
        self.db
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    movement::Entity::delete_many().exec(txn).await?;
                    product::Entity::delete_many().exec(txn).await?;
                    category::Entity::delete_many().exec(txn).await?;
                    Ok(())
                })
            })
            .await
            .map_err(map_tx_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrator::Migrator;
    use crate::models::{CategoryPackaging, CategorySize};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use sea_orm::{ConnectOptions, Database};
    use sea_orm_migration::MigratorTrait;
    use uuid::Uuid;

    async fn store() -> SqlStore {
        // One connection, or each pooled connection would get its own
        // empty in-memory database.
        let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
        options.max_connections(1);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SqlStore::new(Arc::new(db))
    }

    fn category(name: &str) -> Category {
        Category {
            name: name.into(),
            size: CategorySize::Medium,
            packaging: CategoryPackaging::Glass,
        }
    }

    fn product(name: &str, category: &str) -> Product {
        Product {
            name: name.into(),
            unit_price: dec!(8.90),
            unit: "Liter".into(),
            current_stock: 100,
            min_stock: 20,
            max_stock: 200,
            category: category.into(),
        }
    }

    #[tokio::test]
    async fn lookups_ignore_case() {
        let store = store().await;
        store.insert_category(category("Limpeza")).await.unwrap();
        store
            .insert_product(product("Detergente", "Limpeza"))
            .await
            .unwrap();

        let found = store.find_product("DETERGENTE").await.unwrap().unwrap();
        assert_eq!(found.name, "Detergente");
        assert_eq!(found.category, "Limpeza");
    }

    #[tokio::test]
    async fn duplicate_product_is_rejected() {
        let store = store().await;
        store.insert_category(category("Limpeza")).await.unwrap();
        store
            .insert_product(product("Detergente", "Limpeza"))
            .await
            .unwrap();
        let err = store
            .insert_product(product("detergente", "Limpeza"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn movement_updates_stock_and_logs_row() {
        let store = store().await;
        store.insert_category(category("Limpeza")).await.unwrap();
        store
            .insert_product(product("Detergente", "Limpeza"))
            .await
            .unwrap();

        let mut updated = product("Detergente", "Limpeza");
        updated.current_stock = 150;
        store
            .apply_movement(
                updated,
                Movement {
                    id: Uuid::new_v4(),
                    product_name: "Detergente".into(),
                    occurred_at: Utc::now(),
                    quantity: 50,
                    kind: MovementKind::Inbound,
                },
            )
            .await
            .unwrap();

        let found = store.find_product("Detergente").await.unwrap().unwrap();
        assert_eq!(found.current_stock, 150);
        let movements = store.movements_for_product("detergente").await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].kind, MovementKind::Inbound);
    }

    #[tokio::test]
    async fn referenced_category_cannot_be_deleted() {
        let store = store().await;
        store.insert_category(category("Limpeza")).await.unwrap();
        store
            .insert_product(product("Detergente", "Limpeza"))
            .await
            .unwrap();
        let err = store.delete_category("Limpeza").await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }
}
