use sea_orm_migration::prelude::*;

/// Embedded schema migrations for the three inventory tables.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_categories_table::Migration),
            Box::new(m20240101_000002_create_products_table::Migration),
            Box::new(m20240101_000003_create_movements_table::Migration),
        ]
    }
}

mod m20240101_000001_create_categories_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_categories_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Categories::Name)
                                .string()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Categories::Size).string().not_null())
                        .col(ColumnDef::new(Categories::Packaging).string().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Categories {
        Table,
        Name,
        Size,
        Packaging,
    }
}

mod m20240101_000002_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Name)
                                .string()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UnitPrice)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::Unit).string().not_null())
                        .col(ColumnDef::new(Products::CurrentStock).integer().not_null())
                        .col(ColumnDef::new(Products::MinStock).integer().not_null())
                        .col(ColumnDef::new(Products::MaxStock).integer().not_null())
                        .col(ColumnDef::new(Products::CategoryName).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_products_category_name")
                        .table(Products::Table)
                        .col(Products::CategoryName)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Products {
        Table,
        Name,
        UnitPrice,
        Unit,
        CurrentStock,
        MinStock,
        MaxStock,
        CategoryName,
    }
}

mod m20240101_000003_create_movements_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_movements_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Movements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Movements::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Movements::ProductName).string().not_null())
                        .col(ColumnDef::new(Movements::Kind).string().not_null())
                        .col(ColumnDef::new(Movements::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(Movements::OccurredAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_movements_product_name")
                        .table(Movements::Table)
                        .col(Movements::ProductName)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Movements::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Movements {
        Table,
        Id,
        ProductName,
        Kind,
        Quantity,
        OccurredAt,
    }
}
