//! Maps decoded commands onto the services and renders replies.
//!
//! Both dialects funnel into [`dispatch`]; every failure becomes an
//! `ERROR|<message>` reply and never tears down the connection.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::str::FromStr;
use tracing::debug;

use crate::errors::ServiceError;
use crate::models::{CategoryPackaging, CategorySize, MovementKind, Product};
use crate::protocol::{Command, Reply};
use crate::services::AppServices;

/// Key-value actions the frontend sends but the server does not implement.
const IN_DEVELOPMENT: &[&str] = &[
    "buscarproduto",
    "atualizarproduto",
    "deletarproduto",
    "buscarcategoria",
    "atualizarcategoria",
    "deletarcategoria",
];

pub async fn dispatch(services: &AppServices, command: Command) -> Reply {
    let result = match &command {
        Command::KeyValue { action, params } => {
            debug!(action = %action, dialect = "key-value", "Dispatching command");
            dispatch_key_value(services, action, params).await
        }
        Command::Pipe { action, args } => {
            debug!(action = %action, dialect = "pipe", "Dispatching command");
            dispatch_pipe(services, action, args).await
        }
    };
    match result {
        Ok(reply) => reply,
        Err(err) => Reply::Error(err.wire_message()),
    }
}

fn parse_i32(value: &str, what: &str) -> Result<i32, ServiceError> {
    value
        .trim()
        .parse()
        .map_err(|_| ServiceError::validation(format!("Invalid {}: {}", what, value.trim())))
}

fn parse_price(value: &str) -> Result<Decimal, ServiceError> {
    Decimal::from_str(value.trim())
        .map_err(|_| ServiceError::validation(format!("Invalid price: {}", value.trim())))
}

// ---------------------------------------------------------------------
// Key-value dialect
// ---------------------------------------------------------------------

async fn dispatch_key_value(
    services: &AppServices,
    action: &str,
    params: &HashMap<String, String>,
) -> Result<Reply, ServiceError> {
    if action.is_empty() {
        return Err(ServiceError::validation("Action not specified"));
    }
    if IN_DEVELOPMENT.contains(&action) {
        return Ok(Reply::InDevelopment(action.to_string()));
    }
    match action {
        "cadastrarproduto" => register_product(services, params).await,
        "listarprodutos" => list_products_text(services).await,
        "cadastrarcategoria" => register_category(services, params).await,
        "listarcategorias" => list_categories_text(services).await,
        "registrarmovimentacao" => register_movement(services, params).await,
        "listarmovimentacoes" => list_movements_text(services).await,
        "gerarrelatorio" => generate_report(services, params).await,
        "limpartudo" => {
            services.clear_all().await?;
            Ok(Reply::Text("All data cleared successfully.".into()))
        }
        other => Err(ServiceError::UnrecognizedAction(other.to_string())),
    }
}

async fn register_product(
    services: &AppServices,
    params: &HashMap<String, String>,
) -> Result<Reply, ServiceError> {
    let (name, category, initial, minimum, price) = match (
        params.get("nome"),
        params.get("categoria"),
        params.get("estoqueinicial"),
        params.get("estoqueminimo"),
        params.get("preco"),
    ) {
        (Some(n), Some(c), Some(i), Some(m), Some(p)) => (n, c, i, m, p),
        _ => {
            return Err(ServiceError::validation(
                "Incomplete parameters to register product",
            ))
        }
    };

    let initial = parse_i32(initial, "initial stock")?;
    let minimum = parse_i32(minimum, "minimum stock")?;
    let price = parse_price(price)?;
    if initial < minimum {
        return Err(ServiceError::validation(
            "Initial stock cannot be below minimum stock",
        ));
    }

    // The frontend form carries no maximum or unit; both get defaults.
    let product = services
        .products
        .create(Product {
            name: name.clone(),
            unit_price: price,
            unit: "Unidade".into(),
            current_stock: initial,
            min_stock: minimum,
            max_stock: minimum.saturating_mul(10),
            category: category.clone(),
        })
        .await?;
    Ok(Reply::Text(format!(
        "Product registered successfully: {}",
        product.name
    )))
}

async fn list_products_text(services: &AppServices) -> Result<Reply, ServiceError> {
    let products = services.products.list().await?;
    let mut out = String::new();
    for p in &products {
        let _ = writeln!(
            out,
            "{} - R$ {:.2} ({}) | Stock: {} | Min: {} | Max: {} | Category: {}",
            p.name, p.unit_price, p.unit, p.current_stock, p.min_stock, p.max_stock, p.category
        );
    }
    Ok(Reply::Text(out))
}

async fn register_category(
    services: &AppServices,
    params: &HashMap<String, String>,
) -> Result<Reply, ServiceError> {
    let name = params
        .get("nome")
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ServiceError::validation("Category name is required"))?;

    // Missing or blank classification falls back to the form defaults.
    let size = match params.get("tamanho").map(|t| t.trim()).filter(|t| !t.is_empty()) {
        Some(token) => CategorySize::parse_wire(token)?,
        None => CategorySize::Medium,
    };
    let packaging = match params.get("embalagem").map(|e| e.trim()).filter(|e| !e.is_empty()) {
        Some(token) => CategoryPackaging::parse_wire(token)?,
        None => CategoryPackaging::Plastic,
    };

    let category = services.categories.create(name, size, packaging).await?;
    Ok(Reply::Text(format!(
        "Category registered successfully: {}",
        category.name
    )))
}

async fn list_categories_text(services: &AppServices) -> Result<Reply, ServiceError> {
    let categories = services.categories.list().await?;
    let mut out = String::new();
    for c in &categories {
        let _ = writeln!(out, "{} - {} | {}", c.name, c.size, c.packaging);
    }
    Ok(Reply::Text(out))
}

async fn register_movement(
    services: &AppServices,
    params: &HashMap<String, String>,
) -> Result<Reply, ServiceError> {
    let (product_ref, kind, quantity) = match (
        params.get("produtoid"),
        params.get("tipo"),
        params.get("quantidade"),
    ) {
        (Some(p), Some(t), Some(q)) => (p, t, q),
        _ => {
            return Err(ServiceError::validation(
                "Incomplete parameters to register movement",
            ))
        }
    };

    let kind = MovementKind::parse_wire(kind)?;
    let quantity = parse_i32(quantity, "quantity")?;
    let product_name = resolve_product_reference(services, product_ref).await?;
    let applied = services.ledger.apply(&product_name, kind, quantity).await?;
    Ok(Reply::Text(format!(
        "Movement registered successfully. New stock: {}",
        applied.new_stock
    )))
}

/// The frontend sends either a product name or a 1-based position in the
/// product listing. Names win; the index is only tried when no product
/// matches the text.
async fn resolve_product_reference(
    services: &AppServices,
    reference: &str,
) -> Result<String, ServiceError> {
    if let Ok(product) = services.products.get(reference).await {
        return Ok(product.name);
    }
    if let Ok(position) = reference.trim().parse::<usize>() {
        let products = services.products.list().await?;
        if position >= 1 && position <= products.len() {
            return Ok(products[position - 1].name.clone());
        }
    }
    Err(ServiceError::not_found(format!(
        "Product not found: {}",
        reference.trim()
    )))
}

async fn list_movements_text(services: &AppServices) -> Result<Reply, ServiceError> {
    let movements = services.ledger.history(None).await?;
    let mut out = String::new();
    for m in &movements {
        let _ = writeln!(
            out,
            "{} | {} | {} | Quantity: {}",
            m.product_name,
            m.wire_timestamp(),
            m.kind,
            m.quantity
        );
    }
    Ok(Reply::Text(out))
}

async fn generate_report(
    services: &AppServices,
    params: &HashMap<String, String>,
) -> Result<Reply, ServiceError> {
    let kind = params
        .get("relatorio")
        .ok_or_else(|| ServiceError::validation("Report type not specified"))?;
    let body = match kind.to_lowercase().as_str() {
        "lista_precos" => services.reports.price_list().await?,
        "balanco_fisico_financeiro" => services.reports.physical_financial_balance().await?,
        "produtos_abaixo_minimo" => services.reports.below_minimum().await?,
        "quantidade_por_categoria" => services.reports.quantity_per_category().await?,
        "produto_maior_movimentacao" => services.reports.most_movements().await?,
        other => {
            return Err(ServiceError::validation(format!(
                "Unrecognized report type: {}",
                other
            )))
        }
    };
    Ok(Reply::Text(body))
}

// ---------------------------------------------------------------------
// Pipe dialect
// ---------------------------------------------------------------------

async fn dispatch_pipe(
    services: &AppServices,
    action: &str,
    args: &[String],
) -> Result<Reply, ServiceError> {
    match action {
        "PRODUTO_CRIAR" => pipe_create_product(services, args).await,
        "PRODUTO_LISTAR" => pipe_list_products(services).await,
        "PRODUTO_BUSCAR" => pipe_find_product(services, args).await,
        "PRODUTO_ATUALIZAR" => pipe_update_product(services, args).await,
        "PRODUTO_DELETAR" => pipe_delete_product(services, args).await,

        "CATEGORIA_CRIAR" => pipe_create_category(services, args).await,
        "CATEGORIA_LISTAR" => pipe_list_categories(services).await,
        "CATEGORIA_BUSCAR" => pipe_find_category(services, args).await,
        "CATEGORIA_ATUALIZAR" => pipe_update_category(services, args).await,
        "CATEGORIA_DELETAR" => pipe_delete_category(services, args).await,

        "MOVIMENTACAO_CRIAR" => pipe_create_movement(services, args).await,
        "MOVIMENTACAO_LISTAR" => pipe_list_movements(services).await,

        "RELATORIO_LISTA_PRECOS" => Ok(Reply::Text(services.reports.price_list().await?)),
        "RELATORIO_BALANCO" => Ok(Reply::Text(
            services.reports.physical_financial_balance().await?,
        )),
        "RELATORIO_ABAIXO_MINIMO" => Ok(Reply::Text(services.reports.below_minimum().await?)),
        "RELATORIO_QUANTIDADE_CATEGORIA" => {
            Ok(Reply::Text(services.reports.quantity_per_category().await?))
        }
        "RELATORIO_MAIS_MOVIMENTACOES" => Ok(Reply::Text(services.reports.most_movements().await?)),

        other => Err(ServiceError::UnrecognizedAction(other.to_string())),
    }
}

fn product_record(p: &Product) -> String {
    format!(
        "{}|{:.2}|{}|{}|{}|{}|{}",
        p.name, p.unit_price, p.unit, p.current_stock, p.min_stock, p.max_stock, p.category
    )
}

fn product_from_args(args: &[String]) -> Result<Product, ServiceError> {
    Ok(Product {
        name: args[0].clone(),
        unit_price: parse_price(&args[1])?,
        unit: args[2].clone(),
        current_stock: parse_i32(&args[3], "stock")?,
        min_stock: parse_i32(&args[4], "minimum stock")?,
        max_stock: parse_i32(&args[5], "maximum stock")?,
        category: args[6].clone(),
    })
}

async fn pipe_create_product(
    services: &AppServices,
    args: &[String],
) -> Result<Reply, ServiceError> {
    if args.len() < 7 {
        return Err(ServiceError::validation(
            "Insufficient parameters to create product",
        ));
    }
    let product = services.products.create(product_from_args(args)?).await?;
    Ok(Reply::PipeSuccess(format!(
        "Product created successfully: {}",
        product.name
    )))
}

async fn pipe_list_products(services: &AppServices) -> Result<Reply, ServiceError> {
    let products = services.products.list().await?;
    let payload: String = products
        .iter()
        .map(|p| format!("{};", product_record(p)))
        .collect();
    Ok(Reply::PipeSuccess(payload))
}

async fn pipe_find_product(services: &AppServices, args: &[String]) -> Result<Reply, ServiceError> {
    if args.is_empty() {
        return Err(ServiceError::validation("Product name is required"));
    }
    let product = services.products.get(&args[0]).await?;
    Ok(Reply::PipeSuccess(product_record(&product)))
}

async fn pipe_update_product(
    services: &AppServices,
    args: &[String],
) -> Result<Reply, ServiceError> {
    if args.len() < 7 {
        return Err(ServiceError::validation(
            "Insufficient parameters to update product",
        ));
    }
    let product = services.products.update(product_from_args(args)?).await?;
    Ok(Reply::PipeSuccess(format!(
        "Product updated successfully: {}",
        product.name
    )))
}

async fn pipe_delete_product(
    services: &AppServices,
    args: &[String],
) -> Result<Reply, ServiceError> {
    if args.is_empty() {
        return Err(ServiceError::validation("Product name is required"));
    }
    services.products.delete(&args[0]).await?;
    Ok(Reply::PipeSuccess(format!(
        "Product deleted successfully: {}",
        args[0]
    )))
}

async fn pipe_create_category(
    services: &AppServices,
    args: &[String],
) -> Result<Reply, ServiceError> {
    if args.len() < 3 {
        return Err(ServiceError::validation(
            "Insufficient parameters to create category",
        ));
    }
    let size = CategorySize::parse_wire(&args[1])?;
    let packaging = CategoryPackaging::parse_wire(&args[2])?;
    let category = services.categories.create(&args[0], size, packaging).await?;
    Ok(Reply::PipeSuccess(format!(
        "Category created successfully: {}",
        category.name
    )))
}

async fn pipe_list_categories(services: &AppServices) -> Result<Reply, ServiceError> {
    let categories = services.categories.list().await?;
    let payload: String = categories
        .iter()
        .map(|c| format!("{}|{}|{};", c.name, c.size, c.packaging))
        .collect();
    Ok(Reply::PipeSuccess(payload))
}

async fn pipe_find_category(
    services: &AppServices,
    args: &[String],
) -> Result<Reply, ServiceError> {
    if args.is_empty() {
        return Err(ServiceError::validation("Category name is required"));
    }
    let category = services.categories.get(&args[0]).await?;
    Ok(Reply::PipeSuccess(format!(
        "{}|{}|{}",
        category.name, category.size, category.packaging
    )))
}

async fn pipe_update_category(
    services: &AppServices,
    args: &[String],
) -> Result<Reply, ServiceError> {
    if args.len() < 3 {
        return Err(ServiceError::validation(
            "Insufficient parameters to update category",
        ));
    }
    let size = CategorySize::parse_wire(&args[1])?;
    let packaging = CategoryPackaging::parse_wire(&args[2])?;
    let category = services.categories.update(&args[0], size, packaging).await?;
    Ok(Reply::PipeSuccess(format!(
        "Category updated successfully: {}",
        category.name
    )))
}

async fn pipe_delete_category(
    services: &AppServices,
    args: &[String],
) -> Result<Reply, ServiceError> {
    if args.is_empty() {
        return Err(ServiceError::validation("Category name is required"));
    }
    services.categories.delete(&args[0]).await?;
    Ok(Reply::PipeSuccess(format!(
        "Category deleted successfully: {}",
        args[0]
    )))
}

async fn pipe_create_movement(
    services: &AppServices,
    args: &[String],
) -> Result<Reply, ServiceError> {
    if args.len() < 3 {
        return Err(ServiceError::validation(
            "Insufficient parameters to create movement",
        ));
    }
    let kind = MovementKind::parse_wire(&args[1])?;
    let quantity = parse_i32(&args[2], "quantity")?;
    let applied = services.ledger.apply(&args[0], kind, quantity).await?;
    Ok(Reply::PipeSuccess(format!(
        "Movement created successfully. New stock: {}",
        applied.new_stock
    )))
}

async fn pipe_list_movements(services: &AppServices) -> Result<Reply, ServiceError> {
    let movements = services.ledger.history(None).await?;
    let payload: String = movements
        .iter()
        .map(|m| {
            format!(
                "{}|{}|{}|{};",
                m.product_name,
                m.wire_timestamp(),
                m.kind,
                m.quantity
            )
        })
        .collect();
    Ok(Reply::PipeSuccess(payload))
}
