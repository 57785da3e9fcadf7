mod common;

use common::{memory_services, seed_cleaning_stock};
use estoque_server::protocol::{decode, Reply};
use estoque_server::services::dispatch;

async fn run(services: &estoque_server::services::AppServices, line: &str) -> String {
    dispatch(services, decode(line)).await.render()
}

#[tokio::test]
async fn key_value_registration_flow() {
    let services = memory_services();

    let reply = run(
        &services,
        "acao=cadastrarcategoria;nome=Limpeza;tamanho=GRANDE;embalagem=PLASTICO",
    )
    .await;
    assert_eq!(reply, "Category registered successfully: Limpeza");

    let reply = run(
        &services,
        "acao=cadastrarproduto;nome=Detergente;categoria=Limpeza;estoqueinicial=100;estoqueminimo=20;preco=5.50",
    )
    .await;
    assert_eq!(reply, "Product registered successfully: Detergente");

    let listing = run(&services, "acao=listarprodutos").await;
    assert!(listing.contains("Detergente - R$ 5.50 (Unidade)"));
    assert!(listing.contains("Stock: 100"));
    // The form carries no maximum; it defaults to ten times the minimum.
    assert!(listing.contains("Max: 200"));
}

#[tokio::test]
async fn key_value_category_defaults_apply_when_fields_are_missing() {
    let services = memory_services();
    let reply = run(&services, "acao=cadastrarcategoria;nome=Bebidas").await;
    assert_eq!(reply, "Category registered successfully: Bebidas");

    let listing = run(&services, "acao=listarcategorias").await;
    assert!(listing.contains("Bebidas - MEDIO | PLASTICO"));
}

#[tokio::test]
async fn key_value_movement_accepts_a_listing_position() {
    let services = memory_services();
    seed_cleaning_stock(&services).await;

    // "1" is not a product name, so it resolves as the first listed product.
    let reply = run(
        &services,
        "acao=registrarmovimentacao;produtoid=1;tipo=ENTRADA;quantidade=30",
    )
    .await;
    assert_eq!(reply, "Movement registered successfully. New stock: 130");

    let history = run(&services, "acao=listarmovimentacoes").await;
    assert!(history.contains("Detergente"));
    assert!(history.contains("ENTRADA"));
    assert!(history.contains("Quantity: 30"));
}

#[tokio::test]
async fn key_value_initial_stock_below_minimum_is_rejected() {
    let services = memory_services();
    seed_cleaning_stock(&services).await;
    let reply = run(
        &services,
        "acao=cadastrarproduto;nome=Sabao;categoria=Limpeza;estoqueinicial=5;estoqueminimo=10;preco=2.00",
    )
    .await;
    assert_eq!(reply, "ERROR|Initial stock cannot be below minimum stock");
}

#[tokio::test]
async fn key_value_unfinished_actions_answer_with_the_placeholder() {
    let services = memory_services();
    for action in ["buscarproduto", "deletarcategoria", "atualizarproduto"] {
        let reply = run(&services, &format!("acao={};nome=x", action)).await;
        assert_eq!(reply, format!("FUNCIONALIDADE_EM_DESENVOLVIMENTO|{}", action));
    }
}

#[tokio::test]
async fn key_value_unknown_and_missing_actions_error() {
    let services = memory_services();
    assert_eq!(
        run(&services, "acao=explodirestoque").await,
        "ERROR|Unrecognized operation: explodirestoque"
    );
    assert_eq!(run(&services, "nome=semacao").await, "ERROR|Action not specified");
}

#[tokio::test]
async fn key_value_reports_render_plain_text() {
    let services = memory_services();
    seed_cleaning_stock(&services).await;
    let body = run(&services, "acao=gerarrelatorio;relatorio=lista_precos").await;
    assert!(body.starts_with("=== PRICE LIST ==="));
    assert!(body.contains("Detergente"));

    assert_eq!(
        run(&services, "acao=gerarrelatorio;relatorio=fofocas").await,
        "ERROR|Unrecognized report type: fofocas"
    );
}

#[tokio::test]
async fn key_value_clear_resets_everything() {
    let services = memory_services();
    seed_cleaning_stock(&services).await;
    assert_eq!(
        run(&services, "acao=limpartudo").await,
        "All data cleared successfully."
    );
    assert_eq!(run(&services, "acao=listarprodutos").await, "");
}

#[tokio::test]
async fn pipe_crud_round_trip() {
    let services = memory_services();

    let reply = run(&services, "CATEGORIA_CRIAR|Limpeza|GRANDE|PLASTICO").await;
    assert_eq!(reply, "SUCCESS|Category created successfully: Limpeza");

    let reply = run(
        &services,
        "PRODUTO_CRIAR|Detergente|5.50|Liter|100|20|200|Limpeza",
    )
    .await;
    assert_eq!(reply, "SUCCESS|Product created successfully: Detergente");

    let reply = run(&services, "produto_buscar|Detergente").await;
    assert_eq!(reply, "SUCCESS|Detergente|5.50|Liter|100|20|200|Limpeza");

    let listing = run(&services, "PRODUTO_LISTAR").await;
    assert_eq!(listing, "SUCCESS|Detergente|5.50|Liter|100|20|200|Limpeza;");

    let reply = run(
        &services,
        "PRODUTO_ATUALIZAR|Detergente|6.00|Liter|100|20|250|Limpeza",
    )
    .await;
    assert_eq!(reply, "SUCCESS|Product updated successfully: Detergente");

    let reply = run(&services, "PRODUTO_DELETAR|Detergente").await;
    assert_eq!(reply, "SUCCESS|Product deleted successfully: Detergente");

    let reply = run(&services, "CATEGORIA_DELETAR|Limpeza").await;
    assert_eq!(reply, "SUCCESS|Category deleted successfully: Limpeza");
}

#[tokio::test]
async fn pipe_movement_reports_the_new_balance() {
    let services = memory_services();
    seed_cleaning_stock(&services).await;

    let reply = run(&services, "MOVIMENTACAO_CRIAR|Detergente|SAIDA|40").await;
    assert_eq!(reply, "SUCCESS|Movement created successfully. New stock: 60");

    let listing = run(&services, "MOVIMENTACAO_LISTAR").await;
    assert!(listing.starts_with("SUCCESS|Detergente|"));
    assert!(listing.ends_with("|SAIDA|40;"));
}

#[tokio::test]
async fn pipe_argument_and_token_validation() {
    let services = memory_services();
    seed_cleaning_stock(&services).await;

    assert_eq!(
        run(&services, "PRODUTO_CRIAR|SoNome").await,
        "ERROR|Insufficient parameters to create product"
    );
    assert_eq!(
        run(&services, "CATEGORIA_CRIAR|Bebidas|ENORME|LATA").await,
        "ERROR|Invalid size. Use: PEQUENO, MEDIO or GRANDE"
    );
    assert_eq!(
        run(&services, "MOVIMENTACAO_CRIAR|Detergente|TRANSFERENCIA|5").await,
        "ERROR|Invalid movement type. Use: ENTRADA or SAIDA"
    );
    assert_eq!(
        run(&services, "MOVIMENTACAO_CRIAR|Detergente|ENTRADA|muitos").await,
        "ERROR|Invalid quantity: muitos"
    );
    assert_eq!(
        run(&services, "ESTOQUE_EXPLODIR").await,
        "ERROR|Unrecognized operation: ESTOQUE_EXPLODIR"
    );
}

#[tokio::test]
async fn pipe_reports_are_raw_text() {
    let services = memory_services();
    seed_cleaning_stock(&services).await;
    let body = run(&services, "RELATORIO_BALANCO").await;
    assert!(body.starts_with("=== PHYSICAL AND FINANCIAL BALANCE ==="));
    assert!(!body.starts_with("SUCCESS|"));
}

#[tokio::test]
async fn duplicate_names_conflict_across_dialects() {
    let services = memory_services();
    seed_cleaning_stock(&services).await;

    assert_eq!(
        run(&services, "CATEGORIA_CRIAR|LIMPEZA|MEDIO|VIDRO").await,
        "ERROR|Category already exists: LIMPEZA"
    );
    assert_eq!(
        run(
            &services,
            "acao=cadastrarproduto;nome=DETERGENTE;categoria=Limpeza;estoqueinicial=10;estoqueminimo=1;preco=1.00",
        )
        .await,
        "ERROR|Product already exists: DETERGENTE"
    );
}
