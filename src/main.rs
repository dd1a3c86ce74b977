//src/main.rs

use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use catalog_backend::{
    config::{AppState, Config},
    routes::create_router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger (RUST_LOG, padrão "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar
    let config = Config::from_env().context("Falha ao carregar a configuração")?;
    let app_state = AppState::new(&config)
        .await
        .context("Falha ao inicializar o estado da aplicação")?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = create_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&config.http_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", config.http_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.shutdown_grace))
        .await
        .context("Erro no servidor Axum")?;

    tracing::info!("👋 Servidor encerrado");
    Ok(())
}

/// Espera SIGINT/SIGTERM. Depois do sinal, as conexões abertas têm `grace`
/// para terminar; passado esse prazo o processo sai de qualquer forma.
async fn shutdown_signal(grace: Duration) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Falha ao escutar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Falha ao escutar SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Ctrl+C recebido, encerrando..."),
        _ = terminate => tracing::info!("SIGTERM recebido, encerrando..."),
    }

    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        tracing::warn!(grace_secs = grace.as_secs(), "Prazo de encerramento esgotado, saindo");
        std::process::exit(0);
    });
}
