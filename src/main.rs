use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use fetchy::config::Config;
use fetchy::models::{ConvertAccepted, ConvertRequest, ErrorResponse, HealthResponse, JobState};
use fetchy::routes;
use fetchy::services::downloader::YtDlpDownloader;
use fetchy::services::registry::JobRegistry;
use fetchy::services::scheduler::Scheduler;
use fetchy::services::store::ArtifactStore;
use fetchy::utils::check_ytdlp_available;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fetchy API",
        version = "1.0.0",
        description = "API per convertire video YouTube in file audio o video",
        license(name = "MIT"),
    ),
    paths(
        fetchy::routes::convert::convert,
        fetchy::routes::status::job_status,
        fetchy::routes::health::health_check,
    ),
    components(schemas(
        ConvertRequest,
        ConvertAccepted,
        JobState,
        HealthResponse,
        ErrorResponse,
    )),
    tags(
        (name = "Conversione", description = "Accodamento e stato dei job"),
        (name = "Sistema", description = "Health check e info"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Carica variabili da .env
    dotenvy::dotenv().ok();

    // Inizializza logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fetchy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Carica configurazione
    let config = Config::from_env();

    // Crea la directory dei download
    if let Err(e) = std::fs::create_dir_all(&config.downloads_dir) {
        tracing::error!(
            "impossibile creare {}: {}",
            config.downloads_dir.display(),
            e
        );
        std::process::exit(1);
    }

    // Verifica yt-dlp
    if check_ytdlp_available(&config.ytdlp_bin) {
        tracing::info!("{} disponibile - conversioni abilitate", config.ytdlp_bin);
    } else {
        tracing::warn!(
            "{} non trovato - i job falliranno finche' non viene installato",
            config.ytdlp_bin
        );
    }

    // Crea scheduler con registro e store condivisi
    let registry = JobRegistry::new();
    let store = ArtifactStore::new(config.downloads_dir.clone(), config.artifact_ttl);
    let executor = Arc::new(YtDlpDownloader::new(
        config.ytdlp_bin.clone(),
        config.downloads_dir.clone(),
        config.tool_timeout,
    ));
    let scheduler = Scheduler::new(registry, store, executor);

    // CORS layer - aperto, da restringere in futuro
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Costruisci router completo con Swagger
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(routes::create_router(scheduler, &config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Avvia server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Indirizzo non valido");

    tracing::info!("========================================");
    tracing::info!("  Fetchy API v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("========================================");
    tracing::info!("Server: http://{}", addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", addr);
    tracing::info!("----------------------------------------");
    tracing::info!("Endpoints:");
    tracing::info!("  POST /convert            - Accoda conversione");
    tracing::info!("  GET  /status/:id         - Stato job");
    tracing::info!("  GET  /download/:filename - Scarica risultato");
    tracing::info!("  GET  /health             - Health check");
    tracing::info!("----------------------------------------");
    tracing::info!(
        "Download dir: {} (scadenza {}s)",
        config.downloads_dir.display(),
        config.artifact_ttl.as_secs()
    );

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
