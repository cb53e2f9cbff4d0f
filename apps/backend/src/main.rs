use actix_web::{web, App, HttpServer};
use backend::config::db::DbConfig;
use backend::db::connect_db;
use backend::domain::cards::validate_catalogs;
use backend::middleware::cors::cors_middleware;
use backend::middleware::request_trace::RequestTrace;
use backend::routes;
use backend::services::sweeper;
use backend::state::app_state::AppState;
use backend::ws::broker::RealtimeBroker;
use migration::{migrate, MigrationCommand};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Card catalogs are configuration; a miscounted or duplicated catalog
    // must abort startup.
    if let Err(e) = validate_catalogs() {
        eprintln!("❌ Card catalog validation failed: {e}");
        std::process::exit(1);
    }

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            eprintln!("❌ BACKEND_PORT must be a valid port number");
            std::process::exit(1);
        });

    println!("🚀 Starting Resonata Backend on http://{}:{}", host, port);

    let db_config = match DbConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    let db = match connect_db(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = migrate(&db, MigrationCommand::Up).await {
        eprintln!("❌ Migrations failed: {e}");
        std::process::exit(1);
    }

    println!("✅ Database connected");

    let redis_url = match std::env::var("REDIS_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("❌ REDIS_URL must be set");
            std::process::exit(1);
        }
    };

    let broker = match RealtimeBroker::connect(&redis_url).await {
        Ok(broker) => broker,
        Err(e) => {
            eprintln!("❌ Failed to connect realtime broker: {e}");
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(db, broker);

    // Timer-driven transitions (vote countdown, display pauses) need a
    // driver independent of request traffic.
    sweeper::spawn(app_state.clone());

    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
