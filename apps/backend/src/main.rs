use actix_web::{web, App, HttpServer};
use cah_engine::config::db::DbProfile;
use cah_engine::config::game::GameRules;
use cah_engine::config::server::ServerConfig;
use cah_engine::infra::state::build_state;
use cah_engine::routes;
use tracing::{error, info};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let server = match ServerConfig::from_env() {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "invalid server configuration");
            std::process::exit(1);
        }
    };
    let rules = match GameRules::from_env() {
        Ok(rules) => rules,
        Err(e) => {
            error!(error = %e, "invalid game rules");
            std::process::exit(1);
        }
    };

    let app_state = match build_state()
        .with_db(DbProfile::Prod)
        .with_rules(rules)
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };
    info!(?rules, "database connected");

    // Re-arm deadlines for games that were mid-round when the process stopped
    match app_state.engine.recover().await {
        Ok(resumed) => info!(resumed, "timer recovery complete"),
        Err(e) => {
            error!(error = %e, "timer recovery failed");
            std::process::exit(1);
        }
    }

    info!(host = %server.host, port = server.port, "starting round engine");

    // Wrap AppState with web::Data before passing to HttpServer
    let data = web::Data::new(app_state);

    HttpServer::new(move || App::new().app_data(data.clone()).configure(routes::configure))
        .bind((server.host.as_str(), server.port))?
        .run()
        .await
}
