use actix_web::{test, web, App};
use cah_engine::routes;
use cah_engine::AppError;

use crate::common::json_body;
use crate::support::test_state::{build_test_state, manual_rules};

#[actix_web::test]
async fn health_reports_database_and_migrations() -> Result<(), AppError> {
    let (state, _) = build_test_state(manual_rules()).await?;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body = json_body(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db"], "ok");
    assert!(body.get("db_error").is_none());
    assert!(body["migrations_applied"].as_u64().unwrap_or(0) >= 1);
    assert_eq!(body["active_games"], 0);
    assert_eq!(body["ws_sessions"], 0);
    assert!(body["app_version"].is_string());
    Ok(())
}
