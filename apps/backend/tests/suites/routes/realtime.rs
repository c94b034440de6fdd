use actix_web::{test, web, App};
use cah_engine::routes;
use cah_engine::AppError;

use crate::support::test_state::{build_test_state, manual_rules};

#[actix_web::test]
async fn plain_get_on_ws_is_not_upgraded() -> Result<(), AppError> {
    let (state, _) = build_test_state(manual_rules()).await?;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    // no Upgrade headers: the handshake is refused
    let req = test::TestRequest::get().uri("/ws").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
    Ok(())
}

#[actix_web::test]
async fn unknown_route_is_404() -> Result<(), AppError> {
    let (state, _) = build_test_state(manual_rules()).await?;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
    Ok(())
}
