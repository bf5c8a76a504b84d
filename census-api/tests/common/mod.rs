#![allow(dead_code)]

use actix_web::{test, web, App};
use census::database::Database;
use census::{CensusManager, SqliteStorage};
use census_api::identity::USER_ID_HEADER;
use census_api::{handlers, AppState};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

pub struct TestApp<S> {
    pub manager: CensusManager,
    pub app: S,
}

pub fn setup_test_manager() -> anyhow::Result<CensusManager> {
    let db = Database::new(&PathBuf::from(":memory:"))?;
    Ok(CensusManager::new(Arc::new(SqliteStorage::new(db.connection()))))
}

pub async fn setup_test_app() -> anyhow::Result<
    TestApp<
        impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
    >,
> {
    let manager = setup_test_manager()?;
    let state = web::Data::new(AppState::new(manager.clone()));

    let app = test::init_service(
        App::new()
            .app_data(state)
            .configure(handlers::configure),
    )
    .await;

    Ok(TestApp { manager, app })
}

pub fn get(uri: &str) -> actix_http::Request {
    test::TestRequest::get().uri(uri).to_request()
}

pub fn post_as(user: &str, uri: &str, body: Value) -> actix_http::Request {
    test::TestRequest::post()
        .uri(uri)
        .insert_header((USER_ID_HEADER, user))
        .set_json(body)
        .to_request()
}
