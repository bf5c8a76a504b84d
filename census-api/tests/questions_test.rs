mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use actix_web::test::TestRequest;
use common::{get, post_as, setup_test_app};
use serde_json::{json, Value};

#[actix_rt::test]
async fn test_create_and_list_questions() -> anyhow::Result<()> {
    let test_app = setup_test_app().await?;

    let req = post_as(
        "admin",
        "/questions",
        json!({ "code": "budget-2025", "title": "Budget priorities" }),
    );
    let resp = test::call_service(&test_app.app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["status"], "draft");
    assert_eq!(created["question_type"], "single");
    assert_eq!(created["author"], "admin");

    let req = post_as(
        "admin",
        "/questions",
        json!({ "code": "comments", "title": "Comments", "question_type": "text" }),
    );
    let resp = test::call_service(&test_app.app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = test::call_service(&test_app.app, get("/questions")).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0]["code"], "budget-2025");
    assert_eq!(questions[0]["reply_count"], 0);
    assert_eq!(questions[1]["question_type"], "text");

    Ok(())
}

#[actix_rt::test]
async fn test_create_question_rejects_bad_input() -> anyhow::Result<()> {
    let test_app = setup_test_app().await?;

    let req = TestRequest::post()
        .uri("/questions")
        .set_json(json!({ "code": "anon", "title": "No identity" }))
        .to_request();
    let resp = test::call_service(&test_app.app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = post_as("admin", "/questions", json!({ "code": "bad code", "title": "T" }));
    let resp = test::call_service(&test_app.app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");

    let req = post_as(
        "admin",
        "/questions",
        json!({ "code": "typed", "title": "T", "question_type": "essay" }),
    );
    let resp = test::call_service(&test_app.app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = post_as("admin", "/questions", json!({ "code": "dup", "title": "T" }));
    test::call_service(&test_app.app, req).await;
    let req = post_as("admin", "/questions", json!({ "code": "dup", "title": "T" }));
    let resp = test::call_service(&test_app.app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = post_as("admin", "/questions", json!({ "title": "Missing code" }));
    let resp = test::call_service(&test_app.app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_request");

    Ok(())
}

#[actix_rt::test]
async fn test_question_detail_and_status_changes() -> anyhow::Result<()> {
    let test_app = setup_test_app().await?;

    let req = post_as("admin", "/questions", json!({ "code": "q", "title": "Q" }));
    let created: Value = test::read_body_json(test::call_service(&test_app.app, req).await).await;
    let id = created["id"].as_i64().unwrap();

    for (value, text) in [("yes", "Yes"), ("no", "No")] {
        let req = post_as(
            "admin",
            &format!("/questions/{id}/answers"),
            json!({ "value": value, "text": text }),
        );
        let resp = test::call_service(&test_app.app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = post_as(
        "admin",
        &format!("/questions/{id}/answers"),
        json!({ "value": "yes", "text": "Again" }),
    );
    let resp = test::call_service(&test_app.app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = post_as(
        "admin",
        &format!("/questions/{id}/status"),
        json!({ "status": "published" }),
    );
    let resp = test::call_service(&test_app.app, req).await;
    assert!(resp.status().is_success());
    let published: Value = test::read_body_json(resp).await;
    assert_eq!(published["status"], "published");
    assert!(published["published_at"].is_i64());

    let req = post_as(
        "admin",
        &format!("/questions/{id}/status"),
        json!({ "status": "closed" }),
    );
    let resp = test::call_service(&test_app.app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(&test_app.app, get(&format!("/questions/{id}"))).await;
    assert!(resp.status().is_success());
    let detail: Value = test::read_body_json(resp).await;
    assert_eq!(detail["status"], "published");
    assert_eq!(detail["reply_count"], 0);
    let answers = detail["answers"].as_array().unwrap();
    assert_eq!(answers[0]["value"], "yes");
    assert_eq!(answers[1]["value"], "no");

    let resp = test::call_service(&test_app.app, get("/questions/999")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[actix_rt::test]
async fn test_move_question_and_answer() -> anyhow::Result<()> {
    let test_app = setup_test_app().await?;

    let mut ids = Vec::new();
    for code in ["first", "second"] {
        let req = post_as("admin", "/questions", json!({ "code": code, "title": code }));
        let created: Value =
            test::read_body_json(test::call_service(&test_app.app, req).await).await;
        ids.push(created["id"].as_i64().unwrap());
    }

    let req = post_as(
        "admin",
        &format!("/questions/{}/move", ids[1]),
        json!({ "direction": "up" }),
    );
    let body: Value = test::read_body_json(test::call_service(&test_app.app, req).await).await;
    assert_eq!(body["moved"], true);

    let listed: Value = test::read_body_json(test::call_service(&test_app.app, get("/questions")).await).await;
    assert_eq!(listed["questions"][0]["code"], "second");

    let req = post_as(
        "admin",
        &format!("/questions/{}/move", ids[1]),
        json!({ "direction": "up" }),
    );
    let body: Value = test::read_body_json(test::call_service(&test_app.app, req).await).await;
    assert_eq!(body["moved"], false);

    let req = post_as(
        "admin",
        &format!("/questions/{}/move", ids[0]),
        json!({ "direction": "sideways" }),
    );
    let resp = test::call_service(&test_app.app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = post_as(
        "admin",
        &format!("/questions/{}/answers", ids[0]),
        json!({ "value": "a", "text": "A" }),
    );
    let a: Value = test::read_body_json(test::call_service(&test_app.app, req).await).await;
    let req = post_as(
        "admin",
        &format!("/questions/{}/answers", ids[0]),
        json!({ "value": "b", "text": "B" }),
    );
    test::call_service(&test_app.app, req).await;

    let req = post_as(
        "admin",
        &format!("/answers/{}/move", a["id"].as_i64().unwrap()),
        json!({ "direction": "down" }),
    );
    let body: Value = test::read_body_json(test::call_service(&test_app.app, req).await).await;
    assert_eq!(body["moved"], true);

    let detail: Value = test::read_body_json(
        test::call_service(&test_app.app, get(&format!("/questions/{}", ids[0]))).await,
    )
    .await;
    assert_eq!(detail["answers"][0]["value"], "b");

    let req = post_as("admin", "/answers/999/move", json!({ "direction": "up" }));
    let resp = test::call_service(&test_app.app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    Ok(())
}
