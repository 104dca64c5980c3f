use actix_web::{http::StatusCode, test, web, App};
use serde_json::Value;

use image_vault::api;
use image_vault::app_state::AppState;
use image_vault::fingerprint::Fingerprint;
use image_vault::util::serializer::encode_upload;

const TOKEN: &str = "token-alice";

macro_rules! vault_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(api::configure),
        )
        .await
    };
}

fn upload_request(token: Option<&str>, files: &[(&[u8], &str)]) -> test::TestRequest {
    let mut req = test::TestRequest::post()
        .uri("/image/upload")
        .insert_header(("content-type", "application/octet-stream"))
        .set_payload(encode_upload(files));
    if let Some(token) = token {
        req = req.insert_header(("X-Auth-Token", token));
    }
    req
}

#[actix_web::test]
async fn test_upload_then_fetch_round_trip() {
    let (state, _blobs, metadata) = AppState::new_for_testing();
    metadata.register_identity(TOKEN, "alice");
    let app = vault_app!(state);

    let req = upload_request(Some(TOKEN), &[(&b"\x89PNG pixels"[..], "image/png"), (&b"GIF89a"[..], "image/gif")]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(body, "2 image(s) uploaded");

    let req = test::TestRequest::get()
        .uri("/image/entity")
        .insert_header(("X-Auth-Token", TOKEN))
        .to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    let images = list["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);

    let png = images
        .iter()
        .find(|image| image["suffix"] == "png")
        .unwrap();
    assert_eq!(png["fingerprint"], Fingerprint::of(b"\x89PNG pixels").as_str());
    let id = png["id"].as_str().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/image/content/{}", id))
        .insert_header(("X-Auth-Token", TOKEN))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("content-type").unwrap(), "image/png");
    assert_eq!(test::read_body(resp).await, &b"\x89PNG pixels"[..]);

    let req = test::TestRequest::get()
        .uri("/image/size")
        .insert_header(("X-Auth-Token", TOKEN))
        .to_request();
    let size = test::call_and_read_body(&app, req).await;
    assert_eq!(size, "17");
}

#[actix_web::test]
async fn test_reupload_reuses_stored_content() {
    let (state, blobs, metadata) = AppState::new_for_testing();
    metadata.register_identity(TOKEN, "alice");
    let app = vault_app!(state);

    for _ in 0..2 {
        let resp = test::call_service(&app, upload_request(Some(TOKEN), &[(&b"same"[..], "image/jpeg")]).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    assert_eq!(blobs.write_count(), 1);
    assert_eq!(metadata.record_count(TOKEN), 1);

    let req = test::TestRequest::get()
        .uri("/image/managedamount")
        .insert_header(("X-Auth-Token", TOKEN))
        .to_request();
    assert_eq!(test::call_and_read_body(&app, req).await, "1");

    let req = test::TestRequest::get()
        .uri("/image/amount")
        .insert_header(("X-Auth-Token", TOKEN))
        .to_request();
    assert_eq!(test::call_and_read_body(&app, req).await, "1");
}

#[actix_web::test]
async fn test_upload_rejections() {
    let (state, blobs, metadata) = AppState::new_for_testing();
    metadata.register_identity(TOKEN, "alice");
    let app = vault_app!(state);

    let resp = test::call_service(&app, upload_request(None, &[(&b"x"[..], "image/png")]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(
        &app,
        upload_request(Some(TOKEN), &[(&b"x"[..], "image/png"), (&b"%PDF"[..], "application/pdf")]).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "unsupported_media_type");

    let resp = test::call_service(&app, upload_request(Some("token-unknown"), &[(&b"x"[..], "image/png")]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let req = test::TestRequest::post()
        .uri("/image/upload")
        .insert_header(("X-Auth-Token", TOKEN))
        .set_payload(&b"garbage"[..])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(blobs.write_count(), 0);
    assert_eq!(metadata.create_attempts(), 0);
}

#[actix_web::test]
async fn test_failed_batch_reports_discarded_items() {
    let (state, blobs, metadata) = AppState::new_for_testing();
    metadata.register_identity(TOKEN, "alice");
    blobs.fail_write_at(3);
    let app = vault_app!(state);

    let resp = test::call_service(
        &app,
        upload_request(
            Some(TOKEN),
            &[(&b"one"[..], "image/png"), (&b"two"[..], "image/png"), (&b"three"[..], "image/png")],
        ).to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "ingestion_failed");
    assert_eq!(body["discarded"], 2);
    assert_eq!(metadata.record_count(TOKEN), 0);
}

#[actix_web::test]
async fn test_entity_update_and_delete() {
    let (state, _blobs, metadata) = AppState::new_for_testing();
    metadata.register_identity(TOKEN, "alice");
    let app = vault_app!(state);

    test::call_service(&app, upload_request(Some(TOKEN), &[(&b"entity"[..], "image/webp")]).to_request()).await;
    let id = metadata.records_for(TOKEN)[0].id.clone();

    let req = test::TestRequest::put()
        .uri("/image/entity")
        .insert_header(("X-Auth-Token", TOKEN))
        .set_json(serde_json::json!({ "id": id, "properties": { "title": "harbour" } }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["properties"]["title"], "harbour");

    for _ in 0..2 {
        let req = test::TestRequest::delete()
            .uri(&format!("/image/entity/{}", id))
            .insert_header(("X-Auth-Token", TOKEN))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/image/entity/{}", id))
        .insert_header(("X-Auth-Token", TOKEN))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_oversized_upload_is_refused() {
    let (mut state, blobs, metadata) = AppState::new_for_testing();
    state.config.server.max_payload_size = 64;
    metadata.register_identity(TOKEN, "alice");
    let app = vault_app!(state);

    let big = vec![0x89u8; 4096];
    let resp = test::call_service(&app, upload_request(Some(TOKEN), &[(&big[..], "image/png")]).to_request()).await;

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "payload_too_large");
    assert_eq!(blobs.write_count(), 0);
    assert_eq!(metadata.create_attempts(), 0);
}

#[actix_web::test]
async fn test_malformed_entity_body_is_json_error() {
    let (state, _blobs, metadata) = AppState::new_for_testing();
    metadata.register_identity(TOKEN, "alice");
    let app = vault_app!(state);

    let req = test::TestRequest::put()
        .uri("/image/entity")
        .insert_header(("X-Auth-Token", TOKEN))
        .insert_header(("content-type", "application/json"))
        .set_payload("not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_payload");
}
