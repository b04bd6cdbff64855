use super::*;

#[test]
fn status_mapping_covers_every_kind() {
    let cases = [
        (ApiError::Validation("v".into()), StatusCode::BAD_REQUEST, "E_VALIDATION"),
        (ApiError::Auth("a".into()), StatusCode::UNAUTHORIZED, "E_AUTH"),
        (ApiError::Forbidden("f".into()), StatusCode::FORBIDDEN, "E_FORBIDDEN"),
        (ApiError::NotFound("n".into()), StatusCode::NOT_FOUND, "E_NOT_FOUND"),
        (ApiError::Conflict("c".into()), StatusCode::CONFLICT, "E_CONFLICT"),
        (ApiError::Upstream("u".into()), StatusCode::BAD_GATEWAY, "E_UPSTREAM"),
        (ApiError::Internal("i".into()), StatusCode::INTERNAL_SERVER_ERROR, "E_INTERNAL"),
    ];
    for (err, status, code) in cases {
        assert_eq!(err.status(), status, "{err:?}");
        assert_eq!(err.code(), code, "{err:?}");
    }
}

#[tokio::test]
async fn into_response_writes_json_failure_body() {
    let response = ApiError::Conflict("Email already exists".into()).into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Email already exists");
    assert_eq!(body["code"], "E_CONFLICT");
}

#[test]
fn database_errors_are_hidden_behind_generic_message() {
    let err: ApiError = sqlx::Error::RowNotFound.into();
    assert!(matches!(&err, ApiError::Internal(msg) if msg == "Database error"));
}
