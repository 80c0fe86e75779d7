use std::path::PathBuf;

/// Boots the full router against a real CRAFT model and exercises
/// `/health` over the wire. A CRAFT `.onnx` file is large binary data that
/// doesn't belong in the repo, so this test no-ops unless one is pointed
/// to via `KOTRANS_TEST_CRAFT_MODEL`.
#[tokio::test]
async fn health_endpoint_responds_when_model_available() {
    let Ok(model_path) = std::env::var("KOTRANS_TEST_CRAFT_MODEL") else {
        eprintln!("KOTRANS_TEST_CRAFT_MODEL not set, skipping server smoke test");
        return;
    };
    let model_path = PathBuf::from(model_path);
    if !model_path.exists() {
        if std::env::var("CI").is_ok() {
            panic!("KOTRANS_TEST_CRAFT_MODEL set but file does not exist: {model_path:?}");
        }
        eprintln!("craft model {model_path:?} not found, skipping");
        return;
    }

    let model_bytes = std::fs::read(&model_path).expect("read craft model");
    let config_path = std::env::temp_dir().join(format!("kotrans-smoke-{}.ini", std::process::id()));
    std::fs::write(&config_path, "[Settings]\nREAD_MODE=ADV\nLANG=eng\n").unwrap();

    let router = mangatan_ocr_server::create_router(config_path.clone(), &model_bytes)
        .expect("router should build against a real model");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let body = reqwest::get(format!("http://{addr}/health"))
        .await
        .expect("health request")
        .text()
        .await
        .expect("health body");

    assert!(body.contains("\"status\":\"online\""));

    let _ = std::fs::remove_file(&config_path);
}
