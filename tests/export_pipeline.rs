//! Export a graph, serve it from the store, classify through HTTP

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tempfile::TempDir;
use tower::ServiceExt;

use resnet_serve::exporter::image_input;
use resnet_serve::loader::Source;
use resnet_serve::{export_model, Classifier, ExportOptions, ModelStore, ModelTag, ServerConfig};

fn options(dir: &std::path::Path) -> ExportOptions {
    ExportOptions {
        graph: Source::Local(common::write_channel_mean_graph(dir)),
        labels: Source::Local(common::write_bgr_labels(dir)),
        input: image_input(16, 16),
        ..Default::default()
    }
}

#[test]
fn test_export_twice_latest_resolves() {
    let tmp = TempDir::new().unwrap();
    let store = ModelStore::new(tmp.path().join("store"));
    let opts = options(tmp.path());

    let first = export_model(&store, &opts).unwrap();
    assert_eq!(first.meta.name, "onnx_resnet50");
    assert_eq!(first.meta.output.shape, vec![None, Some(3)]);
    assert!(first.meta.signatures["run"].batchable);
    assert_eq!(
        store.get("onnx_resnet50:latest").unwrap().meta.version,
        first.meta.version
    );

    let second = export_model(&store, &opts).unwrap();
    assert_ne!(first.meta.version, second.meta.version);
    assert_eq!(
        store.get("onnx_resnet50:latest").unwrap().meta.version,
        second.meta.version
    );
}

#[test]
fn test_export_rejects_label_mismatch() {
    let tmp = TempDir::new().unwrap();
    let store = ModelStore::new(tmp.path().join("store"));
    let wide = tmp.path().join("wide");
    std::fs::create_dir_all(&wide).unwrap();
    let opts = ExportOptions {
        labels: Source::Local(common::write_labels(
            &wide,
            &[("a", "a"), ("b", "b"), ("c", "c"), ("d", "d")],
        )),
        ..options(tmp.path())
    };

    let err = export_model(&store, &opts).unwrap_err();
    assert!(format!("{:#}", err).contains("4 classes"));
    assert!(store.get("onnx_resnet50:latest").is_err());
}

#[test]
fn test_classifier_from_store() {
    let tmp = TempDir::new().unwrap();
    let store = ModelStore::new(tmp.path().join("store"));
    export_model(&store, &options(tmp.path())).unwrap();

    let tag: ModelTag = "onnx_resnet50".parse().unwrap();
    let classifier = Classifier::from_store(&store, &tag, 3, 1).unwrap();
    assert_eq!(classifier.meta().unwrap().name, "onnx_resnet50");

    let preds = classifier
        .classify(&common::solid_png(300, 200, [250, 10, 10]))
        .unwrap();
    let labels: Vec<_> = preds.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["red", "blue", "green"]);
    assert!((preds[0].score - (250.0 - 123.68)).abs() < 1e-2);
}

#[tokio::test]
async fn test_http_predict_with_exported_graph() {
    let tmp = TempDir::new().unwrap();
    let store = ModelStore::new(tmp.path().join("store"));
    export_model(&store, &options(tmp.path())).unwrap();

    let tag: ModelTag = "onnx_resnet50:latest".parse().unwrap();
    let classifier = Arc::new(Classifier::from_store(&store, &tag, 1, 2).unwrap());
    let app = resnet_serve::server::router(classifier, &ServerConfig::default());

    let image = common::solid_png(64, 48, [5, 240, 5]);
    let first = app
        .clone()
        .oneshot(Request::post("/predict").body(Body::from(image.clone())).unwrap())
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first = axum::body::to_bytes(first.into_body(), usize::MAX)
        .await
        .unwrap();

    let second = app
        .clone()
        .oneshot(Request::post("/predict").body(Body::from(image)).unwrap())
        .await
        .unwrap();
    let second = axum::body::to_bytes(second.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(first, second);

    let json: serde_json::Value = serde_json::from_slice(&first).unwrap();
    assert_eq!(json[0][0], "n_green");
    assert_eq!(json[0][1], "green");
    assert_eq!(json.as_array().unwrap().len(), 1);

    let models = app
        .oneshot(Request::get("/v1/models").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let models = axum::body::to_bytes(models.into_body(), usize::MAX)
        .await
        .unwrap();
    let models: serde_json::Value = serde_json::from_slice(&models).unwrap();
    assert_eq!(models["data"][0]["name"], "onnx_resnet50");
    assert_eq!(models["data"][0]["input"]["shape"], serde_json::json!([null, 16, 16, 3]));
}
