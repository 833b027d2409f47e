//! Regression check against a real exported ResNet50
//!
//! Needs a populated store and a reference photo:
//!
//! ```bash
//! RESNET_SERVE_STORE=./model_store RESNET_SERVE_SMOKE_IMAGE=./elephant.jpg \
//!     cargo test --test smoke -- --ignored
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use resnet_serve::config::{DEFAULT_MODEL_NAME, STORE_ENV};
use resnet_serve::{Classifier, ModelStore, ModelTag};

const IMAGE_ENV: &str = "RESNET_SERVE_SMOKE_IMAGE";

const ELEPHANTS: [&str; 3] = ["African_elephant", "tusker", "Indian_elephant"];

#[tokio::test]
#[ignore = "requires an exported ResNet50 and a reference image"]
async fn test_elephant_top1() {
    let store = ModelStore::new(PathBuf::from(
        std::env::var(STORE_ENV).expect("RESNET_SERVE_STORE not set"),
    ));
    let image = std::fs::read(std::env::var(IMAGE_ENV).expect("RESNET_SERVE_SMOKE_IMAGE not set"))
        .unwrap();

    let tag = ModelTag::latest(DEFAULT_MODEL_NAME).unwrap();
    let classifier = Arc::new(Classifier::from_store(&store, &tag, 1, 1).unwrap());

    let first = Arc::clone(&classifier).predict(image.clone()).await.unwrap();
    assert_eq!(first.len(), 1);
    assert!(
        ELEPHANTS.contains(&first[0].label.as_str()),
        "unexpected top-1: {:?}",
        first[0]
    );
    assert!(first[0].score > 0.5, "low confidence: {:?}", first[0]);

    let second = classifier.predict(image).await.unwrap();
    assert_eq!(first, second);
}
