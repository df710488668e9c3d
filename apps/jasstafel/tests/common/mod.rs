#![allow(dead_code)]

// tests/common/mod.rs
use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::test;
use serde_json::{json, Value};

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    jasstafel_test_support::logging::init();
}

pub fn players() -> Vec<String> {
    ["anna", "beat", "chris", "dora"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Settings where every color counts once.
pub fn flat_settings_json() -> Value {
    json!({
        "scoreTargets": { "sieg": 2000, "berg": 1000, "schneider": 1000 },
        "colorMultipliers": {
            "Misère": 1, "Eicheln": 1, "Rosen": 1, "Schellen": 1, "Schilten": 1,
            "Obe": 1, "Une": 1, "3x3": 1, "Quer": 1, "Slalom": 1
        },
        "strokeRules": { "schneider": 2, "kontermatsch": 2 }
    })
}

pub fn start_body() -> Value {
    json!({ "participantIds": players(), "settings": flat_settings_json() })
}

pub async fn read_json(resp: ServiceResponse<BoxBody>) -> Value {
    let body = test::read_body(resp).await;
    serde_json::from_slice(&body).expect("response body should be JSON")
}
