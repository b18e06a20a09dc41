//! Request bodies for API tests

#![allow(dead_code)]

use serde_json::{json, Value};

/// Only the required field; everything else defaulted.
pub fn minimal_request(barcode: &str) -> Value {
    json!({ "barcodeData": barcode })
}

/// Every field set explicitly, including out-of-range values that intake clamps or truncates.
pub fn full_request(barcode: &str) -> Value {
    json!({
        "vid": "0x1234",
        "pid": "0x5678",
        "sizeX": 60,
        "sizeY": 40,
        "direction": 1,
        "topText": "A".repeat(80),
        "barcodeData": barcode,
        "printCount": 5000,
    })
}

pub fn oversized_barcode_request() -> Value {
    json!({ "barcodeData": "9".repeat(101) })
}

pub fn missing_barcode_request() -> Value {
    json!({ "topText": "no barcode here" })
}
