//! services/diary_api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document for the student and teacher page routes, so the
//! browser pages can be checked against it without a running server or
//! database. Usage: `openapi [OUTPUT]`, defaulting to `openapi.json`.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    let document = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(&output, document)?;
    println!("Diary API document written to {}", output);
    Ok(())
}
