//! # Schema Generator
//!
//! Prints the JSON Schema of each declared-state document.
//!
//! ## Usage
//!
//! ```bash
//! # All three schemas as one JSON object keyed by resource type
//! cargo run --bin schemagen > schemas.json
//!
//! # A single resource type
//! cargo run --bin schemagen -- application
//! ```

use anyhow::{bail, Context, Result};
use kinesis_analytics_controller::model::{Application, MaintenanceWindow, Snapshot};
use schemars::schema_for;
use serde_json::{Map, Value};

fn schemas() -> Result<Map<String, Value>> {
    let mut all = Map::new();
    all.insert(
        "kinesisanalyticsv2_application".to_string(),
        serde_json::to_value(schema_for!(Application)).context("Failed to serialize Application schema")?,
    );
    all.insert(
        "kinesisanalyticsv2_application_snapshot".to_string(),
        serde_json::to_value(schema_for!(Snapshot)).context("Failed to serialize Snapshot schema")?,
    );
    all.insert(
        "kinesisanalyticsv2_application_maintenance_configuration".to_string(),
        serde_json::to_value(schema_for!(MaintenanceWindow))
            .context("Failed to serialize MaintenanceWindow schema")?,
    );
    Ok(all)
}

fn main() -> Result<()> {
    let mut all = schemas()?;
    let output = match std::env::args().nth(1).as_deref() {
        None => Value::Object(all),
        Some(short) => {
            let key = match short {
                "application" | "app" => "kinesisanalyticsv2_application",
                "snapshot" => "kinesisanalyticsv2_application_snapshot",
                "maintenance" => "kinesisanalyticsv2_application_maintenance_configuration",
                other => bail!("unknown resource type {other:?}, expected application, snapshot or maintenance"),
            };
            all.remove(key).context("schema missing")?
        }
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to render schema")?
    );
    Ok(())
}
