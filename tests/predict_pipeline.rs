// tests/predict_pipeline.rs
//! End-to-end: artifacts on disk → AppState → axum handlers.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use candle_core::{Device, Tensor};
use serde_json::{json, Value as JsonValue};

use abiostress_lib::artifacts::SchemaSource;
use abiostress_lib::interpretation::InterpretationQuery;
use abiostress_lib::models::{Measurement, SiteObservation};
use abiostress_lib::server::handlers::{self, MetaQuery};
use abiostress_lib::server::AppState;
use abiostress_lib::utils::service_config::ServiceConfig;

const HIDDEN_1: usize = 256;
const HIDDEN_2: usize = 128;
const COLUMNS: [&str; 4] = ["Temperatura (°C)", "NaCl (mM)", "Arenoso", "Franco"];

fn one_hot_rows(rows: usize, cols: usize, entries: &[(usize, usize, f32)]) -> Tensor {
    let mut data = vec![0.0f32; rows * cols];
    for &(r, c, v) in entries {
        data[r * cols + c] = v;
    }
    Tensor::from_vec(data, (rows, cols), &Device::Cpu).unwrap()
}

/// A "red3" model whose output depends only on salinity: high NaCl ranks
/// L3 first, low NaCl ranks L1 first. The output bias is left out of the
/// file and gets zero-filled.
fn write_salinity_model(root: &Path) {
    let models = root.join("models");
    let preproc = root.join("preproc");
    fs::create_dir_all(&models).unwrap();
    fs::create_dir_all(&preproc).unwrap();

    fs::write(
        models.join("red3_site_meta_v1.json"),
        json!({"class_names": ["L1", "L2", "L3"]}).to_string(),
    )
    .unwrap();
    // Older metadata must be ignored in favour of the latest file.
    fs::write(
        models.join("red3_site_meta_v0.json"),
        json!({"class_names": ["old"]}).to_string(),
    )
    .unwrap();
    fs::write(
        models.join("red3_line_gene_panel_v1.json"),
        json!({"L1": null, "L2": ["ClDREB"], "L3": ["ClHKT1", "ClSOS1"]}).to_string(),
    )
    .unwrap();

    // Scaler without recorded names: the column list supplies them.
    fs::write(
        preproc.join("red3_scaler_v1.json"),
        json!({"mean": [25.0, 50.0, 0.0, 0.0], "scale": [5.0, 50.0, 1.0, 1.0]}).to_string(),
    )
    .unwrap();
    fs::write(preproc.join("red3_ohe_v1.json"), json!({"categories": []}).to_string()).unwrap();
    fs::write(
        preproc.join("red3_columns_v1.json"),
        json!({"numeric": COLUMNS, "categorical": []}).to_string(),
    )
    .unwrap();

    let mut tensors = HashMap::new();
    tensors.insert(
        "net.0.weight".to_string(),
        one_hot_rows(HIDDEN_1, COLUMNS.len(), &[(0, 1, 1.0), (1, 1, -1.0)]),
    );
    tensors.insert(
        "net.0.bias".to_string(),
        Tensor::zeros(HIDDEN_1, candle_core::DType::F32, &Device::Cpu).unwrap(),
    );
    tensors.insert(
        "net.3.weight".to_string(),
        one_hot_rows(HIDDEN_2, HIDDEN_1, &[(0, 0, 1.0), (1, 1, 1.0)]),
    );
    tensors.insert(
        "net.3.bias".to_string(),
        Tensor::zeros(HIDDEN_2, candle_core::DType::F32, &Device::Cpu).unwrap(),
    );
    tensors.insert(
        "net.6.weight".to_string(),
        one_hot_rows(3, HIDDEN_2, &[(0, 1, 5.0), (2, 0, 5.0)]),
    );
    candle_core::safetensors::save(&tensors, models.join("red3_site_student_v1.safetensors"))
        .unwrap();
}

fn write_interpretations(root: &Path) {
    let db = root.join("db");
    fs::create_dir_all(&db).unwrap();
    fs::write(
        db.join("interpretaciones_sandia.csv"),
        "ID,Nombre,Función\n\
         ClHKT1,HKT1,Transporte de sodio\n\
         ClSOS1,SOS1,Antiportador Na+/H+\n\
         ClDREB,DREB,Respuesta a sequía\n",
    )
    .unwrap();
}

fn serving_state(root: &Path) -> Arc<AppState> {
    write_salinity_model(root);
    write_interpretations(root);
    let config = ServiceConfig {
        models_dir: root.join("models"),
        preproc_dir: root.join("preproc"),
        interpretation_dir: root.join("db"),
        ..ServiceConfig::default()
    };
    Arc::new(AppState::load(&config).unwrap())
}

fn observation(nacl: JsonValue, texture: &str) -> SiteObservation {
    serde_json::from_value(json!({
        "temperatura": 28,
        "humedadRelativa": 65,
        "intensidadLuminica": 9000,
        "pH": 6.9,
        "humedadSuelo": 20,
        "carbonoOrganico": 1.0,
        "nitrogenoTotal": 0.1,
        "fosforoSoluble": 12,
        "texturaSuelo": texture,
        "aguaPorcentual": 0,
        "nacl": nacl,
        "cd": 0,
        "al": 0
    }))
    .unwrap()
}

async fn body_json(response: axum::response::Response) -> JsonValue {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_only_loaded_crops_are_served() {
    let dir = tempfile::tempdir().unwrap();
    let state = serving_state(dir.path());

    assert_eq!(state.crop_names(), vec!["Sandía"]);
    let profile = state.resolve_crop(None).unwrap();
    assert_eq!(profile.bundle.input_dim, COLUMNS.len());
    assert_eq!(
        profile.bundle.numeric_schema,
        SchemaSource::ColumnFile(dir.path().join("preproc").join("red3_columns_v1.json"))
    );
    assert_eq!(profile.bundle.weights.zero_filled(), ["net.6.bias"]);

    let Json(meta) = handlers::meta(State(state), Query(MetaQuery::default()))
        .await
        .unwrap();
    assert_eq!(meta.cultivos, vec!["Sandía"]);
    assert_eq!(meta.class_names, vec!["L1", "L2", "L3"]);
    assert_eq!(meta.numeric, COLUMNS);
    assert!(meta.categorical.is_empty());
}

#[tokio::test]
async fn test_high_salinity_predicts_tolerant_line() {
    let dir = tempfile::tempdir().unwrap();
    let state = serving_state(dir.path());

    let response = handlers::predict(State(state), Ok(Json(observation(json!(150), "Franco"))))
        .await
        .into_response();
    assert_eq!(response.status(), 200);

    let body = body_json(response).await;
    assert_eq!(body["predicted_line"], "L3");
    assert_eq!(body["genes_from_line"], "L3");
    assert_eq!(body["genes"], json!(["ClHKT1", "ClSOS1"]));

    let labels: Vec<&String> = body["probabilities"].as_object().unwrap().keys().collect();
    assert_eq!(labels, ["L1", "L2", "L3"]);
    let total: f64 = body["probabilities"]
        .as_object()
        .unwrap()
        .values()
        .map(|p| p.as_f64().unwrap())
        .sum();
    assert!((total - 1.0).abs() < 1e-5);
}

#[tokio::test]
async fn test_line_without_genes_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let state = serving_state(dir.path());

    // Scaled NaCl of -1 favours L1, whose panel entry is null; L2 and L3 tie
    // behind it and the earlier label wins.
    let Json(result) = handlers::predict(State(state.clone()), Ok(Json(observation(json!("0"), "arenoso"))))
        .await
        .unwrap();
    assert_eq!(result.predicted_line, "L1");
    assert_eq!(result.genes_from_line, "L2");
    assert_eq!(result.genes, vec!["ClDREB"]);

    // Unreadable salinity is treated as 0.0 rather than failing the request.
    let Json(defaulted) = handlers::predict(State(state.clone()), Ok(Json(observation(json!("n/a"), "arenoso"))))
        .await
        .unwrap();
    assert_eq!(defaulted, result);

    // So is a reading too large to survive scaling into the model's f32 input.
    let mut huge = observation(json!("0"), "arenoso");
    huge.temperatura = Measurement::Number(1e300);
    let Json(clamped) = handlers::predict(State(state), Ok(Json(huge))).await.unwrap();
    assert_eq!(clamped, result);
    assert!(clamped.probabilities.iter().all(|(_, p)| p.is_finite()));
}

#[tokio::test]
async fn test_error_bodies() {
    let dir = tempfile::tempdir().unwrap();
    let state = serving_state(dir.path());

    let mut unloaded = observation(json!(10), "franco");
    unloaded.cultivo = Some("Maíz".to_string());
    let response = handlers::predict(State(state.clone()), Ok(Json(unloaded)))
        .await
        .into_response();
    assert_eq!(response.status(), 400);
    assert_eq!(body_json(response).await["detail"], "model not available for Maíz");

    let response = handlers::interpretation_rows(
        State(state),
        Query(InterpretationQuery {
            cultivo: Some("Maíz".to_string()),
            ..InterpretationQuery::default()
        }),
    )
    .await
    .into_response();
    assert_eq!(response.status(), 404);
    assert!(body_json(response).await["detail"]
        .as_str()
        .unwrap()
        .contains("Maíz"));
}

#[tokio::test]
async fn test_interpretation_rows_for_predicted_genes() {
    let dir = tempfile::tempdir().unwrap();
    let state = serving_state(dir.path());

    let response = handlers::interpretation_rows(
        State(state),
        Query(InterpretationQuery {
            cultivo: Some("Todos".to_string()),
            q: Some("na+".to_string()),
            field: Some("funcion".to_string()),
        }),
    )
    .await
    .into_response();
    assert_eq!(response.status(), 200);

    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["cultivos"], json!(["Todos", "Sandía"]));
    assert_eq!(
        body["rows"][0],
        json!({"id": "ClSOS1", "nombre": "SOS1", "funcion": "Antiportador Na+/H+", "cultivo": "Sandía"})
    );
}
