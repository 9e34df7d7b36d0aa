//! Model documents on disk

use reimburse_core::{
    build_tree, Engine, EngineConfig, FlatNode, RoundingMode, ScoringError, TreeModel,
};
use std::fs;
use tempfile::tempdir;

#[test]
fn saved_model_is_canonical_and_reloads() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");

    let model = TreeModel::embedded().unwrap();
    model.save_json(&path).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written, model.to_canonical_json().unwrap());

    let reloaded = TreeModel::load_json(&path).unwrap();
    assert_eq!(reloaded, model);
    assert_eq!(reloaded.hash_hex().unwrap(), model.hash_hex().unwrap());
}

#[test]
fn pretty_printed_copy_hashes_identically() {
    let model = TreeModel::embedded().unwrap();
    let pretty = serde_json::to_string_pretty(&model).unwrap();

    let reparsed = TreeModel::from_json_str(&pretty).unwrap();
    assert_eq!(reparsed.hash_hex().unwrap(), model.hash_hex().unwrap());
}

#[test]
fn flat_and_nested_forms_are_equivalent() {
    let nodes = vec![
        FlatNode::split("duration_x_distance", 566.0, 1, 2),
        FlatNode::leaf(336.31),
        FlatNode::split("duration_x_amount", 487.54, 3, 4),
        FlatNode::leaf(196.57),
        FlatNode::leaf(559.32),
    ];
    let flat_json = serde_json::json!({
        "version": 1,
        "name": "illustrative",
        "nodes": nodes,
    })
    .to_string();

    let from_flat = TreeModel::from_json_str(&flat_json).unwrap();
    let from_nested = TreeModel::new("illustrative", build_tree(&nodes).unwrap());

    assert_eq!(from_flat, from_nested);
    assert_eq!(from_flat.hash_hex().unwrap(), from_nested.hash_hex().unwrap());
}

#[test]
fn cyclic_flat_model_is_rejected_at_load() {
    let json = r#"{
        "nodes": [
            {"feature": "amount", "threshold": 1, "left": 1, "right": 2},
            {"feature": "amount", "threshold": 2, "left": 0, "right": 2},
            {"value": 3}
        ]
    }"#;
    assert!(matches!(
        TreeModel::from_json_str(json),
        Err(ScoringError::InvalidFormat(_))
    ));
}

#[test]
fn engine_loads_configured_model_and_checks_hash() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("half_away.json");

    let model = TreeModel::embedded()
        .unwrap()
        .with_rounding(RoundingMode::HalfAwayFromZero);
    model.save_json(&path).unwrap();

    let mut config = EngineConfig::default();
    config.model.path = Some(path.clone());
    config.model.expected_hash = Some(model.hash_hex().unwrap().to_uppercase());

    let engine = Engine::from_config(&config).unwrap();
    assert_eq!(engine.rounding(), RoundingMode::HalfAwayFromZero);
    assert_eq!(engine.evaluate_reimbursement(5.0, 250.0, 150.75).unwrap(), 619.95);

    config.model.expected_hash = Some(TreeModel::embedded().unwrap().hash_hex().unwrap());
    assert!(matches!(
        Engine::from_config(&config),
        Err(ScoringError::HashMismatch { .. })
    ));
}

#[test]
fn missing_model_file_is_io_error() {
    let dir = tempdir().unwrap();
    let mut config = EngineConfig::default();
    config.model.path = Some(dir.path().join("absent.json"));

    assert!(matches!(Engine::from_config(&config), Err(ScoringError::Io(_))));
}

#[test]
fn config_file_drives_engine() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("reimburse.toml");
    fs::write(
        &config_path,
        r#"
        [evaluation]
        rounding = "half_toward_zero"
        validate_inputs = false

        [logging]
        level = "warn"
        format = "compact"
        "#,
    )
    .unwrap();

    let config = EngineConfig::load_from_file(&config_path).unwrap();
    let engine = Engine::from_config(&config).unwrap();

    assert_eq!(engine.rounding(), RoundingMode::HalfTowardZero);
    assert!(!engine.validates_inputs());
}
