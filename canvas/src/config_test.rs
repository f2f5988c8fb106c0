#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn default_matches_stock_layout() {
    let config = DiagramConfig::default();
    assert_eq!(config.entity_width, 200.0);
    assert_eq!(config.header_height, 25.0);
    assert_eq!(config.row_height, 50.0);
    assert_eq!(config.pan_step, 20.0);
}

#[test]
fn empty_object_yields_defaults() {
    let config = DiagramConfig::from_json("{}").expect("config");
    assert_eq!(config, DiagramConfig::default());
}

#[test]
fn partial_object_overrides_only_named_fields() {
    let config = DiagramConfig::from_json(r#"{"row_height": 40, "pan_step": 35.5}"#).expect("config");
    assert_eq!(config.row_height, 40.0);
    assert_eq!(config.pan_step, 35.5);
    assert_eq!(config.entity_width, 200.0);
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = DiagramConfig::from_json("{row_height").expect_err("should fail");
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn wrong_type_is_a_parse_error() {
    let err = DiagramConfig::from_json(r#"{"row_height": "tall"}"#).expect_err("should fail");
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn zero_row_height_is_rejected() {
    let err = DiagramConfig::from_json(r#"{"row_height": 0}"#).expect_err("should fail");
    assert!(matches!(err, ConfigError::NonPositive { field: "row_height", .. }));
}

#[test]
fn negative_width_is_rejected() {
    let err = DiagramConfig::from_json(r#"{"entity_width": -5}"#).expect_err("should fail");
    assert!(matches!(err, ConfigError::NonPositive { field: "entity_width", .. }));
}

#[test]
fn cascade_positions_step_diagonally() {
    let config = DiagramConfig::default();
    assert_eq!(config.cascade_position(1), (120.0, 40.0));
    assert_eq!(config.cascade_position(3), (200.0, 120.0));
}

#[test]
fn negative_corner_radius_is_rejected() {
    let err = DiagramConfig::from_json(r#"{"corner_radius": -40.0}"#).expect_err("should fail");
    assert!(matches!(err, ConfigError::NonPositive { field: "corner_radius", .. }));
}

#[test]
fn zero_cascade_step_is_rejected() {
    let err = DiagramConfig::from_json(r#"{"cascade_step": 0}"#).expect_err("should fail");
    assert!(matches!(err, ConfigError::NonPositive { field: "cascade_step", .. }));
}

#[test]
fn negative_clear_margin_is_rejected() {
    let err = DiagramConfig::from_json(r#"{"clear_margin": -1e9}"#).expect_err("should fail");
    assert!(matches!(err, ConfigError::Negative { field: "clear_margin", .. }));
}

#[test]
fn zero_clear_margin_is_accepted() {
    let config = DiagramConfig::from_json(r#"{"clear_margin": 0}"#).expect("config");
    assert_eq!(config.clear_margin, 0.0);
}

#[test]
fn corner_radius_and_margin_both_bad_still_fails() {
    assert!(DiagramConfig::from_json(r#"{"corner_radius": -40.0, "clear_margin": -1e9}"#).is_err());
}

#[test]
fn corner_radius_taller_than_header_is_rejected() {
    let err = DiagramConfig::from_json(r#"{"corner_radius": 30}"#).expect_err("should fail");
    assert!(matches!(err, ConfigError::CornerTooLarge { max, .. } if max == 25.0));
}

#[test]
fn corner_radius_wider_than_half_entity_is_rejected() {
    let err = DiagramConfig::from_json(r#"{"entity_width": 20, "corner_radius": 15}"#).expect_err("should fail");
    assert!(matches!(err, ConfigError::CornerTooLarge { max, .. } if max == 10.0));
}

#[test]
fn corner_radius_equal_to_header_is_accepted() {
    assert!(DiagramConfig::from_json(r#"{"corner_radius": 25}"#).is_ok());
}
