use serde_json::json;

use super::*;

fn compartment_push() -> Frame {
    Frame {
        id: "id-1".to_owned(),
        ts: 42,
        diagram_id: Some("diagram-1".to_owned()),
        syscall: "compartment:create".to_owned(),
        status: Status::Done,
        data: json!({
            "entity_id": "e1",
            "id": "c1",
            "name": "Net",
            "icon": null,
            "tags": ["a", "b"],
            "nested": {"k": "v"}
        }),
    }
}

fn raw_frame(status: i32, data: Option<prost_types::Value>) -> Vec<u8> {
    WireFrame { id: "id-1".to_owned(), ts: 1, diagram_id: None, syscall: "diagram:reset".to_owned(), status, data }
        .encode_to_vec()
}

// =============================================================
// Status
// =============================================================

#[test]
fn status_wire_codes_are_stable() {
    assert_eq!(Status::Request.wire_code(), 0);
    assert_eq!(Status::Done.wire_code(), 1);
    assert_eq!(Status::Error.wire_code(), 2);
}

#[test]
fn status_reads_back_from_its_wire_code() {
    for status in [Status::Request, Status::Done, Status::Error] {
        assert_eq!(Status::try_from(status.wire_code()).expect("status"), status);
    }
}

#[test]
fn unknown_status_code_is_rejected() {
    let err = Status::try_from(99).expect_err("status should be invalid");
    assert!(matches!(err, CodecError::InvalidStatus(99)));
}

#[test]
fn status_json_is_lowercase_only() {
    assert_eq!(serde_json::to_string(&Status::Request).expect("serialize"), "\"request\"");
    assert!(serde_json::from_str::<Status>("\"Error\"").is_err());
}

// =============================================================
// Codec
// =============================================================

#[test]
fn pushed_frame_survives_the_wire() {
    let frame = compartment_push();
    assert_eq!(decode_frame(&encode_frame(&frame)).expect("decode"), frame);
}

#[test]
fn frame_without_diagram_id_decodes_without_one() {
    let mut frame = compartment_push();
    frame.diagram_id = None;
    assert_eq!(decode_frame(&encode_frame(&frame)).expect("decode").diagram_id, None);
}

#[test]
fn garbage_bytes_are_a_decode_error() {
    let err = decode_frame(&[0xff, 0x00, 0x01]).expect_err("bytes should fail");
    assert!(matches!(err, CodecError::Decode(_)));
}

#[test]
fn out_of_range_status_on_the_wire_is_rejected() {
    let err = decode_frame(&raw_frame(77, Some(json_to_proto(&json!({}))))).expect_err("status should fail");
    assert!(matches!(err, CodecError::InvalidStatus(77)));
}

#[test]
fn missing_payload_reads_as_empty_object() {
    let frame = decode_frame(&raw_frame(Status::Done.wire_code(), None)).expect("decode");
    assert_eq!(frame.data, json!({}));
}

#[test]
fn non_finite_number_reads_as_null() {
    let nan = prost_types::Value { kind: Some(Kind::NumberValue(f64::NAN)) };
    let frame = decode_frame(&raw_frame(Status::Done.wire_code(), Some(nan))).expect("decode");
    assert_eq!(frame.data, Value::Null);
}

#[test]
fn integer_coordinates_come_back_as_floats() {
    let mut frame = compartment_push();
    frame.syscall = "drop:handle".to_owned();
    frame.data = json!({"x": 2, "y": 3, "payload": "p"});
    let decoded = decode_frame(&encode_frame(&frame)).expect("decode");
    assert_eq!(decoded.data.get("x"), Some(&json!(2.0)));
}

#[test]
fn unknown_wire_tags_are_skipped() {
    #[derive(Clone, PartialEq, Message)]
    struct Extended {
        #[prost(string, tag = "1")]
        id: String,
        #[prost(string, tag = "4")]
        syscall: String,
        #[prost(int32, tag = "5")]
        status: i32,
        #[prost(string, optional, tag = "9")]
        extra: Option<String>,
    }
    let bytes = Extended {
        id: "x".to_owned(),
        syscall: "diagram:init".to_owned(),
        status: Status::Done.wire_code(),
        extra: Some("ignored".to_owned()),
    }
    .encode_to_vec();
    let frame = decode_frame(&bytes).expect("decode");
    assert_eq!(frame.syscall, "diagram:init");
    assert_eq!(frame.status, Status::Done);
}
