//! Protocol Grammar Tests
//!
//! Tests for the line grammar:
//! - Response classification is total and unambiguous
//! - Keyed values split on the first ':' only
//! - Record payloads decode into typed geometry and colours
//! - Command lines never contain stray delimiters

use lightpack_core::{
    parse_records, verbs, Command, Error, LedArea, Response, Rgb, ScreenRect,
};

// ============================================================================
// Classification
// ============================================================================

#[test]
fn test_ok_is_always_success() {
    // Classification does not depend on which verb was sent
    for _verb in [verbs::GET_FPS, verbs::SET_STATUS, verbs::LOCK, "anything"] {
        let resp = Response::decode(b"ok\n").unwrap();
        assert_eq!(resp, Response::Success);
        assert!(!matches!(resp, Response::Symbol(_)));
    }
}

#[test]
fn test_value_is_everything_after_first_colon() {
    let cases = [
        ("fps:60.0", "60.0"),
        ("profile:My:Profile", "My:Profile"),
        ("a::", ":"),
        (":leading", "leading"),
        ("key:with spaces kept", "with spaces kept"),
    ];

    for (line, expected) in cases {
        assert_eq!(
            Response::classify(line).unwrap(),
            Response::Value(expected.to_string()),
            "line {:?}",
            line
        );
    }
}

#[test]
fn test_every_error_token_maps_to_its_kind() {
    let cases = [
        ("authorization required", Error::AuthenticationRequired),
        ("unknown command", Error::UnknownCommand),
        ("not locked", Error::NotLocked),
        ("busy", Error::Busy),
        ("error", Error::Controller),
    ];

    for (line, expected) in cases {
        let framed = format!("{}\n", line);
        assert_eq!(Response::decode(framed.as_bytes()), Err(expected));
    }
}

#[test]
fn test_bare_tokens_are_symbols() {
    assert_eq!(
        Response::classify("idle").unwrap(),
        Response::Symbol("idle".into())
    );
    assert_eq!(
        Response::classify("device error").unwrap(),
        Response::Symbol("device_error".into())
    );
    // Near misses of error tokens are plain symbols
    assert_eq!(
        Response::classify("Busy").unwrap(),
        Response::Symbol("Busy".into())
    );
}

#[test]
fn test_unclassifiable_frames() {
    assert_eq!(Response::decode(b"\r\n"), Err(Error::EmptyResponse));
    assert_eq!(Response::decode(&[0xc3, 0x28, b'\n']), Err(Error::InvalidEncoding));
}

// ============================================================================
// Payloads
// ============================================================================

#[test]
fn test_fps_payload() {
    let payload = Response::decode(b"fps:60.0\n")
        .unwrap()
        .into_payload()
        .unwrap();
    assert_eq!(payload, "60.0");
    assert_eq!(payload.parse::<f64>().unwrap(), 60.0);
}

#[test]
fn test_led_geometry_payload() {
    let payload = Response::decode(b"leds:1-0,0,100,50;2-100,0,100,50\n")
        .unwrap()
        .into_payload()
        .unwrap();

    let areas: Vec<LedArea> = parse_records(&payload)
        .unwrap()
        .iter()
        .map(LedArea::from_record)
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        areas,
        vec![
            LedArea {
                x: 0,
                y: 0,
                width: 100,
                height: 50
            },
            LedArea {
                x: 100,
                y: 0,
                width: 100,
                height: 50
            },
        ]
    );
}

#[test]
fn test_colour_payload() {
    let colors: Vec<Rgb> = parse_records("1-255,0,0;2-0,255,0;3-0,0,255;")
        .unwrap()
        .iter()
        .map(Rgb::from_record)
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        colors,
        vec![Rgb::new(255, 0, 0), Rgb::new(0, 255, 0), Rgb::new(0, 0, 255)]
    );
}

#[test]
fn test_led_area_json_shape() {
    let json = serde_json::to_value(LedArea::new(0, 0, 100, 50)).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"x": 0, "y": 0, "width": 100, "height": 50})
    );
}

#[test]
fn test_screen_rect_payload() {
    let rect: ScreenRect = "0,0,2560,1440".parse().unwrap();
    assert_eq!((rect.width, rect.height), (2560, 1440));
}

// ============================================================================
// Commands
// ============================================================================

#[test]
fn test_batched_setcolor_line() {
    let cmd = Command::batch(
        verbs::SET_COLOR,
        (0..3).map(|i| Rgb::new(10, 20, 30).to_record(i)),
    );
    assert_eq!(
        &cmd.encode().unwrap()[..],
        b"setcolor:1-10,20,30;2-10,20,30;3-10,20,30;\n"
    );
}

#[test]
fn test_encoded_line_has_exactly_one_delimiter() {
    let lines = [
        Command::new(verbs::LOCK),
        Command::with_arg(verbs::API_KEY, "abc"),
        Command::with_arg(verbs::NEW_PROFILE, "Living Room"),
    ];

    for cmd in lines {
        let encoded = cmd.encode().unwrap();
        assert_eq!(encoded.iter().filter(|b| **b == b'\n').count(), 1);
        assert_eq!(encoded.last(), Some(&b'\n'));
    }
}
