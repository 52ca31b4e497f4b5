//! Device Operation Tests (lightpack-client)
//!
//! Getters and setters against the mock controller model.

use lightpack_client::{
    ApiStatus, Attribute, ClientError, LedArea, Mode, ProtocolError, Rgb, ScreenRect, Session,
    Status,
};
use lightpack_test_utils::{ControllerModel, MockController};

async fn connect(mock: &MockController) -> Session {
    Session::connect_to(&mock.host(), mock.port())
        .await
        .expect("Connect failed")
}

// ============================================================================
// Getters
// ============================================================================

#[tokio::test]
async fn test_read_only_queries() {
    let mock = MockController::start().await;
    let mut pack = connect(&mock).await;

    assert_eq!(pack.status().await.unwrap(), Status::On);
    assert!(pack.is_on().await.unwrap());
    assert_eq!(pack.api_status().await.unwrap(), ApiStatus::Idle);
    assert_eq!(pack.profiles().await.unwrap(), vec!["Lightpack", "Movies"]);
    assert_eq!(pack.profile().await.unwrap(), "Lightpack");
    assert_eq!(pack.led_count().await.unwrap(), 10);
    assert_eq!(pack.mode().await.unwrap(), Mode::Ambilight);
    assert_eq!(
        pack.screen_size().await.unwrap(),
        ScreenRect {
            x: 0,
            y: 0,
            width: 1920,
            height: 1080
        }
    );

    // Getters never take the lock
    assert_eq!(mock.count("lock"), 0);
}

#[tokio::test]
async fn test_led_areas_from_controller() {
    let mock = MockController::scripted(|line| match line {
        "getleds" => "leds:1-0,0,100,50;2-100,0,100,50".into(),
        _ => "unknown command".into(),
    })
    .await;
    let mut pack = connect(&mock).await;

    let areas = pack.led_areas().await.unwrap();

    assert_eq!(
        areas,
        vec![LedArea::new(0, 0, 100, 50), LedArea::new(100, 0, 100, 50)]
    );
}

#[tokio::test]
async fn test_led_areas_from_bare_payload() {
    let mock = MockController::scripted(|_| "1-0,0,100,50;2-100,0,100,50".into()).await;
    let mut pack = connect(&mock).await;

    let areas = pack.led_areas().await.unwrap();

    assert_eq!(areas[0], LedArea::new(0, 0, 100, 50));
    assert_eq!(areas[1], LedArea::new(100, 0, 100, 50));
}

#[tokio::test]
async fn test_colors_skip_trailing_separator() {
    let mock = MockController::scripted(|_| "colors:1-255,0,0;2-0,255,0;".into()).await;
    let mut pack = connect(&mock).await;

    assert_eq!(
        pack.colors().await.unwrap(),
        vec![Rgb::new(255, 0, 0), Rgb::new(0, 255, 0)]
    );
}

#[tokio::test]
async fn test_malformed_payloads() {
    let mock = MockController::scripted(|line| match line {
        "getcountleds" => "countleds:many".into(),
        "getfps" => "fps:".into(),
        "getcolors" => "colors:1-255,0;".into(),
        _ => "screensize:1920x1080".into(),
    })
    .await;
    let mut pack = connect(&mock).await;

    for result in [
        pack.led_count().await.map(|_| ()),
        pack.fps().await.map(|_| ()),
        pack.colors().await.map(|_| ()),
        pack.screen_size().await.map(|_| ()),
    ] {
        assert!(matches!(
            result,
            Err(ClientError::Protocol(ProtocolError::MalformedPayload(_)))
        ));
    }

    // Bad payloads are not transport failures
    assert!(pack.is_connected());
}

#[tokio::test]
async fn test_getter_answered_with_ok() {
    let mock = MockController::scripted(|_| "ok".into()).await;
    let mut pack = connect(&mock).await;

    assert!(matches!(
        pack.profile().await,
        Err(ClientError::Protocol(ProtocolError::UnexpectedResponse(_)))
    ));
}

// ============================================================================
// Setters
// ============================================================================

#[tokio::test]
async fn test_power() {
    let mock = MockController::start().await;
    let mut pack = connect(&mock).await;

    pack.turn_off().await.unwrap();
    assert!(!pack.is_on().await.unwrap());

    pack.turn_on().await.unwrap();
    assert_eq!(pack.status().await.unwrap(), Status::On);

    assert_eq!(mock.count("setstatus"), 2);
    assert!(!pack.is_locked());
}

#[tokio::test]
async fn test_attributes() {
    let mock = MockController::start().await;
    let mut pack = connect(&mock).await;

    pack.set_mode(&Mode::Moodlamp).await.unwrap();
    pack.set_gamma(2.5).await.unwrap();
    pack.set_brightness(55).await.unwrap();
    pack.set_smooth(20).await.unwrap();
    pack.set_profile("Movies").await.unwrap();

    {
        let model = mock.model();
        assert_eq!(model.mode, "moodlamp");
        assert_eq!(model.gamma, 2.5);
        assert_eq!(model.brightness, 55);
        assert_eq!(model.smooth, 20);
        assert_eq!(model.profile, "Movies");
    }

    let sent: Vec<String> = mock
        .received()
        .into_iter()
        .filter(|line| line.starts_with("set"))
        .collect();
    assert_eq!(
        sent,
        vec![
            "setmode:moodlamp",
            "setgamma:2.5",
            "setbrightness:55",
            "setsmooth:20",
            "setprofile:Movies"
        ]
    );
}

#[tokio::test]
async fn test_set_attribute_generic() {
    let mock = MockController::start().await;
    let mut pack = connect(&mock).await;

    for attribute in [Attribute::Brightness, Attribute::Smooth] {
        pack.set_attribute(attribute, 7).await.unwrap();
    }

    assert_eq!(mock.model().brightness, 7);
    assert_eq!(mock.model().smooth, 7);
}

#[tokio::test]
async fn test_setter_rejected_by_controller() {
    let mock = MockController::start().await;
    let mut pack = connect(&mock).await;

    let result = pack.set_profile("Nope").await;

    assert!(matches!(
        result,
        Err(ClientError::Protocol(ProtocolError::Controller))
    ));
    // The lock taken for the setter was given back
    assert!(!pack.is_locked());
    assert_eq!(mock.model().lock_holder, None);
}

#[tokio::test]
async fn test_profiles_add_and_delete() {
    let mock = MockController::start().await;
    let mut pack = connect(&mock).await;

    pack.add_profile("Games").await.unwrap();
    assert_eq!(pack.profiles().await.unwrap(), vec!["Lightpack", "Movies", "Games"]);
    assert_eq!(pack.profile().await.unwrap(), "Games");

    pack.delete_profile("Movies").await.unwrap();
    assert_eq!(pack.profiles().await.unwrap(), vec!["Lightpack", "Games"]);
}

#[tokio::test]
async fn test_set_single_color_uses_one_based_number() {
    let mock = MockController::start().await;
    let mut pack = connect(&mock).await;

    pack.set_color(2, Rgb::new(1, 2, 3)).await.unwrap();

    assert_eq!(mock.count("setcolor"), 1);
    assert!(mock.received().contains(&"setcolor:3-1,2,3;".to_string()));
    assert_eq!(mock.model().colors[2], Rgb::new(1, 2, 3));
    assert_eq!(mock.model().colors[0], Rgb::BLACK);
}

#[tokio::test]
async fn test_set_colors_batch() {
    let mock = MockController::start().await;
    let mut pack = connect(&mock).await;

    pack.set_colors(&[Rgb::new(10, 0, 0), Rgb::new(0, 20, 0)])
        .await
        .unwrap();

    assert!(mock
        .received()
        .contains(&"setcolor:1-10,0,0;2-0,20,0;".to_string()));
    assert_eq!(pack.colors().await.unwrap()[1], Rgb::new(0, 20, 0));
}

#[tokio::test]
async fn test_set_all_colors() {
    let mock = MockController::with_model(ControllerModel::with_leds(3)).await;
    let mut pack = connect(&mock).await;

    pack.set_all_colors(Rgb::new(255, 80, 0)).await.unwrap();

    // Count query and batch run under a single lock
    assert_eq!(
        mock.received(),
        vec![
            "lock",
            "getcountleds",
            "setcolor:1-255,80,0;2-255,80,0;3-255,80,0;",
            "unlock"
        ]
    );
    assert!(mock
        .model()
        .colors
        .iter()
        .all(|c| *c == Rgb::new(255, 80, 0)));
}

#[tokio::test]
async fn test_set_led_area() {
    let mock = MockController::start().await;
    let mut pack = connect(&mock).await;

    pack.set_led_area(0, LedArea::new(5, 6, 70, 80)).await.unwrap();

    assert!(mock.received().contains(&"setleds:1-5,6,70,80;".to_string()));
    assert_eq!(pack.led_areas().await.unwrap()[0], LedArea::new(5, 6, 70, 80));
}

#[tokio::test]
async fn test_api_status_reflects_other_session() {
    let mock = MockController::start().await;
    let mut holder = connect(&mock).await;
    let mut observer = connect(&mock).await;

    holder.lock().await.unwrap();
    assert_eq!(observer.api_status().await.unwrap(), ApiStatus::Busy);

    holder.unlock().await.unwrap();
    assert_eq!(observer.api_status().await.unwrap(), ApiStatus::Idle);
}
