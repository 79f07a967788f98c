use super::*;

#[test]
fn parse_and_display_are_zero_padded() {
    let tc = Timecode::parse("01:02:03,004").unwrap();
    assert_eq!(tc.as_millis(), 3_723_004);
    assert_eq!(tc.to_string(), "01:02:03,004");
    assert_eq!(Timecode::ZERO.to_string(), "00:00:00,000");
}

#[test]
fn dot_separator_is_accepted() {
    assert_eq!(
        Timecode::parse("00:00:05.250").unwrap(),
        Timecode::from_millis(5_250)
    );
}

#[test]
fn malformed_input_is_rejected() {
    for s in [
        "",
        "00:00:05",
        "00:05,000",
        "00:61:00,000",
        "00:00:60,000",
        "00:00:05,50",
        "aa:00:05,000",
        "00:00:00:05,000",
    ] {
        assert!(
            matches!(Timecode::parse(s), Err(EditError::Validation(_))),
            "accepted '{s}'"
        );
    }
}

#[test]
fn add_and_checked_sub() {
    let ten = Timecode::from_secs(10);
    let two = Timecode::from_secs(2);
    assert_eq!((ten + two).to_string(), "00:00:12,000");
    assert_eq!(ten.checked_sub(two).unwrap().to_string(), "00:00:08,000");
    assert_eq!(two.checked_sub(ten), None);
}

#[test]
fn ordering_matches_text_ordering() {
    let a = Timecode::parse("00:00:09,999").unwrap();
    let b = Timecode::parse("00:00:10,000").unwrap();
    assert!(a < b);
    assert!(a.to_string() < b.to_string());
}

#[test]
fn serde_uses_text_form() {
    let tc = Timecode::from_millis(1_500);
    let json = serde_json::to_string(&tc).unwrap();
    assert_eq!(json, "\"00:00:01,500\"");
    let back: Timecode = serde_json::from_str(&json).unwrap();
    assert_eq!(back, tc);
}
