use super::*;
use serde_json::json;

#[test]
fn defaults_match_editor_new_layer() {
    let l = TextLayer::with_defaults(LayerId(1));
    assert_eq!(l.text, "edit");
    assert_eq!(l.font_family, "Inter");
    assert_eq!(l.font_size, 200.0);
    assert_eq!(l.font_weight, 800);
    assert_eq!(l.opacity, 1.0);
    assert_eq!((l.left, l.top), (0.0, 0.0));
    assert_eq!((l.rotation, l.tilt_x, l.tilt_y), (0.0, 0.0, 0.0));
    assert_eq!(l.letter_spacing, 0.0);
    assert_eq!(l.color.as_css(), "white");
    assert_eq!(l.shadow_size, 4.0);
    assert_eq!(l.render_font_size(), 600.0);
}

#[test]
fn serializes_with_camel_case_keys() {
    let v = serde_json::to_value(TextLayer::with_defaults(LayerId(3))).unwrap();
    assert_eq!(v["id"], json!(3));
    assert_eq!(v["fontFamily"], json!("Inter"));
    assert_eq!(v["letterSpacing"], json!(0.0));
    assert_eq!(v["shadowColor"], json!("rgba(0, 0, 0, 0.8)"));
    assert_eq!(v["tiltX"], json!(0.0));
}

#[test]
fn deserialize_rejects_unknown_fields() {
    let mut v = serde_json::to_value(TextLayer::with_defaults(LayerId(1))).unwrap();
    v["blink"] = json!(true);
    assert!(serde_json::from_value::<TextLayer>(v).is_err());
}

#[test]
fn parse_accepts_every_known_key() {
    let samples = [
        ("text", json!("hello")),
        ("fontFamily", json!("Roboto")),
        ("fontSize", json!(48)),
        ("fontWeight", json!(400)),
        ("color", json!("#ff0000")),
        ("opacity", json!(0.5)),
        ("left", json!(-10)),
        ("top", json!(12.5)),
        ("rotation", json!(45)),
        ("tiltX", json!(10)),
        ("tiltY", json!(-10)),
        ("letterSpacing", json!(4)),
        ("shadowColor", json!("black")),
        ("shadowSize", json!(2)),
    ];
    assert_eq!(samples.len(), LayerAttr::KEYS.len());
    for (key, value) in samples {
        let attr = LayerAttr::parse(key, value).unwrap();
        assert_eq!(attr.key(), key);
    }
}

#[test]
fn parse_rejects_unknown_key_and_wrong_type() {
    let err = LayerAttr::parse("fontStyle", json!("italic")).unwrap_err();
    assert!(err.to_string().contains("unknown text layer attribute"));
    assert!(LayerAttr::parse("id", json!(9)).is_err());
    assert!(LayerAttr::parse("fontSize", json!("big")).is_err());
    assert!(LayerAttr::parse("fontWeight", json!(-1)).is_err());
    assert!(LayerAttr::parse("color", json!("nope")).is_err());
}

#[test]
fn apply_and_get_round_through_the_same_key() {
    let mut l = TextLayer::with_defaults(LayerId(1));
    l.apply(LayerAttr::parse("letterSpacing", json!(7.5)).unwrap());
    assert_eq!(l.letter_spacing, 7.5);
    assert_eq!(l.get("letterSpacing").unwrap(), json!(7.5));
    assert_eq!(l.get("id").unwrap(), json!(1));
    assert!(l.get("nope").is_err());
}

#[test]
fn cli_values_for_string_keys_stay_verbatim() {
    assert_eq!(
        LayerAttr::from_cli_value("text", "2024").unwrap(),
        LayerAttr::Text("2024".into())
    );
    assert_eq!(
        LayerAttr::from_cli_value("fontFamily", "true").unwrap(),
        LayerAttr::FontFamily("true".into())
    );
    assert_eq!(
        LayerAttr::from_cli_value("text", "null").unwrap(),
        LayerAttr::Text("null".into())
    );
    assert!(matches!(
        LayerAttr::from_cli_value("color", "#ff3366").unwrap(),
        LayerAttr::Color(_)
    ));
}

#[test]
fn cli_values_for_numeric_keys_are_parsed() {
    assert_eq!(
        LayerAttr::from_cli_value("top", "-10").unwrap(),
        LayerAttr::Top(-10.0)
    );
    assert_eq!(
        LayerAttr::from_cli_value("fontWeight", "700").unwrap(),
        LayerAttr::FontWeight(700)
    );
    assert!(LayerAttr::from_cli_value("opacity", "half").is_err());
    assert!(LayerAttr::from_cli_value("blur", "3").is_err());
}
