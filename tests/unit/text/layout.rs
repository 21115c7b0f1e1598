use super::*;
use crate::assets::fonts::{FontBook, FontSources};

fn fixed_width(per_char: f64) -> impl FnMut(&str) -> TbiResult<f64> {
    move |s: &str| Ok(per_char * s.chars().count() as f64)
}

#[test]
fn empty_text_has_no_pieces() {
    let plan = plan_run("", 5.0, fixed_width(10.0)).unwrap();
    assert!(plan.pieces.is_empty());
    assert_eq!(plan.total_width, 0.0);
}

#[test]
fn zero_spacing_is_single_run_centred_on_origin() {
    let plan = plan_run("edit", 0.0, fixed_width(10.0)).unwrap();
    assert_eq!(plan.pieces.len(), 1);
    assert_eq!(plan.pieces[0].text, "edit");
    assert_eq!(plan.total_width, 40.0);
    assert_eq!(plan.pieces[0].left, -20.0);
    assert_eq!(plan.pieces[0].center_x(), 0.0);
}

#[test]
fn spaced_total_is_sum_plus_gaps() {
    let widths = [("w", 30.0), ("i", 8.0), ("d", 20.0), ("e", 18.0)]
        .into_iter()
        .collect::<std::collections::HashMap<&str, f64>>();
    let plan = plan_run("wide", 12.0, |s: &str| Ok(widths[s])).unwrap();

    assert_eq!(plan.pieces.len(), 4);
    assert_eq!(plan.total_width, 30.0 + 8.0 + 20.0 + 18.0 + 3.0 * 12.0);
    assert_eq!(plan.pieces[0].left, -plan.total_width / 2.0);

    for pair in plan.pieces.windows(2) {
        let expected = pair[0].left + pair[0].width + 12.0;
        assert!((pair[1].left - expected).abs() < 1e-9);
    }
    let last = plan.pieces.last().unwrap();
    assert!((last.left + last.width - plan.total_width / 2.0).abs() < 1e-9);
}

#[test]
fn single_char_with_spacing_has_no_gap() {
    let plan = plan_run("A", 50.0, fixed_width(10.0)).unwrap();
    assert_eq!(plan.total_width, 10.0);
    assert_eq!(plan.pieces[0].center_x(), 0.0);
}

#[test]
fn negative_spacing_tightens_run() {
    let plan = plan_run("abc", -2.0, fixed_width(10.0)).unwrap();
    assert_eq!(plan.total_width, 26.0);
    assert_eq!(plan.pieces[2].left, 3.0);
}

#[test]
fn measure_errors_propagate() {
    let err = plan_run("ab", 1.0, |_| Err(TbiError::render("no face"))).unwrap_err();
    assert!(matches!(err, TbiError::Render(_)));
}

#[test]
fn parley_measure_is_additive_enough_for_spacing() {
    let book = FontBook::load(&FontSources::system());
    let Some(face) = book.resolve("Inter", 800) else {
        eprintln!("skipping: no system fonts available");
        return;
    };
    let mut engine = TextLayoutEngine::new();
    let whole = engine.measure("edit", &face, 60.0).unwrap();
    assert!(whole > 0.0);

    let plan = plan_run("edit", 4.0, |s| engine.measure(s, &face, 60.0)).unwrap();
    let sum: f64 = plan.pieces.iter().map(|p| p.width).sum();
    assert!((plan.total_width - (sum + 12.0)).abs() < 1e-6);
}

#[test]
fn layout_rejects_bad_size() {
    let book = FontBook::load(&FontSources::system());
    let Some(face) = book.resolve("Inter", 400) else {
        eprintln!("skipping: no system fonts available");
        return;
    };
    let mut engine = TextLayoutEngine::new();
    assert!(
        engine
            .layout_line("x", &face, 0.0, TextBrushRgba8::default())
            .is_err()
    );
    assert!(
        engine
            .layout_line("x", &face, f32::NAN, TextBrushRgba8::default())
            .is_err()
    );
}

#[test]
fn collection_face_registers_under_its_own_family() {
    let book = FontBook::load(&FontSources::system());
    let ids = book.collection_faces();
    if ids.is_empty() {
        eprintln!("skipping: no font collection with more than one face installed");
        return;
    }
    let mut engine = TextLayoutEngine::new();
    for id in ids {
        let face = book.load_face(id, "").unwrap();
        assert!(face.index > 0);
        let family = engine.family_for(&face).unwrap();
        assert!(
            family.eq_ignore_ascii_case(&face.family),
            "face {} of collection registered as '{family}', expected '{}'",
            face.index,
            face.family
        );
    }
}
