use super::*;
use crate::assets::fonts::FontSources;
use crate::foundation::core::Point;
use crate::scene::layer::{LayerAttr, LayerId};

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> RasterImage {
    RasterImage::from_rgba_image(image::RgbaImage::from_pixel(w, h, image::Rgba(rgba))).unwrap()
}

fn loaded(w: u32, h: u32) -> (EditorState, crate::scene::state::CutoutTicket) {
    EditorState::new().with_image(solid(w, h, [200, 30, 30, 255]))
}

fn close(a: u8, b: u8) -> bool {
    a.abs_diff(b) <= 2
}

fn system_compositor() -> Option<Compositor> {
    let fonts = FontBook::load(&FontSources::system());
    if fonts.is_empty() {
        eprintln!("no system fonts; skipping");
        return None;
    }
    Some(Compositor::new(fonts))
}

#[test]
fn no_image_renders_nothing() {
    let mut c = Compositor::new(FontBook::empty());
    let (state, _) = EditorState::new().add_text_layer().unwrap();
    assert!(c.render(&state).unwrap().is_none());
}

#[test]
fn export_without_image_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut c = Compositor::new(FontBook::empty());
    assert!(c.export(&EditorState::new(), dir.path()).unwrap().is_none());
    assert!(!dir.path().join(crate::encode::png::EXPORT_FILE_NAME).exists());
}

#[test]
fn output_matches_source_dimensions_regardless_of_layers() {
    let mut c = Compositor::new(FontBook::empty());
    let (state, _) = loaded(80, 60);
    let bare = c.render(&state).unwrap().unwrap();
    assert_eq!((bare.width, bare.height), (80, 60));

    let (state, id) = state.add_text_layer().unwrap();
    let state = state
        .set_attribute(id, LayerAttr::Left(400.0))
        .set_attribute(id, LayerAttr::FontSize(5000.0));
    let (state, _) = state.add_text_layer().unwrap();
    let frame = c.render(&state).unwrap().unwrap();
    assert_eq!((frame.width, frame.height), (80, 60));
    assert_eq!(frame.data.len(), 80 * 60 * 4);
}

#[test]
fn background_is_drawn_one_to_one() {
    let mut c = Compositor::new(FontBook::empty());
    let (state, _) = loaded(16, 9);
    let frame = c.render(&state).unwrap().unwrap();
    for (x, y) in [(0, 0), (15, 8), (7, 4)] {
        let p = frame.pixel(x, y).unwrap();
        assert!(close(p.r, 200) && close(p.g, 30) && p.a == 255, "{x},{y}: {p:?}");
    }
}

#[test]
fn ready_cutout_is_painted_on_top() {
    let mut c = Compositor::new(FontBook::empty());
    let (state, ticket) = loaded(20, 20);
    let mut cut = image::RgbaImage::from_pixel(20, 20, image::Rgba([0, 0, 0, 0]));
    for y in 5..15 {
        for x in 5..15 {
            cut.put_pixel(x, y, image::Rgba([10, 20, 250, 255]));
        }
    }
    let state = state.with_cutout(ticket, RasterImage::from_rgba_image(cut));
    let frame = c.render(&state).unwrap().unwrap();

    let inside = frame.pixel(10, 10).unwrap();
    assert!(close(inside.b, 250) && close(inside.r, 10), "{inside:?}");
    let outside = frame.pixel(1, 1).unwrap();
    assert!(close(outside.r, 200), "{outside:?}");
}

#[test]
fn default_layer_transform_is_canvas_centre() {
    let canvas = Canvas::new(800, 600).unwrap();
    let layer = TextLayer::with_defaults(LayerId(1));
    let t = layer_transform(canvas, &layer);
    assert_eq!(t * Point::ORIGIN, Point::new(400.0, 300.0));
}

#[test]
fn positive_top_moves_up_and_left_moves_right() {
    let canvas = Canvas::new(200, 100).unwrap();
    let mut layer = TextLayer::with_defaults(LayerId(1));
    layer.left = 25.0;
    layer.top = 25.0;
    let p = layer_transform(canvas, &layer) * Point::ORIGIN;
    assert_eq!(p, Point::new(150.0, 25.0));
}

#[test]
fn rotation_turns_local_x_axis() {
    let canvas = Canvas::new(100, 100).unwrap();
    let mut layer = TextLayer::with_defaults(LayerId(1));
    layer.rotation = 90.0;
    let p = layer_transform(canvas, &layer) * Point::new(10.0, 0.0);
    assert!((p.x - 50.0).abs() < 1e-9);
    assert!((p.y - 60.0).abs() < 1e-9);
}

#[test]
fn tilt_scales_the_opposite_axis_by_cosine() {
    let canvas = Canvas::new(100, 100).unwrap();
    let mut layer = TextLayer::with_defaults(LayerId(1));
    layer.tilt_x = 60.0;
    layer.tilt_y = -60.0;
    let t = layer_transform(canvas, &layer);
    let px = t * Point::new(10.0, 0.0);
    let py = t * Point::new(0.0, 10.0);
    assert!((px.x - 55.0).abs() < 1e-9, "{px:?}");
    assert!((py.y - 55.0).abs() < 1e-9, "{py:?}");
}

#[test]
fn text_changes_pixels_and_cutout_hides_it() {
    let Some(mut c) = system_compositor() else {
        return;
    };
    let (state, ticket) = loaded(400, 200);
    let (state, id) = state.add_text_layer().unwrap();
    let state = state
        .set_attribute(id, LayerAttr::Text("HHHH".into()))
        .set_attribute(id, LayerAttr::FontSize(40.0));

    let plain = c.render(&EditorState::new().with_image(solid(400, 200, [200, 30, 30, 255])).0);
    let plain = plain.unwrap().unwrap();
    let with_text = c.render(&state).unwrap().unwrap();
    assert_ne!(plain.data, with_text.data, "text layer left no mark");

    let state = state.with_cutout(ticket, Ok(solid(400, 200, [0, 255, 0, 255])));
    let covered = c.render(&state).unwrap().unwrap();
    assert!(
        covered
            .data
            .chunks_exact(4)
            .all(|px| close(px[0], 0) && close(px[1], 255) && close(px[2], 0))
    );
}

#[test]
fn letter_spacing_widens_the_ink() {
    let Some(mut c) = system_compositor() else {
        return;
    };
    let ink_columns = |frame: &FrameRGBA| {
        (0..frame.width)
            .filter(|&x| {
                (0..frame.height).any(|y| frame.pixel(x, y).is_some_and(|p| p.g > 150))
            })
            .collect::<Vec<_>>()
    };

    let (state, _) = loaded(600, 150);
    let (state, id) = state.add_text_layer().unwrap();
    let state = state
        .set_attribute(id, LayerAttr::Text("III".into()))
        .set_attribute(id, LayerAttr::FontSize(20.0));
    let tight = ink_columns(&c.render(&state).unwrap().unwrap());
    let spaced_state = state.set_attribute(id, LayerAttr::LetterSpacing(60.0));
    let spaced = ink_columns(&c.render(&spaced_state).unwrap().unwrap());

    if tight.is_empty() || spaced.is_empty() {
        eprintln!("fallback face drew no ink; skipping");
        return;
    }
    let span = |cols: &[u32]| cols[cols.len() - 1] - cols[0];
    assert!(span(&spaced) > span(&tight) + 60);
}

#[test]
fn zero_opacity_layer_is_invisible() {
    let Some(mut c) = system_compositor() else {
        return;
    };
    let (state, _) = loaded(200, 100);
    let base = c.render(&state).unwrap().unwrap();
    let (state, id) = state.add_text_layer().unwrap();
    let state = state
        .set_attribute(id, LayerAttr::FontSize(20.0))
        .set_attribute(id, LayerAttr::Opacity(0.0));
    assert_eq!(c.render(&state).unwrap().unwrap().data, base.data);
}

#[test]
fn resolved_faces_are_cached_per_face() {
    let Some(mut c) = system_compositor() else {
        return;
    };
    let a = c.face_for("Inter", 800).unwrap();
    let b = c.face_for("Inter", 800).unwrap();
    assert!(Arc::ptr_eq(&a.data, &b.data));
    assert_eq!(c.face_cache.len(), 1);
}
