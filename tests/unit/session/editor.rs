use super::*;
use crate::segment::segmenter::NoSegmentation;

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([9, 9, 9, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn identity_segmenter() -> Arc<dyn Segmenter> {
    Arc::new(|img: &RasterImage| -> TbiResult<RasterImage> { Ok(img.clone()) })
}

#[test]
fn zero_threads_is_rejected() {
    assert!(Editor::new(identity_segmenter(), EditorOpts { threads: 0 }).is_err());
}

#[test]
fn load_requests_cutout_and_wait_applies_it() {
    let mut ed = Editor::new(identity_segmenter(), EditorOpts::default()).unwrap();
    assert_eq!(ed.state().cutout_status(), CutoutStatus::NoImage);

    ed.load_image_bytes(&png_bytes(8, 6)).unwrap();
    assert_eq!(ed.state().dimensions(), Some((8, 6)));

    let status = ed.wait_for_cutout(Duration::from_secs(10));
    assert_eq!(status, CutoutStatus::Ready);
    assert_eq!(ed.state().cutout().unwrap().dimensions(), (8, 6));
}

#[test]
fn bad_upload_leaves_state_untouched() {
    let mut ed = Editor::new(identity_segmenter(), EditorOpts::default()).unwrap();
    ed.update(|s| s.add_text_layer().unwrap().0);
    let before = ed.state().clone();
    assert!(ed.load_image_bytes(b"GIF89a not really").is_err());
    assert_eq!(ed.state(), &before);
}

#[test]
fn unsupported_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.gif");
    std::fs::write(&path, png_bytes(2, 2)).unwrap();
    let mut ed = Editor::new(identity_segmenter(), EditorOpts::default()).unwrap();
    assert!(ed.load_image_file(&path).is_err());
    assert_eq!(ed.state().cutout_status(), CutoutStatus::NoImage);
}

#[test]
fn segmentation_failure_keeps_the_image() {
    let mut ed = Editor::new(Arc::new(NoSegmentation), EditorOpts::default()).unwrap();
    ed.load_image_bytes(&png_bytes(4, 4)).unwrap();
    assert_eq!(
        ed.wait_for_cutout(Duration::from_secs(10)),
        CutoutStatus::Unavailable
    );
    assert!(ed.state().source().is_some());
    assert!(ed.state().cutout().is_none());
}

#[test]
fn slow_result_for_replaced_image_is_discarded() {
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let release_rx = std::sync::Mutex::new(release_rx);
    let seg: Arc<dyn Segmenter> = Arc::new(move |img: &RasterImage| -> TbiResult<RasterImage> {
        if img.width() == 10 {
            // Hold the first request until the second image has been handled.
            let _ = release_rx
                .lock()
                .unwrap()
                .recv_timeout(Duration::from_secs(10));
        }
        Ok(img.clone())
    });
    let mut ed = Editor::new(seg, EditorOpts { threads: 2 }).unwrap();

    let first = ed.load_image_bytes(&png_bytes(10, 10)).unwrap();
    let second = ed.load_image_bytes(&png_bytes(20, 20)).unwrap();
    assert!(second.epoch() > first.epoch());

    assert_eq!(ed.wait_for_cutout(Duration::from_secs(10)), CutoutStatus::Ready);
    assert_eq!(ed.state().cutout().unwrap().dimensions(), (20, 20));

    release_tx.send(()).unwrap();
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut applied = 0;
    while applied == 0 && Instant::now() < deadline {
        applied = ed.poll();
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(applied, 1);
    assert_eq!(ed.state().cutout().unwrap().dimensions(), (20, 20));
    assert_eq!(ed.state().dimensions(), Some((20, 20)));
}

#[test]
fn wait_times_out_while_pending() {
    let (_hold_tx, hold_rx) = mpsc::channel::<()>();
    let hold_rx = std::sync::Mutex::new(hold_rx);
    let seg: Arc<dyn Segmenter> = Arc::new(move |img: &RasterImage| -> TbiResult<RasterImage> {
        let _ = hold_rx.lock().unwrap().recv_timeout(Duration::from_secs(2));
        Ok(img.clone())
    });
    let mut ed = Editor::new(seg, EditorOpts::default()).unwrap();
    ed.load_image_bytes(&png_bytes(3, 3)).unwrap();
    assert_eq!(
        ed.wait_for_cutout(Duration::from_millis(20)),
        CutoutStatus::Pending
    );
}

#[test]
fn try_update_error_keeps_state() {
    let mut ed = Editor::new(identity_segmenter(), EditorOpts::default()).unwrap();
    ed.update(|s| s.add_text_layer().unwrap().0);
    let before = ed.state().clone();
    let err = ed.try_update(|s| {
        s.set_attribute_raw(crate::scene::layer::LayerId(1), "nope", serde_json::json!(1))
    });
    assert!(err.is_err());
    assert_eq!(ed.state(), &before);
}
