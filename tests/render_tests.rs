//! # Render Tests
//!
//! Export dimensions, PNG validity and determinism for every template, and
//! the upload checks that run before anything is sent anywhere.

use cardnews::editor::{MAX_UPLOAD_BYTES, Upload};
use cardnews::render::font::FontBook;
use cardnews::render::images::ImageSet;
use cardnews::render::{EXPORT_PIXEL_RATIO, RenderContext, export};
use cardnews::state::{ContentCorrections, Editor, MemoryStore};
use cardnews::template::TemplateType;
use cardnews::template::defaults::default_data;
use serde_json::json;

fn export_default(kind: TemplateType, ratio: f32) -> cardnews::render::Export {
    let fonts = FontBook::bitmap();
    let images = ImageSet::new();
    export(&default_data(kind), &RenderContext::new(&fonts, &images), ratio).unwrap()
}

#[test]
fn test_export_at_default_ratio_doubles_canvas() {
    let out = export_default(TemplateType::VerticalCard, EXPORT_PIXEL_RATIO);
    assert_eq!((out.width, out.height), (1440, 2400));

    let decoded = image::load_from_memory(&out.png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1440, 2400));
}

#[test]
fn test_every_template_exports_at_its_canvas_size() {
    let expected = [
        (TemplateType::HorizontalCard, (720, 1080)),
        (TemplateType::QuadLayout, (720, 1080)),
        (TemplateType::VerticalListCard, (720, 1080)),
        (TemplateType::VerticalCard, (720, 1200)),
        (TemplateType::SquareLayout, (720, 720)),
    ];
    for (kind, size) in expected {
        let out = export_default(kind, 1.0);
        assert_eq!((out.width, out.height), size, "{}", kind);
        assert!(out.filename.starts_with(&format!("{}-", kind.id())));
        assert!(out.filename.ends_with(".png"));
    }
}

#[test]
fn test_square_layout_exports_square() {
    let out = export_default(TemplateType::SquareLayout, EXPORT_PIXEL_RATIO);
    let decoded = image::load_from_memory(&out.png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1440, 1440));
}

#[test]
fn test_render_is_deterministic() {
    let a = export_default(TemplateType::QuadLayout, 1.0);
    let b = export_default(TemplateType::QuadLayout, 1.0);
    assert_eq!(a.png, b.png);
}

#[test]
fn test_edited_record_renders_differently() {
    let mut editor = Editor::load(MemoryStore::new(), ContentCorrections::none());
    editor.select_template(TemplateType::SquareLayout);
    let fonts = FontBook::bitmap();
    let images = ImageSet::new();
    let ctx = RenderContext::new(&fonts, &images);

    let before = export(&editor.form_data().unwrap(), &ctx, 1.0).unwrap();
    editor.set_field("bgColor", json!("#000000")).unwrap();
    let after = export(&editor.form_data().unwrap(), &ctx, 1.0).unwrap();
    assert_ne!(before.png, after.png);
}

#[test]
fn test_uploads_are_checked_locally() {
    let too_big = vec![0u8; MAX_UPLOAD_BYTES + 1];
    assert!(Upload::new("big.png", "image/png", too_big).is_err());
    assert!(Upload::new("notes.txt", "text/plain", b"hi".to_vec()).is_err());

    let ok = Upload::new("ok.png", "image/png", vec![0u8; MAX_UPLOAD_BYTES]).unwrap();
    assert!(ok.to_data_url().starts_with("data:image/png;base64,"));
}
