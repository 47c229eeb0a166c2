//! Basic painting walkthrough for the Easel Core engine
//!
//! A headless host: builds a view over a scene, paints strokes on a
//! layer, pans and zooms the camera, and exercises undo/redo. Run with
//! `cargo run --example basic_painting`.

use std::sync::Arc;

use parking_lot::RwLock;

use easel_core::{
    BrushMode, CanvasLayer, Color, FitMode, HistoryManager, MarginsPatch, PointerEvent, Scene,
    ViewController, WheelEvent,
};

fn main() {
    env_logger::init();

    println!("Easel Core v{}", easel_core::VERSION);

    // 1. A view over an 800x600 surface and a document to paint on
    let mut view = ViewController::with_size(800.0, 600.0).expect("failed to create view");
    view.set_document_rect(0.0, 0.0, 400.0, 400.0);
    view.set_document_margins(MarginsPatch {
        left: Some(40.0),
        right: Some(40.0),
        top: Some(40.0),
        bottom: Some(40.0),
    });

    // 2. A scene with one paintable layer bound to a history
    let mut scene = Scene::new();
    let history = Arc::new(RwLock::new(HistoryManager::new()));
    let mut layer = CanvasLayer::new("Sketch", 400, 400).expect("failed to create layer");
    layer.set_history_manager(Some(history.clone()));
    let layer_id = scene.content.add_layer(Box::new(layer), None);

    // 3. Fit the document and paint a couple of strokes
    view.zoom_document_to_fit(FitMode::Contain);
    println!("fitted at zoom {:.3}", view.zoom());

    let red = Color::from_hex("#e74c3c").unwrap();
    let layer = scene.content.get_canvas_mut(layer_id).unwrap();
    layer.begin_stroke(50.0, 50.0);
    for i in 1..=20 {
        let t = i as f64 / 20.0;
        layer.stroke(
            50.0 + t * 300.0,
            50.0 + (t * std::f64::consts::PI * 2.0).sin() * 80.0 + t * 250.0,
            red,
            10.0,
            (1.0 - t as f32 * 0.5).max(0.2),
            BrushMode::Brush,
        );
    }
    layer.end_stroke_at(0.0);

    layer.begin_stroke(80.0, 300.0);
    layer.stroke(320.0, 120.0, Color::BLACK, 6.0, 1.0, BrushMode::Brush);
    layer.end_stroke_at(1000.0);
    println!("undo steps: {}", history.read().undo_count());

    // 4. Drive the animation loop: wheel zoom and a drag pan
    view.on_wheel(&WheelEvent::pixels(400.0, 300.0, -240.0));
    let mut now = 0.0;
    for _ in 0..60 {
        now += 16.0;
        view.tick(now, &scene);
    }
    println!("zoom after wheel: {:.3}", view.zoom());

    view.on_pointer_down(&PointerEvent::primary(400.0, 300.0, now));
    for _ in 0..10 {
        now += 16.0;
        view.on_pointer_move(&PointerEvent::primary(400.0, 300.0, now).with_movement(-6.0, -2.0));
        view.tick(now, &scene);
    }
    view.on_pointer_up(&PointerEvent::primary(340.0, 280.0, now));
    for _ in 0..30 {
        now += 16.0;
        view.tick(now, &scene);
    }
    let (tx, ty) = view.translation();
    println!("translation after drag: ({:.1}, {:.1})", tx, ty);

    // 5. Inspect a pixel, then undo both strokes
    let probe = view.get_pixel_color_at_world(200.0, 200.0);
    println!("pixel under document center: {} / {}", probe.hex, probe.rgba);

    let layer = scene.content.get_canvas_mut(layer_id).unwrap();
    while layer.can_undo() {
        layer.undo();
    }
    view.tick(now + 16.0, &scene);
    let probe = view.get_pixel_color_at_world(200.0, 200.0);
    println!("after undo: {} (alpha {:.3})", probe.hex, probe.a);
}
