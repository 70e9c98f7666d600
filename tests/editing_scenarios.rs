//! End-to-end editing through the session API.
//!
//! Every test uses a 200x100 image on a 200x100 canvas, so at the default zoom
//! screen and image coordinates coincide.

use labelkit::config::AppConfig;
use labelkit::geometry::{Point, Rect, bounding_box};
use labelkit::hit_test::{HitTolerance, hit_test};
use labelkit::keybindings::{Command, Key, KeyCombo, Platform, ShortcutConfig, command_table};
use labelkit::model::{Geometry, Label, LabelStatus, LabelType};
use labelkit::replay::{ReplayScript, run_script};
use labelkit::state::{EditorSession, LabelStore};
use labelkit::viewport::{Direction, Viewport, ViewportConfig};

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

fn setup(label_type: LabelType) -> (EditorSession, LabelStore) {
    let mut store = LabelStore::new();
    store.add_image("scene.png", 200, 100);
    store.add_image("next.png", 640, 480);
    let mut session = EditorSession::default();
    session.set_canvas_size(200.0, 100.0);
    session.set_active_image(&mut store, 0);
    session.set_label_type(&mut store, label_type);
    (session, store)
}

fn click(session: &mut EditorSession, store: &mut LabelStore, x: f32, y: f32) {
    session.pointer_down(store, Point::new(x, y));
    session.pointer_up(store, Point::new(x, y));
}

fn labels<'s>(session: &EditorSession, store: &'s LabelStore) -> &'s [Label] {
    store.labels(session.active_image(store).unwrap())
}

#[test]
fn scenario_a_three_clicks_commit_polygon() {
    let (mut session, mut store) = setup(LabelType::Polygon);
    click(&mut session, &mut store, 10.0, 10.0);
    click(&mut session, &mut store, 50.0, 10.0);
    click(&mut session, &mut store, 50.0, 50.0);
    let id = session.finish(&mut store).unwrap();

    let committed = labels(&session, &store);
    assert_eq!(committed.len(), 1);
    assert_eq!(committed[0].id, id);
    assert_eq!(committed[0].status, LabelStatus::Accepted);
    assert_eq!(
        committed[0].geometry,
        Geometry::Polygon {
            points: vec![
                Point::new(10.0, 10.0),
                Point::new(50.0, 10.0),
                Point::new(50.0, 50.0)
            ]
        }
    );
}

#[test]
fn scenario_b_cancel_leaves_store_unchanged() {
    let (mut session, mut store) = setup(LabelType::Polygon);
    click(&mut session, &mut store, 10.0, 10.0);
    click(&mut session, &mut store, 50.0, 10.0);
    session.cancel(&mut store);

    assert!(labels(&session, &store).is_empty());
    assert!(session.engine().unwrap().is_idle());
    assert!(session.transient().is_none());
}

#[test]
fn scenario_c_ellipse_spans_the_dragged_box() {
    let (mut session, mut store) = setup(LabelType::Polygon);
    session.polygon_engine().unwrap().start_ellipse();
    click(&mut session, &mut store, 0.0, 0.0);
    click(&mut session, &mut store, 100.0, 50.0);
    session.finish(&mut store).unwrap();

    let committed = labels(&session, &store);
    assert_eq!(committed.len(), 1);
    let points = committed[0].geometry.vertices();
    assert_eq!(points.len(), session.engine_config().ellipse_vertex_count);
    let bbox = bounding_box(points).unwrap();
    assert!(approx_eq(bbox.top_left.x, 0.0));
    assert!(approx_eq(bbox.top_left.y, 0.0));
    assert!(approx_eq(bbox.bottom_right.x, 100.0));
    assert!(approx_eq(bbox.bottom_right.y, 50.0));
}

#[test]
fn scenario_d_zero_area_rect_not_committed() {
    let (mut session, mut store) = setup(LabelType::Rect);
    session.pointer_down(&mut store, Point::new(5.0, 5.0));
    session.pointer_up(&mut store, Point::new(5.0, 5.0));

    assert!(labels(&session, &store).is_empty());
    assert!(session.engine().unwrap().is_idle());
}

#[test]
fn polygon_keeps_click_order_for_any_vertex_count() {
    for n in 3..8 {
        let (mut session, mut store) = setup(LabelType::Polygon);
        let clicks: Vec<Point> = (0..n)
            .map(|i| Point::new(20.0 + 20.0 * i as f32, 10.0 + 10.0 * (i % 2) as f32))
            .collect();
        for p in &clicks {
            click(&mut session, &mut store, p.x, p.y);
        }
        session.finish(&mut store).unwrap();
        assert_eq!(labels(&session, &store)[0].geometry.vertices(), &clicks[..]);
    }
}

#[test]
fn undo_then_finish_respects_minimum() {
    // Four clicks, one undo: three remain and the polygon commits
    let (mut session, mut store) = setup(LabelType::Polygon);
    for (x, y) in [(10.0, 10.0), (60.0, 10.0), (60.0, 60.0), (10.0, 60.0)] {
        click(&mut session, &mut store, x, y);
    }
    session.undo_last_step(&mut store);
    session.finish(&mut store).unwrap();
    assert_eq!(labels(&session, &store)[0].geometry.vertices().len(), 3);

    // Two clicks, one undo: finish is rejected and the line keeps building
    let (mut session, mut store) = setup(LabelType::Line);
    click(&mut session, &mut store, 10.0, 10.0);
    click(&mut session, &mut store, 60.0, 10.0);
    session.undo_last_step(&mut store);
    assert!(session.finish(&mut store).is_none());
    assert!(!session.engine().unwrap().is_idle());
    assert!(labels(&session, &store).is_empty());
}

#[test]
fn cancel_without_clicks_is_harmless() {
    for label_type in [
        LabelType::Rect,
        LabelType::Point,
        LabelType::Line,
        LabelType::Polygon,
    ] {
        let (mut session, mut store) = setup(label_type);
        session.cancel(&mut store);
        session.undo_last_step(&mut store);
        assert!(session.finish(&mut store).is_none());
        assert!(labels(&session, &store).is_empty());
    }
}

#[test]
fn screen_image_round_trip() {
    let mut viewport = Viewport::new(ViewportConfig::default(), (800.0, 600.0));
    viewport.set_image_size(640.0, 480.0);
    for zoom_steps in 0..4 {
        for _ in 0..zoom_steps {
            viewport.zoom_in();
        }
        viewport.pan_by(13.0, -7.0);
        for p in [
            Point::new(0.0, 0.0),
            Point::new(320.5, 10.25),
            Point::new(639.0, 479.0),
        ] {
            let back = viewport.screen_to_image(viewport.image_to_screen(p));
            assert!(approx_eq(back.x, p.x) && approx_eq(back.y, p.y));
        }
    }
}

#[test]
fn zoom_in_then_out_restores_zoom() {
    let (mut session, _store) = setup(LabelType::Rect);
    let initial = session.viewport().zoom();
    for _ in 0..3 {
        session.zoom_in();
    }
    assert!(session.viewport().zoom() > initial);
    for _ in 0..3 {
        session.zoom_out();
    }
    assert!(approx_eq(session.viewport().zoom(), initial));
}

#[test]
fn overlapping_rects_hit_the_newest() {
    let (mut session, mut store) = setup(LabelType::Rect);
    for (from, to) in [((10.0, 10.0), (80.0, 80.0)), ((150.0, 90.0), (40.0, 40.0))] {
        session.pointer_down(&mut store, Point::new(from.0, from.1));
        session.pointer_move(&mut store, Point::new(to.0, to.1));
        session.pointer_up(&mut store, Point::new(to.0, to.1));
    }
    let committed = labels(&session, &store);
    assert_eq!(committed.len(), 2);

    let tolerance = HitTolerance {
        radius: 4.0,
        handle_size: 8.0,
    };
    let hit = hit_test(
        committed.iter(),
        session.viewport(),
        Point::new(60.0, 60.0),
        tolerance,
    )
    .unwrap();
    assert_eq!(hit.label_id, committed[1].id);
}

#[test]
fn pressing_a_rect_selects_it_without_new_label() {
    let (mut session, mut store) = setup(LabelType::Rect);
    session.pointer_down(&mut store, Point::new(10.0, 10.0));
    session.pointer_move(&mut store, Point::new(90.0, 60.0));
    session.pointer_up(&mut store, Point::new(90.0, 60.0));
    let first = labels(&session, &store)[0].id;

    click(&mut session, &mut store, 150.0, 90.0);
    click(&mut session, &mut store, 50.0, 30.0);
    assert_eq!(labels(&session, &store).len(), 1);
    assert_eq!(session.active_label_id(), Some(first));
    assert_eq!(
        labels(&session, &store)[0].geometry,
        Geometry::Rect {
            rect: Rect::from_corners(Point::new(10.0, 10.0), Point::new(90.0, 60.0))
        }
    );
}

#[test]
fn shortcuts_drive_creation_and_navigation() {
    let table = command_table(&ShortcutConfig::defaults(Platform::Other));
    let (mut session, mut store) = setup(LabelType::Line);

    click(&mut session, &mut store, 10.0, 10.0);
    click(&mut session, &mut store, 60.0, 40.0);
    let finish = table.combo_for(Command::FinishCreation).unwrap();
    assert_eq!(
        session.key_down(&mut store, &finish, &table),
        Some(Command::FinishCreation)
    );
    assert_eq!(labels(&session, &store).len(), 1);

    let next = KeyCombo::ctrl(Key::ArrowRight);
    assert_eq!(
        session.key_down(&mut store, &next, &table),
        Some(Command::NextImage)
    );
    assert_eq!(session.active_image_index(), 1);
    // No wrap past the last image
    session.key_down(&mut store, &next, &table);
    assert_eq!(session.active_image_index(), 1);

    let unbound = KeyCombo::key(Key::Char('q'));
    assert_eq!(session.key_down(&mut store, &unbound, &table), None);
}

#[test]
fn pan_keys_only_move_a_zoomed_view() {
    let table = command_table(&ShortcutConfig::defaults(Platform::Other));
    let (mut session, mut store) = setup(LabelType::Rect);
    let fitted = session.viewport().translate();
    session.execute(&mut store, Command::Pan(Direction::Right));
    assert_eq!(session.viewport().translate(), fitted);

    session.zoom_in();
    session.zoom_in();
    let zoomed = session.viewport().translate();
    session.key_down(&mut store, &KeyCombo::key(Key::ArrowLeft), &table);
    assert_ne!(session.viewport().translate(), zoomed);
}

#[test]
fn replayed_script_matches_direct_session() {
    let json = r#"{
        "images": [ { "name": "scene.png", "width": 200, "height": 100 } ],
        "canvas": { "width": 200.0, "height": 100.0 },
        "label_type": "polygon",
        "events": [
            { "event": "click", "x": 10.0, "y": 10.0 },
            { "event": "click", "x": 50.0, "y": 10.0 },
            { "event": "click", "x": 50.0, "y": 50.0 },
            { "event": "key", "combo": ["Space"] }
        ]
    }"#;
    let script = ReplayScript::from_json(json).unwrap();
    let replay = run_script(&script, &AppConfig::default()).unwrap();
    let data = replay.active_image_data().unwrap();
    assert_eq!(data.labels().len(), 1);
    assert_eq!(data.labels()[0].geometry.vertices().len(), 3);
}
