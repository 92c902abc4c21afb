use std::path::PathBuf;

use fractal_poetry::session::{Limits, Outcome};
use fractal_poetry::{Config, Error, FractalKind, PoetryExplorer, Session};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("fractal_poetry_{}_{}", std::process::id(), name))
}

fn explorer(seed: u64) -> PoetryExplorer {
    PoetryExplorer::new(Config { seed: Some(seed), ..Config::default() }).unwrap()
}

#[test]
fn export_then_import_restores_bookmarks_and_state() {
    let path = temp_path("roundtrip.json");
    let mut e = explorer(99);
    for line in [
        "jump -0.7 0 4",
        "save seahorse",
        "julia",
        "jump 0.285 0.01 2",
        "save dragon",
        "poem 3",
        "left 0.25",
    ] {
        e.handle_line(line).unwrap();
    }
    e.handle_line(&format!("export {}", path.display())).unwrap();

    let restored = Session::import(&path, Limits::default()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(restored.bookmarks(), e.session().bookmarks());
    assert_eq!(restored.state(), e.session().state());
    assert_eq!(restored.seed(), 99);
    assert_eq!(restored.history(), e.session().history());
    assert_eq!(restored.bookmarks()["dragon"].kind, FractalKind::Julia);
}

#[test]
fn exported_file_has_documented_shape() {
    let path = temp_path("shape.json");
    let mut e = explorer(1);
    e.handle_line("save origin").unwrap();
    e.handle_line("poem 2").unwrap();
    e.session().export(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert!(json["created_at"].is_string());
    assert_eq!(
        json["bookmarks"]["origin"],
        serde_json::json!({"x": 0.0, "y": 0.0, "zoom": 1.0, "kind": "mandelbrot"})
    );
    let entry = &json["history"][0];
    assert_eq!(entry["command"], "poem 2");
    assert_eq!(entry["outcome"]["poem"]["lines"].as_array().unwrap().len(), 2);
}

#[test]
fn replayed_bookmark_reproduces_poem() {
    let path = temp_path("replay.json");
    let mut first = explorer(2024);
    first.handle_line("jump -0.16 1.04 20").unwrap();
    first.handle_line("save spiral").unwrap();
    let original = first.poem(5).unwrap();
    first.session().export(&path).unwrap();

    let session = Session::import(&path, Limits::default()).unwrap();
    std::fs::remove_file(&path).ok();
    let mut second = PoetryExplorer::with_session(Config::default(), session).unwrap();
    second.handle_line("jump 1 1").unwrap();
    second.handle_line("load spiral").unwrap();

    assert_eq!(second.poem(5).unwrap(), original);
    match &second.session().history().last().unwrap().outcome {
        Outcome::Poem(p) => assert_eq!(p, &original),
        other => panic!("expected poem, got {:?}", other),
    }
}

#[test]
fn import_command_replaces_session() {
    let path = temp_path("import_cmd.json");
    let mut source = explorer(5);
    source.handle_line("jump 0.3 -0.2 3").unwrap();
    source.handle_line("save here").unwrap();
    source.session().export(&path).unwrap();

    let mut target = explorer(6);
    target.handle_line(&format!("import {}", path.display())).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(target.session().seed(), 5);
    assert!(target.session().bookmarks().contains_key("here"));
    assert_eq!(target.session().state(), source.session().state());
}

#[test]
fn unreadable_file_leaves_session_untouched() {
    let mut e = explorer(3);
    e.handle_line("jump 0.1 0.1").unwrap();
    let before = *e.session().state();

    let err = e.handle_line("import /no/such/dir/session.json").unwrap_err();
    assert!(matches!(err, Error::FileIo { .. }));
    let err = e.handle_line("export /no/such/dir/session.json").unwrap_err();
    assert!(matches!(err, Error::FileIo { .. }));

    assert_eq!(*e.session().state(), before);
    assert_eq!(e.session().seed(), 3);
}

#[test]
fn corrupt_file_is_reported() {
    let path = temp_path("corrupt.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = Session::import(&path, Limits::default()).err().unwrap();
    std::fs::remove_file(&path).ok();
    assert!(matches!(err, Error::Serialization(_)));
}

#[test]
fn independent_sessions_do_not_share_state() {
    let mut a = explorer(10);
    let mut b = explorer(10);
    a.handle_line("jump 0.2 0.2").unwrap();
    a.handle_line("save a").unwrap();
    assert!(b.session().bookmarks().is_empty());
    assert_eq!(b.session().state().coordinate.x(), 0.0);
    b.handle_line("up").unwrap();
    assert_eq!(a.session().history().len(), 1);
}

fn exported_json(name: &str, seed: u64, lines: &[&str]) -> (PathBuf, serde_json::Value) {
    let path = temp_path(name);
    let mut e = explorer(seed);
    for line in lines {
        e.handle_line(line).unwrap();
    }
    e.session().export(&path).unwrap();
    let json = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    (path, json)
}

#[test]
fn import_rejects_zoom_outside_bounds() {
    let (path, mut json) = exported_json("tiny_zoom.json", 8, &["jump 0.1 0.1 2"]);
    json["current"]["zoom"] = serde_json::json!(1e-320);
    std::fs::write(&path, serde_json::to_string(&json).unwrap()).unwrap();

    let mut e = explorer(9);
    let before = *e.session().state();
    let err = e.handle_line(&format!("import {}", path.display())).unwrap_err();
    std::fs::remove_file(&path).ok();

    assert!(matches!(err, Error::InvalidParameter(_)));
    assert_eq!(*e.session().state(), before);
    assert_eq!(e.session().seed(), 9);
    assert!(e.handle_line("explore").is_ok());
}

#[test]
fn import_rejects_bookmark_outside_coordinate_limit() {
    let (path, mut json) = exported_json("far_bookmark.json", 4, &["save home"]);
    json["bookmarks"]["home"]["x"] = serde_json::json!(1e6);
    std::fs::write(&path, serde_json::to_string(&json).unwrap()).unwrap();

    let err = Session::import(&path, Limits::default()).err().unwrap();
    std::fs::remove_file(&path).ok();

    match err {
        Error::InvalidParameter(msg) => assert!(msg.contains("home"), "{}", msg),
        other => panic!("expected InvalidParameter, got {:?}", other),
    }
}
