//! End-to-end scenarios: upload, select, edit, drag, undo, export.

use sitecanvas_bundle::Rect;
use sitecanvas_common::{Clock, ManualClock, MemoryStore};
use sitecanvas_preview::{ControllerAction, PointerInput, Tool};
use sitecanvas_workspace::VisualEditor;
use std::io::{Cursor, Write};
use std::rc::Rc;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, data) in entries {
        writer.start_file(name.to_string(), options).unwrap();
        writer.write_all(data.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Clock handle shared between the test and the editor
struct SharedClock(Rc<ManualClock>);

impl Clock for SharedClock {
    fn now_ms(&self) -> u64 {
        self.0.now_ms()
    }
}

fn editor_with_clock() -> (VisualEditor, Rc<ManualClock>) {
    let clock = Rc::new(ManualClock::new(1_000));
    let editor = VisualEditor::new(
        Box::new(SharedClock(clock.clone())),
        Box::new(MemoryStore::new()),
    );
    (editor, clock)
}

fn pointer(editor: &VisualEditor, id: &str, x: f64, y: f64) -> PointerInput {
    PointerInput {
        id: id.to_string(),
        x,
        y,
        generation: editor.render_generation(),
    }
}

#[test]
fn upload_renders_tagged_preview() {
    let (mut editor, _clock) = editor_with_clock();
    let bytes = build_zip(&[
        ("index.html", "<div id=\"a\">hi</div>"),
        ("style.css", ".a{color:red}"),
    ]);
    editor.load_archive("site.zip", &bytes).unwrap();

    let project = editor.project().unwrap();
    assert_eq!(project.root_html_path, "index.html");
    assert_eq!(project.files.len(), 2);

    // The preview document carries the identifier and the inlined CSS
    let html = editor.assembled_html();
    assert!(html.contains("data-visual-id=\"el-1\""));
    assert!(html.contains(".a{color:red}"));
    assert!(html.contains("data-visual-style=\"injected\""));
}

#[test]
fn invalid_upload_installs_nothing() {
    let (mut editor, _clock) = editor_with_clock();
    assert!(editor.load_archive("site.zip", b"junk bytes").is_err());
    assert!(!editor.has_project());
    assert_eq!(editor.assembled_html(), "");
}

#[test]
fn style_edit_blur_undo_reverts_background() {
    let (mut editor, clock) = editor_with_clock();
    let bytes = build_zip(&[(
        "index.html",
        "<div style=\"background-color: white\">hi</div>",
    )]);
    editor.load_archive("site.zip", &bytes).unwrap();

    editor.select(Some("el-1"));
    editor
        .update_style("el-1", "background-color", "#ff0000")
        .unwrap();
    assert!(editor.assembled_html().contains("background-color: #ff0000"));
    assert_eq!(
        editor.selected_element().unwrap().style("background-color"),
        Some("#ff0000")
    );

    // Blur the input: the pending edit is committed
    clock.advance(600);
    editor.commit_now("Edit style");

    assert!(editor.undo());
    assert!(editor.can_redo());
    assert!(editor.assembled_html().contains("background-color: white"));
    assert!(!editor.assembled_html().contains("#ff0000"));

    assert!(editor.redo());
    assert!(editor.assembled_html().contains("#ff0000"));
}

#[test]
fn undo_without_blur_flushes_the_pending_edit() {
    let (mut editor, _clock) = editor_with_clock();
    let bytes = build_zip(&[("index.html", "<div>hi</div>")]);
    editor.load_archive("site.zip", &bytes).unwrap();

    editor.select(Some("el-1"));
    editor.update_style("el-1", "color", "red").unwrap();

    // Undo immediately: the in-flight edit lands in history first
    assert!(editor.undo());
    assert!(!editor.assembled_html().contains("color: red"));
    assert!(editor.can_redo());
    assert!(editor.redo());
    assert!(editor.assembled_html().contains("color: red"));
}

#[test]
fn debounced_drag_commit_fires_on_tick() {
    let (mut editor, clock) = editor_with_clock();
    let bytes = build_zip(&[(
        "index.html",
        "<div style=\"position: absolute; left: 10px; top: 10px\">a</div>",
    )]);
    editor.load_archive("site.zip", &bytes).unwrap();
    editor.set_element_bounds("el-1", Rect::new(10.0, 10.0, 20.0, 20.0));

    let down = pointer(&editor, "el-1", 10.0, 10.0);
    editor.pointer_down(&down);
    let moved = pointer(&editor, "el-1", 40.0, 10.0);
    editor.pointer_move(&moved).unwrap();
    let up = pointer(&editor, "el-1", 40.0, 10.0);
    editor.pointer_up(&up);

    // Before the quiet period: nothing committed beyond the load entry
    editor.tick();
    assert!(!editor.can_undo());

    clock.advance(600);
    editor.tick();
    assert!(editor.can_undo());

    let events = editor.drain_events();
    assert!(events.iter().any(|event| matches!(
        event,
        sitecanvas_editor::EditorEvent::HistorySaved { label } if label == "Move element"
    )));
}

#[test]
fn drag_snaps_to_sibling_edge() {
    let (mut editor, _clock) = editor_with_clock();
    let bytes = build_zip(&[(
        "index.html",
        "<div style=\"position: absolute; left: 10px; top: 10px\">a</div>\
         <div style=\"position: absolute; left: 50px; top: 200px\">b</div>",
    )]);
    editor.load_archive("site.zip", &bytes).unwrap();

    // Host layout feed
    editor.set_element_bounds("el-1", Rect::new(10.0, 10.0, 20.0, 20.0));
    editor.set_element_bounds("el-2", Rect::new(50.0, 200.0, 40.0, 10.0));

    let down = pointer(&editor, "el-1", 10.0, 10.0);
    let actions = editor.pointer_down(&down);
    assert!(matches!(&actions[0], ControllerAction::Select { id } if id == "el-1"));
    assert_eq!(editor.selected_id(), Some("el-1"));

    // Drag toward x=49: the left edge snaps to the sibling's at 50
    let moved = pointer(&editor, "el-1", 49.0, 10.0);
    match editor.pointer_move(&moved).unwrap() {
        ControllerAction::DragMove { left, guides, .. } => {
            assert_eq!(left, 50.0);
            assert_eq!(guides.len(), 1);
        }
        other => panic!("expected DragMove, got {other:?}"),
    }
    assert!(editor.assembled_html().contains("left: 50px"));

    let up = pointer(&editor, "el-1", 49.0, 10.0);
    assert_eq!(
        editor.pointer_up(&up),
        Some(ControllerAction::DragEnd {
            id: "el-1".to_string(),
            moved: true,
        })
    );

    // Undo flushes the pending "Move element" snapshot, then reverts it
    assert!(editor.undo());
    assert!(editor.assembled_html().contains("left: 10px"));
}

#[test]
fn click_without_movement_does_not_commit() {
    let (mut editor, _clock) = editor_with_clock();
    let bytes = build_zip(&[(
        "index.html",
        "<div style=\"position: absolute; left: 10px; top: 10px\">a</div>",
    )]);
    editor.load_archive("site.zip", &bytes).unwrap();
    editor.set_element_bounds("el-1", Rect::new(10.0, 10.0, 20.0, 20.0));

    let down = pointer(&editor, "el-1", 10.0, 10.0);
    editor.pointer_down(&down);
    let up = pointer(&editor, "el-1", 11.0, 10.0);
    assert_eq!(
        editor.pointer_up(&up),
        Some(ControllerAction::DragEnd {
            id: "el-1".to_string(),
            moved: false,
        })
    );

    // Only the load snapshot exists; nothing to undo
    assert!(!editor.undo());
}

#[test]
fn hover_respects_tool_and_selection() {
    let (mut editor, _clock) = editor_with_clock();
    let bytes = build_zip(&[("index.html", "<div>hi</div>")]);
    editor.load_archive("site.zip", &bytes).unwrap();
    editor.set_element_bounds("el-1", Rect::new(5.0, 5.0, 10.0, 10.0));

    let enter = pointer(&editor, "el-1", 0.0, 0.0);
    assert!(matches!(
        editor.pointer_enter(&enter),
        Some(ControllerAction::Hover { .. })
    ));

    editor.select(Some("el-1"));
    assert!(editor.pointer_enter(&enter).is_none());

    editor.select(None);
    editor.set_tool(Tool::Pan);
    assert!(editor.pointer_enter(&enter).is_none());
}

#[test]
fn reorder_layers_is_one_undo_step() {
    let (mut editor, _clock) = editor_with_clock();
    let bytes = build_zip(&[(
        "index.html",
        "<ul><li>one</li><li>two</li><li>three</li></ul>",
    )]);
    editor.load_archive("site.zip", &bytes).unwrap();

    // el-1 is the ul; its items are el-2, el-3, el-4
    editor.reorder_layers("el-1", 0, 2).unwrap();

    let html = editor.assembled_html();
    let one = html.find(">one<").unwrap();
    let two = html.find(">two<").unwrap();
    let three = html.find(">three<").unwrap();
    assert!(two < three && three < one);

    let events = editor.drain_events();
    assert!(events.iter().any(|event| matches!(
        event,
        sitecanvas_editor::EditorEvent::LayersReordered {
            from_index: 0,
            to_index: 2,
            ..
        }
    )));

    // One undo restores the original order entirely
    assert!(editor.undo());
    let html = editor.assembled_html();
    let one = html.find(">one<").unwrap();
    let two = html.find(">two<").unwrap();
    assert!(one < two);
    assert!(!editor.undo());
}

#[test]
fn removing_an_element_clears_selection_and_commits() {
    let (mut editor, _clock) = editor_with_clock();
    let bytes = build_zip(&[("index.html", "<div><span>x</span></div>")]);
    editor.load_archive("site.zip", &bytes).unwrap();

    editor.select(Some("el-2"));
    editor.remove_element("el-2").unwrap();
    assert_eq!(editor.selected_id(), None);
    assert!(!editor.assembled_html().contains("el-2"));

    // Deletion is a single immediate snapshot
    assert!(editor.undo());
    assert!(editor.assembled_html().contains("el-2"));
}

#[test]
fn export_round_trips_after_edits() {
    let (mut editor, _clock) = editor_with_clock();
    let bytes = build_zip(&[
        (
            "index.html",
            "<html><head><link rel=\"stylesheet\" href=\"style.css\"></head><body><div>x</div></body></html>",
        ),
        ("style.css", ".a{color:red}"),
    ]);
    editor.load_archive("site.zip", &bytes).unwrap();

    // html=el-1, head=el-2, link=el-3, body=el-4, div=el-5
    editor.update_style("el-5", "color", "blue").unwrap();
    let exported = editor.export().unwrap();
    assert_eq!(exported.file_name, "site-exported.zip");

    let reimported =
        sitecanvas_archive::process_archive("site-exported.zip", &exported.bytes, 0).unwrap();

    // The stylesheet is untouched and the link is restored with its
    // original attributes, identifier included
    assert_eq!(
        reimported.file("style.css").unwrap().as_text(),
        Some(".a{color:red}")
    );
    let html = reimported.root_file().unwrap().as_text().unwrap();
    assert!(html.contains("<link rel=\"stylesheet\" href=\"style.css\" data-visual-id=\"el-3\">"));
    assert!(!html.contains("data-visual-style"));
    // The live edit survived into the export
    assert!(html.contains("color: blue"));
}

#[test]
fn session_round_trips_through_the_store() {
    let (mut editor, _clock) = editor_with_clock();
    let bytes = build_zip(&[("index.html", "<div>hi</div>")]);

    editor.load_archive("site.zip", &bytes).unwrap();
    editor.set_zoom(2.0);
    editor.select(Some("el-1"));
    editor.save_session();

    // A fresh editor over an empty store has nothing to restore
    let mut empty = VisualEditor::new(
        Box::new(ManualClock::new(10)),
        Box::new(MemoryStore::new()),
    );
    assert!(!empty.restore_session());

    // Restoring from the populated store brings project and canvas back;
    // selection is ephemeral and never persisted
    assert!(editor.restore_session());
    assert_eq!(editor.canvas().scale, 2.0);
    assert!(editor.has_project());
    assert_eq!(editor.selected_id(), None);
}
