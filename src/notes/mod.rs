use crate::models::{Note, Position, Size};

pub(crate) const NEW_NOTE_TEXT: &str = "New note";

const SPAWN_X: (f64, f64) = (100.0, 300.0);
const SPAWN_Y: (f64, f64) = (200.0, 400.0);

/// Builds a note at a random spot of the spawn box. `rx`/`ry` are unit samples in `[0, 1)`.
pub(crate) fn new_note(now_ms: i64, rx: f64, ry: f64) -> Note {
    let lerp = |(lo, hi): (f64, f64), t: f64| lo + (hi - lo) * t.clamp(0.0, 1.0);
    Note {
        id: format!("note-{now_ms}"),
        text: NEW_NOTE_TEXT.to_string(),
        position: Position {
            x: lerp(SPAWN_X, rx),
            y: lerp(SPAWN_Y, ry),
        },
    }
}

/// Appends a note, keeping ids unique even when two are added within the same millisecond.
pub(crate) fn add_note(notes: &mut Vec<Note>, mut note: Note) {
    let base = note.id.clone();
    let mut n = 1;
    while notes.iter().any(|x| x.id == note.id) {
        note.id = format!("{base}-{n}");
        n += 1;
    }
    notes.push(note);
}

pub(crate) fn remove_note(notes: &mut Vec<Note>, id: &str) -> bool {
    let before = notes.len();
    notes.retain(|n| n.id != id);
    notes.len() != before
}

pub(crate) fn remove_last_note(notes: &mut Vec<Note>) -> Option<Note> {
    notes.pop()
}

pub(crate) fn update_note_text(notes: &mut [Note], id: &str, text: &str) -> bool {
    match notes.iter_mut().find(|n| n.id == id) {
        Some(n) => {
            n.text = text.to_string();
            true
        }
        None => false,
    }
}

pub(crate) fn update_note_position(notes: &mut [Note], id: &str, position: Position) -> bool {
    match notes.iter_mut().find(|n| n.id == id) {
        Some(n) => {
            n.position = position;
            true
        }
        None => false,
    }
}

/// Keeps a note of size `note` fully inside `container`. Oversized notes pin to the origin.
pub(crate) fn clamp_position(desired: Position, container: Size, note: Size) -> Position {
    let max_x = (container.width - note.width).max(0.0);
    let max_y = (container.height - note.height).max(0.0);
    Position {
        x: desired.x.clamp(0.0, max_x),
        y: desired.y.clamp(0.0, max_y),
    }
}

/// Pointer offset captured on mouse-down; positions are relative to the parent's origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DragSession {
    offset: Position,
}

impl DragSession {
    /// `pointer` and `note_origin` are in the same (parent-relative) coordinates.
    pub fn start(pointer: Position, note_origin: Position) -> Self {
        Self {
            offset: Position {
                x: pointer.x - note_origin.x,
                y: pointer.y - note_origin.y,
            },
        }
    }

    pub fn move_to(&self, pointer: Position, container: Size, note: Size) -> Position {
        clamp_position(
            Position {
                x: pointer.x - self.offset.x,
                y: pointer.y - self.offset.y,
            },
            container,
            note,
        )
    }
}
