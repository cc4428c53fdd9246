//! Text commands standing in for the tray menu

use anyhow::{Context, bail};
use snapocr_types::{ActivationSource, AppEvent, Point, Rectangle, UiEvent};

/// Pointer events for dragging out `rect`, followed by Enter
pub fn drag_events(rect: Rectangle) -> Vec<AppEvent> {
    let from = Point::new(rect.left(), rect.top());
    let to = Point::new(rect.right(), rect.bottom());
    vec![
        AppEvent::Ui(UiEvent::PointerDown(from)),
        AppEvent::Ui(UiEvent::PointerDrag(to)),
        AppEvent::Ui(UiEvent::PointerUp(to)),
        AppEvent::Ui(UiEvent::Confirm),
    ]
}

/// Parse `L,T,R,B` (commas or whitespace)
pub fn parse_region(value: &str) -> anyhow::Result<Rectangle> {
    let coords = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>()
                .with_context(|| format!("'{part}' is not a coordinate"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    match coords.as_slice() {
        [left, top, right, bottom] => Ok(Rectangle::new(*left, *top, *right, *bottom)),
        _ => bail!("expected four coordinates L,T,R,B, got {}", coords.len()),
    }
}

/// One line of input to the events it stands for
pub fn parse_command(line: &str) -> anyhow::Result<Vec<AppEvent>> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    let events = match word.to_lowercase().as_str() {
        "" => vec![],
        "capture" | "c" => vec![AppEvent::Activate(ActivationSource::Command)],
        "status" => vec![AppEvent::ShowStatus],
        "confirm" | "enter" => vec![AppEvent::Ui(UiEvent::Confirm)],
        "cancel" | "esc" => vec![AppEvent::Ui(UiEvent::Cancel)],
        "quit" | "exit" => vec![AppEvent::Quit],
        "select" => {
            let rect = parse_region(rest)?;
            let mut events = drag_events(rect);
            events.pop();
            events
        }
        other => bail!("unknown command '{other}' (capture, select L T R B, confirm, cancel, status, quit)"),
    };

    Ok(events)
}
