use crate::geometry::Point;

/// Events consumed by the UI context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Activate(ActivationSource),
    Ui(UiEvent),
    ShowStatus,
    Quit,
}

/// Low-level overlay input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    PointerDown(Point),
    PointerDrag(Point),
    PointerUp(Point),
    /// Enter
    Confirm,
    /// Escape
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationSource {
    Hotkey,
    Tray,
    Command,
}
