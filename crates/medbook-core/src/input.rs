//! Discrete input events delivered by the view layer.

/// Keys the controllers react to. Everything else maps to [`Key::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Space,
    Escape,
    Other,
}

impl Key {
    /// Enter and Space both activate the focused element.
    pub fn is_activation(self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }

    /// Parse a key name as typed in a session script (`down`, `esc`, ...).
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "down" | "arrowdown" => Key::ArrowDown,
            "up" | "arrowup" => Key::ArrowUp,
            "enter" | "return" => Key::Enter,
            "space" | " " => Key::Space,
            "esc" | "escape" => Key::Escape,
            _ => Key::Other,
        }
    }
}

/// Document-level events observed by global listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// A click that landed outside every open overlay.
    OutsideClick,
    /// A key press seen at window level.
    Key(Key),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_names() {
        assert_eq!(Key::from_name("Down"), Key::ArrowDown);
        assert_eq!(Key::from_name("esc"), Key::Escape);
        assert_eq!(Key::from_name("tab"), Key::Other);
        assert!(Key::Space.is_activation());
        assert!(!Key::Escape.is_activation());
    }
}
