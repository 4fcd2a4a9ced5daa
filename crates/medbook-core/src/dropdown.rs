//! Single-select dropdown with roving keyboard focus.
//!
//! The option list is always `[placeholder, ...options]`. Picking the
//! placeholder clears the selection.
//!
//! ```text
//! Closed --click / Enter / Space / ArrowDown--> Open
//! Open   --click / Enter / Space on option-----> Closed  (Selected)
//! Open   --Escape / outside click--------------> Closed
//! ```

use crate::dismiss::{DismissGuard, DismissListeners, ListenerId};
use crate::input::Key;

/// Open/closed state; the highlight only exists while open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownState {
    Closed,
    Open { highlighted: usize },
}

/// Element holding keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Header,
    Option(usize),
}

/// Input delivered to the dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownInput {
    HeaderClick,
    HeaderKey(Key),
    OptionClick(usize),
    /// Key pressed while an option holds focus.
    OptionKey(Key),
    /// Outside click or window-level Escape routed from the dismiss listeners.
    Dismiss,
}

/// Output for the owner to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropdownEvent {
    /// An option was picked; `None` for the placeholder.
    Selected(Option<String>),
}

#[derive(Debug)]
pub struct Dropdown {
    name: &'static str,
    /// Placeholder first, then the provided options.
    items: Vec<String>,
    selected: Option<String>,
    state: DropdownState,
    focus: Focus,
    listeners: DismissListeners,
    dismiss: Option<DismissGuard>,
}

impl Dropdown {
    pub fn new(
        name: &'static str,
        placeholder: impl Into<String>,
        options: impl IntoIterator<Item = String>,
        listeners: DismissListeners,
    ) -> Self {
        let mut items = vec![placeholder.into()];
        items.extend(options);
        Self {
            name,
            items,
            selected: None,
            state: DropdownState::Closed,
            focus: Focus::Header,
            listeners,
            dismiss: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn placeholder(&self) -> &str {
        &self.items[0]
    }

    /// All rows including the placeholder.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Header text: the selection, or the placeholder.
    pub fn label(&self) -> &str {
        self.selected.as_deref().unwrap_or(self.placeholder())
    }

    pub fn state(&self) -> DropdownState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, DropdownState::Open { .. })
    }

    pub fn highlighted(&self) -> Option<usize> {
        match self.state {
            DropdownState::Open { highlighted } => Some(highlighted),
            DropdownState::Closed => None,
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Whether `id` is this dropdown's dismiss listener.
    pub fn listens_on(&self, id: ListenerId) -> bool {
        self.dismiss.as_ref().is_some_and(|guard| guard.id() == id)
    }

    /// Set the selection without going through the list (e.g. restoring a
    /// saved filter). Values that are not options clear the selection.
    pub fn set_selected(&mut self, value: Option<&str>) {
        self.selected = value
            .and_then(|value| self.items.iter().skip(1).find(|item| *item == value))
            .cloned();
    }

    pub fn handle(&mut self, input: DropdownInput) -> Option<DropdownEvent> {
        match (self.state, input) {
            (DropdownState::Closed, DropdownInput::HeaderClick) => {
                self.open();
                None
            }
            (DropdownState::Open { .. }, DropdownInput::HeaderClick) => {
                self.close();
                None
            }
            (DropdownState::Closed, DropdownInput::HeaderKey(key))
                if key == Key::ArrowDown || key.is_activation() =>
            {
                self.open();
                None
            }
            (DropdownState::Open { .. }, DropdownInput::HeaderKey(key)) if key.is_activation() => {
                self.close();
                None
            }
            (DropdownState::Open { .. }, DropdownInput::OptionClick(index)) => self.select(index),
            (DropdownState::Open { highlighted }, DropdownInput::OptionKey(key)) => match key {
                Key::ArrowDown => {
                    self.highlight(self.step(highlighted, 1));
                    None
                }
                Key::ArrowUp => {
                    self.highlight(self.step(highlighted, -1));
                    None
                }
                Key::Enter | Key::Space => self.select(highlighted),
                Key::Escape => {
                    self.close();
                    None
                }
                Key::Other => None,
            },
            (DropdownState::Open { .. }, DropdownInput::Dismiss) => {
                self.close();
                None
            }
            _ => None,
        }
    }

    /// Circular step over all rows: `(idx + delta + n) % n`.
    fn step(&self, index: usize, delta: isize) -> usize {
        let len = self.items.len() as isize;
        ((index as isize + delta + len) % len) as usize
    }

    fn open(&mut self) {
        let start = self
            .selected
            .as_ref()
            .and_then(|selected| self.items.iter().position(|item| item == selected))
            .unwrap_or(0);
        self.dismiss = Some(self.listeners.attach(self.name));
        self.highlight(start);
        tracing::debug!(dropdown = self.name, highlighted = start, "dropdown opened");
    }

    fn highlight(&mut self, index: usize) {
        self.state = DropdownState::Open { highlighted: index };
        self.focus = Focus::Option(index);
    }

    fn close(&mut self) {
        self.state = DropdownState::Closed;
        self.focus = Focus::Header;
        self.dismiss = None;
        tracing::debug!(dropdown = self.name, "dropdown closed");
    }

    fn select(&mut self, index: usize) -> Option<DropdownEvent> {
        let item = self.items.get(index)?.clone();
        self.close();
        self.selected = (index != 0).then_some(item);
        tracing::debug!(dropdown = self.name, selected = ?self.selected, "option selected");
        Some(DropdownEvent::Selected(self.selected.clone()))
    }
}
