//! Line-oriented interactive session.
//!
//! A [`Session`] wires the store, the booking popover and both filter
//! dropdowns together and drives them from text commands, one per line:
//!
//! ```text
//! list                         doctors matching the current filters
//! specialty <value|none>       set the specialty filter
//! time <value|none>            set the availability filter
//! dropdown <specialty|time> <click|down|up|enter|space|escape|pick N>
//! book <id>                    open the booking popover
//! slot <time>                  pick a time in the popover
//! confirm                      submit the booking
//! click-outside | escape       dismiss whatever is open
//! cancel <id>                  cancel the doctor's appointment
//! appointments                 booked appointments
//! popover                      current popover contents
//! state                        store state as JSON
//! reload                       start over from a fresh store
//! ```
//!
//! Every command runs inside the [`Boundary`]; once it falls back, only
//! `reload` is accepted.

use std::cell::Cell;
use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use medbook_core::{
    AnchorRect, AppStore, AppointmentCardView, Boundary, BookingFlow, DismissListeners,
    DoctorCardView, Dropdown, DropdownEvent, DropdownInput, Key, Memo, OpenOutcome, RenderError,
    Rendered, ScrollOffset, Subscription, Throttle, UiEvent, filter,
};
use medbook_model::{Catalog, CatalogError};

use crate::render;
use crate::settings::Settings;

pub const SPECIALTY_PLACEHOLDER: &str = "Filter by specialty";
pub const TIME_PLACEHOLDER: &str = "Filter by availability";

/// Vertical distance between doctor cards, used to anchor the popover.
const CARD_HEIGHT: f64 = 120.0;
const CARD_LEFT: f64 = 16.0;

/// Minimum spacing of the info-level store summaries.
const SUMMARY_INTERVAL: Duration = Duration::from_secs(1);

/// Where the session reads its catalog from, on start and on every reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Builtin,
    File(PathBuf),
}

impl CatalogSource {
    pub fn load(&self) -> Result<Catalog, CatalogError> {
        match self {
            CatalogSource::Builtin => Catalog::builtin(),
            CatalogSource::File(path) => Catalog::load(path),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Which {
    Specialty,
    Time,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    List,
    Specialty(Option<String>),
    Time(Option<String>),
    Dropdown(Which, DropdownAction),
    Book(String),
    Slot(String),
    Confirm,
    Ui(UiEvent),
    Cancel(String),
    Appointments,
    Popover,
    State,
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropdownAction {
    Click,
    Key(Key),
    Pick(usize),
}

fn parse_command(line: &str) -> Result<Command> {
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let argument = |what: &str| -> Result<String> {
        if rest.is_empty() {
            bail!("`{word}` needs {what}");
        }
        Ok(rest.to_string())
    };
    let filter_value = || -> Result<Option<String>> {
        let value = argument("a value or `none`")?;
        Ok((value != "none").then_some(value))
    };

    let command = match word {
        "list" => Command::List,
        "specialty" => Command::Specialty(filter_value()?),
        "time" => Command::Time(filter_value()?),
        "dropdown" => {
            let mut parts = rest.split_whitespace();
            let which = match parts.next() {
                Some("specialty") => Which::Specialty,
                Some("time") => Which::Time,
                other => bail!("unknown dropdown: {}", other.unwrap_or("<none>")),
            };
            let action = match (parts.next(), parts.next()) {
                (Some("click"), None) => DropdownAction::Click,
                (Some("pick"), Some(index)) => DropdownAction::Pick(
                    index
                        .parse()
                        .with_context(|| format!("invalid option index: {index}"))?,
                ),
                (Some(key), None) => match Key::from_name(key) {
                    Key::Other => bail!("unknown dropdown action: {key}"),
                    key => DropdownAction::Key(key),
                },
                _ => bail!("usage: dropdown <specialty|time> <click|down|up|enter|space|escape|pick N>"),
            };
            Command::Dropdown(which, action)
        }
        "book" => Command::Book(argument("a doctor id")?),
        "slot" => Command::Slot(argument("a time")?),
        "confirm" => Command::Confirm,
        "click-outside" => Command::Ui(UiEvent::OutsideClick),
        "escape" => Command::Ui(UiEvent::Key(Key::Escape)),
        "cancel" => Command::Cancel(argument("a doctor id")?),
        "appointments" => Command::Appointments,
        "popover" => Command::Popover,
        "state" => Command::State,
        "reload" => Command::Reload,
        other => return Err(anyhow!("unknown command: {other}")),
    };
    Ok(command)
}

/// Everything a reload throws away.
struct Screen {
    catalog: Catalog,
    store: Rc<AppStore>,
    booking: BookingFlow,
    specialty: Dropdown,
    time: Dropdown,
    /// Ids of the doctors matching the current filters.
    visible: Memo<(Option<String>, Option<String>), Vec<String>>,
    changes: Rc<Cell<usize>>,
    /// Doctors whose portraits were already on screen; they load on first
    /// display.
    shown_photos: HashSet<String>,
    _subscription: Subscription,
}

impl Screen {
    fn new(catalog: Catalog, listeners: &DismissListeners) -> Self {
        let store = AppStore::new();
        let changes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&changes);
        let mut summaries = Throttle::new(SUMMARY_INTERVAL);
        let subscription = store.subscribe(move |state| {
            counter.set(counter.get() + 1);
            tracing::debug!(
                visible = state.visible,
                appointments = state.appointments.len(),
                "state changed"
            );
            if summaries.try_acquire(Instant::now()) {
                tracing::info!(
                    changes = counter.get(),
                    appointments = state.appointments.len(),
                    "store updated"
                );
            }
        });
        let specialty = Dropdown::new(
            "specialty",
            SPECIALTY_PLACEHOLDER,
            catalog.specialties.iter().cloned(),
            listeners.clone(),
        );
        let time = Dropdown::new(
            "time",
            TIME_PLACEHOLDER,
            catalog.availability_times.iter().cloned(),
            listeners.clone(),
        );
        Self {
            catalog,
            store,
            booking: BookingFlow::new(listeners.clone()),
            specialty,
            time,
            visible: Memo::new(),
            changes,
            shown_photos: HashSet::new(),
            _subscription: subscription,
        }
    }
}

pub struct Session {
    source: CatalogSource,
    listeners: DismissListeners,
    boundary: Boundary,
    year: i32,
    width: u16,
    screen: Screen,
    crashed: bool,
}

impl Session {
    pub fn new(source: CatalogSource, settings: &Settings) -> Result<Self, CatalogError> {
        let catalog = source.load()?;
        let listeners = DismissListeners::new();
        let screen = Screen::new(catalog, &listeners);
        Ok(Self {
            source,
            listeners,
            boundary: Boundary::new(settings.display.show_error_details),
            year: settings.display.appointment_year,
            width: settings.display.table_width,
            screen,
            crashed: false,
        })
    }

    pub fn store(&self) -> &Rc<AppStore> {
        &self.screen.store
    }

    pub fn listeners(&self) -> &DismissListeners {
        &self.listeners
    }

    /// Whether the last command fell back to the failure notice.
    pub fn is_crashed(&self) -> bool {
        self.crashed
    }

    /// Number of store notifications since the last reload.
    pub fn change_count(&self) -> usize {
        self.screen.changes.get()
    }

    /// How many times the doctor list was filtered since the last reload.
    pub fn filter_runs(&self) -> usize {
        self.screen.visible.computations()
    }

    /// Run one command line. Blank lines and `#` comments yield `None`.
    pub fn run_line(&mut self, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(error) => return Some(format!("error: {error}")),
        };
        if self.crashed && command != Command::Reload {
            return Some("error: the session failed; run `reload` to start over".to_string());
        }

        tracing::debug!(?command, "running command");
        let boundary = self.boundary;
        let output = match boundary.render(|| self.execute(command)) {
            Rendered::Content(text) => {
                self.crashed = false;
                text
            }
            Rendered::Fallback(notice) => {
                self.crashed = true;
                render::fallback(&notice)
            }
        };
        Some(output)
    }

    /// Feed every line of `input` to the session, writing each output.
    pub fn run_script<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        for line in input.lines() {
            if let Some(output) = self.run_line(&line?) {
                writeln!(out, "{output}")?;
            }
        }
        Ok(())
    }

    fn execute(&mut self, command: Command) -> Result<String, RenderError> {
        match command {
            Command::List => Ok(self.list()),
            Command::Specialty(value) => self.set_filter(Which::Specialty, value),
            Command::Time(value) => self.set_filter(Which::Time, value),
            Command::Dropdown(which, action) => Ok(self.drive_dropdown(which, action)),
            Command::Book(id) => Ok(self.book(&id)),
            Command::Slot(time) => Ok(self.slot(&time)),
            Command::Confirm => Ok(self.confirm()),
            Command::Ui(event) => Ok(self.dispatch_ui(&event)),
            Command::Cancel(id) => Ok(self.cancel(&id)),
            Command::Appointments => Ok(self.appointments()),
            Command::Popover => Ok(self.popover()),
            Command::State => self
                .screen
                .store
                .with_state(|state| serde_json::to_string_pretty(state))
                .map_err(|error| RenderError::Message(error.to_string())),
            Command::Reload => self.reload(),
        }
    }

    fn list(&mut self) -> String {
        let width = self.width;
        let screen = &mut self.screen;
        let deps = (
            screen.specialty.selected().map(str::to_string),
            screen.time.selected().map(str::to_string),
        );
        let catalog = &screen.catalog;
        let ids = screen
            .visible
            .get_or_compute(deps, |(specialty, time)| {
                filter(&catalog.doctors, specialty.as_deref(), time.as_deref())
                    .into_iter()
                    .map(|doctor| doctor.id.clone())
                    .collect()
            })
            .clone();

        let shown = &screen.shown_photos;
        let table = screen.store.with_state(|state| {
            let cards: Vec<DoctorCardView<'_>> = ids
                .iter()
                .filter_map(|id| catalog.doctor(id))
                .map(|doctor| {
                    let mut card = DoctorCardView::new(doctor, state);
                    if shown.contains(&doctor.id) {
                        card.image.mark_loaded();
                    }
                    card
                })
                .collect();
            render::doctors_table(&cards, width)
        });
        screen.shown_photos.extend(ids);
        table
    }

    fn set_filter(&mut self, which: Which, value: Option<String>) -> Result<String, RenderError> {
        let control = self.dropdown_mut(which);
        control.set_selected(value.as_deref());
        if value.is_some() && control.selected().is_none() {
            return Ok(format!(
                "error: unknown {}: {}",
                control.name(),
                value.unwrap_or_default()
            ));
        }
        tracing::info!(filter = control.name(), value = ?control.selected(), "filter set");
        Ok(render::dropdown(control))
    }

    fn drive_dropdown(&mut self, which: Which, action: DropdownAction) -> String {
        let control = self.dropdown_mut(which);
        let input = match action {
            DropdownAction::Click => DropdownInput::HeaderClick,
            DropdownAction::Pick(index) => DropdownInput::OptionClick(index),
            DropdownAction::Key(key) if control.is_open() => DropdownInput::OptionKey(key),
            DropdownAction::Key(key) => DropdownInput::HeaderKey(key),
        };
        if let Some(DropdownEvent::Selected(value)) = control.handle(input) {
            tracing::info!(filter = control.name(), ?value, "filter set");
        }
        render::dropdown(control)
    }

    fn book(&mut self, id: &str) -> String {
        let screen = &mut self.screen;
        let Some(row) = screen.catalog.doctors.iter().position(|doctor| doctor.id == id) else {
            return format!("error: unknown doctor: {id}");
        };
        let doctor = &screen.catalog.doctors[row];
        let anchor = AnchorRect {
            top: row as f64 * CARD_HEIGHT,
            left: CARD_LEFT,
        };
        match screen
            .booking
            .open(&screen.store, doctor, anchor, ScrollOffset::default())
        {
            OpenOutcome::Opened => self.popover(),
            OpenOutcome::Unavailable => format!("{} is not available", doctor.name),
            OpenOutcome::AlreadyBooked => {
                format!("{} already has an appointment", doctor.name)
            }
        }
    }

    fn slot(&mut self, time: &str) -> String {
        let screen = &mut self.screen;
        let state = screen.store.state();
        if !state.visible {
            return "error: no booking in progress".to_string();
        }
        if !screen.booking.select_slot(&state, time) {
            return format!("error: no slot at {time}");
        }
        self.popover()
    }

    fn confirm(&mut self) -> String {
        let screen = &mut self.screen;
        match screen.booking.submit(&screen.store) {
            Some(appointment) => format!(
                "Booked {} on {}",
                appointment.name(),
                appointment.date
            ),
            None if screen.store.with_state(|state| state.visible) => {
                "Pick a time first".to_string()
            }
            None => "error: no booking in progress".to_string(),
        }
    }

    /// Route an outside click or Escape to every open control.
    fn dispatch_ui(&mut self, event: &UiEvent) -> String {
        let screen = &mut self.screen;
        let mut closed = Vec::new();
        for id in self.listeners.route(event) {
            if screen.booking.listens_on(id) {
                screen.booking.dismiss(&screen.store);
                closed.push("booking");
            }
            for control in [&mut screen.specialty, &mut screen.time] {
                if control.listens_on(id) {
                    control.handle(DropdownInput::Dismiss);
                    closed.push(control.name());
                }
            }
        }
        if closed.is_empty() {
            "Nothing to close".to_string()
        } else {
            format!("Closed {}", closed.join(", "))
        }
    }

    fn cancel(&mut self, id: &str) -> String {
        let store = &self.screen.store;
        let Some(name) = store.with_state(|state| {
            state
                .appointment(id)
                .map(|appointment| appointment.name().to_string())
        }) else {
            tracing::debug!(doctor = id, "no appointment to cancel");
            return format!("No appointment with {id}");
        };
        store.cancel_appointment(id);
        tracing::info!(doctor = id, "appointment cancelled");
        format!("Cancelled appointment with {name}")
    }

    fn appointments(&self) -> String {
        let cards: Vec<AppointmentCardView> = self.screen.store.with_state(|state| {
            state
                .appointments
                .iter()
                .filter_map(|appointment| AppointmentCardView::new(Some(appointment), self.year))
                .collect()
        });
        render::appointments_table(&cards, self.width)
    }

    fn popover(&self) -> String {
        let screen = &self.screen;
        screen
            .store
            .with_state(|state| screen.booking.view(state))
            .filter(|view| view.visible)
            .map(|view| render::booking_popover(&view))
            .unwrap_or_else(|| "No booking in progress".to_string())
    }

    fn reload(&mut self) -> Result<String, RenderError> {
        let catalog = self.source.load()?;
        let count = catalog.doctors.len();
        self.screen = Screen::new(catalog, &self.listeners);
        tracing::info!(doctors = count, "session reloaded");
        Ok(format!("Reloaded {count} doctors"))
    }

    fn dropdown_mut(&mut self, which: Which) -> &mut Dropdown {
        match which {
            Which::Specialty => &mut self.screen.specialty,
            Which::Time => &mut self.screen.time,
        }
    }
}
