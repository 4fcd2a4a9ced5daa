//! Terminal rendering of the doctor list, appointments and popovers.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use medbook_core::{
    AppointmentCardView, BookingView, CardAction, DoctorCardView, Dropdown, EmptyState, Fallback,
    LazyImage,
};

/// Doctor cards as a table, or the empty-state notice.
pub fn doctors_table(cards: &[DoctorCardView<'_>], width: u16) -> String {
    if cards.is_empty() {
        return empty_state(EmptyState::NoDoctors);
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Doctor"),
        header_cell("Photo"),
        header_cell("Specialty"),
        header_cell("Location"),
        header_cell("Rating"),
        header_cell("Status"),
        header_cell("Booking"),
    ]);
    apply_table_style(&mut table, width);
    align_column(&mut table, 5, CellAlignment::Center);
    for card in cards {
        let status = if card.doctor.available {
            Cell::new(card.status).fg(Color::Green)
        } else {
            dim_cell(card.status)
        };
        let action = match card.action {
            CardAction::BookNow => Cell::new("Book Now").add_attribute(Attribute::Bold),
            CardAction::Booked => dim_cell("Booked"),
            CardAction::Hidden => dim_cell("-"),
        };
        table.add_row(vec![
            Cell::new(&card.doctor.id),
            Cell::new(&card.doctor.name),
            photo_cell(&card.image),
            Cell::new(&card.doctor.specialty),
            Cell::new(&card.doctor.location),
            Cell::new(format!("{} {}", card.star_bar(), card.doctor.rate)),
            status,
            action,
        ]);
    }
    table.to_string()
}

/// Booked appointments as a table, or the empty-state notice.
pub fn appointments_table(cards: &[AppointmentCardView], width: u16) -> String {
    if cards.is_empty() {
        return empty_state(EmptyState::NoAppointments);
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Doctor"),
        header_cell("Date"),
        header_cell("Tags"),
        header_cell("Location"),
    ]);
    apply_table_style(&mut table, width);
    for card in cards {
        table.add_row(vec![
            Cell::new(&card.doctor_id),
            Cell::new(&card.name),
            Cell::new(card.display_date()),
            dim_cell(&card.tags),
            Cell::new(&card.location),
        ]);
    }
    table.to_string()
}

/// Single-column option list, as printed by `medbook options`.
pub fn options_table(title: &str, options: &[String], width: u16) -> String {
    let mut table = Table::new();
    table.set_header(vec![header_cell(title)]);
    apply_table_style(&mut table, width);
    for option in options {
        table.add_row(vec![option]);
    }
    table.to_string()
}

pub fn empty_state(state: EmptyState) -> String {
    format!("{}\n{}", state.title(), state.message())
}

/// Booking popover as plain text.
pub fn booking_popover(view: &BookingView) -> String {
    let mut lines = vec![format!(
        "Book {} ({}) at top {}, left {}",
        view.doctor_name, view.status, view.position.top, view.position.left
    )];
    for slot in &view.slots {
        let marker = if slot.selected { "(x)" } else { "( )" };
        lines.push(format!("  {marker} {} - {}", slot.time, slot.date));
    }
    let confirm = if view.can_confirm {
        "[Confirm]"
    } else {
        "[Confirm] (pick a time first)"
    };
    lines.push(format!("  {confirm}"));
    lines.join("\n")
}

/// Dropdown header, plus the option rows while open.
///
/// The highlighted row is marked with `>`, the selected one with `*`.
pub fn dropdown(control: &Dropdown) -> String {
    let arrow = if control.is_open() { "▲" } else { "▼" };
    let mut lines = vec![format!("[{} {arrow}]", control.label())];
    if let Some(highlighted) = control.highlighted() {
        for (index, item) in control.items().iter().enumerate() {
            let cursor = if index == highlighted { '>' } else { ' ' };
            let selected = if index > 0 && control.selected() == Some(item.as_str()) {
                '*'
            } else {
                ' '
            };
            lines.push(format!(" {cursor}{selected} {item}"));
        }
    }
    lines.join("\n")
}

pub fn fallback(notice: &Fallback) -> String {
    let mut lines = vec![
        notice.title.to_string(),
        notice.message.to_string(),
        format!("[{}]", notice.action),
    ];
    if let Some(details) = &notice.details {
        lines.push(format!("details: {details}"));
    }
    lines.join("\n")
}

/// Portrait status: the URL once loaded, a placeholder marker before.
fn photo_cell(image: &LazyImage) -> Cell {
    if image.is_loaded() {
        dim_cell(image.current_src())
    } else {
        dim_cell("loading")
    }
}

fn apply_table_style(table: &mut Table, width: u16) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(width);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
