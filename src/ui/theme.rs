use ratatui::style::Color;

use crate::report::category::{Category, Movement};

pub const BORDER: Color = Color::Cyan;

pub fn count_color(count: usize) -> Color {
    match count {
        0 => Color::DarkGray,
        1..=9 => Color::White,
        10..=49 => Color::Yellow,
        _ => Color::Red,
    }
}

pub fn movement_color(movement: &Movement) -> Color {
    match movement {
        Movement::LeftFrom(_) => Color::Gray,
        Movement::Created(category) | Movement::MovedInto(category) => match category {
            Category::Done => Color::Green,
            Category::WaitingToFix => Color::Red,
            Category::Todo | Category::Doing | Category::Review => Color::Cyan,
        },
    }
}
