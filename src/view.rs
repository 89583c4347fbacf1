//! Card rendering rules and plain-text output for the terminal

use crate::card::{LaunchCard, LaunchControl};
use crate::descriptor::ModelDescriptor;

/// Height in pixels of one rendered text row
const ROW_HEIGHT: u32 = 30;

/// Chip labels for a descriptor, in render order
///
/// Every language tag gets a chip, "Cached" appears iff the descriptor is
/// cached, and "Deleted" appears iff a custom registration was deleted.
pub fn chip_labels(descriptor: &ModelDescriptor, is_custom: bool, deleted: bool) -> Vec<String> {
    let mut chips: Vec<String> = descriptor.language.clone();
    if descriptor.is_cached {
        chips.push("Cached".to_string());
    }
    if is_custom && deleted {
        chips.push("Deleted".to_string());
    }
    chips
}

/// Chip row, e.g. `[en] [zh] [Cached]`
pub fn chip_row(chips: &[String]) -> String {
    chips
        .iter()
        .map(|chip| format!("[{}]", chip))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render one card as fixed-height text lines
///
/// The line budget comes from the card height option, so every card in a
/// listing prints the same number of rows.
pub async fn card_lines(card: &LaunchCard) -> Vec<String> {
    let rows = (card.card_height() / ROW_HEIGHT).max(1) as usize;
    let mut lines = Vec::with_capacity(rows);

    lines.push(card.descriptor().model_name.clone());

    let chips = card.chips().await;
    if !chips.is_empty() {
        lines.push(chip_row(&chips));
    }

    for (label, value) in card.stat_entries() {
        if let Some(value) = value {
            lines.push(format!("{}: {}", label, value));
        }
    }

    if card.launch_control() == LaunchControl::Busy {
        lines.push("(busy)".to_string());
    }

    lines.truncate(rows);
    while lines.len() < rows {
        lines.push(String::new());
    }
    lines
}
