// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inline keyboard rendering.

use carelink_core::types::Keyboard;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Renders a [`Keyboard`] as a Telegram inline keyboard, one button per row.
pub fn to_markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
        .rows
        .iter()
        .map(|button| {
            vec![InlineKeyboardButton::callback(
                button.label.clone(),
                button.action.callback_data(),
            )]
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}
