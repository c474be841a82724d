// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Locale-keyed dialogue texts, category synonyms, and keyboard layouts.
//!
//! All user-visible strings live here, so the dialogue engine itself stays
//! locale-agnostic. The `ru` set reproduces the deployed hospital texts;
//! `en` is the default.

use std::collections::BTreeMap;

use carelink_core::types::{
    ButtonAction, FeedbackCategory, InlineButton, Keyboard, Locale,
};

/// Dialogue text table for one locale.
#[derive(Debug, Clone, Copy)]
pub struct Texts {
    locale: Locale,
}

impl Texts {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Maps free text onto a category: a numeric code or a synonym token,
    /// case- and whitespace-insensitive.
    pub fn match_category(&self, text: &str) -> Option<FeedbackCategory> {
        let token = text.trim().to_lowercase();
        match self.locale {
            Locale::En => match token.as_str() {
                "1" | "complaint" => Some(FeedbackCategory::Complaint),
                "2" | "review" => Some(FeedbackCategory::Review),
                _ => None,
            },
            Locale::Ru => match token.as_str() {
                "1" | "жалоба" | "complaint" => Some(FeedbackCategory::Complaint),
                "2" | "отзыв" | "review" => Some(FeedbackCategory::Review),
                _ => None,
            },
        }
    }

    /// Category prompt shown on `/start`.
    pub fn welcome(&self) -> &'static str {
        match self.locale {
            Locale::En => {
                "🏥 Welcome to the hospital feedback system!\n\n\
                 Please choose the type of your submission:"
            }
            Locale::Ru => {
                "🏥 Добро пожаловать в систему обратной связи больницы!\n\n\
                 Пожалуйста, выберите тип вашего обращения:"
            }
        }
    }

    /// Re-prompt shown when the typed category is not recognized.
    pub fn category_guidance(&self) -> &'static str {
        match self.locale {
            Locale::En => "Please choose the submission type using the buttons below:",
            Locale::Ru => "Пожалуйста, выберите тип обращения, используя кнопки ниже:",
        }
    }

    /// "Describe it" prompt shown once a category is chosen.
    pub fn describe_prompt(&self, category: FeedbackCategory) -> &'static str {
        match (self.locale, category) {
            (Locale::En, FeedbackCategory::Complaint) => {
                "📝 Please describe your complaint in detail. We will look into it as soon as possible."
            }
            (Locale::En, FeedbackCategory::Review) => {
                "📝 Please share your impressions of the hospital."
            }
            (Locale::Ru, FeedbackCategory::Complaint) => {
                "📝 Пожалуйста, опишите вашу жалобу подробно. Мы рассмотрим её в кратчайшие сроки."
            }
            (Locale::Ru, FeedbackCategory::Review) => {
                "📝 Пожалуйста, поделитесь вашими впечатлениями о работе больницы."
            }
        }
    }

    pub fn help(&self) -> &'static str {
        match self.locale {
            Locale::En => {
                "🤖 How to use this bot:\n\n\
                 📝 <b>Submissions:</b>\n\
                 • Complaint — for problems with the quality of care\n\
                 • Review — for positive impressions\n\n\
                 📋 <b>Commands:</b>\n\
                 /start — Start a new submission\n\
                 /help — Show this help\n\
                 /menu — Main menu\n\
                 /stats — Submission statistics (administrators only)\n\n\
                 💡 <b>Steps:</b>\n\
                 1. Choose the submission type\n\
                 2. Describe your problem or impression\n\
                 3. Send the message\n\n\
                 ✅ Every submission is handled as soon as possible."
            }
            Locale::Ru => {
                "🤖 Справка по использованию бота:\n\n\
                 📝 <b>Отправка обращений:</b>\n\
                 • Жалоба — для претензий к качеству обслуживания\n\
                 • Отзыв — для положительных впечатлений\n\n\
                 📋 <b>Команды:</b>\n\
                 /start — Начать работу с ботом\n\
                 /help — Показать эту справку\n\
                 /menu — Главное меню\n\
                 /stats — Статистика обращений (только для администраторов)\n\n\
                 💡 <b>Как использовать:</b>\n\
                 1. Выберите тип обращения\n\
                 2. Опишите вашу проблему или впечатление\n\
                 3. Отправьте сообщение\n\n\
                 ✅ Все обращения обрабатываются в кратчайшие сроки."
            }
        }
    }

    pub fn main_menu(&self) -> &'static str {
        match self.locale {
            Locale::En => {
                "🏥 Hospital feedback system — main menu\n\nChoose an action:"
            }
            Locale::Ru => {
                "🏥 Главное меню системы обратной связи больницы\n\nВыберите действие:"
            }
        }
    }

    pub fn unknown_command(&self) -> &'static str {
        match self.locale {
            Locale::En => "Unknown command. Use /help for a list of commands.",
            Locale::Ru => "Неизвестная команда. Используйте /help для получения справки.",
        }
    }

    pub fn stats_denied(&self) -> &'static str {
        match self.locale {
            Locale::En => "⛔ You are not allowed to view statistics.",
            Locale::Ru => "⛔ У вас нет прав для просмотра статистики.",
        }
    }

    pub fn stats_failed(&self) -> &'static str {
        match self.locale {
            Locale::En => "❌ Failed to fetch statistics.",
            Locale::Ru => "❌ Ошибка при получении статистики.",
        }
    }

    pub fn save_failed(&self) -> &'static str {
        match self.locale {
            Locale::En => {
                "❌ Something went wrong while saving your submission. Please try again later."
            }
            Locale::Ru => {
                "❌ Произошла ошибка при сохранении вашего обращения. Пожалуйста, попробуйте позже."
            }
        }
    }

    /// Category-specific confirmation after a successful submission.
    pub fn confirmation(&self, category: FeedbackCategory, attachment_count: usize) -> String {
        let mut text = match self.locale {
            Locale::En => {
                let mut t = String::from("✅ Thank you! Your submission has been received.");
                t.push_str(match category {
                    FeedbackCategory::Complaint => {
                        "\n\nWe will review your complaint and take the necessary steps."
                    }
                    FeedbackCategory::Review => "\n\nYour review means a lot to us!",
                });
                t
            }
            Locale::Ru => {
                let mut t = String::from("✅ Спасибо! Ваше обращение успешно отправлено.");
                t.push_str(match category {
                    FeedbackCategory::Complaint => {
                        "\n\nМы рассмотрим вашу жалобу и примем необходимые меры."
                    }
                    FeedbackCategory::Review => "\n\nВаш отзыв очень важен для нас!",
                });
                t
            }
        };

        if attachment_count > 0 {
            text.push_str(&match self.locale {
                Locale::En => format!("\n\n📎 Attached files: {attachment_count}"),
                Locale::Ru => format!("\n\n📎 Прикреплено файлов: {attachment_count}"),
            });
        }

        text.push_str(match self.locale {
            Locale::En => "\n\nWould you like to send another submission?",
            Locale::Ru => "\n\nХотите отправить еще одно обращение?",
        });

        text
    }

    /// Aggregate statistics rendering. Absent categories display as zero.
    pub fn stats(&self, counts: &BTreeMap<FeedbackCategory, u64>) -> String {
        let complaints = counts.get(&FeedbackCategory::Complaint).copied().unwrap_or(0);
        let reviews = counts.get(&FeedbackCategory::Review).copied().unwrap_or(0);
        let total = complaints + reviews;
        match self.locale {
            Locale::En => format!(
                "📊 <b>Submission statistics:</b>\n\n\
                 📝 Complaints: {complaints}\n\
                 ⭐ Reviews: {reviews}\n\
                 📈 Total: {total}"
            ),
            Locale::Ru => format!(
                "📊 <b>Статистика обращений:</b>\n\n\
                 📝 Жалобы: {complaints}\n\
                 ⭐ Отзывы: {reviews}\n\
                 📈 Всего: {total}"
            ),
        }
    }

    fn label(&self, action: ButtonAction) -> String {
        let label = match (self.locale, action) {
            (Locale::En, ButtonAction::Complaint) => "📝 Complaint",
            (Locale::En, ButtonAction::Review) => "⭐ Review",
            (Locale::En, ButtonAction::Help) => "❓ Help",
            (Locale::En, ButtonAction::MainMenu) => "🏥 New submission",
            (Locale::Ru, ButtonAction::Complaint) => "📝 Жалоба",
            (Locale::Ru, ButtonAction::Review) => "⭐ Отзыв",
            (Locale::Ru, ButtonAction::Help) => "❓ Помощь",
            (Locale::Ru, ButtonAction::MainMenu) => "🏥 Новое обращение",
        };
        label.to_string()
    }

    fn button(&self, action: ButtonAction) -> InlineButton {
        InlineButton {
            label: self.label(action),
            action,
        }
    }

    /// Category selection keyboard: complaint, review, help.
    pub fn category_keyboard(&self) -> Keyboard {
        Keyboard::new(vec![
            self.button(ButtonAction::Complaint),
            self.button(ButtonAction::Review),
            self.button(ButtonAction::Help),
        ])
    }

    /// Post-submission keyboard: start another submission, help.
    pub fn post_submit_keyboard(&self) -> Keyboard {
        Keyboard::new(vec![
            self.button(ButtonAction::MainMenu),
            self.button(ButtonAction::Help),
        ])
    }

    /// Single back-to-menu button, appended to help and stats replies.
    pub fn back_keyboard(&self) -> Keyboard {
        Keyboard::new(vec![self.button(ButtonAction::MainMenu)])
    }
}
