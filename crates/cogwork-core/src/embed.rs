//! Reply-embed value types.
//!
//! The core decides *what* to render (color, title, description, footer,
//! extra fields) and hands the platform an inert value. Formatting codes,
//! layout and the actual send are the platform's business.

use serde::{Deserialize, Serialize};

/// Footer line of a reply embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    /// Footer text, e.g. `"Запросил: user#1234"`.
    pub text: String,
    /// Small icon shown next to the text, usually the author's avatar.
    pub icon_url: Option<String>,
}

/// A titled field appended below the embed description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// A reply embed, fully decided and ready for the platform to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyEmbed {
    /// 24-bit RGB color of the embed strip.
    pub color: u32,
    /// Title, already decorated for emphasis.
    pub title: String,
    /// Main body text.
    pub description: String,
    pub footer: Option<EmbedFooter>,
    pub fields: Vec<EmbedField>,
}

impl ReplyEmbed {
    /// Creates an embed with the given body, title and color.
    ///
    /// The title is wrapped in `**…**` for emphasis, matching the reply
    /// convention used everywhere in the dispatcher.
    pub fn new(description: impl Into<String>, title: impl AsRef<str>, color: u32) -> Self {
        Self {
            color,
            title: format!("**{}**", title.as_ref()),
            description: description.into(),
            footer: None,
            fields: Vec::new(),
        }
    }

    /// Attaches a footer line.
    pub fn with_footer(mut self, text: impl Into<String>, icon_url: Option<String>) -> Self {
        self.footer = Some(EmbedFooter {
            text: text.into(),
            icon_url,
        });
        self
    }

    /// Appends a non-inline field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline: false,
        });
        self
    }
}
