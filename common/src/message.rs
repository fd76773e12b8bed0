use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Opaque, store-assigned message identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Decorative bubble colour, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Pink,
    Purple,
    Blue,
    Green,
    Yellow,
    Red,
    Indigo,
    Teal,
}

impl Color {
    pub const PALETTE: [Color; 8] = [
        Color::Pink,
        Color::Purple,
        Color::Blue,
        Color::Green,
        Color::Yellow,
        Color::Red,
        Color::Indigo,
        Color::Teal,
    ];

    /// Pick a palette entry uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::PALETTE[rng.gen_range(0..Self::PALETTE.len())]
    }

    /// Stored tag. Matches the class names already present in the
    /// production collection, so existing documents keep decoding.
    pub fn tag(self) -> &'static str {
        match self {
            Color::Pink => "bg-pink-400",
            Color::Purple => "bg-purple-400",
            Color::Blue => "bg-blue-400",
            Color::Green => "bg-green-400",
            Color::Yellow => "bg-yellow-400",
            Color::Red => "bg-red-400",
            Color::Indigo => "bg-indigo-400",
            Color::Teal => "bg-teal-400",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::PALETTE.into_iter().find(|c| c.tag() == tag)
    }
}

/// A persisted board message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub name: String,
    pub company: String,
    pub email: String,
    pub body: String,
    pub likes: u32,
    pub color: Color,
    /// Assigned by the store when the message is created.
    pub timestamp: DateTime<Utc>,
}

/// A validated message that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDraft {
    pub name: String,
    pub company: String,
    pub email: String,
    pub body: String,
    pub likes: u32,
    pub color: Color,
}

impl MessageDraft {
    /// Attach the store-assigned identity.
    pub fn persisted(self, id: MessageId, timestamp: DateTime<Utc>) -> Message {
        Message {
            id,
            name: self.name,
            company: self.company,
            email: self.email,
            body: self.body,
            likes: self.likes,
            color: self.color,
            timestamp,
        }
    }
}

/// Required fields of the submission form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Company,
    Email,
    Body,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FormField::Name => "name",
            FormField::Company => "company",
            FormField::Email => "email",
            FormField::Body => "message",
        })
    }
}

/// Raw values of the submission form as typed by the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pub name: String,
    pub company: String,
    pub email: String,
    pub body: String,
    /// Only sent to the rephrase service; never persisted.
    pub signature: String,
}

impl FormData {
    fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Company => &self.company,
            FormField::Email => &self.email,
            FormField::Body => &self.body,
        }
    }

    /// Check required fields and the email shape.
    ///
    /// Whitespace-only values count as empty. The email check is the minimal
    /// one the board has always used: it must contain an `@`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for field in [
            FormField::Name,
            FormField::Company,
            FormField::Email,
            FormField::Body,
        ] {
            if self.field(field).trim().is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }
        if !self.email.contains('@') {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }

    /// Validate and turn the form into a draft with zero likes.
    pub fn to_draft(&self, color: Color) -> Result<MessageDraft, ValidationError> {
        self.validate()?;
        Ok(MessageDraft {
            name: self.name.trim().to_string(),
            company: self.company.trim().to_string(),
            email: self.email.trim().to_string(),
            body: self.body.clone(),
            likes: 0,
            color,
        })
    }
}
