use maud::{Markup, Render, html};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Assigned by the record store, never by us.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct StudentId(pub i64);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Self; 3] = [Self::Male, Self::Female, Self::Other];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::Other => "OTHER",
        }
    }
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|gender| gender.as_str() == s.trim())
            .ok_or(())
    }
}

impl Render for Gender {
    fn render_to(&self, buffer: &mut String) {
        buffer.push_str(self.as_str());
    }
}

/// A persisted record, as returned by the store's list operation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub gender: Gender,
}

/// The editable part of a student, and the whole of a create payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StudentFields {
    pub name: String,
    pub email: String,
    pub gender: Gender,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StudentUpdate {
    pub id: StudentId,
    #[serde(flatten)]
    pub fields: StudentFields,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FieldViolation {
    pub default_message: String,
}

/// Body of a rejected request. `errors` is only present for validation failures.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Option<Vec<FieldViolation>>,
}

impl ApiErrorBody {
    pub fn summary(&self) -> &str {
        &self.message
    }

    /// Neither a message nor any field violations to show.
    pub fn is_blank(&self) -> bool {
        self.message.is_empty() && self.errors.as_ref().is_none_or(Vec::is_empty)
    }

    /// `message.` followed by every violation's default message, each terminated by `;`.
    pub fn detailed(&self) -> String {
        let mut msg = format!("{}.", self.message);
        for violation in self.errors.iter().flatten() {
            msg.push_str(&violation.default_message);
            msg.push(';');
        }
        msg
    }
}

/// Initials for the avatar column: first character, plus the name's last character when
/// there is more than one word.
pub fn initials(name: &str) -> Option<String> {
    let trimmed = name.trim();
    let mut chars = trimmed.chars();
    let first = chars.next()?;

    if trimmed.split(' ').count() == 1 {
        return Some(first.to_string());
    }

    let last = trimmed.chars().next_back()?;
    Some(format!("{first}{last}"))
}

pub struct Avatar<'a>(pub &'a str);

impl Render for Avatar<'_> {
    fn render(&self) -> Markup {
        html! {
            span class="inline-flex items-center justify-center w-8 h-8 rounded-full bg-gray-600 text-gray-100 font-semibold" {
                @if let Some(initials) = initials(self.0) {
                    (initials)
                } @else {
                    "?"
                }
            }
        }
    }
}
