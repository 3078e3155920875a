use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

const PROFILES_JSON: &str = include_str!("../assets/profiles.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Individual,
    Group,
}

impl Category {
    pub fn badge(self) -> &'static str {
        match self {
            Category::Individual => "👤 Individual",
            Category::Group => "👥 Group",
        }
    }
}

/// One profile in the swipe deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub skills: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Avatar {
    pub id: String,
    pub name: String,
    pub glyph: &'static str,
}

const AVATAR_GLYPHS: [(&str, &str); 3] = [
    ("calm-cat", "🐱"),
    ("focused-fox", "🦊"),
    ("bright-bear", "🐻"),
];

#[derive(Debug, Error)]
pub enum DataError {
    #[error("could not parse profiles: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("profile {index} is invalid: {reason}")]
    InvalidProfile { index: usize, reason: String },

    #[error("no profiles available")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct RawProfile {
    id: String,
    name: String,
    #[serde(rename = "type")]
    category: Category,
    #[serde(default)]
    skills: Vec<String>,
    #[serde(default, alias = "workStyle")]
    work_style: String,
}

/// Cards bundled with the app, in deck order.
pub fn load_profiles() -> Result<Vec<Card>, DataError> {
    parse_profiles(PROFILES_JSON)
}

pub fn parse_profiles(text: &str) -> Result<Vec<Card>, DataError> {
    let raw_profiles: Vec<RawProfile> = serde_json::from_str(text)?;

    if raw_profiles.is_empty() {
        return Err(DataError::Empty);
    }

    let mut seen = HashSet::new();
    let mut cards = Vec::with_capacity(raw_profiles.len());

    for (index, raw) in raw_profiles.into_iter().enumerate() {
        let name = raw.name.trim().to_string();
        if name.is_empty() {
            return Err(DataError::InvalidProfile {
                index,
                reason: "name is empty".to_string(),
            });
        }

        let id = raw.id.trim().to_string();
        if id.is_empty() {
            return Err(DataError::InvalidProfile {
                index,
                reason: "id is empty".to_string(),
            });
        }
        if !seen.insert(id.clone()) {
            return Err(DataError::InvalidProfile {
                index,
                reason: format!("duplicate id '{}'", id),
            });
        }

        let skills = raw
            .skills
            .into_iter()
            .map(|skill| skill.trim().to_string())
            .filter(|skill| !skill.is_empty())
            .collect();

        cards.push(Card {
            id,
            name,
            category: raw.category,
            skills,
            description: raw.work_style.trim().to_string(),
        });
    }

    Ok(cards)
}

pub fn avatar_options() -> Vec<Avatar> {
    AVATAR_GLYPHS
        .iter()
        .map(|&(id, glyph)| Avatar {
            id: id.to_string(),
            name: display_name(id),
            glyph,
        })
        .collect()
}

fn display_name(id: &str) -> String {
    id.split(|c: char| c == '_' || c == '-' || c == ' ')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>()
                    + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
