//! Closed set of event color tags and their presentation table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CalendarError;
use crate::locale::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Sky,
    Indigo,
    Yellow,
    Green,
    Red,
}

/// How one tag is painted: chip classes for the web grid, an SGR code for the
/// terminal, and the category label shown on its filter toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub chip_class: &'static str,
    pub swatch_class: &'static str,
    pub ansi: &'static str,
    pub hex: &'static str,
    pub label_en: &'static str,
    pub label_ko: &'static str,
}

const SKY: Presentation = Presentation {
    chip_class: "text-white bg-sky-500",
    swatch_class: "bg-sky-500",
    ansi: "36",
    hex: "#0ea5e9",
    label_en: "Meeting rooms",
    label_ko: "회의실 예약",
};

const INDIGO: Presentation = Presentation {
    chip_class: "text-white bg-violet-500",
    swatch_class: "bg-violet-500",
    ansi: "35",
    hex: "#8b5cf6",
    label_en: "Business trips",
    label_ko: "출장자 조회",
};

const YELLOW: Presentation = Presentation {
    chip_class: "text-white bg-yellow-500",
    swatch_class: "bg-yellow-500",
    ansi: "33",
    hex: "#eab308",
    label_en: "Part leaders",
    label_ko: "파트장 일정",
};

const GREEN: Presentation = Presentation {
    chip_class: "text-white bg-green-500",
    swatch_class: "bg-green-500",
    ansi: "32",
    hex: "#22c55e",
    label_en: "Vehicles",
    label_ko: "차량 예약",
};

const RED: Presentation = Presentation {
    chip_class: "text-white bg-red-500",
    swatch_class: "bg-red-500",
    ansi: "31",
    hex: "#ef4444",
    label_en: "Group leaders",
    label_ko: "그룹장 일정",
};

impl ColorTag {
    pub const ALL: [ColorTag; 5] = [
        ColorTag::Sky,
        ColorTag::Indigo,
        ColorTag::Yellow,
        ColorTag::Green,
        ColorTag::Red,
    ];

    #[must_use]
    pub fn as_key(self) -> &'static str {
        match self {
            ColorTag::Sky => "sky",
            ColorTag::Indigo => "indigo",
            ColorTag::Yellow => "yellow",
            ColorTag::Green => "green",
            ColorTag::Red => "red",
        }
    }

    #[must_use]
    pub fn from_key(raw: &str) -> Option<Self> {
        let key = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|tag| tag.as_key() == key)
    }

    #[must_use]
    pub fn presentation(self) -> &'static Presentation {
        match self {
            ColorTag::Sky => &SKY,
            ColorTag::Indigo => &INDIGO,
            ColorTag::Yellow => &YELLOW,
            ColorTag::Green => &GREEN,
            ColorTag::Red => &RED,
        }
    }

    #[must_use]
    pub fn category_label(self, locale: Locale) -> &'static str {
        let presentation = self.presentation();
        match locale {
            Locale::En => presentation.label_en,
            Locale::Ko => presentation.label_ko,
        }
    }
}

impl FromStr for ColorTag {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| CalendarError::UnknownColorTag(s.trim().to_string()))
    }
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_parse_case_insensitively() {
        assert_eq!("Sky".parse::<ColorTag>(), Ok(ColorTag::Sky));
        assert_eq!(" red ".parse::<ColorTag>(), Ok(ColorTag::Red));
    }

    #[test]
    fn unknown_tags_are_rejected() {
        assert_eq!(
            "purple".parse::<ColorTag>(),
            Err(CalendarError::UnknownColorTag("purple".to_string()))
        );
    }

    #[test]
    fn indigo_renders_as_violet() {
        assert_eq!(ColorTag::Indigo.presentation().chip_class, "text-white bg-violet-500");
    }
}
