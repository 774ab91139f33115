use serde::{Deserialize, Serialize};

/// An RGB color, written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl std::str::FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("'{s}' is not a #RRGGBB color"));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Font decoration contributed by a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontDescription {
    pub bold: bool,
    pub italic: bool,
    pub strikeout: bool,
    /// Font family override.
    pub family: Option<String>,
}

impl FontDescription {
    /// Combine with a lower-priority description.
    ///
    /// Flags accumulate; the family already set here wins over `other`'s.
    pub fn resolve(&self, other: &FontDescription) -> FontDescription {
        FontDescription {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
            strikeout: self.strikeout || other.strikeout,
            family: self.family.clone().or_else(|| other.family.clone()),
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == FontDescription::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_round_trips_through_hex() {
        let c: Color = "#d5fae2".parse().unwrap();
        assert_eq!(c, Color::rgb(0xD5, 0xFA, 0xE2));
        assert_eq!(c.to_string(), "#D5FAE2");
    }

    #[test]
    fn color_rejects_garbage() {
        assert!("#12345".parse::<Color>().is_err());
        assert!("green".parse::<Color>().is_err());
        assert!("#GG0000".parse::<Color>().is_err());
    }

    #[test]
    fn resolve_keeps_first_family_and_ors_flags() {
        let high = FontDescription {
            bold: true,
            family: Some("monospace".into()),
            ..Default::default()
        };
        let low = FontDescription {
            italic: true,
            family: Some("serif".into()),
            ..Default::default()
        };

        let fd = high.resolve(&low);

        assert!(fd.bold && fd.italic && !fd.strikeout);
        assert_eq!(fd.family.as_deref(), Some("monospace"));
    }
}
