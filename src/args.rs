use std::io::{self, Read};
use std::str::FromStr;

use anyhow::Context;

/// A type for clap argument parsing that supports reading the payload
/// from stdin when the value is "-" and allows escaping "-" with "\-".
#[derive(Debug, Clone, Default)]
pub struct StringInput(pub String);

impl FromStr for StringInput {
    type Err = std::io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            // Shell pipelines almost always end with a newline that nobody
            // meant to encode into the symbol.
            if buffer.ends_with('\n') {
                buffer.pop();
                if buffer.ends_with('\r') {
                    buffer.pop();
                }
            }
            Ok(StringInput(buffer))
        } else if s == r"\-" {
            Ok(StringInput("-".to_string()))
        } else {
            Ok(StringInput(s.to_string()))
        }
    }
}

impl AsRef<str> for StringInput {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StringInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A CSS color accepted in any notation csscolorparser understands,
/// normalized to its hex form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexColor(pub String);

impl FromStr for HexColor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_color(s).map(HexColor)
    }
}

impl std::fmt::Display for HexColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn normalize_color(value: &str) -> anyhow::Result<String> {
    let color = value
        .trim()
        .parse::<csscolorparser::Color>()
        .with_context(|| format!("Failed to parse color {value:?}"))?;

    Ok(color.to_css_hex())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escaped_dash() {
        let input: StringInput = r"\-".parse().unwrap();
        assert_eq!(input.as_ref(), "-");
    }

    #[test]
    fn test_plain_value() {
        let input: StringInput = "https://example.com".parse().unwrap();
        assert_eq!(input.to_string(), "https://example.com");
    }

    #[test]
    fn test_color_normalization() {
        assert_eq!("#FF7CC7".parse::<HexColor>().unwrap().0, "#ff7cc7");
        assert_eq!("#f00".parse::<HexColor>().unwrap().0, "#ff0000");
        assert_eq!("rgb(0, 245, 255)".parse::<HexColor>().unwrap().0, "#00f5ff");
    }

    #[test]
    fn test_invalid_color() {
        assert!("not-a-color".parse::<HexColor>().is_err());
    }
}
