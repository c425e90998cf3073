use clap::ValueEnum;
use serde::Serialize;

/// Shape used for every data module in the dots layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DotStyle {
    Square,
    Dots,
    Rounded,
    ExtraRounded,
    Classy,
}

/// Shape used for the three finder patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CornerStyle {
    Square,
    Dot,
    ExtraRounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
pub enum ErrorCorrection {
    L,
    M,
    Q,
    H,
}

impl From<ErrorCorrection> for qrcode::EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => qrcode::EcLevel::L,
            ErrorCorrection::M => qrcode::EcLevel::M,
            ErrorCorrection::Q => qrcode::EcLevel::Q,
            ErrorCorrection::H => qrcode::EcLevel::H,
        }
    }
}

/// The styling controls of the theming page. Generation snapshots these
/// into a [`StyleOptions`] value; they are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleControls {
    pub data: String,
    pub g1: String,
    pub g2: String,
    pub gradient_angle: f64,
    pub dot_style: DotStyle,
    pub corner_style: CornerStyle,
    pub logo: Option<String>,
    pub petal: bool,
    pub frame: bool,
    pub error_correction: ErrorCorrection,
    pub preview_size: u32,
}

pub type StyleOptions = StyleControls;

pub const DEFAULT_PREVIEW_SIZE: u32 = 360;

impl Default for StyleControls {
    fn default() -> Self {
        let mut controls = Self {
            data: String::new(),
            g1: String::from("#000000"),
            g2: String::from("#000000"),
            gradient_angle: 0.0,
            dot_style: DotStyle::Rounded,
            corner_style: CornerStyle::Square,
            logo: None,
            petal: false,
            frame: false,
            error_correction: ErrorCorrection::H,
            preview_size: DEFAULT_PREVIEW_SIZE,
        };
        PASTEL.apply_to(&mut controls);
        controls
    }
}

impl StyleControls {
    pub fn gather(&self) -> StyleOptions {
        self.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThemePreset {
    pub name: &'static str,
    pub g1: &'static str,
    pub g2: &'static str,
    pub gradient_angle: f64,
    pub dot_style: DotStyle,
    pub corner_style: CornerStyle,
    pub petal: bool,
    pub frame: bool,
}

impl ThemePreset {
    /// Overwrites exactly the controls a preset defines.
    pub fn apply_to(&self, controls: &mut StyleControls) {
        controls.g1 = self.g1.to_string();
        controls.g2 = self.g2.to_string();
        controls.gradient_angle = self.gradient_angle;
        controls.dot_style = self.dot_style;
        controls.corner_style = self.corner_style;
        controls.petal = self.petal;
        controls.frame = self.frame;
    }

    /// The name as shown on the active preset label.
    pub fn label(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

pub const PASTEL: ThemePreset = ThemePreset {
    name: "pastel",
    g1: "#ff7cc7",
    g2: "#7c6bff",
    gradient_angle: 45.0,
    dot_style: DotStyle::Rounded,
    corner_style: CornerStyle::Dot,
    petal: true,
    frame: true,
};

pub const NEON: ThemePreset = ThemePreset {
    name: "neon",
    g1: "#00f5ff",
    g2: "#ff00d9",
    gradient_angle: 0.0,
    dot_style: DotStyle::Dots,
    corner_style: CornerStyle::Square,
    petal: false,
    frame: true,
};

pub const RETRO: ThemePreset = ThemePreset {
    name: "retro",
    g1: "#ffd24d",
    g2: "#ff7cc7",
    gradient_angle: 90.0,
    dot_style: DotStyle::Square,
    corner_style: CornerStyle::Square,
    petal: false,
    frame: true,
};

pub const PRESETS: &[ThemePreset] = &[PASTEL, NEON, RETRO];

pub fn find_preset(name: &str) -> Option<&'static ThemePreset> {
    PRESETS.iter().find(|p| p.name == name)
}

/// Foreground and background pair used by the content-type page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorTheme {
    pub fg: &'static str,
    pub bg: &'static str,
}

impl ColorTheme {
    pub const fn new(fg: &'static str, bg: &'static str) -> Self {
        Self { fg, bg }
    }
}

pub const PALETTE: &[ColorTheme] = &[
    ColorTheme::new("#000000", "#ffffff"),
    ColorTheme::new("#7c6bff", "#fff4fb"),
    ColorTheme::new("#d6336c", "#fff0f6"),
    ColorTheme::new("#0b7285", "#e3fafc"),
    ColorTheme::new("#5f3dc4", "#f3f0ff"),
    ColorTheme::new("#2b8a3e", "#ebfbee"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::normalize_color;

    #[test]
    fn test_default_controls_are_pastel() {
        let controls = StyleControls::default();
        assert_eq!(controls.g1, "#ff7cc7");
        assert_eq!(controls.g2, "#7c6bff");
        assert_eq!(controls.error_correction, ErrorCorrection::H);
        assert_eq!(controls.preview_size, 360);
        assert!(controls.logo.is_none());
    }

    #[test]
    fn test_apply_preset_leaves_other_controls() {
        let mut controls = StyleControls {
            data: String::from("hello"),
            logo: Some(String::from("logo.png")),
            error_correction: ErrorCorrection::L,
            preview_size: 512,
            ..StyleControls::default()
        };

        RETRO.apply_to(&mut controls);

        assert_eq!(controls.g1, "#ffd24d");
        assert_eq!(controls.gradient_angle, 90.0);
        assert!(!controls.petal);
        assert_eq!(controls.data, "hello");
        assert_eq!(controls.logo.as_deref(), Some("logo.png"));
        assert_eq!(controls.error_correction, ErrorCorrection::L);
        assert_eq!(controls.preview_size, 512);
    }

    #[test]
    fn test_find_preset() {
        assert_eq!(find_preset("neon"), Some(&NEON));
        assert_eq!(find_preset("Neon"), None);
        assert_eq!(find_preset("custom"), None);
    }

    #[test]
    fn test_label() {
        assert_eq!(PASTEL.label(), "Pastel");
        assert_eq!(RETRO.label(), "Retro");
    }

    #[test]
    fn test_all_colors_parse() {
        for preset in PRESETS {
            assert_eq!(normalize_color(preset.g1).unwrap(), preset.g1);
            assert_eq!(normalize_color(preset.g2).unwrap(), preset.g2);
        }
        for theme in PALETTE {
            assert_eq!(normalize_color(theme.fg).unwrap(), theme.fg);
            assert_eq!(normalize_color(theme.bg).unwrap(), theme.bg);
        }
    }
}
