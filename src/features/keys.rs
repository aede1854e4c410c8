use std::fmt;

/// Every toggle key is stored, and applied as a class name, with this prefix.
pub const KEY_PREFIX: &str = "lumen-";

/// A namespaced boolean setting controlling one page feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ToggleKey {
    Protanopia,
    Deuteranopia,
    Tritanopia,
    Grayscale,
    HighContrast,
    Dyslexia,
    SeizureProtect,
    FocusRing,
    EnlargeTargets,
    ReadingGuide,
    FocusMode,
    VoiceControl,
    /// Any other `lumen-*` flag; treated as a plain body class.
    Other(String),
}

/// Where a toggle lands when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleTarget {
    RootClass,
    BodyClass,
    ReadingGuide,
    FocusMode,
    VoiceControl,
}

const NAMED: [(&str, ToggleKey); 12] = [
    ("protanopia", ToggleKey::Protanopia),
    ("deuteranopia", ToggleKey::Deuteranopia),
    ("tritanopia", ToggleKey::Tritanopia),
    ("grayscale", ToggleKey::Grayscale),
    ("high-contrast", ToggleKey::HighContrast),
    ("dyslexia", ToggleKey::Dyslexia),
    ("seizure-protect", ToggleKey::SeizureProtect),
    ("focus-ring", ToggleKey::FocusRing),
    ("enlarge-targets", ToggleKey::EnlargeTargets),
    ("reading-guide", ToggleKey::ReadingGuide),
    ("focus-mode", ToggleKey::FocusMode),
    ("voice-control", ToggleKey::VoiceControl),
];

impl ToggleKey {
    /// The radio group: at most one of these may be on.
    pub const COLOR_FILTERS: [ToggleKey; 3] = [
        ToggleKey::Protanopia,
        ToggleKey::Deuteranopia,
        ToggleKey::Tritanopia,
    ];

    /// Parses a stored key such as `lumen-dyslexia`. Keys without the prefix
    /// and non-boolean settings (`lumen-font-scale`) are rejected.
    pub fn parse(key: &str) -> Option<Self> {
        let name = key.strip_prefix(KEY_PREFIX)?;
        if name.is_empty() || name == "font-scale" {
            return None;
        }
        let known = NAMED
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, key)| key.clone());
        Some(known.unwrap_or_else(|| ToggleKey::Other(name.to_string())))
    }

    pub fn name(&self) -> &str {
        match self {
            ToggleKey::Other(name) => name,
            known => NAMED
                .iter()
                .find(|(_, key)| key == known)
                .map(|(name, _)| *name)
                .unwrap_or_default(),
        }
    }

    /// Storage key, which doubles as the CSS class the stylesheet targets.
    pub fn storage_key(&self) -> String {
        format!("{KEY_PREFIX}{}", self.name())
    }

    pub fn is_color_filter(&self) -> bool {
        Self::COLOR_FILTERS.contains(self)
    }

    /// Durable flags that are session intents and never survive a reload.
    pub fn is_session_scoped(&self) -> bool {
        matches!(self, ToggleKey::FocusMode | ToggleKey::VoiceControl)
    }

    pub fn target(&self) -> ToggleTarget {
        match self {
            ToggleKey::Protanopia
            | ToggleKey::Deuteranopia
            | ToggleKey::Tritanopia
            | ToggleKey::Grayscale
            | ToggleKey::HighContrast => ToggleTarget::RootClass,
            ToggleKey::ReadingGuide => ToggleTarget::ReadingGuide,
            ToggleKey::FocusMode => ToggleTarget::FocusMode,
            ToggleKey::VoiceControl => ToggleTarget::VoiceControl,
            _ => ToggleTarget::BodyClass,
        }
    }
}

impl fmt::Display for ToggleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{KEY_PREFIX}{}", self.name())
    }
}
