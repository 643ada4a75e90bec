//! Compatibility switches for legacy (2.x style) template syntax.
//!
//! The parser consults these only when [`ParserOptions::compat`] is set.
//!
//! [`ParserOptions::compat`]: crate::options::ParserOptions::compat

use gesso_carton::{FxHashMap, String};
use serde::{Deserialize, Serialize};

/// Legacy behaviours the parser knows how to emulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeprecationType {
    #[serde(rename = "COMPILER_IS_ON_ELEMENT")]
    IsOnElement,
    #[serde(rename = "COMPILER_V_BIND_SYNC")]
    VBindSync,
    #[serde(rename = "COMPILER_V_BIND_PROP")]
    VBindProp,
    #[serde(rename = "COMPILER_V_IF_V_FOR_PRECEDENCE")]
    VIfVForPrecedence,
    #[serde(rename = "COMPILER_NATIVE_TEMPLATE")]
    NativeTemplate,
    #[serde(rename = "COMPILER_INLINE_TEMPLATE")]
    InlineTemplate,
}

impl DeprecationType {
    pub const ALL: [Self; 6] = [
        Self::IsOnElement,
        Self::VBindSync,
        Self::VBindProp,
        Self::VIfVForPrecedence,
        Self::NativeTemplate,
        Self::InlineTemplate,
    ];

    /// Config key, as written in configuration files.
    pub fn key(&self) -> &'static str {
        match self {
            Self::IsOnElement => "COMPILER_IS_ON_ELEMENT",
            Self::VBindSync => "COMPILER_V_BIND_SYNC",
            Self::VBindProp => "COMPILER_V_BIND_PROP",
            Self::VIfVForPrecedence => "COMPILER_V_IF_V_FOR_PRECEDENCE",
            Self::NativeTemplate => "COMPILER_NATIVE_TEMPLATE",
            Self::InlineTemplate => "COMPILER_INLINE_TEMPLATE",
        }
    }

    pub fn message(&self, arg: Option<&str>) -> String {
        let body = match self {
            Self::IsOnElement => String::from(
                "Platform-native elements with \"is\" prop will no longer be treated as \
                 components unless the \"is\" value is explicitly prefixed with \"vue:\".",
            ),
            Self::VBindSync => {
                let key = arg.unwrap_or("key");
                String::from(format!(
                    ".sync modifier for v-bind has been removed. Use v-model with argument \
                     instead. `v-bind:{key}.sync` should be changed to `v-model:{key}`."
                ))
            }
            Self::VBindProp => String::from(
                ".prop modifier for v-bind has been removed and no longer necessary. \
                 The binding is set as a DOM property automatically when appropriate.",
            ),
            Self::VIfVForPrecedence => String::from(
                "v-if / v-for precedence when used on the same element has changed: \
                 v-if now takes higher precedence and will no longer have access to v-for \
                 scope variables. Avoid the ambiguity with <template> tags or use a \
                 computed property that filters v-for data source.",
            ),
            Self::NativeTemplate => String::from(
                "<template> with no special directives will render as a native template \
                 element instead of its inner content.",
            ),
            Self::InlineTemplate => String::from("\"inline-template\" has been removed."),
        };
        let mut message = String::from("(deprecation ");
        message.push_str(self.key());
        message.push_str(") ");
        message.push_str(&body);
        message
    }
}

/// Which major version's semantics apply by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CompatMode {
    /// Everything not explicitly disabled is emulated.
    #[default]
    V2,
    /// Only explicitly enabled behaviours are emulated.
    V3,
}

impl TryFrom<u8> for CompatMode {
    type Error = std::string::String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            other => Err(format!("compat mode must be 2 or 3, got {other}")),
        }
    }
}

impl From<CompatMode> for u8 {
    fn from(mode: CompatMode) -> Self {
        match mode {
            CompatMode::V2 => 2,
            CompatMode::V3 => 3,
        }
    }
}

/// Per-feature override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCompatSetting")]
pub enum CompatSetting {
    Enabled,
    Disabled,
    /// Enabled (in 2.x mode) without emitting the deprecation warning.
    SuppressWarning,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCompatSetting {
    Flag(bool),
    Text(std::string::String),
}

impl TryFrom<RawCompatSetting> for CompatSetting {
    type Error = std::string::String;

    fn try_from(raw: RawCompatSetting) -> Result<Self, Self::Error> {
        match raw {
            RawCompatSetting::Flag(true) => Ok(Self::Enabled),
            RawCompatSetting::Flag(false) => Ok(Self::Disabled),
            RawCompatSetting::Text(text) if text == "suppress-warning" => Ok(Self::SuppressWarning),
            RawCompatSetting::Text(text) => Err(format!(
                "expected true, false or \"suppress-warning\", got \"{text}\""
            )),
        }
    }
}

/// Compat configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatConfig {
    pub mode: CompatMode,
    pub overrides: FxHashMap<DeprecationType, CompatSetting>,
}

impl CompatConfig {
    pub fn new(mode: CompatMode) -> Self {
        Self {
            mode,
            overrides: FxHashMap::default(),
        }
    }

    pub fn with(mut self, key: DeprecationType, setting: CompatSetting) -> Self {
        self.overrides.insert(key, setting);
        self
    }

    pub fn setting(&self, key: DeprecationType) -> Option<CompatSetting> {
        self.overrides.get(&key).copied()
    }

    /// In 3.x mode only an explicit `true` enables a behaviour; in 2.x mode
    /// anything short of an explicit `false` does.
    pub fn is_enabled(&self, key: DeprecationType) -> bool {
        let setting = self.setting(key);
        match self.mode {
            CompatMode::V3 => setting == Some(CompatSetting::Enabled),
            CompatMode::V2 => setting != Some(CompatSetting::Disabled),
        }
    }

    pub fn is_warning_suppressed(&self, key: DeprecationType) -> bool {
        self.setting(key) == Some(CompatSetting::SuppressWarning)
    }
}
