//! Settings keys, defaults and validation.
//!
//! Raw values arrive from the host as whatever its input widgets produce.
//! Nothing here ever fails: unusable input degrades to the default and
//! numeric input is clamped into range.

use roam_extras_host::{HostError, SettingValue, SettingsStore};

/// A boolean switch that defaults to `default` and is persisted the first
/// time it is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleSetting {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub default: bool,
}

pub const INLINE_CODE_COPY: ToggleSetting = ToggleSetting {
    key: "enable-inline-code-copy-button",
    name: "Enable copy button on inline code blocks",
    description: "If enabled, a copy button will appear on inline code blocks when hovering",
    default: true,
};

pub const HIGHLIGHT_COPY: ToggleSetting = ToggleSetting {
    key: "enable-highlight-copy-button",
    name: "Enable copy button on highlighted text",
    description: "If enabled, a copy button will appear on highlighted text when hovering",
    default: true,
};

impl ToggleSetting {
    /// Current value; writes the default back when the key is absent.
    pub async fn read_or_init(&self, store: &dyn SettingsStore) -> bool {
        match store.get(self.key) {
            None => {
                if let Err(e) = store.set(self.key, SettingValue::Bool(self.default)).await {
                    log::warn!("Could not persist default for {}: {e}", self.key);
                }
                self.default
            }
            Some(value) => value.as_bool().unwrap_or_else(|| {
                log::warn!("Ignoring unreadable value {value:?} for {}", self.key);
                self.default
            }),
        }
    }

    /// Interprets a change event; unreadable values fall back to the default.
    pub fn from_value(&self, value: &SettingValue) -> bool {
        value.as_bool().unwrap_or(self.default)
    }
}

/// An integer entered as text, kept within `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntSetting {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub default: u32,
    pub min: u32,
    pub max: u32,
}

pub const YEARS_BACK: IntSetting = IntSetting {
    key: "years-back",
    name: "Years Back",
    description: "Number of years to look back (default: 3, max: 10)",
    default: 3,
    min: 1,
    max: 10,
};

pub const TRIGGER_HOUR: IntSetting = IntSetting {
    key: "hour-to-open-last-year-today-page",
    name: "Hour to Open Last Year Today Page",
    description: "Hour of the day to open Last Year Today page (0-23, default: 9)",
    default: 9,
    min: 0,
    max: 23,
};

impl IntSetting {
    pub fn clamp(&self, value: i64) -> u32 {
        let clamped = value.clamp(i64::from(self.min), i64::from(self.max));
        u32::try_from(clamped).unwrap_or(self.default)
    }

    /// Validates raw input from the settings panel. Empty input means "no
    /// change" and yields `None`; non-numeric input yields the default.
    pub fn from_input(&self, raw: &str) -> Option<u32> {
        if raw.is_empty() {
            return None;
        }
        Some(match parse_leading_int(raw) {
            Some(value) => self.clamp(value),
            None => self.default,
        })
    }

    /// Value to use for whatever is currently stored under this key.
    pub fn from_stored(&self, stored: Option<&SettingValue>) -> u32 {
        stored
            .and_then(SettingValue::as_text)
            .and_then(|raw| self.from_input(raw))
            .unwrap_or(self.default)
    }

    pub fn read(&self, store: &dyn SettingsStore) -> u32 {
        self.from_stored(store.get(self.key).as_ref())
    }

    pub async fn persist(&self, store: &dyn SettingsStore, value: u32) -> Result<(), HostError> {
        store
            .set(self.key, SettingValue::Text(value.to_string()))
            .await
    }
}

/// Leading-integer parse: optional whitespace and sign followed by digits;
/// anything after the digits is ignored. `None` when there are no digits.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits: &str = &rest[..rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len())];
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits.bytes().fold(0i64, |acc, digit| {
        acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use roam_extras_host::memory::MemorySettings;
    use rstest::rstest;

    #[rstest]
    #[case("12", Some(12))]
    #[case("  7", Some(7))]
    #[case("-1", Some(-1))]
    #[case("+4", Some(4))]
    #[case("12abc", Some(12))]
    #[case("abc", None)]
    #[case("-", None)]
    #[case("", None)]
    #[case("99999999999999999999999", Some(i64::MAX))]
    fn test_parse_leading_int(#[case] raw: &str, #[case] expected: Option<i64>) {
        assert_eq!(parse_leading_int(raw), expected);
    }

    #[rstest]
    #[case(YEARS_BACK, "0", Some(1))]
    #[case(YEARS_BACK, "15", Some(10))]
    #[case(YEARS_BACK, "5", Some(5))]
    #[case(YEARS_BACK, "five", Some(3))]
    #[case(YEARS_BACK, "", None)]
    #[case(TRIGGER_HOUR, "-1", Some(0))]
    #[case(TRIGGER_HOUR, "30", Some(23))]
    #[case(TRIGGER_HOUR, "noon", Some(9))]
    fn test_from_input_clamps(
        #[case] setting: IntSetting,
        #[case] raw: &str,
        #[case] expected: Option<u32>,
    ) {
        assert_eq!(setting.from_input(raw), expected);
    }

    #[test]
    fn test_from_stored_revalidates() {
        assert_eq!(YEARS_BACK.from_stored(None), 3);
        assert_eq!(YEARS_BACK.from_stored(Some(&SettingValue::from("42"))), 10);
        assert_eq!(YEARS_BACK.from_stored(Some(&SettingValue::Bool(true))), 3);
        assert_eq!(TRIGGER_HOUR.from_stored(Some(&SettingValue::from("7"))), 7);
    }

    #[tokio::test]
    async fn test_toggle_persists_default_when_absent() {
        let store = MemorySettings::default();

        assert!(INLINE_CODE_COPY.read_or_init(&store).await);
        assert_eq!(store.get(INLINE_CODE_COPY.key), Some(SettingValue::Bool(true)));
    }

    #[tokio::test]
    async fn test_toggle_keeps_stored_value() {
        let store = MemorySettings::default();
        store.insert(HIGHLIGHT_COPY.key, false);

        assert!(!HIGHLIGHT_COPY.read_or_init(&store).await);
    }

    #[tokio::test]
    async fn test_toggle_survives_failed_persist() {
        let store = MemorySettings::default();
        store.set_failing(true);

        assert!(HIGHLIGHT_COPY.read_or_init(&store).await);
        assert_eq!(store.get(HIGHLIGHT_COPY.key), None);
    }

    #[tokio::test]
    async fn test_persist_stores_text() {
        let store = MemorySettings::default();
        TRIGGER_HOUR.persist(&store, 23).await.unwrap();

        assert_eq!(TRIGGER_HOUR.read(&store), 23);
        assert_eq!(store.get(TRIGGER_HOUR.key), Some(SettingValue::from("23")));
    }
}
