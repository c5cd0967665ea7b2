//! Display settings read from the `user_preferences` table.
//!
//! The core only reads settings. Values are integers stored as text; a row
//! that does not parse is ignored with a warning so the caller's default
//! applies. Edits come from the `settings` subcommand.
use std::collections::HashMap;
use std::fmt;

use anyhow::{bail, Result};

use crate::storage::Database;
use crate::theme::Argb;

// ============================================================================
// Keys
// ============================================================================

/// Fixed keys the core queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    ColorRead,
    TxtRead,
    ColorUnread,
    TxtUnread,
    WidgetCount,
}

impl SettingKey {
    pub const ALL: [SettingKey; 5] = [
        SettingKey::ColorRead,
        SettingKey::TxtRead,
        SettingKey::ColorUnread,
        SettingKey::TxtUnread,
        SettingKey::WidgetCount,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ColorRead => "colorRead",
            Self::TxtRead => "txtRead",
            Self::ColorUnread => "colorUnread",
            Self::TxtUnread => "txtUnread",
            Self::WidgetCount => "widgetCount",
        }
    }

    /// Look a key up by its stored name (exact match).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    pub fn is_color(self) -> bool {
        !matches!(self, Self::WidgetCount)
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// Settings
// ============================================================================

/// In-memory snapshot of the settings store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: HashMap<SettingKey, i64>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every known key from the database.
    pub async fn load(db: &Database) -> Result<Self> {
        let rows = db.load_preferences().await?;
        Ok(Self::from_pairs(rows))
    }

    /// Build from raw `(key, value)` rows, skipping unknown keys and values
    /// that are not integers.
    pub fn from_pairs<I, K, V>(rows: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut values = HashMap::new();
        for (key, value) in rows {
            let Some(setting) = SettingKey::from_name(key.as_ref()) else {
                continue;
            };
            match value.as_ref().trim().parse::<i64>() {
                Ok(v) => {
                    values.insert(setting, v);
                }
                Err(_) => {
                    tracing::warn!(key = %setting, value = %value.as_ref(), "Ignoring non-integer setting");
                }
            }
        }
        Self { values }
    }

    /// Builder, mostly for tests.
    pub fn with(mut self, key: SettingKey, value: i64) -> Self {
        self.values.insert(key, value);
        self
    }

    pub fn get(&self, key: SettingKey) -> Option<i64> {
        self.values.get(&key).copied()
    }

    pub fn get_int(&self, key: SettingKey, default: i64) -> i64 {
        self.get(key).unwrap_or(default)
    }

    pub fn get_color(&self, key: SettingKey, default: Argb) -> Argb {
        self.get(key).map(Argb::from_setting).unwrap_or(default)
    }

    /// Number of display surfaces that need background refreshes.
    pub fn widget_count(&self) -> i64 {
        self.get_int(SettingKey::WidgetCount, 0)
    }
}

/// Validate and persist one setting from user input.
///
/// Colour keys accept anything [`Argb::parse`] does; `widgetCount` must be a
/// non-negative integer.
pub async fn store_setting(db: &Database, key: &str, raw: &str) -> Result<i64> {
    let Some(setting) = SettingKey::from_name(key) else {
        bail!(
            "Unknown setting '{}'. Known settings: {}",
            key,
            SettingKey::ALL.map(SettingKey::as_str).join(", ")
        );
    };

    let value = if setting.is_color() {
        match Argb::parse(raw) {
            Some(color) => color.to_setting(),
            None => bail!("'{}' is not a colour (try #RRGGBB or 0xAARRGGBB)", raw),
        }
    } else {
        match raw.trim().parse::<i64>() {
            Ok(n) if n >= 0 => n,
            _ => bail!("'{}' must be a non-negative integer", raw),
        }
    };

    db.set_preference(setting.as_str(), &value.to_string()).await?;
    tracing::info!(key = %setting, value, "Stored setting");
    Ok(value)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    #[test]
    fn key_names_round_trip() {
        for key in SettingKey::ALL {
            assert_eq!(SettingKey::from_name(key.as_str()), Some(key));
        }
        assert_eq!(SettingKey::from_name("colorread"), None);
    }

    #[test]
    fn from_pairs_skips_unknown_and_garbage() {
        let settings = Settings::from_pairs([
            ("colorRead", "-1"),
            ("widgetCount", "two"),
            ("theme", "dark"),
        ]);
        assert_eq!(settings.get(SettingKey::ColorRead), Some(-1));
        assert_eq!(settings.get(SettingKey::WidgetCount), None);
        assert_eq!(settings.widget_count(), 0);
    }

    #[test]
    fn get_color_falls_back_to_default() {
        let settings = Settings::new().with(SettingKey::TxtUnread, 0xFF33_6699);
        assert_eq!(
            settings.get_color(SettingKey::TxtUnread, Argb::WHITE),
            Argb(0xFF33_6699)
        );
        assert_eq!(
            settings.get_color(SettingKey::ColorUnread, Argb::BLACK),
            Argb::BLACK
        );
    }

    #[tokio::test]
    async fn load_reads_database_rows() {
        let db = test_db().await;
        db.set_preference("widgetCount", "2").await.unwrap();
        db.set_preference("colorUnread", "4278190335").await.unwrap();

        let settings = Settings::load(&db).await.unwrap();
        assert_eq!(settings.widget_count(), 2);
        assert_eq!(
            settings.get_color(SettingKey::ColorUnread, Argb::BLACK),
            Argb(0xFF00_00FF)
        );
    }

    #[tokio::test]
    async fn store_setting_parses_colours() {
        let db = test_db().await;
        let value = store_setting(&db, "colorRead", "#336699").await.unwrap();
        assert_eq!(value, 0xFF33_6699);
        assert_eq!(
            db.load_preferences().await.unwrap(),
            [("colorRead".to_string(), 0xFF33_6699u32.to_string())]
        );
    }

    #[tokio::test]
    async fn store_setting_rejects_bad_input() {
        let db = test_db().await;
        assert!(store_setting(&db, "colour", "#000000").await.is_err());
        assert!(store_setting(&db, "txtRead", "ink").await.is_err());
        assert!(store_setting(&db, "widgetCount", "-3").await.is_err());
        assert!(store_setting(&db, "widgetCount", "3").await.is_ok());
    }
}
