//! INI-style configuration: read at startup and on `/reload`, tolerant of
//! UTF-16, UTF-8, and UTF-8-with-BOM encodings, with a
//! profile-section-overrides-`Settings`-section fallback chain.

use std::path::Path;

use configparser::ini::Ini;
use smart_crop_core::{Mode, Orientation};
use tracing::warn;

const SETTINGS_SECTION: &str = "Settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Gemini,
    ChatGpt,
    Local,
}

#[derive(Debug, Clone)]
pub struct ActiveProfile {
    pub name: String,
    pub mode: Mode,
    pub lang_is_japanese: bool,
    pub vertical: bool,
    pub engine: Engine,
}

impl ActiveProfile {
    pub fn orientation(&self) -> Orientation {
        if self.lang_is_japanese && self.vertical {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }
}

impl Default for ActiveProfile {
    fn default() -> Self {
        Self {
            name: SETTINGS_SECTION.to_string(),
            mode: Mode::Adv,
            lang_is_japanese: false,
            vertical: false,
            engine: Engine::Gemini,
        }
    }
}

/// Reads `path`, trying UTF-16, UTF-8-with-BOM, then plain UTF-8 in that
/// order. The first encoding that parses wins. Returns `None` (and logs
/// a warning) if the file is missing or no encoding parses.
fn read_ini(path: &Path) -> Option<Ini> {
    let bytes = std::fs::read(path)
        .inspect_err(|e| warn!(path = %path.display(), error = %e, "config file unreadable, using defaults"))
        .ok()?;

    for decode in [decode_utf16, decode_utf8_bom, decode_utf8] {
        let Some(text) = decode(&bytes) else {
            continue;
        };
        let mut ini = Ini::new();
        if ini.read(text).is_ok() {
            return Some(ini);
        }
    }

    warn!(path = %path.display(), "config file parsed under no known encoding, using defaults");
    None
}

fn decode_utf16(bytes: &[u8]) -> Option<String> {
    if bytes.len() < 2 {
        return None;
    }
    let has_bom = bytes[0] == 0xFF && bytes[1] == 0xFE;
    if !has_bom {
        return None;
    }
    let units: Vec<u16> = bytes[2..]
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16(&units).ok()
}

fn decode_utf8_bom(bytes: &[u8]) -> Option<String> {
    let stripped = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF])?;
    std::str::from_utf8(stripped).ok().map(str::to_string)
}

fn decode_utf8(bytes: &[u8]) -> Option<String> {
    std::str::from_utf8(bytes).ok().map(str::to_string)
}

fn get_with_fallback(ini: &Ini, profile: &str, key: &str) -> Option<String> {
    ini.get(profile, key)
        .or_else(|| ini.get(SETTINGS_SECTION, key))
}

/// Loads `ActiveProfile` from `path`, falling back to all-default values on
/// any read/parse failure: the server never fails to start over a bad
/// config file.
pub fn load_active_profile(path: &Path) -> ActiveProfile {
    let Some(ini) = read_ini(path) else {
        return ActiveProfile::default();
    };

    let profile_name = ini
        .get(SETTINGS_SECTION, "ACTIVE_PROFILE")
        .unwrap_or_else(|| SETTINGS_SECTION.to_string());

    let mode = match get_with_fallback(&ini, &profile_name, "READ_MODE").as_deref() {
        Some("NVL") => Mode::Nvl,
        _ => Mode::Adv,
    };

    let lang_is_japanese =
        matches!(get_with_fallback(&ini, &profile_name, "LANG").as_deref(), Some("jap"));

    let vertical =
        matches!(get_with_fallback(&ini, &profile_name, "JAP_READ_VERTICAL").as_deref(), Some("1"));

    let engine = match get_with_fallback(&ini, &profile_name, "ENGINE").as_deref() {
        Some("ChatGPT") => Engine::ChatGpt,
        Some("Local") => Engine::Local,
        _ => Engine::Gemini,
    };

    ActiveProfile {
        name: profile_name,
        mode,
        lang_is_japanese,
        vertical,
        engine,
    }
}

/// Reads the Gemini API key, preferring the active profile's section over
/// `Settings`.
pub fn gemini_api_key(path: &Path, profile: &str) -> Option<String> {
    let ini = read_ini(path)?;
    get_with_fallback(&ini, profile, "GEMINI_API_KEY")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let profile = load_active_profile(Path::new("/nonexistent/path/settings.ini"));
        assert_eq!(profile.mode, Mode::Adv);
        assert!(!profile.lang_is_japanese);
    }

    #[test]
    fn profile_overrides_settings_section() {
        let dir = std::env::temp_dir().join(format!("kotrans-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.ini");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "[Settings]\nACTIVE_PROFILE=Otome\nREAD_MODE=ADV\nLANG=eng\n\n[Otome]\nREAD_MODE=NVL\nLANG=jap\nJAP_READ_VERTICAL=1\n"
        )
        .unwrap();

        let profile = load_active_profile(&path);
        assert_eq!(profile.name, "Otome");
        assert_eq!(profile.mode, Mode::Nvl);
        assert!(profile.lang_is_japanese);
        assert!(profile.vertical);
        assert_eq!(profile.orientation(), Orientation::Vertical);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn utf8_bom_is_tolerated() {
        let dir = std::env::temp_dir().join(format!("kotrans-test-bom-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.ini");
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"[Settings]\nREAD_MODE=NVL\n");
        std::fs::write(&path, bytes).unwrap();

        let profile = load_active_profile(&path);
        assert_eq!(profile.mode, Mode::Nvl);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
