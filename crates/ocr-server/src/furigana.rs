//! Furigana collaborator: morphological tagging plus katakana-confusion
//! post-correction for OCR-misread kanji lookalikes.

use lindera::dictionary::{DictionaryKind, load_dictionary_from_kind};
use lindera::mode::Mode as TokenizerMode;
use lindera::segmenter::Segmenter;
use lindera::tokenizer::Tokenizer;

pub trait FuriganaTagger: Send + Sync {
    fn annotate(&self, text: &str) -> anyhow::Result<String>;
}

pub struct LinderaTagger {
    tokenizer: Tokenizer,
}

impl LinderaTagger {
    pub fn load() -> anyhow::Result<Self> {
        let dictionary = load_dictionary_from_kind(DictionaryKind::UniDic)?;
        let segmenter = Segmenter::new(TokenizerMode::Normal, dictionary, None);
        Ok(Self {
            tokenizer: Tokenizer::new(segmenter),
        })
    }
}

fn is_kanji(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

/// Converts a katakana reading to hiragana for rendering furigana from the
/// tokenizer's katakana reading field.
fn katakana_to_hiragana(reading: &str) -> String {
    reading
        .chars()
        .map(|c| {
            if ('\u{30A1}'..='\u{30F6}').contains(&c) {
                char::from_u32(c as u32 - 0x60).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

impl FuriganaTagger for LinderaTagger {
    fn annotate(&self, text: &str) -> anyhow::Result<String> {
        let fixed = fix_katakana_confusion(text);
        let tokens = self.tokenizer.tokenize(&fixed)?;

        let mut out = String::new();
        for mut token in tokens {
            let surface = token.text.to_string();
            if surface.chars().any(is_kanji) {
                let details = token.details();
                let reading = details.last().map(|s| s.to_string()).filter(|r| r != "*");
                if let Some(reading) = reading {
                    let hira = katakana_to_hiragana(&reading);
                    out.push_str(&format!("{surface}[{hira}]"));
                    continue;
                }
            }
            out.push_str(&surface);
        }
        Ok(out)
    }
}

/// Character-confusion correction for OCR-misread katakana: certain
/// kanji/katakana-lookalikes (e.g. `力` vs `カ`, `口` vs `ロ`) are swapped
/// back to their katakana form when surrounded by other katakana.
fn fix_katakana_confusion(text: &str) -> String {
    const CONFUSION_PAIRS: [(char, char); 5] =
        [('力', 'カ'), ('口', 'ロ'), ('二', 'ニ'), ('工', 'エ'), ('夕', 'タ')];

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        let replacement = CONFUSION_PAIRS
            .iter()
            .find(|(kanji, _)| *kanji == c)
            .filter(|_| {
                let prev_is_kana = i > 0 && is_katakana(chars[i - 1]);
                let next_is_kana = i + 1 < chars.len() && is_katakana(chars[i + 1]);
                prev_is_kana || next_is_kana
            })
            .map(|(_, kana)| *kana);

        out.push(replacement.unwrap_or(c));
    }

    out
}

fn is_katakana(c: char) -> bool {
    ('\u{30A0}'..='\u{30FF}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confusable_kanji_adjacent_to_katakana_is_corrected() {
        let fixed = fix_katakana_confusion("ス力ート");
        assert_eq!(fixed, "スカート");
    }

    #[test]
    fn isolated_kanji_is_left_untouched() {
        let fixed = fix_katakana_confusion("力を込める");
        assert_eq!(fixed, "力を込める");
    }
}
