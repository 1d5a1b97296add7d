use std::collections::{BTreeMap, BTreeSet};

use crate::ids::composite_key;

// Placeholder codepoint: not yet checked against the live page font.
const EXTRA_GLYPHS: &[(u32, u32, &str)] = &[(3, 49, "\u{fc5e}")];

// Placeholder range standing in for the 42 glyph codes of 2:282. Replace with
// the codes read from the live page font before relying on the output.
const MISSING_GLYPHS_2_282: [&str; 42] = [
    "\u{fb51}", "\u{fb52}", "\u{fb53}", "\u{fb54}", "\u{fb55}", "\u{fb56}",
    "\u{fb57}", "\u{fb58}", "\u{fb59}", "\u{fb5a}", "\u{fb5b}", "\u{fb5c}",
    "\u{fb5d}", "\u{fb5e}", "\u{fb5f}", "\u{fb60}", "\u{fb61}", "\u{fb62}",
    "\u{fb63}", "\u{fb64}", "\u{fb65}", "\u{fb66}", "\u{fb67}", "\u{fb68}",
    "\u{fb69}", "\u{fb6a}", "\u{fb6b}", "\u{fb6c}", "\u{fb6d}", "\u{fb6e}",
    "\u{fb6f}", "\u{fb70}", "\u{fb71}", "\u{fb72}", "\u{fb73}", "\u{fb74}",
    "\u{fb75}", "\u{fb76}", "\u{fb77}", "\u{fb78}", "\u{fb79}", "\u{fb7a}",
];

#[derive(Debug, Clone, Default)]
pub struct GlyphFixes {
    extra: BTreeMap<String, BTreeSet<String>>,
    missing: BTreeMap<String, Vec<String>>,
}

impl GlyphFixes {
    pub fn builtin(delimiter: &str) -> Self {
        let mut fixes = Self::default();

        for (chapter, verse, glyph) in EXTRA_GLYPHS {
            fixes
                .extra
                .entry(composite_key(*chapter, *verse, delimiter))
                .or_default()
                .insert((*glyph).to_string());
        }

        fixes.missing.insert(
            composite_key(2, 282, delimiter),
            MISSING_GLYPHS_2_282
                .iter()
                .map(|glyph| (*glyph).to_string())
                .collect(),
        );

        fixes
    }

    pub fn is_extra(&self, verse_id: &str, glyph: &str) -> bool {
        self.extra
            .get(verse_id)
            .is_some_and(|glyphs| glyphs.contains(glyph))
    }

    pub fn missing_for(&self, verse_id: &str) -> &[String] {
        self.missing
            .get(verse_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
pub(crate) fn extra_glyph_for_3_49() -> &'static str {
    EXTRA_GLYPHS[0].2
}
