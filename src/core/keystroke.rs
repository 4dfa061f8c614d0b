//! Keystroke reward - a small credit for every Hangul syllable typed.
//!
//! Each precomposed syllable is decomposed into initial, medial, and final jamo,
//! and each jamo is weighted by the keys it takes on the standard two-set
//! keyboard: one for a plain key, two for a shifted or combined one.

use crate::core::word::is_hangul_syllable;

/// Reward credited per keystroke.
pub const KEYSTROKE_REWARD: f64 = 0.009;

const SYLLABLE_BASE: u32 = 0xAC00;
const MEDIAL_COUNT: u32 = 21;
const FINAL_COUNT: u32 = 28;

// ㄱ ㄲ ㄴ ㄷ ㄸ ㄹ ㅁ ㅂ ㅃ ㅅ ㅆ ㅇ ㅈ ㅉ ㅊ ㅋ ㅌ ㅍ ㅎ
const INITIAL_KEYS: [u32; 19] = [1, 2, 1, 1, 2, 1, 1, 1, 2, 1, 2, 1, 1, 2, 1, 1, 1, 1, 1];

// ㅏ ㅐ ㅑ ㅒ ㅓ ㅔ ㅕ ㅖ ㅗ ㅘ ㅙ ㅚ ㅛ ㅜ ㅝ ㅞ ㅟ ㅠ ㅡ ㅢ ㅣ
const MEDIAL_KEYS: [u32; 21] = [
    1, 1, 1, 2, 1, 1, 1, 2, 1, 2, 2, 2, 1, 1, 2, 2, 2, 1, 1, 2, 1,
];

// (none) ㄱ ㄲ ㄳ ㄴ ㄵ ㄶ ㄷ ㄹ ㄺ ㄻ ㄼ ㄽ ㄾ ㄿ ㅀ ㅁ ㅂ ㅄ ㅅ ㅆ ㅇ ㅈ ㅊ ㅋ ㅌ ㅍ ㅎ
const FINAL_KEYS: [u32; 28] = [
    0, 1, 2, 2, 1, 2, 2, 1, 1, 2, 2, 2, 2, 2, 2, 2, 1, 1, 2, 1, 2, 1, 1, 1, 1, 1, 1, 1,
];

/// Keys needed to type `ch`; zero for anything that is not a Hangul syllable.
#[must_use]
pub fn keystrokes(ch: char) -> u32 {
    if !is_hangul_syllable(ch) {
        return 0;
    }
    let code = u32::from(ch) - SYLLABLE_BASE;
    let initial = code / (MEDIAL_COUNT * FINAL_COUNT);
    let medial = (code / FINAL_COUNT) % MEDIAL_COUNT;
    let last = code % FINAL_COUNT;

    // Indices are in range for every syllable in 가..=힣
    INITIAL_KEYS.get(initial as usize).copied().unwrap_or(0)
        + MEDIAL_KEYS.get(medial as usize).copied().unwrap_or(0)
        + FINAL_KEYS.get(last as usize).copied().unwrap_or(0)
}

/// Total keystrokes for every Hangul syllable in `text`.
#[must_use]
pub fn total_keystrokes(text: &str) -> u32 {
    text.chars().map(keystrokes).sum()
}

/// Aggregate reward for one message.
#[must_use]
pub fn keystroke_reward(text: &str) -> f64 {
    f64::from(total_keystrokes(text)) * KEYSTROKE_REWARD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_syllables() {
        assert_eq!(keystrokes('가'), 2);
        assert_eq!(keystrokes('한'), 3);
    }

    #[test]
    fn test_shifted_and_combined_jamo() {
        // ㄲ + ㅏ
        assert_eq!(keystrokes('까'), 3);
        // ㄷ + ㅏ + ㄺ
        assert_eq!(keystrokes('닭'), 4);
        // ㄱ + ㅘ
        assert_eq!(keystrokes('과'), 3);
        // ㅎ + ㅣ + ㅎ, the last syllable of the block
        assert_eq!(keystrokes('힣'), 3);
    }

    #[test]
    fn test_non_hangul_earns_nothing() {
        assert_eq!(keystrokes('a'), 0);
        assert_eq!(keystrokes('ㄱ'), 0);
        assert_eq!(keystrokes(' '), 0);
    }

    #[test]
    fn test_message_reward_is_aggregate() {
        assert_eq!(total_keystrokes("가 a 한!"), 5);
        assert!((keystroke_reward("가 a 한!") - 0.045).abs() < 1e-12);
        assert!(keystroke_reward("hello").abs() < f64::EPSILON);
    }
}
