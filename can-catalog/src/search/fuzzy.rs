//! Approximate string scoring
//!
//! Similarity scores in `[0, 100]` built on the indel (LCS-based) ratio:
//! `ratio = 200 * lcs(a, b) / (|a| + |b|)`. The combined score
//! ([`weighted_ratio`]) takes the best of a straight ratio, a best-window
//! partial ratio, and order-insensitive token variants, with the partial and
//! token variants scaled slightly below a full-string match.

use std::collections::HashMap;

/// Weight applied to token-sort / token-set variants
pub const TOKEN_SCALE: f64 = 0.95;

/// Length ratio under which both strings are compared as a whole
const FULL_MATCH_LEN_RATIO: f64 = 1.5;

/// Partial-match weight for a given length ratio (longer / shorter)
///
/// Flat at 0.9 up to a ratio of 8, then 0.1 lower per doubling of the ratio,
/// never below 0.6.
fn partial_scale(len_ratio: f64) -> f64 {
    if len_ratio <= 8.0 {
        return 0.9;
    }
    (0.9 - 0.1 * (len_ratio / 8.0).log2()).max(0.6)
}

/// Lowercase, replace non-alphanumerics with spaces, collapse whitespace
pub fn normalize(text: &str) -> String {
    let mapped: String = text
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A normalized string with its token forms precomputed
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    chars: Vec<char>,
    /// Tokens sorted and re-joined with single spaces
    sorted: Vec<char>,
    /// Sorted, de-duplicated tokens
    token_set: Vec<String>,
}

impl Prepared {
    /// Prepare already-normalized text
    pub fn new(normalized: &str) -> Self {
        let mut tokens: Vec<&str> = normalized.split_whitespace().collect();
        tokens.sort_unstable();
        let sorted = tokens.join(" ").chars().collect();
        tokens.dedup();

        Self {
            chars: normalized.chars().collect(),
            sorted,
            token_set: tokens.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }
}

/// Bit-parallel LCS against a fixed pattern
///
/// The pattern is split into 64-bit blocks, so one text char costs
/// `ceil(len / 64)` word operations whatever the pattern length.
struct Pattern {
    len: usize,
    words: usize,
    /// Match masks for ASCII chars, `words` blocks per char
    ascii: Vec<u64>,
    other: HashMap<char, Vec<u64>>,
}

impl Pattern {
    fn new(chars: &[char]) -> Self {
        let len = chars.len();
        let words = len.div_ceil(64);
        let mut ascii = vec![0u64; 128 * words];
        let mut other: HashMap<char, Vec<u64>> = HashMap::new();

        for (i, &c) in chars.iter().enumerate() {
            let (word, bit) = (i / 64, 1u64 << (i % 64));
            if c.is_ascii() {
                ascii[c as usize * words + word] |= bit;
            } else {
                other.entry(c).or_insert_with(|| vec![0; words])[word] |= bit;
            }
        }

        Self {
            len,
            words,
            ascii,
            other,
        }
    }

    fn block(&self, c: char, word: usize) -> u64 {
        if c.is_ascii() {
            self.ascii[c as usize * self.words + word]
        } else {
            self.other.get(&c).map_or(0, |blocks| blocks[word])
        }
    }

    fn lcs(&self, text: &[char]) -> usize {
        if self.len == 0 || text.is_empty() {
            return 0;
        }

        let mut v = vec![u64::MAX; self.words];
        for &c in text {
            let mut carry = false;
            for (word, vw) in v.iter_mut().enumerate() {
                let u = *vw & self.block(c, word);
                let (sum, c1) = vw.overflowing_add(u);
                let (sum, c2) = sum.overflowing_add(u64::from(carry));
                carry = c1 || c2;
                *vw = sum | (*vw - u);
            }
        }

        // Zero bits within the pattern length count matched chars
        let tail = self.len % 64;
        v.iter()
            .enumerate()
            .map(|(word, vw)| {
                let valid = if word + 1 == self.words && tail != 0 {
                    (1u64 << tail) - 1
                } else {
                    u64::MAX
                };
                (!vw & valid).count_ones() as usize
            })
            .sum()
    }
}

fn indel_score(lcs: usize, total_len: usize) -> f64 {
    if total_len == 0 {
        return 100.0;
    }
    200.0 * lcs as f64 / total_len as f64
}

/// Straight similarity of two strings
pub fn ratio(a: &[char], b: &[char]) -> f64 {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let lcs = Pattern::new(short).lcs(long);
    indel_score(lcs, a.len() + b.len())
}

/// Best similarity of the shorter string against a same-length window of
/// the longer one
///
/// Windows are anchored where the longer string holds the shorter one's
/// first char (window starts there) or last char (window ends there), and
/// are clipped at either end of the longer string.
pub fn partial_ratio(a: &[char], b: &[char]) -> f64 {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let m = short.len();
    if m == 0 {
        return 0.0;
    }
    if long.windows(m).any(|w| w == short) {
        return 100.0;
    }

    let pattern = Pattern::new(short);
    let (first, last) = (short[0], short[m - 1]);
    let mut best: f64 = 0.0;

    for (j, &c) in long.iter().enumerate() {
        if c == first {
            let window = &long[j..(j + m).min(long.len())];
            best = best.max(indel_score(pattern.lcs(window), m + window.len()));
        }
        if c == last {
            let window = &long[(j + 1).saturating_sub(m)..=j];
            best = best.max(indel_score(pattern.lcs(window), m + window.len()));
        }
    }

    best
}

/// Ratio of the token-sorted forms (word order ignored)
pub fn token_sort_ratio(a: &Prepared, b: &Prepared) -> f64 {
    ratio(&a.sorted, &b.sorted)
}

/// Token-set similarity: shared tokens compared against each side's remainder
///
/// Returns 100 when every token of one side also appears on the other.
pub fn token_set_ratio(a: &Prepared, b: &Prepared) -> f64 {
    if a.token_set.is_empty() || b.token_set.is_empty() {
        return 0.0;
    }

    let intersection: Vec<&str> = a
        .token_set
        .iter()
        .filter(|t| b.token_set.binary_search(t).is_ok())
        .map(String::as_str)
        .collect();
    let diff_ab: Vec<&str> = a
        .token_set
        .iter()
        .filter(|t| b.token_set.binary_search(t).is_err())
        .map(String::as_str)
        .collect();
    let diff_ba: Vec<&str> = b
        .token_set
        .iter()
        .filter(|t| a.token_set.binary_search(t).is_err())
        .map(String::as_str)
        .collect();

    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let sect = intersection.join(" ");
    let combined_ab = join_nonempty(&sect, &diff_ab.join(" "));
    let combined_ba = join_nonempty(&sect, &diff_ba.join(" "));

    let sect: Vec<char> = sect.chars().collect();
    let combined_ab: Vec<char> = combined_ab.chars().collect();
    let combined_ba: Vec<char> = combined_ba.chars().collect();

    let mut best = ratio(&combined_ab, &combined_ba);
    if !sect.is_empty() {
        best = best
            .max(ratio(&sect, &combined_ab))
            .max(ratio(&sect, &combined_ba));
    }
    best
}

fn join_nonempty(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_string(),
        (_, true) => a.to_string(),
        _ => format!("{} {}", a, b),
    }
}

/// Combined score of a query against a candidate
///
/// Strings of similar length are compared whole (straight, token-sort and
/// token-set ratios). When the candidate is much longer the partial variants
/// take over, weighted down as the length gap grows.
pub fn weighted_ratio(query: &Prepared, candidate: &Prepared) -> f64 {
    if query.is_empty() || candidate.is_empty() {
        return 0.0;
    }

    let (shorter, longer) = if query.len() <= candidate.len() {
        (query.len(), candidate.len())
    } else {
        (candidate.len(), query.len())
    };
    let len_ratio = longer as f64 / shorter as f64;

    let base = ratio(&query.chars, &candidate.chars);

    if len_ratio < FULL_MATCH_LEN_RATIO {
        let token_sort = token_sort_ratio(query, candidate) * TOKEN_SCALE;
        let token_set = token_set_ratio(query, candidate) * TOKEN_SCALE;
        return base.max(token_sort).max(token_set);
    }

    let scale = partial_scale(len_ratio);
    let partial = partial_ratio(&query.chars, &candidate.chars) * scale;
    let partial_sort = partial_ratio(&query.sorted, &candidate.sorted) * TOKEN_SCALE * scale;
    let token_set = token_set_ratio(query, candidate) * TOKEN_SCALE * scale;

    base.max(partial).max(partial_sort).max(token_set)
}
