//! Natural ordering for variant labels: embedded numbers compare by value,
//! so `2k` sorts before `10k`.

/// A run of ASCII digits, ordered by numeric value without parsing.
///
/// Leading zeros are ignored for the value comparison and only break ties, so
/// arbitrarily long runs never overflow.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Number {
    significant_len: usize,
    digits: String,
    raw_len: usize,
}

impl Number {
    fn new(raw: &str) -> Self {
        let digits = raw.trim_start_matches('0');
        Self {
            significant_len: digits.len(),
            digits: digits.to_string(),
            raw_len: raw.len(),
        }
    }
}

/// A text run (lowercased) followed by the digit run that ends it, if any.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortPart {
    pub text: String,
    pub number: Option<Number>,
}

/// Splits `text` on digit/non-digit boundaries. Comparing the returned
/// vectors lexicographically yields natural order.
pub fn sort_key(text: &str) -> Vec<SortPart> {
    let mut parts = Vec::new();
    let mut current_text = String::new();
    let mut current_digits = String::new();

    for c in text.chars() {
        if c.is_ascii_digit() {
            current_digits.push(c);
            continue;
        }
        if !current_digits.is_empty() {
            parts.push(SortPart {
                text: std::mem::take(&mut current_text),
                number: Some(Number::new(&current_digits)),
            });
            current_digits.clear();
        }
        current_text.extend(c.to_lowercase());
    }

    if !current_text.is_empty() || !current_digits.is_empty() {
        parts.push(SortPart {
            text: current_text,
            number: (!current_digits.is_empty()).then(|| Number::new(&current_digits)),
        });
    }

    parts
}
