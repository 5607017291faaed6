//! Player-name canonicalization.
//!
//! Box scores and play-by-play rows spell the same player several ways
//! (`Smith, John`, `SMITH,JOHN`, `John Smith`, `Smith Jr., John`). Every name
//! that reaches the court tracker goes through [`normalize_name`] so that a
//! player maps to one [`PlayerId`] of the form `LAST.FIRST`.

/// Canonical player key, `LAST.FIRST`.
pub type PlayerId = String;

const SUFFIXES: &[&str] = &["JR", "SR", "II", "III", "IV"];

/// Canonicalizes a raw name to `LAST.FIRST`.
///
/// Team rows (`TEAM`, anything parenthesized) are returned upper-cased but
/// otherwise untouched. A name that is already canonical is returned as is.
pub fn normalize_name(raw: &str) -> PlayerId {
    let name = raw
        .trim()
        .to_uppercase()
        .trim_start_matches(['.', ','])
        .trim_end_matches(['.', ','])
        .trim()
        .to_string();

    if name.is_empty() || name == "TEAM" || name.contains('(') {
        return name;
    }

    if let Some((last, first)) = name.split_once(',') {
        let last = clean_part(last);
        let first = clean_part(first);
        if !last.is_empty() {
            return join(&last, &first);
        }
        // `JR,AVERY JOHNSON`: the suffix ate the surname slot.
        return from_words(&first_words(first.as_str(), &name));
    }

    if name.split_whitespace().count() > 1 {
        return from_words(&name);
    }

    if name.matches('.').count() == 1 {
        return name;
    }

    name.replace('.', "")
}

fn first_words(first: &str, fallback: &str) -> String {
    if first.is_empty() {
        fallback.replace(',', " ")
    } else {
        first.to_string()
    }
}

/// `C.J. BURKS` / `TERRY NOLAN JR.` style: surname is the last real word.
fn from_words(name: &str) -> PlayerId {
    let words: Vec<String> = name
        .split_whitespace()
        .filter(|w| !is_nickname(w))
        .map(strip_word)
        .filter(|w| !w.is_empty() && !SUFFIXES.contains(&w.as_str()))
        .collect();

    match words.split_last() {
        Some((last, rest)) => join(last, &rest.concat()),
        None => String::new(),
    }
}

fn clean_part(part: &str) -> String {
    part.split_whitespace()
        .filter(|w| !is_nickname(w))
        .map(strip_word)
        .filter(|w| !w.is_empty() && !SUFFIXES.contains(&w.as_str()))
        .collect::<Vec<_>>()
        .concat()
}

fn strip_word(word: &str) -> String {
    word.chars().filter(|c| *c != '.' && *c != ',').collect()
}

fn is_nickname(word: &str) -> bool {
    word.starts_with('\'') || word.starts_with('"')
}

fn join(last: &str, first: &str) -> PlayerId {
    if first.is_empty() {
        last.to_string()
    } else {
        format!("{last}.{first}")
    }
}
