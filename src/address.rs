//! OSC address validation and pattern matching
//!
//! Handlers are registered on literal addresses. Incoming messages may carry
//! patterns, which are matched part by part against every registered
//! address:
//!
//! - `?` matches any single character
//! - `*` matches any run of characters, including none
//! - `[abc]`, `[a-z]`, `[!a-z]` match one character from (or outside) a set
//! - `{foo,bar}` matches any one of the listed strings
//!
//! Wildcards never match the `/` separator, so a pattern and an address must
//! have the same number of parts to match.

use crate::error::AddressError;

/// Characters with pattern meaning, plus the characters OSC reserves for
/// packet syntax
const RESERVED: &[char] = &['*', '?', '[', ']', '{', '}', ' ', ',', '#', '\0'];

const PATTERN_CHARS: &[char] = &['*', '?', '[', ']', '{', '}'];

/// Check that `addr` can be used to register a handler.
///
/// A literal address starts with `/`, has no empty parts and contains no
/// pattern or reserved characters. Besides the pattern characters and space,
/// `,`, `#` and NUL are rejected as well; OSC 1.0 does not allow them in
/// address parts.
pub fn validate_literal_address(addr: &str) -> Result<(), AddressError> {
    if addr.is_empty() {
        return Err(AddressError::Empty);
    }
    let Some(rest) = addr.strip_prefix('/') else {
        return Err(AddressError::MissingLeadingSlash(addr.to_string()));
    };
    if rest.split('/').any(str::is_empty) {
        return Err(AddressError::EmptyPart(addr.to_string()));
    }
    if let Some(found) = addr.chars().find(|c| RESERVED.contains(c)) {
        return Err(AddressError::ReservedCharacter {
            address: addr.to_string(),
            found,
        });
    }
    Ok(())
}

/// Whether `addr` uses any pattern syntax
pub fn is_pattern(addr: &str) -> bool {
    addr.contains(PATTERN_CHARS)
}

/// Match an address pattern against a literal address.
///
/// The match is anchored: the whole address must match the whole pattern.
/// Malformed patterns (an unclosed `[` or `{`) match nothing.
pub fn match_address(pattern: &str, literal: &str) -> bool {
    if !is_pattern(pattern) {
        return pattern == literal;
    }

    let mut pattern_parts = pattern.split('/');
    let mut literal_parts = literal.split('/');
    loop {
        match (pattern_parts.next(), literal_parts.next()) {
            (None, None) => return true,
            (Some(p), Some(l)) => {
                let p: Vec<char> = p.chars().collect();
                let l: Vec<char> = l.chars().collect();
                if !match_part(&p, &l) {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

/// One element of a pattern part
enum Token {
    Literal(char),
    AnyChar,
    AnyRun,
    Class(Vec<char>),
    Alternatives(Vec<Vec<char>>),
}

/// Split a pattern part into tokens; `None` if a `[` or `{` is unclosed
fn tokenize(pattern: &[char]) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < pattern.len() {
        match pattern[i] {
            '*' => {
                // A run of stars is equivalent to one
                if !matches!(tokens.last(), Some(Token::AnyRun)) {
                    tokens.push(Token::AnyRun);
                }
                i += 1;
            }
            '?' => {
                tokens.push(Token::AnyChar);
                i += 1;
            }
            '[' => {
                let close = i + 1 + pattern[i + 1..].iter().position(|&c| c == ']')?;
                tokens.push(Token::Class(pattern[i + 1..close].to_vec()));
                i = close + 1;
            }
            '{' => {
                let close = i + 1 + pattern[i + 1..].iter().position(|&c| c == '}')?;
                let alternatives = pattern[i + 1..close]
                    .split(|&c| c == ',')
                    .map(<[char]>::to_vec)
                    .collect();
                tokens.push(Token::Alternatives(alternatives));
                i = close + 1;
            }
            c => {
                tokens.push(Token::Literal(c));
                i += 1;
            }
        }
    }
    Some(tokens)
}

/// Match one part by tracking every text offset reachable after each token.
///
/// Runs in time proportional to tokens × text length (times the number of
/// alternatives), whatever the arrangement of stars.
fn match_part(pattern: &[char], text: &[char]) -> bool {
    let Some(tokens) = tokenize(pattern) else {
        return false;
    };

    let mut reachable = vec![false; text.len() + 1];
    reachable[0] = true;

    for token in &tokens {
        let mut next = vec![false; text.len() + 1];
        match token {
            Token::AnyRun => {
                let mut seen = false;
                for (i, slot) in next.iter_mut().enumerate() {
                    seen |= reachable[i];
                    *slot = seen;
                }
            }
            Token::Alternatives(alternatives) => {
                for i in (0..=text.len()).filter(|&i| reachable[i]) {
                    for alt in alternatives {
                        if text[i..].starts_with(alt) {
                            next[i + alt.len()] = true;
                        }
                    }
                }
            }
            single => {
                for (i, &c) in text.iter().enumerate() {
                    if reachable[i] && matches_one(single, c) {
                        next[i + 1] = true;
                    }
                }
            }
        }
        if !next.contains(&true) {
            return false;
        }
        reachable = next;
    }

    reachable[text.len()]
}

fn matches_one(token: &Token, c: char) -> bool {
    match token {
        Token::Literal(l) => *l == c,
        Token::AnyChar => true,
        Token::Class(class) => match_class(class, c),
        Token::AnyRun | Token::Alternatives(_) => false,
    }
}

/// Match one character against the inside of a `[...]` class
fn match_class(class: &[char], c: char) -> bool {
    let (negate, items) = match class.split_first() {
        Some(('!', items)) => (true, items),
        _ => (false, class),
    };

    let mut found = false;
    let mut i = 0;
    while i < items.len() {
        // `a-z` is a range; a `-` at either end is literal
        if i + 2 < items.len() && items[i + 1] == '-' {
            let (lo, hi) = (items[i], items[i + 2]);
            if (lo.min(hi)..=lo.max(hi)).contains(&c) {
                found = true;
            }
            i += 3;
        } else {
            if items[i] == c {
                found = true;
            }
            i += 1;
        }
    }
    found != negate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_literal() {
        assert!(validate_literal_address("/a/b").is_ok());
        assert!(validate_literal_address("/address/test").is_ok());
        assert!(validate_literal_address("/mixer/ch-1/gain!").is_ok());
    }

    #[test]
    fn test_validate_rejects_patterns() {
        for addr in ["/a*/b", "/a[0-9]/b", "/a?", "/{a,b}", "/a b", "/a]", "/a,b", "/#a", "/a\0"] {
            assert!(
                matches!(
                    validate_literal_address(addr),
                    Err(AddressError::ReservedCharacter { .. })
                ),
                "{addr} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_rejects_malformed() {
        assert_eq!(validate_literal_address(""), Err(AddressError::Empty));
        assert_eq!(
            validate_literal_address("a/b"),
            Err(AddressError::MissingLeadingSlash("a/b".to_string()))
        );
        assert_eq!(
            validate_literal_address("/a//b"),
            Err(AddressError::EmptyPart("/a//b".to_string()))
        );
        assert_eq!(
            validate_literal_address("/a/"),
            Err(AddressError::EmptyPart("/a/".to_string()))
        );
        assert_eq!(
            validate_literal_address("/"),
            Err(AddressError::EmptyPart("/".to_string()))
        );
    }

    #[test]
    fn test_literal_fast_path() {
        assert!(match_address("/foo/bar", "/foo/bar"));
        assert!(!match_address("/foo/bar", "/foo/baz"));
        assert!(!match_address("/foo", "/foo/bar"));
    }

    #[test]
    fn test_star() {
        assert!(match_address("/foo/*", "/foo/bar"));
        assert!(!match_address("/foo/*", "/baz/bar"));
        assert!(match_address("/foo/b*", "/foo/b"));
        assert!(match_address("/foo/*r", "/foo/bar"));
        assert!(match_address("/*/*", "/foo/bar"));
        assert!(match_address("/foo/**", "/foo/bar"));
        assert!(!match_address("/foo/*", "/foo/bar/baz"));
        assert!(!match_address("/*", "/foo/bar"));
    }

    #[test]
    fn test_question_mark() {
        assert!(match_address("/ch/?", "/ch/1"));
        assert!(!match_address("/ch/?", "/ch/10"));
        assert!(!match_address("/ch/?", "/ch/"));
    }

    #[test]
    fn test_character_class() {
        assert!(match_address("/ch/[0-9]", "/ch/7"));
        assert!(!match_address("/ch/[0-9]", "/ch/a"));
        assert!(match_address("/ch/[abc]", "/ch/b"));
        assert!(match_address("/ch/[!0-9]", "/ch/x"));
        assert!(!match_address("/ch/[!0-9]", "/ch/5"));
        assert!(match_address("/ch/[a-]", "/ch/-"));
        assert!(match_address("/ch/[z-a]", "/ch/m"));
        assert!(!match_address("/ch/[0-9", "/ch/5"));
    }

    #[test]
    fn test_alternatives() {
        assert!(match_address("/mixer/{gain,pan}", "/mixer/gain"));
        assert!(match_address("/mixer/{gain,pan}", "/mixer/pan"));
        assert!(!match_address("/mixer/{gain,pan}", "/mixer/mute"));
        assert!(match_address("/{a,ab}c", "/abc"));
        assert!(!match_address("/mixer/{gain", "/mixer/gain"));
    }

    #[test]
    fn test_combined() {
        assert!(match_address("/synth/[0-9]*/{freq,amp}", "/synth/12/freq"));
        assert!(!match_address("/synth/[0-9]*/{freq,amp}", "/synth/x2/freq"));
    }

    #[test]
    fn test_many_stars_match_quickly() {
        let start = std::time::Instant::now();
        let pattern = format!("/{}b", "*a".repeat(14));
        let address = format!("/{}", "a".repeat(40));
        assert!(!match_address(&pattern, &address));

        let pattern = format!("/{}", "*a".repeat(64));
        let address = format!("/{}", "a".repeat(256));
        assert!(match_address(&pattern, &address));
        assert!(start.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_is_pattern() {
        assert!(is_pattern("/a/*"));
        assert!(is_pattern("/a/{b,c}"));
        assert!(!is_pattern("/a/b"));
    }
}
