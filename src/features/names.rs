// Name normalization — the comparison key used for names and affiliations.
//
// The normalized form is surname first: ASCII-folded, lower-cased, with
// punctuation (except the comma) turned into whitespace. Surname tokens are
// glued together so "van der Berg" and "vanderberg" compare equal, then the
// given-name tokens follow, space-separated.
//
//   "Seiberg, Nana"          -> "seiberg nana"
//   "Rutgers U., Piscataway" -> "rutgersu piscataway"
//   "Nana Beard"             -> "beard nana"   (no comma: last token is the surname)

use std::sync::LazyLock;

use regex_lite::Regex;
use unicode_normalization::UnicodeNormalization;

static NON_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9,\s]").expect("valid regex"));

/// A name split into its surname and given-name tokens, as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameParts<'a> {
    pub surname: Vec<&'a str>,
    pub given: Vec<&'a str>,
}

/// Split a name into surname and given-name tokens without changing case.
///
/// "Last, First Middle" splits at the first comma. A name without a comma is
/// read as "First Middle Last".
pub fn split_name(name: &str) -> NameParts<'_> {
    match name.split_once(',') {
        Some((surname, given)) => NameParts {
            surname: surname.split_whitespace().collect(),
            given: given
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty())
                .collect(),
        },
        None => {
            let mut tokens: Vec<&str> = name.split_whitespace().collect();
            let surname = tokens.pop().into_iter().collect();
            NameParts {
                surname,
                given: tokens,
            }
        }
    }
}

/// Fold to ASCII, lower-case and replace punctuation other than commas with spaces.
fn scrub(text: &str) -> String {
    let folded: String = text
        .nfkd()
        .filter(char::is_ascii)
        .collect::<String>()
        .to_lowercase();
    NON_NAME_CHARS.replace_all(&folded, " ").into_owned()
}

/// Normalize a person or affiliation name into its surname-first comparison key.
pub fn normalize_name(name: &str) -> String {
    let scrubbed = scrub(name);
    let parts = split_name(&scrubbed);

    let mut tokens: Vec<String> = Vec::with_capacity(parts.given.len() + 1);
    let surname: String = parts.surname.concat();
    if !surname.is_empty() {
        tokens.push(surname);
    }
    tokens.extend(parts.given.iter().map(|t| t.to_string()));
    tokens.join(" ")
}

/// The normalized surname alone, the coarse key for same-surname checks.
pub fn normalized_surname(name: &str) -> String {
    split_name(&scrub(name)).surname.concat()
}
