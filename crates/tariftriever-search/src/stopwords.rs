//! Per-language stopword lists
//!
//! Russian includes common legal-form abbreviations ("ооо", "ип") because
//! users paste them from invoices.

use tariftriever_common::Language;

const RU: &[&str] = &[
    "а", "арт", "без", "бы", "был", "быть", "в", "вам", "вас", "ведь", "во", "вот", "все",
    "для", "до", "его", "ее", "если", "еще", "же", "за", "зао", "и", "из", "или", "ип", "итд",
    "к", "как", "ко", "когда", "ли", "между", "на", "над", "не", "нет", "ни", "но", "о", "об",
    "обо", "около", "оао", "ооо", "от", "пао", "перед", "по", "под", "при", "пр", "с", "со",
    "так", "тд", "то", "только", "у", "уже", "через", "что",
];

const UZ: &[&str] = &[
    "agar", "ana", "biz", "bilan", "bu", "chunki", "da", "esa", "ham", "lekin", "mana", "men",
    "sen", "shu", "siz", "u", "uchun", "ular", "va", "yoki",
];

const EN: &[&str] = &[
    "a", "about", "above", "after", "again", "an", "and", "at", "before", "below", "between",
    "but", "by", "during", "for", "from", "in", "into", "of", "on", "or", "the", "then",
    "through", "to", "under", "up", "with",
];

fn list_for(language: &Language) -> &'static [&'static str] {
    match language {
        Language::Uz => UZ,
        Language::En => EN,
        Language::Ru | Language::Other(_) => RU,
    }
}

/// Whether `token` is a stopword in `language`. Unknown languages use Russian.
pub fn is_stopword(language: &Language, token: &str) -> bool {
    list_for(language).contains(&token)
}

/// Whether `token` is a stopword in any supported language.
///
/// Catalog descriptions carry no language tag, so they are filtered with
/// the union of every list.
pub fn is_stopword_any(token: &str) -> bool {
    [RU, UZ, EN].iter().any(|list| list.contains(&token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_lists() {
        assert!(is_stopword(&Language::Ru, "ооо"));
        assert!(is_stopword(&Language::En, "the"));
        assert!(is_stopword(&Language::Uz, "bilan"));
        assert!(!is_stopword(&Language::En, "ооо"));
        assert!(is_stopword(&Language::Other("kk".to_string()), "для"));
    }

    #[test]
    fn test_union_list() {
        assert!(is_stopword_any("и"));
        assert!(is_stopword_any("and"));
        assert!(is_stopword_any("va"));
        assert!(!is_stopword_any("яблоки"));
    }
}
