//! Spelling variants that must compare equal.
//!
//! Lookups run on already lowercased tokens.

use fxhash::FxHashMap;
use once_cell::sync::Lazy;

/// Variant spelling → canonical spelling.
const EQUIVALENT_WORDS: &[(&str, &str)] = &[
    ("acknowledgement", "acknowledgment"),
    ("acknowledgements", "acknowledgments"),
    ("analogue", "analog"),
    ("analyse", "analyze"),
    ("artefact", "artifact"),
    ("authorisation", "authorization"),
    ("authorise", "authorize"),
    ("authorised", "authorized"),
    ("behaviour", "behavior"),
    ("calibre", "caliber"),
    ("cancelled", "canceled"),
    ("catalogue", "catalog"),
    ("centre", "center"),
    ("colour", "color"),
    ("defence", "defense"),
    ("emphasised", "emphasized"),
    ("favour", "favor"),
    ("favourite", "favorite"),
    ("fulfil", "fulfill"),
    ("fulfilment", "fulfillment"),
    ("honour", "honor"),
    ("https", "http"),
    ("initialise", "initialize"),
    ("judgement", "judgment"),
    ("labelled", "labeled"),
    ("labelling", "labeling"),
    ("licence", "license"),
    ("licenced", "licensed"),
    ("licences", "licenses"),
    ("licencing", "licensing"),
    ("licencor", "licensor"),
    ("licencee", "licensee"),
    ("memorise", "memorize"),
    ("modelling", "modeling"),
    ("offence", "offense"),
    ("optimise", "optimize"),
    ("organisation", "organization"),
    ("organise", "organize"),
    ("practise", "practice"),
    ("programme", "program"),
    ("realise", "realize"),
    ("recognise", "recognize"),
    ("signalling", "signaling"),
    ("sublicence", "sublicense"),
    ("summarise", "summarize"),
    ("travelling", "traveling"),
    ("utilisation", "utilization"),
    ("utilise", "utilize"),
    ("whilst", "while"),
];

/// Compounds written run together, hyphenated or as two words. Every
/// spelling tokenizes to the two words, so a template rule may sit between
/// them.
const COMPOUNDS: &[(&str, &str, &str)] = &[
    ("noncommercial", "non", "commercial"),
    ("nonexclusive", "non", "exclusive"),
    ("noninfringement", "non", "infringement"),
    ("nontransferable", "non", "transferable"),
    ("sublicense", "sub", "license"),
    ("sublicensed", "sub", "licensed"),
    ("sublicensee", "sub", "licensee"),
    ("sublicensees", "sub", "licensees"),
    ("sublicenses", "sub", "licenses"),
    ("sublicensing", "sub", "licensing"),
    ("sublicensable", "sub", "licensable"),
    ("percent", "per", "cent"),
    ("website", "web", "site"),
    ("email", "e", "mail"),
];

static EQUIVALENTS: Lazy<FxHashMap<&'static str, &'static str>> =
    Lazy::new(|| EQUIVALENT_WORDS.iter().copied().collect());

static SPLITS: Lazy<FxHashMap<&'static str, (&'static str, &'static str)>> = Lazy::new(|| {
    COMPOUNDS
        .iter()
        .map(|&(joined, first, second)| (joined, (first, second)))
        .collect()
});

/// Canonical spelling of `word`, or `None` when it has no variant.
pub(crate) fn canonical_spelling(word: &str) -> Option<&'static str> {
    EQUIVALENTS.get(word).copied()
}

/// The two words a run-together compound stands for.
pub(crate) fn split_compound(word: &str) -> Option<(&'static str, &'static str)> {
    SPLITS.get(word).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn british_spellings_fold() {
        assert_eq!(canonical_spelling("licence"), Some("license"));
        assert_eq!(canonical_spelling("behaviour"), Some("behavior"));
        assert_eq!(canonical_spelling("https"), Some("http"));
        assert_eq!(canonical_spelling("license"), None);
    }

    #[test]
    fn listed_compounds_split() {
        assert_eq!(split_compound("percent"), Some(("per", "cent")));
        assert_eq!(split_compound("sublicense"), Some(("sub", "license")));
        assert_eq!(
            split_compound("noninfringement"),
            Some(("non", "infringement"))
        );
        assert_eq!(split_compound("nonsense"), None);
        assert_eq!(split_compound("submit"), None);
    }
}
