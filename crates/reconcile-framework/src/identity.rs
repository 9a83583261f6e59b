//! # Composite Identifiers
//!
//! Remote resources live in a hierarchy (account shortname, resource name,
//! optional sub-resource name). The caller persists a single opaque string per
//! resource, so the hierarchy is folded into one `:`-delimited value here and
//! unfolded again on every read, update and delete.
//!
//! ```rust
//! use reconcile_framework::identity;
//!
//! let id = identity::encode(&["acct1", "fn1", "aliasA"]).unwrap();
//! assert_eq!(id, "acct1:fn1:aliasA");
//!
//! let [shortname, function, alias] = identity::decode::<3>(&id).unwrap();
//! assert_eq!((shortname.as_str(), function.as_str(), alias.as_str()), ("acct1", "fn1", "aliasA"));
//! ```
//!
//! Decoding splits from the left and lets the last component absorb any
//! further delimiters. Encoding refuses components that contain the delimiter,
//! since such a value could never be decoded back to the same parts.

use crate::error::FormatError;

/// Separator between identifier components.
pub const DELIMITER: &str = ":";

fn check_arity(arity: usize) -> Result<(), FormatError> {
    if (2..=3).contains(&arity) {
        Ok(())
    } else {
        Err(FormatError::Arity(arity))
    }
}

fn expected_shape(arity: usize) -> &'static str {
    match arity {
        2 => "<string>:<string>",
        _ => "<string>:<string>:<string>",
    }
}

/// Joins 2 or 3 non-empty components into a composite identifier.
pub fn encode(parts: &[&str]) -> Result<String, FormatError> {
    check_arity(parts.len())?;

    for (index, part) in parts.iter().enumerate() {
        if part.is_empty() {
            return Err(FormatError::EmptyComponent { index });
        }
        if part.contains(DELIMITER) {
            return Err(FormatError::DelimiterInComponent {
                component: (*part).to_string(),
                delimiter: DELIMITER,
            });
        }
    }

    Ok(parts.join(DELIMITER))
}

/// Splits a composite identifier into exactly `N` non-empty components.
///
/// `N` must be 2 or 3.
pub fn decode<const N: usize>(value: &str) -> Result<[String; N], FormatError> {
    check_arity(N)?;

    let malformed = || FormatError::Shape {
        expected: expected_shape(N),
        value: value.to_string(),
    };

    let parts: Vec<String> = value.splitn(N, DELIMITER).map(str::to_owned).collect();
    if parts.len() != N || parts.iter().any(String::is_empty) {
        return Err(malformed());
    }

    parts.try_into().map_err(|_| malformed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_triple() {
        let [a, b, c] = decode::<3>("acct1:fn1:aliasA").unwrap();
        assert_eq!(a, "acct1");
        assert_eq!(b, "fn1");
        assert_eq!(c, "aliasA");
    }

    #[test]
    fn test_encode_rejects_empty_component() {
        assert_eq!(
            encode(&["a", ""]),
            Err(FormatError::EmptyComponent { index: 1 })
        );
    }

    #[test]
    fn test_decode_rejects_trailing_empty_component() {
        let err = decode::<3>("a:b:").unwrap_err();
        assert!(matches!(err, FormatError::Shape { .. }));
        assert_eq!(
            err.to_string(),
            "unexpected format (expected '<string>:<string>:<string>'): a:b:"
        );
    }

    #[test]
    fn test_decode_rejects_too_few_components() {
        assert!(decode::<2>("lonely").is_err());
        assert!(decode::<3>("only:two").is_err());
        assert!(decode::<2>(":name").is_err());
    }

    #[test]
    fn test_decode_last_component_absorbs_extra_delimiters() {
        let [shortname, rest] = decode::<2>("acct:slot:with:colons").unwrap();
        assert_eq!(shortname, "acct");
        assert_eq!(rest, "slot:with:colons");
    }

    #[test]
    fn test_encode_rejects_delimiter_inside_component() {
        let err = encode(&["acct", "bad:name"]).unwrap_err();
        assert!(matches!(err, FormatError::DelimiterInComponent { .. }));
    }

    #[test]
    fn test_arity_outside_two_or_three_is_rejected() {
        assert_eq!(encode(&["only"]), Err(FormatError::Arity(1)));
        assert_eq!(encode(&["a", "b", "c", "d"]), Err(FormatError::Arity(4)));
        assert_eq!(decode::<4>("a:b:c:d"), Err(FormatError::Arity(4)));
    }

    proptest! {
        #[test]
        fn prop_pair_round_trips(a in "[A-Za-z0-9_.-]{1,24}", b in "[A-Za-z0-9_.-]{1,24}") {
            let id = encode(&[&a, &b]).unwrap();
            prop_assert_eq!(decode::<2>(&id).unwrap(), [a, b]);
        }

        #[test]
        fn prop_triple_round_trips(
            a in "[A-Za-z0-9_.-]{1,24}",
            b in "[A-Za-z0-9_.-]{1,24}",
            c in "[A-Za-z0-9_.-]{1,24}",
        ) {
            let id = encode(&[&a, &b, &c]).unwrap();
            prop_assert_eq!(decode::<3>(&id).unwrap(), [a, b, c]);
        }
    }
}
