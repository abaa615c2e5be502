use super::types::RowKind;

/// Prefix of a registration-number header row.
pub const REGISTRATION_PREFIX: &str = "Nr rej. ";

/// Leading token of a date header row.
pub const DATE_PREFIX: &str = "Data";

/// Leading token of a per-stop summary row.
pub const DATA_PREFIX: &str = "Razem";

/// Substrings that make a row worth classifying at all.
const CANDIDATE_KEYWORDS: [&str; 3] = ["Nr rej", "Data ", "Razem"];

/// Coarse row selection: keeps any row mentioning one of the header keywords
/// anywhere in its text.
///
/// This is looser than [`classify`]. A row such as `"Trasa Nr rej. XY"` is a
/// candidate but still classifies as [`RowKind::Irrelevant`].
pub fn is_candidate(text: &str) -> bool {
    CANDIDATE_KEYWORDS.iter().any(|k| text.contains(k))
}

/// Strict, prefix-based classification of a single row.
pub fn classify(text: &str) -> RowKind {
    if text.starts_with(REGISTRATION_PREFIX) {
        // kept verbatim after the prefix, inner spacing included
        let reg = extract_reg_number(text);
        if reg.is_empty() {
            return RowKind::Irrelevant;
        }
        return RowKind::RegistrationMarker(reg.to_string());
    }

    if let Some(date) = extract_date(text) {
        if date.is_empty() {
            return RowKind::Irrelevant;
        }
        return RowKind::DateMarker(date.to_string());
    }

    if let Some(tokens) = extract_values(text) {
        return RowKind::DataMarker(tokens);
    }

    RowKind::Irrelevant
}

/// Strip the registration prefix. Text without the prefix is returned as is.
pub fn extract_reg_number(text: &str) -> &str {
    text.strip_prefix(REGISTRATION_PREFIX).unwrap_or(text)
}

/// Date label of a date header row: only the leading `Data` token is removed.
///
/// Returns `None` when the row does not start with `Data`.
pub fn extract_date(text: &str) -> Option<&str> {
    text.strip_prefix(DATE_PREFIX).map(str::trim)
}

/// Whitespace-split tokens of a data row with the leading `Razem` dropped.
pub fn extract_values(text: &str) -> Option<Vec<String>> {
    if !text.starts_with(DATA_PREFIX) {
        return None;
    }
    Some(
        text.split_whitespace()
            .skip(1)
            .map(str::to_string)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_reg_number_strips_prefix_only() {
        assert_eq!(extract_reg_number("Nr rej. TK1503U"), "TK1503U");
        assert_eq!(extract_reg_number("Something else"), "Something else");
        assert_eq!(extract_reg_number("Trasa Nr rej. TK1"), "Trasa Nr rej. TK1");
    }

    #[test]
    fn registration_row_classified() {
        assert_eq!(
            classify("Nr rej. TK1503U"),
            RowKind::RegistrationMarker("TK1503U".into())
        );
    }

    #[test]
    fn registration_remainder_kept_verbatim() {
        assert_eq!(
            classify("Nr rej.  TK1"),
            RowKind::RegistrationMarker(" TK1".into())
        );
        assert_eq!(
            classify("Nr rej. TK 1503U"),
            RowKind::RegistrationMarker("TK 1503U".into())
        );
    }

    #[test]
    fn date_row_keeps_trailing_tokens() {
        let kind = classify("Data 03-03-25 KM Stopy KM+Stopy+Dodatki Stawka Wartość");
        assert_eq!(
            kind,
            RowKind::DateMarker("03-03-25 KM Stopy KM+Stopy+Dodatki Stawka Wartość".into())
        );
    }

    #[test]
    fn date_removal_only_touches_leading_token() {
        assert_eq!(extract_date("Data 2024-09-01 Data"), Some("2024-09-01 Data"));
        assert_eq!(extract_date("Razem Data"), None);
    }

    #[test]
    fn data_row_tokens_drop_leading_keyword() {
        let kind = classify("Razem 13,4 0 4540 / 5367 4 583,99 PLN");
        let RowKind::DataMarker(tokens) = kind else {
            panic!("expected data marker");
        };
        assert_eq!(tokens[0], "13,4");
        assert_eq!(tokens[5], "4");
        assert_eq!(tokens.len(), 8);
    }

    #[test]
    fn data_row_collapses_repeated_spaces() {
        assert_eq!(
            extract_values("Razem  10,5   x"),
            Some(vec!["10,5".to_string(), "x".to_string()])
        );
    }

    #[test]
    fn candidate_filter_is_substring_based() {
        assert!(is_candidate("Nr rej. TK1503U"));
        assert!(is_candidate("Trasa Nr rej"));
        assert!(is_candidate("Okres Data 2024"));
        assert!(is_candidate("Suma Razem"));
        assert!(!is_candidate("Database"));
        assert!(!is_candidate("Kierowca: Jan"));
    }

    #[test]
    fn candidate_without_prefix_is_inert() {
        let text = "Trasa Nr rej. TK1503U";
        assert!(is_candidate(text));
        assert_eq!(classify(text), RowKind::Irrelevant);
    }

    #[test]
    fn empty_markers_are_irrelevant() {
        assert_eq!(classify("Nr rej. "), RowKind::Irrelevant);
        assert_eq!(classify("Data   "), RowKind::Irrelevant);
    }

    #[test]
    fn unrelated_row_is_irrelevant() {
        assert_eq!(classify("Kierowca Jan Kowalski"), RowKind::Irrelevant);
        assert_eq!(classify(""), RowKind::Irrelevant);
    }
}
