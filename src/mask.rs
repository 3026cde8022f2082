//! Input masks for CPF, phone and CEP fields
//!
//! Masks are re-applied to the whole field content on every keystroke, so
//! [`apply`] must be idempotent: masking an already masked value yields the
//! same value. Every mask is a digit extraction followed by separator
//! insertion at fixed digit positions. A separator is only emitted when a
//! digit follows it, which gives the progressive partial output users see
//! while typing.

/// Mask attached to a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MaskKind {
    #[default]
    None,
    /// CPF, `ddd.ddd.ddd-dd`
    NationalId,
    /// Brazilian mobile number, `(dd) ddddd-dddd`
    Phone,
    /// CEP, `ddddd-ddd`
    PostalCode,
}

/// Fixed-position layout of a masked value
struct Layout {
    max_digits: usize,
    /// Emitted before the first digit once more than `opening.0` digits exist
    opening: Option<(usize, &'static str)>,
    /// `(index, sep)` emits `sep` right before digit `index`
    separators: &'static [(usize, &'static str)],
}

const NATIONAL_ID: Layout = Layout {
    max_digits: 11,
    opening: None,
    separators: &[(3, "."), (6, "."), (9, "-")],
};

const PHONE: Layout = Layout {
    max_digits: 11,
    opening: Some((2, "(")),
    separators: &[(2, ") "), (7, "-")],
};

const POSTAL_CODE: Layout = Layout {
    max_digits: 8,
    opening: None,
    separators: &[(5, "-")],
};

impl MaskKind {
    fn layout(self) -> Option<&'static Layout> {
        match self {
            MaskKind::None => None,
            MaskKind::NationalId => Some(&NATIONAL_ID),
            MaskKind::Phone => Some(&PHONE),
            MaskKind::PostalCode => Some(&POSTAL_CODE),
        }
    }

    /// Number of digits in a complete value, `None` for unmasked fields
    pub fn digit_count(self) -> Option<usize> {
        self.layout().map(|layout| layout.max_digits)
    }

    /// Placeholder shown for an empty field
    pub fn placeholder(self) -> Option<&'static str> {
        match self {
            MaskKind::None => None,
            MaskKind::NationalId => Some("000.000.000-00"),
            MaskKind::Phone => Some("(00) 00000-0000"),
            MaskKind::PostalCode => Some("00000-000"),
        }
    }
}

/// Keep only the ASCII digits of `input`
pub fn digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Format `input` according to `kind`
///
/// Total over all inputs: letters and symbols are discarded, surplus digits
/// are truncated, and [`MaskKind::None`] returns the input unchanged.
pub fn apply(kind: MaskKind, input: &str) -> String {
    let Some(layout) = kind.layout() else {
        return input.to_string();
    };

    let digits: Vec<char> = input
        .chars()
        .filter(char::is_ascii_digit)
        .take(layout.max_digits)
        .collect();

    let mut out = String::with_capacity(layout.max_digits + 4);
    if let Some((after, opening)) = layout.opening {
        if digits.len() > after {
            out.push_str(opening);
        }
    }

    let mut separators = layout.separators.iter().peekable();
    for (index, digit) in digits.iter().enumerate() {
        if let Some((_, sep)) = separators.next_if(|(at, _)| *at == index) {
            out.push_str(sep);
        }
        out.push(*digit);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [MaskKind; 4] = [
        MaskKind::None,
        MaskKind::NationalId,
        MaskKind::Phone,
        MaskKind::PostalCode,
    ];

    mod national_id {
        use super::*;

        #[test]
        fn test_full_cpf() {
            assert_eq!(apply(MaskKind::NationalId, "12345678901"), "123.456.789-01");
        }

        #[test]
        fn test_progressive_partial_output() {
            let expected = [
                "1",
                "12",
                "123",
                "123.4",
                "123.45",
                "123.456",
                "123.456.7",
                "123.456.78",
                "123.456.789",
                "123.456.789-0",
                "123.456.789-01",
            ];
            let input = "12345678901";
            for (len, want) in (1..=11).zip(expected) {
                assert_eq!(apply(MaskKind::NationalId, &input[..len]), want);
            }
        }

        #[test]
        fn test_truncates_extra_digits() {
            assert_eq!(
                apply(MaskKind::NationalId, "1234567890199999"),
                "123.456.789-01"
            );
        }

        #[test]
        fn test_keystroke_after_complete_value() {
            assert_eq!(
                apply(MaskKind::NationalId, "123.456.789-015"),
                "123.456.789-01"
            );
        }

        #[test]
        fn test_discards_letters_and_symbols() {
            assert_eq!(apply(MaskKind::NationalId, "a1b2c3.4-5 6"), "123.456");
        }
    }

    mod phone {
        use super::*;

        #[test]
        fn test_full_mobile_number() {
            assert_eq!(apply(MaskKind::Phone, "11987654321"), "(11) 98765-4321");
        }

        #[test]
        fn test_area_code_stays_bare_until_third_digit() {
            assert_eq!(apply(MaskKind::Phone, "1"), "1");
            assert_eq!(apply(MaskKind::Phone, "11"), "11");
            assert_eq!(apply(MaskKind::Phone, "119"), "(11) 9");
        }

        #[test]
        fn test_dash_after_fifth_digit_of_remainder() {
            assert_eq!(apply(MaskKind::Phone, "1198765"), "(11) 98765");
            assert_eq!(apply(MaskKind::Phone, "11987654"), "(11) 98765-4");
        }

        #[test]
        fn test_ten_digits_is_partial() {
            assert_eq!(apply(MaskKind::Phone, "1133334444"), "(11) 33334-444");
        }

        #[test]
        fn test_truncates_extra_digits() {
            assert_eq!(apply(MaskKind::Phone, "119876543210000"), "(11) 98765-4321");
        }

        #[test]
        fn test_reformats_pasted_international_number() {
            assert_eq!(
                apply(MaskKind::Phone, "+55 (11) 98765-4321"),
                "(55) 11987-6543"
            );
        }
    }

    mod postal_code {
        use super::*;

        #[test]
        fn test_full_cep() {
            assert_eq!(apply(MaskKind::PostalCode, "01310100"), "01310-100");
        }

        #[test]
        fn test_no_dash_before_sixth_digit() {
            assert_eq!(apply(MaskKind::PostalCode, "01310"), "01310");
            assert_eq!(apply(MaskKind::PostalCode, "013101"), "01310-1");
        }

        #[test]
        fn test_truncates_extra_digits() {
            assert_eq!(apply(MaskKind::PostalCode, "0131010099"), "01310-100");
        }
    }

    mod properties {
        use super::*;

        const SAMPLES: [&str; 10] = [
            "",
            "abc",
            "1",
            "12345",
            "12345678901",
            "123.456.789-01",
            "(11) 98765-4321",
            "01310-100",
            "9876543210987654321",
            " 0 1 3 1 0 x 1 0 0 ",
        ];

        #[test]
        fn test_empty_input_yields_empty_output() {
            for kind in ALL_KINDS {
                assert_eq!(apply(kind, ""), "");
            }
        }

        #[test]
        fn test_idempotent() {
            for kind in ALL_KINDS {
                for sample in SAMPLES {
                    let once = apply(kind, sample);
                    assert_eq!(apply(kind, &once), once, "{kind:?} on {sample:?}");
                }
            }
        }

        #[test]
        fn test_output_only_digits_and_separators() {
            let allowed = |kind: MaskKind| -> &'static str {
                match kind {
                    MaskKind::NationalId => ".-",
                    MaskKind::Phone => "() -",
                    MaskKind::PostalCode => "-",
                    MaskKind::None => unreachable!(),
                }
            };
            for kind in [MaskKind::NationalId, MaskKind::Phone, MaskKind::PostalCode] {
                for sample in SAMPLES {
                    let masked = apply(kind, sample);
                    assert!(
                        masked
                            .chars()
                            .all(|c| c.is_ascii_digit() || allowed(kind).contains(c)),
                        "{kind:?} produced {masked:?}"
                    );
                }
            }
        }

        #[test]
        fn test_never_exceeds_canonical_length() {
            let long = "9".repeat(64);
            for kind in [MaskKind::NationalId, MaskKind::Phone, MaskKind::PostalCode] {
                let canonical = kind.placeholder().unwrap();
                assert_eq!(apply(kind, &long).len(), canonical.len());
            }
        }

        #[test]
        fn test_none_is_identity() {
            for sample in SAMPLES {
                assert_eq!(apply(MaskKind::None, sample), sample);
            }
        }

        #[test]
        fn test_digit_count_matches_placeholder() {
            for kind in [MaskKind::NationalId, MaskKind::Phone, MaskKind::PostalCode] {
                let placeholder = kind.placeholder().unwrap();
                assert_eq!(kind.digit_count(), Some(digits(placeholder).len()));
            }
            assert_eq!(MaskKind::None.digit_count(), None);
        }
    }

    #[test]
    fn test_digits_strips_everything_else() {
        assert_eq!(digits("01310-100"), "01310100");
        assert_eq!(digits("sem numero"), "");
    }
}
