/*!
 * Tests for language utility functions
 */

use batchloc::language_utils::{
    LanguageCodeType, get_language_name, is_allowed_language, language_codes_match, normalize_to_part2t,
    validate_language_code,
};

/// Test validation of language codes
#[test]
fn test_validate_language_code_withValidCodes_shouldReturnCorrectType() {
    // ISO 639-1 tests
    assert!(matches!(validate_language_code("en").unwrap(), LanguageCodeType::Part1));
    assert!(matches!(validate_language_code("fr").unwrap(), LanguageCodeType::Part1));

    // ISO 639-2/T tests
    assert!(matches!(validate_language_code("eng").unwrap(), LanguageCodeType::Part2T));
    assert!(matches!(validate_language_code("deu").unwrap(), LanguageCodeType::Part2T));

    // ISO 639-2/B tests
    assert!(matches!(validate_language_code("fre").unwrap(), LanguageCodeType::Part2B));
    assert!(matches!(validate_language_code("ger").unwrap(), LanguageCodeType::Part2B));

    // Region subtags, whitespace and case
    assert!(matches!(validate_language_code("EN-GB").unwrap(), LanguageCodeType::Part1));
    assert!(matches!(validate_language_code(" ENG ").unwrap(), LanguageCodeType::Part2T));

    // Invalid codes
    assert!(validate_language_code("xyz").is_err());
    assert!(validate_language_code("123").is_err());
    assert!(validate_language_code("e").is_err());
}

/// Test normalization of language codes to ISO 639-2/T format
#[test]
fn test_normalize_to_part2t_withValidCodes_shouldNormalizeCorrectly() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("ger").unwrap(), "deu");
    assert_eq!(normalize_to_part2t("pt_BR").unwrap(), "por");
}

/// Test matching of the spellings translation services report
#[test]
fn test_language_codes_match_withProviderSpellings_shouldMatch() {
    assert!(language_codes_match("EN", "en"));
    assert!(language_codes_match("EN-US", "eng"));
    assert!(language_codes_match("fr", "fre"));
    assert!(!language_codes_match("en", "fra"));
}

/// Test the allowed-language check used by the language gate
#[test]
fn test_is_allowed_language_withDetectedCode_shouldCheckAllowedSet() {
    let allowed = vec!["en".to_string(), "de".to_string()];

    assert!(is_allowed_language("EN", &allowed));
    assert!(is_allowed_language("DE", &allowed));
    assert!(!is_allowed_language("FR", &allowed));
    assert!(!is_allowed_language("EN", &[]));
}

/// Test retrieval of language names from codes
#[test]
fn test_get_language_name_withValidCodes_shouldReturnCorrectName() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("fre").unwrap(), "French");
    assert!(get_language_name("xx").is_err());
}
