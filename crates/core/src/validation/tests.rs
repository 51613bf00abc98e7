use chrono::NaiveDate;
use proptest::prelude::*;
use rstest::rstest;

use super::*;

#[rstest]
#[case("kim@example.com", true)]
#[case("jennie.kim+sales@broker.co.kr", true)]
#[case("not-an-email", false)]
#[case("kim@", false)]
#[case("@example.com", false)]
#[case("kim lee@example.com", false)]
#[case("", false)]
fn test_email_rules(#[case] email: &str, #[case] ok: bool) {
    assert_eq!(validate_email(email).is_ok(), ok, "{email}");
}

#[test]
fn test_overlong_email_is_rejected() {
    let email = format!("{}@example.com", "a".repeat(250));
    assert_eq!(validate_email(&email), Err(ValidationError::Email));
}

#[rstest]
#[case("abcdef1!", true)]
#[case("Passw0rd?", true)]
#[case("a1!", false)]
#[case("abcdefgh1234567890!!x", false)]
#[case("abcdefgh!", false)]
#[case("12345678!", false)]
#[case("abcdefg12", false)]
fn test_password_rules(#[case] password: &str, #[case] ok: bool) {
    assert_eq!(validate_password(password).is_ok(), ok, "{password}");
}

#[test]
fn test_password_reports_missing_class() {
    assert_eq!(
        validate_password("abcdefgh!"),
        Err(ValidationError::PasswordMissing("digit"))
    );
    assert_eq!(
        validate_password("12345678!"),
        Err(ValidationError::PasswordMissing("letter"))
    );
}

#[rstest]
#[case("김제니", true)]
#[case("Jennie", true)]
#[case("김", false)]
#[case("김 제니", false)]
#[case("jen!", false)]
#[case("abcdefghijk", false)]
fn test_person_name_rules(#[case] name: &str, #[case] ok: bool) {
    assert_eq!(validate_person_name(name).is_ok(), ok, "{name}");
}

#[test]
fn test_length_counts_characters_not_bytes() {
    // Ten Hangul syllables are 30 bytes in UTF-8.
    assert!(validate_role_name("가나다라마바사아자차").is_ok());
    assert!(validate_company_name("가나다라마바사아자차카").is_err());
}

#[test]
fn test_label_error_messages() {
    assert_eq!(
        validate_company_name("a").unwrap_err().to_string(),
        "Company name must be 2 to 10 characters long"
    );
    assert_eq!(
        validate_role_name("team lead").unwrap_err().to_string(),
        "Role name must not contain spaces"
    );
}

#[rstest]
#[case("12가 3456", true)]
#[case("1234", true)]
#[case("123", false)]
#[case("12AB3456", false)]
#[case("12가#3456", false)]
fn test_vehicle_id_rules(#[case] vehicle_id: &str, #[case] ok: bool) {
    assert_eq!(validate_vehicle_id(vehicle_id).is_ok(), ok, "{vehicle_id}");
}

#[test]
fn test_vehicle_model_allows_spaces_and_letters() {
    assert!(validate_vehicle_model("벤츠 E220d").is_ok());
    assert!(validate_vehicle_model("K5").is_ok());
    assert!(validate_vehicle_model("K").is_err());
    assert!(validate_vehicle_model("K5?").is_err());
}

#[test]
fn test_memo_and_extra_name_lengths() {
    assert!(validate_memo("메모1").is_ok());
    assert!(validate_memo("x").is_err());
    assert!(validate_extra_name("holiday bonus").is_ok());
    assert!(validate_extra_name("a very long bonus name").is_err());
}

#[test]
fn test_parse_date() {
    assert_eq!(
        parse_date("2022-02-28"),
        Ok(NaiveDate::from_ymd_opt(2022, 2, 28).unwrap())
    );
    assert_eq!(parse_date("2022-02-30"), Err(ValidationError::Date));
    assert_eq!(parse_date("2022/02/01"), Err(ValidationError::Date));
    assert_eq!(parse_date(""), Err(ValidationError::Date));
}

proptest! {
    /// Any label made of Hangul syllables passes iff its length is within bounds.
    #[test]
    fn test_hangul_label_length(len in 0usize..20) {
        let name: String = std::iter::repeat_n('가', len).collect();
        prop_assert_eq!(validate_person_name(&name).is_ok(), (2..=10).contains(&len));
    }

    /// A special character anywhere rejects a label.
    #[test]
    fn test_special_anywhere_rejects(prefix in "[a-z]{1,4}", idx in 0usize..12, suffix in "[a-z]{1,4}") {
        let special = SPECIAL_CHARACTERS.chars().nth(idx).unwrap();
        let name = format!("{prefix}{special}{suffix}");
        prop_assert!(validate_role_name(&name).is_err());
    }
}
