use rstest::rstest;

use super::*;

#[rstest]
#[case(UserAccess::Sr, false, false, false)]
#[case(UserAccess::Ar, true, false, false)]
#[case(UserAccess::Arw, true, true, true)]
fn test_user_levels(
    #[case] level: UserAccess,
    #[case] reads_all: bool,
    #[case] writes_all: bool,
    #[case] writes_own: bool,
) {
    assert_eq!(level.reads_all(), reads_all);
    assert_eq!(level.writes_all(), writes_all);
    assert_eq!(level.writes_own(), writes_own);
}

#[rstest]
#[case(TransactionAccess::Srw, false, false, true)]
#[case(TransactionAccess::Ar, true, false, false)]
#[case(TransactionAccess::Arw, true, true, true)]
fn test_transaction_levels(
    #[case] level: TransactionAccess,
    #[case] reads_all: bool,
    #[case] writes_all: bool,
    #[case] writes_own: bool,
) {
    assert_eq!(level.reads_all(), reads_all);
    assert_eq!(level.writes_all(), writes_all);
    assert_eq!(level.writes_own(), writes_own);
}

#[rstest]
#[case(InvoiceAccess::Sr, false, false, false)]
#[case(InvoiceAccess::Ar, true, false, false)]
#[case(InvoiceAccess::Arw, true, true, true)]
fn test_invoice_levels(
    #[case] level: InvoiceAccess,
    #[case] reads_all: bool,
    #[case] writes_all: bool,
    #[case] writes_own: bool,
) {
    assert_eq!(level.reads_all(), reads_all);
    assert_eq!(level.is_self_scoped(), !reads_all);
    assert_eq!(level.writes_all(), writes_all);
    assert_eq!(level.writes_own(), writes_own);
}

#[test]
fn test_codes_parse_per_domain() {
    assert_eq!("SRW".parse::<TransactionAccess>(), Ok(TransactionAccess::Srw));
    assert_eq!("ARW".parse::<UserAccess>(), Ok(UserAccess::Arw));
    assert_eq!(InvoiceAccess::Ar.to_string(), "AR");

    let err = "SRW".parse::<UserAccess>().unwrap_err();
    assert_eq!(err.domain, "user");
    assert_eq!(err.to_string(), "'SRW' is not a valid user permission");
    assert!("SR".parse::<TransactionAccess>().is_err());
    assert!("arw".parse::<InvoiceAccess>().is_err());
}

#[test]
fn test_serde_uses_codes() {
    let json = serde_json::to_value(PermissionSet::DEFAULT).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"user": "SR", "transaction": "SRW", "invoice": "SR"})
    );

    let parsed: PermissionSet =
        serde_json::from_str(r#"{"user":"ARW","transaction":"ARW","invoice":"ARW"}"#).unwrap();
    assert_eq!(parsed, PermissionSet::ADMIN);
}

#[test]
fn test_row_scoping() {
    assert!(can_read_row(TransactionAccess::Srw, 1, 1));
    assert!(!can_read_row(TransactionAccess::Srw, 1, 2));
    assert!(can_read_row(TransactionAccess::Ar, 1, 2));

    assert!(can_write_row(TransactionAccess::Srw, 1, 1));
    assert!(!can_write_row(TransactionAccess::Srw, 1, 2));
    assert!(!can_write_row(TransactionAccess::Ar, 1, 1));
    assert!(can_write_row(TransactionAccess::Arw, 1, 2));

    assert!(!can_write_row(InvoiceAccess::Sr, 5, 5));
}
