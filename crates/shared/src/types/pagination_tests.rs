use super::*;

#[test]
fn test_page_request_default() {
    let request = PageRequest::default();
    assert_eq!(request.page, 0);
    assert_eq!(request.limit, 15);
    assert_eq!(request.offset(), 0);
}

#[test]
fn test_page_request_offset_is_zero_based() {
    assert_eq!(PageRequest::new(0, 15).offset(), 0);
    assert_eq!(PageRequest::new(1, 15).offset(), 15);
    assert_eq!(PageRequest::new(3, 20).offset(), 60);
}

#[test]
fn test_page_request_limit_is_clamped() {
    assert_eq!(PageRequest::new(0, 0).limit(), 1);
    assert_eq!(PageRequest::new(0, 5000).limit(), MAX_PAGE_SIZE);

    let raw = PageRequest { page: 2, limit: 0 };
    assert_eq!(raw.limit(), 1);
    assert_eq!(raw.offset(), 2);
}

#[test]
fn test_page_request_deserialize_defaults() {
    let request: PageRequest = serde_json::from_str("{}").unwrap();
    assert_eq!(request, PageRequest::default());

    let request: PageRequest = serde_json::from_str(r#"{"page": 4, "limit": 30}"#).unwrap();
    assert_eq!(request.offset(), 120);
}
