//! 이벤트 속성 추출
//!
//! 설정된 속성 이름으로 이벤트에서 값을 찾아 인시던트 요청을 만듭니다.
//!
//! # 조회 규칙
//! - 이름이 비어 있으면 건너뜀
//! - 이벤트에 해당 속성이 없으면 건너뜀
//! - 값이 null이면 건너뜀
//! - 그 외에는 값의 텍스트 표현을 사용

use std::collections::BTreeMap;

use pagerpost_core::event::LogEvent;
use pagerpost_pagerduty::IncidentRequest;

use crate::config::ReactorConfig;

/// 조회 규칙에 따라 속성 값의 텍스트 표현을 반환합니다.
pub fn lookup(event: &LogEvent, name: &str) -> Option<String> {
    event.property(name).map(ToString::to_string)
}

/// 설정된 추가 속성 중 이벤트에 존재하는 것만 모아 페이로드를 만듭니다.
///
/// 같은 이름이 여러 번 설정되어 있어도 결과에는 한 번만 들어갑니다.
pub fn build_payload(event: &LogEvent, names: &[String]) -> BTreeMap<String, String> {
    names
        .iter()
        .filter_map(|name| lookup(event, name).map(|value| (name.clone(), value)))
        .collect()
}

/// 중복 제거 키를 조회합니다.
///
/// 텍스트 표현이 빈 문자열이면 키가 없는 것으로 취급합니다.
pub fn dedup_key(event: &LogEvent, name: Option<&str>) -> Option<String> {
    name.and_then(|name| lookup(event, name))
        .filter(|key| !key.is_empty())
}

/// 이벤트 하나에 대한 인시던트 요청을 만듭니다.
pub fn build_request(config: &ReactorConfig, event: &LogEvent) -> IncidentRequest {
    IncidentRequest {
        message: event.rendered_message.clone(),
        payload: build_payload(event, &config.additional_property_names),
        dedup_key: dedup_key(event, config.incident_id_property_name.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use pagerpost_core::event::PropertyValue;

    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    fn event() -> LogEvent {
        LogEvent::new("evt-1", "Payment failed for order 7")
            .with_property("foo", "bar")
            .with_property("incidentKey", "abc123")
            .with_property("count", 3)
            .with_property("ratio", 0.5)
            .with_property("flag", true)
            .with_property("nothing", PropertyValue::Null)
    }

    #[test]
    fn payload_copies_present_properties() {
        let payload = build_payload(&event(), &names(&["foo"]));
        assert_eq!(payload.len(), 1);
        assert_eq!(payload["foo"], "bar");
    }

    #[test]
    fn payload_skips_missing_null_and_empty_names() {
        let payload = build_payload(&event(), &names(&["missing", "nothing", ""]));
        assert!(payload.is_empty());
    }

    #[test]
    fn payload_uses_display_text_for_non_strings() {
        let payload = build_payload(&event(), &names(&["count", "ratio", "flag"]));
        assert_eq!(payload["count"], "3");
        assert_eq!(payload["ratio"], "0.5");
        assert_eq!(payload["flag"], "true");
    }

    #[test]
    fn payload_deduplicates_repeated_names() {
        let payload = build_payload(&event(), &names(&["foo", "foo"]));
        assert_eq!(payload.len(), 1);
    }

    #[test]
    fn dedup_key_found() {
        assert_eq!(
            dedup_key(&event(), Some("incidentKey")).as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn dedup_key_absent_cases() {
        let event = event().with_property("blank", "");
        assert_eq!(dedup_key(&event, None), None);
        assert_eq!(dedup_key(&event, Some("")), None);
        assert_eq!(dedup_key(&event, Some("missing")), None);
        assert_eq!(dedup_key(&event, Some("nothing")), None);
    }

    #[test]
    fn dedup_key_with_empty_text_is_absent() {
        let event = event().with_property("blank", "");
        assert_eq!(dedup_key(&event, Some("blank")), None);
        assert!(build_payload(&event, &names(&["blank"])).contains_key("blank"));
    }

    #[test]
    fn dedup_key_from_integer_property() {
        assert_eq!(dedup_key(&event(), Some("count")).as_deref(), Some("3"));
    }

    #[test]
    fn request_combines_message_payload_and_key() {
        let config = ReactorConfig::builder()
            .additional_property("foo")
            .incident_id_property_name("incidentKey")
            .build();
        let request = build_request(&config, &event());

        assert_eq!(request.message, "Payment failed for order 7");
        assert_eq!(request.payload.get("foo").map(String::as_str), Some("bar"));
        assert_eq!(request.dedup_key.as_deref(), Some("abc123"));
    }
}
