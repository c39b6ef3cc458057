//! 이벤트 모델 — 호스트가 리액터에 전달하는 로그 이벤트
//!
//! [`LogEvent`]는 렌더링된 메시지, 고유 ID, 그리고 속성 이름에서
//! [`PropertyValue`]로의 매핑을 담습니다. 리액터는 이벤트를 읽기만 하며
//! 소유권은 호스트에 있습니다.
//!
//! 속성 값은 런타임 타입 검사 대신 태그된 열거형으로 표현하며,
//! 텍스트 변환은 [`PropertyValue`]의 `Display` 구현이 담당합니다.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// 로그 레벨
///
/// `Ord` 구현으로 레벨 비교가 가능합니다
/// (`Verbose < Debug < Information < Warning < Error < Fatal`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum LogLevel {
    /// 가장 상세한 추적 로그
    Verbose,
    /// 디버그 로그
    Debug,
    /// 일반 정보 (CLEF 기본값)
    #[default]
    Information,
    /// 경고
    Warning,
    /// 에러
    Error,
    /// 치명적 에러
    Fatal,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verbose => write!(f, "verbose"),
            Self::Debug => write!(f, "debug"),
            Self::Information => write!(f, "information"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    /// 대소문자를 구분하지 않으며 흔히 쓰이는 약어도 허용합니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbose" | "trace" | "vrb" => Ok(Self::Verbose),
            "debug" | "dbg" => Ok(Self::Debug),
            "information" | "info" | "inf" => Ok(Self::Information),
            "warning" | "warn" | "wrn" => Ok(Self::Warning),
            "error" | "err" => Ok(Self::Error),
            "fatal" | "critical" | "crit" | "ftl" => Ok(Self::Fatal),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// 이벤트 속성 값
///
/// JSON 값과 1:1로 대응하는 태그된 값입니다.
/// `Display`는 인시던트 페이로드에 들어갈 텍스트 표현을 만듭니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// null
    Null,
    /// 불리언
    Bool(bool),
    /// 정수
    Integer(i64),
    /// 부동소수점
    Float(f64),
    /// 문자열
    String(String),
    /// 배열
    Sequence(Vec<PropertyValue>),
    /// 객체 (키 순서는 정렬됨)
    Structure(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    /// null 값인지 확인합니다.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// JSON 값으로 변환합니다.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Integer(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
            Self::Structure(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
            // 중첩 값은 JSON 텍스트로 렌더링
            Self::Sequence(_) | Self::Structure(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<serde_json::Value> for PropertyValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(fields) => Self::Structure(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// 호스트가 전달하는 로그 이벤트
///
/// 리액터 입장에서는 읽기 전용입니다.
#[derive(Debug, Clone)]
pub struct LogEvent {
    /// 이벤트 고유 ID
    pub id: String,
    /// 발생 시각
    pub timestamp: SystemTime,
    /// 로그 레벨
    pub level: LogLevel,
    /// 렌더링된 메시지 (인시던트 제목으로 사용)
    pub rendered_message: String,
    /// 예외 텍스트 (있을 경우)
    pub exception: Option<String>,
    /// 속성 이름 -> 값
    pub properties: HashMap<String, PropertyValue>,
}

impl LogEvent {
    /// 속성이 없는 새 이벤트를 생성합니다.
    pub fn new(id: impl Into<String>, rendered_message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timestamp: SystemTime::now(),
            level: LogLevel::default(),
            rendered_message: rendered_message.into(),
            exception: None,
            properties: HashMap::new(),
        }
    }

    /// 로그 레벨을 지정합니다.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// 속성을 추가합니다. 같은 이름이 있으면 덮어씁니다.
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// 이름으로 속성을 조회합니다.
    ///
    /// 이름이 비어 있거나, 속성이 없거나, 값이 null이면 `None`을 반환합니다.
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        if name.is_empty() {
            return None;
        }
        self.properties.get(name).filter(|v| !v.is_null())
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LogEvent[{}] [{}] {}",
            self.id, self.level, self.rendered_message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ordering() {
        assert!(LogLevel::Verbose < LogLevel::Debug);
        assert!(LogLevel::Information < LogLevel::Warning);
        assert!(LogLevel::Error < LogLevel::Fatal);
    }

    #[test]
    fn level_parses_aliases_case_insensitively() {
        assert_eq!("ERROR".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!("Information".parse::<LogLevel>().unwrap(), LogLevel::Information);
        assert_eq!("crit".parse::<LogLevel>().unwrap(), LogLevel::Fatal);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn level_display_roundtrips_through_parse() {
        for level in [
            LogLevel::Verbose,
            LogLevel::Debug,
            LogLevel::Information,
            LogLevel::Warning,
            LogLevel::Error,
            LogLevel::Fatal,
        ] {
            assert_eq!(level.to_string().parse::<LogLevel>().unwrap(), level);
        }
    }

    #[test]
    fn property_value_display_text() {
        assert_eq!(PropertyValue::from("bar").to_string(), "bar");
        assert_eq!(PropertyValue::from(42_i64).to_string(), "42");
        assert_eq!(PropertyValue::from(1.5_f64).to_string(), "1.5");
        assert_eq!(PropertyValue::from(true).to_string(), "true");
        assert_eq!(PropertyValue::Null.to_string(), "");
    }

    #[test]
    fn nested_values_render_as_json() {
        let value = PropertyValue::from(serde_json::json!({"b": [1, 2], "a": "x"}));
        assert_eq!(value.to_string(), r#"{"a":"x","b":[1,2]}"#);
    }

    #[test]
    fn from_json_number_prefers_integer() {
        assert_eq!(
            PropertyValue::from(serde_json::json!(7)),
            PropertyValue::Integer(7)
        );
        assert_eq!(
            PropertyValue::from(serde_json::json!(7.25)),
            PropertyValue::Float(7.25)
        );
    }

    #[test]
    fn property_lookup_skips_empty_name_missing_and_null() {
        let event = LogEvent::new("1", "hello")
            .with_property("foo", "bar")
            .with_property("nothing", PropertyValue::Null);

        assert_eq!(event.property("foo"), Some(&PropertyValue::from("bar")));
        assert_eq!(event.property(""), None);
        assert_eq!(event.property("missing"), None);
        assert_eq!(event.property("nothing"), None);
    }

    #[test]
    fn event_display_contains_id_and_message() {
        let event = LogEvent::new("event-42", "disk full").with_level(LogLevel::Error);
        let text = event.to_string();
        assert!(text.contains("event-42"));
        assert!(text.contains("error"));
        assert!(text.contains("disk full"));
    }
}
