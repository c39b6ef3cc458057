//! 인시던트 요청/결과 값 타입

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 인시던트를 보내는 쪽의 신원 (PagerDuty 화면의 client / client_url)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// 애플리케이션 이름
    pub name: String,
    /// 애플리케이션 URL (없으면 빈 문자열)
    pub url: String,
}

impl ClientInfo {
    /// 새 클라이언트 신원을 생성합니다.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// 이벤트 하나에 대해 만들어지는 인시던트 요청
///
/// 클라이언트 호출이 끝나면 버려집니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentRequest {
    /// 인시던트 제목 (이벤트의 렌더링된 메시지)
    pub message: String,
    /// 이벤트에서 복사한 추가 속성
    pub payload: BTreeMap<String, String>,
    /// 중복 제거 키 (없으면 서비스가 새 인시던트를 만듭니다)
    pub dedup_key: Option<String>,
}

/// 인시던트 전송 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryResult {
    /// 성공 여부
    pub success: bool,
    /// 사람이 읽을 수 있는 결과 메시지
    pub message: String,
}

impl DeliveryResult {
    /// 성공 결과를 생성합니다.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// 실패 결과를 생성합니다.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl fmt::Display for DeliveryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "success" } else { "failure" };
        write!(f, "{status}: {}", self.message)
    }
}
