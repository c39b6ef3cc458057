//! 리액터 설정
//!
//! [`ReactorConfig`]는 core의 [`ReactorSettings`](pagerpost_core::config::ReactorSettings)
//! (호스트 설정 화면의 원시 입력값)를 attach 시점에 한 번 해석한 결과입니다.
//! attach 이후에는 변경되지 않습니다.
//!
//! # 사용 예시
//! ```ignore
//! use pagerpost_core::config::PagerpostConfig;
//! use pagerpost_reactor::config::ReactorConfig;
//!
//! let core_config = PagerpostConfig::default();
//! let config = ReactorConfig::from_settings(&core_config.reactor);
//! assert_eq!(config.application_name, "Seq");
//! ```

use pagerpost_core::config::ReactorSettings;
use pagerpost_pagerduty::ClientInfo;

/// 애플리케이션 이름이 없거나 비어 있을 때 사용하는 이름
pub const DEFAULT_APPLICATION_NAME: &str = "Seq";

/// 해석된 리액터 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactorConfig {
    /// 인시던트에 표시할 애플리케이션 이름 (항상 비어 있지 않음)
    pub application_name: String,
    /// 애플리케이션 URL (없으면 빈 문자열)
    pub application_url: String,
    /// 중복 제거 키로 쓸 속성 이름 (`None`이면 중복 제거 없음)
    pub incident_id_property_name: Option<String>,
    /// 페이로드에 복사할 속성 이름 (입력 순서 유지)
    pub additional_property_names: Vec<String>,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self::from_settings(&ReactorSettings::default())
    }
}

impl ReactorConfig {
    /// 원시 설정을 해석합니다. 실패하지 않으며 부수 효과가 없습니다.
    pub fn from_settings(settings: &ReactorSettings) -> Self {
        let application_name = settings
            .application_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_APPLICATION_NAME)
            .to_owned();

        Self {
            application_name,
            application_url: settings.application_url.clone().unwrap_or_default(),
            incident_id_property_name: settings
                .incident_id_property_name
                .clone()
                .filter(|name| !name.is_empty()),
            additional_property_names: split_lines(settings.additional_properties.as_deref()),
        }
    }

    /// 인시던트 클라이언트에 넘길 호출자 신원을 반환합니다.
    pub fn client_info(&self) -> ClientInfo {
        ClientInfo::new(self.application_name.clone(), self.application_url.clone())
    }

    /// 빌더를 생성합니다.
    pub fn builder() -> ReactorConfigBuilder {
        ReactorConfigBuilder::new()
    }
}

/// 줄 단위 텍스트를 이름 목록으로 나눕니다.
///
/// `\n`과 `\r\n`을 모두 줄 구분자로 인식하고, 모든 줄을 입력 그대로 순서대로 반환합니다.
/// 입력이 없거나 빈 문자열이면 빈 목록을 반환합니다.
pub fn split_lines(text: Option<&str>) -> Vec<String> {
    match text {
        Some(text) => text.lines().map(str::to_owned).collect(),
        None => Vec::new(),
    }
}

/// [`ReactorConfig`] 빌더
///
/// 설정 파일 없이 코드에서 리액터를 구성할 때 사용합니다.
/// `build()`는 [`ReactorConfig::from_settings`]와 같은 규칙을 적용합니다.
#[derive(Debug, Clone, Default)]
pub struct ReactorConfigBuilder {
    settings: ReactorSettings,
}

impl ReactorConfigBuilder {
    /// 빈 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 애플리케이션 이름을 지정합니다.
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.settings.application_name = Some(name.into());
        self
    }

    /// 애플리케이션 URL을 지정합니다.
    pub fn application_url(mut self, url: impl Into<String>) -> Self {
        self.settings.application_url = Some(url.into());
        self
    }

    /// 중복 제거 키 속성 이름을 지정합니다.
    pub fn incident_id_property_name(mut self, name: impl Into<String>) -> Self {
        self.settings.incident_id_property_name = Some(name.into());
        self
    }

    /// 추가 속성 이름을 하나 덧붙입니다.
    pub fn additional_property(mut self, name: impl AsRef<str>) -> Self {
        let lines = self.settings.additional_properties.get_or_insert_with(String::new);
        if !lines.is_empty() {
            lines.push('\n');
        }
        lines.push_str(name.as_ref());
        self
    }

    /// 줄 단위 텍스트로 추가 속성 목록 전체를 지정합니다.
    pub fn additional_properties(mut self, text: impl Into<String>) -> Self {
        self.settings.additional_properties = Some(text.into());
        self
    }

    /// 설정을 생성합니다.
    pub fn build(self) -> ReactorConfig {
        ReactorConfig::from_settings(&self.settings)
    }
}
