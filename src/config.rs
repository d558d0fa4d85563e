use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{ModelParams, ReviewSettings};

const OPENAI_COMPATIBLE_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
const DASHSCOPE_NATIVE_BASE_URL: &str = "https://dashscope.aliyuncs.com/api/v1";

/// 生成后端类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// 兼容 OpenAI Chat Completions 的服务（DashScope 兼容模式、Azure、Doubao 等）
    Openai,
    /// DashScope 原生文本生成接口
    Dashscope,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(BackendKind::Openai),
            "dashscope" => Ok(BackendKind::Dashscope),
            other => Err(ConfigError::InvalidValue {
                field: "backend".to_string(),
                reason: format!("未知后端 '{}'，可选 openai / dashscope", other),
            }),
        }
    }
}

impl BackendKind {
    /// 未配置 `llm_api_base_url` 时使用的默认地址
    pub fn default_base_url(&self) -> &'static str {
        match self {
            BackendKind::Openai => OPENAI_COMPATIBLE_BASE_URL,
            BackendKind::Dashscope => DASHSCOPE_NATIVE_BASE_URL,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Openai => write!(f, "openai"),
            BackendKind::Dashscope => write!(f, "dashscope"),
        }
    }
}

/// 分支失败时的处理策略
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// 任一要点失败立即中止整个请求，取消其余分支
    #[default]
    FailFast,
    /// 等待所有分支结束，失败的要点以错误条目出现在报告中
    CollectAll,
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fail_fast" => Ok(FailurePolicy::FailFast),
            "collect_all" => Ok(FailurePolicy::CollectAll),
            other => Err(ConfigError::InvalidValue {
                field: "failure_policy".to_string(),
                reason: format!("未知策略 '{}'，可选 fail_fast / collect_all", other),
            }),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub backend: BackendKind,
    pub llm_api_key: String,
    /// 为空时按 `backend` 取默认地址
    #[serde(default)]
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 两阶段参数 ---
    /// 内容匹配温度，偏向确定性
    pub match_temperature: f32,
    pub match_max_tokens: u32,
    /// 结论推理温度，偏向覆盖更多推理路径
    pub conclude_temperature: f32,
    pub conclude_max_tokens: u32,
    // --- 并发与容错 ---
    /// 同时进行中的评审要点数量上限
    pub max_concurrent_reviews: usize,
    pub failure_policy: FailurePolicy,
    /// 单次后端调用超时（秒）
    pub request_timeout_secs: u64,
    // --- HTTP 服务 ---
    pub server_bind_addr: String,
    /// 上传文件大小上限（字节）
    pub max_upload_bytes: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Openai,
            llm_api_key: String::new(),
            llm_api_base_url: OPENAI_COMPATIBLE_BASE_URL.to_string(),
            llm_model_name: "qwen-turbo".to_string(),
            match_temperature: 0.3,
            match_max_tokens: 512,
            conclude_temperature: 0.7,
            conclude_max_tokens: 1024,
            max_concurrent_reviews: 8,
            failure_policy: FailurePolicy::FailFast,
            request_timeout_secs: 60,
            server_bind_addr: "0.0.0.0:8000".to_string(),
            max_upload_bytes: 16 * 1024 * 1024,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量加载配置，未设置的项使用默认值
    ///
    /// 已设置但无法解析的值返回 `ConfigError::InvalidValue`。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let default = Self::default();
        let parse = |name: &str| var(name).map(|raw| (name.to_string(), raw));
        let mut config = Self {
            backend: parse_value(parse("LLM_BACKEND"))?.unwrap_or(default.backend),
            llm_api_key: var("LLM_API_KEY")
                .or_else(|| var("DASHSCOPE_API_KEY"))
                .unwrap_or(default.llm_api_key),
            llm_api_base_url: var("LLM_API_BASE_URL").unwrap_or_default(),
            llm_model_name: var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            match_temperature: parse_value(parse("MATCH_TEMPERATURE"))?
                .unwrap_or(default.match_temperature),
            match_max_tokens: parse_value(parse("MATCH_MAX_TOKENS"))?
                .unwrap_or(default.match_max_tokens),
            conclude_temperature: parse_value(parse("CONCLUDE_TEMPERATURE"))?
                .unwrap_or(default.conclude_temperature),
            conclude_max_tokens: parse_value(parse("CONCLUDE_MAX_TOKENS"))?
                .unwrap_or(default.conclude_max_tokens),
            max_concurrent_reviews: parse_value(parse("MAX_CONCURRENT_REVIEWS"))?
                .unwrap_or(default.max_concurrent_reviews),
            failure_policy: parse_value(parse("FAILURE_POLICY"))?
                .unwrap_or(default.failure_policy),
            request_timeout_secs: parse_value(parse("REQUEST_TIMEOUT_SECS"))?
                .unwrap_or(default.request_timeout_secs),
            server_bind_addr: var("SERVER_BIND_ADDR").unwrap_or(default.server_bind_addr),
            max_upload_bytes: parse_value(parse("MAX_UPLOAD_BYTES"))?
                .unwrap_or(default.max_upload_bytes),
            verbose_logging: parse_value(parse("VERBOSE_LOGGING"))?
                .unwrap_or(default.verbose_logging),
        };
        config.fill_backend_defaults();
        Ok(config)
    }

    /// 从 TOML 文件加载配置，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::TomlParseFailed { source, .. } => ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    /// 从 TOML 文本解析配置
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
                path: String::new(),
                source,
            })?;
        config.fill_backend_defaults();
        Ok(config)
    }

    /// DashScope 原生接口与兼容模式的默认地址不同
    fn fill_backend_defaults(&mut self) {
        if self.llm_api_base_url.trim().is_empty() {
            self.llm_api_base_url = self.backend.default_base_url().to_string();
        }
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.max_concurrent_reviews == 0 {
            return Err(invalid("max_concurrent_reviews", "必须大于 0"));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", "必须大于 0"));
        }
        for (field, value) in [
            ("match_temperature", self.match_temperature),
            ("conclude_temperature", self.conclude_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(invalid(field, "取值范围为 [0, 2]"));
            }
        }
        if self.match_max_tokens == 0 || self.conclude_max_tokens == 0 {
            return Err(invalid("max_tokens", "输出长度上限必须大于 0"));
        }
        Ok(())
    }

    /// 构建传入编排器的评审参数
    pub fn review_settings(&self) -> ReviewSettings {
        ReviewSettings {
            matcher: ModelParams::new(
                &self.llm_model_name,
                self.match_temperature,
                self.match_max_tokens,
            ),
            reasoner: ModelParams::new(
                &self.llm_model_name,
                self.conclude_temperature,
                self.conclude_max_tokens,
            ),
            max_concurrent_reviews: self.max_concurrent_reviews,
            failure_policy: self.failure_policy,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

/// 解析 (变量名, 原始值)；未设置返回 None
fn parse_value<T>(entry: Option<(String, String)>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match entry {
        Some((name, raw)) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| invalid(&name, &e.to_string())),
        None => Ok(None),
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_stage_parameters() {
        let config = Config::default();
        assert!(config.match_temperature < config.conclude_temperature);
        assert!(config.match_max_tokens < config.conclude_max_tokens);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
    }

    #[test]
    fn test_toml_partial_overrides_keep_defaults() {
        let config = Config::from_toml_str(
            r#"
            backend = "dashscope"
            llm_api_key = "sk-test"
            failure_policy = "collect_all"
            max_concurrent_reviews = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.backend, BackendKind::Dashscope);
        assert_eq!(config.failure_policy, FailurePolicy::CollectAll);
        assert_eq!(config.max_concurrent_reviews, 2);
        assert_eq!(config.llm_model_name, "qwen-turbo");
        assert_eq!(config.match_max_tokens, 512);
    }

    #[test]
    fn test_base_url_follows_backend_when_unset() {
        let config = Config::from_toml_str("backend = \"dashscope\"").unwrap();
        assert_eq!(config.llm_api_base_url, "https://dashscope.aliyuncs.com/api/v1");

        let config = Config::from_toml_str("backend = \"openai\"").unwrap();
        assert_eq!(
            config.llm_api_base_url,
            "https://dashscope.aliyuncs.com/compatible-mode/v1"
        );

        let config = Config::from_toml_str(
            r#"
            backend = "dashscope"
            llm_api_base_url = "https://dashscope-intl.aliyuncs.com/api/v1"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.llm_api_base_url,
            "https://dashscope-intl.aliyuncs.com/api/v1"
        );
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_env_values_and_defaults() {
        let config = Config::from_vars(vars(&[
            ("LLM_BACKEND", "dashscope"),
            ("DASHSCOPE_API_KEY", "sk-ds"),
            ("FAILURE_POLICY", "collect-all"),
            ("MAX_CONCURRENT_REVIEWS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.backend, BackendKind::Dashscope);
        assert_eq!(config.llm_api_key, "sk-ds");
        assert_eq!(config.llm_api_base_url, "https://dashscope.aliyuncs.com/api/v1");
        assert_eq!(config.failure_policy, FailurePolicy::CollectAll);
        assert_eq!(config.max_concurrent_reviews, 3);
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[test]
    fn test_env_rejects_malformed_values() {
        for (name, raw) in [
            ("FAILURE_POLICY", "colect_all"),
            ("LLM_BACKEND", "gemini"),
            ("MAX_CONCURRENT_REVIEWS", "many"),
        ] {
            match Config::from_vars(vars(&[(name, raw)])) {
                Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, name),
                other => panic!("{} = {} 应被拒绝: {:?}", name, raw, other),
            }
        }
    }

    #[test]
    fn test_toml_parse_error() {
        let err = Config::from_toml_str("max_concurrent_reviews = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParseFailed { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        assert!(matches!(config.validate(), Err(ConfigError::MissingApiKey)));

        config.llm_api_key = "sk-test".to_string();
        assert!(config.validate().is_ok());

        config.max_concurrent_reviews = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));

        config.max_concurrent_reviews = 4;
        config.conclude_temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_policy_and_backend_parsing() {
        assert_eq!(
            "collect-all".parse::<FailurePolicy>().unwrap(),
            FailurePolicy::CollectAll
        );
        assert_eq!(
            "FAIL_FAST".parse::<FailurePolicy>().unwrap(),
            FailurePolicy::FailFast
        );
        assert!("sometimes".parse::<FailurePolicy>().is_err());
        assert_eq!(
            "DashScope".parse::<BackendKind>().unwrap(),
            BackendKind::Dashscope
        );
    }

    #[test]
    fn test_review_settings_carry_stage_parameters() {
        let config = Config {
            llm_model_name: "qwen-plus".to_string(),
            request_timeout_secs: 15,
            ..Config::default()
        };
        let settings = config.review_settings();
        assert_eq!(settings.matcher.model_name, "qwen-plus");
        assert_eq!(settings.reasoner.max_output_tokens, 1024);
        assert_eq!(settings.request_timeout, Duration::from_secs(15));
    }
}
