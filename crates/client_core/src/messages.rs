//! User-facing strings for the form, in the languages the page ships with.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::error::SubmissionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    EnUs,
    ZhCn,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Self::EnUs => "en_us",
            Self::ZhCn => "zh_cn",
        }
    }

    pub fn text(self, key: MessageKey) -> &'static str {
        let table = match self {
            Self::EnUs => EN_US,
            Self::ZhCn => ZH_CN,
        };
        table
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .unwrap_or("")
    }

    /// Renders a submission failure the way the error region shows it.
    pub fn describe(self, error: &SubmissionError) -> String {
        match error {
            SubmissionError::EmptyInput => self.text(MessageKey::EmptyInput).to_string(),
            SubmissionError::InputTooLong { max, .. } => {
                fill(self.text(MessageKey::InputTooLong), &[max.to_string().as_str()])
            }
            SubmissionError::NetworkFailure(detail) => {
                fill(self.text(MessageKey::NetworkError), &[detail.as_str()])
            }
            SubmissionError::ApiFailure(detail) => detail.clone(),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown locale '{0}'")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "en" | "en_us" => Ok(Self::EnUs),
            "zh" | "zh_cn" => Ok(Self::ZhCn),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    EmptyInput,
    InputTooLong,
    NetworkError,
    TranslationFailed,
    TriggerIdle,
    TriggerBusy,
}

const EN_US: &[(MessageKey, &str)] = &[
    (MessageKey::EmptyInput, "empty input"),
    (MessageKey::InputTooLong, "input too long (max {} characters)"),
    (MessageKey::NetworkError, "network error: {}"),
    (MessageKey::TranslationFailed, "translation failed"),
    (MessageKey::TriggerIdle, "Translate"),
    (MessageKey::TriggerBusy, "Translating..."),
];

const ZH_CN: &[(MessageKey, &str)] = &[
    (MessageKey::EmptyInput, "请输入要翻译的文本"),
    (MessageKey::InputTooLong, "文本长度不能超过{}字符"),
    (MessageKey::NetworkError, "网络错误：{}"),
    (MessageKey::TranslationFailed, "翻译失败"),
    (MessageKey::TriggerIdle, "开始翻译"),
    (MessageKey::TriggerBusy, "处理中..."),
];

/// Replaces each `{}` placeholder in order.
fn fill(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for arg in args {
        if let Some(pos) = result.find("{}") {
            result.replace_range(pos..pos + 2, arg);
        }
    }
    result
}
