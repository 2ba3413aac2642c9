use serde::{Deserialize, Deserializer, Serialize};

/// Upper bound on the trimmed input, counted in UTF-16 code units.
pub const MAX_TEXT_UNITS: usize = 8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Word,
    #[default]
    Json,
}

impl OutputFormat {
    pub fn from_word_flag(as_word: bool) -> Self {
        if as_word {
            Self::Word
        } else {
            Self::Json
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VocabularyEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub english: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chinese: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,
}

impl VocabularyEntry {
    pub fn new(
        english: impl Into<String>,
        chinese: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            english: english.into(),
            chinese: chinese.into(),
            explanation: explanation.into(),
        }
    }
}

/// Reads an explicit JSON `null` as the field's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Length as the browser form measures it.
pub fn text_units(text: &str) -> usize {
    text.encode_utf16().count()
}
