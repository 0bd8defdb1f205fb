//! Report localization pass
//! Translation failures degrade gracefully: the caller always gets report
//! text back, untranslated in the worst case

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use crate::config::LlmConfig;
use crate::llm::CompletionClient;

/// Supported report languages. English is the base language the report is
/// generated in; everything else is a translation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    English,
    Thai,
    SimplifiedChinese,
    TraditionalChinese,
    Vietnamese,
}

impl Language {
    pub fn is_base(&self) -> bool {
        matches!(self, Language::English)
    }

    /// Name used in the translation instruction
    pub fn instruction_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Thai => "Thai",
            Language::SimplifiedChinese => "Simplified Chinese",
            Language::TraditionalChinese => "Traditional Chinese",
            Language::Vietnamese => "Vietnamese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.instruction_name())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "english" => Ok(Language::English),
            "thai" => Ok(Language::Thai),
            "simplified_chinese" => Ok(Language::SimplifiedChinese),
            "traditional_chinese" => Ok(Language::TraditionalChinese),
            "vietnamese" => Ok(Language::Vietnamese),
            other => Err(format!("Unknown language: {}", other)),
        }
    }
}

/// Translate report text to the target language. For the base language the
/// input is returned unchanged and no service call is made. A failed
/// translation logs a warning and falls back to the original text.
pub async fn translate<C: CompletionClient + ?Sized>(
    client: &C,
    content: &str,
    language: Language,
    config: &LlmConfig,
) -> String {
    if language.is_base() {
        return content.to_string();
    }

    info!("Translating report to {}", language);

    let system_prompt = format!(
        "You are a professional financial translator. Translate the following market report to {} \
         while maintaining professional tone and financial accuracy.",
        language.instruction_name()
    );

    match client
        .complete(
            &system_prompt,
            content,
            config.translation_max_tokens,
            config.translation_temperature,
        )
        .await
    {
        Ok(translated) => translated,
        Err(e) => {
            warn!("Translation to {} failed: {}; keeping English text", language, e);
            content.to_string()
        }
    }
}
