use crate::errors::{MoltcheckError, MoltcheckResult};
use crate::models::llm::OriginalPostContent;
use crate::prompts;
use crate::providers::ModelProvider;
use crate::services::PostCreator;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub const TOPIC_CATEGORIES: &[&str] = &[
    "tech_and_ai_hype",
    "startup_myths",
    "popular_science",
    "life_advice_bs",
    "crypto_and_finance",
    "health_and_wellness",
    "journalism_and_media",
];

const CATEGORY_TO_SUBMOLT: &[(&str, &str)] = &[
    ("tech_and_ai_hype", "ai-ethics"),
    ("startup_myths", "economics"),
    ("popular_science", "science"),
    ("life_advice_bs", "selfimprovement"),
    ("crypto_and_finance", "finance"),
    ("health_and_wellness", "health"),
    ("journalism_and_media", "random"),
];

pub const DEFAULT_SUBMOLT: &str = "science";

pub fn submolt_for_category(category: &str) -> &'static str {
    CATEGORY_TO_SUBMOLT
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, s)| *s)
        .unwrap_or(DEFAULT_SUBMOLT)
}

/// Generates original myth-busting content on a rotated topic category.
pub struct PostCreatorService {
    model: Arc<dyn ModelProvider>,
}

impl PostCreatorService {
    pub fn new(model: Arc<dyn ModelProvider>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl PostCreator for PostCreatorService {
    async fn create_post(
        &self,
        category: Option<&str>,
        submolt: Option<&str>,
    ) -> MoltcheckResult<OriginalPostContent> {
        let topic = category
            .unwrap_or_else(|| TOPIC_CATEGORIES[fastrand::usize(..TOPIC_CATEGORIES.len())]);
        let target_submolt = submolt.unwrap_or_else(|| submolt_for_category(topic));

        let prompt = prompts::create_original_post(topic, target_submolt);
        let raw = self
            .model
            .generate_json(prompts::SYSTEM_PERSONA, &prompt)
            .await?;
        let content: OriginalPostContent = serde_json::from_value(raw).map_err(|e| {
            MoltcheckError::Validation(format!("original post content malformed: {}", e))
        })?;
        content.validate()?;

        info!(
            category = %content.topic_category.as_deref().unwrap_or(topic),
            submolt = %content.target_submolt,
            "original post content generated"
        );
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_map_to_submolts() {
        assert_eq!(submolt_for_category("tech_and_ai_hype"), "ai-ethics");
        assert_eq!(submolt_for_category("health_and_wellness"), "health");
    }

    #[test]
    fn unknown_category_falls_back_to_default() {
        assert_eq!(submolt_for_category("underwater_basket_weaving"), DEFAULT_SUBMOLT);
    }

    #[test]
    fn every_topic_has_a_mapping() {
        for topic in TOPIC_CATEGORIES {
            // No topic silently falls through to the default by accident.
            assert!(
                CATEGORY_TO_SUBMOLT.iter().any(|(c, _)| c == topic),
                "missing submolt mapping for {}",
                topic
            );
        }
    }
}
