//! Hybrid keyword / embedding-similarity intent classifier

use crate::{cosine_similarity, EmbeddingError, EmbeddingProvider, Intent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("embedding provider failed: {0}")]
    Provider(#[from] EmbeddingError),
    #[error("no intent templates configured")]
    NoTemplates,
}

/// One anchor phrase per intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentTemplate {
    pub intent: Intent,
    pub phrase: String,
}

pub fn default_templates() -> Vec<IntentTemplate> {
    vec![
        IntentTemplate {
            intent: Intent::Save,
            phrase: "저장 롯데카드 1 저장 삼성카드 2번 저장 민증 3".to_string(),
        },
        IntentTemplate {
            intent: Intent::Delete,
            phrase: "삭제 롯데카드 삭제 민증 삭제 삼성카드".to_string(),
        },
        IntentTemplate {
            intent: Intent::Move,
            phrase: "롯데카드 민증 삼성카드 이동".to_string(),
        },
    ]
}

/// Outcome of a classification, with how it was reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub intent: Intent,
    /// Best template similarity; `None` when a keyword decided.
    pub similarity: Option<f32>,
}

impl Classification {
    pub fn by_keyword(&self) -> bool {
        self.similarity.is_none()
    }
}

/// Classifies into Save/Delete/Move. Never yields [`Intent::Unknown`]:
/// the embedding fallback always commits to the nearest template.
pub struct IntentClassifier {
    provider: Arc<dyn EmbeddingProvider>,
    anchors: Vec<(Intent, Vec<f32>)>,
}

impl IntentClassifier {
    /// Embeds every template once up front.
    pub async fn new(
        provider: Arc<dyn EmbeddingProvider>,
        templates: Vec<IntentTemplate>,
    ) -> Result<Self, ClassifyError> {
        if templates.is_empty() {
            return Err(ClassifyError::NoTemplates);
        }
        let mut anchors = Vec::with_capacity(templates.len());
        for template in templates {
            let vector = provider.embed(&template.phrase).await?;
            anchors.push((template.intent, vector));
        }
        debug!(
            provider = provider.name(),
            anchors = anchors.len(),
            "intent templates embedded"
        );
        Ok(Self { provider, anchors })
    }

    pub async fn classify(&self, text: &str) -> Result<Intent, ClassifyError> {
        Ok(self.classify_scored(text).await?.intent)
    }

    pub async fn classify_scored(&self, text: &str) -> Result<Classification, ClassifyError> {
        if let Some(intent) = Intent::from_keywords(text) {
            return Ok(Classification {
                intent,
                similarity: None,
            });
        }

        let query = self.provider.embed(text).await?;
        let mut best: Option<(Intent, f32)> = None;
        for (intent, anchor) in &self.anchors {
            let sim = cosine_similarity(&query, anchor);
            // Strictly greater keeps the earliest template on ties.
            let better = match best {
                None => true,
                Some((_, best_sim)) => sim > best_sim,
            };
            if better {
                best = Some((*intent, sim));
            }
        }
        let (intent, sim) = best.ok_or(ClassifyError::NoTemplates)?;
        debug!(%intent, similarity = sim, "classified by template similarity");
        Ok(Classification {
            intent,
            similarity: Some(sim),
        })
    }
}
