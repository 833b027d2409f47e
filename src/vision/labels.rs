//! ImageNet label table and top-K decoding

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::PredictError;

/// One decoded class, serialized as `[class_id, label, score]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, String, f32)", into = "(String, String, f32)")]
pub struct Prediction {
    /// WordNet id, e.g. `n02504458`
    pub class_id: String,
    pub label: String,
    pub score: f32,
}

impl From<(String, String, f32)> for Prediction {
    fn from((class_id, label, score): (String, String, f32)) -> Self {
        Self {
            class_id,
            label,
            score,
        }
    }
}

impl From<Prediction> for (String, String, f32) {
    fn from(p: Prediction) -> Self {
        (p.class_id, p.label, p.score)
    }
}

/// Class index → (class id, label)
#[derive(Debug, Clone)]
pub struct LabelTable {
    entries: Vec<(String, String)>,
}

impl LabelTable {
    /// Parse the `imagenet_class_index.json` layout:
    /// `{"0": ["n01440764", "tench"], "1": [...], ...}`
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: HashMap<String, (String, String)> = serde_json::from_str(content)?;

        let mut indexed = Vec::with_capacity(raw.len());
        for (key, entry) in raw {
            let index: usize = key
                .parse()
                .map_err(|_| anyhow!("label index {:?} is not an integer", key))?;
            indexed.push((index, entry));
        }
        indexed.sort_by_key(|(index, _)| *index);

        if indexed.is_empty() {
            return Err(anyhow!("label table is empty"));
        }
        for (expected, (index, _)) in indexed.iter().enumerate() {
            if *index != expected {
                return Err(anyhow!("label table is missing class index {}", expected));
            }
        }

        Ok(Self {
            entries: indexed.into_iter().map(|(_, entry)| entry).collect(),
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading labels {}", path.as_ref().display()))?;
        Self::from_json(&content)
            .with_context(|| format!("parsing labels {}", path.as_ref().display()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<(&str, &str)> {
        self.entries
            .get(index)
            .map(|(id, label)| (id.as_str(), label.as_str()))
    }

    /// The `k` highest-scoring classes, best first.
    ///
    /// Equal scores keep class-index order.
    pub fn top_k(&self, scores: &[f32], k: usize) -> Result<Vec<Prediction>, PredictError> {
        if scores.len() != self.entries.len() {
            return Err(PredictError::LabelMismatch {
                scores: scores.len(),
                labels: self.entries.len(),
            });
        }

        let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(ranked
            .into_iter()
            .take(k)
            .filter_map(|(index, score)| {
                self.get(index).map(|(class_id, label)| Prediction {
                    class_id: class_id.to_string(),
                    label: label.to_string(),
                    score,
                })
            })
            .collect())
    }
}
