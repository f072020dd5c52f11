use super::types::{KbMatch, KnowledgeBase};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("failed to read knowledge corpus {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse knowledge corpus {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeDocument {
    #[serde(default)]
    pub id: Option<String>,
    pub document: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// On-disk corpus: `{"incidents": [...], "playbooks": [...]}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnowledgeCorpus {
    #[serde(default)]
    pub incidents: Vec<KnowledgeDocument>,
    #[serde(default)]
    pub playbooks: Vec<KnowledgeDocument>,
}

struct Indexed {
    doc: KnowledgeDocument,
    terms: HashMap<String, f32>,
    norm: f32,
}

/// In-memory knowledge base ranked by bag-of-words cosine distance.
pub struct LexicalKnowledgeBase {
    incidents: Vec<Indexed>,
    playbooks: Vec<Indexed>,
}

impl LexicalKnowledgeBase {
    pub fn new(corpus: KnowledgeCorpus) -> Self {
        Self {
            incidents: corpus.incidents.into_iter().map(index).collect(),
            playbooks: corpus.playbooks.into_iter().map(index).collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, KnowledgeError> {
        let content = fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let corpus: KnowledgeCorpus =
            serde_json::from_str(&content).map_err(|source| KnowledgeError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let kb = Self::new(corpus);
        info!(
            path = %path.display(),
            incidents = kb.incidents.len(),
            playbooks = kb.playbooks.len(),
            "Loaded knowledge corpus"
        );
        Ok(kb)
    }
}

#[async_trait]
impl KnowledgeBase for LexicalKnowledgeBase {
    async fn search_similar_incidents(&self, query: &str, limit: usize) -> Vec<KbMatch> {
        search(&self.incidents, query, limit)
    }

    async fn search_playbooks(&self, query: &str, limit: usize) -> Vec<KbMatch> {
        search(&self.playbooks, query, limit)
    }

    fn counts(&self) -> (usize, usize) {
        (self.incidents.len(), self.playbooks.len())
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.len() > 1)
        .map(str::to_lowercase)
}

fn term_vector(text: &str) -> (HashMap<String, f32>, f32) {
    let mut terms: HashMap<String, f32> = HashMap::new();
    for word in tokenize(text) {
        *terms.entry(word).or_default() += 1.0;
    }
    let norm = terms.values().map(|v| v * v).sum::<f32>().sqrt();
    (terms, norm)
}

fn index(doc: KnowledgeDocument) -> Indexed {
    let (terms, norm) = term_vector(&doc.document);
    Indexed { doc, terms, norm }
}

fn search(entries: &[Indexed], query: &str, limit: usize) -> Vec<KbMatch> {
    let (query_terms, query_norm) = term_vector(query);
    if query_norm == 0.0 || limit == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(f32, &Indexed)> = entries
        .iter()
        .map(|entry| {
            let dot: f32 = query_terms
                .iter()
                .filter_map(|(term, weight)| entry.terms.get(term).map(|w| w * weight))
                .sum();
            let similarity = if entry.norm == 0.0 {
                0.0
            } else {
                dot / (entry.norm * query_norm)
            };
            (1.0 - similarity, entry)
        })
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));

    scored
        .into_iter()
        .take(limit)
        .map(|(distance, entry)| KbMatch {
            document: entry.doc.document.clone(),
            metadata: entry.doc.metadata.clone(),
            distance: distance.max(0.0),
        })
        .collect()
}
