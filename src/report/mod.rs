use serde::{Deserialize, Serialize};

use crate::analysis::FrequencyTable;
use crate::providers::{EntityInfo, ItemRef, ItemStats};

/// Result of analyzing one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Canonical channel ID
    pub entity_id: String,

    /// Channel metadata, when the provider returned it
    pub entity: Option<EntityInfo>,

    /// One record per enumerated video, in enumeration order
    pub items: Vec<ItemReport>,

    /// Frequencies over every available transcript
    pub aggregate: FrequencyTable,
}

/// Analysis of a single video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemReport {
    pub item: ItemRef,
    pub stats: ItemStats,
    pub transcript_present: bool,

    /// Caption language used, when a transcript was found
    pub transcript_language: Option<String>,

    pub table: FrequencyTable,
}

impl AnalysisReport {
    /// Channel title, falling back to the channel ID
    pub fn display_title(&self) -> &str {
        self.entity
            .as_ref()
            .map(|entity| entity.title.as_str())
            .filter(|title| !title.is_empty())
            .unwrap_or(&self.entity_id)
    }

    /// Whether any counted words remain across the channel
    pub fn has_corpus(&self) -> bool {
        self.aggregate.total_tokens > 0
    }

    pub fn transcripts_found(&self) -> usize {
        self.items.iter().filter(|item| item.transcript_present).count()
    }
}
