//! Water and irrigation facts from a static regional table.

use async_trait::async_trait;

use crate::agent::evidence::{EvidenceQuery, EvidenceResult, EvidenceSource};

/// Per-region groundwater and irrigation facts. Lookup is
/// case-insensitive; unknown regions fall back to the default entry.
const REGION_WATER_FACTS: [(&str, &str); 4] = [
    (
        "telangana",
        "Telangana: average groundwater depth 8-12 m, falling in summer. \
         Borewells and tank irrigation dominate; Kharif depends on southwest \
         monsoon (June-September, ~900 mm). Drip subsidy available under the \
         state micro-irrigation scheme. Paddy is the main irrigated crop; \
         alternate wetting and drying is recommended to stretch tank water.",
    ),
    (
        "andhra pradesh",
        "Andhra Pradesh: canal command areas along Krishna and Godavari \
         deltas; tail-end farms face delayed releases. Groundwater 6-10 m in \
         deltas, deeper inland. Micro-irrigation widely subsidized for \
         horticulture.",
    ),
    (
        "punjab",
        "Punjab: intensive canal and tubewell irrigation; water table falling \
         0.5 m/year in central districts. Direct-seeded rice and laser land \
         leveling are promoted to cut water use.",
    ),
    (
        "maharashtra",
        "Maharashtra: highly variable rainfall (450-3000 mm); drip is standard \
         for sugarcane and horticulture in scarcity zones. Farm ponds and \
         watershed structures buffer dry spells.",
    ),
];

const DEFAULT_FACTS: &str = "No region-specific record available. General \
guidance: irrigate early morning or evening to cut evaporation, mulch to \
conserve soil moisture, and check moisture at root depth before irrigating \
rather than on a fixed calendar.";

/// Static water/irrigation evidence source.
#[derive(Debug, Clone)]
pub struct WaterFactsTool {
    region: String,
}

impl WaterFactsTool {
    /// Creates the tool for the given default region.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }

    fn lookup(&self) -> String {
        let needle = self.region.to_lowercase();
        REGION_WATER_FACTS
            .iter()
            .find(|(region, _)| *region == needle)
            .map_or(DEFAULT_FACTS, |(_, facts)| *facts)
            .to_string()
    }
}

#[async_trait]
impl EvidenceSource for WaterFactsTool {
    fn name(&self) -> &'static str {
        "water"
    }

    fn section_label(&self, _query: &EvidenceQuery<'_>) -> String {
        "[WATER & IRRIGATION DATA]".to_string()
    }

    async fn invoke(&self, _query: &EvidenceQuery<'_>) -> EvidenceResult {
        EvidenceResult::Available {
            content: self.lookup(),
        }
    }
}
