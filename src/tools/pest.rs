//! Pest and disease advisories from a static per-crop table.

use async_trait::async_trait;

use crate::agent::evidence::{EvidenceQuery, EvidenceResult, EvidenceSource};

/// Per-crop pest advisory text.
const CROP_PEST_ADVISORIES: [(&str, &str); 6] = [
    (
        "rice",
        "Watch for stem borer (dead hearts, white ears) and brown planthopper \
         (hopper burn at the base). Use pheromone traps for stem borer; avoid \
         excess nitrogen which favors planthopper. Blast disease shows as \
         spindle-shaped leaf lesions; spray tricyclazole if it spreads.",
    ),
    (
        "wheat",
        "Yellow rust appears as yellow stripes on leaves in cool humid spells; \
         spray propiconazole at first sign. Aphids cluster on ears during grain \
         filling; ladybird beetles usually keep them below threshold.",
    ),
    (
        "cotton",
        "Pink bollworm is the main threat; install pheromone traps at square \
         formation and destroy rosette flowers. Whitefly transmits leaf curl \
         virus; yellow sticky traps help monitor buildup.",
    ),
    (
        "tomato",
        "Tomato leaf miner (Tuta absoluta) mines leaves and bores fruit; use \
         pheromone traps and remove affected leaves. Early blight shows \
         concentric ring spots; spray mancozeb preventively in humid weather.",
    ),
    (
        "maize",
        "Fall armyworm feeds in the whorl leaving ragged holes and sawdust-like \
         frass; apply emamectin benzoate into the whorl at early infestation.",
    ),
    (
        "chili",
        "Thrips cause upward leaf curl; mites cause downward curl. Spray \
         fipronil for thrips only above threshold. Anthracnose causes fruit \
         rot; avoid overhead irrigation during fruiting.",
    ),
];

const GENERAL_ADVISORY: &str = "Scout fields weekly, preferably early morning. \
Identify the pest before spraying and prefer the least toxic effective option. \
Rotate insecticide groups to slow resistance.";

/// Static pest-advisory evidence source.
#[derive(Debug, Clone, Default)]
pub struct PestAdvisoryTool;

impl PestAdvisoryTool {
    /// Creates the tool.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn lookup(topic: &str) -> String {
        let needle = topic.to_lowercase();
        CROP_PEST_ADVISORIES
            .iter()
            .find(|(crop, _)| needle.contains(crop))
            .map_or_else(
                || GENERAL_ADVISORY.to_string(),
                |(_, advisory)| format!("{advisory}\n{GENERAL_ADVISORY}"),
            )
    }
}

#[async_trait]
impl EvidenceSource for PestAdvisoryTool {
    fn name(&self) -> &'static str {
        "pest"
    }

    fn section_label(&self, query: &EvidenceQuery<'_>) -> String {
        format!("[PEST ADVISORY - {}]", query.topic.to_uppercase())
    }

    async fn invoke(&self, query: &EvidenceQuery<'_>) -> EvidenceResult {
        EvidenceResult::Available {
            content: Self::lookup(query.topic),
        }
    }
}
