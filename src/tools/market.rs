//! Commodity price lookup over the daily mandi price CSV.
//!
//! The CSV comes from the state market board feed and keeps its original
//! header names (`DDate`, `CommName`, `YardName`, `VarityName`,
//! `Minimum`, `Maximum`); the serde renames on the raw record are the
//! only place that mapping lives. The dataset is loaded once at
//! startup; a missing or unreadable file leaves the tool permanently
//! unavailable without failing the process.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::agent::evidence::{EvidenceQuery, EvidenceResult, EvidenceSource};

/// At most this many price rows go into the evidence bundle.
const MAX_ROWS: usize = 5;

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "DDate")]
    date: String,
    #[serde(rename = "CommName")]
    commodity: String,
    #[serde(rename = "YardName")]
    market: String,
    #[serde(rename = "VarityName")]
    variety: String,
    #[serde(rename = "Minimum")]
    min_price: String,
    #[serde(rename = "Maximum")]
    max_price: String,
}

/// One price row under the canonical schema.
#[derive(Debug, Clone)]
struct PriceRow {
    date: String,
    commodity: String,
    commodity_lower: String,
    market: String,
    variety: String,
    min_price: String,
    max_price: String,
}

impl From<RawRecord> for PriceRow {
    fn from(raw: RawRecord) -> Self {
        let commodity_lower = raw.commodity.to_lowercase();
        Self {
            date: raw.date,
            commodity: raw.commodity,
            commodity_lower,
            market: raw.market,
            variety: raw.variety,
            min_price: raw.min_price,
            max_price: raw.max_price,
        }
    }
}

/// Mandi price evidence source backed by an in-memory table.
#[derive(Debug, Clone)]
pub struct MarketPriceTool {
    /// `None` when the dataset failed to load at startup.
    rows: Option<Vec<PriceRow>>,
}

impl MarketPriceTool {
    /// Loads the price CSV. Load failure is absorbed: the tool stays
    /// constructible and reports unavailability on every lookup.
    #[must_use]
    pub fn new(csv_path: impl AsRef<Path>) -> Self {
        let path = csv_path.as_ref();
        let rows = match Self::load(path) {
            Ok(rows) => {
                tracing::info!(path = %path.display(), rows = rows.len(), "price dataset loaded");
                Some(rows)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "price dataset unavailable");
                None
            }
        };
        Self { rows }
    }

    fn load(path: &Path) -> Result<Vec<PriceRow>, csv::Error> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut rows = Vec::new();
        for record in reader.deserialize::<RawRecord>() {
            match record {
                Ok(raw) => rows.push(PriceRow::from(raw)),
                Err(e) => tracing::warn!(error = %e, "skipping malformed price row"),
            }
        }
        Ok(rows)
    }

    fn lookup(&self, topic: &str) -> EvidenceResult {
        let Some(rows) = &self.rows else {
            return EvidenceResult::Unavailable {
                reason: "Market price data is not available right now.".to_string(),
            };
        };

        let needle = topic.to_lowercase();
        let matches: Vec<&PriceRow> = rows
            .iter()
            .filter(|row| row.commodity_lower.contains(&needle))
            .collect();

        if matches.is_empty() {
            return EvidenceResult::Unavailable {
                reason: format!("No recent price data found for '{topic}'."),
            };
        }

        let mut lines: Vec<String> = matches
            .iter()
            .take(MAX_ROWS)
            .map(|row| {
                format!(
                    "- {} ({}) at {}: ₹{}–₹{} per quintal ({})",
                    row.commodity, row.variety, row.market, row.min_price, row.max_price, row.date
                )
            })
            .collect();
        if matches.len() > MAX_ROWS {
            lines.push(format!(
                "({MAX_ROWS} of {} matching entries shown)",
                matches.len()
            ));
        }

        EvidenceResult::Available {
            content: lines.join("\n"),
        }
    }
}

#[async_trait]
impl EvidenceSource for MarketPriceTool {
    fn name(&self) -> &'static str {
        "market"
    }

    fn section_label(&self, query: &EvidenceQuery<'_>) -> String {
        format!("[MARKET PRICE DATA - {}]", query.topic.to_uppercase())
    }

    async fn invoke(&self, query: &EvidenceQuery<'_>) -> EvidenceResult {
        self.lookup(query.topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use std::path::PathBuf;

    const HEADER: &str = "DDate,CommName,YardName,VarityName,Minimum,Maximum\n";

    fn write_csv(rows: &[&str]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let path = dir.path().join("prices.csv");
        let mut file = std::fs::File::create(&path).unwrap_or_else(|_| unreachable!());
        file.write_all(HEADER.as_bytes())
            .unwrap_or_else(|_| unreachable!());
        for row in rows {
            writeln!(file, "{row}").unwrap_or_else(|_| unreachable!());
        }
        (dir, path)
    }

    fn query(topic: &'static str) -> EvidenceQuery<'static> {
        EvidenceQuery {
            question: "price?",
            city: "Hyderabad",
            topic,
        }
    }

    #[tokio::test]
    async fn test_matching_rows_formatted() {
        let (_dir, path) = write_csv(&[
            "2026-08-29,Rice,Warangal,Sona Masoori,2200,2450",
            "2026-08-29,Cotton,Adilabad,MCU-5,7000,7400",
        ]);
        let tool = MarketPriceTool::new(path);
        let result = tool.invoke(&query("rice")).await;
        let EvidenceResult::Available { content } = result else {
            unreachable!()
        };
        assert!(content.contains("Rice (Sona Masoori) at Warangal"));
        assert!(content.contains("₹2200–₹2450 per quintal"));
        assert!(!content.contains("Cotton"));
    }

    #[tokio::test]
    async fn test_row_cap_and_match_count() {
        let rows: Vec<String> = (0..8)
            .map(|i| format!("2026-08-29,Rice,Yard{i},Common,2000,210{i}"))
            .collect();
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        let (_dir, path) = write_csv(&refs);
        let tool = MarketPriceTool::new(path);
        let result = tool.invoke(&query("rice")).await;
        let EvidenceResult::Available { content } = result else {
            unreachable!()
        };
        assert_eq!(
            content.lines().filter(|l| l.starts_with('-')).count(),
            MAX_ROWS
        );
        assert!(content.contains("(5 of 8 matching entries shown)"));
    }

    #[tokio::test]
    async fn test_case_insensitive_substring_match() {
        let (_dir, path) = write_csv(&["2026-08-29,Paddy Rice,Warangal,Common,2100,2300"]);
        let tool = MarketPriceTool::new(path);
        let result = tool.invoke(&query("RICE")).await;
        assert!(matches!(result, EvidenceResult::Available { .. }));
    }

    #[tokio::test]
    async fn test_no_match_is_unavailable() {
        let (_dir, path) = write_csv(&["2026-08-29,Cotton,Adilabad,MCU-5,7000,7400"]);
        let tool = MarketPriceTool::new(path);
        let result = tool.invoke(&query("mango")).await;
        assert_eq!(
            result,
            EvidenceResult::Unavailable {
                reason: "No recent price data found for 'mango'.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_permanently_unavailable() {
        let tool = MarketPriceTool::new("/nonexistent/prices.csv");
        for _ in 0..2 {
            let result = tool.invoke(&query("rice")).await;
            assert_eq!(
                result,
                EvidenceResult::Unavailable {
                    reason: "Market price data is not available right now.".to_string()
                }
            );
        }
    }

    #[test]
    fn test_section_label_uppercases_topic() {
        let tool = MarketPriceTool::new("/nonexistent/prices.csv");
        assert_eq!(
            tool.section_label(&query("rice")),
            "[MARKET PRICE DATA - RICE]"
        );
    }
}
