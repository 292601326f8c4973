//! Advisory Generation
//!
//! Turns a rule-corrected prediction into the recommendation a fisher sees.
//! Juvenile protection outranks availability: a High-risk location is never
//! recommended, even when fish are available.

use crate::data::{JuvenileRisk, PredictionResult};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    NotRecommended,
    NotAvailable,
    Caution,
    Safe,
}

/// Distance band (km) worth moving before fishing again
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShiftRange {
    pub min_km: f64,
    pub max_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory {
    pub verdict: Verdict,
    pub headline: &'static str,
    pub guidance: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_shift: Option<ShiftRange>,
    /// Minimum mesh size (mm) when fishing is allowed with caution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_mesh_mm: Option<u32>,
}

pub fn advise(result: &PredictionResult) -> Advisory {
    if result.juvenile_risk == JuvenileRisk::High {
        return Advisory {
            verdict: Verdict::NotRecommended,
            headline: "Fishing not recommended: high juvenile density",
            guidance: "Suggested shift: move 8-15 km away.",
            suggested_shift: Some(ShiftRange { min_km: 8.0, max_km: 15.0 }),
            min_mesh_mm: None,
        };
    }

    if !result.availability {
        return Advisory {
            verdict: Verdict::NotAvailable,
            headline: "Fish availability: NO",
            guidance: "Try shifting to nearby zones (5-10 km).",
            suggested_shift: Some(ShiftRange { min_km: 5.0, max_km: 10.0 }),
            min_mesh_mm: None,
        };
    }

    match result.juvenile_risk {
        JuvenileRisk::Medium => Advisory {
            verdict: Verdict::Caution,
            headline: "Fishing allowed with caution",
            guidance: "Recommended mesh size >= 45 mm.",
            suggested_shift: None,
            min_mesh_mm: Some(45),
        },
        _ => Advisory {
            verdict: Verdict::Safe,
            headline: "Safe fishing zone",
            guidance: "Continue sustainable fishing practices.",
            suggested_shift: None,
            min_mesh_mm: None,
        },
    }
}

/// Markdown summary of a prediction and its advisory
pub fn render_markdown(result: &PredictionResult, advisory: &Advisory) -> String {
    let mut lines = Vec::new();

    lines.push(format!("## {}", result.location_label));
    lines.push(String::new());
    lines.push(format!(
        "- **Fish availability:** {}",
        if result.availability { "YES" } else { "NO" }
    ));
    lines.push(format!("- **Expected catch:** {:.1} kg", result.quantity_kg));
    lines.push(format!("- **Juvenile risk:** {}", result.juvenile_risk));
    lines.push(format!("- **Condition score:** {}/4", result.condition_score));
    lines.push(String::new());
    lines.push(format!("**{}**", advisory.headline));
    lines.push(String::new());
    lines.push(advisory.guidance.to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PipelineChoice;

    fn result(availability: bool, juvenile_risk: JuvenileRisk) -> PredictionResult {
        PredictionResult {
            availability,
            quantity_kg: 240.0,
            juvenile_risk,
            location_label: "Kakinada".to_string(),
            condition_score: 4,
            applied_rules: Vec::new(),
            pipeline_used: PipelineChoice::Default,
        }
    }

    #[test]
    fn test_high_risk_outranks_availability() {
        let advisory = advise(&result(true, JuvenileRisk::High));
        assert_eq!(advisory.verdict, Verdict::NotRecommended);
        assert_eq!(advisory.suggested_shift, Some(ShiftRange { min_km: 8.0, max_km: 15.0 }));
    }

    #[test]
    fn test_unavailable() {
        let advisory = advise(&result(false, JuvenileRisk::Low));
        assert_eq!(advisory.verdict, Verdict::NotAvailable);
        assert_eq!(advisory.suggested_shift.map(|s| s.max_km), Some(10.0));
    }

    #[test]
    fn test_caution_and_safe() {
        assert_eq!(advise(&result(true, JuvenileRisk::Medium)).min_mesh_mm, Some(45));
        assert_eq!(advise(&result(true, JuvenileRisk::Low)).verdict, Verdict::Safe);
    }

    #[test]
    fn test_markdown_summary() {
        let r = result(true, JuvenileRisk::Low);
        let md = render_markdown(&r, &advise(&r));
        assert!(md.starts_with("## Kakinada"));
        assert!(md.contains("**Fish availability:** YES"));
        assert!(md.contains("Safe fishing zone"));
    }
}
