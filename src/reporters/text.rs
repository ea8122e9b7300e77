//! Text (terminal) reporter with colors and formatting

use crate::models::AnalysisResult;
use crate::scoring::Calibration;
use anyhow::Result;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

/// Quotes shown per evidence category
const QUOTES_SHOWN: usize = 3;

fn score_color(score: f64) -> &'static str {
    if score >= 70.0 {
        GREEN
    } else if score >= 40.0 {
        YELLOW
    } else {
        RED
    }
}

fn format_score(score: f64) -> String {
    format!("{}{:.1}{RESET}", score_color(score), score)
}

/// Render a result as formatted terminal output
pub fn render(result: &AnalysisResult) -> Result<String> {
    let mut out = String::new();
    let cred = &result.credibility;
    let m = &result.metrics;
    let summary = &result.analysis_summary;

    out.push_str(&format!(
        "\n{BOLD}Credibility: {}{RESET} {DIM}({}){RESET}\n",
        result.influencer_name, result.channel_id
    ));
    out.push_str(&format!("{DIM}──────────────────────────────────────{RESET}\n"));
    out.push_str(&format!(
        "Score: {BOLD}{}/100{RESET}  Videos: {} analyzed, {} failed  Words: {}\n\n",
        format_score(cred.credibility_score),
        summary.videos_analyzed,
        summary.videos_failed,
        summary.total_words
    ));

    out.push_str(&format!("{BOLD}METRICS{RESET}\n"));
    out.push_str(&format!(
        "  Emotional intensity: {:>5.1}   Certainty index:     {:>5.1}\n",
        m.emotional_intensity, m.certainty_index
    ));
    out.push_str(&format!(
        "  Technical depth:     {:>5.1}   Prediction density:  {:>5.1}\n",
        m.technical_depth, m.prediction_density
    ));
    out.push_str(&format!(
        "  Historical accuracy: {:>5.1}\n\n",
        result.historical_accuracy
    ));

    let calibration = Calibration::from_gap(cred.calibration_gap);
    let gap_color = match calibration {
        Calibration::Overconfident => RED,
        Calibration::Reasonable => GREEN,
    };
    out.push_str(&format!("{BOLD}CALIBRATION{RESET}\n"));
    out.push_str(&format!(
        "  Gap: {gap_color}{:+.1}{RESET} ({})  Penalty: -{}\n\n",
        cred.calibration_gap,
        calibration.describe(),
        cred.calibration_penalty
    ));

    let base = &result.baseline_comparison;
    out.push_str(&format!(
        "{BOLD}BASELINE{RESET} {DIM}(cohort of {}){RESET}\n",
        base.baseline_stats.cohort_size
    ));
    out.push_str(&format!(
        "  Hype: {:.2}x median   Certainty: {:+.1}   Technical: {:+.1}\n",
        base.hype_multiplier, base.certainty_deviation, base.technical_deviation
    ));
    out.push_str(&format!(
        "  Accuracy percentile: {:.0}   Calibration percentile: {:.0}\n\n",
        base.accuracy_percentile, base.calibration_percentile
    ));

    let active = cred.flags.active();
    out.push_str(&format!("{BOLD}FLAGS{RESET}\n"));
    if active.is_empty() {
        out.push_str(&format!("  {DIM}none{RESET}\n\n"));
    } else {
        for flag in active {
            out.push_str(&format!("  {YELLOW}•{RESET} {}\n", flag));
        }
        out.push('\n');
    }

    let ev = &result.evidence;
    if !ev.is_empty() {
        out.push_str(&format!("{BOLD}EVIDENCE{RESET}\n"));
        for (label, quotes) in [
            ("certainty", &ev.certainty_quotes),
            ("intensity", &ev.intensity_quotes),
            ("technical", &ev.technical_quotes),
            ("prediction", &ev.predictions),
        ] {
            for quote in quotes.iter().take(QUOTES_SHOWN) {
                out.push_str(&format!("  {DIM}[{label}]{RESET} \"{}\"\n", truncate(quote, 100)));
            }
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "{BOLD}EXPLANATION{RESET} {DIM}({}){RESET}\n",
        result.explanation.source
    ));
    out.push_str(&format!("  {}\n", result.explanation.text.trim()));

    if !result.failures.is_empty() {
        out.push_str(&format!("\n{BOLD}SKIPPED VIDEOS{RESET}\n"));
        for failure in &result.failures {
            out.push_str(&format!(
                "  {RED}✗{RESET} {} {DIM}{}{RESET}\n",
                failure.video_id, failure.reason
            ));
        }
    }

    Ok(out)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
