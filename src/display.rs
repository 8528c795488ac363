// =============================================================================
// Console output formatting
// =============================================================================
//
// All human-facing output goes through here; the rest of the crate logs via
// tracing and returns structured results.
// =============================================================================

use crate::screener::{MarketAnalysis, MarketCondition, ScreeningResult, ScreeningResults};

const HEADER: &str = "================================================================================";
const SECTION: &str = "--------------------------------------------------------------------------------";

pub fn print_welcome() {
    println!("🔍 Starting Stock Screener...");
    println!("{}", "═".repeat(50));
    println!("🎯 Features:");
    println!("   • Breakout pattern detection");
    println!("   • Volume spike identification");
    println!("   • Technical indicator analysis");
    println!("   • Real-time market data");
    println!("{}", "═".repeat(50));
}

pub fn print_screening_results(results: &ScreeningResults) {
    println!("\n{HEADER}");
    println!(" STOCK SCREENING RESULTS");
    println!("{HEADER}");

    let signal_stocks = results.with_signals();
    if signal_stocks.is_empty() {
        println!("\n⚠️  No stocks with signals found in current screening.");
    } else {
        println!("\n🚨 STOCKS WITH SIGNALS ({} found):", signal_stocks.len());
        println!("{SECTION}");
        for result in &signal_stocks {
            print_single_result(result, false);
        }
    }

    print_summary(results);
    println!("{HEADER}");
}

pub fn print_top_opportunities(opportunities: &[ScreeningResult], limit: usize) {
    println!("\n{HEADER}");
    println!(
        " TOP {} INVESTMENT OPPORTUNITIES",
        limit.min(opportunities.len())
    );
    println!("{HEADER}");

    if opportunities.is_empty() {
        println!("\n⚠️  No opportunities found.");
    } else {
        for (i, result) in opportunities.iter().take(limit).enumerate() {
            println!("\n🏆 #{} - {}", i + 1, result.symbol());
            print_single_result(result, true);
        }
    }

    println!("{HEADER}");
}

pub fn print_market_analysis(analysis: &MarketAnalysis) {
    println!("\n{HEADER}");
    println!(" MARKET CONDITION ANALYSIS");
    println!("{HEADER}");

    let emoji = match analysis.condition {
        MarketCondition::VeryBullish => "🚀",
        MarketCondition::Bullish => "📈",
        MarketCondition::NeutralPositive => "➡️",
        MarketCondition::Neutral => "😐",
        MarketCondition::Bearish => "📉",
        MarketCondition::Unknown => "❓",
    };

    println!(
        "\n{emoji} Overall Market Condition: {}",
        analysis.condition.to_string().to_uppercase()
    );
    println!("📊 Signal Percentage: {:.1}%", analysis.signal_percentage);
    println!("📈 Breakout Stocks: {}", analysis.breakout_stocks);
    println!("📊 Volume Spike Stocks: {}", analysis.volume_spike_stocks);
    println!("🎯 Total Screened: {}", analysis.total_screened);

    println!("{HEADER}");
}

pub fn print_health_status(gateway_ok: bool) {
    println!("\n{HEADER}");
    println!(" SYSTEM HEALTH STATUS");
    println!("{HEADER}");

    let (emoji, overall) = if gateway_ok {
        ("✅", "HEALTHY")
    } else {
        ("❌", "UNHEALTHY")
    };
    println!("\n{emoji} Overall Status: {overall}");

    let gateway_emoji = if gateway_ok { "✅" } else { "❌" };
    println!(
        "   {gateway_emoji} Data Gateway: {}",
        if gateway_ok { "healthy" } else { "unhealthy" }
    );
    // Indicator and signal stages are pure; if the binary runs, they run.
    println!("   ✅ Technical Analysis: healthy");
    println!("   ✅ Signal Detection: healthy");

    println!("{HEADER}");
}

pub fn print_error(message: &str) {
    println!("\n❌ ERROR: {message}");
}

pub fn print_info(message: &str) {
    println!("\nℹ️  INFO: {message}");
}

fn print_single_result(result: &ScreeningResult, show_quality: bool) {
    let quote = &result.quote;
    let signals = &result.signals;

    println!("\n📈 {}", quote.symbol);
    println!(
        "   Price: ${:.2} ({:+.2}%)",
        quote.price, quote.price_change_pct
    );
    println!(
        "   Volume: {} (Avg: {})",
        format_volume(quote.volume),
        format_volume(quote.avg_volume)
    );

    if signals.breakout.is_signal() {
        println!(
            "   🔥 BREAKOUT: {} (Strength: {:.2}%)",
            signals.breakout.label(),
            signals.breakout.strength() * 100.0
        );
    }

    if signals.volume.signal {
        println!(
            "   📊 VOLUME SPIKE: {:.1}x average",
            signals.volume.volume_ratio
        );
    }

    if show_quality {
        println!(
            "   ⭐ Quality: {} (Confidence: {:.0}%)",
            result.quality.quality.to_string().to_uppercase(),
            result.quality.confidence * 100.0
        );
    }
}

fn print_summary(results: &ScreeningResults) {
    println!("\n📊 SUMMARY:");
    println!("   Total stocks screened: {}", results.total_screened());
    println!(
        "   Stocks with breakout signals: {}",
        results.breakout_count()
    );
    println!(
        "   Stocks with volume spikes: {}",
        results.volume_spike_count()
    );
    println!(
        "   Total stocks with signals: {}",
        results.signal_count()
    );
    println!(
        "   Screening completed at: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
}

/// Thousands-separated integer rendering for volumes.
fn format_volume(volume: f64) -> String {
    let n = volume.max(0.0).round() as u64;
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_formatting_groups_thousands() {
        assert_eq!(format_volume(0.0), "0");
        assert_eq!(format_volume(999.0), "999");
        assert_eq!(format_volume(1_000.0), "1,000");
        assert_eq!(format_volume(1_234_567.0), "1,234,567");
        assert_eq!(format_volume(1_234_567.6), "1,234,568");
    }
}
