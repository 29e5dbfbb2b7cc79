use anyhow::Result;
use sellcast_forecast::{BestSellerReport, RevenueReport};
use serde::Serialize;

pub fn print_best_seller(report: &BestSellerReport) {
    println!("## Model selection\n");
    for s in &report.leaderboard {
        let marker = if s.name == report.model { "*" } else { " " };
        println!("{marker} {:<20} macro accuracy = {:.4}", s.name, s.macro_accuracy);
    }
    println!(
        "\nBest model: {} (macro accuracy {:.4})\n",
        report.model, report.macro_accuracy
    );

    println!("## Next month's best seller\n");
    println!(
        "{} | {} | revenue=${:.2}\n",
        report.forecast.target_month, report.forecast.predicted_category, report.forecast.revenue
    );
}

pub fn print_revenue(report: &RevenueReport) {
    println!("## Revenue forecast for month {}\n", report.target_month);
    for f in &report.forecasts {
        println!("- {:<20} ${:.2}", f.category, f.predicted_revenue);
    }
    println!();
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct FullReport<'a> {
    pub best_seller: &'a BestSellerReport,
    pub revenue: &'a RevenueReport,
}
