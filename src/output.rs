use anyhow::{Context, Result};
use cryptodash::chart::ChartStatus;
use cryptodash::format::{compact_usd, percent_change, price_usd};
use cryptodash::pagination::PageLink;
use cryptodash::types::Asset;
use cryptodash::{DashboardState, LoadStatus};
use serde::Serialize;

#[derive(Serialize)]
struct Snapshot<'a> {
    state: &'a DashboardState,
    rows: Vec<Asset>,
}

pub fn print_dashboard(state: &DashboardState) {
    match state.status() {
        LoadStatus::Loading => println!("Loading..."),
        LoadStatus::Error(message) => println!("{}", message),
        LoadStatus::Ready => {
            print_chart(state);
            print_table(&state.rows(), state.selected().map(|a| a.id.as_str()));
            print_pager(state);
        }
    }
}

fn print_table(rows: &[Asset], selected: Option<&str>) {
    println!(
        "\n  {:<6} {:<24} {:<8} {:>16} {:>10} {:>14} {:>14}",
        "Rank", "Coin", "Symbol", "Price", "24h", "Market Cap", "Volume"
    );
    println!("{}", "-".repeat(102));
    for a in rows {
        let marker = if Some(a.id.as_str()) == selected { '>' } else { ' ' };
        let rank = a
            .market_cap_rank
            .map(|r| r.to_string())
            .unwrap_or_else(|| "—".to_string());
        println!(
            "{} {:<6} {:<24} {:<8} {:>16} {:>10} {:>14} {:>14}",
            marker,
            rank,
            a.name,
            a.symbol.to_uppercase(),
            price_usd(a.current_price),
            percent_change(a.price_change_percentage_24h),
            compact_usd(a.market_cap, 2),
            compact_usd(Some(a.total_volume), 2),
        );
    }
    println!();
}

fn print_chart(state: &DashboardState) {
    let Some(asset) = state.selected() else {
        println!("Select a cryptocurrency to view its chart");
        return;
    };
    let chart = state.chart();
    println!(
        "{} ({}) {} {} [{}]",
        asset.name,
        asset.symbol.to_uppercase(),
        price_usd(asset.current_price),
        percent_change(asset.price_change_percentage_24h),
        chart.range.button_label()
    );

    match chart.status {
        ChartStatus::Idle | ChartStatus::Loading => println!("Loading chart data..."),
        ChartStatus::Ready if chart.points.is_empty() => println!("No chart data available"),
        ChartStatus::Ready => {
            let (lo, hi) = chart.min_max().unwrap_or_default();
            let first = chart.points.first().map(|p| p.label.as_str()).unwrap_or_default();
            let last = chart.points.last().map(|p| p.label.as_str()).unwrap_or_default();
            println!(
                "{} points, {} .. {}, low {} high {}",
                chart.points.len(),
                first,
                last,
                price_usd(lo),
                price_usd(hi)
            );
        }
    }
}

fn print_pager(state: &DashboardState) {
    let pager = state.pager();
    let links: Vec<String> = pager
        .window()
        .into_iter()
        .map(|link| match link {
            PageLink::Page(n) if n == pager.current => format!("[{}]", n),
            PageLink::Page(n) => n.to_string(),
            PageLink::Ellipsis => "...".to_string(),
        })
        .collect();
    println!(
        "{} {} {}",
        if pager.has_prev() { "<" } else { " " },
        links.join(" "),
        if pager.has_next() { ">" } else { " " }
    );
}

pub fn print_json(state: &DashboardState) -> Result<()> {
    let snapshot = Snapshot {
        state,
        rows: state.rows(),
    };
    let json = serde_json::to_string_pretty(&snapshot).context("serializing dashboard state")?;
    println!("{}", json);
    Ok(())
}
