use anyhow::{anyhow, Result};
use std::path::Path;

use oddsforge_parlay::models::{League, Leg, ParlaySummary};
use oddsforge_parlay::utils::{
    format_ev, format_kickoff, format_money, format_odds, format_optional_odds,
    format_probability, odds_to_probability,
};
use oddsforge_parlay::{AppController, PredictionBackend, SelectionState};

pub fn list_leagues() {
    println!("🏆 Available Leagues:\n");
    for league in League::EVERY {
        println!("   {:<4} {} ({})", league.code(), league.name(), league.display());
    }
}

fn print_notice(state: &SelectionState, predictions: bool) {
    let status = if predictions {
        &state.predictions_status
    } else {
        &state.matches_status
    };
    if let Some(notice) = status.notice {
        if notice.is_informational() {
            println!("📭 {}", notice);
        } else {
            println!("❌ {}", notice);
        }
    }
}

pub async fn show_matches<B>(app: &AppController<B>, league: League) -> Result<()>
where
    B: PredictionBackend + ?Sized,
{
    println!("📥 Loading {} matches...", league.name());
    app.select_league(league).await;

    let state = app.state();
    print_notice(&state, false);

    for m in &state.matches {
        println!(
            "[{}] {} vs {}  {} • {}",
            m.id,
            m.home_team,
            m.away_team,
            format_kickoff(m.date),
            m.competition
        );
        if m.odds.is_some() {
            println!(
                "     H: {} | D: {} | A: {}",
                format_optional_odds(m.home_odds()),
                format_optional_odds(m.draw_odds()),
                format_optional_odds(m.away_odds())
            );
        }
    }

    Ok(())
}

async fn load_match<B>(app: &AppController<B>, league: League, match_id: &str) -> Result<()>
where
    B: PredictionBackend + ?Sized,
{
    app.select_league(league).await;
    let state = app.state();
    if state.matches_status.notice.is_some() {
        print_notice(&state, false);
    }

    app.select_match_by_id(match_id).await;
    let state = app.state();
    if let Some(notice) = state.predictions_status.notice {
        return Err(anyhow!("{}", notice));
    }
    Ok(())
}

pub async fn show_predictions<B>(app: &AppController<B>, league: League, match_id: &str) -> Result<()>
where
    B: PredictionBackend + ?Sized,
{
    load_match(app, league, match_id).await?;
    let state = app.state();

    if let Some(m) = &state.selected_match {
        println!("🔮 {} VS {}", m.home_team, m.away_team);
        println!("   {} • {}\n", format_kickoff(m.date), m.competition);
    }

    if state.has_no_predictions() {
        println!("📭 No predictions available for this match");
        return Ok(());
    }

    for market in state.markets().visible() {
        println!("▸ {} ({})", market.title, market.bets.len());
        for bet in &market.bets {
            let tag = if bet.is_value() { "  💰 VALUE BET" } else { "" };
            println!(
                "   {:<32} {:>6}  {} prob  EV: {}{}",
                bet.event,
                format_odds(bet.odds),
                format_probability(bet.prob, 0),
                format_ev(bet.expected_value()),
                tag
            );
            if let Some(reasoning) = &bet.reasoning {
                println!("      {}", reasoning);
            }
        }
        println!();
    }

    Ok(())
}

pub async fn build_parlay<B>(
    app: &AppController<B>,
    league: League,
    match_id: &str,
    picks: &[String],
    export: Option<&Path>,
) -> Result<()>
where
    B: PredictionBackend + ?Sized,
{
    load_match(app, league, match_id).await?;
    let state = app.state();

    for pick in picks {
        match state.predictions.iter().find(|c| &c.event == pick) {
            Some(candidate) => app.add_leg(candidate),
            None => println!("⚠️  No prediction named '{}' for this match", pick),
        }
    }

    let state = app.state();
    let summary = app.parlay();
    print_slip(state.legs.legs(), &summary);

    if let Some(path) = export {
        export_slip(path, state.legs.legs(), &summary)?;
        println!("\n✅ Parlay exported to {}", path.display());
    }

    Ok(())
}

fn print_slip(legs: &[Leg], summary: &ParlaySummary) {
    println!("🎯 Your Parlay\n");
    if legs.is_empty() {
        println!("   Add events from predictions to build your parlay");
        return;
    }

    for (i, leg) in legs.iter().enumerate() {
        println!(
            "{}. {}  Prob: {} | Odds: {} | EV: {}",
            i + 1,
            leg.event,
            format_probability(leg.prob, 1),
            format_odds(leg.odds),
            format_ev(leg.expected_value())
        );
    }

    println!("\n   Total Legs:      {}", summary.leg_count);
    println!("   Combined Odds:   {}x", format_odds(summary.combined_odds));
    println!("   Win Probability: {}", format_probability(summary.combined_prob, 2));
    println!(
        "   Implied by odds: {}",
        format_probability(odds_to_probability(summary.combined_odds), 2)
    );
    println!(
        "   Potential Win ({}): {}",
        format_money(summary.stake),
        format_money(summary.payout)
    );
}

/// Write the legs and a summary row as CSV.
pub fn export_slip(path: &Path, legs: &[Leg], summary: &ParlaySummary) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    write_slip(&mut writer, legs, summary)?;
    writer.flush()?;
    Ok(())
}

fn write_slip<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    legs: &[Leg],
    summary: &ParlaySummary,
) -> Result<()> {
    writer.write_record(["event", "prob", "odds", "ev"])?;
    for leg in legs {
        writer.write_record([
            leg.event.clone(),
            leg.prob.to_string(),
            leg.odds.to_string(),
            leg.expected_value().to_string(),
        ])?;
    }
    writer.write_record([
        format!("PARLAY ({} legs, stake {})", summary.leg_count, summary.stake),
        summary.combined_prob.to_string(),
        summary.combined_odds.to_string(),
        summary.expected_return.to_string(),
    ])?;
    Ok(())
}
