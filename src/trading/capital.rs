//! Capital sizing and ledger updates.

use crate::models::account::{Simulation, SimulationStatus};

/// Minimum dollar value committed to any entry.
pub const MIN_POSITION_VALUE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSize {
    pub shares: i64,
    pub cost: f64,
}

/// Size an entry: `max(capital * size_pct, $100)` target value, at least
/// one share. Returns None when the resulting cost exceeds available
/// capital (the entry is skipped, not an error) or the price is invalid.
pub fn size_position(capital: f64, size_pct: f64, price: f64) -> Option<PositionSize> {
    if price <= 0.0 {
        return None;
    }
    let target = (capital * size_pct).max(MIN_POSITION_VALUE);
    let shares = ((target / price).floor() as i64).max(1);
    let cost = shares as f64 * price;
    if cost > capital {
        return None;
    }
    Some(PositionSize { shares, cost })
}

/// Debit capital for an opened position.
pub fn apply_entry(sim: &mut Simulation, cost: f64) {
    sim.current_capital -= cost;
}

/// Apply one closed trade to the ledger: credit `shares * exit_price`,
/// update P&L, counters, largest/gross trackers, and the drawdown
/// ratchet. Flips the simulation to Completed at its trade limit.
pub fn apply_exit(sim: &mut Simulation, shares: i64, entry_price: f64, exit_price: f64) {
    let proceeds = shares as f64 * exit_price;
    let pl = (exit_price - entry_price) * shares as f64;

    sim.current_capital += proceeds;
    sim.total_pl += pl;
    sim.trades_completed += 1;

    if pl > 0.0 {
        sim.wins += 1;
        sim.gross_profit += pl;
        if pl > sim.largest_win {
            sim.largest_win = pl;
        }
    } else if pl < 0.0 {
        sim.losses += 1;
        sim.gross_loss += -pl;
        if -pl > sim.largest_loss {
            sim.largest_loss = -pl;
        }
    }

    // Drawdown on realized capital: peak ratchets up, max drawdown is the
    // largest peak-minus-current delta and never decreases.
    if sim.current_capital > sim.peak_capital {
        sim.peak_capital = sim.current_capital;
    }
    let drawdown = sim.peak_capital - sim.current_capital;
    if drawdown > sim.max_drawdown {
        sim.max_drawdown = drawdown;
    }

    if sim.trades_completed >= sim.trade_limit {
        sim.status = SimulationStatus::Completed;
    }
}
