//! ADX / directional movement indicator
//!
//! Directional movement is summed over `period` (Wilder's initial
//! smoothing) and the ADX value reported is the instantaneous directional
//! index DX = 100 * |+DI - -DI| / (+DI + -DI), not the double-smoothed
//! average. Strategy thresholds are tuned against this variant; changing
//! it to canonical ADX silently shifts behavior.

use crate::indicators::math;
use crate::models::indicators::AdxIndicator;
use crate::models::market::Candle;

pub fn calculate_adx(candles: &[Candle], period: u32) -> Option<AdxIndicator> {
    let p = period as usize;
    if p == 0 || candles.len() < p + 1 {
        return None;
    }

    let window = &candles[candles.len() - p - 1..];
    let mut plus_dm_sum = 0.0;
    let mut minus_dm_sum = 0.0;
    let mut tr_sum = 0.0;

    for pair in window.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        let up_move = cur.high - prev.high;
        let down_move = prev.low - cur.low;
        if up_move > down_move && up_move > 0.0 {
            plus_dm_sum += up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            minus_dm_sum += down_move;
        }
        tr_sum += math::true_range(cur.high, cur.low, prev.close);
    }

    if tr_sum == 0.0 {
        return None;
    }

    let plus_di = 100.0 * plus_dm_sum / tr_sum;
    let minus_di = 100.0 * minus_dm_sum / tr_sum;
    let di_sum = plus_di + minus_di;
    let adx = if di_sum == 0.0 {
        0.0
    } else {
        100.0 * (plus_di - minus_di).abs() / di_sum
    };

    Some(AdxIndicator {
        adx,
        plus_di,
        minus_di,
        period,
    })
}

/// Calculate ADX with default period (14)
pub fn calculate_adx_default(candles: &[Candle]) -> Option<AdxIndicator> {
    calculate_adx(candles, 14)
}
