//! Streaming and batch profile statistics
//!
//! The streaming path folds one transaction at a time into a
//! [`CustomerProfile`] using the Welford recurrences, so a profile is always
//! current without rereading history. The batch path recomputes the same
//! statistics from the full transaction history with a numerically robust
//! two-pass formula; both must agree within floating tolerance, which is the
//! repair guarantee `recompute` exists for.

use chrono::{DateTime, Datelike, Timelike, Utc};

use cheqflow_repository::{CustomerProfile, TransactionRecord};

/// Fold one transaction into the running statistics.
///
/// Order matters: the new-payee check runs against the payee map *before* the
/// map is updated, and the rate smoothing uses the already-incremented count.
/// `top_payees` bounds the payee map; when it overflows, the least-frequent
/// payee (ties broken by name) is evicted.
pub fn apply_transaction(
    profile: &mut CustomerProfile,
    amount: f64,
    payee: &str,
    occurred_at: DateTime<Utc>,
    top_payees: usize,
) {
    let is_new_payee = !profile.knows_payee(payee);
    let count = profile.transaction_count + 1;
    let n = count as f64;

    let mean_old = profile.mean_amount;
    let mean_new = mean_old + (amount - mean_old) / n;
    profile.variance_amount += ((amount - mean_old) * (amount - mean_new) - profile.variance_amount) / n;
    profile.mean_amount = mean_new;

    if profile.transaction_count == 0 {
        profile.min_amount = amount;
        profile.max_amount = amount;
    } else {
        profile.min_amount = profile.min_amount.min(amount);
        profile.max_amount = profile.max_amount.max(amount);
    }
    profile.transaction_count = count;
    profile.cheques_issued += 1;

    *profile.payee_counts.entry(payee.to_string()).or_insert(0) += 1;
    if profile.payee_counts.len() > top_payees {
        let evict = profile
            .payee_counts
            .iter()
            .min_by(|(name_a, count_a), (name_b, count_b)| {
                count_a.cmp(count_b).then_with(|| name_a.cmp(name_b))
            })
            .map(|(name, _)| name.clone());
        if let Some(name) = evict {
            profile.payee_counts.remove(&name);
        }
    }

    if is_new_payee {
        profile.new_payee_rate += (100.0 - profile.new_payee_rate) / n;
    } else {
        profile.new_payee_rate -= profile.new_payee_rate / n;
    }

    profile.active_days.insert(occurred_at.weekday().num_days_from_monday() as u8);
    profile.active_hours.insert(occurred_at.hour() as u8);
    profile.last_activity = Some(occurred_at);
}

/// Record a bounced cheque against the profile.
pub fn apply_bounce(profile: &mut CustomerProfile) {
    profile.cheques_bounced += 1;
    profile.bounce_rate = if profile.cheques_issued > 0 {
        profile.cheques_bounced as f64 / profile.cheques_issued as f64 * 100.0
    } else {
        0.0
    };
}

/// Rebuild a profile from the full transaction history.
///
/// Replays the streaming fold for the order-dependent parts (payee map,
/// new-payee rate, day/hour sets), then replaces mean and variance with the
/// two-pass population values. History must be ordered oldest first.
pub fn recompute(
    account_number: &str,
    history: &[TransactionRecord],
    bounced: u64,
    top_payees: usize,
) -> CustomerProfile {
    let mut profile = CustomerProfile::new(account_number);
    for row in history {
        apply_transaction(&mut profile, row.amount, &row.payee, row.occurred_at, top_payees);
    }

    if !history.is_empty() {
        let n = history.len() as f64;
        let mean = history.iter().map(|r| r.amount).sum::<f64>() / n;
        let variance = history.iter().map(|r| (r.amount - mean).powi(2)).sum::<f64>() / n;
        profile.mean_amount = mean;
        profile.variance_amount = variance;
    }

    profile.cheques_bounced = bounced;
    profile.bounce_rate = if profile.cheques_issued > 0 {
        bounced as f64 / profile.cheques_issued as f64 * 100.0
    } else {
        0.0
    };
    profile
}
