//! Clearing price discovery
//!
//! For every level, all buys priced at or above it and all sells priced at or
//! below it could trade there. The clearing level maximises executable
//! volume; ties are broken by minimum imbalance and then by market pressure
//! relative to the reference price. The result is a pure function of the
//! book, the reference price and the price precision.

use rust_decimal::Decimal;
use types::numeric::{round_bankers, Quantity};

use crate::book::DepthBook;

/// Compute `(clearing_price, max_execution)` for one product.
///
/// A zero `max_execution` means nothing trades; the reference price is
/// returned unchanged in that case.
pub fn periodic_auction_match(
    book: &DepthBook,
    reference_price: Decimal,
    price_digits: u32,
) -> (Decimal, Quantity) {
    let items = &book.items;
    let n = items.len();
    if n == 0 {
        return (reference_price, Quantity::zero());
    }

    let mut buy_sum = vec![Decimal::ZERO; n];
    let mut sell_sum = vec![Decimal::ZERO; n];
    let mut acc = Decimal::ZERO;
    for i in 0..n {
        acc += items[i].buy_quantity.as_decimal();
        buy_sum[i] = acc;
    }
    acc = Decimal::ZERO;
    for i in (0..n).rev() {
        acc += items[i].sell_quantity.as_decimal();
        sell_sum[i] = acc;
    }

    let execution: Vec<Decimal> = (0..n).map(|i| buy_sum[i].min(sell_sum[i])).collect();
    let max_execution = execution.iter().copied().max().unwrap_or(Decimal::ZERO);

    // Rule 0
    if max_execution.is_zero() {
        return (reference_price, Quantity::zero());
    }
    let max_quantity = Quantity::new(max_execution);

    // Rule 1
    let tied: Vec<usize> = (0..n).filter(|&i| execution[i] == max_execution).collect();
    if let &[only] = tied.as_slice() {
        return (items[only].price.as_decimal(), max_quantity);
    }

    // Rule 2
    let imbalance = |i: usize| buy_sum[i] - sell_sum[i];
    let min_abs = tied
        .iter()
        .map(|&i| imbalance(i).abs())
        .min()
        .unwrap_or(Decimal::ZERO);
    let tied: Vec<usize> = tied
        .into_iter()
        .filter(|&i| imbalance(i).abs() == min_abs)
        .collect();
    if let &[only] = tied.as_slice() {
        return (items[only].price.as_decimal(), max_quantity);
    }

    // Rule 3
    let all_positive = tied.iter().all(|&i| imbalance(i) > Decimal::ZERO);
    let all_negative = tied.iter().all(|&i| imbalance(i) < Decimal::ZERO);
    let pressured = if all_positive {
        round_bankers(reference_price * Decimal::new(105, 2), price_digits)
    } else if all_negative {
        round_bankers(reference_price * Decimal::new(95, 2), price_digits)
    } else {
        reference_price
    };

    // `tied` follows the book, so it is price-descending.
    let prices: Vec<Decimal> = tied.iter().map(|&i| items[i].price.as_decimal()).collect();
    (best_price_from_ref(pressured, &prices), max_quantity)
}

/// Clamp `reference` into the range spanned by `prices` (price-descending).
fn best_price_from_ref(reference: Decimal, prices: &[Decimal]) -> Decimal {
    let (highest, lowest) = match (prices.first(), prices.last()) {
        (Some(&h), Some(&l)) => (h, l),
        _ => return reference,
    };
    if reference >= highest {
        highest
    } else if reference <= lowest {
        lowest
    } else {
        reference
    }
}
