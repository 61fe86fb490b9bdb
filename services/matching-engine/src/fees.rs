//! Fee waterfall
//!
//! Fees are denominated in the native asset and taken, in order of
//! preference, from:
//! 1. the order's own leg when that leg is the native asset (escrow for
//!    cancel/expire, proceeds for fills), clamped to what the leg holds;
//! 2. the sender's free native balance;
//! 3. the order's non-native leg, converted at the reference price of the
//!    `{asset}_{native}` or `{native}_{asset}` pair and clamped to the leg.
//!
//! A fee with no conversion route in step 3 is waived. Every non-zero charge
//! is recorded on the order, reported through `add_fee_detail` and moved to
//! the collected fee pool.

use rust_decimal::Decimal;
use tracing::debug;
use types::coin::{Coin, Coins};
use types::fee::{FeeDetail, FeeSource, FeeType};
use types::ids::Product;
use types::numeric::round_bankers;
use types::order::Order;

use ledger::TokenPairSource;
use store::KvStore;

use crate::config::{OrderParams, FEE_PRECISION};
use crate::context::Context;
use crate::keeper::OrderKeeper;

/// A fee as actually charged
#[derive(Debug, Clone, PartialEq)]
pub struct FeeCharge {
    pub coin: Coin,
    pub source: FeeSource,
}

impl FeeCharge {
    fn waived(denom: &str) -> Self {
        Self {
            coin: Coin::new(denom, Decimal::ZERO),
            source: FeeSource::Waived,
        }
    }

    /// True when the fee came out of the order's escrow or proceeds, so the
    /// caller must release or credit that much less.
    pub fn from_order_leg(&self) -> bool {
        matches!(self.source, FeeSource::NativeLeg | FeeSource::Converted)
    }

    pub fn coins(&self) -> Coins {
        Coins::from(self.coin.clone())
    }
}

/// Value of `amount` of `from` expressed in `to`, at the reference price of
/// whichever of `{from}_{to}` or `{to}_{from}` is listed.
pub fn convert_amount(
    store: &dyn KvStore,
    pairs: &dyn TokenPairSource,
    from: &str,
    to: &str,
    amount: Decimal,
) -> Option<Decimal> {
    if from == to {
        return Some(amount);
    }
    if let Some(pair) = pairs.token_pair(&Product::from_assets(from, to)) {
        let price = OrderKeeper::reference_price(store, &pair);
        return Some(round_bankers(amount * price, FEE_PRECISION));
    }
    let pair = pairs.token_pair(&Product::from_assets(to, from))?;
    let price = OrderKeeper::reference_price(store, &pair);
    if price.is_zero() {
        return None;
    }
    Some(round_bankers(amount / price, FEE_PRECISION))
}

/// Charge a fixed native fee against an order that is releasing `escrow`.
///
/// Used for cancel and expire. The caller unlocks `escrow` minus the charged
/// amount when `from_order_leg()` holds.
pub fn charge_escrow_fee(
    ctx: &mut Context<'_>,
    params: &OrderParams,
    order: &mut Order,
    fee_type: FeeType,
    native_fee: Decimal,
    escrow: &Coin,
) -> FeeCharge {
    let native = params.native_asset.as_str();
    if native_fee.is_zero() {
        return FeeCharge::waived(native);
    }

    let charge = if escrow.denom == native {
        let coin = Coin::new(native, native_fee.min(escrow.amount));
        burn_escrow(ctx, order, &coin);
        FeeCharge {
            coin,
            source: FeeSource::NativeLeg,
        }
    } else if let Some(charge) = charge_free_balance(ctx, order, Coin::new(native, native_fee)) {
        charge
    } else {
        match convert_amount(&*ctx.store, ctx.pairs, native, &escrow.denom, native_fee) {
            Some(amount) => {
                let coin = Coin::new(escrow.denom.as_str(), amount.min(escrow.amount));
                burn_escrow(ctx, order, &coin);
                FeeCharge {
                    coin,
                    source: FeeSource::Converted,
                }
            }
            None => FeeCharge::waived(native),
        }
    };

    record(ctx, order, &charge, fee_type);
    charge
}

/// Charge the trade fee on one fill.
///
/// `received` is what the order is about to be credited and `paid` what it
/// gave up. The caller credits `received` minus the charged amount when
/// `from_order_leg()` holds.
pub fn charge_deal_fee(
    ctx: &mut Context<'_>,
    params: &OrderParams,
    order: &mut Order,
    received: &Coin,
    paid: &Coin,
) -> FeeCharge {
    let native = params.native_asset.as_str();
    let rate = params.trade_fee_rate;
    if rate.is_zero() || received.is_zero() {
        return FeeCharge::waived(native);
    }
    let on_received = round_bankers(received.amount * rate, FEE_PRECISION).min(received.amount);

    let charge = if received.denom == native {
        FeeCharge {
            coin: Coin::new(native, on_received),
            source: FeeSource::NativeLeg,
        }
    } else {
        let native_equivalent = if paid.denom == native {
            Some(round_bankers(paid.amount * rate, FEE_PRECISION))
        } else {
            convert_amount(&*ctx.store, ctx.pairs, &received.denom, native, on_received)
        };
        let from_balance = native_equivalent
            .filter(|amount| !amount.is_zero())
            .and_then(|amount| charge_free_balance(ctx, order, Coin::new(native, amount)));

        match from_balance {
            Some(charge) => charge,
            None => FeeCharge {
                coin: Coin::new(received.denom.as_str(), on_received),
                source: FeeSource::Converted,
            },
        }
    };

    // Proceeds-funded fees never reach the ledger as balance; collect here.
    if charge.from_order_leg() {
        collect(ctx, &charge.coin);
    }
    record(ctx, order, &charge, FeeType::OrderDeal);
    charge
}

fn charge_free_balance(ctx: &mut Context<'_>, order: &Order, fee: Coin) -> Option<FeeCharge> {
    if !ctx.tokens.has_coins(&order.sender, &fee) {
        return None;
    }
    if let Err(e) = ctx.tokens.subtract_coins(&order.sender, &fee) {
        panic!("ledger refused fee {} from {}: {}", fee, order.sender, e);
    }
    collect(ctx, &fee);
    Some(FeeCharge {
        coin: fee,
        source: FeeSource::FreeBalance,
    })
}

fn burn_escrow(ctx: &mut Context<'_>, order: &Order, coin: &Coin) {
    if let Err(e) = ctx.tokens.burn_locked_coins(&order.sender, coin) {
        panic!("escrow of order {} cannot cover fee {}: {}", order.order_id, coin, e);
    }
    collect(ctx, coin);
}

fn collect(ctx: &mut Context<'_>, coin: &Coin) {
    if let Err(e) = ctx.tokens.add_collected_fees(coin) {
        panic!("fee pool rejected {}: {}", coin, e);
    }
}

fn record(ctx: &mut Context<'_>, order: &mut Order, charge: &FeeCharge, fee_type: FeeType) {
    if charge.coin.is_zero() {
        return;
    }
    order.record_fee(&charge.coin);
    ctx.tokens.add_fee_detail(FeeDetail {
        address: order.sender.clone(),
        order_id: order.order_id,
        fee: charge.coins(),
        fee_type,
    });
    debug!(
        order_id = %order.order_id,
        fee = %charge.coin,
        source = ?charge.source,
        kind = %fee_type,
        "order fee charged"
    );
}
