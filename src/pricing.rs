//! Pricing

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{cart::Cart, items::LineItem};

/// Errors that can occur while computing cart totals.
#[derive(Debug, Error, PartialEq)]
pub enum TotalsError {
    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// A computed amount did not fit in minor units.
    #[error("computed amount exceeds representable minor units")]
    AmountOverflow,
}

/// Calculates the subtotal of a list of cart lines.
///
/// Arithmetic stays in exact minor units; an empty list sums to zero in the
/// given currency.
///
/// # Errors
///
/// Returns a [`TotalsError::Money`] if money arithmetic fails.
pub fn subtotal(
    items: &[LineItem],
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, TotalsError> {
    items
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, line| {
            acc.add(line.line_total())
        })
        .map_err(TotalsError::from)
}

/// Deployment pricing configuration, injected at the composition root.
///
/// The tax rate and shipping fee vary per deployment, so neither is a
/// constant here; tests pin the numeric policy they care about.
#[derive(Debug, Clone)]
pub struct PricingPolicy {
    /// Tax rate applied to the subtotal.
    pub tax_rate: Percentage,

    /// Flat shipping fee, applied once per non-empty cart.
    pub shipping_fee: Money<'static, Currency>,
}

impl PricingPolicy {
    /// Create a policy with the given tax rate and flat shipping fee.
    #[must_use]
    pub fn new(tax_rate: Percentage, shipping_fee: Money<'static, Currency>) -> Self {
        Self {
            tax_rate,
            shipping_fee,
        }
    }

    /// A policy with no tax and no shipping fee.
    #[must_use]
    pub fn zero(currency: &'static Currency) -> Self {
        Self {
            tax_rate: Percentage::from(0.0),
            shipping_fee: Money::from_minor(0, currency),
        }
    }
}

/// Derived cart totals, computed fresh from the lines on every read.
#[derive(Debug, Clone, PartialEq)]
pub struct CartTotals {
    /// Sum of line totals before tax and shipping.
    pub subtotal: Money<'static, Currency>,

    /// Tax on the subtotal under the policy rate.
    pub tax: Money<'static, Currency>,

    /// Shipping fee, zero for an empty cart.
    pub shipping: Money<'static, Currency>,

    /// `subtotal + tax + shipping`.
    pub total: Money<'static, Currency>,
}

/// Computes the full totals breakdown for a cart under a pricing policy.
///
/// # Errors
///
/// Returns a [`TotalsError`] if money arithmetic fails (e.g. a shipping fee
/// configured in a different currency than the cart) or the tax amount
/// overflows.
pub fn totals(cart: &Cart, policy: &PricingPolicy) -> Result<CartTotals, TotalsError> {
    let subtotal = cart.subtotal()?;
    let tax = tax_for(subtotal, policy.tax_rate)?;

    let shipping = if cart.is_empty() {
        Money::from_minor(0, cart.currency())
    } else {
        policy.shipping_fee
    };

    let total = subtotal.add(tax)?.add(shipping)?;

    Ok(CartTotals {
        subtotal,
        tax,
        shipping,
        total,
    })
}

/// Tax on a subtotal, rounded half-away-from-zero to a whole minor unit.
fn tax_for(
    subtotal: Money<'static, Currency>,
    tax_rate: Percentage,
) -> Result<Money<'static, Currency>, TotalsError> {
    let subtotal_minor = Decimal::from_i64(subtotal.to_minor_units()).unwrap_or(Decimal::ZERO);

    let tax_minor = (tax_rate * subtotal_minor)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(TotalsError::AmountOverflow)?;

    Ok(Money::from_minor(tax_minor, subtotal.currency()))
}
