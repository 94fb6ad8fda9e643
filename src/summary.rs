//! Order summary
//!
//! Read-side rendering of a cart for the checkout screen: a line-item table
//! followed by the Subtotal / Tax / Shipping / Total breakdown. Never
//! mutates cart state.

use std::io;

use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{cart::Cart, pricing::CartTotals};

/// Errors that can occur when writing an order summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// IO error
    #[error("IO error")]
    Io,
}

/// Writes the order summary for a cart and its computed totals.
///
/// # Errors
///
/// Returns a [`SummaryError`] if the summary cannot be written.
pub fn write_summary(
    mut out: impl io::Write,
    cart: &Cart,
    totals: &CartTotals,
) -> Result<(), SummaryError> {
    let mut builder = Builder::default();

    builder.push_record(["", "Item", "Size", "Qty", "Unit Price", "Line Total"]);

    for (idx, line) in cart.iter().enumerate() {
        builder.push_record([
            format!("#{:<3}", idx + 1),
            line.name().to_string(),
            line.variant().unwrap_or_default().to_string(),
            line.quantity().to_string(),
            format!("{}", line.unit_price()),
            format!("{}", line.line_total()),
        ]);
    }

    write_item_table(&mut out, builder)?;
    write_totals(&mut out, totals)?;

    Ok(())
}

fn write_item_table(out: &mut impl io::Write, builder: Builder) -> Result<(), SummaryError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..6), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| SummaryError::Io)
}

fn write_totals(out: &mut impl io::Write, totals: &CartTotals) -> Result<(), SummaryError> {
    let subtotal_val = format!("{}  ", totals.subtotal);
    let tax_val = format!("{}  ", totals.tax);
    let shipping_val = format!("{}  ", totals.shipping);
    let total_val = format!("{}  ", totals.total);

    let value_width = subtotal_val
        .len()
        .max(tax_val.len())
        .max(shipping_val.len())
        .max(total_val.len());

    write_totals_line(out, " Subtotal:", &subtotal_val, value_width)?;
    write_totals_line(out, " Tax:", &tax_val, value_width)?;
    write_totals_line(out, " Shipping:", &shipping_val, value_width)?;
    write_totals_line(out, " Total:", &total_val, value_width)?;

    writeln!(out).map_err(|_err| SummaryError::Io)
}

/// Writes one label/value line with a fixed-width value column.
fn write_totals_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    value_width: usize,
) -> Result<(), SummaryError> {
    writeln!(out, "{label:>10}  {value:>value_width$}").map_err(|_err| SummaryError::Io)
}
