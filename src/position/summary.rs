use std::fmt;

use alloy::primitives::utils::format_units;
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::position::Position;

/// Collateral token metadata needed to display balances.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

impl Token {
    #[must_use]
    pub fn new<S: Into<String>>(address: Address, symbol: S, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Formats a raw amount with this token's decimals, dropping trailing zeros.
    pub fn format_amount(&self, amount: U256) -> Result<String> {
        let formatted = format_units(amount, self.decimals)?;

        if formatted.contains('.') {
            let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
            Ok(trimmed.to_owned())
        } else {
            Ok(formatted)
        }
    }
}

/// One-line description of a position balance, e.g.
/// `[USDC C: 0x8bfbea...2a765f O: 0] x1.5`.
#[derive(Debug, Clone, Copy)]
pub struct PositionSummary<'a> {
    position: &'a Position,
    token: &'a Token,
    balance: U256,
}

impl<'a> PositionSummary<'a> {
    #[must_use]
    pub fn new(position: &'a Position, token: &'a Token, balance: U256) -> Self {
        Self {
            position,
            token,
            balance,
        }
    }
}

impl fmt::Display for PositionSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.token.symbol)?;

        for (i, step) in self.position.lineage.iter().enumerate() {
            let separator = if i == 0 { " " } else { " & " };
            let outcomes = step
                .index_set
                .outcomes()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");

            write!(
                f,
                "{separator}C: {} O: {outcomes}",
                truncate_middle(&step.condition_id.to_string(), 8, 6)
            )?;
        }

        match self.token.format_amount(self.balance) {
            Ok(amount) => write!(f, "] x{amount}"),
            Err(_) => write!(f, "] x{}", self.balance),
        }
    }
}

/// Keeps the first `head` and last `tail` bytes of a hex identifier.
pub(crate) fn truncate_middle(value: &str, head: usize, tail: usize) -> String {
    if value.len() <= head + tail + 3 {
        return value.to_owned();
    }

    match (value.get(..head), value.get(value.len() - tail..)) {
        (Some(start), Some(end)) => format!("{start}...{end}"),
        _ => value.to_owned(),
    }
}
