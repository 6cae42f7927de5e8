//! Scenario command grammar
//!
//! ```text
//! enable matching
//! add symbol <id> <name>
//! delete symbol <id>
//! add book <id>
//! delete book <id>
//! add limit {buy|sell} <order_id> <symbol_id> <price> <qty> <flags>
//! add market {buy|sell} <order_id> <symbol_id> <qty> <flags>
//! add slippage market {buy|sell} <order_id> <symbol_id> <qty> <slippage> <flags>
//! reduce <order_id> <qty>
//! modify <order_id> <price> <qty>
//! replace <old_id> <new_id> <price> <qty>
//! delete order <order_id>
//! # comment
//! ```
//!
//! Keywords are case-insensitive; prices are given in raw ticks.

use std::str::FromStr;
use thiserror::Error;
use types::ids::{OrderId, SymbolId};
use types::numeric::{Price, Quantity};
use types::order::Side;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("{command}: expected {expected} arguments, got {got}")]
    WrongArgCount {
        command: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{command}: invalid {field}: {value}")]
    InvalidNumber {
        command: &'static str,
        field: &'static str,
        value: String,
    },
}

/// One parsed scenario line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioCommand {
    EnableMatching,
    AddSymbol {
        symbol: SymbolId,
        name: String,
    },
    DeleteSymbol {
        symbol: SymbolId,
    },
    AddBook {
        symbol: SymbolId,
    },
    DeleteBook {
        symbol: SymbolId,
    },
    AddLimit {
        side: Side,
        order_id: OrderId,
        symbol: SymbolId,
        price: Price,
        quantity: Quantity,
        flags: String,
    },
    AddMarket {
        side: Side,
        order_id: OrderId,
        symbol: SymbolId,
        quantity: Quantity,
        flags: String,
    },
    AddSlippageMarket {
        side: Side,
        order_id: OrderId,
        symbol: SymbolId,
        quantity: Quantity,
        slippage: Price,
        flags: String,
    },
    Reduce {
        order_id: OrderId,
        quantity: Quantity,
    },
    Modify {
        order_id: OrderId,
        price: Price,
        quantity: Quantity,
    },
    Replace {
        old_id: OrderId,
        new_id: OrderId,
        price: Price,
        quantity: Quantity,
    },
    DeleteOrder {
        order_id: OrderId,
    },
    Comment(String),
}

impl ScenarioCommand {
    /// Parse one non-empty scenario line
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let trimmed = line.trim();
        if let Some(comment) = trimmed.strip_prefix('#') {
            return Ok(ScenarioCommand::Comment(comment.trim().to_string()));
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        let keyword = |index: usize| tokens.get(index).map(|t| t.to_ascii_lowercase());

        match keyword(0).as_deref() {
            Some("enable") if keyword(1).as_deref() == Some("matching") => {
                Ok(ScenarioCommand::EnableMatching)
            }
            Some("add") => match keyword(1).as_deref() {
                Some("symbol") => {
                    let args = expect_args("add symbol", &tokens[2..], 2)?;
                    Ok(ScenarioCommand::AddSymbol {
                        symbol: parse_field("add symbol", "symbol id", args[0])?,
                        name: args[1].to_string(),
                    })
                }
                Some("book") => {
                    let args = expect_args("add book", &tokens[2..], 1)?;
                    Ok(ScenarioCommand::AddBook {
                        symbol: parse_field("add book", "symbol id", args[0])?,
                    })
                }
                Some("limit") => {
                    let side = parse_side("add limit", keyword(2))?;
                    let args = expect_args("add limit", &tokens[3..], 5)?;
                    Ok(ScenarioCommand::AddLimit {
                        side,
                        order_id: parse_field("add limit", "order id", args[0])?,
                        symbol: parse_field("add limit", "symbol id", args[1])?,
                        price: parse_price("add limit", "price", args[2])?,
                        quantity: parse_quantity("add limit", "quantity", args[3])?,
                        flags: args[4].to_string(),
                    })
                }
                Some("market") => {
                    let side = parse_side("add market", keyword(2))?;
                    let args = expect_args("add market", &tokens[3..], 4)?;
                    Ok(ScenarioCommand::AddMarket {
                        side,
                        order_id: parse_field("add market", "order id", args[0])?,
                        symbol: parse_field("add market", "symbol id", args[1])?,
                        quantity: parse_quantity("add market", "quantity", args[2])?,
                        flags: args[3].to_string(),
                    })
                }
                Some("slippage") if keyword(2).as_deref() == Some("market") => {
                    let side = parse_side("add slippage market", keyword(3))?;
                    let args = expect_args("add slippage market", &tokens[4..], 5)?;
                    Ok(ScenarioCommand::AddSlippageMarket {
                        side,
                        order_id: parse_field("add slippage market", "order id", args[0])?,
                        symbol: parse_field("add slippage market", "symbol id", args[1])?,
                        quantity: parse_quantity("add slippage market", "quantity", args[2])?,
                        slippage: parse_price("add slippage market", "slippage", args[3])?,
                        flags: args[4].to_string(),
                    })
                }
                _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
            },
            Some("delete") => match keyword(1).as_deref() {
                Some("symbol") => {
                    let args = expect_args("delete symbol", &tokens[2..], 1)?;
                    Ok(ScenarioCommand::DeleteSymbol {
                        symbol: parse_field("delete symbol", "symbol id", args[0])?,
                    })
                }
                Some("book") => {
                    let args = expect_args("delete book", &tokens[2..], 1)?;
                    Ok(ScenarioCommand::DeleteBook {
                        symbol: parse_field("delete book", "symbol id", args[0])?,
                    })
                }
                Some("order") => {
                    let args = expect_args("delete order", &tokens[2..], 1)?;
                    Ok(ScenarioCommand::DeleteOrder {
                        order_id: parse_field("delete order", "order id", args[0])?,
                    })
                }
                _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
            },
            Some("reduce") => {
                let args = expect_args("reduce", &tokens[1..], 2)?;
                Ok(ScenarioCommand::Reduce {
                    order_id: parse_field("reduce", "order id", args[0])?,
                    quantity: parse_quantity("reduce", "quantity", args[1])?,
                })
            }
            Some("modify") => {
                let args = expect_args("modify", &tokens[1..], 3)?;
                Ok(ScenarioCommand::Modify {
                    order_id: parse_field("modify", "order id", args[0])?,
                    price: parse_price("modify", "price", args[1])?,
                    quantity: parse_quantity("modify", "quantity", args[2])?,
                })
            }
            Some("replace") => {
                let args = expect_args("replace", &tokens[1..], 4)?;
                Ok(ScenarioCommand::Replace {
                    old_id: parse_field("replace", "old order id", args[0])?,
                    new_id: parse_field("replace", "new order id", args[1])?,
                    price: parse_price("replace", "price", args[2])?,
                    quantity: parse_quantity("replace", "quantity", args[3])?,
                })
            }
            _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
        }
    }
}

fn expect_args<'a>(
    command: &'static str,
    args: &'a [&'a str],
    expected: usize,
) -> Result<&'a [&'a str], CommandError> {
    if args.len() == expected {
        Ok(args)
    } else {
        Err(CommandError::WrongArgCount {
            command,
            expected,
            got: args.len(),
        })
    }
}

fn parse_side(command: &'static str, token: Option<String>) -> Result<Side, CommandError> {
    match token.as_deref() {
        Some("buy") => Ok(Side::Buy),
        Some("sell") => Ok(Side::Sell),
        other => Err(CommandError::InvalidNumber {
            command,
            field: "side",
            value: other.unwrap_or("<missing>").to_string(),
        }),
    }
}

fn parse_field<T: FromStr>(
    command: &'static str,
    field: &'static str,
    value: &str,
) -> Result<T, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidNumber {
        command,
        field,
        value: value.to_string(),
    })
}

fn parse_price(
    command: &'static str,
    field: &'static str,
    value: &str,
) -> Result<Price, CommandError> {
    let ticks: i64 = parse_field(command, field, value)?;
    Ok(Price::from_ticks(ticks))
}

fn parse_quantity(
    command: &'static str,
    field: &'static str,
    value: &str,
) -> Result<Quantity, CommandError> {
    let raw: u32 = parse_field(command, field, value)?;
    Ok(Quantity::new(raw))
}
