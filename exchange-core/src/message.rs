//! Wire format for order commands.
//!
//! One command per line, fields separated by `-`:
//!
//! - `A-B-<qty>-<price>` / `A-S-<qty>-<price>` — add a buy / sell order
//! - `D-<id>` — delete the order with that id
//! - `M-<id>-<qty>` — set the order's quantity
//!
//! Decoding is strict: an unknown tag, a wrong field count or a
//! non-integer field yields a [`DecodeError`] and the line can be dropped
//! or reported by the host.

use crate::types::{OrderId, Price, Quantity, Side};
use derive_more::{Display, Error};

/// An order command, decoded and ready for the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Place a new order; crossing prices trade immediately.
    Add {
        side: Side,
        quantity: Quantity,
        price: Price,
    },
    /// Remove a resting order.
    Delete { order_id: OrderId },
    /// Change a resting order's quantity (0 deletes it).
    Modify {
        order_id: OrderId,
        quantity: Quantity,
    },
}

/// Why a line could not be decoded.
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[display("empty input line")]
    Empty,
    #[display("unknown command tag {tag:?}")]
    UnknownTag { tag: String },
    #[display("expected {expected} fields for {tag:?}, got {got}")]
    FieldCount { tag: char, expected: usize, got: usize },
    #[display("field {field:?} is not a valid integer")]
    BadInteger { field: String },
    #[display("side must be B or S, got {side:?}")]
    BadSide { side: String },
}

fn parse_side(field: &str) -> Result<Side, DecodeError> {
    match field {
        "B" => Ok(Side::Buy),
        "S" => Ok(Side::Sell),
        other => Err(DecodeError::BadSide {
            side: other.to_string(),
        }),
    }
}

fn parse_integer<T: std::str::FromStr>(field: &str) -> Result<T, DecodeError> {
    field.parse().map_err(|_| DecodeError::BadInteger {
        field: field.to_string(),
    })
}

fn expect_fields(tag: char, fields: &[&str], expected: usize) -> Result<(), DecodeError> {
    if fields.len() == expected {
        Ok(())
    } else {
        Err(DecodeError::FieldCount {
            tag,
            expected,
            got: fields.len(),
        })
    }
}

impl Command {
    /// Decodes one line of the wire format.
    pub fn decode(line: &str) -> Result<Command, DecodeError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(DecodeError::Empty);
        }
        let fields: Vec<&str> = line.split('-').collect();
        match fields[0] {
            "A" => {
                expect_fields('A', &fields, 4)?;
                Ok(Command::Add {
                    side: parse_side(fields[1])?,
                    quantity: parse_integer(fields[2])?,
                    price: parse_integer(fields[3])?,
                })
            }
            "D" => {
                expect_fields('D', &fields, 2)?;
                Ok(Command::Delete {
                    order_id: parse_integer(fields[1])?,
                })
            }
            "M" => {
                expect_fields('M', &fields, 3)?;
                Ok(Command::Modify {
                    order_id: parse_integer(fields[1])?,
                    quantity: parse_integer(fields[2])?,
                })
            }
            other => Err(DecodeError::UnknownTag {
                tag: other.to_string(),
            }),
        }
    }

    /// Produces the canonical wire encoding of this command.
    ///
    /// `decode(encode(cmd))` returns `cmd` for every command.
    pub fn encode(&self) -> String {
        match self {
            Command::Add {
                side,
                quantity,
                price,
            } => {
                let side = match side {
                    Side::Buy => 'B',
                    Side::Sell => 'S',
                };
                format!("A-{side}-{quantity}-{price}")
            }
            Command::Delete { order_id } => format!("D-{order_id}"),
            Command::Modify { order_id, quantity } => format!("M-{order_id}-{quantity}"),
        }
    }
}
