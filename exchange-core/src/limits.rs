//! Optional sanity checks applied to commands before they reach the book.
//!
//! The book itself trusts its input; a host that ingests untrusted flow
//! runs each decoded [`Command`] through [`Limits::check`] first and drops
//! or reports rejected commands.

use crate::message::Command;
use crate::types::{BookConfig, Price, Quantity};
use derive_more::{Display, Error};

/// Why a command was rejected by the sanity checks.
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum LimitError {
    #[display("price {price} outside [{min}; {max}]")]
    PriceOutOfRange { price: Price, min: Price, max: Price },
    #[display("price {price} is not a multiple of the {increment} tick")]
    PriceOffTick { price: Price, increment: Price },
    #[display("quantity {quantity} outside [{min}; {max}]")]
    QuantityOutOfRange {
        quantity: Quantity,
        min: Quantity,
        max: Quantity,
    },
    #[display("quantity {quantity} is not a multiple of the {increment} lot")]
    QuantityOffLot {
        quantity: Quantity,
        increment: Quantity,
    },
}

/// Configured bounds and increments for inbound commands.
///
/// Price bounds and both increments come from the book configuration;
/// quantity bounds default to unbounded and can be tightened by the host.
#[derive(Debug, Clone)]
pub struct Limits {
    pub min_price: Price,
    pub max_price: Price,
    pub price_increment: Price,
    pub min_quantity: Quantity,
    pub max_quantity: Quantity,
    pub quantity_increment: Quantity,
}

impl Limits {
    /// Builds limits matching a book's configuration, with unbounded
    /// quantities.
    pub fn for_book(config: &BookConfig) -> Self {
        Limits {
            min_price: config.min_price,
            max_price: config.max_price,
            price_increment: config.price_increment,
            min_quantity: 0,
            max_quantity: Quantity::MAX,
            quantity_increment: config.quantity_increment,
        }
    }

    /// Checks one command against the configured bounds.
    ///
    /// Add checks price and quantity; Modify checks only the quantity
    /// (price and side are immutable); Delete always passes.
    pub fn check(&self, command: &Command) -> Result<(), LimitError> {
        match *command {
            Command::Add {
                quantity, price, ..
            } => {
                self.check_price(price)?;
                self.check_quantity(quantity)
            }
            Command::Modify { quantity, .. } => self.check_quantity(quantity),
            Command::Delete { .. } => Ok(()),
        }
    }

    fn check_price(&self, price: Price) -> Result<(), LimitError> {
        if price < self.min_price || price > self.max_price {
            return Err(LimitError::PriceOutOfRange {
                price,
                min: self.min_price,
                max: self.max_price,
            });
        }
        if self.price_increment > 1 && price % self.price_increment != 0 {
            return Err(LimitError::PriceOffTick {
                price,
                increment: self.price_increment,
            });
        }
        Ok(())
    }

    fn check_quantity(&self, quantity: Quantity) -> Result<(), LimitError> {
        if quantity < self.min_quantity || quantity > self.max_quantity {
            return Err(LimitError::QuantityOutOfRange {
                quantity,
                min: self.min_quantity,
                max: self.max_quantity,
            });
        }
        if self.quantity_increment > 1 && quantity % self.quantity_increment != 0 {
            return Err(LimitError::QuantityOffLot {
                quantity,
                increment: self.quantity_increment,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod limits_tests {
    use super::*;
    use crate::types::Side;

    fn add(quantity: Quantity, price: Price) -> Command {
        Command::Add {
            side: Side::Buy,
            quantity,
            price,
        }
    }

    #[test]
    fn default_limits_accept_ordinary_commands() {
        let limits = Limits::for_book(&BookConfig::default());
        assert_eq!(limits.check(&add(10, 100)), Ok(()));
        assert_eq!(limits.check(&Command::Delete { order_id: 7 }), Ok(()));
        assert_eq!(
            limits.check(&Command::Modify {
                order_id: 7,
                quantity: 0
            }),
            Ok(())
        );
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let limits = Limits {
            min_price: 10,
            max_price: 20,
            ..Limits::for_book(&BookConfig::default())
        };
        assert_eq!(limits.check(&add(1, 10)), Ok(()));
        assert_eq!(limits.check(&add(1, 20)), Ok(()));
        assert!(matches!(
            limits.check(&add(1, 9)),
            Err(LimitError::PriceOutOfRange { price: 9, .. })
        ));
        assert!(matches!(
            limits.check(&add(1, 21)),
            Err(LimitError::PriceOutOfRange { price: 21, .. })
        ));
    }

    #[test]
    fn off_tick_prices_are_rejected() {
        let limits = Limits::for_book(&BookConfig {
            price_increment: 5,
            ..BookConfig::default()
        });
        assert_eq!(limits.check(&add(1, 100)), Ok(()));
        assert!(matches!(
            limits.check(&add(1, 102)),
            Err(LimitError::PriceOffTick { price: 102, .. })
        ));
    }

    #[test]
    fn quantity_bounds_apply_to_add_and_modify() {
        let limits = Limits {
            min_quantity: 5,
            max_quantity: 50,
            ..Limits::for_book(&BookConfig::default())
        };
        assert!(matches!(
            limits.check(&add(4, 100)),
            Err(LimitError::QuantityOutOfRange { quantity: 4, .. })
        ));
        assert!(matches!(
            limits.check(&Command::Modify {
                order_id: 1,
                quantity: 51
            }),
            Err(LimitError::QuantityOutOfRange { quantity: 51, .. })
        ));
        assert_eq!(limits.check(&add(5, 100)), Ok(()));
    }

    #[test]
    fn off_lot_quantities_are_rejected() {
        let limits = Limits::for_book(&BookConfig {
            quantity_increment: 10,
            ..BookConfig::default()
        });
        assert_eq!(limits.check(&add(30, 100)), Ok(()));
        assert!(matches!(
            limits.check(&add(33, 100)),
            Err(LimitError::QuantityOffLot { quantity: 33, .. })
        ));
    }

    #[test]
    fn delete_is_never_range_checked() {
        let limits = Limits {
            min_price: 10,
            max_price: 20,
            min_quantity: 5,
            max_quantity: 50,
            ..Limits::for_book(&BookConfig::default())
        };
        assert_eq!(
            limits.check(&Command::Delete {
                order_id: u64::MAX
            }),
            Ok(())
        );
    }
}
