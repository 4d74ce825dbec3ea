//! # Exchange Core
//!
//! A price-time-priority limit order book and matching engine for a single
//! instrument, with a line-oriented command codec and a depth-weighted
//! equilibrium-mid estimator.
//!
//! Commands (Add, Delete, Modify) are applied strictly in arrival order.
//! An Add whose price crosses the opposite side trades immediately,
//! best price first and FIFO within a level; any residual rests in the
//! book. Delete and Modify address resting orders by id; unknown ids are
//! silent no-ops. All prices and quantities are integers in
//! minimum-increment units.
//!
//! ## Example
//!
//! ```rust
//! use exchange_core::{BookConfig, Command, OrderBook, Side};
//!
//! let mut book = OrderBook::new(BookConfig::default());
//!
//! // Rest an ask, then hit it
//! let rested = book.process(Command::Add { side: Side::Sell, quantity: 5, price: 101 });
//! assert_eq!(rested.resting_order_id, Some(1));
//!
//! let hit = book.process(Command::Add { side: Side::Buy, quantity: 5, price: 101 });
//! assert_eq!(hit.fills.len(), 1);
//! assert_eq!(hit.fills[0].maker_id, 1);
//! assert!(book.is_empty());
//! ```

pub mod limits;
pub mod message;
mod mid;
pub mod order_book;
#[cfg(test)]
pub(crate) mod test_support;
pub mod types;

pub use limits::{LimitError, Limits};
pub use message::{Command, DecodeError};
pub use order_book::{OrderBook, DEFAULT_DEPTH_LEVELS};
pub use types::{
    BookConfig, CommandResult, Fill, Fills, IdMode, Order, OrderId, Price, Quantity, Side,
};

#[cfg(test)]
mod tests {
    use crate::test_support::assert_book_invariants;
    use crate::{BookConfig, Command, Limits, OrderBook, Quantity, Side};

    fn replay(book: &mut OrderBook, lines: &[&str]) -> Vec<crate::CommandResult> {
        lines
            .iter()
            .filter_map(|line| Command::decode(line).ok())
            .map(|command| book.process(command))
            .collect()
    }

    #[test]
    fn wire_lines_drive_the_book_end_to_end() {
        let mut book = OrderBook::default();
        let results = replay(
            &mut book,
            &[
                "A-B-10-99",
                "A-S-5-101",
                "garbage line",
                "A-B-5-101", // crosses the ask
                "M-1-4",
                "D-1",
            ],
        );

        // The garbage line was dropped: five commands ran
        assert_eq!(results.len(), 5);
        assert_eq!(results[2].fills.len(), 1);
        assert_eq!(results[2].fills[0].maker_id, 2);
        assert_eq!(results[2].fills[0].quantity, 5);

        // Bid 1 was modified down then deleted; the book is empty
        assert!(results[4].accepted);
        assert!(book.is_empty());
        assert_book_invariants(&book);
    }

    #[test]
    fn replayed_flow_yields_an_equilibrium_mid_inside_the_spread() {
        let mut book = OrderBook::default();
        replay(
            &mut book,
            &[
                "A-B-20-97", "A-B-10-99", "A-S-10-101", "A-S-20-103", "A-B-5-101", "D-3",
            ],
        );
        // The buy at 101 consumed half of ask 101; deleting order 3 removed
        // the rest, so the best ask is 103.
        assert_eq!(book.best_ask(), Some(103));
        assert_eq!(book.best_bid(), Some(99));

        let half_time_ticks = book.config().price_increment as f64 / 5.0;
        let mid = book.equilibrium_mid(half_time_ticks).expect("two-sided");
        assert!((99.0..=103.0).contains(&mid), "mid = {mid}");
        assert_book_invariants(&book);
    }

    #[test]
    fn unknown_ids_from_the_wire_leave_no_trace() {
        let mut book = OrderBook::default();
        let results = replay(&mut book, &["A-S-5-100", "D-424242", "M-424242-9"]);

        assert!(!results[1].accepted);
        assert!(!results[2].accepted);
        assert_eq!(book.len(), 1);
        assert_book_invariants(&book);
    }

    #[test]
    fn limits_screen_commands_before_the_book() {
        let config = BookConfig {
            min_price: 50,
            max_price: 150,
            ..BookConfig::default()
        };
        let limits = Limits::for_book(&config);
        let mut book = OrderBook::new(config);

        let mut accepted = 0;
        for line in ["A-B-10-99", "A-B-10-200", "A-S-5-101", "A-S-5-49"] {
            let command = Command::decode(line).expect("well-formed");
            if limits.check(&command).is_ok() {
                book.process(command);
                accepted += 1;
            }
        }
        assert_eq!(accepted, 2);
        assert_eq!(book.best_bid(), Some(99));
        assert_eq!(book.best_ask(), Some(101));
        assert_book_invariants(&book);
    }

    #[test]
    fn deep_sweep_across_many_levels() {
        let mut book = OrderBook::default();
        for i in 0..100i64 {
            book.process(Command::Add {
                side: Side::Sell,
                quantity: 10,
                price: 1_000 + i,
            });
        }

        let result = book.process(Command::Add {
            side: Side::Buy,
            quantity: 10 * 100 + 5,
            price: 2_000,
        });

        assert_eq!(result.fills.len(), 100);
        assert_eq!(result.fills[0].price, 1_000);
        assert_eq!(result.fills[99].price, 1_099);
        let filled: Quantity = result.fills.iter().map(|f| f.quantity).sum();
        assert_eq!(filled, 1_000);

        // Ask side swept clean; the residual 5 rests as the only bid
        assert_eq!(book.best_ask(), None);
        assert_eq!(book.best_bid(), Some(2_000));
        assert_eq!(book.len(), 1);
        assert_book_invariants(&book);
    }
}
