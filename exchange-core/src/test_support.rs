#![cfg(test)]

use crate::message::Command;
use crate::types::{BookConfig, CommandResult, OrderId, Price, Quantity, Side};
use crate::OrderBook;
use std::collections::HashSet;

pub(crate) fn new_book() -> OrderBook {
    OrderBook::new(BookConfig::default())
}

pub(crate) fn book_with(config: BookConfig) -> OrderBook {
    OrderBook::new(config)
}

pub(crate) fn add(
    book: &mut OrderBook,
    side: Side,
    quantity: Quantity,
    price: Price,
) -> CommandResult {
    book.process(Command::Add {
        side,
        quantity,
        price,
    })
}

pub(crate) fn delete(book: &mut OrderBook, order_id: OrderId) -> CommandResult {
    book.process(Command::Delete { order_id })
}

pub(crate) fn modify(book: &mut OrderBook, order_id: OrderId, quantity: Quantity) -> CommandResult {
    book.process(Command::Modify { order_id, quantity })
}

/// Full observable state of a book, for law tests comparing two runs.
pub(crate) fn fingerprint(book: &OrderBook) -> Vec<(Side, Price, Vec<(OrderId, Quantity)>)> {
    let mut state = Vec::new();
    for (side, book_side) in [(Side::Buy, &book.bids), (Side::Sell, &book.asks)] {
        for (&price, level) in book_side {
            let queue = level
                .orders
                .iter()
                .map(|&id| (id, book.orders[&id].quantity))
                .collect();
            state.push((side, price, queue));
        }
    }
    state
}

/// Asserts every quantified book invariant. Called by behavior tests after
/// each interesting command.
pub(crate) fn assert_book_invariants(book: &OrderBook) {
    // Non-crossed at rest
    if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
        assert!(bid < ask, "book crossed at rest: bid {bid} >= ask {ask}");
    }

    // Cached best prices agree with the side books (or hold the sentinel)
    assert_eq!(
        book.high_bid,
        book.best_bid().unwrap_or(book.config.min_price),
        "stale cached high bid"
    );
    assert_eq!(
        book.low_ask,
        book.best_ask().unwrap_or(book.config.max_price),
        "stale cached low ask"
    );

    // Level and index consistency
    let mut seen = HashSet::new();
    for (side, book_side) in [(Side::Buy, &book.bids), (Side::Sell, &book.asks)] {
        for (&price, level) in book_side {
            assert!(!level.is_empty(), "empty level at {price} left in book");
            let mut level_total: Quantity = 0;
            for &id in &level.orders {
                assert!(seen.insert(id), "order {id} queued twice");
                let order = book
                    .orders
                    .get(&id)
                    .unwrap_or_else(|| panic!("order {id} queued but not indexed"));
                assert_eq!(order.side, side, "order {id} queued on the wrong side");
                assert_eq!(order.price, price, "order {id} queued at the wrong level");
                assert!(order.quantity > 0, "order {id} resting with zero quantity");
                level_total += order.quantity;
            }
            assert_eq!(
                level.total_quantity, level_total,
                "stale level total at {price}"
            );
        }
    }
    assert_eq!(
        seen.len(),
        book.orders.len(),
        "index holds orders that rest on no level"
    );
}
