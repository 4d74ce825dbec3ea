use crate::message::Command;
use crate::types::{
    BookConfig, CommandResult, Fill, Fills, IdMode, Order, OrderId, Price, PriceAndQuantity,
    PriceLevel, Quantity, Side,
};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

/// Number of price levels a depth snapshot reports by default.
pub const DEFAULT_DEPTH_LEVELS: usize = 10;

/// A limit order book with price-time priority matching for a single
/// instrument.
///
/// The book owns every order record. Callers submit [`Command`]s through
/// [`OrderBook::process`] and hold only order ids; fills and results are
/// returned by value. Commands are applied one at a time and every book
/// invariant holds between commands.
///
/// Buy orders (bids) and sell orders (asks) live in two [`BTreeMap`]s keyed
/// by price, each price level keeping a FIFO queue of order ids. An order
/// index maps ids to their records so Delete and Modify never scan the book.
pub struct OrderBook {
    /// Construction parameters (increments, price bounds, id mode)
    pub(crate) config: BookConfig,
    /// Buy orders by price; the best bid is the last key.
    pub(crate) bids: BTreeMap<Price, PriceLevel>,
    /// Sell orders by price; the best ask is the first key.
    pub(crate) asks: BTreeMap<Price, PriceLevel>,
    /// Every live order, keyed by id
    pub(crate) orders: HashMap<OrderId, Order>,
    /// Cached best bid price; `config.min_price` when the bid side is empty
    pub(crate) high_bid: Price,
    /// Cached best ask price; `config.max_price` when the ask side is empty
    pub(crate) low_ask: Price,
    /// Next id handed out in sequential mode
    next_order_id: OrderId,
}

impl OrderBook {
    /// Creates an empty book with the given construction parameters.
    pub fn new(config: BookConfig) -> Self {
        let high_bid = config.min_price;
        let low_ask = config.max_price;
        OrderBook {
            config,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            orders: HashMap::new(),
            high_bid,
            low_ask,
            next_order_id: 1,
        }
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    /// Applies one command and reports what happened.
    ///
    /// Unknown order ids in Delete/Modify are silent no-ops reported with
    /// `accepted == false`; the book is never left inconsistent.
    pub fn process(&mut self, command: Command) -> CommandResult {
        match command {
            Command::Add {
                side,
                quantity,
                price,
            } => self.add(side, quantity, price),
            Command::Delete { order_id } => self.delete(order_id),
            Command::Modify { order_id, quantity } => self.modify(order_id, quantity),
        }
    }

    /// Returns the best (highest) bid price, or `None` when no bids rest.
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next_back().copied()
    }

    /// Returns the best (lowest) ask price, or `None` when no asks rest.
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    /// Looks up a live order by id, returned by value.
    pub fn order(&self, id: OrderId) -> Option<Order> {
        self.orders.get(&id).copied()
    }

    /// Number of live orders across both sides.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Returns true if the order book has no orders on either side.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Returns a depth snapshot for one side: up to `levels` contiguous
    /// tick prices starting at the best and stepping away from it (bids
    /// descending, asks ascending), each with the total resting quantity,
    /// 0 where no level exists. Stops early at the configured price bounds.
    pub fn depth(&self, side: Side, levels: usize) -> Vec<PriceAndQuantity> {
        let (book_side, best) = match side {
            Side::Buy => (&self.bids, self.best_bid()),
            Side::Sell => (&self.asks, self.best_ask()),
        };
        let Some(start) = best else {
            return Vec::new();
        };

        let mut snapshot = Vec::with_capacity(levels);
        let mut price = start;
        for _ in 0..levels {
            let quantity = book_side.get(&price).map_or(0, |level| level.total_quantity);
            snapshot.push((price, quantity));

            let next = match side {
                Side::Buy => price.checked_sub(self.config.price_increment),
                Side::Sell => price.checked_add(self.config.price_increment),
            };
            match next {
                Some(p) if p >= self.config.min_price && p <= self.config.max_price => price = p,
                _ => break,
            }
        }
        snapshot
    }

    /// Handles an Add command: rest when the price does not cross the
    /// opposite side, otherwise run it through the matching walk.
    ///
    /// The boundary is strict: a buy at exactly `low_ask` (or a sell at
    /// exactly `high_bid`) crosses. An empty opposite side leaves its
    /// sentinel in place, so the comparison sends the order to rest.
    fn add(&mut self, side: Side, quantity: Quantity, price: Price) -> CommandResult {
        if quantity == 0 {
            trace!(?side, price, "dropping zero-quantity add");
            return CommandResult::ignored();
        }
        let crosses = match side {
            Side::Buy => price >= self.low_ask,
            Side::Sell => price <= self.high_bid,
        };
        if crosses {
            self.match_incoming(side, quantity, price)
        } else {
            let id = self.rest(side, quantity, price);
            CommandResult::rested(id)
        }
    }

    /// Creates a new resting order at the tail of its price level and
    /// indexes it. Updates the cached best if the price improves it.
    fn rest(&mut self, side: Side, quantity: Quantity, price: Price) -> OrderId {
        let id = self.allocate_order_id();
        let book_side = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        book_side
            .entry(price)
            .or_insert_with(PriceLevel::new)
            .enqueue(id, quantity);
        self.orders.insert(id, Order::new(id, side, price, quantity));

        match side {
            Side::Buy => self.high_bid = self.high_bid.max(price),
            Side::Sell => self.low_ask = self.low_ask.min(price),
        }
        trace!(id, ?side, price, quantity, "order resting");
        id
    }

    fn allocate_order_id(&mut self) -> OrderId {
        match self.config.id_mode {
            IdMode::Sequential => {
                let id = self.next_order_id;
                self.next_order_id += 1;
                id
            }
            IdMode::Random => loop {
                let id = rand::random::<OrderId>();
                if !self.orders.contains_key(&id) {
                    break id;
                }
            },
        }
    }

    /// Matches an incoming aggressive order against the opposite side.
    ///
    /// Walks the opposite book from the best price outward, stopping at the
    /// first level the aggressor cannot reach. Any residual quantity rests
    /// on the aggressor's own side at its limit price. The consumed side's
    /// cached best is refreshed afterwards: first remaining level, or the
    /// sentinel when the side emptied.
    fn match_incoming(&mut self, side: Side, quantity: Quantity, price: Price) -> CommandResult {
        debug!(?side, quantity, price, "incoming order crosses");
        let mut remaining = quantity;
        let mut fills = Fills::new();

        match side {
            Side::Buy => {
                while remaining > 0 {
                    // Best ask the buyer can still reach
                    let Some(level_price) = self.asks.range(..=price).next().map(|(&p, _)| p)
                    else {
                        break;
                    };
                    Self::match_level(
                        side,
                        &mut remaining,
                        level_price,
                        &mut self.asks,
                        &mut self.orders,
                        &mut fills,
                    );
                }
                self.low_ask = self.best_ask().unwrap_or(self.config.max_price);
            }
            Side::Sell => {
                while remaining > 0 {
                    let Some(level_price) = self.bids.range(price..).next_back().map(|(&p, _)| p)
                    else {
                        break;
                    };
                    Self::match_level(
                        side,
                        &mut remaining,
                        level_price,
                        &mut self.bids,
                        &mut self.orders,
                        &mut fills,
                    );
                }
                self.high_bid = self.best_bid().unwrap_or(self.config.min_price);
            }
        }

        let resting = (remaining > 0).then(|| self.rest(side, remaining, price));
        debug!(
            fill_count = fills.len(),
            residual = remaining,
            "matching complete"
        );
        CommandResult::matched(fills, resting)
    }

    /// Consumes orders from the head of one price level in arrival order
    /// until the aggressor is satisfied or the level is exhausted. A
    /// partially consumed maker keeps its place at the head with its
    /// residual quantity. Empty levels are removed from the side book.
    ///
    /// Associated function: callers hold disjoint borrows of one side book
    /// and the order index.
    fn match_level(
        taker_side: Side,
        remaining: &mut Quantity,
        price: Price,
        book_side: &mut BTreeMap<Price, PriceLevel>,
        orders: &mut HashMap<OrderId, Order>,
        fills: &mut Fills,
    ) {
        let Some(level) = book_side.get_mut(&price) else {
            return;
        };
        while *remaining > 0 {
            let Some(&maker_id) = level.orders.front() else {
                break;
            };
            let maker = orders.get_mut(&maker_id).expect("queued id is indexed");
            let fill_quantity = (*remaining).min(maker.quantity);

            fills.push(Fill {
                maker_id,
                taker_side,
                price,
                quantity: fill_quantity,
            });
            *remaining -= fill_quantity;

            if fill_quantity == maker.quantity {
                // Fully consumed: pop and deindex
                level.remove_front(fill_quantity);
                orders.remove(&maker_id);
            } else {
                // Partial: shrink the head order in place
                maker.quantity -= fill_quantity;
                level.reduce_total(fill_quantity);
            }
        }
        if level.is_empty() {
            book_side.remove(&price);
        }
    }

    /// Handles a Delete command. Unknown ids are silent no-ops.
    fn delete(&mut self, order_id: OrderId) -> CommandResult {
        let Some(order) = self.orders.remove(&order_id) else {
            trace!(order_id, "delete for unknown order id");
            return CommandResult::ignored();
        };
        self.unlink(&order);
        debug!(order_id, "order deleted");
        CommandResult::removed(order_id)
    }

    /// Removes a resting order from its price level, prunes the level if it
    /// emptied, and refreshes the cached best when the top level went away.
    fn unlink(&mut self, order: &Order) {
        let book_side = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(level) = book_side.get_mut(&order.price) {
            level.remove(order.id, order.quantity);
            if level.is_empty() {
                book_side.remove(&order.price);
            }
        }
        match order.side {
            Side::Buy if order.price == self.high_bid => {
                self.high_bid = self.best_bid().unwrap_or(self.config.min_price);
            }
            Side::Sell if order.price == self.low_ask => {
                self.low_ask = self.best_ask().unwrap_or(self.config.max_price);
            }
            _ => {}
        }
    }

    /// Handles a Modify command.
    ///
    /// - quantity 0 deletes the order;
    /// - an increase forfeits the queue position: the order is requeued at
    ///   the tail of its level (same id, same price);
    /// - a decrease keeps time priority and shrinks the order in place.
    fn modify(&mut self, order_id: OrderId, quantity: Quantity) -> CommandResult {
        let Some(&order) = self.orders.get(&order_id) else {
            trace!(order_id, "modify for unknown order id");
            return CommandResult::ignored();
        };
        if quantity == 0 {
            return self.delete(order_id);
        }

        let book_side = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(level) = book_side.get_mut(&order.price) {
            if quantity > order.quantity {
                level.remove(order.id, order.quantity);
                level.enqueue(order.id, quantity);
                debug!(
                    order_id,
                    from = order.quantity,
                    to = quantity,
                    "order grew, requeued at the tail"
                );
            } else {
                level.reduce_total(order.quantity - quantity);
            }
        }
        if let Some(stored) = self.orders.get_mut(&order_id) {
            stored.quantity = quantity;
        }
        CommandResult::rested(order_id)
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new(BookConfig::default())
    }
}
