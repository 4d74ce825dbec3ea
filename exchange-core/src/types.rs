use derive_more::Display;
use std::collections::VecDeque;

/// Price in minimum-increment units.
pub type Price = i64;
/// Quantity in minimum-increment units.
pub type Quantity = u64;
/// Opaque order identifier; stable for the lifetime of the book.
pub type OrderId = u64;

pub type PriceAndQuantity = (Price, Quantity);

/// Represents the side of an order in the order book.
///
/// Orders are either buy orders (bids) or sell orders (asks).
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Buy order (bid) - willing to buy at the specified price or lower
    Buy,
    /// Sell order (ask) - willing to sell at the specified price or higher
    Sell,
}

/// A resting order.
///
/// Identity, side and price are fixed at creation; only the residual
/// quantity changes, through matching or a Modify command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    /// Unique identifier for the order
    pub id: OrderId,
    /// Whether this is a buy or sell order
    pub side: Side,
    /// Price per unit in minimum-increment units
    pub price: Price,
    /// Residual number of units; a live order always has quantity > 0
    pub quantity: Quantity,
}

impl Order {
    pub fn new(id: OrderId, side: Side, price: Price, quantity: Quantity) -> Self {
        Order {
            id,
            side,
            price,
            quantity,
        }
    }
}

/// Represents a price level in the order book.
///
/// A price level holds the ids of all orders resting at one price, in
/// arrival order (FIFO), together with the cached total quantity across
/// them. The order records themselves live in the book's order index.
#[derive(Debug, Default)]
pub(crate) struct PriceLevel {
    /// Queue of order ids at this price level (front = earliest arrival)
    pub(crate) orders: VecDeque<OrderId>,
    /// Total quantity available at this price level
    pub(crate) total_quantity: Quantity,
}

impl PriceLevel {
    /// Creates a new empty price level.
    pub(crate) fn new() -> Self {
        PriceLevel::default()
    }

    /// Appends an order id to the back of the queue.
    pub(crate) fn enqueue(&mut self, id: OrderId, quantity: Quantity) {
        self.total_quantity += quantity;
        self.orders.push_back(id);
    }

    /// Removes and returns the id at the front of the queue, deducting the
    /// caller-supplied quantity from the level total.
    pub(crate) fn remove_front(&mut self, quantity: Quantity) -> Option<OrderId> {
        let id = self.orders.pop_front()?;
        self.total_quantity -= quantity;
        Some(id)
    }

    /// Deducts quantity from the level total without touching the queue.
    /// Used when the front order is partially filled or an order shrinks
    /// in place.
    pub(crate) fn reduce_total(&mut self, by: Quantity) {
        self.total_quantity -= by;
    }

    /// Removes an id from anywhere in the queue, deducting its quantity.
    /// Returns false if the id is not at this level.
    pub(crate) fn remove(&mut self, id: OrderId, quantity: Quantity) -> bool {
        match self.orders.iter().position(|&queued| queued == id) {
            Some(pos) => {
                self.orders.remove(pos);
                self.total_quantity -= quantity;
                true
            }
            None => false,
        }
    }

    /// Returns true if this price level has no orders.
    pub(crate) fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Selects how the book allocates order ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdMode {
    /// Monotonically increasing ids starting at 1
    #[default]
    Sequential,
    /// Uniformly random u64 tokens, re-drawn on collision with a live order
    Random,
}

/// Book construction parameters.
#[derive(Debug, Clone)]
pub struct BookConfig {
    /// Minimum price granularity; valid prices are multiples of it
    pub price_increment: Price,
    /// Minimum quantity granularity
    pub quantity_increment: Quantity,
    /// Lower price bound; also the empty-bid-side sentinel
    pub min_price: Price,
    /// Upper price bound; also the empty-ask-side sentinel
    pub max_price: Price,
    /// Order id allocation mode
    pub id_mode: IdMode,
}

impl Default for BookConfig {
    fn default() -> Self {
        BookConfig {
            price_increment: 1,
            quantity_increment: 1,
            min_price: 0,
            max_price: Price::MAX,
            id_mode: IdMode::Sequential,
        }
    }
}

/// A single execution against a resting order.
///
/// The price comes from the maker (the resting order); the taker is the
/// incoming aggressive order, identified only by its side because a fully
/// consumed taker never receives an id.
#[derive(Display, Debug, Clone, PartialEq, Eq)]
#[display(
    "{} @ {} (maker: {}, taker side: {})",
    quantity,
    price,
    maker_id,
    taker_side
)]
pub struct Fill {
    /// Id of the resting order that provided the liquidity
    pub maker_id: OrderId,
    /// Side of the incoming order that consumed it
    pub taker_side: Side,
    /// Execution price (the maker's level)
    pub price: Price,
    /// Number of units traded
    pub quantity: Quantity,
}

/// A collection of fills, in execution order.
pub type Fills = Vec<Fill>;

/// Outcome of one processed command.
///
/// An unknown order id yields `accepted == false` and nothing else; the
/// book is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// False when the command referenced an unknown order id
    pub accepted: bool,
    /// The id now resting in the book (Add, or Modify of a live order)
    pub resting_order_id: Option<OrderId>,
    /// The id removed from the book (Delete, or Modify to zero)
    pub removed_order_id: Option<OrderId>,
    /// Fills produced by an aggressive Add, best price first then FIFO
    pub fills: Fills,
}

impl CommandResult {
    /// Silent no-op: unknown id or a command the book refuses to apply.
    pub(crate) fn ignored() -> Self {
        CommandResult {
            accepted: false,
            resting_order_id: None,
            removed_order_id: None,
            fills: Fills::new(),
        }
    }

    /// A new or modified order now rests under `id`.
    pub(crate) fn rested(id: OrderId) -> Self {
        CommandResult {
            accepted: true,
            resting_order_id: Some(id),
            removed_order_id: None,
            fills: Fills::new(),
        }
    }

    /// `id` has been removed from the book.
    pub(crate) fn removed(id: OrderId) -> Self {
        CommandResult {
            accepted: true,
            resting_order_id: None,
            removed_order_id: Some(id),
            fills: Fills::new(),
        }
    }

    /// An aggressive Add traded; any residual rests under `resting`.
    pub(crate) fn matched(fills: Fills, resting: Option<OrderId>) -> Self {
        CommandResult {
            accepted: true,
            resting_order_id: resting,
            removed_order_id: None,
            fills,
        }
    }
}
