// src/lib.rs

// === 1. Declare all the top-level modules ===
pub mod config;
pub mod engine;
pub mod error;
pub mod orderflow;
pub mod strategies;
pub mod utils;

// === 2. Re-export the public-facing components to create a clean API ===

// --- Configuration and errors ---
pub use config::{Config, MarketMakerParams, OrderMix, SimParams, TwapParams};
pub use error::{ConfigError, SimError};

// --- From the matching engine ---
pub use engine::book::{DepthRow, LimitOrderBook, Quote};
pub use engine::book_metrics::BookMetrics;
pub use engine::events::{Event, EventQueue, Trade};
pub use engine::order::{FIRST_AGENT_OWNER, Order, OrderIdGen, OrderKind, Side};
pub use engine::simulator::Simulator;

// --- From the orderflow model ---
pub use orderflow::generator::{Generator, round_to_tick};

// --- From the strategies ---
pub use strategies::base::StrategyBase;
pub use strategies::execution::{BlockExecution, Execution, Slice, TwapExecution};
pub use strategies::market_maker::{InventoryMaker, SymmetricMaker};
pub use strategies::signal::{ImbalanceSignal, MomentumSignal, Signal};
pub use strategies::strategy_metrics::StrategyMetrics;
pub use strategies::strategy_trait::Strategy;
pub use strategies::taker::{ManualTaker, SignalTaker, SignalTakerParams};

// --- Utilities ---
pub use utils::rng::SimRng;
