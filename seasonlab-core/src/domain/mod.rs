//! Domain types for SeasonLab

pub mod candle;
pub mod event;

pub use candle::{is_strictly_ascending, Candle, Timeframe};
pub use event::{CalendarEvent, CentralBank, EventType, Impact};
