pub mod addr;
pub mod config;
pub mod error;
pub mod forward;
pub mod routing;
pub mod scheduler;

pub use error::{Result, RouterError};
pub use forward::{LinkQueue, forward};
pub use routing::{DEFAULT_GATEWAY, ForwardingEntry, ForwardingTable, Route, Router};
pub use scheduler::{Discipline, Packet, Priority, schedule, schedule_fifo, schedule_priority};
