//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements                 | Connects to              |
//! |----------------|----------------------------|--------------------------|
//! | `json_file`    | SensorSource, ConfigPort   | JSON files on disk       |
//! | `log_notifier` | Notifier                   | `log` output             |
//! | `log_sink`     | EventSink                  | `log` output             |
//! | `memory`       | StoragePort, ConfigPort    | `HashMap`                |
//! |                | SensorSource               | `Vec` of readings        |
//! |                | RateLimitCache             | `parking_lot::Mutex`     |
//! | `time`         | Clock                      | system / manual time     |

pub mod json_file;
pub mod log_notifier;
pub mod log_sink;
pub mod memory;
pub mod time;
