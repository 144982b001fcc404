//! Interactive TUI for picking a merchant context
//!
//! Architecture:
//! - Main thread: drains terminal input, timers and fetch results, renders
//! - Worker thread: runs fetches against the [`ItemSource`]
//! - Communication via mpsc channels (requests -> worker, responses <- worker)
//! - All state lives in [`PickerEngine`], which turns events into effects
//!   and never blocks
//!
//! Layout:
//! ```text
//! Select a merchant from: Acme
//!
//! Search: shop█ (loading...)
//!
//! > Acme Shop (MC1)
//!   Acme Kiosk (MC2)
//!
//! esc: exit search | enter: confirm | ctrl+c: quit
//! ```

mod app;
pub mod engine;
pub mod input;
pub mod navigation;
pub mod record;
pub mod search;
pub mod timer;
pub mod ui;
pub mod worker;

pub use app::{run, run_with_config};
pub use engine::{
    Effect, FetchKind, FetchRequest, FetchResponse, Phase, PickerConfig, PickerEngine,
    PickerEvent, PickerOutcome,
};
pub use navigation::{LevelId, NavigationLevel, NavigationStack, RequestId};
pub use record::{FetchError, ItemSource, MembershipRecord, ParentRef, ResourceType};
pub use search::{DEBOUNCE_DELAY, DebounceTicket, SearchController};
