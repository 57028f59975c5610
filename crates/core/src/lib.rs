//! # Portal Core
//!
//! Core logic for the health authority public portal.
//!
//! This crate contains pure data operations only:
//! - Organisational structure decode, tree building, search, and navigation state
//! - Center opening-hours evaluation
//! - Pagination windows for paginated listings
//! - Content records, public form validation, and view state
//!
//! **No I/O**: HTTP calls belong in `portal-client`; routing and rendering belong in
//! `portal-web`.

pub mod config;
pub mod constants;
pub mod content;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod schedule;
pub mod structure;
pub mod view;
pub mod widgets;

pub use config::PortalConfig;
pub use error::{PortalError, PortalResult};
pub use pagination::{build_page_window, PageItem};
pub use schedule::{evaluate, is_open_now, today_ranges, Schedule, ScheduleStatus};
pub use structure::{build_forest, filter_forest, path_to, Navigator, OrgUnit, UnitId, UnitType};
pub use view::ViewState;
pub use widgets::Carousel;
