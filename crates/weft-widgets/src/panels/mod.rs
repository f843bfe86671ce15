#![forbid(unsafe_code)]

//! Specialized layout panels.
//!
//! Each panel kind distributes its rectangle among its children with its
//! own algorithm. The pure geometry lives in `weft-layout`; these modules
//! hold the panel state and the operations callers use to drive it.

mod limiter;
mod scroll;
mod split;
mod stack;
mod virtual_list;

pub use virtual_list::VIRTUAL_LIST_OVERSCAN;
