//! Search planning module.
//!
//! This module provides:
//! - Boustrophedon sweep generation over a rectangular search area
//! - Breadcrumb trail of traversed poses for the return leg

mod breadcrumb;
mod search;

pub use breadcrumb::BreadcrumbTrail;
pub use search::SearchPathPlanner;
