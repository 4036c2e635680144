//! Table-of-contents model for scrap pages: which headings count, how they
//! nest, and how the panel presents them.

pub mod locator;
pub mod outline;
pub mod panel;
pub mod settings;
pub mod slug;
pub mod style;

pub use crate::locator::{HeadingLocator, HeadingRecord, LocatorConfig};
pub use crate::outline::{OutlineNode, build_outline};
pub use crate::panel::{PanelBody, PanelConfig, PanelLayout, PanelRenderer, PanelShell};
pub use crate::settings::{PanelPosition, PanelSettings};
