//! Small value types shared between the engine and its hosts.

use html::PatchKey;
use html::internal::Id;

macro_rules! host_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            #[inline]
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn as_raw(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            #[inline]
            fn from(raw: u64) -> Self {
                Self::from_raw(raw)
            }
        }
    };
}

host_handle!(
    /// Handle for a pending one-shot or repeating timer.
    TimerId
);
host_handle!(
    /// Handle for a live mutation or intersection observer.
    ObserverId
);
host_handle!(
    /// Handle for a registered window event listener.
    ListenerId
);

/// Reference to a node either in the host page or in the injected panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Page(Id),
    Panel(PatchKey),
}

/// Viewport-relative box, as reported by `getBoundingClientRect`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    /// True when `self` is not fully inside `outer` vertically.
    pub fn escapes(&self, outer: &Rect) -> bool {
        self.top < outer.top || self.bottom > outer.bottom
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollBehavior {
    #[default]
    Smooth,
    Instant,
}

/// One side of an intersection root margin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarginLength {
    Px(f64),
    Percent(f64),
}

impl MarginLength {
    fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(v) = s.strip_suffix("px") {
            return v.trim().parse().ok().map(MarginLength::Px);
        }
        if let Some(v) = s.strip_suffix('%') {
            return v.trim().parse().ok().map(MarginLength::Percent);
        }
        // bare zero is the only unitless length CSS accepts
        match s.parse::<f64>() {
            Ok(v) if v == 0.0 => Some(MarginLength::Px(0.0)),
            _ => None,
        }
    }

    /// Resolve against the viewport extent the margin applies to.
    pub fn resolve(&self, extent: f64) -> f64 {
        match *self {
            MarginLength::Px(v) => v,
            MarginLength::Percent(p) => extent * p / 100.0,
        }
    }
}

impl std::fmt::Display for MarginLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarginLength::Px(v) => write!(f, "{v}px"),
            MarginLength::Percent(v) => write!(f, "{v}%"),
        }
    }
}

/// `IntersectionObserver` root margin in CSS shorthand order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl RootMargin {
    /// Parse the four-value form, e.g. `-80px 0px -70% 0px`.
    pub fn parse(s: &str) -> Option<Self> {
        let parts = s
            .split_whitespace()
            .map(MarginLength::parse)
            .collect::<Option<Vec<_>>>()?;
        match parts.as_slice() {
            [all] => Some(Self::uniform(*all)),
            [v, h] => Some(Self {
                top: *v,
                right: *h,
                bottom: *v,
                left: *h,
            }),
            [top, right, bottom, left] => Some(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            _ => None,
        }
    }

    pub fn uniform(len: MarginLength) -> Self {
        Self {
            top: len,
            right: len,
            bottom: len,
            left: len,
        }
    }

    /// Vertical band `[top, bottom]` of a viewport of `height` that counts as
    /// intersecting once the margins are applied.
    pub fn vertical_band(&self, height: f64) -> (f64, f64) {
        let top = -self.top.resolve(height);
        let bottom = height + self.bottom.resolve(height);
        (top, bottom)
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::uniform(MarginLength::Px(0.0))
    }
}

impl std::fmt::Display for RootMargin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}
