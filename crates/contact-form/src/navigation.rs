//! Cross-page navigation to sections of the landing page.
//!
//! The router side calls [`Navigator::navigate`] when a menu entry is chosen
//! and [`Navigator::arrived`] after every route change; the scroll executor
//! only ever sees the [`ScrollCommand`]s that come back.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Space kept free above a section for the fixed header, in pixels.
pub const HEADER_OFFSET: f64 = 80.0;
/// Wait before scrolling to a section requested from another page.
pub const PENDING_SCROLL_DELAY: Duration = Duration::from_millis(400);
/// Wait before honouring a hash present when the landing page loads.
pub const HASH_SCROLL_DELAY: Duration = Duration::from_millis(600);

const LANDING_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Home,
    Services,
    Testimonials,
    About,
    Contact,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Home,
        Section::Services,
        Section::Testimonials,
        Section::About,
        Section::Contact,
    ];

    /// Element id of the section on the landing page.
    pub fn id(&self) -> &'static str {
        match self {
            Section::Home => "home",
            Section::Services => "services",
            Section::Testimonials => "testimonials",
            Section::About => "about",
            Section::Contact => "contact",
        }
    }

    pub fn href(&self) -> String {
        format!("{}#{}", LANDING_PATH, self.id())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("no section with id '{0}'")]
pub struct UnknownSection(pub String);

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let id = raw.trim_start_matches('#');
        Section::ALL
            .into_iter()
            .find(|section| section.id() == id)
            .ok_or_else(|| UnknownSection(raw.to_string()))
    }
}

/// Instruction for the scroll executor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCommand {
    pub section: Section,
    pub offset: f64,
    pub delay: Duration,
    /// Drop the hash from the address bar once the scroll has run.
    pub clear_hash: bool,
}

impl ScrollCommand {
    fn new(section: Section, delay: Duration) -> Self {
        Self {
            section,
            offset: HEADER_OFFSET,
            delay,
            clear_hash: false,
        }
    }

    fn from_hash(section: Section) -> Self {
        Self {
            clear_hash: true,
            ..Self::new(section, HASH_SCROLL_DELAY)
        }
    }

    /// Document position to scroll to, given where the section currently sits.
    pub fn target(&self, element_top: f64, page_offset: f64) -> f64 {
        scroll_top(element_top, page_offset, self.offset)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavigationAction {
    /// Already on the landing page.
    Scroll(ScrollCommand),
    /// Load the landing page first; the scroll follows on arrival.
    Visit { href: String },
}

/// Navigation intent carried across a page change.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    pending: Option<Section>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<Section> {
        self.pending
    }

    pub fn navigate(&mut self, current_path: &str, section: Section) -> NavigationAction {
        if is_landing(current_path) {
            NavigationAction::Scroll(ScrollCommand::new(section, Duration::ZERO))
        } else {
            tracing::debug!("visiting {} to reach section {}", LANDING_PATH, section);
            self.pending = Some(section);
            NavigationAction::Visit {
                href: section.href(),
            }
        }
    }

    /// Called after each route change. A stored intent wins over the URL hash
    /// and is consumed; unknown hashes are ignored.
    pub fn arrived(&mut self, path: &str, hash: Option<&str>) -> Option<ScrollCommand> {
        if !is_landing(path) {
            return None;
        }
        if let Some(section) = self.pending.take() {
            return Some(ScrollCommand::new(section, PENDING_SCROLL_DELAY));
        }
        let hash = hash.filter(|hash| !hash.trim_start_matches('#').is_empty())?;
        match hash.parse::<Section>() {
            Ok(section) => Some(ScrollCommand::from_hash(section)),
            Err(err) => {
                tracing::debug!("{}", err);
                None
            }
        }
    }
}

/// Absolute scroll position that puts an element `offset` pixels below the top.
///
/// `element_top` is relative to the viewport, `page_offset` the current scroll.
pub fn scroll_top(element_top: f64, page_offset: f64, offset: f64) -> f64 {
    element_top + page_offset - offset
}

fn is_landing(path: &str) -> bool {
    path.is_empty() || path == LANDING_PATH
}
