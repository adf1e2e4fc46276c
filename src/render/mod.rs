//! Page rendering
//!
//! Rendering is a pure function of its input; the read path owns caching.

pub mod html;

use crate::client::Petition;
use crate::error::RenderError;
use crate::stats::RenderStats;

pub use html::HtmlRenderer;

/// Which page to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Statistics plus the pending petitions table
    Main,
    /// Statistics only; there are no pending petitions
    Empty,
    /// 404 page
    NotFound,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Main => "main",
            View::Empty => "empty",
            View::NotFound => "not-found",
        }
    }
}

/// Everything a page needs
#[derive(Debug)]
pub struct RenderData<'a> {
    pub stats: RenderStats,
    pub petitions: &'a [Petition],
}

/// Turns render data into page bytes
pub trait Renderer: Send + Sync {
    fn render(&self, view: View, data: &RenderData<'_>) -> Result<Vec<u8>, RenderError>;
}
