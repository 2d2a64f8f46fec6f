//! Presentation strategies
//!
//! Software-rendered and GPU-rendered windows share all event handling in
//! [`super::WindowController`]; they only differ in how a finished frame
//! reaches the screen and in the context they hand to render threads.

use std::sync::Arc;

use super::{Frame, HostError, HostWindow};

/// Source of finished screen images for software presentation
pub trait FrameSource: Send + Sync {
    /// Latest complete frames, one per emulated screen, top first
    fn latest_frames(&self) -> Vec<Frame>;
}

/// Graphics context handed to a render thread
///
/// The GPU backend manages its own context, so make-current and
/// done-current do nothing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SharedContext;

impl SharedContext {
    /// Bind the context to the calling thread
    pub const fn make_current(&self) {}

    /// Release the context from the calling thread
    pub const fn done_current(&self) {}
}

/// Blits frames from a [`FrameSource`] through the host window
pub struct SoftwarePresenter {
    source: Arc<dyn FrameSource>,
}

impl SoftwarePresenter {
    /// Present frames from `source`
    pub fn new(source: Arc<dyn FrameSource>) -> Self {
        Self { source }
    }
}

/// Leaves presentation to the graphics backend's swapchain
#[derive(Debug, Default, Clone, Copy)]
pub struct GraphicsPresenter;

/// How a window gets its frames on screen
pub enum Presenter {
    /// CPU-rendered frames pushed through the host
    Software(SoftwarePresenter),
    /// GPU backend presents to the resolved surface itself
    Graphics(GraphicsPresenter),
}

impl Presenter {
    /// Software presentation from `source`
    pub fn software(source: Arc<dyn FrameSource>) -> Self {
        Self::Software(SoftwarePresenter::new(source))
    }

    /// GPU presentation
    pub const fn graphics() -> Self {
        Self::Graphics(GraphicsPresenter)
    }

    /// Put the latest frame on screen
    pub fn present(&self, window: &mut dyn HostWindow) -> Result<(), HostError> {
        match self {
            Self::Software(software) => {
                let frames = software.source.latest_frames();
                if frames.is_empty() {
                    return Ok(());
                }
                window.present_frames(&frames)
            }
            Self::Graphics(_) => Ok(()),
        }
    }

    /// Context for a render thread sharing this window
    pub const fn create_shared_context(&self) -> SharedContext {
        SharedContext
    }
}

impl std::fmt::Debug for Presenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Software(_) => f.write_str("Presenter::Software"),
            Self::Graphics(_) => f.write_str("Presenter::Graphics"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockWindow, StaticFrames};

    #[test]
    fn test_software_presenter_pushes_frames() {
        let frame = Frame {
            width: 2,
            height: 1,
            pixels: vec![0xff; 8],
        };
        let presenter = Presenter::software(Arc::new(StaticFrames(vec![frame.clone()])));
        let mut window = MockWindow::new(1);
        presenter.present(&mut window).unwrap();
        presenter.present(&mut window).unwrap();
        assert_eq!(window.state().presented, vec![vec![frame.clone()], vec![frame]]);
    }

    #[test]
    fn test_software_presenter_skips_empty_sources() {
        let presenter = Presenter::software(Arc::new(StaticFrames(Vec::new())));
        let mut window = MockWindow::new(1);
        presenter.present(&mut window).unwrap();
        assert!(window.state().presented.is_empty());
    }

    #[test]
    fn test_graphics_presenter_leaves_host_alone() {
        let presenter = Presenter::graphics();
        let mut window = MockWindow::new(1);
        presenter.present(&mut window).unwrap();
        assert!(window.state().presented.is_empty());

        let context = presenter.create_shared_context();
        context.make_current();
        context.done_current();
    }
}
