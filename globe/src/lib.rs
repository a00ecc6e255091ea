pub extern crate nalgebra as na;

pub mod clock;
pub mod config;
pub mod dataset;
pub mod events;
pub mod frame;
#[cfg(feature = "gui")]
pub mod gui;
pub mod ingest;
pub mod marker;
pub mod orbital;
pub mod propagation;
pub mod renderer;
pub mod scene;
pub mod units;
pub mod view;
pub mod viewport;

#[cfg(test)]
mod test_support;

/// A piece of the globe view that hooks into the host frame loop
/// while it is running.
pub trait FrameComponent {
    /// Register with the frame scheduler (and any host events).
    /// Calling this on a running component is a no-op.
    fn start(&mut self);

    /// Cancel any pending frame work and unregister from host events.
    /// Nothing the component owns is touched by the host afterwards.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}
