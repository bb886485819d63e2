//! Background tasks module
//!
//! This module contains the tasks that run alongside the HTTP server: the
//! timer loop that owns the core, the task that feeds the broadcast hub, and
//! the optional console surface.

pub mod broadcast;
pub mod console;
pub mod timer_loop;

// Re-export main functions
pub use broadcast::broadcast_task;
pub use console::console_surface_task;
pub use timer_loop::timer_loop_task;
