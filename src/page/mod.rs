//! Page description, document layout and the event-driven runtime.

/// JSON page model.
pub mod model;
/// Section stacking, pin spacing and snap points.
pub mod composer;
/// Host event handling over all converge controllers.
pub mod runtime;
