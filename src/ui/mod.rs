/// Presentation layer
///
/// Pure views over the editing state; every interaction is turned into a
/// `Message` and handled by the application's `update`.

pub mod selector;
pub mod workspace;

pub use workspace::Workspace;
