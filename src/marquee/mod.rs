//! Marquee lifecycle and animation core
//!
//! Everything in here is host-independent and talks to the outside world
//! only through [`crate::platform::Platform`].

pub mod controller;
pub mod direction;
pub mod driver;
pub mod hover;
pub mod layout_gate;
pub mod persistence;
pub mod registry;

pub use controller::{MarqueeController, Phase};
pub use direction::{resolve_direction, DocumentDirection};
pub use driver::{AnimationDriver, AnimationPlan, Keyframe, StartOutcome};
pub use layout_gate::{GateStatus, LayoutStabilityGate};
pub use persistence::PersistenceHelper;
