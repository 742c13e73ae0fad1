//! Small building blocks shared by every view.

mod alert;
mod button;
mod input;
mod spinner;

pub use alert::{Alert, AlertKind};
pub use button::{Badge, BadgeVariant, Button, ButtonVariant};
pub use input::{Input, Label};
pub use spinner::Spinner;
