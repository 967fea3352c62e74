//! Pure data structures flowing through the pipeline.
//!
//! Each type is produced once by one stage and consumed once by the next:
//!
//! ```text
//! Order -> AvailabilityResult -> InvoiceResult -> Notification
//! ```

pub mod availability;
pub mod invoice;
pub mod notification;
pub mod order;

pub use availability::*;
pub use invoice::*;
pub use notification::*;
pub use order::*;
