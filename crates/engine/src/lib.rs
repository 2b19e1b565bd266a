//! Batching engine: pending requests, the queue that sends them, and the
//! views that cache cell data and produce requests.
//!
//! Nothing is sent until a view (or the queue directly) is committed. The
//! network itself sits behind [`Transport`].

pub mod error;
pub mod queue;
pub mod request;
pub mod transport;
pub mod view;

pub use error::{DispatchError, SchemaError, ViewError};
pub use queue::{RequestGroup, RequestQueue};
pub use request::{PendingRequest, RequestKind};
pub use transport::{Dispatcher, Transport};
pub use view::{Document, RangeView, Tab, View, WriteData, WriteMode};
