//! Wire types shared with the feedback backend.
//!
//! - [`FeedbackEntry`]: one message on the wall, as canonicalised by the backend.
//! - [`CreateFeedbackInput`]: what the client tenders when posting.
//! - [`ApiResponse`]: the `{success, data, error}` envelope around every response.

mod envelope;
mod feedback;

pub use envelope::*;
pub use feedback::*;
