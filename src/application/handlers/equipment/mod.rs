//! Equipment status handlers.

mod publish_status;

pub use publish_status::{
    PublishStatusCommand, PublishStatusHandler, PublishStatusResult, StatusPublishError,
};
