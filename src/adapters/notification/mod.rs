//! Notification adapters.
//!
//! The default dispatcher delivers notifications to the recipient's private
//! `user:<id>` room through the gateway. Anyone not connected misses it.

mod gateway_dispatcher;

pub use gateway_dispatcher::GatewayNotificationDispatcher;
