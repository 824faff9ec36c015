//! Command dispatch and the channels between the serial and radio tasks

#[cfg(feature = "embedded")]
pub mod channels;
pub mod handler;

#[cfg(feature = "embedded")]
pub use channels::{
    CommandEnvelope, CommandReceiver, CommandSender, ResponseMessage, ResponseReceiver,
    ResponseSender, COMMAND_CHANNEL, RESPONSE_CHANNEL,
};
pub use handler::CommandDispatcher;
