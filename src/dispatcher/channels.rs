//! Channels between the serial task and the transmitter task
//!
//! The serial task is the only producer of commands and the only consumer of
//! responses; the transmitter task owns the radio and is the only consumer of
//! commands.

use crate::commands::{Command, Response};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};

/// Channel capacity for incoming commands
const COMMAND_CHANNEL_SIZE: usize = 4;

/// Channel capacity for outgoing responses
const RESPONSE_CHANNEL_SIZE: usize = 4;

/// Envelope wrapping a command with its sequence ID
#[derive(Debug, Clone)]
pub struct CommandEnvelope {
    pub command: Command,
    /// Sequence ID for matching responses to requests
    pub sequence_id: u16,
}

/// A response on its way back to the host
#[derive(Debug, Clone)]
pub struct ResponseMessage {
    pub sequence_id: u16,
    pub response: Response,
}

pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, CommandEnvelope, COMMAND_CHANNEL_SIZE> =
    Channel::new();

pub static RESPONSE_CHANNEL: Channel<
    CriticalSectionRawMutex,
    ResponseMessage,
    RESPONSE_CHANNEL_SIZE,
> = Channel::new();

pub type CommandSender =
    Sender<'static, CriticalSectionRawMutex, CommandEnvelope, COMMAND_CHANNEL_SIZE>;
pub type CommandReceiver =
    Receiver<'static, CriticalSectionRawMutex, CommandEnvelope, COMMAND_CHANNEL_SIZE>;
pub type ResponseSender =
    Sender<'static, CriticalSectionRawMutex, ResponseMessage, RESPONSE_CHANNEL_SIZE>;
pub type ResponseReceiver =
    Receiver<'static, CriticalSectionRawMutex, ResponseMessage, RESPONSE_CHANNEL_SIZE>;
