//! Serial task for command/response handling
//!
//! Reads command frames from the host and writes back responses on the same
//! port. Parse errors are answered here without involving the radio.

use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Timer};

use crate::commands::{Response, ResponseSerialiser};
use crate::dispatcher::{CommandEnvelope, CommandSender, ResponseReceiver};
use crate::serial::{ReadResult, SerialCommandReader, SerialPort};

pub async fn serial_task<S: SerialPort>(
    mut port: S,
    commands: CommandSender,
    responses: ResponseReceiver,
) {
    let mut reader = SerialCommandReader::new();
    let serialiser = ResponseSerialiser::new();

    loop {
        let event = select(reader.read_command(&mut port), responses.receive()).await;
        let outgoing = match event {
            Either::First(ReadResult::Command(command)) => {
                let sequence_id = reader.next_sequence_id();
                log::debug!("serial: command {:?} (seq {})", command.id(), sequence_id);
                commands
                    .send(CommandEnvelope {
                        command,
                        sequence_id,
                    })
                    .await;
                None
            }
            Either::First(ReadResult::ParseError(status, command_id)) => {
                Some(Response::error_raw(status, command_id))
            }
            Either::First(ReadResult::SerialError(err)) => {
                log::warn!("serial: read failed: {:?}", err);
                reader.reset();
                Timer::after(Duration::from_millis(10)).await;
                None
            }
            Either::Second(msg) => Some(msg.response),
        };

        if let Some(response) = outgoing {
            let frame = serialiser.serialise(&response);
            if let Err(err) = port.write(&frame).await {
                log::warn!("serial: write failed: {:?}", err);
                continue;
            }
            let _ = port.flush().await;
        }
    }
}
