//! Transmitter task
//!
//! Owns the radio. Sends the payload, then waits out the inter-packet delay
//! while serving configuration commands, so a new configuration only ever
//! takes effect between packets.

use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Instant, Timer};

use crate::config::transmitter::PAYLOAD;
use crate::dispatcher::{CommandDispatcher, CommandReceiver, ResponseMessage, ResponseSender};
use crate::lora::traits::{LoraError, LoraRadio};
use crate::radio::ActiveConfig;
use crate::transmitter::{packet_delay_ms, Transmitter};

pub async fn transmitter_task<R: LoraRadio>(
    mut radio: R,
    mut active: ActiveConfig,
    commands: CommandReceiver,
    responses: ResponseSender,
) {
    let dispatcher = CommandDispatcher::new();
    let mut transmitter = Transmitter::new();

    if let Err(err) = radio.init(active.current()).await {
        log::error!("tx: radio init failed: {:?}", err);
    }

    loop {
        let result = transmitter.send_packet(&mut radio, PAYLOAD).await;
        if result.is_err() {
            let stats = transmitter.stats();
            log::debug!(
                "tx: {} sent, {} failed, last error {:?}",
                stats.sent,
                stats.failed,
                transmitter.last_error()
            );
        }
        if let Err(LoraError::NotInitialised) = result {
            if let Err(err) = radio.init(active.current()).await {
                log::error!("tx: radio init retry failed: {:?}", err);
            }
        }

        let deadline = Instant::now() + Duration::from_millis(packet_delay_ms(active.current()));
        loop {
            match select(Timer::at(deadline), commands.receive()).await {
                Either::First(()) => break,
                Either::Second(envelope) => {
                    let response = dispatcher
                        .dispatch(&mut radio, &mut active, envelope.command)
                        .await;
                    let msg = ResponseMessage {
                        sequence_id: envelope.sequence_id,
                        response,
                    };
                    if responses.try_send(msg).is_err() {
                        log::warn!("tx: response {} dropped, host not reading", envelope.sequence_id);
                    }
                }
            }
        }
    }
}
